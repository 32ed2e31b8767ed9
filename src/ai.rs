//! Timer-driven decision loop for the boss.
//!
//! The brain never touches the boss directly: each tick it is told where the
//! boss stands and which specials are ready, and it answers with a walking
//! velocity and, sometimes, a special to cast.

use rand::Rng;

use crate::moves::SpecialKind;

pub const ARENA_TARGET_MIN_X: f32 = 200.0;
pub const ARENA_TARGET_MAX_X: f32 = 1080.0;
pub const WALK_SPEED: f32 = 150.0;
pub const ARRIVE_DISTANCE: f32 = 10.0;
/// Minimum time between picking movement targets.
pub const MOVE_DWELL: f32 = 1.0;
/// The boss only considers guarding against swings that start this close.
pub const GUARD_RANGE: f32 = 260.0;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Normal, Difficulty::Hard];

    pub fn level(self) -> u8 {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Normal => 1,
            Difficulty::Hard => 2,
        }
    }

    /// Out-of-range levels clamp to the nearest difficulty.
    pub fn from_level(level: i64) -> Self {
        match level {
            i64::MIN..=0 => Difficulty::Easy,
            1 => Difficulty::Normal,
            _ => Difficulty::Hard,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "EASY",
            Difficulty::Normal => "NORMAL",
            Difficulty::Hard => "HARD",
        }
    }

    pub fn easier(self) -> Self {
        Self::from_level(self.level() as i64 - 1)
    }

    pub fn harder(self) -> Self {
        Self::from_level(self.level() as i64 + 1)
    }

    /// Seconds the brain waits after a cast before considering another.
    pub fn action_delay(self) -> f32 {
        2.0 - 0.5 * self.level() as f32
    }

    /// Chance per second of picking a new movement target.
    pub fn move_chance(self) -> f32 {
        0.3 + 0.2 * self.level() as f32
    }

    /// Chance per tick of attacking once the action delay has passed.
    pub fn attack_chance(self) -> f32 {
        0.4 + 0.3 * self.level() as f32
    }

    pub fn guard_chance(self) -> f32 {
        0.1 + 0.15 * self.level() as f32
    }

    pub fn boss_health(self) -> i32 {
        800 + 200 * self.level() as i32
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Decision {
    pub velocity_x: f32,
    pub cast: Option<SpecialKind>,
}

#[derive(Debug, Default, Clone)]
pub struct BossBrain {
    pub timer: f32,
    pub action_timer: f32,
    pub move_timer: f32,
    pub target_x: f32,
    pub moving: bool,
}

impl BossBrain {
    /// Advance the timers and decide. While `can_act` is false (the boss is
    /// guarding or mid-cast) no special is picked and the action timer keeps
    /// counting.
    pub fn tick(
        &mut self,
        delta_time: f32,
        x: f32,
        ready: &[SpecialKind],
        can_act: bool,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> Decision {
        self.timer += delta_time;
        self.action_timer += delta_time;
        self.move_timer += delta_time;

        let mut decision = Decision::default();

        if !self.moving
            && self.move_timer > MOVE_DWELL
            && rng.gen::<f32>() < difficulty.move_chance() * delta_time
        {
            self.moving = true;
            self.target_x = rng.gen_range(ARENA_TARGET_MIN_X..=ARENA_TARGET_MAX_X);
            self.move_timer = 0.0;
        }

        if self.moving {
            let offset = self.target_x - x;
            if offset.abs() > ARRIVE_DISTANCE {
                decision.velocity_x = offset.signum() * WALK_SPEED;
            } else {
                self.moving = false;
            }
        }

        if can_act
            && self.action_timer > difficulty.action_delay()
            && rng.gen::<f32>() < difficulty.attack_chance()
        {
            if let Some(special) = pick_weighted(ready, rng) {
                decision.cast = Some(special);
                self.action_timer = 0.0;
            }
        }

        decision
    }

    pub fn roll_guard(&self, difficulty: Difficulty, rng: &mut impl Rng) -> bool {
        rng.gen::<f32>() < difficulty.guard_chance()
    }
}

/// Weighted pick among the ready specials, renormalised over what is ready.
pub fn pick_weighted(ready: &[SpecialKind], rng: &mut impl Rng) -> Option<SpecialKind> {
    let total: u32 = ready.iter().map(|s| s.profile().weight).sum();
    if total == 0 {
        return None;
    }
    let mut roll = rng.gen_range(0..total);
    for &special in ready {
        let weight = special.profile().weight;
        if roll < weight {
            return Some(special);
        }
        roll -= weight;
    }
    None
}
