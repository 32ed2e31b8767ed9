//! The AI-controlled sorcerer and the specials it casts.

use bevy::prelude::*;
use rand::Rng;

use crate::ai::{BossBrain, Difficulty, GUARD_RANGE};
use crate::animation::{AnimatedClip, ClipId};
use crate::health::Health;
use crate::moves::{rect_at, Cue, Side, SpecialKind};

pub const BOSS_MIN_X: f32 = 200.0;
pub const BOSS_MAX_X: f32 = 1080.0;
pub const GUARD_TIME: f32 = 0.6;
pub const GUARD_COOLDOWN: f32 = 2.5;

// =============================================================================
// Effects
// =============================================================================

/// One live instance of a special. Deals its damage at most once per cast:
/// after it lands its rectangle collapses until the next cast.
#[derive(Debug, Clone)]
pub struct Effect {
    pub kind: SpecialKind,
    pub position: Vec2,
    pub active: bool,
    pub landed: bool,
    pub clip: AnimatedClip,
    cooldown_left: f32,
    time_left: f32,
    direction: f32,
}

impl Effect {
    pub fn new(kind: SpecialKind) -> Self {
        Self {
            kind,
            position: Vec2::ZERO,
            active: false,
            landed: false,
            clip: AnimatedClip::new(kind.profile().clip),
            cooldown_left: 0.0,
            time_left: 0.0,
            direction: -1.0,
        }
    }

    pub fn damage(&self) -> i32 {
        self.kind.profile().damage
    }

    pub fn can_cast(&self) -> bool {
        !self.active && self.cooldown_left <= 0.0
    }

    pub fn cooldown_left(&self) -> f32 {
        self.cooldown_left
    }

    pub fn cast(&mut self, origin: Vec2, facing_right: bool) {
        let profile = self.kind.profile();
        self.active = true;
        self.landed = false;
        self.position = origin + profile.anchor;
        self.direction = if facing_right { 1.0 } else { -1.0 };
        self.cooldown_left = profile.cooldown;
        self.time_left = profile.duration.unwrap_or(0.0);
        self.clip.reset();
    }

    pub fn advance(&mut self, delta_time: f32) {
        self.cooldown_left = (self.cooldown_left - delta_time).max(0.0);
        if !self.active {
            return;
        }

        let profile = self.kind.profile();
        self.position.x += profile.speed * self.direction * delta_time;
        self.clip.advance(delta_time);

        let expired = match profile.duration {
            Some(_) => {
                self.time_left -= delta_time;
                self.time_left <= 0.0
            }
            None => self.clip.is_finished(),
        };
        if expired {
            self.active = false;
        }
    }

    /// Damaging rectangle; empty when inactive or already landed.
    pub fn bounds(&self) -> Rect {
        if !self.active || self.landed {
            return Rect::EMPTY;
        }
        let size = self.kind.profile().size;
        rect_at(self.position.x, self.position.y, size.x, size.y)
    }

    pub fn mark_landed(&mut self) {
        self.landed = true;
    }

    pub fn facing_right(&self) -> bool {
        self.direction > 0.0
    }
}

// =============================================================================
// Boss
// =============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BossState {
    Idle,
    Walk,
    Guard,
    Cast(SpecialKind),
    Hit,
    Death,
}

impl BossState {
    pub fn clip(self) -> ClipId {
        match self {
            BossState::Idle => ClipId::BossIdle,
            BossState::Walk => ClipId::BossWalk,
            BossState::Guard => ClipId::BossGuard,
            BossState::Cast(_) => ClipId::BossCast,
            BossState::Hit => ClipId::BossHit,
            BossState::Death => ClipId::BossDeath,
        }
    }
}

/// What the boss can see of the player each tick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlayerView {
    pub x: f32,
    pub attack_started: bool,
}

#[derive(Debug, Clone)]
pub struct Boss {
    pub position: Vec2,
    pub velocity_x: f32,
    pub facing_right: bool,
    state: BossState,
    clip: AnimatedClip,
    pub health: Health,
    pub difficulty: Difficulty,
    pub brain: BossBrain,
    pub effects: [Effect; 3],
    guard_left: f32,
    guard_cooldown: f32,
}

impl Boss {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            position: Vec2::new(900.0, crate::fighter::GROUND_Y),
            velocity_x: 0.0,
            facing_right: false,
            state: BossState::Idle,
            clip: AnimatedClip::new(BossState::Idle.clip()),
            health: Health::new(difficulty.boss_health()),
            difficulty,
            brain: BossBrain::default(),
            effects: SpecialKind::ALL.map(Effect::new),
            guard_left: 0.0,
            guard_cooldown: 0.0,
        }
    }

    pub fn state(&self) -> BossState {
        self.state
    }

    pub fn clip(&self) -> &AnimatedClip {
        &self.clip
    }

    pub fn is_dead(&self) -> bool {
        self.state == BossState::Death
    }

    pub fn is_vulnerable(&self) -> bool {
        !matches!(self.state, BossState::Hit | BossState::Death)
    }

    pub fn hurtbox(&self) -> Rect {
        rect_at(self.position.x - 37.0, self.position.y, 75.0, 105.0)
    }

    pub fn effect(&self, kind: SpecialKind) -> &Effect {
        &self.effects[kind as usize]
    }

    pub fn ready_specials(&self) -> Vec<SpecialKind> {
        self.effects
            .iter()
            .filter(|effect| effect.can_cast())
            .map(|effect| effect.kind)
            .collect()
    }

    fn enter(&mut self, state: BossState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.clip = AnimatedClip::new(state.clip());
    }

    pub fn advance(
        &mut self,
        delta_time: f32,
        player: PlayerView,
        rng: &mut impl Rng,
        cues: &mut Vec<Cue>,
    ) {
        for effect in &mut self.effects {
            effect.advance(delta_time);
        }
        self.guard_left = (self.guard_left - delta_time).max(0.0);
        self.guard_cooldown = (self.guard_cooldown - delta_time).max(0.0);

        match self.state {
            BossState::Hit => {
                if self.clip.is_finished() {
                    self.enter(BossState::Idle);
                }
            }
            BossState::Death => {}
            _ => self.think(delta_time, player, rng, cues),
        }

        self.clip.advance(delta_time);
    }

    fn think(
        &mut self,
        delta_time: f32,
        player: PlayerView,
        rng: &mut impl Rng,
        cues: &mut Vec<Cue>,
    ) {
        if player.attack_started
            && self.state != BossState::Guard
            && self.guard_cooldown <= 0.0
            && (player.x - self.position.x).abs() <= GUARD_RANGE
            && self.brain.roll_guard(self.difficulty, rng)
        {
            self.start_guard();
        }

        let ready = self.ready_specials();
        let can_act = !matches!(self.state, BossState::Guard | BossState::Cast(_));
        let decision = self.brain.tick(
            delta_time,
            self.position.x,
            &ready,
            can_act,
            self.difficulty,
            rng,
        );

        match self.state {
            BossState::Guard => {
                self.velocity_x = 0.0;
                if self.guard_left <= 0.0 {
                    self.enter(BossState::Idle);
                }
                return;
            }
            BossState::Cast(_) => {
                self.velocity_x = 0.0;
                if self.clip.is_finished() {
                    self.enter(BossState::Idle);
                }
                return;
            }
            _ => {}
        }

        if let Some(special) = decision.cast {
            self.facing_right = player.x > self.position.x;
            self.velocity_x = 0.0;
            self.enter(BossState::Cast(special));
            self.effects[special as usize].cast(self.position, self.facing_right);
            cues.push(Cue::Cast {
                special,
                at: self.position,
            });
            return;
        }

        self.velocity_x = decision.velocity_x;
        if self.velocity_x > 0.0 {
            self.facing_right = true;
        } else if self.velocity_x < 0.0 {
            self.facing_right = false;
        }
        self.position.x =
            (self.position.x + self.velocity_x * delta_time).clamp(BOSS_MIN_X, BOSS_MAX_X);

        if self.velocity_x != 0.0 {
            self.enter(BossState::Walk);
        } else {
            self.enter(BossState::Idle);
        }
    }

    pub fn start_guard(&mut self) {
        self.guard_left = GUARD_TIME;
        self.guard_cooldown = GUARD_COOLDOWN;
        self.velocity_x = 0.0;
        self.enter(BossState::Guard);
    }

    /// Apply an incoming hit. Guarding halves it. Returns the damage taken.
    pub fn take_damage(&mut self, amount: i32, cues: &mut Vec<Cue>) -> i32 {
        if self.is_dead() || amount <= 0 {
            return 0;
        }

        let mut amount = amount;
        if self.state == BossState::Guard {
            amount = (amount / 2).max(1);
            cues.push(Cue::Guarded {
                at: self.position + Vec2::new(0.0, 50.0),
            });
        }

        let taken = self.health.take_damage(amount);
        let at = self.position + Vec2::new(0.0, 50.0);
        if self.health.is_depleted() {
            self.velocity_x = 0.0;
            self.enter(BossState::Death);
            cues.push(Cue::Died {
                side: Side::Boss,
                at,
            });
        } else if self.state != BossState::Hit {
            self.state = BossState::Hit;
            self.clip = AnimatedClip::new(BossState::Hit.clip());
            cues.push(Cue::Hurt {
                side: Side::Boss,
                at,
            });
        }
        taken
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DT: f32 = 1.0 / 60.0;

    fn far_player() -> PlayerView {
        PlayerView {
            x: 100.0,
            attack_started: false,
        }
    }

    #[test]
    fn spirit_slash_respects_cooldown() {
        let mut effect = Effect::new(SpecialKind::SpiritSlash);
        assert!(effect.can_cast());
        effect.cast(Vec2::new(900.0, 430.0), false);
        assert!(!effect.can_cast());
        assert_eq!(effect.position, Vec2::new(800.0, 380.0));

        for _ in 0..120 {
            effect.advance(DT);
        }
        assert!(!effect.active);
        assert!(!effect.can_cast());

        for _ in 0..540 {
            effect.advance(DT);
        }
        assert!(effect.can_cast());
    }

    #[test]
    fn hado_travels_along_facing() {
        let mut effect = Effect::new(SpecialKind::Hado);
        effect.cast(Vec2::new(900.0, 430.0), false);
        let start = effect.position.x;
        effect.advance(0.1);
        assert!((start - effect.position.x - 40.0).abs() < 1e-3);
    }

    #[test]
    fn mirror_veil_runs_on_its_timer() {
        let mut effect = Effect::new(SpecialKind::MirrorVeil);
        effect.cast(Vec2::new(900.0, 430.0), false);
        for _ in 0..170 {
            effect.advance(DT);
        }
        assert!(effect.active);
        for _ in 0..20 {
            effect.advance(DT);
        }
        assert!(!effect.active);
    }

    #[test]
    fn landed_effect_collapses_until_recast() {
        let mut effect = Effect::new(SpecialKind::Hado);
        effect.cast(Vec2::new(900.0, 430.0), false);
        assert!(!effect.bounds().is_empty());
        effect.mark_landed();
        assert!(effect.bounds().is_empty());
        effect.cast(Vec2::new(900.0, 430.0), false);
        assert!(!effect.bounds().is_empty());
    }

    #[test]
    fn guard_halves_damage() {
        let mut boss = Boss::new(Difficulty::Normal);
        boss.enter(BossState::Guard);
        let mut cues = Vec::new();
        assert_eq!(boss.take_damage(40, &mut cues), 20);
        assert!(matches!(cues[0], Cue::Guarded { .. }));
        assert_eq!(boss.take_damage(1, &mut cues), 1);
    }

    #[test]
    fn hit_then_death() {
        let mut boss = Boss::new(Difficulty::Easy);
        let mut cues = Vec::new();
        boss.take_damage(100, &mut cues);
        assert_eq!(boss.state(), BossState::Hit);
        assert!(!boss.is_vulnerable());

        boss.take_damage(10_000, &mut cues);
        assert_eq!(boss.state(), BossState::Death);
        assert_eq!(boss.health.current(), 0);
        assert_eq!(boss.take_damage(5, &mut cues), 0);
    }

    #[test]
    fn death_stops_thinking() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut boss = Boss::new(Difficulty::Hard);
        let mut cues = Vec::new();
        boss.take_damage(10_000, &mut cues);
        cues.clear();
        let position = boss.position;
        for _ in 0..600 {
            boss.advance(DT, far_player(), &mut rng, &mut cues);
        }
        assert!(cues.is_empty());
        assert_eq!(boss.position, position);
        assert!(boss.effects.iter().all(|e| !e.active));
    }

    #[test]
    fn boss_eventually_casts_and_returns_to_idle() {
        let mut rng = StdRng::seed_from_u64(12);
        let mut boss = Boss::new(Difficulty::Hard);
        let mut cues = Vec::new();
        let mut cast_seen = false;
        for _ in 0..600 {
            boss.advance(DT, far_player(), &mut rng, &mut cues);
            if matches!(boss.state(), BossState::Cast(_)) {
                cast_seen = true;
            }
        }
        assert!(cast_seen);
        assert!(cues.iter().any(|c| matches!(c, Cue::Cast { .. })));
        assert!(boss.position.x >= BOSS_MIN_X && boss.position.x <= BOSS_MAX_X);
    }

    #[test]
    fn recovers_from_hit() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut boss = Boss::new(Difficulty::Easy);
        let mut cues = Vec::new();
        boss.take_damage(20, &mut cues);
        for _ in 0..60 {
            boss.advance(DT, far_player(), &mut rng, &mut cues);
        }
        assert!(boss.is_vulnerable());
    }

    #[test]
    fn cast_follows_right_after_guard_ends() {
        let mut rng = StdRng::seed_from_u64(15);
        let mut boss = Boss::new(Difficulty::Hard);
        let mut cues = Vec::new();
        boss.brain.action_timer = 10.0;
        boss.start_guard();

        let mut guard_ticks = 0;
        while boss.state() == BossState::Guard {
            boss.advance(DT, far_player(), &mut rng, &mut cues);
            guard_ticks += 1;
            assert!(guard_ticks <= 40, "guard never ended");
        }
        assert!(cues.iter().all(|c| !matches!(c, Cue::Cast { .. })));
        assert!(boss.brain.action_timer > Difficulty::Hard.action_delay());

        boss.advance(DT, far_player(), &mut rng, &mut cues);
        assert!(matches!(boss.state(), BossState::Cast(_)));
    }

    #[test]
    fn guard_only_against_nearby_swings() {
        let mut rng = StdRng::seed_from_u64(14);
        let mut boss = Boss::new(Difficulty::Hard);
        let mut cues = Vec::new();
        for _ in 0..200 {
            boss.advance(
                DT,
                PlayerView {
                    x: 100.0,
                    attack_started: true,
                },
                &mut rng,
                &mut cues,
            );
            assert_ne!(boss.state(), BossState::Guard);
        }
    }
}
