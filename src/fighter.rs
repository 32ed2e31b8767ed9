//! The player's swordsman: input-driven state machine plus simple kinematics.

use bevy::prelude::*;

use crate::animation::{AnimatedClip, ClipId};
use crate::health::Health;
use crate::moves::{rect_at, AttackKind, Cue, Side};

pub const GRAVITY: f32 = 980.0;
pub const JUMP_IMPULSE: f32 = -450.0;
pub const WALK_SPEED: f32 = 280.0;
pub const GROUND_Y: f32 = 430.0;
pub const ARENA_MIN_X: f32 = 60.0;
pub const ARENA_MAX_X: f32 = 1220.0;
pub const PLAYER_MAX_HEALTH: i32 = 1000;
pub const BLOCK_COOLDOWN: f32 = 0.4;
pub const HURT_HIT_STOP: f32 = 0.1;
pub const HURT_SHAKE: f32 = 0.2;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FighterState {
    Idle,
    Walk,
    Jump,
    Fall,
    Attack(AttackKind),
    Hit,
    Death,
    Victory,
    Block,
}

impl FighterState {
    pub fn clip(self) -> ClipId {
        match self {
            FighterState::Idle => ClipId::SwordIdle,
            FighterState::Walk => ClipId::SwordWalk,
            FighterState::Jump => ClipId::SwordJump,
            FighterState::Fall => ClipId::SwordFall,
            FighterState::Attack(kind) => kind.profile().clip,
            FighterState::Hit => ClipId::SwordHit,
            FighterState::Death => ClipId::SwordDeath,
            FighterState::Victory => ClipId::SwordVictory,
            FighterState::Block => ClipId::SwordBlock,
        }
    }

    /// Where the sprite's top edge sits relative to the fighter's y.
    pub fn draw_offset_y(self) -> f32 {
        match self {
            FighterState::Jump => -100.0,
            FighterState::Attack(kind) => kind.profile().draw_offset_y,
            _ => 0.0,
        }
    }
}

/// Everything the player asked for this tick. Movement and block are held
/// keys; jump and attacks are edge-triggered presses (the finisher is a held
/// two-key chord).
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct FighterIntent {
    pub left: bool,
    pub right: bool,
    pub jump: bool,
    pub block: bool,
    pub light: bool,
    pub heavy: bool,
    pub whirlwind: bool,
    pub barrage: bool,
    pub finisher: bool,
}

impl FighterIntent {
    pub fn wants(&self, kind: AttackKind) -> bool {
        match kind {
            AttackKind::Light => self.light,
            AttackKind::Heavy => self.heavy,
            AttackKind::Whirlwind => self.whirlwind,
            AttackKind::Barrage => self.barrage,
            AttackKind::Finisher => self.finisher,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Swordsman {
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing_right: bool,
    pub grounded: bool,
    state: FighterState,
    clip: AnimatedClip,
    pub health: Health,
    pub combo: u32,
    pub max_combo: u32,
    pub score: u32,
    cooldowns: [f32; 5],
    block_cooldown: f32,
    blocking: bool,
    hit_stop: f32,
    shake: f32,
    attack_started: bool,
}

impl Default for Swordsman {
    fn default() -> Self {
        Self::new(Vec2::new(320.0, GROUND_Y))
    }
}

impl Swordsman {
    pub fn new(position: Vec2) -> Self {
        Self {
            position,
            velocity: Vec2::ZERO,
            facing_right: true,
            grounded: position.y >= GROUND_Y,
            state: FighterState::Idle,
            clip: AnimatedClip::new(FighterState::Idle.clip()),
            health: Health::new(PLAYER_MAX_HEALTH),
            combo: 0,
            max_combo: 0,
            score: 0,
            cooldowns: [0.0; 5],
            block_cooldown: 0.0,
            blocking: false,
            hit_stop: 0.0,
            shake: 0.0,
            attack_started: false,
        }
    }

    pub fn state(&self) -> FighterState {
        self.state
    }

    pub fn clip(&self) -> &AnimatedClip {
        &self.clip
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn is_dead(&self) -> bool {
        self.state == FighterState::Death
    }

    pub fn cooldown(&self, kind: AttackKind) -> f32 {
        self.cooldowns[kind.index()]
    }

    pub fn hit_stop(&self) -> f32 {
        self.hit_stop
    }

    /// Remaining screen-shake time from the last hit taken.
    pub fn shake(&self) -> f32 {
        self.shake
    }

    /// True for the tick an attack was started on.
    pub fn attack_started(&self) -> bool {
        self.attack_started
    }

    pub fn current_attack(&self) -> Option<AttackKind> {
        match self.state {
            FighterState::Attack(kind) => Some(kind),
            _ => None,
        }
    }

    /// Attacking with a clip that has not played out yet.
    pub fn is_mid_attack(&self) -> bool {
        self.current_attack().is_some() && !self.clip.is_finished()
    }

    pub fn is_vulnerable(&self) -> bool {
        !matches!(self.state, FighterState::Hit | FighterState::Death)
    }

    pub fn hurtbox(&self) -> Rect {
        rect_at(self.position.x - 50.0, self.position.y, 100.0, 160.0)
    }

    /// The damaging rectangle of the current attack, empty when not attacking.
    pub fn attack_hitbox(&self) -> Rect {
        match self.current_attack() {
            Some(kind) => kind.hitbox(self.position, self.facing_right),
            None => Rect::EMPTY,
        }
    }

    fn enter(&mut self, state: FighterState) {
        if self.state == state {
            return;
        }
        self.state = state;
        self.clip = AnimatedClip::new(state.clip());
    }

    /// Force a state and restart its clip even if it was already active.
    fn restart(&mut self, state: FighterState) {
        self.state = state;
        self.clip = AnimatedClip::new(state.clip());
    }

    pub fn advance(&mut self, delta_time: f32, intent: &FighterIntent, cues: &mut Vec<Cue>) {
        self.attack_started = false;

        if self.hit_stop > 0.0 {
            self.hit_stop -= delta_time;
            return;
        }

        for cooldown in &mut self.cooldowns {
            *cooldown = (*cooldown - delta_time).max(0.0);
        }
        self.block_cooldown = (self.block_cooldown - delta_time).max(0.0);
        self.shake = (self.shake - delta_time).max(0.0);

        match self.state {
            FighterState::Hit => {
                if self.clip.is_finished() {
                    let recovered = if self.grounded {
                        FighterState::Idle
                    } else {
                        FighterState::Fall
                    };
                    self.enter(recovered);
                }
            }
            FighterState::Death | FighterState::Victory => {}
            _ => self.handle_intent(intent, cues),
        }

        if self.state != FighterState::Death {
            self.integrate(delta_time);
        }

        self.clip.advance(delta_time);
        if self.current_attack().is_some() && self.clip.is_finished() {
            self.enter(FighterState::Idle);
        }
    }

    fn handle_intent(&mut self, intent: &FighterIntent, cues: &mut Vec<Cue>) {
        let attacking = self.is_mid_attack();
        let was_blocking = self.blocking;

        self.velocity.x = 0.0;
        if intent.right {
            self.velocity.x = WALK_SPEED;
            self.facing_right = true;
        } else if intent.left {
            self.velocity.x = -WALK_SPEED;
            self.facing_right = false;
        }

        self.blocking =
            intent.block && self.grounded && !attacking && self.block_cooldown <= 0.0;

        if self.blocking {
            self.velocity.x *= 0.5;
            self.enter(FighterState::Block);
        } else {
            if was_blocking {
                self.block_cooldown = BLOCK_COOLDOWN;
            }
            if self.grounded && !attacking {
                if self.velocity.x != 0.0 {
                    self.enter(FighterState::Walk);
                } else if matches!(self.state, FighterState::Walk | FighterState::Block) {
                    self.enter(FighterState::Idle);
                }
            }
        }

        if intent.jump && self.grounded && !attacking && !self.blocking {
            self.velocity.y = JUMP_IMPULSE;
            self.grounded = false;
            self.restart(FighterState::Jump);
            cues.push(Cue::Jumped {
                at: self.position + Vec2::new(0.0, 80.0),
            });
        }

        if self.blocking || attacking {
            return;
        }

        let chosen = AttackKind::PRIORITY.into_iter().find(|&kind| {
            let profile = kind.profile();
            intent.wants(kind)
                && self.cooldowns[kind.index()] <= 0.0
                && (!profile.ground_only || self.grounded)
        });
        if let Some(kind) = chosen {
            self.start_attack(kind, cues);
        }
    }

    fn start_attack(&mut self, kind: AttackKind, cues: &mut Vec<Cue>) {
        self.restart(FighterState::Attack(kind));
        self.cooldowns[kind.index()] = kind.profile().cooldown;
        self.combo += 1;
        self.max_combo = self.max_combo.max(self.combo);
        self.attack_started = true;

        let reach = if self.facing_right { 100.0 } else { -100.0 };
        cues.push(Cue::Swung {
            kind,
            at: self.position + Vec2::new(reach, 40.0),
            facing_right: self.facing_right,
        });
    }

    fn integrate(&mut self, delta_time: f32) {
        self.position += self.velocity * delta_time;
        if !self.grounded {
            self.velocity.y += GRAVITY * delta_time;
            if self.state == FighterState::Jump && self.velocity.y > 0.0 {
                self.enter(FighterState::Fall);
            }
        }

        if self.position.y >= GROUND_Y {
            self.position.y = GROUND_Y;
            self.velocity.y = 0.0;
            self.grounded = true;
            if matches!(self.state, FighterState::Jump | FighterState::Fall) {
                self.enter(FighterState::Idle);
            }
        }

        self.position.x = self.position.x.clamp(ARENA_MIN_X, ARENA_MAX_X);
    }

    /// Apply an incoming hit. Returns the damage actually taken after block
    /// reduction; a dead fighter takes nothing.
    pub fn take_damage(&mut self, amount: i32, cues: &mut Vec<Cue>) -> i32 {
        if self.is_dead() || amount <= 0 {
            return 0;
        }

        let mut amount = amount;
        if self.blocking {
            amount = (amount / 4).max(1);
            let guard_side = if self.facing_right { 50.0 } else { -50.0 };
            cues.push(Cue::Blocked {
                at: self.position + Vec2::new(guard_side, 50.0),
            });
        }

        let taken = self.health.take_damage(amount);
        self.combo = 0;
        if self.blocking {
            self.blocking = false;
            self.block_cooldown = BLOCK_COOLDOWN;
        }
        self.velocity.x = 0.0;

        let at = self.position + Vec2::new(0.0, 50.0);
        if self.health.is_depleted() {
            self.restart(FighterState::Death);
            self.velocity = Vec2::ZERO;
            cues.push(Cue::Died {
                side: Side::Player,
                at,
            });
        } else {
            self.restart(FighterState::Hit);
            self.hit_stop = HURT_HIT_STOP;
            self.shake = HURT_SHAKE;
            cues.push(Cue::Hurt {
                side: Side::Player,
                at,
            });
        }
        taken
    }

    pub fn add_score(&mut self, points: u32) {
        self.score += points * (self.combo + 1);
    }

    /// The opponent fell. Only a living fighter gets to celebrate.
    pub fn celebrate(&mut self) {
        if !self.is_dead() {
            self.velocity.x = 0.0;
            self.blocking = false;
            self.enter(FighterState::Victory);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn tick(fighter: &mut Swordsman, intent: FighterIntent) -> Vec<Cue> {
        let mut cues = Vec::new();
        fighter.advance(DT, &intent, &mut cues);
        cues
    }

    fn idle() -> FighterIntent {
        FighterIntent::default()
    }

    fn wait_out_attack(fighter: &mut Swordsman) {
        for _ in 0..600 {
            if fighter.current_attack().is_none() {
                return;
            }
            tick(fighter, idle());
        }
        panic!("attack never finished");
    }

    #[test]
    fn walking_moves_and_faces() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { left: true, ..idle() });
        assert_eq!(fighter.state(), FighterState::Walk);
        assert!(!fighter.facing_right);
        assert!(fighter.position.x < 320.0);

        tick(&mut fighter, idle());
        assert_eq!(fighter.state(), FighterState::Idle);
    }

    #[test]
    fn jump_rises_falls_and_lands() {
        let mut fighter = Swordsman::default();
        let cues = tick(&mut fighter, FighterIntent { jump: true, ..idle() });
        assert!(matches!(cues[0], Cue::Jumped { .. }));
        assert_eq!(fighter.state(), FighterState::Jump);
        assert!(!fighter.grounded);

        let mut saw_fall = false;
        for _ in 0..120 {
            tick(&mut fighter, idle());
            saw_fall |= fighter.state() == FighterState::Fall;
            if fighter.grounded {
                break;
            }
        }
        assert!(saw_fall);
        assert!(fighter.grounded);
        assert_eq!(fighter.position.y, GROUND_Y);
        assert_eq!(fighter.state(), FighterState::Idle);
    }

    #[test]
    fn stays_inside_arena() {
        let mut fighter = Swordsman::new(Vec2::new(ARENA_MIN_X + 1.0, GROUND_Y));
        for _ in 0..60 {
            tick(&mut fighter, FighterIntent { left: true, ..idle() });
        }
        assert_eq!(fighter.position.x, ARENA_MIN_X);
    }

    #[test]
    fn combo_counts_attack_starts_and_resets_on_damage() {
        let mut fighter = Swordsman::default();
        for n in 1..=4 {
            tick(&mut fighter, FighterIntent { light: true, ..idle() });
            assert_eq!(fighter.combo, n);
            wait_out_attack(&mut fighter);
        }
        assert_eq!(fighter.max_combo, 4);

        let mut cues = Vec::new();
        fighter.take_damage(10, &mut cues);
        assert_eq!(fighter.combo, 0);
        assert_eq!(fighter.max_combo, 4);
    }

    #[test]
    fn attack_cannot_be_interrupted_by_another_attack() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { light: true, ..idle() });
        assert_eq!(fighter.current_attack(), Some(AttackKind::Light));

        tick(&mut fighter, FighterIntent { heavy: true, ..idle() });
        assert_eq!(fighter.current_attack(), Some(AttackKind::Light));
        assert_eq!(fighter.combo, 1);
    }

    #[test]
    fn attack_cannot_be_interrupted_by_jump_or_block() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { light: true, ..idle() });
        tick(&mut fighter, FighterIntent { jump: true, block: true, ..idle() });
        assert_eq!(fighter.current_attack(), Some(AttackKind::Light));
        assert!(fighter.grounded);
        assert!(!fighter.is_blocking());
    }

    #[test]
    fn finisher_chord_beats_light_attack() {
        let mut fighter = Swordsman::default();
        tick(
            &mut fighter,
            FighterIntent {
                light: true,
                finisher: true,
                ..idle()
            },
        );
        assert_eq!(fighter.current_attack(), Some(AttackKind::Finisher));
    }

    #[test]
    fn airborne_finisher_falls_through_to_light() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { jump: true, ..idle() });
        tick(
            &mut fighter,
            FighterIntent {
                light: true,
                finisher: true,
                ..idle()
            },
        );
        assert_eq!(fighter.current_attack(), Some(AttackKind::Light));
    }

    #[test]
    fn cooling_down_attack_falls_through() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { heavy: true, ..idle() });
        wait_out_attack(&mut fighter);
        assert!(fighter.cooldown(AttackKind::Heavy) > 0.0);

        tick(
            &mut fighter,
            FighterIntent {
                heavy: true,
                light: true,
                ..idle()
            },
        );
        assert_eq!(fighter.current_attack(), Some(AttackKind::Light));
    }

    #[test]
    fn block_strictly_reduces_damage() {
        for amount in [1, 2, 3, 4, 5, 30, 50, 100] {
            let mut fighter = Swordsman::default();
            tick(&mut fighter, FighterIntent { block: true, ..idle() });
            assert!(fighter.is_blocking());
            let mut cues = Vec::new();
            let taken = fighter.take_damage(amount, &mut cues);
            assert!(taken > 0 && taken <= amount, "amount {amount} took {taken}");
            if amount >= 4 {
                assert!(taken < amount);
            }
        }
    }

    #[test]
    fn block_halves_movement_and_cools_down_on_release() {
        let mut fighter = Swordsman::default();
        tick(
            &mut fighter,
            FighterIntent {
                block: true,
                right: true,
                ..idle()
            },
        );
        assert_eq!(fighter.state(), FighterState::Block);
        assert_eq!(fighter.velocity.x, WALK_SPEED * 0.5);

        tick(&mut fighter, idle());
        assert_eq!(fighter.state(), FighterState::Idle);
        tick(&mut fighter, FighterIntent { block: true, ..idle() });
        assert!(!fighter.is_blocking());

        for _ in 0..30 {
            tick(&mut fighter, idle());
        }
        tick(&mut fighter, FighterIntent { block: true, ..idle() });
        assert!(fighter.is_blocking());
    }

    #[test]
    fn block_requires_ground() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { jump: true, ..idle() });
        tick(&mut fighter, FighterIntent { block: true, ..idle() });
        assert!(!fighter.is_blocking());
    }

    #[test]
    fn hit_sets_hit_stop_and_freezes_advance() {
        let mut fighter = Swordsman::default();
        let mut cues = Vec::new();
        fighter.take_damage(30, &mut cues);
        assert_eq!(fighter.state(), FighterState::Hit);
        assert_eq!(fighter.hit_stop(), HURT_HIT_STOP);
        assert_eq!(fighter.shake(), HURT_SHAKE);

        let x = fighter.position.x;
        tick(&mut fighter, FighterIntent { right: true, ..idle() });
        assert_eq!(fighter.position.x, x);
        assert_eq!(fighter.clip().frame_index, 0);
    }

    #[test]
    fn airborne_hit_keeps_falling_and_recovers_into_fall() {
        let start_y = GROUND_Y - 300.0;
        let mut fighter = Swordsman::new(Vec2::new(320.0, start_y));
        assert!(!fighter.grounded);
        let mut cues = Vec::new();
        fighter.take_damage(10, &mut cues);

        let mut ticks = 0;
        while fighter.state() == FighterState::Hit {
            tick(&mut fighter, idle());
            ticks += 1;
            assert!(ticks < 60, "hit reaction never ended");
        }
        assert_eq!(fighter.state(), FighterState::Fall);
        assert!(!fighter.grounded);
        assert!(fighter.position.y > start_y);

        for _ in 0..120 {
            tick(&mut fighter, idle());
        }
        assert!(fighter.grounded);
        assert_eq!(fighter.position.y, GROUND_Y);
        assert_eq!(fighter.state(), FighterState::Idle);
    }

    #[test]
    fn block_broken_by_hit_starts_cooldown() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { block: true, ..idle() });
        assert!(fighter.is_blocking());

        let mut cues = Vec::new();
        fighter.take_damage(40, &mut cues);
        assert!(!fighter.is_blocking());
        assert_eq!(fighter.block_cooldown, BLOCK_COOLDOWN);
    }

    #[test]
    fn hit_preempts_attack_then_recovers() {
        let mut fighter = Swordsman::default();
        tick(&mut fighter, FighterIntent { whirlwind: true, ..idle() });
        let mut cues = Vec::new();
        fighter.take_damage(10, &mut cues);
        assert_eq!(fighter.state(), FighterState::Hit);

        for _ in 0..120 {
            tick(&mut fighter, idle());
        }
        assert_eq!(fighter.state(), FighterState::Idle);
    }

    #[test]
    fn death_is_terminal() {
        let mut fighter = Swordsman::default();
        let mut cues = Vec::new();
        fighter.take_damage(PLAYER_MAX_HEALTH, &mut cues);
        assert_eq!(fighter.state(), FighterState::Death);
        assert_eq!(fighter.health.current(), 0);
        assert!(matches!(cues.last(), Some(Cue::Died { side: Side::Player, .. })));

        let position = fighter.position;
        for _ in 0..120 {
            tick(
                &mut fighter,
                FighterIntent {
                    right: true,
                    jump: true,
                    light: true,
                    ..idle()
                },
            );
        }
        assert_eq!(fighter.state(), FighterState::Death);
        assert_eq!(fighter.position, position);
        assert_eq!(fighter.take_damage(50, &mut cues), 0);
    }

    #[test]
    fn death_iff_health_reaches_zero() {
        let mut fighter = Swordsman::default();
        let mut cues = Vec::new();
        fighter.take_damage(PLAYER_MAX_HEALTH - 1, &mut cues);
        assert_ne!(fighter.state(), FighterState::Death);
        fighter.hit_stop = 0.0;
        fighter.take_damage(1, &mut cues);
        assert_eq!(fighter.state(), FighterState::Death);
    }

    #[test]
    fn score_scales_with_combo() {
        let mut fighter = Swordsman::default();
        fighter.add_score(200);
        assert_eq!(fighter.score, 200);
        fighter.combo = 2;
        fighter.add_score(200);
        assert_eq!(fighter.score, 800);
    }

    #[test]
    fn hitbox_empty_unless_attacking() {
        let mut fighter = Swordsman::default();
        assert!(fighter.attack_hitbox().is_empty());
        tick(&mut fighter, FighterIntent { light: true, ..idle() });
        assert!(!fighter.attack_hitbox().is_empty());
    }

    #[test]
    fn celebrate_only_when_alive() {
        let mut fighter = Swordsman::default();
        fighter.celebrate();
        assert_eq!(fighter.state(), FighterState::Victory);
        tick(&mut fighter, FighterIntent { light: true, ..idle() });
        assert_eq!(fighter.state(), FighterState::Victory);
    }
}
