//! Move tables for both fighters.
//!
//! Every per-move number (damage, cooldown, hitbox footprint, sprite sheet)
//! lives here, so the update, draw and hitbox paths all read the same row.

use bevy::prelude::*;

use crate::animation::ClipId;

/// Damage of a plain sword hit before the move multiplier.
pub const BASE_DAMAGE: i32 = 20;

/// Score awarded per point of damage dealt, before the combo multiplier.
pub const POINTS_PER_DAMAGE: i32 = 10;

/// Build a rectangle from a top-left corner and a size, screen style.
pub fn rect_at(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect {
        min: Vec2::new(x, y),
        max: Vec2::new(x + width, y + height),
    }
}

// =============================================================================
// Player attacks
// =============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum AttackKind {
    Light,
    Heavy,
    Whirlwind,
    Barrage,
    Finisher,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct AttackProfile {
    pub label: &'static str,
    pub multiplier: i32,
    pub cooldown: f32,
    pub ground_only: bool,
    pub clip: ClipId,
    /// Hitbox x offset from the fighter's x when facing right / left.
    pub reach_right: f32,
    pub reach_left: f32,
    pub reach_y: f32,
    pub width: f32,
    pub height: f32,
    /// Vertical offset of the sprite's top edge relative to the fighter.
    pub draw_offset_y: f32,
}

const LIGHT: AttackProfile = AttackProfile {
    label: "Slash",
    multiplier: 1,
    cooldown: 0.2,
    ground_only: false,
    clip: ClipId::SwordLight,
    reach_right: 50.0,
    reach_left: -150.0,
    reach_y: 0.0,
    width: 100.0,
    height: 100.0,
    draw_offset_y: 0.0,
};

const HEAVY: AttackProfile = AttackProfile {
    label: "Demon Cut",
    multiplier: 2,
    cooldown: 1.0,
    ground_only: true,
    clip: ClipId::SwordHeavy,
    reach_right: 50.0,
    reach_left: -200.0,
    reach_y: -50.0,
    width: 150.0,
    height: 150.0,
    draw_offset_y: -50.0,
};

const WHIRLWIND: AttackProfile = AttackProfile {
    label: "Whirlwind",
    multiplier: 3,
    cooldown: 2.0,
    ground_only: true,
    clip: ClipId::SwordWhirlwind,
    reach_right: 0.0,
    reach_left: -300.0,
    reach_y: 0.0,
    width: 300.0,
    height: 150.0,
    draw_offset_y: 0.0,
};

const BARRAGE: AttackProfile = AttackProfile {
    label: "Thousand Cuts",
    multiplier: 4,
    cooldown: 3.0,
    ground_only: false,
    clip: ClipId::SwordBarrage,
    reach_right: 0.0,
    reach_left: -300.0,
    reach_y: -30.0,
    width: 300.0,
    height: 130.0,
    draw_offset_y: -30.0,
};

const FINISHER: AttackProfile = AttackProfile {
    label: "Dragon Flame",
    multiplier: 5,
    cooldown: 5.0,
    ground_only: true,
    clip: ClipId::SwordFinisher,
    reach_right: 0.0,
    reach_left: -400.0,
    reach_y: -100.0,
    width: 400.0,
    height: 256.0,
    draw_offset_y: -80.0,
};

impl AttackKind {
    pub const ALL: [AttackKind; 5] = [
        AttackKind::Light,
        AttackKind::Heavy,
        AttackKind::Whirlwind,
        AttackKind::Barrage,
        AttackKind::Finisher,
    ];

    /// Order in which simultaneous attack intents are considered. The first
    /// eligible one wins; ineligible ones fall through to the next.
    pub const PRIORITY: [AttackKind; 5] = [
        AttackKind::Finisher,
        AttackKind::Barrage,
        AttackKind::Whirlwind,
        AttackKind::Heavy,
        AttackKind::Light,
    ];

    pub fn profile(self) -> &'static AttackProfile {
        match self {
            AttackKind::Light => &LIGHT,
            AttackKind::Heavy => &HEAVY,
            AttackKind::Whirlwind => &WHIRLWIND,
            AttackKind::Barrage => &BARRAGE,
            AttackKind::Finisher => &FINISHER,
        }
    }

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn damage(self) -> i32 {
        BASE_DAMAGE * self.profile().multiplier
    }

    /// World-space hitbox for a fighter standing at `origin`.
    pub fn hitbox(self, origin: Vec2, facing_right: bool) -> Rect {
        let p = self.profile();
        let dx = if facing_right { p.reach_right } else { p.reach_left };
        rect_at(origin.x + dx, origin.y + p.reach_y, p.width, p.height)
    }
}

// =============================================================================
// Boss specials
// =============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum SpecialKind {
    Hado,
    SpiritSlash,
    MirrorVeil,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct SpecialProfile {
    pub label: &'static str,
    pub damage: i32,
    /// Time before the special can be cast again, measured from the cast.
    pub cooldown: f32,
    /// `Some` for specials that run on a timer instead of until their clip ends.
    pub duration: Option<f32>,
    pub anchor: Vec2,
    pub size: Vec2,
    /// Horizontal travel speed along the caster's facing.
    pub speed: f32,
    /// Relative chance of being picked when the brain decides to attack.
    pub weight: u32,
    pub clip: ClipId,
    pub tint: Color,
}

const HADO: SpecialProfile = SpecialProfile {
    label: "Hado",
    damage: 30,
    cooldown: 0.0,
    duration: None,
    anchor: Vec2::new(-100.0, -50.0),
    size: Vec2::new(120.0, 120.0),
    speed: 400.0,
    weight: 40,
    clip: ClipId::HadoBlast,
    tint: Color::srgba(1.0, 0.39, 0.39, 0.78),
};

const SPIRIT_SLASH: SpecialProfile = SpecialProfile {
    label: "Spirit Slash",
    damage: 100,
    cooldown: 10.0,
    duration: None,
    anchor: Vec2::new(-100.0, -50.0),
    size: Vec2::new(89.0, 102.0),
    speed: 0.0,
    weight: 30,
    clip: ClipId::SpiritSlash,
    tint: Color::srgba(0.78, 0.59, 1.0, 0.86),
};

const MIRROR_VEIL: SpecialProfile = SpecialProfile {
    label: "Mirror Veil",
    damage: 50,
    cooldown: 0.0,
    duration: Some(3.0),
    anchor: Vec2::new(-200.0, -100.0),
    size: Vec2::new(88.0, 110.0),
    speed: 0.0,
    weight: 30,
    clip: ClipId::MirrorVeil,
    tint: Color::WHITE,
};

impl SpecialKind {
    pub const ALL: [SpecialKind; 3] = [
        SpecialKind::Hado,
        SpecialKind::SpiritSlash,
        SpecialKind::MirrorVeil,
    ];

    pub fn profile(self) -> &'static SpecialProfile {
        match self {
            SpecialKind::Hado => &HADO,
            SpecialKind::SpiritSlash => &SPIRIT_SLASH,
            SpecialKind::MirrorVeil => &MIRROR_VEIL,
        }
    }
}

// =============================================================================
// Cues
// =============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Side {
    Player,
    Boss,
}

/// Things a fighter did this tick that the scene may want to show or play.
///
/// Fighters only record cues; turning them into particles and sounds is the
/// scene's business.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum Cue {
    Jumped { at: Vec2 },
    Swung { kind: AttackKind, at: Vec2, facing_right: bool },
    Blocked { at: Vec2 },
    Guarded { at: Vec2 },
    Hurt { side: Side, at: Vec2 },
    Died { side: Side, at: Vec2 },
    Cast { special: SpecialKind, at: Vec2 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multipliers_rise_with_priority() {
        let mults: Vec<i32> = AttackKind::PRIORITY
            .iter()
            .map(|kind| kind.profile().multiplier)
            .collect();
        assert_eq!(mults, vec![5, 4, 3, 2, 1]);
    }

    #[test]
    fn finisher_deals_five_times_base() {
        assert_eq!(AttackKind::Finisher.damage(), 100);
        assert_eq!(AttackKind::Light.damage(), BASE_DAMAGE);
    }

    #[test]
    fn hitbox_mirrors_with_facing() {
        let origin = Vec2::new(500.0, 430.0);
        let right = AttackKind::Light.hitbox(origin, true);
        let left = AttackKind::Light.hitbox(origin, false);
        assert_eq!(right, rect_at(550.0, 430.0, 100.0, 100.0));
        assert_eq!(left, rect_at(350.0, 430.0, 100.0, 100.0));
    }

    #[test]
    fn special_weights_sum_to_hundred() {
        let total: u32 = SpecialKind::ALL.iter().map(|s| s.profile().weight).sum();
        assert_eq!(total, 100);
    }
}
