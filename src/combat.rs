//! Hitbox against hurtbox resolution for one duel tick.

use bevy::prelude::*;

use crate::boss::Boss;
use crate::fighter::Swordsman;
use crate::moves::{Cue, POINTS_PER_DAMAGE};

/// Whole-scene freeze applied after any landed hit.
pub const IMPACT_HIT_STOP: f32 = 0.05;

/// Strict axis-aligned overlap. Touching edges do not count, and an empty
/// rectangle never overlaps anything.
pub fn overlaps(a: Rect, b: Rect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.min.x < b.max.x && a.max.x > b.min.x && a.min.y < b.max.y && a.max.y > b.min.y
}

#[derive(Debug, Default, Copy, Clone, PartialEq)]
pub struct Exchange {
    /// Damage the boss took this tick.
    pub dealt: i32,
    /// Damage the player took this tick, summed over every effect that landed.
    pub received: i32,
    pub hit_stop: f32,
}

/// Resolve every overlap for this tick.
///
/// The player's vulnerability is sampled once up front, so two specials that
/// both overlap on the same tick each apply. Effects left in flight after the
/// boss dies no longer hurt.
pub fn resolve(player: &mut Swordsman, boss: &mut Boss, cues: &mut Vec<Cue>) -> Exchange {
    let mut exchange = Exchange::default();

    if let Some(kind) = player.current_attack() {
        if boss.is_vulnerable() && overlaps(player.attack_hitbox(), boss.hurtbox()) {
            // Points follow the swing's full damage, not what got through.
            let taken = boss.take_damage(kind.damage(), cues);
            player.add_score(kind.damage() as u32 * POINTS_PER_DAMAGE as u32);
            exchange.dealt += taken;
            exchange.hit_stop = IMPACT_HIT_STOP;
            debug!("{} hit for {}", kind.profile().label, taken);
        }
    }

    if boss.is_dead() {
        return exchange;
    }

    let player_vulnerable = player.is_vulnerable();
    let hurtbox = player.hurtbox();
    for effect in &mut boss.effects {
        if !player_vulnerable || !overlaps(effect.bounds(), hurtbox) {
            continue;
        }
        let taken = player.take_damage(effect.damage(), cues);
        effect.mark_landed();
        exchange.received += taken;
        exchange.hit_stop = IMPACT_HIT_STOP;
        debug!("{} landed for {}", effect.kind.profile().label, taken);
    }

    exchange
}
