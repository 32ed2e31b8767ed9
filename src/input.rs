//! Keyboard (and mouse) bindings mapped onto the intents the simulations read.

use bevy::prelude::*;

use crate::fighter::FighterIntent;
use crate::runner::RunnerIntent;

/// Navigation shared by every menu-like screen.
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct MenuIntent {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub confirm: bool,
    pub cancel: bool,
}

pub fn menu_intent(keys: &ButtonInput<KeyCode>) -> MenuIntent {
    MenuIntent {
        up: keys.just_pressed(KeyCode::ArrowUp),
        down: keys.just_pressed(KeyCode::ArrowDown),
        left: keys.just_pressed(KeyCode::ArrowLeft),
        right: keys.just_pressed(KeyCode::ArrowRight),
        confirm: keys.just_pressed(KeyCode::Enter) || keys.just_pressed(KeyCode::NumpadEnter),
        cancel: keys.just_pressed(KeyCode::Escape),
    }
}

pub fn fighter_intent(keys: &ButtonInput<KeyCode>) -> FighterIntent {
    FighterIntent {
        left: keys.pressed(KeyCode::ArrowLeft),
        right: keys.pressed(KeyCode::ArrowRight),
        jump: keys.just_pressed(KeyCode::Space),
        block: keys.pressed(KeyCode::KeyA),
        light: keys.just_pressed(KeyCode::KeyJ),
        heavy: keys.just_pressed(KeyCode::KeyK),
        whirlwind: keys.just_pressed(KeyCode::KeyL),
        barrage: keys.just_pressed(KeyCode::KeyO),
        // Chord: both held, with at least one of them pressed this frame so
        // holding the pair does not re-fire every time the cooldown ends.
        finisher: keys.all_pressed([KeyCode::KeyU, KeyCode::KeyI])
            && keys.any_just_pressed([KeyCode::KeyU, KeyCode::KeyI]),
    }
}

pub fn runner_intent(keys: &ButtonInput<KeyCode>, mouse: &ButtonInput<MouseButton>) -> RunnerIntent {
    RunnerIntent {
        jump: keys.any_just_pressed([KeyCode::Space, KeyCode::KeyW]),
        slash: keys.just_pressed(KeyCode::KeyA) || mouse.just_pressed(MouseButton::Left),
    }
}
