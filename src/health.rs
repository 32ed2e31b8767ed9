use bevy::prelude::*;

use crate::scene::SceneMode;

/// Current and maximum hit points.
///
/// `current` never leaves `[0, max]`; every mutation goes through
/// [`Health::take_damage`].
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Health {
    current: i32,
    max: i32,
}

impl Health {
    pub fn new(max: i32) -> Self {
        let max = max.max(1);
        Self { current: max, max }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    pub fn is_depleted(&self) -> bool {
        self.current == 0
    }

    pub fn fraction(&self) -> f32 {
        self.current as f32 / self.max as f32
    }

    /// Subtract `amount` (negative amounts are ignored) and return how much was
    /// actually removed.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let before = self.current;
        self.current = (self.current - amount.max(0)).max(0);
        before - self.current
    }
}

// =============================================================================
// HUD bars
// =============================================================================

pub const BAR_WIDTH: f32 = 300.0;
pub const BAR_HEIGHT: f32 = 25.0;

#[derive(Component, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum BarOwner {
    Player,
    Boss,
}

/// The coloured part of a bar; its width tracks the owner's health.
#[derive(Component)]
pub struct HealthBarFill(pub BarOwner);

/// The "current/max" readout drawn on top of the bar.
#[derive(Component)]
pub struct HealthBarText(pub BarOwner);

/// Red at empty, green at full.
pub fn bar_color(fraction: f32) -> Color {
    let low = Srgba::rgb_u8(230, 41, 55);
    let high = Srgba::rgb_u8(0, 228, 48);
    let t = fraction.clamp(0.0, 1.0);
    Color::srgb(
        low.red + (high.red - low.red) * t,
        low.green + (high.green - low.green) * t,
        low.blue + (high.blue - low.blue) * t,
    )
}

/// Spawn a labelled health bar anchored to the top-left (player) or
/// top-right (boss) corner. Lives as long as the gameplay mode.
pub fn spawn_health_bar(commands: &mut Commands, owner: BarOwner, label: &str) {
    let mut frame = Node {
        position_type: PositionType::Absolute,
        top: Val::Px(45.0),
        width: Val::Px(BAR_WIDTH + 4.0),
        height: Val::Px(BAR_HEIGHT + 4.0),
        border: UiRect::all(Val::Px(2.0)),
        ..default()
    };
    match owner {
        BarOwner::Player => frame.left = Val::Px(18.0),
        BarOwner::Boss => frame.right = Val::Px(18.0),
    }

    let mut caption = Node {
        position_type: PositionType::Absolute,
        top: Val::Px(18.0),
        ..default()
    };
    match owner {
        BarOwner::Player => caption.left = Val::Px(20.0),
        BarOwner::Boss => caption.right = Val::Px(20.0),
    }

    commands.spawn((
        Text::new(label),
        TextFont {
            font_size: 20.0,
            ..default()
        },
        TextColor(Color::WHITE),
        caption,
        DespawnOnExit(SceneMode::Gameplay),
    ));

    commands
        .spawn((
            frame,
            BackgroundColor(Color::srgba_u8(30, 30, 30, 200)),
            BorderColor::all(Color::WHITE),
            DespawnOnExit(SceneMode::Gameplay),
        ))
        .with_children(|parent| {
            parent.spawn((
                Node {
                    width: Val::Percent(100.0),
                    height: Val::Percent(100.0),
                    ..default()
                },
                BackgroundColor(bar_color(1.0)),
                HealthBarFill(owner),
            ));
            parent.spawn((
                Text::new(""),
                TextFont {
                    font_size: 18.0,
                    ..default()
                },
                TextColor(Color::WHITE),
                Node {
                    position_type: PositionType::Absolute,
                    right: Val::Px(6.0),
                    top: Val::Px(2.0),
                    ..default()
                },
                HealthBarText(owner),
            ));
        });
}

pub fn paint_health_bar(health: &Health, fill: &mut Node, color: &mut BackgroundColor) {
    let fraction = health.fraction();
    fill.width = Val::Percent(fraction * 100.0);
    color.0 = bar_color(fraction);
}

pub fn health_readout(health: &Health) -> String {
    format!("{}/{}", health.current(), health.max())
}
