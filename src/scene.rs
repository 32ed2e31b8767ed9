//! Top-level mode flow.
//!
//! Bevy's `States` does the actual switching; the [`Director`] sits in front of
//! it and decides whether a request switches right away or after a fade.
//! Anything that wants a different mode goes through [`Director::request`].

use bevy::prelude::*;

pub const SCREEN_WIDTH: f32 = 1280.0;
pub const SCREEN_HEIGHT: f32 = 720.0;
/// Alpha gained per second while fading, so a fade lasts half a second.
pub const FADE_RATE: f32 = 2.0;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<SceneMode>()
            .init_resource::<Director>()
            .init_resource::<Arena>()
            .add_systems(Startup, (spawn_camera, spawn_fade_overlay))
            .add_systems(First, advance_fade)
            .add_systems(Update, paint_fade_overlay)
            .add_systems(OnEnter(SceneMode::Exit), quit);
    }
}

#[derive(States, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SceneMode {
    #[default]
    Intro,
    Menu,
    Gameplay,
    Options,
    Credits,
    HighScores,
    Help,
    Exit,
}

/// Which game `SceneMode::Gameplay` runs.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arena {
    #[default]
    Duel,
    Runner,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Fade {
    target: SceneMode,
    alpha: f32,
}

#[derive(Resource, Debug, Default)]
pub struct Director {
    fade: Option<Fade>,
}

fn needs_fade(from: SceneMode, to: SceneMode) -> bool {
    from == SceneMode::Gameplay || to == SceneMode::Gameplay
}

impl Director {
    /// Ask to move from `current` to `target`. Returns the mode to switch to
    /// now, or `None` when the switch waits for a fade (or another fade is
    /// already running).
    pub fn request(&mut self, current: SceneMode, target: SceneMode) -> Option<SceneMode> {
        if self.fade.is_some() || current == target {
            return None;
        }
        if needs_fade(current, target) {
            self.fade = Some(Fade { target, alpha: 0.0 });
            None
        } else {
            Some(target)
        }
    }

    /// Request and, for immediate transitions, queue the state change.
    pub fn go(&mut self, current: SceneMode, target: SceneMode, next: &mut NextState<SceneMode>) {
        if let Some(mode) = self.request(current, target) {
            info!("Mode {:?} -> {:?}", current, mode);
            next.set(mode);
        }
    }

    /// Ramp the fade; returns the target once the screen is fully dark.
    pub fn advance(&mut self, delta_time: f32) -> Option<SceneMode> {
        let fade = self.fade.as_mut()?;
        fade.alpha += delta_time * FADE_RATE;
        if fade.alpha < 1.0 {
            return None;
        }
        let target = fade.target;
        self.fade = None;
        Some(target)
    }

    pub fn is_fading(&self) -> bool {
        self.fade.is_some()
    }

    pub fn alpha(&self) -> f32 {
        self.fade.map(|f| f.alpha.min(1.0)).unwrap_or(0.0)
    }
}

/// Run condition: mode logic is paused while a fade is in progress.
pub fn not_fading(director: Res<Director>) -> bool {
    !director.is_fading()
}

/// Screen coordinates (origin top-left, y down) to world coordinates
/// (origin centre, y up) for the default 2D camera.
pub fn screen_to_world(point: Vec2) -> Vec2 {
    Vec2::new(point.x - SCREEN_WIDTH / 2.0, SCREEN_HEIGHT / 2.0 - point.y)
}

/// World transform for a sprite whose top-left corner sits at `top_left`.
pub fn sprite_transform(top_left: Vec2, size: Vec2, z: f32) -> Transform {
    Transform::from_translation(screen_to_world(top_left + size / 2.0).extend(z))
}

#[derive(Component)]
pub struct MainCamera;

fn spawn_camera(mut commands: Commands) {
    commands.spawn((Camera2d, MainCamera));
}

#[derive(Component)]
struct FadeOverlay;

fn spawn_fade_overlay(mut commands: Commands) {
    commands.spawn((
        Node {
            position_type: PositionType::Absolute,
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            ..default()
        },
        BackgroundColor(Color::NONE),
        GlobalZIndex(100),
        FadeOverlay,
    ));
}

fn advance_fade(
    time: Res<Time>,
    state: Res<State<SceneMode>>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    if let Some(mode) = director.advance(time.delta_secs()) {
        info!("Mode {:?} -> {:?} (after fade)", state.get(), mode);
        next.set(mode);
    }
}

fn paint_fade_overlay(
    director: Res<Director>,
    mut overlay: Query<&mut BackgroundColor, With<FadeOverlay>>,
) {
    for mut color in &mut overlay {
        color.0 = Color::BLACK.with_alpha(director.alpha());
    }
}

fn quit(mut exit: MessageWriter<AppExit>) {
    info!("Exit selected");
    exit.write(AppExit::Success);
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn menu_screens_switch_immediately() {
        let mut director = Director::default();
        assert_eq!(
            director.request(SceneMode::Menu, SceneMode::Options),
            Some(SceneMode::Options)
        );
        assert!(!director.is_fading());
    }

    #[test]
    fn gameplay_transitions_fade_for_half_a_second() {
        for (from, to) in [
            (SceneMode::Menu, SceneMode::Gameplay),
            (SceneMode::Gameplay, SceneMode::Menu),
        ] {
            let mut director = Director::default();
            assert_eq!(director.request(from, to), None);
            assert!(director.is_fading());

            let mut elapsed = 0.0;
            let arrived = loop {
                elapsed += DT;
                if let Some(mode) = director.advance(DT) {
                    break mode;
                }
                assert!(elapsed < 1.0);
            };
            assert_eq!(arrived, to);
            assert!((elapsed - 0.5).abs() < 2.0 * DT);
            assert!(!director.is_fading());
        }
    }

    #[test]
    fn requests_during_a_fade_are_ignored() {
        let mut director = Director::default();
        director.request(SceneMode::Menu, SceneMode::Gameplay);
        assert_eq!(director.request(SceneMode::Menu, SceneMode::Options), None);
        director.advance(0.1);
        assert!(director.alpha() > 0.0 && director.alpha() < 1.0);
    }

    #[test]
    fn screen_mapping_centres_the_origin() {
        assert_eq!(screen_to_world(Vec2::new(640.0, 360.0)), Vec2::ZERO);
        assert_eq!(screen_to_world(Vec2::ZERO), Vec2::new(-640.0, 360.0));
    }
}
