//! Player-tunable settings and the one-line `config.txt` they live in.

use std::path::{Path, PathBuf};

use anyhow::Context;
use bevy::prelude::*;
use bevy::window::{MonitorSelection, PresentMode, PrimaryWindow, WindowMode};

use crate::ai::Difficulty;
use crate::save_load::storage;

pub const CONFIG_FILE: &str = "config.txt";

pub struct ConfigPlugin;

impl Plugin for ConfigPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_config)
            .add_systems(
                Update,
                apply_window_settings.run_if(resource_changed::<GameConfig>),
            )
            .add_systems(Last, save_config_on_exit);
    }
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct GameConfig {
    pub music_volume: f32,
    pub sfx_volume: f32,
    /// Multiplier on simulation time in the duel.
    pub game_speed: f32,
    pub fullscreen: bool,
    pub vsync: bool,
    pub difficulty: Difficulty,
    path: PathBuf,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            music_volume: 0.5,
            sfx_volume: 0.7,
            game_speed: 1.0,
            fullscreen: false,
            vsync: true,
            difficulty: Difficulty::Normal,
            path: PathBuf::from(CONFIG_FILE),
        }
    }
}

pub const VOLUME_STEP: f32 = 0.1;
const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 3.0;

impl GameConfig {
    /// Read `path`; a missing or unreadable file yields the defaults.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut config = match storage::read_text(&path) {
            Some(text) => match parse_config(&text) {
                Ok(config) => {
                    info!("Loaded config from {:?}: {:?}", path, config);
                    config
                }
                Err(e) => {
                    warn!("Ignoring bad config {:?}: {:#}. Using defaults.", path, e);
                    GameConfig::default()
                }
            },
            None => GameConfig::default(),
        };
        config.path = path;
        config
    }

    pub fn save(&self) {
        storage::write(&self.path, render_config(self).as_bytes());
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn nudge_music(&mut self, steps: f32) {
        self.music_volume = step_volume(self.music_volume, steps);
    }

    pub fn nudge_sfx(&mut self, steps: f32) {
        self.sfx_volume = step_volume(self.sfx_volume, steps);
    }

    fn clamp(&mut self) {
        self.music_volume = self.music_volume.clamp(0.0, 1.0);
        self.sfx_volume = self.sfx_volume.clamp(0.0, 1.0);
        self.game_speed = self.game_speed.clamp(MIN_SPEED, MAX_SPEED);
    }
}

/// Move a volume by whole steps of 0.1, snapping to one decimal so repeated
/// presses land on the values the options screen shows.
fn step_volume(volume: f32, steps: f32) -> f32 {
    let stepped = volume + steps * VOLUME_STEP;
    ((stepped * 10.0).round() / 10.0).clamp(0.0, 1.0)
}

fn parse_flag(token: &str) -> anyhow::Result<bool> {
    match token {
        "0" | "false" => Ok(false),
        "1" | "true" => Ok(true),
        other => anyhow::bail!("expected 0 or 1, found {:?}", other),
    }
}

/// Positional: `music sfx speed fullscreen vsync difficulty`. Fields that are
/// missing keep their defaults; a field that is present but unparsable fails
/// the whole line.
pub fn parse_config(text: &str) -> anyhow::Result<GameConfig> {
    let mut config = GameConfig::default();
    let mut tokens = text.split_whitespace();

    if let Some(token) = tokens.next() {
        config.music_volume = token.parse().context("music volume")?;
    }
    if let Some(token) = tokens.next() {
        config.sfx_volume = token.parse().context("sfx volume")?;
    }
    if let Some(token) = tokens.next() {
        config.game_speed = token.parse().context("game speed")?;
    }
    if let Some(token) = tokens.next() {
        config.fullscreen = parse_flag(token).context("fullscreen")?;
    }
    if let Some(token) = tokens.next() {
        config.vsync = parse_flag(token).context("vsync")?;
    }
    if let Some(token) = tokens.next() {
        let level: i64 = token.parse().context("difficulty")?;
        config.difficulty = Difficulty::from_level(level);
    }

    anyhow::ensure!(
        config.music_volume.is_finite() && config.sfx_volume.is_finite() && config.game_speed.is_finite(),
        "non-finite value"
    );
    config.clamp();
    Ok(config)
}

pub fn render_config(config: &GameConfig) -> String {
    format!(
        "{} {} {} {} {} {}",
        config.music_volume,
        config.sfx_volume,
        config.game_speed,
        u8::from(config.fullscreen),
        u8::from(config.vsync),
        config.difficulty.level()
    )
}

fn load_config(mut commands: Commands) {
    commands.insert_resource(GameConfig::load(CONFIG_FILE));
}

fn apply_window_settings(
    config: Res<GameConfig>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let Ok(mut window) = windows.single_mut() else {
        return;
    };
    let mode = if config.fullscreen {
        WindowMode::BorderlessFullscreen(MonitorSelection::Current)
    } else {
        WindowMode::Windowed
    };
    if window.mode != mode {
        window.mode = mode;
    }
    let present_mode = if config.vsync {
        PresentMode::AutoVsync
    } else {
        PresentMode::AutoNoVsync
    };
    if window.present_mode != present_mode {
        window.present_mode = present_mode;
    }
}

fn save_config_on_exit(mut exits: MessageReader<AppExit>, config: Option<Res<GameConfig>>) {
    if exits.read().next().is_some() {
        if let Some(config) = config {
            config.save();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_line_parses() {
        let config = parse_config("0.3 0.9 1.5 1 0 2").unwrap();
        assert_eq!(config.music_volume, 0.3);
        assert_eq!(config.sfx_volume, 0.9);
        assert_eq!(config.game_speed, 1.5);
        assert!(config.fullscreen);
        assert!(!config.vsync);
        assert_eq!(config.difficulty, Difficulty::Hard);
    }

    #[test]
    fn partial_line_keeps_defaults() {
        let config = parse_config("0.2 0.4").unwrap();
        let defaults = GameConfig::default();
        assert_eq!(config.music_volume, 0.2);
        assert_eq!(config.sfx_volume, 0.4);
        assert_eq!(config.game_speed, defaults.game_speed);
        assert_eq!(config.vsync, defaults.vsync);
        assert_eq!(config.difficulty, defaults.difficulty);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(parse_config("loud quiet").is_err());
        assert!(parse_config("0.5 0.5 1 maybe").is_err());
        assert!(parse_config("NaN").is_err());
    }

    #[test]
    fn values_are_clamped() {
        let config = parse_config("4 -1 10 0 1 7").unwrap();
        assert_eq!(config.music_volume, 1.0);
        assert_eq!(config.sfx_volume, 0.0);
        assert_eq!(config.game_speed, MAX_SPEED);
        assert_eq!(config.difficulty, Difficulty::Hard);
    }

    #[test]
    fn volume_steps_snap_and_clamp() {
        let mut config = GameConfig::default();
        for _ in 0..3 {
            config.nudge_music(1.0);
        }
        assert_eq!(config.music_volume, 0.8);
        for _ in 0..20 {
            config.nudge_sfx(-1.0);
        }
        assert_eq!(config.sfx_volume, 0.0);
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        let mut config = GameConfig::load(&path);
        assert_eq!(config.music_volume, GameConfig::default().music_volume);

        config.music_volume = 0.1;
        config.fullscreen = true;
        config.difficulty = Difficulty::Easy;
        config.save();

        let reloaded = GameConfig::load(&path);
        assert_eq!(reloaded, config);
    }

    #[test]
    fn garbage_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.txt");
        std::fs::write(&path, "this is not a config").unwrap();
        let config = GameConfig::load(&path);
        assert_eq!(config.sfx_volume, GameConfig::default().sfx_volume);
        assert_eq!(config.path(), path.as_path());
    }
}
