use bevy::asset::LoadState;
use bevy::{audio::Volume, prelude::*};

use crate::config::GameConfig;

pub struct AudioPlugin;

impl Plugin for AudioPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, (setup_audio, start_music).chain())
            .add_systems(
                Update,
                (
                    watch_audio_failures,
                    update_music_volume.run_if(resource_changed::<GameConfig>),
                ),
            )
            .add_observer(on_sound_cue);
    }
}

/// Every one-shot sound in the game.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Sfx {
    Sword,
    Hit,
    Special,
    Jump,
    Slash,
    Pickup,
    Hurt,
}

impl Sfx {
    pub const ALL: [Sfx; 7] = [
        Sfx::Sword,
        Sfx::Hit,
        Sfx::Special,
        Sfx::Jump,
        Sfx::Slash,
        Sfx::Pickup,
        Sfx::Hurt,
    ];

    pub fn path(self) -> &'static str {
        match self {
            Sfx::Sword => "audio/sword.wav",
            Sfx::Hit => "audio/hit.wav",
            Sfx::Special => "audio/special.wav",
            Sfx::Jump => "Sounds/jump.wav",
            Sfx::Slash => "Sounds/slash.wav",
            Sfx::Pickup => "Sounds/pickupCoin.wav",
            Sfx::Hurt => "Sounds/hitHurt.wav",
        }
    }
}

pub const MUSIC_PATH: &str = "audio/music.mp3";

/// Trigger with `commands.trigger(SoundCue(..))` to play a sound at the
/// configured effects volume.
#[derive(Event, Debug, Copy, Clone)]
pub struct SoundCue(pub Sfx);

#[derive(Resource)]
pub struct GameAudio {
    pub music: Handle<AudioSource>,
    effects: Vec<(Sfx, Handle<AudioSource>)>,
}

impl GameAudio {
    pub fn effect(&self, sfx: Sfx) -> Option<&Handle<AudioSource>> {
        self.effects
            .iter()
            .find(|(id, _)| *id == sfx)
            .map(|(_, handle)| handle)
    }

    fn failed_path(&self, asset_server: &AssetServer) -> Option<(&'static str, String)> {
        let music = std::iter::once((MUSIC_PATH, self.music.id()));
        let effects = self.effects.iter().map(|(sfx, h)| (sfx.path(), h.id()));
        music.chain(effects).find_map(|(path, id)| {
            match asset_server.get_load_state(id) {
                Some(LoadState::Failed(err)) => Some((path, err.to_string())),
                _ => None,
            }
        })
    }
}

#[derive(Component)]
pub struct MusicTrack;

pub fn setup_audio(mut commands: Commands, asset_server: Res<AssetServer>) {
    let effects = Sfx::ALL
        .iter()
        .map(|&sfx| (sfx, asset_server.load(sfx.path())))
        .collect();
    commands.insert_resource(GameAudio {
        music: asset_server.load(MUSIC_PATH),
        effects,
    });
}

fn start_music(mut commands: Commands, audio: Res<GameAudio>, config: Res<GameConfig>) {
    commands.spawn((
        AudioPlayer::new(audio.music.clone()),
        PlaybackSettings::LOOP.with_volume(Volume::Linear(config.music_volume)),
        MusicTrack,
    ));
}

fn update_music_volume(config: Res<GameConfig>, mut sinks: Query<&mut AudioSink, With<MusicTrack>>) {
    for mut sink in &mut sinks {
        sink.set_volume(Volume::Linear(config.music_volume));
    }
}

pub fn on_sound_cue(
    trigger: On<SoundCue>,
    mut commands: Commands,
    audio: Res<GameAudio>,
    config: Res<GameConfig>,
) {
    let SoundCue(sfx) = *trigger.event();
    if config.sfx_volume <= 0.0 {
        return;
    }
    let Some(handle) = audio.effect(sfx) else {
        return;
    };
    commands.spawn((
        AudioPlayer::new(handle.clone()),
        PlaybackSettings::DESPAWN.with_volume(Volume::Linear(config.sfx_volume)),
    ));
}

fn watch_audio_failures(
    audio: Res<GameAudio>,
    asset_server: Res<AssetServer>,
    mut exit: MessageWriter<AppExit>,
) {
    if let Some((path, reason)) = audio.failed_path(&asset_server) {
        error!("Failed to load sound {:?}: {}", path, reason);
        exit.write(AppExit::error());
    }
}
