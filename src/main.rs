// main.rs - Entry point: window setup and plugin assembly.
//
// Mode flow lives in scene.rs (SceneMode states); every other concern is a
// plugin that hooks its systems onto those states.

use bevy::prelude::*;
use bevy::window::WindowResolution;
use blade_clash::*;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Blade Clash".to_string(),
                resolution: WindowResolution::new(
                    scene::SCREEN_WIDTH as u32,
                    scene::SCREEN_HEIGHT as u32,
                ),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.08, 0.07, 0.12)))
        .add_plugins((
            config::ConfigPlugin,
            save_load::SaveLoadPlugin,
            scene::ScenePlugin,
            animation::AnimationPlugin,
            audio::AudioPlugin,
            menu::MenuPlugin,
            duel::DuelPlugin,
            runner::RunnerPlugin,
        ))
        .run();
}
