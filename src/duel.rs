//! The duel: swordsman against the sorcerer, then results and name entry.
//!
//! [`DuelScene`] owns every piece of simulation state and can be driven with
//! plain `advance` calls. The systems at the bottom of the file only feed it
//! input, draw it and persist the score.

use bevy::input::keyboard::{Key, KeyboardInput};
use bevy::input::ButtonState;
use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::ai::Difficulty;
use crate::animation::{ClipId, SpriteSheets};
use crate::audio::{Sfx, SoundCue};
use crate::boss::{Boss, PlayerView};
use crate::combat::resolve;
use crate::config::GameConfig;
use crate::fighter::{FighterIntent, Swordsman, GROUND_Y};
use crate::health::{
    health_readout, paint_health_bar, spawn_health_bar, BarOwner, HealthBarFill, HealthBarText,
};
use crate::input::{fighter_intent, menu_intent};
use crate::moves::{AttackKind, Cue, SpecialKind};
use crate::particles::{draw_particles, ParticleSystem};
use crate::save_load::{NameError, PlayerName, ScoreBoard, ScoreEntry, NAME_MAX_LEN};
use crate::scene::{
    not_fading, screen_to_world, sprite_transform, Arena, Director, MainCamera, SceneMode,
    SCREEN_WIDTH,
};

/// How long the death and victory clips play before the results appear.
pub const FINISH_DELAY: f32 = 1.5;
const SHAKE_AMPLITUDE: f32 = 8.0;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DuelPhase {
    Fighting,
    /// Someone fell; clips keep playing until `left` runs out.
    Finishing { left: f32, outcome: Outcome },
    NameEntry {
        outcome: Outcome,
        buffer: String,
        error: Option<NameError>,
    },
    Results(Outcome),
}

#[derive(Resource, Debug)]
pub struct DuelScene {
    pub player: Swordsman,
    pub boss: Boss,
    pub particles: ParticleSystem,
    /// Seconds of actual fighting; stops once someone falls.
    pub elapsed: f32,
    hit_stop: f32,
    phase: DuelPhase,
    /// False until name entry has skipped the frame it opened on.
    keys_armed: bool,
    rng: StdRng,
    cues: Vec<Cue>,
}

impl DuelScene {
    pub fn new(difficulty: Difficulty, seed: u64) -> Self {
        Self {
            player: Swordsman::default(),
            boss: Boss::new(difficulty),
            particles: ParticleSystem::new(),
            elapsed: 0.0,
            hit_stop: 0.0,
            phase: DuelPhase::Fighting,
            keys_armed: false,
            rng: StdRng::seed_from_u64(seed),
            cues: Vec::new(),
        }
    }

    pub fn phase(&self) -> &DuelPhase {
        &self.phase
    }

    pub fn hit_stop(&self) -> f32 {
        self.hit_stop
    }

    pub fn drain_cues(&mut self) -> Vec<Cue> {
        std::mem::take(&mut self.cues)
    }

    /// Step the fight. Returns the outcome on the tick the finishing delay
    /// runs out; the caller then picks the next phase with [`Self::conclude`].
    pub fn advance(&mut self, delta_time: f32, intent: &FighterIntent) -> Option<Outcome> {
        let intent = match self.phase {
            DuelPhase::Fighting => *intent,
            DuelPhase::Finishing { .. } => FighterIntent::default(),
            _ => return None,
        };

        if self.hit_stop > 0.0 {
            self.hit_stop -= delta_time;
            return None;
        }

        let mut cues = Vec::new();
        self.player.advance(delta_time, &intent, &mut cues);
        let view = PlayerView {
            x: self.player.position.x,
            attack_started: self.player.attack_started(),
        };
        self.boss.advance(delta_time, view, &mut self.rng, &mut cues);

        let exchange = resolve(&mut self.player, &mut self.boss, &mut cues);
        self.hit_stop = self.hit_stop.max(exchange.hit_stop);

        for cue in &cues {
            self.emit_particles(*cue);
        }
        self.cues.extend(cues);
        self.particles.advance(delta_time);

        match self.phase {
            DuelPhase::Fighting => {
                self.elapsed += delta_time;
                let outcome = if self.player.is_dead() {
                    Some(Outcome::Defeat)
                } else if self.boss.is_dead() {
                    self.player.celebrate();
                    Some(Outcome::Victory)
                } else {
                    None
                };
                if let Some(outcome) = outcome {
                    info!(
                        "Duel over: {:?} after {:.1}s with {} points",
                        outcome, self.elapsed, self.player.score
                    );
                    self.phase = DuelPhase::Finishing {
                        left: FINISH_DELAY,
                        outcome,
                    };
                }
                None
            }
            DuelPhase::Finishing { left, outcome } => {
                let left = left - delta_time;
                if left <= 0.0 {
                    Some(outcome)
                } else {
                    self.phase = DuelPhase::Finishing { left, outcome };
                    None
                }
            }
            _ => None,
        }
    }

    /// Leave the finishing phase: a qualifying score asks for a name first.
    pub fn conclude(&mut self, outcome: Outcome, qualifies: bool) {
        self.keys_armed = false;
        self.phase = if qualifies {
            DuelPhase::NameEntry {
                outcome,
                buffer: PlayerName::default().to_string(),
                error: None,
            }
        } else {
            DuelPhase::Results(outcome)
        };
    }

    /// Whether name entry may read the keyboard yet. The first call after
    /// [`Self::conclude`] answers `false`, so the press that ended the fight
    /// on the same frame is not taken as typing.
    pub fn name_keys_ready(&mut self) -> bool {
        let ready = self.keys_armed;
        self.keys_armed = true;
        ready
    }

    /// Append a typed character to the name being entered. Only letters,
    /// digits, `_` and `-` are accepted.
    pub fn type_char(&mut self, c: char) {
        if let DuelPhase::NameEntry { buffer, error, .. } = &mut self.phase {
            let allowed = c.is_ascii_alphanumeric() || c == '_' || c == '-';
            if allowed && buffer.chars().count() < NAME_MAX_LEN {
                buffer.push(c);
                *error = None;
            }
        }
    }

    pub fn erase(&mut self) {
        if let DuelPhase::NameEntry { buffer, .. } = &mut self.phase {
            buffer.pop();
        }
    }

    /// Validate the typed name and build the score entry for it. An invalid
    /// name stays on the name entry screen with the reason shown.
    pub fn submit_name(&mut self) -> Option<ScoreEntry> {
        let DuelPhase::NameEntry {
            outcome,
            buffer,
            error,
        } = &mut self.phase
        else {
            return None;
        };
        match PlayerName::new(buffer) {
            Ok(name) => {
                let outcome = *outcome;
                let entry = ScoreEntry {
                    name,
                    score: self.player.score,
                    combo: self.player.max_combo,
                    time: self.elapsed,
                };
                self.phase = DuelPhase::Results(outcome);
                Some(entry)
            }
            Err(e) => {
                *error = Some(e);
                None
            }
        }
    }

    /// Random camera offset while the player is reeling from a hit.
    pub fn shake_offset(&mut self) -> Vec2 {
        if self.player.shake() <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(
            self.rng.gen_range(-SHAKE_AMPLITUDE..=SHAKE_AMPLITUDE),
            self.rng.gen_range(-SHAKE_AMPLITUDE..=SHAKE_AMPLITUDE),
        )
    }

    fn emit_particles(&mut self, cue: Cue) {
        let rng = &mut self.rng;
        let particles = &mut self.particles;
        match cue {
            Cue::Jumped { at } => particles.sparks(rng, at, 10, Color::srgb(0.4, 1.0, 0.4)),
            Cue::Swung {
                kind,
                at,
                facing_right,
            } => {
                let reach = if facing_right {
                    kind.profile().width
                } else {
                    -kind.profile().width
                };
                let color = swing_color(kind);
                particles.slash_trail(rng, at, at + Vec2::new(reach, -20.0), color);
                if kind == AttackKind::Finisher {
                    particles.explosion(rng, at, 40, color, 100.0, 400.0);
                }
            }
            Cue::Blocked { at } | Cue::Guarded { at } => {
                particles.sparks(rng, at, 15, Color::srgb(1.0, 1.0, 0.3));
            }
            Cue::Hurt { at, .. } => {
                particles.explosion(rng, at, 20, Color::srgb(1.0, 0.2, 0.2), 100.0, 400.0);
            }
            Cue::Died { at, .. } => {
                particles.explosion(rng, at, 60, Color::srgb(0.8, 0.1, 0.1), 150.0, 500.0);
                particles.smoke(rng, at, 15, Color::srgba(0.3, 0.3, 0.3, 0.8));
            }
            Cue::Cast { special, at } => {
                let tint = special.profile().tint;
                match special {
                    SpecialKind::Hado => particles.explosion(rng, at, 25, tint, 100.0, 300.0),
                    SpecialKind::SpiritSlash => particles.sparks(rng, at, 30, tint),
                    SpecialKind::MirrorVeil => particles.smoke(rng, at, 20, tint),
                }
            }
        }
    }
}

fn swing_color(kind: AttackKind) -> Color {
    match kind {
        AttackKind::Light => Color::srgb(0.8, 0.9, 1.0),
        AttackKind::Heavy => Color::srgb(1.0, 0.6, 0.2),
        AttackKind::Whirlwind => Color::srgb(0.5, 1.0, 0.8),
        AttackKind::Barrage => Color::srgb(0.6, 0.6, 1.0),
        AttackKind::Finisher => Color::srgb(1.0, 0.3, 0.1),
    }
}

fn cue_sound(cue: &Cue) -> Option<Sfx> {
    match cue {
        Cue::Jumped { .. } => Some(Sfx::Jump),
        Cue::Swung { .. } => Some(Sfx::Sword),
        Cue::Blocked { .. } | Cue::Guarded { .. } | Cue::Hurt { .. } | Cue::Died { .. } => {
            Some(Sfx::Hit)
        }
        Cue::Cast { .. } => Some(Sfx::Special),
    }
}

// =============================================================================
// Bevy glue
// =============================================================================

pub struct DuelPlugin;

impl Plugin for DuelPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(SceneMode::Gameplay),
            setup_duel.run_if(resource_equals(Arena::Duel)),
        )
        .add_systems(OnExit(SceneMode::Gameplay), teardown_duel)
        .add_systems(
            Update,
            (
                (tick_duel, enter_name).run_if(not_fading),
                sync_duel_sprites,
                draw_duel_particles,
                update_duel_hud,
                shake_camera,
            )
                .chain()
                .run_if(in_state(SceneMode::Gameplay).and(resource_exists::<DuelScene>)),
        );
    }
}

#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
enum DuelSprite {
    Player,
    Boss,
    Effect(SpecialKind),
}

#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
enum HudText {
    Score,
    Clock,
    Combo,
    Cooldowns,
    Banner,
}

fn setup_duel(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
    config: Res<GameConfig>,
) {
    let scene = DuelScene::new(config.difficulty, rand::random());
    info!(
        "Duel started on {} ({} boss health)",
        config.difficulty.label(),
        scene.boss.health.max()
    );
    commands.insert_resource(SpriteSheets::load(&ClipId::DUEL, &asset_server, &mut layouts));

    let floor_top = GROUND_Y + 160.0;
    let floor = Vec2::new(SCREEN_WIDTH, 720.0 - floor_top);
    commands.spawn((
        Sprite::from_color(Color::srgb(0.18, 0.16, 0.22), floor),
        sprite_transform(Vec2::new(0.0, floor_top), floor, 0.0),
        DespawnOnExit(SceneMode::Gameplay),
    ));

    for (which, z) in [(DuelSprite::Boss, 1.0), (DuelSprite::Player, 2.0)] {
        commands.spawn((
            Sprite::default(),
            Transform::from_xyz(0.0, 0.0, z),
            which,
            DespawnOnExit(SceneMode::Gameplay),
        ));
    }
    for kind in SpecialKind::ALL {
        commands.spawn((
            Sprite::default(),
            Transform::default(),
            Visibility::Hidden,
            DuelSprite::Effect(kind),
            DespawnOnExit(SceneMode::Gameplay),
        ));
    }

    spawn_health_bar(&mut commands, BarOwner::Player, "SWORDSMAN");
    spawn_health_bar(&mut commands, BarOwner::Boss, "SORCERER");

    let hud_line = |top: f32, size: f32| {
        (
            Text::new(""),
            TextFont {
                font_size: size,
                ..default()
            },
            TextColor(Color::WHITE),
            Node {
                position_type: PositionType::Absolute,
                left: Val::Px(20.0),
                top: Val::Px(top),
                ..default()
            },
            DespawnOnExit(SceneMode::Gameplay),
        )
    };
    commands.spawn((hud_line(90.0, 24.0), HudText::Score));
    commands.spawn((hud_line(120.0, 20.0), HudText::Clock));
    commands.spawn((hud_line(145.0, 20.0), HudText::Combo));
    commands.spawn((hud_line(680.0, 16.0), HudText::Cooldowns));

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 40.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.85, 0.3)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(35.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        TextLayout::new_with_justify(Justify::Center),
        HudText::Banner,
        DespawnOnExit(SceneMode::Gameplay),
    ));

    commands.insert_resource(scene);
}

fn teardown_duel(mut commands: Commands, mut cameras: Query<&mut Transform, With<MainCamera>>) {
    commands.remove_resource::<DuelScene>();
    commands.remove_resource::<SpriteSheets>();
    for mut transform in &mut cameras {
        transform.translation = Vec3::ZERO;
    }
}

#[allow(clippy::too_many_arguments)]
fn tick_duel(
    mut commands: Commands,
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    config: Res<GameConfig>,
    mut scene: ResMut<DuelScene>,
    board: Res<ScoreBoard>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    let menu = menu_intent(&keys);
    if menu.cancel {
        director.go(SceneMode::Gameplay, SceneMode::Menu, &mut next);
        return;
    }

    let phase = scene.phase().clone();
    match phase {
        DuelPhase::Fighting | DuelPhase::Finishing { .. } => {
            let delta_time = time.delta_secs() * config.game_speed;
            let intent = fighter_intent(&keys);
            if let Some(outcome) = scene.advance(delta_time, &intent) {
                let qualifies = board.is_high_score(scene.player.score);
                scene.conclude(outcome, qualifies);
            }
            for cue in scene.drain_cues() {
                if let Some(sfx) = cue_sound(&cue) {
                    commands.trigger(SoundCue(sfx));
                }
            }
        }
        DuelPhase::Results(_) => {
            if menu.confirm {
                director.go(SceneMode::Gameplay, SceneMode::Menu, &mut next);
            }
        }
        DuelPhase::NameEntry { .. } => {}
    }
}

fn enter_name(
    mut typed: MessageReader<KeyboardInput>,
    mut scene: ResMut<DuelScene>,
    mut board: ResMut<ScoreBoard>,
) {
    if !matches!(scene.phase(), DuelPhase::NameEntry { .. }) || !scene.name_keys_ready() {
        typed.clear();
        return;
    }
    for input in typed.read() {
        if input.state != ButtonState::Pressed {
            continue;
        }
        match &input.logical_key {
            Key::Character(text) => {
                for c in text.chars() {
                    scene.type_char(c);
                }
            }
            Key::Backspace => scene.erase(),
            Key::Enter => {
                if let Some(entry) = scene.submit_name() {
                    info!("New duel high score: {} {}", entry.name, entry.score);
                    board.add(entry);
                    board.save();
                }
            }
            _ => {}
        }
    }
}

fn sync_duel_sprites(
    scene: Res<DuelScene>,
    sheets: Res<SpriteSheets>,
    mut sprites: Query<(&DuelSprite, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    for (which, mut sprite, mut transform, mut visibility) in &mut sprites {
        match *which {
            DuelSprite::Player => {
                let player = &scene.player;
                let clip = player.clip();
                let size = clip.frame_size();
                let top_left = Vec2::new(
                    player.position.x - size.x / 2.0,
                    player.position.y + player.state().draw_offset_y(),
                );
                sheets.apply(clip, &mut sprite, !player.facing_right);
                *transform = sprite_transform(top_left, size, transform.translation.z);
            }
            DuelSprite::Boss => {
                let boss = &scene.boss;
                let clip = boss.clip();
                let size = clip.frame_size();
                let top_left = Vec2::new(boss.position.x - size.x / 2.0, boss.position.y);
                sheets.apply(clip, &mut sprite, boss.facing_right);
                *transform = sprite_transform(top_left, size, transform.translation.z);
            }
            DuelSprite::Effect(kind) => {
                let effect = scene.boss.effect(kind);
                if !effect.active {
                    *visibility = Visibility::Hidden;
                    continue;
                }
                let profile = kind.profile();
                sheets.apply(&effect.clip, &mut sprite, effect.facing_right());
                sprite.custom_size = Some(profile.size);
                sprite.color = profile.tint;
                *transform = sprite_transform(effect.position, profile.size, 3.0);
                *visibility = Visibility::Visible;
            }
        }
    }
}

fn draw_duel_particles(mut gizmos: Gizmos, scene: Res<DuelScene>) {
    draw_particles(&mut gizmos, &scene.particles, screen_to_world);
}

fn banner_text(scene: &DuelScene) -> String {
    let headline = |outcome: Outcome| match outcome {
        Outcome::Victory => "VICTORY!",
        Outcome::Defeat => "DEFEATED",
    };
    match scene.phase() {
        DuelPhase::Fighting => String::new(),
        DuelPhase::Finishing { outcome, .. } => headline(*outcome).to_string(),
        DuelPhase::NameEntry { buffer, error, .. } => {
            let mut text = format!("NEW HIGH SCORE: {}\nENTER YOUR NAME\n{}_", scene.player.score, buffer);
            if let Some(error) = error {
                text.push_str(&format!("\n({})", error));
            }
            text
        }
        DuelPhase::Results(outcome) => format!(
            "{}\nSCORE: {}   MAX COMBO: {}   TIME: {:.1}s\nENTER: menu",
            headline(*outcome),
            scene.player.score,
            scene.player.max_combo,
            scene.elapsed
        ),
    }
}

fn cooldown_text(player: &Swordsman) -> String {
    let parts: Vec<String> = AttackKind::ALL
        .iter()
        .map(|&kind| {
            let left = player.cooldown(kind);
            if left > 0.0 {
                format!("{} {:.1}s", kind.profile().label, left)
            } else {
                format!("{} READY", kind.profile().label)
            }
        })
        .collect();
    parts.join("  |  ")
}

fn update_duel_hud(
    scene: Res<DuelScene>,
    mut texts: Query<(&HudText, &mut Text), Without<HealthBarText>>,
    mut fills: Query<(&HealthBarFill, &mut Node, &mut BackgroundColor)>,
    mut readouts: Query<(&HealthBarText, &mut Text), Without<HudText>>,
) {
    let health_of = |owner: BarOwner| match owner {
        BarOwner::Player => &scene.player.health,
        BarOwner::Boss => &scene.boss.health,
    };
    for (fill, mut node, mut color) in &mut fills {
        paint_health_bar(health_of(fill.0), &mut node, &mut color);
    }
    for (owner, mut text) in &mut readouts {
        text.0 = health_readout(health_of(owner.0));
    }

    for (which, mut text) in &mut texts {
        text.0 = match which {
            HudText::Score => format!("SCORE: {}", scene.player.score),
            HudText::Clock => format!("TIME: {:.1}", scene.elapsed),
            HudText::Combo if scene.player.combo > 1 => {
                format!("COMBO x{}", scene.player.combo)
            }
            HudText::Combo => String::new(),
            HudText::Cooldowns => cooldown_text(&scene.player),
            HudText::Banner => banner_text(&scene),
        };
    }
}

fn shake_camera(
    mut scene: ResMut<DuelScene>,
    mut cameras: Query<&mut Transform, With<MainCamera>>,
) {
    let offset = scene.shake_offset();
    for mut transform in &mut cameras {
        transform.translation.x = offset.x;
        transform.translation.y = offset.y;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fighter::FighterState;

    const DT: f32 = 1.0 / 60.0;

    fn run_until_over(scene: &mut DuelScene) -> Outcome {
        for _ in 0..600 {
            if let Some(outcome) = scene.advance(DT, &FighterIntent::default()) {
                return outcome;
            }
        }
        panic!("duel never concluded: {:?}", scene.phase());
    }

    #[test]
    fn boss_death_means_victory_after_delay() {
        let mut scene = DuelScene::new(Difficulty::Easy, 9);
        let mut cues = Vec::new();
        let lethal = scene.boss.health.current();
        scene.boss.take_damage(lethal, &mut cues);

        assert_eq!(scene.advance(DT, &FighterIntent::default()), None);
        assert!(matches!(scene.phase(), DuelPhase::Finishing { outcome: Outcome::Victory, .. }));
        assert_eq!(scene.player.state(), FighterState::Victory);

        let fought = scene.elapsed;
        assert_eq!(run_until_over(&mut scene), Outcome::Victory);
        assert_eq!(scene.elapsed, fought);
    }

    #[test]
    fn player_death_means_defeat() {
        let mut scene = DuelScene::new(Difficulty::Normal, 2);
        let mut cues = Vec::new();
        scene.player.take_damage(10_000, &mut cues);
        assert_eq!(run_until_over(&mut scene), Outcome::Defeat);
    }

    #[test]
    fn qualifying_score_asks_for_a_name() {
        let mut scene = DuelScene::new(Difficulty::Easy, 4);
        scene.player.score = 1234;
        scene.player.max_combo = 7;
        scene.elapsed = 42.0;
        scene.conclude(Outcome::Victory, true);

        for _ in 0..6 {
            scene.erase();
        }
        for c in "ace 1!".chars() {
            scene.type_char(c);
        }
        let entry = scene.submit_name().unwrap();
        assert_eq!(entry.name.as_str(), "ace1");
        assert_eq!(entry.score, 1234);
        assert_eq!(entry.combo, 7);
        assert_eq!(entry.time, 42.0);
        assert_eq!(scene.phase(), &DuelPhase::Results(Outcome::Victory));
    }

    #[test]
    fn empty_name_is_refused() {
        let mut scene = DuelScene::new(Difficulty::Easy, 4);
        scene.conclude(Outcome::Defeat, true);
        for _ in 0..10 {
            scene.erase();
        }
        assert!(scene.submit_name().is_none());
        assert!(matches!(
            scene.phase(),
            DuelPhase::NameEntry {
                error: Some(NameError::Empty),
                ..
            }
        ));
    }

    #[test]
    fn name_length_is_capped() {
        let mut scene = DuelScene::new(Difficulty::Easy, 4);
        scene.conclude(Outcome::Victory, true);
        for _ in 0..40 {
            scene.type_char('x');
        }
        let entry = scene.submit_name().unwrap();
        assert_eq!(entry.name.as_str().len(), NAME_MAX_LEN);
    }

    #[test]
    fn name_entry_skips_the_frame_it_opens_on() {
        let mut scene = DuelScene::new(Difficulty::Easy, 4);
        scene.conclude(Outcome::Victory, true);
        assert!(!scene.name_keys_ready());
        assert!(scene.name_keys_ready());
        assert!(scene.name_keys_ready());

        scene.conclude(Outcome::Victory, true);
        assert!(!scene.name_keys_ready());
    }

    #[test]
    fn low_score_goes_straight_to_results() {
        let mut scene = DuelScene::new(Difficulty::Easy, 4);
        scene.conclude(Outcome::Defeat, false);
        assert_eq!(scene.phase(), &DuelPhase::Results(Outcome::Defeat));
        assert_eq!(scene.advance(DT, &FighterIntent::default()), None);
    }

    #[test]
    fn landed_hit_freezes_the_scene() {
        let mut scene = DuelScene::new(Difficulty::Easy, 5);
        scene.player.position.x = scene.boss.position.x - 100.0;
        scene.advance(
            DT,
            &FighterIntent {
                light: true,
                ..Default::default()
            },
        );
        assert!(scene.hit_stop() > 0.0);
        assert!(scene.boss.health.current() < scene.boss.health.max());
        assert!(scene.drain_cues().iter().any(|c| matches!(c, Cue::Swung { .. })));
        assert!(!scene.particles.is_empty());

        let position = scene.player.position;
        let elapsed = scene.elapsed;
        scene.advance(
            DT,
            &FighterIntent {
                right: true,
                ..Default::default()
            },
        );
        assert_eq!(scene.player.position, position);
        assert_eq!(scene.elapsed, elapsed);
    }

    #[test]
    fn shake_only_after_taking_a_hit() {
        let mut scene = DuelScene::new(Difficulty::Easy, 6);
        assert_eq!(scene.shake_offset(), Vec2::ZERO);
        let mut cues = Vec::new();
        scene.player.take_damage(10, &mut cues);
        let offset = scene.shake_offset();
        assert!(offset.x.abs() <= SHAKE_AMPLITUDE && offset.y.abs() <= SHAKE_AMPLITUDE);
    }
}
