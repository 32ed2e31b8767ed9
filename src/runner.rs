//! The endless runner: jump the low blades, stay grounded under the stars,
//! slash what you can and grab the sake.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::animation::{AnimatedClip, ClipId, SpriteSheets};
use crate::audio::{SoundCue, Sfx};
use crate::combat::overlaps;
use crate::input::{menu_intent, runner_intent};
use crate::moves::rect_at;
use crate::save_load::{today, RunnerBoard};
use crate::scene::{
    not_fading, sprite_transform, Arena, Director, SceneMode, SCREEN_HEIGHT, SCREEN_WIDTH,
};

pub const RUNNER_X: f32 = SCREEN_WIDTH / 3.0 - 71.0;
pub const RUNNER_WIDTH: f32 = 143.0;
pub const RUNNER_HEIGHT: f32 = 157.0;
pub const RUNNER_GROUND_Y: f32 = SCREEN_HEIGHT - 80.0 - RUNNER_HEIGHT;
pub const JUMP_SPEED: f32 = 800.0;
pub const GRAVITY: f32 = 2000.0;
pub const SLASH_COOLDOWN: f32 = 0.3;
pub const START_SPEED: f32 = 300.0;
pub const SPEED_STEP: f32 = 5.0;
pub const MAX_SPEED: f32 = 700.0;
pub const POINTS_PER_SECOND: i32 = 10;
pub const SLASH_POINTS: i32 = 50;
pub const ITEM_POINTS: i32 = 100;
/// Anything scrolled this far left is recycled to the right.
pub const RECYCLE_X: f32 = -200.0;

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct RunnerIntent {
    pub jump: bool,
    pub slash: bool,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum HazardKind {
    /// Skims the ground; only hurts a grounded runner.
    LowBlade,
    /// Flies high; only hurts an airborne runner.
    HighStar,
    /// Pickup worth bonus points.
    Sake,
}

impl HazardKind {
    fn clip(self) -> ClipId {
        match self {
            HazardKind::LowBlade => ClipId::LowBlade,
            HazardKind::HighStar => ClipId::HighStar,
            HazardKind::Sake => ClipId::Sake,
        }
    }

    /// Distance of the sprite's bottom edge above the window's bottom edge.
    fn lift(self) -> f32 {
        match self {
            HazardKind::LowBlade => 100.0,
            HazardKind::HighStar => 300.0,
            HazardKind::Sake => 200.0,
        }
    }

    fn respawn_range(self) -> (f32, f32) {
        match self {
            HazardKind::LowBlade => (1000.0, 5000.0),
            HazardKind::HighStar => (1500.0, 6000.0),
            HazardKind::Sake => (2000.0, 8000.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Hazard {
    pub kind: HazardKind,
    pub position: Vec2,
    pub clip: AnimatedClip,
}

impl Hazard {
    fn new(kind: HazardKind, x: f32) -> Self {
        let clip = AnimatedClip::new(kind.clip());
        let y = SCREEN_HEIGHT - kind.lift() - clip.frame_height as f32;
        Self {
            kind,
            position: Vec2::new(x, y),
            clip,
        }
    }

    pub fn size(&self) -> Vec2 {
        self.clip.frame_size()
    }

    /// Items use their full sprite; projectiles are forgiven 10 px per side.
    pub fn bounds(&self) -> Rect {
        let size = self.size();
        match self.kind {
            HazardKind::Sake => rect_at(self.position.x, self.position.y, size.x, size.y),
            _ => rect_at(
                self.position.x + 10.0,
                self.position.y + 10.0,
                size.x - 20.0,
                size.y - 20.0,
            ),
        }
    }

    fn respawn(&mut self, rng: &mut impl Rng) {
        let (lo, hi) = self.kind.respawn_range();
        self.position.x = SCREEN_WIDTH + rng.gen_range(lo..=hi);
        self.clip.reset();
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RunnerCue {
    Jumped,
    Slashed,
    Destroyed,
    Collected,
    Crashed,
}

#[derive(Debug, Clone)]
pub struct Runner {
    pub y: f32,
    pub velocity_y: f32,
    pub grounded: bool,
    walk: AnimatedClip,
    jump: AnimatedClip,
    slash: Option<(AnimatedClip, Vec2)>,
    slash_cooldown: f32,
}

impl Default for Runner {
    fn default() -> Self {
        Self {
            y: RUNNER_GROUND_Y,
            velocity_y: 0.0,
            grounded: true,
            walk: AnimatedClip::new(ClipId::RunnerWalk),
            jump: AnimatedClip::new(ClipId::RunnerJump),
            slash: None,
            slash_cooldown: 0.0,
        }
    }
}

impl Runner {
    /// The body hitbox, 20 px inside the sprite on every side.
    pub fn bounds(&self) -> Rect {
        rect_at(
            RUNNER_X + 20.0,
            self.y + 20.0,
            RUNNER_WIDTH - 40.0,
            RUNNER_HEIGHT - 40.0,
        )
    }

    pub fn slash_bounds(&self) -> Rect {
        match &self.slash {
            Some((clip, at)) => rect_at(
                at.x,
                at.y + 20.0,
                clip.frame_width as f32 - 20.0,
                clip.frame_height as f32 - 40.0,
            ),
            None => Rect::EMPTY,
        }
    }

    pub fn is_slashing(&self) -> bool {
        self.slash.is_some()
    }

    pub fn body_clip(&self) -> &AnimatedClip {
        if self.grounded {
            &self.walk
        } else {
            &self.jump
        }
    }

    pub fn slash(&self) -> Option<(&AnimatedClip, Vec2)> {
        self.slash.as_ref().map(|(clip, at)| (clip, *at))
    }
}

#[derive(Resource, Debug)]
pub struct RunnerScene {
    pub runner: Runner,
    pub hazards: Vec<Hazard>,
    pub speed: f32,
    pub score: i32,
    pub elapsed: f32,
    score_timer: f32,
    crashed: bool,
    rng: StdRng,
    cues: Vec<RunnerCue>,
}

impl RunnerScene {
    pub fn new(seed: u64) -> Self {
        let mut hazards = Vec::new();
        for i in 0..6 {
            hazards.push(Hazard::new(
                HazardKind::LowBlade,
                SCREEN_WIDTH + 100.0 + 10_000.0 * i as f32,
            ));
        }
        for i in 0..4 {
            hazards.push(Hazard::new(
                HazardKind::HighStar,
                SCREEN_WIDTH + 300.0 + 15_000.0 * i as f32,
            ));
        }
        for i in 0..2 {
            hazards.push(Hazard::new(
                HazardKind::Sake,
                SCREEN_WIDTH + 1000.0 + 15_000.0 * i as f32,
            ));
        }

        Self {
            runner: Runner::default(),
            hazards,
            speed: START_SPEED,
            score: 0,
            elapsed: 0.0,
            score_timer: 0.0,
            crashed: false,
            rng: StdRng::seed_from_u64(seed),
            cues: Vec::new(),
        }
    }

    pub fn is_crashed(&self) -> bool {
        self.crashed
    }

    pub fn drain_cues(&mut self) -> Vec<RunnerCue> {
        std::mem::take(&mut self.cues)
    }

    pub fn advance(&mut self, delta_time: f32, intent: RunnerIntent) {
        if self.crashed {
            return;
        }
        self.elapsed += delta_time;
        self.advance_runner(delta_time, intent);

        self.score_timer += delta_time;
        if self.score_timer >= 1.0 {
            self.score_timer = 0.0;
            self.score += POINTS_PER_SECOND;
            if self.speed < MAX_SPEED {
                self.speed = (self.speed + SPEED_STEP).min(MAX_SPEED);
            }
        }

        let body = self.runner.bounds();
        let blade = self.runner.slash_bounds();
        for hazard in &mut self.hazards {
            hazard.clip.advance(delta_time);
            hazard.position.x -= self.speed * delta_time;
            if hazard.position.x <= RECYCLE_X {
                hazard.respawn(&mut self.rng);
            }

            let bounds = hazard.bounds();
            match hazard.kind {
                HazardKind::Sake => {
                    if overlaps(bounds, body) {
                        self.score += ITEM_POINTS;
                        self.cues.push(RunnerCue::Collected);
                        hazard.respawn(&mut self.rng);
                    }
                }
                kind => {
                    if overlaps(blade, bounds) {
                        self.score += SLASH_POINTS;
                        self.cues.push(RunnerCue::Destroyed);
                        hazard.respawn(&mut self.rng);
                    } else if overlaps(bounds, body) {
                        let dangerous = match kind {
                            HazardKind::LowBlade => self.runner.grounded,
                            _ => !self.runner.grounded,
                        };
                        if dangerous && !self.crashed {
                            self.crashed = true;
                            self.cues.push(RunnerCue::Crashed);
                            info!("Runner crashed with {} points", self.score);
                        }
                    }
                }
            }
        }
    }

    fn advance_runner(&mut self, delta_time: f32, intent: RunnerIntent) {
        let runner = &mut self.runner;
        runner.slash_cooldown = (runner.slash_cooldown - delta_time).max(0.0);

        if intent.jump && runner.grounded {
            runner.velocity_y = -JUMP_SPEED;
            runner.grounded = false;
            runner.jump.reset();
            self.cues.push(RunnerCue::Jumped);
        }

        if intent.slash && runner.slash.is_none() && runner.slash_cooldown <= 0.0 {
            let at = Vec2::new(RUNNER_X + RUNNER_WIDTH - 50.0, runner.y);
            runner.slash = Some((AnimatedClip::new(ClipId::RunnerSlash), at));
            self.cues.push(RunnerCue::Slashed);
        }

        if let Some((clip, _)) = &mut runner.slash {
            if clip.advance(delta_time) {
                runner.slash = None;
                runner.slash_cooldown = SLASH_COOLDOWN;
            }
        }

        if !runner.grounded {
            runner.velocity_y += GRAVITY * delta_time;
            runner.y += runner.velocity_y * delta_time;
            if runner.y >= RUNNER_GROUND_Y {
                runner.y = RUNNER_GROUND_Y;
                runner.velocity_y = 0.0;
                runner.grounded = true;
            }
            runner.jump.advance(delta_time);
        } else {
            runner.walk.advance(delta_time);
        }
    }
}

// =============================================================================
// Bevy glue
// =============================================================================

pub struct RunnerPlugin;

impl Plugin for RunnerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            OnEnter(SceneMode::Gameplay),
            setup_runner.run_if(resource_equals(Arena::Runner)),
        )
        .add_systems(OnExit(SceneMode::Gameplay), teardown_runner)
        .add_systems(
            Update,
            (
                tick_runner.run_if(not_fading),
                sync_runner_sprites,
                update_runner_hud,
            )
                .chain()
                .run_if(in_state(SceneMode::Gameplay).and(resource_exists::<RunnerScene>)),
        );
    }
}

#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
enum RunnerSprite {
    Body,
    Slash,
    Hazard(usize),
}

#[derive(Component)]
struct RunnerScoreText;

#[derive(Component)]
struct RunnerBanner;

fn setup_runner(
    mut commands: Commands,
    asset_server: Res<AssetServer>,
    mut layouts: ResMut<Assets<TextureAtlasLayout>>,
) {
    let scene = RunnerScene::new(rand::random());
    info!("Runner started");

    commands.insert_resource(SpriteSheets::load(&ClipId::RUNNER, &asset_server, &mut layouts));

    // Ground strip under the runner's feet.
    let ground_top = SCREEN_HEIGHT - 80.0;
    commands.spawn((
        Sprite::from_color(Color::srgb(0.25, 0.2, 0.15), Vec2::new(SCREEN_WIDTH, 80.0)),
        sprite_transform(Vec2::new(0.0, ground_top), Vec2::new(SCREEN_WIDTH, 80.0), 0.0),
        DespawnOnExit(SceneMode::Gameplay),
    ));

    commands.spawn((
        Sprite::default(),
        Transform::default(),
        RunnerSprite::Body,
        DespawnOnExit(SceneMode::Gameplay),
    ));
    commands.spawn((
        Sprite::default(),
        Transform::default(),
        Visibility::Hidden,
        RunnerSprite::Slash,
        DespawnOnExit(SceneMode::Gameplay),
    ));
    for index in 0..scene.hazards.len() {
        commands.spawn((
            Sprite::default(),
            Transform::default(),
            RunnerSprite::Hazard(index),
            DespawnOnExit(SceneMode::Gameplay),
        ));
    }

    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 28.0,
            ..default()
        },
        TextColor(Color::WHITE),
        Node {
            position_type: PositionType::Absolute,
            left: Val::Px(20.0),
            top: Val::Px(20.0),
            ..default()
        },
        RunnerScoreText,
        DespawnOnExit(SceneMode::Gameplay),
    ));
    commands.spawn((
        Text::new(""),
        TextFont {
            font_size: 40.0,
            ..default()
        },
        TextColor(Color::srgb(1.0, 0.3, 0.3)),
        Node {
            position_type: PositionType::Absolute,
            top: Val::Percent(40.0),
            width: Val::Percent(100.0),
            justify_content: JustifyContent::Center,
            ..default()
        },
        TextLayout::new_with_justify(Justify::Center),
        RunnerBanner,
        DespawnOnExit(SceneMode::Gameplay),
    ));

    commands.insert_resource(scene);
}

fn teardown_runner(mut commands: Commands) {
    commands.remove_resource::<RunnerScene>();
    commands.remove_resource::<SpriteSheets>();
}

#[allow(clippy::too_many_arguments)]
fn tick_runner(
    mut commands: Commands,
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mouse: Res<ButtonInput<MouseButton>>,
    mut scene: ResMut<RunnerScene>,
    mut board: ResMut<RunnerBoard>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    let menu = menu_intent(&keys);
    if menu.cancel {
        director.go(SceneMode::Gameplay, SceneMode::Menu, &mut next);
        return;
    }

    if scene.is_crashed() {
        if menu.confirm {
            if board.qualifies(scene.score) {
                board.add(scene.score, today());
                board.save();
                info!("Runner record saved: {}", scene.score);
            }
            director.go(SceneMode::Gameplay, SceneMode::Menu, &mut next);
        }
        return;
    }

    scene.advance(time.delta_secs(), runner_intent(&keys, &mouse));
    for cue in scene.drain_cues() {
        let sfx = match cue {
            RunnerCue::Jumped => Sfx::Jump,
            RunnerCue::Slashed => Sfx::Slash,
            RunnerCue::Destroyed | RunnerCue::Collected => Sfx::Pickup,
            RunnerCue::Crashed => Sfx::Hurt,
        };
        commands.trigger(SoundCue(sfx));
    }
}

fn sync_runner_sprites(
    scene: Res<RunnerScene>,
    sheets: Res<SpriteSheets>,
    mut sprites: Query<(&RunnerSprite, &mut Sprite, &mut Transform, &mut Visibility)>,
) {
    for (which, mut sprite, mut transform, mut visibility) in &mut sprites {
        match *which {
            RunnerSprite::Body => {
                let clip = scene.runner.body_clip();
                sheets.apply(clip, &mut sprite, false);
                *transform =
                    sprite_transform(Vec2::new(RUNNER_X, scene.runner.y), clip.frame_size(), 2.0);
            }
            RunnerSprite::Slash => match scene.runner.slash() {
                Some((clip, at)) => {
                    sheets.apply(clip, &mut sprite, false);
                    *transform = sprite_transform(at, clip.frame_size(), 3.0);
                    *visibility = Visibility::Visible;
                }
                None => *visibility = Visibility::Hidden,
            },
            RunnerSprite::Hazard(index) => {
                let Some(hazard) = scene.hazards.get(index) else {
                    continue;
                };
                sheets.apply(&hazard.clip, &mut sprite, false);
                *transform = sprite_transform(hazard.position, hazard.size(), 1.0);
            }
        }
    }
}

fn update_runner_hud(
    scene: Res<RunnerScene>,
    board: Res<RunnerBoard>,
    mut score_text: Query<&mut Text, (With<RunnerScoreText>, Without<RunnerBanner>)>,
    mut banner: Query<&mut Text, (With<RunnerBanner>, Without<RunnerScoreText>)>,
) {
    for mut text in &mut score_text {
        text.0 = format!("SCORE: {}   SPEED: {:.0}", scene.score, scene.speed);
    }
    for mut text in &mut banner {
        text.0 = if scene.is_crashed() {
            let record = if board.qualifies(scene.score) {
                "NEW RECORD!\n"
            } else {
                ""
            };
            format!(
                "GAME OVER\n{}SCORE: {}\nENTER: continue",
                record, scene.score
            )
        } else {
            String::new()
        };
    }
}
