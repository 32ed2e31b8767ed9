use std::collections::HashMap;

use bevy::asset::LoadState;
use bevy::prelude::*;

pub struct AnimationPlugin;

impl Plugin for AnimationPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            Update,
            watch_sheet_failures.run_if(resource_exists::<SpriteSheets>),
        );
    }
}

/// Every sprite sheet the game knows how to play.
///
/// A `ClipId` is the "image handle" half of a clip: the simulation only ever
/// stores the id, and the render side looks the real handles up in
/// [`SpriteSheets`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ClipId {
    SwordIdle,
    SwordWalk,
    SwordJump,
    SwordFall,
    SwordLight,
    SwordHeavy,
    SwordWhirlwind,
    SwordBarrage,
    SwordFinisher,
    SwordDeath,
    SwordVictory,
    SwordHit,
    SwordBlock,

    BossIdle,
    BossWalk,
    BossGuard,
    BossCast,
    BossHit,
    BossDeath,

    HadoBlast,
    SpiritSlash,
    MirrorVeil,

    RunnerWalk,
    RunnerJump,
    RunnerSlash,
    LowBlade,
    HighStar,
    Sake,
}

/// Static layout of one sprite sheet: a single row of equally sized frames.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ClipSpec {
    pub path: &'static str,
    pub total_width: u32,
    pub frame_height: u32,
    pub frame_count: usize,
    pub fps: f32,
    pub looping: bool,
}

const fn sheet(
    path: &'static str,
    total_width: u32,
    frame_height: u32,
    frame_count: usize,
    fps: f32,
    looping: bool,
) -> ClipSpec {
    ClipSpec {
        path,
        total_width,
        frame_height,
        frame_count,
        fps,
        looping,
    }
}

impl ClipId {
    pub const DUEL: [ClipId; 22] = [
        ClipId::SwordIdle,
        ClipId::SwordWalk,
        ClipId::SwordJump,
        ClipId::SwordFall,
        ClipId::SwordLight,
        ClipId::SwordHeavy,
        ClipId::SwordWhirlwind,
        ClipId::SwordBarrage,
        ClipId::SwordFinisher,
        ClipId::SwordDeath,
        ClipId::SwordVictory,
        ClipId::SwordHit,
        ClipId::SwordBlock,
        ClipId::BossIdle,
        ClipId::BossWalk,
        ClipId::BossGuard,
        ClipId::BossCast,
        ClipId::BossHit,
        ClipId::BossDeath,
        ClipId::HadoBlast,
        ClipId::SpiritSlash,
        ClipId::MirrorVeil,
    ];

    pub const RUNNER: [ClipId; 6] = [
        ClipId::RunnerWalk,
        ClipId::RunnerJump,
        ClipId::RunnerSlash,
        ClipId::LowBlade,
        ClipId::HighStar,
        ClipId::Sake,
    ];

    pub fn spec(self) -> ClipSpec {
        match self {
            ClipId::SwordIdle | ClipId::SwordWalk => {
                sheet("textures/zoro_assets/walk.png", 1150, 157, 8, 12.0, true)
            }
            ClipId::SwordJump => sheet("textures/zoro_assets/Jump.png", 1190, 300, 7, 10.0, false),
            ClipId::SwordFall => sheet("textures/zoro_assets/Fall.png", 2168, 155, 12, 12.0, false),
            ClipId::SwordLight => {
                sheet("textures/zoro_assets/Attack1.png", 1122, 170, 6, 15.0, false)
            }
            ClipId::SwordHeavy => {
                sheet("textures/zoro_assets/Oni Giri.png", 1280, 244, 6, 12.0, false)
            }
            ClipId::SwordWhirlwind => {
                sheet("textures/zoro_assets/Tatsumaki.png", 1970, 210, 8, 12.0, false)
            }
            ClipId::SwordBarrage => {
                sheet("textures/zoro_assets/Sanzen sekai.png", 1280, 160, 8, 12.0, false)
            }
            ClipId::SwordFinisher => {
                sheet("textures/zoro_assets/Hiryu Kaen.png", 1797, 256, 10, 12.0, false)
            }
            ClipId::SwordDeath => sheet("textures/zoro_assets/Death.png", 1274, 155, 7, 8.0, false),
            ClipId::SwordVictory => {
                sheet("textures/zoro_assets/Victory.png", 1000, 170, 5, 6.0, false)
            }
            ClipId::SwordHit | ClipId::BossHit => {
                sheet("textures/zoro_assets/Hit.png", 260, 105, 3, 10.0, false)
            }
            ClipId::SwordBlock => sheet("textures/zoro_assets/IDLE.png", 894, 213, 1, 1.0, true),

            ClipId::BossIdle => sheet("textures/aizen/Idle.png", 264, 104, 4, 4.0, true),
            ClipId::BossWalk => sheet("textures/aizen/Suigetsu kyoka.png", 1058, 110, 12, 4.0, true),
            ClipId::BossGuard => sheet("textures/aizen/Guard.png", 70, 105, 1, 1.0, true),
            ClipId::BossCast => sheet("textures/aizen/Hado.png", 482, 104, 5, 10.0, false),
            ClipId::BossDeath => sheet("textures/aizen/Guard.png", 75, 105, 1, 1.0, true),

            ClipId::HadoBlast => sheet("textures/aizen/Hado effect.png", 662, 164, 10, 12.0, false),
            ClipId::SpiritSlash => {
                sheet("textures/aizen/Spirit slash effect.png", 268, 102, 3, 8.0, false)
            }
            ClipId::MirrorVeil => {
                sheet("textures/aizen/Suigetsu kyoka.png", 1058, 110, 12, 15.0, true)
            }

            ClipId::RunnerWalk => sheet("textures/zoro_assets/Walk.png", 1144, 157, 8, 10.0, true),
            ClipId::RunnerJump => sheet("textures/zoro_assets/Jump.png", 1190, 300, 7, 10.0, true),
            ClipId::RunnerSlash => sheet("textures/zoro_assets/Slash.png", 900, 157, 6, 20.0, false),
            ClipId::LowBlade => sheet("textures/kunai.png", 64, 32, 1, 5.0, true),
            ClipId::HighStar => sheet("textures/shuriken.png", 256, 64, 4, 6.5, true),
            ClipId::Sake => sheet("textures/sake.png", 48, 64, 1, 1.0, true),
        }
    }
}

/// Frame bookkeeping for one clip.
///
/// `frame_index` is always in `[0, frame_count)`. `finished` only becomes true
/// for non-looping clips, and then stays true until [`AnimatedClip::reset`].
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatedClip {
    pub sheet: ClipId,
    pub frame_width: u32,
    pub frame_height: u32,
    pub frame_count: usize,
    pub fps: f32,
    pub looping: bool,
    pub frame_index: usize,
    pub elapsed: f32,
    pub finished: bool,
}

impl AnimatedClip {
    pub fn init(
        sheet: ClipId,
        total_width: u32,
        frame_height: u32,
        frame_count: usize,
        fps: f32,
        looping: bool,
    ) -> Self {
        let frame_count = frame_count.max(1);
        AnimatedClip {
            sheet,
            frame_width: total_width / frame_count as u32,
            frame_height,
            frame_count,
            fps,
            looping,
            frame_index: 0,
            elapsed: 0.0,
            finished: false,
        }
    }

    pub fn new(sheet: ClipId) -> Self {
        let spec = sheet.spec();
        Self::init(
            sheet,
            spec.total_width,
            spec.frame_height,
            spec.frame_count,
            spec.fps,
            spec.looping,
        )
    }

    /// Seconds each frame stays on screen.
    pub fn frame_duration(&self) -> f32 {
        1.0 / self.fps
    }

    /// Advance by `delta_time`. Returns true on the tick a non-looping clip
    /// reaches its last frame.
    pub fn advance(&mut self, delta_time: f32) -> bool {
        if self.finished || self.frame_count <= 1 {
            return false;
        }

        self.elapsed += delta_time;
        if self.elapsed < self.frame_duration() {
            return false;
        }

        self.elapsed = 0.0;
        self.frame_index += 1;

        if self.frame_index >= self.frame_count {
            if self.looping {
                self.frame_index = 0;
            } else {
                self.frame_index = self.frame_count - 1;
                self.finished = true;
                return true;
            }
        }
        false
    }

    pub fn reset(&mut self) {
        self.frame_index = 0;
        self.elapsed = 0.0;
        self.finished = false;
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Source rectangle of the current frame inside the sheet, in pixels.
    pub fn source_rect(&self) -> Rect {
        let x = (self.frame_index as u32 * self.frame_width) as f32;
        Rect::new(x, 0.0, x + self.frame_width as f32, self.frame_height as f32)
    }

    pub fn frame_size(&self) -> Vec2 {
        Vec2::new(self.frame_width as f32, self.frame_height as f32)
    }
}

// ── Render side ─────────────────────────────────────────────────────────────

pub struct SheetHandles {
    pub path: &'static str,
    pub image: Handle<Image>,
    pub layout: Handle<TextureAtlasLayout>,
}

/// Loaded sprite sheets for the active scene.
///
/// Inserted when a gameplay scene starts and removed when it ends; dropping
/// the resource drops the strong handles, which is what releases the textures.
#[derive(Resource, Default)]
pub struct SpriteSheets {
    sheets: HashMap<ClipId, SheetHandles>,
}

impl SpriteSheets {
    pub fn load(
        ids: &[ClipId],
        asset_server: &AssetServer,
        texture_atlas_layouts: &mut Assets<TextureAtlasLayout>,
    ) -> Self {
        let mut sheets = HashMap::new();
        for &id in ids {
            let spec = id.spec();
            let clip = AnimatedClip::new(id);
            let image = asset_server.load(spec.path);
            let layout = texture_atlas_layouts.add(TextureAtlasLayout::from_grid(
                UVec2::new(clip.frame_width.max(1), clip.frame_height.max(1)),
                clip.frame_count as u32,
                1,
                None,
                None,
            ));
            sheets.insert(
                id,
                SheetHandles {
                    path: spec.path,
                    image,
                    layout,
                },
            );
        }
        debug!("Requested {} sprite sheets", sheets.len());
        SpriteSheets { sheets }
    }

    pub fn get(&self, id: ClipId) -> Option<&SheetHandles> {
        self.sheets.get(&id)
    }

    /// Point `sprite` at the clip's current frame. `mirrored` flips the frame
    /// horizontally without touching the clip itself.
    pub fn apply(&self, clip: &AnimatedClip, sprite: &mut Sprite, mirrored: bool) {
        let Some(handles) = self.sheets.get(&clip.sheet) else {
            return;
        };
        if sprite.image != handles.image {
            sprite.image = handles.image.clone();
        }
        let needs_layout = sprite
            .texture_atlas
            .as_ref()
            .map(|atlas| atlas.layout != handles.layout)
            .unwrap_or(true);
        if needs_layout {
            sprite.texture_atlas = Some(TextureAtlas {
                layout: handles.layout.clone(),
                index: 0,
            });
        }
        if let Some(ref mut atlas) = sprite.texture_atlas {
            atlas.index = clip.frame_index;
        }
        sprite.flip_x = mirrored;
    }

    fn failed_path(&self, asset_server: &AssetServer) -> Option<(&'static str, String)> {
        self.sheets.values().find_map(|handles| {
            match asset_server.get_load_state(handles.image.id()) {
                Some(LoadState::Failed(err)) => Some((handles.path, err.to_string())),
                _ => None,
            }
        })
    }
}

/// A missing texture is fatal: report which file and quit.
fn watch_sheet_failures(
    sheets: Res<SpriteSheets>,
    asset_server: Res<AssetServer>,
    mut exit: MessageWriter<AppExit>,
) {
    if let Some((path, reason)) = sheets.failed_path(&asset_server) {
        error!("Failed to load sprite sheet {:?}: {}", path, reason);
        exit.write(AppExit::error());
    }
}
