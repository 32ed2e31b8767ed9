//! Every screen that is not gameplay: intro, main menu, options, text pages
//! and the high score tables.
//!
//! Menus are keyboard driven (arrows, Enter, Escape) and also answer to the
//! mouse through Bevy's `Button` + `Interaction`.

use bevy::prelude::*;

use crate::config::GameConfig;
use crate::input::{menu_intent, MenuIntent};
use crate::pages::{PageLine, TextPage};
use crate::save_load::{RunnerBoard, ScoreBoard};
use crate::scene::{not_fading, Arena, Director, SceneMode};

pub const INTRO_SECONDS: f32 = 3.0;

const BUTTON_IDLE: Color = Color::srgb(0.15, 0.12, 0.2);
const BUTTON_SELECTED: Color = Color::srgb(0.5, 0.1, 0.1);
const BORDER_IDLE: Color = Color::srgb(0.35, 0.3, 0.4);
const BORDER_SELECTED: Color = Color::srgb(0.9, 0.4, 0.3);
const HEADER_COLOR: Color = Color::srgb(1.0, 0.8, 0.3);

pub struct MenuPlugin;

impl Plugin for MenuPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<MenuCursor>()
            .add_systems(OnEnter(SceneMode::Intro), spawn_intro)
            .add_systems(OnEnter(SceneMode::Menu), spawn_main_menu)
            .add_systems(OnEnter(SceneMode::Options), spawn_options)
            .add_systems(OnExit(SceneMode::Options), save_options)
            .add_systems(OnEnter(SceneMode::Credits), spawn_credits)
            .add_systems(OnEnter(SceneMode::Help), spawn_help)
            .add_systems(OnEnter(SceneMode::HighScores), spawn_high_scores)
            .add_systems(
                Update,
                (
                    advance_intro.run_if(in_state(SceneMode::Intro)),
                    navigate_main_menu.run_if(in_state(SceneMode::Menu)),
                    (navigate_options, refresh_option_labels)
                        .chain()
                        .run_if(in_state(SceneMode::Options)),
                    leave_page.run_if(
                        in_state(SceneMode::Credits)
                            .or(in_state(SceneMode::Help))
                            .or(in_state(SceneMode::HighScores)),
                    ),
                )
                    .run_if(not_fading),
            )
            .add_systems(
                Update,
                paint_buttons
                    .run_if(in_state(SceneMode::Menu).or(in_state(SceneMode::Options))),
            );
    }
}

// =============================================================================
// Menu model
// =============================================================================

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MenuItem {
    Duel,
    Runner,
    HighScores,
    Options,
    Credits,
    Help,
    Exit,
}

impl MenuItem {
    pub const ALL: [MenuItem; 7] = [
        MenuItem::Duel,
        MenuItem::Runner,
        MenuItem::HighScores,
        MenuItem::Options,
        MenuItem::Credits,
        MenuItem::Help,
        MenuItem::Exit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuItem::Duel => "DUEL",
            MenuItem::Runner => "ENDLESS RUN",
            MenuItem::HighScores => "HIGH SCORES",
            MenuItem::Options => "OPTIONS",
            MenuItem::Credits => "CREDITS",
            MenuItem::Help => "HELP",
            MenuItem::Exit => "EXIT",
        }
    }

    /// The mode this item leads to, and the arena to arm for gameplay items.
    pub fn target(self) -> (SceneMode, Option<Arena>) {
        match self {
            MenuItem::Duel => (SceneMode::Gameplay, Some(Arena::Duel)),
            MenuItem::Runner => (SceneMode::Gameplay, Some(Arena::Runner)),
            MenuItem::HighScores => (SceneMode::HighScores, None),
            MenuItem::Options => (SceneMode::Options, None),
            MenuItem::Credits => (SceneMode::Credits, None),
            MenuItem::Help => (SceneMode::Help, None),
            MenuItem::Exit => (SceneMode::Exit, None),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum OptionItem {
    MusicVolume,
    SfxVolume,
    Difficulty,
    Fullscreen,
    Vsync,
    Back,
}

impl OptionItem {
    pub const ALL: [OptionItem; 6] = [
        OptionItem::MusicVolume,
        OptionItem::SfxVolume,
        OptionItem::Difficulty,
        OptionItem::Fullscreen,
        OptionItem::Vsync,
        OptionItem::Back,
    ];

    pub fn label(self, config: &GameConfig) -> String {
        let on_off = |flag: bool| if flag { "ON" } else { "OFF" };
        match self {
            OptionItem::MusicVolume => {
                format!("MUSIC VOLUME: < {:.0}% >", config.music_volume * 100.0)
            }
            OptionItem::SfxVolume => format!("SFX VOLUME: < {:.0}% >", config.sfx_volume * 100.0),
            OptionItem::Difficulty => format!("DIFFICULTY: < {} >", config.difficulty.label()),
            OptionItem::Fullscreen => format!("FULLSCREEN: {}", on_off(config.fullscreen)),
            OptionItem::Vsync => format!("VSYNC: {}", on_off(config.vsync)),
            OptionItem::Back => "BACK".to_string(),
        }
    }
}

/// Step `index` by `delta` inside `0..len`, wrapping at both ends.
pub fn wrap_step(index: usize, len: usize, delta: isize) -> usize {
    if len == 0 {
        return 0;
    }
    (index as isize + delta).rem_euclid(len as isize) as usize
}

/// Apply left/right/confirm to one options row. Returns `true` when the
/// player asked to leave the screen.
pub fn adjust_option(config: &mut GameConfig, item: OptionItem, intent: &MenuIntent) -> bool {
    let steps = match (intent.left, intent.right) {
        (true, false) => -1.0,
        (false, true) => 1.0,
        _ => 0.0,
    };
    match item {
        OptionItem::MusicVolume if steps != 0.0 => config.nudge_music(steps),
        OptionItem::SfxVolume if steps != 0.0 => config.nudge_sfx(steps),
        OptionItem::Difficulty => {
            if steps < 0.0 {
                config.difficulty = config.difficulty.easier();
            } else if steps > 0.0 {
                config.difficulty = config.difficulty.harder();
            }
        }
        OptionItem::Fullscreen if intent.confirm => config.fullscreen = !config.fullscreen,
        OptionItem::Vsync if intent.confirm => config.vsync = !config.vsync,
        OptionItem::Back => return intent.confirm || intent.cancel,
        _ => {}
    }
    intent.cancel
}

#[derive(Resource, Debug, Default)]
pub struct MenuCursor {
    pub main: usize,
    pub options: usize,
}

// =============================================================================
// Shared widgets
// =============================================================================

/// Index of a selectable row on the current screen.
#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
struct MenuButton(usize);

#[derive(Component, Debug, Copy, Clone, PartialEq, Eq)]
struct OptionLabel(OptionItem);

fn screen_root(mode: SceneMode) -> impl Bundle {
    (
        Node {
            width: Val::Percent(100.0),
            height: Val::Percent(100.0),
            flex_direction: FlexDirection::Column,
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            row_gap: Val::Px(10.0),
            ..default()
        },
        DespawnOnExit(mode),
    )
}

fn title(text: &str, size: f32) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(HEADER_COLOR),
        Node {
            margin: UiRect::bottom(Val::Px(20.0)),
            ..default()
        },
    )
}

fn line(text: impl Into<String>, size: f32, color: Color) -> impl Bundle {
    (
        Text::new(text),
        TextFont {
            font_size: size,
            ..default()
        },
        TextColor(color),
    )
}

fn button(index: usize) -> impl Bundle {
    (
        Button,
        Node {
            width: Val::Px(420.0),
            height: Val::Px(52.0),
            justify_content: JustifyContent::Center,
            align_items: AlignItems::Center,
            border: UiRect::all(Val::Px(3.0)),
            ..default()
        },
        BackgroundColor(BUTTON_IDLE),
        BorderColor::all(BORDER_IDLE),
        MenuButton(index),
    )
}

fn paint_buttons(
    state: Res<State<SceneMode>>,
    cursor: Res<MenuCursor>,
    mut buttons: Query<(&MenuButton, &mut BackgroundColor, &mut BorderColor)>,
) {
    let selected = match state.get() {
        SceneMode::Options => cursor.options,
        _ => cursor.main,
    };
    for (button, mut background, mut border) in &mut buttons {
        let (fill, edge) = if button.0 == selected {
            (BUTTON_SELECTED, BORDER_SELECTED)
        } else {
            (BUTTON_IDLE, BORDER_IDLE)
        };
        background.0 = fill;
        *border = BorderColor::all(edge);
    }
}

/// Mouse input for the current screen: hovering moves the cursor, a press
/// reports the row to activate.
fn pointer_choice(
    interactions: &Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    cursor: &mut usize,
) -> Option<usize> {
    let mut pressed = None;
    for (interaction, button) in interactions {
        match interaction {
            Interaction::Hovered => *cursor = button.0,
            Interaction::Pressed => {
                *cursor = button.0;
                pressed = Some(button.0);
            }
            Interaction::None => {}
        }
    }
    pressed
}

// =============================================================================
// Intro
// =============================================================================

#[derive(Resource, Debug, Default)]
struct IntroClock(f32);

fn spawn_intro(mut commands: Commands) {
    commands.insert_resource(IntroClock::default());
    commands
        .spawn(screen_root(SceneMode::Intro))
        .with_children(|parent| {
            parent.spawn(title("BLADE CLASH", 96.0));
            parent.spawn(line("press ENTER", 24.0, Color::srgb(0.7, 0.7, 0.7)));
        });
}

fn advance_intro(
    time: Res<Time>,
    keys: Res<ButtonInput<KeyCode>>,
    mut clock: ResMut<IntroClock>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    clock.0 += time.delta_secs();
    if clock.0 >= INTRO_SECONDS || menu_intent(&keys).confirm {
        director.go(SceneMode::Intro, SceneMode::Menu, &mut next);
    }
}

// =============================================================================
// Main menu
// =============================================================================

fn spawn_main_menu(mut commands: Commands) {
    commands
        .spawn(screen_root(SceneMode::Menu))
        .with_children(|parent| {
            parent.spawn(title("BLADE CLASH", 72.0));
            for (index, item) in MenuItem::ALL.iter().enumerate() {
                parent.spawn(button(index)).with_children(|button| {
                    button.spawn(line(item.label(), 28.0, Color::WHITE));
                });
            }
        });
}

fn navigate_main_menu(
    keys: Res<ButtonInput<KeyCode>>,
    interactions: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut cursor: ResMut<MenuCursor>,
    mut arena: ResMut<Arena>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    let intent = menu_intent(&keys);
    let len = MenuItem::ALL.len();
    if intent.up {
        cursor.main = wrap_step(cursor.main, len, -1);
    }
    if intent.down {
        cursor.main = wrap_step(cursor.main, len, 1);
    }

    let clicked = pointer_choice(&interactions, &mut cursor.main);
    let chosen = if intent.confirm { Some(cursor.main) } else { clicked };
    let Some(item) = chosen.and_then(|index| MenuItem::ALL.get(index)) else {
        return;
    };

    let (mode, picked_arena) = item.target();
    if let Some(picked_arena) = picked_arena {
        *arena = picked_arena;
    }
    director.go(SceneMode::Menu, mode, &mut next);
}

// =============================================================================
// Options
// =============================================================================

fn spawn_options(mut commands: Commands, config: Res<GameConfig>) {
    commands
        .spawn(screen_root(SceneMode::Options))
        .with_children(|parent| {
            parent.spawn(title("OPTIONS", 64.0));
            for (index, item) in OptionItem::ALL.iter().enumerate() {
                parent.spawn(button(index)).with_children(|button| {
                    button.spawn((line(item.label(&config), 24.0, Color::WHITE), OptionLabel(*item)));
                });
            }
            parent.spawn(line(
                "UP/DOWN select   LEFT/RIGHT adjust   ENTER toggle   ESC back",
                18.0,
                Color::srgb(0.6, 0.6, 0.6),
            ));
        });
}

fn navigate_options(
    keys: Res<ButtonInput<KeyCode>>,
    interactions: Query<(&Interaction, &MenuButton), Changed<Interaction>>,
    mut cursor: ResMut<MenuCursor>,
    mut config: ResMut<GameConfig>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    let mut intent = menu_intent(&keys);
    let len = OptionItem::ALL.len();
    if intent.up {
        cursor.options = wrap_step(cursor.options, len, -1);
    }
    if intent.down {
        cursor.options = wrap_step(cursor.options, len, 1);
    }
    if pointer_choice(&interactions, &mut cursor.options).is_some() {
        intent.confirm = true;
    }
    if !(intent.left || intent.right || intent.confirm || intent.cancel) {
        return;
    }

    let Some(&item) = OptionItem::ALL.get(cursor.options) else {
        return;
    };
    // Only touch the resource when something changes so window settings are
    // not re-applied every frame.
    let mut edited = config.clone();
    let leave = adjust_option(&mut edited, item, &intent);
    if edited != *config {
        *config = edited;
    }
    if leave {
        director.go(SceneMode::Options, SceneMode::Menu, &mut next);
    }
}

fn refresh_option_labels(config: Res<GameConfig>, mut labels: Query<(&OptionLabel, &mut Text)>) {
    if !config.is_changed() {
        return;
    }
    for (label, mut text) in &mut labels {
        text.0 = label.0.label(&config);
    }
}

fn save_options(config: Res<GameConfig>) {
    config.save();
    info!("Saved options to {:?}", config.path());
}

// =============================================================================
// Text pages and score tables
// =============================================================================

fn spawn_page(commands: &mut Commands, mode: SceneMode, page: &TextPage) {
    commands.spawn(screen_root(mode)).with_children(|parent| {
        parent.spawn(title(page.title, 56.0));
        for page_line in &page.lines {
            match page_line {
                PageLine::Header(text) => {
                    parent.spawn(line(text.clone(), 28.0, HEADER_COLOR));
                }
                PageLine::Body(text) => {
                    parent.spawn(line(text.clone(), 20.0, Color::WHITE));
                }
                PageLine::Blank => {
                    parent.spawn(Node {
                        height: Val::Px(12.0),
                        ..default()
                    });
                }
            }
        }
        parent.spawn(line("ESC or ENTER: back", 18.0, Color::srgb(0.6, 0.6, 0.6)));
    });
}

fn spawn_credits(mut commands: Commands) {
    spawn_page(&mut commands, SceneMode::Credits, &TextPage::credits());
}

fn spawn_help(mut commands: Commands) {
    spawn_page(&mut commands, SceneMode::Help, &TextPage::help());
}

pub fn duel_table(board: &ScoreBoard) -> Vec<String> {
    if board.entries().is_empty() {
        return vec!["No duel scores yet".to_string()];
    }
    board
        .entries()
        .iter()
        .enumerate()
        .map(|(rank, entry)| {
            format!(
                "{:>2}. {:<19} {:>8}  x{:<3} {:>6.1}s",
                rank + 1,
                entry.name.as_str(),
                entry.score,
                entry.combo,
                entry.time
            )
        })
        .collect()
}

pub fn runner_table(board: &RunnerBoard) -> Vec<String> {
    if board.records().is_empty() {
        return vec!["No runs recorded yet".to_string()];
    }
    board
        .records()
        .iter()
        .enumerate()
        .map(|(rank, record)| format!("{:>2}. {:>8}  {}", rank + 1, record.score, record.date))
        .collect()
}

fn spawn_high_scores(mut commands: Commands, scores: Res<ScoreBoard>, runs: Res<RunnerBoard>) {
    commands
        .spawn(screen_root(SceneMode::HighScores))
        .with_children(|parent| {
            parent.spawn(title("HIGH SCORES", 56.0));
            parent.spawn(line("DUEL", 28.0, HEADER_COLOR));
            for row in duel_table(&scores) {
                parent.spawn(line(row, 20.0, Color::WHITE));
            }
            parent.spawn(Node {
                height: Val::Px(16.0),
                ..default()
            });
            parent.spawn(line("ENDLESS RUN", 28.0, HEADER_COLOR));
            for row in runner_table(&runs) {
                parent.spawn(line(row, 20.0, Color::WHITE));
            }
            parent.spawn(line("ESC or ENTER: back", 18.0, Color::srgb(0.6, 0.6, 0.6)));
        });
}

fn leave_page(
    keys: Res<ButtonInput<KeyCode>>,
    state: Res<State<SceneMode>>,
    mut director: ResMut<Director>,
    mut next: ResMut<NextState<SceneMode>>,
) {
    let intent = menu_intent(&keys);
    if intent.cancel || intent.confirm {
        director.go(*state.get(), SceneMode::Menu, &mut next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::Difficulty;
    use crate::save_load::{PlayerName, ScoreEntry};

    fn press(f: impl FnOnce(&mut MenuIntent)) -> MenuIntent {
        let mut intent = MenuIntent::default();
        f(&mut intent);
        intent
    }

    #[test]
    fn cursor_wraps_both_ways() {
        let len = MenuItem::ALL.len();
        assert_eq!(wrap_step(0, len, -1), len - 1);
        assert_eq!(wrap_step(len - 1, len, 1), 0);
        assert_eq!(wrap_step(2, len, 1), 3);
        assert_eq!(wrap_step(0, 0, 1), 0);
    }

    #[test]
    fn gameplay_items_arm_their_arena() {
        assert_eq!(
            MenuItem::Runner.target(),
            (SceneMode::Gameplay, Some(Arena::Runner))
        );
        assert_eq!(MenuItem::Exit.target(), (SceneMode::Exit, None));
    }

    #[test]
    fn left_right_adjust_volumes_and_difficulty() {
        let mut config = GameConfig::default();
        adjust_option(&mut config, OptionItem::MusicVolume, &press(|i| i.right = true));
        assert_eq!(config.music_volume, 0.6);
        adjust_option(&mut config, OptionItem::SfxVolume, &press(|i| i.left = true));
        assert_eq!(config.sfx_volume, 0.6);
        adjust_option(&mut config, OptionItem::Difficulty, &press(|i| i.right = true));
        assert_eq!(config.difficulty, Difficulty::Hard);
        adjust_option(&mut config, OptionItem::Difficulty, &press(|i| i.right = true));
        assert_eq!(config.difficulty, Difficulty::Hard);
    }

    #[test]
    fn confirm_toggles_flags_and_back_leaves() {
        let mut config = GameConfig::default();
        let confirm = press(|i| i.confirm = true);
        assert!(!adjust_option(&mut config, OptionItem::Fullscreen, &confirm));
        assert!(config.fullscreen);
        adjust_option(&mut config, OptionItem::Vsync, &confirm);
        assert!(!config.vsync);
        assert!(adjust_option(&mut config, OptionItem::Back, &confirm));
        assert!(adjust_option(
            &mut config,
            OptionItem::MusicVolume,
            &press(|i| i.cancel = true)
        ));
    }

    #[test]
    fn option_labels_show_values() {
        let config = GameConfig::default();
        assert_eq!(OptionItem::MusicVolume.label(&config), "MUSIC VOLUME: < 50% >");
        assert_eq!(OptionItem::Vsync.label(&config), "VSYNC: ON");
    }

    #[test]
    fn tables_rank_entries() {
        let dir = tempfile::tempdir().unwrap();
        let mut board = ScoreBoard::empty(dir.path().join("scores.txt"), 10);
        assert_eq!(duel_table(&board), vec!["No duel scores yet".to_string()]);
        board.add(ScoreEntry {
            name: PlayerName::new("ace").unwrap(),
            score: 900,
            combo: 4,
            time: 12.5,
        });
        let rows = duel_table(&board);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].starts_with(" 1. ace"));
        assert!(rows[0].contains("900"));

        let mut runs = RunnerBoard::empty(dir.path().join("highscores.dat"));
        runs.add(340, "2024-05-01".to_string());
        assert_eq!(runner_table(&runs), vec![" 1.      340  2024-05-01".to_string()]);
    }
}
