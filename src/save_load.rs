use std::fmt;
use std::path::PathBuf;

use anyhow::{bail, ensure, Context};
use bevy::prelude::*;
use chrono::{Local, NaiveDate};

pub struct SaveLoadPlugin;

impl Plugin for SaveLoadPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(PreStartup, load_score_boards);
    }
}

pub const SCORE_FILE: &str = "scores.txt";
pub const RUNNER_FILE: &str = "highscores.dat";
pub const MAX_SCORES: usize = 10;
pub const MAX_RUNNER_RECORDS: usize = 5;

// =============================================================================
// Player names
// =============================================================================

pub const NAME_MAX_LEN: usize = 19;

/// A name that is safe to write into the whitespace-separated score file:
/// 1 to 19 characters, none of them whitespace or control characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerName(String);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NameError {
    Empty,
    TooLong(usize),
    InvalidChar(char),
}

impl fmt::Display for NameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameError::Empty => write!(f, "name is empty"),
            NameError::TooLong(len) => {
                write!(f, "name is {} characters, at most {} allowed", len, NAME_MAX_LEN)
            }
            NameError::InvalidChar(c) => write!(f, "name contains {:?}", c),
        }
    }
}

impl std::error::Error for NameError {}

impl PlayerName {
    pub fn new(raw: &str) -> Result<Self, NameError> {
        if raw.is_empty() {
            return Err(NameError::Empty);
        }
        if let Some(bad) = raw.chars().find(|c| c.is_whitespace() || c.is_control()) {
            return Err(NameError::InvalidChar(bad));
        }
        let len = raw.chars().count();
        if len > NAME_MAX_LEN {
            return Err(NameError::TooLong(len));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayerName {
    fn default() -> Self {
        Self("PLAYER".to_string())
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Duel scores (scores.txt)
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct ScoreEntry {
    pub name: PlayerName,
    pub score: u32,
    pub combo: u32,
    /// Seconds the duel lasted.
    pub time: f32,
}

/// Top duel scores, best first, never longer than `max`.
#[derive(Resource, Debug, Clone)]
pub struct ScoreBoard {
    entries: Vec<ScoreEntry>,
    max: usize,
    path: PathBuf,
}

impl Default for ScoreBoard {
    fn default() -> Self {
        Self::empty(SCORE_FILE, MAX_SCORES)
    }
}

impl ScoreBoard {
    pub fn empty(path: impl Into<PathBuf>, max: usize) -> Self {
        Self {
            entries: Vec::new(),
            max,
            path: path.into(),
        }
    }

    /// Read the board from `path`. Missing or corrupt files give an empty board.
    pub fn load(path: impl Into<PathBuf>, max: usize) -> Self {
        let mut board = Self::empty(path, max);
        let Some(text) = storage::read_text(&board.path) else {
            return board;
        };
        match parse_scores(&text) {
            Ok(entries) => {
                board.entries = entries;
                board.normalize();
                info!("Loaded {} duel scores from {:?}", board.entries.len(), board.path);
            }
            Err(e) => warn!("Ignoring corrupt score file {:?}: {:#}", board.path, e),
        }
        board
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn max(&self) -> usize {
        self.max
    }

    pub fn is_high_score(&self, score: u32) -> bool {
        match self.entries.last() {
            Some(last) if self.entries.len() >= self.max => score > last.score,
            _ => true,
        }
    }

    pub fn add(&mut self, entry: ScoreEntry) {
        self.entries.push(entry);
        self.normalize();
    }

    pub fn save(&self) {
        storage::write(&self.path, render_scores(&self.entries).as_bytes());
    }

    fn normalize(&mut self) {
        // Stable sort keeps earlier entries ahead of later ties.
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(self.max);
    }
}

pub fn parse_scores(text: &str) -> anyhow::Result<Vec<ScoreEntry>> {
    let mut entries = Vec::new();
    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        let &[name, score, combo, time] = fields.as_slice() else {
            bail!("line {}: expected 4 fields, found {}", number + 1, fields.len());
        };
        entries.push(ScoreEntry {
            name: PlayerName::new(name).with_context(|| format!("line {}", number + 1))?,
            score: score
                .parse()
                .with_context(|| format!("line {}: bad score {:?}", number + 1, score))?,
            combo: combo
                .parse()
                .with_context(|| format!("line {}: bad combo {:?}", number + 1, combo))?,
            time: time
                .parse()
                .with_context(|| format!("line {}: bad time {:?}", number + 1, time))?,
        });
    }
    Ok(entries)
}

pub fn render_scores(entries: &[ScoreEntry]) -> String {
    entries
        .iter()
        .map(|e| format!("{} {} {} {}\n", e.name, e.score, e.combo, e.time))
        .collect()
}

// =============================================================================
// Runner records (highscores.dat)
//
// Layout, all little-endian:
//   i32 record count
//   count x { i32 score, [u8; 20] NUL-padded date }
// =============================================================================

const DATE_FIELD_LEN: usize = 20;
const RECORD_LEN: usize = 4 + DATE_FIELD_LEN;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerRecord {
    pub score: i32,
    /// `YYYY-MM-DD`; anything past 19 bytes is dropped when saving.
    pub date: String,
}

#[derive(Resource, Debug, Clone)]
pub struct RunnerBoard {
    records: Vec<RunnerRecord>,
    path: PathBuf,
}

impl Default for RunnerBoard {
    fn default() -> Self {
        Self::empty(RUNNER_FILE)
    }
}

impl RunnerBoard {
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            records: Vec::new(),
            path: path.into(),
        }
    }

    pub fn load(path: impl Into<PathBuf>) -> Self {
        let mut board = Self::empty(path);
        let Some(bytes) = storage::read_bytes(&board.path) else {
            return board;
        };
        match decode_records(&bytes) {
            Ok(records) => {
                board.records = records;
                board.normalize();
                info!("Loaded {} runner records from {:?}", board.records.len(), board.path);
            }
            Err(e) => warn!("Ignoring corrupt runner records {:?}: {:#}", board.path, e),
        }
        board
    }

    pub fn records(&self) -> &[RunnerRecord] {
        &self.records
    }

    pub fn qualifies(&self, score: i32) -> bool {
        match self.records.last() {
            Some(last) if self.records.len() >= MAX_RUNNER_RECORDS => score > last.score,
            _ => true,
        }
    }

    pub fn add(&mut self, score: i32, date: String) {
        self.records.push(RunnerRecord { score, date });
        self.normalize();
    }

    pub fn save(&self) {
        storage::write(&self.path, &encode_records(&self.records));
    }

    fn normalize(&mut self) {
        self.records.sort_by(|a, b| b.score.cmp(&a.score));
        self.records.truncate(MAX_RUNNER_RECORDS);
    }
}

pub fn encode_records(records: &[RunnerRecord]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + records.len() * RECORD_LEN);
    out.extend_from_slice(&(records.len() as i32).to_le_bytes());
    for record in records {
        out.extend_from_slice(&record.score.to_le_bytes());
        let mut date = [0u8; DATE_FIELD_LEN];
        let mut len = record.date.len().min(DATE_FIELD_LEN - 1);
        while !record.date.is_char_boundary(len) {
            len -= 1;
        }
        date[..len].copy_from_slice(&record.date.as_bytes()[..len]);
        out.extend_from_slice(&date);
    }
    out
}

pub fn decode_records(bytes: &[u8]) -> anyhow::Result<Vec<RunnerRecord>> {
    let header: [u8; 4] = bytes
        .get(..4)
        .context("missing record count")?
        .try_into()
        .context("missing record count")?;
    let count = i32::from_le_bytes(header);
    ensure!(count >= 0, "negative record count {}", count);

    let body = &bytes[4..];
    let count = count as usize;
    ensure!(
        body.len() >= count * RECORD_LEN,
        "{} records announced but only {} bytes follow",
        count,
        body.len()
    );

    body.chunks_exact(RECORD_LEN)
        .take(count)
        .map(|chunk| {
            let (score, date) = chunk.split_at(4);
            let score = i32::from_le_bytes([score[0], score[1], score[2], score[3]]);
            let end = date.iter().position(|&b| b == 0).unwrap_or(date.len());
            let date = std::str::from_utf8(&date[..end]).context("date is not utf-8")?;
            Ok(RunnerRecord {
                score,
                date: date.to_string(),
            })
        })
        .collect()
}

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Today's date on the player's clock, as `YYYY-MM-DD`.
pub fn today() -> String {
    date_label(Local::now().date_naive())
}

fn date_label(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

// =============================================================================
// Storage backend: Native
//
// Files live next to the executable's working directory, like the config.
// =============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub(crate) mod storage {
    use bevy::prelude::*;
    use std::path::Path;

    pub fn read_text(path: &Path) -> Option<String> {
        let bytes = read_bytes(path)?;
        match String::from_utf8(bytes) {
            Ok(text) => Some(text),
            Err(e) => {
                error!("{:?} is not valid UTF-8: {}. Using defaults.", path, e);
                None
            }
        }
    }

    pub fn read_bytes(path: &Path) -> Option<Vec<u8>> {
        if !path.exists() {
            info!("No file at {:?}. Starting fresh.", path);
            return None;
        }
        match std::fs::read(path) {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                error!("Failed to read {:?}: {}. Using defaults.", path, e);
                None
            }
        }
    }

    pub fn write(path: &Path, contents: &[u8]) {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if let Err(e) = std::fs::create_dir_all(parent) {
                error!("Failed to create directory {:?}: {}", parent, e);
                return;
            }
        }
        match std::fs::write(path, contents) {
            Ok(()) => info!("Saved {:?}", path),
            Err(e) => error!("Failed to write {:?}: {}", path, e),
        }
    }
}

// =============================================================================
// Storage backend: WASM (browser)
// =============================================================================

#[cfg(target_arch = "wasm32")]
pub(crate) mod storage {
    use bevy::prelude::*;
    use std::path::Path;

    // TODO: back these with localStorage (web-sys) once there is a web build.
    pub fn read_text(path: &Path) -> Option<String> {
        warn!("No persistent storage on this target; {:?} starts empty.", path);
        None
    }

    pub fn read_bytes(path: &Path) -> Option<Vec<u8>> {
        warn!("No persistent storage on this target; {:?} starts empty.", path);
        None
    }

    pub fn write(path: &Path, _contents: &[u8]) {
        warn!("No persistent storage on this target; {:?} not saved.", path);
    }
}

fn load_score_boards(mut commands: Commands) {
    commands.insert_resource(ScoreBoard::load(SCORE_FILE, MAX_SCORES));
    commands.insert_resource(RunnerBoard::load(RUNNER_FILE));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> ScoreEntry {
        ScoreEntry {
            name: PlayerName::new(name).unwrap(),
            score,
            combo: 3,
            time: 42.5,
        }
    }

    #[test]
    fn names_are_validated() {
        assert!(PlayerName::new("RONIN_7").is_ok());
        assert_eq!(PlayerName::new(""), Err(NameError::Empty));
        assert_eq!(PlayerName::new("two words"), Err(NameError::InvalidChar(' ')));
        assert_eq!(
            PlayerName::new(&"x".repeat(20)),
            Err(NameError::TooLong(20))
        );
        assert!(PlayerName::new(&"x".repeat(19)).is_ok());
    }

    #[test]
    fn board_stays_sorted_and_bounded() {
        let mut board = ScoreBoard::empty("unused.txt", MAX_SCORES);
        for (i, score) in [50, 900, 10, 300, 300, 75, 1, 1200, 640, 33, 7, 88, 450]
            .into_iter()
            .enumerate()
        {
            board.add(entry(&format!("P{i}"), score));
            assert!(board.entries().len() <= MAX_SCORES);
            assert!(board
                .entries()
                .windows(2)
                .all(|pair| pair[0].score >= pair[1].score));
        }
        assert_eq!(board.entries()[0].score, 1200);
    }

    #[test]
    fn high_score_threshold() {
        let mut board = ScoreBoard::empty("unused.txt", 3);
        assert!(board.is_high_score(0));
        for score in [100, 200, 300] {
            board.add(entry("A", score));
        }
        assert!(!board.is_high_score(100));
        assert!(board.is_high_score(101));
    }

    #[test]
    fn twelve_entries_load_as_top_ten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.txt");
        let text: String = (1..=12).map(|i| format!("P{i} {} 2 10.5\n", i * 100)).collect();
        std::fs::write(&path, text).unwrap();

        let board = ScoreBoard::load(&path, MAX_SCORES);
        assert_eq!(board.entries().len(), 10);
        assert_eq!(board.entries()[0].score, 1200);
        assert_eq!(board.entries()[9].score, 300);

        board.save();
        let reloaded = ScoreBoard::load(&path, MAX_SCORES);
        assert_eq!(reloaded.entries(), board.entries());
        assert_eq!(std::fs::read_to_string(&path).unwrap().lines().count(), 10);
    }

    #[test]
    fn missing_or_corrupt_score_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let missing = ScoreBoard::load(dir.path().join("nope.txt"), MAX_SCORES);
        assert!(missing.entries().is_empty());

        let path = dir.path().join("scores.txt");
        std::fs::write(&path, "ACE 100 2 3.0\nBROKEN line\n").unwrap();
        let corrupt = ScoreBoard::load(&path, MAX_SCORES);
        assert!(corrupt.entries().is_empty());
    }

    #[test]
    fn score_lines_round_trip_text() {
        let entries = vec![entry("ACE", 900), entry("BOB", 12)];
        let parsed = parse_scores(&render_scores(&entries)).unwrap();
        assert_eq!(parsed, entries);
    }

    #[test]
    fn runner_records_use_fixed_layout() {
        let records = vec![RunnerRecord {
            score: 1234,
            date: "2025-03-09".to_string(),
        }];
        let bytes = encode_records(&records);
        assert_eq!(bytes.len(), 4 + 24);
        assert_eq!(&bytes[..4], &1i32.to_le_bytes());
        assert_eq!(&bytes[4..8], &1234i32.to_le_bytes());
        assert_eq!(&bytes[8..18], b"2025-03-09");
        assert!(bytes[18..].iter().all(|&b| b == 0));
        assert_eq!(decode_records(&bytes).unwrap(), records);
    }

    #[test]
    fn truncated_runner_file_is_rejected() {
        let mut bytes = encode_records(&[RunnerRecord {
            score: 5,
            date: "2025-01-01".into(),
        }]);
        bytes.truncate(10);
        assert!(decode_records(&bytes).is_err());
        assert!(decode_records(&[]).is_err());
        assert!(decode_records(&(-1i32).to_le_bytes()).is_err());
    }

    #[test]
    fn runner_board_keeps_top_five() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("highscores.dat");
        let mut board = RunnerBoard::empty(&path);
        for score in [10, 60, 20, 50, 30, 40, 5] {
            if board.qualifies(score) {
                board.add(score, "2025-01-01".into());
            }
        }
        let scores: Vec<i32> = board.records().iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![60, 50, 40, 30, 20]);
        assert!(!board.qualifies(20));

        board.save();
        let reloaded = RunnerBoard::load(&path);
        assert_eq!(reloaded.records(), board.records());
    }

    #[test]
    fn dates_are_zero_padded() {
        let leap = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(date_label(leap), "2024-02-29");
        let new_year = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap();
        assert_eq!(date_label(new_year), "1970-01-01");
    }

    #[test]
    fn today_uses_the_local_calendar() {
        let before = date_label(Local::now().date_naive());
        let stamped = today();
        let after = date_label(Local::now().date_naive());
        assert!(stamped == before || stamped == after, "{stamped} not local");
        assert_eq!(stamped.len(), 10);
    }
}
