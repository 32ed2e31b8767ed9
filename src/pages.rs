//! Credits and help screens: plain text files with optional `#` headers.

use std::path::Path;

use crate::save_load::storage;

pub const CREDITS_FILE: &str = "credits.txt";
pub const HELP_FILE: &str = "help.txt";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageLine {
    Header(String),
    Body(String),
    Blank,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextPage {
    pub title: &'static str,
    pub lines: Vec<PageLine>,
}

const CREDITS_FALLBACK: &str = "\
# DEVELOPMENT
Design and programming: the Blade Clash team
Animation: the Blade Clash team

# BUILT WITH
Bevy
Rust

# THANKS
Everyone who played the early builds";

const HELP_FALLBACK: &str = "\
# DUEL CONTROLS
LEFT / RIGHT: move
SPACE: jump
A: block (quarter damage, grounded only)
J: slash
K: demon cut (grounded)
L: whirlwind (grounded)
O: thousand cuts
U + I: dragon flame finisher (grounded)
ESC: back to menu

# RUNNER CONTROLS
SPACE or W: jump over low blades
A or LEFT CLICK: slash incoming blades for bonus points

# TIPS
Every swing raises your combo and multiplies the points of each hit
Taking damage resets the combo
Specials have cooldowns, so pick your moment
Higher difficulty makes the sorcerer faster to act";

pub fn parse_page(text: &str) -> Vec<PageLine> {
    text.lines()
        .map(|line| {
            let line = line.trim_end();
            if let Some(header) = line.strip_prefix('#') {
                PageLine::Header(header.trim().to_string())
            } else if line.trim().is_empty() {
                PageLine::Blank
            } else {
                PageLine::Body(line.to_string())
            }
        })
        .collect()
}

impl TextPage {
    pub fn load(title: &'static str, path: impl AsRef<Path>, fallback: &str) -> Self {
        let text = storage::read_text(path.as_ref());
        let lines = match text.as_deref().map(parse_page) {
            Some(lines) if !lines.is_empty() => lines,
            _ => parse_page(fallback),
        };
        Self { title, lines }
    }

    pub fn credits() -> Self {
        Self::load("CREDITS", CREDITS_FILE, CREDITS_FALLBACK)
    }

    pub fn help() -> Self {
        Self::load("HELP & CONTROLS", HELP_FILE, HELP_FALLBACK)
    }
}
