// lib.rs - Public API for the game crate
// Every module is public so main.rs only has to assemble plugins.

pub mod ai;
pub mod animation;
pub mod audio;
pub mod boss;
pub mod combat;
pub mod config;
pub mod duel;
pub mod fighter;
pub mod health;
pub mod input;
pub mod menu;
pub mod moves;
pub mod pages;
pub mod particles;
pub mod runner;
pub mod save_load;
pub mod scene;
