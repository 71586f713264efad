pub mod cli;
pub mod commands;
pub mod config;
pub mod desktop;
pub mod error;
pub mod files;
pub mod hotkeys;
pub mod interactive;
pub mod logging;
pub mod no_matches;
