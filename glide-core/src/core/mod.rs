pub mod commands;
pub mod config;
pub mod events;
pub mod media;
pub mod mpv;
pub mod state;
