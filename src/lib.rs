//! Playback and volume coordination core for the VidGo desktop player.
//!
//! [`player::PlayerController`] owns the playlist, the playback state, the
//! system volume mirror and the controls auto-hide timer, and serializes every
//! change to them on a single task. Everything else talks to it through a
//! [`player::PlayerHandle`].

pub mod config;
pub mod events;
pub mod models;
pub mod player;
pub mod services;
pub mod utils;

pub use config::Config;
pub use player::{PlayerController, PlayerHandle};
