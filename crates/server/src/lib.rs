//! Arena game server library.

pub mod config;
pub mod engine;
pub mod entity;
pub mod leaderboard;
pub mod server;
pub mod world;

// Re-export commonly used types
pub use config::Config;
pub use server::{run, GameState, TargetedMessage};
