//! Shared protocol crate for the arena server.
//!
//! This crate contains:
//! - The closed set of inbound/outbound event variants
//! - Snapshot payload types (cells, food, leaderboard rows)
//! - Shared types (Color)

mod error;
mod events;

pub use error::ProtocolError;
pub use events::{CellSnapshot, ClientEvent, FoodSnapshot, ScoreRow, ServerEvent};

use serde::{Deserialize, Serialize};

/// RGB color used for cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}
