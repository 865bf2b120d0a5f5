//! Event definitions for the arena wire protocol.
//!
//! Every frame on the wire is a JSON object of the form
//! `{"event": "<name>", "data": <payload>}`. The event names match what
//! the browser clients emit; anything outside this closed set fails to
//! decode and is dropped at the boundary.

use crate::{Color, ProtocolError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Events sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientEvent {
    /// Join the spatial game with a display name.
    Join { name: String },
    /// Steer the player's cell. `(dx, dy)` is a unit-scale direction.
    Move { dx: f32, dy: f32 },
    /// Report a new score for `(game, name)`. Later updates always win.
    #[serde(rename_all = "camelCase")]
    ScoreUpdate { name: String, score: f64, game: String },
    /// Announce a player on a game's board before they have scored.
    #[serde(rename_all = "camelCase")]
    PlayerJoined { name: String, game: String },
    /// Rename a player, merging score tables by taking the maximum.
    #[serde(rename_all = "camelCase")]
    NameChange {
        old_name: String,
        new_name: String,
        game: String,
    },
    /// Subscribe to a game's leaderboard without joining it.
    #[serde(rename_all = "camelCase")]
    JoinGame { game: String },
}

impl ClientEvent {
    /// Decode an event from a text frame.
    pub fn decode(text: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(text).map_err(ProtocolError::Malformed)
    }
}

/// Events sent by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full world snapshot: every cell (keyed by session id) and every
    /// live food pellet. Always sent whole, never as a delta.
    State {
        cells: BTreeMap<u32, CellSnapshot>,
        foods: Vec<FoodSnapshot>,
    },
    /// One game's score table, ordered descending by score.
    Leaderboard(Vec<ScoreRow>),
    /// Global online/offline map, keyed by display name.
    OnlineStatus(BTreeMap<String, bool>),
}

impl ServerEvent {
    /// Encode the event as a text frame.
    pub fn encode(&self) -> Result<String, ProtocolError> {
        serde_json::to_string(self).map_err(ProtocolError::Encode)
    }
}

/// One cell in a world snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub id: u32,
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Color,
    #[serde(rename = "displayName")]
    pub display_name: String,
}

/// One food pellet in a world snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FoodSnapshot {
    pub x: f32,
    pub y: f32,
}

/// One row of a game's leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub name: String,
    pub score: f64,
}
