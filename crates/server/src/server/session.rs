//! Per-connection session state.

use std::net::SocketAddr;

/// A connected client session. Identity is bound lazily: the id exists
/// from the moment the socket opens, the name and game only after the
/// first join-class event.
#[derive(Debug)]
pub struct Session {
    /// Unique session id.
    pub id: u32,
    /// Remote address.
    pub addr: SocketAddr,
    /// Display name, once a `join`/`scoreUpdate`/`playerJoined` event
    /// has carried one.
    pub name: Option<String>,
    /// Leaderboard game this session participates in, if any.
    pub game: Option<String>,
    /// Last activity timestamp.
    pub last_activity: std::time::Instant,
}

impl Session {
    pub fn new(id: u32, addr: SocketAddr) -> Self {
        Self {
            id,
            addr,
            name: None,
            game: None,
            last_activity: std::time::Instant::now(),
        }
    }

    /// Update activity timestamp.
    pub fn touch(&mut self) {
        self.last_activity = std::time::Instant::now();
    }
}
