//! Game state and event dispatch.
//!
//! One `GameState` owns every mutable structure: the session registry,
//! the world, and the leaderboard/presence tracker. All mutation flows
//! through [`GameState::handle_event`] under the server's write lock,
//! and each handler pushes its broadcasts before the lock is released,
//! so no client ever observes a mutation without a consistent snapshot
//! following it.

use crate::config::Config;
use crate::engine;
use crate::leaderboard::Leaderboard;
use crate::world::World;
use protocol::{ClientEvent, ServerEvent};
use std::net::SocketAddr;
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::session::Session;

/// A message for a single session (snapshot replies on join).
#[derive(Debug, Clone)]
pub struct TargetedMessage {
    /// Target session id.
    pub session_id: u32,
    /// The event to deliver.
    pub event: ServerEvent,
}

/// Main game state.
pub struct GameState {
    pub config: Config,

    // ID counter
    next_session_id: u32,

    // Connected sessions
    pub sessions: std::collections::HashMap<u32, Session>,

    // Spatial game world
    pub world: World,

    // Cross-game score tables and presence
    pub leaderboard: Leaderboard,

    // World snapshot broadcast channel
    state_tx: broadcast::Sender<ServerEvent>,

    // Leaderboard/presence broadcast channel
    board_tx: broadcast::Sender<ServerEvent>,

    // Targeted message channel
    targeted_tx: broadcast::Sender<TargetedMessage>,
}

impl GameState {
    /// Create a new game state and seed the initial food supply.
    pub fn new(
        config: &Config,
        state_tx: broadcast::Sender<ServerEvent>,
        board_tx: broadcast::Sender<ServerEvent>,
        targeted_tx: broadcast::Sender<TargetedMessage>,
    ) -> Self {
        let mut world = World::new(&config.world);
        world.spawn_food(&config.food);

        Self {
            config: config.clone(),
            next_session_id: 1,
            sessions: std::collections::HashMap::new(),
            world,
            leaderboard: Leaderboard::new(),
            state_tx,
            board_tx,
            targeted_tx,
        }
    }

    /// Register a new session.
    pub fn add_session(&mut self, addr: SocketAddr) -> u32 {
        let id = self.next_session_id;
        self.next_session_id += 1;
        self.sessions.insert(id, Session::new(id, addr));
        info!("Session {} connected from {}", id, addr);
        id
    }

    /// Tear down a session: remove its cell from the world, flip its
    /// presence offline, and release the id.
    pub fn remove_session(&mut self, id: u32) {
        let Some(session) = self.sessions.remove(&id) else {
            return;
        };
        info!("Session {} ({}) disconnected", id, session.addr);

        if self.world.remove_cell(id).is_some() {
            self.broadcast_state();
        }
        if let Some(name) = session.name {
            self.leaderboard.set_offline(&name);
            self.broadcast_presence();
        }
    }

    /// Handle one inbound event. This is the single mutation path; the
    /// caller holds the write lock for the whole call.
    pub fn handle_event(&mut self, session_id: u32, event: ClientEvent) -> anyhow::Result<()> {
        let session = self
            .sessions
            .get_mut(&session_id)
            .ok_or_else(|| anyhow::anyhow!("Session not found"))?;
        session.touch();

        if !matches!(event, ClientEvent::Move { .. }) {
            // Move events are very frequent; avoid logging them.
            debug!("Session {} sent {:?}", session_id, event);
        }

        match event {
            ClientEvent::Join { name } => self.handle_join(session_id, name),
            ClientEvent::Move { dx, dy } => self.handle_move(session_id, dx, dy),
            ClientEvent::ScoreUpdate { name, score, game } => {
                self.handle_score_update(session_id, name, score, game)
            }
            ClientEvent::PlayerJoined { name, game } => {
                self.handle_player_joined(session_id, name, game)
            }
            ClientEvent::NameChange {
                old_name,
                new_name,
                game,
            } => self.handle_name_change(session_id, old_name, new_name, game),
            ClientEvent::JoinGame { game } => self.handle_join_game(session_id, game),
        }

        Ok(())
    }

    /// Join the spatial game: bind the name, spawn a cell (unless this
    /// session already owns one), reply with a snapshot, and broadcast.
    fn handle_join(&mut self, session_id: u32, name: String) {
        let name: String = name
            .chars()
            .take(self.config.player.max_name_length)
            .collect();

        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.name = Some(name.clone());
        }
        self.leaderboard.set_online(&name);

        if self.world.cell(session_id).is_some() {
            // Rejoin: keep the existing cell, just refresh the name.
            if let Some(cell) = self.world.cell_mut(session_id) {
                cell.display_name = name;
            }
        } else {
            let cell = self.world.spawn_cell(session_id, name, &self.config.player);
            info!(
                "Session {} joined as '{}' at ({:.0}, {:.0})",
                session_id, cell.display_name, cell.position.x, cell.position.y
            );
        }

        // The joining client gets the snapshot directly so it can render
        // before the next broadcast.
        let (cells, foods) = self.world.snapshot();
        self.send_targeted(session_id, ServerEvent::State { cells, foods });
        self.broadcast_state();
        self.broadcast_presence();
    }

    /// One movement step. Stale or malformed moves are silent no-ops.
    fn handle_move(&mut self, session_id: u32, dx: f32, dy: f32) {
        let Some(outcome) = engine::apply_move(&mut self.world, &self.config, session_id, dx, dy)
        else {
            return;
        };
        if !outcome.absorbed.is_empty() {
            debug!(
                "Session {} absorbed {} cell(s)",
                session_id,
                outcome.absorbed.len()
            );
        }
        self.broadcast_state();
    }

    fn handle_score_update(&mut self, session_id: u32, name: String, score: f64, game: String) {
        self.bind_identity(session_id, &name, &game);
        self.leaderboard.record_score(&game, &name, score);
        self.broadcast_board(&game);
        self.broadcast_presence();
    }

    fn handle_player_joined(&mut self, session_id: u32, name: String, game: String) {
        self.bind_identity(session_id, &name, &game);
        self.leaderboard.ensure_joined(&game, &name);
        self.broadcast_board(&game);
        self.broadcast_presence();
    }

    fn handle_name_change(
        &mut self,
        session_id: u32,
        old_name: String,
        new_name: String,
        game: String,
    ) {
        self.leaderboard.rename(&game, &old_name, &new_name);
        self.bind_identity(session_id, &new_name, &game);

        // Keep the world's view of this player consistent.
        let mut cell_renamed = false;
        if let Some(cell) = self.world.cell_mut(session_id) {
            if cell.display_name == old_name {
                cell.display_name = new_name.clone();
                cell_renamed = true;
            }
        }

        self.broadcast_board(&game);
        self.broadcast_presence();
        if cell_renamed {
            self.broadcast_state();
        }
    }

    /// Subscribe to a game's board: reply with the current table and
    /// presence, without putting the session on the board.
    fn handle_join_game(&mut self, session_id: u32, game: String) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.game = Some(game.clone());
        }
        self.leaderboard.ensure_board(&game);
        self.send_targeted(
            session_id,
            ServerEvent::Leaderboard(self.leaderboard.rows(&game)),
        );
        self.send_targeted(
            session_id,
            ServerEvent::OnlineStatus(self.leaderboard.presence()),
        );
    }

    fn bind_identity(&mut self, session_id: u32, name: &str, game: &str) {
        if let Some(session) = self.sessions.get_mut(&session_id) {
            session.name = Some(name.to_string());
            session.game = Some(game.to_string());
        }
    }

    fn broadcast_state(&self) {
        let (cells, foods) = self.world.snapshot();
        let _ = self.state_tx.send(ServerEvent::State { cells, foods });
    }

    fn broadcast_board(&self, game: &str) {
        let _ = self
            .board_tx
            .send(ServerEvent::Leaderboard(self.leaderboard.rows(game)));
    }

    fn broadcast_presence(&self) {
        let _ = self
            .board_tx
            .send(ServerEvent::OnlineStatus(self.leaderboard.presence()));
    }

    fn send_targeted(&self, session_id: u32, event: ServerEvent) {
        let _ = self.targeted_tx.send(TargetedMessage { session_id, event });
    }
}
