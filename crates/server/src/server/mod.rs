//! WebSocket server implementation.

use crate::config::Config;
use futures_util::{SinkExt, StreamExt};
use protocol::{ClientEvent, ServerEvent};
use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{broadcast, RwLock};
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{error, info, warn};

pub mod game;
pub mod session;

pub use game::{GameState, TargetedMessage};

/// Connection tracking state (shared across connection handlers).
struct ConnectionState {
    /// Number of connections per IP address.
    ip_connections: HashMap<IpAddr, usize>,
    /// Total number of connections.
    total_connections: usize,
}

impl ConnectionState {
    fn new() -> Self {
        Self {
            ip_connections: HashMap::new(),
            total_connections: 0,
        }
    }

    /// Try to add a connection, returns true if allowed.
    fn try_add_connection(&mut self, ip: IpAddr, max_total: usize, max_per_ip: usize) -> bool {
        if self.total_connections >= max_total {
            return false;
        }

        let current = self.ip_connections.get(&ip).copied().unwrap_or(0);
        if current >= max_per_ip {
            return false;
        }

        *self.ip_connections.entry(ip).or_insert(0) += 1;
        self.total_connections += 1;
        true
    }

    /// Remove a connection.
    fn remove_connection(&mut self, ip: IpAddr) {
        if let Some(count) = self.ip_connections.get_mut(&ip) {
            if *count > 0 {
                *count -= 1;
                self.total_connections = self.total_connections.saturating_sub(1);
            }
            if *count == 0 {
                self.ip_connections.remove(&ip);
            }
        }
    }
}

/// Run the arena server.
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.server.bind, config.server.port).parse()?;
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on ws://{}", addr);

    // Connection tracking state
    let conn_state = Arc::new(RwLock::new(ConnectionState::new()));

    // Broadcast channels: world snapshots, leaderboard/presence, and
    // targeted (single-session) replies.
    let (state_tx, _state_rx) = broadcast::channel::<ServerEvent>(64);
    let (board_tx, _board_rx) = broadcast::channel::<ServerEvent>(64);
    let (targeted_tx, _targeted_rx) = broadcast::channel::<TargetedMessage>(64);

    // Shared game state; seeds the initial food supply.
    let game_state = Arc::new(RwLock::new(GameState::new(
        &config,
        state_tx.clone(),
        board_tx.clone(),
        targeted_tx.clone(),
    )));

    let max_connections = config.server.max_connections;
    let ip_limit = config.server.ip_limit;

    loop {
        let (stream, addr) = listener.accept().await?;
        let ip = addr.ip();

        {
            let mut state = conn_state.write().await;
            if !state.try_add_connection(ip, max_connections, ip_limit) {
                warn!("Connection rejected (limit reached): {}", addr);
                continue;
            }
        }

        let game_state = Arc::clone(&game_state);
        let conn_state = Arc::clone(&conn_state);
        let state_rx = state_tx.subscribe();
        let board_rx = board_tx.subscribe();
        let targeted_rx = targeted_tx.subscribe();

        tokio::spawn(async move {
            let result =
                handle_connection(stream, addr, game_state, state_rx, board_rx, targeted_rx).await;

            // Always remove from connection tracking when done
            {
                let mut state = conn_state.write().await;
                state.remove_connection(addr.ip());
            }

            if let Err(e) = result {
                error!("Connection error from {}: {}", addr, e);
            }
        });
    }
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    game_state: Arc<RwLock<GameState>>,
    mut state_rx: broadcast::Receiver<ServerEvent>,
    mut board_rx: broadcast::Receiver<ServerEvent>,
    mut targeted_rx: broadcast::Receiver<TargetedMessage>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New connection from {}", addr);

    let (mut write, mut read) = ws_stream.split();

    let session_id = {
        let mut state = game_state.write().await;
        state.add_session(addr)
    };

    // Message loop: inbound events and outbound broadcasts.
    loop {
        tokio::select! {
            msg = read.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        match ClientEvent::decode(&text) {
                            Ok(event) => {
                                // Mutation plus snapshot-build is one
                                // critical section.
                                let mut state = game_state.write().await;
                                if let Err(e) = state.handle_event(session_id, event) {
                                    warn!("Event error from {}: {}", addr, e);
                                }
                            }
                            Err(e) => {
                                // Malformed input is dropped, never answered.
                                warn!("Malformed event from {}: {}", addr, e);
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        info!("Client {} disconnected", addr);
                        break;
                    }
                    Some(Err(e)) => {
                        error!("WebSocket error from {}: {}", addr, e);
                        break;
                    }
                    None => {
                        break;
                    }
                    _ => {}
                }
            }
            event = state_rx.recv() => {
                if let Ok(event) = event {
                    if !send_event(&mut write, &event, addr).await {
                        break;
                    }
                }
            }
            event = board_rx.recv() => {
                if let Ok(event) = event {
                    if !send_event(&mut write, &event, addr).await {
                        break;
                    }
                }
            }
            msg = targeted_rx.recv() => {
                if let Ok(msg) = msg {
                    if msg.session_id != session_id {
                        continue;
                    }
                    if !send_event(&mut write, &msg.event, addr).await {
                        break;
                    }
                }
            }
        }
    }

    // Tear down the session
    {
        let mut state = game_state.write().await;
        state.remove_session(session_id);
    }

    Ok(())
}

/// Encode and send one event. Returns false when the connection is gone.
async fn send_event<S>(write: &mut S, event: &ServerEvent, addr: SocketAddr) -> bool
where
    S: SinkExt<Message> + Unpin,
    S::Error: std::fmt::Display,
{
    let text = match event.encode() {
        Ok(text) => text,
        Err(e) => {
            error!("Failed to encode event for {}: {}", addr, e);
            return true;
        }
    };
    if let Err(e) = write.send(Message::Text(text.into())).await {
        warn!("Failed to send to {}: {}", addr, e);
        return false;
    }
    true
}
