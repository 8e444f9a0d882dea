//! # Loopback Session Example
//!
//! Shows how to implement the [`Transport`] and [`Connector`] traits with an
//! in-process loopback channel, and drives a tiny fake game server through it.
//! This is useful for:
//!
//! - **Testing** — exercise your game logic without a real server
//! - **Custom backends** — adapt any I/O layer (TCP, QUIC, WebRTC data channels)
//!
//! The fake server drops the first connection abnormally so the reconnect
//! path is visible in the output.
//!
//! ## Running
//!
//! ```sh
//! RUST_LOG=info cargo run --example loopback_session
//! ```

use async_trait::async_trait;
use game_sync_client::protocol::{ClientMessage, Player, Position, ServerMessage};
use game_sync_client::{
    CloseInfo, Connector, ReconnectPolicy, SyncClient, SyncConfig, SyncError, SyncEvent,
    Transport, TransportEvent,
};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;

// ─────────────────────────────────────────────────────────────────────
// Step 1: Define a channel-based "loopback" transport
// ─────────────────────────────────────────────────────────────────────

/// Client half of a loopback connection.
pub struct LoopbackTransport {
    /// Messages the client sends go here (server reads from the other end).
    tx: mpsc::UnboundedSender<String>,
    /// Frames and closures from the server arrive here.
    rx: mpsc::UnboundedReceiver<TransportEvent>,
}

/// Server half of a loopback connection.
pub struct LoopbackServer {
    /// Read what the client sent.
    pub rx: mpsc::UnboundedReceiver<String>,
    /// Send frames or a closure to the client.
    pub tx: mpsc::UnboundedSender<TransportEvent>,
}

impl LoopbackServer {
    fn send(&self, msg: &ServerMessage) {
        if let Ok(json) = serde_json::to_string(msg) {
            let _ = self.tx.send(TransportEvent::Message(json));
        }
    }
}

/// Create a connected `(transport, server)` pair.
fn loopback_pair() -> (LoopbackTransport, LoopbackServer) {
    let (client_tx, server_rx) = mpsc::unbounded_channel();
    let (server_tx, client_rx) = mpsc::unbounded_channel();
    let transport = LoopbackTransport {
        tx: client_tx,
        rx: client_rx,
    };
    let server = LoopbackServer {
        rx: server_rx,
        tx: server_tx,
    };
    (transport, server)
}

// ─────────────────────────────────────────────────────────────────────
// Step 2: Implement Transport and Connector
// ─────────────────────────────────────────────────────────────────────

#[async_trait]
impl Transport for LoopbackTransport {
    async fn send(&mut self, message: String) -> Result<(), SyncError> {
        self.tx
            .send(message)
            .map_err(|e| SyncError::TransportSend(e.to_string()))
    }

    /// Cancel-safe because `mpsc::UnboundedReceiver::recv` is.
    async fn recv(&mut self) -> Result<TransportEvent, SyncError> {
        // A vanished server looks like an abnormal closure.
        Ok(self
            .rx
            .recv()
            .await
            .unwrap_or(TransportEvent::Closed(CloseInfo::default())))
    }

    /// Close is a no-op for channels; dropping is sufficient.
    async fn close(&mut self, _code: u16) -> Result<(), SyncError> {
        Ok(())
    }
}

/// Hands the server half of every new connection to the fake server.
struct LoopbackConnector {
    accepted: mpsc::UnboundedSender<LoopbackServer>,
}

#[async_trait]
impl Connector for LoopbackConnector {
    type Transport = LoopbackTransport;

    async fn connect(&self, endpoint: &str) -> Result<LoopbackTransport, SyncError> {
        let (transport, server) = loopback_pair();
        self.accepted
            .send(server)
            .map_err(|_| SyncError::Connection(format!("{endpoint}: server is gone")))?;
        Ok(transport)
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 3: A fake game server
// ─────────────────────────────────────────────────────────────────────

async fn fake_server(mut accepted: mpsc::UnboundedReceiver<LoopbackServer>) {
    let zed = Player {
        id: "npc-1".into(),
        name: "Zed".into(),
        position: Position::new(3.0, 1.0, 3.0),
        level: 7,
        health: 80,
        max_health: 100,
    };
    let mut connection = 0u32;

    while let Some(mut conn) = accepted.recv().await {
        connection += 1;
        tracing::info!("Server: connection #{connection} accepted");

        while let Some(frame) = conn.rx.recv().await {
            let Ok(msg) = serde_json::from_str::<ClientMessage>(&frame) else {
                continue;
            };
            match msg {
                ClientMessage::Join { player_name } => {
                    tracing::info!("Server: {player_name} joined");
                    conn.send(&ServerMessage::GameState {
                        players: HashMap::from([(zed.id.clone(), zed.clone())]),
                    });
                    conn.send(&ServerMessage::PlayerMoved {
                        player_id: zed.id.clone(),
                        position: Position::new(4.0, 1.0, 3.0),
                    });
                }
                ClientMessage::ChatMessage { message } => {
                    conn.send(&ServerMessage::ChatMessage {
                        player_name: "Zed".into(),
                        message: format!("you said \"{message}\""),
                    });
                    if connection == 1 {
                        // Drop the first connection the hard way.
                        let _ = conn
                            .tx
                            .send(TransportEvent::Closed(CloseInfo::new(Some(1011), "restart")));
                        break;
                    }
                }
                ClientMessage::PlayerMove { position } => {
                    tracing::debug!("Server: player moved to {position:?}");
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────
// Step 4: Wire together the client and the fake server
// ─────────────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let (accepted_tx, accepted_rx) = mpsc::unbounded_channel();
    tokio::spawn(fake_server(accepted_rx));

    // Short delays keep the demo snappy.
    let config = SyncConfig::new().with_reconnect_policy(
        ReconnectPolicy::default().with_base_delay(Duration::from_millis(200)),
    );
    let connector = LoopbackConnector {
        accepted: accepted_tx,
    };
    let (mut client, mut event_rx) = SyncClient::start(connector, config);
    client.connect("loopback://game")?;

    let mut sessions = 0;
    while let Some(event) = event_rx.recv().await {
        match &event {
            SyncEvent::Connected => {
                sessions += 1;
                client.join_game("Ann")?;
                client.send_chat_message(format!("hello #{sessions}"))?;
            }
            SyncEvent::ChatMessage { .. } if sessions >= 2 => {
                tracing::info!("Event: {event:?}");
                break;
            }
            SyncEvent::ReconnectExhausted { .. } => break,
            other => tracing::info!("Event: {other:?}"),
        }
    }

    // ── Inspect the reconciled state ────────────────────────────────
    let game = client.game().read();
    for line in game.chat.iter() {
        tracing::info!("[chat] {line}");
    }
    if let Some(zed) = game.player("npc-1") {
        tracing::info!("Zed is at {:?}", zed.position);
    }

    client.shutdown().await;
    tracing::info!("Done after {sessions} session(s). Loopback transport works!");
    Ok(())
}
