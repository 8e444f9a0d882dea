#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing,
    dead_code
)]
//! Shared test utilities for Game Sync Client integration tests.
//!
//! Provides a channel-driven [`MockTransport`], a scripted [`MockConnector`]
//! and helper functions for constructing server message JSON strings.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex as StdMutex};

use async_trait::async_trait;
use game_sync_client::protocol::{ClientMessage, Player, Position};
use game_sync_client::{CloseInfo, Connector, SyncError, Transport, TransportEvent};
use tokio::sync::mpsc;
use tokio::time::Instant;

/// Endpoint used by tests; never resolved.
pub const TEST_ENDPOINT: &str = "ws://game.test:8080";

type Scripted = Result<TransportEvent, SyncError>;

// ── MockTransport ───────────────────────────────────────────────────

/// A channel-driven mock transport.
///
/// Whatever the paired [`MockServer`] pushes is returned by `recv()` in order;
/// with nothing queued, `recv()` waits. Everything the client sends is
/// forwarded to the server handle.
pub struct MockTransport {
    incoming: mpsc::UnboundedReceiver<Scripted>,
    sent: mpsc::UnboundedSender<String>,
    close_code: Arc<StdMutex<Option<u16>>>,
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, message: String) -> Result<(), SyncError> {
        self.sent
            .send(message)
            .map_err(|_| SyncError::TransportSend("server handle dropped".into()))
    }

    async fn recv(&mut self) -> Result<TransportEvent, SyncError> {
        match self.incoming.recv().await {
            Some(item) => item,
            // Server handle dropped: hang so the session stays up until the
            // test shuts it down.
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self, code: u16) -> Result<(), SyncError> {
        *self.close_code.lock().unwrap() = Some(code);
        Ok(())
    }
}

/// Test-side end of a [`MockTransport`].
pub struct MockServer {
    incoming: mpsc::UnboundedSender<Scripted>,
    sent: mpsc::UnboundedReceiver<String>,
    close_code: Arc<StdMutex<Option<u16>>>,
}

impl MockServer {
    /// Deliver a text frame to the client.
    pub fn push(&self, text: impl Into<String>) {
        let _ = self.incoming.send(Ok(TransportEvent::Message(text.into())));
    }

    /// Close the connection from the server side.
    pub fn close_with(&self, code: Option<u16>, reason: &str) {
        let _ = self
            .incoming
            .send(Ok(TransportEvent::Closed(CloseInfo::new(code, reason))));
    }

    /// Fail the next `recv()` with a transport error.
    pub fn fail(&self, reason: &str) {
        let _ = self
            .incoming
            .send(Err(SyncError::TransportReceive(reason.into())));
    }

    /// Wait for the next raw frame sent by the client.
    pub async fn next_sent_raw(&mut self) -> String {
        self.sent.recv().await.expect("client transport dropped")
    }

    /// Wait for the next message sent by the client, decoded.
    pub async fn next_sent(&mut self) -> ClientMessage {
        let raw = self.next_sent_raw().await;
        serde_json::from_str(&raw).expect("client sent invalid JSON")
    }

    /// Frames sent by the client that have not been read yet.
    pub fn drain_sent(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(frame) = self.sent.try_recv() {
            out.push(frame);
        }
        out
    }

    /// Close code the client closed the transport with, if it did.
    pub fn close_code(&self) -> Option<u16> {
        *self.close_code.lock().unwrap()
    }
}

/// Create a connected transport/server pair.
pub fn mock_pair() -> (MockTransport, MockServer) {
    let (incoming_tx, incoming_rx) = mpsc::unbounded_channel();
    let (sent_tx, sent_rx) = mpsc::unbounded_channel();
    let close_code = Arc::new(StdMutex::new(None));
    let transport = MockTransport {
        incoming: incoming_rx,
        sent: sent_tx,
        close_code: Arc::clone(&close_code),
    };
    let server = MockServer {
        incoming: incoming_tx,
        sent: sent_rx,
        close_code,
    };
    (transport, server)
}

// ── MockConnector ───────────────────────────────────────────────────

#[derive(Default)]
struct ConnectorState {
    /// `Some` accepts with that transport, `None` refuses.
    outcomes: VecDeque<Option<MockTransport>>,
    attempts: Vec<(String, Instant)>,
}

/// A connector with scripted outcomes.
///
/// Each `connect()` consumes the next outcome; once the script runs out every
/// attempt is refused. Clones share the script and the attempt log, so a test
/// can keep one clone after moving another into the client.
#[derive(Clone, Default)]
pub struct MockConnector {
    state: Arc<StdMutex<ConnectorState>>,
}

impl MockConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept the next attempt and return the server end of its transport.
    pub fn accept_next(&self) -> MockServer {
        let (transport, server) = mock_pair();
        self.state.lock().unwrap().outcomes.push_back(Some(transport));
        server
    }

    /// Refuse the next attempt.
    pub fn refuse_next(&self) {
        self.state.lock().unwrap().outcomes.push_back(None);
    }

    /// Endpoints and virtual times of every attempt so far.
    pub fn attempts(&self) -> Vec<(String, Instant)> {
        self.state.lock().unwrap().attempts.clone()
    }

    pub fn attempt_count(&self) -> usize {
        self.state.lock().unwrap().attempts.len()
    }
}

#[async_trait]
impl Connector for MockConnector {
    type Transport = MockTransport;

    async fn connect(&self, endpoint: &str) -> Result<MockTransport, SyncError> {
        let mut state = self.state.lock().unwrap();
        state.attempts.push((endpoint.to_string(), Instant::now()));
        match state.outcomes.pop_front() {
            Some(Some(transport)) => Ok(transport),
            _ => Err(SyncError::Connection("connection refused".into())),
        }
    }
}

// ── HangingConnector ────────────────────────────────────────────────

/// A connector whose handshakes never complete.
#[derive(Clone, Default)]
pub struct HangingConnector {
    attempts: Arc<StdMutex<usize>>,
}

impl HangingConnector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempt_count(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl Connector for HangingConnector {
    type Transport = MockTransport;

    async fn connect(&self, _endpoint: &str) -> Result<MockTransport, SyncError> {
        *self.attempts.lock().unwrap() += 1;
        std::future::pending().await
    }
}

// ── Server message JSON helpers ─────────────────────────────────────

/// A player as the server would describe it.
pub fn player(id: &str, name: &str, x: f32, y: f32, z: f32) -> Player {
    Player {
        id: id.to_string(),
        name: name.to_string(),
        position: Position::new(x, y, z),
        level: 1,
        health: 100,
        max_health: 100,
    }
}

fn player_value(p: &Player) -> serde_json::Value {
    serde_json::json!({
        "id": p.id,
        "name": p.name,
        "position": { "x": p.position.x, "y": p.position.y, "z": p.position.z },
        "level": p.level,
        "health": p.health,
        "max_health": p.max_health,
    })
}

pub fn player_joined_json(p: &Player) -> String {
    serde_json::json!({
        "type": "player_joined",
        "player": player_value(p),
    })
    .to_string()
}

pub fn player_left_json(player_id: &str) -> String {
    serde_json::json!({
        "type": "player_left",
        "player_id": player_id,
    })
    .to_string()
}

pub fn player_moved_json(player_id: &str, x: f32, y: f32, z: f32) -> String {
    serde_json::json!({
        "type": "player_moved",
        "player_id": player_id,
        "position": { "x": x, "y": y, "z": z },
    })
    .to_string()
}

pub fn chat_message_json(player_name: &str, message: &str) -> String {
    serde_json::json!({
        "type": "chat_message",
        "player_name": player_name,
        "message": message,
    })
    .to_string()
}

pub fn game_state_json(players: &[Player]) -> String {
    let map: serde_json::Map<String, serde_json::Value> = players
        .iter()
        .map(|p| (p.id.clone(), player_value(p)))
        .collect();
    serde_json::json!({
        "type": "game_state",
        "players": map,
    })
    .to_string()
}
