//! Transport abstraction for the game server connection.
//!
//! The [`Transport`] trait defines a bidirectional text message channel between
//! the client and server. The protocol uses JSON text messages, so every
//! transport implementation must handle message framing internally (e.g.,
//! WebSocket frames, length-prefixed TCP).
//!
//! Establishing a connection is the job of a [`Connector`]. The session loop
//! keeps the connector so it can open a fresh transport whenever the
//! reconnection controller asks for one.
//!
//! # Implementing a Custom Transport
//!
//! ```rust,no_run
//! use async_trait::async_trait;
//! use game_sync_client::error::SyncError;
//! use game_sync_client::transport::{Connector, Transport, TransportEvent};
//!
//! struct MyTransport { /* ... */ }
//!
//! #[async_trait]
//! impl Transport for MyTransport {
//!     async fn send(&mut self, message: String) -> Result<(), SyncError> {
//!         todo!()
//!     }
//!
//!     async fn recv(&mut self) -> Result<TransportEvent, SyncError> {
//!         todo!()
//!     }
//!
//!     async fn close(&mut self, code: u16) -> Result<(), SyncError> {
//!         todo!()
//!     }
//! }
//!
//! struct MyConnector;
//!
//! #[async_trait]
//! impl Connector for MyConnector {
//!     type Transport = MyTransport;
//!
//!     async fn connect(&self, endpoint: &str) -> Result<MyTransport, SyncError> {
//!         todo!()
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::error::SyncError;

/// Close code reserved for an intentional disconnect.
///
/// A connection closed with this code is never re-established automatically.
pub const NORMAL_CLOSE_CODE: u16 = 1000;

/// Connection lifecycle as seen by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No connection is open or being opened.
    #[default]
    Disconnected,
    /// A handshake is in flight.
    Connecting,
    /// The connection is open and messages can be sent.
    Connected,
}

/// How a connection ended.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CloseInfo {
    /// Close code sent by the peer. `None` when the stream ended without a
    /// close handshake.
    pub code: Option<u16>,
    /// Close reason sent by the peer (may be empty).
    pub reason: String,
}

impl CloseInfo {
    /// Build close information for the given code and reason.
    pub fn new(code: Option<u16>, reason: impl Into<String>) -> Self {
        Self {
            code,
            reason: reason.into(),
        }
    }

    /// Returns `true` if this closure marks an intentional disconnect.
    pub fn is_normal(&self) -> bool {
        is_normal_close(self.code)
    }
}

/// Returns `true` if `code` marks an intentional disconnect.
pub fn is_normal_close(code: Option<u16>) -> bool {
    code == Some(NORMAL_CLOSE_CODE)
}

/// Something received from a [`Transport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    /// A complete JSON text message.
    Message(String),
    /// The connection was closed; no further events follow.
    Closed(CloseInfo),
}

/// A bidirectional text message transport to the game server.
///
/// Implementors shuttle serialized JSON strings between the client and server.
/// Each call to [`send`](Transport::send) transmits one complete JSON message.
/// Each call to [`recv`](Transport::recv) returns one complete JSON message or
/// the closure of the connection.
///
/// # Cancel Safety
///
/// The [`recv`](Transport::recv) method **MUST** be cancel-safe because it is used
/// inside `tokio::select!`. If `recv` is cancelled before completion, calling it
/// again must not lose data. Channel-based implementations (e.g., wrapping
/// `mpsc::Receiver`) are naturally cancel-safe.
#[async_trait]
pub trait Transport: Send + 'static {
    /// Send a JSON text message to the server.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::TransportSend`] if the message could not be sent,
    /// or [`SyncError::TransportClosed`] after [`close`](Transport::close).
    async fn send(&mut self, message: String) -> Result<(), SyncError>;

    /// Receive the next event from the server.
    ///
    /// Returns:
    /// - `Ok(TransportEvent::Message(text))` — a complete message was received
    /// - `Ok(TransportEvent::Closed(info))` — the connection ended
    /// - `Err(e)` — a transport error occurred (e.g., [`SyncError::TransportReceive`])
    async fn recv(&mut self) -> Result<TransportEvent, SyncError>;

    /// Close the connection with the given close code.
    ///
    /// Pass [`NORMAL_CLOSE_CODE`] for an intentional disconnect. Closing twice
    /// is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the close handshake fails. Implementations should
    /// still release resources in that case.
    async fn close(&mut self, code: u16) -> Result<(), SyncError>;
}

/// Opens [`Transport`]s to a server endpoint.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// The transport produced by a successful connect.
    type Transport: Transport;

    /// Open a new connection to `endpoint`.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Connection`] (or [`SyncError::Timeout`]) when the
    /// connection cannot be established.
    async fn connect(&self, endpoint: &str) -> Result<Self::Transport, SyncError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_code_1000_is_normal() {
        assert!(CloseInfo::new(Some(NORMAL_CLOSE_CODE), "bye").is_normal());
        assert!(!CloseInfo::new(Some(1001), "").is_normal());
        assert!(!CloseInfo::new(Some(1006), "").is_normal());
        assert!(!CloseInfo::new(None, "").is_normal());
        assert!(is_normal_close(Some(1000)));
        assert!(!is_normal_close(None));
    }

    #[test]
    fn connection_state_defaults_to_disconnected() {
        assert_eq!(ConnectionState::default(), ConnectionState::Disconnected);
    }
}
