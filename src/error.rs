//! Error types for the game sync client.

use thiserror::Error;

/// Errors that can occur when using the game sync client.
///
/// None of these are fatal to the process: connection failures are retried by
/// the reconnection controller, malformed server messages are dropped, and
/// sends while offline are reported back to the caller.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The connection could not be established or failed at the transport level.
    ///
    /// Triggers the reconnection controller.
    #[error("connection error: {0}")]
    Connection(String),

    /// An inbound payload was not one of the known server messages.
    #[error("malformed server message: {0}")]
    MalformedMessage(#[source] serde_json::Error),

    /// Failed to serialize an outbound message.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Attempted an operation that requires an active connection, but the client is not connected.
    #[error("not connected to server")]
    NotConnected,

    /// Every reconnection attempt failed; a manual `connect` is required.
    #[error("gave up reconnecting after {attempts} attempts")]
    ReconnectExhausted {
        /// Number of reconnection attempts that were made.
        attempts: u32,
    },

    /// Failed to send a message through the transport.
    #[error("transport send error: {0}")]
    TransportSend(String),

    /// Failed to receive a message from the transport.
    #[error("transport receive error: {0}")]
    TransportReceive(String),

    /// The transport connection was already closed.
    #[error("transport connection closed")]
    TransportClosed,

    /// An operation timed out.
    #[error("operation timed out")]
    Timeout,
}

/// A specialized [`Result`] type for game sync client operations.
pub type Result<T> = std::result::Result<T, SyncError>;
