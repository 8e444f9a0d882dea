//! # Game Sync Client
//!
//! Reconnecting client for a multiplayer game server that speaks JSON text
//! messages over WebSocket.
//!
//! The client keeps a single connection open, retries with linear backoff when
//! it drops unexpectedly, and reconciles every server message into a local
//! [`GameState`] that the presentation layer can read or subscribe to.
//!
//! ## Features
//!
//! - **Transport-agnostic** — implement [`Transport`] and [`Connector`] for any backend
//! - **WebSocket built-in** — default `transport-websocket` feature provides [`WebSocketConnector`]
//! - **Reconnection** — up to 5 attempts, 2 s × attempt apart, cancelled by a normal close
//! - **Observable state** — game state and connection status live in watch-backed [`Store`]s
//! - **Event-driven** — receive typed [`SyncEvent`]s via a channel
//!
//! ## Quick Start
//!
//! ```no_run
//! # #[cfg(feature = "transport-websocket")]
//! # async fn run() -> Result<(), game_sync_client::SyncError> {
//! use game_sync_client::{Position, SyncClient, SyncConfig, SyncEvent, WebSocketConnector};
//!
//! let (client, mut events) = SyncClient::start(WebSocketConnector::new(), SyncConfig::new());
//! client.connect("ws://localhost:8080")?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SyncEvent::Connected => {
//!             client.join_game("Ann")?;
//!             client.send_player_move(Position::new(1.0, 1.0, 0.0))?;
//!         }
//!         SyncEvent::ChatMessage { player_name, message } => {
//!             println!("{player_name}: {message}");
//!         }
//!         SyncEvent::ReconnectExhausted { .. } => break,
//!         _ => {}
//!     }
//! }
//!
//! let players = client.game().with(|game| game.other_player_count());
//! println!("{players} other players online");
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod codec;
pub mod error;
pub mod event;
pub mod protocol;
pub mod reconnect;
pub mod state;
pub mod store;
pub mod transport;
pub mod transports;

// Re-export primary types for ergonomic imports.
pub use client::{ConnectionStatus, SyncClient, SyncConfig, DEFAULT_ENDPOINT};
pub use error::SyncError;
pub use event::SyncEvent;
pub use protocol::{ClientMessage, Player, PlayerId, Position, ServerMessage};
pub use reconnect::{ReconnectPhase, ReconnectPolicy};
pub use state::{ChatLog, GameState};
pub use store::Store;
pub use transport::{CloseInfo, ConnectionState, Connector, Transport, TransportEvent};

#[cfg(feature = "transport-websocket")]
pub use transports::{WebSocketConnector, WebSocketTransport};
