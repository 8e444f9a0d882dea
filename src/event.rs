//! Events emitted by the session loop.
//!
//! Connection lifecycle events are synthesized by the client; the remaining
//! variants mirror [`ServerMessage`] one-to-one so that a renderer can apply
//! position and roster updates without going through the game state store.

use std::collections::HashMap;
use std::time::Duration;

use crate::protocol::{Player, PlayerId, Position, ServerMessage};

/// Something that happened on the connection or in the game.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    /// A connection to the server is open.
    Connected,
    /// The connection ended.
    Disconnected {
        /// Close code, if the connection was closed with one.
        code: Option<u16>,
        /// Close reason or error description.
        reason: Option<String>,
    },
    /// A reconnect will be attempted after `delay`.
    ReconnectScheduled { attempt: u32, delay: Duration },
    /// Reconnection gave up; call `connect` to try again.
    ReconnectExhausted { attempts: u32 },

    // ── Server events ───────────────────────────────────────────────
    PlayerJoined {
        player: Player,
    },
    PlayerLeft {
        player_id: PlayerId,
    },
    PlayerMoved {
        player_id: PlayerId,
        position: Position,
    },
    ChatMessage {
        player_name: String,
        message: String,
    },
    GameState {
        players: HashMap<PlayerId, Player>,
    },
}

impl From<ServerMessage> for SyncEvent {
    fn from(msg: ServerMessage) -> Self {
        match msg {
            ServerMessage::PlayerJoined { player } => Self::PlayerJoined { player },
            ServerMessage::PlayerLeft { player_id } => Self::PlayerLeft { player_id },
            ServerMessage::PlayerMoved {
                player_id,
                position,
            } => Self::PlayerMoved {
                player_id,
                position,
            },
            ServerMessage::ChatMessage {
                player_name,
                message,
            } => Self::ChatMessage {
                player_name,
                message,
            },
            ServerMessage::GameState { players } => Self::GameState { players },
        }
    }
}
