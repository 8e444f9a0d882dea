//! Wire types for the game server protocol.
//!
//! Every message is a JSON object tagged by a `"type"` field, with snake_case
//! tags and field names:
//!
//! ```json
//! {"type":"player_moved","player_id":"p-1","position":{"x":1.0,"y":0.0,"z":2.5}}
//! ```
//!
//! [`ClientMessage`] covers everything the client may send and
//! [`ServerMessage`] everything the server may push. Both sets are closed; any
//! other payload is rejected by [`codec::decode`](crate::codec::decode).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ── Type aliases ────────────────────────────────────────────────────

/// Server-assigned player identifier.
pub type PlayerId = String;

// ── Structs ─────────────────────────────────────────────────────────

/// A point in world space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Position {
    /// Create a position from its components.
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// A player as described by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub position: Position,
    pub level: u32,
    pub health: u32,
    pub max_health: u32,
}

impl Player {
    /// Level assigned to a freshly joined player.
    pub const STARTING_LEVEL: u32 = 1;
    /// Health (and maximum health) of a freshly joined player.
    pub const STARTING_HEALTH: u32 = 100;
    /// Spawn point used for the local player before the server has placed it.
    pub const SPAWN_POSITION: Position = Position::new(0.0, 1.0, 0.0);

    /// The local player as assumed right after sending `join`.
    ///
    /// The id stays empty: the server never echoes the assigned id back to
    /// the joining client.
    pub fn provisional(name: impl Into<String>) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            position: Self::SPAWN_POSITION,
            level: Self::STARTING_LEVEL,
            health: Self::STARTING_HEALTH,
            max_health: Self::STARTING_HEALTH,
        }
    }
}

// ── Messages ────────────────────────────────────────────────────────

/// Message types sent from client to server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Enter the game under the given display name.
    Join { player_name: String },
    /// Report the local player's new position.
    PlayerMove { position: Position },
    /// Broadcast a chat line to every player.
    ChatMessage { message: String },
}

impl ClientMessage {
    /// The wire tag of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::PlayerMove { .. } => "player_move",
            Self::ChatMessage { .. } => "chat_message",
        }
    }
}

/// Message types sent from server to client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// A player entered the game.
    PlayerJoined { player: Player },
    /// A player left the game.
    PlayerLeft { player_id: PlayerId },
    /// A player changed position.
    PlayerMoved {
        player_id: PlayerId,
        position: Position,
    },
    /// A chat line from a player.
    ChatMessage {
        player_name: String,
        message: String,
    },
    /// Full roster snapshot; replaces the known set of remote players.
    GameState { players: HashMap<PlayerId, Player> },
}

impl ServerMessage {
    /// The wire tag of this message, for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::PlayerJoined { .. } => "player_joined",
            Self::PlayerLeft { .. } => "player_left",
            Self::PlayerMoved { .. } => "player_moved",
            Self::ChatMessage { .. } => "chat_message",
            Self::GameState { .. } => "game_state",
        }
    }
}
