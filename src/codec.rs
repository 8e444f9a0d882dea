//! JSON encoding of client intents and decoding of server events.

use crate::error::{Result, SyncError};
use crate::protocol::{ClientMessage, ServerMessage};

/// Serialize an outbound message to its JSON text frame.
///
/// # Errors
///
/// Returns [`SyncError::Serialization`] only if `serde_json` itself fails,
/// which does not happen for the message types in this crate.
pub fn encode(message: &ClientMessage) -> Result<String> {
    Ok(serde_json::to_string(message)?)
}

/// Parse an inbound JSON text frame into a [`ServerMessage`].
///
/// # Errors
///
/// Returns [`SyncError::MalformedMessage`] when the payload is not valid JSON,
/// carries an unknown `type`, or is missing required fields.
pub fn decode(text: &str) -> Result<ServerMessage> {
    serde_json::from_str(text).map_err(SyncError::MalformedMessage)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::indexing_slicing
)]
mod tests {
    use super::*;
    use crate::protocol::Position;

    #[test]
    fn encode_join_uses_snake_case_tag() {
        let json = encode(&ClientMessage::Join {
            player_name: "Ann".into(),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "join");
        assert_eq!(value["player_name"], "Ann");
    }

    #[test]
    fn encode_player_move_nests_position() {
        let json = encode(&ClientMessage::PlayerMove {
            position: Position::new(1.0, 2.0, 3.0),
        })
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["type"], "player_move");
        assert_eq!(value["position"]["x"], 1.0);
        assert_eq!(value["position"]["z"], 3.0);
    }

    #[test]
    fn decode_player_left() {
        let msg = decode(r#"{"type":"player_left","player_id":"abc"}"#).unwrap();
        assert_eq!(
            msg,
            ServerMessage::PlayerLeft {
                player_id: "abc".into()
            }
        );
    }

    #[test]
    fn decode_rejects_unknown_type() {
        let err = decode(r#"{"type":"teleport","player_id":"abc"}"#).unwrap_err();
        assert!(matches!(err, SyncError::MalformedMessage(_)));
    }

    #[test]
    fn decode_rejects_missing_fields() {
        let err = decode(r#"{"type":"player_moved","player_id":"abc"}"#).unwrap_err();
        assert!(matches!(err, SyncError::MalformedMessage(_)));
    }

    #[test]
    fn decode_rejects_non_json() {
        let err = decode("hello there").unwrap_err();
        assert!(matches!(err, SyncError::MalformedMessage(_)));
    }

    #[test]
    fn decode_rejects_client_only_message() {
        // `join` is an outbound intent, never a server event.
        let err = decode(r#"{"type":"join","player_name":"Ann"}"#).unwrap_err();
        assert!(matches!(err, SyncError::MalformedMessage(_)));
    }
}
