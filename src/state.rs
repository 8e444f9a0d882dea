//! Local mirror of the game world.
//!
//! [`GameState`] holds the local player, every other known player and a
//! bounded chat log. Server events are folded in with [`GameState::apply`],
//! a pure transform meant to be passed to [`Store::update`](crate::store::Store::update).
//!
//! The local player never appears among the other players: both the snapshot
//! and the join paths skip its id.

use std::collections::{HashMap, VecDeque};

use crate::protocol::{Player, PlayerId, Position, ServerMessage};

/// Default number of chat lines kept.
pub const DEFAULT_CHAT_CAPACITY: usize = 100;

// ── Chat log ────────────────────────────────────────────────────────

/// Chat history that keeps only the most recent lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatLog {
    entries: VecDeque<String>,
    capacity: usize,
}

impl Default for ChatLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CHAT_CAPACITY)
    }
}

impl ChatLog {
    /// Create an empty log keeping at most `capacity` lines (at least one).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a line, evicting the oldest ones beyond capacity.
    pub fn push(&mut self, line: impl Into<String>) {
        self.entries.push_back(line.into());
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    /// The most recent line.
    pub fn last(&self) -> Option<&str> {
        self.entries.back().map(String::as_str)
    }
}

// ── Game state ──────────────────────────────────────────────────────

/// Everything the client knows about the game.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GameState {
    /// The local player, once `join_game` has been called.
    pub current_player: Option<Player>,
    /// Every other player, keyed by id.
    pub other_players: HashMap<PlayerId, Player>,
    /// Join/leave notices and chat lines.
    pub chat: ChatLog,
}

impl GameState {
    /// Empty state with a chat log of the given capacity.
    pub fn with_chat_capacity(capacity: usize) -> Self {
        Self {
            chat: ChatLog::with_capacity(capacity),
            ..Self::default()
        }
    }

    /// The state after folding in one server event.
    pub fn apply(&self, message: &ServerMessage) -> Self {
        let mut next = self.clone();
        next.apply_in_place(message);
        next
    }

    /// The state with `player` as the local player.
    pub fn with_current_player(&self, player: Player) -> Self {
        let mut next = self.clone();
        next.other_players.remove(&player.id);
        next.current_player = Some(player);
        next
    }

    /// Look up a player by id, local player first.
    pub fn player(&self, id: &str) -> Option<&Player> {
        match &self.current_player {
            Some(current) if current.id == id => Some(current),
            _ => self.other_players.get(id),
        }
    }

    pub fn other_player_count(&self) -> usize {
        self.other_players.len()
    }

    fn is_current(&self, id: &str) -> bool {
        self.current_player.as_ref().is_some_and(|p| p.id == id)
    }

    fn apply_in_place(&mut self, message: &ServerMessage) {
        match message {
            ServerMessage::PlayerJoined { player } => {
                if !self.is_current(&player.id) {
                    self.other_players.insert(player.id.clone(), player.clone());
                }
                self.chat.push(format!("{} joined the game", player.name));
            }
            ServerMessage::PlayerLeft { player_id } => {
                if let Some(player) = self.other_players.remove(player_id) {
                    self.chat.push(format!("{} left the game", player.name));
                }
            }
            ServerMessage::PlayerMoved {
                player_id,
                position,
            } => self.move_player(player_id, *position),
            ServerMessage::ChatMessage {
                player_name,
                message,
            } => self.chat.push(format!("{player_name}: {message}")),
            ServerMessage::GameState { players } => {
                let current_id = self.current_player.as_ref().map(|p| p.id.as_str());
                self.other_players = players
                    .iter()
                    .filter(|(id, _)| Some(id.as_str()) != current_id)
                    .map(|(id, p)| (id.clone(), p.clone()))
                    .collect();
            }
        }
    }

    fn move_player(&mut self, id: &str, position: Position) {
        if let Some(current) = self.current_player.as_mut().filter(|p| p.id == id) {
            current.position = position;
        } else if let Some(other) = self.other_players.get_mut(id) {
            other.position = position;
        }
    }
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

    fn player(id: &str, name: &str, x: f32) -> Player {
        Player {
            id: id.into(),
            name: name.into(),
            position: Position::new(x, 0.0, 0.0),
            level: 1,
            health: 100,
            max_health: 100,
        }
    }

    fn joined(p: &Player) -> ServerMessage {
        ServerMessage::PlayerJoined { player: p.clone() }
    }

    fn snapshot(players: &[Player]) -> ServerMessage {
        ServerMessage::GameState {
            players: players.iter().map(|p| (p.id.clone(), p.clone())).collect(),
        }
    }

    /// Invariant check used after every transition.
    fn assert_self_excluded(state: &GameState) {
        if let Some(current) = &state.current_player {
            assert!(
                !state.other_players.contains_key(&current.id),
                "local player {} leaked into other_players",
                current.id
            );
        }
    }

    #[test]
    fn player_joined_inserts_and_announces() {
        let bob = player("b", "Bob", 1.0);
        let state = GameState::default().apply(&joined(&bob));

        assert_eq!(state.other_players.get("b"), Some(&bob));
        assert_eq!(state.chat.last(), Some("Bob joined the game"));
    }

    #[test]
    fn player_joined_is_idempotent_for_the_roster() {
        let bob = player("b", "Bob", 1.0);
        let once = GameState::default().apply(&joined(&bob));
        let twice = once.apply(&joined(&bob));

        assert_eq!(once.other_players, twice.other_players);
    }

    #[test]
    fn player_joined_overwrites_existing_entry() {
        let bob = player("b", "Bob", 1.0);
        let moved_bob = player("b", "Bob", 9.0);
        let state = GameState::default()
            .apply(&joined(&bob))
            .apply(&joined(&moved_bob));

        assert_eq!(state.other_player_count(), 1);
        assert_eq!(state.other_players["b"].position.x, 9.0);
    }

    #[test]
    fn player_joined_for_local_player_is_not_mirrored() {
        let me = player("a", "Ann", 0.0);
        let state = GameState::default()
            .with_current_player(me.clone())
            .apply(&joined(&me));

        assert!(state.other_players.is_empty());
        assert_self_excluded(&state);
    }

    #[test]
    fn player_left_removes_and_announces_with_name() {
        let bob = player("b", "Bob", 1.0);
        let state = GameState::default()
            .apply(&joined(&bob))
            .apply(&ServerMessage::PlayerLeft {
                player_id: "b".into(),
            });

        assert!(state.other_players.is_empty());
        assert_eq!(state.chat.last(), Some("Bob left the game"));
    }

    #[test]
    fn player_left_for_unknown_id_changes_nothing() {
        let bob = player("b", "Bob", 1.0);
        let before = GameState::default().apply(&joined(&bob));
        let after = before.apply(&ServerMessage::PlayerLeft {
            player_id: "zzz".into(),
        });

        assert_eq!(before, after);
        assert_eq!(after.chat.len(), 1);
    }

    #[test]
    fn player_moved_updates_other_player() {
        let bob = player("b", "Bob", 1.0);
        let state = GameState::default()
            .apply(&joined(&bob))
            .apply(&ServerMessage::PlayerMoved {
                player_id: "b".into(),
                position: Position::new(4.0, 5.0, 6.0),
            });

        assert_eq!(
            state.other_players["b"].position,
            Position::new(4.0, 5.0, 6.0)
        );
    }

    #[test]
    fn player_moved_updates_local_player() {
        let state = GameState::default()
            .with_current_player(player("a", "Ann", 0.0))
            .apply(&ServerMessage::PlayerMoved {
                player_id: "a".into(),
                position: Position::new(1.0, 1.0, 1.0),
            });

        assert_eq!(
            state.current_player.unwrap().position,
            Position::new(1.0, 1.0, 1.0)
        );
    }

    #[test]
    fn player_moved_for_unknown_id_is_a_no_op() {
        let before = GameState::default().with_current_player(player("a", "Ann", 0.0));
        let after = before.apply(&ServerMessage::PlayerMoved {
            player_id: "ghost".into(),
            position: Position::new(1.0, 1.0, 1.0),
        });
        assert_eq!(before, after);
    }

    #[test]
    fn chat_message_is_formatted() {
        let state = GameState::default().apply(&ServerMessage::ChatMessage {
            player_name: "Bob".into(),
            message: "hi all".into(),
        });
        assert_eq!(state.chat.iter().collect::<Vec<_>>(), vec!["Bob: hi all"]);
    }

    #[test]
    fn chat_keeps_the_last_hundred_lines_in_order() {
        let mut state = GameState::default();
        for i in 0..250 {
            state = state.apply(&ServerMessage::ChatMessage {
                player_name: "Bob".into(),
                message: format!("line {i}"),
            });
        }

        assert_eq!(state.chat.len(), DEFAULT_CHAT_CAPACITY);
        let expected: Vec<String> = (150..250).map(|i| format!("Bob: line {i}")).collect();
        let actual: Vec<String> = state.chat.iter().map(str::to_owned).collect();
        assert_eq!(actual, expected);
    }

    #[test]
    fn chat_capacity_is_configurable() {
        let mut log = ChatLog::with_capacity(3);
        for line in ["a", "b", "c", "d"] {
            log.push(line);
        }
        assert_eq!(log.iter().collect::<Vec<_>>(), vec!["b", "c", "d"]);
        assert_eq!(ChatLog::with_capacity(0).capacity(), 1);
    }

    #[test]
    fn snapshot_excludes_local_player() {
        let state = GameState::default()
            .with_current_player(player("A", "Ann", 0.0))
            .apply(&snapshot(&[player("A", "Ann", 0.0), player("B", "Bob", 1.0)]));

        assert_eq!(state.other_player_count(), 1);
        assert_eq!(state.other_players["B"].position, Position::new(1.0, 0.0, 0.0));
        assert_self_excluded(&state);
    }

    #[test]
    fn snapshot_replaces_roster_wholesale() {
        let state = GameState::default()
            .apply(&joined(&player("old", "Old", 0.0)))
            .apply(&snapshot(&[player("new", "New", 2.0)]));

        assert!(!state.other_players.contains_key("old"));
        assert!(state.other_players.contains_key("new"));
        // Snapshots do not write chat notices.
        assert_eq!(state.chat.len(), 1);
    }

    #[test]
    fn setting_local_player_evicts_matching_other_player() {
        let state = GameState::default()
            .apply(&joined(&player("a", "Ann", 0.0)))
            .with_current_player(player("a", "Ann", 0.0));

        assert_self_excluded(&state);
        assert_eq!(state.player("a").map(|p| p.name.as_str()), Some("Ann"));
    }

    #[test]
    fn invariant_holds_across_mixed_sequences() {
        let me = player("me", "Me", 0.0);
        let mut state = GameState::default().with_current_player(me.clone());
        let events = vec![
            joined(&player("x", "X", 1.0)),
            joined(&me),
            snapshot(&[me.clone(), player("y", "Y", 2.0)]),
            ServerMessage::PlayerMoved {
                player_id: "me".into(),
                position: Position::new(3.0, 0.0, 0.0),
            },
            ServerMessage::PlayerLeft {
                player_id: "me".into(),
            },
            joined(&me),
        ];
        for event in &events {
            state = state.apply(event);
            assert_self_excluded(&state);
        }
        assert_eq!(state.other_player_count(), 1);
    }
}
