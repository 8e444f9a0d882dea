#![no_main]

use game_sync_client::codec;
use game_sync_client::protocol::Player;
use game_sync_client::state::GameState;
use libfuzzer_sys::fuzz_target;

// Feed newline-separated frames through decode and reconcile, checking that
// the local player never shows up among the others and the chat log stays
// within capacity.
fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut state = GameState::with_chat_capacity(8)
        .with_current_player(Player::provisional("fuzzer"));
    for line in text.lines() {
        if let Ok(msg) = codec::decode(line) {
            state = state.apply(&msg);
        }
        assert!(state.chat.len() <= 8);
        if let Some(current) = &state.current_player {
            assert!(!state.other_players.contains_key(&current.id));
        }
    }
});
