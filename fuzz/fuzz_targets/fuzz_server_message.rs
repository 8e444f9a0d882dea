#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Raw-byte path, including serde_json's UTF-8 validation.
    let _ = serde_json::from_slice::<game_sync_client::protocol::ServerMessage>(data);

    // The decode path the session loop uses for text frames.
    if let Ok(s) = std::str::from_utf8(data) {
        let _ = game_sync_client::codec::decode(s);
    }
});
