//! # Game Session Example
//!
//! Demonstrates a complete game sync client lifecycle:
//!
//! 1. Connect to a game server via WebSocket
//! 2. Join the game once the connection is open
//! 3. Walk the local player in a circle and say hello in chat
//! 4. Log roster, movement and chat events as they are reconciled
//! 5. Shut down gracefully on Ctrl+C or when reconnection gives up
//!
//! ## Running
//!
//! ```sh
//! # Start a game server on localhost:8080, then:
//! cargo run --example game_session
//!
//! # Override the server URL and player name:
//! GAME_SERVER_URL=ws://my-server:8080 PLAYER_NAME=Ann cargo run --example game_session
//! ```

use std::time::Duration;

use game_sync_client::{
    Position, SyncClient, SyncConfig, SyncEvent, WebSocketConnector, DEFAULT_ENDPOINT,
};

/// Player name when `PLAYER_NAME` is not set.
const DEFAULT_PLAYER_NAME: &str = "RustPlayer";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Logging ─────────────────────────────────────────────────────
    // Initialize tracing. Set `RUST_LOG=debug` for verbose output.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // ── Configuration ───────────────────────────────────────────────
    let url = std::env::var("GAME_SERVER_URL").unwrap_or_else(|_| DEFAULT_ENDPOINT.to_string());
    let name =
        std::env::var("PLAYER_NAME").unwrap_or_else(|_| DEFAULT_PLAYER_NAME.to_string());

    let connector = WebSocketConnector::new().with_connect_timeout(Duration::from_secs(5));
    let (mut client, mut event_rx) = SyncClient::start(connector, SyncConfig::new());

    // ── Connect ─────────────────────────────────────────────────────
    tracing::info!("Connecting to {url}");
    client.connect(url)?;

    let mut walk = tokio::time::interval(Duration::from_millis(500));
    let mut step: u32 = 0;

    // ── Event loop ──────────────────────────────────────────────────
    loop {
        tokio::select! {
            // Branch 1: event from the session loop.
            event = event_rx.recv() => {
                let Some(event) = event else {
                    tracing::info!("Event channel closed, exiting");
                    break;
                };

                match event {
                    SyncEvent::Connected => {
                        // Every (re)connection is a fresh session on the server.
                        // The connection may already be gone again; the next
                        // Connected event retries.
                        match client.join_game(name.as_str()) {
                            Ok(()) => {
                                let _ = client.send_chat_message("hello from Rust");
                                tracing::info!("Joined as {name}");
                            }
                            Err(e) => tracing::warn!("Could not join: {e}"),
                        }
                    }

                    SyncEvent::PlayerJoined { player } => {
                        tracing::info!("Player joined: {} ({})", player.name, player.id);
                    }

                    SyncEvent::PlayerLeft { player_id } => {
                        tracing::info!("Player left: {player_id}");
                    }

                    SyncEvent::PlayerMoved { player_id, position } => {
                        tracing::debug!(
                            "{player_id} moved to ({:.1}, {:.1}, {:.1})",
                            position.x, position.y, position.z
                        );
                    }

                    SyncEvent::ChatMessage { player_name, message } => {
                        tracing::info!("[chat] {player_name}: {message}");
                    }

                    SyncEvent::GameState { players } => {
                        tracing::info!("Roster snapshot: {} player(s)", players.len());
                    }

                    SyncEvent::Disconnected { code, reason } => {
                        tracing::warn!(
                            "Disconnected (code {code:?}): {}",
                            reason.as_deref().unwrap_or("no reason")
                        );
                    }

                    SyncEvent::ReconnectScheduled { attempt, delay } => {
                        tracing::info!("Reconnect attempt {attempt} in {delay:?}");
                    }

                    SyncEvent::ReconnectExhausted { attempts } => {
                        tracing::error!("Server unreachable after {attempts} attempts, giving up");
                        break;
                    }
                }
            }

            // Branch 2: walk in a circle while connected.
            _ = walk.tick() => {
                if client.is_connected() {
                    let angle = f32::from(u16::try_from(step % 360).unwrap_or(0)).to_radians();
                    step = step.wrapping_add(10);
                    // Sends racing a disconnect fail with NotConnected; skip them.
                    let _ = client.send_player_move(Position::new(
                        5.0 * angle.cos(),
                        1.0,
                        5.0 * angle.sin(),
                    ));
                }
            }

            // Branch 3: Ctrl+C, shut down gracefully.
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Ctrl+C received, shutting down…");
                break;
            }
        }
    }

    // ── Cleanup ─────────────────────────────────────────────────────
    let players = client.game().with(|game| game.other_player_count());
    tracing::info!("Leaving with {players} other player(s) online");
    client.shutdown().await;
    tracing::info!("Client shut down. Goodbye!");
    Ok(())
}
