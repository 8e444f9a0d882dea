//! Async client for the game server.
//!
//! [`SyncClient`] is a thin handle that communicates with a background
//! session loop via an unbounded MPSC channel. The loop owns the connection,
//! the reconnection controller and the inbound decode/reconcile path; it runs
//! every handler to completion before picking up the next one, so the game
//! state is only ever written from one place.
//!
//! Events are emitted on a bounded channel returned from [`SyncClient::start`];
//! the reconciled [`GameState`] and the [`ConnectionStatus`] are available as
//! observable [`Store`]s.
//!
//! # Example
//!
//! ```rust,ignore
//! let (client, mut events) = SyncClient::start(WebSocketConnector::new(), SyncConfig::new());
//! client.connect("ws://localhost:8080")?;
//!
//! while let Some(event) = events.recv().await {
//!     match event {
//!         SyncEvent::Connected => client.join_game("Ann")?,
//!         SyncEvent::PlayerMoved { player_id, position } => renderer.move_to(&player_id, position),
//!         SyncEvent::ReconnectExhausted { .. } => break,
//!         _ => {}
//!     }
//! }
//! ```

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

use crate::codec;
use crate::error::{Result, SyncError};
use crate::event::SyncEvent;
use crate::protocol::{ClientMessage, Player, Position};
use crate::reconnect::{ReconnectController, ReconnectDecision, ReconnectPhase, ReconnectPolicy};
use crate::state::{GameState, DEFAULT_CHAT_CAPACITY};
use crate::store::Store;
use crate::transport::{
    CloseInfo, ConnectionState, Connector, Transport, TransportEvent, NORMAL_CLOSE_CODE,
};

/// Endpoint of a game server running locally with default settings.
pub const DEFAULT_ENDPOINT: &str = "ws://localhost:8080";

/// Default capacity of the bounded event channel.
const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 256;

/// Default timeout for the graceful shutdown.
const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(1);

// ── Configuration ───────────────────────────────────────────────────

/// Configuration for a [`SyncClient`].
///
/// # Example
///
/// ```
/// use game_sync_client::client::SyncConfig;
/// use game_sync_client::reconnect::ReconnectPolicy;
/// use std::time::Duration;
///
/// let config = SyncConfig::new()
///     .with_reconnect_policy(ReconnectPolicy::default().with_max_attempts(3))
///     .with_chat_capacity(50)
///     .with_shutdown_timeout(Duration::from_secs(5));
/// assert_eq!(config.reconnect.max_attempts, 3);
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Reconnection attempts and backoff.
    ///
    /// Defaults to **5** attempts waiting 2 s, 4 s, 6 s, 8 s and 10 s.
    pub reconnect: ReconnectPolicy,
    /// Number of chat lines kept in [`GameState::chat`].
    ///
    /// Defaults to **100**. Values below 1 are clamped to 1.
    pub chat_capacity: usize,
    /// Capacity of the bounded event channel.
    ///
    /// When the consumer cannot keep up, events are dropped (with a warning
    /// logged) to avoid blocking the session loop. The game state store is
    /// updated regardless.
    ///
    /// Defaults to **256**. Values below 1 are clamped to 1.
    pub event_channel_capacity: usize,
    /// Timeout for the graceful shutdown.
    ///
    /// Defaults to **1 second**. A zero timeout aborts the session loop
    /// immediately without waiting for graceful shutdown.
    pub shutdown_timeout: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            reconnect: ReconnectPolicy::default(),
            chat_capacity: DEFAULT_CHAT_CAPACITY,
            event_channel_capacity: DEFAULT_EVENT_CHANNEL_CAPACITY,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
        }
    }
}

impl SyncConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the reconnection policy.
    #[must_use]
    pub fn with_reconnect_policy(mut self, policy: ReconnectPolicy) -> Self {
        self.reconnect = policy;
        self
    }

    /// Set the number of chat lines kept. Values below 1 are clamped to 1.
    #[must_use]
    pub fn with_chat_capacity(mut self, capacity: usize) -> Self {
        self.chat_capacity = capacity.max(1);
        self
    }

    /// Set the capacity of the bounded event channel. Values below 1 are
    /// clamped to 1.
    #[must_use]
    pub fn with_event_channel_capacity(mut self, capacity: usize) -> Self {
        self.event_channel_capacity = capacity.max(1);
        self
    }

    /// Set the timeout for the graceful shutdown.
    #[must_use]
    pub fn with_shutdown_timeout(mut self, timeout: Duration) -> Self {
        self.shutdown_timeout = timeout;
        self
    }
}

// ── Connection status ───────────────────────────────────────────────

/// Observable connection status.
///
/// `reconnect == ReconnectPhase::GivenUp` means reconnection is exhausted and
/// only [`SyncClient::connect`] will try again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ConnectionStatus {
    pub state: ConnectionState,
    pub reconnect: ReconnectPhase,
    /// Reconnection attempts since the last successful or manual connect.
    pub attempts: u32,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.state == ConnectionState::Connected
    }

    pub fn has_given_up(&self) -> bool {
        self.reconnect == ReconnectPhase::GivenUp
    }
}

// ── Client handle ───────────────────────────────────────────────────

/// Requests from the handle to the session loop.
#[derive(Debug)]
enum Command {
    Connect(String),
    Send(ClientMessage),
    Disconnect,
}

/// Async client handle for the game server.
///
/// Created via [`SyncClient::start`], which spawns the background session loop
/// and returns this handle together with an event receiver. The client does
/// not connect until [`connect`](Self::connect) is called.
///
/// The send methods return immediately once the message is queued (no
/// round-trip await). They fail with [`SyncError::NotConnected`] while no
/// connection is open; callers that do not care may ignore the error.
pub struct SyncClient {
    /// Sender half of the command channel to the session loop.
    cmd_tx: mpsc::UnboundedSender<Command>,
    /// Reconciled game state, written only by the session loop and `join_game`.
    game: Store<GameState>,
    /// Connection status, written only by the session loop.
    status: Store<ConnectionStatus>,
    /// Handle to the background session loop task.
    task: Option<tokio::task::JoinHandle<()>>,
    /// Oneshot sender to signal the session loop to shut down gracefully.
    shutdown_tx: Option<oneshot::Sender<()>>,
    /// Timeout for the graceful shutdown.
    shutdown_timeout: Duration,
}

impl SyncClient {
    /// Start the session loop and return a handle plus event receiver.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Arguments
    ///
    /// * `connector` — Opens a transport for every (re)connection attempt.
    /// * `config` — Reconnection, chat and channel settings.
    #[must_use = "the event receiver must be used to receive events"]
    pub fn start<C: Connector>(
        connector: C,
        config: SyncConfig,
    ) -> (Self, mpsc::Receiver<SyncEvent>) {
        let (cmd_tx, cmd_rx) = mpsc::unbounded_channel::<Command>();
        // Clamp capacity to at least 1 (tokio panics on 0).
        let capacity = config.event_channel_capacity.max(1);
        let (event_tx, event_rx) = mpsc::channel::<SyncEvent>(capacity);
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let game = Store::new(GameState::with_chat_capacity(config.chat_capacity));
        let status = Store::new(ConnectionStatus::default());

        let session = Session {
            connector: Arc::new(connector),
            endpoint: None,
            transport: None,
            connecting: None,
            reconnect: ReconnectController::new(config.reconnect),
            game: game.clone(),
            status: status.clone(),
            event_tx,
        };
        let task = tokio::spawn(session_loop(session, cmd_rx, shutdown_rx));

        let client = Self {
            cmd_tx,
            game,
            status,
            task: Some(task),
            shutdown_tx: Some(shutdown_tx),
            shutdown_timeout: config.shutdown_timeout,
        };

        (client, event_rx)
    }

    // ── Public API methods ──────────────────────────────────────────

    /// Connect to `endpoint`.
    ///
    /// Does nothing while a connection is open or being opened. Otherwise any
    /// pending reconnect is cancelled and the attempt counter is reset, which
    /// is also how the client leaves the given-up state. Automatic reconnects
    /// reuse the last endpoint passed here.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConnected`] if the client has been shut down.
    pub fn connect(&self, endpoint: impl Into<String>) -> Result<()> {
        self.command(Command::Connect(endpoint.into()))
    }

    /// Join the game as `player_name`.
    ///
    /// Sends `join` and installs a provisional local player (empty id, level 1,
    /// full health, spawn position) in the game state.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConnected`] if no connection is open; the game
    /// state is left untouched in that case.
    pub fn join_game(&self, player_name: impl Into<String>) -> Result<()> {
        let player_name = player_name.into();
        self.send(ClientMessage::Join {
            player_name: player_name.clone(),
        })?;
        self.game
            .update(|state| state.with_current_player(Player::provisional(player_name)));
        Ok(())
    }

    /// Report the local player's position.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConnected`] if no connection is open.
    pub fn send_player_move(&self, position: Position) -> Result<()> {
        self.send(ClientMessage::PlayerMove { position })
    }

    /// Send a chat line.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConnected`] if no connection is open.
    pub fn send_chat_message(&self, message: impl Into<String>) -> Result<()> {
        self.send(ClientMessage::ChatMessage {
            message: message.into(),
        })
    }

    /// Close the connection with the normal close code and stop reconnecting.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::NotConnected`] if the client has been shut down.
    pub fn disconnect(&self) -> Result<()> {
        self.command(Command::Disconnect)
    }

    /// Shut down the client, closing the transport and stopping the background task.
    ///
    /// After calling this method, the event receiver will yield `None` once the
    /// session loop exits.
    pub async fn shutdown(&mut self) {
        debug!("SyncClient: shutdown requested");

        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }

        // Await the session loop with a timeout. If it doesn't exit in time,
        // abort it so the task cannot detach and run indefinitely.
        if let Some(mut task) = self.task.take() {
            match tokio::time::timeout(self.shutdown_timeout, &mut task).await {
                Ok(Ok(())) => {}
                Ok(Err(join_err)) => {
                    warn!("session loop terminated with join error: {join_err}");
                }
                Err(_) => {
                    warn!("session loop did not exit within timeout; aborting task");
                    task.abort();
                    if let Err(join_err) = task.await {
                        debug!("session loop aborted: {join_err}");
                    }
                }
            }
        }

        self.status.update(|status| ConnectionStatus {
            state: ConnectionState::Disconnected,
            ..*status
        });
    }

    // ── State accessors ─────────────────────────────────────────────

    /// Returns `true` if a connection is open.
    pub fn is_connected(&self) -> bool {
        self.status.with(ConnectionStatus::is_connected)
    }

    /// Snapshot of the connection status.
    pub fn status(&self) -> ConnectionStatus {
        self.status.read()
    }

    /// Receive a notification on every connection status change.
    pub fn watch_status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// The reconciled game state.
    pub fn game(&self) -> &Store<GameState> {
        &self.game
    }

    // ── Internal helpers ────────────────────────────────────────────

    /// Queue an outbound message, refusing while disconnected.
    fn send(&self, msg: ClientMessage) -> Result<()> {
        if !self.is_connected() {
            return Err(SyncError::NotConnected);
        }
        self.command(Command::Send(msg))
    }

    fn command(&self, cmd: Command) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .map_err(|_| SyncError::NotConnected)
    }
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("status", &self.status())
            .field("has_task", &self.task.is_some())
            .finish()
    }
}

impl Drop for SyncClient {
    fn drop(&mut self) {
        // `Drop` cannot await a graceful close; aborting drops the session
        // loop future together with its transport.
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

// ── Session loop ────────────────────────────────────────────────────

/// Handshake in flight.
type PendingConnect<T> = BoxFuture<'static, Result<T>>;

/// Everything the session loop owns.
struct Session<C: Connector> {
    connector: Arc<C>,
    /// Endpoint of the last manual connect; reconnects go here.
    endpoint: Option<String>,
    transport: Option<C::Transport>,
    connecting: Option<PendingConnect<C::Transport>>,
    reconnect: ReconnectController,
    game: Store<GameState>,
    status: Store<ConnectionStatus>,
    event_tx: mpsc::Sender<SyncEvent>,
}

/// Background loop that multiplexes commands, handshakes, inbound messages and
/// reconnect timers via `tokio::select!`.
///
/// Exits when the command channel closes (client handle dropped) or the
/// shutdown signal fires.
async fn session_loop<C: Connector>(
    mut session: Session<C>,
    mut cmd_rx: mpsc::UnboundedReceiver<Command>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    debug!("session loop started");

    loop {
        tokio::select! {
            // Branch 1: command from the client handle
            cmd = cmd_rx.recv() => {
                match cmd {
                    Some(cmd) => session.handle_command(cmd).await,
                    None => {
                        debug!("command channel closed, shutting down session loop");
                        session.shut_down().await;
                        break;
                    }
                }
            }

            // Branch 2: shutdown signal
            _ = &mut shutdown_rx => {
                debug!("shutdown signal received");
                session.shut_down().await;
                break;
            }

            // Branch 3: handshake finished
            result = wait_connect(&mut session.connecting) => {
                session.connecting = None;
                session.handle_connect_result(result);
            }

            // Branch 4: inbound message or closure
            incoming = next_transport_event(&mut session.transport) => {
                session.handle_incoming(incoming);
            }

            // Branch 5: reconnect timer fired
            attempt = session.reconnect.due() => {
                session.handle_reconnect_due(attempt);
            }
        }
    }

    debug!("session loop exited");
}

/// Resolve with the handshake result, or never if no handshake is in flight.
async fn wait_connect<T>(connecting: &mut Option<PendingConnect<T>>) -> Result<T> {
    match connecting {
        Some(fut) => fut.await,
        None => std::future::pending().await,
    }
}

/// Receive from the open transport, or never if there is none.
async fn next_transport_event<T: Transport>(
    transport: &mut Option<T>,
) -> Result<TransportEvent> {
    match transport {
        Some(transport) => transport.recv().await,
        None => std::future::pending().await,
    }
}

impl<C: Connector> Session<C> {
    async fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Connect(endpoint) => {
                if self.transport.is_some() {
                    debug!("already connected, skipping connection attempt");
                    return;
                }
                if self.connecting.is_some() {
                    debug!("connection in progress, skipping connection attempt");
                    return;
                }
                self.reconnect.manual_connect();
                self.endpoint = Some(endpoint);
                self.begin_connect();
            }
            Command::Send(msg) => self.send(msg).await,
            Command::Disconnect => {
                if self.close_connection().await {
                    self.emit(SyncEvent::Disconnected {
                        code: Some(NORMAL_CLOSE_CODE),
                        reason: Some("client disconnected".into()),
                    });
                }
            }
        }
    }

    fn begin_connect(&mut self) {
        let Some(endpoint) = self.endpoint.clone() else {
            warn!("no endpoint to connect to");
            return;
        };
        info!(endpoint = %endpoint, "connecting to game server");

        let connector = Arc::clone(&self.connector);
        self.connecting = Some(Box::pin(
            async move { connector.connect(&endpoint).await },
        ));
        self.publish_status(ConnectionState::Connecting);
    }

    fn handle_connect_result(&mut self, result: Result<C::Transport>) {
        match result {
            Ok(transport) => {
                self.transport = Some(transport);
                self.reconnect.connection_opened();
                self.publish_status(ConnectionState::Connected);
                info!("connected to game server");
                self.emit(SyncEvent::Connected);
            }
            Err(e) => {
                warn!("connection attempt failed: {e}");
                let decision = self.reconnect.connection_failed();
                self.apply_decision(decision);
            }
        }
    }

    fn handle_incoming(&mut self, incoming: Result<TransportEvent>) {
        match incoming {
            Ok(TransportEvent::Message(text)) => self.handle_text(&text),
            Ok(TransportEvent::Closed(info)) => self.handle_closed(info),
            Err(e) => {
                error!("transport receive error: {e}");
                self.handle_transport_error(e);
            }
        }
    }

    fn handle_text(&mut self, text: &str) {
        match codec::decode(text) {
            Ok(msg) => {
                debug!(kind = msg.kind(), "received server message");
                self.game.update(|state| state.apply(&msg));
                self.emit(SyncEvent::from(msg));
            }
            Err(e) => {
                warn!("dropping server message: {e}");
                debug!("dropped frame: {text}");
            }
        }
    }

    fn handle_closed(&mut self, info: CloseInfo) {
        info!(code = ?info.code, reason = %info.reason, "disconnected from game server");
        self.transport = None;
        let reason = (!info.reason.is_empty()).then(|| info.reason.clone());
        self.emit(SyncEvent::Disconnected {
            code: info.code,
            reason,
        });
        let decision = self.reconnect.connection_closed(info.code);
        self.apply_decision(decision);
    }

    fn handle_transport_error(&mut self, e: SyncError) {
        self.transport = None;
        self.emit(SyncEvent::Disconnected {
            code: None,
            reason: Some(e.to_string()),
        });
        let decision = self.reconnect.connection_failed();
        self.apply_decision(decision);
    }

    fn handle_reconnect_due(&mut self, attempt: u32) {
        if self.transport.is_some() || self.connecting.is_some() {
            debug!(attempt, "reconnect timer fired while connected, ignoring");
            return;
        }
        info!(
            "reconnection attempt {attempt}/{}",
            self.reconnect.policy().max_attempts
        );
        self.begin_connect();
    }

    fn apply_decision(&mut self, decision: ReconnectDecision) {
        match decision {
            ReconnectDecision::Scheduled { attempt, delay } => {
                warn!(
                    "connection lost, reconnection attempt {attempt}/{} in {delay:?}",
                    self.reconnect.policy().max_attempts
                );
                self.emit(SyncEvent::ReconnectScheduled { attempt, delay });
            }
            ReconnectDecision::AlreadyPending => {}
            ReconnectDecision::Suppressed => {
                debug!("connection closed normally, not reconnecting");
            }
            ReconnectDecision::Exhausted { attempts } => {
                error!("{}", SyncError::ReconnectExhausted { attempts });
                self.emit(SyncEvent::ReconnectExhausted { attempts });
            }
        }
        self.publish_status(ConnectionState::Disconnected);
    }

    async fn send(&mut self, msg: ClientMessage) {
        let Some(transport) = self.transport.as_mut() else {
            debug!(kind = msg.kind(), "not connected, dropping outbound message");
            return;
        };
        let json = match codec::encode(&msg) {
            Ok(json) => json,
            Err(e) => {
                error!("failed to serialize {} message: {e}", msg.kind());
                return;
            }
        };
        debug!(kind = msg.kind(), "sending client message");

        let result = transport.send(json).await;
        if let Err(e) = result {
            error!("transport send error: {e}");
            self.handle_transport_error(e);
        }
    }

    /// Cancel reconnection and any handshake, then close the transport with
    /// the normal code. Returns `true` if a connection was open.
    async fn close_connection(&mut self) -> bool {
        self.reconnect.manual_disconnect();
        if self.connecting.take().is_some() {
            debug!("cancelled in-flight connection attempt");
        }

        let was_open = match self.transport.take() {
            Some(mut transport) => {
                if let Err(e) = transport.close(NORMAL_CLOSE_CODE).await {
                    debug!("error while closing transport: {e}");
                }
                info!("disconnected from game server");
                true
            }
            None => false,
        };
        self.publish_status(ConnectionState::Disconnected);
        was_open
    }

    async fn shut_down(&mut self) {
        if self.close_connection().await {
            // Last event on the channel: wait for room rather than dropping it.
            let event = SyncEvent::Disconnected {
                code: Some(NORMAL_CLOSE_CODE),
                reason: Some("client shut down".into()),
            };
            if self.event_tx.send(event).await.is_err() {
                debug!("event channel closed, receiver dropped");
            }
        }
    }

    fn publish_status(&self, state: ConnectionState) {
        self.status.set(ConnectionStatus {
            state,
            reconnect: self.reconnect.phase(),
            attempts: self.reconnect.attempts(),
        });
    }

    /// Emit an event to the event channel. If the channel is full, log a warning
    /// and drop the event to avoid blocking the session loop.
    fn emit(&self, event: SyncEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(dropped)) => {
                warn!(
                    "event channel full, dropping event: {:?}",
                    std::mem::discriminant(&dropped)
                );
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("event channel closed, receiver dropped");
            }
        }
    }
}

// ── Tests ───────────────────────────────────────────────────────────

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
    use async_trait::async_trait;

    /// A connector whose every attempt is refused.
    struct RefusingConnector;

    /// Never constructed; only names the transport type.
    struct NoTransport;

    #[async_trait]
    impl Transport for NoTransport {
        async fn send(&mut self, _message: String) -> Result<()> {
            Err(SyncError::TransportClosed)
        }

        async fn recv(&mut self) -> Result<TransportEvent> {
            std::future::pending().await
        }

        async fn close(&mut self, _code: u16) -> Result<()> {
            Ok(())
        }
    }

    #[async_trait]
    impl Connector for RefusingConnector {
        type Transport = NoTransport;

        async fn connect(&self, _endpoint: &str) -> Result<NoTransport> {
            Err(SyncError::Connection("refused".into()))
        }
    }

    #[test]
    fn config_defaults() {
        let config = SyncConfig::new();
        assert_eq!(config.reconnect.max_attempts, 5);
        assert_eq!(config.reconnect.base_delay, Duration::from_millis(2000));
        assert_eq!(config.chat_capacity, 100);
        assert_eq!(config.event_channel_capacity, 256);
        assert_eq!(config.shutdown_timeout, Duration::from_secs(1));
    }

    #[test]
    fn config_clamps_capacities() {
        let config = SyncConfig::new()
            .with_chat_capacity(0)
            .with_event_channel_capacity(0);
        assert_eq!(config.chat_capacity, 1);
        assert_eq!(config.event_channel_capacity, 1);
    }

    #[tokio::test]
    async fn starts_disconnected_and_idle() {
        let (mut client, _events) = SyncClient::start(RefusingConnector, SyncConfig::new());
        assert!(!client.is_connected());
        assert_eq!(client.status(), ConnectionStatus::default());
        assert!(client.game().read().current_player.is_none());
        client.shutdown().await;
    }

    #[tokio::test]
    async fn sends_before_connect_are_rejected() {
        let (mut client, _events) = SyncClient::start(RefusingConnector, SyncConfig::new());

        assert!(matches!(
            client.join_game("Ann"),
            Err(SyncError::NotConnected)
        ));
        assert!(matches!(
            client.send_chat_message("hi"),
            Err(SyncError::NotConnected)
        ));
        assert!(matches!(
            client.send_player_move(Position::default()),
            Err(SyncError::NotConnected)
        ));
        // A refused join leaves no provisional player behind.
        assert!(client.game().read().current_player.is_none());

        client.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn refused_connect_schedules_reconnect() {
        let (mut client, mut events) = SyncClient::start(RefusingConnector, SyncConfig::new());
        client.connect(DEFAULT_ENDPOINT).unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            SyncEvent::ReconnectScheduled {
                attempt: 1,
                delay: Duration::from_millis(2000)
            }
        );
        assert_eq!(client.status().reconnect, ReconnectPhase::Reconnecting);

        client.shutdown().await;
    }

    #[tokio::test]
    async fn operations_fail_after_shutdown() {
        let (mut client, mut events) = SyncClient::start(RefusingConnector, SyncConfig::new());
        client.shutdown().await;

        assert!(events.recv().await.is_none());
        assert!(matches!(
            client.connect(DEFAULT_ENDPOINT),
            Err(SyncError::NotConnected)
        ));
        assert!(matches!(client.disconnect(), Err(SyncError::NotConnected)));
    }
}
