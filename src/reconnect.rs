//! Reconnection controller.
//!
//! [`ReconnectController`] decides what happens after a connection is lost.
//! It owns at most one pending reconnect timer; scheduling while a timer is
//! pending is a no-op, and every transition that ends reconnection cancels the
//! timer first.
//!
//! ```text
//!   Idle / Connected ── lost abnormally ──▶ Reconnecting ── attempts used up ──▶ GivenUp
//!          ▲                                     │
//!          └──── opened / closed with 1000 ◀─────┘
//! ```
//!
//! A manual connect or disconnect cancels the timer and returns to `Idle`.
//!
//! Delays grow linearly: attempt `n` waits `base_delay * n`.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::Sleep;
use tracing::debug;

use crate::transport::is_normal_close;

/// Default number of reconnection attempts before giving up.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Default delay unit between reconnection attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

/// How many times to reconnect and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Number of reconnection attempts before the controller gives up.
    pub max_attempts: u32,
    /// Delay before the first attempt; attempt `n` waits `n` times as long.
    pub base_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BASE_DELAY,
        }
    }
}

impl ReconnectPolicy {
    /// Set the number of reconnection attempts.
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the delay unit between attempts.
    #[must_use]
    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    /// Delay to wait before the given (1-based) attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReconnectPhase {
    /// Not connected and not trying to be (initial state, or after a manual
    /// disconnect or a normal close).
    #[default]
    Idle,
    /// A connection is open.
    Connected,
    /// The connection was lost; a reconnect is scheduled or in flight.
    Reconnecting,
    /// Every attempt failed. Only a manual connect leaves this phase.
    GivenUp,
}

/// Outcome of reporting a lost or failed connection to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// A reconnect was scheduled after `delay`.
    Scheduled { attempt: u32, delay: Duration },
    /// A reconnect is already pending; nothing new was scheduled.
    AlreadyPending,
    /// The loss was intentional; reconnection is suppressed.
    Suppressed,
    /// All attempts are used up.
    Exhausted { attempts: u32 },
}

/// The single scheduled reconnect.
#[derive(Debug)]
struct PendingReconnect {
    attempt: u32,
    delay: Duration,
    sleep: Pin<Box<Sleep>>,
}

/// Drives reconnection after abnormal connection loss.
///
/// Timers are created with `tokio::time`, so scheduling must happen inside a
/// tokio runtime.
#[derive(Debug)]
pub struct ReconnectController {
    policy: ReconnectPolicy,
    phase: ReconnectPhase,
    attempts: u32,
    pending: Option<PendingReconnect>,
}

impl ReconnectController {
    /// Create an idle controller.
    pub fn new(policy: ReconnectPolicy) -> Self {
        Self {
            policy,
            phase: ReconnectPhase::Idle,
            attempts: 0,
            pending: None,
        }
    }

    pub fn policy(&self) -> &ReconnectPolicy {
        &self.policy
    }

    pub fn phase(&self) -> ReconnectPhase {
        self.phase
    }

    /// Reconnection attempts made since the last successful or manual connect.
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Returns `true` while a reconnect timer is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Attempt number and delay of the pending reconnect, if any.
    pub fn pending_attempt(&self) -> Option<(u32, Duration)> {
        self.pending.as_ref().map(|p| (p.attempt, p.delay))
    }

    /// A connection was established.
    pub fn connection_opened(&mut self) {
        self.cancel();
        self.attempts = 0;
        self.phase = ReconnectPhase::Connected;
    }

    /// The connection was closed with the given close code.
    pub fn connection_closed(&mut self, code: Option<u16>) -> ReconnectDecision {
        if is_normal_close(code) {
            self.cancel();
            self.phase = ReconnectPhase::Idle;
            return ReconnectDecision::Suppressed;
        }
        self.schedule()
    }

    /// The connection failed at the transport level, or a connect attempt failed.
    pub fn connection_failed(&mut self) -> ReconnectDecision {
        self.schedule()
    }

    /// The user asked to connect. Clears any previous give-up.
    pub fn manual_connect(&mut self) {
        self.cancel();
        self.attempts = 0;
        self.phase = ReconnectPhase::Idle;
    }

    /// The user asked to disconnect. Suppresses reconnection until the next
    /// manual connect.
    pub fn manual_disconnect(&mut self) {
        self.cancel();
        self.phase = ReconnectPhase::Idle;
    }

    /// Wait for the pending reconnect timer and return its attempt number.
    ///
    /// Never resolves while nothing is scheduled. Cancel-safe: dropping the
    /// future keeps the timer pending.
    pub async fn due(&mut self) -> u32 {
        let Some(pending) = self.pending.as_mut() else {
            return std::future::pending().await;
        };
        pending.sleep.as_mut().await;
        let attempt = pending.attempt;
        self.pending = None;
        attempt
    }

    fn schedule(&mut self) -> ReconnectDecision {
        if self.pending.is_some() {
            debug!("reconnect already pending, not scheduling another");
            return ReconnectDecision::AlreadyPending;
        }
        if self.phase == ReconnectPhase::GivenUp || self.attempts >= self.policy.max_attempts {
            self.phase = ReconnectPhase::GivenUp;
            return ReconnectDecision::Exhausted {
                attempts: self.attempts,
            };
        }

        self.attempts += 1;
        let attempt = self.attempts;
        let delay = self.policy.delay_for(attempt);
        self.pending = Some(PendingReconnect {
            attempt,
            delay,
            sleep: Box::pin(tokio::time::sleep(delay)),
        });
        self.phase = ReconnectPhase::Reconnecting;
        ReconnectDecision::Scheduled { attempt, delay }
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            debug!(attempt = pending.attempt, "cancelled pending reconnect");
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
    use crate::transport::NORMAL_CLOSE_CODE;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[tokio::test(start_paused = true)]
    async fn repeated_failures_back_off_linearly_then_give_up() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        ctl.connection_opened();

        let mut delays = Vec::new();
        let mut decision = ctl.connection_closed(Some(1006));
        while let ReconnectDecision::Scheduled { attempt, delay } = decision {
            delays.push(delay);
            assert_eq!(ctl.due().await, attempt);
            decision = ctl.connection_failed();
        }

        assert_eq!(delays, vec![ms(2000), ms(4000), ms(6000), ms(8000), ms(10000)]);
        assert_eq!(decision, ReconnectDecision::Exhausted { attempts: 5 });
        assert_eq!(ctl.phase(), ReconnectPhase::GivenUp);
        assert!(!ctl.is_pending());

        // Stays given up.
        assert_eq!(
            ctl.connection_failed(),
            ReconnectDecision::Exhausted { attempts: 5 }
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timer_fires_after_the_scheduled_delay() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        let start = tokio::time::Instant::now();
        ctl.connection_failed();

        assert_eq!(ctl.due().await, 1);
        let waited = start.elapsed();
        assert!(waited >= ms(2000) && waited < ms(2100), "waited {waited:?}");
        assert!(!ctl.is_pending());
        assert_eq!(ctl.phase(), ReconnectPhase::Reconnecting);
    }

    #[tokio::test]
    async fn only_one_reconnect_is_pending_at_a_time() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        // A transport error followed by the abnormal close it causes.
        assert_eq!(
            ctl.connection_failed(),
            ReconnectDecision::Scheduled {
                attempt: 1,
                delay: ms(2000)
            }
        );
        assert_eq!(
            ctl.connection_closed(Some(1006)),
            ReconnectDecision::AlreadyPending
        );
        assert_eq!(ctl.attempts(), 1);
        assert_eq!(ctl.pending_attempt(), Some((1, ms(2000))));
    }

    #[tokio::test]
    async fn normal_close_suppresses_reconnect() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        ctl.connection_failed();
        ctl.connection_failed();
        assert!(ctl.is_pending());

        assert_eq!(
            ctl.connection_closed(Some(NORMAL_CLOSE_CODE)),
            ReconnectDecision::Suppressed
        );
        assert!(!ctl.is_pending());
        assert_eq!(ctl.phase(), ReconnectPhase::Idle);
    }

    #[tokio::test]
    async fn missing_close_code_is_abnormal() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        ctl.connection_opened();
        assert!(matches!(
            ctl.connection_closed(None),
            ReconnectDecision::Scheduled { attempt: 1, .. }
        ));
    }

    #[tokio::test]
    async fn manual_disconnect_cancels_pending_timer() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        ctl.connection_failed();
        ctl.manual_disconnect();

        assert!(!ctl.is_pending());
        assert_eq!(ctl.phase(), ReconnectPhase::Idle);
        let fired = tokio::time::timeout(ms(50), ctl.due()).await;
        assert!(fired.is_err(), "cancelled timer must never fire");
    }

    #[tokio::test]
    async fn successful_connect_resets_attempts() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default());
        ctl.connection_failed();
        ctl.manual_disconnect();
        ctl.connection_failed();
        assert_eq!(ctl.attempts(), 2);

        ctl.connection_opened();
        assert_eq!(ctl.attempts(), 0);
        assert_eq!(ctl.phase(), ReconnectPhase::Connected);
        assert!(!ctl.is_pending());
    }

    #[tokio::test]
    async fn manual_connect_leaves_given_up() {
        let policy = ReconnectPolicy::default().with_max_attempts(1);
        let mut ctl = ReconnectController::new(policy);
        ctl.connection_failed();
        ctl.manual_disconnect();
        assert_eq!(
            ctl.connection_failed(),
            ReconnectDecision::Exhausted { attempts: 1 }
        );
        assert_eq!(ctl.phase(), ReconnectPhase::GivenUp);

        ctl.manual_connect();
        assert_eq!(ctl.phase(), ReconnectPhase::Idle);
        assert_eq!(ctl.attempts(), 0);
        assert!(matches!(
            ctl.connection_failed(),
            ReconnectDecision::Scheduled { attempt: 1, .. }
        ));
    }

    #[test]
    fn zero_attempts_gives_up_immediately() {
        let mut ctl = ReconnectController::new(ReconnectPolicy::default().with_max_attempts(0));
        assert_eq!(
            ctl.connection_failed(),
            ReconnectDecision::Exhausted { attempts: 0 }
        );
    }

    #[test]
    fn policy_delay_is_base_times_attempt() {
        let policy = ReconnectPolicy::default().with_base_delay(ms(500));
        assert_eq!(policy.delay_for(1), ms(500));
        assert_eq!(policy.delay_for(4), ms(2000));
    }
}
