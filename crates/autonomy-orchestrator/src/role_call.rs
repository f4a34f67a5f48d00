// crates/autonomy-orchestrator/src/role_call.rs
// ============================================================================
// Module: Role-Call Policy
// Description: Timeout, retry with backoff, and circuit breaking around role invocations.
// Purpose: Apply one uniform resilience policy across Planner/Executor/MemoryWriter/Auditor.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! Generalizes the fail-closed posture of `StaticPolicyConfig::to_decision`
//! (deny on ambiguity) into a call wrapper: a role that trips its circuit
//! breaker is refused outright rather than retried, and retries back off
//! exponentially rather than hammering a failing backend.

use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use tracing::warn;

/// Configuration for [`call_with_policy`].
#[derive(Debug, Clone, Copy)]
pub struct RoleCallPolicy {
    /// Maximum number of attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry; doubles on each subsequent retry.
    pub initial_backoff: Duration,
    /// Upper bound on backoff delay regardless of attempt count.
    pub max_backoff: Duration,
    /// Consecutive failures (across calls sharing a [`CircuitBreaker`])
    /// before the breaker opens.
    pub circuit_breaker_threshold: u32,
    /// How long an open breaker stays open before allowing a trial call.
    pub circuit_breaker_reset_after: Duration,
}

impl RoleCallPolicy {
    /// A reasonable default: three attempts, 100ms initial backoff doubling
    /// to a 2s cap, breaker opens after five consecutive failures and
    /// resets after thirty seconds.
    #[must_use]
    pub const fn default_policy() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_secs(2),
            circuit_breaker_threshold: 5,
            circuit_breaker_reset_after: Duration::from_secs(30),
        }
    }

    fn backoff_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff.saturating_mul(multiplier).min(self.max_backoff)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BreakerState {
    Closed,
    Open,
    HalfOpen,
}

struct BreakerInner {
    state: BreakerState,
    consecutive_failures: u32,
    opened_at: Option<Instant>,
}

/// Tracks consecutive failures for a single role and opens a circuit once
/// they exceed a threshold, refusing further calls until a cooldown
/// elapses.
pub struct CircuitBreaker {
    inner: Mutex<BreakerInner>,
    threshold: u32,
    reset_after: Duration,
}

/// Errors raised by [`call_with_policy`].
#[derive(Debug, thiserror::Error)]
pub enum RoleCallError<E> {
    /// The circuit breaker is open; the call was refused without attempting
    /// it.
    #[error("circuit breaker open, call refused")]
    CircuitOpen,
    /// Every attempt failed; carries the last underlying error.
    #[error("role call failed after retries: {0}")]
    Exhausted(E),
}

impl CircuitBreaker {
    /// Creates a closed breaker under `policy`.
    #[must_use]
    pub fn new(policy: RoleCallPolicy) -> Self {
        Self {
            inner: Mutex::new(BreakerInner {
                state: BreakerState::Closed,
                consecutive_failures: 0,
                opened_at: None,
            }),
            threshold: policy.circuit_breaker_threshold,
            reset_after: policy.circuit_breaker_reset_after,
        }
    }

    fn allow_call(&self) -> bool {
        let Ok(mut guard) = self.inner.lock() else {
            return false;
        };
        match guard.state {
            BreakerState::Closed | BreakerState::HalfOpen => true,
            BreakerState::Open => {
                let elapsed = guard.opened_at.is_some_and(|opened_at| opened_at.elapsed() >= self.reset_after);
                if elapsed {
                    guard.state = BreakerState::HalfOpen;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn record_success(&self) {
        if let Ok(mut guard) = self.inner.lock() {
            guard.state = BreakerState::Closed;
            guard.consecutive_failures = 0;
            guard.opened_at = None;
        }
    }

    fn record_failure(&self) {
        let Ok(mut guard) = self.inner.lock() else {
            return;
        };
        guard.consecutive_failures += 1;
        if guard.consecutive_failures >= self.threshold {
            guard.state = BreakerState::Open;
            guard.opened_at = Some(Instant::now());
        }
    }
}

/// Invokes `call` under `policy`, retrying on failure with exponential
/// backoff and refusing to call at all while `breaker` is open.
///
/// # Errors
///
/// Returns [`RoleCallError::CircuitOpen`] if the breaker refused the call,
/// or [`RoleCallError::Exhausted`] carrying the last error if every attempt
/// failed.
pub fn call_with_policy<T, E>(
    policy: &RoleCallPolicy,
    breaker: &CircuitBreaker,
    mut call: impl FnMut() -> Result<T, E>,
) -> Result<T, RoleCallError<E>> {
    if !breaker.allow_call() {
        return Err(RoleCallError::CircuitOpen);
    }

    let mut last_error = None;
    for attempt in 1..=policy.max_attempts {
        match call() {
            Ok(value) => {
                breaker.record_success();
                return Ok(value);
            }
            Err(err) => {
                warn!(attempt, "role call attempt failed");
                last_error = Some(err);
                if attempt < policy.max_attempts {
                    std::thread::sleep(policy.backoff_for_attempt(attempt));
                }
            }
        }
    }
    breaker.record_failure();
    Err(RoleCallError::Exhausted(last_error.expect("loop ran at least once")))
}
