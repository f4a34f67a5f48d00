// crates/autonomy-core/src/interfaces.rs
// ============================================================================
// Module: Pipeline Interfaces
// Description: Trait seams for effectful dependencies the kernel never hard-wires.
// Purpose: Keep the pipeline testable and transport/backend agnostic, per the
// pluggable-dependency pattern the Dispatcher/EvidenceProvider traits establish.
// Dependencies: serde_json
// ============================================================================

//! Trait seams for effectful dependencies the kernel never hard-wires.

use serde_json::Value;

use crate::call::ProposedToolCall;
use crate::time::Timestamp;

/// Errors raised by an [`ActionHandler`] while executing a tool call.
#[derive(Debug, thiserror::Error)]
pub enum ActionError {
    /// The handler could not reach whatever backend the tool wraps.
    #[error("action handler unreachable: {0}")]
    Unreachable(String),
    /// The handler rejected the call for a reason specific to the tool.
    #[error("action rejected: {0}")]
    Rejected(String),
}

/// Executes the side effect of a registered tool.
///
/// Implementations wrap whatever backend a tool represents — a filesystem
/// operation, an HTTP call, a database write. The pipeline (C9) never
/// constructs side effects itself; it only invokes the handler registered
/// for a call's tool name.
pub trait ActionHandler: Send + Sync {
    /// Executes `call`, returning the tool's output on success.
    ///
    /// # Errors
    ///
    /// Returns [`ActionError`] if the underlying action fails.
    fn execute(&self, call: &ProposedToolCall) -> Result<Value, ActionError>;
}

/// Source of wall-clock time, abstracted so the pipeline's timeout and
/// duration logic can be driven deterministically in tests.
pub trait Clock: Send + Sync {
    /// Returns the current time.
    fn now(&self) -> Timestamp;
}

/// A [`Clock`] backed by the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::from_offset_date_time(time::OffsetDateTime::now_utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(Timestamp);

    impl Clock for FixedClock {
        fn now(&self) -> Timestamp {
            self.0
        }
    }

    #[test]
    fn fixed_clock_always_returns_same_instant() {
        let ts = Timestamp::from_offset_date_time(time::macros::datetime!(2026-01-01 00:00:00 UTC));
        let clock = FixedClock(ts);
        assert_eq!(clock.now(), ts);
        assert_eq!(clock.now(), ts);
    }
}
