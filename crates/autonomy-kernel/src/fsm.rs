// crates/autonomy-kernel/src/fsm.rs
// ============================================================================
// Module: Kernel State Machine (C8)
// Description: Table-driven finite state machine tracking a call's pipeline phase.
// Purpose: Give every pipeline transition a single, auditable point of truth.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! Generalizes the decision/outcome state progression the control plane's
//! trigger handler follows into an explicit `(state, trigger) -> state`
//! table. Observers are invoked synchronously on every transition and
//! panic-isolated so a misbehaving observer (e.g. the Safe-Mode Controller,
//! C11) cannot take down the pipeline thread.

use std::panic::AssertUnwindSafe;
use std::panic::catch_unwind;

/// A call's position in the Tool Execution Pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum KernelState {
    /// Proposed, not yet validated.
    Proposed,
    /// Passed schema validation.
    Validated,
    /// Waiting on an approval decision.
    AwaitingApproval,
    /// Approved, ready to execute.
    Approved,
    /// The action handler ran.
    Executed,
    /// Post-conditions and invariants were checked.
    Checked,
    /// Compensation ran after a critical failure.
    Compensated,
    /// Terminal: the call succeeded end to end.
    Succeeded,
    /// Terminal: the call failed and was not compensated.
    Failed,
}

impl KernelState {
    /// Whether this state is terminal; no further transitions are valid.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// An event driving a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Schema validation passed.
    ValidationPassed,
    /// Schema validation failed.
    ValidationFailed,
    /// The call's risk class requires approval.
    ApprovalRequired,
    /// The call's risk class does not require approval.
    ApprovalNotRequired,
    /// An approval decision resolved as approved.
    ApprovalGranted,
    /// An approval decision resolved as denied or timed out.
    ApprovalDenied,
    /// The action handler completed, successfully or not.
    ExecutionCompleted,
    /// Post-conditions and invariants both passed, or failed non-critically.
    ChecksPassed,
    /// A post-condition or invariant check failed critically.
    ChecksFailedCritically,
    /// Compensation completed successfully.
    CompensationSucceeded,
    /// Compensation failed or was unavailable.
    CompensationFailed,
    /// The call was rejected before validation because the kernel is in
    /// safe mode and the tool has side effects.
    SafeModeRejected,
}

/// Errors raised when a trigger has no valid transition from the current
/// state.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("no transition for trigger {trigger:?} from state {from:?}")]
pub struct FsmError {
    /// State the machine was in when the trigger arrived.
    pub from: KernelState,
    /// Trigger that had no valid transition.
    pub trigger: Trigger,
}

/// Looks up the next state for `(state, trigger)`, per the table in spec
/// §4.8.
///
/// # Errors
///
/// Returns [`FsmError`] if the combination has no valid transition.
pub fn next_state(state: KernelState, trigger: Trigger) -> Result<KernelState, FsmError> {
    use KernelState as S;
    use Trigger as T;
    let result = match (state, trigger) {
        (S::Proposed, T::ValidationPassed) => S::Validated,
        (S::Proposed, T::ValidationFailed) => S::Failed,
        (S::Proposed, T::SafeModeRejected) => S::Failed,
        (S::Validated, T::ApprovalRequired) => S::AwaitingApproval,
        (S::Validated, T::ApprovalNotRequired) => S::Approved,
        (S::AwaitingApproval, T::ApprovalGranted) => S::Approved,
        (S::AwaitingApproval, T::ApprovalDenied) => S::Failed,
        (S::Approved, T::ExecutionCompleted) => S::Executed,
        (S::Executed, T::ChecksPassed) => S::Checked,
        (S::Executed, T::ChecksFailedCritically) => S::Checked,
        (S::Checked, T::CompensationSucceeded) => S::Compensated,
        (S::Checked, T::CompensationFailed) => S::Failed,
        _ => return Err(FsmError { from: state, trigger }),
    };
    Ok(result)
}

/// Resolves the final terminal state once checking (and, if needed,
/// compensation) has completed. `Checked` is not itself terminal: the
/// pipeline still needs to know whether checks passed cleanly to reach
/// `Succeeded`, or failed to reach `Compensated`/`Failed`.
#[must_use]
pub const fn terminal_after_checks(checks_passed_cleanly: bool) -> KernelState {
    if checks_passed_cleanly {
        KernelState::Succeeded
    } else {
        KernelState::Failed
    }
}

/// An observer notified synchronously on every state transition.
pub trait FsmObserver: Send + Sync {
    /// Called after a transition from `from` to `to` driven by `trigger`.
    fn on_transition(&self, from: KernelState, to: KernelState, trigger: Trigger);
}

/// Drives transitions and notifies observers, isolating observer panics so
/// one misbehaving observer cannot abort the pipeline thread.
pub struct ObservedFsm {
    state: KernelState,
    observers: Vec<Box<dyn FsmObserver>>,
}

impl ObservedFsm {
    /// Creates a new machine starting at [`KernelState::Proposed`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: KernelState::Proposed,
            observers: Vec::new(),
        }
    }

    /// Registers an observer, notified on every subsequent transition.
    pub fn add_observer(&mut self, observer: impl FsmObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> KernelState {
        self.state
    }

    /// Applies `trigger`, updates internal state, and notifies observers.
    ///
    /// # Errors
    ///
    /// Returns [`FsmError`] if the trigger has no valid transition from the
    /// current state; state is left unchanged in that case.
    pub fn apply(&mut self, trigger: Trigger) -> Result<KernelState, FsmError> {
        let from = self.state;
        let to = next_state(from, trigger)?;
        self.state = to;
        for observer in &self.observers {
            let observer = observer.as_ref();
            let _ = catch_unwind(AssertUnwindSafe(|| observer.on_transition(from, to, trigger)));
        }
        Ok(to)
    }
}

impl Default for ObservedFsm {
    fn default() -> Self {
        Self::new()
    }
}
