// crates/autonomy-kernel/src/safe_mode.rs
// ============================================================================
// Module: Safe-Mode Controller (C11)
// Description: Trips the kernel into safe mode after too many consecutive failures.
// Purpose: Stop an agent from repeating a failing action unboundedly.
// Dependencies: autonomy-core
// ============================================================================

//! Trips the kernel into safe mode after too many consecutive failures.

use std::sync::Mutex;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use crate::fsm::FsmObserver;
use crate::fsm::KernelState;
use crate::fsm::Trigger;

/// Whether the kernel is accepting new calls for execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SafeModeStatus {
    /// Normal operation.
    Normal,
    /// Tripped: new calls should be rejected until reset.
    Tripped,
}

/// An [`FsmObserver`] that counts consecutive terminal failures and trips
/// safe mode once a threshold is reached. A single success resets the
/// streak.
pub struct SafeModeController {
    threshold: u32,
    consecutive_failures: Mutex<u32>,
    tripped: AtomicBool,
}

impl SafeModeController {
    /// Creates a controller that trips after `threshold` consecutive
    /// failures.
    #[must_use]
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            consecutive_failures: Mutex::new(0),
            tripped: AtomicBool::new(false),
        }
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> SafeModeStatus {
        if self.tripped.load(Ordering::SeqCst) {
            SafeModeStatus::Tripped
        } else {
            SafeModeStatus::Normal
        }
    }

    /// Manually clears a tripped state, e.g. after operator intervention.
    pub fn reset(&self) {
        self.tripped.store(false, Ordering::SeqCst);
        if let Ok(mut guard) = self.consecutive_failures.lock() {
            *guard = 0;
        }
    }
}

impl FsmObserver for SafeModeController {
    fn on_transition(&self, _from: KernelState, to: KernelState, _trigger: Trigger) {
        match to {
            KernelState::Succeeded => {
                if let Ok(mut guard) = self.consecutive_failures.lock() {
                    *guard = 0;
                }
            }
            KernelState::Failed => {
                let Ok(mut guard) = self.consecutive_failures.lock() else {
                    return;
                };
                *guard += 1;
                if *guard >= self.threshold {
                    self.tripped.store(true, Ordering::SeqCst);
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trips_after_threshold_consecutive_failures() {
        let controller = SafeModeController::new(3);
        for _ in 0..2 {
            controller.on_transition(KernelState::Checked, KernelState::Failed, Trigger::CompensationFailed);
        }
        assert_eq!(controller.status(), SafeModeStatus::Normal);
        controller.on_transition(KernelState::Checked, KernelState::Failed, Trigger::CompensationFailed);
        assert_eq!(controller.status(), SafeModeStatus::Tripped);
    }

    #[test]
    fn success_resets_the_streak() {
        let controller = SafeModeController::new(2);
        controller.on_transition(KernelState::Checked, KernelState::Failed, Trigger::CompensationFailed);
        controller.on_transition(KernelState::Checked, KernelState::Succeeded, Trigger::ChecksPassed);
        controller.on_transition(KernelState::Checked, KernelState::Failed, Trigger::CompensationFailed);
        assert_eq!(controller.status(), SafeModeStatus::Normal);
    }

    #[test]
    fn reset_clears_tripped_state() {
        let controller = SafeModeController::new(1);
        controller.on_transition(KernelState::Checked, KernelState::Failed, Trigger::CompensationFailed);
        assert_eq!(controller.status(), SafeModeStatus::Tripped);
        controller.reset();
        assert_eq!(controller.status(), SafeModeStatus::Normal);
    }
}
