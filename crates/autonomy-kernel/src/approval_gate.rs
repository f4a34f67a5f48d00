// crates/autonomy-kernel/src/approval_gate.rs
// ============================================================================
// Module: Approval Gate (C4)
// Description: Suspends pipeline execution pending human or policy approval.
// Purpose: Block risk-classed calls until a decision arrives, times out, or is cancelled.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! There is no direct teacher analogue for a human-in-the-loop suspension
//! point: the control plane this codebase is otherwise grounded on evaluates
//! gates synchronously against evidence already on hand. This module follows
//! the general shape of a blocking rendezvous: a condvar-guarded map from
//! approval id to pending state, woken by whichever thread submits a
//! decision or observes a timeout.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Condvar;
use std::sync::Mutex;
use std::time::Duration;
use std::time::Instant;

use autonomy_core::ApprovalDecision;
use autonomy_core::ApprovalId;
use autonomy_core::ApprovalRequest;
use autonomy_core::ApprovalStatus;
use autonomy_core::CallSource;
use autonomy_core::RequestId;
use autonomy_core::RiskClass;
use autonomy_core::Timestamp;

/// Policy controlling whether a call requires human approval before
/// execution.
#[derive(Debug, Clone)]
pub struct ApprovalPolicy {
    /// Risk class at or above which approval is always required.
    pub require_at_or_above: RiskClass,
    /// Whether `Sensitive`-class calls may be auto-approved without a human
    /// decision when no approver is configured.
    pub auto_approve_sensitive: bool,
    /// Call sources that are auto-approved regardless of risk class, unless
    /// the risk class is `Critical` (irreversible tools are never
    /// auto-approved from untrusted sources).
    pub auto_approve_sources: Vec<String>,
    /// Maximum time to wait for a decision before timing out.
    pub timeout: Duration,
}

impl ApprovalPolicy {
    /// A conservative default: require approval for `Sensitive` and above,
    /// never auto-approve, wait up to five minutes.
    #[must_use]
    pub fn conservative_default() -> Self {
        Self {
            require_at_or_above: RiskClass::Sensitive,
            auto_approve_sensitive: false,
            auto_approve_sources: Vec::new(),
            timeout: Duration::from_secs(300),
        }
    }

    /// Whether a call of `risk_class` proposed by `source` requires an
    /// approval decision. Auto-approval rules are evaluated in order,
    /// first match wins, and never apply to `Critical` calls.
    #[must_use]
    pub fn requires_approval(&self, risk_class: RiskClass, source: &CallSource) -> bool {
        if risk_class >= RiskClass::Critical {
            return true;
        }
        if self.auto_approve_sources.iter().any(|allowed| source_matches(source, allowed)) {
            return false;
        }
        if risk_class >= self.require_at_or_above {
            return !(risk_class == RiskClass::Sensitive && self.auto_approve_sensitive);
        }
        false
    }
}

/// Matches a [`CallSource`] against a configured source name. `"direct"` and
/// `"plan"` match their respective variants; `"compensation"` matches the
/// compensation-resubmission variant.
fn source_matches(source: &CallSource, name: &str) -> bool {
    match source {
        CallSource::Direct => name == "direct",
        CallSource::Plan { .. } => name == "plan",
        CallSource::Compensation { .. } => name == "compensation",
    }
}

struct PendingSlot {
    request: ApprovalRequest,
}

/// Errors raised by the Approval Gate.
#[derive(Debug, thiserror::Error)]
pub enum ApprovalGateError {
    /// The gate's internal lock was poisoned by a panicking thread.
    #[error("approval gate lock poisoned")]
    Poisoned,
    /// A decision was submitted for an approval id that is not pending.
    #[error("no pending approval request: {0}")]
    NotPending(String),
}

/// Blocking approval rendezvous shared between the pipeline thread
/// (waiting) and whatever submits decisions (a CLI command, an API
/// handler, a policy auto-approver).
#[derive(Clone)]
pub struct ApprovalGate {
    pending: Arc<Mutex<BTreeMap<String, PendingSlot>>>,
    condvar: Arc<Condvar>,
    policy: ApprovalPolicy,
}

impl ApprovalGate {
    /// Creates a new gate under `policy`.
    #[must_use]
    pub fn new(policy: ApprovalPolicy) -> Self {
        Self {
            pending: Arc::new(Mutex::new(BTreeMap::new())),
            condvar: Arc::new(Condvar::new()),
            policy,
        }
    }

    /// Returns the configured policy.
    #[must_use]
    pub const fn policy(&self) -> &ApprovalPolicy {
        &self.policy
    }

    /// Opens an approval request and blocks the calling thread until it is
    /// resolved by [`Self::decide`], [`Self::cancel`], or the configured
    /// timeout elapses.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalGateError::Poisoned`] if the internal lock was
    /// poisoned.
    pub fn request_and_wait(
        &self,
        approval_id: impl Into<ApprovalId>,
        request_id: impl Into<RequestId>,
        now: Timestamp,
    ) -> Result<ApprovalRequest, ApprovalGateError> {
        let approval_id = approval_id.into();
        let key = approval_id.as_str().to_string();
        let request = ApprovalRequest::pending(approval_id, request_id, now);

        let mut guard = self.pending.lock().map_err(|_| ApprovalGateError::Poisoned)?;
        guard.insert(key.clone(), PendingSlot { request: request.clone() });
        drop(guard);

        let deadline = Instant::now() + self.policy.timeout;
        let mut guard = self.pending.lock().map_err(|_| ApprovalGateError::Poisoned)?;
        loop {
            if let Some(slot) = guard.get(&key) {
                if slot.request.status.is_terminal() {
                    return Ok(slot.request.clone());
                }
            } else {
                return Err(ApprovalGateError::NotPending(key));
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let (next_guard, timeout_result) = self
                .condvar
                .wait_timeout(guard, remaining)
                .map_err(|_| ApprovalGateError::Poisoned)?;
            guard = next_guard;
            if timeout_result.timed_out() {
                break;
            }
        }

        if let Some(slot) = guard.get_mut(&key) {
            if !slot.request.status.is_terminal() {
                slot.request.resolve(ApprovalStatus::TimedOut, now, None, None);
            }
            Ok(slot.request.clone())
        } else {
            Err(ApprovalGateError::NotPending(key))
        }
    }

    /// Submits a decision for a pending approval request, waking the
    /// blocked waiter.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalGateError::NotPending`] if the approval id is not
    /// currently pending.
    pub fn decide(&self, decision: ApprovalDecision, now: Timestamp) -> Result<(), ApprovalGateError> {
        let mut guard = self.pending.lock().map_err(|_| ApprovalGateError::Poisoned)?;
        let key = decision.approval_id.as_str().to_string();
        let slot = guard.get_mut(&key).ok_or_else(|| ApprovalGateError::NotPending(key))?;
        let status = if decision.approved { ApprovalStatus::Approved } else { ApprovalStatus::Denied };
        slot.request.resolve(status, now, decision.reason, Some(decision.decided_by));
        drop(guard);
        self.condvar.notify_all();
        Ok(())
    }

    /// Cancels a pending approval request, e.g. because the owning run was
    /// aborted.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalGateError::NotPending`] if the approval id is not
    /// currently pending.
    pub fn cancel(&self, approval_id: &ApprovalId, now: Timestamp) -> Result<(), ApprovalGateError> {
        let mut guard = self.pending.lock().map_err(|_| ApprovalGateError::Poisoned)?;
        let key = approval_id.as_str().to_string();
        let slot = guard.get_mut(&key).ok_or_else(|| ApprovalGateError::NotPending(key))?;
        slot.request.resolve(ApprovalStatus::Cancelled, now, None, None);
        drop(guard);
        self.condvar.notify_all();
        Ok(())
    }

    /// Enumerates every approval request that has not yet reached a
    /// terminal status, in no particular order.
    ///
    /// # Errors
    ///
    /// Returns [`ApprovalGateError::Poisoned`] if the internal lock was
    /// poisoned.
    pub fn get_pending(&self) -> Result<Vec<ApprovalRequest>, ApprovalGateError> {
        let guard = self.pending.lock().map_err(|_| ApprovalGateError::Poisoned)?;
        Ok(guard
            .values()
            .filter(|slot| !slot.request.status.is_terminal())
            .map(|slot| slot.request.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::thread;
    use std::time::Duration as StdDuration;

    use time::macros::datetime;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC))
    }

    #[test]
    fn policy_requires_approval_for_critical_regardless_of_flags() {
        let mut policy = ApprovalPolicy::conservative_default();
        policy.require_at_or_above = RiskClass::Critical;
        policy.auto_approve_sensitive = true;
        assert!(policy.requires_approval(RiskClass::Critical, &CallSource::Direct));
    }

    #[test]
    fn auto_approve_sensitive_skips_approval_for_sensitive_only() {
        let mut policy = ApprovalPolicy::conservative_default();
        policy.auto_approve_sensitive = true;
        assert!(!policy.requires_approval(RiskClass::Sensitive, &CallSource::Direct));
        assert!(!policy.requires_approval(RiskClass::Routine, &CallSource::Direct));
        assert!(policy.requires_approval(RiskClass::Critical, &CallSource::Direct));
    }

    #[test]
    fn auto_approve_sources_skips_approval_except_for_critical_calls() {
        let mut policy = ApprovalPolicy::conservative_default();
        policy.auto_approve_sources = vec!["direct".to_string()];
        assert!(!policy.requires_approval(RiskClass::Sensitive, &CallSource::Direct));
        assert!(policy.requires_approval(RiskClass::Critical, &CallSource::Direct));
        assert!(policy.requires_approval(
            RiskClass::Sensitive,
            &CallSource::Compensation {
                original_request_id: "r0".into()
            }
        ));
    }

    #[test]
    fn decide_unblocks_waiting_thread_with_approved_status() {
        let gate = ApprovalGate::new(ApprovalPolicy {
            timeout: StdDuration::from_secs(5),
            ..ApprovalPolicy::conservative_default()
        });
        let waiter_gate = gate.clone();
        let handle = thread::spawn(move || waiter_gate.request_and_wait("ap1", "r1", ts()).expect("wait"));

        thread::sleep(StdDuration::from_millis(50));
        gate.decide(
            ApprovalDecision {
                approval_id: ApprovalId::new("ap1"),
                approved: true,
                reason: Some("ok".to_string()),
                decided_by: "operator-1".to_string(),
            },
            ts(),
        )
        .expect("decide");

        let resolved = handle.join().expect("join");
        assert_eq!(resolved.status, ApprovalStatus::Approved);
        assert_eq!(resolved.decided_by.as_deref(), Some("operator-1"));
    }

    #[test]
    fn get_pending_lists_only_unresolved_requests() {
        let gate = ApprovalGate::new(ApprovalPolicy {
            timeout: StdDuration::from_secs(5),
            ..ApprovalPolicy::conservative_default()
        });
        let waiter_gate = gate.clone();
        let handle = thread::spawn(move || waiter_gate.request_and_wait("ap1", "r1", ts()).expect("wait"));
        thread::sleep(StdDuration::from_millis(50));

        let pending = gate.get_pending().expect("get_pending");
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].approval_id, ApprovalId::new("ap1"));

        gate.decide(
            ApprovalDecision {
                approval_id: ApprovalId::new("ap1"),
                approved: true,
                reason: None,
                decided_by: "operator-1".to_string(),
            },
            ts(),
        )
        .expect("decide");
        handle.join().expect("join");
        assert!(gate.get_pending().expect("get_pending").is_empty());
    }

    #[test]
    fn timeout_resolves_as_timed_out() {
        let gate = ApprovalGate::new(ApprovalPolicy {
            timeout: StdDuration::from_millis(20),
            ..ApprovalPolicy::conservative_default()
        });
        let resolved = gate.request_and_wait("ap1", "r1", ts()).expect("wait");
        assert_eq!(resolved.status, ApprovalStatus::TimedOut);
    }
}
