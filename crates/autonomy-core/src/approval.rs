// crates/autonomy-core/src/approval.rs
// ============================================================================
// Module: Approval Requests and Decisions
// Description: Human-in-the-loop approval data model for the Approval Gate (C4).
// Purpose: Represent suspended calls awaiting approval, and the decisions that resolve them.
// Dependencies: serde
// ============================================================================

//! Human-in-the-loop approval data model for the Approval Gate (C4).

use serde::Deserialize;
use serde::Serialize;

use crate::ids::ApprovalId;
use crate::ids::RequestId;
use crate::time::Timestamp;

/// Lifecycle state of an approval request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    /// Awaiting a decision; the owning pipeline call is blocked.
    Pending,
    /// Approved, execution may proceed.
    Approved,
    /// Denied, execution is aborted.
    Denied,
    /// No decision arrived before the configured timeout; treated as denied.
    TimedOut,
    /// Withdrawn before a decision was made, e.g. because the run was
    /// cancelled.
    Cancelled,
}

impl ApprovalStatus {
    /// Whether this status permits the pipeline to proceed with execution.
    #[must_use]
    pub const fn permits_execution(self) -> bool {
        matches!(self, Self::Approved)
    }

    /// Whether this status is terminal (no further transitions expected).
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// A request for human or policy approval of a proposed tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Unique identifier for this approval request.
    pub approval_id: ApprovalId,
    /// The tool call awaiting approval.
    pub request_id: RequestId,
    /// Current lifecycle state.
    pub status: ApprovalStatus,
    /// When the request was created.
    pub created_at: Timestamp,
    /// When the request was resolved, if it has been.
    pub resolved_at: Option<Timestamp>,
    /// Freeform justification supplied by the approver, if any.
    pub reason: Option<String>,
    /// Identifier of whoever resolved the request, if it has been.
    pub decided_by: Option<String>,
}

impl ApprovalRequest {
    /// Creates a new pending approval request.
    #[must_use]
    pub fn pending(
        approval_id: impl Into<ApprovalId>,
        request_id: impl Into<RequestId>,
        created_at: Timestamp,
    ) -> Self {
        Self {
            approval_id: approval_id.into(),
            request_id: request_id.into(),
            status: ApprovalStatus::Pending,
            created_at,
            resolved_at: None,
            reason: None,
            decided_by: None,
        }
    }

    /// Resolves the request with a terminal status.
    pub fn resolve(&mut self, status: ApprovalStatus, resolved_at: Timestamp, reason: Option<String>, decided_by: Option<String>) {
        self.status = status;
        self.resolved_at = Some(resolved_at);
        self.reason = reason;
        self.decided_by = decided_by;
    }
}

/// A decision submitted by an approver to resolve an [`ApprovalRequest`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalDecision {
    /// Request being resolved.
    pub approval_id: ApprovalId,
    /// `true` to approve, `false` to deny.
    pub approved: bool,
    /// Optional justification recorded on the request and in the audit log.
    pub reason: Option<String>,
    /// Identifier of the approver submitting this decision.
    pub decided_by: String,
}
