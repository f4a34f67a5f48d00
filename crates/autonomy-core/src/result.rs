// crates/autonomy-core/src/result.rs
// ============================================================================
// Module: Pipeline Results
// Description: The terminal outcome of a single call through the Tool Execution Pipeline.
// Purpose: Summarize every phase C1-C9 touched for a call, for callers and audit.
// Dependencies: serde
// ============================================================================

//! The terminal outcome of a single call through the Tool Execution Pipeline.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::RequestId;
use crate::ids::ToolName;
use crate::validation::ValidationResult;

/// Outcome of the approval phase (C4) for a call that required approval.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApprovalOutcome {
    /// Approval request raised for this call.
    pub approval_id: crate::ids::ApprovalId,
    /// Final status reached.
    pub status: crate::approval::ApprovalStatus,
}

/// A single post-execution check result, shared by the Verifier (C5) and
/// Invariant Checker (C6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckOutcome {
    /// Name of the check that ran.
    pub name: String,
    /// Whether the check passed.
    pub passed: bool,
    /// Whether a failure of this check should block further processing and
    /// trigger compensation.
    pub critical: bool,
    /// Detail explaining the result, populated on failure.
    pub detail: Option<String>,
}

/// Overall outcome of a [`CheckSetOutcome`], computed from its individual
/// [`CheckOutcome`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    /// Every check passed (trivially true for an empty set).
    Passed,
    /// Every check failed.
    Failed,
    /// Some checks passed and some failed.
    Partial,
}

/// Aggregate result of running a set of [`CheckOutcome`]s (verification
/// post-conditions or invariants).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckSetOutcome {
    /// Individual check results, in evaluation order.
    pub checks: Vec<CheckOutcome>,
    /// Overall status computed from `checks`.
    pub status: CheckStatus,
}

impl CheckSetOutcome {
    /// Builds an outcome from individual checks, computing its overall
    /// status: passed iff every check passes, failed iff every check fails,
    /// partial otherwise.
    #[must_use]
    pub fn new(checks: Vec<CheckOutcome>) -> Self {
        let passed_count = checks.iter().filter(|check| check.passed).count();
        let status = if checks.is_empty() || passed_count == checks.len() {
            CheckStatus::Passed
        } else if passed_count == 0 {
            CheckStatus::Failed
        } else {
            CheckStatus::Partial
        };
        Self { checks, status }
    }

    /// Whether every check passed.
    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.checks.iter().all(|check| check.passed)
    }

    /// Whether any failed check is marked critical.
    #[must_use]
    pub fn has_critical_failure(&self) -> bool {
        self.checks.iter().any(|check| !check.passed && check.critical)
    }
}

/// Outcome of the compensation phase (C7), present only when compensation
/// was attempted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompensationOutcome {
    /// Name of the compensation handler invoked, or the tool name when no
    /// handler was registered to invoke.
    pub handler_name: String,
    /// Whether a registered handler was actually invoked. `false` means no
    /// compensation handler exists for this tool.
    pub attempted: bool,
    /// Whether compensation completed successfully.
    pub succeeded: bool,
    /// Detail explaining the result, populated on failure.
    pub detail: Option<String>,
}

/// Terminal status of a call's run through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStatus {
    /// The call executed and passed all post-conditions and invariants.
    Succeeded,
    /// The call failed schema validation and never reached execution.
    RejectedByValidation,
    /// The call was denied or timed out at the approval gate.
    RejectedByApproval,
    /// Execution, verification, or invariant checking failed and
    /// compensation succeeded.
    FailedAndCompensated,
    /// Execution, verification, or invariant checking failed and
    /// compensation did not run or did not succeed.
    FailedUncompensated,
    /// The call was rejected before execution because the kernel is in
    /// safe mode and the tool has side effects.
    RejectedBySafeMode,
}

/// The full record of a call's journey through the Tool Execution Pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineResult {
    /// Call this result is for.
    pub request_id: RequestId,
    /// Tool the call targeted.
    pub tool_name: ToolName,
    /// Terminal status reached.
    pub status: PipelineStatus,
    /// Outcome of schema validation for this call.
    pub validation: ValidationResult,
    /// Approval outcome, present iff the tool's risk class required it.
    pub approval: Option<ApprovalOutcome>,
    /// Return value of the action handler, present iff execution ran.
    pub execution_output: Option<Value>,
    /// Verification (post-condition) outcome, present iff execution ran.
    pub verification: Option<CheckSetOutcome>,
    /// Invariant check outcome, present iff execution ran.
    pub invariants: Option<CheckSetOutcome>,
    /// Compensation outcome, present iff compensation was attempted.
    pub compensation: Option<CompensationOutcome>,
    /// Wall-clock time spent inside the pipeline, end to end.
    pub duration_ms: u64,
    /// Human-readable failure summary, present iff `status` is not
    /// [`PipelineStatus::Succeeded`].
    pub error: Option<String>,
}

impl PipelineResult {
    /// Whether the pipeline ultimately succeeded.
    #[must_use]
    pub const fn succeeded(&self) -> bool {
        matches!(self.status, PipelineStatus::Succeeded)
    }
}
