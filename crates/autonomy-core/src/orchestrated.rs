// crates/autonomy-core/src/orchestrated.rs
// ============================================================================
// Module: Orchestrated Results
// Description: The terminal outcome of a goal's run through the Role Orchestrator.
// Purpose: Summarize plan execution, memory writes, and audit findings for a goal.
// Dependencies: serde
// ============================================================================

//! The terminal outcome of a goal's run through the Role Orchestrator.

use serde::Deserialize;
use serde::Serialize;

use crate::ids::GoalId;
use crate::ids::PlanId;
use crate::plan::PlanStatus;
use crate::result::PipelineResult;

/// Severity of an anomaly surfaced by the Auditor role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalySeverity {
    /// Worth noting, did not affect the outcome.
    Info,
    /// May indicate a planning or execution defect.
    Warning,
    /// Indicates the run's result should not be trusted without review.
    Severe,
}

/// A finding raised by the Auditor role while reviewing a completed plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Anomaly {
    /// How serious the finding is.
    pub severity: AnomalySeverity,
    /// Human-readable description of what was observed.
    pub description: String,
    /// Step or request this finding relates to, if any.
    pub related_request_id: Option<crate::ids::RequestId>,
}

/// Measure of how far a plan's actual execution diverged from what was
/// planned, used by the reward model's episode-level drift penalty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriftReport {
    /// Normalized divergence between the planned and executed steps, in
    /// `[0, 1]`. `0` means the plan executed exactly as written.
    pub drift_score: f64,
    /// Plan steps that were skipped, reordered, or substituted.
    pub deviations: Vec<String>,
}

impl DriftReport {
    /// A report indicating no drift was observed.
    #[must_use]
    pub fn none() -> Self {
        Self {
            drift_score: 0.0,
            deviations: Vec::new(),
        }
    }
}

/// Report produced by the Auditor role after reviewing a plan's execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditReport {
    /// How far execution diverged from the plan.
    pub drift_report: DriftReport,
    /// Anomalies found, empty if the run looked clean.
    pub anomalies: Vec<Anomaly>,
    /// Follow-up actions the auditor suggests, e.g. tightening a tool's risk
    /// class or revisiting a role's call authorization.
    pub recommendations: Vec<String>,
}

impl AuditReport {
    /// Whether any anomaly reaches [`AnomalySeverity::Severe`].
    #[must_use]
    pub fn has_severe_anomaly(&self) -> bool {
        self.anomalies
            .iter()
            .any(|anomaly| anomaly.severity == AnomalySeverity::Severe)
    }
}

/// Report produced by the Memory Writer role summarizing how many records it
/// admitted versus held back for review.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MemoryReport {
    /// Total candidate records considered for persistence.
    pub total: u64,
    /// Records written without reservation.
    pub allowed: u64,
    /// Records held back pending review rather than written outright.
    pub quarantined: u64,
    /// Records dropped entirely.
    pub rejected: u64,
}

/// The full record of a goal's run through the Role Orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrchestratedResult {
    /// Goal this run pursued.
    pub goal_id: GoalId,
    /// Plan generated and executed for the goal.
    pub plan_id: PlanId,
    /// Final status of the plan.
    pub plan_status: PlanStatus,
    /// Pipeline result for each step executed, in execution order.
    pub step_results: Vec<PipelineResult>,
    /// Memory Writer's report, present iff the role ran.
    pub memory: Option<MemoryReport>,
    /// Auditor's report, present iff the role ran.
    pub audit: Option<AuditReport>,
}

impl OrchestratedResult {
    /// Whether every step succeeded and no severe anomaly was found.
    #[must_use]
    pub fn is_clean_success(&self) -> bool {
        matches!(self.plan_status, PlanStatus::Completed)
            && self.step_results.iter().all(PipelineResult::succeeded)
            && !self.audit.as_ref().is_some_and(AuditReport::has_severe_anomaly)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_success_requires_completed_status_and_no_severe_anomalies() {
        let result = OrchestratedResult {
            goal_id: GoalId::new("g1"),
            plan_id: PlanId::new("p1"),
            plan_status: PlanStatus::Completed,
            step_results: Vec::new(),
            memory: None,
            audit: Some(AuditReport {
                drift_report: DriftReport::none(),
                anomalies: vec![Anomaly {
                    severity: AnomalySeverity::Severe,
                    description: "unexpected side effect".to_string(),
                    related_request_id: None,
                }],
                recommendations: Vec::new(),
            }),
        };
        assert!(!result.is_clean_success());
    }

    #[test]
    fn clean_success_with_no_audit_report_passes() {
        let result = OrchestratedResult {
            goal_id: GoalId::new("g1"),
            plan_id: PlanId::new("p1"),
            plan_status: PlanStatus::Completed,
            step_results: Vec::new(),
            memory: None,
            audit: None,
        };
        assert!(result.is_clean_success());
    }
}
