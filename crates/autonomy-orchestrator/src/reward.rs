// crates/autonomy-orchestrator/src/reward.rs
// ============================================================================
// Module: Reward Computation (C12)
// Description: Pure functions deriving reward signals from pipeline and plan outcomes.
// Purpose: Turn execution outcomes into scalar feedback without touching any backend.
// Dependencies: autonomy-core
// ============================================================================

//! Pure functions deriving reward signals from pipeline and plan outcomes.

use std::collections::BTreeMap;

use autonomy_core::OrchestratedResult;
use autonomy_core::PipelineResult;
use autonomy_core::RewardSignal;
use autonomy_core::RewardSource;
use autonomy_core::Timestamp;

/// Default target duration used when a caller has no per-tool budget to
/// supply, in milliseconds.
pub const DEFAULT_TARGET_DURATION_MS: u64 = 2000;

/// Reward for a single tool call's pipeline result: a weighted sum of four
/// subscores — whether the call validated, whether post-execution checks
/// raised no critical failure, how efficiently it ran against
/// `target_duration_ms`, and whether it ultimately succeeded.
#[must_use]
pub fn checkpoint_reward(result: &PipelineResult, target_duration_ms: u64, computed_at: Timestamp) -> RewardSignal {
    let validation_score = f64::from(result.validation.is_valid);
    let verification_score = f64::from(result.verification.as_ref().is_some_and(|outcome| !outcome.has_critical_failure()));
    #[allow(clippy::cast_precision_loss)]
    let duration_ratio = result.duration_ms as f64 / target_duration_ms.max(1) as f64;
    let efficiency_score = (1.0 - 0.5 * (duration_ratio - 1.0)).max(0.0);
    let completion_score = f64::from(result.succeeded());

    let breakdown = BTreeMap::from([
        ("validation".to_string(), 0.2 * validation_score),
        ("verification".to_string(), 0.3 * verification_score),
        ("efficiency".to_string(), 0.1 * efficiency_score),
        ("completion".to_string(), 0.4 * completion_score),
    ]);
    let dimensions = vec![
        "validation".to_string(),
        "verification".to_string(),
        "efficiency".to_string(),
        "completion".to_string(),
    ];
    RewardSignal::from_breakdown(breakdown, dimensions, RewardSource::RuleBased, computed_at)
}

/// Reward for a complete goal's orchestrated run: a weighted aggregate of
/// the mean per-step checkpoint reward, a drift penalty, an anomaly-count
/// penalty, and a plan-completion bonus.
#[must_use]
pub fn episode_reward(result: &OrchestratedResult, computed_at: Timestamp) -> RewardSignal {
    #[allow(clippy::cast_precision_loss)]
    let mean_checkpoint = if result.step_results.is_empty() {
        0.0
    } else {
        let total: f64 = result
            .step_results
            .iter()
            .map(|step| checkpoint_reward(step, DEFAULT_TARGET_DURATION_MS, computed_at).total)
            .sum();
        total / result.step_results.len() as f64
    };
    let drift_score = result.audit.as_ref().map_or(0.0, |audit| audit.drift_report.drift_score);
    let drift_penalty = (2.0 * drift_score).min(1.0);
    #[allow(clippy::cast_precision_loss)]
    let anomaly_count = result.audit.as_ref().map_or(0, |audit| audit.anomalies.len()) as f64;
    let anomaly_penalty = (0.25 * anomaly_count).min(1.0);

    let breakdown = BTreeMap::from([
        ("step".to_string(), 0.5 * mean_checkpoint),
        ("drift".to_string(), -0.2 * drift_penalty),
        ("anomaly".to_string(), -0.1 * anomaly_penalty),
        (
            "success".to_string(),
            0.2 * f64::from(matches!(result.plan_status, autonomy_core::PlanStatus::Completed)),
        ),
    ]);
    let dimensions = vec!["step".to_string(), "drift".to_string(), "anomaly".to_string(), "success".to_string()];
    RewardSignal::from_breakdown(breakdown, dimensions, RewardSource::RuleBased, computed_at)
}

#[cfg(test)]
mod tests {
    use autonomy_core::CheckOutcome;
    use autonomy_core::CheckSetOutcome;
    use autonomy_core::PipelineStatus;
    use autonomy_core::RequestId;
    use autonomy_core::ValidationResult;
    use time::macros::datetime;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC))
    }

    fn result(status: PipelineStatus, duration_ms: u64) -> PipelineResult {
        PipelineResult {
            request_id: RequestId::new("r1"),
            tool_name: "noop".into(),
            status,
            validation: ValidationResult::valid(),
            approval: None,
            execution_output: None,
            verification: Some(CheckSetOutcome::new(vec![CheckOutcome {
                name: "post".to_string(),
                passed: matches!(status, PipelineStatus::Succeeded),
                critical: true,
                detail: None,
            }])),
            invariants: None,
            compensation: None,
            duration_ms,
            error: None,
        }
    }

    #[test]
    fn succeeding_quickly_scores_near_the_maximum() {
        let reward = checkpoint_reward(&result(PipelineStatus::Succeeded, DEFAULT_TARGET_DURATION_MS), DEFAULT_TARGET_DURATION_MS, ts());
        assert!((reward.total - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn a_critical_verification_failure_drops_the_verification_and_completion_subscores() {
        let reward = checkpoint_reward(
            &result(PipelineStatus::FailedUncompensated, DEFAULT_TARGET_DURATION_MS),
            DEFAULT_TARGET_DURATION_MS,
            ts(),
        );
        assert!((reward.breakdown["verification"]).abs() < f64::EPSILON);
        assert!((reward.breakdown["completion"]).abs() < f64::EPSILON);
        assert!(reward.total < 1.0);
    }

    #[test]
    fn running_twice_the_target_duration_lowers_the_efficiency_subscore() {
        let on_time = checkpoint_reward(&result(PipelineStatus::Succeeded, DEFAULT_TARGET_DURATION_MS), DEFAULT_TARGET_DURATION_MS, ts());
        let slow = checkpoint_reward(
            &result(PipelineStatus::Succeeded, DEFAULT_TARGET_DURATION_MS * 2),
            DEFAULT_TARGET_DURATION_MS,
            ts(),
        );
        assert!(slow.breakdown["efficiency"] < on_time.breakdown["efficiency"]);
    }

    #[test]
    fn empty_episode_scores_zero() {
        let episode = OrchestratedResult {
            goal_id: "g1".into(),
            plan_id: "p1".into(),
            plan_status: autonomy_core::PlanStatus::Failed,
            step_results: Vec::new(),
            memory: None,
            audit: None,
        };
        assert!((episode_reward(&episode, ts()).total).abs() < f64::EPSILON);
    }

    #[test]
    fn a_completed_plan_earns_the_success_bonus() {
        let episode = OrchestratedResult {
            goal_id: "g1".into(),
            plan_id: "p1".into(),
            plan_status: autonomy_core::PlanStatus::Completed,
            step_results: vec![result(PipelineStatus::Succeeded, DEFAULT_TARGET_DURATION_MS)],
            memory: None,
            audit: None,
        };
        let reward = episode_reward(&episode, ts());
        assert!((reward.breakdown["success"] - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn severe_drift_and_anomalies_pull_the_total_down() {
        let episode = OrchestratedResult {
            goal_id: "g1".into(),
            plan_id: "p1".into(),
            plan_status: autonomy_core::PlanStatus::Completed,
            step_results: vec![result(PipelineStatus::Succeeded, DEFAULT_TARGET_DURATION_MS)],
            memory: None,
            audit: Some(autonomy_core::AuditReport {
                drift_report: autonomy_core::DriftReport {
                    drift_score: 0.8,
                    deviations: vec!["skipped step b".to_string()],
                },
                anomalies: vec![autonomy_core::Anomaly {
                    severity: autonomy_core::AnomalySeverity::Warning,
                    description: "unexpected retry".to_string(),
                    related_request_id: None,
                }],
                recommendations: Vec::new(),
            }),
        };
        let clean = OrchestratedResult {
            goal_id: "g1".into(),
            plan_id: "p1".into(),
            plan_status: autonomy_core::PlanStatus::Completed,
            step_results: vec![result(PipelineStatus::Succeeded, DEFAULT_TARGET_DURATION_MS)],
            memory: None,
            audit: None,
        };
        assert!(episode_reward(&episode, ts()).total < episode_reward(&clean, ts()).total);
    }
}
