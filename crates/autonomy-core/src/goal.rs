// crates/autonomy-core/src/goal.rs
// ============================================================================
// Module: Goals
// Description: Operator- or agent-submitted objectives tracked by the Role Orchestrator.
// Purpose: Anchor a plan's provenance and let the orchestrator report progress per goal.
// Dependencies: serde
// ============================================================================

//! Operator- or agent-submitted objectives tracked by the Role Orchestrator.

use serde::Deserialize;
use serde::Serialize;

use crate::ids::GoalId;
use crate::time::Timestamp;

/// Relative priority of a goal, used by the Role Orchestrator (C10) when
/// multiple goals are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalPriority {
    /// Background work, pursued opportunistically.
    Low,
    /// Default priority.
    Normal,
    /// Pursued ahead of normal-priority goals.
    High,
}

/// Lifecycle state of a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Submitted, no plan has been generated yet.
    Pending,
    /// A plan exists and the orchestrator is executing it.
    Active,
    /// Every associated plan completed successfully.
    Completed,
    /// The goal was abandoned without completion.
    Abandoned,
}

/// An objective the Role Orchestrator plans and executes steps toward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    /// Unique identifier for this goal.
    pub goal_id: GoalId,
    /// Natural-language description of what success looks like.
    pub description: String,
    /// Relative priority among concurrently active goals.
    pub priority: GoalPriority,
    /// Current lifecycle state.
    pub status: GoalStatus,
    /// Goal this one was spawned from, if any.
    pub parent_goal_id: Option<GoalId>,
    /// Conditions the orchestrator checks to decide the goal is satisfied.
    pub success_criteria: Vec<String>,
    /// Who or what submitted this goal (`"user"`, `"system"`, `"llm"`,
    /// `"autonomy"`, `"agent"`, or a deployment-defined source name).
    pub source: String,
    /// Trust assigned to `source`, in `[0, 1]`. Admission requires
    /// agent-sourced goals to meet a minimum threshold.
    pub source_trust: f64,
    /// When the goal was submitted.
    pub created_at: Timestamp,
}

impl Goal {
    /// Creates a new pending goal with no parent and no success criteria.
    #[must_use]
    pub fn new(
        goal_id: impl Into<GoalId>,
        description: impl Into<String>,
        priority: GoalPriority,
        source: impl Into<String>,
        source_trust: f64,
        created_at: Timestamp,
    ) -> Self {
        Self {
            goal_id: goal_id.into(),
            description: description.into(),
            priority,
            status: GoalStatus::Pending,
            parent_goal_id: None,
            success_criteria: Vec::new(),
            source: source.into(),
            source_trust,
            created_at,
        }
    }

    /// Sets the parent goal this one was spawned from.
    #[must_use]
    pub fn with_parent_goal(mut self, parent_goal_id: impl Into<GoalId>) -> Self {
        self.parent_goal_id = Some(parent_goal_id.into());
        self
    }

    /// Sets the success criteria checked to decide the goal is satisfied.
    #[must_use]
    pub fn with_success_criteria(mut self, success_criteria: Vec<String>) -> Self {
        self.success_criteria = success_criteria;
        self
    }

    /// Whether `source_trust` falls within the valid `[0, 1]` range.
    #[must_use]
    pub fn has_valid_source_trust(&self) -> bool {
        (0.0..=1.0).contains(&self.source_trust)
    }
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    #[test]
    fn priority_orders_low_below_high() {
        assert!(GoalPriority::Low < GoalPriority::Normal);
        assert!(GoalPriority::Normal < GoalPriority::High);
    }

    #[test]
    fn new_goal_starts_pending() {
        let goal = Goal::new(
            "g1",
            "keep disk usage under 80%",
            GoalPriority::Normal,
            "user",
            1.0,
            Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        );
        assert_eq!(goal.status, GoalStatus::Pending);
        assert!(goal.parent_goal_id.is_none());
        assert!(goal.success_criteria.is_empty());
    }

    #[test]
    fn source_trust_outside_unit_interval_is_invalid() {
        let goal = Goal::new(
            "g1",
            "keep disk usage under 80%",
            GoalPriority::Normal,
            "agent",
            1.5,
            Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        );
        assert!(!goal.has_valid_source_trust());
    }

    #[test]
    fn with_parent_goal_and_success_criteria_are_applied() {
        let goal = Goal::new(
            "g2",
            "subgoal",
            GoalPriority::Low,
            "system",
            1.0,
            Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        )
        .with_parent_goal("g1")
        .with_success_criteria(vec!["disk usage < 80%".to_string()]);
        assert_eq!(goal.parent_goal_id, Some(GoalId::from("g1")));
        assert_eq!(goal.success_criteria, vec!["disk usage < 80%".to_string()]);
    }
}
