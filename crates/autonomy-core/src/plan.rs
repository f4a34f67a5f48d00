// crates/autonomy-core/src/plan.rs
// ============================================================================
// Module: Execution Plans
// Description: DAG of tool-call steps produced by the Planner role.
// Purpose: Give the Role Orchestrator (C10) a typed plan with dependency ordering.
// Dependencies: serde
// ============================================================================

//! DAG of tool-call steps produced by the Planner role.

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::GoalId;
use crate::ids::PlanId;
use crate::ids::StepId;
use crate::ids::ToolName;

/// Lifecycle state of a plan step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    /// No step has run yet.
    NotStarted,
    /// At least one step has run; the plan is not yet resolved.
    InProgress,
    /// Every step completed successfully.
    Completed,
    /// A step failed without an available compensation path, halting the
    /// plan.
    Failed,
}

/// A single tool call within an [`ExecutionPlan`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanStep {
    /// Identifier unique within the owning plan.
    pub step_id: StepId,
    /// Tool this step invokes.
    pub tool_name: ToolName,
    /// Arguments for the tool call, may reference prior step outputs via
    /// orchestrator-defined templating conventions.
    pub params: Value,
    /// Steps that must complete successfully before this one may run.
    pub depends_on: Vec<StepId>,
}

/// An ordered, dependency-checked set of steps the orchestrator executes to
/// pursue a [`crate::goal::Goal`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionPlan {
    /// Unique identifier for this plan.
    pub plan_id: PlanId,
    /// Goal this plan pursues.
    pub goal_id: GoalId,
    /// Steps making up the plan.
    pub steps: Vec<PlanStep>,
    /// Current lifecycle state.
    pub status: PlanStatus,
}

/// Errors raised while validating an [`ExecutionPlan`]'s step graph.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PlanError {
    /// Two steps share the same `step_id`.
    #[error("duplicate step id: {0}")]
    DuplicateStepId(String),
    /// A step depends on a `step_id` not present in the plan.
    #[error("step {step} depends on unknown step {depends_on}")]
    UnknownDependency {
        /// Step with the dangling dependency.
        step: String,
        /// The missing dependency's id.
        depends_on: String,
    },
    /// The dependency graph contains a cycle.
    #[error("dependency cycle detected among steps: {0:?}")]
    Cycle(Vec<String>),
}

impl ExecutionPlan {
    /// Creates a new not-started plan without validating its step graph.
    ///
    /// Callers should call [`Self::validate`] before executing the plan.
    #[must_use]
    pub fn new(plan_id: impl Into<PlanId>, goal_id: impl Into<GoalId>, steps: Vec<PlanStep>) -> Self {
        Self {
            plan_id: plan_id.into(),
            goal_id: goal_id.into(),
            steps,
            status: PlanStatus::NotStarted,
        }
    }

    /// Validates that step ids are unique, dependencies resolve, and the
    /// dependency graph is acyclic.
    ///
    /// # Errors
    ///
    /// Returns [`PlanError`] describing the first structural problem found.
    pub fn validate(&self) -> Result<(), PlanError> {
        let mut seen = BTreeSet::new();
        for step in &self.steps {
            if !seen.insert(step.step_id.as_str()) {
                return Err(PlanError::DuplicateStepId(step.step_id.as_str().to_string()));
            }
        }
        for step in &self.steps {
            for dependency in &step.depends_on {
                if !seen.contains(dependency.as_str()) {
                    return Err(PlanError::UnknownDependency {
                        step: step.step_id.as_str().to_string(),
                        depends_on: dependency.as_str().to_string(),
                    });
                }
            }
        }
        self.check_acyclic()
    }

    fn check_acyclic(&self) -> Result<(), PlanError> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            Visiting,
            Done,
        }

        let mut marks: std::collections::BTreeMap<&str, Mark> = std::collections::BTreeMap::new();
        let mut stack = Vec::new();

        fn visit<'a>(
            step_id: &'a str,
            plan: &'a ExecutionPlan,
            marks: &mut std::collections::BTreeMap<&'a str, Mark>,
            stack: &mut Vec<&'a str>,
        ) -> Result<(), PlanError> {
            match marks.get(step_id) {
                Some(Mark::Done) => return Ok(()),
                Some(Mark::Visiting) => {
                    let mut cycle: Vec<String> = stack.iter().map(|id| (*id).to_string()).collect();
                    cycle.push(step_id.to_string());
                    return Err(PlanError::Cycle(cycle));
                }
                None => {}
            }
            marks.insert(step_id, Mark::Visiting);
            stack.push(step_id);
            let Some(step) = plan.steps.iter().find(|step| step.step_id.as_str() == step_id) else {
                stack.pop();
                return Ok(());
            };
            for dependency in &step.depends_on {
                visit(dependency.as_str(), plan, marks, stack)?;
            }
            stack.pop();
            marks.insert(step_id, Mark::Done);
            Ok(())
        }

        for step in &self.steps {
            visit(step.step_id.as_str(), self, &mut marks, &mut stack)?;
        }
        Ok(())
    }
}
