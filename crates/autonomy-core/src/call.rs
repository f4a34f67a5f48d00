// crates/autonomy-core/src/call.rs
// ============================================================================
// Module: Proposed Tool Calls
// Description: The unit of work flowing into the Tool Execution Pipeline.
// Purpose: Carry a tool invocation request plus its provenance through C1-C9.
// Dependencies: serde
// ============================================================================

//! The unit of work flowing into the Tool Execution Pipeline.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::AgentId;
use crate::ids::CorrelationId;
use crate::ids::RequestId;
use crate::ids::ToolName;
use crate::time::Timestamp;

/// Who or what originated a proposed tool call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CallSource {
    /// Produced by a plan step during orchestrated execution (C10).
    Plan {
        /// Plan the step belongs to.
        plan_id: crate::ids::PlanId,
        /// Step within the plan.
        step_id: crate::ids::StepId,
    },
    /// Submitted directly against the kernel, outside of any plan.
    Direct,
    /// Resubmitted by the Compensation Registry (C7) to undo a prior call.
    Compensation {
        /// Request being compensated.
        original_request_id: RequestId,
    },
}

/// A tool call proposed for execution by an agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposedToolCall {
    /// Unique identifier for this call, assigned by the caller.
    pub request_id: RequestId,
    /// Groups this call with others in the same plan or episode.
    pub correlation_id: CorrelationId,
    /// Agent instance that proposed the call.
    pub agent_id: AgentId,
    /// Name of the tool to invoke; must match a registered [`crate::contract::ToolContract`].
    pub tool_name: ToolName,
    /// Arguments passed to the tool, validated against its params schema.
    pub params: Value,
    /// Where the call originated from.
    pub source: CallSource,
    /// When the call was proposed.
    pub proposed_at: Timestamp,
}

impl ProposedToolCall {
    /// Creates a new direct (non-plan) proposed call.
    #[must_use]
    pub fn direct(
        request_id: impl Into<RequestId>,
        correlation_id: impl Into<CorrelationId>,
        agent_id: impl Into<AgentId>,
        tool_name: impl Into<ToolName>,
        params: Value,
        proposed_at: Timestamp,
    ) -> Self {
        Self {
            request_id: request_id.into(),
            correlation_id: correlation_id.into(),
            agent_id: agent_id.into(),
            tool_name: tool_name.into(),
            params,
            source: CallSource::Direct,
            proposed_at,
        }
    }
}
