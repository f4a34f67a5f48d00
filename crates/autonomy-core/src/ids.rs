// crates/autonomy-core/src/ids.rs
// ============================================================================
// Module: Autonomy Kernel Identifiers
// Description: Canonical opaque identifiers shared across the kernel and orchestrator.
// Purpose: Provide strongly typed, serializable IDs with stable string forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque string wrappers. Validation (format, uniqueness) is
//! handled at the boundary that creates them — the registry, the pipeline, or
//! the orchestrator — rather than within these newtypes.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

macro_rules! string_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            #[doc = "Creates a new identifier from any string-like value."]
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            #[doc = "Returns the identifier as a string slice."]
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self::new(value)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::new(value)
            }
        }
    };
}

string_id!(RequestId, "Unique identifier for a proposed tool call.");
string_id!(CorrelationId, "Identifier linking related tool calls across a plan or episode.");
string_id!(ToolName, "Unique identifier for a registered tool contract.");
string_id!(ApprovalId, "Unique identifier for an approval request.");
string_id!(AgentId, "Identifier for the agent instance a kernel is scoped to.");
string_id!(GoalId, "Unique identifier for a goal owned by the goal manager.");
string_id!(PlanId, "Unique identifier for an execution plan.");
string_id!(StepId, "Identifier for a step within an execution plan, unique within that plan.");
