// crates/autonomy-core/src/lib.rs
// ============================================================================
// Crate: autonomy-core
// Description: Shared data model and trait seams for the autonomy kernel and orchestrator.
// Purpose: No component here touches the filesystem, network, or a clock directly;
// everything effectful is a trait implemented elsewhere.
// Dependencies: serde, serde_json, serde_jcs, sha2, thiserror, time
// ============================================================================

//! Data types and interfaces shared by `autonomy-kernel` and
//! `autonomy-orchestrator`. This crate owns no side effects: every
//! filesystem, network, or clock access happens behind a trait defined in
//! [`interfaces`].

pub mod approval;
pub mod call;
pub mod contract;
pub mod event;
pub mod goal;
pub mod hashing;
pub mod ids;
pub mod interfaces;
pub mod orchestrated;
pub mod plan;
pub mod result;
pub mod reward;
pub mod time;
pub mod validation;

pub use approval::ApprovalDecision;
pub use approval::ApprovalRequest;
pub use approval::ApprovalStatus;
pub use call::CallSource;
pub use call::ProposedToolCall;
pub use contract::JsonParamsSchema;
pub use contract::ParamsSchema;
pub use contract::RiskClass;
pub use contract::SchemaViolation;
pub use contract::SchemaViolationKind;
pub use contract::ToolContract;
pub use event::EventType;
pub use event::ExecutionEvent;
pub use goal::Goal;
pub use goal::GoalPriority;
pub use goal::GoalStatus;
pub use hashing::HashAlgorithm;
pub use hashing::HashDigest;
pub use ids::AgentId;
pub use ids::ApprovalId;
pub use ids::CorrelationId;
pub use ids::GoalId;
pub use ids::PlanId;
pub use ids::RequestId;
pub use ids::StepId;
pub use ids::ToolName;
pub use interfaces::ActionError;
pub use interfaces::ActionHandler;
pub use interfaces::Clock;
pub use interfaces::SystemClock;
pub use orchestrated::AnomalySeverity;
pub use orchestrated::Anomaly;
pub use orchestrated::AuditReport;
pub use orchestrated::DriftReport;
pub use orchestrated::MemoryReport;
pub use orchestrated::OrchestratedResult;
pub use plan::ExecutionPlan;
pub use plan::PlanError;
pub use plan::PlanStatus;
pub use plan::PlanStep;
pub use result::ApprovalOutcome;
pub use result::CheckOutcome;
pub use result::CheckSetOutcome;
pub use result::CompensationOutcome;
pub use result::PipelineResult;
pub use result::PipelineStatus;
pub use reward::RewardSignal;
pub use reward::RewardSource;
pub use time::Timestamp;
pub use validation::ValidationError;
pub use validation::ValidationErrorCode;
pub use validation::ValidationResult;
