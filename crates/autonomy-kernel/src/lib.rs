// crates/autonomy-kernel/src/lib.rs
// ============================================================================
// Crate: autonomy-kernel
// Description: The single-call Tool Execution Pipeline and its supporting components.
// Purpose: Validate, approve, execute, verify, and compensate one proposed tool call at a time.
// Dependencies: autonomy-core, thiserror, tracing
// ============================================================================

//! Implements components C1 through C9 and C11 of the autonomy kernel: the
//! Tool Registry, Schema Validator, Event Store, Approval Gate, Verifier,
//! Invariant Checker, Compensation Registry, Kernel State Machine, Tool
//! Execution Pipeline, and Safe-Mode Controller. The Role Orchestrator and
//! everything above a single call lives in `autonomy-orchestrator`.

pub mod approval_gate;
pub mod checks;
pub mod event_store;
pub mod fsm;
pub mod pipeline;
pub mod registry;
pub mod safe_mode;
pub mod validator;

pub use approval_gate::ApprovalGate;
pub use approval_gate::ApprovalGateError;
pub use approval_gate::ApprovalPolicy;
pub use checks::Check;
pub use checks::CheckRegistry;
pub use event_store::EventStore;
pub use event_store::EventStoreError;
pub use event_store::InMemoryEventStore;
pub use event_store::SharedEventStore;
pub use fsm::FsmError;
pub use fsm::FsmObserver;
pub use fsm::KernelState;
pub use fsm::ObservedFsm;
pub use fsm::Trigger;
pub use pipeline::Pipeline;
pub use pipeline::PipelineError;
pub use registry::CompensationError;
pub use registry::CompensationHandler;
pub use registry::CompensationRegistry;
pub use registry::CompensationRegistryError;
pub use registry::ToolAccessPolicy;
pub use registry::ToolRegistry;
pub use registry::ToolRegistryError;
pub use safe_mode::SafeModeController;
pub use safe_mode::SafeModeStatus;
pub use validator::SchemaValidator;
