// crates/autonomy-kernel/src/pipeline.rs
// ============================================================================
// Module: Tool Execution Pipeline (C9)
// Description: Composes C1-C8 and C11 into the validate -> approve -> execute ->
// verify -> check invariants -> compensate -> log sequence for a single call.
// Purpose: The kernel's single entry point for running a proposed tool call.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! Grounded on the control plane's phase-by-phase event-then-transition
//! shape: every phase appends an event before attempting the state
//! transition it implies, so the log always reflects what was attempted
//! even if the transition itself is later found invalid.
//!
//! Two behaviors are pinned here rather than left to interpretation:
//! compensation runs at most once per call, triggered by a critical
//! verification or invariant failure (not twice for each); and
//! `tool:executed` is always appended before `tool:verified`/`tool:failed`,
//! even when the action handler itself returns an error.

use std::sync::Arc;
use std::time::Instant;

use autonomy_core::ActionError;
use autonomy_core::ActionHandler;
use autonomy_core::ApprovalOutcome;
use autonomy_core::Clock;
use autonomy_core::CompensationOutcome;
use autonomy_core::EventType;
use autonomy_core::PipelineResult;
use autonomy_core::PipelineStatus;
use autonomy_core::ProposedToolCall;
use autonomy_core::ValidationResult;
use serde_json::Value;
use tracing::info;
use tracing::warn;

use crate::approval_gate::ApprovalGate;
use crate::checks::CheckRegistry;
use crate::event_store::EventStore;
use crate::fsm::FsmObserver;
use crate::fsm::KernelState;
use crate::fsm::ObservedFsm;
use crate::fsm::Trigger;
use crate::registry::CompensationRegistry;
use crate::registry::ToolRegistry;
use crate::safe_mode::SafeModeController;
use crate::safe_mode::SafeModeStatus;
use crate::validator::SchemaValidator;

/// Errors the pipeline cannot attribute to the call itself: infrastructure
/// failures in the event store or approval gate. Validation and approval
/// *rejections* are not errors — they are reflected in [`PipelineResult`].
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The event store could not record an event.
    #[error("event store error: {0}")]
    EventStore(#[from] crate::event_store::EventStoreError),
    /// The approval gate's internal lock was poisoned.
    #[error("approval gate error: {0}")]
    Approval(#[from] crate::approval_gate::ApprovalGateError),
    /// The internal state machine rejected a transition the pipeline
    /// believed was valid; indicates a bug in the pipeline's phase
    /// ordering.
    #[error("internal state machine error: {0}")]
    Fsm(#[from] crate::fsm::FsmError),
    /// The tool registry could not resolve a contract that schema
    /// validation had just confirmed exists; indicates the registry was
    /// mutated concurrently with this call.
    #[error("tool contract disappeared mid-pipeline: {0}")]
    ToolResolution(#[from] crate::registry::ToolRegistryError),
}

/// Dependencies the pipeline needs to run a single call. Cloned per call
/// from a long-lived set shared across the kernel.
pub struct Pipeline {
    tool_registry: Arc<ToolRegistry>,
    approval_gate: Arc<ApprovalGate>,
    action_handlers: Arc<dyn Fn(&str) -> Option<Arc<dyn ActionHandler>> + Send + Sync>,
    verifier: Arc<CheckRegistry>,
    invariants: Arc<CheckRegistry>,
    compensation: Arc<CompensationRegistry>,
    event_store: Arc<dyn EventStore>,
    clock: Arc<dyn Clock>,
    safe_mode_observers: Vec<Arc<dyn FsmObserver>>,
    safe_mode: Option<Arc<SafeModeController>>,
}

impl Pipeline {
    /// Creates a new pipeline from its component dependencies.
    #[must_use]
    pub fn new(
        tool_registry: Arc<ToolRegistry>,
        approval_gate: Arc<ApprovalGate>,
        action_handlers: Arc<dyn Fn(&str) -> Option<Arc<dyn ActionHandler>> + Send + Sync>,
        verifier: Arc<CheckRegistry>,
        invariants: Arc<CheckRegistry>,
        compensation: Arc<CompensationRegistry>,
        event_store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tool_registry,
            approval_gate,
            action_handlers,
            verifier,
            invariants,
            compensation,
            event_store,
            clock,
            safe_mode_observers: Vec::new(),
            safe_mode: None,
        }
    }

    /// Registers an observer notified of every internal state transition for
    /// every call, e.g. the Safe-Mode Controller (C11).
    pub fn add_fsm_observer(&mut self, observer: Arc<dyn FsmObserver>) {
        self.safe_mode_observers.push(observer);
    }

    /// Registers the Safe-Mode Controller the pipeline consults before
    /// running a call with side effects. Separate from [`Self::add_fsm_observer`]
    /// since the controller is also a read path, not just a transition
    /// observer.
    pub fn set_safe_mode_controller(&mut self, controller: Arc<SafeModeController>) {
        self.safe_mode = Some(controller);
    }

    /// Runs `call` through the full pipeline, blocking on approval if
    /// required.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError`] for infrastructure failures. Validation and
    /// approval rejections are reported in the returned [`PipelineResult`],
    /// not as errors.
    pub fn execute(&self, call: ProposedToolCall) -> Result<PipelineResult, PipelineError> {
        let started = Instant::now();
        let elapsed_ms = || u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        let mut fsm = ObservedFsm::new();
        for observer in &self.safe_mode_observers {
            fsm.add_observer(ArcObserver(Arc::clone(observer)));
        }

        self.event_store.append(
            call.request_id.clone(),
            call.correlation_id.clone(),
            EventType::ToolProposed,
            serde_json::json!({"tool_name": call.tool_name.as_str()}),
            self.clock.now(),
        )?;

        if self.safe_mode_blocks(&call) {
            self.event_store.append(
                call.request_id.clone(),
                call.correlation_id.clone(),
                EventType::ToolRejected,
                serde_json::json!({"reason": "safe_mode_active"}),
                self.clock.now(),
            )?;
            fsm.apply(Trigger::SafeModeRejected)?;
            return Ok(PipelineResult {
                request_id: call.request_id,
                tool_name: call.tool_name,
                status: PipelineStatus::RejectedBySafeMode,
                validation: ValidationResult::valid(),
                approval: None,
                execution_output: None,
                verification: None,
                invariants: None,
                compensation: None,
                duration_ms: elapsed_ms(),
                error: Some("Rejected by safe mode".to_string()),
            });
        }

        let validator = SchemaValidator::new(&self.tool_registry);
        let validation = validator.validate(&call);
        if !validation.is_valid {
            self.event_store.append(
                call.request_id.clone(),
                call.correlation_id.clone(),
                EventType::ToolRejected,
                serde_json::to_value(&validation.errors).unwrap_or(Value::Null),
                self.clock.now(),
            )?;
            fsm.apply(Trigger::ValidationFailed)?;
            return Ok(PipelineResult {
                request_id: call.request_id,
                tool_name: call.tool_name,
                status: PipelineStatus::RejectedByValidation,
                validation,
                approval: None,
                execution_output: None,
                verification: None,
                invariants: None,
                compensation: None,
                duration_ms: elapsed_ms(),
                error: Some("Validation failed".to_string()),
            });
        }
        self.event_store.append(
            call.request_id.clone(),
            call.correlation_id.clone(),
            EventType::ToolValidated,
            Value::Null,
            self.clock.now(),
        )?;
        fsm.apply(Trigger::ValidationPassed)?;

        let contract = self.tool_registry.resolve(&call.tool_name)?;

        let approval = if self.approval_gate.policy().requires_approval(contract.risk_class, &call.source) {
            fsm.apply(Trigger::ApprovalRequired)?;
            self.event_store.append(
                call.request_id.clone(),
                call.correlation_id.clone(),
                EventType::ApprovalRequested,
                Value::Null,
                self.clock.now(),
            )?;
            let approval_id = format!("approval-{}", call.request_id.as_str());
            let request = self
                .approval_gate
                .request_and_wait(approval_id.as_str(), call.request_id.clone(), self.clock.now())?;
            if request.status.permits_execution() {
                fsm.apply(Trigger::ApprovalGranted)?;
                self.event_store.append(
                    call.request_id.clone(),
                    call.correlation_id.clone(),
                    EventType::ApprovalGranted,
                    Value::Null,
                    self.clock.now(),
                )?;
            } else {
                fsm.apply(Trigger::ApprovalDenied)?;
                self.event_store.append(
                    call.request_id.clone(),
                    call.correlation_id.clone(),
                    EventType::ApprovalDenied,
                    serde_json::json!({"status": format!("{:?}", request.status)}),
                    self.clock.now(),
                )?;
                return Ok(PipelineResult {
                    request_id: call.request_id,
                    tool_name: call.tool_name,
                    status: PipelineStatus::RejectedByApproval,
                    validation,
                    approval: Some(ApprovalOutcome {
                        approval_id: request.approval_id,
                        status: request.status,
                    }),
                    execution_output: None,
                    verification: None,
                    invariants: None,
                    compensation: None,
                    duration_ms: elapsed_ms(),
                    error: Some("Approval denied".to_string()),
                });
            }
            Some(ApprovalOutcome {
                approval_id: request.approval_id,
                status: request.status,
            })
        } else {
            fsm.apply(Trigger::ApprovalNotRequired)?;
            None
        };

        self.event_store.append(
            call.request_id.clone(),
            call.correlation_id.clone(),
            EventType::ToolExecuting,
            Value::Null,
            self.clock.now(),
        )?;
        let handler = (self.action_handlers)(call.tool_name.as_str());
        let execution_result = match &handler {
            Some(handler) => handler.execute(&call),
            None => Err(ActionError::Unreachable(format!(
                "no action handler registered for tool {}",
                call.tool_name
            ))),
        };
        let output = match &execution_result {
            Ok(output) => output.clone(),
            Err(err) => serde_json::json!({"error": err.to_string()}),
        };
        // tool:executed is recorded before tool:verified/tool:failed even on
        // execution error, so the log always shows an attempt was made.
        self.event_store.append(
            call.request_id.clone(),
            call.correlation_id.clone(),
            EventType::ToolExecuted,
            output.clone(),
            self.clock.now(),
        )?;
        fsm.apply(Trigger::ExecutionCompleted)?;

        let execution_error_text = execution_result.as_ref().err().map(ToString::to_string);
        let Ok(output) = execution_result else {
            let execution_error = execution_error_text.unwrap_or_default();
            self.event_store.append(
                call.request_id.clone(),
                call.correlation_id.clone(),
                EventType::ToolFailed,
                output,
                self.clock.now(),
            )?;
            fsm.apply(Trigger::ChecksFailedCritically)?;
            let compensation = self.try_compensate(&call, &Value::Null);
            if !compensation.succeeded {
                self.event_store.append(
                    call.request_id.clone(),
                    call.correlation_id.clone(),
                    EventType::CompensationIncidentOpened,
                    serde_json::to_value(&compensation).unwrap_or(Value::Null),
                    self.clock.now(),
                )?;
            }
            fsm.apply(if compensation.succeeded {
                Trigger::CompensationSucceeded
            } else {
                Trigger::CompensationFailed
            })?;
            return Ok(PipelineResult {
                request_id: call.request_id,
                tool_name: call.tool_name,
                status: if compensation.succeeded {
                    PipelineStatus::FailedAndCompensated
                } else {
                    PipelineStatus::FailedUncompensated
                },
                validation,
                approval,
                execution_output: None,
                verification: None,
                invariants: None,
                compensation: Some(compensation),
                duration_ms: elapsed_ms(),
                error: Some(format!("Execution failed: {execution_error}")),
            });
        };

        let verification = self.verifier.evaluate(&call, &output);
        self.event_store.append(
            call.request_id.clone(),
            call.correlation_id.clone(),
            EventType::ToolVerified,
            serde_json::to_value(&verification).unwrap_or(Value::Null),
            self.clock.now(),
        )?;

        let invariants = self.invariants.evaluate(&call, &output);
        self.event_store.append(
            call.request_id.clone(),
            call.correlation_id.clone(),
            EventType::InvariantChecked,
            serde_json::to_value(&invariants).unwrap_or(Value::Null),
            self.clock.now(),
        )?;

        let has_critical_failure = verification.has_critical_failure() || invariants.has_critical_failure();
        if has_critical_failure {
            fsm.apply(Trigger::ChecksFailedCritically)?;
            let compensation = self.try_compensate(&call, &output);
            if !compensation.succeeded {
                self.event_store.append(
                    call.request_id.clone(),
                    call.correlation_id.clone(),
                    EventType::CompensationIncidentOpened,
                    serde_json::to_value(&compensation).unwrap_or(Value::Null),
                    self.clock.now(),
                )?;
            }
            fsm.apply(if compensation.succeeded {
                Trigger::CompensationSucceeded
            } else {
                Trigger::CompensationFailed
            })?;
            Ok(PipelineResult {
                request_id: call.request_id,
                tool_name: call.tool_name,
                status: if compensation.succeeded {
                    PipelineStatus::FailedAndCompensated
                } else {
                    PipelineStatus::FailedUncompensated
                },
                validation,
                approval,
                execution_output: Some(output),
                verification: Some(verification),
                invariants: Some(invariants),
                compensation: Some(compensation),
                duration_ms: elapsed_ms(),
                error: Some("Verification or invariant check failed".to_string()),
            })
        } else {
            fsm.apply(Trigger::ChecksPassed)?;
            info!(request_id = %call.request_id, "pipeline call succeeded");
            self.event_store.append(
                call.request_id.clone(),
                call.correlation_id.clone(),
                EventType::DecisionLogged,
                serde_json::json!({"status": "succeeded"}),
                self.clock.now(),
            )?;
            Ok(PipelineResult {
                request_id: call.request_id,
                tool_name: call.tool_name,
                status: PipelineStatus::Succeeded,
                validation,
                approval,
                execution_output: Some(output),
                verification: Some(verification),
                invariants: Some(invariants),
                compensation: None,
                duration_ms: elapsed_ms(),
                error: None,
            })
        }
    }

    /// Whether safe mode is tripped and `call` targets a tool with side
    /// effects. A tool that fails to resolve is let through to the normal
    /// validation-failure path rather than blocked here.
    fn safe_mode_blocks(&self, call: &ProposedToolCall) -> bool {
        let Some(controller) = &self.safe_mode else {
            return false;
        };
        if controller.status() != SafeModeStatus::Tripped {
            return false;
        }
        self.tool_registry.resolve(&call.tool_name).map(|contract| contract.has_side_effects).unwrap_or(false)
    }

    fn try_compensate(&self, call: &ProposedToolCall, output: &Value) -> CompensationOutcome {
        match self.compensation.resolve(&call.tool_name) {
            Ok(handler) => {
                let outcome = handler.compensate(call, output);
                let result = CompensationOutcome {
                    handler_name: call.tool_name.as_str().to_string(),
                    attempted: true,
                    succeeded: outcome.is_ok(),
                    detail: outcome.err().map(|err| err.to_string()),
                };
                if !result.succeeded {
                    warn!(request_id = %call.request_id, "compensation failed");
                }
                result
            }
            Err(_) => CompensationOutcome {
                handler_name: call.tool_name.as_str().to_string(),
                attempted: false,
                succeeded: false,
                detail: Some(format!("No compensation registered for {}", call.tool_name)),
            },
        }
    }
}

struct ArcObserver(Arc<dyn FsmObserver>);

impl FsmObserver for ArcObserver {
    fn on_transition(&self, from: KernelState, to: KernelState, trigger: Trigger) {
        self.0.on_transition(from, to, trigger);
    }
}
