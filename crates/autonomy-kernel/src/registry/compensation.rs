// crates/autonomy-kernel/src/registry/compensation.rs
// ============================================================================
// Module: Compensation Registry (C7)
// Description: Registry of per-tool compensating actions, invoked on critical failure.
// Purpose: Undo the side effects of a call whose verification or invariant checks failed.
// Dependencies: autonomy-core
// ============================================================================

//! Registry of per-tool compensating actions, invoked on critical failure.

use std::collections::BTreeMap;

use autonomy_core::ProposedToolCall;
use autonomy_core::ToolName;
use serde_json::Value;

/// Errors raised by a [`CompensationHandler`] while undoing a call.
#[derive(Debug, thiserror::Error)]
pub enum CompensationError {
    /// The handler could not reach whatever backend the tool wraps.
    #[error("compensation handler unreachable: {0}")]
    Unreachable(String),
    /// Compensation ran but could not fully undo the original effect.
    #[error("compensation incomplete: {0}")]
    Incomplete(String),
}

/// Undoes the side effect of a prior, already-executed tool call.
pub trait CompensationHandler: Send + Sync {
    /// Attempts to compensate for `original_call`, which previously executed
    /// and produced `original_output`.
    ///
    /// # Errors
    ///
    /// Returns [`CompensationError`] if compensation cannot be completed.
    fn compensate(&self, original_call: &ProposedToolCall, original_output: &Value) -> Result<(), CompensationError>;
}

/// Errors raised when registering or resolving a compensation handler.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum CompensationRegistryError {
    /// A handler was already registered under this tool name.
    #[error("compensation handler already registered: {0}")]
    AlreadyRegistered(String),
    /// No handler is registered for this tool; the caller must treat the
    /// call as uncompensated.
    #[error("no compensation handler registered: {0}")]
    NotRegistered(String),
}

/// Registry of [`CompensationHandler`]s, keyed by the tool name they undo.
pub struct CompensationRegistry {
    handlers: BTreeMap<String, Box<dyn CompensationHandler>>,
}

impl Default for CompensationRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CompensationRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            handlers: BTreeMap::new(),
        }
    }

    /// Registers a handler for `tool_name`.
    ///
    /// # Errors
    ///
    /// Returns [`CompensationRegistryError::AlreadyRegistered`] if a handler
    /// is already registered for this tool.
    pub fn register(
        &mut self,
        tool_name: &ToolName,
        handler: impl CompensationHandler + 'static,
    ) -> Result<(), CompensationRegistryError> {
        let key = tool_name.as_str().to_string();
        if self.handlers.contains_key(&key) {
            return Err(CompensationRegistryError::AlreadyRegistered(key));
        }
        self.handlers.insert(key, Box::new(handler));
        Ok(())
    }

    /// Resolves the handler registered for `tool_name`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CompensationRegistryError::NotRegistered`] if no handler is
    /// registered; callers should treat this as "compensation unavailable",
    /// not as a pipeline error.
    pub fn resolve(&self, tool_name: &ToolName) -> Result<&dyn CompensationHandler, CompensationRegistryError> {
        self.handlers
            .get(tool_name.as_str())
            .map(std::convert::AsRef::as_ref)
            .ok_or_else(|| CompensationRegistryError::NotRegistered(tool_name.as_str().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use autonomy_core::CallSource;
    use autonomy_core::Timestamp;
    use time::macros::datetime;

    use super::*;

    struct NoopCompensation;

    impl CompensationHandler for NoopCompensation {
        fn compensate(&self, _original_call: &ProposedToolCall, _original_output: &Value) -> Result<(), CompensationError> {
            Ok(())
        }
    }

    fn call() -> ProposedToolCall {
        ProposedToolCall {
            request_id: "r1".into(),
            correlation_id: "c1".into(),
            agent_id: "agent-1".into(),
            tool_name: "delete_file".into(),
            params: Value::Null,
            source: CallSource::Direct,
            proposed_at: Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        }
    }

    #[test]
    fn resolves_registered_handler() {
        let mut registry = CompensationRegistry::new();
        registry
            .register(&ToolName::new("delete_file"), NoopCompensation)
            .expect("registration");
        let handler = registry.resolve(&ToolName::new("delete_file")).expect("resolve");
        assert!(handler.compensate(&call(), &Value::Null).is_ok());
    }

    #[test]
    fn missing_handler_is_not_an_error_caller_can_ignore() {
        let registry = CompensationRegistry::new();
        let err = match registry.resolve(&ToolName::new("delete_file")) {
            Err(err) => err,
            Ok(_) => panic!("expected a resolve error"),
        };
        assert_eq!(
            err,
            CompensationRegistryError::NotRegistered("delete_file".to_string())
        );
    }
}
