// crates/autonomy-kernel/src/checks.rs
// ============================================================================
// Module: Verifier (C5) and Invariant Checker (C6)
// Description: Per-tool post-condition and invariant checks, evaluated with a trace.
// Purpose: Decide whether an executed call's effects and global invariants hold.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! Generalizes `GateEvaluator`'s evaluate-with-trace shape from a tri-state
//! requirement tree down to a flat, severity-tagged checklist: each
//! registered check for a tool either passes or fails, and a failing check
//! marked critical makes the whole set critical. `CheckSetOutcome`
//! (`autonomy-core`) is the trace.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use autonomy_core::CheckOutcome;
use autonomy_core::CheckSetOutcome;
use autonomy_core::ProposedToolCall;
use autonomy_core::ToolName;
use serde_json::Value;

/// Default ceiling on a single check's run time before it is treated as a
/// failed critical check.
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

/// A single post-condition or invariant check registered against a tool.
pub trait Check: Send + Sync {
    /// Stable name surfaced in [`CheckOutcome::name`].
    fn name(&self) -> &str;

    /// Whether a failure of this check is critical, i.e. should trigger
    /// compensation and block the pipeline's success path.
    fn is_critical(&self) -> bool;

    /// Runs the check against a call and its execution output, returning
    /// `Ok(())` on success or an error detail on failure.
    fn run(&self, call: &ProposedToolCall, output: &Value) -> Result<(), String>;
}

/// Registry of checks keyed by the tool they apply to. Shared by the
/// Verifier (post-conditions) and the Invariant Checker (global invariants)
/// — both are "run every registered check for this tool and aggregate".
pub struct CheckRegistry {
    checks: BTreeMap<String, Vec<Arc<dyn Check>>>,
    global: Vec<Arc<dyn Check>>,
    timeout: Duration,
}

impl Default for CheckRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl CheckRegistry {
    /// Creates an empty registry with the default per-check timeout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeout(DEFAULT_CHECK_TIMEOUT)
    }

    /// Creates an empty registry, bounding each check's run to `timeout`.
    #[must_use]
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            checks: BTreeMap::new(),
            global: Vec::new(),
            timeout,
        }
    }

    /// Registers a check scoped to `tool_name`, run only for calls to that
    /// tool.
    pub fn register_for_tool(&mut self, tool_name: &ToolName, check: impl Check + 'static) {
        self.checks.entry(tool_name.as_str().to_string()).or_default().push(Arc::new(check));
    }

    /// Registers a check that runs for every tool, regardless of name.
    pub fn register_global(&mut self, check: impl Check + 'static) {
        self.global.push(Arc::new(check));
    }

    /// Runs every applicable check (global plus tool-scoped) against `call`
    /// and its `output`, returning the aggregated outcome. A check that does
    /// not finish within this registry's timeout is reported as a failed
    /// critical check rather than blocking the pipeline indefinitely.
    #[must_use]
    pub fn evaluate(&self, call: &ProposedToolCall, output: &Value) -> CheckSetOutcome {
        let mut outcomes = Vec::new();
        for check in &self.global {
            outcomes.push(run_with_timeout(Arc::clone(check), call, output, self.timeout));
        }
        if let Some(tool_checks) = self.checks.get(call.tool_name.as_str()) {
            for check in tool_checks {
                outcomes.push(run_with_timeout(Arc::clone(check), call, output, self.timeout));
            }
        }
        CheckSetOutcome::new(outcomes)
    }
}

fn run_with_timeout(check: Arc<dyn Check>, call: &ProposedToolCall, output: &Value, timeout: Duration) -> CheckOutcome {
    let name = check.name().to_string();
    let call = call.clone();
    let output = output.clone();
    let (tx, rx) = mpsc::channel();
    // Detached: if the check never returns, the outcome below is already
    // reported and the thread is abandoned rather than joined.
    thread::spawn(move || {
        let outcome = run_one(check.as_ref(), &call, &output);
        let _ = tx.send(outcome);
    });
    match rx.recv_timeout(timeout) {
        Ok(outcome) => outcome,
        Err(_) => CheckOutcome {
            name,
            passed: false,
            critical: true,
            detail: Some(format!("check did not complete within {timeout:?}")),
        },
    }
}

fn run_one(check: &dyn Check, call: &ProposedToolCall, output: &Value) -> CheckOutcome {
    match check.run(call, output) {
        Ok(()) => CheckOutcome {
            name: check.name().to_string(),
            passed: true,
            critical: check.is_critical(),
            detail: None,
        },
        Err(detail) => CheckOutcome {
            name: check.name().to_string(),
            passed: false,
            critical: check.is_critical(),
            detail: Some(detail),
        },
    }
}

#[cfg(test)]
mod tests {
    use autonomy_core::CallSource;
    use autonomy_core::Timestamp;
    use time::macros::datetime;

    use super::*;

    struct OutputIsObject;

    impl Check for OutputIsObject {
        fn name(&self) -> &str {
            "output_is_object"
        }

        fn is_critical(&self) -> bool {
            true
        }

        fn run(&self, _call: &ProposedToolCall, output: &Value) -> Result<(), String> {
            if output.is_object() {
                Ok(())
            } else {
                Err("output was not a json object".to_string())
            }
        }
    }

    fn call() -> ProposedToolCall {
        ProposedToolCall {
            request_id: "r1".into(),
            correlation_id: "c1".into(),
            agent_id: "agent-1".into(),
            tool_name: "read_file".into(),
            params: Value::Null,
            source: CallSource::Direct,
            proposed_at: Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        }
    }

    #[test]
    fn global_check_runs_regardless_of_tool() {
        let mut registry = CheckRegistry::new();
        registry.register_global(OutputIsObject);
        let outcome = registry.evaluate(&call(), &Value::Null);
        assert!(outcome.has_critical_failure());
    }

    #[test]
    fn tool_scoped_check_only_runs_for_matching_tool() {
        let mut registry = CheckRegistry::new();
        registry.register_for_tool(&ToolName::new("write_file"), OutputIsObject);
        let outcome = registry.evaluate(&call(), &Value::Null);
        assert!(outcome.all_passed());
    }

    #[test]
    fn passing_check_is_not_critical_failure() {
        let mut registry = CheckRegistry::new();
        registry.register_global(OutputIsObject);
        let outcome = registry.evaluate(&call(), &serde_json::json!({}));
        assert!(outcome.all_passed());
        assert!(!outcome.has_critical_failure());
    }

    struct NeverReturns;

    impl Check for NeverReturns {
        fn name(&self) -> &str {
            "never_returns"
        }

        fn is_critical(&self) -> bool {
            false
        }

        fn run(&self, _call: &ProposedToolCall, _output: &Value) -> Result<(), String> {
            thread::sleep(Duration::from_secs(60));
            Ok(())
        }
    }

    #[test]
    fn a_check_exceeding_its_timeout_is_reported_as_a_failed_critical_check() {
        let mut registry = CheckRegistry::with_timeout(Duration::from_millis(20));
        registry.register_global(NeverReturns);
        let outcome = registry.evaluate(&call(), &Value::Null);
        assert!(outcome.has_critical_failure());
    }
}
