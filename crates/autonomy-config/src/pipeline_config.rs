// crates/autonomy-config/src/pipeline_config.rs
// ============================================================================
// Module: Pipeline Configuration
// Description: Approval and execution timeout settings for the Tool Execution Pipeline.
// Purpose: Load the pipeline's tunables from TOML with validated defaults.
// Dependencies: autonomy-kernel, serde
// ============================================================================

//! Approval and execution timeout settings for the Tool Execution Pipeline.

use std::time::Duration;

use autonomy_core::RiskClass;
use autonomy_kernel::ApprovalPolicy;
use serde::Deserialize;

use crate::ConfigError;

/// Default maximum time to wait for an approval decision.
const DEFAULT_APPROVAL_TIMEOUT_MS: u64 = 300_000;
/// Default maximum time an action handler is given to complete.
const DEFAULT_EXECUTION_TIMEOUT_MS: u64 = 30_000;
/// Upper bound accepted for either timeout, to keep a misconfigured deployment
/// from blocking a pipeline call indefinitely.
const MAX_TIMEOUT_MS: u64 = 3_600_000;

/// Configuration for the approval gate and pipeline execution timeouts.
#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    /// Auto-approve calls against tools with no side effects, regardless of
    /// risk class below `Critical`.
    #[serde(default)]
    pub auto_approve_read_only: bool,
    /// Call sources auto-approved regardless of risk class below `Critical`.
    #[serde(default)]
    pub auto_approve_sources: Vec<String>,
    /// Maximum time to wait for an approval decision, in milliseconds.
    #[serde(default = "default_approval_timeout_ms")]
    pub approval_timeout_ms: u64,
    /// Maximum time an action handler is given to complete, in milliseconds.
    /// Enforced by the caller wiring the `ActionHandler`; the pipeline itself
    /// does not time out a call out from under the handler.
    #[serde(default = "default_execution_timeout_ms")]
    pub default_execution_timeout_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            auto_approve_read_only: false,
            auto_approve_sources: Vec::new(),
            approval_timeout_ms: default_approval_timeout_ms(),
            default_execution_timeout_ms: default_execution_timeout_ms(),
        }
    }
}

/// Default value for [`PipelineConfig::approval_timeout_ms`].
fn default_approval_timeout_ms() -> u64 {
    DEFAULT_APPROVAL_TIMEOUT_MS
}

/// Default value for [`PipelineConfig::default_execution_timeout_ms`].
fn default_execution_timeout_ms() -> u64 {
    DEFAULT_EXECUTION_TIMEOUT_MS
}

impl PipelineConfig {
    /// Validates timeout bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either timeout is zero or exceeds
    /// [`MAX_TIMEOUT_MS`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.approval_timeout_ms == 0 || self.approval_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid("pipeline.approval_timeout_ms out of range".to_string()));
        }
        if self.default_execution_timeout_ms == 0 || self.default_execution_timeout_ms > MAX_TIMEOUT_MS {
            return Err(ConfigError::Invalid("pipeline.default_execution_timeout_ms out of range".to_string()));
        }
        Ok(())
    }

    /// Builds the kernel's [`ApprovalPolicy`] from this configuration.
    #[must_use]
    pub fn to_approval_policy(&self) -> ApprovalPolicy {
        ApprovalPolicy {
            require_at_or_above: RiskClass::Sensitive,
            auto_approve_sensitive: self.auto_approve_read_only,
            auto_approve_sources: self.auto_approve_sources.clone(),
            timeout: Duration::from_millis(self.approval_timeout_ms),
        }
    }
}
