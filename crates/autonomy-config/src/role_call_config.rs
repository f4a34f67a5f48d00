// crates/autonomy-config/src/role_call_config.rs
// ============================================================================
// Module: Role-Call Configuration
// Description: Retry, backoff, and circuit breaker settings for role invocations.
// Purpose: Load the orchestrator's resilience policy and authorization rules from TOML.
// Dependencies: autonomy-orchestrator, serde
// ============================================================================

//! Retry, backoff, and circuit breaker settings for role invocations.

use std::time::Duration;

use autonomy_orchestrator::RoleCallPolicy;
use serde::Deserialize;

use crate::ConfigError;

/// Retry and circuit-breaker settings applied uniformly to every role call.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleCallConfig {
    /// Maximum number of attempts per role call, including the first.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    #[serde(default = "default_backoff_ms")]
    pub backoff_ms: u64,
    /// Per-attempt timeout, in milliseconds. Informational: enforced by the
    /// role implementation, not by [`RoleCallPolicy`] itself.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Consecutive failures before the circuit breaker opens.
    #[serde(default = "default_circuit_breaker_threshold")]
    pub circuit_breaker_threshold: u32,
    /// How long an open breaker stays open before a trial call, in
    /// milliseconds.
    #[serde(default = "default_circuit_breaker_reset_ms")]
    pub circuit_breaker_reset_ms: u64,
}

impl Default for RoleCallConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_ms: default_backoff_ms(),
            timeout_ms: default_timeout_ms(),
            circuit_breaker_threshold: default_circuit_breaker_threshold(),
            circuit_breaker_reset_ms: default_circuit_breaker_reset_ms(),
        }
    }
}

/// Default value for [`RoleCallConfig::max_retries`].
fn default_max_retries() -> u32 {
    3
}

/// Default value for [`RoleCallConfig::backoff_ms`].
fn default_backoff_ms() -> u64 {
    100
}

/// Default value for [`RoleCallConfig::timeout_ms`].
fn default_timeout_ms() -> u64 {
    30_000
}

/// Default value for [`RoleCallConfig::circuit_breaker_threshold`].
fn default_circuit_breaker_threshold() -> u32 {
    5
}

/// Default value for [`RoleCallConfig::circuit_breaker_reset_ms`].
fn default_circuit_breaker_reset_ms() -> u64 {
    30_000
}

impl RoleCallConfig {
    /// Validates that retry and breaker settings are non-degenerate.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if `max_retries` or
    /// `circuit_breaker_threshold` is zero.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_retries == 0 {
            return Err(ConfigError::Invalid("role_call.max_retries must be at least 1".to_string()));
        }
        if self.circuit_breaker_threshold == 0 {
            return Err(ConfigError::Invalid("role_call.circuit_breaker_threshold must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Builds a [`RoleCallPolicy`] from this configuration.
    #[must_use]
    pub fn to_role_call_policy(&self) -> RoleCallPolicy {
        RoleCallPolicy {
            max_attempts: self.max_retries,
            initial_backoff: Duration::from_millis(self.backoff_ms),
            max_backoff: Duration::from_millis(self.backoff_ms.saturating_mul(1 << self.max_retries.min(16))),
            circuit_breaker_threshold: self.circuit_breaker_threshold,
            circuit_breaker_reset_after: Duration::from_millis(self.circuit_breaker_reset_ms),
        }
    }
}

/// Minimum source trust and allowed sources for authorizing role calls.
/// Mirrors the fail-closed evaluation shape: a role call whose source is not
/// in `allowed_sources` (when non-empty) is refused before it runs.
#[derive(Debug, Clone, Deserialize)]
pub struct RoleCallAuthorizationConfig {
    /// Minimum trust level a call source must carry.
    #[serde(default)]
    pub min_source_trust: SourceTrustLevel,
    /// Call sources explicitly allowed to invoke roles. Empty means no
    /// source-based restriction beyond `min_source_trust`.
    #[serde(default)]
    pub allowed_sources: Vec<String>,
}

impl Default for RoleCallAuthorizationConfig {
    fn default() -> Self {
        Self {
            min_source_trust: SourceTrustLevel::Trusted,
            allowed_sources: Vec::new(),
        }
    }
}

impl RoleCallAuthorizationConfig {
    /// Returns whether `source` is authorized to invoke a role under this
    /// configuration.
    #[must_use]
    pub fn authorizes(&self, source: &str) -> bool {
        self.allowed_sources.is_empty() || self.allowed_sources.iter().any(|allowed| allowed == source)
    }
}

/// Minimum trust a role-call source must carry to be authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SourceTrustLevel {
    /// Only fully trusted sources are authorized.
    #[default]
    Trusted,
    /// Degraded sources are authorized in addition to trusted ones.
    Degraded,
}
