// crates/autonomy-config/src/retention_config.rs
// ============================================================================
// Module: Retention Configuration
// Description: Event and audit retention windows, plus the export-before-eviction flag.
// Purpose: Let a deployment bound event store growth without losing audit history silently.
// Dependencies: serde
// ============================================================================

//! Event and audit retention windows, plus the export-before-eviction flag.

use serde::Deserialize;

use crate::ConfigError;

/// Default event retention window: seven days.
const DEFAULT_EVENT_RETENTION_MS: u64 = 7 * 24 * 60 * 60 * 1000;
/// Default audit retention window: ninety days.
const DEFAULT_AUDIT_RETENTION_MS: u64 = 90 * 24 * 60 * 60 * 1000;

/// Retention windows for execution events and audit reports.
#[derive(Debug, Clone, Deserialize)]
pub struct RetentionConfig {
    /// Age, in milliseconds, beyond which an execution event is eligible
    /// for eviction from the event store.
    #[serde(default = "default_event_retention_ms")]
    pub event_retention_ms: u64,
    /// Age, in milliseconds, beyond which an audit report is eligible for
    /// eviction. Not enforced by this workspace's in-memory store, which
    /// holds only execution events; carried for a durable backend to honor.
    #[serde(default = "default_audit_retention_ms")]
    pub audit_retention_ms: u64,
    /// Whether evicted events must be exported before being discarded.
    /// `false` is refused by [`Self::validate`]: silent data loss is never
    /// the default.
    #[serde(default = "default_export_before_eviction")]
    pub export_before_eviction: bool,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            event_retention_ms: default_event_retention_ms(),
            audit_retention_ms: default_audit_retention_ms(),
            export_before_eviction: default_export_before_eviction(),
        }
    }
}

/// Default value for [`RetentionConfig::event_retention_ms`].
fn default_event_retention_ms() -> u64 {
    DEFAULT_EVENT_RETENTION_MS
}

/// Default value for [`RetentionConfig::audit_retention_ms`].
fn default_audit_retention_ms() -> u64 {
    DEFAULT_AUDIT_RETENTION_MS
}

/// Default value for [`RetentionConfig::export_before_eviction`].
const fn default_export_before_eviction() -> bool {
    true
}

impl RetentionConfig {
    /// Validates retention windows and the export-before-eviction posture.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if either window is zero or
    /// `export_before_eviction` is disabled.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.event_retention_ms == 0 {
            return Err(ConfigError::Invalid("retention.event_retention_ms must be positive".to_string()));
        }
        if self.audit_retention_ms == 0 {
            return Err(ConfigError::Invalid("retention.audit_retention_ms must be positive".to_string()));
        }
        if !self.export_before_eviction {
            return Err(ConfigError::Invalid(
                "retention.export_before_eviction must be true; silent eviction is not supported".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate_cleanly() {
        assert!(RetentionConfig::default().validate().is_ok());
    }

    #[test]
    fn disabling_export_before_eviction_is_rejected() {
        let config = RetentionConfig {
            export_before_eviction: false,
            ..RetentionConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_event_retention_is_rejected() {
        let config = RetentionConfig {
            event_retention_ms: 0,
            ..RetentionConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
