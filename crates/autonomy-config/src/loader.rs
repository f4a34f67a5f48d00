// crates/autonomy-config/src/loader.rs
// ============================================================================
// Module: Configuration Loading
// Description: TOML-backed, fail-closed configuration loading for the autonomy kernel.
// Purpose: Load and validate an AutonomyConfig from disk or a default path.
// Dependencies: autonomy-core, serde, toml
// ============================================================================

//! ## Overview
//! Missing or invalid configuration fails closed rather than silently
//! falling back to permissive defaults for the fields that gate approval
//! and retention behavior, following the same posture as the teacher's
//! configuration loader.

use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

use crate::pipeline_config::PipelineConfig;
use crate::retention_config::RetentionConfig;
use crate::role_call_config::RoleCallAuthorizationConfig;
use crate::role_call_config::RoleCallConfig;

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "autonomy.toml";
/// Environment variable used to override the config path.
const CONFIG_ENV_VAR: &str = "AUTONOMY_CONFIG";
/// Maximum configuration file size in bytes.
const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("config io error: {0}")]
    Io(String),
    /// The configuration file was not valid TOML.
    #[error("config parse error: {0}")]
    Parse(String),
    /// The configuration parsed but failed validation.
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration for the autonomy kernel workspace.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AutonomyConfig {
    /// Approval gate and pipeline timeout settings.
    #[serde(default)]
    pub pipeline: PipelineConfig,
    /// Role-call retry and circuit-breaker settings.
    #[serde(default)]
    pub role_call: RoleCallConfig,
    /// Role-call source authorization settings.
    #[serde(default)]
    pub role_call_authorization: RoleCallAuthorizationConfig,
    /// Event and audit retention settings.
    #[serde(default)]
    pub retention: RetentionConfig,
}

impl AutonomyConfig {
    /// Loads configuration from `path`, or from the `AUTONOMY_CONFIG`
    /// environment variable, or from `autonomy.toml` in the current
    /// directory if neither is given.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the file cannot be read, is not valid
    /// TOML, exceeds the size limit, or fails validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path);
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes).map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config: Self = toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section of the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if any section fails validation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline.validate()?;
        self.role_call.validate()?;
        self.retention.validate()?;
        Ok(())
    }
}

/// Resolves the config path from the explicit argument, the environment, or
/// the default filename, in that order.
fn resolve_path(path: Option<&Path>) -> PathBuf {
    if let Some(path) = path {
        return path.to_path_buf();
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        return PathBuf::from(env_path);
    }
    PathBuf::from(DEFAULT_CONFIG_NAME)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn missing_file_fails_closed_with_io_error() {
        let result = AutonomyConfig::load(Some(Path::new("/nonexistent/autonomy.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn empty_toml_loads_with_defaults() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(file, "").expect("write");
        let config = AutonomyConfig::load(Some(file.path())).expect("load");
        assert!(!config.pipeline.auto_approve_read_only);
        assert!(config.retention.export_before_eviction);
    }

    #[test]
    fn invalid_section_fails_validation() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(file, "[retention]\nexport_before_eviction = false\n").expect("write");
        let result = AutonomyConfig::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let mut file = NamedTempFile::new().expect("tempfile");
        writeln!(file, "not valid toml [[[").expect("write");
        let result = AutonomyConfig::load(Some(file.path()));
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }
}
