// crates/autonomy-config/src/lib.rs
// ============================================================================
// Crate: autonomy-config
// Description: TOML configuration surface for the autonomy kernel workspace.
// Purpose: Load and validate pipeline, role-call, and retention settings.
// Dependencies: autonomy-core, autonomy-kernel, autonomy-orchestrator, serde, toml, thiserror
// ============================================================================

//! Mirrors the `{autoApproveReadOnly?, ...}` configuration surface from the
//! pipeline's spec, plus role-call policy, role-call authorization, and
//! retention sections, each as its own typed, independently validated
//! section under one top-level [`AutonomyConfig`].

pub mod loader;
pub mod pipeline_config;
pub mod retention_config;
pub mod role_call_config;

pub use loader::AutonomyConfig;
pub use loader::ConfigError;
pub use pipeline_config::PipelineConfig;
pub use retention_config::RetentionConfig;
pub use role_call_config::RoleCallAuthorizationConfig;
pub use role_call_config::RoleCallConfig;
pub use role_call_config::SourceTrustLevel;
