// crates/autonomy-kernel/src/registry/tool.rs
// ============================================================================
// Module: Tool Registry (C1)
// Description: Registry of tool contracts with allow/deny access policy.
// Purpose: Resolve a proposed call's tool name to its contract before validation.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! Mirrors the provider-registry shape used elsewhere in this codebase: a
//! `BTreeMap` keyed store with an access policy checked at lookup time, not
//! at registration time, so a tool can be registered once and have its
//! availability toggled per deployment without re-registering.

use std::collections::BTreeMap;
use std::collections::BTreeSet;

use autonomy_core::ToolContract;
use autonomy_core::ToolName;

/// Access policy controlling which registered tools may be invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolAccessPolicy {
    /// Optional allowlist of tool names; when present, only these may run.
    pub allowlist: Option<BTreeSet<String>>,
    /// Explicit denylist of tool names, checked ahead of the allowlist.
    pub denylist: BTreeSet<String>,
}

impl ToolAccessPolicy {
    /// Returns a policy that permits every registered tool.
    #[must_use]
    pub const fn allow_all() -> Self {
        Self {
            allowlist: None,
            denylist: BTreeSet::new(),
        }
    }

    /// Returns true when `tool_name` is permitted by this policy.
    #[must_use]
    pub fn is_allowed(&self, tool_name: &str) -> bool {
        if self.denylist.contains(tool_name) {
            return false;
        }
        match &self.allowlist {
            Some(allowlist) => allowlist.contains(tool_name),
            None => true,
        }
    }
}

impl Default for ToolAccessPolicy {
    fn default() -> Self {
        Self::allow_all()
    }
}

/// Errors raised when registering or resolving a tool.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ToolRegistryError {
    /// A contract was already registered under this name.
    #[error("tool already registered: {0}")]
    AlreadyRegistered(String),
    /// No contract is registered under this name.
    #[error("tool not registered: {0}")]
    NotRegistered(String),
    /// The tool is registered but blocked by the access policy.
    #[error("tool blocked by policy: {0}")]
    BlockedByPolicy(String),
}

/// Registry of tool contracts, keyed by [`ToolName`].
pub struct ToolRegistry {
    contracts: BTreeMap<String, ToolContract>,
    policy: ToolAccessPolicy,
}

impl ToolRegistry {
    /// Creates an empty registry under the given policy.
    #[must_use]
    pub fn new(policy: ToolAccessPolicy) -> Self {
        Self {
            contracts: BTreeMap::new(),
            policy,
        }
    }

    /// Registers a new tool contract.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryError::AlreadyRegistered`] if a contract is
    /// already registered under this name.
    pub fn register(&mut self, contract: ToolContract) -> Result<(), ToolRegistryError> {
        let key = contract.name.as_str().to_string();
        if self.contracts.contains_key(&key) {
            return Err(ToolRegistryError::AlreadyRegistered(key));
        }
        self.contracts.insert(key, contract);
        Ok(())
    }

    /// Resolves a tool name to its contract, enforcing the access policy.
    ///
    /// # Errors
    ///
    /// Returns [`ToolRegistryError::NotRegistered`] or
    /// [`ToolRegistryError::BlockedByPolicy`].
    pub fn resolve(&self, tool_name: &ToolName) -> Result<&ToolContract, ToolRegistryError> {
        let key = tool_name.as_str();
        if !self.policy.is_allowed(key) {
            return Err(ToolRegistryError::BlockedByPolicy(key.to_string()));
        }
        self.contracts
            .get(key)
            .ok_or_else(|| ToolRegistryError::NotRegistered(key.to_string()))
    }

    /// Returns the configured access policy.
    #[must_use]
    pub const fn policy(&self) -> &ToolAccessPolicy {
        &self.policy
    }

    /// Lists every registered tool name, in sorted order.
    #[must_use]
    pub fn tool_names(&self) -> Vec<&str> {
        self.contracts.keys().map(String::as_str).collect()
    }
}

#[cfg(test)]
mod tests {
    use autonomy_core::RiskClass;

    use super::*;

    fn contract(name: &str) -> ToolContract {
        ToolContract::builder(name, RiskClass::Routine).build()
    }

    #[test]
    fn rejects_duplicate_registration() {
        let mut registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
        registry.register(contract("read_file")).expect("first registration");
        let err = registry.register(contract("read_file")).unwrap_err();
        assert_eq!(err, ToolRegistryError::AlreadyRegistered("read_file".to_string()));
    }

    #[test]
    fn resolve_fails_for_unregistered_tool() {
        let registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
        let err = registry.resolve(&ToolName::new("missing")).unwrap_err();
        assert_eq!(err, ToolRegistryError::NotRegistered("missing".to_string()));
    }

    #[test]
    fn policy_blocks_denylisted_tool_even_when_registered() {
        let mut policy = ToolAccessPolicy::allow_all();
        policy.denylist.insert("rm_rf".to_string());
        let mut registry = ToolRegistry::new(policy);
        registry.register(contract("rm_rf")).expect("registration");
        let err = registry.resolve(&ToolName::new("rm_rf")).unwrap_err();
        assert_eq!(err, ToolRegistryError::BlockedByPolicy("rm_rf".to_string()));
    }
}
