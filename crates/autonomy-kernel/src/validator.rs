// crates/autonomy-kernel/src/validator.rs
// ============================================================================
// Module: Schema Validator (C2)
// Description: Validates a proposed call's params against its tool's contract.
// Purpose: Reject malformed calls before they reach the approval gate or execution.
// Dependencies: autonomy-core
// ============================================================================

//! Validates a proposed call's params against its tool's contract.

use autonomy_core::ProposedToolCall;
use autonomy_core::ValidationError;
use autonomy_core::ValidationErrorCode;
use autonomy_core::ValidationResult;

use crate::registry::ToolRegistry;
use crate::registry::ToolRegistryError;

/// Validates proposed calls against the contracts in a [`ToolRegistry`].
pub struct SchemaValidator<'a> {
    registry: &'a ToolRegistry,
}

impl<'a> SchemaValidator<'a> {
    /// Creates a validator bound to `registry`.
    #[must_use]
    pub const fn new(registry: &'a ToolRegistry) -> Self {
        Self { registry }
    }

    /// Validates `call`, resolving its tool contract and checking `params`
    /// against the contract's schema.
    #[must_use]
    pub fn validate(&self, call: &ProposedToolCall) -> ValidationResult {
        let contract = match self.registry.resolve(&call.tool_name) {
            Ok(contract) => contract,
            Err(ToolRegistryError::NotRegistered(name)) => {
                return ValidationResult::from_error(ValidationError::new(
                    ValidationErrorCode::InvalidValue,
                    "tool_name",
                    format!("no tool registered under name {name}"),
                ));
            }
            Err(ToolRegistryError::BlockedByPolicy(name)) => {
                return ValidationResult::from_error(ValidationError::new(
                    ValidationErrorCode::InvalidValue,
                    "tool_name",
                    format!("tool {name} is disabled by policy"),
                ));
            }
            Err(ToolRegistryError::AlreadyRegistered(_)) => unreachable!("resolve never returns AlreadyRegistered"),
        };
        let violations = contract.params_schema.check(&call.params);
        ValidationResult::from_schema_violations(violations)
    }
}

#[cfg(test)]
mod tests {
    use autonomy_core::CallSource;
    use autonomy_core::JsonParamsSchema;
    use autonomy_core::RiskClass;
    use autonomy_core::Timestamp;
    use autonomy_core::ToolContract;
    use time::macros::datetime;

    use super::*;
    use crate::registry::ToolAccessPolicy;

    fn call(tool_name: &str, params: serde_json::Value) -> ProposedToolCall {
        ProposedToolCall {
            request_id: "r1".into(),
            correlation_id: "c1".into(),
            agent_id: "agent-1".into(),
            tool_name: tool_name.into(),
            params,
            source: CallSource::Direct,
            proposed_at: Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC)),
        }
    }

    #[test]
    fn unknown_tool_fails_with_unknown_tool_code() {
        let registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
        let validator = SchemaValidator::new(&registry);
        let result = validator.validate(&call("missing", serde_json::json!({})));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].code, ValidationErrorCode::InvalidValue);
    }

    #[test]
    fn schema_violation_is_reported() {
        let mut registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
        let schema = JsonParamsSchema {
            required: vec!["path".to_string()],
            field_types: std::collections::BTreeMap::new(),
        };
        registry
            .register(
                ToolContract::builder("read_file", RiskClass::Routine)
                    .params_schema(schema)
                    .build(),
            )
            .expect("registration");
        let validator = SchemaValidator::new(&registry);
        let result = validator.validate(&call("read_file", serde_json::json!({})));
        assert!(!result.is_valid);
        assert_eq!(result.errors[0].code, ValidationErrorCode::MissingField);
        assert_eq!(result.errors[0].field, "path");
    }

    #[test]
    fn well_formed_call_passes() {
        let mut registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
        registry
            .register(ToolContract::builder("read_file", RiskClass::Routine).build())
            .expect("registration");
        let validator = SchemaValidator::new(&registry);
        let result = validator.validate(&call("read_file", serde_json::json!({"path": "/tmp/a"})));
        assert!(result.is_valid);
    }

    proptest::proptest! {
        /// Whatever tool name or params shape is thrown at it, the validator
        /// returns rather than panics, and every error it reports carries a
        /// code from the known taxonomy.
        #[test]
        fn validate_never_panics_and_stays_within_the_error_taxonomy(
            tool_name in "[a-zA-Z_]{0,16}",
            field_values in proptest::collection::vec(("[a-z]{1,6}", -1000i64..1000), 0..6),
        ) {
            let mut registry = ToolRegistry::new(ToolAccessPolicy::allow_all());
            registry
                .register(
                    ToolContract::builder("read_file", RiskClass::Routine)
                        .params_schema(JsonParamsSchema {
                            required: vec!["path".to_string()],
                            field_types: std::collections::BTreeMap::new(),
                        })
                        .build(),
                )
                .expect("registration");
            let validator = SchemaValidator::new(&registry);
            let params: serde_json::Map<String, serde_json::Value> =
                field_values.into_iter().map(|(key, value)| (key, serde_json::json!(value))).collect();
            let result = validator.validate(&call(&tool_name, serde_json::Value::Object(params)));
            for error in &result.errors {
                proptest::prop_assert!(matches!(
                    error.code,
                    ValidationErrorCode::MissingField
                        | ValidationErrorCode::TypeMismatch
                        | ValidationErrorCode::OutOfRange
                        | ValidationErrorCode::UnknownField
                        | ValidationErrorCode::InvalidValue
                ));
            }
        }
    }
}
