// crates/autonomy-core/src/contract.rs
// ============================================================================
// Module: Tool Contracts
// Description: Registrable tool metadata: risk class, parameter schema, side effects.
// Purpose: Give the Tool Registry (C1) and Schema Validator (C2) a typed contract
// to validate proposed calls against.
// Dependencies: serde
// ============================================================================

//! Registrable tool metadata: risk class, parameter schema, side effects.

use std::fmt;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::ids::ToolName;

/// Risk classification of a tool, driving approval and compensation policy.
///
/// Ordered from least to most consequential; `Ord` follows declaration order
/// so `risk_class >= RiskClass::Sensitive` reads naturally at call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskClass {
    /// Read-only or fully reversible effects; no approval required.
    Routine,
    /// Reversible effects with a non-trivial blast radius; approval policy
    /// may require it depending on configuration.
    Sensitive,
    /// Irreversible or high blast-radius effects; approval is always
    /// required regardless of auto-approval policy.
    Critical,
}

impl fmt::Display for RiskClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Routine => "routine",
            Self::Sensitive => "sensitive",
            Self::Critical => "critical",
        };
        f.write_str(label)
    }
}

/// A structural parameter schema a tool's arguments must satisfy.
///
/// Implementations are pluggable so a deployment can swap in a full JSON
/// Schema engine without changing the Tool Registry or Schema Validator.
pub trait ParamsSchema: fmt::Debug + Send + Sync {
    /// Checks `params` against the schema, returning field-level violations.
    fn check(&self, params: &Value) -> Vec<SchemaViolation>;
}

/// Stable classification of a [`SchemaViolation`], mirroring the error
/// taxonomy the Schema Validator (C2) surfaces to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaViolationKind {
    /// A required field is absent from `params`.
    MissingField,
    /// A present field's JSON type does not match the schema.
    TypeMismatch,
    /// A present field's value is outside its permitted range.
    OutOfRange,
    /// A field is present that the schema does not declare.
    UnknownField,
    /// `params` itself is structurally invalid, e.g. not a JSON object.
    InvalidValue,
}

/// A single structural violation of a [`ParamsSchema`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaViolation {
    /// Dot-separated path to the offending field, `"$"` for the root value.
    pub path: String,
    /// Human-readable description of the violation.
    pub message: String,
    /// Stable classification of the violation.
    pub kind: SchemaViolationKind,
}

impl SchemaViolation {
    /// Creates a new violation.
    #[must_use]
    pub fn new(path: impl Into<String>, message: impl Into<String>, kind: SchemaViolationKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }
}

/// A minimal required-fields-and-types schema, usable without any external
/// JSON Schema dependency.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonParamsSchema {
    /// Field names that must be present on the params object.
    pub required: Vec<String>,
    /// Expected JSON type name (`"string"`, `"number"`, `"boolean"`,
    /// `"object"`, `"array"`) for each field that is present.
    pub field_types: std::collections::BTreeMap<String, String>,
}

impl JsonParamsSchema {
    /// Creates an empty schema that accepts any object.
    #[must_use]
    pub fn any_object() -> Self {
        Self {
            required: Vec::new(),
            field_types: std::collections::BTreeMap::new(),
        }
    }

    fn type_name(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }
}

impl ParamsSchema for JsonParamsSchema {
    fn check(&self, params: &Value) -> Vec<SchemaViolation> {
        let mut violations = Vec::new();
        let Some(object) = params.as_object() else {
            violations.push(SchemaViolation::new("$", "params must be a json object", SchemaViolationKind::InvalidValue));
            return violations;
        };
        for field in &self.required {
            if !object.contains_key(field) {
                violations.push(SchemaViolation::new(field, "missing required field", SchemaViolationKind::MissingField));
            }
        }
        for (field, expected_type) in &self.field_types {
            if let Some(value) = object.get(field) {
                let actual = Self::type_name(value);
                if actual != expected_type {
                    violations.push(SchemaViolation::new(
                        field,
                        format!("expected type {expected_type}, found {actual}"),
                        SchemaViolationKind::TypeMismatch,
                    ));
                }
            }
        }
        violations
    }
}

/// A registered tool's static metadata.
#[derive(Debug, Clone)]
pub struct ToolContract {
    /// Unique tool name, used as the registry key.
    pub name: ToolName,
    /// Risk classification driving approval policy.
    pub risk_class: RiskClass,
    /// Parameter schema validated before execution.
    pub params_schema: std::sync::Arc<dyn ParamsSchema>,
    /// Whether executing this tool has side effects requiring compensation
    /// on verification or invariant failure.
    pub has_side_effects: bool,
    /// Free-text tags for operator-facing discovery and filtering.
    pub tags: Vec<String>,
    /// Human-readable description shown in registry listings and audit
    /// reports.
    pub description: String,
}

impl ToolContract {
    /// Creates a new contract builder for `name`.
    #[must_use]
    pub fn builder(name: impl Into<ToolName>, risk_class: RiskClass) -> ToolContractBuilder {
        ToolContractBuilder {
            name: name.into(),
            risk_class,
            params_schema: std::sync::Arc::new(JsonParamsSchema::any_object()),
            has_side_effects: matches!(risk_class, RiskClass::Sensitive | RiskClass::Critical),
            tags: Vec::new(),
            description: String::new(),
        }
    }
}

/// Builder for [`ToolContract`].
#[derive(Debug)]
pub struct ToolContractBuilder {
    name: ToolName,
    risk_class: RiskClass,
    params_schema: std::sync::Arc<dyn ParamsSchema>,
    has_side_effects: bool,
    tags: Vec<String>,
    description: String,
}

impl ToolContractBuilder {
    /// Sets the parameter schema.
    #[must_use]
    pub fn params_schema(mut self, schema: impl ParamsSchema + 'static) -> Self {
        self.params_schema = std::sync::Arc::new(schema);
        self
    }

    /// Overrides the side-effect flag inferred from the risk class.
    #[must_use]
    pub const fn has_side_effects(mut self, has_side_effects: bool) -> Self {
        self.has_side_effects = has_side_effects;
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Sets the description.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Builds the contract.
    #[must_use]
    pub fn build(self) -> ToolContract {
        ToolContract {
            name: self.name,
            risk_class: self.risk_class,
            params_schema: self.params_schema,
            has_side_effects: self.has_side_effects,
            tags: self.tags,
            description: self.description,
        }
    }
}
