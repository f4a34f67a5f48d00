// crates/autonomy-core/src/validation.rs
// ============================================================================
// Module: Validation Results
// Description: Outcome type for the Schema Validator (C2).
// Purpose: Distinguish structural validation failures from downstream pipeline errors.
// Dependencies: serde
// ============================================================================

//! Outcome type for the Schema Validator (C2).

use serde::Deserialize;
use serde::Serialize;

use crate::contract::SchemaViolation;
use crate::contract::SchemaViolationKind;

/// A single validation failure, tagged with a stable error code and the
/// field it applies to so callers can branch on failure category without
/// parsing the message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Stable machine-readable error code.
    pub code: ValidationErrorCode,
    /// Dot-separated path to the offending field, `"$"` when the error is
    /// not attributable to a single field.
    pub field: String,
    /// Human-readable detail.
    pub message: String,
}

impl ValidationError {
    /// Creates a new validation error scoped to `field`.
    #[must_use]
    pub fn new(code: ValidationErrorCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Stable taxonomy of reasons a proposed call can fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorCode {
    /// A required field is missing from the call's params.
    MissingField,
    /// A field's JSON type does not match its schema.
    TypeMismatch,
    /// A field's value falls outside its permitted range.
    OutOfRange,
    /// A field is present that the schema does not declare.
    UnknownField,
    /// The call's params, tool, or policy context is invalid in a way the
    /// other codes don't capture (e.g. an unregistered or disabled tool).
    InvalidValue,
}

impl From<SchemaViolationKind> for ValidationErrorCode {
    fn from(kind: SchemaViolationKind) -> Self {
        match kind {
            SchemaViolationKind::MissingField => Self::MissingField,
            SchemaViolationKind::TypeMismatch => Self::TypeMismatch,
            SchemaViolationKind::OutOfRange => Self::OutOfRange,
            SchemaViolationKind::UnknownField => Self::UnknownField,
            SchemaViolationKind::InvalidValue => Self::InvalidValue,
        }
    }
}

/// Outcome of running a [`crate::call::ProposedToolCall`] through the Schema
/// Validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff `errors` is empty.
    pub is_valid: bool,
    /// Validation errors found, empty when `is_valid`.
    pub errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Builds a passing result.
    #[must_use]
    pub const fn valid() -> Self {
        Self {
            is_valid: true,
            errors: Vec::new(),
        }
    }

    /// Builds a failing result from schema violations.
    #[must_use]
    pub fn from_schema_violations(violations: Vec<SchemaViolation>) -> Self {
        let errors = violations
            .into_iter()
            .map(|violation| ValidationError::new(ValidationErrorCode::from(violation.kind), violation.path, violation.message))
            .collect::<Vec<_>>();
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    /// Builds a failing result from a single error.
    #[must_use]
    pub fn from_error(error: ValidationError) -> Self {
        Self {
            is_valid: false,
            errors: vec![error],
        }
    }
}
