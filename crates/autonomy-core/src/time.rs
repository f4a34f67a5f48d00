// crates/autonomy-core/src/time.rs
// ============================================================================
// Module: Autonomy Kernel Timestamps
// Description: RFC 3339 timestamp wrapper used throughout event and result types.
// Purpose: Provide a serializable, comparable timestamp independent of any clock source.
// Dependencies: time, serde
// ============================================================================

//! RFC 3339 timestamp wrapper used throughout event and result types.

use serde::Deserialize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// A point in time, serialized as an RFC 3339 string.
///
/// # Invariants
/// - Two timestamps compare equal iff their underlying instants are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(#[serde(with = "time::serde::rfc3339")] OffsetDateTime);

impl Timestamp {
    /// Wraps an existing `OffsetDateTime`.
    #[must_use]
    pub const fn from_offset_date_time(value: OffsetDateTime) -> Self {
        Self(value)
    }

    /// Returns the wrapped `OffsetDateTime`.
    #[must_use]
    pub const fn as_offset_date_time(&self) -> OffsetDateTime {
        self.0
    }

    /// Formats the timestamp as an RFC 3339 string.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying instant cannot be formatted.
    pub fn to_rfc3339(self) -> Result<String, time::error::Format> {
        self.0.format(&Rfc3339)
    }

    /// Returns the number of whole milliseconds between `self` and `other`.
    #[must_use]
    pub fn duration_ms_since(self, other: Self) -> i64 {
        (self.0 - other.0).whole_milliseconds() as i64
    }
}
