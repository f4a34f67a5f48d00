// crates/autonomy-core/src/event.rs
// ============================================================================
// Module: Execution Events
// Description: Append-only, hash-chained event records emitted by the pipeline.
// Purpose: Give the Event Store (C3) a canonical, tamper-evident record type.
// Dependencies: serde, serde_json
// ============================================================================

//! Append-only, hash-chained event records emitted by the pipeline.

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::hashing::HashAlgorithm;
use crate::hashing::HashDigest;
use crate::hashing::canonical_json_bytes;
use crate::hashing::hash_bytes;
use crate::ids::CorrelationId;
use crate::ids::RequestId;
use crate::time::Timestamp;

/// The kind of lifecycle transition an [`ExecutionEvent`] records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A call was proposed to the pipeline.
    ToolProposed,
    /// A call passed schema validation.
    ToolValidated,
    /// A call failed schema validation.
    ToolRejected,
    /// An approval request was created.
    ApprovalRequested,
    /// An approval request was resolved as approved.
    ApprovalGranted,
    /// An approval request was resolved as denied or timed out.
    ApprovalDenied,
    /// The action handler is about to be invoked.
    ToolExecuting,
    /// A tool's action handler ran to completion, successfully or not.
    ToolExecuted,
    /// Post-execution verification passed.
    ToolVerified,
    /// A call failed during execution or verification.
    ToolFailed,
    /// An invariant check ran.
    InvariantChecked,
    /// Compensation ran for a failed call.
    CompensationExecuted,
    /// Compensation did not fully undo a failed call's effects, or no
    /// handler was registered to attempt it.
    CompensationIncidentOpened,
    /// The kernel entered or left safe mode.
    SafeModeTransitioned,
    /// A call reached a terminal, successful outcome.
    DecisionLogged,
}

/// A single entry in the append-only, hash-chained execution log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionEvent {
    /// Monotonically increasing position in the log, starting at 1.
    pub sequence_id: u64,
    /// Call this event pertains to.
    pub request_id: RequestId,
    /// Groups this event with others in the same plan or episode.
    pub correlation_id: CorrelationId,
    /// Kind of transition recorded.
    pub event_type: EventType,
    /// Event-specific data, canonicalized before hashing.
    pub payload: Value,
    /// When the event was recorded.
    pub timestamp: Timestamp,
    /// Hash of the previous event in the chain, or a fixed genesis value for
    /// the first event.
    pub prev_hash: HashDigest,
    /// Hash of this event's content, computed over `sequence_id`,
    /// `request_id`, `event_type`, canonical `payload`, `timestamp`, and
    /// `prev_hash`.
    pub event_hash: HashDigest,
}

/// Digest used as `prev_hash` for the first event appended to an otherwise
/// empty store.
#[must_use]
pub fn genesis_hash(algorithm: HashAlgorithm) -> HashDigest {
    hash_bytes(algorithm, b"autonomy-kernel/genesis")
}

/// Fields hashed to produce an [`ExecutionEvent::event_hash`]. Kept distinct
/// from `ExecutionEvent` itself so the hash input is fixed even if display or
/// auxiliary fields are later added to the event type.
#[derive(Serialize)]
struct EventHashInput<'a> {
    sequence_id: u64,
    request_id: &'a RequestId,
    correlation_id: &'a CorrelationId,
    event_type: EventType,
    payload: &'a Value,
    timestamp: Timestamp,
    prev_hash: &'a HashDigest,
}

/// Errors raised while constructing an [`ExecutionEvent`].
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// The payload could not be canonicalized for hashing.
    #[error("failed to canonicalize event payload: {0}")]
    Canonicalization(#[from] crate::hashing::HashError),
}

/// Builds the next event in the chain given the previous event's hash (or
/// [`genesis_hash`] for the first event).
///
/// # Errors
///
/// Returns [`EventError::Canonicalization`] if the payload cannot be
/// canonicalized.
#[allow(clippy::too_many_arguments)]
pub fn build_event(
    algorithm: HashAlgorithm,
    sequence_id: u64,
    request_id: RequestId,
    correlation_id: CorrelationId,
    event_type: EventType,
    payload: Value,
    timestamp: Timestamp,
    prev_hash: HashDigest,
) -> Result<ExecutionEvent, EventError> {
    let hash_input = EventHashInput {
        sequence_id,
        request_id: &request_id,
        correlation_id: &correlation_id,
        event_type,
        payload: &payload,
        timestamp,
        prev_hash: &prev_hash,
    };
    let bytes = canonical_json_bytes(&hash_input)?;
    let event_hash = hash_bytes(algorithm, &bytes);
    Ok(ExecutionEvent {
        sequence_id,
        request_id,
        correlation_id,
        event_type,
        payload,
        timestamp,
        prev_hash,
        event_hash,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;

    fn ts() -> Timestamp {
        Timestamp::from_offset_date_time(datetime!(2026-01-01 00:00:00 UTC))
    }

    #[test]
    fn same_inputs_produce_same_hash() {
        let genesis = genesis_hash(HashAlgorithm::Sha256);
        let a = build_event(
            HashAlgorithm::Sha256,
            0,
            RequestId::new("r1"),
            CorrelationId::new("c1"),
            EventType::ToolProposed,
            serde_json::json!({"tool": "read_file"}),
            ts(),
            genesis.clone(),
        )
        .expect("build a");
        let b = build_event(
            HashAlgorithm::Sha256,
            0,
            RequestId::new("r1"),
            CorrelationId::new("c1"),
            EventType::ToolProposed,
            serde_json::json!({"tool": "read_file"}),
            ts(),
            genesis,
        )
        .expect("build b");
        assert_eq!(a.event_hash, b.event_hash);
    }

    #[test]
    fn different_sequence_ids_produce_different_hashes() {
        let genesis = genesis_hash(HashAlgorithm::Sha256);
        let a = build_event(
            HashAlgorithm::Sha256,
            0,
            RequestId::new("r1"),
            CorrelationId::new("c1"),
            EventType::ToolProposed,
            serde_json::json!({}),
            ts(),
            genesis.clone(),
        )
        .expect("build a");
        let b = build_event(
            HashAlgorithm::Sha256,
            1,
            RequestId::new("r1"),
            CorrelationId::new("c1"),
            EventType::ToolProposed,
            serde_json::json!({}),
            ts(),
            genesis,
        )
        .expect("build b");
        assert_ne!(a.event_hash, b.event_hash);
    }
}
