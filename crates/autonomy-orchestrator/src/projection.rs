// crates/autonomy-orchestrator/src/projection.rs
// ============================================================================
// Module: Projection Rebuilder (C14)
// Description: Derives a per-request summary view from the raw event log.
// Purpose: Answer "what happened to this call" without replaying the pipeline.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! A pure fold over [`ExecutionEvent`]s with no hidden state: the same set of
//! events always rebuilds to the same projection regardless of the order they
//! arrive in, since events are sorted by `sequence_id` before folding. This
//! is the property a replay or backfill tool depends on.

use std::collections::BTreeMap;

use autonomy_core::CorrelationId;
use autonomy_core::EventType;
use autonomy_core::ExecutionEvent;
use autonomy_core::RequestId;
use autonomy_core::Timestamp;
use serde::Serialize;

/// Derived summary of everything recorded for one request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestProjection {
    /// Call this projection summarizes.
    pub request_id: RequestId,
    /// Correlation group the call belongs to.
    pub correlation_id: CorrelationId,
    /// Number of events recorded for this request.
    pub event_count: usize,
    /// The most recent event type recorded, in sequence order.
    pub last_event_type: EventType,
    /// Sequence id of the most recent event.
    pub last_sequence_id: u64,
    /// Timestamp of the most recent event.
    pub last_timestamp: Timestamp,
}

impl RequestProjection {
    /// Whether the request reached a terminal outcome (succeeded, was
    /// rejected, or failed) as far as this event set shows.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.last_event_type,
            EventType::ToolVerified | EventType::ToolRejected | EventType::ToolFailed | EventType::CompensationExecuted
        )
    }
}

/// Rebuilds one [`RequestProjection`] per distinct `request_id` found in
/// `events`. Events are sorted by `sequence_id` first, so the result is the
/// same regardless of the order `events` is passed in.
#[must_use]
pub fn rebuild_projections(events: &[ExecutionEvent]) -> BTreeMap<String, RequestProjection> {
    let mut ordered: Vec<&ExecutionEvent> = events.iter().collect();
    ordered.sort_by_key(|event| event.sequence_id);

    let mut projections: BTreeMap<String, RequestProjection> = BTreeMap::new();
    for event in ordered {
        let key = event.request_id.as_str().to_string();
        projections
            .entry(key)
            .and_modify(|projection| {
                projection.event_count += 1;
                projection.last_event_type = event.event_type;
                projection.last_sequence_id = event.sequence_id;
                projection.last_timestamp = event.timestamp;
            })
            .or_insert_with(|| RequestProjection {
                request_id: event.request_id.clone(),
                correlation_id: event.correlation_id.clone(),
                event_count: 1,
                last_event_type: event.event_type,
                last_sequence_id: event.sequence_id,
                last_timestamp: event.timestamp,
            });
    }
    projections
}
