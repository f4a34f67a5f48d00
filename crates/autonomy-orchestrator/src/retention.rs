// crates/autonomy-orchestrator/src/retention.rs
// ============================================================================
// Module: Retention Manager (C13)
// Description: Exports aging execution events before evicting them from the event store.
// Purpose: Bound event store growth without silently discarding audit history.
// Dependencies: autonomy-core, autonomy-kernel
// ============================================================================

//! Exports aging execution events before evicting them from the event store.

use std::collections::BTreeMap;

use autonomy_core::EventType;
use autonomy_core::ExecutionEvent;
use autonomy_core::Timestamp;
use autonomy_kernel::InMemoryEventStore;

/// Errors raised while exporting or evicting events.
#[derive(Debug, thiserror::Error)]
pub enum RetentionError {
    /// The event store could not be read or written.
    #[error("event store error: {0}")]
    EventStore(#[from] autonomy_kernel::EventStoreError),
    /// The exported events could not be serialized.
    #[error("export serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Newline-delimited JSON export of evicted events, grouped by
/// [`EventType`] so a consumer can route each kind to a different archive.
#[derive(Debug, Default)]
pub struct RetentionExport {
    /// Evicted events keyed by their event type's serialized name.
    pub by_kind: BTreeMap<String, Vec<ExecutionEvent>>,
}

impl RetentionExport {
    fn from_events(events: Vec<ExecutionEvent>) -> Self {
        let mut by_kind: BTreeMap<String, Vec<ExecutionEvent>> = BTreeMap::new();
        for event in events {
            let kind = event_type_key(event.event_type);
            by_kind.entry(kind).or_default().push(event);
        }
        Self { by_kind }
    }

    /// Total number of events across every kind.
    #[must_use]
    pub fn total_events(&self) -> usize {
        self.by_kind.values().map(Vec::len).sum()
    }

    /// Serializes one kind's events as newline-delimited JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RetentionError::Serialization`] if an event cannot be
    /// serialized.
    pub fn to_jsonl(&self, kind: &str) -> Result<String, RetentionError> {
        let mut out = String::new();
        if let Some(events) = self.by_kind.get(kind) {
            for event in events {
                out.push_str(&serde_json::to_string(event)?);
                out.push('\n');
            }
        }
        Ok(out)
    }
}

fn event_type_key(event_type: EventType) -> String {
    serde_json::to_value(event_type)
        .ok()
        .and_then(|value| value.as_str().map(str::to_string))
        .unwrap_or_else(|| "unknown".to_string())
}

/// Exports every event older than `cutoff` from `store`, then evicts them.
/// Export happens first so a failure to evict (e.g. a poisoned mutex)
/// cannot lose events that were never archived.
///
/// # Errors
///
/// Returns [`RetentionError`] if reading or evicting fails.
pub fn export_and_evict(store: &InMemoryEventStore, cutoff: Timestamp) -> Result<RetentionExport, RetentionError> {
    let evicted = store.evict_before(cutoff)?;
    Ok(RetentionExport::from_events(evicted))
}
