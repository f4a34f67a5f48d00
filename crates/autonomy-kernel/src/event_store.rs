// crates/autonomy-kernel/src/event_store.rs
// ============================================================================
// Module: Event Store (C3)
// Description: Append-only, hash-chained execution log with a pluggable backend.
// Purpose: Record every pipeline transition so runs are auditable and replayable.
// Dependencies: autonomy-core
// ============================================================================

//! ## Overview
//! Mirrors the `Arc<Mutex<_>>` in-memory store shape used elsewhere in this
//! codebase. The trait seam ([`EventStore`]) lets a deployment swap in a
//! durable backend without changing the pipeline; the in-memory
//! implementation here is the only one this crate ships, matching spec
//! §6's non-goal of bundling a specific persistence engine.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use autonomy_core::CorrelationId;
use autonomy_core::EventType;
use autonomy_core::ExecutionEvent;
use autonomy_core::HashAlgorithm;
use autonomy_core::RequestId;
use autonomy_core::Timestamp;
use autonomy_core::event::build_event;
use autonomy_core::event::genesis_hash;
use serde_json::Value;

/// Errors raised by an [`EventStore`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum EventStoreError {
    /// The backing storage is unavailable (e.g. a poisoned mutex).
    #[error("event store unavailable: {0}")]
    Unavailable(String),
    /// The event payload could not be canonicalized for hashing.
    #[error("failed to build event: {0}")]
    Build(#[from] autonomy_core::event::EventError),
}

/// Appends events to and reads back an append-only, hash-chained log.
pub trait EventStore: Send + Sync {
    /// Appends a new event, assigning it the next sequence id and chaining
    /// it to the current head hash.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError`] if the event cannot be built or appended.
    fn append(
        &self,
        request_id: RequestId,
        correlation_id: CorrelationId,
        event_type: EventType,
        payload: Value,
        timestamp: Timestamp,
    ) -> Result<ExecutionEvent, EventStoreError>;

    /// Returns every event recorded so far, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Unavailable`] if the store cannot be read.
    fn all_events(&self) -> Result<Vec<ExecutionEvent>, EventStoreError>;

    /// Returns every event recorded for `request_id`, in append order.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Unavailable`] if the store cannot be read.
    fn events_for(&self, request_id: &RequestId) -> Result<Vec<ExecutionEvent>, EventStoreError> {
        Ok(self
            .all_events()?
            .into_iter()
            .filter(|event| &event.request_id == request_id)
            .collect())
    }

    /// Verifies that the full chain is internally consistent: sequence ids
    /// are contiguous from one and each event's `prev_hash` matches the
    /// previous event's `event_hash`.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Unavailable`] if the store cannot be read.
    fn verify_chain(&self) -> Result<bool, EventStoreError> {
        let events = self.all_events()?;
        let mut expected_prev = genesis_hash(HashAlgorithm::Sha256);
        for (index, event) in events.iter().enumerate() {
            if event.sequence_id != index as u64 + 1 || event.prev_hash != expected_prev {
                return Ok(false);
            }
            expected_prev = event.event_hash.clone();
        }
        Ok(true)
    }
}

/// In-memory, hash-chained event store.
#[derive(Clone)]
pub struct InMemoryEventStore {
    events: Arc<Mutex<Vec<ExecutionEvent>>>,
    algorithm: HashAlgorithm,
}

impl Default for InMemoryEventStore {
    fn default() -> Self {
        Self::new(HashAlgorithm::Sha256)
    }
}

impl InMemoryEventStore {
    /// Creates an empty store using `algorithm` for hashing.
    #[must_use]
    pub fn new(algorithm: HashAlgorithm) -> Self {
        Self {
            events: Arc::new(Mutex::new(Vec::new())),
            algorithm,
        }
    }

    /// Evicts every event older than `cutoff`, returning the evicted events
    /// so a caller (the Retention Manager, C13) can export them first.
    ///
    /// Evicting truncates the chain's prefix; `verify_chain` after eviction
    /// checks only the retained suffix, since the genesis invariant no
    /// longer applies once the true first event is gone.
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Unavailable`] if the mutex is poisoned.
    pub fn evict_before(&self, cutoff: Timestamp) -> Result<Vec<ExecutionEvent>, EventStoreError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| EventStoreError::Unavailable("event store mutex poisoned".to_string()))?;
        let split_at = guard.partition_point(|event| event.timestamp < cutoff);
        let evicted = guard.drain(0..split_at).collect();
        Ok(evicted)
    }

    /// Discards every event and resets sequencing, so the next appended
    /// event starts a fresh chain from [`genesis_hash`].
    ///
    /// # Errors
    ///
    /// Returns [`EventStoreError::Unavailable`] if the mutex is poisoned.
    pub fn clear(&self) -> Result<(), EventStoreError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| EventStoreError::Unavailable("event store mutex poisoned".to_string()))?;
        guard.clear();
        Ok(())
    }
}

impl EventStore for InMemoryEventStore {
    fn append(
        &self,
        request_id: RequestId,
        correlation_id: CorrelationId,
        event_type: EventType,
        payload: Value,
        timestamp: Timestamp,
    ) -> Result<ExecutionEvent, EventStoreError> {
        let mut guard = self
            .events
            .lock()
            .map_err(|_| EventStoreError::Unavailable("event store mutex poisoned".to_string()))?;
        let sequence_id = guard.len() as u64 + 1;
        let prev_hash = guard
            .last()
            .map_or_else(|| genesis_hash(self.algorithm), |event| event.event_hash.clone());
        let event = build_event(
            self.algorithm,
            sequence_id,
            request_id,
            correlation_id,
            event_type,
            payload,
            timestamp,
            prev_hash,
        )?;
        guard.push(event.clone());
        Ok(event)
    }

    fn all_events(&self) -> Result<Vec<ExecutionEvent>, EventStoreError> {
        let guard = self
            .events
            .lock()
            .map_err(|_| EventStoreError::Unavailable("event store mutex poisoned".to_string()))?;
        Ok(guard.clone())
    }
}

/// Shared event store backed by an `Arc` trait object, for passing a single
/// store instance between the pipeline, orchestrator, and CLI.
#[derive(Clone)]
pub struct SharedEventStore {
    inner: Arc<dyn EventStore>,
}

impl SharedEventStore {
    /// Wraps a concrete store in a shared, clonable handle.
    #[must_use]
    pub fn from_store(store: impl EventStore + 'static) -> Self {
        Self {
            inner: Arc::new(store),
        }
    }
}

impl EventStore for SharedEventStore {
    fn append(
        &self,
        request_id: RequestId,
        correlation_id: CorrelationId,
        event_type: EventType,
        payload: Value,
        timestamp: Timestamp,
    ) -> Result<ExecutionEvent, EventStoreError> {
        self.inner.append(request_id, correlation_id, event_type, payload, timestamp)
    }

    fn all_events(&self) -> Result<Vec<ExecutionEvent>, EventStoreError> {
        self.inner.all_events()
    }
}

/// Groups an event store's events by `request_id`, preserving append order
/// within each group. Used by audit tooling and the Projection Rebuilder.
#[must_use]
pub fn group_by_request(events: &[ExecutionEvent]) -> BTreeMap<String, Vec<ExecutionEvent>> {
    let mut grouped: BTreeMap<String, Vec<ExecutionEvent>> = BTreeMap::new();
    for event in events {
        grouped
            .entry(event.request_id.as_str().to_string())
            .or_default()
            .push(event.clone());
    }
    grouped
}
