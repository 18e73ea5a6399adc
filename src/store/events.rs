//! Append-only hub event log.
//!
//! Event ids come from a single atomically-incremented counter, the only
//! point of total-order synchronization in the store. Ids start at 1 and
//! are strictly increasing in append order, so they double as a logical
//! clock for "what changed since event N" consumers.
use crate::core::types::HubEvent;
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Append-only log of hub events with stable identifiers
#[derive(Default)]
pub struct EventStore {
    events: DashMap<u64, HubEvent>,
    next_id: AtomicU64,
}

impl EventStore {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event. An unassigned id (0) receives the next sequence
    /// number; an already-assigned id is kept as-is and never reissued.
    pub fn append(&self, mut event: HubEvent) -> HubEvent {
        if event.id == 0 {
            event.id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        }
        self.events.insert(event.id, event.clone());
        event
    }

    /// Point lookup by event id; id 0 is never valid and always misses
    pub fn get_by_id(&self, id: u64) -> Option<HubEvent> {
        if id == 0 {
            return None;
        }
        self.events.get(&id).map(|entry| entry.value().clone())
    }

    /// Number of stored events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
