//! Per-operation record of already-processed events.

use std::collections::HashSet;

use crate::core::StackEvent;

/// Event ids already processed by one operation.
///
/// An id is marked when it is first fetched, whether or not the event is
/// reported, so no event is ever evaluated twice.
#[derive(Debug, Default)]
pub struct SeenEventSet {
    ids: HashSet<String>,
}

impl SeenEventSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the id has been seen.
    #[must_use]
    pub fn contains(&self, event_id: &str) -> bool {
        self.ids.contains(event_id)
    }

    /// Drops already-seen events and marks the rest as seen.
    ///
    /// Duplicates within `events` are kept once.
    pub fn take_fresh(&mut self, events: Vec<StackEvent>) -> Vec<StackEvent> {
        events
            .into_iter()
            .filter(|event| self.ids.insert(event.event_id.clone()))
            .collect()
    }

    /// Returns the number of seen ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns true if nothing has been seen yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
