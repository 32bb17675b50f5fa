// src/events/log.rs
// =============================================================================
// The process-wide progress log.
//
// Every crawl appends short human-readable notices here ("crawled X",
// "failed to fetch Y"). Subscribers read it through their own cursors, so the
// log itself never tracks who has read what.
//
// Properties:
// - append is the only mutation; entries never change once written
// - indices are absolute and strictly increasing (index = append order)
// - unbounded by default; with a capacity it keeps only the newest entries
//   but indices stay absolute, so get() on an evicted index returns None
// =============================================================================

use parking_lot::RwLock;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::Arc;

/// One progress message and its position in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub index: usize,
    pub message: String,
}

#[derive(Debug, Default)]
struct LogState {
    entries: VecDeque<String>,
    // Absolute index of entries[0]
    first_index: usize,
    capacity: Option<usize>,
}

/// Shared handle to the append-only event log. Clones point at the same log.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    state: Arc<RwLock<LogState>>,
}

impl EventLog {
    /// Creates an unbounded log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log that retains at most `capacity` entries (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            state: Arc::new(RwLock::new(LogState {
                entries: VecDeque::with_capacity(capacity),
                first_index: 0,
                capacity: Some(capacity),
            })),
        }
    }

    /// Appends a message and returns its index.
    pub fn append(&self, message: impl Into<String>) -> usize {
        let mut state = self.state.write();
        state.entries.push_back(message.into());

        if let Some(capacity) = state.capacity {
            while state.entries.len() > capacity {
                state.entries.pop_front();
                state.first_index += 1;
            }
        }

        state.first_index + state.entries.len() - 1
    }

    /// Total number of events ever appended (the next index to be assigned).
    pub fn len(&self) -> usize {
        let state = self.state.read();
        state.first_index + state.entries.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Index of the oldest entry still retained.
    pub fn first_index(&self) -> usize {
        self.state.read().first_index
    }

    /// Returns the event at `index`, or None if it was evicted or not yet written.
    pub fn get(&self, index: usize) -> Option<Event> {
        let state = self.state.read();
        let offset = index.checked_sub(state.first_index)?;
        state.entries.get(offset).map(|message| Event {
            index,
            message: message.clone(),
        })
    }
}
