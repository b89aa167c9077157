//! Session history of sent requests
//!
//! Holds the newest exchanges first and drops the oldest once full.

use std::collections::VecDeque;

use crate::constants::MAX_HISTORY;
use crate::models::HistoryEntry;

/// Bounded, most-recent-first log of sent requests
#[derive(Clone, Debug)]
pub struct HistoryLedger {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl HistoryLedger {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        HistoryLedger {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Add entry to history, evicting the oldest when full
    pub fn append(&mut self, entry: HistoryEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    /// Entries, most recent first
    pub fn list(&self) -> Vec<HistoryEntry> {
        self.entries.iter().cloned().collect()
    }

    /// Get history item by index (0 = most recent)
    pub fn get(&self, index: usize) -> Option<&HistoryEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HistoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{HttpMethod, NetworkId};

    fn entry(n: usize) -> HistoryEntry {
        HistoryEntry::new(HttpMethod::GET, format!("/req/{}", n), "{}", NetworkId::Testnet)
    }

    #[test]
    fn test_eleventh_append_evicts_oldest() {
        let mut ledger = HistoryLedger::new();
        for n in 1..=11 {
            ledger.append(entry(n));
        }
        assert_eq!(ledger.len(), 10);
        let list = ledger.list();
        assert_eq!(list[0].path, "/req/11");
        assert_eq!(list[9].path, "/req/2");
        assert!(list.iter().all(|e| e.path != "/req/1"));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut ledger = HistoryLedger::new();
        ledger.append(entry(1));
        ledger.append(entry(1));
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger.get(0).map(|e| &e.path), ledger.get(1).map(|e| &e.path));
        assert!(ledger.get(2).is_none());
    }
}
