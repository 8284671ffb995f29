use crate::models::RecentEntry;
use std::collections::VecDeque;

pub const RECENT_CAPACITY: usize = 200;

/// Newest-first window of recently notified items
#[derive(Debug)]
pub struct RecentCache {
    entries: VecDeque<RecentEntry>,
    capacity: usize,
}

impl RecentCache {
    pub fn new() -> Self {
        Self::with_capacity(RECENT_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Put an entry at the front, dropping the oldest past capacity
    pub fn insert(&mut self, entry: RecentEntry) {
        self.entries.push_front(entry);
        self.entries.truncate(self.capacity);
    }

    pub fn lookup(&self, id: &str) -> Option<&RecentEntry> {
        self.entries.iter().find(|entry| entry.item.id == id)
    }

    pub fn newest(&self, limit: usize) -> impl Iterator<Item = &RecentEntry> {
        self.entries.iter().take(limit)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for RecentCache {
    fn default() -> Self {
        Self::new()
    }
}
