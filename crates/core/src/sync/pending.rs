// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pending queue for holders awaiting admission
//!
//! Higher priority is admitted first; within a priority band, the
//! earliest enqueue time wins. Keys are unique in the queue.

use chrono::{DateTime, Utc};

/// A request waiting for admission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingItem {
    pub key: String,
    pub priority: i32,
    pub enqueue_time: DateTime<Utc>,
}

/// Ordered set of pending holder keys
#[derive(Debug, Clone, Default)]
pub struct PendingQueue {
    items: Vec<PendingItem>,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Insert a request in admission order.
    ///
    /// Returns false if the key is already queued; the existing entry keeps
    /// its priority and enqueue time.
    pub fn push(&mut self, key: &str, priority: i32, enqueue_time: DateTime<Utc>) -> bool {
        if self.contains(key) {
            return false;
        }
        self.items.push(PendingItem {
            key: key.to_string(),
            priority,
            enqueue_time,
        });
        // Stable sort keeps insertion order for identical (priority, time)
        self.items.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.enqueue_time.cmp(&b.enqueue_time))
        });
        true
    }

    /// Next request in line
    pub fn peek(&self) -> Option<&PendingItem> {
        self.items.first()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.items.iter().any(|i| i.key == key)
    }

    /// Zero-based position of `key` in admission order
    pub fn position(&self, key: &str) -> Option<usize> {
        self.items.iter().position(|i| i.key == key)
    }

    pub fn remove(&mut self, key: &str) -> Option<PendingItem> {
        let idx = self.position(key)?;
        Some(self.items.remove(idx))
    }

    pub fn keys(&self) -> Vec<String> {
        self.items.iter().map(|i| i.key.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[path = "pending_tests.rs"]
mod tests;
