// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore primitive for capacity-bounded admission
//!
//! Holders are admitted up to `limit`. Contended admissions are granted in
//! pending-queue order (priority, then enqueue time). Shrinking the limit
//! never evicts a holder; it only gates future admissions.

use super::lock::{LockKind, Synchronization};
use super::pending::PendingQueue;
use crate::notify::ReleaseNotifyFn;
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;
use std::fmt;

/// Capacity-bounded lock with an ordered pending queue
pub struct Semaphore {
    name: String,
    limit: usize,
    holders: BTreeSet<String>,
    pending: PendingQueue,
    notify: ReleaseNotifyFn,
}

impl Semaphore {
    pub fn new(name: impl Into<String>, limit: usize, notify: ReleaseNotifyFn) -> Self {
        Self {
            name: name.into(),
            limit,
            holders: BTreeSet::new(),
            pending: PendingQueue::new(),
            notify,
        }
    }

    /// Free admission slots; zero while over capacity after a shrink
    pub fn available(&self) -> usize {
        self.limit.saturating_sub(self.holders.len())
    }

    pub fn is_held_by(&self, holder_key: &str) -> bool {
        self.holders.contains(holder_key)
    }

    /// Signal the lock name while free slots remain and work is queued
    fn signal_if_room(&self) {
        if self.available() > 0 && !self.pending.is_empty() {
            (self.notify)(&self.name);
        }
    }

    fn wait_message(&self, holder_key: &str) -> String {
        let holders: Vec<&str> = self.holders.iter().map(String::as_str).collect();
        let mut msg = format!(
            "Waiting for {} lock. Lock status: {}/{}. Current holders: [{}]",
            self.name,
            self.available(),
            self.limit,
            holders.join(", ")
        );
        if let Some(pos) = self.pending.position(holder_key) {
            msg.push_str(&format!(
                ". Queue position: {} of {}",
                pos + 1,
                self.pending.len()
            ));
        }
        msg
    }
}

impl fmt::Debug for Semaphore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Semaphore")
            .field("name", &self.name)
            .field("limit", &self.limit)
            .field("holders", &self.holders)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}

impl Synchronization for Semaphore {
    fn acquire(&mut self, holder_key: &str) -> bool {
        self.pending.remove(holder_key);
        self.holders.insert(holder_key.to_string())
    }

    fn try_acquire(&mut self, holder_key: &str) -> (bool, String) {
        if holder_key.is_empty() {
            return (
                false,
                "bug: attempted to check lock with empty holder key".to_string(),
            );
        }
        if self.is_held_by(holder_key) {
            return (true, String::new());
        }

        // Only the head of the queue may take a free slot
        let is_next = self
            .pending
            .peek()
            .is_none_or(|head| head.key == holder_key);
        if is_next && self.holders.len() < self.limit {
            self.pending.remove(holder_key);
            self.holders.insert(holder_key.to_string());
            tracing::debug!(
                lock = %self.name,
                holder = holder_key,
                available = self.available(),
                "semaphore acquired"
            );
            // Waiters skipped earlier in this pass can use the remaining room
            self.signal_if_room();
            return (true, String::new());
        }

        (false, self.wait_message(holder_key))
    }

    fn release(&mut self, holder_key: &str) -> bool {
        let was_pending = self.pending.remove(holder_key).is_some();
        let was_holder = self.holders.remove(holder_key);
        if was_holder {
            tracing::debug!(
                lock = %self.name,
                holder = holder_key,
                available = self.available(),
                "semaphore released"
            );
            (self.notify)(&self.name);
        }
        was_holder || was_pending
    }

    fn add_to_queue(&mut self, holder_key: &str, priority: i32, enqueue_time: DateTime<Utc>) {
        if self.is_held_by(holder_key) {
            return;
        }
        self.pending.push(holder_key, priority, enqueue_time);
    }

    fn resize(&mut self, limit: usize) -> bool {
        if limit == self.limit {
            return false;
        }
        let grew = limit > self.limit;
        tracing::debug!(lock = %self.name, from = self.limit, to = limit, "semaphore resized");
        self.limit = limit;
        if grew {
            self.signal_if_room();
        }
        true
    }

    fn current_holders(&self) -> Vec<String> {
        self.holders.iter().cloned().collect()
    }

    fn pending(&self) -> Vec<String> {
        self.pending.keys()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn limit(&self) -> usize {
        self.limit
    }

    fn kind(&self) -> LockKind {
        LockKind::Semaphore
    }
}

#[cfg(test)]
#[path = "semaphore_tests.rs"]
mod tests;
