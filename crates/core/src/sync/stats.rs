// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Read-only snapshot of registered locks, for observability

use super::lock::{LockKind, Synchronization};

/// State of one registered lock
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LockStats {
    pub name: String,
    pub kind: LockKind,
    pub limit: usize,
    pub holders: Vec<String>,
    /// Pending keys in admission order
    pub pending: Vec<String>,
}

impl LockStats {
    /// Holders beyond the limit, left over from a shrink
    pub fn over_limit(&self) -> usize {
        self.holders.len().saturating_sub(self.limit)
    }
}

/// Statistics about every registered lock, sorted by name
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SyncStats {
    pub locks: Vec<LockStats>,
}

impl SyncStats {
    pub fn collect<'a>(locks: impl Iterator<Item = &'a dyn Synchronization>) -> Self {
        let mut locks: Vec<LockStats> = locks
            .map(|lock| LockStats {
                name: lock.name().to_string(),
                kind: lock.kind(),
                limit: lock.limit(),
                holders: lock.current_holders(),
                pending: lock.pending(),
            })
            .collect();
        locks.sort_by(|a, b| a.name.cmp(&b.name));
        Self { locks }
    }

    pub fn get(&self, name: &str) -> Option<&LockStats> {
        self.locks.iter().find(|l| l.name == name)
    }

    pub fn total_holders(&self) -> usize {
        self.locks.iter().map(|l| l.holders.len()).sum()
    }

    pub fn total_pending(&self) -> usize {
        self.locks.iter().map(|l| l.pending.len()).sum()
    }
}

#[cfg(test)]
#[path = "stats_tests.rs"]
mod tests;
