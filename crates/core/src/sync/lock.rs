// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock capability shared by every lock primitive
//!
//! The manager only talks to primitives through [`Synchronization`], so a
//! new kind of lock only needs a [`LockKind`] and a constructor.

use chrono::{DateTime, Utc};
use std::fmt;

/// Contract every lock primitive satisfies.
///
/// Holder keys are `namespace/workflow` or `namespace/workflow/node`.
pub trait Synchronization: fmt::Debug + Send {
    /// Admit `holder_key` unconditionally, ignoring capacity and queue order.
    ///
    /// Used only to rebuild previously granted state at startup. Returns
    /// whether the holder set changed.
    fn acquire(&mut self, holder_key: &str) -> bool;

    /// Admit `holder_key` if it already holds the lock, or if there is free
    /// capacity and it is at the head of the pending queue.
    ///
    /// Returns `(granted, wait_message)`. A denied key stays queued.
    fn try_acquire(&mut self, holder_key: &str) -> (bool, String);

    /// Remove `holder_key` from holders and the pending queue. Returns
    /// whether anything changed.
    fn release(&mut self, holder_key: &str) -> bool;

    /// Record a pending request. No-op if already queued or held.
    fn add_to_queue(&mut self, holder_key: &str, priority: i32, enqueue_time: DateTime<Utc>);

    /// Change capacity without evicting holders. Returns whether the
    /// capacity changed.
    fn resize(&mut self, limit: usize) -> bool;

    /// Current holder keys, in sorted order
    fn current_holders(&self) -> Vec<String>;

    /// Pending holder keys, in admission order
    fn pending(&self) -> Vec<String>;

    fn name(&self) -> &str;

    fn limit(&self) -> usize;

    fn kind(&self) -> LockKind;
}

/// Kind of lock primitive a reference resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LockKind {
    Semaphore,
}

impl fmt::Display for LockKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockKind::Semaphore => write!(f, "semaphore"),
        }
    }
}

/// Transition projected onto a workflow's persisted status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockAction {
    Acquired,
    Released,
    Waiting,
}

impl fmt::Display for LockAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockAction::Acquired => write!(f, "acquired"),
            LockAction::Released => write!(f, "released"),
            LockAction::Waiting => write!(f, "waiting"),
        }
    }
}
