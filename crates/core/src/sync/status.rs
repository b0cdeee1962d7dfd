// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Projection of admission outcomes onto a workflow's persisted status
//!
//! Every function reports whether the document changed, so the caller
//! knows whether the workflow must be persisted again.

use super::keys::short_name;
use super::lock::{LockAction, LockKind};
use crate::workflow::{SemaphoreStatus, Workflow};

/// Apply `action` for (`holder_key`, `lock_name`) to the workflow status.
///
/// - `Waiting` overwrites the lock's holder snapshot with `current_holders`
/// - `Acquired` records the holder's short name once and drops the lock's
///   waiting snapshot
/// - `Released` removes the short name (and the lock entry once empty) and
///   drops the lock's waiting snapshot
///
/// Empty sections are pruned so an absent record means "not participating".
pub fn update_concurrency_status(
    wf: &mut Workflow,
    kind: LockKind,
    action: LockAction,
    holder_key: &str,
    lock_name: &str,
    current_holders: &[String],
) -> bool {
    let sync = wf.status.synchronization.get_or_insert_with(Default::default);
    let changed = match kind {
        LockKind::Semaphore => {
            let status = sync.semaphore.get_or_insert_with(Default::default);
            let changed = apply(status, action, holder_key, lock_name, current_holders);
            if status.is_empty() {
                sync.semaphore = None;
            }
            changed
        }
    };
    if sync.semaphore.is_none() {
        wf.status.synchronization = None;
    }
    changed
}

fn apply(
    status: &mut SemaphoreStatus,
    action: LockAction,
    holder_key: &str,
    lock_name: &str,
    current_holders: &[String],
) -> bool {
    let name = short_name(holder_key);
    match action {
        LockAction::Waiting => {
            let snapshot = current_holders
                .iter()
                .map(|h| short_name(h).to_string())
                .collect();
            status.waiting.insert(lock_name.to_string(), snapshot);
            true
        }
        LockAction::Acquired => {
            let holding = status.holding.entry(lock_name.to_string()).or_default();
            let appended = if holding.iter().any(|h| h == name) {
                false
            } else {
                holding.push(name.to_string());
                true
            };
            let cleared = status.waiting.remove(lock_name).is_some();
            appended || cleared
        }
        LockAction::Released => {
            if let Some(holding) = status.holding.get_mut(lock_name) {
                holding.retain(|h| h != name);
                if holding.is_empty() {
                    status.holding.remove(lock_name);
                }
            }
            status.waiting.remove(lock_name);
            tracing::debug!(holder = holder_key, lock = lock_name, "removed from status");
            true
        }
    }
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
