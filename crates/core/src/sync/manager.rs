// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Sync manager: admission decisions for workflows and their steps
//!
//! Owns every lock primitive, keyed by lock name. Primitives are created
//! lazily on first reference and live for the life of the process. All
//! operations run under one manager-wide mutex, so no two admission
//! decisions are ever computed at the same time.

use super::keys::{holder_key, resolve_lock, resource_key};
use super::lock::{LockAction, LockKind, Synchronization};
use super::semaphore::Semaphore;
use super::stats::SyncStats;
use super::status::update_concurrency_status;
use crate::config::LimitFn;
use crate::error::{LimitError, SyncError};
use crate::notify::ReleaseNotifyFn;
use crate::workflow::{SynchronizationRef, Workflow};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

type Registry = HashMap<String, Box<dyn Synchronization>>;

/// Outcome of an admission attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub granted: bool,
    /// Whether the workflow status was modified and must be persisted
    pub status_changed: bool,
    /// Why the request is waiting; empty when granted
    pub message: String,
}

impl Admission {
    fn granted(status_changed: bool) -> Self {
        Self {
            granted: true,
            status_changed,
            message: String::new(),
        }
    }

    fn waiting(status_changed: bool, message: String) -> Self {
        Self {
            granted: false,
            status_changed,
            message,
        }
    }
}

/// Serializes admission for every lock this controller knows about
pub struct SyncManager {
    locks: Mutex<Registry>,
    limit_fn: LimitFn,
    notify_fn: ReleaseNotifyFn,
}

impl SyncManager {
    pub fn new(limit_fn: LimitFn, notify_fn: ReleaseNotifyFn) -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
            limit_fn,
            notify_fn,
        }
    }

    /// Rebuild holder sets from the status of workflows that existed before
    /// a restart.
    ///
    /// Locks whose limit can no longer be resolved are skipped with a
    /// warning. Pending order is not rebuilt: waiting work re-queues on its
    /// next admission attempt.
    pub fn initialize(&self, workflows: &[Workflow]) {
        let mut locks = self.lock_registry();

        for wf in workflows {
            let Some(holding) = wf.semaphore_holding() else {
                continue;
            };
            for (lock_name, names) in holding {
                let lock = match self.ensure_lock(&mut locks, LockKind::Semaphore, lock_name) {
                    Ok(lock) => lock,
                    Err(e) => {
                        tracing::warn!(
                            lock = %lock_name,
                            workflow = %wf.name,
                            error = %e,
                            "limit for held lock not found, skipping"
                        );
                        continue;
                    }
                };
                for name in names {
                    let key = resource_key(&wf.namespace, &wf.name, name);
                    if lock.acquire(&key) {
                        tracing::info!(holder = %key, lock = %lock_name, "lock restored");
                    }
                }
            }
        }

        tracing::info!(locks = locks.len(), "sync manager initialized");
    }

    /// Try to admit a workflow (empty `node_name`) or one of its steps.
    ///
    /// With no reference the request is granted without touching status.
    /// Otherwise the request is queued, attempted, and the outcome is
    /// projected onto the workflow status as acquired or waiting.
    pub fn try_acquire(
        &self,
        wf: &mut Workflow,
        node_name: &str,
        priority: i32,
        creation_time: DateTime<Utc>,
        sync_ref: Option<&SynchronizationRef>,
    ) -> Result<Admission, SyncError> {
        let mut locks = self.lock_registry();

        let Some(sync_ref) = sync_ref else {
            return Ok(Admission::granted(false));
        };

        let (kind, lock_name) = resolve_lock(&wf.namespace, sync_ref)?;
        let lock = self
            .ensure_current_lock(&mut locks, kind, &lock_name)
            .map_err(|source| SyncError::Config {
                lock: lock_name.clone(),
                source,
            })?;

        let key = holder_key(wf, node_name);
        lock.add_to_queue(&key, priority, creation_time);
        let (granted, message) = lock.try_acquire(&key);

        if granted {
            let changed = update_concurrency_status(
                wf,
                kind,
                LockAction::Acquired,
                &key,
                &lock_name,
                &[],
            );
            tracing::debug!(holder = %key, lock = %lock_name, changed, "admission granted");
            return Ok(Admission::granted(changed));
        }

        let holders = lock.current_holders();
        let changed =
            update_concurrency_status(wf, kind, LockAction::Waiting, &key, &lock_name, &holders);
        tracing::debug!(holder = %key, lock = %lock_name, %message, "admission waiting");
        Ok(Admission::waiting(changed, message))
    }

    /// Release one holder's lock and drop it from the workflow status.
    ///
    /// The lock name is resolved in `namespace`. A missing reference, an
    /// unusable reference, or a lock that was never registered is a no-op.
    /// Returns whether the workflow status changed.
    pub fn release(
        &self,
        wf: &mut Workflow,
        node_name: &str,
        namespace: &str,
        sync_ref: Option<&SynchronizationRef>,
    ) -> bool {
        let mut locks = self.lock_registry();

        let Some(sync_ref) = sync_ref else {
            return false;
        };
        let (kind, lock_name) = match resolve_lock(namespace, sync_ref) {
            Ok(resolved) => resolved,
            Err(e) => {
                tracing::debug!(workflow = %wf.name, error = %e, "nothing to release");
                return false;
            }
        };
        let Some(lock) = locks.get_mut(&lock_name) else {
            return false;
        };

        let key = holder_key(wf, node_name);
        lock.release(&key);
        tracing::debug!(holder = %key, lock = %lock_name, "lock released");

        let holders = lock.current_holders();
        update_concurrency_status(wf, kind, LockAction::Released, &key, &lock_name, &holders)
    }

    /// Release everything the workflow holds or waits for, then clear its
    /// synchronization status.
    ///
    /// Every registered lock is scanned for keys derived from the workflow,
    /// so holders missing from the status and stale queue entries are
    /// dropped too. Always returns true.
    pub fn release_all(&self, wf: &mut Workflow) -> bool {
        let mut locks = self.lock_registry();

        if wf.status.synchronization.is_none() {
            return true;
        }

        let wf_key = format!("{}/{}", wf.namespace, wf.name);
        let node_prefix = format!("{}/", wf_key);
        let derived = |key: &String| *key == wf_key || key.starts_with(&node_prefix);

        for (lock_name, lock) in locks.iter_mut() {
            let keys: Vec<String> = lock
                .current_holders()
                .into_iter()
                .chain(lock.pending())
                .filter(derived)
                .collect();
            for key in keys {
                if lock.release(&key) {
                    tracing::info!(holder = %key, lock = %lock_name, "released lock");
                }
            }
        }

        wf.status.synchronization = None;
        true
    }

    /// Current holders of a lock; empty if the lock is not registered
    pub fn current_holders(&self, lock_name: &str) -> Vec<String> {
        self.lock_registry()
            .get(lock_name)
            .map(|lock| lock.current_holders())
            .unwrap_or_default()
    }

    /// Point-in-time view of every registered lock
    pub fn stats(&self) -> SyncStats {
        let locks = self.lock_registry();
        SyncStats::collect(locks.values().map(|lock| &**lock as &dyn Synchronization))
    }

    fn lock_registry(&self) -> MutexGuard<'_, Registry> {
        self.locks.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn new_lock(&self, kind: LockKind, name: &str) -> Result<Box<dyn Synchronization>, LimitError> {
        match kind {
            LockKind::Semaphore => {
                let limit = (self.limit_fn)(name)?;
                Ok(Box::new(Semaphore::new(name, limit, self.notify_fn.clone())))
            }
        }
    }

    /// Get a registered lock, creating it if needed
    fn ensure_lock<'a>(
        &self,
        locks: &'a mut Registry,
        kind: LockKind,
        name: &str,
    ) -> Result<&'a mut Box<dyn Synchronization>, LimitError> {
        if !locks.contains_key(name) {
            let lock = self.new_lock(kind, name)?;
            locks.insert(name.to_string(), lock);
        }
        locks
            .get_mut(name)
            .ok_or_else(|| LimitError::UnknownLock {
                lock: name.to_string(),
            })
    }

    /// Like [`Self::ensure_lock`], but an existing lock is first resized to
    /// its configured limit. A failed lookup leaves the limit unchanged.
    fn ensure_current_lock<'a>(
        &self,
        locks: &'a mut Registry,
        kind: LockKind,
        name: &str,
    ) -> Result<&'a mut Box<dyn Synchronization>, LimitError> {
        if let Some(lock) = locks.get_mut(name) {
            let limit = (self.limit_fn)(name).inspect_err(|e| {
                tracing::warn!(lock = name, error = %e, "failed to check lock limit");
            })?;
            if lock.limit() != limit {
                lock.resize(limit);
            }
        }
        self.ensure_lock(locks, kind, name)
    }
}

impl std::fmt::Debug for SyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncManager")
            .field("locks", &*self.lock_registry())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
