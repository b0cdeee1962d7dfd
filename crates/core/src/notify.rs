// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Release notifications
//!
//! Lock primitives call a [`ReleaseNotifyFn`] with the lock name whenever
//! admission room opens up. A scheduler uses it as a wake-up signal to
//! re-evaluate blocked work; delivery is best-effort.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

/// Callback invoked with a lock name when capacity is freed
pub type ReleaseNotifyFn = Arc<dyn Fn(&str) + Send + Sync>;

/// Lock names signalled but not yet received
type Queued = Arc<Mutex<HashSet<String>>>;

fn queued_names(queued: &Queued) -> MutexGuard<'_, HashSet<String>> {
    queued.lock().unwrap_or_else(|e| e.into_inner())
}

/// Receiving half of a [`release_channel`].
///
/// A lock name is delivered at most once until it is received, so an
/// undrained receiver holds at most one entry per distinct lock name.
#[derive(Debug)]
pub struct ReleaseReceiver {
    rx: mpsc::UnboundedReceiver<String>,
    queued: Queued,
}

impl ReleaseReceiver {
    /// Wait for the next signalled lock name; `None` once every sender is gone
    pub async fn recv(&mut self) -> Option<String> {
        let lock = self.rx.recv().await?;
        queued_names(&self.queued).remove(&lock);
        Some(lock)
    }

    pub fn try_recv(&mut self) -> Result<String, TryRecvError> {
        let lock = self.rx.try_recv()?;
        queued_names(&self.queued).remove(&lock);
        Ok(lock)
    }
}

/// Callback that drops every notification
pub fn noop() -> ReleaseNotifyFn {
    Arc::new(|_: &str| {})
}

/// Build a callback that forwards lock names into a channel.
///
/// Repeated signals for a lock name still waiting to be received are merged.
/// Sends after the receiver is dropped are ignored.
pub fn release_channel() -> (ReleaseNotifyFn, ReleaseReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    let queued = Queued::default();
    let pending = Arc::clone(&queued);
    let notify: ReleaseNotifyFn = Arc::new(move |lock: &str| {
        let mut names = queued_names(&pending);
        if !names.insert(lock.to_string()) {
            return;
        }
        if tx.send(lock.to_string()).is_err() {
            names.remove(lock);
            tracing::trace!(lock, "release receiver dropped");
        }
    });
    (notify, ReleaseReceiver { rx, queued })
}

#[cfg(test)]
#[path = "notify_tests.rs"]
mod tests;
