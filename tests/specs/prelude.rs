//! Shared harness for behavioral specs.
//!
//! `Controller` plays the reconciliation loop: it owns a document store of
//! serialized workflows, calls the sync manager once per pass, and writes a
//! document back only when the manager reports a status change.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};
use flowsync_core::{
    release_channel, Admission, ReleaseReceiver, SemaphoreLimits, SyncManager,
    SynchronizationRef, Workflow,
};
use std::collections::BTreeMap;

pub const NAMESPACE: &str = "ns";
pub const CONFIG: &str = "cm";
pub const KEY: &str = "key";
pub const LOCK: &str = "ns/configmap/cm/key";

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000, 0).unwrap() + Duration::seconds(secs)
}

/// Owned copies, for comparing against holder and lock lists
pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

pub fn lock_ref() -> SynchronizationRef {
    SynchronizationRef::semaphore(CONFIG, KEY)
}

pub fn limits(limit: usize) -> SemaphoreLimits {
    SemaphoreLimits::from_toml_str(&format!(
        "[namespaces.{NAMESPACE}.configmaps.{CONFIG}]\n{KEY} = \"{limit}\"\n"
    ))
    .unwrap()
}

pub struct Controller {
    pub manager: SyncManager,
    pub limits: SemaphoreLimits,
    pub released: ReleaseReceiver,
    /// Persisted workflow documents, by name
    pub store: BTreeMap<String, String>,
    pub writes: usize,
}

impl Controller {
    pub fn new(limits: SemaphoreLimits) -> Self {
        let (notify, released) = release_channel();
        Self {
            manager: SyncManager::new(limits.limit_fn(), notify),
            limits,
            released,
            store: BTreeMap::new(),
            writes: 0,
        }
    }

    /// Start a controller against an existing store, as after a restart
    pub fn restart(limits: SemaphoreLimits, store: BTreeMap<String, String>) -> Self {
        let mut controller = Self::new(limits);
        controller.store = store;
        let existing: Vec<Workflow> = controller.store.keys().map(|n| controller.load(n)).collect();
        controller.manager.initialize(&existing);
        controller
    }

    pub fn submit(&mut self, name: &str, priority: i32, created_secs: i64) {
        let wf = Workflow::new(NAMESPACE, name)
            .with_priority(priority)
            .with_creation_timestamp(at(created_secs))
            .with_synchronization(lock_ref());
        self.save(&wf);
    }

    pub fn load(&self, name: &str) -> Workflow {
        serde_json::from_str(&self.store[name]).unwrap()
    }

    fn save(&mut self, wf: &Workflow) {
        self.writes += 1;
        self.store
            .insert(wf.name.clone(), serde_json::to_string(wf).unwrap());
    }

    /// One reconciliation pass for a workflow-level lock
    pub fn reconcile(&mut self, name: &str) -> Admission {
        let mut wf = self.load(name);
        let sync_ref = wf.spec.synchronization.clone();
        let (priority, created) = (wf.priority(), wf.creation_timestamp);
        let admission = self
            .manager
            .try_acquire(&mut wf, "", priority, created, sync_ref.as_ref())
            .unwrap();
        if admission.status_changed {
            self.save(&wf);
        }
        admission
    }

    /// Workflow finished: release its lock
    pub fn complete(&mut self, name: &str) {
        let mut wf = self.load(name);
        let sync_ref = wf.spec.synchronization.clone();
        if self
            .manager
            .release(&mut wf, "", NAMESPACE, sync_ref.as_ref())
        {
            self.save(&wf);
        }
    }

    /// Workflow deleted or terminated: drop everything it holds
    pub fn terminate(&mut self, name: &str) {
        let mut wf = self.load(name);
        self.manager.release_all(&mut wf);
        self.save(&wf);
    }

    pub fn holders(&self) -> Vec<String> {
        self.manager.current_holders(LOCK)
    }

    pub fn drain_released(&mut self) -> Vec<String> {
        let mut out = Vec::new();
        while let Ok(lock) = self.released.try_recv() {
            out.push(lock);
        }
        out
    }
}
