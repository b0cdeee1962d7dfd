// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workflow document model
//!
//! Only the parts of a workflow document the admission layer reads or
//! writes are modeled here: identity, the lock reference, and the
//! persisted synchronization status. The status is the only admission
//! state that survives a controller restart.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A workflow document owned by the controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub name: String,
    pub namespace: String,
    pub creation_timestamp: DateTime<Utc>,
    #[serde(default)]
    pub spec: WorkflowSpec,
    #[serde(default)]
    pub status: WorkflowStatus,
}

impl Workflow {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            creation_timestamp: Utc::now(),
            spec: WorkflowSpec::default(),
            status: WorkflowStatus::default(),
        }
    }

    pub fn with_creation_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.creation_timestamp = timestamp;
        self
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.spec.priority = Some(priority);
        self
    }

    pub fn with_synchronization(mut self, sync_ref: SynchronizationRef) -> Self {
        self.spec.synchronization = Some(sync_ref);
        self
    }

    /// Scheduling priority, defaulting to zero
    pub fn priority(&self) -> i32 {
        self.spec.priority.unwrap_or(0)
    }

    /// Semaphore locks this workflow's status records as held, if any
    pub fn semaphore_holding(&self) -> Option<&BTreeMap<String, Vec<String>>> {
        self.status
            .synchronization
            .as_ref()
            .and_then(|s| s.semaphore.as_ref())
            .map(|s| &s.holding)
            .filter(|h| !h.is_empty())
    }
}

/// Workflow-level settings relevant to admission
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
    /// Lock required by the workflow as a whole
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronization: Option<SynchronizationRef>,
}

/// Reference to the lock a unit of work must hold before running.
///
/// Exactly one variant field is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizationRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semaphore: Option<SemaphoreRef>,
}

impl SynchronizationRef {
    /// Semaphore whose limit is stored under `key` of config map `name`
    pub fn semaphore(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            semaphore: Some(SemaphoreRef {
                config_map_key_ref: Some(ConfigMapKeySelector {
                    name: name.into(),
                    key: key.into(),
                }),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemaphoreRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_map_key_ref: Option<ConfigMapKeySelector>,
}

/// Selects one key of a named config map
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigMapKeySelector {
    pub name: String,
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synchronization: Option<SynchronizationStatus>,
}

/// Persisted admission state, one section per lock kind
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SynchronizationStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semaphore: Option<SemaphoreStatus>,
}

/// Holding and waiting projections, keyed by lock name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SemaphoreStatus {
    /// Lock name -> short names of this workflow's holders
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub holding: BTreeMap<String, Vec<String>>,
    /// Lock name -> snapshot of the lock's current holders, for observers
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub waiting: BTreeMap<String, Vec<String>>,
}

impl SemaphoreStatus {
    pub fn is_empty(&self) -> bool {
        self.holding.is_empty() && self.waiting.is_empty()
    }
}

#[cfg(test)]
#[path = "workflow_tests.rs"]
mod tests;
