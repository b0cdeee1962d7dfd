// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock name and holder key derivation
//!
//! - Lock name: `<namespace>/configmap/<config>/<key>`
//! - Holder key: `<namespace>/<workflow>` or `<namespace>/<workflow>/<node>`
//! - Short name: last segment of a holder key, as persisted in status

use super::lock::LockKind;
use crate::error::SyncError;
use crate::workflow::{SemaphoreRef, SynchronizationRef, Workflow};

const CONFIG_MAP_SEGMENT: &str = "configmap";

/// A lock name backed by one key of a config map
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigMapLock<'a> {
    pub namespace: &'a str,
    pub config_name: &'a str,
    pub key: &'a str,
}

impl<'a> ConfigMapLock<'a> {
    /// Split a lock name into its parts; `None` if it is not config-map backed
    pub fn parse(lock_name: &'a str) -> Option<Self> {
        let mut parts = lock_name.split('/');
        let namespace = parts.next()?;
        if parts.next()? != CONFIG_MAP_SEGMENT {
            return None;
        }
        let config_name = parts.next()?;
        let key = parts.next()?;
        if parts.next().is_some() || [namespace, config_name, key].iter().any(|p| p.is_empty())
        {
            return None;
        }
        Some(Self {
            namespace,
            config_name,
            key,
        })
    }
}

/// Resolve the lock kind and name a reference points at.
///
/// Fails if the reference names no known kind of lock, or if the parts it
/// names cannot form a well-formed lock name.
pub fn resolve_lock(
    namespace: &str,
    sync_ref: &SynchronizationRef,
) -> Result<(LockKind, String), SyncError> {
    match &sync_ref.semaphore {
        Some(semaphore) => {
            let name = semaphore_lock_name(namespace, semaphore)?;
            Ok((LockKind::Semaphore, name))
        }
        None => Err(SyncError::invalid("requested synchronization is invalid")),
    }
}

fn semaphore_lock_name(namespace: &str, semaphore: &SemaphoreRef) -> Result<String, SyncError> {
    let selector = semaphore
        .config_map_key_ref
        .as_ref()
        .ok_or_else(|| SyncError::invalid("semaphore reference has no config map key"))?;

    let name = format!(
        "{}/{}/{}/{}",
        namespace, CONFIG_MAP_SEGMENT, selector.name, selector.key
    );
    if ConfigMapLock::parse(&name).is_none() {
        return Err(SyncError::invalid(format!(
            "requested synchronized lock '{}' is invalid",
            name
        )));
    }
    Ok(name)
}

/// Key identifying one unit of work; empty `node_name` means the whole workflow
pub fn holder_key(wf: &Workflow, node_name: &str) -> String {
    if node_name.is_empty() {
        format!("{}/{}", wf.namespace, wf.name)
    } else {
        format!("{}/{}/{}", wf.namespace, wf.name, node_name)
    }
}

/// Rebuild a holder key from a persisted short name
pub fn resource_key(namespace: &str, wf_name: &str, short_name: &str) -> String {
    if short_name == wf_name {
        format!("{}/{}", namespace, wf_name)
    } else {
        format!("{}/{}/{}", namespace, wf_name, short_name)
    }
}

/// Persisted name of a holder: the workflow name or the node name
pub fn short_name(holder_key: &str) -> &str {
    holder_key.rsplit('/').next().unwrap_or(holder_key)
}

#[cfg(test)]
#[path = "keys_tests.rs"]
mod tests;
