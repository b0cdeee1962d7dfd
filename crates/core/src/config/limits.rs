// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Semaphore limits backed by cached config maps
//!
//! Limits live in config maps: `namespace -> config name -> key -> value`.
//! Values are kept as strings and parsed on every lookup, so an entry
//! edited into something that is not a non-negative integer fails the
//! lookup instead of silently keeping an old limit.
//!
//! File layout:
//!
//! ```toml
//! [namespaces.argo.configmaps.my-config]
//! workflow = "2"
//! template = 1
//! ```

use crate::error::LimitError;
use crate::sync::keys::ConfigMapLock;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Capacity lookup handed to the sync manager
pub type LimitFn = Arc<dyn Fn(&str) -> Result<usize, LimitError> + Send + Sync>;

type ConfigMaps = HashMap<(String, String), HashMap<String, String>>;

/// Cloneable, shared cache of config-map data
#[derive(Clone, Default)]
pub struct SemaphoreLimits {
    config_maps: Arc<RwLock<ConfigMaps>>,
}

#[derive(Debug, Default, Deserialize)]
struct LimitsFile {
    #[serde(default)]
    namespaces: HashMap<String, NamespaceLimits>,
}

#[derive(Debug, Default, Deserialize)]
struct NamespaceLimits {
    #[serde(default)]
    configmaps: HashMap<String, HashMap<String, RawValue>>,
}

/// Config-map values are strings, but bare integers are accepted in files
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawValue {
    Int(i64),
    Str(String),
}

impl RawValue {
    fn into_string(self) -> String {
        match self {
            RawValue::Int(n) => n.to_string(),
            RawValue::Str(s) => s,
        }
    }
}

fn parse_config_maps(content: &str) -> Result<ConfigMaps, LimitError> {
    let file: LimitsFile = toml::from_str(content)?;
    let mut maps = ConfigMaps::new();
    for (namespace, ns) in file.namespaces {
        for (name, data) in ns.configmaps {
            let data = data
                .into_iter()
                .map(|(k, v)| (k, v.into_string()))
                .collect();
            maps.insert((namespace.clone(), name), data);
        }
    }
    Ok(maps)
}

impl SemaphoreLimits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from TOML content
    pub fn from_toml_str(content: &str) -> Result<Self, LimitError> {
        let limits = Self::new();
        limits.replace_from_toml_str(content)?;
        Ok(limits)
    }

    /// Build from a TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, LimitError> {
        let content = std::fs::read_to_string(path).map_err(|e| LimitError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml_str(&content)
    }

    /// Replace all cached data. On a parse error the cache is left untouched.
    pub fn replace_from_toml_str(&self, content: &str) -> Result<(), LimitError> {
        let maps = parse_config_maps(content)?;
        *self.write() = maps;
        Ok(())
    }

    /// Set one key of a config map, creating the map if needed
    pub fn set(&self, namespace: &str, name: &str, key: &str, value: impl ToString) {
        self.write()
            .entry((namespace.to_string(), name.to_string()))
            .or_default()
            .insert(key.to_string(), value.to_string());
    }

    pub fn remove_key(&self, namespace: &str, name: &str, key: &str) {
        if let Some(data) = self
            .write()
            .get_mut(&(namespace.to_string(), name.to_string()))
        {
            data.remove(key);
        }
    }

    pub fn remove_config(&self, namespace: &str, name: &str) {
        self.write()
            .remove(&(namespace.to_string(), name.to_string()));
    }

    /// Current limit for a lock name of the form `namespace/configmap/name/key`
    pub fn limit(&self, lock_name: &str) -> Result<usize, LimitError> {
        let lock = ConfigMapLock::parse(lock_name).ok_or_else(|| LimitError::UnknownLock {
            lock: lock_name.to_string(),
        })?;

        let maps = self.config_maps.read().unwrap_or_else(|e| e.into_inner());
        let data = maps
            .get(&(lock.namespace.to_string(), lock.config_name.to_string()))
            .ok_or_else(|| LimitError::NotFound {
                namespace: lock.namespace.to_string(),
                name: lock.config_name.to_string(),
            })?;
        let value = data.get(lock.key).ok_or_else(|| LimitError::MissingKey {
            namespace: lock.namespace.to_string(),
            name: lock.config_name.to_string(),
            key: lock.key.to_string(),
        })?;

        value
            .trim()
            .parse::<usize>()
            .map_err(|e| LimitError::Malformed {
                lock: lock_name.to_string(),
                value: value.clone(),
                reason: e.to_string(),
            })
    }

    /// Lookup function reading this cache on every call
    pub fn limit_fn(&self) -> LimitFn {
        let limits = self.clone();
        Arc::new(move |lock_name: &str| limits.limit(lock_name))
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, ConfigMaps> {
        self.config_maps.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl std::fmt::Debug for SemaphoreLimits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let maps = self.config_maps.read().unwrap_or_else(|e| e.into_inner());
        f.debug_struct("SemaphoreLimits")
            .field("config_maps", &maps.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "limits_tests.rs"]
mod tests;
