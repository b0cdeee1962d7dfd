// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the admission layer

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by a capacity lookup.
#[derive(Debug, Error)]
pub enum LimitError {
    /// Lock name is not of the form `namespace/configmap/name/key`
    #[error("lock name '{lock}' does not reference a config map key")]
    UnknownLock { lock: String },

    /// No config object with this name in the namespace
    #[error("config map '{namespace}/{name}' not found")]
    NotFound { namespace: String, name: String },

    /// Config object exists but does not carry the key
    #[error("key '{key}' not found in config map '{namespace}/{name}'")]
    MissingKey {
        namespace: String,
        name: String,
        key: String,
    },

    /// Value is not a non-negative integer
    #[error("invalid limit '{value}' for lock '{lock}': {reason}")]
    Malformed {
        lock: String,
        value: String,
        reason: String,
    },

    /// IO error reading a limits file
    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML syntax error in a limits file
    #[error("TOML syntax error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Errors returned by the sync manager.
///
/// Contention is not an error: a denied admission is reported through
/// [`crate::sync::Admission`] with `granted == false`.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The capacity source for a lock cannot be resolved
    #[error("failed to resolve limit for lock '{lock}': {source}")]
    Config {
        lock: String,
        #[source]
        source: LimitError,
    },

    /// The lock reference names no usable lock
    #[error("invalid synchronization request: {reason}")]
    InvalidRequest { reason: String },
}

impl SyncError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        SyncError::InvalidRequest {
            reason: reason.into(),
        }
    }
}
