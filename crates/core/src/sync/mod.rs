// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Admission control for workflows and workflow steps
//!
//! This module provides:
//! - **Synchronization** - Capability every lock primitive implements
//! - **Semaphore** - Capacity-bounded lock with a priority-ordered queue
//! - **SyncManager** - Registry of locks and single entry point for admission
//! - **Status projection** - Mirrors outcomes into the workflow document

pub mod keys;
pub mod lock;
pub mod manager;
pub mod pending;
pub mod semaphore;
pub mod stats;
pub mod status;

pub use keys::{holder_key, resolve_lock, ConfigMapLock};
pub use lock::{LockAction, LockKind, Synchronization};
pub use manager::{Admission, SyncManager};
pub use pending::{PendingItem, PendingQueue};
pub use semaphore::Semaphore;
pub use stats::{LockStats, SyncStats};
pub use status::update_concurrency_status;
