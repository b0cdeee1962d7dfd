//! flowsync-core: Admission control for a workflow controller
//!
//! This crate provides:
//! - Named, capacity-bounded locks shared by workflows and their steps
//! - A sync manager that serializes admission and survives restarts
//!   by rebuilding from persisted workflow status
//! - Config-map backed limits and release notifications

pub mod config;
pub mod error;
pub mod notify;
pub mod sync;
pub mod workflow;

// Re-exports
pub use config::{LimitFn, SemaphoreLimits};
pub use error::{LimitError, SyncError};
pub use notify::{release_channel, ReleaseNotifyFn, ReleaseReceiver};
pub use sync::{Admission, LockKind, SyncManager, SyncStats, Synchronization};
pub use workflow::{
    ConfigMapKeySelector, SemaphoreRef, SemaphoreStatus, SynchronizationRef,
    SynchronizationStatus, Workflow, WorkflowSpec, WorkflowStatus,
};
