use crate::prelude::*;
use flowsync_core::{SyncManager, Workflow};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn concurrent_callers_never_exceed_capacity() {
    let limits = limits(3);
    let manager = Arc::new(SyncManager::new(
        limits.limit_fn(),
        flowsync_core::notify::noop(),
    ));
    let peak = Arc::new(AtomicUsize::new(0));
    let completed = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|s| {
        for t in 0..8 {
            let manager = Arc::clone(&manager);
            let peak = Arc::clone(&peak);
            let completed = Arc::clone(&completed);
            s.spawn(move || {
                let r = lock_ref();
                let mut wf = Workflow::new(NAMESPACE, format!("wf-{t}"))
                    .with_creation_timestamp(at(t));
                let created = wf.creation_timestamp;
                loop {
                    let admission = manager
                        .try_acquire(&mut wf, "", 0, created, Some(&r))
                        .unwrap();
                    if admission.granted {
                        break;
                    }
                    std::thread::yield_now();
                }
                let holders = manager.current_holders(LOCK).len();
                assert!(holders <= 3);
                peak.fetch_max(holders, Ordering::SeqCst);
                manager.release(&mut wf, "", NAMESPACE, Some(&r));
                completed.fetch_add(1, Ordering::SeqCst);
            });
        }
    });

    assert_eq!(completed.load(Ordering::SeqCst), 8);
    let peak = peak.load(Ordering::SeqCst);
    assert!((1..=3).contains(&peak), "peak holders {peak}");
    assert!(manager.current_holders(LOCK).is_empty());
}
