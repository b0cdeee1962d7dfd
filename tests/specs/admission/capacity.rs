use crate::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn capacity_two_admits_two_and_queues_the_third() {
    let mut ctl = Controller::new(limits(2));
    for (i, name) in ["wf1", "wf2", "wf3"].iter().enumerate() {
        ctl.submit(name, 0, i as i64);
    }

    assert!(ctl.reconcile("wf1").granted);
    assert!(ctl.reconcile("wf2").granted);

    let denied = ctl.reconcile("wf3");
    assert!(!denied.granted);
    assert!(denied.message.contains("ns/wf1"), "{}", denied.message);
    assert!(denied.message.contains("ns/wf2"), "{}", denied.message);

    ctl.complete("wf1");
    assert!(ctl.reconcile("wf3").granted);
    assert_eq!(ctl.holders(), strings(&["ns/wf2", "ns/wf3"]));
}

#[test]
fn waiting_status_is_visible_in_the_document() {
    let mut ctl = Controller::new(limits(1));
    ctl.submit("wf1", 0, 0);
    ctl.submit("wf2", 0, 1);
    ctl.reconcile("wf1");
    ctl.reconcile("wf2");

    let doc: serde_json::Value = serde_json::from_str(&ctl.store["wf2"]).unwrap();
    assert_eq!(
        doc["status"]["synchronization"]["semaphore"]["waiting"][LOCK],
        serde_json::json!(["wf1"])
    );

    let doc: serde_json::Value = serde_json::from_str(&ctl.store["wf1"]).unwrap();
    assert_eq!(
        doc["status"]["synchronization"]["semaphore"]["holding"][LOCK],
        serde_json::json!(["wf1"])
    );
}

#[test]
fn steady_state_passes_do_not_rewrite_holders() {
    let mut ctl = Controller::new(limits(1));
    ctl.submit("wf1", 0, 0);
    let submitted = ctl.writes;

    ctl.reconcile("wf1");
    let after_grant = ctl.writes;
    ctl.reconcile("wf1");
    ctl.reconcile("wf1");

    assert_eq!(after_grant, submitted + 1);
    assert_eq!(ctl.writes, after_grant);
}

#[test]
fn completed_workflow_leaves_no_status() {
    let mut ctl = Controller::new(limits(1));
    ctl.submit("wf1", 0, 0);
    ctl.reconcile("wf1");

    ctl.complete("wf1");

    assert!(ctl.load("wf1").status.synchronization.is_none());
    assert!(ctl.holders().is_empty());
    assert_eq!(ctl.drain_released(), strings(&[LOCK]));
}

#[test]
fn workflow_without_lock_runs_freely() {
    let mut ctl = Controller::new(limits(0));
    let wf = flowsync_core::Workflow::new(NAMESPACE, "free");
    ctl.store
        .insert("free".to_string(), serde_json::to_string(&wf).unwrap());

    let admission = ctl.reconcile("free");

    assert!(admission.granted);
    assert!(!admission.status_changed);
}
