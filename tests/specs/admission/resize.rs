use crate::prelude::*;
use similar_asserts::assert_eq;

#[test]
fn growing_the_limit_admits_waiters_and_signals() {
    let mut ctl = Controller::new(limits(1));
    ctl.submit("wf1", 0, 0);
    ctl.submit("wf2", 0, 1);
    ctl.reconcile("wf1");
    assert!(!ctl.reconcile("wf2").granted);

    ctl.limits.set(NAMESPACE, CONFIG, KEY, 2);

    assert!(ctl.reconcile("wf2").granted);
    assert_eq!(ctl.drain_released(), strings(&[LOCK]));
}

#[test]
fn shrinking_the_limit_honors_existing_grants() {
    let mut ctl = Controller::new(limits(3));
    for (i, name) in ["wf1", "wf2", "wf3", "wf4"].iter().enumerate() {
        ctl.submit(name, 0, i as i64);
    }
    for name in ["wf1", "wf2", "wf3"] {
        assert!(ctl.reconcile(name).granted);
    }

    ctl.limits
        .replace_from_toml_str(&format!(
            "[namespaces.{NAMESPACE}.configmaps.{CONFIG}]\n{KEY} = \"1\"\n"
        ))
        .unwrap();

    assert!(!ctl.reconcile("wf4").granted);
    assert_eq!(ctl.holders().len(), 3);

    ctl.complete("wf1");
    ctl.complete("wf2");
    assert!(!ctl.reconcile("wf4").granted);

    ctl.complete("wf3");
    assert!(ctl.reconcile("wf4").granted);
}

#[test]
fn deleted_config_fails_admission_until_restored() {
    let mut ctl = Controller::new(limits(1));
    ctl.submit("wf1", 0, 0);
    ctl.reconcile("wf1");

    ctl.limits.remove_config(NAMESPACE, CONFIG);
    let mut wf = ctl.load("wf1");
    let r = lock_ref();
    let err = ctl
        .manager
        .try_acquire(&mut wf, "", 0, at(0), Some(&r))
        .unwrap_err();
    assert!(err.to_string().contains(LOCK), "{err}");

    ctl.limits.set(NAMESPACE, CONFIG, KEY, 1);
    assert!(ctl.reconcile("wf1").granted);
}

#[test]
fn waiters_skipped_after_growth_are_signalled_again() {
    let mut ctl = Controller::new(limits(0));
    ctl.submit("a", 5, 0);
    ctl.submit("b", 1, 1);
    ctl.submit("c", 1, 2);
    for name in ["a", "b", "c"] {
        assert!(!ctl.reconcile(name).granted);
    }

    ctl.limits.set(NAMESPACE, CONFIG, KEY, 2);

    // The first pass after growth visits the queue out of order
    assert!(!ctl.reconcile("b").granted);
    assert_eq!(ctl.drain_released(), strings(&[LOCK]));
    assert!(!ctl.reconcile("c").granted);
    assert!(ctl.reconcile("a").granted);
    assert_eq!(ctl.drain_released(), strings(&[LOCK]));

    // Woken again, the next waiter takes the remaining slot
    assert!(ctl.reconcile("b").granted);
    assert!(ctl.drain_released().is_empty());
    assert_eq!(ctl.holders(), strings(&["ns/a", "ns/b"]));
}
