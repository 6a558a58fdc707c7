// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use vj_core::test_support::rid;

#[test]
fn second_acquire_conflicts_until_release() {
    let leases = ResourceLeases::new();
    let lease = leases.try_acquire(&rid("snap1"), &"job-a".into()).unwrap();
    let err = leases.try_acquire(&rid("snap1"), &"job-b".into()).unwrap_err();
    assert_eq!(err.holder, "job-a");
    assert_eq!(err.to_string(), "snap1 is held by job-a");

    drop(lease);
    assert!(leases.is_empty());
    assert!(leases.try_acquire(&rid("snap1"), &"job-b".into()).is_ok());
}

#[test]
fn disjoint_resources_do_not_conflict() {
    let leases = ResourceLeases::new();
    let _a = leases.try_acquire(&rid("snap1"), &"job-a".into()).unwrap();
    let _b = leases.try_acquire(&rid("snap2"), &"job-b".into()).unwrap();
    assert_eq!(leases.len(), 2);
    assert_eq!(leases.holder(&rid("snap2")), Some("job-b".into()));
}

#[test]
fn lease_is_released_on_panic_unwind() {
    let leases = ResourceLeases::new();
    let cloned = leases.clone();
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(move || {
        let _lease = cloned.try_acquire(&rid("vol1"), &"job-a".into()).unwrap();
        panic!("step blew up");
    }));
    assert!(result.is_err());
    assert!(leases.holder(&rid("vol1")).is_none());
}

#[test]
fn racing_acquires_grant_exactly_one() {
    let leases = ResourceLeases::new();
    let barrier = Arc::new(std::sync::Barrier::new(8));
    let handles: Vec<_> = (0..8)
        .map(|i| {
            let leases = leases.clone();
            let barrier = Arc::clone(&barrier);
            std::thread::spawn(move || {
                barrier.wait();
                leases.try_acquire(&rid("snap1"), &JobId::from(format!("job-{i}"))).ok()
            })
        })
        .collect();
    let granted: Vec<Lease> = handles.into_iter().filter_map(|h| h.join().unwrap()).collect();
    assert_eq!(granted.len(), 1);
}
