#![forbid(unsafe_code)]

//! Integration tests: binder forwarding across a worker thread and the
//! owning dispatcher.

use std::sync::{Arc, Mutex};
use std::thread;

use vmkit_core::{BindError, ExecutionContext};
use vmkit_runtime::{Dispatcher, ObservableVec, PropertyBinder, SharedVec};

fn on_worker(f: impl FnOnce() + Send + 'static) {
    thread::spawn(f).join().unwrap();
}

// ============================================================================
// Forwarding through the dispatcher
// ============================================================================

#[test]
fn replay_is_synchronous_at_bind() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![3, 1, 2]);
    let target = SharedVec::from_vec(vec![9]);

    binder.bind_one_way(&source, &target).unwrap();
    assert_eq!(target.snapshot(), vec![9, 3, 1, 2]);
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn worker_adds_land_after_drain_in_order() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::new();
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    let s = source.clone();
    on_worker(move || s.extend(vec!['a', 'b']).unwrap());

    assert!(target.is_empty(), "adds are queued for the owning context");
    assert_eq!(dispatcher.pending(), 1);

    assert_eq!(dispatcher.run_pending().unwrap(), 1);
    assert_eq!(target.snapshot(), vec!['a', 'b']);
}

#[test]
fn worker_removes_by_value_after_drain() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![1, 2, 3]);
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    let s = source.clone();
    on_worker(move || {
        s.push(4).unwrap();
        s.remove_item(&4).unwrap();
        s.remove_item(&1).unwrap();
    });

    dispatcher.run_pending().unwrap();
    assert_eq!(target.snapshot(), vec![2, 3]);
}

#[test]
fn owner_thread_mutations_apply_inline() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::new();
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    source.push(7).unwrap();
    assert_eq!(target.snapshot(), vec![7]);
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn reset_clears_on_notifying_thread_without_drain() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![1, 2]);
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    let s = source.clone();
    let t = target.clone();
    on_worker(move || {
        s.clear().unwrap();
        assert!(t.is_empty(), "reset is applied before clear() returns");
    });

    assert!(target.is_empty());
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn transform_scenario_across_threads() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![1, 2, 3]);
    let target = SharedVec::new();

    binder
        .bind_one_way_with(&source, &target, |x: &i32| x * 10)
        .unwrap();
    assert_eq!(target.snapshot(), vec![10, 20, 30]);

    let s = source.clone();
    on_worker(move || s.push(4).unwrap());
    dispatcher.run_pending().unwrap();
    assert_eq!(target.snapshot(), vec![10, 20, 30, 40]);

    let s = source.clone();
    on_worker(move || {
        s.remove_item(&2).unwrap();
    });
    dispatcher.run_pending().unwrap();
    assert_eq!(target.snapshot(), vec![10, 30, 40]);
}

#[test]
fn queued_removal_before_reset_drains_cleanly() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![1, 2]);
    let target = SharedVec::new();
    binder
        .bind_one_way_with(&source, &target, |x: &i32| x * 10)
        .unwrap();

    let s = source.clone();
    on_worker(move || {
        s.remove_item(&1).unwrap();
        s.clear().unwrap();
    });

    assert!(target.is_empty(), "target clear is not scheduled");
    assert_eq!(binder.transform_entry_count(), 2);

    assert_eq!(dispatcher.run_pending(), Ok(2));
    assert!(target.is_empty());
    assert_eq!(binder.transform_entry_count(), 0);
}

#[test]
fn plain_reset_schedules_nothing() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![1, 2]);
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    let s = source.clone();
    on_worker(move || s.clear().unwrap());
    assert_eq!(dispatcher.pending(), 0);
}

#[test]
fn duplicate_removal_fails_when_drained() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![5, 5]);
    let target = SharedVec::new();
    binder
        .bind_one_way_with(&source, &target, |x: &i32| x + 1)
        .unwrap();

    let s = source.clone();
    on_worker(move || {
        // Both removals are queued; the failure belongs to the run-loop.
        s.remove_at(0).unwrap();
        s.remove_at(0).unwrap();
    });

    assert_eq!(dispatcher.run_pending(), Err(BindError::KeyNotFound));
    assert_eq!(target.snapshot(), vec![6]);
}

#[test]
fn unbind_all_stops_worker_forwarding() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::from_vec(vec![1]);
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    binder.unbind_all();
    binder.unbind_all();

    let s = source.clone();
    on_worker(move || {
        s.push(2).unwrap();
        s.clear().unwrap();
    });
    assert_eq!(dispatcher.run_pending().unwrap(), 0);
    assert_eq!(target.snapshot(), vec![1]);
}

#[test]
fn work_queued_before_unbind_still_runs() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::new();
    let target = SharedVec::new();
    binder.bind_one_way(&source, &target).unwrap();

    let s = source.clone();
    on_worker(move || s.push(1).unwrap());
    binder.unbind_all();

    dispatcher.run_pending().unwrap();
    assert_eq!(target.snapshot(), vec![1]);
}

#[test]
fn binder_rejects_shut_down_dispatcher() {
    let dispatcher = Dispatcher::new();
    let handle = dispatcher.handle();
    drop(dispatcher);

    assert!(!handle.is_available());
    assert!(matches!(
        PropertyBinder::new(handle),
        Err(BindError::InvalidArgument { .. })
    ));
}

#[test]
fn adds_to_shut_down_dispatcher_surface_to_worker() {
    let dispatcher = Dispatcher::new();
    let binder = PropertyBinder::new(dispatcher.handle()).unwrap();
    let source = ObservableVec::new();
    let target = SharedVec::<i32>::new();
    binder.bind_one_way(&source, &target).unwrap();
    dispatcher.shutdown();

    let result = Arc::new(Mutex::new(None));
    let r = Arc::clone(&result);
    let s = source.clone();
    on_worker(move || *r.lock().unwrap() = Some(s.push(1)));

    assert_eq!(
        *result.lock().unwrap(),
        Some(Err(BindError::ContextUnavailable))
    );
}
