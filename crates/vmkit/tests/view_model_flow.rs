#![forbid(unsafe_code)]

//! Integration tests: a view-model built on the test thread, fed by a model
//! list that a background worker mutates.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use vmkit::prelude::*;

struct InboxViewModel {
    base: ViewModelBase,
    subjects: SharedVec<String>,
    unread: SharedVec<u32>,
    mark_all_read: RelayCommand<()>,
}

impl InboxViewModel {
    fn new(messages: &ObservableVec<u32>) -> Result<Self> {
        let base = ViewModelBase::new()?;
        let subjects = SharedVec::new();
        let unread = SharedVec::new();

        let binder = base.property_binder();
        binder.bind_one_way_with(messages, &subjects, |id: &u32| format!("message {id}"))?;
        binder.bind_one_way(messages, &unread)?;

        let model = messages.clone();
        let mark_all_read = RelayCommand::with_can_execute(
            move |_: &()| {
                let _ = model.clear();
            },
            {
                let model = messages.clone();
                move |_| !model.is_empty()
            },
        );

        Ok(Self {
            base,
            subjects,
            unread,
            mark_all_read,
        })
    }
}

#[test]
fn initial_messages_are_replayed() {
    let messages = ObservableVec::from_vec(vec![1, 2]);
    let vm = InboxViewModel::new(&messages).unwrap();

    assert_eq!(vm.subjects.snapshot(), vec!["message 1", "message 2"]);
    assert_eq!(vm.unread.snapshot(), vec![1, 2]);
    assert_eq!(vm.base.property_binder().binding_count(), 2);
}

#[test]
fn worker_updates_reach_view_model_after_drain() {
    let messages = ObservableVec::new();
    let vm = InboxViewModel::new(&messages).unwrap();

    let model = messages.clone();
    thread::spawn(move || {
        model.push(7).unwrap();
        model.push(8).unwrap();
        model.remove_item(&7).unwrap();
    })
    .join()
    .unwrap();

    assert!(vm.subjects.is_empty());
    assert_eq!(Dispatcher::run_current_pending().unwrap(), 6);
    assert_eq!(vm.subjects.snapshot(), vec!["message 8"]);
    assert_eq!(vm.unread.snapshot(), vec![8]);
}

#[test]
fn command_clears_through_binding() {
    let messages = ObservableVec::from_vec(vec![1]);
    let vm = InboxViewModel::new(&messages).unwrap();
    let refreshed = Arc::new(AtomicUsize::new(0));
    let r = Arc::clone(&refreshed);
    let _sub = vm
        .mark_all_read
        .subscribe_can_execute_changed(Arc::new(move || {
            r.fetch_add(1, Ordering::SeqCst);
        }));

    assert!(vm.mark_all_read.can_execute(&()));
    vm.mark_all_read.execute(&());
    vm.mark_all_read.raise_can_execute_changed();

    assert!(vm.subjects.is_empty());
    assert!(vm.unread.is_empty());
    assert!(!vm.mark_all_read.can_execute(&()));
    assert_eq!(refreshed.load(Ordering::SeqCst), 1);
}

#[test]
fn dropping_view_model_detaches_from_model() {
    let messages = ObservableVec::from_vec(vec![1]);
    let vm = InboxViewModel::new(&messages).unwrap();
    assert_eq!(messages.subscriber_count(), 2);

    drop(vm);
    assert_eq!(messages.subscriber_count(), 0);
}
