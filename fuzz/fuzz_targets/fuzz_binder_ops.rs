#![no_main]

//! Fuzz random source mutations against a plain and a transformed binding.
//!
//! The plain target must hold the same multiset as the source. The transformed
//! target only ever sees distinct source values, so it must match the mapped
//! source exactly, in order.

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use vmkit_core::{ImmediateContext, ObservableCollection};
use vmkit_runtime::{ObservableVec, PropertyBinder, SharedVec};

#[derive(Debug, Arbitrary)]
enum Op {
    Push(i16),
    Insert(u8, i16),
    RemoveAt(u8),
    Extend(Vec<i16>),
    Clear,
}

fuzz_target!(|ops: Vec<Op>| {
    let binder = PropertyBinder::new(ImmediateContext).unwrap();

    let any = ObservableVec::new();
    let plain = SharedVec::new();
    binder.bind_one_way(&any, &plain).unwrap();

    let distinct = ObservableVec::new();
    let mapped = SharedVec::new();
    binder
        .bind_one_way_with(&distinct, &mapped, |x: &i16| i32::from(*x) * 3)
        .unwrap();

    for op in ops.into_iter().take(256) {
        match op {
            Op::Push(x) => {
                any.push(x).unwrap();
                if !distinct.snapshot().unwrap().contains(&x) {
                    distinct.push(x).unwrap();
                }
            }
            Op::Insert(at, x) => {
                let _ = any.insert(usize::from(at), x);
            }
            Op::RemoveAt(at) => {
                let at = usize::from(at);
                if at < any.len() {
                    any.remove_at(at).unwrap();
                }
                if at < distinct.len() {
                    distinct.remove_at(at).unwrap();
                }
            }
            Op::Extend(items) => any.extend(items).unwrap(),
            Op::Clear => {
                any.clear().unwrap();
                distinct.clear().unwrap();
            }
        }

        let mut expected = any.snapshot().unwrap();
        let mut actual = plain.snapshot();
        expected.sort_unstable();
        actual.sort_unstable();
        assert_eq!(expected, actual);

        let expected: Vec<i32> = distinct
            .snapshot()
            .unwrap()
            .iter()
            .map(|x| i32::from(*x) * 3)
            .collect();
        assert_eq!(mapped.snapshot(), expected);
        assert_eq!(binder.transform_entry_count(), distinct.len());
    }
});
