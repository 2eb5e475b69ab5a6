//! Property-based tests for the quicklist
//!
//! Every sequence of operations is mirrored on a `VecDeque` model.

use bytes::Bytes;
use proptest::prelude::*;
use quickdb::{ListError, Quicklist};
use std::collections::VecDeque;

#[derive(Debug, Clone)]
enum Op {
    PushLeft(u16),
    PushRight(u16),
    PopLeft,
    PopRight,
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u16>().prop_map(Op::PushLeft),
        any::<u16>().prop_map(Op::PushRight),
        Just(Op::PopLeft),
        Just(Op::PopRight),
    ]
}

fn value(n: u16) -> Bytes {
    Bytes::from(n.to_string())
}

/// Build a list and its model from pushes only
fn filled(capacity: usize, values: &[u16]) -> (Quicklist, Vec<Bytes>) {
    let mut list = Quicklist::with_node_capacity(capacity);
    for v in values {
        list.push_right(value(*v));
    }
    (list, values.iter().map(|v| value(*v)).collect())
}

proptest! {
    #[test]
    fn length_tracks_pushes_minus_successful_pops(
        capacity in 1usize..6,
        ops in prop::collection::vec(arbitrary_op(), 0..200),
    ) {
        let mut list = Quicklist::with_node_capacity(capacity);
        let mut model = VecDeque::new();

        for op in ops {
            match op {
                Op::PushLeft(v) => {
                    list.push_left(value(v));
                    model.push_front(value(v));
                }
                Op::PushRight(v) => {
                    list.push_right(value(v));
                    model.push_back(value(v));
                }
                Op::PopLeft => {
                    let before = list.len();
                    match model.pop_front() {
                        Some(expected) => prop_assert_eq!(list.pop_left(), Ok(expected)),
                        None => {
                            prop_assert_eq!(list.pop_left(), Err(ListError::Empty));
                            prop_assert_eq!(list.len(), before);
                        }
                    }
                }
                Op::PopRight => {
                    let before = list.len();
                    match model.pop_back() {
                        Some(expected) => prop_assert_eq!(list.pop_right(), Ok(expected)),
                        None => {
                            prop_assert_eq!(list.pop_right(), Err(ListError::Empty));
                            prop_assert_eq!(list.len(), before);
                        }
                    }
                }
            }

            prop_assert_eq!(list.len(), model.len());
            prop_assert_eq!(list.is_empty(), list.node_count() == 0);
        }

        let contents: Vec<Bytes> = list.iter().cloned().collect();
        prop_assert_eq!(contents, Vec::from(model));
    }

    #[test]
    fn get_after_set_returns_the_new_value(
        capacity in 1usize..6,
        values in prop::collection::vec(any::<u16>(), 1..50),
        index in any::<prop::sample::Index>(),
    ) {
        let (mut list, _) = filled(capacity, &values);
        let i = index.index(values.len()) as i64;

        list.set(i, Bytes::from("new")).unwrap();
        prop_assert_eq!(list.get(i), Some(&Bytes::from("new")));

        let len = list.len() as i64;
        prop_assert_eq!(list.get(-len), list.get(0));
        prop_assert_eq!(list.get(len), None);
    }

    #[test]
    fn full_range_returns_every_element(
        capacity in 1usize..6,
        values in prop::collection::vec(any::<u16>(), 0..50),
    ) {
        let (list, model) = filled(capacity, &values);
        let len = list.len() as i64;

        prop_assert_eq!(list.range(0, len - 1), model.clone());
        prop_assert_eq!(list.range(0, -1), model);
    }

    #[test]
    fn range_matches_slice_semantics(
        capacity in 1usize..6,
        values in prop::collection::vec(any::<u16>(), 0..40),
        start in -50i64..50,
        end in -50i64..50,
    ) {
        let (list, model) = filled(capacity, &values);
        let len = model.len() as i64;

        let s = if start < 0 { (len + start).max(0) } else { start };
        let e = if end < 0 { len + end } else { end.min(len - 1) };

        let expected: Vec<Bytes> = if e < 0 || s > e || s >= len {
            Vec::new()
        } else {
            model[s as usize..=e as usize].to_vec()
        };

        prop_assert_eq!(list.range(start, end), expected);
    }
}
