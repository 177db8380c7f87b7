// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Parallel executor: start every operation at once, finish when all have finished.
//!
//! ## Semantics
//!
//! - When the run is first polled, the operation is invoked for every element,
//!   in enumeration order, before any of the returned futures is awaited.
//! - The run resolves once every operation's future has resolved.
//! - "Parallel" means concurrently started. Everything runs on the thread
//!   polling the run; operations overlap only where their futures wait.
//! - Results are keyed like the input and ordered like the input, whatever
//!   order the operations finished in.
//! - An empty collection resolves on first poll without invoking the operation.

use alloc::vec::Vec;
use core::future::Future;

use futures::future::join_all;
use tracing::{Instrument, debug, debug_span, trace};
use understory_collection::Collection;

use crate::item::Item;

/// Run `op` for every element concurrently; resolve when all have completed.
pub async fn parallel_for_each<'a, V, F, Fut>(collection: &'a Collection<V>, op: F)
where
    F: FnMut(Item<'a, V>) -> Fut,
    Fut: Future<Output = ()>,
{
    let span = debug_span!(
        "parallel_for_each",
        len = collection.len(),
        shape = %collection.shape()
    );
    async move {
        join_all(start_all(collection, op)).await;
        debug!("all operations completed");
    }
    .instrument(span)
    .await;
}

/// Run `op` for every element concurrently and collect each output under the element's key.
///
/// ```
/// use understory_collection::{Collection, Key};
/// use understory_iterate::parallel_map;
///
/// let sizes = Collection::mapping([("a", 1), ("b", 2), ("c", 3)]);
/// let doubled = futures::executor::block_on(parallel_map(&sizes, |item| {
///     core::future::ready(item.value * 2)
/// }));
/// assert_eq!(doubled.get(&Key::from("b")), Some(&4));
/// assert_eq!(doubled.into_values(), [2, 4, 6]);
/// ```
pub async fn parallel_map<'a, V, R, F, Fut>(collection: &'a Collection<V>, op: F) -> Collection<R>
where
    F: FnMut(Item<'a, V>) -> Fut,
    Fut: Future<Output = R>,
{
    let span = debug_span!(
        "parallel_map",
        len = collection.len(),
        shape = %collection.shape()
    );
    async move {
        let outputs = join_all(start_all(collection, op)).await;
        // Each key owns the slot at its enumeration position.
        let mut out = collection.empty_like();
        for (key, value) in collection.keys().zip(outputs) {
            out.insert(key.clone(), value);
        }
        debug!("all operations completed");
        out
    }
    .instrument(span)
    .await
}

fn start_all<'a, V, F, Fut>(collection: &'a Collection<V>, mut op: F) -> Vec<Fut>
where
    F: FnMut(Item<'a, V>) -> Fut,
{
    Item::all(collection)
        .map(|item| {
            trace!(key = %item.key, "start");
            op(item)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::vec;
    use core::cell::RefCell;
    use core::time::Duration;
    use futures::executor::block_on;
    use understory_collection::{Key, Shape};

    #[test]
    fn sequence_map_preserves_shape_and_length() {
        let input = Collection::sequence([1, 2, 3, 4]);
        let out = block_on(parallel_map(&input, |it| core::future::ready(it.value + 10)));
        assert_eq!(out.shape(), Shape::Sequence);
        assert_eq!(out.into_values(), vec![11, 12, 13, 14]);
    }

    #[test]
    fn mapping_map_keeps_key_set() {
        let input = Collection::mapping([("a", 1), ("b", 2), ("c", 3)]);
        let out = block_on(parallel_map(&input, |it| core::future::ready(it.value * 2)));
        assert_eq!(out.shape(), Shape::Mapping);
        assert_eq!(out.get(&Key::from("a")), Some(&2));
        assert_eq!(out.get(&Key::from("b")), Some(&4));
        assert_eq!(out.get(&Key::from("c")), Some(&6));
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn every_operation_starts_before_any_finishes() {
        let log = RefCell::new(Vec::new());
        let input = Collection::sequence(['a', 'b', 'c']);
        block_on(parallel_for_each(&input, |it| {
            log.borrow_mut().push(("start", *it.value));
            let log = &log;
            async move {
                crate::yield_now::yield_now().await;
                log.borrow_mut().push(("done", *it.value));
            }
        }));
        let log = log.into_inner();
        assert_eq!(
            &log[..3],
            &[("start", 'a'), ("start", 'b'), ("start", 'c')],
            "all starts precede the first completion"
        );
        assert_eq!(log.len(), 6);
    }

    #[tokio::test(start_paused = true)]
    async fn result_order_ignores_completion_order() {
        let finished = Rc::new(RefCell::new(Vec::new()));
        let input = Collection::sequence([0_u64, 1, 2, 3]);
        let out = parallel_map(&input, |it| {
            let finished = finished.clone();
            let v = *it.value;
            async move {
                // Later elements finish first.
                tokio::time::sleep(Duration::from_millis(100 - v * 20)).await;
                finished.borrow_mut().push(v);
                v * v
            }
        })
        .await;
        assert_eq!(*finished.borrow(), vec![3, 2, 1, 0]);
        assert_eq!(out.into_values(), vec![0, 1, 4, 9]);
    }

    #[test]
    fn empty_collection_completes_without_invoking() {
        let mut calls = 0;
        let input: Collection<u8> = Collection::sequence([]);
        let out = block_on(parallel_map(&input, |it| {
            calls += 1;
            core::future::ready(*it.value)
        }));
        assert!(out.is_empty());
        assert_eq!(calls, 0);

        let empty_map: Collection<u8> = Collection::new(Shape::Mapping);
        block_on(parallel_for_each(&empty_map, |_| core::future::ready(())));
    }

    #[test]
    fn text_results_rejoin() {
        let input = Collection::text("abc");
        let out = block_on(parallel_map(&input, |it| {
            core::future::ready(it.value.to_ascii_uppercase())
        }));
        assert_eq!(out.shape(), Shape::Sequence);
        let out = out.into_text_shape();
        assert_eq!(out.shape(), Shape::Text);
        assert_eq!(out.into_text(), "ABC");
    }

    #[test]
    fn text_mapped_to_non_text_is_a_sequence() {
        use crate::chunked::Chunked;
        use crate::clock::ManualClock;
        use crate::serial::serial_map;
        use core::ops::ControlFlow;

        let input = Collection::text("ab");
        let positions = |it: Item<'_, char>| u32::try_from(it.position).unwrap_or(u32::MAX);

        let parallel = block_on(parallel_map(&input, |it| core::future::ready(positions(it))));
        let serial = block_on(serial_map(&input, |it| {
            core::future::ready(ControlFlow::Continue(positions(it)))
        }));
        let chunked = block_on(
            Chunked::with_clock(ManualClock::new())
                .map(&input, |it| ControlFlow::Continue(positions(it))),
        );

        for out in [parallel, serial, chunked] {
            assert_eq!(out.shape(), Shape::Sequence);
            assert_eq!(out.get(&Key::Index(1)), Some(&1));
            assert_eq!(out.into_values(), vec![0, 1]);
        }
    }
}
