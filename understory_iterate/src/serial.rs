// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Serial executor: one operation at a time, in enumeration order.
//!
//! ## Semantics
//!
//! - The operation for an element is invoked only after the previous
//!   element's future has resolved. No two operations are ever pending at once.
//! - An operation stops the run by resolving to [`ControlFlow::Break`].
//!   Elements after it are never visited.
//! - The run resolves exactly once, on exhaustion or on stop.
//!
//! Chains are driven by a loop, so long runs of operations that resolve
//! immediately do not grow the stack.

use core::future::Future;
use core::ops::ControlFlow;

use tracing::{Instrument, debug, debug_span, trace};
use understory_collection::Collection;

use crate::item::Item;

/// Run `op` for each element in turn.
///
/// Resolves to [`ControlFlow::Break`] if an operation stopped the run,
/// otherwise to [`ControlFlow::Continue`] once every element was visited.
pub async fn serial_for_each<'a, V, F, Fut>(
    collection: &'a Collection<V>,
    mut op: F,
) -> ControlFlow<()>
where
    F: FnMut(Item<'a, V>) -> Fut,
    Fut: Future<Output = ControlFlow<()>>,
{
    let span = debug_span!(
        "serial_for_each",
        len = collection.len(),
        shape = %collection.shape()
    );
    async move {
        for item in Item::all(collection) {
            trace!(key = %item.key, "start");
            if op(item).await.is_break() {
                debug!(key = %item.key, position = item.position, "stopped");
                return ControlFlow::Break(());
            }
        }
        debug!("exhausted");
        ControlFlow::Continue(())
    }
    .instrument(span)
    .await
}

/// Run `op` for each element in turn and collect each output under the element's key.
///
/// A [`ControlFlow::Break`] stops the run; the result then holds the outputs
/// of the elements before the one that stopped.
///
/// ```
/// use core::ops::ControlFlow;
/// use understory_collection::Collection;
/// use understory_iterate::serial_map;
///
/// let words = Collection::sequence(["one", "two", "STOP", "four"]);
/// let lens = futures::executor::block_on(serial_map(&words, |item| {
///     let word = *item.value;
///     async move {
///         if word == "STOP" {
///             ControlFlow::Break(())
///         } else {
///             ControlFlow::Continue(word.len())
///         }
///     }
/// }));
/// assert_eq!(lens.into_values(), [3, 3]);
/// ```
pub async fn serial_map<'a, V, R, F, Fut>(collection: &'a Collection<V>, mut op: F) -> Collection<R>
where
    F: FnMut(Item<'a, V>) -> Fut,
    Fut: Future<Output = ControlFlow<(), R>>,
{
    let span = debug_span!(
        "serial_map",
        len = collection.len(),
        shape = %collection.shape()
    );
    async move {
        let mut out = collection.empty_like();
        for item in Item::all(collection) {
            trace!(key = %item.key, "start");
            match op(item).await {
                ControlFlow::Continue(value) => {
                    out.insert(item.key.clone(), value);
                }
                ControlFlow::Break(()) => {
                    debug!(key = %item.key, position = item.position, "stopped");
                    return out;
                }
            }
        }
        debug!("exhausted");
        out
    }
    .instrument(span)
    .await
}
