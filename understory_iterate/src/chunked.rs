// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Chunked cooperative executor: synchronous operations in time-boxed slices.
//!
//! ## Overview
//!
//! Runs a plain synchronous operation over a potentially large collection
//! without holding the host's thread for more than a configurable budget at a time.
//! Between slices it suspends through [`yield_now`](crate::yield_now::yield_now),
//! letting the host executor run other ready work before the run resumes.
//!
//! ## Semantics
//!
//! - Elements are visited one at a time, in enumeration order.
//! - The budget is checked only at element boundaries; an operation is never
//!   interrupted. A slice therefore always makes progress, even with a zero budget.
//! - When the time since the slice began reaches the budget and elements
//!   remain, the run suspends. A new slice begins when it is polled again.
//! - An operation returning [`ControlFlow::Break`] ends the run; the remaining
//!   elements are skipped.
//! - The run resolves exactly once.
//!
//! ## Configuration
//!
//! ```
//! use core::ops::ControlFlow;
//! use core::time::Duration;
//! use understory_collection::Collection;
//! use understory_iterate::chunked::Chunked;
//!
//! let rows: Collection<u32> = (0..10_000).collect();
//! let chunked = Chunked::new().with_budget(Duration::from_millis(8));
//!
//! let mut total = 0_u64;
//! let flow = futures::executor::block_on(chunked.for_each(&rows, |item| {
//!     total += u64::from(*item.value);
//!     ControlFlow::Continue(())
//! }));
//! assert!(flow.is_continue());
//! assert_eq!(total, 49_995_000);
//! ```

use core::ops::ControlFlow;
use core::time::Duration;

use tracing::{Instrument, debug, debug_span, trace};
use understory_collection::Collection;

use crate::clock::Clock;
#[cfg(feature = "std")]
use crate::clock::SystemClock;
use crate::item::Item;
use crate::yield_now::yield_now;

/// Default time budget per slice.
pub const DEFAULT_BUDGET: Duration = Duration::from_millis(1000);

/// Time-sliced executor for synchronous operations.
///
/// ## Usage
///
/// - Construct with [`Chunked::new`] (feature `std`, wall-clock time) or
///   [`Chunked::with_clock`] to measure slices with your own [`Clock`].
/// - Optionally set a budget with [`Chunked::with_budget`] or
///   [`Chunked::set_budget`]; the default is [`DEFAULT_BUDGET`].
/// - Call [`Chunked::for_each`] or [`Chunked::map`] and poll the returned
///   future on your executor. The executor value can be reused for any number of runs.
#[derive(Clone, Debug)]
pub struct Chunked<C> {
    budget: Duration,
    clock: C,
}

#[cfg(feature = "std")]
impl Chunked<SystemClock> {
    /// Create an executor measuring wall-clock time, with the default budget.
    pub fn new() -> Self {
        Self::with_clock(SystemClock::new())
    }
}

#[cfg(feature = "std")]
impl Default for Chunked<SystemClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Clock> Chunked<C> {
    /// Create an executor measuring slices with `clock`, with the default budget.
    pub fn with_clock(clock: C) -> Self {
        Self {
            budget: DEFAULT_BUDGET,
            clock,
        }
    }

    /// Set the per-slice budget.
    pub fn with_budget(mut self, budget: Duration) -> Self {
        self.budget = budget;
        self
    }

    /// Set the per-slice budget.
    pub fn set_budget(&mut self, budget: Duration) {
        self.budget = budget;
    }

    /// The per-slice budget.
    pub fn budget(&self) -> Duration {
        self.budget
    }

    /// The clock measuring slices.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run `op` for each element, yielding to the host between slices.
    ///
    /// Resolves to [`ControlFlow::Break`] if `op` stopped the run.
    pub async fn for_each<V, F>(&self, collection: &Collection<V>, op: F) -> ControlFlow<()>
    where
        F: FnMut(Item<'_, V>) -> ControlFlow<()>,
    {
        let span = debug_span!(
            "nonblocking_for_each",
            len = collection.len(),
            shape = %collection.shape(),
            budget = ?self.budget
        );
        self.run(collection, op).instrument(span).await
    }

    /// Run `op` for each element and collect each output under the element's key.
    ///
    /// A [`ControlFlow::Break`] stops the run; the result holds the outputs
    /// produced before it.
    pub async fn map<V, R, F>(&self, collection: &Collection<V>, mut op: F) -> Collection<R>
    where
        F: FnMut(Item<'_, V>) -> ControlFlow<(), R>,
    {
        let span = debug_span!(
            "nonblocking_map",
            len = collection.len(),
            shape = %collection.shape(),
            budget = ?self.budget
        );
        let mut out = collection.empty_like();
        let visit = |item: Item<'_, V>| match op(item) {
            ControlFlow::Continue(value) => {
                out.insert(item.key.clone(), value);
                ControlFlow::Continue(())
            }
            ControlFlow::Break(()) => ControlFlow::Break(()),
        };
        let flow = self.run(collection, visit).instrument(span).await;
        // A stopped map reports the stop through its partial result.
        if flow.is_break() {
            debug!(produced = out.len(), "returning partial result");
        }
        out
    }

    async fn run<V, F>(&self, collection: &Collection<V>, mut visit: F) -> ControlFlow<()>
    where
        F: FnMut(Item<'_, V>) -> ControlFlow<()>,
    {
        let len = collection.len();
        let mut slice_start = self.clock.now();
        let mut in_slice = 0_usize;
        let mut slices = 1_usize;
        for item in Item::all(collection) {
            if visit(item).is_break() {
                debug!(key = %item.key, position = item.position, slices, "stopped");
                return ControlFlow::Break(());
            }
            in_slice += 1;
            let more = item.position + 1 < len;
            if more && self.clock.now().saturating_sub(slice_start) >= self.budget {
                trace!(processed = in_slice, next = item.position + 1, "budget spent, yielding");
                yield_now().await;
                slice_start = self.clock.now();
                in_slice = 0;
                slices += 1;
            }
        }
        debug!(slices, "exhausted");
        ControlFlow::Continue(())
    }
}

/// Run a synchronous `op` over `collection` in slices of at most `budget`
/// (default [`DEFAULT_BUDGET`]) of wall-clock time.
#[cfg(feature = "std")]
pub async fn nonblocking_for_each<V, F>(
    collection: &Collection<V>,
    op: F,
    budget: Option<Duration>,
) -> ControlFlow<()>
where
    F: FnMut(Item<'_, V>) -> ControlFlow<()>,
{
    Chunked::new()
        .with_budget(budget.unwrap_or(DEFAULT_BUDGET))
        .for_each(collection, op)
        .await
}

/// Map a synchronous `op` over `collection` in slices of at most `budget`
/// (default [`DEFAULT_BUDGET`]) of wall-clock time.
#[cfg(feature = "std")]
pub async fn nonblocking_map<V, R, F>(
    collection: &Collection<V>,
    op: F,
    budget: Option<Duration>,
) -> Collection<R>
where
    F: FnMut(Item<'_, V>) -> ControlFlow<(), R>,
{
    Chunked::new()
        .with_budget(budget.unwrap_or(DEFAULT_BUDGET))
        .map(collection, op)
        .await
}
