// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pipeline dispatcher: serial stages of parallel batches, described by shape alone.
//!
//! ## Overview
//!
//! [`async_map`] takes a collection whose elements are either plain values or
//! nested collections ([`Element`]) and decides how to schedule it from that shape:
//!
//! - No nested collections: one implicit stage. Every value is mapped with
//!   [`parallel_map`](crate::parallel::parallel_map).
//! - At least one nested collection: each top-level element is a stage, run one
//!   after another with [`serial_map`](crate::serial::serial_map). A nested
//!   collection is a batch whose elements run concurrently with
//!   [`parallel_map`](crate::parallel::parallel_map). A plain value in a staged
//!   pipeline is a one-element batch of its own.
//!
//! The result has the top-level shape and keys of the input. A batch stage
//! produces a nested result collection; a single-value stage produces a single value.
//!
//! ## Example
//!
//! ```
//! use understory_collection::Collection;
//! use understory_iterate::pipeline::{Element, async_map};
//!
//! // Fetch a and b together, then c and d together.
//! let plan = Collection::sequence([
//!     Element::Batch(Collection::sequence(["a", "b"])),
//!     Element::Batch(Collection::sequence(["c", "d"])),
//! ]);
//! let out = futures::executor::block_on(async_map(plan, |item| {
//!     let name = *item.value;
//!     async move { name.to_uppercase() }
//! }));
//! let stages: Vec<Vec<String>> = out
//!     .into_values()
//!     .into_iter()
//!     .map(|e| e.into_batch().unwrap().into_values())
//!     .collect();
//! assert_eq!(stages, [["A", "B"], ["C", "D"]]);
//! ```

use alloc::vec::Vec;
use core::cell::RefCell;
use core::future::Future;
use core::ops::ControlFlow;

use tracing::{Instrument, debug, debug_span};
use understory_collection::{Collection, Key, Shape};

use crate::item::Item;
use crate::parallel::parallel_map;
use crate::serial::serial_map;

/// A top-level pipeline element: a plain value or a nested batch.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Element<V> {
    /// A single value.
    Value(V),
    /// A nested collection, run as one parallel batch.
    Batch(Collection<V>),
}

impl<V> Element<V> {
    /// True for [`Element::Batch`].
    pub fn is_batch(&self) -> bool {
        matches!(self, Self::Batch(_))
    }

    /// The value, if this is [`Element::Value`].
    pub fn into_value(self) -> Option<V> {
        match self {
            Self::Value(v) => Some(v),
            Self::Batch(_) => None,
        }
    }

    /// The nested collection, if this is [`Element::Batch`].
    pub fn into_batch(self) -> Option<Collection<V>> {
        match self {
            Self::Value(_) => None,
            Self::Batch(c) => Some(c),
        }
    }
}

impl<V> From<Collection<V>> for Element<V> {
    fn from(batch: Collection<V>) -> Self {
        Self::Batch(batch)
    }
}

/// How one top-level element is scheduled.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    /// A plain value run as a one-element stage.
    Single,
    /// A nested collection of `len` elements run concurrently.
    Batch {
        /// Number of operations started together.
        len: usize,
    },
}

/// The schedule [`async_map`] derives from an input's shape.
///
/// Computed once, read-only. Useful for logging or validating a pipeline
/// before running it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StagePlan {
    shape: Shape,
    staged: bool,
    stages: Vec<(Key, Stage)>,
}

impl StagePlan {
    /// Derive the plan for `collection`.
    pub fn from_collection<V>(collection: &Collection<Element<V>>) -> Self {
        let staged = collection.values().any(Element::is_batch);
        let stages = collection
            .iter()
            .map(|(key, element)| {
                let stage = match element {
                    Element::Value(_) => Stage::Single,
                    Element::Batch(batch) => Stage::Batch { len: batch.len() },
                };
                (key.clone(), stage)
            })
            .collect();
        Self {
            shape: collection.shape(),
            staged,
            stages,
        }
    }

    /// True if the input holds at least one batch and runs stage by stage.
    ///
    /// When false, every value runs in a single parallel stage.
    pub fn is_staged(&self) -> bool {
        self.staged
    }

    /// Number of serial stages that will run.
    pub fn len(&self) -> usize {
        match (self.staged, self.stages.is_empty()) {
            (true, _) => self.stages.len(),
            (false, true) => 0,
            (false, false) => 1,
        }
    }

    /// True if nothing will run.
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Shape of the top-level input, and of the result.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Per-element schedule in enumeration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&Key, Stage)> + '_ {
        self.stages.iter().map(|(k, s)| (k, *s))
    }
}

/// Map `op` over a pipeline of values and batches.
///
/// See the [module documentation](self) for scheduling.
/// Stages never overlap: every operation of a stage has completed before any
/// operation of the next stage starts.
///
/// The operation's future may not borrow from the [`Item`]; copy what it
/// needs out of the item before returning.
pub async fn async_map<V, R, F, Fut>(
    collection: Collection<Element<V>>,
    op: F,
) -> Collection<Element<R>>
where
    F: FnMut(Item<'_, V>) -> Fut,
    Fut: Future<Output = R>,
{
    let plan = StagePlan::from_collection(&collection);
    let span = debug_span!(
        "async_map",
        len = collection.len(),
        shape = %collection.shape(),
        staged = plan.is_staged(),
        stages = plan.len()
    );
    async move {
        if plan.is_staged() {
            run_staged(collection, op).await
        } else {
            run_flat(collection, op).await
        }
    }
    .instrument(span)
    .await
}

async fn run_flat<V, R, F, Fut>(
    collection: Collection<Element<V>>,
    mut op: F,
) -> Collection<Element<R>>
where
    F: FnMut(Item<'_, V>) -> Fut,
    Fut: Future<Output = R>,
{
    let mut values: Collection<V> = collection.empty_like();
    for (key, element) in collection {
        if let Element::Value(v) = element {
            values.insert(key, v);
        }
    }
    let results = parallel_map(&values, |item| op(item)).await;
    let mut out = results.empty_like();
    for (key, r) in results {
        out.insert(key, Element::Value(r));
    }
    out
}

async fn run_staged<V, R, F, Fut>(
    collection: Collection<Element<V>>,
    op: F,
) -> Collection<Element<R>>
where
    F: FnMut(Item<'_, V>) -> Fut,
    Fut: Future<Output = R>,
{
    let mut stages: Collection<Collection<V>> = collection.empty_like();
    let mut singles = Vec::with_capacity(collection.len());
    for (key, element) in collection {
        let (batch, single) = match element {
            Element::Value(v) => (Collection::sequence([v]), true),
            Element::Batch(batch) => (batch, false),
        };
        stages.insert(key, batch);
        singles.push(single);
    }

    // Stages run one at a time and the batch closure borrows `op` only while
    // starting operations, so the borrow is never held across an await.
    let op = RefCell::new(op);
    let results = serial_map(&stages, |stage| {
        let op = &op;
        async move {
            debug!(stage = %stage.key, width = stage.value.len(), "stage starting");
            let out = parallel_map(stage.value, |item| (&mut *op.borrow_mut())(item)).await;
            ControlFlow::Continue(out)
        }
    })
    .await;

    let mut out = results.empty_like();
    for ((key, batch), single) in results.into_iter().zip(singles) {
        let element = if single {
            match batch.into_values().pop() {
                Some(r) => Element::Value(r),
                None => continue,
            }
        } else {
            Element::Batch(batch)
        };
        out.insert(key, element);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec;
    use core::time::Duration;
    use futures::executor::block_on;

    #[derive(Clone, Debug, PartialEq, Eq)]
    enum Event {
        Start(char),
        Done(char),
    }

    fn pos(log: &[Event], e: &Event) -> usize {
        log.iter().position(|x| x == e).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn batches_run_concurrently_and_stages_serially() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let input = Collection::sequence([
            Element::Batch(Collection::sequence(['a', 'b'])),
            Element::Batch(Collection::sequence(['c', 'd'])),
        ]);
        let out = async_map(input, |item| {
            let log = log.clone();
            let c = *item.value;
            async move {
                log.borrow_mut().push(Event::Start(c));
                // `a` finishes after `b`; `c` after `d`.
                let ms = if c == 'a' || c == 'c' { 30 } else { 10 };
                tokio::time::sleep(Duration::from_millis(ms)).await;
                log.borrow_mut().push(Event::Done(c));
                c.to_ascii_uppercase()
            }
        })
        .await;

        let log = log.borrow();
        assert_eq!(&log[..2], &[Event::Start('a'), Event::Start('b')]);
        let second_stage = pos(&log, &Event::Start('c')).min(pos(&log, &Event::Start('d')));
        assert!(pos(&log, &Event::Done('a')) < second_stage);
        assert!(pos(&log, &Event::Done('b')) < second_stage);
        assert!(pos(&log, &Event::Start('d')) < pos(&log, &Event::Done('c')));

        let stages: Vec<Vec<char>> = out
            .into_values()
            .into_iter()
            .map(|e| e.into_batch().unwrap().into_values())
            .collect();
        assert_eq!(stages, vec![vec!['A', 'B'], vec!['C', 'D']]);
    }

    #[test]
    fn flat_input_is_one_parallel_stage() {
        let input = Collection::sequence([Element::Value(1), Element::Value(2), Element::Value(3)]);
        let plan = StagePlan::from_collection(&input);
        assert!(!plan.is_staged());
        assert_eq!(plan.len(), 1);

        let started = RefCell::new(0);
        let out = block_on(async_map(input, |item| {
            *started.borrow_mut() += 1;
            let v = *item.value;
            async move { v * 10 }
        }));
        assert_eq!(*started.borrow(), 3);
        let values: Vec<_> = out
            .into_values()
            .into_iter()
            .map(|e| e.into_value().unwrap())
            .collect();
        assert_eq!(values, vec![10, 20, 30]);
    }

    #[test]
    fn singletons_in_staged_input_flatten_back() {
        let input = Collection::sequence([
            Element::Value(String::from("first")),
            Element::Batch(Collection::sequence([String::from("x"), String::from("yy")])),
            Element::Value(String::from("last")),
        ]);
        let plan = StagePlan::from_collection(&input);
        assert!(plan.is_staged());
        assert_eq!(plan.len(), 3);
        let kinds: Vec<_> = plan.iter().map(|(_, s)| s).collect();
        assert_eq!(kinds, vec![Stage::Single, Stage::Batch { len: 2 }, Stage::Single]);

        let out = block_on(async_map(input, |item| {
            let n = item.value.len();
            async move { n }
        }));
        let out = out.into_values();
        assert_eq!(out[0], Element::Value(5));
        assert_eq!(out[1], Element::Batch(Collection::sequence([1, 2])));
        assert_eq!(out[2], Element::Value(4));
    }

    #[test]
    fn mapping_top_level_keeps_names() {
        let input = Collection::mapping([
            ("setup", Element::Value(1)),
            ("fan_out", Element::Batch(Collection::mapping([("l", 2), ("r", 3)]))),
        ]);
        let out = block_on(async_map(input, |item| {
            let v = *item.value;
            async move { v + 100 }
        }));
        assert_eq!(out.shape(), Shape::Mapping);
        assert_eq!(out.get(&Key::from("setup")), Some(&Element::Value(101)));
        let fan_out = out
            .get(&Key::from("fan_out"))
            .cloned()
            .unwrap()
            .into_batch()
            .unwrap();
        assert_eq!(fan_out.shape(), Shape::Mapping);
        assert_eq!(fan_out.get(&Key::from("r")), Some(&103));
    }

    #[test]
    fn empty_pipeline_completes() {
        let input: Collection<Element<u8>> = Collection::default();
        let plan = StagePlan::from_collection(&input);
        assert!(plan.is_empty());
        assert_eq!(plan.len(), 0);
        let out = block_on(async_map(input, |item| {
            let v = *item.value;
            async move { v }
        }));
        assert!(out.is_empty());
    }

    #[test]
    fn empty_batch_stage_still_completes() {
        let input = Collection::sequence([
            Element::Batch(Collection::sequence([])),
            Element::Value(7_u8),
        ]);
        let out = block_on(async_map(input, |item| {
            let v = *item.value;
            async move { v }
        }));
        let out = out.into_values();
        assert_eq!(out[0], Element::Batch(Collection::sequence([])));
        assert_eq!(out[1], Element::Value(7));
    }
}
