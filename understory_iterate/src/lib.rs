// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_iterate --heading-base-level=0

//! Understory Iterate: parallel, serial, and time-sliced iteration on one thread.
//!
//! ## Overview
//!
//! This crate applies an operation to every element of a
//! [`Collection`](understory_collection::Collection) under three scheduling disciplines,
//! and composes two of them into staged pipelines.
//! Everything runs on the thread that polls the returned future; there are no
//! worker threads and no runtime requirement.
//!
//! | Discipline | ForEach | Map | Operation |
//! |---|---|---|---|
//! | Parallel: start all, finish when all finish | [`parallel_for_each`] | [`parallel_map`] | async |
//! | Serial: one at a time, may stop early | [`serial_for_each`] | [`serial_map`] | async |
//! | Chunked: time-boxed slices, may stop early | [`nonblocking_for_each`] | [`nonblocking_map`] | sync |
//! | Pipeline: serial stages of parallel batches | | [`async_map`] | async |
//!
//! ## Operations
//!
//! An operation receives an [`Item`]: the element's value, its key, and the collection.
//! Asynchronous operations return a future; the run treats its resolution as
//! "this element is done". Synchronous operations return their result directly.
//! State an operation needs beyond the item is captured by the closure.
//!
//! ## Stopping early
//!
//! Serial and chunked operations return [`ControlFlow`](core::ops::ControlFlow).
//! `Break(())` stops the run, and the elements after it are never visited.
//! ForEach runs report whether they were stopped; Map runs return the results produced so far.
//!
//! ## Results
//!
//! Map runs return a collection of the same [`Shape`](understory_collection::Shape) as the input,
//! keyed identically and in input order, regardless of the order operations finished in.
//! Text inputs map to a sequence. When the results are characters or strings,
//! [`Collection::into_text_shape`](understory_collection::Collection::into_text_shape)
//! tags them as text again and
//! [`Collection::into_text`](understory_collection::Collection::into_text) joins them.
//!
//! ## Example
//!
//! ```
//! use core::ops::ControlFlow;
//! use understory_collection::Collection;
//! use understory_iterate::{parallel_map, serial_for_each};
//!
//! let ids = Collection::sequence([3, 1, 2]);
//!
//! futures::executor::block_on(async {
//!     let squares = parallel_map(&ids, |item| core::future::ready(item.value * item.value)).await;
//!     assert_eq!(squares.into_values(), [9, 1, 4]);
//!
//!     let mut seen = Vec::new();
//!     let flow = serial_for_each(&ids, |item| {
//!         seen.push(*item.value);
//!         core::future::ready(if *item.value == 1 {
//!             ControlFlow::Break(())
//!         } else {
//!             ControlFlow::Continue(())
//!         })
//!     })
//!     .await;
//!     assert!(flow.is_break());
//!     assert_eq!(seen, [3, 1]);
//! });
//! ```
//!
//! ## Callback-shaped hosts
//!
//! Code that reports completion through a callback can use [`completion::channel`]:
//! pass the one-shot [`Done`](completion::Done) to the callback site and return the
//! [`Signal`](completion::Signal) as the operation's future.
//!
//! ## Logging
//!
//! Runs emit [`tracing`] spans and events: a `debug` span per run, `trace` events per
//! element and per cooperative suspension, and `debug` events on stop and completion.
//! Install a subscriber to see them.
//!
//! ## Features
//!
//! - `std` (default): [`SystemClock`](clock::SystemClock), [`Chunked::new`](chunked::Chunked::new),
//!   and the [`nonblocking_for_each`] / [`nonblocking_map`] shorthands.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

#[cfg(any(feature = "std", test))]
extern crate std;

pub mod chunked;
pub mod clock;
pub mod completion;
pub mod error;
pub mod item;
pub mod parallel;
pub mod pipeline;
pub mod serial;
pub mod yield_now;

#[cfg(feature = "std")]
pub use chunked::{nonblocking_for_each, nonblocking_map};
pub use chunked::{Chunked, DEFAULT_BUDGET};
pub use error::Error;
pub use item::Item;
pub use parallel::{parallel_for_each, parallel_map};
pub use pipeline::{Element, StagePlan, async_map};
pub use serial::{serial_for_each, serial_map};
