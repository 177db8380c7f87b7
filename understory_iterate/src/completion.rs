// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! One-shot completion handles for callback-shaped operations.
//!
//! Executors treat "the operation's future resolved" as "the operation is done".
//! Host code written around a `done` callback, such as an event listener that
//! fires later, can bridge to that model with [`channel`]:
//! hand the [`Done`] to the callback site and return the [`Signal`] as the
//! operation's future.
//!
//! `Done::finish` takes `self`, so a handle completes at most once.
//! A handle dropped without finishing resolves its signal to
//! [`Error::Abandoned`] rather than leaving the run hanging.
//!
//! ```
//! use std::cell::RefCell;
//!
//! use futures::FutureExt;
//! use understory_collection::Collection;
//! use understory_iterate::completion::{self, Done};
//! use understory_iterate::parallel_map;
//!
//! // Stand-in for a host API that reports completion through a callback.
//! fn load_later(path: &str, done: Done<usize>, queue: &RefCell<Vec<(usize, Done<usize>)>>) {
//!     queue.borrow_mut().push((path.len(), done));
//! }
//!
//! let paths = Collection::sequence(["a.txt", "bb.txt"]);
//! let queue = RefCell::new(Vec::new());
//! let mut run = Box::pin(parallel_map(&paths, |item| {
//!     let (done, signal) = completion::channel();
//!     load_later(item.value, done, &queue);
//!     signal
//! }));
//!
//! // Drive the run once: every operation starts, none has finished.
//! let waker = futures::task::noop_waker();
//! let mut cx = std::task::Context::from_waker(&waker);
//! assert!(run.poll_unpin(&mut cx).is_pending());
//! assert_eq!(queue.borrow().len(), 2);
//!
//! // The host fires its callbacks, in any order.
//! let fired: Vec<_> = queue.borrow_mut().drain(..).rev().collect();
//! for (len, done) in fired {
//!     done.finish(len);
//! }
//! let lengths = futures::executor::block_on(run);
//! let lengths: Vec<_> = lengths.into_values().into_iter().map(Result::unwrap).collect();
//! assert_eq!(lengths, [5, 6]);
//! ```

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll, ready};

use futures::FutureExt;
use futures::channel::oneshot;
use tracing::{trace, warn};

use crate::error::Error;

/// Create a connected [`Done`] / [`Signal`] pair.
pub fn channel<R>() -> (Done<R>, Signal<R>) {
    let (tx, rx) = oneshot::channel();
    (Done { tx }, Signal { rx })
}

/// The sending half: call [`finish`](Done::finish) exactly once when the work is complete.
#[derive(Debug)]
pub struct Done<R> {
    tx: oneshot::Sender<R>,
}

impl<R> Done<R> {
    /// Complete the operation with `value`.
    pub fn finish(self, value: R) {
        if self.tx.send(value).is_err() {
            trace!("signal dropped before completion was delivered");
        }
    }

    /// True once nobody is waiting on the paired [`Signal`].
    pub fn is_canceled(&self) -> bool {
        self.tx.is_canceled()
    }
}

/// The receiving half: a future resolving to the value passed to [`Done::finish`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Signal<R> {
    rx: oneshot::Receiver<R>,
}

impl<R> Future for Signal<R> {
    type Output = Result<R, Error>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match ready!(self.rx.poll_unpin(cx)) {
            Ok(value) => Poll::Ready(Ok(value)),
            Err(oneshot::Canceled) => {
                warn!("completion handle dropped without finishing");
                Poll::Ready(Err(Error::Abandoned))
            }
        }
    }
}
