// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A single cooperative suspension point.

use core::future::Future;
use core::pin::Pin;
use core::task::{Context, Poll};

/// Give the host executor one turn before continuing.
///
/// The returned future is `Pending` on its first poll and wakes its own task
/// first, so the executor queues the task behind whatever was already ready.
/// It resolves on the next poll.
///
/// Works with any executor; nothing here depends on a particular runtime.
pub fn yield_now() -> YieldNow {
    YieldNow { yielded: false }
}

/// Future returned by [`yield_now`].
#[derive(Debug)]
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct YieldNow {
    yielded: bool,
}

impl Future for YieldNow {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        if self.yielded {
            return Poll::Ready(());
        }
        self.yielded = true;
        cx.waker().wake_by_ref();
        Poll::Pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;
    use futures::task::noop_waker_ref;

    #[test]
    fn pending_once_then_ready() {
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut fut = yield_now();
        assert!(fut.poll_unpin(&mut cx).is_pending());
        assert!(fut.poll_unpin(&mut cx).is_ready());
    }

    #[test]
    fn block_on_completes() {
        futures::executor::block_on(yield_now());
    }
}
