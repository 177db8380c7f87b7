// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Time sources for the chunked executor.
//!
//! [`Chunked`](crate::chunked::Chunked) only needs to know how much time has
//! passed since a slice began, so a clock is a monotonic [`Duration`] reading
//! on an arbitrary timeline.
//!
//! - [`SystemClock`] (feature `std`): wall-clock time from [`std::time::Instant`].
//! - [`ManualClock`]: time advanced by the host, for example from a frame clock,
//!   or by a test.

use core::cell::Cell;
use core::time::Duration;

/// A monotonic time source.
pub trait Clock {
    /// Time elapsed since this clock's origin. Must never decrease.
    fn now(&self) -> Duration;
}

impl<C: Clock + ?Sized> Clock for &C {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}

impl<C: Clock + ?Sized> Clock for alloc::rc::Rc<C> {
    #[inline]
    fn now(&self) -> Duration {
        (**self).now()
    }
}

/// Wall-clock time measured from the moment the clock was created.
#[cfg(feature = "std")]
#[derive(Copy, Clone, Debug)]
pub struct SystemClock {
    origin: std::time::Instant,
}

#[cfg(feature = "std")]
impl SystemClock {
    /// Start a clock at the current instant.
    pub fn new() -> Self {
        Self {
            origin: std::time::Instant::now(),
        }
    }
}

#[cfg(feature = "std")]
impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "std")]
impl Clock for SystemClock {
    #[inline]
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// A clock that only moves when told to.
///
/// Single-threaded by construction: share it by reference or `Rc`.
#[derive(Clone, Debug, Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    /// Create a clock reading zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Move the clock forward by `by`.
    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get().saturating_add(by));
    }

    /// Set the reading to `to`; ignored if it would move the clock backwards.
    pub fn set(&self, to: Duration) {
        if to > self.now.get() {
            self.now.set(to);
        }
    }
}

impl Clock for ManualClock {
    #[inline]
    fn now(&self) -> Duration {
        self.now.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_is_monotonic() {
        let c = ManualClock::new();
        assert_eq!(c.now(), Duration::ZERO);
        c.advance(Duration::from_millis(5));
        c.set(Duration::from_millis(2));
        assert_eq!(c.now(), Duration::from_millis(5));
        c.set(Duration::from_millis(9));
        assert_eq!((&c).now(), Duration::from_millis(9));
    }

    #[cfg(feature = "std")]
    #[test]
    fn system_clock_does_not_go_backwards() {
        let c = SystemClock::new();
        let a = c.now();
        let b = c.now();
        assert!(b >= a);
    }
}
