// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Errors reported by this crate.
//!
//! The executors themselves are infallible: an operation reports success by
//! resolving its future. The only failure surfaced as a value is a completion
//! handle that was dropped without being finished.

/// Errors reported by [`Signal`](crate::completion::Signal).
#[derive(Copy, Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The [`Done`](crate::completion::Done) handle was dropped before `finish` was called.
    #[error("completion handle dropped before the operation finished")]
    Abandoned,
}
