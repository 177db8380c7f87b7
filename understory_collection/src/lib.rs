// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_collection --heading-base-level=0

//! Understory Collection: one keyed view over sequences, mappings, and text.
//!
//! Understory Collection is the shape layer underneath the `understory_iterate` executors.
//!
//! - Normalizes a sequence, a mapping, or a string into ordered `(key, value)` entries.
//! - Answers key enumeration, membership, and per-key reads in `O(log n)`.
//! - Builds an empty result of the same [`Shape`] and fills it by key, so a mapped
//!   sequence stays a sequence and a mapped mapping keeps its names.
//!   Mapped text becomes a sequence until its fragments are joined back.
//!
//! The shape is resolved once when a [`Collection`] is built.
//! Nothing downstream branches on "is this an array or an object" again.
//!
//! # Example
//!
//! ```rust
//! use understory_collection::{Collection, Key, Shape};
//!
//! let prices = Collection::mapping([("apple", 3), ("pear", 5)]);
//! assert_eq!(prices.shape(), Shape::Mapping);
//! assert_eq!(prices.get(&Key::from("pear")), Some(&5));
//!
//! // Build a result of the same shape, keyed identically.
//! let mut doubled = prices.empty_like();
//! for (k, v) in prices.iter() {
//!     doubled.insert(k.clone(), v * 2);
//! }
//! let names: Vec<_> = doubled.keys().map(ToString::to_string).collect();
//! assert_eq!(names, ["apple", "pear"]);
//! assert_eq!(doubled.get(&Key::from("apple")), Some(&6));
//! ```
//!
//! Text is iterated as characters and can be joined back:
//!
//! ```rust
//! use understory_collection::Collection;
//!
//! let text = Collection::text("abc");
//! let mut shifted = text.empty_like();
//! for (k, c) in text.iter() {
//!     shifted.insert(k.clone(), char::from(*c as u8 + 1));
//! }
//! assert_eq!(shifted.into_text(), "bcd");
//! ```
//!
//! ## Sparse sequences
//!
//! [`Collection::sparse`] keeps only the indices that hold a value.
//! Length is the number of materialized indices, and iteration skips the holes.
//!
//! ## Contract
//!
//! The adapter does no defensive type checking of its own.
//! Keys that cannot address a shape are coerced or handed back as documented on [`Collection::insert`].
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod collection;
pub mod key;
pub mod text;

pub use collection::Collection;
pub use key::{Key, Shape};
pub use text::TextFragment;
