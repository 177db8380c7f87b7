// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Keys and shapes: how an entry is addressed and what kind of collection holds it.

use alloc::string::String;
use core::fmt;

/// Address of a single entry in a [`Collection`](crate::Collection).
///
/// Sequences and text use positional [`Index`](Key::Index) keys.
/// Mappings use [`Name`](Key::Name) keys.
///
/// ## Ordering
///
/// `Index` keys order numerically and sort before every `Name` key.
/// This total order exists for sorting and hashing convenience; the enumeration
/// order of a collection is defined by the collection itself, not by `Ord`.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    /// Position in a sequence or text.
    Index(usize),
    /// Name in a mapping.
    Name(String),
}

impl Key {
    /// Returns the position if this is an [`Index`](Key::Index) key.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Self::Index(i) => Some(*i),
            Self::Name(_) => None,
        }
    }

    /// Returns the name if this is a [`Name`](Key::Name) key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            Self::Index(_) => None,
            Self::Name(n) => Some(n),
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "{i}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

impl From<usize> for Key {
    fn from(i: usize) -> Self {
        Self::Index(i)
    }
}

impl From<&str> for Key {
    fn from(n: &str) -> Self {
        Self::Name(n.into())
    }
}

impl From<String> for Key {
    fn from(n: String) -> Self {
        Self::Name(n)
    }
}

/// The concrete kind of a [`Collection`](crate::Collection).
///
/// The shape is resolved once, when the collection is built, and carried
/// through to results so that a mapped sequence stays a sequence, a mapped
/// mapping stays a mapping, and mapped text can be joined back into a string.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Shape {
    /// Integer keys in ascending order; may be sparse.
    #[default]
    Sequence,
    /// String keys in insertion order.
    Mapping,
    /// A string viewed as a sequence of characters.
    Text,
}

impl Shape {
    /// True for shapes addressed by [`Key::Index`].
    pub const fn is_positional(self) -> bool {
        matches!(self, Self::Sequence | Self::Text)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Sequence => "sequence",
            Self::Mapping => "mapping",
            Self::Text => "text",
        })
    }
}
