// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The [`Collection`] container: ordered keyed entries plus a [`Shape`].

use alloc::collections::BTreeMap;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::key::{Key, Shape};
use crate::text::TextFragment;

/// An ordered set of `(key, value)` entries with a fixed [`Shape`].
///
/// ## Enumeration order
///
/// - [`Shape::Sequence`] and [`Shape::Text`]: ascending index. Sparse
///   sequences enumerate only the indices that hold a value.
/// - [`Shape::Mapping`]: insertion order. Replacing the value of an existing
///   name keeps its original position.
///
/// ## Results
///
/// Executors build their results with [`Collection::empty_like`] and
/// [`Collection::insert`], so a sequence maps to a sequence and a mapping
/// keeps its names. A text input maps to a sequence; when the produced values
/// are text fragments, [`Collection::into_text_shape`] tags the result as text
/// again and [`Collection::into_text`] joins it back into a string.
///
/// Lookups by key are `O(log n)`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collection<V> {
    shape: Shape,
    entries: Vec<(Key, V)>,
    // Mapping only: name → position in `entries`.
    names: BTreeMap<String, usize>,
}

impl<V> Default for Collection<V> {
    fn default() -> Self {
        Self::new(Shape::Sequence)
    }
}

impl<V> Collection<V> {
    /// Create an empty collection of the given shape.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            entries: Vec::new(),
            names: BTreeMap::new(),
        }
    }

    /// Build a dense sequence; keys are `0..n`.
    pub fn sequence(values: impl IntoIterator<Item = V>) -> Self {
        Self {
            shape: Shape::Sequence,
            entries: values
                .into_iter()
                .enumerate()
                .map(|(i, v)| (Key::Index(i), v))
                .collect(),
            names: BTreeMap::new(),
        }
    }

    /// Build a sparse sequence from `(index, value)` pairs.
    ///
    /// Pairs may arrive in any order. When an index repeats, the last value wins.
    pub fn sparse(pairs: impl IntoIterator<Item = (usize, V)>) -> Self {
        let mut pairs: Vec<(usize, V)> = pairs.into_iter().collect();
        // Stable, so equal indices keep their arrival order.
        pairs.sort_by_key(|(i, _)| *i);
        let mut entries: Vec<(Key, V)> = Vec::with_capacity(pairs.len());
        for (i, v) in pairs {
            match entries.last_mut() {
                Some((Key::Index(last), slot)) if *last == i => *slot = v,
                _ => entries.push((Key::Index(i), v)),
            }
        }
        Self {
            shape: Shape::Sequence,
            entries,
            names: BTreeMap::new(),
        }
    }

    /// Build a mapping from `(name, value)` pairs in insertion order.
    ///
    /// A repeated name replaces the earlier value in place.
    pub fn mapping<N: Into<String>>(pairs: impl IntoIterator<Item = (N, V)>) -> Self {
        let mut out = Self::new(Shape::Mapping);
        for (name, v) in pairs {
            out.insert(Key::Name(name.into()), v);
        }
        out
    }

    /// The shape this collection was built with.
    pub fn shape(&self) -> Shape {
        self.shape
    }

    /// Number of enumerable keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate `(key, value)` pairs in enumeration order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Key, &V)> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Iterate keys in enumeration order.
    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &Key> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(k, _)| k)
    }

    /// Iterate values in enumeration order.
    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.entries.iter().map(|(_, v)| v)
    }

    /// Entry at `position` in enumeration order.
    pub fn entry(&self, position: usize) -> Option<(&Key, &V)> {
        self.entries.get(position).map(|(k, v)| (k, v))
    }

    /// Enumeration position of `key`, if present.
    pub fn position(&self, key: &Key) -> Option<usize> {
        match (self.shape, key) {
            (Shape::Mapping, Key::Name(n)) => self.names.get(n.as_str()).copied(),
            (Shape::Sequence | Shape::Text, Key::Index(i)) => self.search(*i).ok(),
            _ => None,
        }
    }

    /// True if `key` is an enumerable key of this collection.
    pub fn contains_key(&self, key: &Key) -> bool {
        self.position(key).is_some()
    }

    /// Value stored under `key`.
    pub fn get(&self, key: &Key) -> Option<&V> {
        self.position(key).map(|p| &self.entries[p].1)
    }

    /// Mutable value stored under `key`.
    pub fn get_mut(&mut self, key: &Key) -> Option<&mut V> {
        self.position(key).map(|p| &mut self.entries[p].1)
    }

    /// An empty collection ready to receive results keyed like `self`.
    ///
    /// Sequences and mappings keep their shape. Text becomes a sequence with
    /// the same index keys, since arbitrary results are not characters.
    pub fn empty_like<R>(&self) -> Collection<R> {
        let shape = match self.shape {
            Shape::Text => Shape::Sequence,
            shape => shape,
        };
        Collection {
            shape,
            entries: Vec::with_capacity(self.entries.len()),
            names: BTreeMap::new(),
        }
    }

    /// Insert `value` under `key`, returning the value it replaced.
    ///
    /// Keys are coerced to this collection's shape:
    /// - A mapping stores an [`Index`](Key::Index) key under its decimal name.
    /// - A sequence or text accepts a [`Name`](Key::Name) only when it is a
    ///   decimal index. Any other name is not an enumerable key of a
    ///   positional collection; nothing is stored and `Some(value)` is handed back.
    ///
    /// Positional entries stay sorted by index, so appending in ascending
    /// order is amortized `O(1)`.
    pub fn insert(&mut self, key: Key, value: V) -> Option<V> {
        match (self.shape, key) {
            (Shape::Mapping, Key::Name(n)) => self.insert_name(n, value),
            (Shape::Mapping, Key::Index(i)) => self.insert_name(i.to_string(), value),
            (Shape::Sequence | Shape::Text, Key::Index(i)) => self.insert_index(i, value),
            (Shape::Sequence | Shape::Text, Key::Name(n)) => match n.parse::<usize>() {
                Ok(i) => self.insert_index(i, value),
                Err(_) => Some(value),
            },
        }
    }

    /// Consume into `(key, value)` pairs in enumeration order.
    pub fn into_entries(self) -> Vec<(Key, V)> {
        self.entries
    }

    /// Consume into values in enumeration order, dropping keys.
    pub fn into_values(self) -> Vec<V> {
        self.entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Consume into a dense sequence of the values, whatever the original shape.
    pub fn into_sequence(self) -> Self {
        Self::sequence(self.into_values())
    }

    fn search(&self, index: usize) -> Result<usize, usize> {
        // Positional entries only ever hold `Key::Index`.
        self.entries.binary_search_by(|(k, _)| match k {
            Key::Index(i) => i.cmp(&index),
            Key::Name(_) => core::cmp::Ordering::Greater,
        })
    }

    fn insert_index(&mut self, index: usize, value: V) -> Option<V> {
        match self.search(index) {
            Ok(p) => Some(core::mem::replace(&mut self.entries[p].1, value)),
            Err(p) => {
                self.entries.insert(p, (Key::Index(index), value));
                None
            }
        }
    }

    fn insert_name(&mut self, name: String, value: V) -> Option<V> {
        if let Some(&p) = self.names.get(name.as_str()) {
            return Some(core::mem::replace(&mut self.entries[p].1, value));
        }
        self.names.insert(name.clone(), self.entries.len());
        self.entries.push((Key::Name(name), value));
        None
    }
}

impl Collection<char> {
    /// View `text` as a [`Shape::Text`] collection of its characters.
    pub fn text(text: &str) -> Self {
        Self {
            shape: Shape::Text,
            entries: text
                .chars()
                .enumerate()
                .map(|(i, c)| (Key::Index(i), c))
                .collect(),
            names: BTreeMap::new(),
        }
    }
}

impl<V: TextFragment> Collection<V> {
    /// Join the values, in enumeration order, into a string.
    ///
    /// This is how a text input comes back as text after a map whose
    /// operation produced characters or strings.
    pub fn into_text(self) -> String {
        let mut out = String::with_capacity(self.entries.len());
        for (_, v) in &self.entries {
            v.push_onto(&mut out);
        }
        out
    }

    /// Tag a positional collection of text fragments as [`Shape::Text`].
    ///
    /// Mappings are returned unchanged.
    pub fn into_text_shape(mut self) -> Self {
        if self.shape.is_positional() {
            self.shape = Shape::Text;
        }
        self
    }
}

impl<V> From<Vec<V>> for Collection<V> {
    fn from(values: Vec<V>) -> Self {
        Self::sequence(values)
    }
}

impl<V> FromIterator<V> for Collection<V> {
    fn from_iter<I: IntoIterator<Item = V>>(iter: I) -> Self {
        Self::sequence(iter)
    }
}

impl<V> IntoIterator for Collection<V> {
    type Item = (Key, V);
    type IntoIter = alloc::vec::IntoIter<(Key, V)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
