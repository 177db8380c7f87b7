// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The argument every operation receives.

use understory_collection::{Collection, Key};

/// One element handed to an operation: its value, its key, and the whole collection.
///
/// `Item` is `Copy`, so an operation can keep it around (for example inside the
/// future it returns) without cloning the underlying data.
#[derive(Debug)]
pub struct Item<'a, V> {
    /// The element's value.
    pub value: &'a V,
    /// The element's key.
    pub key: &'a Key,
    /// Enumeration position of the element within `collection`.
    pub position: usize,
    /// The collection being iterated.
    pub collection: &'a Collection<V>,
}

impl<V> Clone for Item<'_, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<V> Copy for Item<'_, V> {}

impl<'a, V> Item<'a, V> {
    /// Every element of `collection`, in enumeration order.
    pub fn all(collection: &'a Collection<V>) -> impl ExactSizeIterator<Item = Self> + 'a {
        collection
            .iter()
            .enumerate()
            .map(move |(position, (key, value))| Self {
                value,
                key,
                position,
                collection,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn all_follows_enumeration_order() {
        let c = Collection::mapping([("z", 1), ("a", 2)]);
        let seen: Vec<_> = Item::all(&c)
            .map(|it| (it.position, it.key.as_name().unwrap(), *it.value))
            .collect();
        assert_eq!(seen, [(0, "z", 1), (1, "a", 2)]);
    }

    #[test]
    fn item_sees_whole_collection() {
        let c = Collection::sequence([1, 2, 3]);
        assert!(Item::all(&c).all(|it| it.collection.len() == 3));
    }
}
