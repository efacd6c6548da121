//! Growable sequence used to reorder records for display.

use crate::listing::merge_sort::merge_sort_by;
use std::cmp::Ordering;

/// Capacity of a sequence created with [`DisplaySequence::new`].
pub const DEFAULT_CAPACITY: usize = 10;

/// Error returned when an index is past the end of the sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexOutOfBounds {
    pub index: usize,
    pub len: usize,
}

impl std::fmt::Display for IndexOutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "index {} out of bounds for sequence of length {}",
            self.index, self.len
        )
    }
}

impl std::error::Error for IndexOutOfBounds {}

/// Ordered, growable collection of display items.
///
/// Capacity doubles whenever a push finds the sequence full, so pushes are
/// amortized O(1). Indexed reads and writes are O(1).
#[derive(Clone, PartialEq)]
pub struct DisplaySequence<T> {
    items: Vec<T>,
}

impl<T> DisplaySequence<T> {
    /// Empty sequence with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Empty sequence with room for `capacity` items (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity.max(1)),
        }
    }

    /// Number of items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the sequence holds no items.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of items the sequence can hold before it grows.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Append an item, doubling the capacity first if the sequence is full.
    pub fn push(&mut self, item: T) {
        if self.items.len() == self.items.capacity() {
            self.items.reserve_exact(self.items.capacity().max(1));
        }
        self.items.push(item);
    }

    /// The item at `index`, or `None` past the end.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Mutable access to the item at `index`, or `None` past the end.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut T> {
        self.items.get_mut(index)
    }

    /// Replace the item at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, item: T) -> Result<T, IndexOutOfBounds> {
        let len = self.items.len();
        match self.items.get_mut(index) {
            Some(slot) => Ok(std::mem::replace(slot, item)),
            None => Err(IndexOutOfBounds { index, len }),
        }
    }

    /// Remove the item at `index`, shifting later items down.
    pub fn remove(&mut self, index: usize) -> Result<T, IndexOutOfBounds> {
        if index < self.items.len() {
            Ok(self.items.remove(index))
        } else {
            Err(IndexOutOfBounds {
                index,
                len: self.items.len(),
            })
        }
    }

    /// Remove every item; capacity is kept.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Iterate over the items in order.
    #[must_use]
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// The items as a slice.
    #[must_use]
    pub const fn as_slice(&self) -> &[T] {
        self.items.as_slice()
    }

    /// Consume the sequence, returning its items in order.
    #[must_use]
    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T: Clone> DisplaySequence<T> {
    /// Stable sort with a caller-supplied comparator.
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&T, &T) -> Ordering,
    {
        merge_sort_by(&mut self.items, compare);
    }
}

impl<T> Default for DisplaySequence<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for DisplaySequence<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(&self.items).finish()
    }
}

impl<T> FromIterator<T> for DisplaySequence<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut sequence = Self::new();
        for item in iter {
            sequence.push(item);
        }
        sequence
    }
}

impl<T> Extend<T> for DisplaySequence<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.push(item);
        }
    }
}

impl<T> IntoIterator for DisplaySequence<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a DisplaySequence<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
