//! Ordered index: an unbalanced binary search tree keyed by `ItemId`.
//!
//! Each node owns its children through `Option<Box<Node>>`, so the tree is
//! a strict hierarchy with no shared links.
//!
//! # Complexity
//!
//! No rebalancing is done. Lookups, insertions and removals are O(log n) on
//! average and O(n) when keys arrive in sorted order. Category files are
//! written in ascending id order, so reloading one produces exactly that
//! degenerate right-leaning chain. For this reason every walk below uses a
//! loop or an explicit stack rather than recursion, and `Drop` dismantles
//! the tree iteratively.

use std::cmp::Ordering;

use crate::types::{ItemId, Record};

type Link = Option<Box<Node>>;

struct Node {
    record: Record,
    left: Link,
    right: Link,
}

impl Node {
    const fn new(record: Record) -> Self {
        Self {
            record,
            left: None,
            right: None,
        }
    }
}

/// Binary search tree of records, ordered by id.
///
/// # Invariants
///
/// - For every node, all ids in the left subtree are strictly smaller and
///   all ids in the right subtree are strictly greater.
/// - No id appears twice.
/// - `len` equals the number of nodes reachable from `root`.
#[derive(Default)]
pub struct OrderedIndex {
    root: Link,
    len: usize,
}

impl OrderedIndex {
    /// Create an empty index.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of records in the index.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Check if the index holds no records.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a record, or replace the stored record with the same id.
    ///
    /// Returns the replaced record, if any. Replacing leaves the size and
    /// the tree shape unchanged.
    pub fn insert_or_replace(&mut self, record: Record) -> Option<Record> {
        let mut link = &mut self.root;
        while let Some(node) = link {
            match record.id.cmp(&node.record.id) {
                Ordering::Less => link = &mut node.left,
                Ordering::Greater => link = &mut node.right,
                Ordering::Equal => return Some(std::mem::replace(&mut node.record, record)),
            }
        }
        *link = Some(Box::new(Node::new(record)));
        self.len += 1;
        None
    }

    /// Remove the record with the given id.
    ///
    /// A node with two children takes over its in-order successor's record
    /// and the successor's node is unlinked from the right subtree.
    /// Returns `false` if the id is not present.
    pub fn remove(&mut self, id: ItemId) -> bool {
        let mut link = &mut self.root;
        loop {
            let ordering = match link.as_deref() {
                None => return false,
                Some(node) => id.cmp(&node.record.id),
            };
            if ordering == Ordering::Equal {
                break;
            }
            let Some(node) = link else {
                return false;
            };
            link = if ordering == Ordering::Less {
                &mut node.left
            } else {
                &mut node.right
            };
        }

        let Some(node) = link.as_mut() else {
            return false;
        };
        if node.left.is_some() && node.right.is_some() {
            if let Some(successor) = take_min(&mut node.right) {
                node.record = successor;
            }
        } else {
            let child = if node.left.is_some() {
                node.left.take()
            } else {
                node.right.take()
            };
            *link = child;
        }

        self.len -= 1;
        true
    }

    /// Look up a record by id.
    #[must_use]
    pub fn find(&self, id: ItemId) -> Option<&Record> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            current = match id.cmp(&node.record.id) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return Some(&node.record),
            };
        }
        None
    }

    /// Find the first record whose name matches, ignoring case.
    ///
    /// The tree is not keyed by name, so this visits every node: O(n).
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&Record> {
        self.iter().find(|record| record.name_matches(name))
    }

    /// The record with the greatest id.
    #[must_use]
    pub fn last(&self) -> Option<&Record> {
        let mut node = self.root.as_deref()?;
        while let Some(right) = node.right.as_deref() {
            node = right;
        }
        Some(&node.record)
    }

    /// In-order iterator over the records (ascending id).
    ///
    /// Calling `iter` again restarts the traversal from the smallest id.
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        let mut iter = Iter { stack: Vec::new() };
        iter.push_left_spine(self.root.as_deref());
        iter
    }

    /// Remove every record.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
    }
}

/// Detach the minimum node of the subtree at `link`, splicing its right
/// child into its place, and return its record.
fn take_min(mut link: &mut Link) -> Option<Record> {
    while link.as_ref().is_some_and(|node| node.left.is_some()) {
        let Some(node) = link else {
            return None;
        };
        link = &mut node.left;
    }
    let node = link.take()?;
    let Node { record, right, .. } = *node;
    *link = right;
    Some(record)
}

impl Drop for OrderedIndex {
    fn drop(&mut self) {
        self.clear();
    }
}

impl std::fmt::Debug for OrderedIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl Extend<Record> for OrderedIndex {
    fn extend<T: IntoIterator<Item = Record>>(&mut self, iter: T) {
        for record in iter {
            self.insert_or_replace(record);
        }
    }
}

impl FromIterator<Record> for OrderedIndex {
    fn from_iter<T: IntoIterator<Item = Record>>(iter: T) -> Self {
        let mut index = Self::new();
        index.extend(iter);
        index
    }
}

/// Borrowing in-order iterator over an [`OrderedIndex`].
pub struct Iter<'a> {
    stack: Vec<&'a Node>,
}

impl<'a> Iter<'a> {
    fn push_left_spine(&mut self, mut node: Option<&'a Node>) {
        while let Some(current) = node {
            self.stack.push(current);
            node = current.left.as_deref();
        }
    }
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Record;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref());
        Some(&node.record)
    }
}

impl<'a> IntoIterator for &'a OrderedIndex {
    type Item = &'a Record;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Owning in-order iterator that drains an [`OrderedIndex`].
pub struct IntoIter {
    stack: Vec<Box<Node>>,
}

impl IntoIter {
    fn push_left_spine(&mut self, mut link: Link) {
        while let Some(mut node) = link {
            link = node.left.take();
            self.stack.push(node);
        }
    }
}

impl Iterator for IntoIter {
    type Item = Record;

    fn next(&mut self) -> Option<Self::Item> {
        let mut node = self.stack.pop()?;
        self.push_left_spine(node.right.take());
        let Node { record, .. } = *node;
        Some(record)
    }
}

impl Drop for IntoIter {
    fn drop(&mut self) {
        while self.next().is_some() {}
    }
}

impl IntoIterator for OrderedIndex {
    type Item = Record;
    type IntoIter = IntoIter;

    fn into_iter(mut self) -> Self::IntoIter {
        let root = self.root.take();
        self.len = 0;
        let mut iter = IntoIter { stack: Vec::new() };
        iter.push_left_spine(root);
        iter
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;

    fn record(id: u64) -> Record {
        Record::new(ItemId(id), format!("item-{id}"), "Tools", 1, 1.0, "Acme")
    }

    fn build(ids: &[u64]) -> OrderedIndex {
        ids.iter().copied().map(record).collect()
    }

    fn ids(index: &OrderedIndex) -> Vec<u64> {
        index.iter().map(|r| r.id.get()).collect()
    }

    fn root_id(index: &OrderedIndex) -> Option<u64> {
        index.root.as_ref().map(|node| node.record.id.get())
    }

    #[test]
    fn test_empty_index() {
        let mut index = OrderedIndex::new();
        assert!(index.is_empty());
        assert_eq!(index.len(), 0);
        assert!(index.find(ItemId(1)).is_none());
        assert!(index.last().is_none());
        assert!(!index.remove(ItemId(1)));
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn test_insert_and_find() {
        let index = build(&[50, 30, 70]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.find(ItemId(30)).map(|r| r.name.as_str()), Some("item-30"));
        assert!(index.find(ItemId(31)).is_none());
    }

    #[test]
    fn test_in_order_traversal_is_ascending() {
        let index = build(&[5, 3, 7, 1, 9, 2, 8, 4, 6]);
        assert_eq!(ids(&index), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
        // Restartable
        assert_eq!(ids(&index), vec![1, 2, 3, 4, 5, 6, 7, 8, 9]);
    }

    #[test]
    fn test_replace_keeps_size_and_shape() {
        let mut index = build(&[50, 30, 70, 20]);
        let mut updated = record(30);
        updated.quantity = 99;

        let old = index.insert_or_replace(updated);
        assert_eq!(old.map(|r| r.quantity), Some(1));
        assert_eq!(index.len(), 4);
        assert_eq!(root_id(&index), Some(50));
        assert_eq!(index.find(ItemId(30)).map(|r| r.quantity), Some(99));
        assert_eq!(ids(&index), vec![20, 30, 50, 70]);
    }

    #[test]
    fn test_remove_leaf() {
        let mut index = build(&[50, 30, 70]);
        assert!(index.remove(ItemId(30)));
        assert_eq!(index.len(), 2);
        assert_eq!(ids(&index), vec![50, 70]);
    }

    #[test]
    fn test_remove_single_child_promotes_child() {
        let mut index = build(&[50, 30, 20]);
        assert!(index.remove(ItemId(30)));
        assert_eq!(ids(&index), vec![20, 50]);
        assert!(index.find(ItemId(20)).is_some());
    }

    #[test]
    fn test_remove_node_with_two_children() {
        let mut index = build(&[50, 30, 70, 20, 40, 60, 80]);
        assert_eq!(ids(&index), vec![20, 30, 40, 50, 60, 70, 80]);

        assert!(index.remove(ItemId(50)));

        assert_eq!(ids(&index), vec![20, 30, 40, 60, 70, 80]);
        assert_eq!(index.len(), 6);
        // In-order successor takes the root's place
        assert_eq!(root_id(&index), Some(60));
        assert!(index.find(ItemId(50)).is_none());
    }

    #[test]
    fn test_remove_two_children_successor_has_right_child() {
        let mut index = build(&[50, 30, 70, 60, 80, 65]);
        assert!(index.remove(ItemId(50)));
        assert_eq!(ids(&index), vec![30, 60, 65, 70, 80]);
        assert_eq!(root_id(&index), Some(60));
        assert!(index.find(ItemId(65)).is_some());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut index = build(&[2, 1, 3]);
        assert!(!index.remove(ItemId(4)));
        assert_eq!(index.len(), 3);
        assert_eq!(ids(&index), vec![1, 2, 3]);
    }

    #[test]
    fn test_remove_root_until_empty() {
        let mut index = build(&[2, 1, 3]);
        assert!(index.remove(ItemId(2)));
        assert!(index.remove(ItemId(1)));
        assert!(index.remove(ItemId(3)));
        assert!(index.is_empty());
        assert!(root_id(&index).is_none());
    }

    #[test]
    fn test_find_by_name_ignores_case() {
        let mut index = build(&[3, 1, 2]);
        index.insert_or_replace(Record::new(ItemId(4), "Hammer", "Tools", 1, 1.0, "Acme"));
        assert_eq!(index.find_by_name("hammer").map(|r| r.id), Some(ItemId(4)));
        assert_eq!(index.find_by_name("ITEM-2").map(|r| r.id), Some(ItemId(2)));
        assert!(index.find_by_name("saw").is_none());
    }

    #[test]
    fn test_last_is_max_id() {
        let index = build(&[3, 7, 2]);
        assert_eq!(index.last().map(|r| r.id), Some(ItemId(7)));
    }

    #[test]
    fn test_clear() {
        let mut index = build(&[3, 7, 2]);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.iter().count(), 0);
    }

    #[test]
    fn test_owning_iterator_is_ascending() {
        let index = build(&[50, 30, 70, 20, 40, 60, 80]);
        let drained: Vec<u64> = index.into_iter().map(|r| r.id.get()).collect();
        assert_eq!(drained, vec![20, 30, 40, 50, 60, 70, 80]);
    }

    #[test]
    fn test_partially_consumed_owning_iterator_drops() {
        let index = build(&[5, 3, 7, 1, 9]);
        let mut iter = index.into_iter();
        assert_eq!(iter.next().map(|r| r.id), Some(ItemId(1)));
        drop(iter);
    }

    #[test]
    fn test_sorted_insertion_does_not_overflow_stack() {
        // Degenerate chain, as produced by reloading a category file.
        let index: OrderedIndex = (1..=10_000).map(record).collect();
        assert_eq!(index.len(), 10_000);
        assert_eq!(index.last().map(|r| r.id), Some(ItemId(10_000)));
        assert!(index.find(ItemId(9_999)).is_some());
        assert_eq!(index.iter().count(), 10_000);
    }

    #[test]
    fn test_random_operations_match_model() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut index = OrderedIndex::new();
        let mut model = BTreeSet::new();

        for _ in 0..5_000 {
            let id = rng.random_range(1..=300u64);
            if rng.random_bool(0.6) {
                let replaced = index.insert_or_replace(record(id)).is_some();
                assert_eq!(replaced, !model.insert(id));
            } else {
                assert_eq!(index.remove(ItemId(id)), model.remove(&id));
            }

            assert_eq!(index.len(), model.len());
        }

        let in_order = ids(&index);
        assert!(in_order.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(in_order, model.iter().copied().collect::<Vec<_>>());
    }
}
