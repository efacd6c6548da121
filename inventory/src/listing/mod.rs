//! Display ordering for record listings.
//!
//! Listing drains the merged index into a [`DisplaySequence`] and reorders
//! it by (category, name) with a stable merge sort, so records that share
//! both keys stay in ascending id order.

mod merge_sort;
mod sequence;

pub use merge_sort::merge_sort_by;
pub use sequence::{DEFAULT_CAPACITY, DisplaySequence, IndexOutOfBounds};

use crate::types::Record;
use std::cmp::Ordering;

/// Order records by category, then by name. Both comparisons are ordinal
/// and case-sensitive.
pub fn by_category_then_name(a: &Record, b: &Record) -> Ordering {
    a.category
        .cmp(&b.category)
        .then_with(|| a.name.cmp(&b.name))
}

/// Collect records into a sequence sorted for display.
pub fn sorted_for_display<I>(records: I) -> DisplaySequence<Record>
where
    I: IntoIterator<Item = Record>,
{
    let mut sequence: DisplaySequence<Record> = records.into_iter().collect();
    sequence.sort_by(by_category_then_name);
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    fn item(id: u64, name: &str, category: &str) -> Record {
        Record::new(ItemId(id), name, category, 1, 1.0, "Acme")
    }

    fn keys(sequence: &DisplaySequence<Record>) -> Vec<(u64, &str, &str)> {
        sequence
            .iter()
            .map(|r| (r.id.get(), r.category.as_str(), r.name.as_str()))
            .collect()
    }

    #[test]
    fn test_category_then_name() {
        let sorted = sorted_for_display([item(1, "x", "B"), item(2, "y", "A"), item(3, "x", "A")]);
        assert_eq!(
            keys(&sorted),
            vec![(3, "A", "x"), (2, "A", "y"), (1, "B", "x")]
        );
    }

    #[test]
    fn test_equal_keys_keep_input_order() {
        let sorted = sorted_for_display([
            item(1, "x", "A"),
            item(2, "a", "B"),
            item(3, "x", "A"),
            item(4, "x", "A"),
        ]);
        assert_eq!(
            keys(&sorted),
            vec![(1, "A", "x"), (3, "A", "x"), (4, "A", "x"), (2, "B", "a")]
        );
    }

    #[test]
    fn test_comparison_is_case_sensitive() {
        let sorted = sorted_for_display([item(1, "b", "tools"), item(2, "a", "Tools")]);
        assert_eq!(keys(&sorted), vec![(2, "Tools", "a"), (1, "tools", "b")]);
    }
}
