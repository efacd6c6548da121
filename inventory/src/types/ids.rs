//! Item identifier type.
//!
//! Every record in the store is keyed by an `ItemId`. Ids are allocated by
//! the store and are unique across all categories.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A unique identifier for an inventory record.
///
/// # Invariants
///
/// - A valid id is at least 1. Zero is representable so that decoding can
///   report it as an error instead of failing to construct the value.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl ItemId {
    /// The first id handed out by an empty store.
    pub const FIRST: Self = Self(1);

    /// Get the underlying integer.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }

    /// Check whether this id can key a record.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 >= 1
    }

    /// The id immediately after this one, or `None` on overflow.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self.0.checked_add(1) {
            Some(n) => Some(Self(n)),
            None => None,
        }
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ItemId {
    fn from(n: u64) -> Self {
        Self(n)
    }
}

impl From<ItemId> for u64 {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_id_display() {
        assert_eq!(ItemId(42).to_string(), "42");
    }

    #[test]
    fn test_item_id_validity() {
        assert!(!ItemId(0).is_valid());
        assert!(ItemId::FIRST.is_valid());
    }

    #[test]
    fn test_item_id_next() {
        assert_eq!(ItemId(7).next(), Some(ItemId(8)));
        assert_eq!(ItemId(u64::MAX).next(), None);
    }

    #[test]
    fn test_item_id_ordering() {
        let mut ids = vec![ItemId(3), ItemId(1), ItemId(2)];
        ids.sort();
        assert_eq!(ids, vec![ItemId(1), ItemId(2), ItemId(3)]);
    }
}
