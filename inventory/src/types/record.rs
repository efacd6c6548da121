//! The inventory record value type.

use serde::{Deserialize, Serialize};

use crate::types::ItemId;

/// A single inventory record.
///
/// Records are plain values. The store never mutates a field in place; an
/// update supplies a complete new record sharing the same id.
///
/// # Invariants
///
/// Checked by [`Record::validate`]:
/// - `id` is at least 1
/// - `name`, `category` and `supplier` are non-empty
/// - `price` is finite and non-negative
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    pub id: ItemId,
    pub name: String,
    /// Partition key. Each distinct category lives in its own file.
    pub category: String,
    pub quantity: u32,
    pub price: f64,
    pub supplier: String,
}

impl Record {
    /// Create a record from already-validated field values.
    #[must_use]
    pub fn new(
        id: ItemId,
        name: impl Into<String>,
        category: impl Into<String>,
        quantity: u32,
        price: f64,
        supplier: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            category: category.into(),
            quantity,
            price,
            supplier: supplier.into(),
        }
    }

    /// Check the record's field invariants.
    pub fn validate(&self) -> Result<(), RecordError> {
        if !self.id.is_valid() {
            return Err(RecordError::InvalidId(self.id));
        }
        for (field, value) in [
            (Field::Name, &self.name),
            (Field::Category, &self.category),
            (Field::Supplier, &self.supplier),
        ] {
            if value.is_empty() {
                return Err(RecordError::EmptyField(field));
            }
        }
        if !self.price.is_finite() || self.price < 0.0 {
            return Err(RecordError::InvalidPrice(self.price));
        }
        Ok(())
    }

    /// Case-insensitive name comparison used for uniqueness checks.
    #[must_use]
    pub fn name_matches(&self, name: &str) -> bool {
        self.name == name || self.name.to_lowercase() == name.to_lowercase()
    }
}

/// The six record fields, in on-disk order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Name,
    Category,
    Quantity,
    Price,
    Supplier,
}

impl Field {
    /// All fields in the order they are stored.
    pub const ALL: [Self; 6] = [
        Self::Id,
        Self::Name,
        Self::Category,
        Self::Quantity,
        Self::Price,
        Self::Supplier,
    ];

    /// Column name used in the category file header.
    #[must_use]
    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Id => "ItemID",
            Self::Name => "Name",
            Self::Category => "Category",
            Self::Quantity => "Quantity",
            Self::Price => "Price",
            Self::Supplier => "Supplier",
        }
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.column_name())
    }
}

/// A record that violates one of its field invariants.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordError {
    /// The id is zero.
    InvalidId(ItemId),
    /// A text field is empty.
    EmptyField(Field),
    /// The price is negative, infinite or NaN.
    InvalidPrice(f64),
}

impl std::fmt::Display for RecordError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidId(id) => write!(f, "invalid item id {id}: ids start at 1"),
            Self::EmptyField(field) => write!(f, "field {field} must not be empty"),
            Self::InvalidPrice(price) => {
                write!(f, "invalid price {price}: must be finite and non-negative")
            }
        }
    }
}

impl std::error::Error for RecordError {}
