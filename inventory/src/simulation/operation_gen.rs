//! Operation generator for deterministic simulation testing.
//!
//! This module generates random but reproducible sequences of store
//! operations, including both valid and malformed records.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{ItemId, Record};

const CATEGORIES: [&str; 4] = ["Tools", "Garden", "Office", "Kitchen Ware"];
const NAMES: [&str; 6] = ["Widget", "Gadget", "Sprocket", "Flange", "Gizmo", "Doohickey"];
const SUPPLIERS: [&str; 4] = [
    "Acme",
    "Smith, Jones & Co",
    "\"Best\" Parts",
    "North\nSouth Ltd",
];

/// A single operation against the inventory store.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Create(Record),
    Read(ItemId),
    Update(ItemId, Record),
    Delete(ItemId),
    FindByName(String),
    ListAll,
    NextId,
}

/// Configuration for operation generation.
#[derive(Debug, Clone)]
pub struct OperationGenConfig {
    /// Probability of generating a malformed record (0.0 - 1.0).
    pub malformed_rate: f64,
    /// Ids are drawn from `1..=id_pool_size`, so collisions are common.
    pub id_pool_size: u64,
    /// Number of distinct name suffixes per base name.
    pub name_variants: u32,
}

impl Default for OperationGenConfig {
    fn default() -> Self {
        Self {
            malformed_rate: 0.0,
            id_pool_size: 40,
            name_variants: 8,
        }
    }
}

/// Types of malformations that can be generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MalformationType {
    /// Id zero.
    ZeroId,
    /// Empty name.
    EmptyName,
    /// Empty supplier.
    EmptySupplier,
    /// Negative price.
    NegativePrice,
    /// NaN price.
    NanPrice,
    /// Category containing a path separator.
    PathCategory,
    /// Empty category.
    EmptyCategory,
    /// Update whose record id differs from the target id.
    MismatchedId,
}

impl MalformationType {
    /// All malformation types.
    pub const ALL: [Self; 8] = [
        Self::ZeroId,
        Self::EmptyName,
        Self::EmptySupplier,
        Self::NegativePrice,
        Self::NanPrice,
        Self::PathCategory,
        Self::EmptyCategory,
        Self::MismatchedId,
    ];
}

/// Generator for random [`Operation`] sequences.
///
/// This generator produces deterministic sequences of operations given the
/// same seed, enabling reproducible testing.
pub struct OperationGenerator {
    rng: StdRng,
    config: OperationGenConfig,
}

impl OperationGenerator {
    /// Create a new operation generator with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, OperationGenConfig::default())
    }

    /// Create a new operation generator with custom configuration.
    #[must_use]
    pub fn with_config(seed: u64, config: OperationGenConfig) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            config,
        }
    }

    /// Generate the next operation.
    pub fn next_operation(&mut self) -> Operation {
        let roll = self.rng.random_range(0..100);
        match roll {
            0..35 => {
                let id = self.random_id();
                Operation::Create(self.record_maybe_malformed(id, false))
            }
            35..55 => {
                let id = self.random_id();
                Operation::Update(id, self.record_maybe_malformed(id, true))
            }
            55..70 => Operation::Delete(self.random_id()),
            70..80 => Operation::Read(self.random_id()),
            80..88 => Operation::FindByName(self.random_name()),
            88..95 => Operation::ListAll,
            _ => Operation::NextId,
        }
    }

    fn random_id(&mut self) -> ItemId {
        ItemId(self.rng.random_range(1..=self.config.id_pool_size.max(1)))
    }

    fn pick<'a>(&mut self, pool: &[&'a str]) -> &'a str {
        pool[self.rng.random_range(0..pool.len())]
    }

    /// A name from the pool, occasionally upper-cased to exercise
    /// case-insensitive uniqueness.
    fn random_name(&mut self) -> String {
        let base = self.pick(&NAMES);
        let variant = self.rng.random_range(0..self.config.name_variants.max(1));
        let name = format!("{base} {variant}");
        if self.rng.random_bool(0.1) {
            name.to_uppercase()
        } else {
            name
        }
    }

    fn valid_record(&mut self, id: ItemId) -> Record {
        let name = self.random_name();
        let category = self.pick(&CATEGORIES);
        let quantity = self.rng.random_range(0..500);
        let price = f64::from(self.rng.random_range(0..100_000u32)) / 100.0;
        let supplier = self.pick(&SUPPLIERS);
        Record::new(id, name, category, quantity, price, supplier)
    }

    fn record_maybe_malformed(&mut self, id: ItemId, for_update: bool) -> Record {
        let mut record = self.valid_record(id);
        if !self.rng.random_bool(self.config.malformed_rate.clamp(0.0, 1.0)) {
            return record;
        }

        let malformation = MalformationType::ALL[self.rng.random_range(0..MalformationType::ALL.len())];
        match malformation {
            MalformationType::ZeroId => record.id = ItemId(0),
            MalformationType::EmptyName => record.name.clear(),
            MalformationType::EmptySupplier => record.supplier.clear(),
            MalformationType::NegativePrice => record.price = -1.0,
            MalformationType::NanPrice => record.price = f64::NAN,
            MalformationType::PathCategory => record.category = "Tools/../etc".to_string(),
            MalformationType::EmptyCategory => record.category.clear(),
            MalformationType::MismatchedId if for_update => {
                record.id = ItemId(id.get() + self.config.id_pool_size.max(1));
            }
            MalformationType::MismatchedId => record.name.clear(),
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_deterministic() {
        let mut gen1 = OperationGenerator::new(12345);
        let mut gen2 = OperationGenerator::new(12345);

        for _ in 0..200 {
            let (a, b) = (gen1.next_operation(), gen2.next_operation());
            // NaN prices never compare equal, so compare the debug form.
            assert_eq!(format!("{a:?}"), format!("{b:?}"));
        }
    }

    #[test]
    fn test_valid_records_by_default() {
        let mut generator = OperationGenerator::new(7);
        for _ in 0..500 {
            match generator.next_operation() {
                Operation::Create(record) => {
                    assert!(record.validate().is_ok(), "invalid record {record:?}");
                }
                Operation::Update(id, record) => {
                    assert_eq!(record.id, id);
                    assert!(record.validate().is_ok(), "invalid record {record:?}");
                }
                _ => {}
            }
        }
    }

    #[test]
    fn test_malformed_records() {
        let config = OperationGenConfig {
            malformed_rate: 1.0,
            ..OperationGenConfig::default()
        };
        let mut generator = OperationGenerator::with_config(7, config);

        let mut malformed = 0;
        for _ in 0..500 {
            match generator.next_operation() {
                Operation::Create(record) => {
                    let bad_category = record.category.is_empty() || record.category.contains('/');
                    assert!(record.validate().is_err() || bad_category);
                    malformed += 1;
                }
                Operation::Update(id, record) => {
                    let bad_category = record.category.is_empty() || record.category.contains('/');
                    assert!(record.validate().is_err() || bad_category || record.id != id);
                    malformed += 1;
                }
                _ => {}
            }
        }
        assert!(malformed > 0);
    }

    #[test]
    fn test_ids_within_pool() {
        let config = OperationGenConfig {
            id_pool_size: 5,
            ..OperationGenConfig::default()
        };
        let mut generator = OperationGenerator::with_config(3, config);
        for _ in 0..200 {
            if let Operation::Read(id) | Operation::Delete(id) = generator.next_operation() {
                assert!((1..=5).contains(&id.get()));
            }
        }
    }
}
