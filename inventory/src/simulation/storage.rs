//! Simulated in-memory storage for deterministic testing.
//!
//! This module provides an in-memory implementation of the `Storage` trait
//! with support for fault injection:
//! - Read errors
//! - Write errors
//! - Partial writes (the blob is silently truncated)

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::storage::io::{Storage, StorageError};

/// Configuration for fault injection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultConfig {
    /// Probability of a read error (0.0 - 1.0).
    pub read_error_rate: f64,
    /// Probability of a write error (0.0 - 1.0).
    pub write_error_rate: f64,
    /// Probability of a partial write (0.0 - 1.0).
    pub partial_write_rate: f64,
}

impl FaultConfig {
    /// Create a fault config with no faults (for baseline testing).
    #[must_use]
    pub fn no_faults() -> Self {
        Self::default()
    }

    /// Create a fault config with low fault rates (for stress testing).
    #[must_use]
    pub const fn low_faults() -> Self {
        Self {
            read_error_rate: 0.001,
            write_error_rate: 0.001,
            partial_write_rate: 0.001,
        }
    }

    /// Create a fault config with high fault rates (for extreme testing).
    #[must_use]
    pub const fn high_faults() -> Self {
        Self {
            read_error_rate: 0.05,
            write_error_rate: 0.05,
            partial_write_rate: 0.05,
        }
    }
}

/// In-memory storage implementation for deterministic testing.
///
/// Categories live in a `BTreeMap`, so listing order is stable across runs.
/// Faults are drawn from a seeded RNG: the same seed and the same sequence
/// of calls produce the same faults.
pub struct SimulatedStorage {
    categories: BTreeMap<String, String>,
    fault_config: FaultConfig,
    rng: StdRng,
    stats: SimulatedStorageStats,
}

/// Statistics about simulated storage operations.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SimulatedStorageStats {
    /// Number of category reads.
    pub reads: u64,
    /// Number of category writes.
    pub writes: u64,
    /// Number of category listings.
    pub listings: u64,
    /// Number of injected read errors.
    pub injected_read_errors: u64,
    /// Number of injected write errors.
    pub injected_write_errors: u64,
    /// Number of partial writes.
    pub partial_writes: u64,
}

impl SimulatedStorageStats {
    /// Total number of faults injected so far.
    #[must_use]
    pub const fn injected_faults(&self) -> u64 {
        self.injected_read_errors + self.injected_write_errors + self.partial_writes
    }
}

impl SimulatedStorage {
    /// Create a new simulated storage with the given seed and no faults.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self::with_config(seed, FaultConfig::default())
    }

    /// Create a new simulated storage with custom fault configuration.
    #[must_use]
    pub fn with_config(seed: u64, fault_config: FaultConfig) -> Self {
        Self {
            categories: BTreeMap::new(),
            fault_config,
            rng: StdRng::seed_from_u64(seed),
            stats: SimulatedStorageStats::default(),
        }
    }

    /// Get the current statistics.
    #[must_use]
    pub const fn stats(&self) -> &SimulatedStorageStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = SimulatedStorageStats::default();
    }

    /// Update the fault configuration.
    pub fn set_fault_config(&mut self, config: FaultConfig) {
        self.fault_config = config;
    }

    /// Every stored category and its contents, bypassing fault injection.
    #[must_use]
    pub const fn snapshot(&self) -> &BTreeMap<String, String> {
        &self.categories
    }

    fn should_inject_fault(&mut self, rate: f64) -> bool {
        if rate <= 0.0 {
            return false;
        }
        self.rng.random::<f64>() < rate
    }

    /// Cut `contents` at a random character boundary.
    fn make_partial_write(&mut self, contents: &str) -> String {
        let mut cutoff = self.rng.random_range(0..=contents.len());
        while !contents.is_char_boundary(cutoff) {
            cutoff -= 1;
        }
        contents[..cutoff].to_string()
    }
}

impl Storage for SimulatedStorage {
    fn read_category(&mut self, category: &str) -> Result<Option<String>, StorageError> {
        self.stats.reads += 1;

        if self.should_inject_fault(self.fault_config.read_error_rate) {
            self.stats.injected_read_errors += 1;
            return Err(StorageError::InjectedFault(format!(
                "simulated read error on '{category}'"
            )));
        }

        Ok(self.categories.get(category).cloned())
    }

    fn write_category(&mut self, category: &str, contents: &str) -> Result<(), StorageError> {
        self.stats.writes += 1;

        if self.should_inject_fault(self.fault_config.write_error_rate) {
            self.stats.injected_write_errors += 1;
            return Err(StorageError::InjectedFault(format!(
                "simulated write error on '{category}'"
            )));
        }

        let stored = if self.should_inject_fault(self.fault_config.partial_write_rate) {
            self.stats.partial_writes += 1;
            self.make_partial_write(contents)
        } else {
            contents.to_string()
        };

        self.categories.insert(category.to_string(), stored);
        Ok(())
    }

    fn list_categories(&mut self) -> Result<Vec<String>, StorageError> {
        self.stats.listings += 1;

        if self.should_inject_fault(self.fault_config.read_error_rate) {
            self.stats.injected_read_errors += 1;
            return Err(StorageError::InjectedFault(
                "simulated listing error".to_string(),
            ));
        }

        Ok(self.categories.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write_without_faults() {
        let mut storage = SimulatedStorage::new(42);

        assert_eq!(storage.read_category("Tools").expect("read"), None);
        storage.write_category("Tools", "abc").expect("write");
        storage.write_category("Garden", "def").expect("write");

        assert_eq!(
            storage.read_category("Tools").expect("read").as_deref(),
            Some("abc")
        );
        assert_eq!(
            storage.list_categories().expect("list"),
            vec!["Garden".to_string(), "Tools".to_string()]
        );
        assert_eq!(storage.stats().writes, 2);
        assert_eq!(storage.stats().reads, 2);
        assert_eq!(storage.stats().injected_faults(), 0);
    }

    #[test]
    fn test_injected_read_errors() {
        let mut storage = SimulatedStorage::with_config(
            42,
            FaultConfig {
                read_error_rate: 1.0,
                ..FaultConfig::default()
            },
        );

        assert!(matches!(
            storage.read_category("Tools"),
            Err(StorageError::InjectedFault(_))
        ));
        assert!(storage.list_categories().is_err());
        assert_eq!(storage.stats().injected_read_errors, 2);
    }

    #[test]
    fn test_injected_write_error_keeps_previous_contents() {
        let mut storage = SimulatedStorage::new(42);
        storage.write_category("Tools", "before").expect("write");

        storage.set_fault_config(FaultConfig {
            write_error_rate: 1.0,
            ..FaultConfig::default()
        });
        assert!(storage.write_category("Tools", "after").is_err());
        assert_eq!(storage.snapshot().get("Tools").map(String::as_str), Some("before"));
        assert_eq!(storage.stats().injected_write_errors, 1);
    }

    #[test]
    fn test_partial_write_truncates() {
        let mut storage = SimulatedStorage::with_config(
            7,
            FaultConfig {
                partial_write_rate: 1.0,
                ..FaultConfig::default()
            },
        );
        let contents = "héllo, wörld\nsecond line\n";

        storage.write_category("Tools", contents).expect("write");

        let stored = storage.snapshot().get("Tools").cloned().unwrap_or_default();
        assert!(contents.starts_with(&stored));
        assert_eq!(storage.stats().partial_writes, 1);
    }

    #[test]
    fn test_same_seed_same_faults() {
        let run = |seed| {
            let mut storage = SimulatedStorage::with_config(seed, FaultConfig::high_faults());
            (0..200)
                .map(|i| storage.write_category("Tools", &format!("{i}")).is_ok())
                .collect::<Vec<_>>()
        };

        assert_eq!(run(9), run(9));
    }

    #[test]
    fn test_reset_stats() {
        let mut storage = SimulatedStorage::new(1);
        storage.write_category("Tools", "x").expect("write");
        storage.reset_stats();
        assert_eq!(storage.stats(), &SimulatedStorageStats::default());
    }
}
