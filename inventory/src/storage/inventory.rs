//! Collaborator-facing inventory operations.
//!
//! `InventoryStore` layers store-wide rules on top of [`CategoryStore`]:
//! ids and names are unique across every category, updates may move a
//! record between categories, and listings come back in display order.

use crate::config::StoreConfig;
use crate::listing::{self, DisplaySequence};
use crate::storage::category::{CategoryStore, StoreError, validate_category};
use crate::storage::file::DirectoryStorage;
use crate::storage::index::OrderedIndex;
use crate::storage::io::Storage;
use crate::types::{ItemId, Record};

/// Inventory record store over a storage backend.
pub struct InventoryStore<S> {
    categories: CategoryStore<S>,
    enforce_unique_names: bool,
}

impl InventoryStore<DirectoryStorage> {
    /// Open the store rooted at `config.data_directory`, creating the
    /// directory if needed.
    pub fn open(config: &StoreConfig) -> Result<Self, StoreError> {
        let storage = DirectoryStorage::open(&config.data_directory)?;
        tracing::info!(
            "opened inventory at {} (unique names: {})",
            config.data_directory.display(),
            config.enforce_unique_names
        );
        Ok(Self::new(storage).with_unique_names(config.enforce_unique_names))
    }
}

impl<S: Storage> InventoryStore<S> {
    /// Wrap a storage backend. Name uniqueness is enforced by default.
    pub const fn new(storage: S) -> Self {
        Self {
            categories: CategoryStore::new(storage),
            enforce_unique_names: true,
        }
    }

    /// Enable or disable case-insensitive name uniqueness.
    #[must_use]
    pub const fn with_unique_names(mut self, enforce: bool) -> Self {
        self.enforce_unique_names = enforce;
        self
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        self.categories.storage()
    }

    /// The underlying category store.
    pub const fn category_store(&mut self) -> &mut CategoryStore<S> {
        &mut self.categories
    }

    /// Add a new record.
    ///
    /// # Errors
    ///
    /// - [`StoreError::InvalidRecord`] / [`StoreError::InvalidCategory`] for
    ///   bad input
    /// - [`StoreError::DuplicateKey`] if the id exists in any category
    /// - [`StoreError::DuplicateName`] if uniqueness is enforced and another
    ///   record has the same name, ignoring case
    pub fn create(&mut self, record: Record) -> Result<(), StoreError> {
        record.validate()?;
        validate_category(&record.category)?;

        let all = self.categories.read_all()?;
        if let Some(existing) = all.find(record.id) {
            return Err(StoreError::DuplicateKey {
                id: record.id,
                first: existing.category.clone(),
                second: record.category,
            });
        }
        self.check_name_available(&all, &record)?;

        self.categories.write_or_update(&record)?;
        tracing::info!(
            "created item {} '{}' in category '{}'",
            record.id,
            record.name,
            record.category
        );
        Ok(())
    }

    /// The record stored under `id`, if any.
    pub fn read(&mut self, id: ItemId) -> Result<Option<Record>, StoreError> {
        self.categories.find_by_id(id)
    }

    /// Replace the record stored under `id`.
    ///
    /// Returns `Ok(false)` if no record has that id. When the category
    /// changes, the record is written to its new category before it is
    /// removed from the old one, so a failure in between leaves a duplicate
    /// rather than losing the record. Updating that id again clears the
    /// duplicate: every copy outside the new category is removed.
    pub fn update(&mut self, id: ItemId, record: Record) -> Result<bool, StoreError> {
        if record.id != id {
            return Err(StoreError::IdMismatch {
                expected: id,
                found: record.id,
            });
        }
        record.validate()?;
        validate_category(&record.category)?;

        let (all, holders) = self.categories.read_all_locating(id)?;
        if holders.is_empty() {
            return Ok(false);
        }
        self.check_name_available(&all, &record)?;
        warn_if_duplicated(id, &holders);

        self.categories.write_or_update(&record)?;
        for previous_category in holders.iter().filter(|c| **c != record.category) {
            self.categories.delete_from(previous_category, id)?;
            tracing::info!(
                "moved item {} from category '{}' to '{}'",
                id,
                previous_category,
                record.category
            );
        }
        tracing::info!("updated item {}", id);
        Ok(true)
    }

    /// Remove the record stored under `id`. Returns `Ok(false)` if absent.
    ///
    /// An id left in several categories is removed from all of them.
    pub fn delete(&mut self, id: ItemId) -> Result<bool, StoreError> {
        let (_, holders) = self.categories.read_all_locating(id)?;
        warn_if_duplicated(id, &holders);

        let mut removed = false;
        for category in &holders {
            if self.categories.delete_from(category, id)? {
                tracing::info!("deleted item {} from category '{}'", id, category);
                removed = true;
            }
        }
        Ok(removed)
    }

    /// Every record, ordered by category and then name.
    pub fn list_all(&mut self) -> Result<DisplaySequence<Record>, StoreError> {
        let all = self.categories.read_all()?;
        Ok(listing::sorted_for_display(all))
    }

    /// First record, in id order, whose name matches ignoring case.
    pub fn find_by_name(&mut self, name: &str) -> Result<Option<Record>, StoreError> {
        Ok(self.categories.read_all()?.find_by_name(name).cloned())
    }

    /// The id the next created record should use.
    pub fn next_available_id(&mut self) -> Result<ItemId, StoreError> {
        self.categories.next_available_id()
    }

    /// All category names, sorted.
    pub fn categories(&mut self) -> Result<Vec<String>, StoreError> {
        self.categories.categories()
    }

    fn check_name_available(&self, all: &OrderedIndex, record: &Record) -> Result<(), StoreError> {
        if !self.enforce_unique_names {
            return Ok(());
        }
        match all
            .iter()
            .find(|other| other.id != record.id && other.name_matches(&record.name))
        {
            Some(other) => Err(StoreError::DuplicateName {
                name: record.name.clone(),
                existing: other.id,
            }),
            None => Ok(()),
        }
    }
}

fn warn_if_duplicated(id: ItemId, holders: &[String]) {
    if holders.len() > 1 {
        tracing::warn!(
            "item {} is stored in {} categories ({}); clearing the extra copies",
            id,
            holders.len(),
            holders.join(", ")
        );
    }
}
