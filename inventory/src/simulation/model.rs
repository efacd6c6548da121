//! Reference model of the inventory store.
//!
//! The model keeps the expected records in a `BTreeMap` and applies each
//! [`Operation`] with the same rules the store enforces, producing the
//! [`Outcome`] the store should report.

use std::collections::BTreeMap;

use crate::listing;
use crate::storage::{StoreError, validate_category};
use crate::types::{ItemId, Record};

use super::operation_gen::Operation;

/// Which rule rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    DuplicateKey,
    DuplicateName,
    IdMismatch,
    InvalidRecord,
    InvalidCategory,
    IdsExhausted,
}

/// Observable result of one operation.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created,
    Found(Option<Record>),
    Changed(bool),
    Listed(Vec<Record>),
    Allocated(ItemId),
    Rejected(Rejection),
    /// The storage backend failed.
    Faulted,
}

impl Outcome {
    /// Classify a store error.
    #[must_use]
    pub const fn from_error(error: &StoreError) -> Self {
        match error {
            StoreError::Storage(_) => Self::Faulted,
            StoreError::DuplicateKey { .. } => Self::Rejected(Rejection::DuplicateKey),
            StoreError::DuplicateName { .. } => Self::Rejected(Rejection::DuplicateName),
            StoreError::IdMismatch { .. } => Self::Rejected(Rejection::IdMismatch),
            StoreError::InvalidRecord(_) => Self::Rejected(Rejection::InvalidRecord),
            StoreError::InvalidCategory { .. } => Self::Rejected(Rejection::InvalidCategory),
            StoreError::IdsExhausted => Self::Rejected(Rejection::IdsExhausted),
        }
    }
}

/// Expected store contents.
#[derive(Debug, Default)]
pub struct ModelInventory {
    records: BTreeMap<ItemId, Record>,
    enforce_unique_names: bool,
}

impl ModelInventory {
    #[must_use]
    pub fn new(enforce_unique_names: bool) -> Self {
        Self {
            records: BTreeMap::new(),
            enforce_unique_names,
        }
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Apply an operation and return what the store should report.
    pub fn apply(&mut self, operation: &Operation) -> Outcome {
        match operation {
            Operation::Create(record) => self.create(record),
            Operation::Read(id) => Outcome::Found(self.records.get(id).cloned()),
            Operation::Update(id, record) => self.update(*id, record),
            Operation::Delete(id) => Outcome::Changed(self.records.remove(id).is_some()),
            Operation::FindByName(name) => Outcome::Found(
                self.records
                    .values()
                    .find(|record| record.name_matches(name))
                    .cloned(),
            ),
            Operation::ListAll => Outcome::Listed(
                listing::sorted_for_display(self.records.values().cloned()).into_vec(),
            ),
            Operation::NextId => match self.records.keys().next_back() {
                Some(last) => last
                    .next()
                    .map_or(Outcome::Rejected(Rejection::IdsExhausted), Outcome::Allocated),
                None => Outcome::Allocated(ItemId::FIRST),
            },
        }
    }

    fn create(&mut self, record: &Record) -> Outcome {
        if let Some(rejection) = Self::check_input(record) {
            return Outcome::Rejected(rejection);
        }
        if self.records.contains_key(&record.id) {
            return Outcome::Rejected(Rejection::DuplicateKey);
        }
        if self.name_taken(record) {
            return Outcome::Rejected(Rejection::DuplicateName);
        }
        self.records.insert(record.id, record.clone());
        Outcome::Created
    }

    fn update(&mut self, id: ItemId, record: &Record) -> Outcome {
        if record.id != id {
            return Outcome::Rejected(Rejection::IdMismatch);
        }
        if let Some(rejection) = Self::check_input(record) {
            return Outcome::Rejected(rejection);
        }
        if !self.records.contains_key(&id) {
            return Outcome::Changed(false);
        }
        if self.name_taken(record) {
            return Outcome::Rejected(Rejection::DuplicateName);
        }
        self.records.insert(id, record.clone());
        Outcome::Changed(true)
    }

    fn check_input(record: &Record) -> Option<Rejection> {
        if record.validate().is_err() {
            Some(Rejection::InvalidRecord)
        } else if validate_category(&record.category).is_err() {
            Some(Rejection::InvalidCategory)
        } else {
            None
        }
    }

    fn name_taken(&self, record: &Record) -> bool {
        self.enforce_unique_names
            && self
                .records
                .values()
                .any(|other| other.id != record.id && other.name_matches(&record.name))
    }
}
