//! Partitioned category store.
//!
//! Every category is one blob in the backing [`Storage`]: a header line and
//! then one encoded record per line, in ascending id order. All mutations
//! follow the same read-modify-rewrite protocol:
//!
//! 1. Load the whole category into a fresh [`OrderedIndex`]
//! 2. Mutate the index
//! 3. Serialize the index in order and overwrite the category wholesale
//!
//! Nothing is cached between calls, so each operation sees the current
//! on-disk state. An interrupted rewrite can leave a truncated file; there
//! is no journal or atomic rename.

use crate::storage::codec::{self, HEADER, LINE_ENDING};
use crate::storage::index::OrderedIndex;
use crate::storage::io::{Storage, StorageError};
use crate::types::{ItemId, Record, RecordError};

/// Maximum length of a category name in bytes (leaves room for `.csv`).
pub const MAX_CATEGORY_LENGTH: usize = 251;

/// Store that maps each category to its own blob and keeps it sorted.
pub struct CategoryStore<S> {
    storage: S,
}

impl<S: Storage> CategoryStore<S> {
    /// Wrap a storage backend.
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Get a reference to the storage backend.
    #[must_use]
    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Get mutable access to the storage backend.
    pub const fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// All category names, sorted.
    pub fn categories(&mut self) -> Result<Vec<String>, StoreError> {
        let mut categories = self.storage.list_categories()?;
        categories.sort();
        Ok(categories)
    }

    /// Load one category into a fresh index.
    ///
    /// A missing category yields an empty index. Lines that fail to decode
    /// are logged and skipped.
    pub fn read_category(&mut self, category: &str) -> Result<OrderedIndex, StoreError> {
        validate_category(category)?;
        self.load(category)
    }

    /// Load every category into one merged index.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::DuplicateKey`] if the same id is stored in two
    /// categories. Ids are meant to be unique store-wide, so this is treated
    /// as corruption rather than resolved by letting one record win.
    pub fn read_all(&mut self) -> Result<OrderedIndex, StoreError> {
        self.merge(None).map(|(merged, _)| merged)
    }

    /// Like [`read_all`](Self::read_all), but also returns every category
    /// holding `id`, in name order.
    ///
    /// `id` may appear in several categories, which happens when a move
    /// between categories was interrupted. The merged index keeps the copy
    /// from the last of those categories. Any other id stored twice is
    /// still a [`StoreError::DuplicateKey`].
    pub fn read_all_locating(
        &mut self,
        id: ItemId,
    ) -> Result<(OrderedIndex, Vec<String>), StoreError> {
        self.merge(Some(id))
    }

    fn merge(
        &mut self,
        locate: Option<ItemId>,
    ) -> Result<(OrderedIndex, Vec<String>), StoreError> {
        let mut merged = OrderedIndex::new();
        let mut holders = Vec::new();
        for category in self.categories()? {
            for record in self.load(&category)? {
                let id = record.id;
                let located = locate == Some(id);
                if located {
                    holders.push(category.clone());
                }
                let second = record.category.clone();
                if let Some(previous) = merged.insert_or_replace(record) {
                    if !located {
                        return Err(StoreError::DuplicateKey {
                            id,
                            first: previous.category,
                            second,
                        });
                    }
                }
            }
        }
        Ok((merged, holders))
    }

    /// Look up a record by id across all categories.
    pub fn find_by_id(&mut self, id: ItemId) -> Result<Option<Record>, StoreError> {
        Ok(self.read_all()?.find(id).cloned())
    }

    /// One greater than the largest id in any category, or 1 if the store
    /// is empty.
    pub fn next_available_id(&mut self) -> Result<ItemId, StoreError> {
        match self.read_all()?.last() {
            Some(record) => record.id.next().ok_or(StoreError::IdsExhausted),
            None => Ok(ItemId::FIRST),
        }
    }

    /// Insert or replace a record in the category named by
    /// `record.category`, then rewrite that category.
    ///
    /// Writing the same record twice leaves the category byte-identical.
    pub fn write_or_update(&mut self, record: &Record) -> Result<(), StoreError> {
        record.validate()?;
        validate_category(&record.category)?;

        let mut index = self.load(&record.category)?;
        let replaced = index.insert_or_replace(record.clone()).is_some();
        self.rewrite(&record.category, &index)?;

        tracing::debug!(
            "{} item {} in category '{}' ({} records)",
            if replaced { "replaced" } else { "inserted" },
            record.id,
            record.category,
            index.len()
        );
        Ok(())
    }

    /// Remove a record from a category and rewrite it.
    ///
    /// Returns `false` without touching storage if the category or the id
    /// does not exist. Removing the last record leaves a header-only file.
    pub fn delete_from(&mut self, category: &str, id: ItemId) -> Result<bool, StoreError> {
        validate_category(category)?;

        let Some(contents) = self.storage.read_category(category)? else {
            return Ok(false);
        };
        let mut index = parse_category(category, &contents);
        if !index.remove(id) {
            return Ok(false);
        }
        self.rewrite(category, &index)?;

        tracing::debug!(
            "removed item {} from category '{}' ({} records left)",
            id,
            category,
            index.len()
        );
        Ok(true)
    }

    fn load(&mut self, category: &str) -> Result<OrderedIndex, StoreError> {
        Ok(self
            .storage
            .read_category(category)?
            .map(|contents| parse_category(category, &contents))
            .unwrap_or_default())
    }

    fn rewrite(&mut self, category: &str, index: &OrderedIndex) -> Result<(), StoreError> {
        self.storage
            .write_category(category, &render_category(index))?;
        Ok(())
    }
}

/// Serialize an index as a complete category file.
#[must_use]
pub fn render_category(index: &OrderedIndex) -> String {
    let mut contents = String::from(HEADER);
    contents.push_str(LINE_ENDING);
    for record in index {
        contents.push_str(&codec::encode_record(record));
        contents.push_str(LINE_ENDING);
    }
    contents
}

/// Parse category file contents into an index, skipping bad lines.
///
/// The header line is optional.
#[must_use]
pub fn parse_category(category: &str, contents: &str) -> OrderedIndex {
    let mut index = OrderedIndex::new();
    let mut lines = codec::record_lines(contents).peekable();

    // A first line that is not the header is decoded like any other line.
    if lines.next_if(|&(_, line)| line == HEADER).is_none() {
        if let Some((_, first)) = lines.peek() {
            tracing::warn!(
                "category '{}' has no header; reading '{}' as a record",
                category,
                first
            );
        }
    }

    for (line_number, line) in lines {
        match codec::decode_record(line) {
            Ok(record) => {
                let id = record.id;
                if index.insert_or_replace(record).is_some() {
                    tracing::warn!(
                        "category '{}' line {}: item {} appears more than once; keeping the later line",
                        category,
                        line_number,
                        id
                    );
                }
            }
            Err(e) => {
                tracing::warn!(
                    "category '{}' line {}: skipping undecodable record: {}",
                    category,
                    line_number,
                    e
                );
            }
        }
    }

    index
}

/// Reason a category name cannot be used as a storage key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryNameError {
    /// The name is empty.
    Empty,
    /// The name exceeds the maximum length.
    TooLong,
    /// The name is `.` or `..`.
    Reserved,
    /// The name contains a path separator, `:` or a control character.
    InvalidCharacter(char),
}

impl std::fmt::Display for CategoryNameError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "category must not be empty"),
            Self::TooLong => write!(
                f,
                "category exceeds maximum length of {MAX_CATEGORY_LENGTH} bytes"
            ),
            Self::Reserved => write!(f, "category must not be '.' or '..'"),
            Self::InvalidCharacter(c) => write!(f, "category contains invalid character {c:?}"),
        }
    }
}

/// Validate that a category name is safe to use as a file stem.
///
/// # Examples
///
/// ```
/// use inventory::storage::validate_category;
///
/// assert!(validate_category("Garden Supplies").is_ok());
/// assert!(validate_category("").is_err());
/// assert!(validate_category("../etc").is_err());
/// ```
pub fn validate_category(category: &str) -> Result<(), StoreError> {
    let reason = if category.is_empty() {
        Some(CategoryNameError::Empty)
    } else if category.len() > MAX_CATEGORY_LENGTH {
        Some(CategoryNameError::TooLong)
    } else if category == "." || category == ".." {
        Some(CategoryNameError::Reserved)
    } else {
        category
            .chars()
            .find(|&c| matches!(c, '/' | '\\' | ':') || c.is_control())
            .map(CategoryNameError::InvalidCharacter)
    };

    match reason {
        Some(reason) => Err(StoreError::InvalidCategory {
            category: category.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}

/// Errors that can occur during store operations.
///
/// A missing record is never an error: lookups return `None` and
/// deletions return `false`.
#[derive(Debug)]
pub enum StoreError {
    /// The storage backend failed.
    Storage(StorageError),
    /// An id is already used by another record.
    DuplicateKey {
        id: ItemId,
        first: String,
        second: String,
    },
    /// A name is already used by another record (case-insensitive).
    DuplicateName { name: String, existing: ItemId },
    /// An update supplied a record whose id differs from the target id.
    IdMismatch { expected: ItemId, found: ItemId },
    /// The record violates a field invariant.
    InvalidRecord(RecordError),
    /// The category name cannot be used as a storage key.
    InvalidCategory {
        category: String,
        reason: CategoryNameError,
    },
    /// Every id has been allocated.
    IdsExhausted,
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(e) => write!(f, "storage error: {e}"),
            Self::DuplicateKey { id, first, second } => write!(
                f,
                "duplicate item id {id} (categories '{first}' and '{second}')"
            ),
            Self::DuplicateName { name, existing } => {
                write!(f, "an item named '{name}' already exists (id {existing})")
            }
            Self::IdMismatch { expected, found } => {
                write!(f, "record id {found} does not match target id {expected}")
            }
            Self::InvalidRecord(e) => write!(f, "invalid record: {e}"),
            Self::InvalidCategory { category, reason } => {
                write!(f, "invalid category '{category}': {reason}")
            }
            Self::IdsExhausted => write!(f, "no item ids left to allocate"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Storage(e) => Some(e),
            Self::InvalidRecord(e) => Some(e),
            Self::DuplicateKey { .. }
            | Self::DuplicateName { .. }
            | Self::IdMismatch { .. }
            | Self::InvalidCategory { .. }
            | Self::IdsExhausted => None,
        }
    }
}

impl From<StorageError> for StoreError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<RecordError> for StoreError {
    fn from(e: RecordError) -> Self {
        Self::InvalidRecord(e)
    }
}
