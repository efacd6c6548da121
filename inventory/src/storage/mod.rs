//! Inventory storage engine.
//!
//! Records are indexed in memory by an unbalanced binary search tree and
//! persisted as one flat file per category.
//!
//! # File Format
//!
//! Each category file is `{root}/{category}.csv`:
//!
//! - Line 1: the header `ItemID,Name,Category,Quantity,Price,Supplier`
//! - Remaining lines: one encoded record per line, ascending by id
//!
//! # Usage
//!
//! ```no_run
//! use inventory::config::StoreConfig;
//! use inventory::storage::InventoryStore;
//! use inventory::types::Record;
//!
//! # fn main() -> Result<(), inventory::storage::StoreError> {
//! let mut store = InventoryStore::open(&StoreConfig::default())?;
//!
//! let id = store.next_available_id()?;
//! store.create(Record::new(id, "Widget", "Tools", 5, 2.5, "Acme"))?;
//!
//! for record in &store.list_all()? {
//!     println!("{} {} {}", record.category, record.name, record.quantity);
//! }
//! # Ok(())
//! # }
//! ```

mod category;
pub mod codec;
mod file;
pub mod index;
mod inventory;
pub mod io;

pub use category::{
    CategoryNameError, CategoryStore, MAX_CATEGORY_LENGTH, StoreError, parse_category,
    render_category, validate_category,
};
pub use file::{CATEGORY_FILE_EXTENSION, DirectoryStorage};
pub use index::OrderedIndex;
pub use inventory::InventoryStore;
pub use io::{Storage, StorageError};
