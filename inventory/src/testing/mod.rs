use tempfile::TempDir;

use crate::config::StoreConfig;
use crate::storage::{DirectoryStorage, InventoryStore};

/// Create an inventory store backed by a fresh temporary directory.
///
/// The directory is removed when the returned `TempDir` is dropped, so keep
/// it alive for as long as the store is used.
#[allow(clippy::expect_used)]
pub fn new_test_inventory() -> (TempDir, InventoryStore<DirectoryStorage>) {
    let dir = tempfile::tempdir().expect("create temp dir");
    let store = InventoryStore::open(&StoreConfig::with_data_directory(dir.path()))
        .expect("open test inventory");
    (dir, store)
}
