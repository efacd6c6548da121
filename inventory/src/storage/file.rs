//! Category file I/O.
//!
//! Each category is stored as `{root}/{category}.csv`. Writes replace the
//! whole file; there is no append path.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::storage::io::{Storage, StorageError};

/// File extension of category files.
pub const CATEGORY_FILE_EXTENSION: &str = "csv";

/// Storage backend that keeps one flat file per category in a directory.
#[derive(Debug, Clone)]
pub struct DirectoryStorage {
    root: PathBuf,
}

impl DirectoryStorage {
    /// Open a storage root, creating the directory if it does not exist.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!("opened storage root {}", root.display());
        Ok(Self { root })
    }

    /// The directory holding the category files.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file backing a category.
    #[must_use]
    pub fn category_path(&self, category: &str) -> PathBuf {
        self.root
            .join(format!("{category}.{CATEGORY_FILE_EXTENSION}"))
    }
}

impl Storage for DirectoryStorage {
    fn read_category(&mut self, category: &str) -> Result<Option<String>, StorageError> {
        match fs::read_to_string(self.category_path(category)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::Io(e)),
        }
    }

    fn write_category(&mut self, category: &str, contents: &str) -> Result<(), StorageError> {
        fs::write(self.category_path(category), contents)?;
        Ok(())
    }

    fn list_categories(&mut self) -> Result<Vec<String>, StorageError> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StorageError::Io(e)),
        };

        let mut categories = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if !path.is_file()
                || path.extension().and_then(|ext| ext.to_str()) != Some(CATEGORY_FILE_EXTENSION)
            {
                continue;
            }
            match path.file_stem().and_then(|stem| stem.to_str()) {
                Some(stem) => categories.push(stem.to_string()),
                None => tracing::warn!("ignoring non UTF-8 category file {}", path.display()),
            }
        }
        Ok(categories)
    }
}
