//! Storage abstraction for deterministic simulation testing.
//!
//! The store never touches the file system directly. It goes through the
//! `Storage` trait, which deals in whole category blobs: read one, replace
//! one, list them all. Production uses [`DirectoryStorage`] (one file per
//! category); tests use the in-memory `SimulatedStorage`, which can inject
//! faults.
//!
//! [`DirectoryStorage`]: crate::storage::DirectoryStorage

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error.
    Io(std::io::Error),
    /// Injected fault for simulation.
    InjectedFault(String),
}

impl std::fmt::Display for StorageError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::InjectedFault(msg) => write!(f, "injected fault: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::InjectedFault(_) => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

/// Abstraction over per-category blob storage.
///
/// # Implementation Notes
///
/// Implementations must ensure:
/// - `read_category` returns the last contents written for that category,
///   or `None` if it was never written
/// - `write_category` replaces the previous contents entirely
/// - `list_categories` returns every category that has been written
pub trait Storage {
    /// Read a category's full contents.
    ///
    /// Returns `Ok(None)` if the category does not exist.
    fn read_category(&mut self, category: &str) -> Result<Option<String>, StorageError>;

    /// Replace a category's contents, creating it if needed.
    fn write_category(&mut self, category: &str, contents: &str) -> Result<(), StorageError>;

    /// List the names of all stored categories, in any order.
    fn list_categories(&mut self) -> Result<Vec<String>, StorageError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_display() {
        let e = StorageError::InjectedFault("test fault".to_string());
        assert!(e.to_string().contains("test fault"));

        let e = StorageError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert!(e.to_string().starts_with("I/O error"));
        assert!(std::error::Error::source(&e).is_some());
    }
}
