use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::CoreError;
use crate::models::account::AccountBook;

use super::format;

/// Persistence collaborator for the account book.
///
/// The whole book is loaded at startup and rewritten whole after each edit.
pub trait AccountStore {
    fn load(&self) -> Result<AccountBook, CoreError>;
    fn save(&self, book: &AccountBook) -> Result<(), CoreError>;
}

/// Account book stored as a JSON document on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse and validate a book from raw document bytes.
    pub fn load_from_bytes(data: &[u8]) -> Result<AccountBook, CoreError> {
        format::read_document(data)
    }

    /// Serialize a book to raw document bytes.
    pub fn save_to_bytes(book: &AccountBook) -> Result<Vec<u8>, CoreError> {
        format::write_document(book)
    }
}

impl AccountStore for JsonFileStore {
    /// A missing file is an empty book, not an error.
    fn load(&self) -> Result<AccountBook, CoreError> {
        if !self.path.exists() {
            info!(path = %self.path.display(), "Account file not found, starting empty");
            return Ok(AccountBook::new());
        }
        let bytes = std::fs::read(&self.path)?;
        let book = Self::load_from_bytes(&bytes)?;
        debug!(
            path = %self.path.display(),
            accounts = book.len(),
            positions = book.position_count(),
            "Loaded accounts"
        );
        Ok(book)
    }

    /// Write to a sibling temp file first, then rename over the target.
    fn save(&self, book: &AccountBook) -> Result<(), CoreError> {
        let bytes = Self::save_to_bytes(book)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);
        std::fs::write(&tmp, bytes)?;
        std::fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), "Changes saved");
        Ok(())
    }
}
