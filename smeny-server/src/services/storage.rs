//! Document file storage
//!
//! Files live flat under one root directory, named by a generated storage
//! key (`<uuid>.<ext>`). Keys coming back from the database are checked
//! before they touch the filesystem.

use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Maximum upload size (10 MiB)
pub const MAX_FILE_SIZE: usize = 10 * 1024 * 1024;

/// Accepted file extensions (lowercase)
pub const ALLOWED_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "xls", "xlsx", "odt", "ods", "txt", "csv", "jpg", "jpeg", "png", "gif",
    "webp", "zip",
];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("file is empty")]
    Empty,

    #[error("file exceeds {MAX_FILE_SIZE} bytes")]
    TooLarge,

    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result of storing a file
#[derive(Debug, Clone)]
pub struct StoredFile {
    pub storage_key: String,
    pub sha256: String,
    pub size_bytes: i64,
    pub mime_type: String,
}

#[derive(Debug, Clone)]
pub struct DocumentStorage {
    root: PathBuf,
}

/// Lowercase extension of a file name, if it is on the whitelist
pub fn allowed_extension(file_name: &str) -> Result<String, StorageError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| StorageError::UnsupportedFormat(file_name.to_string()))?;
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedFormat(ext))
    }
}

fn valid_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && !key.contains("..")
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

impl DocumentStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> Result<(), StorageError> {
        tokio::fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        if !valid_key(key) {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.root.join(key))
    }

    /// Validate and write an uploaded file
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<StoredFile, StorageError> {
        if data.is_empty() {
            return Err(StorageError::Empty);
        }
        if data.len() > MAX_FILE_SIZE {
            return Err(StorageError::TooLarge);
        }
        let ext = allowed_extension(original_name)?;

        let storage_key = format!("{}.{ext}", uuid::Uuid::new_v4());
        let path = self.path_for(&storage_key)?;
        tokio::fs::write(&path, data).await?;

        Ok(StoredFile {
            storage_key,
            sha256: hex::encode(Sha256::digest(data)),
            size_bytes: data.len() as i64,
            mime_type: mime_guess::from_ext(&ext)
                .first_or_octet_stream()
                .essence_str()
                .to_string(),
        })
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        Ok(tokio::fs::read(self.path_for(key)?).await?)
    }

    /// Remove a file; a missing file is not an error
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        match tokio::fs::remove_file(self.path_for(key)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
