//! Backend trait for the content store.
//!
//! A backend durably stores the content documents and image binaries under
//! `/`-separated repository paths. Every revision of a file carries an opaque
//! version token; writes and deletes must present the current token so a
//! concurrent change is rejected instead of silently overwritten.

use crate::error::StoreError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use villa_site_core::EntryType;

/// Content-derived identifier of one revision of a file ("SHA")
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A file read from the backend with the token of the revision read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub content: Vec<u8>,
    pub version: VersionToken,
}

/// One entry of a directory listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    /// Repository path, e.g. `public/images/gallery/pool.jpg`
    pub path: String,
    pub version: VersionToken,
    pub size: u64,
    pub entry_type: EntryType,
}

/// Storage for the content documents and uploaded images.
///
/// Implementations are selected once at start and shared across requests.
#[async_trait]
pub trait ContentBackend: Send + Sync + 'static {
    /// Short name for logs ("local", "github")
    fn name(&self) -> &'static str;

    /// Reads a file.
    ///
    /// # Returns
    /// * `Ok(Some(file))` - File found, with its current version token
    /// * `Ok(None)` - No file at `path`
    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError>;

    /// Creates or replaces a file.
    ///
    /// `expected` must be `None` when creating and the current token when
    /// replacing; anything else fails with [`StoreError::Conflict`].
    ///
    /// # Returns
    /// The version token of the new revision
    async fn write(
        &self,
        path: &str,
        content: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, StoreError>;

    /// Deletes the revision of `path` identified by `expected`.
    ///
    /// Fails with [`StoreError::NotFound`] if the file is gone and
    /// [`StoreError::Conflict`] if it changed since `expected` was read.
    async fn delete(
        &self,
        path: &str,
        expected: &VersionToken,
        message: &str,
    ) -> Result<(), StoreError>;

    /// Lists the direct children of a directory, sorted by name.
    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError>;
}
