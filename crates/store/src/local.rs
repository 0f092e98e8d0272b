//! Filesystem-backed content store used in development.
//!
//! Version tokens are the SHA-256 of the file bytes. Compare-and-write runs
//! under an in-process lock so a stale token is rejected the same way the
//! remote backend rejects it.
//!
//! Listings reuse a file's token while its size and modification time are
//! unchanged; writes and deletes through the backend drop the cached entry.

use crate::backend::{ContentBackend, DirEntry, StoredFile, VersionToken};
use crate::error::StoreError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tokio::fs;
use tokio::sync::Mutex;
use villa_site_core::EntryType;
use villa_site_core::config::validate_path;

/// Size and modification time a cached token was computed for
#[derive(Debug, Clone, PartialEq, Eq)]
struct FileStamp {
    len: u64,
    modified: SystemTime,
}

pub struct LocalFilesystemBackend {
    root: PathBuf,
    write_lock: Mutex<()>,
    listing_tokens: Mutex<HashMap<PathBuf, (FileStamp, VersionToken)>>,
}

impl LocalFilesystemBackend {
    /// Store rooted at the site directory; repository paths resolve below it
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
            listing_tokens: Mutex::new(HashMap::new()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let relative =
            validate_path(path, "path").map_err(|e| StoreError::InvalidPath(e.to_string()))?;
        Ok(self.root.join(relative))
    }

    async fn current_version(&self, file: &Path) -> Result<Option<VersionToken>, StoreError> {
        match fs::read(file).await {
            Ok(bytes) => Ok(Some(version_of(&bytes))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Token of a listed file, hashing only when the file changed since the
    /// last listing
    async fn listed_version(
        &self,
        file: &Path,
        len: u64,
        modified: Option<SystemTime>,
    ) -> Result<VersionToken, StoreError> {
        let stamp = modified.map(|modified| FileStamp { len, modified });
        if let Some(stamp) = &stamp {
            if let Some((cached, token)) = self.listing_tokens.lock().await.get(file) {
                if cached == stamp {
                    return Ok(token.clone());
                }
            }
        }

        let token = version_of(&fs::read(file).await?);
        if let Some(stamp) = stamp {
            self.listing_tokens
                .lock()
                .await
                .insert(file.to_path_buf(), (stamp, token.clone()));
        }
        Ok(token)
    }

    async fn forget(&self, file: &Path) {
        self.listing_tokens.lock().await.remove(file);
    }
}

/// Token of a byte sequence
pub fn version_of(bytes: &[u8]) -> VersionToken {
    VersionToken::new(format!("{:x}", Sha256::digest(bytes)))
}

#[async_trait]
impl ContentBackend for LocalFilesystemBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn read(&self, path: &str) -> Result<Option<StoredFile>, StoreError> {
        let file = self.resolve(path)?;
        match fs::read(&file).await {
            Ok(content) => {
                let version = version_of(&content);
                Ok(Some(StoredFile { content, version }))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => match fs::metadata(&file).await {
                Ok(meta) if meta.is_dir() => Err(StoreError::InvalidPath(format!(
                    "{} is a directory ({})",
                    path, e
                ))),
                _ => Err(e.into()),
            },
        }
    }

    async fn write(
        &self,
        path: &str,
        content: &[u8],
        expected: Option<&VersionToken>,
        _message: &str,
    ) -> Result<VersionToken, StoreError> {
        let file = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        let current = self.current_version(&file).await?;
        match (&current, expected) {
            (None, None) => {}
            (Some(current), Some(expected)) if current == expected => {}
            (Some(current), _) => {
                return Err(StoreError::Conflict {
                    path: path.to_string(),
                    message: format!("file is at {} but expected {:?}", current, expected),
                });
            }
            (None, Some(expected)) => {
                return Err(StoreError::Conflict {
                    path: path.to_string(),
                    message: format!("file no longer exists (expected {})", expected),
                });
            }
        }

        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }

        // Write beside the target then rename, so readers never see a torn file
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| StoreError::InvalidPath(path.to_string()))?;
        let tmp = file.with_file_name(format!(".{}.tmp", file_name));
        fs::write(&tmp, content).await?;
        fs::rename(&tmp, &file).await?;
        self.forget(&file).await;

        Ok(version_of(content))
    }

    async fn delete(
        &self,
        path: &str,
        expected: &VersionToken,
        _message: &str,
    ) -> Result<(), StoreError> {
        let file = self.resolve(path)?;
        let _guard = self.write_lock.lock().await;

        match self.current_version(&file).await? {
            None => Err(StoreError::NotFound {
                path: path.to_string(),
            }),
            Some(current) if &current != expected => Err(StoreError::Conflict {
                path: path.to_string(),
                message: format!("file is at {} but expected {}", current, expected),
            }),
            Some(_) => {
                fs::remove_file(&file).await?;
                self.forget(&file).await;
                Ok(())
            }
        }
    }

    async fn list(&self, dir: &str) -> Result<Vec<DirEntry>, StoreError> {
        let dir_path = self.resolve(dir)?;
        let mut read_dir = match fs::read_dir(&dir_path).await {
            Ok(rd) => rd,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(StoreError::NotFound {
                    path: dir.to_string(),
                });
            }
            Err(e) => return Err(e.into()),
        };

        let prefix = dir.trim_end_matches('/');
        let mut entries = Vec::new();
        while let Some(entry) = read_dir.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') {
                continue;
            }
            let path = format!("{}/{}", prefix, name);
            let file_type = entry.file_type().await?;

            if file_type.is_dir() {
                entries.push(DirEntry {
                    version: version_of(format!("dir:{}", path).as_bytes()),
                    name,
                    path,
                    size: 0,
                    entry_type: EntryType::Dir,
                });
            } else if file_type.is_file() {
                let meta = entry.metadata().await?;
                let version = self
                    .listed_version(&entry.path(), meta.len(), meta.modified().ok())
                    .await?;
                entries.push(DirEntry {
                    version,
                    name,
                    path,
                    size: meta.len(),
                    entry_type: EntryType::File,
                });
            }
        }

        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn backend() -> (TempDir, LocalFilesystemBackend) {
        let dir = TempDir::new().unwrap();
        let backend = LocalFilesystemBackend::new(dir.path());
        (dir, backend)
    }

    #[tokio::test]
    async fn test_read_missing_is_none() {
        let (_dir, backend) = backend();
        assert!(backend.read("content/global.json").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_then_read() {
        let (dir, backend) = backend();
        let token = backend
            .write("content/global.json", b"{}\n", None, "create")
            .await
            .unwrap();

        let file = backend.read("content/global.json").await.unwrap().unwrap();
        assert_eq!(file.content, b"{}\n");
        assert_eq!(file.version, token);
        assert!(dir.path().join("content/global.json").exists());
        // No temp file left behind
        assert!(!dir.path().join("content/.global.json.tmp").exists());
    }

    #[tokio::test]
    async fn test_version_changes_with_bytes() {
        let (_dir, backend) = backend();
        let first = backend.write("a.json", b"1", None, "m").await.unwrap();
        let second = backend.write("a.json", b"2", Some(&first), "m").await.unwrap();
        assert_ne!(first, second);

        let same = backend.write("a.json", b"2", Some(&second), "m").await.unwrap();
        assert_eq!(second, same);
    }

    #[tokio::test]
    async fn test_stale_token_rejected() {
        let (_dir, backend) = backend();
        let original = backend.write("a.json", b"A0", None, "m").await.unwrap();

        // Session A updates using the token both sessions read
        backend.write("a.json", b"A1", Some(&original), "m").await.unwrap();

        // Session B still holds the original token
        let err = backend
            .write("a.json", b"B1", Some(&original), "m")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));

        let file = backend.read("a.json").await.unwrap().unwrap();
        assert_eq!(file.content, b"A1");
    }

    #[tokio::test]
    async fn test_overwrite_without_token_rejected() {
        let (_dir, backend) = backend();
        backend.write("a.json", b"x", None, "m").await.unwrap();
        let err = backend.write("a.json", b"y", None, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_write_with_token_to_missing_file_rejected() {
        let (_dir, backend) = backend();
        let err = backend
            .write("a.json", b"y", Some(&VersionToken::new("abc")), "m")
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }

    #[tokio::test]
    async fn test_delete_requires_current_token() {
        let (_dir, backend) = backend();
        let v1 = backend.write("img/a.jpg", b"one", None, "m").await.unwrap();
        let v2 = backend.write("img/a.jpg", b"two", Some(&v1), "m").await.unwrap();

        let err = backend.delete("img/a.jpg", &v1, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        assert!(backend.read("img/a.jpg").await.unwrap().is_some());

        backend.delete("img/a.jpg", &v2, "m").await.unwrap();
        assert!(backend.read("img/a.jpg").await.unwrap().is_none());

        let err = backend.delete("img/a.jpg", &v2, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_sorted_and_skips_hidden() {
        let (_dir, backend) = backend();
        backend.write("public/images/b.jpg", b"bb", None, "m").await.unwrap();
        backend.write("public/images/a.jpg", b"a", None, "m").await.unwrap();
        backend.write("public/images/.DS_Store", b"", None, "m").await.unwrap();
        backend.write("public/images/sub/c.jpg", b"c", None, "m").await.unwrap();

        let entries = backend.list("public/images").await.unwrap();
        let names: Vec<_> = entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "sub"]);
        assert_eq!(entries[0].path, "public/images/a.jpg");
        assert_eq!(entries[1].size, 2);
        assert_eq!(entries[1].version, version_of(b"bb"));
        assert_eq!(entries[2].entry_type, EntryType::Dir);
    }

    #[tokio::test]
    async fn test_list_tokens_follow_backend_writes() {
        let (_dir, backend) = backend();
        let v1 = backend.write("public/g/a.jpg", b"one", None, "m").await.unwrap();
        assert_eq!(backend.list("public/g").await.unwrap()[0].version, v1);
        // Cached token served again while the file is unchanged
        assert_eq!(backend.list("public/g").await.unwrap()[0].version, v1);

        // Same size, so only the write itself can invalidate the cache
        let v2 = backend.write("public/g/a.jpg", b"two", Some(&v1), "m").await.unwrap();
        assert_eq!(backend.list("public/g").await.unwrap()[0].version, v2);

        backend.delete("public/g/a.jpg", &v2, "m").await.unwrap();
        backend.write("public/g/a.jpg", b"one", None, "m").await.unwrap();
        assert_eq!(backend.list("public/g").await.unwrap()[0].version, v1);
    }

    #[tokio::test]
    async fn test_read_directory_is_invalid_path() {
        let (dir, backend) = backend();
        std::fs::create_dir_all(dir.path().join("content")).unwrap();
        let err = backend.read("content").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }

    #[tokio::test]
    async fn test_list_missing_dir() {
        let (_dir, backend) = backend();
        let err = backend.list("public/nope").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_rejects_traversal() {
        let (_dir, backend) = backend();
        let err = backend.read("../outside.json").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
        let err = backend.write("/etc/passwd", b"x", None, "m").await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidPath(_)));
    }
}
