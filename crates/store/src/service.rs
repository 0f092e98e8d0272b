//! Admin content service: the read/write surface the editor talks to.
//!
//! Every operation is backend agnostic. A write presents a version token:
//! the one the caller loaded the document with, or, when the caller has
//! none, the current token read just before writing. Either way a token that
//! went stale before the write lands is rejected as a conflict.

use crate::auth::AdminAuth;
use crate::backend::{ContentBackend, DirEntry, VersionToken};
use crate::error::{ContentError, StoreError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};
use villa_site_core::config::{normalize, validate_path};
use villa_site_core::{ContentLayout, DocumentKind, GalleryImageRecord};

/// Outcome of a document save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedDocument {
    pub message: String,
    /// Token of the revision just written; send it with the next save
    pub version: VersionToken,
}

#[derive(Clone)]
pub struct ContentService {
    backend: Arc<dyn ContentBackend>,
    auth: AdminAuth,
    layout: ContentLayout,
}

impl ContentService {
    pub fn new(backend: Arc<dyn ContentBackend>, auth: AdminAuth, layout: ContentLayout) -> Self {
        Self {
            backend,
            auth,
            layout,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    pub fn layout(&self) -> &ContentLayout {
        &self.layout
    }

    pub fn auth(&self) -> &AdminAuth {
        &self.auth
    }

    /// Login check run by the editor before it caches the password
    pub fn check_password(&self, password: Option<&str>) -> Result<(), ContentError> {
        self.auth.verify(password)
    }

    /// Load one of the two content documents
    pub async fn get_content(&self, doc: &str) -> Result<Value, ContentError> {
        Ok(self.load_content(doc).await?.0)
    }

    /// Load a content document together with the version token of the
    /// revision read
    pub async fn load_content(&self, doc: &str) -> Result<(Value, VersionToken), ContentError> {
        let kind = parse_kind(doc)?;
        let path = self.layout.document_path(kind);

        let file = self
            .backend
            .read(&path)
            .await
            .map_err(|e| {
                warn!(%path, error = %e, "Failed to read content document");
                ContentError::NotFound(format!("Content '{}' could not be loaded", kind))
            })?
            .ok_or_else(|| ContentError::NotFound(format!("Content '{}' not found", kind)))?;

        let content = serde_json::from_slice(&file.content).map_err(|e| {
            warn!(%path, error = %e, "Content document is not valid JSON");
            ContentError::NotFound(format!("Content '{}' is not valid JSON", kind))
        })?;
        Ok((content, file.version))
    }

    /// Replace a content document.
    ///
    /// `expected` is the token the caller loaded the document with. A save
    /// over a newer revision fails with [`ContentError::Conflict`]. Without a
    /// token the current one is read just before writing.
    ///
    /// The document kind is checked before the password so an unknown kind
    /// never reaches storage. The body is not validated against the schema.
    pub async fn save_content(
        &self,
        doc: &str,
        content: &Value,
        expected: Option<&VersionToken>,
        password: Option<&str>,
    ) -> Result<SavedDocument, ContentError> {
        let kind = parse_kind(doc)?;
        self.auth.verify(password)?;

        let path = self.layout.document_path(kind);
        let bytes = to_document_bytes(content)?;
        let version = self
            .save_document(
                &path,
                &bytes,
                expected,
                &format!("Update {} content via admin", kind),
            )
            .await?;

        info!(%kind, backend = self.backend.name(), %version, "Content saved");
        Ok(SavedDocument {
            message: format!("{} content saved", capitalize(kind.as_str())),
            version,
        })
    }

    /// List a folder under the public root (defaults to the gallery folder)
    pub async fn list_images(
        &self,
        folder: Option<&str>,
    ) -> Result<Vec<GalleryImageRecord>, ContentError> {
        let folder = self.folder(folder)?;
        let dir = self.layout.public_path(&folder);

        let entries = self.backend.list(&dir).await.map_err(|e| match e {
            StoreError::Unavailable(msg) => ContentError::BackendUnavailable(msg),
            other => ContentError::ListFailed(format!("Failed to list {}: {}", folder, other)),
        })?;

        debug!(%dir, count = entries.len(), "Listed images");
        Ok(entries.into_iter().map(|e| self.to_record(e)).collect())
    }

    /// Store an image under `public/<folder>/<filename>`, replacing any file
    /// with the same name. Returns the public path.
    pub async fn upload_image(
        &self,
        folder: Option<&str>,
        filename: &str,
        content_base64: &str,
        password: Option<&str>,
    ) -> Result<String, ContentError> {
        let folder = self.folder(folder)?;
        let filename = validate_filename(filename)?;
        let bytes = decode_upload(content_base64)?;
        self.auth.verify(password)?;

        let path = format!("{}/{}", self.layout.public_path(&folder), filename);
        let current = self
            .current_version(&path)
            .await
            .map_err(|e| ContentError::UploadFailed(format!("Upload failed: {}", e)))?;

        self.backend
            .write(
                &path,
                &bytes,
                current.as_ref(),
                &format!("Upload image {} via admin", filename),
            )
            .await
            .map_err(|e| match e {
                StoreError::Conflict { message, .. } => ContentError::Conflict(message),
                other => ContentError::UploadFailed(format!("Upload failed: {}", other)),
            })?;

        let public = self.layout.public_url(&path);
        info!(path = %public, bytes = bytes.len(), replaced = current.is_some(), "Image uploaded");
        Ok(public)
    }

    /// Delete an image. `file_path` may be the public URL
    /// (`/images/gallery/a.jpg`) or the repository path.
    ///
    /// With `expected` set, only that revision is deleted; a file replaced
    /// since it was listed fails with [`ContentError::Conflict`]. Without it
    /// the current revision is deleted.
    pub async fn delete_image(
        &self,
        file_path: &str,
        expected: Option<&VersionToken>,
        password: Option<&str>,
    ) -> Result<String, ContentError> {
        let path = self.repo_image_path(file_path)?;
        self.auth.verify(password)?;

        let version = match expected {
            Some(token) => token.clone(),
            None => self
                .current_version(&path)
                .await
                .map_err(|e| ContentError::DeleteFailed(format!("Delete failed: {}", e)))?
                .ok_or_else(|| {
                    ContentError::NotFound(format!("File not found: {}", file_path))
                })?,
        };

        self.backend
            .delete(&path, &version, &format!("Delete image {} via admin", path))
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => {
                    ContentError::NotFound(format!("File not found: {}", file_path))
                }
                StoreError::Conflict { message, .. } => ContentError::Conflict(message),
                other => ContentError::DeleteFailed(format!("Delete failed: {}", other)),
            })?;

        info!(%path, "Image deleted");
        Ok(format!("Deleted {}", self.layout.public_url(&path)))
    }

    /// Gallery metadata overrides; an empty object when missing or unreadable
    pub async fn get_gallery_meta(&self) -> Value {
        let path = self.layout.gallery_meta_path();
        match self.backend.read(&path).await {
            Ok(Some(file)) => match serde_json::from_slice::<Value>(&file.content) {
                Ok(value) if value.is_object() => value,
                Ok(_) | Err(_) => {
                    warn!(%path, "Gallery metadata is not a JSON object");
                    Value::Object(Default::default())
                }
            },
            Ok(None) => Value::Object(Default::default()),
            Err(e) => {
                warn!(%path, error = %e, "Failed to read gallery metadata");
                Value::Object(Default::default())
            }
        }
    }

    pub async fn save_gallery_meta(
        &self,
        meta: &Value,
        password: Option<&str>,
    ) -> Result<String, ContentError> {
        if !meta.is_object() {
            return Err(ContentError::InvalidRequest(
                "Gallery metadata must be a JSON object".to_string(),
            ));
        }
        self.auth.verify(password)?;

        let path = self.layout.gallery_meta_path();
        let bytes = to_document_bytes(meta)?;
        self.save_document(&path, &bytes, None, "Update gallery metadata via admin")
            .await?;
        Ok("Gallery metadata saved".to_string())
    }

    /// Write shared by the document save paths. Without a caller token the
    /// current one is read first; an absent document is created.
    async fn save_document(
        &self,
        path: &str,
        bytes: &[u8],
        expected: Option<&VersionToken>,
        message: &str,
    ) -> Result<VersionToken, ContentError> {
        let current = match expected {
            Some(token) => Some(token.clone()),
            None => self.current_version(path).await.map_err(|e| {
                warn!(%path, error = %e, "Could not read current version before save");
                ContentError::SaveFailed(format!("Could not read current version: {}", e))
            })?,
        };

        self.backend
            .write(path, bytes, current.as_ref(), message)
            .await
            .map_err(|e| {
                warn!(%path, error = %e, "Save failed");
                match e {
                    StoreError::Conflict { message, .. } => ContentError::Conflict(format!(
                        "Save failed: the document was changed by someone else ({})",
                        message
                    )),
                    other => ContentError::SaveFailed(format!("Save failed: {}", other)),
                }
            })
    }

    async fn current_version(&self, path: &str) -> Result<Option<VersionToken>, StoreError> {
        Ok(self.backend.read(path).await?.map(|f| f.version))
    }

    fn folder(&self, folder: Option<&str>) -> Result<String, ContentError> {
        let folder = folder
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .unwrap_or(self.layout.gallery_folder.as_str());
        let path = validate_path(folder, "path")
            .map_err(|e| ContentError::InvalidRequest(e.to_string()))?;
        Ok(normalize(&path))
    }

    fn repo_image_path(&self, file_path: &str) -> Result<String, ContentError> {
        let trimmed = file_path.trim().trim_start_matches('/');
        let prefix = format!("{}/", self.layout.public_root);
        let relative = trimmed.strip_prefix(&prefix).unwrap_or(trimmed);
        let path = validate_path(relative, "filePath")
            .map_err(|e| ContentError::InvalidRequest(e.to_string()))?;
        Ok(self.layout.public_path(&normalize(&path)))
    }

    fn to_record(&self, entry: DirEntry) -> GalleryImageRecord {
        GalleryImageRecord {
            path: self.layout.public_url(&entry.path),
            name: entry.name,
            sha: entry.version.as_str().to_string(),
            size: entry.size,
            entry_type: entry.entry_type,
        }
    }
}

fn parse_kind(doc: &str) -> Result<DocumentKind, ContentError> {
    doc.parse::<DocumentKind>()
        .map_err(|e| ContentError::InvalidRequest(e.to_string()))
}

/// Pretty JSON with a trailing newline, the on-disk format of every document
pub fn to_document_bytes(value: &Value) -> Result<Vec<u8>, ContentError> {
    let mut text = serde_json::to_string_pretty(value)
        .map_err(|e| ContentError::InvalidRequest(format!("Content is not serializable: {}", e)))?;
    text.push('\n');
    Ok(text.into_bytes())
}

fn validate_filename(filename: &str) -> Result<&str, ContentError> {
    let name = filename.trim();
    if name.is_empty() {
        return Err(ContentError::InvalidRequest(
            "Missing filename".to_string(),
        ));
    }
    if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
        return Err(ContentError::InvalidRequest(format!(
            "Invalid filename '{}'",
            filename
        )));
    }
    Ok(name)
}

/// Decode an upload body, accepting a bare base64 string or a data URL
fn decode_upload(content: &str) -> Result<Vec<u8>, ContentError> {
    let encoded = match content.split_once("base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => content,
    };
    let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let bytes = BASE64
        .decode(compact)
        .map_err(|e| ContentError::InvalidRequest(format!("Content is not valid base64: {}", e)))?;
    if bytes.is_empty() {
        return Err(ContentError::InvalidRequest("Empty upload".to_string()));
    }
    Ok(bytes)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
