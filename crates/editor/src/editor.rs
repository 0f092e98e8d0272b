//! Admin editor workflow over the HTTP client.
//!
//! The password is checked once at sign-in, cached for the rest of the
//! session and re-sent with every write. Every failure is also pushed to the
//! notice queue so a UI can show it and let the user dismiss it.
//!
//! Saves carry the version the document was opened at. When someone else
//! saved in between, the save is refused with a conflict and the local edits
//! stay in the session.

use crate::client::AdminClient;
use crate::error::EditorError;
use crate::images::ImageManager;
use crate::notices::Notices;
use crate::session::EditorSession;
use serde_json::Value;
use tracing::{debug, warn};
use villa_site_core::DocumentKind;

/// Password held for the signed-in session
#[derive(Clone, Default)]
pub struct PasswordCache(Option<String>);

impl std::fmt::Debug for PasswordCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("PasswordCache")
            .field(&self.0.as_ref().map(|_| "***"))
            .finish()
    }
}

impl PasswordCache {
    pub fn set(&mut self, password: String) {
        self.0 = Some(password);
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }
}

#[derive(Debug)]
pub struct Editor {
    client: AdminClient,
    password: PasswordCache,
    global: Option<EditorSession>,
    page: Option<EditorSession>,
    notices: Notices,
    images: ImageManager,
}

impl Editor {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            password: PasswordCache::default(),
            global: None,
            page: None,
            notices: Notices::default(),
            images: ImageManager::default(),
        }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn notices(&self) -> &Notices {
        &self.notices
    }

    pub fn dismiss(&mut self, id: u64) -> bool {
        self.notices.dismiss(id)
    }

    pub fn images(&self) -> &ImageManager {
        &self.images
    }

    pub fn is_signed_in(&self) -> bool {
        self.password.get().is_some()
    }

    /// Report a failure as a notice and hand it back
    fn fail<T>(&mut self, err: EditorError) -> Result<T, EditorError> {
        warn!(error = %err, "Editor action failed");
        self.notices.error(err.to_string());
        Err(err)
    }

    fn password(&mut self) -> Result<String, EditorError> {
        match self.password.get() {
            Some(p) => Ok(p.to_string()),
            None => self.fail(EditorError::NotSignedIn),
        }
    }

    fn slot(&mut self, kind: DocumentKind) -> &mut Option<EditorSession> {
        match kind {
            DocumentKind::Global => &mut self.global,
            DocumentKind::Page => &mut self.page,
        }
    }

    pub async fn sign_in(&mut self, password: &str) -> Result<(), EditorError> {
        if let Err(e) = self.client.check_password(password).await {
            return self.fail(e);
        }
        self.password.set(password.to_string());
        self.notices.success("Signed in");
        Ok(())
    }

    /// Sign out, refusing while any open document has unsaved edits unless
    /// `force` is set
    pub fn sign_out(&mut self, force: bool) -> Result<(), EditorError> {
        let dirty = self.dirty_documents();
        if !dirty.is_empty() && !force {
            let names = dirty.iter().map(|k| k.to_string()).collect();
            return self.fail(EditorError::UnsavedChanges(names));
        }
        self.password.clear();
        self.global = None;
        self.page = None;
        self.images = ImageManager::default();
        self.notices.info("Signed out");
        Ok(())
    }

    pub fn dirty_documents(&self) -> Vec<DocumentKind> {
        DocumentKind::ALL
            .into_iter()
            .filter(|k| self.session(*k).is_some_and(EditorSession::is_dirty))
            .collect()
    }

    pub fn has_unsaved_changes(&self) -> bool {
        !self.dirty_documents().is_empty()
    }

    pub fn session(&self, kind: DocumentKind) -> Option<&EditorSession> {
        match kind {
            DocumentKind::Global => self.global.as_ref(),
            DocumentKind::Page => self.page.as_ref(),
        }
    }

    pub fn session_mut(&mut self, kind: DocumentKind) -> Option<&mut EditorSession> {
        self.slot(kind).as_mut()
    }

    /// Load a document from the server, replacing the open session. A
    /// document that does not exist yet opens as an empty object.
    ///
    /// Refuses while the open session has unsaved edits; [`Editor::close`]
    /// with `force` drops them first.
    pub async fn open(&mut self, kind: DocumentKind) -> Result<&mut EditorSession, EditorError> {
        if self.session(kind).is_some_and(EditorSession::is_dirty) {
            return self.fail(EditorError::UnsavedChanges(vec![kind.to_string()]));
        }

        let session = match self.client.get_content(kind).await {
            Ok(doc) => EditorSession::new(kind, doc.content).with_version(doc.version),
            Err(EditorError::Api { status: 404, .. }) => {
                self.notices
                    .info(format!("No {} content yet, starting empty", kind));
                EditorSession::new(kind, Value::Object(Default::default()))
            }
            Err(e) => return self.fail(e),
        };
        debug!(%kind, version = ?session.version(), "Opened document");
        Ok(self.slot(kind).insert(session))
    }

    /// Close a document, refusing while it has unsaved edits unless `force`
    /// is set
    pub fn close(&mut self, kind: DocumentKind, force: bool) -> Result<(), EditorError> {
        if !force && self.session(kind).is_some_and(EditorSession::is_dirty) {
            return self.fail(EditorError::UnsavedChanges(vec![kind.to_string()]));
        }
        *self.slot(kind) = None;
        Ok(())
    }

    /// Save an open document. On failure the edits stay in the session and
    /// the document stays dirty.
    pub async fn save(&mut self, kind: DocumentKind) -> Result<String, EditorError> {
        let password = self.password()?;
        let (content, version) = match self.session(kind) {
            Some(session) => (
                session.content().clone(),
                session.version().map(str::to_string),
            ),
            None => return self.fail(EditorError::NotOpen(kind.to_string())),
        };

        match self
            .client
            .save_content(kind, &content, version.as_deref(), &password)
            .await
        {
            Ok(saved) => {
                if let Some(session) = self.slot(kind) {
                    session.mark_saved(saved.version);
                }
                self.notices.success(saved.message.clone());
                Ok(saved.message)
            }
            Err(e) => {
                if e.is_unauthorized() {
                    self.password.clear();
                }
                let conflict = e.is_conflict();
                let result = self.fail(e);
                if conflict {
                    self.notices.info(format!(
                        "{} content was changed by someone else; your edits are kept, \
                         reload to see the newer version",
                        capitalize(kind.as_str())
                    ));
                }
                result
            }
        }
    }

    pub async fn refresh_images(&mut self, folder: Option<&str>) -> Result<usize, EditorError> {
        match self.client.list_images(folder).await {
            Ok(records) => {
                self.images.replace(folder, records);
                Ok(self.images.files().count())
            }
            Err(e) => self.fail(e),
        }
    }

    pub async fn upload_image(
        &mut self,
        folder: Option<&str>,
        filename: &str,
        bytes: &[u8],
    ) -> Result<String, EditorError> {
        let password = self.password()?;
        let path = match self
            .client
            .upload_image(folder, filename, bytes, &password)
            .await
        {
            Ok(path) => path,
            Err(e) => return self.fail(e),
        };
        self.notices.success(format!("Uploaded {}", path));
        self.refresh_images(folder).await?;
        Ok(path)
    }

    /// Delete the image at `path` as listed in the manager. The listed sha
    /// goes along, so a file replaced since the listing is not deleted.
    ///
    /// The listing is reloaded afterwards so every entry carries a current
    /// sha; a failed reload leaves the delete successful.
    pub async fn delete_image(&mut self, path: &str) -> Result<String, EditorError> {
        let password = self.password()?;
        let sha = match self.images.find(path) {
            Some(record) => record.sha.clone(),
            None => return self.fail(EditorError::UnknownImage(path.to_string())),
        };

        let message = match self.client.delete_image(path, &sha, &password).await {
            Ok(message) => message,
            Err(e) => return self.fail(e),
        };
        self.images.remove(path);
        self.notices.success(message.clone());

        let folder = self.images.folder().map(str::to_string);
        match self.client.list_images(folder.as_deref()).await {
            Ok(records) => self.images.replace(folder.as_deref(), records),
            Err(e) => {
                warn!(error = %e, "Image listing not refreshed after delete");
                self.notices
                    .info(format!("Image list may be out of date: {}", e));
            }
        }
        Ok(message)
    }

    pub async fn gallery_meta(&mut self) -> Result<Value, EditorError> {
        match self.client.get_gallery_meta().await {
            Ok(meta) => Ok(meta),
            Err(e) => self.fail(e),
        }
    }

    pub async fn save_gallery_meta(&mut self, meta: &Value) -> Result<String, EditorError> {
        let password = self.password()?;
        match self.client.save_gallery_meta(meta, &password).await {
            Ok(message) => {
                self.notices.success(message.clone());
                Ok(message)
            }
            Err(e) => self.fail(e),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}
