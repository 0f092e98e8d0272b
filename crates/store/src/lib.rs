pub mod auth;
pub mod backend;
pub mod error;
pub mod github;
pub mod local;
pub mod service;

#[cfg(test)]
mod fake_github;

pub use auth::AdminAuth;
pub use backend::{ContentBackend, DirEntry, StoredFile, VersionToken};
pub use error::{ContentError, StoreError};
pub use github::GitHubBackend;
pub use local::LocalFilesystemBackend;
pub use service::{ContentService, SavedDocument};

use std::sync::Arc;
use tracing::info;
use villa_site_core::Settings;

/// Select the storage backend for this process.
///
/// A configured GitHub credential selects the remote backend; otherwise the
/// site directory itself is the store.
pub fn backend_from_settings(settings: &Settings) -> Result<Arc<dyn ContentBackend>, StoreError> {
    match &settings.github {
        Some(github) => {
            info!(
                owner = %github.owner,
                repo = %github.repo,
                branch = %github.branch,
                "Using GitHub content backend"
            );
            Ok(Arc::new(GitHubBackend::new(github, settings.http_timeout)?))
        }
        None => {
            info!(root = %settings.root.display(), "Using local content backend");
            Ok(Arc::new(LocalFilesystemBackend::new(&settings.root)))
        }
    }
}

/// Content service wired from settings
pub fn service_from_settings(settings: &Settings) -> Result<ContentService, StoreError> {
    let backend = backend_from_settings(settings)?;
    Ok(ContentService::new(
        backend,
        AdminAuth::new(settings.admin_password.clone()),
        settings.content.clone(),
    ))
}
