use thiserror::Error;

/// Failure of a single backend call
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend could not be reached or is not configured
    #[error("Content backend unavailable: {0}")]
    Unavailable(String),

    /// The target path does not exist
    #[error("Not found: {path}")]
    NotFound { path: String },

    /// The supplied version token is not the current one
    #[error("Version conflict on {path}: {message}")]
    Conflict { path: String, message: String },

    /// The backend answered with a non-success status
    #[error("{message} (status {status})")]
    Rejected { status: u16, message: String },

    /// The backend answered with something that could not be understood
    #[error("Malformed backend response: {0}")]
    Malformed(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error surfaced by the admin content service.
///
/// Every variant renders to a human-readable message; none are retried.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContentError {
    #[error("{0}")]
    InvalidRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    NotFound(String),

    /// Stale version token; another writer changed the file first
    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    BackendUnavailable(String),

    #[error("{0}")]
    SaveFailed(String),

    #[error("{0}")]
    ListFailed(String),

    #[error("{0}")]
    UploadFailed(String),

    #[error("{0}")]
    DeleteFailed(String),
}

impl ContentError {
    /// Short machine name of the error class
    pub fn kind(&self) -> &'static str {
        match self {
            ContentError::InvalidRequest(_) => "invalid_request",
            ContentError::Unauthorized => "unauthorized",
            ContentError::NotFound(_) => "not_found",
            ContentError::Conflict(_) => "conflict",
            ContentError::BackendUnavailable(_) => "backend_unavailable",
            ContentError::SaveFailed(_) => "save_failed",
            ContentError::ListFailed(_) => "list_failed",
            ContentError::UploadFailed(_) => "upload_failed",
            ContentError::DeleteFailed(_) => "delete_failed",
        }
    }
}
