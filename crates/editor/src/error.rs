use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid pointer '{0}'")]
    InvalidPointer(String),

    #[error("Nothing at '{0}'")]
    NotFound(String),

    #[error("'{0}' is not a list")]
    NotAList(String),

    #[error("Index {index} out of range for '{pointer}'")]
    IndexOutOfRange { pointer: String, index: usize },

    #[error("Not signed in")]
    NotSignedIn,

    #[error("Document '{0}' is not open")]
    NotOpen(String),

    #[error("Unsaved changes in: {}", .0.join(", "))]
    UnsavedChanges(Vec<String>),

    #[error("No image at {0}")]
    UnknownImage(String),

    /// Error body returned by the admin API
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl EditorError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, EditorError::Api { status: 401, .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, EditorError::Api { status: 409, .. })
    }
}
