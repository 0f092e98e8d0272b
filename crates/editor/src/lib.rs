// Admin editor: document sessions with dirty tracking, notices, the image
// manager, and the HTTP client they drive

pub mod client;
pub mod editor;
pub mod error;
pub mod images;
pub mod notices;
pub mod session;

pub use client::{AdminClient, Document, Saved};
pub use editor::{Editor, PasswordCache};
pub use error::EditorError;
pub use images::ImageManager;
pub use notices::{Notice, NoticeLevel, Notices};
pub use session::EditorSession;
