//! Client for a retrieval-augmented chat backend.
//!
//! Select a document, upload it, then ask questions about it. The backend
//! does the retrieval and generation; this crate owns the session state
//! machine around those two requests.

pub mod backend;
pub mod config;
pub mod document;
pub mod session;

pub use backend::{Answer, Backend, HttpBackend, TransportError};
pub use config::Config;
pub use document::SelectedFile;
pub use session::{Action, Session, SessionError, SessionSnapshot, ValidationError};
