//! Document selection
//!
//! Loads a local file into the blob that gets uploaded, guesses its MIME
//! type, and renders the one-line description shown next to the picker.

pub mod describe;
pub mod mime;
pub mod selection;

pub use describe::describe_selection;
pub use mime::guess_mime_type;
pub use selection::{SelectedFile, SelectionError};
