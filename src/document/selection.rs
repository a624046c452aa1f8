use super::mime::guess_mime_type;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;

/// Failure to turn a path into a selected document.
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{} is not a file", .0.display())]
    NotAFile(PathBuf),
}

/// A document picked by the user, held in memory until it is uploaded.
///
/// Content is shared, so clones (snapshots, uploads) do not copy it.
#[derive(Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Arc<[u8]>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: impl Into<Arc<[u8]>>) -> Self {
        let name = name.into();
        let mime_type = guess_mime_type(&name).to_string();
        Self {
            name,
            mime_type,
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk. `~` is expanded.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self, SelectionError> {
        let raw = path.as_ref().to_string_lossy();
        let path = PathBuf::from(shellexpand::tilde(&raw).as_ref());

        let meta = fs::metadata(&path).await.map_err(|source| SelectionError::Read {
            path: path.clone(),
            source,
        })?;
        if !meta.is_file() {
            return Err(SelectionError::NotAFile(path));
        }

        let bytes = fs::read(&path).await.map_err(|source| SelectionError::Read {
            path: path.clone(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        Ok(Self::new(name, bytes))
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

// Bytes stay out of debug output; documents can be large.
impl fmt::Debug for SelectedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SelectedFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}
