//! Local filesystem store for result files.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use screenbook_core::error::{ScreeningError, ScreeningResult};
use screenbook_core::gateway::FileStore;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a key to a path under the root. Keys may only contain plain
    /// relative segments.
    fn path_for(&self, key: &str) -> ScreeningResult<PathBuf> {
        let relative = Path::new(key);
        let plain = relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if key.is_empty() || !plain {
            return Err(ScreeningError::Storage(format!("invalid file key: {key}")));
        }
        Ok(self.root.join(relative))
    }
}

impl FileStore for LocalFileStore {
    async fn put(&self, key: &str, content_type: &str, bytes: Vec<u8>) -> ScreeningResult<()> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ScreeningError::Storage(format!("create {}: {e}", parent.display())))?;
        }
        let size = bytes.len();
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| ScreeningError::Storage(format!("write {key}: {e}")))?;
        debug!(key, content_type, size, "File stored");
        Ok(())
    }

    async fn get(&self, key: &str) -> ScreeningResult<Vec<u8>> {
        let path = self.path_for(key)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => ScreeningError::not_found("file", key),
            _ => ScreeningError::Storage(format!("read {key}: {e}")),
        })
    }

    async fn delete(&self, key: &str) -> ScreeningResult<()> {
        let path = self.path_for(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                debug!(key, "File deleted");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(ScreeningError::Storage(format!("delete {key}: {e}"))),
        }
    }
}
