use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;

/// Local-disk store for colorized output images.
///
/// Keys are flat file names generated by the tracker, never caller input.
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn init(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)
            .await
            .map_err(|e| StorageError::io(&root, e))?;
        Ok(Self { root })
    }

    /// Write image bytes under `key`.
    pub async fn save(&self, key: &str, data: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key);
        fs::write(&path, data)
            .await
            .map_err(|e| StorageError::io(&path, e))
    }

    /// Read image bytes stored under `key`.
    pub async fn load(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key);
        fs::read(&path).await.map_err(|e| StorageError::io(&path, e))
    }

    /// Remove the object stored under `key`.
    pub async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key);
        fs::remove_file(&path)
            .await
            .map_err(|e| StorageError::io(&path, e))
    }

    /// Verify the store root is still present and writable enough to accept
    /// results.
    pub async fn health_check(&self) -> Result<(), StorageError> {
        let meta = fs::metadata(&self.root)
            .await
            .map_err(|e| StorageError::io(&self.root, e))?;
        if !meta.is_dir() {
            return Err(StorageError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("I/O error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Store root {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

impl StorageError {
    fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}
