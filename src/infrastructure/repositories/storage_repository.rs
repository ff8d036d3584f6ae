use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("object {bucket}/{key} not found")]
    NotFound { bucket: String, key: String },
    #[error("invalid bucket {bucket}: {message}")]
    InvalidBucket { bucket: String, message: String },
    #[error("storage backend error: {0}")]
    Backend(String),
    #[error("local file error: {0}")]
    Io(#[from] std::io::Error),
}

/// Listing entry returned by [`StorageRepository::list`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectDescriptor {
    pub key: String,
    pub size: u64,
    pub last_modified: DateTime<Utc>,
}

type ReleaseHook = Box<dyn FnOnce(&Path) + Send + Sync>;

/// Downloaded copy of an object on local disk.
///
/// The file is released exactly once, when this value is dropped.
pub struct LocalTemporaryFile {
    path: PathBuf,
    release: Option<ReleaseHook>,
}

impl LocalTemporaryFile {
    /// Takes ownership of `path`; the file is deleted on drop.
    pub fn new(path: PathBuf) -> Self {
        Self::with_release(path, remove_file)
    }

    /// Custom release action, used by storage bindings that manage their own files.
    pub fn with_release(path: PathBuf, release: impl FnOnce(&Path) + Send + Sync + 'static) -> Self {
        Self {
            path,
            release: Some(Box::new(release)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl fmt::Debug for LocalTemporaryFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalTemporaryFile")
            .field("path", &self.path)
            .field("released", &self.release.is_none())
            .finish()
    }
}

impl Drop for LocalTemporaryFile {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release(&self.path);
        }
    }
}

fn remove_file(path: &Path) {
    match std::fs::remove_file(path) {
        Ok(()) => tracing::debug!(path = %path.display(), "Cleaned up temp file"),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
        Err(e) => tracing::error!(
            path = %path.display(),
            error = %e,
            "Error cleaning up temp file"
        ),
    }
}

/// Bucket + key object storage.
///
/// Implementations are stateless request issuers and may be shared across
/// concurrent pipeline runs.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Copy an object to a fresh local temporary file
    async fn download(&self, bucket: &str, key: &str) -> Result<LocalTemporaryFile, StorageError>;

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError>;

    /// List every object whose key starts with `prefix`
    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectDescriptor>, StorageError>;

    /// Move an object within a bucket, overwriting `to`
    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<(), StorageError>;
}
