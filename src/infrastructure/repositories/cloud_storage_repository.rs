use super::storage_repository::{
    LocalTemporaryFile, ObjectDescriptor, StorageError, StorageRepository,
};
use crate::infrastructure::config::StorageProvider;
use async_trait::async_trait;
use futures::TryStreamExt;
use moka::future::Cache;
use object_store::{
    aws::AmazonS3Builder, gcp::GoogleCloudStorageBuilder, local::LocalFileSystem,
    path::Path as ObjectPath, Attribute, Attributes, ObjectStore, PutOptions, PutPayload,
};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

/// Object storage backed by the `object_store` crate.
///
/// One client per bucket, built on first use and kept for the lifetime of
/// the repository.
pub struct CloudStorageRepository {
    provider: StorageProvider,
    stores: Cache<String, Arc<dyn ObjectStore>>,
}

impl CloudStorageRepository {
    pub fn new(provider: StorageProvider) -> Self {
        Self {
            provider,
            stores: Cache::builder().max_capacity(64).build(),
        }
    }

    async fn store(&self, bucket: &str) -> Result<Arc<dyn ObjectStore>, StorageError> {
        let provider = self.provider.clone();
        let name = bucket.to_string();
        self.stores
            .try_get_with(bucket.to_string(), async move { build_store(&provider, &name) })
            .await
            .map_err(|e| StorageError::InvalidBucket {
                bucket: bucket.to_string(),
                message: e.to_string(),
            })
    }
}

fn build_store(
    provider: &StorageProvider,
    bucket: &str,
) -> Result<Arc<dyn ObjectStore>, StorageError> {
    if bucket.is_empty() || bucket.contains('/') || bucket.starts_with('.') {
        return Err(StorageError::InvalidBucket {
            bucket: bucket.to_string(),
            message: "bucket names must be a single non-hidden path segment".to_string(),
        });
    }

    let invalid = |e: object_store::Error| StorageError::InvalidBucket {
        bucket: bucket.to_string(),
        message: e.to_string(),
    };

    let store: Arc<dyn ObjectStore> = match provider {
        StorageProvider::Gcs => Arc::new(
            GoogleCloudStorageBuilder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(invalid)?,
        ),
        StorageProvider::S3 => Arc::new(
            AmazonS3Builder::from_env()
                .with_bucket_name(bucket)
                .build()
                .map_err(invalid)?,
        ),
        StorageProvider::Local { root } => {
            let dir = root.join(bucket);
            std::fs::create_dir_all(&dir)?;
            Arc::new(LocalFileSystem::new_with_prefix(dir).map_err(invalid)?)
        }
    };

    tracing::info!(bucket, provider = %provider, "Object store client created");
    Ok(store)
}

fn object_path(key: &str) -> Result<ObjectPath, StorageError> {
    ObjectPath::parse(key).map_err(|e| StorageError::Backend(format!("invalid object key {key}: {e}")))
}

fn map_store_error(bucket: &str, key: &str, err: object_store::Error) -> StorageError {
    match err {
        object_store::Error::NotFound { .. } => StorageError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        other => StorageError::Backend(other.to_string()),
    }
}

/// Write `content` to a new temp file named after the object, keeping it on disk
fn write_temp_file(key: &str, content: &[u8]) -> Result<PathBuf, std::io::Error> {
    let file_name = key.rsplit('/').next().unwrap_or(key);
    let mut file = tempfile::Builder::new()
        .prefix(&format!("{file_name}_"))
        .suffix(".tmp")
        .tempfile()?;
    file.write_all(content)?;
    file.flush()?;
    let (_, path) = file.keep().map_err(|e| e.error)?;
    Ok(path)
}

#[async_trait]
impl StorageRepository for CloudStorageRepository {
    async fn download(&self, bucket: &str, key: &str) -> Result<LocalTemporaryFile, StorageError> {
        let store = self.store(bucket).await?;
        let path = object_path(key)?;

        let content = store
            .get(&path)
            .await
            .map_err(|e| map_store_error(bucket, key, e))?
            .bytes()
            .await
            .map_err(|e| map_store_error(bucket, key, e))?;

        let size = content.len();
        let owned_key = key.to_string();
        let local_path = tokio::task::spawn_blocking(move || write_temp_file(&owned_key, &content))
            .await
            .map_err(|e| StorageError::Backend(format!("temp file task failed: {e}")))??;

        tracing::info!(
            bucket,
            key,
            size_bytes = size,
            temp_file = %local_path.display(),
            "Downloaded object to temp file"
        );

        Ok(LocalTemporaryFile::new(local_path))
    }

    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        content: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let store = self.store(bucket).await?;
        let path = object_path(key)?;
        let size = content.len();

        // The local filesystem store rejects object attributes
        let options = if self.provider.supports_attributes() {
            let mut attributes = Attributes::new();
            attributes.insert(Attribute::ContentType, content_type.to_string().into());
            PutOptions {
                attributes,
                ..Default::default()
            }
        } else {
            PutOptions::default()
        };

        store
            .put_opts(&path, PutPayload::from(content), options)
            .await
            .map_err(|e| map_store_error(bucket, key, e))?;

        tracing::info!(bucket, key, size_bytes = size, content_type, "Uploaded object");
        Ok(())
    }

    async fn list(&self, bucket: &str, prefix: &str) -> Result<Vec<ObjectDescriptor>, StorageError> {
        let store = self.store(bucket).await?;
        let prefix_path = object_path(prefix)?;

        let objects: Vec<_> = store
            .list(Some(&prefix_path))
            .try_collect()
            .await
            .map_err(|e| map_store_error(bucket, prefix, e))?;

        // object_store lists by path segment, callers expect a plain string prefix
        let descriptors: Vec<ObjectDescriptor> = objects
            .into_iter()
            .map(|meta| ObjectDescriptor {
                key: meta.location.to_string(),
                size: meta.size,
                last_modified: meta.last_modified,
            })
            .filter(|descriptor| descriptor.key.starts_with(prefix))
            .collect();

        tracing::debug!(bucket, prefix, count = descriptors.len(), "Listed objects");
        Ok(descriptors)
    }

    async fn rename(&self, bucket: &str, from: &str, to: &str) -> Result<(), StorageError> {
        let store = self.store(bucket).await?;
        store
            .rename(&object_path(from)?, &object_path(to)?)
            .await
            .map_err(|e| map_store_error(bucket, from, e))?;

        tracing::info!(bucket, from, to, "Renamed object");
        Ok(())
    }
}
