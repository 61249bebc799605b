use async_trait::async_trait;
use crate::domain::{
    error::IndexingError,
    models::{CatalogEntry, ObjectMetadata},
};

/// Head-only lookup: must never transfer the object body.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ObjectMetadataSource: Send + Sync {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, IndexingError>;
}

/// Insert-only store for catalog entries.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    async fn insert_entry(&self, table_name: &str, entry: &CatalogEntry) -> Result<(), IndexingError>;
}
