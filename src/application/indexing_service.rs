use std::sync::Arc;
use chrono::Utc;
use tracing::{info, debug, error, warn};
use crate::domain::{
    error::IndexingError,
    models::{CatalogEntry, IndexingSummary, NotificationBatch, ObjectEvent},
    ports::{CatalogRepository, ObjectMetadataSource},
};

const UNKNOWN_BUCKET: &str = "<unknown>";

pub struct IndexingService {
    metadata_source: Arc<dyn ObjectMetadataSource>,
    catalog_repo: Arc<dyn CatalogRepository>,
    table_name: String,
}

impl IndexingService {
    pub fn new(
        metadata_source: Arc<dyn ObjectMetadataSource>,
        catalog_repo: Arc<dyn CatalogRepository>,
        table_name: String,
    ) -> Self {
        Self {
            metadata_source,
            catalog_repo,
            table_name,
        }
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// Indexes every record in delivery order. The first failure aborts the
    /// batch; entries already written stay written.
    pub async fn process_batch(&self, batch: &NotificationBatch) -> Result<IndexingSummary, IndexingError> {
        info!("Processing {} S3 records", batch.len());

        for (i, record) in batch.records.iter().enumerate() {
            debug!("Processing S3 record {} of {}", i + 1, batch.len());

            let event = ObjectEvent::from_record(record)
                .map_err(|e| {
                    let bucket = record.s3.bucket.name.as_deref().unwrap_or(UNKNOWN_BUCKET);
                    error!("ERROR: Failed to process object from bucket {}: {}", bucket, e);
                    e
                })?;

            if !event.is_object_created() {
                warn!("Skipping {:?} event for s3://{}/{}",
                    event.event_name, event.bucket, event.raw_key);
                continue;
            }

            self.index_object(&event).await
                .map_err(|e| {
                    error!("ERROR: Failed to process object from bucket {}: {}", event.bucket, e);
                    e
                })?;
        }

        debug!("Batch of {} records completed", batch.len());
        Ok(IndexingSummary::success())
    }

    pub async fn index_object(&self, event: &ObjectEvent) -> Result<CatalogEntry, IndexingError> {
        // Step 1: Decode the key
        let key = event.decoded_key();
        debug!("Step 1: Decoded key '{}' -> '{}'", event.raw_key, key);

        // Step 2: Head-only metadata lookup
        debug!("Step 2: Looking up metadata for s3://{}/{}", event.bucket, key);
        let metadata = self.metadata_source.head_object(&event.bucket, &key).await?;
        debug!("Object size: {} bytes, type: {}", metadata.content_length, metadata.content_type);

        // Step 3: Build the catalog entry
        let entry = CatalogEntry::new(event, metadata, Utc::now());
        debug!("Step 3: Built catalog entry {}", entry.file_id);

        // Step 4: Persist
        debug!("Step 4: Inserting entry {} into table {}", entry.file_id, self.table_name);
        self.catalog_repo.insert_entry(&self.table_name, &entry).await?;

        info!("SUCCESS: Indexed {} into DynamoDB table {}", entry.file_name, self.table_name);
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TABLE_NAME;
    use crate::domain::models::ObjectMetadata;
    use crate::domain::ports::{MockCatalogRepository, MockObjectMetadataSource};
    use aws_lambda_events::s3::S3EventRecord;
    use mockall::Sequence;
    use std::sync::Mutex;

    fn record(bucket: &str, key: &str) -> S3EventRecord {
        let mut record = S3EventRecord::default();
        record.event_name = Some("ObjectCreated:Put".to_string());
        record.s3.bucket.name = Some(bucket.to_string());
        record.s3.object.key = Some(key.to_string());
        record
    }

    fn batch(keys: &[&str]) -> NotificationBatch {
        NotificationBatch {
            records: keys.iter().map(|key| record("uploads", key)).collect(),
        }
    }

    fn metadata() -> ObjectMetadata {
        ObjectMetadata {
            content_length: 512,
            content_type: "text/plain".to_string(),
        }
    }

    fn service(metadata: MockObjectMetadataSource, catalog: MockCatalogRepository) -> IndexingService {
        IndexingService::new(Arc::new(metadata), Arc::new(catalog), DEFAULT_TABLE_NAME.to_string())
    }

    fn capturing_catalog(entries: Arc<Mutex<Vec<CatalogEntry>>>) -> MockCatalogRepository {
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_insert_entry()
            .returning(move |_, entry| {
                entries.lock().unwrap().push(entry.clone());
                Ok(())
            });
        catalog
    }

    #[tokio::test]
    async fn indexes_every_record_in_order() {
        let mut seq = Sequence::new();
        let mut source = MockObjectMetadataSource::new();
        let mut catalog = MockCatalogRepository::new();

        for key in ["a.txt", "b.txt", "c.txt"] {
            source
                .expect_head_object()
                .withf(move |bucket, k| bucket == "uploads" && k == key)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(metadata()));
            catalog
                .expect_insert_entry()
                .withf(move |table, entry| table == "FileMetadata" && entry.file_name == key)
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }

        let summary = service(source, catalog)
            .process_batch(&batch(&["a.txt", "b.txt", "c.txt"]))
            .await
            .unwrap();

        assert_eq!(summary, IndexingSummary::success());
    }

    #[tokio::test]
    async fn name_is_decoded_but_url_keeps_raw_key() {
        let mut source = MockObjectMetadataSource::new();
        source
            .expect_head_object()
            .withf(|_, key| key == "My File.jpg")
            .times(1)
            .returning(|_, _| Ok(ObjectMetadata {
                content_length: 2048,
                content_type: "image/jpeg".to_string(),
            }));
        let entries = Arc::new(Mutex::new(Vec::new()));

        service(source, capturing_catalog(entries.clone()))
            .process_batch(&batch(&["My%20File.jpg"]))
            .await
            .unwrap();

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "My File.jpg");
        assert_eq!(entries[0].location_url, "https://uploads.s3.amazonaws.com/My%20File.jpg");
        assert_eq!(entries[0].file_size_bytes, 2048);
        assert_eq!(entries[0].file_type, "image/jpeg");
    }

    #[tokio::test]
    async fn same_event_twice_yields_two_entries() {
        let mut source = MockObjectMetadataSource::new();
        source.expect_head_object().times(2).returning(|_, _| Ok(metadata()));
        let entries = Arc::new(Mutex::new(Vec::new()));
        let service = service(source, capturing_catalog(entries.clone()));
        let batch = batch(&["report.pdf"]);

        service.process_batch(&batch).await.unwrap();
        service.process_batch(&batch).await.unwrap();

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file_name, entries[1].file_name);
        assert_ne!(entries[0].file_id, entries[1].file_id);
    }

    #[tokio::test]
    async fn lookup_failure_stops_the_batch() {
        let mut source = MockObjectMetadataSource::new();
        source
            .expect_head_object()
            .withf(|_, key| key == "a.txt")
            .times(1)
            .returning(|_, _| Ok(metadata()));
        source
            .expect_head_object()
            .withf(|_, key| key == "gone.txt")
            .times(1)
            .returning(|bucket, key| Err(IndexingError::ObjectNotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            }));
        source
            .expect_head_object()
            .withf(|_, key| key == "c.txt")
            .times(0);

        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_insert_entry()
            .withf(|_, entry| entry.file_name == "a.txt")
            .times(1)
            .returning(|_, _| Ok(()));

        let err = service(source, catalog)
            .process_batch(&batch(&["a.txt", "gone.txt", "c.txt"]))
            .await
            .unwrap_err();

        assert!(matches!(err, IndexingError::ObjectNotFound { ref key, .. } if key == "gone.txt"));
    }

    #[tokio::test]
    async fn insert_failure_keeps_prior_entries() {
        let mut source = MockObjectMetadataSource::new();
        source.expect_head_object().times(2).returning(|_, _| Ok(metadata()));

        let persisted = Arc::new(Mutex::new(Vec::new()));
        let sink = persisted.clone();
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_insert_entry()
            .times(2)
            .returning(move |table, entry| {
                if entry.file_name == "b.txt" {
                    return Err(IndexingError::Persistence {
                        table: table.to_string(),
                        message: "ProvisionedThroughputExceededException".to_string(),
                    });
                }
                sink.lock().unwrap().push(entry.file_name.clone());
                Ok(())
            });

        let err = service(source, catalog)
            .process_batch(&batch(&["a.txt", "b.txt", "c.txt"]))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "PersistenceError");
        assert_eq!(*persisted.lock().unwrap(), vec!["a.txt".to_string()]);
    }

    #[tokio::test]
    async fn empty_batch_succeeds_without_calls() {
        let mut source = MockObjectMetadataSource::new();
        source.expect_head_object().times(0);
        let mut catalog = MockCatalogRepository::new();
        catalog.expect_insert_entry().times(0);

        let summary = service(source, catalog)
            .process_batch(&NotificationBatch::default())
            .await
            .unwrap();

        assert_eq!(summary, IndexingSummary::success());
    }

    #[tokio::test]
    async fn malformed_record_stops_after_prior_records() {
        let mut source = MockObjectMetadataSource::new();
        source.expect_head_object().times(1).returning(|_, _| Ok(metadata()));
        let entries = Arc::new(Mutex::new(Vec::new()));

        let mut batch = batch(&["a.txt"]);
        let mut keyless = record("uploads", "ignored");
        keyless.s3.object.key = None;
        batch.records.push(keyless);
        batch.records.push(record("uploads", "c.txt"));

        let err = service(source, capturing_catalog(entries.clone()))
            .process_batch(&batch)
            .await
            .unwrap_err();

        assert!(matches!(err, IndexingError::MalformedEvent(_)));
        assert_eq!(entries.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn skips_events_that_are_not_creations() {
        let mut source = MockObjectMetadataSource::new();
        source
            .expect_head_object()
            .withf(|_, key| key == "kept.txt")
            .times(1)
            .returning(|_, _| Ok(metadata()));
        let entries = Arc::new(Mutex::new(Vec::new()));

        let mut removed = record("uploads", "removed.txt");
        removed.event_name = Some("ObjectRemoved:Delete".to_string());
        let batch = NotificationBatch {
            records: vec![removed, record("uploads", "kept.txt")],
        };

        service(source, capturing_catalog(entries.clone()))
            .process_batch(&batch)
            .await
            .unwrap();

        let entries = entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].file_name, "kept.txt");
    }

    #[tokio::test]
    async fn targets_configured_table() {
        let mut source = MockObjectMetadataSource::new();
        source.expect_head_object().returning(|_, _| Ok(metadata()));
        let mut catalog = MockCatalogRepository::new();
        catalog
            .expect_insert_entry()
            .withf(|table, _| table == "Uploads")
            .times(1)
            .returning(|_, _| Ok(()));

        let service = IndexingService::new(Arc::new(source), Arc::new(catalog), "Uploads".to_string());
        assert_eq!(service.table_name(), "Uploads");
        service.process_batch(&batch(&["x.bin"])).await.unwrap();
    }
}
