use aws_lambda_events::s3::{S3Event, S3EventRecord};
use chrono::{DateTime, Timelike, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::error::IndexingError;

pub const SUCCESS_MESSAGE: &str = "Metadata indexing successful";

const CREATED_EVENT_PREFIX: &str = "ObjectCreated:";

/// The records of one S3 notification, in delivery order. Each record is
/// only validated once processing reaches it.
#[derive(Debug, Clone, Default)]
pub struct NotificationBatch {
    pub records: Vec<S3EventRecord>,
}

impl From<S3Event> for NotificationBatch {
    fn from(event: S3Event) -> Self {
        Self { records: event.records }
    }
}

impl NotificationBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEvent {
    pub bucket: String,
    /// Key exactly as delivered: percent-encoded, with `+` for spaces.
    pub raw_key: String,
    pub event_name: Option<String>,
}

impl ObjectEvent {
    pub fn from_record(record: &S3EventRecord) -> Result<Self, IndexingError> {
        let bucket = record.s3.bucket.name.clone()
            .ok_or_else(|| IndexingError::MalformedEvent("expected s3.bucket.name".to_string()))?;
        let raw_key = record.s3.object.key.clone()
            .ok_or_else(|| IndexingError::MalformedEvent("expected s3.object.key".to_string()))?;

        Ok(Self {
            bucket,
            raw_key,
            event_name: record.event_name.clone(),
        })
    }

    /// Records without an `eventName` count as created.
    pub fn is_object_created(&self) -> bool {
        self.event_name
            .as_deref()
            .map_or(true, |name| name.starts_with(CREATED_EVENT_PREFIX))
    }

    pub fn decoded_key(&self) -> String {
        decode_object_key(&self.raw_key)
    }
}

/// Decodes an S3 event key: `+` becomes a space, then `%XX` escapes are
/// resolved. Invalid UTF-8 is replaced rather than rejected.
pub fn decode_object_key(raw_key: &str) -> String {
    let spaced = raw_key.replace('+', " ");
    String::from_utf8_lossy(&urlencoding::decode_binary(spaced.as_bytes())).into_owned()
}

pub fn location_url(bucket: &str, raw_key: &str) -> String {
    format!("https://{}.s3.amazonaws.com/{}", bucket, raw_key)
}

/// Naive UTC ISO-8601. The fraction is omitted when it is zero microseconds.
pub fn format_upload_timestamp(at: DateTime<Utc>) -> String {
    let micros = (at.nanosecond() % 1_000_000_000) / 1_000;
    if micros == 0 {
        at.format("%Y-%m-%dT%H:%M:%S").to_string()
    } else {
        format!("{}.{:06}", at.format("%Y-%m-%dT%H:%M:%S"), micros)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMetadata {
    pub content_length: i64,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub file_id: String,
    pub file_name: String,
    pub bucket_name: String,
    pub file_size_bytes: i64,
    pub file_type: String,
    pub upload_timestamp: String,
    #[serde(rename = "s3_url")]
    pub location_url: String,
}

impl CatalogEntry {
    /// Builds a new entry with a fresh random `file_id`. The name is the
    /// decoded key while the URL keeps the key as it was delivered.
    pub fn new(event: &ObjectEvent, metadata: ObjectMetadata, indexed_at: DateTime<Utc>) -> Self {
        Self {
            file_id: Uuid::new_v4().to_string(),
            file_name: event.decoded_key(),
            bucket_name: event.bucket.clone(),
            file_size_bytes: metadata.content_length,
            file_type: metadata.content_type,
            upload_timestamp: format_upload_timestamp(indexed_at),
            location_url: location_url(&event.bucket, &event.raw_key),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexingSummary {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub body: String,
}

impl IndexingSummary {
    /// The body is the message JSON-encoded as a string literal.
    pub fn success() -> Self {
        Self {
            status_code: 200,
            body: serde_json::Value::from(SUCCESS_MESSAGE).to_string(),
        }
    }
}
