use async_trait::async_trait;
use aws_sdk_dynamodb::{error::DisplayErrorContext, types::AttributeValue, Client};
use std::collections::HashMap;
use tracing::debug;
use crate::domain::{error::IndexingError, models::CatalogEntry, ports::CatalogRepository};

/// Guards against ever replacing an existing entry.
const INSERT_ONLY_CONDITION: &str = "attribute_not_exists(file_id)";

pub struct DynamoCatalogRepository {
    client: Client,
}

impl DynamoCatalogRepository {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

pub(crate) fn to_item(entry: &CatalogEntry) -> HashMap<String, AttributeValue> {
    HashMap::from([
        ("file_id".to_string(), AttributeValue::S(entry.file_id.clone())),
        ("file_name".to_string(), AttributeValue::S(entry.file_name.clone())),
        ("bucket_name".to_string(), AttributeValue::S(entry.bucket_name.clone())),
        ("file_size_bytes".to_string(), AttributeValue::N(entry.file_size_bytes.to_string())),
        ("file_type".to_string(), AttributeValue::S(entry.file_type.clone())),
        ("upload_timestamp".to_string(), AttributeValue::S(entry.upload_timestamp.clone())),
        ("s3_url".to_string(), AttributeValue::S(entry.location_url.clone())),
    ])
}

#[async_trait]
impl CatalogRepository for DynamoCatalogRepository {
    async fn insert_entry(&self, table_name: &str, entry: &CatalogEntry) -> Result<(), IndexingError> {
        debug!("PutItem {} into table {}", entry.file_id, table_name);

        self.client
            .put_item()
            .table_name(table_name)
            .set_item(Some(to_item(entry)))
            .condition_expression(INSERT_ONLY_CONDITION)
            .send()
            .await
            .map_err(|e| {
                debug!("PutItem into {} failed: {}", table_name, DisplayErrorContext(&e));
                IndexingError::Persistence {
                    table: table_name.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        Ok(())
    }
}
