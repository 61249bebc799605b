use async_trait::async_trait;
use aws_sdk_s3::{error::DisplayErrorContext, Client};
use tracing::debug;
use crate::domain::{error::IndexingError, models::ObjectMetadata, ports::ObjectMetadataSource};

pub struct S3Adapter {
    client: Client,
}

impl S3Adapter {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ObjectMetadataSource for S3Adapter {
    async fn head_object(&self, bucket: &str, key: &str) -> Result<ObjectMetadata, IndexingError> {
        debug!("Sending HeadObject for s3://{}/{}", bucket, key);

        let response = self.client
            .head_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().map(|e| e.is_not_found()) == Some(true) {
                    debug!("Object s3://{}/{} does not exist", bucket, key);
                    return IndexingError::ObjectNotFound {
                        bucket: bucket.to_string(),
                        key: key.to_string(),
                    };
                }
                debug!("HeadObject failed for s3://{}/{}: {}", bucket, key, DisplayErrorContext(&e));
                IndexingError::Lookup {
                    bucket: bucket.to_string(),
                    key: key.to_string(),
                    message: DisplayErrorContext(&e).to_string(),
                }
            })?;

        let incomplete = |field: &str| IndexingError::Lookup {
            bucket: bucket.to_string(),
            key: key.to_string(),
            message: format!("HeadObject response has no {}", field),
        };

        let content_length = response.content_length().ok_or_else(|| incomplete("ContentLength"))?;
        let content_type = response
            .content_type()
            .ok_or_else(|| incomplete("ContentType"))?
            .to_string();

        Ok(ObjectMetadata {
            content_length,
            content_type,
        })
    }
}
