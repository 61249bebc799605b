use std::sync::Arc;
use aws_lambda_events::s3::S3Event;
use lambda_runtime::{Diagnostic, LambdaEvent};
use tracing::{info, debug};
use crate::{
    application::indexing_service::IndexingService,
    config::IndexerConfig,
    domain::{
        error::IndexingError,
        models::{IndexingSummary, NotificationBatch},
    },
    infrastructure::{
        s3_adapter::S3Adapter,
        dynamodb::catalog_repo::DynamoCatalogRepository,
    },
};

/// Lambda entry point. Built once per cold start; the AWS clients inside
/// are reused by every invocation.
pub struct LambdaService {
    service: IndexingService,
}

impl LambdaService {
    pub async fn new() -> Result<Self, lambda_runtime::Error> {
        debug!("Initializing Lambda service");
        let config = IndexerConfig::from_env();

        debug!("Loading AWS configuration");
        let mut aws_config_builder = aws_config::defaults(aws_config::BehaviorVersion::latest());

        // Configure endpoint for LocalStack if AWS_ENDPOINT_URL is set
        if let Some(endpoint_url) = &config.aws_endpoint_url {
            aws_config_builder = aws_config_builder.endpoint_url(endpoint_url);
        }

        let aws_config = aws_config_builder.load().await;
        debug!("AWS region: {:?}", aws_config.region());

        let mut s3_config = aws_sdk_s3::config::Builder::from(&aws_config);

        // Enable path-style addressing for LocalStack
        if config.aws_endpoint_url.is_some() {
            s3_config = s3_config.force_path_style(true);
        }

        let s3_client = aws_sdk_s3::Client::from_conf(s3_config.build());
        let dynamo_client = aws_sdk_dynamodb::Client::new(&aws_config);
        debug!("AWS clients initialized");

        let metadata_source = Arc::new(S3Adapter::new(s3_client));
        let catalog_repo = Arc::new(DynamoCatalogRepository::new(dynamo_client));
        let service = IndexingService::new(metadata_source, catalog_repo, config.table_name);

        debug!("Lambda service initialization complete");
        Ok(Self { service })
    }

    pub fn with_service(service: IndexingService) -> Self {
        Self { service }
    }

    pub async fn handle(&self, event: LambdaEvent<S3Event>) -> Result<IndexingSummary, IndexingError> {
        let (payload, context) = event.into_parts();
        debug!("Invocation {}", context.request_id);

        self.handle_event(payload).await
            .map_err(|e| {
                debug!("Invocation {} failed with {}", context.request_id, e.kind());
                e
            })
    }

    pub async fn handle_event(&self, event: S3Event) -> Result<IndexingSummary, IndexingError> {
        info!("Received event: {}",
            serde_json::to_string_pretty(&event).unwrap_or_else(|_| "<invalid json>".to_string()));

        let batch = NotificationBatch::from(event);
        let summary = self.service.process_batch(&batch).await?;
        info!("Indexed batch of {} records into {}", batch.len(), self.service.table_name());
        Ok(summary)
    }
}

impl From<IndexingError> for Diagnostic {
    fn from(error: IndexingError) -> Self {
        Diagnostic {
            error_type: error.kind().to_string(),
            error_message: error.to_string(),
        }
    }
}
