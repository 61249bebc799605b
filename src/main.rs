use std::sync::Arc;
use aws_lambda_events::s3::S3Event;
use file_metadata_indexer::lambda_service::LambdaService;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Error> {
    // CloudWatch adds its own timestamps and does not render ANSI colours
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("file_metadata_indexer=debug".parse()?)
            .add_directive("aws_sdk=warn".parse()?))
        .with_target(false)
        .with_ansi(false)
        .without_time()
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting file metadata indexer");

    let service = Arc::new(LambdaService::new().await?);
    info!("Lambda service initialized successfully");

    run(service_fn(move |event: LambdaEvent<S3Event>| {
        let service = Arc::clone(&service);
        async move { service.handle(event).await }
    }))
    .await
}
