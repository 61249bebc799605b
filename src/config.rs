use tracing::{debug, info};

pub const DEFAULT_TABLE_NAME: &str = "FileMetadata";

/// Settings read once per process, at cold start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub table_name: String,
    /// Endpoint override for LocalStack and similar emulators.
    pub aws_endpoint_url: Option<String>,
}

impl IndexerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = lookup("TABLE_NAME").unwrap_or_else(|| {
            debug!("TABLE_NAME not set, using default {}", DEFAULT_TABLE_NAME);
            DEFAULT_TABLE_NAME.to_string()
        });
        info!("Catalog table: {}", table_name);

        let aws_endpoint_url = lookup("AWS_ENDPOINT_URL");
        if let Some(endpoint_url) = &aws_endpoint_url {
            info!("Using custom AWS endpoint: {}", endpoint_url);
        }

        Self {
            table_name,
            aws_endpoint_url,
        }
    }
}
