use std::sync::Arc;

use aws_sdk_dynamodb::Client as DynamoClient;
use pinboard_atoms::media::{DynamoImageStore, ImageError, ImageStore, MemoryImageStore};
use thiserror::Error;
use tracing::info;

use crate::config::{AppConfig, ConfigError, StoreBackend, StoreConfig};

#[derive(Error, Debug)]
pub enum StateError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Store initialisation failed: {0}")]
    Store(#[from] ImageError),
}

/// Everything a request handler may touch. Built once per process and shared
/// read-only behind an `Arc`.
pub struct AppState {
    pub store: Arc<dyn ImageStore>,
    pub config: AppConfig,
}

impl AppState {
    pub async fn new() -> Result<Arc<Self>, StateError> {
        let config = AppConfig::from_env()?;
        Self::from_config(config).await
    }

    pub async fn from_config(config: AppConfig) -> Result<Arc<Self>, StateError> {
        let store: Arc<dyn ImageStore> = match config.backend {
            StoreBackend::DynamoDb => {
                let client = dynamo_client(&config.store).await;
                let store = DynamoImageStore::new(client, config.store.database_name.clone());
                store.ensure_table().await?;
                info!(
                    "Using DynamoDB table {} at {}",
                    store.table_name(),
                    config
                        .store
                        .endpoint_url()
                        .unwrap_or_else(|| "the regional endpoint".to_string())
                );
                Arc::new(store)
            }
            StoreBackend::Memory => {
                info!("Using in-memory image store");
                Arc::new(MemoryImageStore::new())
            }
        };

        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: Arc<dyn ImageStore>, config: AppConfig) -> Arc<Self> {
        Arc::new(Self { store, config })
    }
}

/// Credentials and region come from the usual AWS environment chain; the
/// endpoint is overridden when a host is configured.
pub async fn dynamo_client(config: &StoreConfig) -> DynamoClient {
    let sdk_config = aws_config::load_from_env().await;
    let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

    if let Some(endpoint) = config.endpoint_url() {
        builder = builder.endpoint_url(endpoint);
    }

    DynamoClient::from_conf(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_backend_needs_no_network() {
        let config = AppConfig::from_lookup(|key| match key {
            "IMAGE_STORE" => Some("memory".to_string()),
            _ => None,
        })
        .expect("valid config");

        let state = AppState::from_config(config).await.expect("state");
        let image = state
            .store
            .create("Test Image", "https://example.com/image.jpg")
            .await
            .expect("create");

        assert_eq!(state.store.get_by_id(&image.id).await, Ok(image));
    }
}
