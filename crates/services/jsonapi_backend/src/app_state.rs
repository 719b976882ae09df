// --- File: crates/services/jsonapi_backend/src/app_state.rs ---
use jsonapi_common::{ApiError, DatabaseAdapter, MemoryAdapter};
use jsonapi_config::AppConfig;
use jsonapi_mongo::{MongoAdapter, MongoClientFactory};
use jsonapi_service::{JsonApiConfiguration, JsonApiModule, JsonApiService};
use std::sync::Arc;
use tracing::{info, warn};

/// Application state shared by the router builder.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub service: Arc<JsonApiService>,
}

impl AppState {
    /// Picks the adapter from the configuration: MongoDB when a `database`
    /// section is present, the in-memory adapter otherwise.
    pub async fn new(config: Arc<AppConfig>) -> Result<Self, ApiError> {
        let adapter: Arc<dyn DatabaseAdapter> = match &config.database {
            Some(db_config) => {
                let client = MongoClientFactory::new().from_db_config(db_config).await?;
                if !client.is_healthy().await {
                    warn!("MongoDB at {} is not answering yet", db_config.url);
                }
                info!("Using MongoDB adapter ({})", client);
                Arc::new(MongoAdapter::new(client))
            }
            None => {
                warn!("No database configured, records are kept in memory");
                Arc::new(MemoryAdapter::new())
            }
        };

        Ok(Self::with_adapter(config, adapter))
    }

    pub fn with_adapter(config: Arc<AppConfig>, adapter: Arc<dyn DatabaseAdapter>) -> Self {
        let service = JsonApiModule::for_root(JsonApiConfiguration::from_config(
            adapter,
            &config.jsonapi,
        ));
        Self { config, service }
    }
}
