//! Factory for creating MongoDB clients

use crate::client::MongoClient;
use crate::error::DbError;
use jsonapi_config::{AppConfig, DatabaseConfig};
use std::sync::Arc;
use tracing::debug;

/// Creates [`MongoClient`]s from the different configuration sources.
#[derive(Debug, Clone, Default)]
pub struct MongoClientFactory;

impl MongoClientFactory {
    pub fn new() -> Self {
        Self
    }

    /// Uses the `database` section of the application configuration.
    pub async fn from_app_config(&self, config: &Arc<AppConfig>) -> Result<MongoClient, DbError> {
        debug!("Creating MongoDB client from application configuration");
        MongoClient::new(config).await
    }

    pub async fn from_db_config(&self, db_config: &DatabaseConfig) -> Result<MongoClient, DbError> {
        debug!("Creating MongoDB client from database configuration");
        MongoClient::from_config(db_config).await
    }

    pub async fn from_url(&self, db_url: &str, db_name: &str) -> Result<MongoClient, DbError> {
        debug!("Creating MongoDB client from URL");
        MongoClient::from_url(db_url, db_name).await
    }
}
