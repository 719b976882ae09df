//! MongoDB client
//!
//! Wraps a driver [`Client`] together with the database holding the resource
//! collections.

use crate::error::DbError;
use bson::{doc, Document};
use jsonapi_config::{AppConfig, DatabaseConfig};
use mongodb::{Client, Collection, Database};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// MongoDB client bound to one database
#[derive(Debug, Clone)]
pub struct MongoClient {
    client: Client,
    database: Database,
}

impl MongoClient {
    /// Create a client from the application configuration.
    ///
    /// # Errors
    ///
    /// Fails when the `database` section is missing, the URL is empty or the
    /// driver rejects the connection string.
    pub async fn new(config: &Arc<AppConfig>) -> Result<Self, DbError> {
        let db_config = config
            .database
            .as_ref()
            .ok_or_else(|| DbError::ConfigError("Database configuration is missing".to_string()))?;

        Self::from_config(db_config).await
    }

    /// Create a client from a database configuration.
    pub async fn from_config(db_config: &DatabaseConfig) -> Result<Self, DbError> {
        if db_config.url.is_empty() {
            return Err(DbError::ConfigError("Database URL is empty".to_string()));
        }
        Self::connect(&db_config.url, &db_config.name).await
    }

    /// Create a client from a connection string and database name.
    pub async fn from_url(db_url: &str, db_name: &str) -> Result<Self, DbError> {
        if db_url.is_empty() {
            return Err(DbError::UrlError("Database URL is empty".to_string()));
        }
        Self::connect(db_url, db_name).await
    }

    async fn connect(db_url: &str, db_name: &str) -> Result<Self, DbError> {
        if db_name.is_empty() {
            return Err(DbError::ConfigError("Database name is empty".to_string()));
        }

        debug!("Connecting to MongoDB database {}", db_name);
        // The driver connects lazily; parsing the URI is all that happens here.
        let client = Client::with_uri_str(db_url).await.map_err(|e| {
            warn!("Invalid MongoDB connection string: {}", e);
            DbError::UrlError(e.to_string())
        })?;
        let database = client.database(db_name);

        info!("MongoDB client created for database {}", db_name);
        Ok(Self { client, database })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    /// Untyped handle on a collection of the configured database.
    pub fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection::<Document>(name)
    }

    /// Round-trips a `ping` command to the server.
    pub async fn ping(&self) -> Result<(), DbError> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Check if the database is reachable
    pub async fn is_healthy(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!("MongoDB health check failed: {}", e);
                false
            }
        }
    }
}

impl std::fmt::Display for MongoClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "MongoClient({})", self.database.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_database_section() {
        let config = Arc::new(AppConfig::default());
        let err = MongoClient::new(&config).await.unwrap_err();
        assert!(matches!(err, DbError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_empty_url_and_name() {
        let err = MongoClient::from_url("", "app").await.unwrap_err();
        assert!(matches!(err, DbError::UrlError(_)));

        let err = MongoClient::from_url("mongodb://localhost:27017", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ConfigError(_)));
    }

    #[tokio::test]
    async fn test_invalid_connection_string() {
        let err = MongoClient::from_url("postgres://localhost", "app")
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UrlError(_)));
    }
}
