//! Error types for the MongoDB adapter

use jsonapi_common::ApiError;
use thiserror::Error;

/// Errors that can occur when talking to MongoDB
#[derive(Debug, Error)]
pub enum DbError {
    /// Error from the MongoDB driver
    #[error("MongoDB error: {0}")]
    MongoError(#[from] mongodb::error::Error),

    /// A JSON value could not be encoded as BSON
    #[error("BSON encoding error: {0}")]
    EncodeError(#[from] bson::ser::Error),

    /// Error with the database configuration
    #[error("Database configuration error: {0}")]
    ConfigError(String),

    /// Error with database URL parsing
    #[error("Database URL error: {0}")]
    UrlError(String),

    /// The query or options can't be expressed as a MongoDB command
    #[error("Database query error: {0}")]
    QueryError(String),
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::ConfigError(message) | DbError::UrlError(message) => {
                ApiError::Configuration(message)
            }
            DbError::QueryError(message) => ApiError::BadRequest(message),
            DbError::EncodeError(err) => ApiError::BadRequest(err.to_string()),
            DbError::MongoError(err) => ApiError::Database(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_common::HttpStatusCode;

    #[test]
    fn test_into_api_error() {
        let err: ApiError = DbError::QueryError("bad collation".to_string()).into();
        assert_eq!(err.status_code(), 400);

        let err: ApiError = DbError::UrlError("Database URL is empty".to_string()).into();
        assert_eq!(err, ApiError::Configuration("Database URL is empty".to_string()));
    }
}
