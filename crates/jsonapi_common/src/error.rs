// --- File: crates/jsonapi_common/src/error.rs ---
use serde_json::Value;
use std::fmt;
use thiserror::Error;

use crate::models::Meta;

/// The error type shared by adapters, the service and the HTTP handlers.
///
/// Every variant can be rendered as a JSON:API error object: its status,
/// message (`title`), description (`detail`) and meta come from the accessors
/// below. Adapters convert their driver errors into this type.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    /// The requested resource does not exist
    #[error("Not Found")]
    NotFound,

    /// The request could not be understood (malformed body or query)
    #[error("Bad Request")]
    BadRequest(String),

    /// Error reported by the data-access adapter
    #[error("Database error")]
    Database(String),

    /// Missing or invalid configuration
    #[error("Configuration error")]
    Configuration(String),

    /// Error that doesn't fit into any other category
    #[error("Internal Server Error")]
    Internal(String),

    /// An error carrying its own status, message, description and meta
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        description: Option<String>,
        meta: Option<Meta>,
    },
}

/// A trait for converting errors to HTTP status codes.
pub trait HttpStatusCode {
    /// Returns the HTTP status code for this error.
    fn status_code(&self) -> u16;
}

impl HttpStatusCode for ApiError {
    fn status_code(&self) -> u16 {
        match self {
            ApiError::NotFound => 404,
            ApiError::BadRequest(_) => 400,
            ApiError::Database(_) => 500,
            ApiError::Configuration(_) => 500,
            ApiError::Internal(_) => 500,
            ApiError::Http { status, .. } => *status,
        }
    }
}

impl ApiError {
    /// Builds an error with an explicit status and message.
    pub fn new<T: fmt::Display>(status: u16, message: T) -> Self {
        ApiError::Http {
            status,
            message: message.to_string(),
            description: None,
            meta: None,
        }
    }

    /// Attaches a description, converting the error into the `Http` variant.
    pub fn with_description<T: fmt::Display>(self, description: T) -> Self {
        let (status, message, meta) = self.into_parts();
        ApiError::Http {
            status,
            message,
            description: Some(description.to_string()),
            meta,
        }
    }

    /// Attaches meta information, converting the error into the `Http` variant.
    pub fn with_meta(self, meta: Meta) -> Self {
        let status = self.status_code();
        let message = self.message();
        let description = self.description();
        ApiError::Http {
            status,
            message,
            description,
            meta: Some(meta),
        }
    }

    /// Short, human readable summary. Hydrated as the error `title`.
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Longer explanation. Hydrated as the error `detail`.
    pub fn description(&self) -> Option<String> {
        match self {
            ApiError::NotFound => None,
            ApiError::BadRequest(description)
            | ApiError::Database(description)
            | ApiError::Configuration(description)
            | ApiError::Internal(description) => Some(description.clone()),
            ApiError::Http { description, .. } => description.clone(),
        }
    }

    /// Free-form meta information. Hydrated as the error `meta`.
    pub fn meta(&self) -> Option<Meta> {
        match self {
            ApiError::Http { meta, .. } => meta.clone(),
            _ => None,
        }
    }

    fn into_parts(self) -> (u16, String, Option<Meta>) {
        let status = self.status_code();
        let message = self.message();
        let meta = self.meta();
        (status, message, meta)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<serde_urlencoded::de::Error> for ApiError {
    fn from(err: serde_urlencoded::de::Error) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

// Utility functions for error handling
pub fn not_found() -> ApiError {
    ApiError::NotFound
}

pub fn bad_request<T: fmt::Display>(message: T) -> ApiError {
    ApiError::BadRequest(message.to_string())
}

pub fn database_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::Database(message.to_string())
}

pub fn config_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::Configuration(message.to_string())
}

pub fn internal_error<T: fmt::Display>(message: T) -> ApiError {
    ApiError::Internal(message.to_string())
}

/// Builds a meta object from a JSON value, ignoring anything that isn't an object.
pub fn meta_from(value: Value) -> Option<Meta> {
    match value {
        Value::Object(map) => Some(map),
        _ => None,
    }
}
