// --- File: crates/jsonapi_common/src/lib.rs ---

// Declare modules within this crate
pub mod adapter; // Database adapter interface and options
pub mod error; // Error handling
pub mod http; // HTTP utilities
pub mod logging; // Logging utilities
pub mod memory; // In-memory adapter
pub mod models; // JSON:API document types
pub mod query; // Query string parsing

// Re-export the adapter interface for easier access
pub use adapter::{BoxFuture, DatabaseAdapter, JsonApiOptions, ParseObjectFn, ParseQueryFn};
pub use memory::MemoryAdapter;

// Re-export error types and utilities for easier access
pub use error::{
    bad_request, config_error, database_error, internal_error, not_found, ApiError,
    HttpStatusCode,
};

// Re-export HTTP utilities for easier access
pub use http::{full_url, IntoHttpResponse, JsonApiResponse, JSON_API_CONTENT_TYPE};

// Re-export logging utilities for easier access
pub use logging::{init, init_with_level, log_error};

// Re-export document types for easier access
pub use models::{
    ErrorObject, ErrorSource, Link, Links, Meta, PrimaryData, Record, RequestData,
    RequestDocument, Resource, ResourceIdentifier, TopLevelDocument,
};
pub use query::{Page, ResourceQuery, SortField, SortOrder};

// This crate holds everything the service and the adapters share: the JSON:API
// document model, the error type and its HTTP rendering, the adapter trait and
// the query parser.
