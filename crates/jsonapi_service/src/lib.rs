//! JSON:API hydration service and axum controllers
//!
//! This crate turns records from any [`jsonapi_common::DatabaseAdapter`] into
//! JSON:API documents and exposes them over HTTP.
//!
//! # Features
//!
//! - [`JsonApiService`]: find, find-by-id, create, update and delete with
//!   document hydration and error documents
//! - [`ResourceEndpoint`]: per-operation axum method routers with 404 handling
//!   and an optional document hook
//! - [`JsonApiController`]: all five routes of a model in one router
//! - OpenAPI documentation (with the `openapi` feature)
//!
//! # Example
//!
//! ```rust,no_run
//! use axum::Router;
//! use jsonapi_common::MemoryAdapter;
//! use jsonapi_service::{JsonApiConfiguration, JsonApiController, JsonApiModule};
//! use std::sync::Arc;
//!
//! let service = JsonApiModule::for_root(JsonApiConfiguration::new(Arc::new(
//!     MemoryAdapter::new(),
//! )));
//! let app: Router = Router::new().nest("/api/users", JsonApiController::new("User").router(service));
//! ```
//!
//! # API Endpoints
//!
//! - `GET /` - List resources (`filter[..]`, `sort`, `page[..]`)
//! - `POST /` - Create a resource
//! - `GET /{id}` - Fetch a resource
//! - `PATCH /{id}` - Update a resource
//! - `DELETE /{id}` - Delete a resource

#[cfg(feature = "openapi")]
pub mod doc;
pub mod handlers;
pub mod module;
pub mod routes;
pub mod service;

pub use handlers::{Action, DocumentHook, EndpointState, ResourceEndpoint};
pub use module::{JsonApiConfiguration, JsonApiModule};
pub use routes::JsonApiController;
pub use service::{HydrationData, JsonApiService};

#[cfg(feature = "openapi")]
pub mod openapi {
    pub use crate::doc::JsonApiDoc;
}
