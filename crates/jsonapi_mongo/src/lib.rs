//! MongoDB adapter for the JSON:API service
//!
//! This crate implements [`jsonapi_common::DatabaseAdapter`] on top of the
//! official `mongodb` driver. Each model is stored in its own collection of a
//! single database.
//!
//! # Features
//!
//! - Connection from the `database` configuration section
//! - Filters, sorting, pagination, projections and collations
//! - `_id` values that look like object ids are matched as `ObjectId`
//! - Object ids and dates rendered as plain JSON strings
//!
//! # Example
//!
//! ```rust,no_run
//! use jsonapi_mongo::{MongoAdapter, MongoClient};
//!
//! async fn setup_adapter() -> Result<MongoAdapter, Box<dyn std::error::Error>> {
//!     let client = MongoClient::from_url("mongodb://localhost:27017", "app").await?;
//!     client.ping().await?;
//!     Ok(MongoAdapter::new(client).collection_name("Person", "people"))
//! }
//! ```

pub mod adapter;
pub mod client;
pub mod convert;
pub mod error;
pub mod factory;

pub use adapter::MongoAdapter;
pub use client::MongoClient;
pub use error::DbError;
pub use factory::MongoClientFactory;
