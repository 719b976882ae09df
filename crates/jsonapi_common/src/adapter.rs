// --- File: crates/jsonapi_common/src/adapter.rs ---
//! The database adapter abstraction.
//!
//! A [`DatabaseAdapter`] isolates the document-mapping logic from any specific
//! database driver. The service layer only ever talks to this trait, so a
//! MongoDB adapter, an in-memory adapter or a mock can be swapped in.

use serde_json::Value;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::error::ApiError;
use crate::models::Record;
use crate::query::ResourceQuery;

/// Type alias for a boxed future that returns a Result
pub type BoxFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Hook that may rewrite the parsed query before the adapter executes it.
pub type ParseQueryFn = Arc<dyn Fn(&mut ResourceQuery) + Send + Sync>;

/// Transform applied to the attributes of every hydrated record.
pub type ParseObjectFn = Arc<dyn Fn(Record) -> Record + Send + Sync>;

/// Per-resource options shared by adapter calls and hydration.
#[derive(Clone, Default)]
pub struct JsonApiOptions {
    /// Space separated field list; a leading `-` excludes the field.
    pub projection: Option<String>,
    /// Driver specific collation, e.g. `{"locale": "en", "strength": 2}`.
    pub collation: Option<Value>,
    /// Rewrites the query before execution.
    pub parse_query: Option<ParseQueryFn>,
    /// Rewrites attributes during hydration.
    pub parse_object: Option<ParseObjectFn>,
}

impl JsonApiOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn projection<T: Into<String>>(mut self, projection: T) -> Self {
        self.projection = Some(projection.into());
        self
    }

    pub fn collation(mut self, collation: Value) -> Self {
        self.collation = Some(collation);
        self
    }

    pub fn parse_query<F>(mut self, f: F) -> Self
    where
        F: Fn(&mut ResourceQuery) + Send + Sync + 'static,
    {
        self.parse_query = Some(Arc::new(f));
        self
    }

    pub fn parse_object<F>(mut self, f: F) -> Self
    where
        F: Fn(Record) -> Record + Send + Sync + 'static,
    {
        self.parse_object = Some(Arc::new(f));
        self
    }

    /// Applies `parse_query` to a copy of `query`, if set.
    pub fn prepare_query(&self, query: &ResourceQuery) -> ResourceQuery {
        let mut query = query.clone();
        if let Some(parse_query) = &self.parse_query {
            parse_query(&mut query);
        }
        query
    }

    /// Splits the projection into included and excluded field names.
    pub fn projection_fields(&self) -> (Vec<String>, Vec<String>) {
        let mut include = Vec::new();
        let mut exclude = Vec::new();
        if let Some(projection) = &self.projection {
            for field in projection.split_whitespace() {
                match field.strip_prefix('-') {
                    Some("") => {}
                    Some(name) => exclude.push(name.to_string()),
                    None => include.push(field.trim_start_matches('+').to_string()),
                }
            }
        }
        (include, exclude)
    }
}

impl fmt::Debug for JsonApiOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonApiOptions")
            .field("projection", &self.projection)
            .field("collation", &self.collation)
            .field("parse_query", &self.parse_query.is_some())
            .field("parse_object", &self.parse_object.is_some())
            .finish()
    }
}

/// A trait for data-access adapters.
///
/// `model_name` identifies the resource type; how it maps onto storage
/// (collection, table, key prefix) is up to the adapter.
pub trait DatabaseAdapter: Send + Sync {
    /// Find all records matching the query, in storage order.
    fn find<'a>(
        &'a self,
        model_name: &'a str,
        query: &'a ResourceQuery,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Vec<Record>, ApiError>;

    /// Find a single record by id. `None` when it doesn't exist.
    fn find_by_id<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Option<Record>, ApiError>;

    /// Persist a new record and return it as stored, id included.
    fn create<'a>(
        &'a self,
        model_name: &'a str,
        body: Record,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Record, ApiError>;

    /// Merge `body` into an existing record. `None` when no record matched.
    fn update<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        body: Record,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Option<Record>, ApiError>;

    /// Delete a record by id, returning the number of deleted records.
    fn delete<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, u64, ApiError>;

    /// Extract the id of a record.
    fn get_id(&self, record: &Record) -> Option<String>;
}
