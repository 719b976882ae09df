//! [`DatabaseAdapter`] backed by MongoDB collections.

use bson::{doc, Document};
use futures::TryStreamExt;
use jsonapi_common::{ApiError, BoxFuture, DatabaseAdapter, JsonApiOptions, Record, ResourceQuery};
use mongodb::{
    options::{
        Collation, DeleteOptions, FindOneAndUpdateOptions, FindOneOptions, FindOptions,
        ReturnDocument,
    },
    Collection,
};
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::client::MongoClient;
use crate::convert::{
    bson_to_json, default_collection_name, document_to_record, filter_document, id_filter,
    projection_document, record_to_document, scoped_id_filter, set_document, sort_document,
    ID_FIELD,
};
use crate::error::DbError;

/// Maps each model onto a collection of one database.
///
/// The collection defaults to the lower-cased, pluralised model name and can
/// be overridden per model.
#[derive(Debug, Clone)]
pub struct MongoAdapter {
    client: MongoClient,
    collections: HashMap<String, String>,
}

impl MongoAdapter {
    pub fn new(client: MongoClient) -> Self {
        Self {
            client,
            collections: HashMap::new(),
        }
    }

    /// Stores `model_name` records in `collection` instead of the default.
    pub fn collection_name<M, C>(mut self, model_name: M, collection: C) -> Self
    where
        M: Into<String>,
        C: Into<String>,
    {
        self.collections.insert(model_name.into(), collection.into());
        self
    }

    pub fn client(&self) -> &MongoClient {
        &self.client
    }

    pub fn collection_for(&self, model_name: &str) -> String {
        self.collections
            .get(model_name)
            .cloned()
            .unwrap_or_else(|| default_collection_name(model_name))
    }

    fn collection(&self, model_name: &str) -> Collection<Document> {
        self.client.collection(&self.collection_for(model_name))
    }
}

fn collation(options: &JsonApiOptions) -> Result<Option<Collation>, DbError> {
    options
        .collation
        .clone()
        .map(|value| {
            serde_json::from_value::<Collation>(value)
                .map_err(|e| DbError::QueryError(format!("invalid collation: {e}")))
        })
        .transpose()
}

impl MongoAdapter {
    async fn find_records(
        &self,
        model_name: &str,
        query: &ResourceQuery,
        options: &JsonApiOptions,
    ) -> Result<Vec<Record>, DbError> {
        let query = options.prepare_query(query);
        let filter = filter_document(&query.filter)?;
        debug!("find {} where {}", self.collection_for(model_name), filter);

        let mut find_options = FindOptions::default();
        find_options.projection = projection_document(options);
        find_options.sort = sort_document(&query.sort);
        find_options.collation = collation(options)?;
        if let Some(page) = query.page {
            let limit = i64::try_from(page.limit)
                .map_err(|_| DbError::QueryError("page limit is too large".to_string()))?;
            find_options.skip = Some(page.offset);
            find_options.limit = Some(limit);
        }

        let documents: Vec<Document> = self
            .collection(model_name)
            .find(filter)
            .with_options(find_options)
            .await?
            .try_collect()
            .await?;
        Ok(documents.into_iter().map(document_to_record).collect())
    }

    async fn find_record(
        &self,
        model_name: &str,
        id: &str,
        options: &JsonApiOptions,
    ) -> Result<Option<Record>, DbError> {
        let mut find_options = FindOneOptions::default();
        find_options.projection = projection_document(options);
        find_options.collation = collation(options)?;
        let scope = options.prepare_query(&ResourceQuery::default());
        let filter = scoped_id_filter(id, &scope.filter)?;
        debug!("find one {} where {}", self.collection_for(model_name), filter);

        let document = self
            .collection(model_name)
            .find_one(filter)
            .with_options(find_options)
            .await?;
        Ok(document.map(document_to_record))
    }

    async fn insert_record(
        &self,
        model_name: &str,
        body: Record,
        options: &JsonApiOptions,
    ) -> Result<Record, DbError> {
        let collection = self.collection(model_name);
        let document = record_to_document(&body)?;
        let inserted = collection.insert_one(document.clone()).await?;
        debug!("inserted {} {}", model_name, inserted.inserted_id);

        let mut filter = Document::new();
        filter.insert(ID_FIELD, inserted.inserted_id.clone());
        let mut find_options = FindOneOptions::default();
        find_options.projection = projection_document(options);

        let stored = collection
            .find_one(filter)
            .with_options(find_options)
            .await?;
        Ok(match stored {
            Some(stored) => document_to_record(stored),
            None => {
                let mut record = document_to_record(document);
                record.insert(ID_FIELD.to_string(), bson_to_json(inserted.inserted_id));
                record
            }
        })
    }

    async fn update_record(
        &self,
        model_name: &str,
        id: &str,
        body: Record,
        options: &JsonApiOptions,
    ) -> Result<Option<Record>, DbError> {
        let set = set_document(&body)?;
        if set.is_empty() {
            return self.find_record(model_name, id, options).await;
        }

        let mut update_options = FindOneAndUpdateOptions::default();
        update_options.return_document = Some(ReturnDocument::After);
        update_options.projection = projection_document(options);
        update_options.collation = collation(options)?;

        let updated = self
            .collection(model_name)
            .find_one_and_update(id_filter(id), doc! { "$set": set })
            .with_options(update_options)
            .await?;
        Ok(updated.map(document_to_record))
    }

    async fn delete_record(
        &self,
        model_name: &str,
        id: &str,
        options: &JsonApiOptions,
    ) -> Result<u64, DbError> {
        let mut delete_options = DeleteOptions::default();
        delete_options.collation = collation(options)?;

        let result = self
            .collection(model_name)
            .delete_one(id_filter(id))
            .with_options(delete_options)
            .await?;
        Ok(result.deleted_count)
    }
}

impl DatabaseAdapter for MongoAdapter {
    fn find<'a>(
        &'a self,
        model_name: &'a str,
        query: &'a ResourceQuery,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Vec<Record>, ApiError> {
        Box::pin(async move { Ok(self.find_records(model_name, query, options).await?) })
    }

    fn find_by_id<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Option<Record>, ApiError> {
        Box::pin(async move { Ok(self.find_record(model_name, id, options).await?) })
    }

    fn create<'a>(
        &'a self,
        model_name: &'a str,
        body: Record,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Record, ApiError> {
        Box::pin(async move { Ok(self.insert_record(model_name, body, options).await?) })
    }

    fn update<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        body: Record,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Option<Record>, ApiError> {
        Box::pin(async move { Ok(self.update_record(model_name, id, body, options).await?) })
    }

    fn delete<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, u64, ApiError> {
        Box::pin(async move { Ok(self.delete_record(model_name, id, options).await?) })
    }

    fn get_id(&self, record: &Record) -> Option<String> {
        match record.get(ID_FIELD)? {
            Value::String(id) => Some(id.clone()),
            Value::Null => None,
            // Extended JSON form of an id that wasn't converted.
            Value::Object(object) => match object.get("$oid") {
                Some(Value::String(oid)) => Some(oid.clone()),
                _ => Some(Value::Object(object.clone()).to_string()),
            },
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    async fn adapter() -> MongoAdapter {
        let client = MongoClient::from_url("mongodb://localhost:27017", "jsonapi_test")
            .await
            .unwrap();
        MongoAdapter::new(client).collection_name("Person", "people")
    }

    #[tokio::test]
    async fn test_collection_names() {
        let adapter = adapter().await;
        assert_eq!(adapter.collection_for("Person"), "people");
        assert_eq!(adapter.collection_for("User"), "users");
    }

    #[tokio::test]
    async fn test_get_id() {
        let adapter = adapter().await;
        let record = |value: Value| match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        };

        assert_eq!(
            adapter.get_id(&record(json!({"_id": "65f1c0ffee0123456789abcd"}))),
            Some("65f1c0ffee0123456789abcd".to_string())
        );
        assert_eq!(
            adapter.get_id(&record(json!({"_id": {"$oid": "65f1c0ffee0123456789abcd"}}))),
            Some("65f1c0ffee0123456789abcd".to_string())
        );
        assert_eq!(adapter.get_id(&record(json!({"_id": 7}))), Some("7".to_string()));
        assert_eq!(adapter.get_id(&record(json!({"name": "x"}))), None);
    }

    #[test]
    fn test_collation_from_options() {
        let options = JsonApiOptions::new().collation(json!({"locale": "en", "strength": 2}));
        let collation = collation(&options).unwrap().unwrap();
        assert_eq!(collation.locale, "en");

        let options = JsonApiOptions::new().collation(json!({"strength": 2}));
        assert!(matches!(super::collation(&options), Err(DbError::QueryError(_))));
    }
}
