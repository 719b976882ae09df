//! Turns adapter records into JSON:API documents.
//!
//! [`JsonApiService`] sits between the HTTP handlers and a [`DatabaseAdapter`].
//! Every operation calls the adapter, then hydrates the returned records into
//! a [`TopLevelDocument`].
//!
//! Records may carry an object under the tag field (`_jv` by default). Its
//! members (`links`, `meta`, ...) are removed from the attributes and merged
//! onto the resource object itself.

use jsonapi_common::{
    ApiError, DatabaseAdapter, ErrorObject, JsonApiOptions, Meta, PrimaryData, Record,
    RequestDocument, Resource, ResourceQuery, TopLevelDocument,
};
use jsonapi_config::DEFAULT_JV_TAG;
use serde_json::{json, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Records handed to [`JsonApiService::hydrate_data`].
#[derive(Debug, Clone, PartialEq)]
pub enum HydrationData {
    One(Record),
    Many(Vec<Record>),
}

impl From<Record> for HydrationData {
    fn from(record: Record) -> Self {
        HydrationData::One(record)
    }
}

impl From<Vec<Record>> for HydrationData {
    fn from(records: Vec<Record>) -> Self {
        HydrationData::Many(records)
    }
}

/// The hydration service, shared by every controller.
#[derive(Clone)]
pub struct JsonApiService {
    adapter: Arc<dyn DatabaseAdapter>,
    jv_tag: String,
}

impl JsonApiService {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self::with_jv_tag(adapter, DEFAULT_JV_TAG)
    }

    pub fn with_jv_tag<T: Into<String>>(adapter: Arc<dyn DatabaseAdapter>, jv_tag: T) -> Self {
        Self {
            adapter,
            jv_tag: jv_tag.into(),
        }
    }

    pub fn adapter(&self) -> &Arc<dyn DatabaseAdapter> {
        &self.adapter
    }

    /// Name of the record field holding JSON:API members.
    pub fn jv_tag(&self) -> &str {
        &self.jv_tag
    }

    /// Finds all records matching `query`. `data` is always an array.
    pub async fn find(
        &self,
        model_name: &str,
        query: &ResourceQuery,
        options: &JsonApiOptions,
    ) -> Result<TopLevelDocument, ApiError> {
        debug!("find {} with {:?}", model_name, query);
        let records = self.adapter.find(model_name, query, options).await?;
        debug!("find {} returned {} records", model_name, records.len());

        Ok(self.hydrate_top_document(
            Some(HydrationData::Many(records)),
            None,
            model_name,
            options,
            None,
        ))
    }

    /// Finds a single record. `None` when the adapter has no such record.
    pub async fn find_by_id(
        &self,
        model_name: &str,
        id: &str,
        options: &JsonApiOptions,
    ) -> Result<Option<TopLevelDocument>, ApiError> {
        debug!("find_by_id {} {}", model_name, id);
        let Some(record) = self.adapter.find_by_id(model_name, id, options).await? else {
            debug!("{} {} not found", model_name, id);
            return Ok(None);
        };

        Ok(Some(self.hydrate_top_document(
            Some(HydrationData::One(record)),
            None,
            model_name,
            options,
            None,
        )))
    }

    /// Creates a record from `body.data.attributes`.
    ///
    /// With a `url`, the record gets a self link `{url}/{id}` stored under the
    /// tag field and persisted through a second adapter call.
    pub async fn create(
        &self,
        model_name: &str,
        body: RequestDocument,
        options: &JsonApiOptions,
        url: Option<&str>,
    ) -> Result<TopLevelDocument, ApiError> {
        debug!("create {}", model_name);
        let mut record = self
            .adapter
            .create(model_name, body.data.attributes, options)
            .await?;

        if let Some(url) = url {
            match self.adapter.get_id(&record) {
                Some(id) => {
                    let self_link = format!("{}/{}", collection_url(url), id);
                    record.insert(self.jv_tag.clone(), json!({ "links": { "self": self_link } }));
                    self.adapter
                        .update(model_name, &id, record.clone(), options)
                        .await?;
                }
                None => warn!("created {} has no id, skipping self link", model_name),
            }
        }

        Ok(self.hydrate_top_document(
            Some(HydrationData::One(record)),
            None,
            model_name,
            options,
            None,
        ))
    }

    /// Updates a record with `body.data.attributes`. Without a matching
    /// record the document has no `data`.
    pub async fn update(
        &self,
        model_name: &str,
        id: &str,
        body: RequestDocument,
        options: &JsonApiOptions,
    ) -> Result<TopLevelDocument, ApiError> {
        debug!("update {} {}", model_name, id);
        let updated = self
            .adapter
            .update(model_name, id, body.data.attributes, options)
            .await?;

        Ok(self.hydrate_top_document(
            updated.map(HydrationData::One),
            None,
            model_name,
            options,
            None,
        ))
    }

    /// Deletes a record. The document reports `meta.count`.
    pub async fn delete(
        &self,
        model_name: &str,
        id: &str,
        options: &JsonApiOptions,
    ) -> Result<TopLevelDocument, ApiError> {
        debug!("delete {} {}", model_name, id);
        let count = self.adapter.delete(model_name, id, options).await?;
        debug!("delete {} {} removed {}", model_name, id, count);

        let mut meta = Meta::new();
        meta.insert("count".to_string(), Value::from(count));
        Ok(self.hydrate_top_document(None, None, model_name, options, Some(meta)))
    }

    /// Builds a top-level document. When `errors` is non-empty the document
    /// carries only the errors (and `meta`), never `data`.
    pub fn hydrate_top_document(
        &self,
        data: Option<HydrationData>,
        errors: Option<&[ApiError]>,
        resource_type: &str,
        options: &JsonApiOptions,
        meta: Option<Meta>,
    ) -> TopLevelDocument {
        let mut document = TopLevelDocument {
            meta,
            ..TopLevelDocument::default()
        };

        match errors {
            Some(errors) if !errors.is_empty() => {
                document.errors = Some(self.hydrate_errors(errors));
            }
            _ => {
                document.data =
                    data.and_then(|data| self.hydrate_data(data, resource_type, options));
            }
        }
        document
    }

    /// Hydrates one record into a single resource, many into an array.
    pub fn hydrate_data(
        &self,
        data: HydrationData,
        resource_type: &str,
        options: &JsonApiOptions,
    ) -> Option<PrimaryData> {
        match data {
            HydrationData::Many(records) => Some(PrimaryData::Collection(
                records
                    .into_iter()
                    .filter_map(|record| {
                        self.hydrate_single_object(Some(record), resource_type, options)
                    })
                    .collect(),
            )),
            HydrationData::One(record) => self
                .hydrate_single_object(Some(record), resource_type, options)
                .map(|resource| PrimaryData::Single(Box::new(resource))),
        }
    }

    /// Hydrates a single record into a resource object.
    pub fn hydrate_single_object(
        &self,
        record: Option<Record>,
        resource_type: &str,
        options: &JsonApiOptions,
    ) -> Option<Resource> {
        let mut record = record?;
        let tag = record.remove(&self.jv_tag);

        let mut resource = Resource::new(resource_type);
        resource.id = self.adapter.get_id(&record);
        resource.attributes = Some(match &options.parse_object {
            Some(parse_object) => parse_object(record),
            None => record,
        });

        match tag {
            Some(Value::Object(tag)) => resource.merge_tag(tag),
            Some(Value::Null) | None => {}
            Some(other) => warn!(
                "ignoring non-object {} field on {} {:?}: {}",
                self.jv_tag, resource_type, resource.id, other
            ),
        }
        Some(resource)
    }

    pub fn hydrate_errors(&self, errors: &[ApiError]) -> Vec<ErrorObject> {
        errors.iter().map(|error| self.hydrate_error(error)).collect()
    }

    /// Maps `status`, `message`, `description` and `meta` onto the error
    /// object's `status`, `title`, `detail` and `meta`.
    pub fn hydrate_error(&self, error: &ApiError) -> ErrorObject {
        ErrorObject::from(error)
    }
}

impl fmt::Debug for JsonApiService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonApiService")
            .field("jv_tag", &self.jv_tag)
            .finish_non_exhaustive()
    }
}

// The request URL without query string or trailing slash.
fn collection_url(url: &str) -> &str {
    let url = url.split(['?', '#']).next().unwrap_or(url);
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_common::{Link, Links, MemoryAdapter};

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    fn service() -> (MemoryAdapter, JsonApiService) {
        let adapter = MemoryAdapter::new();
        let service = JsonApiService::new(Arc::new(adapter.clone()));
        (adapter, service)
    }

    #[test]
    fn test_hydrate_single_object_strips_and_merges_tag() {
        let (_, service) = service();
        let resource = service
            .hydrate_single_object(
                Some(record(json!({
                    "_id": "1",
                    "name": "Ada",
                    "_jv": {"links": {"self": "http://x/users/1"}, "meta": {"v": 2}}
                }))),
                "User",
                &JsonApiOptions::new(),
            )
            .unwrap();

        assert_eq!(resource.id.as_deref(), Some("1"));
        assert_eq!(resource.resource_type, "User");
        assert_eq!(
            resource.attributes,
            Some(record(json!({"_id": "1", "name": "Ada"})))
        );
        assert_eq!(
            resource.links,
            Some(Links::with_self("http://x/users/1"))
        );
        assert_eq!(resource.meta, Some(record(json!({"v": 2}))));
    }

    #[test]
    fn test_hydrate_single_object_none() {
        let (_, service) = service();
        assert!(service
            .hydrate_single_object(None, "User", &JsonApiOptions::new())
            .is_none());
    }

    #[test]
    fn test_parse_object_transforms_attributes() {
        let (_, service) = service();
        let options = JsonApiOptions::new().parse_object(|mut record| {
            record.remove("password");
            record
        });
        let resource = service
            .hydrate_single_object(
                Some(record(json!({"_id": "1", "password": "secret"}))),
                "User",
                &options,
            )
            .unwrap();
        assert_eq!(resource.attributes, Some(record(json!({"_id": "1"}))));
    }

    #[test]
    fn test_custom_tag_field() {
        let service =
            JsonApiService::with_jv_tag(Arc::new(MemoryAdapter::new()), "__jsonapi");
        let resource = service
            .hydrate_single_object(
                Some(record(json!({"_id": "1", "__jsonapi": {"meta": {"a": 1}}, "_jv": 1}))),
                "User",
                &JsonApiOptions::new(),
            )
            .unwrap();
        assert_eq!(resource.meta, Some(record(json!({"a": 1}))));
        assert_eq!(resource.attributes.unwrap()["_jv"], 1);
    }

    #[test]
    fn test_hydrate_data_array_vs_single() {
        let (_, service) = service();
        let options = JsonApiOptions::new();

        let many = service
            .hydrate_data(HydrationData::Many(vec![]), "User", &options)
            .unwrap();
        assert_eq!(many.as_collection().map(<[Resource]>::len), Some(0));

        let one = service
            .hydrate_data(record(json!({"_id": "7"})).into(), "User", &options)
            .unwrap();
        assert_eq!(one.as_single().and_then(|r| r.id.as_deref()), Some("7"));
    }

    #[test]
    fn test_errors_win_over_data() {
        let (_, service) = service();
        let document = service.hydrate_top_document(
            Some(record(json!({"_id": "1"})).into()),
            Some(&[ApiError::NotFound]),
            "User",
            &JsonApiOptions::new(),
            None,
        );
        assert!(document.data.is_none());
        assert_eq!(document.errors.map(|errors| errors.len()), Some(1));
    }

    #[test]
    fn test_hydrate_error_field_mapping() {
        let (_, service) = service();
        let error = ApiError::new(422, "Invalid")
            .with_description("name is required")
            .with_meta(record(json!({"field": "name"})));

        let object = service.hydrate_error(&error);
        assert_eq!(object.status.as_deref(), Some("422"));
        assert_eq!(object.title.as_deref(), Some("Invalid"));
        assert_eq!(object.detail.as_deref(), Some("name is required"));
        assert_eq!(object.meta, Some(record(json!({"field": "name"}))));
    }

    #[tokio::test]
    async fn test_create_stores_self_link() {
        let (adapter, service) = service();
        let options = JsonApiOptions::new();
        let body = RequestDocument::from_attributes(record(json!({"name": "Ada"})));

        let document = service
            .create("User", body, &options, Some("http://localhost/api/users/?x=1"))
            .await
            .unwrap();

        let resource = document.data.as_ref().and_then(PrimaryData::as_single).unwrap();
        let id = resource.id.clone().unwrap();
        let expected = format!("http://localhost/api/users/{id}");
        assert_eq!(
            resource.links.as_ref().and_then(|l| l.self_link.clone()),
            Some(Link::Href(expected.clone()))
        );

        let stored = adapter
            .find_by_id("User", &id, &options)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["_jv"], json!({"links": {"self": expected}}));
    }

    #[tokio::test]
    async fn test_create_without_url_has_no_links() {
        let (_, service) = service();
        let body = RequestDocument::from_attributes(record(json!({"name": "Ada"})));
        let document = service
            .create("User", body, &JsonApiOptions::new(), None)
            .await
            .unwrap();
        let resource = document.data.as_ref().and_then(PrimaryData::as_single).unwrap();
        assert!(resource.links.is_none());
    }

    #[tokio::test]
    async fn test_find_by_id_and_update_missing() {
        let (_, service) = service();
        let options = JsonApiOptions::new();

        assert!(service
            .find_by_id("User", "nope", &options)
            .await
            .unwrap()
            .is_none());

        let body = RequestDocument::from_attributes(record(json!({"name": "x"})));
        let document = service.update("User", "nope", body, &options).await.unwrap();
        assert!(!document.has_data());
    }

    #[tokio::test]
    async fn test_find_and_delete() {
        let (adapter, service) = service();
        adapter
            .seed("User", vec![record(json!({"_id": "1"})), record(json!({"_id": "2"}))])
            .await;
        let options = JsonApiOptions::new();

        let document = service
            .find("User", &ResourceQuery::default(), &options)
            .await
            .unwrap();
        let ids: Vec<_> = document
            .data
            .as_ref()
            .and_then(PrimaryData::as_collection)
            .unwrap()
            .iter()
            .filter_map(|r| r.id.clone())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);

        let document = service.delete("User", "1", &options).await.unwrap();
        assert_eq!(document.meta_count(), Some(1));
        let document = service.delete("User", "1", &options).await.unwrap();
        assert_eq!(document.meta_count(), Some(0));
    }
}
