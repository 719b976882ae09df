//! In-memory adapter for testing and development

use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::adapter::{BoxFuture, DatabaseAdapter, JsonApiOptions};
use crate::error::ApiError;
use crate::models::Record;
use crate::query::{ResourceQuery, SortOrder};

/// Field holding the record id, same name document databases use.
pub const ID_FIELD: &str = "_id";

/// Adapter keeping records per model in insertion order.
///
/// Supports equality filters, sorting, skip/limit and projections. Ids are
/// random UUID strings unless the created body already carries an `_id`.
#[derive(Clone, Default)]
pub struct MemoryAdapter {
    data: Arc<RwLock<HashMap<String, Vec<Record>>>>,
}

impl MemoryAdapter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts records as they are, for seeding tests.
    pub async fn seed(&self, model_name: &str, records: Vec<Record>) {
        let mut data = self.data.write().await;
        data.entry(model_name.to_string())
            .or_default()
            .extend(records);
    }

    /// Number of records stored for a model.
    pub async fn count(&self, model_name: &str) -> usize {
        let data = self.data.read().await;
        data.get(model_name).map(Vec::len).unwrap_or(0)
    }
}

fn record_id(record: &Record) -> Option<String> {
    match record.get(ID_FIELD)? {
        Value::String(id) => Some(id.clone()),
        Value::Null => None,
        other => Some(other.to_string()),
    }
}

fn matches_filter(record: &Record, filter: &Record) -> bool {
    filter
        .iter()
        .all(|(key, expected)| value_matches(expected, record.get(key).unwrap_or(&Value::Null)))
}

// Query string values arrive as strings, so `"5"` matches a stored `5`.
fn value_matches(expected: &Value, actual: &Value) -> bool {
    if expected == actual {
        return true;
    }
    match (expected, actual) {
        (Value::Array(options), _) => options.iter().any(|option| value_matches(option, actual)),
        (Value::String(text), Value::Number(_) | Value::Bool(_)) => actual.to_string() == *text,
        (Value::String(text), Value::Null) => text == "null",
        _ => false,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x
            .as_f64()
            .unwrap_or_default()
            .partial_cmp(&y.as_f64().unwrap_or_default())
            .unwrap_or(Ordering::Equal),
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn project(mut record: Record, options: &JsonApiOptions) -> Record {
    let (include, exclude) = options.projection_fields();
    if !include.is_empty() {
        record.retain(|key, _| key == ID_FIELD || include.iter().any(|field| field == key));
    }
    for field in exclude {
        record.remove(&field);
    }
    record
}

impl DatabaseAdapter for MemoryAdapter {
    fn find<'a>(
        &'a self,
        model_name: &'a str,
        query: &'a ResourceQuery,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Vec<Record>, ApiError> {
        Box::pin(async move {
            let query = options.prepare_query(query);
            let data = self.data.read().await;
            let mut records: Vec<Record> = data
                .get(model_name)
                .map(|records| {
                    records
                        .iter()
                        .filter(|record| matches_filter(record, &query.filter))
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();

            if !query.sort.is_empty() {
                records.sort_by(|a, b| {
                    for sort in &query.sort {
                        let left = a.get(&sort.field).unwrap_or(&Value::Null);
                        let right = b.get(&sort.field).unwrap_or(&Value::Null);
                        let ordering = match sort.order {
                            SortOrder::Ascending => compare_values(left, right),
                            SortOrder::Descending => compare_values(right, left),
                        };
                        if ordering != Ordering::Equal {
                            return ordering;
                        }
                    }
                    Ordering::Equal
                });
            }

            let records = match query.page {
                Some(page) => records
                    .into_iter()
                    .skip(page.offset as usize)
                    .take(page.limit as usize)
                    .collect(),
                None => records,
            };

            debug!("Found {} {} records in memory", records.len(), model_name);
            Ok(records
                .into_iter()
                .map(|record| project(record, options))
                .collect())
        })
    }

    fn find_by_id<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Option<Record>, ApiError> {
        Box::pin(async move {
            let scope = options.prepare_query(&ResourceQuery::default());
            let data = self.data.read().await;
            Ok(data
                .get(model_name)
                .and_then(|records| {
                    records.iter().find(|record| {
                        record_id(record).as_deref() == Some(id)
                            && matches_filter(record, &scope.filter)
                    })
                })
                .cloned()
                .map(|record| project(record, options)))
        })
    }

    fn create<'a>(
        &'a self,
        model_name: &'a str,
        body: Record,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Record, ApiError> {
        Box::pin(async move {
            let mut record = body;
            if record_id(&record).is_none() {
                record.insert(
                    ID_FIELD.to_string(),
                    Value::String(Uuid::new_v4().to_string()),
                );
            }

            let mut data = self.data.write().await;
            let records = data.entry(model_name.to_string()).or_default();
            if let Some(id) = record_id(&record) {
                if records.iter().any(|r| record_id(r).as_deref() == Some(id.as_str())) {
                    return Err(ApiError::new(409, "Conflict")
                        .with_description(format!("{model_name} {id} already exists")));
                }
            }
            records.push(record.clone());
            Ok(project(record, options))
        })
    }

    fn update<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        body: Record,
        options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, Option<Record>, ApiError> {
        Box::pin(async move {
            let mut data = self.data.write().await;
            let Some(record) = data.get_mut(model_name).and_then(|records| {
                records
                    .iter_mut()
                    .find(|record| record_id(record).as_deref() == Some(id))
            }) else {
                return Ok(None);
            };

            for (key, value) in body {
                if key != ID_FIELD {
                    record.insert(key, value);
                }
            }
            Ok(Some(project(record.clone(), options)))
        })
    }

    fn delete<'a>(
        &'a self,
        model_name: &'a str,
        id: &'a str,
        _options: &'a JsonApiOptions,
    ) -> BoxFuture<'a, u64, ApiError> {
        Box::pin(async move {
            let mut data = self.data.write().await;
            let Some(records) = data.get_mut(model_name) else {
                return Ok(0);
            };
            match records
                .iter()
                .position(|record| record_id(record).as_deref() == Some(id))
            {
                Some(index) => {
                    records.remove(index);
                    Ok(1)
                }
                None => Ok(0),
            }
        })
    }

    fn get_id(&self, record: &Record) -> Option<String> {
        record_id(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    async fn seeded() -> MemoryAdapter {
        let adapter = MemoryAdapter::new();
        adapter
            .seed(
                "User",
                vec![
                    record(json!({"_id": "1", "name": "Ada", "age": 36, "role": "admin"})),
                    record(json!({"_id": "2", "name": "Grace", "age": 45, "role": "user"})),
                    record(json!({"_id": "3", "name": "Linus", "age": 28, "role": "user"})),
                ],
            )
            .await;
        adapter
    }

    #[tokio::test]
    async fn test_find_filters_sorts_and_pages() {
        let adapter = seeded().await;
        let options = JsonApiOptions::new();

        let query = ResourceQuery::parse("filter[role]=user&sort=-age").unwrap();
        let records = adapter.find("User", &query, &options).await.unwrap();
        let names: Vec<_> = records.iter().map(|r| r["name"].clone()).collect();
        assert_eq!(names, vec![json!("Grace"), json!("Linus")]);

        let query = ResourceQuery::parse("sort=age&page[limit]=1&page[offset]=1").unwrap();
        let records = adapter.find("User", &query, &options).await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["name"], "Ada");
    }

    #[tokio::test]
    async fn test_filter_matches_numbers_from_strings() {
        let adapter = seeded().await;
        let query = ResourceQuery::parse("filter[age]=45").unwrap();
        let records = adapter
            .find("User", &query, &JsonApiOptions::new())
            .await
            .unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0]["_id"], "2");
    }

    #[tokio::test]
    async fn test_projection_keeps_id() {
        let adapter = seeded().await;
        let options = JsonApiOptions::new().projection("name");
        let found = adapter.find_by_id("User", "1", &options).await.unwrap().unwrap();
        assert_eq!(found, record(json!({"_id": "1", "name": "Ada"})));
    }

    #[tokio::test]
    async fn test_find_by_id_respects_parse_query() {
        let adapter = seeded().await;
        let options = JsonApiOptions::new().parse_query(|query| {
            query.filter.insert("role".to_string(), json!("user"));
        });

        assert!(adapter.find_by_id("User", "1", &options).await.unwrap().is_none());
        let found = adapter.find_by_id("User", "2", &options).await.unwrap().unwrap();
        assert_eq!(found["name"], "Grace");
    }

    #[tokio::test]
    async fn test_create_update_delete() {
        let adapter = MemoryAdapter::new();
        let options = JsonApiOptions::new();

        let created = adapter
            .create("User", record(json!({"name": "Ada"})), &options)
            .await
            .unwrap();
        let id = adapter.get_id(&created).unwrap();

        let updated = adapter
            .update("User", &id, record(json!({"name": "Ada L.", "_id": "other"})), &options)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated["name"], "Ada L.");
        assert_eq!(adapter.get_id(&updated).unwrap(), id);

        assert_eq!(adapter.delete("User", &id, &options).await.unwrap(), 1);
        assert_eq!(adapter.delete("User", &id, &options).await.unwrap(), 0);
        assert_eq!(adapter.count("User").await, 0);
    }

    #[tokio::test]
    async fn test_missing_records() {
        let adapter = MemoryAdapter::new();
        let options = JsonApiOptions::new();

        assert!(adapter.find_by_id("User", "x", &options).await.unwrap().is_none());
        assert!(adapter
            .update("User", "x", Record::new(), &options)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_id_conflicts() {
        let adapter = seeded().await;
        let err = adapter
            .create("User", record(json!({"_id": "1"})), &JsonApiOptions::new())
            .await
            .unwrap_err();
        assert_eq!(crate::error::HttpStatusCode::status_code(&err), 409);
    }
}
