//! Conversions between JSON records and BSON documents.

use bson::{oid::ObjectId, Bson, Document};
use jsonapi_common::{JsonApiOptions, Record, SortField};
use serde_json::{Map, Number, Value};

use crate::error::DbError;

/// Field MongoDB keeps the document id in.
pub const ID_FIELD: &str = "_id";

/// Renders a BSON value as plain JSON.
///
/// Object ids become their hex string and dates RFC 3339 strings; everything
/// else follows relaxed extended JSON.
pub fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(date) => date
            .try_to_rfc3339_string()
            .map(Value::String)
            .unwrap_or_else(|_| Value::from(date.timestamp_millis())),
        Bson::Document(document) => Value::Object(document_to_record(document)),
        Bson::Array(values) => Value::Array(values.into_iter().map(bson_to_json).collect()),
        Bson::Int32(number) => Value::from(number),
        Bson::Int64(number) => Value::from(number),
        Bson::Double(number) => Number::from_f64(number)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        other => other.into_relaxed_extjson(),
    }
}

pub fn document_to_record(document: Document) -> Record {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

pub fn record_to_document(record: &Record) -> Result<Document, DbError> {
    Ok(bson::to_document(record)?)
}

/// Id filter: a 24 character hex id matches an `ObjectId`, anything else a
/// string `_id`.
pub fn id_filter(id: &str) -> Document {
    let mut filter = Document::new();
    filter.insert(ID_FIELD, id_to_bson(id));
    filter
}

pub fn id_to_bson(id: &str) -> Bson {
    match ObjectId::parse_str(id) {
        Ok(oid) => Bson::ObjectId(oid),
        Err(_) => Bson::String(id.to_string()),
    }
}

/// Builds the find filter from `filter[...]` parameters.
///
/// Arrays (repeated parameters) become `$in`, `_id` strings are cast like
/// [`id_to_bson`].
pub fn filter_document(filter: &Record) -> Result<Document, DbError> {
    let mut document = Document::new();
    for (key, value) in filter {
        let is_id = key == ID_FIELD;
        let value = match value {
            Value::Array(values) => in_operator(
                values
                    .iter()
                    .map(|value| filter_value(value, is_id))
                    .collect::<Result<Vec<Bson>, DbError>>()?,
            ),
            value => filter_value(value, is_id)?,
        };
        document.insert(key.clone(), value);
    }
    Ok(document)
}

/// Id filter narrowed by the scope the options' `parse_query` adds, so a
/// record hidden from listings is hidden by id too.
pub fn scoped_id_filter(id: &str, scope: &Record) -> Result<Document, DbError> {
    let mut filter = filter_document(scope)?;
    for (key, value) in id_filter(id) {
        filter.insert(key, value);
    }
    Ok(filter)
}

fn filter_value(value: &Value, is_id: bool) -> Result<Bson, DbError> {
    match value {
        Value::String(id) if is_id => Ok(id_to_bson(id)),
        value => Ok(bson::to_bson(value)?),
    }
}

fn in_operator(values: Vec<Bson>) -> Bson {
    let mut operator = Document::new();
    operator.insert("$in", Bson::Array(values));
    Bson::Document(operator)
}

/// `[-createdAt, name]` becomes `{createdAt: -1, name: 1}`.
pub fn sort_document(sort: &[SortField]) -> Option<Document> {
    if sort.is_empty() {
        return None;
    }
    let mut document = Document::new();
    for field in sort {
        document.insert(field.field.clone(), field.order.as_i32());
    }
    Some(document)
}

/// Projection document from the options' field list, `None` without one.
pub fn projection_document(options: &JsonApiOptions) -> Option<Document> {
    let (include, exclude) = options.projection_fields();
    if include.is_empty() && exclude.is_empty() {
        return None;
    }
    let mut document = Document::new();
    // MongoDB only accepts an `_id` exclusion inside an inclusion projection.
    let inclusive = !include.is_empty();
    for field in include {
        document.insert(field, 1);
    }
    for field in exclude {
        if !inclusive || field == ID_FIELD {
            document.insert(field, 0);
        }
    }
    Some(document)
}

/// The `$set` body of an update; `_id` is immutable so it's dropped.
pub fn set_document(body: &Record) -> Result<Document, DbError> {
    let mut fields = Map::new();
    for (key, value) in body {
        if key != ID_FIELD {
            fields.insert(key.clone(), value.clone());
        }
    }
    record_to_document(&fields)
}

/// Collection name for a model: `User` becomes `users`, `News` stays `news`.
pub fn default_collection_name(model_name: &str) -> String {
    let name = model_name.to_lowercase();
    if name.ends_with('s') {
        name
    } else {
        format!("{name}s")
    }
}
