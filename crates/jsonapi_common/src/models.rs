// --- File: crates/jsonapi_common/src/models.rs ---

//! JSON:API document types.
//!
//! See <https://jsonapi.org/format/#document-structure>. Optional members are
//! omitted from the serialized output when absent.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{ApiError, HttpStatusCode};

/// A raw persisted record, as returned by a database adapter.
pub type Record = Map<String, Value>;

/// Free-form meta information.
pub type Meta = Map<String, Value>;

/// A link, either a plain URL or an object with `href` and `meta`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Link {
    Href(String),
    Object {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        href: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
        meta: Option<Meta>,
    },
}

impl From<String> for Link {
    fn from(href: String) -> Self {
        Link::Href(href)
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Links {
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub self_link: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub about: Option<Link>,
}

impl Links {
    /// Links object holding only a `self` URL.
    pub fn with_self<T: Into<String>>(href: T) -> Self {
        Self {
            self_link: Some(Link::Href(href.into())),
            ..Default::default()
        }
    }
}

/// A JSON:API resource object.
///
/// Members merged from an adapter tag field that have no typed slot are kept
/// in `extra` and serialized inline.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub attributes: Option<Record>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub relationships: Option<Map<String, Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub meta: Option<Meta>,
    #[serde(flatten)]
    #[cfg_attr(feature = "openapi", schema(ignore))]
    pub extra: Map<String, Value>,
}

impl Resource {
    pub fn new<T: Into<String>>(resource_type: T) -> Self {
        Self {
            resource_type: resource_type.into(),
            ..Default::default()
        }
    }

    /// Merges the contents of an adapter tag field onto the resource.
    ///
    /// Typed members replace the current value when they parse; members that
    /// don't parse, and unknown members, end up in `extra`.
    pub fn merge_tag(&mut self, tag: Map<String, Value>) {
        for (key, value) in tag {
            match key.as_str() {
                "id" => match value {
                    Value::String(id) => self.id = Some(id),
                    Value::Null => self.id = None,
                    other => self.id = Some(other.to_string()),
                },
                "type" => match value {
                    Value::String(resource_type) => self.resource_type = resource_type,
                    other => {
                        self.extra.insert(key, other);
                    }
                },
                "attributes" => match value {
                    Value::Object(attributes) => self.attributes = Some(attributes),
                    other => {
                        self.extra.insert(key, other);
                    }
                },
                "relationships" => match value {
                    Value::Object(relationships) => self.relationships = Some(relationships),
                    other => {
                        self.extra.insert(key, other);
                    }
                },
                "meta" => match value {
                    Value::Object(meta) => self.meta = Some(meta),
                    other => {
                        self.extra.insert(key, other);
                    }
                },
                "links" => match serde_json::from_value::<Links>(value.clone()) {
                    Ok(links) => self.links = Some(links),
                    Err(_) => {
                        self.extra.insert(key, value);
                    }
                },
                _ => {
                    self.extra.insert(key, value);
                }
            }
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceIdentifier {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub meta: Option<Meta>,
}

/// Primary data of a top-level document: one resource or a collection.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrimaryData {
    Collection(Vec<Resource>),
    Single(Box<Resource>),
}

impl PrimaryData {
    pub fn as_single(&self) -> Option<&Resource> {
        match self {
            PrimaryData::Single(resource) => Some(resource),
            PrimaryData::Collection(_) => None,
        }
    }

    pub fn as_collection(&self) -> Option<&[Resource]> {
        match self {
            PrimaryData::Collection(resources) => Some(resources),
            PrimaryData::Single(_) => None,
        }
    }
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorSource {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pointer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

/// A JSON:API error object.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorObject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<ErrorSource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub meta: Option<Meta>,
}

impl From<&ApiError> for ErrorObject {
    /// `status` ← status, `title` ← message, `detail` ← description, `meta` ← meta.
    fn from(error: &ApiError) -> Self {
        Self {
            status: Some(error.status_code().to_string()),
            title: Some(error.message()),
            detail: error.description(),
            meta: error.meta(),
            ..Default::default()
        }
    }
}

/// A JSON:API top-level document.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopLevelDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PrimaryData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ErrorObject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub meta: Option<Meta>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub jsonapi: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Links>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub included: Option<Vec<Resource>>,
}

impl TopLevelDocument {
    /// Document holding only the given errors.
    pub fn from_errors(errors: Vec<ErrorObject>) -> Self {
        Self {
            errors: Some(errors),
            ..Default::default()
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_none()
            && self.errors.is_none()
            && self.meta.is_none()
            && self.jsonapi.is_none()
            && self.links.is_none()
            && self.included.is_none()
    }

    /// The `meta.count` member written by deletes, if present.
    pub fn meta_count(&self) -> Option<u64> {
        self.meta
            .as_ref()
            .and_then(|meta| meta.get("count"))
            .and_then(Value::as_u64)
    }
}

/// The `data` member of an inbound create/update document.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestData {
    #[serde(rename = "type", default)]
    pub resource_type: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    #[cfg_attr(feature = "openapi", schema(value_type = Object))]
    pub attributes: Record,
}

/// Inbound create/update body: `{"data": {"type": .., "attributes": {..}}}`.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct RequestDocument {
    pub data: RequestData,
}

impl RequestDocument {
    pub fn from_attributes(attributes: Record) -> Self {
        Self {
            data: RequestData {
                attributes,
                ..Default::default()
            },
        }
    }
}
