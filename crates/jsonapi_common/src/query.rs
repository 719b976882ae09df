//! Parsing of JSON:API query parameters.
//!
//! Query strings use bracket notation for nested members, e.g.
//! `filter[name]=Ada&page[limit]=10&sort=-createdAt,name`. Parsing builds a
//! nested JSON object first; `filter`, `sort` and `page` are then read from it.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::models::Record;

/// Sort direction of a single sort field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    /// `1` for ascending, `-1` for descending, as document databases expect.
    pub fn as_i32(self) -> i32 {
        match self {
            SortOrder::Ascending => 1,
            SortOrder::Descending => -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortField {
    pub field: String,
    pub order: SortOrder,
}

/// Skip/limit window derived from `page[...]` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: u64,
    pub offset: u64,
}

/// Adapter-independent view of the request query.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceQuery {
    /// Equality filter, from `filter[...]`.
    pub filter: Record,
    /// Sort fields in request order, from `sort=`.
    pub sort: Vec<SortField>,
    /// Pagination window, from `page[...]`.
    pub page: Option<Page>,
    /// Every parameter, nested by bracket notation.
    pub raw: Record,
}

impl ResourceQuery {
    /// Parses a raw query string (without the leading `?`).
    pub fn parse(query: &str) -> Result<Self, ApiError> {
        let pairs: Vec<(String, String)> = serde_urlencoded::from_str(query)?;
        let raw = nest_pairs(pairs);
        let parsed = Self::from_raw(raw)?;
        debug!(
            "Parsed query: {} filter keys, {} sort fields, page {:?}",
            parsed.filter.len(),
            parsed.sort.len(),
            parsed.page
        );
        Ok(parsed)
    }

    /// Builds a query from an already nested object.
    pub fn from_raw(raw: Record) -> Result<Self, ApiError> {
        let filter = match raw.get("filter") {
            Some(Value::Object(filter)) => filter.clone(),
            Some(Value::Null) | None => Map::new(),
            Some(_) => return Err(ApiError::BadRequest("filter must be an object".to_string())),
        };

        let sort = match raw.get("sort") {
            Some(Value::String(sort)) => parse_sort(sort),
            Some(Value::Null) | None => Vec::new(),
            Some(_) => return Err(ApiError::BadRequest("sort must be a string".to_string())),
        };

        let page = match raw.get("page") {
            Some(Value::Object(page)) => parse_page(page)?,
            Some(Value::Null) | None => None,
            Some(_) => return Err(ApiError::BadRequest("page must be an object".to_string())),
        };

        Ok(Self {
            filter,
            sort,
            page,
            raw,
        })
    }
}

/// Parses `-createdAt,name` into descending `createdAt` then ascending `name`.
pub fn parse_sort(sort: &str) -> Vec<SortField> {
    sort.split(',')
        .map(str::trim)
        .filter(|field| !field.is_empty())
        .filter_map(|field| match field.strip_prefix('-') {
            Some("") => None,
            Some(name) => Some(SortField {
                field: name.to_string(),
                order: SortOrder::Descending,
            }),
            None => Some(SortField {
                field: field.to_string(),
                order: SortOrder::Ascending,
            }),
        })
        .collect()
}

/// `limit` comes from `page[limit]` or `page[size]`; `offset` from
/// `page[offset]` or `(page[number] - 1) * limit`. Without a non-zero limit
/// there is no pagination window.
fn parse_page(page: &Map<String, Value>) -> Result<Option<Page>, ApiError> {
    // A zero limit counts as absent, so `page[limit]=0` falls through to size.
    let limit = match page_number(page, "limit")?.filter(|limit| *limit > 0) {
        Some(limit) => Some(limit),
        None => page_number(page, "size")?.filter(|size| *size > 0),
    };
    let Some(limit) = limit else {
        return Ok(None);
    };

    let offset = match page_number(page, "offset")? {
        Some(offset) => offset,
        None => match page_number(page, "number")? {
            Some(number) => number.saturating_sub(1).saturating_mul(limit),
            None => 0,
        },
    };

    Ok(Some(Page { limit, offset }))
}

fn page_number(page: &Map<String, Value>, key: &str) -> Result<Option<u64>, ApiError> {
    match page.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(number)) => number
            .as_u64()
            .map(Some)
            .ok_or_else(|| ApiError::BadRequest(format!("page[{key}] must be a positive integer"))),
        Some(Value::String(text)) if text.is_empty() => Ok(None),
        Some(Value::String(text)) => text
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ApiError::BadRequest(format!("page[{key}] must be a positive integer"))),
        Some(_) => Err(ApiError::BadRequest(format!(
            "page[{key}] must be a positive integer"
        ))),
    }
}

/// Nests `a[b][c]=v` pairs into `{"a": {"b": {"c": "v"}}}`.
///
/// A key that appears more than once collects its values into an array.
fn nest_pairs(pairs: Vec<(String, String)>) -> Record {
    let mut root = Map::new();
    for (key, value) in pairs {
        let path = split_key(&key);
        if path.is_empty() {
            continue;
        }
        insert_path(&mut root, &path, Value::String(value));
    }
    root
}

fn split_key(key: &str) -> Vec<String> {
    let mut segments = Vec::new();
    let (head, mut rest) = match key.find('[') {
        Some(index) => (&key[..index], &key[index..]),
        None => (key, ""),
    };
    if head.is_empty() {
        return segments;
    }
    segments.push(head.to_string());

    while let Some(stripped) = rest.strip_prefix('[') {
        match stripped.find(']') {
            Some(end) => {
                segments.push(stripped[..end].to_string());
                rest = &stripped[end + 1..];
            }
            None => break,
        }
    }
    segments
}

fn insert_path(map: &mut Map<String, Value>, path: &[String], value: Value) {
    let (first, rest) = match path.split_first() {
        Some(split) => split,
        None => return,
    };

    if rest.is_empty() {
        match map.get_mut(first) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let previous = existing.take();
                *existing = Value::Array(vec![previous, value]);
            }
            None => {
                map.insert(first.clone(), value);
            }
        }
        return;
    }

    let entry = map
        .entry(first.clone())
        .or_insert_with(|| Value::Object(Map::new()));
    if !entry.is_object() {
        *entry = Value::Object(Map::new());
    }
    if let Value::Object(child) = entry {
        insert_path(child, rest, value);
    }
}
