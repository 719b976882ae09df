#![allow(dead_code)]
use utoipa::OpenApi;

use jsonapi_common::{
    ErrorObject, ErrorSource, Link, Links, PrimaryData, RequestData, RequestDocument, Resource,
    ResourceIdentifier, TopLevelDocument,
};

// Controllers are mounted per configured model, so the paths below document
// the shape shared by every `/{resource}` collection.

#[utoipa::path(
    get,
    path = "/{resource}",
    params(
        ("resource" = String, Path, description = "Collection path of the model"),
        ("filter[field]" = Option<String>, Query, description = "Equality filter on a field"),
        ("sort" = Option<String>, Query, description = "Comma separated fields, `-` for descending"),
        ("page[limit]" = Option<u64>, Query, description = "Page size, alias `page[size]`"),
        ("page[offset]" = Option<u64>, Query, description = "Records to skip, or use `page[number]`"),
    ),
    responses(
        (status = 200, description = "Resource collection", body = TopLevelDocument,
         example = json!({
             "data": [{
                 "id": "65f1c0ffee",
                 "type": "User",
                 "attributes": {"_id": "65f1c0ffee", "name": "Ada"},
                 "links": {"self": "http://localhost:8086/api/users/65f1c0ffee"}
             }]
         })
        ),
        (status = 400, description = "Malformed query", body = TopLevelDocument),
        (status = 500, description = "Adapter failure", body = TopLevelDocument)
    ),
    tag = "JSON:API"
)]
fn doc_find_handler() {}

#[utoipa::path(
    post,
    path = "/{resource}",
    params(("resource" = String, Path, description = "Collection path of the model")),
    request_body(content = RequestDocument, content_type = "application/vnd.api+json",
        example = json!({"data": {"type": "User", "attributes": {"name": "Ada"}}})),
    responses(
        (status = 201, description = "Created resource with its self link", body = TopLevelDocument),
        (status = 400, description = "Malformed body", body = TopLevelDocument),
        (status = 500, description = "Adapter failure", body = TopLevelDocument)
    ),
    tag = "JSON:API"
)]
fn doc_create_handler() {}

#[utoipa::path(
    get,
    path = "/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Collection path of the model"),
        ("id" = String, Path, description = "Record id"),
    ),
    responses(
        (status = 200, description = "Single resource", body = TopLevelDocument),
        (status = 404, description = "No such record", body = TopLevelDocument,
         example = json!({"errors": [{"status": "404", "title": "Not Found"}]})
        )
    ),
    tag = "JSON:API"
)]
fn doc_find_by_id_handler() {}

#[utoipa::path(
    patch,
    path = "/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Collection path of the model"),
        ("id" = String, Path, description = "Record id"),
    ),
    request_body(content = RequestDocument, content_type = "application/vnd.api+json"),
    responses(
        (status = 200, description = "Updated resource", body = TopLevelDocument),
        (status = 400, description = "Malformed body", body = TopLevelDocument),
        (status = 404, description = "No such record", body = TopLevelDocument)
    ),
    tag = "JSON:API"
)]
fn doc_update_handler() {}

#[utoipa::path(
    delete,
    path = "/{resource}/{id}",
    params(
        ("resource" = String, Path, description = "Collection path of the model"),
        ("id" = String, Path, description = "Record id"),
    ),
    responses(
        (status = 200, description = "Deleted", body = TopLevelDocument,
         example = json!({"meta": {"count": 1}})
        ),
        (status = 404, description = "Nothing deleted", body = TopLevelDocument)
    ),
    tag = "JSON:API"
)]
fn doc_delete_handler() {}

#[derive(OpenApi)]
#[openapi(
    paths(
        doc_find_handler,
        doc_create_handler,
        doc_find_by_id_handler,
        doc_update_handler,
        doc_delete_handler,
    ),
    components(
        schemas(
            TopLevelDocument,
            PrimaryData,
            Resource,
            ResourceIdentifier,
            Links,
            Link,
            ErrorObject,
            ErrorSource,
            RequestDocument,
            RequestData,
        )
    ),
    tags(
        (name = "JSON:API", description = "Generic JSON:API resource endpoints")
    ),
    servers(
        (url = "/api", description = "JSON:API resource server")
    )
)]
pub struct JsonApiDoc;
