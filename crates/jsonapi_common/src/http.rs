// --- File: crates/jsonapi_common/src/http.rs ---
use axum::{
    http::{header, HeaderMap, HeaderValue, StatusCode, Uri},
    response::{IntoResponse, Response},
    Json,
};
use tracing::error;

use crate::error::{ApiError, HttpStatusCode};
use crate::models::{ErrorObject, TopLevelDocument};

/// Media type of JSON:API documents.
pub const JSON_API_CONTENT_TYPE: &str = "application/vnd.api+json";

/// A top-level document paired with the status it is sent with.
#[derive(Debug, Clone)]
pub struct JsonApiResponse(pub StatusCode, pub TopLevelDocument);

impl JsonApiResponse {
    pub fn ok(document: TopLevelDocument) -> Self {
        Self(StatusCode::OK, document)
    }

    pub fn created(document: TopLevelDocument) -> Self {
        Self(StatusCode::CREATED, document)
    }
}

impl IntoResponse for JsonApiResponse {
    fn into_response(self) -> Response {
        let JsonApiResponse(status, document) = self;
        let mut response = (status, Json(document)).into_response();
        response.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(JSON_API_CONTENT_TYPE),
        );
        response
    }
}

/// Extension trait for ApiError to convert it to a JSON:API error response.
pub trait IntoHttpResponse {
    /// Converts the error into an Axum HTTP response.
    fn into_http_response(self) -> Response;
}

impl IntoHttpResponse for ApiError {
    fn into_http_response(self) -> Response {
        let status_code =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status_code.is_server_error() {
            error!("Request failed: {} ({:?})", self, self.description());
        }

        let document = TopLevelDocument::from_errors(vec![ErrorObject::from(&self)]);
        JsonApiResponse(status_code, document).into_response()
    }
}

/// Implement IntoResponse for ApiError to make it easier to use in Axum handlers.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        self.into_http_response()
    }
}

/// Reconstructs the full URL of a request: protocol, host and original URI.
///
/// The protocol comes from `X-Forwarded-Proto` (default `http`); the host from
/// the `Host` header, falling back to the URI authority.
pub fn full_url(headers: &HeaderMap, original_uri: &Uri) -> String {
    let protocol = headers
        .get("x-forwarded-proto")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .or_else(|| original_uri.scheme_str())
        .unwrap_or("http");

    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string)
        .or_else(|| original_uri.authority().map(|authority| authority.to_string()))
        .unwrap_or_default();

    let path = original_uri
        .path_and_query()
        .map(|path_and_query| path_and_query.as_str())
        .unwrap_or("/");

    format!("{protocol}://{host}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::{json, Value};

    #[test]
    fn test_full_url_from_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("api.example.com"));
        headers.insert("x-forwarded-proto", HeaderValue::from_static("https"));
        let uri: Uri = "/api/users?include=posts".parse().unwrap();

        assert_eq!(
            full_url(&headers, &uri),
            "https://api.example.com/api/users?include=posts"
        );
    }

    #[test]
    fn test_full_url_defaults_to_http() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("localhost:8086"));
        let uri: Uri = "/users".parse().unwrap();

        assert_eq!(full_url(&headers, &uri), "http://localhost:8086/users");
    }

    #[tokio::test]
    async fn test_error_response_is_json_api_document() {
        let response = ApiError::NotFound.into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            JSON_API_CONTENT_TYPE
        );

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(body, json!({"errors": [{"status": "404", "title": "Not Found"}]}));
    }

    #[tokio::test]
    async fn test_invalid_status_falls_back_to_500() {
        let response = ApiError::new(42, "Weird").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
