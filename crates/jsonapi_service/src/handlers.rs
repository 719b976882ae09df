//! HTTP handlers for JSON:API resources
//!
//! A [`ResourceEndpoint`] binds one model to the [`JsonApiService`] and hands
//! out axum method routers for the five operations. Each handler runs the
//! service call, gives the optional [`DocumentHook`] a chance to replace the
//! document, and renders failures as JSON:API error documents.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Json, OriginalUri, Path, RawQuery, State,
    },
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, patch, post, MethodRouter},
};
use jsonapi_common::{
    full_url, log_error, ApiError, HttpStatusCode, JsonApiOptions, JsonApiResponse,
    RequestDocument, ResourceQuery, TopLevelDocument,
};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::service::JsonApiService;

/// Operation a handler ran, passed to the [`DocumentHook`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Find,
    FindById,
    Create,
    Update,
    Delete,
}

/// Post-processing of a hydrated document.
///
/// `Ok(Some(doc))` replaces the response document, `Ok(None)` keeps it and
/// `Err` turns the response into an error document.
pub type DocumentHook = Arc<
    dyn Fn(Action, &TopLevelDocument) -> Result<Option<TopLevelDocument>, ApiError> + Send + Sync,
>;

/// Shared state for the handlers of one resource
#[derive(Clone)]
pub struct EndpointState {
    pub service: Arc<JsonApiService>,
    pub model_name: String,
    /// Name of the path parameter holding the record id.
    pub param_key: String,
    pub options: JsonApiOptions,
    pub hook: Option<DocumentHook>,
}

impl EndpointState {
    fn apply_hook(
        &self,
        action: Action,
        document: TopLevelDocument,
    ) -> Result<TopLevelDocument, ApiError> {
        match &self.hook {
            Some(hook) => Ok(hook(action, &document)?.unwrap_or(document)),
            None => Ok(document),
        }
    }

    fn record_id(
        &self,
        params: Result<Path<HashMap<String, String>>, PathRejection>,
    ) -> Result<String, ApiError> {
        let Path(params) =
            params.map_err(|rejection| ApiError::BadRequest(rejection.body_text()))?;
        params.get(&self.param_key).cloned().ok_or_else(|| {
            ApiError::BadRequest(format!("missing path parameter `{}`", self.param_key))
        })
    }

    fn respond(
        &self,
        action: Action,
        status: StatusCode,
        result: Result<TopLevelDocument, ApiError>,
    ) -> Response {
        match result {
            Ok(document) => JsonApiResponse(status, document).into_response(),
            Err(err) => {
                let status = StatusCode::from_u16(err.status_code())
                    .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                if status.is_server_error() {
                    log_error(
                        format_args!("{} ({:?})", err, err.description()),
                        &format!("{:?} {} failed", action, self.model_name),
                    );
                } else {
                    debug!("{:?} {} rejected: {}", action, self.model_name, err);
                }
                let document = self.service.hydrate_top_document(
                    None,
                    Some(std::slice::from_ref(&err)),
                    &self.model_name,
                    &self.options,
                    None,
                );
                JsonApiResponse(status, document).into_response()
            }
        }
    }
}

impl fmt::Debug for EndpointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointState")
            .field("model_name", &self.model_name)
            .field("param_key", &self.param_key)
            .field("options", &self.options)
            .field("hook", &self.hook.is_some())
            .finish()
    }
}

fn body_document(
    body: Result<Json<RequestDocument>, JsonRejection>,
) -> Result<RequestDocument, ApiError> {
    body.map(|Json(document)| document)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

/// Builder for the method routers of one resource.
#[derive(Debug, Clone)]
pub struct ResourceEndpoint {
    state: EndpointState,
}

impl ResourceEndpoint {
    pub fn new<T: Into<String>>(service: Arc<JsonApiService>, model_name: T) -> Self {
        Self {
            state: EndpointState {
                service,
                model_name: model_name.into(),
                param_key: "id".to_string(),
                options: JsonApiOptions::default(),
                hook: None,
            },
        }
    }

    pub fn param_key<T: Into<String>>(mut self, param_key: T) -> Self {
        self.state.param_key = param_key.into();
        self
    }

    pub fn options(mut self, options: JsonApiOptions) -> Self {
        self.state.options = options;
        self
    }

    pub fn hook(mut self, hook: DocumentHook) -> Self {
        self.state.hook = Some(hook);
        self
    }

    pub fn state(&self) -> &EndpointState {
        &self.state
    }

    fn shared(&self) -> Arc<EndpointState> {
        Arc::new(self.state.clone())
    }

    /// `GET` listing the resource collection.
    pub fn find<S: Clone + Send + Sync + 'static>(&self) -> MethodRouter<S> {
        get(find_handler).with_state(self.shared())
    }

    /// `GET` of a single resource; 404 when it doesn't exist.
    pub fn find_by_id<S: Clone + Send + Sync + 'static>(&self) -> MethodRouter<S> {
        get(find_by_id_handler).with_state(self.shared())
    }

    /// `POST` creating a resource; 201 on success.
    pub fn create<S: Clone + Send + Sync + 'static>(&self) -> MethodRouter<S> {
        post(create_handler).with_state(self.shared())
    }

    /// `PATCH` updating a resource; 404 when it doesn't exist.
    pub fn update<S: Clone + Send + Sync + 'static>(&self) -> MethodRouter<S> {
        patch(update_handler).with_state(self.shared())
    }

    /// `DELETE` of a resource; 404 when nothing was deleted.
    pub fn delete<S: Clone + Send + Sync + 'static>(&self) -> MethodRouter<S> {
        delete(delete_handler).with_state(self.shared())
    }
}

#[axum::debug_handler]
pub async fn find_handler(
    State(state): State<Arc<EndpointState>>,
    RawQuery(query): RawQuery,
) -> Response {
    let result = async {
        let query = ResourceQuery::parse(query.as_deref().unwrap_or_default())?;
        let document = state
            .service
            .find(&state.model_name, &query, &state.options)
            .await?;
        state.apply_hook(Action::Find, document)
    }
    .await;

    state.respond(Action::Find, StatusCode::OK, result)
}

#[axum::debug_handler]
pub async fn find_by_id_handler(
    State(state): State<Arc<EndpointState>>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
) -> Response {
    let result = async {
        let id = state.record_id(params)?;
        let document = state
            .service
            .find_by_id(&state.model_name, &id, &state.options)
            .await?
            .filter(TopLevelDocument::has_data)
            .ok_or(ApiError::NotFound)?;
        state.apply_hook(Action::FindById, document)
    }
    .await;

    state.respond(Action::FindById, StatusCode::OK, result)
}

#[axum::debug_handler]
pub async fn create_handler(
    State(state): State<Arc<EndpointState>>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
    body: Result<Json<RequestDocument>, JsonRejection>,
) -> Response {
    let result = async {
        let body = body_document(body)?;
        let url = full_url(&headers, &uri);
        let document = state
            .service
            .create(&state.model_name, body, &state.options, Some(&url))
            .await?;
        state.apply_hook(Action::Create, document)
    }
    .await;

    state.respond(Action::Create, StatusCode::CREATED, result)
}

#[axum::debug_handler]
pub async fn update_handler(
    State(state): State<Arc<EndpointState>>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
    body: Result<Json<RequestDocument>, JsonRejection>,
) -> Response {
    let result = async {
        let id = state.record_id(params)?;
        let body = body_document(body)?;
        let document = state
            .service
            .update(&state.model_name, &id, body, &state.options)
            .await?;
        if !document.has_data() {
            return Err(ApiError::NotFound);
        }
        state.apply_hook(Action::Update, document)
    }
    .await;

    state.respond(Action::Update, StatusCode::OK, result)
}

#[axum::debug_handler]
pub async fn delete_handler(
    State(state): State<Arc<EndpointState>>,
    params: Result<Path<HashMap<String, String>>, PathRejection>,
) -> Response {
    let result = async {
        let id = state.record_id(params)?;
        let document = state
            .service
            .delete(&state.model_name, &id, &state.options)
            .await?;
        if document.meta_count().unwrap_or(0) == 0 {
            return Err(ApiError::NotFound);
        }
        state.apply_hook(Action::Delete, document)
    }
    .await;

    state.respond(Action::Delete, StatusCode::OK, result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, Router};
    use jsonapi_common::{MemoryAdapter, Record};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    async fn endpoint() -> ResourceEndpoint {
        let adapter = MemoryAdapter::new();
        adapter
            .seed("Post", vec![record(json!({"_id": "p1", "title": "Hello"}))])
            .await;
        let service = Arc::new(JsonApiService::new(Arc::new(adapter)));
        ResourceEndpoint::new(service, "Post")
    }

    #[tokio::test]
    async fn test_custom_param_key() {
        let endpoint = endpoint().await.param_key("postId");
        let app: Router = Router::new().route("/posts/{postId}", endpoint.find_by_id());

        let response = app
            .oneshot(Request::builder().uri("/posts/p1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["data"]["id"], "p1");
        assert_eq!(body["data"]["type"], "Post");
    }

    #[tokio::test]
    async fn test_missing_param_is_bad_request() {
        let endpoint = endpoint().await;
        let app: Router = Router::new().route("/posts/{slug}", endpoint.find_by_id());

        let response = app
            .oneshot(Request::builder().uri("/posts/p1").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["errors"][0]["status"], "400");
        assert!(body.get("data").is_none());
    }

    #[tokio::test]
    async fn test_hook_error_becomes_error_document() {
        let hook: DocumentHook = Arc::new(|_, _| Err(ApiError::new(403, "Forbidden")));
        let endpoint = endpoint().await.hook(hook);
        let app: Router = Router::new().route("/posts", endpoint.find());

        let response = app
            .oneshot(Request::builder().uri("/posts").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        let body = body_json(response).await;
        assert_eq!(body, json!({"errors": [{"status": "403", "title": "Forbidden"}]}));
    }

    #[tokio::test]
    async fn test_invalid_query_is_bad_request() {
        let endpoint = endpoint().await;
        let app: Router = Router::new().route("/posts", endpoint.find());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/posts?page%5Blimit%5D=many")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
