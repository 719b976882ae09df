use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use jsonapi_backend::{build_router, AppState};
use jsonapi_common::{MemoryAdapter, Record, JSON_API_CONTENT_TYPE};
use jsonapi_config::{AppConfig, JsonApiConfig, ResourceConfig};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn config() -> Arc<AppConfig> {
    Arc::new(AppConfig {
        jsonapi: JsonApiConfig {
            resources: vec![
                ResourceConfig {
                    model_name: "User".to_string(),
                    path: "users".to_string(),
                    projection: Some("-password".to_string()),
                },
                ResourceConfig {
                    model_name: "Ignored".to_string(),
                    path: "/".to_string(),
                    projection: None,
                },
            ],
            ..Default::default()
        },
        ..Default::default()
    })
}

fn record(value: Value) -> Record {
    match value {
        Value::Object(map) => map,
        _ => panic!("expected an object"),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_welcome_route() {
    let state = AppState::with_adapter(config(), Arc::new(MemoryAdapter::new()));
    let response = build_router(&state)
        .oneshot(Request::builder().uri("/api").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_configured_resource_is_mounted() {
    let adapter = MemoryAdapter::new();
    adapter
        .seed(
            "User",
            vec![record(json!({"_id": "u1", "name": "Ada", "password": "secret"}))],
        )
        .await;
    let state = AppState::with_adapter(config(), Arc::new(adapter));
    let app = build_router(&state);

    let response = app
        .clone()
        .oneshot(Request::builder().uri("/api/users/u1").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(
        body["data"],
        json!({"id": "u1", "type": "User", "attributes": {"_id": "u1", "name": "Ada"}})
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/users")
                .header(header::HOST, "localhost:8086")
                .header(header::CONTENT_TYPE, JSON_API_CONTENT_TYPE)
                .body(Body::from(
                    json!({"data": {"type": "User", "attributes": {"name": "Grace"}}}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    let id = body["data"]["id"].as_str().unwrap();
    assert_eq!(
        body["data"]["links"]["self"],
        format!("http://localhost:8086/api/users/{id}")
    );
}

#[tokio::test]
async fn test_memory_adapter_without_database() {
    let state = AppState::new(config()).await.unwrap();
    assert_eq!(state.service.jv_tag(), "_jv");

    let response = build_router(&state)
        .oneshot(Request::builder().uri("/api/users").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(body_json(response).await, json!({"data": []}));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let state = AppState::with_adapter(config(), Arc::new(MemoryAdapter::new()));
    let response = build_router(&state)
        .oneshot(Request::builder().uri("/api/posts").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
