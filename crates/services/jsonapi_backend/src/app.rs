// --- File: crates/services/jsonapi_backend/src/app.rs ---
use axum::{routing::get, Router};
use jsonapi_common::JsonApiOptions;
use jsonapi_service::JsonApiController;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::app_state::AppState;

/// Builds the application router: one JSON:API controller per configured
/// resource under `/api/{path}`.
pub fn build_router(state: &AppState) -> Router {
    let mut api_router =
        Router::new().route("/", get(|| async { "Welcome to the JSON:API service!" }));

    for resource in &state.config.jsonapi.resources {
        let path = resource.path.trim_matches('/');
        if path.is_empty() {
            warn!("Skipping {}: empty resource path", resource.model_name);
            continue;
        }

        let mut options = JsonApiOptions::new();
        if let Some(projection) = &resource.projection {
            options = options.projection(projection.clone());
        }

        let controller = JsonApiController::new(resource.model_name.clone()).options(options);
        api_router = api_router.nest(&format!("/{path}"), controller.router(state.service.clone()));
        info!("Mounted {} at /api/{}", resource.model_name, path);
    }

    #[allow(unused_mut)] // mutated with the openapi feature
    let mut app = Router::new().nest("/api", api_router);

    // Conditionally add Swagger UI and JSON endpoint if openapi feature enabled
    #[cfg(feature = "openapi")]
    {
        use jsonapi_service::openapi::JsonApiDoc;
        use utoipa::OpenApi;
        use utoipa_swagger_ui::SwaggerUi;

        #[derive(OpenApi)]
        #[openapi(
            info(
                title = "JSON:API service",
                version = "0.1.0",
                description = "Configured models exposed as JSON:API resources",
                license(name = "MIT", url = "https://opensource.org/licenses/MIT")
            ),
            servers((url = "/api", description = "Main API Prefix")),
        )]
        struct ApiDoc;

        let mut openapi_doc = ApiDoc::openapi();
        openapi_doc.merge(JsonApiDoc::openapi());
        info!("Adding Swagger UI at /api/docs");

        let swagger_ui = SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc);
        app = app.merge(swagger_ui);
    }

    app.layer(TraceLayer::new_for_http())
}
