use axum::Router;
use jsonapi_common::JsonApiOptions;
use std::sync::Arc;
use tracing::info;

use crate::handlers::{DocumentHook, ResourceEndpoint};
use crate::service::JsonApiService;

/// The five JSON:API routes of one model, bundled as a router.
///
/// Nest the router under the collection path:
///
/// ```rust,no_run
/// use axum::Router;
/// use jsonapi_common::MemoryAdapter;
/// use jsonapi_service::{JsonApiController, JsonApiService};
/// use std::sync::Arc;
///
/// let service = Arc::new(JsonApiService::new(Arc::new(MemoryAdapter::new())));
/// let app: Router = Router::new().nest("/users", JsonApiController::new("User").router(service));
/// ```
///
/// Routes merged onto the same router with a static segment (`/count`) win
/// over `/{id}`.
#[derive(Clone, Default)]
pub struct JsonApiController {
    model_name: String,
    options: JsonApiOptions,
    hook: Option<DocumentHook>,
}

impl JsonApiController {
    pub fn new<T: Into<String>>(model_name: T) -> Self {
        Self {
            model_name: model_name.into(),
            ..Default::default()
        }
    }

    pub fn options(mut self, options: JsonApiOptions) -> Self {
        self.options = options;
        self
    }

    pub fn hook(mut self, hook: DocumentHook) -> Self {
        self.hook = Some(hook);
        self
    }

    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// The endpoint builder the router is made of, for wiring routes by hand.
    pub fn endpoint(&self, service: Arc<JsonApiService>) -> ResourceEndpoint {
        let endpoint =
            ResourceEndpoint::new(service, self.model_name.clone()).options(self.options.clone());
        match &self.hook {
            Some(hook) => endpoint.hook(hook.clone()),
            None => endpoint,
        }
    }

    /// `GET /`, `POST /`, `GET /{id}`, `PATCH /{id}` and `DELETE /{id}`.
    pub fn router<S: Clone + Send + Sync + 'static>(
        &self,
        service: Arc<JsonApiService>,
    ) -> Router<S> {
        let endpoint = self.endpoint(service);

        info!("JSON:API routes initialized for {}", self.model_name);

        Router::new()
            .route("/", endpoint.find().merge(endpoint.create()))
            .route(
                "/{id}",
                endpoint
                    .find_by_id()
                    .merge(endpoint.update())
                    .merge(endpoint.delete()),
            )
    }
}
