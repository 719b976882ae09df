//! HTTP service exposing the configured models as JSON:API resources.

pub mod app;
pub mod app_state;

pub use app::build_router;
pub use app_state::AppState;
