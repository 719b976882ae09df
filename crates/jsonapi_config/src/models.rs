// --- File: crates/jsonapi_config/src/models.rs ---

use serde::{Deserialize, Serialize};

/// Default name of the record field that carries JSON:API members (links, meta).
pub const DEFAULT_JV_TAG: &str = "_jv";

// --- General Server Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8086,
        }
    }
}

// --- Database Config ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct DatabaseConfig {
    pub url: String, // e.g. mongodb://localhost:27017, via JSONAPI__DATABASE__URL
    #[serde(default = "default_database_name")]
    pub name: String, // database holding the resource collections
}

fn default_database_name() -> String {
    "jsonapi".to_string()
}

// --- Resource registration ---
// One entry per controller mounted by the backend service.
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ResourceConfig {
    /// Model name, used as the JSON:API resource `type`.
    pub model_name: String,
    /// Path segment the controller is nested under, without leading slash.
    pub path: String,
    /// Optional projection applied to every read, e.g. `"name email -password"`.
    #[serde(default)]
    pub projection: Option<String>,
}

#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct JsonApiConfig {
    #[serde(default = "default_jv_tag")]
    pub jv_tag: String,
    #[serde(default)]
    pub resources: Vec<ResourceConfig>,
}

fn default_jv_tag() -> String {
    DEFAULT_JV_TAG.to_string()
}

impl Default for JsonApiConfig {
    fn default() -> Self {
        Self {
            jv_tag: default_jv_tag(),
            resources: Vec::new(),
        }
    }
}

// --- Unified App Configuration ---
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    // Server config falls back to 127.0.0.1:8086
    #[serde(default)]
    pub server: ServerConfig,

    // Without a database section the backend runs on the in-memory adapter
    #[serde(default)]
    pub database: Option<DatabaseConfig>,

    #[serde(default)]
    pub jsonapi: JsonApiConfig,
}
