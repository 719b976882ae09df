//! Wiring of the shared [`JsonApiService`].

use jsonapi_common::DatabaseAdapter;
use jsonapi_config::{JsonApiConfig, DEFAULT_JV_TAG};
use std::sync::Arc;
use tracing::info;

use crate::service::JsonApiService;

/// Settings for [`JsonApiModule::for_root`].
#[derive(Clone)]
pub struct JsonApiConfiguration {
    pub adapter: Arc<dyn DatabaseAdapter>,
    /// Record field holding JSON:API members, `_jv` when unset.
    pub jv_tag: Option<String>,
}

impl JsonApiConfiguration {
    pub fn new(adapter: Arc<dyn DatabaseAdapter>) -> Self {
        Self {
            adapter,
            jv_tag: None,
        }
    }

    /// Takes the tag field from the loaded configuration.
    pub fn from_config(adapter: Arc<dyn DatabaseAdapter>, config: &JsonApiConfig) -> Self {
        Self {
            adapter,
            jv_tag: Some(config.jv_tag.clone()),
        }
    }
}

/// Entry point that builds the service every controller shares.
pub struct JsonApiModule;

impl JsonApiModule {
    pub fn for_root(configuration: JsonApiConfiguration) -> Arc<JsonApiService> {
        let jv_tag = configuration
            .jv_tag
            .filter(|tag| !tag.is_empty())
            .unwrap_or_else(|| DEFAULT_JV_TAG.to_string());
        info!("JSON:API service ready, tag field `{}`", jv_tag);
        Arc::new(JsonApiService::with_jv_tag(configuration.adapter, jv_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonapi_common::MemoryAdapter;

    #[test]
    fn test_for_root_defaults_tag() {
        let service = JsonApiModule::for_root(JsonApiConfiguration::new(Arc::new(
            MemoryAdapter::new(),
        )));
        assert_eq!(service.jv_tag(), "_jv");
    }

    #[test]
    fn test_for_root_from_config() {
        let config = JsonApiConfig {
            jv_tag: "meta_".to_string(),
            ..Default::default()
        };
        let service = JsonApiModule::for_root(JsonApiConfiguration::from_config(
            Arc::new(MemoryAdapter::new()),
            &config,
        ));
        assert_eq!(service.jv_tag(), "meta_");
    }
}
