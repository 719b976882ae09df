//! Configuration for the JSON:API bridge.
//!
//! Values are layered from `config/default`, `config/{RUN_ENV}` and environment
//! variables (`{PREFIX}__SECTION__KEY`, prefix defaults to `JSONAPI`).

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;
pub use models::*;

/// Default prefix for configuration environment variables.
pub const DEFAULT_PREFIX: &str = "JSONAPI";

/// Loads the configuration relative to the current working directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let root = env::current_dir()
        .map_err(|err| ConfigError::Message(format!("failed to resolve working directory: {err}")))?;
    load_config_from(&root)
}

/// Loads the configuration from the `config/` directory below `root`.
///
/// Missing files are not an error; every section has a default. Environment
/// variables win over files.
pub fn load_config_from(root: &Path) -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());
    let prefix = env::var("PREFIX").unwrap_or_else(|_| DEFAULT_PREFIX.to_string());

    let default_path = config_path(root, "default");
    let env_path = config_path(root, &run_env);

    debug!(
        "Loading configuration from {} and {}",
        default_path.display(),
        env_path.display()
    );

    let builder = Config::builder()
        .add_source(File::with_name(&default_path.to_string_lossy()).required(false))
        .add_source(File::with_name(&env_path.to_string_lossy()).required(false))
        .add_source(Environment::with_prefix(&prefix).separator("__"));

    let config: AppConfig = builder.build()?.try_deserialize()?;
    Ok(config)
}

fn config_path(root: &Path, name: &str) -> PathBuf {
    root.join("config").join(name)
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the environment variables.
///
/// The file defaults to `.env` and can be overridden with `DOTENV_OVERRIDE`.
/// Loading happens once per process; the resolved path is returned.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn temp_root(name: &str) -> PathBuf {
        let dir = env::temp_dir().join(format!("jsonapi-config-{}-{}", name, std::process::id()));
        fs::create_dir_all(dir.join("config")).unwrap();
        dir
    }

    #[test]
    fn test_defaults_without_files() {
        let root = temp_root("empty");
        let config = load_config_from(&root).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.jsonapi.jv_tag, DEFAULT_JV_TAG);
        assert!(config.database.is_none());
        assert!(config.jsonapi.resources.is_empty());
    }

    #[test]
    fn test_reads_default_file() {
        let root = temp_root("file");
        fs::write(
            root.join("config/default.toml"),
            r#"
[server]
host = "0.0.0.0"
port = 9000

[database]
url = "mongodb://localhost:27017"
name = "bridge"

[jsonapi]
jv_tag = "_meta"

[[jsonapi.resources]]
model_name = "User"
path = "users"
projection = "name -password"
"#,
        )
        .unwrap();

        let config = load_config_from(&root).unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.database.unwrap().name, "bridge");
        assert_eq!(config.jsonapi.jv_tag, "_meta");
        assert_eq!(config.jsonapi.resources.len(), 1);
        assert_eq!(config.jsonapi.resources[0].model_name, "User");
        assert_eq!(
            config.jsonapi.resources[0].projection.as_deref(),
            Some("name -password")
        );
    }
}
