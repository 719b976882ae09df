//! Logging utilities.
//!
//! Every crate logs through the `tracing` macros; binaries call [`init`] or
//! [`init_with_level`] once at startup to install the subscriber.

use tracing::{error, info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber at INFO.
///
/// Call once at startup. `RUST_LOG` overrides the level; log lines carry
/// targets and file/line information.
///
/// # Examples
///
/// ```
/// use jsonapi_common::logging;
///
/// // Initialize with default log level (INFO)
/// logging::init();
///
/// // Initialize with a specific log level
/// logging::init_with_level(tracing::Level::DEBUG);
/// ```
pub fn init() {
    init_with_level(Level::INFO);
}

/// Initialize the tracing subscriber with a specific log level.
///
/// This function allows specifying a custom log level when initializing the
/// tracing subscriber.
///
/// # Arguments
///
/// * `level` - The minimum log level to display.
pub fn init_with_level(level: Level) {
    // RUST_LOG wins; otherwise the bridge crates log at `level`
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "jsonapi_common={level},jsonapi_service={level},jsonapi_mongo={level},jsonapi_backend={level},tower_http={level}"
        ))
    });

    // Initialize the subscriber with the filter
    // Use try_init to handle the case where a global default subscriber has already been set
    let result = tracing_subscriber::registry()
        .with(fmt::layer()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_thread_ids(true)
            .with_thread_names(true))
        .with(filter)
        .try_init();

    // Only log if initialization was successful or if it failed because a subscriber was already set
    if result.is_ok() {
        info!("Logging initialized at level: {}", level);
    }
}

/// Log an error together with the operation it interrupted.
pub fn log_error<E: std::fmt::Display>(error: E, context: &str) {
    error!("{}: {}", context, error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init();
        init_with_level(Level::DEBUG);
    }

    #[test]
    fn test_log_error_accepts_any_display() {
        log_error(crate::error::ApiError::NotFound, "FindById User failed");
        log_error("connection reset", "Delete User failed");
    }
}
