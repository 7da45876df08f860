use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::{Error, Preferences};

const JSP_APPS_CONFIG_ENV_NAME: &str = "JSP_APPS_CONFIG_PATH";
const DEFAULT_LOG_FILTER: &str = "info";

/// Get the preference file path from input or env JSP_APPS_CONFIG_PATH
pub fn get_apps_config_path(config_path: Option<PathBuf>) -> Option<PathBuf> {
    if config_path.is_some() {
        config_path
    } else {
        std::env::var(JSP_APPS_CONFIG_ENV_NAME)
            .map(|s| {
                warn!("### ENV VAR {s} is used ###");
                PathBuf::from(s)
            })
            .ok()
    }
}

/// Loads the preference file, or the defaults when no file is given.
pub fn resolve_preferences(config_path: Option<&Path>) -> Result<Preferences, Error> {
    let preferences = match config_path {
        Some(path) => Preferences::try_new(path)?,
        None => Preferences::default(),
    };
    debug!(?config_path, ?preferences, "resolved preferences");
    Ok(preferences)
}

/// Sets up `tracing` output filtered by `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();
}
