//! Config file loading.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tokio::fs;
use tracing::{debug, info};

use crate::env::{apply_env_overrides, resolve_env_vars_with};
use crate::error::ConfigError;
use crate::schema::ClaimDeskConfig;

const CONFIG_FILE_NAME: &str = "claimdesk.yaml";

/// Where to look for the config when none is given.
/// Priority: `CLAIMDESK_CONFIG` env > `./claimdesk.yaml` > `~/.claimdesk/config.yaml`.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = std::env::var("CLAIMDESK_CONFIG") {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    match dirs::home_dir() {
        Some(home) => home.join(".claimdesk").join("config.yaml"),
        None => local,
    }
}

/// Load the config at `path` using the process environment.
///
/// A missing file yields the defaults (plus environment overrides).
pub async fn load_config(path: &Path) -> Result<ClaimDeskConfig, ConfigError> {
    load_config_with(path, &std::env::vars().collect()).await
}

/// Load the config at `path`, resolving variables from `env`.
pub async fn load_config_with(path: &Path, env: &HashMap<String, String>) -> Result<ClaimDeskConfig, ConfigError> {
    let raw: Value = if path.exists() {
        let text = fs::read_to_string(path).await.map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let value: Value = serde_yaml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "Loaded config");
        value
    } else {
        debug!(path = %path.display(), "Config file does not exist; using defaults");
        Value::Null
    };

    let raw = match raw {
        Value::Null => Value::Object(serde_json::Map::new()),
        other => other,
    };
    let resolved = resolve_env_vars_with(&raw, env)?;
    let mut config: ClaimDeskConfig = serde_json::from_value(resolved)?;
    apply_env_overrides(&mut config, env);
    Ok(config)
}
