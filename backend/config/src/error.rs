use std::path::PathBuf;

use thiserror::Error;

use crate::env::MissingEnvVarError;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config YAML at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error(transparent)]
    MissingEnvVar(#[from] MissingEnvVarError),

    #[error("config does not match the schema: {0}")]
    Schema(#[from] serde_json::Error),
}
