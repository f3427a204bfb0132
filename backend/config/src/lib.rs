//! `claimdesk-config`: runtime configuration for ClaimDesk.
//!
//! Provides:
//! - Typed config schema with defaults for every knob
//! - YAML loading (a missing file means defaults)
//! - `${ENV_VAR}` substitution and the legacy environment-variable overlay
//! - Validation with errors and warnings
//! - Redaction for safe display

pub mod defaults;
pub mod env;
pub mod error;
pub mod io;
pub mod redact;
pub mod schema;
pub mod validation;

pub use env::{apply_env_overrides, resolve_env_vars, resolve_env_vars_with, MissingEnvVarError};
pub use error::ConfigError;
pub use io::{default_config_path, load_config, load_config_with};
pub use redact::{redact, redacted_yaml};
pub use schema::{
    ClaimDeskConfig, CompletionConfig, ExtractionConfig, FetchConfig, LoggingConfig, OcrBackend,
    ReportConfig, SessionConfig, TelegramConfig,
};
pub use validation::{validate, ConfigIssue, ValidationReport};

/// Validate `config` and log every finding.
///
/// Errors in the report are logged, not returned; callers decide whether to
/// proceed. Call after the logger is installed.
pub fn validate_and_log(config: &ClaimDeskConfig) -> ValidationReport {
    let report = validate(config);
    for warning in &report.warnings {
        tracing::warn!(path = %warning.path, message = %warning.message, "Config warning");
    }
    for error in &report.errors {
        tracing::error!(path = %error.path, message = %error.message, "Config error");
    }
    report
}
