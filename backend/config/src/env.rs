//! Environment handling.
//!
//! Two mechanisms, applied in this order at load time:
//! 1. `${VAR_NAME}` references inside string values of the config file are
//!    substituted (`$${VAR}` escapes to a literal `${VAR}`).
//! 2. The bot's well-known environment variables override the file.

use std::collections::HashMap;
use std::path::PathBuf;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde_json::Value;
use tracing::debug;

use crate::schema::ClaimDeskConfig;

/// `${VAR}` or the escaped form `$${VAR}`.
static ENV_REF: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\$?)\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

#[derive(Debug, thiserror::Error)]
#[error("Missing env var \"{var_name}\" referenced at config path: {config_path}")]
pub struct MissingEnvVarError {
    pub var_name: String,
    pub config_path: String,
}

/// Substitute `${VAR}` references from the process environment.
pub fn resolve_env_vars(value: &Value) -> Result<Value, MissingEnvVarError> {
    resolve_env_vars_with(value, &std::env::vars().collect())
}

/// Substitute `${VAR}` references from `env`. Unset or empty variables are errors.
pub fn resolve_env_vars_with(value: &Value, env: &HashMap<String, String>) -> Result<Value, MissingEnvVarError> {
    substitute_value(value, env, "")
}

fn substitute_value(value: &Value, env: &HashMap<String, String>, path: &str) -> Result<Value, MissingEnvVarError> {
    match value {
        Value::String(s) => substitute_string(s, env, path).map(Value::String),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| substitute_value(v, env, &format!("{path}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        Value::Object(map) => {
            let mut out = serde_json::Map::with_capacity(map.len());
            for (k, v) in map {
                let child = if path.is_empty() { k.clone() } else { format!("{path}.{k}") };
                out.insert(k.clone(), substitute_value(v, env, &child)?);
            }
            Ok(Value::Object(out))
        }
        other => Ok(other.clone()),
    }
}

fn substitute_string(s: &str, env: &HashMap<String, String>, path: &str) -> Result<String, MissingEnvVarError> {
    if !s.contains("${") {
        return Ok(s.to_string());
    }

    let mut missing = None;
    let replaced = ENV_REF.replace_all(s, |caps: &Captures| {
        let name = &caps[2];
        if !caps[1].is_empty() {
            return format!("${{{name}}}");
        }
        match env.get(name) {
            Some(val) if !val.is_empty() => val.clone(),
            _ => {
                missing.get_or_insert_with(|| MissingEnvVarError {
                    var_name: name.to_string(),
                    config_path: path.to_string(),
                });
                String::new()
            }
        }
    });

    match missing {
        Some(err) => Err(err),
        None => Ok(replaced.into_owned()),
    }
}

fn non_empty<'a>(env: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    env.get(key).map(|v| v.trim()).filter(|v| !v.is_empty())
}

/// Overlay the legacy environment variables onto `config`.
///
/// | Variable | Field |
/// |---|---|
/// | `TELEGRAM_BOT_TOKEN` | `telegram.botToken` |
/// | `OPENAI_API_KEY` | `completion.apiKey` |
/// | `OPENAI_MODEL` | `completion.model` |
/// | `OPENAI_BASE_URL` | `completion.baseUrl` |
/// | `MEDIA_DIR` | `telegram.mediaDir`, and `report.archiveDir` if unset |
/// | `WEB_SCRAPE_ENABLED` | `fetch.enabled` (only `"1"` enables) |
/// | `WATERMARK_TEXT` | `report.watermark` |
/// | `CLAIMDESK_LOG_LEVEL` | `logging.level` |
pub fn apply_env_overrides(config: &mut ClaimDeskConfig, env: &HashMap<String, String>) {
    if let Some(token) = non_empty(env, "TELEGRAM_BOT_TOKEN") {
        config.telegram.bot_token = Some(token.to_string());
    }
    if let Some(key) = non_empty(env, "OPENAI_API_KEY") {
        config.completion.api_key = Some(key.to_string());
    }
    if let Some(model) = non_empty(env, "OPENAI_MODEL") {
        config.completion.model = model.to_string();
    }
    if let Some(url) = non_empty(env, "OPENAI_BASE_URL") {
        config.completion.base_url = url.to_string();
    }
    if let Some(dir) = non_empty(env, "MEDIA_DIR") {
        config.telegram.media_dir = Some(PathBuf::from(dir));
        if config.report.archive_dir.is_none() {
            config.report.archive_dir = Some(PathBuf::from(dir));
        }
    }
    if let Some(flag) = non_empty(env, "WEB_SCRAPE_ENABLED") {
        config.fetch.enabled = flag == "1";
    }
    if let Some(text) = non_empty(env, "WATERMARK_TEXT") {
        config.report.watermark = text.to_string();
    }
    if let Some(level) = non_empty(env, "CLAIMDESK_LOG_LEVEL") {
        config.logging.level = level.to_string();
    }
    debug!("Applied environment overrides");
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn substitutes_nested_vars() {
        let v = json!({"completion": {"apiKey": "${OPENAI_API_KEY}", "baseUrl": "https://${HOST}/v1"}});
        let result = resolve_env_vars_with(&v, &env(&[("OPENAI_API_KEY", "sk-abc"), ("HOST", "llm.local")])).unwrap();
        assert_eq!(result["completion"]["apiKey"], "sk-abc");
        assert_eq!(result["completion"]["baseUrl"], "https://llm.local/v1");
    }

    #[test]
    fn missing_var_names_path() {
        let v = json!({"telegram": {"botToken": "${MISSING_TOKEN}"}});
        let err = resolve_env_vars_with(&v, &HashMap::new()).unwrap_err();
        assert_eq!(err.var_name, "MISSING_TOKEN");
        assert_eq!(err.config_path, "telegram.botToken");
    }

    #[test]
    fn escaped_reference_is_literal() {
        let v = json!({"report": {"title": "cost $${PRICE}"}});
        let result = resolve_env_vars_with(&v, &HashMap::new()).unwrap();
        assert_eq!(result["report"]["title"], "cost ${PRICE}");
    }

    #[test]
    fn passthrough_plain_strings() {
        let v = json!({"a": "plain $5", "b": [1, true]});
        assert_eq!(resolve_env_vars_with(&v, &HashMap::new()).unwrap(), v);
    }

    #[test]
    fn overlay_applies_legacy_variables() {
        let mut config = ClaimDeskConfig::default();
        apply_env_overrides(
            &mut config,
            &env(&[
                ("TELEGRAM_BOT_TOKEN", "123:abc"),
                ("OPENAI_API_KEY", "sk-x"),
                ("OPENAI_MODEL", "gpt-4o"),
                ("MEDIA_DIR", "/srv/media"),
                ("WEB_SCRAPE_ENABLED", "1"),
                ("WATERMARK_TEXT", "Internal"),
                ("CLAIMDESK_LOG_LEVEL", "debug"),
            ]),
        );
        assert_eq!(config.telegram.bot_token.as_deref(), Some("123:abc"));
        assert_eq!(config.completion.api_key.as_deref(), Some("sk-x"));
        assert_eq!(config.completion.model, "gpt-4o");
        assert_eq!(config.telegram.media_dir, Some(PathBuf::from("/srv/media")));
        assert_eq!(config.report.archive_dir, Some(PathBuf::from("/srv/media")));
        assert!(config.fetch.enabled);
        assert_eq!(config.report.watermark, "Internal");
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn web_scrape_needs_exactly_one() {
        let mut config = ClaimDeskConfig::default();
        config.fetch.enabled = true;
        apply_env_overrides(&mut config, &env(&[("WEB_SCRAPE_ENABLED", "true")]));
        assert!(!config.fetch.enabled);
    }

    #[test]
    fn empty_values_are_ignored() {
        let mut config = ClaimDeskConfig::default();
        apply_env_overrides(&mut config, &env(&[("OPENAI_MODEL", "  ")]));
        assert_eq!(config.completion.model, "gpt-5");
    }
}
