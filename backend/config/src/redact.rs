//! Config redaction: a copy of the config that is safe to print or log.

use serde_json::Value;

use crate::schema::ClaimDeskConfig;

const SENSITIVE_KEYS: &[&str] = &["apiKey", "botToken", "token", "secret", "password"];

fn is_sensitive_key(key: &str) -> bool {
    SENSITIVE_KEYS.iter().any(|k| k.eq_ignore_ascii_case(key))
}

fn mask(secret: &str) -> String {
    // Keep a short prefix so operators can tell keys apart.
    let prefix: String = secret.chars().take(4).collect();
    if secret.chars().count() > 8 {
        format!("{prefix}***")
    } else {
        "***".to_string()
    }
}

fn redact_value(value: &Value, key: &str) -> Value {
    match value {
        Value::String(s) if is_sensitive_key(key) && !s.is_empty() => Value::String(mask(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| redact_value(v, key)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), redact_value(v, k)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// The config as JSON with every secret masked.
pub fn redact(config: &ClaimDeskConfig) -> Value {
    match serde_json::to_value(config) {
        Ok(value) => redact_value(&value, ""),
        Err(_) => Value::Null,
    }
}

/// The redacted config rendered as YAML.
pub fn redacted_yaml(config: &ClaimDeskConfig) -> String {
    serde_yaml::to_string(&redact(config)).unwrap_or_default()
}
