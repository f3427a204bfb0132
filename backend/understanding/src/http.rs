use claimdesk_core::{is_transient_status, AdapterError, AdapterKind};

/// Wrap a transport-level HTTP failure; timeouts and connection failures are transient.
pub(crate) fn from_reqwest(kind: AdapterKind, err: &reqwest::Error) -> AdapterError {
    let retryable = err.is_timeout()
        || err.is_connect()
        || err.status().map(|s| is_transient_status(s.as_u16())).unwrap_or(false);
    AdapterError::new(kind, err.to_string(), retryable)
}

/// Wrap a non-success HTTP status.
pub(crate) fn from_status(kind: AdapterKind, status: reqwest::StatusCode, body: &str) -> AdapterError {
    let snippet: String = body.chars().take(200).collect();
    AdapterError::new(
        kind,
        format!("upstream returned {status}: {snippet}"),
        is_transient_status(status.as_u16()),
    )
}
