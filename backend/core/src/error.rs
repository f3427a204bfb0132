use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which external collaborator an [`AdapterError`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterKind {
    Extraction,
    Fetch,
    Completion,
    Render,
}

impl fmt::Display for AdapterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AdapterKind::Extraction => "extraction",
            AdapterKind::Fetch => "fetch",
            AdapterKind::Completion => "completion",
            AdapterKind::Render => "render",
        };
        f.write_str(s)
    }
}

/// The only failure type allowed across an adapter boundary.
///
/// Every variant carries a human-readable cause and whether the caller may
/// reasonably try again later (timeouts, rate limits, upstream 5xx).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdapterError {
    #[error("extraction failed: {cause}")]
    Extraction { cause: String, retryable: bool },

    #[error("fetch failed: {cause}")]
    Fetch { cause: String, retryable: bool },

    #[error("completion failed: {cause}")]
    Completion { cause: String, retryable: bool },

    #[error("report rendering failed: {cause}")]
    Render { cause: String, retryable: bool },
}

impl AdapterError {
    pub fn new(kind: AdapterKind, cause: impl Into<String>, retryable: bool) -> Self {
        let cause = cause.into();
        match kind {
            AdapterKind::Extraction => AdapterError::Extraction { cause, retryable },
            AdapterKind::Fetch => AdapterError::Fetch { cause, retryable },
            AdapterKind::Completion => AdapterError::Completion { cause, retryable },
            AdapterKind::Render => AdapterError::Render { cause, retryable },
        }
    }

    /// A permanent failure of the given kind.
    pub fn fatal(kind: AdapterKind, cause: impl Into<String>) -> Self {
        Self::new(kind, cause, false)
    }

    /// A transient failure of the given kind.
    pub fn transient(kind: AdapterKind, cause: impl Into<String>) -> Self {
        Self::new(kind, cause, true)
    }

    /// An adapter call that did not finish within its time bound.
    pub fn timed_out(kind: AdapterKind, after: Duration) -> Self {
        Self::transient(kind, format!("timed out after {}s", after.as_secs_f32()))
    }

    pub fn kind(&self) -> AdapterKind {
        match self {
            AdapterError::Extraction { .. } => AdapterKind::Extraction,
            AdapterError::Fetch { .. } => AdapterKind::Fetch,
            AdapterError::Completion { .. } => AdapterKind::Completion,
            AdapterError::Render { .. } => AdapterKind::Render,
        }
    }

    pub fn cause(&self) -> &str {
        match self {
            AdapterError::Extraction { cause, .. }
            | AdapterError::Fetch { cause, .. }
            | AdapterError::Completion { cause, .. }
            | AdapterError::Render { cause, .. } => cause,
        }
    }

    pub fn retryable(&self) -> bool {
        match self {
            AdapterError::Extraction { retryable, .. }
            | AdapterError::Fetch { retryable, .. }
            | AdapterError::Completion { retryable, .. }
            | AdapterError::Render { retryable, .. } => *retryable,
        }
    }
}

/// HTTP statuses that signal a transient upstream condition.
pub fn is_transient_status(status: u16) -> bool {
    status == 408 || status == 429 || (500..600).contains(&status)
}
