//! Pipeline event records.
//!
//! One record per handled event, adapter failure and internal error, written
//! through `tracing` on the `pipeline_events` target so the JSON file layer
//! picks them up as NDJSON.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::redact::redact_sensitive_data;

pub const EVENT_TARGET: &str = "pipeline_events";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    Handled {
        command: String,
        elapsed_ms: u64,
        turns: usize,
    },
    AdapterFailure {
        command: String,
        adapter: String,
        cause: String,
        retryable: bool,
    },
    InternalError {
        command: String,
        message: String,
    },
}

impl PipelineEvent {
    fn is_failure(&self) -> bool {
        !matches!(self, PipelineEvent::Handled { .. })
    }
}

#[derive(Debug, Serialize)]
pub struct EventLogEntry {
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub event: PipelineEvent,
}

impl EventLogEntry {
    /// Build a record with all free text redacted.
    pub fn new(user: &str, mut event: PipelineEvent) -> Self {
        match &mut event {
            PipelineEvent::Handled { .. } => {}
            PipelineEvent::AdapterFailure { cause, .. } => {
                *cause = redact_sensitive_data(cause);
            }
            PipelineEvent::InternalError { message, .. } => {
                *message = redact_sensitive_data(message);
            }
        }
        Self {
            user: user.to_string(),
            timestamp: Utc::now(),
            event,
        }
    }
}

pub struct EventLogger;

impl EventLogger {
    pub fn log_event(user: &str, event: PipelineEvent) {
        let failure = event.is_failure();
        let entry = EventLogEntry::new(user, event);
        let json = serde_json::to_string(&entry).unwrap_or_default();
        if failure {
            warn!(target: EVENT_TARGET, user = %entry.user, record = %json, "pipeline event");
        } else {
            info!(target: EVENT_TARGET, user = %entry.user, record = %json, "pipeline event");
        }
    }
}
