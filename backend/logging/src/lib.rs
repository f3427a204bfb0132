//! Logging setup and observability records for ClaimDesk.
//!
//! Console plus optional NDJSON file output, redaction of secrets and phone
//! numbers, and the `pipeline_events` record stream.

pub mod event_logger;
pub mod logger;
pub mod redact;

pub use event_logger::{EventLogEntry, EventLogger, PipelineEvent, EVENT_TARGET};
pub use logger::init_logger;
pub use redact::redact_sensitive_data;
