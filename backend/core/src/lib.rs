pub mod error;
pub mod mock;
pub mod policy;
pub mod traits;
pub mod types;

pub use error::{is_transient_status, AdapterError, AdapterKind};
pub use policy::{evict_to_cap, normalize_whitespace, pinned_index, preview, truncate, TURN_TEXT_LIMIT};
pub use traits::{CompletionProvider, CompletionRequest, PageFetcher, ReportRenderer, TextExtractor};
pub use types::{
    Attachment, Blob, EventKind, InboundEvent, OutboundResult, Payload, Role, SourceTag, Turn,
    UserId,
};
