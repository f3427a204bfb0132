//! The ClaimDesk pipeline: classify each inbound event, call the matching
//! adapter under a time bound, keep the user's context up to date, and
//! produce the outbound result.

pub mod lanes;
pub mod messages;
pub mod router;
pub mod settings;
pub mod transcript;

pub use lanes::{LaneGuard, UserLanes};
pub use router::{Adapters, Router};
pub use settings::RouterSettings;
pub use transcript::{format_transcript, report_body, report_file_name};
