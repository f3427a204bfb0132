pub mod classify;
pub mod detection;
pub mod registry;
pub mod types;

pub use classify::classify;
pub use detection::{detect_command, looks_like_command};
pub use registry::{builtin_commands, CommandRegistry};
pub use types::{Command, CommandDef, CommandInvocation, Verb};
