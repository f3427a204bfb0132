pub mod prompts;
pub mod providers;

pub use prompts::{ANALYSIS_REQUEST, DEFAULT_SYSTEM_PROMPT};
pub use providers::openai::OpenAiProvider;
