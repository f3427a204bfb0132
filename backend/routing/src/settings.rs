use std::path::PathBuf;
use std::time::Duration;

use claimdesk_core::TURN_TEXT_LIMIT;

/// Knobs the router reads on every event. Fixed at startup.
#[derive(Debug, Clone)]
pub struct RouterSettings {
    /// Whether `fetch <url>` may reach the network.
    pub fetch_enabled: bool,
    /// Prepended to every completion request; empty means none.
    pub system_prompt: String,
    /// Extra instruction appended to the system prompt for report assessments.
    pub analysis_prompt: String,
    /// Character limit for text stored as a turn.
    pub text_limit: usize,
    pub max_tokens: Option<u32>,
    pub report_max_tokens: Option<u32>,
    pub extraction_timeout: Duration,
    pub fetch_timeout: Duration,
    pub completion_timeout: Duration,
    pub render_timeout: Duration,
    pub report_title: String,
    /// Run a completion over the session after each successful extraction.
    pub auto_analyze: bool,
    /// Ask for an assessment before rendering a report.
    pub include_analysis: bool,
    /// Where a copy of each rendered report is written, if anywhere.
    pub archive_dir: Option<PathBuf>,
}

impl Default for RouterSettings {
    fn default() -> Self {
        Self {
            fetch_enabled: false,
            system_prompt: String::new(),
            analysis_prompt: String::new(),
            text_limit: TURN_TEXT_LIMIT,
            max_tokens: Some(700),
            report_max_tokens: Some(900),
            extraction_timeout: Duration::from_secs(60),
            fetch_timeout: Duration::from_secs(10),
            completion_timeout: Duration::from_secs(60),
            render_timeout: Duration::from_secs(60),
            report_title: "BÁO CÁO GIÁM ĐỊNH".to_string(),
            auto_analyze: false,
            include_analysis: false,
            archive_dir: None,
        }
    }
}
