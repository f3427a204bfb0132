//! ClaimDesk runtime configuration schema.
//!
//! Every section and field has a default, so an empty file (or none at all)
//! is a valid config; secrets usually arrive through the environment.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClaimDeskConfig {
    pub telegram: TelegramConfig,
    pub completion: CompletionConfig,
    pub extraction: ExtractionConfig,
    pub fetch: FetchConfig,
    pub report: ReportConfig,
    pub session: SessionConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// Telegram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelegramConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bot_token: Option<String>,

    /// Inbound photos and documents are saved here when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_dir: Option<PathBuf>,

    /// Send a short "working on it" notice before slow operations.
    #[serde(default = "defaults::yes")]
    pub ack_messages: bool,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            bot_token: None,
            media_dir: None,
            ack_messages: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Completion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    #[serde(default = "defaults::model")]
    pub model: String,

    #[serde(default = "defaults::temperature")]
    pub temperature: f64,

    /// Budget for chat replies and post-extraction analysis.
    #[serde(default = "defaults::max_tokens")]
    pub max_tokens: u32,

    /// Budget for the assessment included in reports.
    #[serde(default = "defaults::report_max_tokens")]
    pub report_max_tokens: u32,

    /// Overrides the built-in assessor persona.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,

    #[serde(default = "defaults::adapter_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: defaults::base_url(),
            model: defaults::model(),
            temperature: defaults::temperature(),
            max_tokens: defaults::max_tokens(),
            report_max_tokens: defaults::report_max_tokens(),
            system_prompt: None,
            timeout_secs: defaults::adapter_timeout_secs(),
        }
    }
}

impl CompletionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Extraction
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OcrBackend {
    #[default]
    Tesseract,
    Vision,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionConfig {
    #[serde(default)]
    pub backend: OcrBackend,

    #[serde(default = "defaults::tesseract")]
    pub tesseract_path: String,

    /// Tesseract language pack.
    #[serde(default = "defaults::ocr_language")]
    pub language: String,

    /// Model used when `backend` is `vision`.
    #[serde(default = "defaults::vision_model")]
    pub vision_model: String,

    #[serde(default = "defaults::adapter_timeout_secs")]
    pub timeout_secs: u64,

    /// Ask the model for an analysis right after each extraction.
    #[serde(default)]
    pub auto_analyze: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: OcrBackend::default(),
            tesseract_path: defaults::tesseract(),
            language: defaults::ocr_language(),
            vision_model: defaults::vision_model(),
            timeout_secs: defaults::adapter_timeout_secs(),
            auto_analyze: false,
        }
    }
}

impl ExtractionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "defaults::fetch_timeout_secs")]
    pub timeout_secs: u64,

    /// Permit loopback and private-network targets.
    #[serde(default)]
    pub allow_private_hosts: bool,

    /// Hosts exempt from the private-address check, matched exactly.
    #[serde(default)]
    pub allowed_hosts: Vec<String>,

    /// Downloaded pages are cut to this many characters before parsing.
    #[serde(default = "defaults::fetch_max_chars")]
    pub max_chars: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            timeout_secs: defaults::fetch_timeout_secs(),
            allow_private_hosts: false,
            allowed_hosts: Vec::new(),
            max_chars: defaults::fetch_max_chars(),
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportConfig {
    #[serde(default = "defaults::report_title")]
    pub title: String,

    #[serde(default = "defaults::watermark")]
    pub watermark: String,

    /// Ask the model for an assessment and append it to the report.
    #[serde(default)]
    pub include_analysis: bool,

    /// A copy of every report is written here when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub archive_dir: Option<PathBuf>,

    #[serde(default = "defaults::adapter_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            title: defaults::report_title(),
            watermark: defaults::watermark(),
            include_analysis: false,
            archive_dir: None,
            timeout_secs: defaults::adapter_timeout_secs(),
        }
    }
}

impl ReportConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionConfig {
    #[serde(default = "defaults::max_turns")]
    pub max_turns: usize,

    #[serde(default = "defaults::idle_timeout_secs")]
    pub idle_timeout_secs: u64,

    #[serde(default = "defaults::sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Character limit for extracted or fetched text stored as a turn.
    #[serde(default = "defaults::text_limit")]
    pub text_limit: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_turns: defaults::max_turns(),
            idle_timeout_secs: defaults::idle_timeout_secs(),
            sweep_interval_secs: defaults::sweep_interval_secs(),
            text_limit: defaults::text_limit(),
        }
    }
}

impl SessionConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoggingConfig {
    /// Default filter; `RUST_LOG` takes precedence.
    #[serde(default = "defaults::log_level")]
    pub level: String,

    /// Directory for daily-rotated JSON logs; console only when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            dir: None,
        }
    }
}
