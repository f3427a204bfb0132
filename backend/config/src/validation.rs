//! Config validation with user-friendly messages.

use crate::schema::{ClaimDeskConfig, OcrBackend};

/// One finding, addressed by its camelCase config path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Config validation error at '{path}': {message}")]
pub struct ConfigIssue {
    pub path: String,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<ConfigIssue>,
    pub warnings: Vec<ConfigIssue>,
}

impl ValidationReport {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    fn error(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigIssue { path: path.into(), message: message.into() });
    }

    fn warn(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigIssue { path: path.into(), message: message.into() });
    }
}

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error", "off"];

pub fn validate(config: &ClaimDeskConfig) -> ValidationReport {
    let mut report = ValidationReport::default();
    validate_telegram(config, &mut report);
    validate_completion(config, &mut report);
    validate_extraction(config, &mut report);
    validate_fetch(config, &mut report);
    validate_report(config, &mut report);
    validate_session(config, &mut report);
    validate_logging(config, &mut report);
    report
}

fn blank(value: &Option<String>) -> bool {
    value.as_deref().map(str::trim).map(str::is_empty).unwrap_or(true)
}

fn validate_telegram(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    match config.telegram.bot_token.as_deref().map(str::trim) {
        None | Some("") => {
            report.error("telegram.botToken", "Telegram bot token is required (or set TELEGRAM_BOT_TOKEN)")
        }
        Some(token) if !token.contains(':') => {
            report.warn("telegram.botToken", "Token does not look like a BotFather token (<id>:<secret>)")
        }
        Some(_) => {}
    }
}

fn validate_completion(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    let c = &config.completion;
    if blank(&c.api_key) {
        report.error("completion.apiKey", "API key is required (or set OPENAI_API_KEY)");
    }
    if !(c.base_url.starts_with("http://") || c.base_url.starts_with("https://")) {
        report.error("completion.baseUrl", format!("'{}' is not an http(s) URL", c.base_url));
    }
    if c.model.trim().is_empty() {
        report.error("completion.model", "Model cannot be empty");
    }
    if !(0.0..=2.0).contains(&c.temperature) {
        report.error("completion.temperature", "Temperature must be between 0 and 2");
    }
    if c.max_tokens == 0 {
        report.error("completion.maxTokens", "maxTokens must be > 0");
    }
    if c.report_max_tokens == 0 {
        report.error("completion.reportMaxTokens", "reportMaxTokens must be > 0");
    }
    if c.timeout_secs == 0 {
        report.error("completion.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_extraction(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    let e = &config.extraction;
    if e.timeout_secs == 0 {
        report.error("extraction.timeoutSecs", "timeoutSecs must be > 0");
    }
    match e.backend {
        OcrBackend::Tesseract if e.language.trim().is_empty() => {
            report.error("extraction.language", "Tesseract language cannot be empty");
        }
        OcrBackend::Vision if e.vision_model.trim().is_empty() => {
            report.error("extraction.visionModel", "Vision model cannot be empty");
        }
        _ => {}
    }
    if e.auto_analyze && config.completion.max_tokens < 100 {
        report.warn("extraction.autoAnalyze", "Analysis replies will be very short with maxTokens < 100");
    }
}

fn validate_fetch(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    let f = &config.fetch;
    if f.enabled && f.timeout_secs == 0 {
        report.error("fetch.timeoutSecs", "timeoutSecs must be > 0 when fetching is enabled");
    }
    if f.enabled && f.allow_private_hosts {
        report.warn("fetch.allowPrivateHosts", "Users can make the bot fetch internal network addresses");
    }
}

fn validate_report(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    let r = &config.report;
    if r.watermark.trim().is_empty() {
        report.warn("report.watermark", "Reports will carry no watermark");
    }
    if r.title.trim().is_empty() {
        report.warn("report.title", "Reports will have an empty title");
    }
    if r.timeout_secs == 0 {
        report.error("report.timeoutSecs", "timeoutSecs must be > 0");
    }
}

fn validate_session(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    let s = &config.session;
    if s.max_turns == 0 {
        report.warn("session.maxTurns", "maxTurns of 0 is treated as 1");
    }
    if s.text_limit == 0 {
        report.error("session.textLimit", "textLimit must be > 0");
    }
    if s.idle_timeout_secs == 0 {
        report.error("session.idleTimeoutSecs", "idleTimeoutSecs must be > 0");
    } else if s.sweep_interval_secs > s.idle_timeout_secs {
        report.warn(
            "session.sweepIntervalSecs",
            "Sweep interval is longer than the inactivity window; idle sessions linger",
        );
    }
}

fn validate_logging(config: &ClaimDeskConfig, report: &mut ValidationReport) {
    let level = config.logging.level.trim().to_ascii_lowercase();
    // Full filter directives ("info,claimdesk=debug") are passed through as-is.
    if !level.contains(['=', ',']) && !LOG_LEVELS.contains(&level.as_str()) {
        report.warn("logging.level", format!("Unknown log level '{}'", config.logging.level));
    }
}
