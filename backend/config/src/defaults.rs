//! Default values for every config knob.

pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-5";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 800;
pub const DEFAULT_REPORT_MAX_TOKENS: u32 = 900;

pub const DEFAULT_ADAPTER_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_FETCH_MAX_CHARS: usize = 200_000;

pub const DEFAULT_TESSERACT: &str = "tesseract";
pub const DEFAULT_OCR_LANGUAGE: &str = "vie";

pub const DEFAULT_REPORT_TITLE: &str = "BÁO CÁO GIÁM ĐỊNH";
pub const DEFAULT_WATERMARK: &str = "Mr.P 0922372220";

pub const DEFAULT_MAX_TURNS: usize = 24;
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 6 * 60 * 60;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5 * 60;
pub const DEFAULT_TEXT_LIMIT: usize = 3000;

pub const DEFAULT_LOG_LEVEL: &str = "info";

pub(crate) fn base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}
pub(crate) fn model() -> String {
    DEFAULT_MODEL.to_string()
}
pub(crate) fn vision_model() -> String {
    DEFAULT_VISION_MODEL.to_string()
}
pub(crate) fn temperature() -> f64 {
    DEFAULT_TEMPERATURE
}
pub(crate) fn max_tokens() -> u32 {
    DEFAULT_MAX_TOKENS
}
pub(crate) fn report_max_tokens() -> u32 {
    DEFAULT_REPORT_MAX_TOKENS
}
pub(crate) fn adapter_timeout_secs() -> u64 {
    DEFAULT_ADAPTER_TIMEOUT_SECS
}
pub(crate) fn fetch_timeout_secs() -> u64 {
    DEFAULT_FETCH_TIMEOUT_SECS
}
pub(crate) fn fetch_max_chars() -> usize {
    DEFAULT_FETCH_MAX_CHARS
}
pub(crate) fn tesseract() -> String {
    DEFAULT_TESSERACT.to_string()
}
pub(crate) fn ocr_language() -> String {
    DEFAULT_OCR_LANGUAGE.to_string()
}
pub(crate) fn report_title() -> String {
    DEFAULT_REPORT_TITLE.to_string()
}
pub(crate) fn watermark() -> String {
    DEFAULT_WATERMARK.to_string()
}
pub(crate) fn max_turns() -> usize {
    DEFAULT_MAX_TURNS
}
pub(crate) fn idle_timeout_secs() -> u64 {
    DEFAULT_IDLE_TIMEOUT_SECS
}
pub(crate) fn sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}
pub(crate) fn text_limit() -> usize {
    DEFAULT_TEXT_LIMIT
}
pub(crate) fn log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
pub(crate) fn yes() -> bool {
    true
}
