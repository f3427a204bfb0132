//! Scrubs bot tokens, API keys and phone numbers from strings before logging.

use regex::Regex;
use std::sync::LazyLock;

static BOT_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{6,12}:[A-Za-z0-9_-]{30,}").unwrap());
static API_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(sk-[a-zA-Z0-9_-]{20,})|(Bearer\s+[a-zA-Z0-9\-\._~+/]+=*)").unwrap()
});
static TELEPHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}").unwrap()
});

pub fn redact_sensitive_data(input: &str) -> String {
    let redacted = BOT_TOKEN_RE.replace_all(input, "[REDACTED_BOT_TOKEN]");
    let redacted = API_KEY_RE.replace_all(&redacted, "[REDACTED_TOKEN]");
    TELEPHONE_RE.replace_all(&redacted, "[REDACTED_PHONE]").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redaction() {
        let raw = "Sending to +1-555-123-4567 with Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";
        let clean = redact_sensitive_data(raw);
        assert!(!clean.contains("+1-555-123-4567"));
        assert!(!clean.contains("Bearer eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9"));
    }

    #[test]
    fn test_bot_token() {
        let clean = redact_sensitive_data("url https://api.telegram.org/bot123456789:AAHdqTcvCH1vGWJxfSeofSAs0K5PALDsaw/getMe");
        assert!(clean.contains("[REDACTED_BOT_TOKEN]"));
        assert!(!clean.contains("AAHdqTcv"));
    }

    #[test]
    fn test_vietnamese_mobile_number() {
        assert_eq!(redact_sensitive_data("gọi 0922372220"), "gọi [REDACTED_PHONE]");
    }
}
