//! Command detection: identify commands at the start of inbound text.
use crate::registry::CommandRegistry;
use crate::types::CommandInvocation;

fn split_first_word(text: &str) -> (&str, &str) {
    text.split_once(char::is_whitespace)
        .map(|(word, rest)| (word, rest.trim_start()))
        .unwrap_or((text, ""))
}

/// `/report@claimdesk_bot` → `/report`. Bare words are returned unchanged.
fn strip_bot_mention(word: &str) -> &str {
    if word.starts_with('/') {
        word.split_once('@').map(|(name, _)| name).unwrap_or(word)
    } else {
        word
    }
}

/// Match a multi-word phrase against the start of `text`, word by word and
/// case-insensitively. Returns the text after the phrase.
fn match_phrase<'a>(text: &'a str, phrase: &str) -> Option<&'a str> {
    let mut rest = text;
    for expected in phrase.split_whitespace() {
        let (word, tail) = split_first_word(rest);
        if word.to_lowercase() != expected.to_lowercase() {
            return None;
        }
        rest = tail;
    }
    Some(rest)
}

/// Detect a known command at the start of `text`.
///
/// Accepts slash names with or without the leading `/` (and with a Telegram
/// `@bot` suffix), and free-text phrases such as "tạo báo cáo".
/// Returns `None` for anything else.
pub fn detect_command(text: &str, registry: &CommandRegistry) -> Option<CommandInvocation> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }

    let (first, rest) = split_first_word(trimmed);
    if let Some(def) = registry.find_by_slash_name(strip_bot_mention(first)) {
        return Some(CommandInvocation {
            verb: def.verb,
            raw_alias: first.to_string(),
            raw_args: rest.trim().to_string(),
        });
    }

    for def in registry.all() {
        for phrase in &def.phrases {
            if let Some(rest) = match_phrase(trimmed, phrase) {
                let alias_len = trimmed.len() - rest.len();
                return Some(CommandInvocation {
                    verb: def.verb,
                    raw_alias: trimmed[..alias_len].trim_end().to_string(),
                    raw_args: rest.trim().to_string(),
                });
            }
        }
    }

    None
}

/// Whether a transport should mark `text` as a command event: any `/`-prefixed
/// text, or text starting with a known phrase.
pub fn looks_like_command(text: &str, registry: &CommandRegistry) -> bool {
    let trimmed = text.trim_start();
    if trimmed.starts_with('/') {
        return true;
    }
    registry
        .all()
        .iter()
        .flat_map(|def| def.phrases.iter())
        .any(|phrase| match_phrase(trimmed, phrase).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Verb;

    fn detect(text: &str) -> Option<CommandInvocation> {
        detect_command(text, &CommandRegistry::new())
    }

    #[test]
    fn test_slash_commands() {
        assert_eq!(detect("/start").unwrap().verb, Verb::Start);
        assert_eq!(detect("/report@claimdesk_bot").unwrap().verb, Verb::Report);
        assert_eq!(detect("  /Extract ").unwrap().verb, Verb::Extract);
    }

    #[test]
    fn test_bare_names_are_accepted() {
        assert_eq!(detect("start").unwrap().verb, Verb::Start);
        assert_eq!(detect("report").unwrap().verb, Verb::Report);
    }

    #[test]
    fn test_vietnamese_phrases() {
        let inv = detect("Tạo báo cáo").unwrap();
        assert_eq!(inv.verb, Verb::Report);
        assert_eq!(inv.raw_alias, "Tạo báo cáo");
        assert_eq!(detect("TRÍCH XUẤT").unwrap().verb, Verb::Extract);
        assert_eq!(detect("trich xuat file").unwrap().verb, Verb::Extract);
    }

    #[test]
    fn test_fetch_keeps_url_casing() {
        let inv = detect("fetch https://Example.com/Path?q=A").unwrap();
        assert_eq!(inv.verb, Verb::Fetch);
        assert_eq!(inv.raw_args, "https://Example.com/Path?q=A");

        let inv = detect("/fetch   http://example.com  ").unwrap();
        assert_eq!(inv.raw_args, "http://example.com");
    }

    #[test]
    fn test_non_commands() {
        assert!(detect("").is_none());
        assert!(detect("/help").is_none());
        assert!(detect("xe bị va chạm ở ngã tư").is_none());
        assert!(detect("tạo").is_none());
        assert!(detect("fetcher").is_none());
    }

    #[test]
    fn test_looks_like_command() {
        let registry = CommandRegistry::new();
        assert!(looks_like_command("/anything", &registry));
        assert!(looks_like_command("fetch http://example.com", &registry));
        assert!(looks_like_command("tạo báo cáo", &registry));
        assert!(!looks_like_command("start the car", &registry));
        assert!(!looks_like_command("báo cáo tai nạn", &registry));
    }
}
