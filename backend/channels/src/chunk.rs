//! Splitting long replies into Telegram-sized messages.

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;

/// Split `text` into chunks of at most `limit` characters.
///
/// Prefers breaking after a newline in the second half of a chunk, so
/// paragraphs stay intact where possible. Never splits inside a character.
pub fn split_message(text: &str, limit: usize) -> Vec<String> {
    let limit = limit.max(1);
    let mut chunks = Vec::new();
    let mut rest = text;

    while rest.chars().count() > limit {
        // Byte offset just past the `limit`-th character.
        let hard = rest
            .char_indices()
            .nth(limit)
            .map(|(i, _)| i)
            .unwrap_or(rest.len());
        let window = &rest[..hard];
        let cut = match window.rfind('\n') {
            Some(nl) if window[..nl].chars().count() >= limit / 2 => nl + 1,
            _ => hard,
        };
        chunks.push(rest[..cut].trim_end_matches('\n').to_string());
        rest = &rest[cut..];
    }
    if !rest.is_empty() || chunks.is_empty() {
        chunks.push(rest.to_string());
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        assert_eq!(split_message("xin chào", 4096), vec!["xin chào"]);
        assert_eq!(split_message("", 4096), vec![""]);
    }

    #[test]
    fn test_hard_split_counts_characters() {
        let text = "đ".repeat(10);
        let chunks = split_message(&text, 4);
        assert_eq!(chunks, vec!["đđđđ", "đđđđ", "đđ"]);
    }

    #[test]
    fn test_prefers_newline_boundaries() {
        let text = "aaaaaa\nbbbbbb\ncc";
        let chunks = split_message(text, 10);
        assert_eq!(chunks, vec!["aaaaaa", "bbbbbb\ncc"]);
    }

    #[test]
    fn test_every_chunk_within_limit() {
        let text = "dòng văn bản\n".repeat(1000);
        for chunk in split_message(&text, TELEGRAM_MESSAGE_LIMIT) {
            assert!(chunk.chars().count() <= TELEGRAM_MESSAGE_LIMIT);
        }
    }
}
