//! Context policy: text truncation and turn eviction.
//!
//! Both are pure so the store and the handlers share one definition.

use crate::types::{Role, Turn};

/// Maximum number of characters kept from fetched or extracted text.
pub const TURN_TEXT_LIMIT: usize = 3000;

/// Cut `text` to at most `limit` characters without splitting a code point.
pub fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Like [`truncate`], with a trailing ellipsis when something was cut.
pub fn preview(text: &str, limit: usize) -> String {
    let cut = truncate(text, limit);
    if cut.len() < text.len() {
        format!("{cut}...")
    } else {
        cut.to_string()
    }
}

/// Collapse runs of whitespace (including newlines) into single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Index of the pinned turn: the most recent `system` turn, if any.
pub fn pinned_index(turns: &[Turn]) -> Option<usize> {
    turns.iter().rposition(|t| t.role == Role::System)
}

/// Drop the oldest turns until at most `cap` remain, never dropping `pinned`.
///
/// A cap of zero is treated as one so the pinned turn always fits.
/// Returns the number of evicted turns.
pub fn evict_to_cap(turns: &mut Vec<Turn>, cap: usize, pinned: Option<usize>) -> usize {
    let cap = cap.max(1);
    let before = turns.len();
    if before <= cap {
        return 0;
    }

    let mut excess = before - cap;
    let mut index = 0usize;
    turns.retain(|_| {
        let keep = if excess > 0 && Some(index) != pinned {
            excess -= 1;
            false
        } else {
            true
        };
        index += 1;
        keep
    });

    before - turns.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceTag;

    fn chat(n: usize) -> Vec<Turn> {
        (0..n)
            .map(|i| Turn::user(format!("message {i}"), SourceTag::Chat))
            .collect()
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        let text = "Tạo báo cáo";
        assert_eq!(truncate(text, 3), "Tạo");
        assert_eq!(truncate(text, 100), text);
        assert_eq!(truncate("", 5), "");
        assert_eq!(truncate("abc", 0), "");
    }

    #[test]
    fn test_truncate_multibyte_never_panics() {
        let text = "ệ".repeat(10);
        for limit in 0..12 {
            let cut = truncate(&text, limit);
            assert_eq!(cut.chars().count(), limit.min(10));
        }
    }

    #[test]
    fn test_preview_marks_cut() {
        assert_eq!(preview("abcdef", 3), "abc...");
        assert_eq!(preview("abc", 3), "abc");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\n b\t c  "), "a b c");
    }

    #[test]
    fn test_evict_drops_oldest_first() {
        let mut turns = chat(5);
        let evicted = evict_to_cap(&mut turns, 3, None);
        assert_eq!(evicted, 2);
        let contents: Vec<_> = turns.iter().map(|t| t.content.as_str()).collect();
        assert_eq!(contents, vec!["message 2", "message 3", "message 4"]);
    }

    #[test]
    fn test_evict_keeps_pinned_system_turn() {
        let mut turns = vec![Turn::system("be brief")];
        turns.extend(chat(6));
        let pinned = pinned_index(&turns);
        assert_eq!(pinned, Some(0));

        evict_to_cap(&mut turns, 3, pinned);
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[1].content, "message 4");
        assert_eq!(turns[2].content, "message 5");
    }

    #[test]
    fn test_pinned_is_most_recent_system_turn() {
        let mut turns = vec![Turn::system("old rules")];
        turns.extend(chat(2));
        turns.push(Turn::system("new rules"));
        turns.extend(chat(2));
        let pinned = pinned_index(&turns);
        assert_eq!(pinned, Some(3));

        evict_to_cap(&mut turns, 2, pinned);
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].content, "new rules");
        assert_eq!(turns[1].content, "message 1");
    }

    #[test]
    fn test_zero_cap_keeps_one_turn() {
        let mut turns = chat(3);
        evict_to_cap(&mut turns, 0, None);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].content, "message 2");
    }

    #[test]
    fn test_under_cap_is_untouched() {
        let mut turns = chat(2);
        assert_eq!(evict_to_cap(&mut turns, 5, None), 0);
        assert_eq!(turns.len(), 2);
    }
}
