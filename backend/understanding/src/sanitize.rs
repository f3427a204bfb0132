use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

static HYPHEN_NEWLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?P<prefix>\w)-[ \t]*\r?\n[ \t]*(?P<suffix>\w)").unwrap());

/// Clean up OCR / PDF output: NFC-normalize, re-join hyphenated line breaks,
/// collapse spaces within lines and runs of blank lines.
pub fn sanitize_extracted_text(raw: &str) -> String {
    let normalized: String = raw.nfc().collect();
    let joined = HYPHEN_NEWLINE.replace_all(&normalized, "$prefix$suffix");

    let mut out = String::with_capacity(joined.len());
    let mut pending_blank = false;
    for line in joined.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() {
            pending_blank = !out.is_empty();
            continue;
        }
        if !out.is_empty() {
            out.push_str(if pending_blank { "\n\n" } else { "\n" });
        }
        out.push_str(&line);
        pending_blank = false;
    }
    out
}
