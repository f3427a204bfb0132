use unicode_normalization::char::compose;
use unicode_normalization::UnicodeNormalization;

/// Encode `text` for a WinAnsi Type1 font.
///
/// Latin-1 characters pass through. Anything else is decomposed and rebuilt
/// from its base letter plus whichever marks still compose into Latin-1, so
/// `ế` becomes `ê` and `ạ` becomes `a`. Unmappable characters become `?`.
pub fn to_win_ansi(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len());
    for ch in text.chars() {
        out.push(fold_char(ch));
    }
    out
}

fn latin1(ch: char) -> Option<u8> {
    let code = ch as u32;
    // 0x80..0xA0 are WinAnsi punctuation slots, not the Latin-1 control block.
    if (0x20..0x7F).contains(&code) || (0xA0..=0xFF).contains(&code) {
        Some(code as u8)
    } else {
        None
    }
}

fn fold_char(ch: char) -> u8 {
    if let Some(b) = latin1(ch) {
        return b;
    }
    match ch {
        '\t' => return b' ',
        'đ' => return b'd',
        'Đ' => return b'D',
        '\u{2018}' | '\u{2019}' => return b'\'',
        '\u{201C}' | '\u{201D}' => return b'"',
        '\u{2013}' | '\u{2014}' => return b'-',
        '\u{2026}' => return b'.',
        _ => {}
    }

    let mut parts = std::iter::once(ch).nfd();
    let Some(mut base) = parts.next() else {
        return b'?';
    };
    if latin1(base).is_none() {
        return b'?';
    }
    for mark in parts {
        if let Some(combined) = compose(base, mark) {
            if latin1(combined).is_some() {
                base = combined;
            }
        }
    }
    latin1(base).unwrap_or(b'?')
}
