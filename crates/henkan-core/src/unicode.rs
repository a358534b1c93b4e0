//! Character-level text primitives.
//!
//! Every length and offset used for segment keys is a count of Unicode scalar
//! values, never a byte count. Use `chars_len` and `char_substring` instead of
//! `str::len` and byte slicing whenever a key is measured or split.

/// Number of Unicode scalar values in `s`.
pub fn chars_len(s: &str) -> usize {
    s.chars().count()
}

/// Substring of `s` starting at character `start` spanning `len` characters.
///
/// Both bounds are clamped to the end of `s`, so out-of-range requests yield a
/// shorter (possibly empty) slice instead of panicking.
pub fn char_substring(s: &str, start: usize, len: usize) -> &str {
    let begin = byte_offset(s, start);
    let rest = &s[begin..];
    let end = byte_offset(rest, len);
    &rest[..end]
}

/// Byte offset of the `n`-th character, or `s.len()` if `n` is past the end.
fn byte_offset(s: &str, n: usize) -> usize {
    s.char_indices().nth(n).map_or(s.len(), |(i, _)| i)
}

/// Check the full Hiragana block (U+3040..U+309F).
pub fn is_hiragana(c: char) -> bool {
    ('\u{3040}'..='\u{309F}').contains(&c)
}

/// Check the full Katakana block (U+30A0..U+30FF). Includes the prolonged
/// sound mark ー (U+30FC).
pub fn is_katakana(c: char) -> bool {
    ('\u{30A0}'..='\u{30FF}').contains(&c)
}

pub fn is_kanji(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
        || ('\u{3400}'..='\u{4DBF}').contains(&c)
        || ('\u{20000}'..='\u{2A6DF}').contains(&c)
}

/// Half-width or full-width decimal digit.
pub fn is_number(c: char) -> bool {
    c.is_ascii_digit() || ('\u{FF10}'..='\u{FF19}').contains(&c)
}

/// Half-width or full-width Latin letter.
pub fn is_alphabet(c: char) -> bool {
    c.is_ascii_alphabetic()
        || ('\u{FF21}'..='\u{FF3A}').contains(&c)
        || ('\u{FF41}'..='\u{FF5A}').contains(&c)
}

/// Coarse script class of a single character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScriptType {
    Hiragana,
    Katakana,
    Kanji,
    Number,
    Alphabet,
    Unknown,
}

pub fn script_type(c: char) -> ScriptType {
    if is_hiragana(c) {
        ScriptType::Hiragana
    } else if is_katakana(c) {
        ScriptType::Katakana
    } else if is_kanji(c) {
        ScriptType::Kanji
    } else if is_number(c) {
        ScriptType::Number
    } else if is_alphabet(c) {
        ScriptType::Alphabet
    } else {
        ScriptType::Unknown
    }
}

/// Convert a hiragana string to katakana.
/// Non-hiragana characters (ー, ASCII, etc.) are passed through unchanged.
pub fn hiragana_to_katakana(s: &str) -> String {
    s.chars()
        .map(|c| {
            if is_hiragana(c) {
                char::from_u32(c as u32 + 0x60).unwrap_or(c)
            } else {
                c
            }
        })
        .collect()
}

/// Map full-width ASCII variants (U+FF01..U+FF5E) and the ideographic space to
/// their half-width counterparts. Everything else is passed through.
pub fn fullwidth_ascii_to_halfwidth(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
            '\u{3000}' => ' ',
            _ => c,
        })
        .collect()
}
