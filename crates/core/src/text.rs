//! Text canonicalization shared by slip extraction and sheet import.
//!
//! Two normalizers live here. [`normalize_text`] is the light pass applied to
//! every OCR result before anything reads it. [`normalize_for_match`] is the
//! aggressive fold used only to compare text against hint lists; its output is
//! never shown to anyone.

use unicode_normalization::UnicodeNormalization;

const THAI_DIGIT_ZERO: u32 = 0x0E50;
const NIKHAHIT: char = '\u{0E4D}';
const SARA_AA: char = '\u{0E32}';
const SARA_AM: char = '\u{0E33}';
const NO_BREAK_SPACE: char = '\u{00A0}';

/// Canonicalize raw OCR text: Thai digits become ASCII digits, a split
/// nikhahit + sara aa pair is recomposed into sara am, and non-breaking spaces
/// become plain spaces.
pub fn normalize_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '๐'..='๙' => {
                let digit = c as u32 - THAI_DIGIT_ZERO;
                out.push(char::from_digit(digit, 10).unwrap_or(c));
            }
            NIKHAHIT if chars.peek() == Some(&SARA_AA) => {
                chars.next();
                out.push(SARA_AM);
            }
            NO_BREAK_SPACE => out.push(' '),
            _ => out.push(c),
        }
    }
    out
}

/// Tone marks and above/below vowels that OCR drops or invents at random.
fn is_unstable_mark(c: char) -> bool {
    matches!(c, '\u{0E31}' | '\u{0E34}'..='\u{0E3A}' | '\u{0E47}'..='\u{0E4E}')
}

/// Thai consonants, vowels and digits (ก through ๙).
pub fn is_thai_letter_or_digit(c: char) -> bool {
    ('\u{0E01}'..='\u{0E59}').contains(&c)
}

fn is_match_char(c: char) -> bool {
    c.is_ascii_lowercase()
        || c.is_ascii_digit()
        || is_thai_letter_or_digit(c)
        || matches!(c, ':' | '/' | ' ')
}

/// Fold text for case- and diacritic-insensitive substring matching.
///
/// Lowercases, applies NFKD, strips unstable Thai marks, maps sara am to
/// sara aa, turns every run of characters outside latin/digit/Thai/`:`/`/`
/// into a single space, then collapses whitespace and trims.
pub fn normalize_for_match(value: &str) -> String {
    let folded: String = value
        .to_lowercase()
        .nfkd()
        .filter(|c| !is_unstable_mark(*c))
        .map(|c| if c == SARA_AM { SARA_AA } else { c })
        .map(|c| if is_match_char(c) { c } else { ' ' })
        .collect();

    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
