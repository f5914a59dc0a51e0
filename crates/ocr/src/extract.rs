use slipread_core::normalize_text;

use crate::amount::extract_amount;
use crate::memo::extract_memo;
use crate::types::SlipFields;

/// Split normalized text into trimmed, non-empty lines in reading order.
pub fn split_lines(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.replace('\u{00A0}', " ").trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

pub struct Extractor;

impl Extractor {
    /// Extract amount and memo from the raw text of one OCR pass.
    ///
    /// The amount is searched across the whole blob because a label and its
    /// value are sometimes read onto different lines; the memo is line-based.
    pub fn parse(raw_text: &str) -> SlipFields {
        let text = normalize_text(raw_text);
        let lines = split_lines(&text);

        SlipFields { amount: extract_amount(&text), memo: extract_memo(&lines) }
    }
}
