use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Currency unit appended to every displayed amount.
pub const BAHT_SUFFIX: &str = "บาท";

/// A Thai baht amount, always held at two decimal places.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Baht(Decimal);

impl Baht {
    pub fn from_decimal(decimal: Decimal) -> Self {
        Baht(decimal.round_dp(2))
    }

    /// Parse an OCR number token such as `1,250.00` or `99`.
    ///
    /// Thousands separators are stripped first. Returns `None` for anything
    /// that is not a plain decimal number. A plain number too large to
    /// represent saturates at [`Decimal::MAX`], so the rule that found it
    /// still wins.
    pub fn parse(token: &str) -> Option<Self> {
        let clean = token.replace(',', "");
        let clean = clean.trim();
        if !is_plain_number(clean) {
            return None;
        }
        match Decimal::from_str(clean) {
            Ok(decimal) => Some(Self::from_decimal(decimal)),
            Err(_) if integer_digits(clean) >= MAX_INTEGER_DIGITS => Some(Baht(Decimal::MAX)),
            Err(_) => None,
        }
    }
}

/// Integer digits in [`Decimal::MAX`].
const MAX_INTEGER_DIGITS: usize = 29;

fn integer_digits(text: &str) -> usize {
    let int_part = text.split_once('.').map_or(text, |(int_part, _)| int_part);
    int_part.trim_start_matches('0').len()
}

/// Digits with at most one decimal point and at least one digit.
fn is_plain_number(text: &str) -> bool {
    let (int_part, frac_part) = text.split_once('.').unwrap_or((text, ""));
    !(int_part.is_empty() && frac_part.is_empty())
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

/// Thai locale grouping: `1,234,567.89 บาท`.
impl fmt::Display for Baht {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let plain = format!("{:.2}", self.0.abs());
        let (int_part, frac_part) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));

        let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
        for (i, ch) in int_part.chars().enumerate() {
            if i > 0 && (int_part.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        let sign = if self.0.is_sign_negative() && !self.0.is_zero() { "-" } else { "" };
        write!(f, "{sign}{grouped}.{frac_part} {BAHT_SUFFIX}")
    }
}
