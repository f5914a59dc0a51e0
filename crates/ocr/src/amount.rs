use std::sync::OnceLock;

use regex::Regex;
use slipread_core::Baht;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_keyword,
    r"(?i)(?:จำนวนเงิน|จำนวน|จํานวน|ยอดโอน|amount|total)\s*[:\-]?\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)");
re!(re_currency_word,
    r"(?i)([0-9][0-9,]*(?:\.[0-9]{1,2})?)\s*(?:บาท|baht)");
re!(re_currency_symbol,
    r"฿\s*([0-9][0-9,]*(?:\.[0-9]{1,2})?)");
// ASCII word boundaries: a Thai letter right before the digits still counts
// as a boundary.
re!(re_two_decimal,
    r"(?-u:\b)([0-9][0-9,]*\.[0-9]{2})(?-u:\b)");

/// Anchored amount patterns, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRule {
    /// `จำนวนเงิน 1,250.00`, `Amount: 99`
    Keyword,
    /// `1,250.00 บาท`
    CurrencyWord,
    /// `฿ 1,250.00`
    CurrencySymbol,
}

impl AmountRule {
    pub const ORDER: [AmountRule; 3] =
        [AmountRule::Keyword, AmountRule::CurrencyWord, AmountRule::CurrencySymbol];

    fn regex(self) -> &'static Regex {
        match self {
            AmountRule::Keyword => re_keyword(),
            AmountRule::CurrencyWord => re_currency_word(),
            AmountRule::CurrencySymbol => re_currency_symbol(),
        }
    }

    /// The first match of this rule, if it parses.
    pub fn find(self, text: &str) -> Option<Baht> {
        let c = self.regex().captures(text)?;
        Baht::parse(c.get(1)?.as_str())
    }
}

/// Extract the transferred amount from a whole normalized OCR blob.
///
/// Anchored rules win in [`AmountRule::ORDER`]. Without an anchor the largest
/// number printed with exactly two decimals is taken, since fees and balances
/// on a slip are normally smaller than the transfer itself.
pub fn extract_amount(text: &str) -> Option<Baht> {
    AmountRule::ORDER
        .iter()
        .find_map(|rule| rule.find(text))
        .or_else(|| largest_two_decimal(text))
}

fn largest_two_decimal(text: &str) -> Option<Baht> {
    re_two_decimal()
        .captures_iter(text)
        .filter_map(|c| Baht::parse(c.get(1)?.as_str()))
        .max()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(text: &str) -> Option<String> {
        extract_amount(text).map(|a| a.to_string())
    }

    #[test]
    fn keyword_beats_larger_number() {
        assert_eq!(
            shown("จำนวนเงิน 1,250.00 บาท ค่าธรรมเนียม 9,999.00").as_deref(),
            Some("1,250.00 บาท")
        );
    }

    #[test]
    fn keyword_with_separator() {
        assert_eq!(shown("Amount: 500").as_deref(), Some("500.00 บาท"));
        assert_eq!(shown("TOTAL - 12.5").as_deref(), Some("12.50 บาท"));
        assert_eq!(shown("ยอดโอน 3,000").as_deref(), Some("3,000.00 บาท"));
    }

    #[test]
    fn currency_word_when_no_keyword() {
        assert_eq!(shown("โอนให้ร้าน\n45.50 บาท\n12.00").as_deref(), Some("45.50 บาท"));
        assert_eq!(shown("paid 80 Baht").as_deref(), Some("80.00 บาท"));
    }

    #[test]
    fn currency_symbol_is_last_anchor() {
        assert_eq!(shown("฿ 2,100.00\n5,000.00").as_deref(), Some("2,100.00 บาท"));
    }

    #[test]
    fn rule_order_is_fixed() {
        let text = "฿ 10.00 then 20.00 บาท then amount 30.00";
        assert_eq!(AmountRule::Keyword.find(text).map(|a| a.to_string()).as_deref(), Some("30.00 บาท"));
        assert_eq!(shown(text).as_deref(), Some("30.00 บาท"));
    }

    #[test]
    fn fallback_takes_maximum() {
        assert_eq!(shown("10.50 20.75 99.00").as_deref(), Some("99.00 บาท"));
    }

    #[test]
    fn fallback_ignores_wrong_precision() {
        assert_eq!(shown("ref 1234.567 and 8.5"), None);
        assert_eq!(shown("ref 1234.567 and 8.50").as_deref(), Some("8.50 บาท"));
    }

    #[test]
    fn fallback_accepts_thai_neighbours() {
        assert_eq!(shown("ยอด99.00รวม").as_deref(), Some("99.00 บาท"));
    }

    #[test]
    fn oversized_keyword_amount_still_wins() {
        let text = "amount 12345678901234567890123456789012\n10.50 บาท";
        assert_eq!(AmountRule::Keyword.find(text), Baht::parse("99999999999999999999999999999999"));
        assert_ne!(shown(text).as_deref(), Some("10.50 บาท"));
    }

    #[test]
    fn nothing_found_is_none() {
        assert_eq!(shown(""), None);
        assert_eq!(shown("   \n  "), None);
        assert_eq!(shown("no numbers here"), None);
    }
}
