use std::sync::OnceLock;

use regex::Regex;
use slipread_core::{is_thai_letter_or_digit, normalize_for_match};

use crate::calendar::correct_calendar_tokens;
use crate::hints::HintSet;

macro_rules! re {
    ($name:ident, $pat:expr) => {
        fn $name() -> &'static Regex {
            static R: OnceLock<Regex> = OnceLock::new();
            R.get_or_init(|| Regex::new($pat).expect("invalid regex"))
        }
    };
}

re!(re_whitespace, r"\s+");
re!(re_leading_separators, r"^[:：\-\s]+");
re!(re_dash_dot_only, r"^[-.]+$");
re!(re_space_before_punct, r"\s+([,./])");
re!(re_space_after_slash, r"/\s+");
re!(re_thai_gap, r"([\u{0E00}-\u{0E7F}])\s+([\u{0E00}-\u{0E7F}])");

re!(re_after_colon, r"[:：]\s*(.+)$");
re!(re_leading_label, r"^[^:：\s]+\s*");

re!(re_bare_amount, r"(?i)^[0-9]+(?:\.[0-9]{1,2})?(?:\s*(?:บาท|baht))?$");
re!(re_clock_time, r"^(?:[01]?[0-9]|2[0-3])[:.][0-5][0-9](?:\s*น\.?)?$");
re!(re_minutes_only, r"^[0-5]?[0-9]\s*น\.?$");
re!(re_embedded_time, r"(?:^|\s)(?:[01]?[0-9]|2[0-3])[:.][0-5][0-9](?:\s*น\.?)?(?:$|\s)");
re!(re_slash_date, r"[0-9]+/[0-9]+");

const UI_NOISE_TOKENS: [&str; 4] = ["ik+", "k+", "kplus", "verified"];

/// Drop zero-width spaces and the gaps OCR puts around punctuation and between
/// Thai characters.
pub fn repair_thai_spacing(value: &str) -> String {
    if value.is_empty() {
        return String::new();
    }

    let out = value.replace('\u{200B}', "");
    let out = re_space_before_punct().replace_all(&out, "$1");
    let mut out = re_space_after_slash().replace_all(&out, "/").into_owned();

    // Matches can't overlap, so `ก ข ค` needs a second round.
    loop {
        let next = re_thai_gap().replace_all(&out, "$1$2").into_owned();
        if next == out {
            break;
        }
        out = next;
    }

    out.trim().to_string()
}

/// Normalize a candidate line for use as a memo. `None` when nothing useful
/// remains.
pub fn clean_memo(value: &str) -> Option<String> {
    let collapsed = re_whitespace().replace_all(value, " ");
    let stripped = re_leading_separators().replace(collapsed.trim(), "");
    let spaced = repair_thai_spacing(&stripped);
    let memo = correct_calendar_tokens(&spaced);

    if memo.is_empty() || re_dash_dot_only().is_match(&memo) {
        return None;
    }
    Some(memo)
}

pub fn looks_like_amount(text: &str) -> bool {
    let value = text.replace(',', "");
    re_bare_amount().is_match(value.trim())
}

/// `14:32`, `09.15 น.`, `45 น.`, or a clock time standing as its own word.
pub fn looks_like_time_fragment(text: &str) -> bool {
    let value = repair_thai_spacing(&text.to_lowercase());
    if value.is_empty() {
        return false;
    }
    re_clock_time().is_match(&value)
        || re_minutes_only().is_match(&value)
        || re_embedded_time().is_match(&value)
}

/// Banking-app chrome such as the K PLUS logo or "verified" badges.
pub fn looks_like_ui_noise(text: &str) -> bool {
    let compact: String = text.to_lowercase().chars().filter(|c| !c.is_whitespace()).collect();
    if compact.is_empty() {
        return false;
    }
    UI_NOISE_TOKENS.iter().any(|t| compact.contains(t))
}

/// Shared rejection filter for every memo candidate.
fn passes_filter(candidate: &str, hints: &HintSet) -> bool {
    !hints.is_blocked(&normalize_for_match(candidate))
        && !looks_like_amount(candidate)
        && !looks_like_time_fragment(candidate)
        && !looks_like_ui_noise(candidate)
}

/// Shape test for unlabelled lines: a month word with a digit, or a
/// `d/m` style fragment next to letters.
fn is_likely_memo_content(cleaned: &str, normalized: &str, hints: &HintSet) -> bool {
    if !passes_filter(cleaned, hints) {
        return false;
    }

    let has_digits = cleaned.chars().any(|c| c.is_ascii_digit());
    let has_thai = cleaned.chars().any(is_thai_letter_or_digit);
    let has_latin = cleaned.chars().any(|c| c.is_ascii_alphabetic());
    let has_slash_date = re_slash_date().is_match(cleaned);
    let has_month = normalized.contains("เดอน") || normalized.contains("month");

    (has_month && has_digits) || (has_slash_date && has_digits && (has_thai || has_latin))
}

/// Ways of reading a memo off a labelled line, tried in [`MemoStrategy::ORDER`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoStrategy {
    /// `บันทึกช่วยจำ: ค่าเช่า`
    AfterColon,
    /// `Memo ค่าเช่า` with the label word dropped.
    CompactTail,
    /// Label alone on its line, memo below it.
    NextLine,
}

impl MemoStrategy {
    pub const ORDER: [MemoStrategy; 3] =
        [MemoStrategy::AfterColon, MemoStrategy::CompactTail, MemoStrategy::NextLine];

    /// Raw candidate for this strategy. `label_line` is already cleaned.
    fn candidate(self, label_line: &str, next_line: &str) -> Option<String> {
        match self {
            MemoStrategy::AfterColon => {
                let c = re_after_colon().captures(label_line)?;
                clean_memo(c.get(1)?.as_str())
            }
            MemoStrategy::CompactTail => {
                let tail = clean_memo(&re_leading_label().replace(label_line, ""))?;
                (tail != label_line).then_some(tail)
            }
            MemoStrategy::NextLine => clean_memo(next_line),
        }
    }
}

fn memo_around_label(line: &str, next_line: &str, hints: &HintSet) -> Option<String> {
    let label_line = clean_memo(line)?;
    if !hints.has_label(&normalize_for_match(&label_line)) {
        return None;
    }

    MemoStrategy::ORDER
        .iter()
        .filter_map(|s| s.candidate(&label_line, next_line))
        .find(|c| passes_filter(c, hints))
}

/// Find the memo in a slip's lines.
///
/// Labelled lines are searched top to bottom first. Without a usable label the
/// lines are scanned bottom up for something shaped like a memo, since the
/// human-written note usually sits below the printed transfer details.
pub fn extract_memo(lines: &[String]) -> Option<String> {
    let hints = HintSet::shared();

    let labelled = lines.iter().enumerate().find_map(|(i, line)| {
        let next = lines.get(i + 1).map(String::as_str).unwrap_or("");
        memo_around_label(line, next, hints)
    });
    if labelled.is_some() {
        return labelled;
    }

    lines.iter().rev().find_map(|line| {
        let cleaned = clean_memo(line)?;
        let normalized = normalize_for_match(&cleaned);
        is_likely_memo_content(&cleaned, &normalized, hints).then_some(cleaned)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from).collect()
    }

    #[test]
    fn label_with_colon() {
        assert_eq!(extract_memo(&lines("บันทึกช่วยจำ: ซื้อของออนไลน์")).as_deref(), Some("ซื้อของออนไลน์"));
    }

    #[test]
    fn label_with_full_width_colon() {
        assert_eq!(extract_memo(&lines("Memo： lunch with team")).as_deref(), Some("lunch with team"));
    }

    #[test]
    fn label_compact_tail() {
        assert_eq!(extract_memo(&lines("Memo lunch 12/3")).as_deref(), Some("lunch 12/3"));
    }

    #[test]
    fn label_then_next_line() {
        let text = "โอนเงินสำเร็จ\nบันทึกช่วยจำ\nค่าเช่าห้อง\n10:42";
        assert_eq!(extract_memo(&lines(text)).as_deref(), Some("ค่าเช่าห้อง"));
    }

    #[test]
    fn garbled_label_still_anchors() {
        let text = "บนทกชวยจา\nค่าน้ำประปา";
        assert_eq!(extract_memo(&lines(text)).as_deref(), Some("ค่าน้ำประปา"));
    }

    #[test]
    fn blocklisted_next_line_is_rejected() {
        let text = "บันทึกช่วยจำ\nค่าธรรมเนียม 0.00";
        assert_eq!(extract_memo(&lines(text)), None);
    }

    #[test]
    fn amount_after_label_is_rejected() {
        assert_eq!(extract_memo(&lines("Note: 500 บาท")), None);
        assert_eq!(extract_memo(&lines("memo\n1250.00")), None);
    }

    #[test]
    fn time_after_label_is_rejected() {
        assert_eq!(extract_memo(&lines("หมายเหตุ: 14:32 น.")), None);
        assert_eq!(extract_memo(&lines("หมายเหตุ\n09.15")), None);
    }

    #[test]
    fn first_label_wins() {
        let text = "memo: first\nnote: second";
        assert_eq!(extract_memo(&lines(text)).as_deref(), Some("first"));
    }

    #[test]
    fn fallback_month_line_from_bottom() {
        let text = "ธนาคารกสิกรไทย\nค่าไฟเดือน 3\n12:30";
        assert_eq!(extract_memo(&lines(text)).as_deref(), Some("ค่าไฟเดือน 3"));
    }

    #[test]
    fn fallback_slash_date_with_letters() {
        let text = "rent 01/02\nจ่ายค่าเช่า 15/2";
        assert_eq!(extract_memo(&lines(text)).as_deref(), Some("จ่ายค่าเช่า 15/2"));
    }

    #[test]
    fn fallback_skips_plain_free_text() {
        // No month word and no d/m fragment, so nothing qualifies.
        assert_eq!(extract_memo(&lines("ซื้อของออนไลน์\n1,250.00")), None);
    }

    #[test]
    fn fallback_skips_ui_noise() {
        assert_eq!(extract_memo(&lines("K+ 12/02/68")), None);
        assert_eq!(extract_memo(&lines("verified 1/2 slip")), None);
    }

    #[test]
    fn empty_lines_yield_nothing() {
        assert_eq!(extract_memo(&[]), None);
        assert_eq!(extract_memo(&["   ".to_string()]), None);
    }

    #[test]
    fn clean_memo_strips_and_rejects() {
        assert_eq!(clean_memo("  :- ค่าอาหาร  ").as_deref(), Some("ค่าอาหาร"));
        assert_eq!(clean_memo("---"), None);
        assert_eq!(clean_memo(" . . "), None);
        assert_eq!(clean_memo(""), None);
    }

    #[test]
    fn spacing_repair() {
        assert_eq!(repair_thai_spacing("ค่า อา หาร"), "ค่าอาหาร");
        assert_eq!(repair_thai_spacing("12 / 3"), "12/3");
        assert_eq!(repair_thai_spacing("a\u{200B}b ,c"), "ab,c");
    }

    #[test]
    fn time_fragments() {
        assert!(looks_like_time_fragment("14:32 น."));
        assert!(looks_like_time_fragment("09.15"));
        assert!(looks_like_time_fragment("45 น."));
        assert!(looks_like_time_fragment("paid at 23:59 today"));
        assert!(!looks_like_time_fragment("24:00"));
        assert!(!looks_like_time_fragment("room 12/3"));
        assert!(!looks_like_time_fragment(""));
    }

    #[test]
    fn amount_shapes() {
        assert!(looks_like_amount("1,250.00"));
        assert!(looks_like_amount("99 บาท"));
        assert!(looks_like_amount("5 BAHT"));
        assert!(!looks_like_amount("99 apples"));
        assert!(!looks_like_amount("1.234"));
    }

    #[test]
    fn ui_noise() {
        assert!(looks_like_ui_noise("K PLUS"));
        assert!(looks_like_ui_noise("iK+"));
        assert!(looks_like_ui_noise("Verified"));
        assert!(!looks_like_ui_noise("ค่าเช่า"));
        assert!(!looks_like_ui_noise("  "));
    }
}
