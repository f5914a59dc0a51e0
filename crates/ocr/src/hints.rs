use std::sync::OnceLock;

use slipread_core::normalize_for_match;

/// Phrases announcing that the memo follows, including common OCR garbles of
/// `บันทึกช่วยจำ` with the vowels and tone marks lost.
pub const MEMO_LABEL_HINTS: &[&str] = &[
    "บันทึกช่วยจำ",
    "ช่วยจำ",
    "หมายเหตุ",
    "memo",
    "note",
    "บนทกชวยจา",
    "บนทกชวยจำ",
    "บนทกชวยจํา",
];

/// Fee lines, reference numbers and banners that are never memo text.
pub const MEMO_BLOCKLIST_HINTS: &[&str] = &[
    "จำนวน",
    "ค่าธรรมเนียม",
    "เลขที่รายการ",
    "สแกนตรวจสอบสลิป",
    "โอนเงินสำเร็จ",
    "verified by",
];

/// Label and blocklist hints, folded once with [`normalize_for_match`].
#[derive(Debug)]
pub struct HintSet {
    labels: Vec<String>,
    blocklist: Vec<String>,
}

impl HintSet {
    fn build() -> Self {
        let fold = |hints: &[&str]| -> Vec<String> {
            hints
                .iter()
                .map(|h| normalize_for_match(h))
                .filter(|h| !h.is_empty())
                .collect()
        };
        Self { labels: fold(MEMO_LABEL_HINTS), blocklist: fold(MEMO_BLOCKLIST_HINTS) }
    }

    /// The process-wide hint set, built on first use.
    pub fn shared() -> &'static HintSet {
        static HINTS: OnceLock<HintSet> = OnceLock::new();
        HINTS.get_or_init(Self::build)
    }

    /// `normalized` must already be match-normalized.
    pub fn has_label(&self, normalized: &str) -> bool {
        self.labels.iter().any(|h| normalized.contains(h.as_str()))
    }

    /// `normalized` must already be match-normalized.
    pub fn is_blocked(&self, normalized: &str) -> bool {
        self.blocklist.iter().any(|h| normalized.contains(h.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn garbled_labels_collapse_to_one_form() {
        let hints = HintSet::shared();
        for raw in ["บันทึกช่วยจำ", "บนทกชวยจำ", "บนทกชวยจํา", "บันทึกช่วยจํา"] {
            assert!(hints.has_label(&normalize_for_match(raw)), "{raw}");
        }
    }

    #[test]
    fn english_labels_are_case_insensitive() {
        let hints = HintSet::shared();
        assert!(hints.has_label(&normalize_for_match("MEMO: lunch")));
        assert!(hints.has_label(&normalize_for_match("Note")));
        assert!(!hints.has_label(&normalize_for_match("total 100.00")));
    }

    #[test]
    fn blocklist_matches_inside_longer_lines() {
        let hints = HintSet::shared();
        assert!(hints.is_blocked(&normalize_for_match("ค่าธรรมเนียม 0.00")));
        assert!(hints.is_blocked(&normalize_for_match("Verified by K PLUS")));
        assert!(hints.is_blocked(&normalize_for_match("จำนวนเงิน")));
        assert!(!hints.is_blocked(&normalize_for_match("ซื้อของออนไลน์")));
    }

    #[test]
    fn empty_text_matches_nothing() {
        let hints = HintSet::shared();
        assert!(!hints.has_label(""));
        assert!(!hints.is_blocked(""));
    }
}
