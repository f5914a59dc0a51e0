use serde::{Deserialize, Serialize};
use slipread_core::Baht;

/// Shown in place of a field that no pass could extract.
pub const MISSING_PLACEHOLDER: &str = "-";
/// Shown in the memo column when a slip could not be read at all.
pub const UNREADABLE_PLACEHOLDER: &str = "อ่านไม่สำเร็จ";

/// The two fields pulled from one slip.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlipFields {
    pub amount: Option<Baht>,
    /// Trimmed, non-empty, and already filtered against fee lines and UI noise.
    pub memo: Option<String>,
}

impl SlipFields {
    pub fn is_complete(&self) -> bool {
        self.amount.is_some() && self.memo.is_some()
    }

    /// Take each field from `later` only if this record does not have it yet.
    pub fn fill_missing(&mut self, later: SlipFields) {
        if self.amount.is_none() {
            self.amount = later.amount;
        }
        if self.memo.is_none() {
            self.memo = later.memo;
        }
    }
}

/// Per-image result handed back to the caller, one per input in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlipOutcome {
    Parsed(SlipFields),
    Failed { reason: String },
}

impl SlipOutcome {
    pub fn fields(&self) -> Option<&SlipFields> {
        match self {
            SlipOutcome::Parsed(fields) => Some(fields),
            SlipOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, SlipOutcome::Failed { .. })
    }

    pub fn amount_display(&self) -> String {
        self.fields()
            .and_then(|f| f.amount)
            .map(|a| a.to_string())
            .unwrap_or_else(|| MISSING_PLACEHOLDER.to_string())
    }

    pub fn memo_display(&self) -> String {
        match self {
            SlipOutcome::Parsed(f) => {
                f.memo.clone().unwrap_or_else(|| MISSING_PLACEHOLDER.to_string())
            }
            SlipOutcome::Failed { .. } => UNREADABLE_PLACEHOLDER.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn baht(s: &str) -> Baht {
        Baht::parse(s).unwrap()
    }

    #[test]
    fn fill_missing_never_overwrites() {
        let mut primary = SlipFields { amount: Some(baht("100")), memo: None };
        primary.fill_missing(SlipFields { amount: Some(baht("999")), memo: Some("rent".into()) });
        assert_eq!(primary.amount, Some(baht("100")));
        assert_eq!(primary.memo.as_deref(), Some("rent"));
        assert!(primary.is_complete());
    }

    #[test]
    fn fill_missing_keeps_gap_when_later_is_empty() {
        let mut fields = SlipFields::default();
        fields.fill_missing(SlipFields::default());
        assert_eq!(fields, SlipFields::default());
        assert!(!fields.is_complete());
    }

    #[test]
    fn display_placeholders() {
        let empty = SlipOutcome::Parsed(SlipFields::default());
        assert_eq!(empty.amount_display(), "-");
        assert_eq!(empty.memo_display(), "-");

        let failed = SlipOutcome::Failed { reason: "boom".into() };
        assert_eq!(failed.amount_display(), "-");
        assert_eq!(failed.memo_display(), "อ่านไม่สำเร็จ");
        assert!(failed.is_failed());
    }

    #[test]
    fn display_parsed_values() {
        let o = SlipOutcome::Parsed(SlipFields { amount: Some(baht("1250")), memo: Some("ค่าเช่า".into()) });
        assert_eq!(o.amount_display(), "1,250.00 บาท");
        assert_eq!(o.memo_display(), "ค่าเช่า");
    }

    #[test]
    fn outcome_serializes_with_status_tag() {
        let failed = SlipOutcome::Failed { reason: "bad image".into() };
        let json = serde_json::to_value(&failed).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["reason"], "bad image");

        let parsed = SlipOutcome::Parsed(SlipFields { amount: None, memo: Some("x".into()) });
        let json = serde_json::to_value(&parsed).unwrap();
        assert_eq!(json["status"], "parsed");
        assert_eq!(json["memo"], "x");
    }
}
