use slipread_core::normalize_for_match;

/// Header spellings accepted for the amount column.
pub const AMOUNT_ALIASES: &[&str] = &["จำนวนเงิน", "amount"];
/// Header spellings accepted for the memo column.
pub const MEMO_ALIASES: &[&str] = &["บันทึกช่วยจำ", "memo", "note"];

/// Fold a header for alias comparison: match-normalized with `:`, `/` and
/// spaces removed.
pub fn normalize_header_key(value: &str) -> String {
    normalize_for_match(value).chars().filter(|c| !matches!(c, ':' | '/' | ' ')).collect()
}

/// Which imported column holds which field. `None` means the sheet has no
/// such column and every row gets an empty value for it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    pub amount: Option<usize>,
    pub memo: Option<usize>,
}

impl ColumnMap {
    /// Pick the first header, in column order, that equals or contains an alias.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let keys: Vec<String> = headers.iter().map(|h| normalize_header_key(h.as_ref())).collect();
        Self { amount: find_column(&keys, AMOUNT_ALIASES), memo: find_column(&keys, MEMO_ALIASES) }
    }

    pub fn is_empty(&self) -> bool {
        self.amount.is_none() && self.memo.is_none()
    }
}

fn find_column(keys: &[String], aliases: &[&str]) -> Option<usize> {
    let aliases: Vec<String> = aliases.iter().map(|a| normalize_header_key(a)).collect();
    keys.iter().position(|key| {
        !key.is_empty() && aliases.iter().any(|alias| key == alias || key.contains(alias.as_str()))
    })
}
