use chrono::NaiveDateTime;

use crate::csv::EXPORT_HEADERS;
use crate::sheet::SheetRow;

/// Minimum widths, in display columns, of order / amount / memo.
pub const COLUMN_WIDTHS: [usize; 3] = [10, 18, 48];

/// `slip-results-YYYYMMDD-HHMMSS.csv`
pub fn default_export_name(now: NaiveDateTime) -> String {
    format!("slip-results-{}.csv", now.format("%Y%m%d-%H%M%S"))
}

/// Thai vowel and tone marks that stack on the previous character and take no
/// column of their own.
fn is_zero_width(c: char) -> bool {
    matches!(c, '\u{0E31}' | '\u{0E34}'..='\u{0E3A}' | '\u{0E47}'..='\u{0E4E}' | '\u{200B}')
}

pub fn display_width(text: &str) -> usize {
    text.chars().filter(|c| !is_zero_width(*c)).count()
}

fn pad(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(display_width(text));
    format!("{text}{}", " ".repeat(fill))
}

fn push_line(out: &mut String, cells: [&str; 3]) {
    let padded: Vec<String> = cells.iter().zip(COLUMN_WIDTHS).map(|(c, w)| pad(c, w)).collect();
    out.push_str(padded.join(" ").trim_end());
    out.push('\n');
}

/// Render rows as a plain-text table for the terminal.
pub fn render_table(rows: &[SheetRow]) -> String {
    let mut out = String::new();
    push_line(&mut out, EXPORT_HEADERS);
    let rule: Vec<String> = COLUMN_WIDTHS.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join(" "));
    out.push('\n');
    for row in rows {
        let order = row.order.to_string();
        push_line(&mut out, [order.as_str(), row.amount.as_str(), row.memo.as_str()]);
    }
    out
}
