use serde::{Deserialize, Serialize};

use crate::columns::ColumnMap;

/// Shown for a field an imported row leaves blank.
pub const EMPTY_CELL: &str = "-";

/// One numbered row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetRow {
    pub order: usize,
    pub amount: String,
    pub memo: String,
}

/// The results table: imported rows first, then rows read from slips, all
/// numbered consecutively from 1.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlipSheet {
    rows: Vec<SheetRow>,
}

impl SlipSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(&self) -> &[SheetRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn next_order(&self) -> usize {
        self.rows.len() + 1
    }

    /// Append a row numbered after everything already in the sheet.
    pub fn push(&mut self, amount: impl Into<String>, memo: impl Into<String>) -> &SheetRow {
        let order = self.next_order();
        self.rows.push(SheetRow { order, amount: amount.into(), memo: memo.into() });
        &self.rows[order - 1]
    }

    /// Append another sheet's rows, renumbering them to follow this one.
    pub fn append(&mut self, other: SlipSheet) {
        for row in other.rows {
            self.push(row.amount, row.memo);
        }
    }

    /// Drop the rows with the given order numbers and renumber the rest.
    /// Returns how many rows were removed.
    pub fn remove_orders(&mut self, orders: &[usize]) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !orders.contains(&row.order));
        for (i, row) in self.rows.iter_mut().enumerate() {
            row.order = i + 1;
        }
        before - self.rows.len()
    }

    /// Build a sheet from a header row and data records, keeping only rows
    /// with an amount or a memo.
    pub fn from_records<H, I, R>(headers: &[H], records: I) -> Self
    where
        H: AsRef<str>,
        I: IntoIterator<Item = R>,
        R: AsRef<[String]>,
    {
        let map = ColumnMap::resolve(headers);
        let mut sheet = Self::new();
        if map.is_empty() {
            return sheet;
        }

        for record in records {
            let record = record.as_ref();
            let cell = |col: Option<usize>| {
                col.and_then(|c| record.get(c)).map(|v| v.trim()).unwrap_or("")
            };
            let (amount, memo) = (cell(map.amount), cell(map.memo));
            if amount.is_empty() && memo.is_empty() {
                continue;
            }
            sheet.push(or_placeholder(amount), or_placeholder(memo));
        }
        sheet
    }
}

fn or_placeholder(value: &str) -> String {
    if value.is_empty() { EMPTY_CELL.to_string() } else { value.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn rows_are_numbered_in_order() {
        let mut sheet = SlipSheet::new();
        assert_eq!(sheet.push("100.00 บาท", "a").order, 1);
        assert_eq!(sheet.push("200.00 บาท", "b").order, 2);
        assert_eq!(sheet.next_order(), 3);
    }

    #[test]
    fn records_map_through_aliases() {
        let headers = ["ลำดับ", "จำนวนเงิน", "บันทึกช่วยจำ"];
        let sheet = SlipSheet::from_records(
            &headers,
            vec![rec(&["7", " 1,250.00 บาท ", "ค่าเช่า"]), rec(&["8", "", "มัดจำ"])],
        );
        assert_eq!(
            sheet.rows(),
            &[
                SheetRow { order: 1, amount: "1,250.00 บาท".into(), memo: "ค่าเช่า".into() },
                SheetRow { order: 2, amount: "-".into(), memo: "มัดจำ".into() },
            ]
        );
    }

    #[test]
    fn blank_rows_and_short_records_are_handled() {
        let sheet = SlipSheet::from_records(
            &["amount", "memo"],
            vec![rec(&["", "  "]), rec(&["50"]), rec(&[])],
        );
        assert_eq!(sheet.len(), 1);
        assert_eq!(sheet.rows()[0].memo, "-");
    }

    #[test]
    fn unknown_headers_import_nothing() {
        let sheet = SlipSheet::from_records(&["date", "ref"], vec![rec(&["2025-01-01", "x"])]);
        assert!(sheet.is_empty());
    }

    #[test]
    fn appended_rows_follow_existing_ones() {
        let mut imported = SlipSheet::new();
        imported.push("1", "a");
        imported.push("2", "b");
        let mut scanned = SlipSheet::new();
        scanned.push("3", "c");

        imported.append(scanned);
        let orders: Vec<usize> = imported.rows().iter().map(|r| r.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(imported.rows()[2].memo, "c");
    }

    #[test]
    fn removing_rows_renumbers() {
        let mut sheet = SlipSheet::new();
        for memo in ["a", "b", "c", "d"] {
            sheet.push("-", memo);
        }
        assert_eq!(sheet.remove_orders(&[2, 4, 9]), 2);
        let left: Vec<(usize, &str)> = sheet.rows().iter().map(|r| (r.order, r.memo.as_str())).collect();
        assert_eq!(left, vec![(1, "a"), (2, "c")]);
    }
}
