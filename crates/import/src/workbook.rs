use std::path::Path;

use calamine::{open_workbook_auto, Data, Range, Reader};

use crate::sheet::SlipSheet;
use crate::SheetError;

/// Read the first worksheet of an `.xlsx` / `.xls` / `.xlsb` / `.ods` file.
/// The first row is the header row.
pub fn import_workbook(path: &Path) -> Result<SlipSheet, SheetError> {
    let mut workbook = open_workbook_auto(path)?;
    let range = workbook.worksheet_range_at(0).ok_or(SheetError::NoSheet)??;
    let sheet = sheet_from_range(&range);
    if sheet.is_empty() {
        return Err(SheetError::NoRows);
    }
    Ok(sheet)
}

pub fn sheet_from_range(range: &Range<Data>) -> SlipSheet {
    let mut rows = range.rows();
    let Some(header) = rows.next() else {
        return SlipSheet::new();
    };
    let headers: Vec<String> = header.iter().map(cell_text).collect();
    let records: Vec<Vec<String>> = rows.map(|row| row.iter().map(cell_text).collect()).collect();
    SlipSheet::from_records(&headers, records)
}

/// Cell contents as display text. Whole floats drop their fraction so a
/// numeric `500` does not come back as `500.0`.
fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.clone(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", *f as i64),
        Data::Float(f) => f.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => dt.to_string(),
        Data::DateTimeIso(s) | Data::DurationIso(s) => s.clone(),
        Data::Error(e) => format!("{e:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(cells: &[&[Data]]) -> Range<Data> {
        let rows = cells.len() as u32;
        let cols = cells.iter().map(|r| r.len()).max().unwrap_or(0) as u32;
        let mut range = Range::new((0, 0), (rows - 1, cols - 1));
        for (r, row) in cells.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                range.set_value((r as u32, c as u32), cell.clone());
            }
        }
        range
    }

    fn s(v: &str) -> Data {
        Data::String(v.to_owned())
    }

    #[test]
    fn numeric_cells_read_as_text() {
        assert_eq!(cell_text(&Data::Float(500.0)), "500");
        assert_eq!(cell_text(&Data::Float(1250.5)), "1250.5");
        assert_eq!(cell_text(&Data::Int(42)), "42");
        assert_eq!(cell_text(&Data::Empty), "");
    }

    #[test]
    fn first_row_is_header() {
        let r = range(&[
            &[s("ลำดับ"), s("จำนวนเงิน"), s("บันทึกช่วยจำ")],
            &[Data::Int(1), Data::Float(1250.0), s("ค่าเช่า")],
            &[Data::Int(2), Data::Empty, Data::Empty],
            &[Data::Int(3), Data::Empty, s("มัดจำ")],
        ]);
        let sheet = sheet_from_range(&r);
        assert_eq!(sheet.len(), 2);
        assert_eq!(sheet.rows()[0].amount, "1250");
        assert_eq!(sheet.rows()[1].order, 2);
        assert_eq!(sheet.rows()[1].amount, "-");
        assert_eq!(sheet.rows()[1].memo, "มัดจำ");
    }

    #[test]
    fn empty_range_is_empty_sheet() {
        assert!(sheet_from_range(&Range::<Data>::empty()).is_empty());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.xlsx");
        std::fs::write(&path, b"not a zip").unwrap();
        assert!(matches!(import_workbook(&path), Err(SheetError::Workbook(_))));
    }
}
