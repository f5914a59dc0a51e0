use std::io::{Read, Write};

use crate::sheet::{SheetRow, SlipSheet};
use crate::SheetError;

/// Header row written on export.
pub const EXPORT_HEADERS: [&str; 3] = ["ลำดับ", "จำนวนเงิน", "บันทึกช่วยจำ"];

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

pub struct CsvImporter;

impl CsvImporter {
    pub fn parse<R: Read>(reader: &mut csv::Reader<R>) -> Result<SlipSheet, SheetError> {
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim_start_matches('\u{FEFF}').to_string())
            .collect();

        let mut records = Vec::new();
        for result in reader.records() {
            let record = result?;
            if record.is_empty() {
                continue;
            }
            records.push(record.iter().map(str::to_string).collect::<Vec<_>>());
        }

        let sheet = SlipSheet::from_records(&headers, records);
        if sheet.is_empty() {
            return Err(SheetError::NoRows);
        }
        Ok(sheet)
    }
}

/// Read a headed CSV file into a numbered sheet.
pub fn import_csv<R: Read>(data: R) -> Result<SlipSheet, SheetError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(data);
    CsvImporter::parse(&mut reader)
}

/// Write rows as CSV with a UTF-8 BOM so spreadsheet apps pick up the Thai text.
pub fn export_csv<W: Write>(mut out: W, rows: &[SheetRow]) -> Result<(), SheetError> {
    out.write_all(UTF8_BOM)?;
    let mut writer = csv::Writer::from_writer(out);
    writer.write_record(EXPORT_HEADERS)?;
    for row in rows {
        let order = row.order.to_string();
        writer.write_record([order.as_str(), row.amount.as_str(), row.memo.as_str()])?;
    }
    writer.flush()?;
    Ok(())
}
