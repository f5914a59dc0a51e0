pub mod columns;
pub mod csv;
pub mod sheet;
pub mod table;
pub mod workbook;

use std::path::Path;

use thiserror::Error;

pub use columns::{normalize_header_key, ColumnMap, AMOUNT_ALIASES, MEMO_ALIASES};
pub use csv::{export_csv, import_csv, EXPORT_HEADERS};
pub use sheet::{SheetRow, SlipSheet, EMPTY_CELL};
pub use table::{default_export_name, render_table, COLUMN_WIDTHS};
pub use workbook::import_workbook;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] ::csv::Error),
    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),
    #[error("Workbook has no sheets")]
    NoSheet,
    #[error("No rows with an amount or memo column")]
    NoRows,
    #[error("Unsupported sheet format: {0}")]
    UnsupportedFormat(String),
}

/// Import a results sheet, choosing the reader by file extension.
pub fn import_sheet(path: &Path) -> Result<SlipSheet, SheetError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();
    match ext.as_str() {
        "csv" => import_csv(std::fs::File::open(path)?),
        "xlsx" | "xlsm" | "xls" | "xlsb" | "ods" => import_workbook(path),
        other => Err(SheetError::UnsupportedFormat(other.to_string())),
    }
}
