//! Export encoders for the joined record view.
//!
//! Two encodings: a spreadsheet-style CSV (every canonical column except
//! the internal `sessionId` key) and a delimited-text export (every
//! column, `sessionId` included). Both write through the canonical
//! [`Column`] projection, so exported text always matches what the search
//! clause sees.

use std::io::Write;

use insight_core::error::Result;
use insight_core::models::{Column, JoinedRecord};

/// Delimiter of the delimited-text export.
pub const DELIMITED_EXPORT_DELIMITER: u8 = b'\t';

/// Columns of the spreadsheet-style export: everything but the internal
/// `sessionId` key.
pub fn spreadsheet_columns() -> Vec<Column> {
    Column::ALL
        .iter()
        .copied()
        .filter(|c| *c != Column::SessionId)
        .collect()
}

/// Write the spreadsheet-style CSV export.
pub fn write_spreadsheet_csv<W: Write>(records: &[JoinedRecord], writer: W) -> Result<()> {
    write_with(records, &spreadsheet_columns(), b',', writer)
}

/// Write the delimited-text export (all columns, tab-separated).
pub fn write_delimited<W: Write>(records: &[JoinedRecord], writer: W) -> Result<()> {
    write_with(records, &Column::ALL, DELIMITED_EXPORT_DELIMITER, writer)
}

fn write_with<W: Write>(
    records: &[JoinedRecord],
    columns: &[Column],
    delimiter: u8,
    writer: W,
) -> Result<()> {
    let mut out = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    out.write_record(columns.iter().map(|c| c.header()))
        .map_err(csv_error)?;

    for record in records {
        out.write_record(columns.iter().map(|c| c.value(record)))
            .map_err(csv_error)?;
    }

    out.flush()?;
    Ok(())
}

fn csv_error(err: csv::Error) -> insight_core::error::InsightError {
    std::io::Error::other(err).into()
}

// ── Tests ─────────────────────────────────────────────────────────────────────
