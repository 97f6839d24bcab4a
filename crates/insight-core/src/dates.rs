//! Date coercion for batch documents.
//!
//! Batch exports carry calendar dates as `DD/MM/YYYY` strings. Parsing is
//! deliberately lossy: anything that does not match the batch format yields
//! `None` rather than an error, so one bad record never aborts an
//! extraction pass.

use chrono::NaiveDate;

/// Format used by batch export files.
pub const BATCH_DATE_FORMAT: &str = "%d/%m/%Y";

/// Format used by the canonical column projection (search, display, export).
pub const CANONICAL_DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `DD/MM/YYYY` batch date, coercing failures to `None`.
pub fn parse_batch_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), BATCH_DATE_FORMAT).ok()
}

/// Project an optional date into its canonical string form.
///
/// `None` projects as the empty string so that the search clause and the
/// export encoders agree on what a missing date looks like.
pub fn format_canonical(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format(CANONICAL_DATE_FORMAT).to_string())
        .unwrap_or_default()
}
