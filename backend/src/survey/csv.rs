//! CSV export
//!
//! Every field is double-quoted with embedded quotes doubled. Rows are
//! separated by `\n` without a trailing newline.

use crate::survey::model::{SurveyRecord, ITEM_KEYS, SCORE_KEYS, TIMESTAMP_KEY};

/// Filename offered for the download
pub const EXPORT_FILENAME: &str = "anket_sonuclari.csv";

/// Content type of the export
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";

/// Export columns in declared order
pub fn columns() -> impl Iterator<Item = &'static str> {
    std::iter::once(TIMESTAMP_KEY)
        .chain(ITEM_KEYS)
        .chain(SCORE_KEYS)
}

/// Render the header row followed by one row per record
pub fn export(records: &[SurveyRecord]) -> String {
    let header = encode_row(columns().map(str::to_string));
    let rows = records.iter().map(|record| {
        encode_row(columns().map(|column| record.field(column).unwrap_or_default()))
    });
    std::iter::once(header).chain(rows).collect::<Vec<_>>().join("\n")
}

fn encode_row<I>(fields: I) -> String
where
    I: Iterator<Item = String>,
{
    fields.map(|f| quote(&f)).collect::<Vec<_>>().join(",")
}

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}
