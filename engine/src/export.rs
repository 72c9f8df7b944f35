//! Export of the filtered view as CSV or JSON.
//!
//! Export covers every row that passes search and filters, in sort order,
//! regardless of the current page. Writing the payload to a file is the
//! caller's job.

use crate::{error::Result, value, FieldDescriptor, Record};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// File extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Json => "json",
        }
    }

    /// MIME type of the payload.
    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv;charset=utf-8",
            ExportFormat::Json => "application/json",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(crate::Error::UnsupportedFormat(other.to_string())),
        }
    }
}

/// A serialized view, ready for a download collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportPayload {
    pub content: String,
    pub filename: String,
    pub mime_type: String,
}

/// Serialize rows in the given format.
///
/// The filename is `stem.ext`, or `stem_YYYY-MM-DD.ext` when a date is given.
pub fn export(
    stem: &str,
    format: ExportFormat,
    fields: &[FieldDescriptor],
    rows: &[&Record],
    date: Option<NaiveDate>,
) -> Result<ExportPayload> {
    let content = match format {
        ExportFormat::Csv => to_csv(fields, rows),
        ExportFormat::Json => to_json(rows)?,
    };

    let filename = match date {
        Some(date) => format!("{}_{}.{}", stem, date.format("%Y-%m-%d"), format.extension()),
        None => format!("{}.{}", stem, format.extension()),
    };

    Ok(ExportPayload {
        content,
        filename,
        mime_type: format.mime_type().to_string(),
    })
}

/// Render rows as CSV.
///
/// The header row holds field labels; columns follow descriptor order.
/// Lines are separated by `\n`.
pub fn to_csv(fields: &[FieldDescriptor], rows: &[&Record]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    lines.push(
        fields
            .iter()
            .map(|f| csv_cell(&f.label))
            .collect::<Vec<_>>()
            .join(","),
    );

    for row in rows {
        let cells: Vec<String> = fields
            .iter()
            .map(|f| {
                let value = row.get(&f.name);
                csv_cell(&value::display(value.as_deref()))
            })
            .collect();
        lines.push(cells.join(","));
    }

    lines.join("\n")
}

/// Quote a cell only when it would otherwise break the row.
fn csv_cell(text: &str) -> String {
    if text.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text.to_string()
    }
}

/// Render rows as a pretty-printed JSON array.
pub fn to_json(rows: &[&Record]) -> Result<String> {
    Ok(serde_json::to_string_pretty(rows)?)
}
