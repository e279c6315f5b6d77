//! Delimited output. Quotes only the cells that need it.

use crate::core::{ExtractionResult, Field, TickerRecord, YsError};
use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Read, Write};
use std::mem::take;
use std::path::Path;
use tracing::debug;

/// Leading column added to every row in timestamped (continuous) output.
pub const TIMESTAMP_COLUMN: &str = "scraped_at";

fn needs_quotes(field: &str, sep: char) -> bool {
    field.contains(sep) || field.contains('"') || field.contains('\n') || field.contains('\r')
}

/// Write a single row to any writer.
pub fn write_row<W: Write>(mut w: W, row: &[String], sep: char) -> io::Result<()> {
    let mut first = true;
    for cell in row {
        if !first {
            write!(w, "{sep}")?;
        } else {
            first = false;
        }
        if needs_quotes(cell, sep) {
            write!(w, "\"{}\"", cell.replace('"', "\"\""))?;
        } else {
            write!(w, "{cell}")?;
        }
    }
    writeln!(w)
}

/// Minimal parser (quotes and CRLF tolerant).
pub fn parse_rows(text: &str, sep: char) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut field = String::new();
    let mut row = Vec::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            c if c == sep && !in_quotes => row.push(take(&mut field)),
            '\n' | '\r' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                row.push(take(&mut field));
                if !(row.len() == 1 && row[0].is_empty()) {
                    rows.push(take(&mut row));
                } else {
                    row.clear();
                }
            }
            _ => field.push(ch),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        rows.push(row);
    }
    rows
}

/// Field names across all records, first-seen order.
pub fn columns(result: &ExtractionResult, timestamped: bool) -> Vec<String> {
    let mut cols: Vec<String> = Vec::new();
    if timestamped {
        cols.push(TIMESTAMP_COLUMN.to_string());
    }
    for rec in &result.records {
        for name in rec.names() {
            if !cols.iter().any(|c| c == name) {
                cols.push(name.to_string());
            }
        }
    }
    cols
}

/// Value for `column`: the exact name first, then whatever the record calls the same
/// canonical field (`Ticker` under a `symbol` header and vice versa).
fn cell<'a>(rec: &'a TickerRecord, column: &str) -> &'a str {
    rec.get(column)
        .or_else(|| Field::from_name(column).and_then(|f| rec.field(f)))
        .unwrap_or_default()
}

/// Header of an existing file, or `None` when the file is missing or empty.
pub fn existing_header(path: &Path) -> Result<Option<Vec<String>>, YsError> {
    let mut text = String::new();
    match File::open(path) {
        Ok(mut f) => {
            f.read_to_string(&mut text)?;
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let first_line = text.lines().next().unwrap_or_default();
    Ok(parse_rows(first_line, ',').into_iter().next())
}

/// Write `result` to `path`. With `append`, rows go after existing content and reuse
/// the existing header; a header is only written into an empty file.
/// Returns the number of data rows written.
pub fn write_records(
    path: &Path,
    result: &ExtractionResult,
    append: bool,
    timestamped: bool,
) -> Result<usize, YsError> {
    let header = if append { existing_header(path)? } else { None };
    let (cols, write_header) = match header {
        Some(h) if !h.is_empty() => (h, false),
        _ => (columns(result, timestamped), true),
    };

    let file = if append {
        OpenOptions::new().create(true).append(true).open(path)?
    } else {
        File::create(path)?
    };
    let mut w = BufWriter::new(file);

    if write_header {
        write_row(&mut w, &cols, ',')?;
    }
    let stamp = result.scraped_at.to_rfc3339();
    for rec in &result.records {
        let row: Vec<String> = cols
            .iter()
            .map(|c| {
                if timestamped && c == TIMESTAMP_COLUMN {
                    stamp.clone()
                } else {
                    cell(rec, c).to_string()
                }
            })
            .collect();
        write_row(&mut w, &row, ',')?;
    }
    w.flush()?;
    debug!(path = %path.display(), rows = result.len(), append, "csv written");
    Ok(result.len())
}
