//! Raw rows → [`TickerRecord`]s.
//!
//! One rule decides whether the first row is a header: it is, if and only if it
//! has a non-empty cell and none of its first [`HEADER_PROBE_CELLS`] cells
//! contains an ASCII digit. Header rows name the fields verbatim; otherwise
//! fields get positional names (`rank`, `ticker`, `mentions`, `sentiment`,
//! `price`, `change`, `volume`). Cells past the last name are joined into
//! `extra`. Output never exceeds [`MAX_RECORDS`].

use crate::core::{Field, MAX_RECORDS, TickerRecord};

/// How many leading cells of the first row are checked for digits.
pub const HEADER_PROBE_CELLS: usize = 3;

/// Separator used when folding overflow cells into the `extra` field.
pub const EXTRA_SEPARATOR: &str = " | ";

pub fn is_header_row(row: &[String]) -> bool {
    row.iter().any(|c| !c.trim().is_empty())
        && row
            .iter()
            .take(HEADER_PROBE_CELLS)
            .all(|c| !c.chars().any(|ch| ch.is_ascii_digit()))
}

/// Normalize rows (header optional) into at most [`MAX_RECORDS`] records,
/// preserving row order. Rows whose cells are all blank are ignored.
pub fn normalize_rows(rows: &[Vec<String>]) -> Vec<TickerRecord> {
    let mut rows = rows
        .iter()
        .filter(|r| r.iter().any(|c| !c.trim().is_empty()))
        .peekable();

    let header = match rows.peek() {
        Some(first) if is_header_row(first) => rows.next().map(|h| header_names(h)),
        _ => None,
    };

    rows.take(MAX_RECORDS)
        .map(|row| match &header {
            Some(names) => keyed_record(names, row),
            None => positional_record(row),
        })
        .collect()
}

/// Header cell text as field names; blanks become `column_N`, repeats get a suffix.
fn header_names(row: &[String]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(row.len());
    for (j, cell) in row.iter().enumerate() {
        let base = match cell.trim() {
            "" => format!("column_{}", j + 1),
            t => t.to_string(),
        };
        let mut name = base.clone();
        let mut n = 2;
        while names.contains(&name) {
            name = format!("{base}_{n}");
            n += 1;
        }
        names.push(name);
    }
    names
}

fn keyed_record(names: &[String], row: &[String]) -> TickerRecord {
    let mut rec = TickerRecord::new();
    for (j, name) in names.iter().enumerate() {
        rec.insert(name.as_str(), row.get(j).map_or("", |c| c.trim()));
    }
    push_extra(&mut rec, row.get(names.len()..));
    rec
}

fn positional_record(row: &[String]) -> TickerRecord {
    let mut rec = TickerRecord::new();
    for (field, cell) in Field::POSITIONAL.iter().zip(row) {
        rec.insert(field.as_str(), cell.trim());
    }
    push_extra(&mut rec, row.get(Field::POSITIONAL.len()..));
    rec
}

fn push_extra(rec: &mut TickerRecord, rest: Option<&[String]>) {
    let Some(rest) = rest.filter(|r| !r.is_empty()) else {
        return;
    };
    let joined = rest
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .collect::<Vec<_>>()
        .join(EXTRA_SEPARATOR);
    if !joined.is_empty() {
        rec.insert(Field::Extra.as_str(), joined);
    }
}
