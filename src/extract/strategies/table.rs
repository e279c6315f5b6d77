use crate::core::{ExtractionResult, Provenance, YsError};
use crate::extract::Strategy;
use crate::extract::utils::{aria_rows, cell_text, table_rows, tables};
use crate::fetch::Page;
use crate::normalize::normalize_rows;
use futures::future::BoxFuture;
use tracing::debug;

/// One header row plus a full board.
pub const MAX_TABLE_ROWS: usize = 16;

/// Reads the first table (or ARIA grid) that has any non-blank rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct TableScan;

impl TableScan {
    /// Cell text of the first usable table, blank rows dropped, capped at [`MAX_TABLE_ROWS`].
    pub fn rows(html: &str) -> Vec<Vec<String>> {
        for (i, table) in tables(html).into_iter().enumerate() {
            let rows = clean(table_rows(table));
            if !rows.is_empty() {
                debug!(table = i, rows = rows.len(), "table found");
                return rows;
            }
        }
        let rows = clean(aria_rows(html));
        if !rows.is_empty() {
            debug!(rows = rows.len(), "ARIA grid found");
        }
        rows
    }

    pub fn scan(html: &str) -> Option<ExtractionResult> {
        let rows = Self::rows(html);
        ExtractionResult::new(Provenance::TableScan, normalize_rows(&rows)).non_empty()
    }
}

fn clean(raw: Vec<Vec<&str>>) -> Vec<Vec<String>> {
    raw.into_iter()
        .map(|cells| cells.into_iter().map(cell_text).collect::<Vec<_>>())
        .filter(|cells| cells.iter().any(|c| !c.is_empty()))
        .take(MAX_TABLE_ROWS)
        .collect()
}

impl Strategy for TableScan {
    fn name(&self) -> &'static str {
        "table_scan"
    }

    fn provenance(&self) -> Provenance {
        Provenance::TableScan
    }

    fn attempt<'a>(
        &'a self,
        page: &'a Page,
    ) -> BoxFuture<'a, Result<Option<ExtractionResult>, YsError>> {
        Box::pin(async move { Ok(Self::scan(&page.html)) })
    }
}
