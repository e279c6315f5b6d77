//! Output files: the delimited table, the JSON snapshot and the debug page dump.

pub mod csv;
mod debug;
pub mod json;

pub use debug::{DEBUG_PAGE_FILE, write_debug_page};

use crate::core::{ExtractionResult, YsError};
use std::path::{Path, PathBuf};

pub const DEFAULT_CSV_NAME: &str = "yolostocks_top15_tickers.csv";
pub const DEFAULT_JSON_NAME: &str = "yolostocks_top15_tickers.json";
/// Prefix for the files fabricated demo rows are written to.
pub const DEMO_PREFIX: &str = "demo_";

/// Whether the delimited file is replaced or extended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CsvMode {
    #[default]
    Overwrite,
    Append,
}

/// Where results go.
#[derive(Debug, Clone)]
pub struct OutputSink {
    dir: PathBuf,
    csv_name: String,
    json_name: String,
    timestamped: bool,
}

impl Default for OutputSink {
    fn default() -> Self {
        Self::new(".")
    }
}

impl OutputSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            csv_name: DEFAULT_CSV_NAME.to_string(),
            json_name: DEFAULT_JSON_NAME.to_string(),
            timestamped: false,
        }
    }

    pub fn csv_name(mut self, name: impl Into<String>) -> Self {
        self.csv_name = name.into();
        self
    }

    pub fn json_name(mut self, name: impl Into<String>) -> Self {
        self.json_name = name.into();
        self
    }

    /// Prefix every CSV row with a `scraped_at` column.
    pub fn timestamped(mut self, yes: bool) -> Self {
        self.timestamped = yes;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn csv_path(&self) -> PathBuf {
        self.dir.join(&self.csv_name)
    }

    pub fn json_path(&self) -> PathBuf {
        self.dir.join(&self.json_name)
    }

    pub fn demo_csv_path(&self) -> PathBuf {
        self.dir.join(format!("{DEMO_PREFIX}{}", self.csv_name))
    }

    pub fn demo_json_path(&self) -> PathBuf {
        self.dir.join(format!("{DEMO_PREFIX}{}", self.json_name))
    }

    /// Write both files. Returns the number of CSV data rows written.
    ///
    /// Fabricated results go to the `demo_` files and never touch the real ones.
    pub fn write(&self, result: &ExtractionResult, mode: CsvMode) -> Result<usize, YsError> {
        std::fs::create_dir_all(&self.dir)?;
        let (csv_path, json_path) = if result.is_fabricated() {
            (self.demo_csv_path(), self.demo_json_path())
        } else {
            (self.csv_path(), self.json_path())
        };
        let append = mode == CsvMode::Append;
        let rows = csv::write_records(&csv_path, result, append, self.timestamped)?;
        json::write_snapshot(&json_path, result)?;
        tracing::info!(
            csv = %csv_path.display(),
            json = %json_path.display(),
            rows,
            demo = result.is_fabricated(),
            "results saved"
        );
        Ok(rows)
    }
}
