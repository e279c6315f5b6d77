use crate::core::{ExtractionResult, YsError};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Overwrite `path` with a pretty-printed snapshot of `result`.
pub fn write_snapshot(path: &Path, result: &ExtractionResult) -> Result<(), YsError> {
    let mut w = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut w, result)?;
    writeln!(w)?;
    w.flush()?;
    tracing::debug!(path = %path.display(), "json snapshot written");
    Ok(())
}
