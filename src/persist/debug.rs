use crate::core::YsError;
use std::path::{Path, PathBuf};

/// Raw markup of the last page nothing could be extracted from.
pub const DEBUG_PAGE_FILE: &str = "yolostocks_page_source.html";

pub fn write_debug_page(dir: &Path, html: &str) -> Result<PathBuf, YsError> {
    let path = dir.join(DEBUG_PAGE_FILE);
    std::fs::write(&path, html)?;
    tracing::info!(path = %path.display(), bytes = html.len(), "page source saved for debugging");
    Ok(path)
}
