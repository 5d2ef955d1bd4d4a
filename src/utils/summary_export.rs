use std::fs;
use std::path::Path;
use tracing::info;

/// Default name offered in the save dialog for a file's summary.
pub fn summary_file_name(original_name: &str) -> String {
    format!("{}_summary.txt", original_name)
}

pub fn save_summary(path: &Path, summary: &str) -> std::io::Result<()> {
    fs::write(path, summary)?;
    info!(path = %path.display(), bytes = summary.len(), "Saved summary");
    Ok(())
}
