//! Helpers shared by the optimizers and the batch walker.

use crate::constants::PROGRESS_SPINNER_TEMPLATE;
use crate::error::{OptimizeError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, File};
use std::path::Path;
use tempfile::NamedTempFile;

/// Replaces `target` with whatever `write` produces, without ever exposing a
/// half-written file at `target`.
///
/// The content is written to a temporary file next to `target` and renamed
/// over it once `write` returns successfully. If `target` already exists its
/// permissions are carried over. On error the temporary file is removed and
/// `target` is left as it was.
pub fn replace_file_atomically<F>(target: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut File) -> Result<()>,
{
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir)?;
    write(temp.as_file_mut())?;
    temp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(target) {
        fs::set_permissions(temp.path(), metadata.permissions())?;
    }

    temp.persist(target)
        .map_err(|e| OptimizeError::Io(e.error))?;
    Ok(())
}

/// Create a progress spinner with consistent styling
pub fn create_progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template(PROGRESS_SPINNER_TEMPLATE) {
        pb.set_style(style);
    }
    pb.set_message(message.to_string());
    pb
}

/// Format file size in human-readable format
///
/// # Returns
/// * Human-readable size string (e.g., "1.2 MB", "512 B")
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut size = bytes as f64;
    let mut unit_index = 0;

    while size >= THRESHOLD && unit_index < UNITS.len() - 1 {
        size /= THRESHOLD;
        unit_index += 1;
    }

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Percentage of `original_size` saved, or `None` when there was nothing to
/// measure against. Negative when the file grew.
pub fn calculate_saved_percent(original_size: u64, new_size: u64) -> Option<f64> {
    if original_size == 0 {
        return None;
    }
    Some(((original_size as f64 - new_size as f64) / original_size as f64) * 100.0)
}
