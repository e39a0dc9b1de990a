use crate::constants::{NOT_AN_IMAGE_MARKER, NOT_SUPPORTED_MARKER, SYMLINK_MARKER};
use crate::error::{FailureKind, OptimizeError, Result};
use crate::formats::{detect, format_label};
use crate::registry::OptimizerRegistry;
use crate::utils::{calculate_saved_percent, create_progress_spinner, format_file_size};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NotAnImage,
    /// Recognised image format with no optimizer, e.g. `GIF`.
    Unsupported(String),
    /// Replacing the file would turn the link into a regular file.
    Symlink,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizationOutcome {
    Optimized { before: u64, after: u64 },
    Skipped(SkipReason),
    Failed(FailureKind),
}

/// What happened to one file during the walk.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub format: Option<String>,
    /// Set only when an optimizer was dispatched.
    pub size_before: Option<u64>,
    /// Measured on disk after the attempt, whether or not it succeeded.
    pub size_after: Option<u64>,
    pub outcome: OptimizationOutcome,
    pub error: Option<String>,
}

impl FileReport {
    fn skipped(path: &Path, format: Option<String>, reason: SkipReason) -> Self {
        Self {
            path: path.to_path_buf(),
            format,
            size_before: None,
            size_after: None,
            outcome: OptimizationOutcome::Skipped(reason),
            error: None,
        }
    }

    /// One progress line, e.g. `processing a.png... PNG 50000 -> 30000 bytes`.
    pub fn progress_line(&self, name: &str) -> String {
        let mut line = format!("processing {}...", name);
        if let Some(format) = &self.format {
            line.push(' ');
            line.push_str(format);
        }

        match &self.outcome {
            OptimizationOutcome::Optimized { before, after } => {
                line.push_str(&format!(" {} -> {} bytes", before, after));
            }
            OptimizationOutcome::Skipped(SkipReason::NotAnImage) => {
                line.push(' ');
                line.push_str(NOT_AN_IMAGE_MARKER);
            }
            OptimizationOutcome::Skipped(SkipReason::Unsupported(_)) => {
                line.push(' ');
                line.push_str(NOT_SUPPORTED_MARKER);
            }
            OptimizationOutcome::Skipped(SkipReason::Symlink) => {
                line.push(' ');
                line.push_str(SYMLINK_MARKER);
            }
            OptimizationOutcome::Failed(kind) => {
                line.push_str(&format!(" failed ({})", kind));
                if let Some(error) = &self.error {
                    line.push_str(": ");
                    line.push_str(error);
                }
            }
        }

        line
    }
}

/// Byte accounting for a whole run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub files_seen: usize,
    pub optimized: usize,
    pub skipped: usize,
    pub failed: usize,
    pub size_before_total: u64,
    pub size_after_total: u64,
}

impl BatchResult {
    pub fn record(&mut self, report: &FileReport) {
        self.files_seen += 1;
        match report.outcome {
            OptimizationOutcome::Optimized { .. } => self.optimized += 1,
            OptimizationOutcome::Skipped(_) => self.skipped += 1,
            OptimizationOutcome::Failed(_) => self.failed += 1,
        }

        if let (Some(before), Some(after)) = (report.size_before, report.size_after) {
            self.size_before_total += before;
            self.size_after_total += after;
        }
    }

    /// Negative when the optimized files grew.
    pub fn bytes_saved(&self) -> i64 {
        self.size_before_total as i64 - self.size_after_total as i64
    }

    pub fn percent_saved(&self) -> Option<f64> {
        calculate_saved_percent(self.size_before_total, self.size_after_total)
    }

    /// The closing summary line, or `None` when no bytes were processed.
    pub fn summary_line(&self) -> Option<String> {
        self.percent_saved().map(|percent| {
            format!(
                "Optimized {} bytes, which is {:.1}% of size before",
                self.bytes_saved(),
                percent
            )
        })
    }
}

/// Walks a directory tree and optimizes every supported image in place.
pub struct BatchWalker<'a> {
    registry: &'a OptimizerRegistry,
}

impl<'a> BatchWalker<'a> {
    pub fn new(registry: &'a OptimizerRegistry) -> Self {
        Self { registry }
    }

    /// Every regular file under `root`, depth first, sorted by name within a
    /// directory. Symlinks are not followed; links that do not point at a
    /// directory are listed so they can be reported. Unreadable directories
    /// are logged and skipped.
    pub fn collect_files(root: &Path) -> Result<Vec<PathBuf>> {
        if !root.is_dir() {
            return Err(OptimizeError::InvalidFolder(root.to_path_buf()));
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(root).follow_links(false).sort_by_file_name() {
            match entry {
                Ok(entry) if entry.file_type().is_file() => files.push(entry.into_path()),
                Ok(entry) if entry.path_is_symlink() && !entry.path().is_dir() => {
                    files.push(entry.into_path())
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "skipping unreadable entry"),
            }
        }

        Ok(files)
    }

    /// Classifies, dispatches and measures a single file. Never fails: every
    /// problem is folded into the returned report.
    pub fn process_file(&self, path: &Path) -> FileReport {
        let is_symlink = fs::symlink_metadata(path)
            .map(|metadata| metadata.file_type().is_symlink())
            .unwrap_or(false);
        if is_symlink {
            debug!(path = %path.display(), "not following symbolic link");
            return FileReport::skipped(path, None, SkipReason::Symlink);
        }

        let format = match detect(path) {
            Ok(format) => format,
            Err(_) => return FileReport::skipped(path, None, SkipReason::NotAnImage),
        };

        let (supported, optimizer) = match self.registry.resolve(format) {
            Ok(resolved) => resolved,
            Err(_) => {
                let label = format_label(format);
                let reason = SkipReason::Unsupported(label.clone());
                return FileReport::skipped(path, Some(label), reason);
            }
        };

        let size_before = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                return FileReport {
                    path: path.to_path_buf(),
                    format: Some(supported.to_string()),
                    size_before: None,
                    size_after: None,
                    outcome: OptimizationOutcome::Failed(FailureKind::Io),
                    error: Some(e.to_string()),
                };
            }
        };

        let spinner = create_progress_spinner(&format!("optimizing {}", path.display()));
        spinner.enable_steady_tick(Duration::from_millis(100));
        let started = Instant::now();
        let attempt = optimizer.optimize(path, path);
        spinner.finish_and_clear();

        // Measured even on failure: a failed attempt still counts towards the
        // after-total with whatever is on disk now.
        let size_after = match fs::metadata(path) {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot measure file after optimization");
                0
            }
        };

        debug!(
            path = %path.display(),
            kind = %supported,
            size_before,
            size_after,
            elapsed = ?started.elapsed(),
            ok = attempt.is_ok(),
            "optimization attempt finished"
        );

        let (outcome, error) = match attempt {
            Ok(()) => (
                OptimizationOutcome::Optimized {
                    before: size_before,
                    after: size_after,
                },
                None,
            ),
            Err(e) => (OptimizationOutcome::Failed(e.failure_kind()), Some(e.to_string())),
        };

        FileReport {
            path: path.to_path_buf(),
            format: Some(supported.to_string()),
            size_before: Some(size_before),
            size_after: Some(size_after),
            outcome,
            error,
        }
    }

    /// Runs the whole batch, writing one progress line per file and the
    /// summary to `out`.
    pub fn run<W: Write>(&self, root: &Path, out: &mut W) -> Result<(BatchResult, Vec<FileReport>)> {
        let files = Self::collect_files(root)?;
        debug!(root = %root.display(), files = files.len(), "collected files");

        let mut result = BatchResult::default();
        let mut reports = Vec::with_capacity(files.len());

        for path in files {
            let report = self.process_file(&path);
            let name = path.strip_prefix(root).unwrap_or(path.as_path()).display().to_string();
            writeln!(out, "{}", report.progress_line(&name))?;
            result.record(&report);
            reports.push(report);
        }

        match result.summary_line() {
            Some(line) => {
                writeln!(out, "{}", line)?;
                writeln!(
                    out,
                    "{} -> {} ({} optimized, {} skipped, {} failed)",
                    format_file_size(result.size_before_total),
                    format_file_size(result.size_after_total),
                    result.optimized,
                    result.skipped,
                    result.failed
                )?;
            }
            None => writeln!(out, "No images were optimized")?,
        }

        Ok((result, reports))
    }
}
