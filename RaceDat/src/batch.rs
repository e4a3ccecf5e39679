//! Batch decoding
//!
//! Finds `.dat` files and decodes them in parallel. Every file gets its own
//! buffer and cursor; the only shared state is the atomic counters.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;
use walkdir::WalkDir;

use crate::formats::dat::{DatModelInfo, DecodeOptions, inspect_dat};

/// Progress update for one file.
#[derive(Debug, Clone)]
pub struct BatchProgress {
    /// Current item number (1-indexed)
    pub current: usize,
    pub total: usize,
    pub current_file: String,
}

/// Result of a batch decode
#[derive(Debug, Clone, Default)]
pub struct BatchDecodeResult {
    /// Number of files that decoded
    pub success_count: usize,
    /// Number of files that failed
    pub fail_count: usize,
    /// Recoverable problems across all decoded files
    pub diagnostic_count: usize,
    /// One message per file, in input order
    pub results: Vec<String>,
    /// Summaries of the files that decoded, in input order
    pub models: Vec<DatModelInfo>,
}

/// Find all .dat files in a directory recursively, sorted.
pub fn find_dat_files<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut files: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.path().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("dat"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();

    files.sort();
    files
}

/// Decode and summarise files in parallel.
///
/// Paths are displayed relative to `source_base` when they are under it.
pub fn batch_inspect<F>(
    files: &[PathBuf],
    source_base: &Path,
    options: &DecodeOptions,
    progress: F,
) -> BatchDecodeResult
where
    F: Fn(&BatchProgress) + Send + Sync,
{
    let success_counter = AtomicUsize::new(0);
    let fail_counter = AtomicUsize::new(0);
    let diagnostic_counter = AtomicUsize::new(0);
    let processed = AtomicUsize::new(0);
    let total = files.len();

    let outcomes: Vec<(String, Option<DatModelInfo>)> = files
        .par_iter()
        .map(|path| {
            let display_path = path
                .strip_prefix(source_base)
                .unwrap_or(path.as_path())
                .to_string_lossy()
                .to_string();

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&BatchProgress {
                current,
                total,
                current_file: display_path.clone(),
            });

            match inspect_dat(path, options) {
                Ok(info) => {
                    success_counter.fetch_add(1, Ordering::SeqCst);
                    diagnostic_counter.fetch_add(info.diagnostics.len(), Ordering::SeqCst);
                    let message = format!(
                        "Decoded: {display_path} ({}, {} mesh(es), {} diagnostic(s))",
                        info.variant,
                        info.meshes.len(),
                        info.diagnostics.len()
                    );
                    (message, Some(info))
                }
                Err(e) => {
                    tracing::warn!("Failed to decode {display_path}: {e}");
                    fail_counter.fetch_add(1, Ordering::SeqCst);
                    (format!("Failed {display_path}: {e}"), None)
                }
            }
        })
        .collect();

    let (results, models): (Vec<String>, Vec<Option<DatModelInfo>>) = outcomes.into_iter().unzip();

    BatchDecodeResult {
        success_count: success_counter.load(Ordering::SeqCst),
        fail_count: fail_counter.load(Ordering::SeqCst),
        diagnostic_count: diagnostic_counter.load(Ordering::SeqCst),
        results,
        models: models.into_iter().flatten().collect(),
    }
}
