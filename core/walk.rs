use crate::error::Result;
use crate::matcher::IgnoreMatcher;
use log;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkEntry {
    pub path: PathBuf,
    pub relative_path: PathBuf,
    pub is_dir: bool,
    /// Size in bytes from the entry's metadata, 0 when unavailable.
    pub size: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WalkStats {
    pub files_visited: usize,
    pub dirs_visited: usize,
    pub files_ignored: usize,
    pub dirs_pruned: usize,
}

/// Pre-order walk of `project_root`, siblings in file-name order.
///
/// Ignored directories are never entered. `on_file` runs for every file that
/// survives the matcher; an error from it, or from reading a directory, stops
/// the walk and is returned as is.
pub fn walk<F>(project_root: &Path, matcher: &IgnoreMatcher, mut on_file: F) -> Result<WalkStats>
where
    F: FnMut(&WalkEntry) -> Result<()>,
{
    let mut stats = WalkStats::default();
    let mut entries = WalkDir::new(project_root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter();

    log::info!("Walking project directory: {}", project_root.display());
    while let Some(entry_result) = entries.next() {
        let entry = entry_result?;
        if entry.depth() == 0 {
            continue;
        }

        let path = entry.path();
        let Some(relative_path) = pathdiff::diff_paths(path, project_root) else {
            log::warn!("Could not get relative path for: {}", path.display());
            continue;
        };
        let is_dir = entry.file_type().is_dir();

        if matcher.matches(&relative_path, is_dir) {
            log::info!("Ignoring: {}", relative_path.display());
            if let Some(rule) = matcher.explain(&relative_path, is_dir) {
                log::trace!("  matched rule {}", rule);
            }
            if is_dir {
                entries.skip_current_dir();
                stats.dirs_pruned += 1;
            } else {
                stats.files_ignored += 1;
            }
            continue;
        }

        if is_dir {
            stats.dirs_visited += 1;
            continue;
        }

        let size = match entry.metadata() {
            Ok(metadata) => metadata.len(),
            Err(e) => {
                log::debug!("No metadata for {}: {}", path.display(), e);
                0
            }
        };
        stats.files_visited += 1;
        on_file(&WalkEntry {
            path: path.to_path_buf(),
            relative_path,
            is_dir: false,
            size,
        })?;
    }

    log::debug!("Walk complete: {:?}", stats);
    Ok(stats)
}
