use glob::Pattern;
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::{error, trace, warn};
use walkdir::{DirEntry, WalkDir};

use crate::error::Error;

pub(crate) fn compile_ignore_patterns(ignore_globs: &[String]) -> Vec<Pattern> {
    ignore_globs
        .iter()
        .filter_map(|glob| match Pattern::new(glob) {
            Ok(p) => Some(p),
            Err(e) => {
                error!("Invalid glob pattern '{}': {}", glob, e);
                None
            }
        })
        .collect()
}

/// Returns true if any segment of the root-relative path starts with '.'.
pub(crate) fn is_hidden(rel_path: &Path) -> bool {
    rel_path.components().any(|component| match component {
        Component::Normal(segment) => segment.to_string_lossy().starts_with('.'),
        _ => false,
    })
}

fn is_skipped(root: &Path, entry: &DirEntry, ignore_patterns: &[Pattern]) -> bool {
    if entry.depth() == 0 {
        return false;
    }
    let rel_path = entry.path().strip_prefix(root).unwrap_or(entry.path());
    if is_hidden(rel_path) {
        trace!("Skipping hidden {}", entry.path().display());
        return true;
    }
    ignore_patterns
        .iter()
        .any(|pattern| pattern.matches_path(rel_path) || pattern.matches_path(entry.path()))
}

/// Walk one root in file-name order and return `(absolute path, size)` for
/// every regular file. Symlinked directories are followed.
pub(crate) fn collect_files(
    root: &Path,
    ignore_patterns: &[Pattern],
    mut on_file: impl FnMut(&Path),
) -> Result<Vec<(PathBuf, u64)>, Error> {
    let mut files = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_skipped(root, entry, ignore_patterns));

    for entry_result in walker {
        let entry = match entry_result {
            Ok(entry) => entry,
            Err(err) => {
                if let Some(ancestor) = err.loop_ancestor() {
                    warn!(
                        "Skipping symlink loop at {} (points back to {})",
                        err.path().unwrap_or(root).display(),
                        ancestor.display()
                    );
                    continue;
                }
                match err.io_error().map(|e| e.kind()) {
                    Some(io::ErrorKind::PermissionDenied) => {
                        error!(
                            "Access denied reading {}: {}",
                            err.path().unwrap_or(root).display(),
                            err
                        );
                        continue;
                    }
                    Some(io::ErrorKind::NotFound) => {
                        warn!(
                            "Skipping dangling entry {}",
                            err.path().unwrap_or(root).display()
                        );
                        continue;
                    }
                    _ => {
                        return Err(Error::Walk {
                            path: err.path().unwrap_or(root).to_path_buf(),
                            source: err,
                        })
                    }
                }
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        let metadata = entry.metadata().map_err(|err| Error::Walk {
            path: entry.path().to_path_buf(),
            source: err,
        })?;
        on_file(entry.path());
        files.push((entry.into_path(), metadata.len()));
    }

    Ok(files)
}
