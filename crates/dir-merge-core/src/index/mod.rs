mod record;
mod walk;

pub use record::{FileId, FileRecord};

use std::collections::HashMap;
use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::Error;
use crate::progress::{ProgressReporter, SilentReporter};

/// Every file under a set of roots, with the name and size maps used to
/// pick comparison candidates. Owns all [`FileRecord`]s for a run.
#[derive(Debug, Default)]
pub struct TraitIndex {
    roots: Vec<PathBuf>,
    records: Vec<FileRecord>,
    by_name: HashMap<OsString, Vec<FileId>>,
    by_size: HashMap<u64, Vec<FileId>>,
}

impl TraitIndex {
    /// Index `roots` with no ignore patterns.
    pub fn index(roots: &[PathBuf]) -> Result<Self, Error> {
        Self::build(roots, &[], &SilentReporter)
    }

    /// Index every regular file under `roots`.
    ///
    /// All roots are checked before any traversal starts, so a bad root list
    /// never produces a partial index.
    pub fn build(
        roots: &[PathBuf],
        ignore_patterns: &[String],
        reporter: &dyn ProgressReporter,
    ) -> Result<Self, Error> {
        if let Some(missing) = roots.iter().find(|root| !root.is_dir()) {
            return Err(Error::RootNotFound(missing.clone()));
        }

        let patterns = walk::compile_ignore_patterns(ignore_patterns);
        let mut index = TraitIndex {
            roots: roots.to_vec(),
            ..Default::default()
        };

        for (root_idx, root) in roots.iter().enumerate() {
            info!("Indexing {}", root.display());
            let mut seen = index.records.len();
            let files = walk::collect_files(root, &patterns, |path| {
                seen += 1;
                reporter.on_index_progress(seen, &path.to_string_lossy());
            })?;

            for (abs_path, size) in files {
                debug!("Indexing file: {} ({} bytes)", abs_path.display(), size);
                index.insert(root_idx, abs_path, size);
            }
        }

        debug!(
            "{} files indexed, {} name keys, {} size keys",
            index.records.len(),
            index.by_name.len(),
            index.by_size.len()
        );
        Ok(index)
    }

    fn insert(&mut self, root_idx: usize, abs_path: PathBuf, size: u64) -> FileId {
        let id = FileId::new(self.records.len());
        let record = FileRecord::new(id, root_idx, &self.roots[root_idx], abs_path, size);
        self.by_name.entry(record.file_name.clone()).or_default().push(id);
        self.by_size.entry(record.size).or_default().push(id);
        self.records.push(record);
        id
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    pub fn root_of(&self, id: FileId) -> &Path {
        &self.roots[self.record(id).root]
    }

    pub fn records(&self) -> &[FileRecord] {
        &self.records
    }

    pub fn record(&self, id: FileId) -> &FileRecord {
        &self.records[id.index()]
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Files named `name`, in index order.
    pub fn same_name(&self, name: impl AsRef<OsStr>) -> &[FileId] {
        self.by_name
            .get(name.as_ref())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Files of `size` bytes, in index order.
    pub fn same_size(&self, size: u64) -> &[FileId] {
        self.by_size.get(&size).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Name groups sorted by name.
    pub fn name_groups(&self) -> Vec<(&OsStr, &[FileId])> {
        let mut groups: Vec<_> = self
            .by_name
            .iter()
            .map(|(name, ids)| (name.as_os_str(), ids.as_slice()))
            .collect();
        groups.sort_by(|a, b| a.0.cmp(b.0));
        groups
    }

    /// Size groups sorted by size.
    pub fn size_groups(&self) -> Vec<(u64, &[FileId])> {
        let mut groups: Vec<_> = self
            .by_size
            .iter()
            .map(|(size, ids)| (*size, ids.as_slice()))
            .collect();
        groups.sort_by_key(|(size, _)| *size);
        groups
    }
}
