use std::cell::OnceCell;
use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};

/// Position of a record in its [`TraitIndex`](super::TraitIndex).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(usize);

impl FileId {
    pub(crate) fn new(index: usize) -> Self {
        FileId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// One indexed file. Fingerprints are filled in on first use by the
/// [`Fingerprinter`](crate::hasher::Fingerprinter) and never change afterwards.
#[derive(Debug)]
pub struct FileRecord {
    pub id: FileId,
    /// Index of the root this file was found under.
    pub root: usize,
    pub abs_path: PathBuf,
    pub rel_path: PathBuf,
    /// Containing directory relative to the root; empty for top-level files.
    pub rel_dir: PathBuf,
    /// File name as stored on disk. Names are compared on this.
    pub file_name: OsString,
    /// `file_name` for display; not unique for names that are not UTF-8.
    pub name: String,
    pub size: u64,
    prefix_fingerprint: OnceCell<u64>,
    full_fingerprint: OnceCell<blake3::Hash>,
}

impl FileRecord {
    pub(crate) fn new(id: FileId, root: usize, root_path: &Path, abs_path: PathBuf, size: u64) -> Self {
        let rel_path = abs_path
            .strip_prefix(root_path)
            .map(Path::to_path_buf)
            .unwrap_or_else(|_| abs_path.clone());
        let rel_dir = rel_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let file_name = abs_path.file_name().map(OsString::from).unwrap_or_default();
        let name = file_name.to_string_lossy().into_owned();

        Self {
            id,
            root,
            abs_path,
            rel_path,
            rel_dir,
            file_name,
            name,
            size,
            prefix_fingerprint: OnceCell::new(),
            full_fingerprint: OnceCell::new(),
        }
    }

    /// Prefix fingerprint, if it has been computed.
    pub fn prefix_fingerprint(&self) -> Option<u64> {
        self.prefix_fingerprint.get().copied()
    }

    /// Full-content fingerprint, if it has been computed.
    pub fn full_fingerprint(&self) -> Option<blake3::Hash> {
        self.full_fingerprint.get().copied()
    }

    pub(crate) fn prefix_cell(&self) -> &OnceCell<u64> {
        &self.prefix_fingerprint
    }

    pub(crate) fn full_cell(&self) -> &OnceCell<blake3::Hash> {
        &self.full_fingerprint
    }
}

impl fmt::Display for FileRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}, {} bytes)",
            self.name,
            self.rel_path.display(),
            self.size
        )
    }
}
