pub mod full;
pub mod xxhash;

use std::cell::Cell;
use std::cell::OnceCell;
use std::io;
use tracing::trace;

use crate::error::Error;
use crate::index::FileRecord;

/// Number of times file content was actually read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HashStats {
    pub prefix_reads: usize,
    pub full_reads: usize,
}

/// Two-tier content fingerprinting:
/// 1. Prefix hash (first 4KB via XxHash64) to cheaply rule out non-matches
/// 2. Full BLAKE3 hash only for same-size, same-prefix pairs
///
/// Results are memoized on the [`FileRecord`], so each tier reads a file at
/// most once per run.
#[derive(Debug, Default)]
pub struct Fingerprinter {
    prefix_reads: Cell<usize>,
    full_reads: Cell<usize>,
}

impl Fingerprinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> HashStats {
        HashStats {
            prefix_reads: self.prefix_reads.get(),
            full_reads: self.full_reads.get(),
        }
    }

    pub fn prefix(&self, record: &FileRecord) -> Result<u64, Error> {
        memoize(record, record.prefix_cell(), &self.prefix_reads, |path| {
            xxhash::read_prefix(path).map(|data| xxhash::hash_data(&data))
        })
    }

    pub fn full(&self, record: &FileRecord) -> Result<blake3::Hash, Error> {
        memoize(record, record.full_cell(), &self.full_reads, full::hash_file)
    }

    /// Size first (no I/O), then prefix, then full content.
    pub fn content_equals(&self, a: &FileRecord, b: &FileRecord) -> Result<bool, Error> {
        if a.size != b.size {
            return Ok(false);
        }
        if self.prefix(a)? != self.prefix(b)? {
            return Ok(false);
        }
        Ok(self.full(a)? == self.full(b)?)
    }
}

fn memoize<T: Copy>(
    record: &FileRecord,
    cell: &OnceCell<T>,
    reads: &Cell<usize>,
    compute: impl FnOnce(&std::path::Path) -> io::Result<T>,
) -> Result<T, Error> {
    if let Some(value) = cell.get() {
        return Ok(*value);
    }
    trace!("Hashing {}", record.abs_path.display());
    reads.set(reads.get() + 1);
    let value = compute(&record.abs_path).map_err(|source| Error::Fingerprint {
        path: record.abs_path.clone(),
        source,
    })?;
    Ok(*cell.get_or_init(|| value))
}
