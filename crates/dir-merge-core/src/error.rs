use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::analysis::RelationKind;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Root directory not found or not a directory: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Error walking {}: {source}", path.display())]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    #[error("Error fingerprinting {}: {source}", path.display())]
    Fingerprint {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Attempted to compare {} with itself", .0.display())]
    SelfComparison(PathBuf),

    #[error(
        "No relation kind for same_path={same_path}, same_name={same_name}, same_content={same_content}: {} <-> {}",
        a.display(),
        b.display()
    )]
    UnclassifiedRelation {
        a: PathBuf,
        b: PathBuf,
        same_path: bool,
        same_name: bool,
        same_content: bool,
    },

    #[error(
        "Ambiguous merge target {}: {} and {} would both be written there",
        path.display(),
        existing.display(),
        incoming.display()
    )]
    AmbiguousMergeTarget {
        path: PathBuf,
        existing: PathBuf,
        incoming: PathBuf,
    },

    #[error("Invalid {kind} decision: index {index} out of range for {members} members")]
    InvalidDecision {
        kind: RelationKind,
        index: usize,
        members: usize,
    },

    #[error("Report error: {0}")]
    Report(String),
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Report(err.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Error::Report(err.to_string())
    }
}
