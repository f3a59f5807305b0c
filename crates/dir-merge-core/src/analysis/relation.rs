use serde::Serialize;
use std::ffi::OsString;
use std::fmt;
use std::path::PathBuf;

use crate::error::Error;
use crate::hasher::Fingerprinter;
use crate::index::FileRecord;

/// The three traits a pair of files is compared on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Traits {
    /// Same directory relative to each file's own root.
    pub same_path: bool,
    pub same_name: bool,
    pub same_content: bool,
}

impl Traits {
    pub const fn new(same_path: bool, same_name: bool, same_content: bool) -> Self {
        Self {
            same_path,
            same_name,
            same_content,
        }
    }
}

/// How two files relate.
///
/// `Unique` and `Distinct` are not relations: pairs classified that way are
/// cached but never grouped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationKind {
    Match,
    PathNameDup,
    ContentNameDup,
    ContentPathDup,
    NameDup,
    ContentDup,
    Unique,
    Distinct,
}

impl RelationKind {
    /// Relational kinds in resolution order.
    pub const RELATIONAL: [RelationKind; 6] = [
        RelationKind::Match,
        RelationKind::PathNameDup,
        RelationKind::ContentNameDup,
        RelationKind::ContentPathDup,
        RelationKind::NameDup,
        RelationKind::ContentDup,
    ];

    /// The relation table. `(same_path, !same_name, !same_content)` has no
    /// entry and returns `None`.
    pub fn from_traits(traits: Traits) -> Option<Self> {
        match (traits.same_path, traits.same_name, traits.same_content) {
            (true, true, true) => Some(RelationKind::Match),
            (true, true, false) => Some(RelationKind::PathNameDup),
            (false, true, true) => Some(RelationKind::ContentNameDup),
            (true, false, true) => Some(RelationKind::ContentPathDup),
            (false, true, false) => Some(RelationKind::NameDup),
            (false, false, true) => Some(RelationKind::ContentDup),
            (false, false, false) => Some(RelationKind::Unique),
            (true, false, false) => None,
        }
    }

    pub fn traits(self) -> Traits {
        match self {
            RelationKind::Match => Traits::new(true, true, true),
            RelationKind::PathNameDup => Traits::new(true, true, false),
            RelationKind::ContentNameDup => Traits::new(false, true, true),
            RelationKind::ContentPathDup => Traits::new(true, false, true),
            RelationKind::NameDup => Traits::new(false, true, false),
            RelationKind::ContentDup => Traits::new(false, false, true),
            RelationKind::Unique => Traits::new(false, false, false),
            RelationKind::Distinct => Traits::new(true, false, false),
        }
    }

    pub fn is_relational(self) -> bool {
        !matches!(self, RelationKind::Unique | RelationKind::Distinct)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RelationKind::Match => "MATCH",
            RelationKind::PathNameDup => "PATH_NAME_DUP",
            RelationKind::ContentNameDup => "CONTENT_NAME_DUP",
            RelationKind::ContentPathDup => "CONTENT_PATH_DUP",
            RelationKind::NameDup => "NAME_DUP",
            RelationKind::ContentDup => "CONTENT_DUP",
            RelationKind::Unique => "UNIQUE",
            RelationKind::Distinct => "DISTINCT",
        }
    }

    /// Project `record` onto the traits that define this kind. Members of a
    /// group share these traits, so any member yields the same key.
    pub fn key_for(
        self,
        record: &FileRecord,
        fingerprinter: &Fingerprinter,
    ) -> Result<Option<TraitKey>, Error> {
        let name = || Some(record.file_name.clone());
        let dir = || Some(record.rel_dir.clone());
        let content = || fingerprinter.full(record).map(Some);

        let key = match self {
            RelationKind::Match => TraitKey {
                name: name(),
                dir: dir(),
                content: content()?,
            },
            RelationKind::PathNameDup => TraitKey {
                name: name(),
                dir: dir(),
                content: None,
            },
            RelationKind::ContentNameDup => TraitKey {
                name: name(),
                dir: None,
                content: content()?,
            },
            RelationKind::ContentPathDup => TraitKey {
                name: None,
                dir: dir(),
                content: content()?,
            },
            RelationKind::NameDup => TraitKey {
                name: name(),
                dir: None,
                content: None,
            },
            RelationKind::ContentDup => TraitKey {
                name: None,
                dir: None,
                content: content()?,
            },
            RelationKind::Unique | RelationKind::Distinct => return Ok(None),
        };
        Ok(Some(key))
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping key within one relation kind. Only the traits that define the
/// kind are set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraitKey {
    pub name: Option<OsString>,
    pub dir: Option<PathBuf>,
    pub content: Option<blake3::Hash>,
}

impl fmt::Display for TraitKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::with_capacity(3);
        if let Some(name) = &self.name {
            parts.push(format!("name=\"{}\"", name.to_string_lossy()));
        }
        if let Some(dir) = &self.dir {
            let dir = if dir.as_os_str().is_empty() {
                ".".to_string()
            } else {
                dir.display().to_string()
            };
            parts.push(format!("dir=\"{}\"", dir));
        }
        if let Some(content) = &self.content {
            parts.push(format!("content={}", &content.to_hex()[..16]));
        }
        write!(f, "({})", parts.join(", "))
    }
}
