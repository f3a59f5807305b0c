use std::collections::HashMap;
use tracing::{debug, trace, warn};

use super::relation::{RelationKind, Traits};
use crate::error::Error;
use crate::hasher::Fingerprinter;
use crate::index::{FileId, TraitIndex};

/// Order-independent key for a pair of files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PairKey(FileId, FileId);

impl PairKey {
    pub fn new(a: FileId, b: FileId) -> Self {
        if a <= b {
            PairKey(a, b)
        } else {
            PairKey(b, a)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComparisonOutcome {
    pub a: FileId,
    pub b: FileId,
    pub traits: Traits,
    pub kind: RelationKind,
}

impl ComparisonOutcome {
    pub fn pair(&self) -> PairKey {
        PairKey::new(self.a, self.b)
    }
}

/// Every pair classified so far in a run. Outcomes are never replaced.
#[derive(Debug, Default)]
pub struct ComparisonCache {
    outcomes: HashMap<PairKey, ComparisonOutcome>,
    hits: usize,
}

impl ComparisonCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, a: FileId, b: FileId) -> Option<&ComparisonOutcome> {
        self.outcomes.get(&PairKey::new(a, b))
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Lookups answered without classifying.
    pub fn hits(&self) -> usize {
        self.hits
    }

    pub fn outcomes(&self) -> impl Iterator<Item = &ComparisonOutcome> {
        self.outcomes.values()
    }
}

/// Classifies candidate pairs from one [`TraitIndex`].
pub struct Classifier<'a> {
    index: &'a TraitIndex,
    fingerprinter: &'a Fingerprinter,
    strict: bool,
}

impl<'a> Classifier<'a> {
    pub fn new(index: &'a TraitIndex, fingerprinter: &'a Fingerprinter) -> Self {
        Self {
            index,
            fingerprinter,
            strict: false,
        }
    }

    /// In strict mode a pair with no table entry is an error rather than
    /// [`RelationKind::Distinct`].
    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn index(&self) -> &'a TraitIndex {
        self.index
    }

    pub fn fingerprinter(&self) -> &'a Fingerprinter {
        self.fingerprinter
    }

    pub fn traits(&self, a: FileId, b: FileId) -> Result<Traits, Error> {
        let (ra, rb) = (self.index.record(a), self.index.record(b));
        if a == b {
            return Err(Error::SelfComparison(ra.abs_path.clone()));
        }
        Ok(Traits {
            same_path: ra.rel_dir == rb.rel_dir,
            same_name: ra.file_name == rb.file_name,
            same_content: self.fingerprinter.content_equals(ra, rb)?,
        })
    }

    pub fn classify(&self, a: FileId, b: FileId) -> Result<ComparisonOutcome, Error> {
        let traits = self.traits(a, b)?;
        let kind = match RelationKind::from_traits(traits) {
            Some(kind) => kind,
            None => {
                let (ra, rb) = (self.index.record(a), self.index.record(b));
                if self.strict {
                    return Err(Error::UnclassifiedRelation {
                        a: ra.abs_path.clone(),
                        b: rb.abs_path.clone(),
                        same_path: traits.same_path,
                        same_name: traits.same_name,
                        same_content: traits.same_content,
                    });
                }
                warn!(
                    "Same directory but different name and content, recording as DISTINCT: {} <-> {}",
                    ra.abs_path.display(),
                    rb.abs_path.display()
                );
                RelationKind::Distinct
            }
        };
        Ok(ComparisonOutcome { a, b, traits, kind })
    }

    /// Classify `(a, b)` unless either ordering is already cached.
    pub fn compare_and_cache(
        &self,
        cache: &mut ComparisonCache,
        a: FileId,
        b: FileId,
    ) -> Result<ComparisonOutcome, Error> {
        let key = PairKey::new(a, b);
        if let Some(outcome) = cache.outcomes.get(&key) {
            trace!("Comparison already cached: {:?}", key);
            cache.hits += 1;
            return Ok(*outcome);
        }

        let outcome = self.classify(a, b)?;
        debug!(
            "{}: {} <-> {}",
            outcome.kind,
            self.index.record(a).abs_path.display(),
            self.index.record(b).abs_path.display()
        );
        cache.outcomes.insert(key, outcome);
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn write(root: &Path, rel: &str, content: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn test_pair_key_is_unordered() {
        let (a, b) = (FileId::new(1), FileId::new(7));
        assert_eq!(PairKey::new(a, b), PairKey::new(b, a));
    }

    #[test]
    fn test_self_comparison_is_rejected() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "a.md", "a");
        let index = TraitIndex::index(&[tmp.path().to_path_buf()]).unwrap();
        let fp = Fingerprinter::new();
        let classifier = Classifier::new(&index, &fp);

        let id = index.records()[0].id;
        assert!(matches!(
            classifier.classify(id, id),
            Err(Error::SelfComparison(_))
        ));
    }

    #[test]
    fn test_cache_hit_in_either_order() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "a/note.md", "same");
        write(tmp.path(), "b/note.md", "same");
        let index = TraitIndex::index(&[tmp.path().to_path_buf()]).unwrap();
        let fp = Fingerprinter::new();
        let classifier = Classifier::new(&index, &fp);
        let mut cache = ComparisonCache::new();
        let (a, b) = (index.records()[0].id, index.records()[1].id);

        let first = classifier.compare_and_cache(&mut cache, a, b).unwrap();
        let second = classifier.compare_and_cache(&mut cache, b, a).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.kind, RelationKind::ContentNameDup);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.hits(), 1);
        assert_eq!(fp.stats().full_reads, 2);
    }

    #[test]
    fn test_strict_mode_rejects_same_dir_only() {
        let tmp = tempdir().unwrap();
        write(tmp.path(), "notes/a.md", "aaaa");
        write(tmp.path(), "notes/b.md", "bbbb");
        let index = TraitIndex::index(&[tmp.path().to_path_buf()]).unwrap();
        let fp = Fingerprinter::new();
        let (a, b) = (index.records()[0].id, index.records()[1].id);

        let lenient = Classifier::new(&index, &fp).classify(a, b).unwrap();
        assert_eq!(lenient.kind, RelationKind::Distinct);

        let err = Classifier::new(&index, &fp)
            .strict(true)
            .classify(a, b)
            .unwrap_err();
        assert!(matches!(err, Error::UnclassifiedRelation { .. }));
        assert!(err.to_string().contains("a.md"));
    }
}
