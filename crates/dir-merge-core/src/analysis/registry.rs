use std::collections::HashMap;
use tracing::{debug, info};

use super::classifier::{Classifier, ComparisonCache};
use super::relation::{RelationKind, TraitKey};
use crate::error::Error;
use crate::index::FileId;
use crate::progress::ProgressReporter;

/// Files sharing one relation under one key, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationGroup {
    pub kind: RelationKind,
    pub key: TraitKey,
    pub members: Vec<FileId>,
}

/// Relation groups for a run plus the files that relate to nothing.
#[derive(Debug, Default)]
pub struct RelationRegistry {
    groups: Vec<RelationGroup>,
    lookup: HashMap<(RelationKind, TraitKey), usize>,
    unique: Vec<FileId>,
}

impl RelationRegistry {
    /// Add both files to the group for `(kind, key)`, creating it if needed.
    pub(crate) fn insert(&mut self, kind: RelationKind, key: TraitKey, a: FileId, b: FileId) {
        let groups = &mut self.groups;
        let slot = *self
            .lookup
            .entry((kind, key.clone()))
            .or_insert_with(|| {
                groups.push(RelationGroup {
                    kind,
                    key,
                    members: Vec::new(),
                });
                groups.len() - 1
            });

        let members = &mut self.groups[slot].members;
        for id in [a, b] {
            if !members.contains(&id) {
                members.push(id);
            }
        }
    }

    /// All groups in discovery order.
    pub fn iter(&self) -> impl Iterator<Item = &RelationGroup> {
        self.groups.iter()
    }

    pub fn groups_of(&self, kind: RelationKind) -> impl Iterator<Item = &RelationGroup> {
        self.groups.iter().filter(move |group| group.kind == kind)
    }

    pub fn group(&self, kind: RelationKind, key: &TraitKey) -> Option<&RelationGroup> {
        self.lookup
            .get(&(kind, key.clone()))
            .map(|&slot| &self.groups[slot])
    }

    /// Files that share no relation with any other file.
    pub fn unique(&self) -> &[FileId] {
        &self.unique
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Group count per relational kind, in resolution order.
    pub fn kind_counts(&self) -> Vec<(RelationKind, usize)> {
        RelationKind::RELATIONAL
            .iter()
            .map(|&kind| (kind, self.groups_of(kind).count()))
            .collect()
    }
}

/// Compare every file with every other file sharing its name, then its
/// size, and group the relational outcomes.
pub fn find_relations(
    classifier: &Classifier<'_>,
    cache: &mut ComparisonCache,
    reporter: &dyn ProgressReporter,
) -> Result<RelationRegistry, Error> {
    let index = classifier.index();
    let mut registry = RelationRegistry::default();
    let total = index.len();
    reporter.on_classify_start(total);

    for (done, record) in index.records().iter().enumerate() {
        debug!("Analyzing {}", record.abs_path.display());
        let mut related = false;

        let candidate_sets = [
            ("name", index.same_name(&record.file_name)),
            ("size", index.same_size(record.size)),
        ];
        for (trait_name, candidates) in candidate_sets {
            if candidates.len() < 2 {
                debug!("No same {} candidates", trait_name);
                continue;
            }
            for &other in candidates.iter().filter(|&&other| other != record.id) {
                let outcome = classifier.compare_and_cache(cache, record.id, other)?;
                if !outcome.kind.is_relational() {
                    continue;
                }
                related = true;
                let anchor = index.record(outcome.a);
                if let Some(key) = outcome.kind.key_for(anchor, classifier.fingerprinter())? {
                    registry.insert(outcome.kind, key, outcome.a, outcome.b);
                }
            }
        }

        if !related {
            debug!("Unique file: {}", record.abs_path.display());
            registry.unique.push(record.id);
        }
        reporter.on_classify_progress(done + 1, total);
    }

    info!(
        "{} relation groups, {} unique files, {} pairs classified",
        registry.len(),
        registry.unique.len(),
        cache.len()
    );
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn name_key(name: &str) -> TraitKey {
        TraitKey {
            name: Some(name.into()),
            dir: None,
            content: None,
        }
    }

    #[test]
    fn test_insert_is_idempotent_and_ordered() {
        let mut registry = RelationRegistry::default();
        let (a, b, c) = (FileId::new(0), FileId::new(4), FileId::new(2));

        registry.insert(RelationKind::NameDup, name_key("x.md"), a, b);
        registry.insert(RelationKind::NameDup, name_key("x.md"), b, a);
        registry.insert(RelationKind::NameDup, name_key("x.md"), a, c);
        registry.insert(RelationKind::NameDup, name_key("y.md"), b, c);

        assert_eq!(registry.len(), 2);
        let group = registry
            .group(RelationKind::NameDup, &name_key("x.md"))
            .unwrap();
        assert_eq!(group.members, vec![a, b, c]);
        assert!(registry
            .group(RelationKind::PathNameDup, &name_key("x.md"))
            .is_none());
    }

    #[test]
    fn test_kind_counts_cover_every_relational_kind() {
        let mut registry = RelationRegistry::default();
        registry.insert(
            RelationKind::NameDup,
            name_key("x.md"),
            FileId::new(0),
            FileId::new(1),
        );
        let counts = registry.kind_counts();
        assert_eq!(counts.len(), RelationKind::RELATIONAL.len());
        assert_eq!(
            counts.iter().find(|(k, _)| *k == RelationKind::NameDup),
            Some(&(RelationKind::NameDup, 1))
        );
        assert_eq!(counts.iter().map(|(_, n)| n).sum::<usize>(), 1);
    }
}
