use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::resolver::{ResolutionDecision, ResolutionPolicy, ResolutionRequest, Resolver};
use crate::analysis::{RelationGroup, RelationKind, RelationRegistry};
use crate::error::Error;
use crate::index::{FileId, FileRecord, TraitIndex};

/// Output-relative path → files to write there.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MergePlan {
    entries: BTreeMap<PathBuf, Vec<FileId>>,
}

impl MergePlan {
    pub fn get(&self, path: impl AsRef<Path>) -> Option<&[FileId]> {
        self.entries.get(path.as_ref()).map(Vec::as_slice)
    }

    /// Entries in output-path order.
    pub fn iter(&self) -> impl Iterator<Item = (&Path, &[FileId])> {
        self.entries
            .iter()
            .map(|(path, ids)| (path.as_path(), ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Output path chosen for `id`, if it is part of the merge.
    pub fn output_of(&self, id: FileId) -> Option<&Path> {
        self.iter()
            .find(|(_, ids)| ids.contains(&id))
            .map(|(path, _)| path)
    }
}

struct PlanBuilder<'a> {
    index: &'a TraitIndex,
    entries: BTreeMap<PathBuf, Vec<FileId>>,
    placed: HashMap<FileId, PathBuf>,
    rejected: HashSet<FileId>,
    /// Redundant MATCH copies → the member kept in their place.
    aliases: HashMap<FileId, FileId>,
    /// Every indexed relative path; renames never take one of these.
    reserved: HashSet<&'a Path>,
}

impl<'a> PlanBuilder<'a> {
    fn new(index: &'a TraitIndex) -> Self {
        Self {
            index,
            entries: BTreeMap::new(),
            placed: HashMap::new(),
            rejected: HashSet::new(),
            aliases: HashMap::new(),
            reserved: index.records().iter().map(|r| r.rel_path.as_path()).collect(),
        }
    }

    fn record(&self, id: FileId) -> &'a FileRecord {
        self.index.record(id)
    }

    fn is_free(&self, path: &Path, id: FileId) -> bool {
        self.entries
            .get(path)
            .map_or(true, |ids| ids.iter().all(|&other| other == id))
    }

    /// Place `id` at its own relative path. A file is placed at most once.
    fn place(&mut self, id: FileId) -> Result<(), Error> {
        if self.placed.contains_key(&id) {
            return Ok(());
        }
        let record = self.record(id);
        let path = record.rel_path.clone();
        if let Some(&existing) = self.entries.get(&path).and_then(|ids| ids.first()) {
            return Err(Error::AmbiguousMergeTarget {
                path,
                existing: self.record(existing).abs_path.clone(),
                incoming: record.abs_path.clone(),
            });
        }
        self.insert(id, path);
        Ok(())
    }

    /// Move `id` back to its own relative path if an earlier decision
    /// placed it under a renamed path.
    fn restore(&mut self, id: FileId) -> Result<(), Error> {
        let rel_path = &self.record(id).rel_path;
        if self.placed.get(&id).is_some_and(|path| path != rel_path) {
            self.unplace(id);
        }
        self.place(id)
    }

    /// Place `id` at its own relative path, or at `stem_N.ext` if that path is
    /// taken by another file.
    fn place_renamed(&mut self, id: FileId) {
        if self.placed.contains_key(&id) {
            return;
        }
        let record = self.record(id);
        let mut path = record.rel_path.clone();
        if !self.is_free(&path, id) {
            path = (1..)
                .map(|n| renamed(&record.rel_path, n))
                .find(|candidate| {
                    self.is_free(candidate, id) && !self.reserved.contains(candidate.as_path())
                })
                .unwrap_or(path);
            debug!(
                "Renaming {} to {}",
                record.abs_path.display(),
                path.display()
            );
        }
        self.insert(id, path);
    }

    fn insert(&mut self, id: FileId, path: PathBuf) {
        self.entries.entry(path.clone()).or_default().push(id);
        self.placed.insert(id, path);
    }

    /// Drop `id` from the merge, undoing any earlier placement.
    fn reject(&mut self, id: FileId) {
        self.rejected.insert(id);
        self.unplace(id);
    }

    fn unplace(&mut self, id: FileId) {
        if let Some(path) = self.placed.remove(&id) {
            if let Some(ids) = self.entries.get_mut(&path) {
                ids.retain(|&other| other != id);
                if ids.is_empty() {
                    self.entries.remove(&path);
                }
            }
        }
    }

    /// Group members with MATCH copies folded into their representative,
    /// minus anything already rejected.
    fn candidates(&self, group: &RelationGroup) -> Vec<FileId> {
        let mut members = Vec::with_capacity(group.members.len());
        for id in &group.members {
            let id = self.aliases.get(id).copied().unwrap_or(*id);
            if !self.rejected.contains(&id) && !members.contains(&id) {
                members.push(id);
            }
        }
        members
    }

    fn resolve_group(
        &mut self,
        group: &RelationGroup,
        resolver: &mut dyn Resolver,
    ) -> Result<(), Error> {
        let members = self.candidates(group);
        match members.as_slice() {
            [] => {
                debug!("Skipping {} {}: every member already dropped", group.kind, group.key);
                return Ok(());
            }
            [only] => return self.place(*only),
            _ => {}
        }

        let request = ResolutionRequest {
            kind: group.kind,
            key: &group.key,
            policy: ResolutionPolicy::for_kind(group.kind),
            members: members.iter().map(|&id| self.record(id)).collect(),
            roots: self.index.roots(),
        };
        let decision = resolver.resolve(&request)?;
        info!("Resolving {} {}: {:?}", group.kind, group.key, decision);

        let check = |index: usize| {
            if index < members.len() {
                Ok(index)
            } else {
                Err(Error::InvalidDecision {
                    kind: group.kind,
                    index,
                    members: members.len(),
                })
            }
        };

        let kept: Vec<usize> = match &decision {
            ResolutionDecision::KeepOne(i) => vec![check(*i)?],
            ResolutionDecision::KeepAll => (0..members.len()).collect(),
            ResolutionDecision::KeepSome(indices) => indices
                .iter()
                .map(|&i| check(i))
                .collect::<Result<_, _>>()?,
            ResolutionDecision::DeleteAll => Vec::new(),
        };

        for (pos, &id) in members.iter().enumerate() {
            if !kept.contains(&pos) {
                self.reject(id);
            }
        }
        match decision {
            ResolutionDecision::KeepOne(_) => self.restore(members[kept[0]])?,
            _ => {
                for pos in kept {
                    self.place_renamed(members[pos]);
                }
            }
        }
        Ok(())
    }
}

fn renamed(rel_path: &Path, n: usize) -> PathBuf {
    let stem = rel_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match rel_path.extension() {
        Some(ext) => format!("{}_{}.{}", stem, n, ext.to_string_lossy()),
        None => format!("{}_{}", stem, n),
    };
    rel_path.with_file_name(name)
}

/// Resolve every relation group and lay out the merged tree.
///
/// MATCH groups need no decision: their first member stands in for the
/// rest. The other kinds are resolved in [`RelationKind::RELATIONAL`] order,
/// and each decision applies to later groups: rejected files are not offered
/// again. Unique files are always kept.
pub fn build_merge_plan(
    index: &TraitIndex,
    registry: &RelationRegistry,
    resolver: &mut dyn Resolver,
) -> Result<MergePlan, Error> {
    let mut builder = PlanBuilder::new(index);

    let mut representatives = Vec::new();
    for group in registry.groups_of(RelationKind::Match) {
        let Some((&first, copies)) = group.members.split_first() else {
            continue;
        };
        debug!(
            "MATCH {}: keeping {}, {} redundant copies",
            group.key,
            index.record(first).abs_path.display(),
            copies.len()
        );
        for &copy in copies {
            builder.aliases.insert(copy, first);
        }
        representatives.push(first);
    }

    for kind in RelationKind::RELATIONAL
        .into_iter()
        .filter(|&kind| kind != RelationKind::Match)
    {
        for group in registry.groups_of(kind) {
            builder.resolve_group(group, resolver)?;
        }
    }

    for id in representatives {
        if !builder.rejected.contains(&id) {
            builder.place(id)?;
        }
    }

    for &id in registry.unique() {
        builder.place(id)?;
    }

    info!(
        "Merge plan: {} files, {} dropped",
        builder.placed.len(),
        index.len() - builder.placed.len()
    );
    Ok(MergePlan {
        entries: builder.entries,
    })
}
