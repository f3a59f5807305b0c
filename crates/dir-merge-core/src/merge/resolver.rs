use std::path::PathBuf;

use crate::analysis::{RelationKind, TraitKey};
use crate::error::Error;
use crate::index::FileRecord;

/// What to keep from a group, by position in [`ResolutionRequest::members`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionDecision {
    KeepOne(usize),
    KeepAll,
    KeepSome(Vec<usize>),
    DeleteAll,
}

/// Hint for how a group should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionPolicy {
    /// Members differ in content: pick the version to keep.
    ChooseVersion,
    /// Members hold the same content: pick the locations to keep.
    ChooseLocations,
}

impl ResolutionPolicy {
    pub fn for_kind(kind: RelationKind) -> Self {
        if kind.traits().same_content {
            ResolutionPolicy::ChooseLocations
        } else {
            ResolutionPolicy::ChooseVersion
        }
    }
}

pub struct ResolutionRequest<'a> {
    pub kind: RelationKind,
    pub key: &'a TraitKey,
    pub policy: ResolutionPolicy,
    pub members: Vec<&'a FileRecord>,
    pub roots: &'a [PathBuf],
}

/// Decides which members of a relation group end up in the merge.
pub trait Resolver {
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<ResolutionDecision, Error>;
}

impl<F> Resolver for F
where
    F: FnMut(&ResolutionRequest<'_>) -> Result<ResolutionDecision, Error>,
{
    fn resolve(&mut self, request: &ResolutionRequest<'_>) -> Result<ResolutionDecision, Error> {
        self(request)
    }
}

/// Non-interactive strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AutoResolver {
    /// Keep the first member found.
    #[default]
    KeepFirst,
    /// Keep every member, renaming on collision.
    KeepAll,
}

impl Resolver for AutoResolver {
    fn resolve(&mut self, _request: &ResolutionRequest<'_>) -> Result<ResolutionDecision, Error> {
        Ok(match self {
            AutoResolver::KeepFirst => ResolutionDecision::KeepOne(0),
            AutoResolver::KeepAll => ResolutionDecision::KeepAll,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_follows_content() {
        assert_eq!(
            ResolutionPolicy::for_kind(RelationKind::PathNameDup),
            ResolutionPolicy::ChooseVersion
        );
        assert_eq!(
            ResolutionPolicy::for_kind(RelationKind::NameDup),
            ResolutionPolicy::ChooseVersion
        );
        for kind in [
            RelationKind::ContentNameDup,
            RelationKind::ContentPathDup,
            RelationKind::ContentDup,
        ] {
            assert_eq!(
                ResolutionPolicy::for_kind(kind),
                ResolutionPolicy::ChooseLocations
            );
        }
    }
}
