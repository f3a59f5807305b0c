mod classifier;
mod registry;
mod relation;

pub use classifier::{Classifier, ComparisonCache, ComparisonOutcome, PairKey};
pub use registry::{find_relations, RelationGroup, RelationRegistry};
pub use relation::{RelationKind, TraitKey, Traits};
