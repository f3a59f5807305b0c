mod plan;
mod resolver;

pub use plan::{build_merge_plan, MergePlan};
pub use resolver::{
    AutoResolver, ResolutionDecision, ResolutionPolicy, ResolutionRequest, Resolver,
};
