use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use dir_merge_core::index::TraitIndex;
use dir_merge_core::merge::MergePlan;

/// Copy every planned file into `output`, which must not exist yet.
/// Returns the number of files copied.
pub fn materialize(index: &TraitIndex, plan: &MergePlan, output: &Path) -> Result<usize> {
    if output.exists() {
        bail!(
            "Output directory {} already exists; refusing to merge into it",
            output.display()
        );
    }
    fs::create_dir_all(output)
        .with_context(|| format!("Could not create {}", output.display()))?;

    let mut copied = 0;
    for (rel_path, ids) in plan.iter() {
        let [id] = ids else {
            bail!(
                "{} has {} sources in the merge plan",
                rel_path.display(),
                ids.len()
            );
        };
        let source = &index.record(*id).abs_path;
        let target = output.join(rel_path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Could not create {}", parent.display()))?;
        }
        fs::copy(source, &target).with_context(|| {
            format!("Could not copy {} to {}", source.display(), target.display())
        })?;
        debug!("Copied {} to {}", source.display(), target.display());
        copied += 1;
    }
    Ok(copied)
}
