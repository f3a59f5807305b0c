//! Text, CSV and TOML views of a run, written for the operator to review.

use chrono::Local;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::analysis::{RelationKind, RelationRegistry};
use crate::error::Error;
use crate::index::{FileId, TraitIndex};
use crate::merge::MergePlan;

pub fn timestamp() -> String {
    Local::now().format("%Y-%m-%d_%H-%M-%S").to_string()
}

/// Write `contents` to `<output_dir>/<name>/<name>-<stamp>.txt`.
fn write_timestamped(output_dir: &Path, name: &str, stamp: &str, contents: &str) -> Result<PathBuf, Error> {
    let path = output_dir.join(name).join(format!("{}-{}.txt", name, stamp));
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, contents)?;
    info!("Wrote {}", path.display());
    Ok(path)
}

fn member_line(index: &TraitIndex, id: FileId) -> String {
    let record = index.record(id);
    format!(
        "\t{} ({}, {} bytes) [{}]\n",
        record.name,
        record.rel_path.display(),
        record.size,
        index.root_of(id).display()
    )
}

pub fn format_name_index(index: &TraitIndex) -> String {
    let mut out = String::from("NAME_INDEX\n");
    for (name, ids) in index.name_groups() {
        out.push_str(&format!("{}:\n", name.to_string_lossy()));
        for &id in ids {
            out.push_str(&member_line(index, id));
        }
    }
    out
}

pub fn format_size_index(index: &TraitIndex) -> String {
    let mut out = String::from("SIZE_INDEX\n");
    for (size, ids) in index.size_groups() {
        out.push_str(&format!("{}:\n", size));
        for &id in ids {
            out.push_str(&member_line(index, id));
        }
    }
    out
}

/// One kind's groups: each key followed by its members.
pub fn format_relation_report(
    index: &TraitIndex,
    registry: &RelationRegistry,
    kind: RelationKind,
) -> String {
    let mut out = format!("{}\n", kind);
    if kind == RelationKind::Unique {
        for &id in registry.unique() {
            out.push_str(&member_line(index, id));
        }
        return out;
    }
    for group in registry.groups_of(kind) {
        out.push_str(&format!("{}:\n", group.key));
        for &id in &group.members {
            out.push_str(&member_line(index, id));
        }
    }
    out
}

pub fn write_trait_index_reports(index: &TraitIndex, output_dir: &Path) -> Result<Vec<PathBuf>, Error> {
    let stamp = timestamp();
    Ok(vec![
        write_timestamped(output_dir, "NAME_INDEX", &stamp, &format_name_index(index))?,
        write_timestamped(output_dir, "SIZE_INDEX", &stamp, &format_size_index(index))?,
    ])
}

/// One report per relational kind plus one for unique files.
pub fn write_relation_reports(
    index: &TraitIndex,
    registry: &RelationRegistry,
    output_dir: &Path,
) -> Result<Vec<PathBuf>, Error> {
    let stamp = timestamp();
    RelationKind::RELATIONAL
        .into_iter()
        .chain([RelationKind::Unique])
        .map(|kind| {
            let report = format_relation_report(index, registry, kind);
            write_timestamped(output_dir, kind.as_str(), &stamp, &report)
        })
        .collect()
}

#[derive(Serialize)]
struct RelationRow<'a> {
    kind: RelationKind,
    key: String,
    name: &'a str,
    rel_path: String,
    root: String,
    size: u64,
}

/// Flat CSV of every group member, unique files last with an empty key.
pub fn write_relations_csv(
    index: &TraitIndex,
    registry: &RelationRegistry,
    path: &Path,
) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut writer = csv::Writer::from_path(path)?;

    let grouped = registry
        .iter()
        .flat_map(|group| group.members.iter().map(move |&id| (group.kind, group.key.to_string(), id)));
    let unique = registry
        .unique()
        .iter()
        .map(|&id| (RelationKind::Unique, String::new(), id));

    for (kind, key, id) in grouped.chain(unique) {
        let record = index.record(id);
        writer.serialize(RelationRow {
            kind,
            key,
            name: &record.name,
            rel_path: record.rel_path.to_string_lossy().into_owned(),
            root: index.root_of(id).to_string_lossy().into_owned(),
            size: record.size,
        })?;
    }
    writer.flush()?;
    info!("Wrote {}", path.display());
    Ok(())
}

#[derive(Serialize)]
struct PlanFile {
    entry: Vec<PlanEntry>,
}

#[derive(Serialize)]
struct PlanEntry {
    output: String,
    sources: Vec<String>,
}

pub fn format_merge_plan(index: &TraitIndex, plan: &MergePlan) -> Result<String, Error> {
    let file = PlanFile {
        entry: plan
            .iter()
            .map(|(path, ids)| PlanEntry {
                output: path.to_string_lossy().into_owned(),
                sources: ids
                    .iter()
                    .map(|&id| index.record(id).abs_path.to_string_lossy().into_owned())
                    .collect(),
            })
            .collect(),
    };
    Ok(toml::to_string(&file)?)
}

pub fn write_merge_plan(index: &TraitIndex, plan: &MergePlan, path: &Path) -> Result<(), Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, format_merge_plan(index, plan)?)?;
    info!("Wrote {}", path.display());
    Ok(())
}
