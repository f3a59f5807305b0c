use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use dir_merge_core::analysis::RelationKind;
use dir_merge_core::index::{FileId, TraitIndex};
use dir_merge_core::merge::{
    AutoResolver, ResolutionDecision, ResolutionPolicy, ResolutionRequest,
};
use dir_merge_core::{Analysis, AppConfig, Error, MergeEngine, SilentReporter};

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

/// One root per entry of `trees`, named r0, r1, ...
fn analyze(trees: &[&[(&str, &str)]]) -> (TempDir, Analysis) {
    let tmp = tempdir().unwrap();
    let mut roots: Vec<PathBuf> = Vec::new();
    for (i, files) in trees.iter().enumerate() {
        let root = tmp.path().join(format!("r{}", i));
        fs::create_dir_all(&root).unwrap();
        for (rel, content) in files.iter() {
            write(&root, rel, content);
        }
        roots.push(root);
    }
    let analysis = MergeEngine::new(AppConfig::default())
        .analyze(&roots, &SilentReporter)
        .unwrap();
    (tmp, analysis)
}

fn id_of(index: &TraitIndex, root: usize, rel: &str) -> FileId {
    index
        .records()
        .iter()
        .find(|r| r.root == root && r.rel_path == Path::new(rel))
        .map(|r| r.id)
        .unwrap_or_else(|| panic!("{rel} not indexed under root {root}"))
}

fn never(_: &ResolutionRequest<'_>) -> Result<ResolutionDecision, Error> {
    panic!("resolver should not be called");
}

fn always(
    decision: ResolutionDecision,
) -> impl FnMut(&ResolutionRequest<'_>) -> Result<ResolutionDecision, Error> {
    move |_| Ok(decision.clone())
}

#[test]
fn test_match_group_resolves_without_resolver() {
    let tree: &[(&str, &str)] = &[("notes/x.md", "identical")];
    let (_tmp, analysis) = analyze(&[tree, tree, tree]);

    let group = analysis
        .registry
        .groups_of(RelationKind::Match)
        .next()
        .unwrap();
    assert_eq!(group.members.len(), 3);

    let plan = analysis.merge_plan(&mut never).unwrap();
    assert_eq!(plan.len(), 1);
    assert_eq!(
        plan.get("notes/x.md"),
        Some(&[id_of(&analysis.index, 0, "notes/x.md")][..])
    );
}

#[test]
fn test_end_to_end_path_name_dup_keep_one() {
    let (_tmp, analysis) = analyze(&[&[("notes/todo.md", "X")], &[("notes/todo.md", "Y")]]);
    let file_a = id_of(&analysis.index, 0, "notes/todo.md");

    let groups: Vec<_> = analysis.registry.iter().collect();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].kind, RelationKind::PathNameDup);
    assert_eq!(groups[0].key.name.as_deref(), Some(OsStr::new("todo.md")));
    assert_eq!(groups[0].key.dir.as_deref(), Some(Path::new("notes")));

    let mut calls = 0;
    let mut resolver = |request: &ResolutionRequest<'_>| -> Result<ResolutionDecision, Error> {
        calls += 1;
        assert_eq!(request.kind, RelationKind::PathNameDup);
        assert_eq!(request.policy, ResolutionPolicy::ChooseVersion);
        assert_eq!(request.members.len(), 2);
        assert_eq!(request.members[0].id, file_a);
        assert_eq!(request.roots.len(), 2);
        Ok(ResolutionDecision::KeepOne(0))
    };
    let plan = analysis.merge_plan(&mut resolver).unwrap();

    assert_eq!(calls, 1);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.get("notes/todo.md"), Some(&[file_a][..]));
}

#[test]
fn test_keep_all_name_dups_do_not_collide() {
    let (_tmp, analysis) = analyze(&[&[("a/note.md", "alpha"), ("b/note.md", "bravo two")]]);

    let plan = analysis.merge_plan(&mut AutoResolver::KeepAll).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(
        plan.get("a/note.md"),
        Some(&[id_of(&analysis.index, 0, "a/note.md")][..])
    );
    assert_eq!(
        plan.get("b/note.md"),
        Some(&[id_of(&analysis.index, 0, "b/note.md")][..])
    );
    assert!(plan.iter().all(|(_, ids)| ids.len() == 1));
}

#[test]
fn test_keep_all_renames_same_path_conflict() {
    let (_tmp, analysis) = analyze(&[&[("notes/todo.md", "X")], &[("notes/todo.md", "Y")]]);

    let plan = analysis.merge_plan(&mut AutoResolver::KeepAll).unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(
        plan.get("notes/todo.md"),
        Some(&[id_of(&analysis.index, 0, "notes/todo.md")][..])
    );
    assert_eq!(
        plan.get("notes/todo_1.md"),
        Some(&[id_of(&analysis.index, 1, "notes/todo.md")][..])
    );
}

#[test]
fn test_rename_skips_paths_taken_by_indexed_files() {
    let (_tmp, analysis) = analyze(&[
        &[("notes/todo.md", "X"), ("notes/todo_1.md", "already here")],
        &[("notes/todo.md", "Y")],
    ]);

    let plan = analysis.merge_plan(&mut AutoResolver::KeepAll).unwrap();

    assert_eq!(plan.len(), 3);
    assert_eq!(
        plan.get("notes/todo_1.md"),
        Some(&[id_of(&analysis.index, 0, "notes/todo_1.md")][..])
    );
    assert_eq!(
        plan.get("notes/todo_2.md"),
        Some(&[id_of(&analysis.index, 1, "notes/todo.md")][..])
    );
}

#[test]
fn test_delete_all_drops_group() {
    let (_tmp, analysis) = analyze(&[
        &[("notes/todo.md", "X"), ("keep.md", "a unique file")],
        &[("notes/todo.md", "Y")],
    ]);

    let plan = analysis
        .merge_plan(&mut always(ResolutionDecision::DeleteAll))
        .unwrap();

    assert_eq!(plan.len(), 1);
    assert!(plan.get("keep.md").is_some());
    assert!(plan.get("notes/todo.md").is_none());
}

#[test]
fn test_keep_some_with_rename() {
    let (_tmp, analysis) = analyze(&[
        &[("notes/todo.md", "1")],
        &[("notes/todo.md", "22")],
        &[("notes/todo.md", "333")],
    ]);

    let plan = analysis
        .merge_plan(&mut always(ResolutionDecision::KeepSome(vec![0, 2])))
        .unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(
        plan.get("notes/todo.md"),
        Some(&[id_of(&analysis.index, 0, "notes/todo.md")][..])
    );
    assert_eq!(
        plan.get("notes/todo_1.md"),
        Some(&[id_of(&analysis.index, 2, "notes/todo.md")][..])
    );
    assert_eq!(plan.output_of(id_of(&analysis.index, 1, "notes/todo.md")), None);
}

#[test]
fn test_rejected_files_are_not_offered_again() {
    // a/notes/t.md vs b/notes/t.md: PATH_NAME_DUP
    // both vs b/other/t.md: NAME_DUP
    let (_tmp, analysis) = analyze(&[
        &[("notes/t.md", "1")],
        &[("notes/t.md", "22"), ("other/t.md", "333")],
    ]);
    let a = id_of(&analysis.index, 0, "notes/t.md");
    let b = id_of(&analysis.index, 1, "notes/t.md");
    let c = id_of(&analysis.index, 1, "other/t.md");

    let mut seen = Vec::new();
    let mut resolver = |request: &ResolutionRequest<'_>| -> Result<ResolutionDecision, Error> {
        let members: Vec<FileId> = request.members.iter().map(|r| r.id).collect();
        seen.push((request.kind, members));
        Ok(match request.kind {
            RelationKind::PathNameDup => ResolutionDecision::KeepOne(0),
            _ => ResolutionDecision::KeepOne(1),
        })
    };
    let plan = analysis.merge_plan(&mut resolver).unwrap();

    assert_eq!(
        seen,
        vec![
            (RelationKind::PathNameDup, vec![a, b]),
            (RelationKind::NameDup, vec![a, c]),
        ]
    );
    // The later decision drops a again.
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.get("other/t.md"), Some(&[c][..]));
}

#[test]
fn test_keep_one_moves_renamed_file_back_to_its_own_path() {
    // PATH_NAME_DUP kept both notes/t.md copies, so r1's went to t_1.md.
    // NAME_DUP then keeps only r1's copy, which must return to notes/t.md.
    let (_tmp, analysis) = analyze(&[
        &[("notes/t.md", "1")],
        &[("notes/t.md", "22"), ("other/t.md", "333")],
    ]);
    let b = id_of(&analysis.index, 1, "notes/t.md");

    let mut resolver = |request: &ResolutionRequest<'_>| -> Result<ResolutionDecision, Error> {
        Ok(match request.kind {
            RelationKind::PathNameDup => ResolutionDecision::KeepAll,
            _ => {
                let pos = request.members.iter().position(|r| r.id == b).unwrap();
                ResolutionDecision::KeepOne(pos)
            }
        })
    };
    let plan = analysis.merge_plan(&mut resolver).unwrap();

    assert_eq!(plan.len(), 1);
    assert_eq!(plan.get("notes/t.md"), Some(&[b][..]));
    assert!(plan.get("notes/t_1.md").is_none());
}

#[test]
fn test_match_copies_are_folded_into_later_groups() {
    // r0 and r1 hold identical notes/t.md; r2 has a different version.
    let (_tmp, analysis) = analyze(&[
        &[("notes/t.md", "same")],
        &[("notes/t.md", "same")],
        &[("notes/t.md", "different")],
    ]);
    let a = id_of(&analysis.index, 0, "notes/t.md");
    let c = id_of(&analysis.index, 2, "notes/t.md");

    let mut offered = Vec::new();
    let mut resolver = |request: &ResolutionRequest<'_>| -> Result<ResolutionDecision, Error> {
        offered.push(request.members.iter().map(|r| r.id).collect::<Vec<_>>());
        Ok(ResolutionDecision::KeepOne(1))
    };
    let plan = analysis.merge_plan(&mut resolver).unwrap();

    assert_eq!(offered, vec![vec![a, c]]);
    assert_eq!(plan.len(), 1);
    assert_eq!(plan.get("notes/t.md"), Some(&[c][..]));
}

#[test]
fn test_out_of_range_decision_keeps_registry_usable() {
    let (tmp, analysis) = analyze(&[&[("notes/todo.md", "X")], &[("notes/todo.md", "Y")]]);

    let err = analysis
        .merge_plan(&mut always(ResolutionDecision::KeepOne(5)))
        .unwrap_err();
    match err {
        Error::InvalidDecision {
            kind,
            index,
            members,
        } => {
            assert_eq!(kind, RelationKind::PathNameDup);
            assert_eq!(index, 5);
            assert_eq!(members, 2);
        }
        other => panic!("unexpected error: {other}"),
    }

    let written = analysis.write_reports(&tmp.path().join("reports")).unwrap();
    assert!(!written.is_empty());
}

#[test]
fn test_resolver_error_aborts_merge() {
    let (_tmp, analysis) = analyze(&[&[("notes/todo.md", "X")], &[("notes/todo.md", "Y")]]);

    let mut resolver = |_: &ResolutionRequest<'_>| -> Result<ResolutionDecision, Error> {
        Err(Error::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "stdin closed",
        )))
    };
    assert!(matches!(
        analysis.merge_plan(&mut resolver),
        Err(Error::Io(_))
    ));
}

#[test]
fn test_keep_first_strategy_places_every_unique_file() {
    let (_tmp, analysis) = analyze(&[
        &[("a.md", "1"), ("dir/b.md", "22"), ("notes/todo.md", "X")],
        &[("c.md", "4444"), ("notes/todo.md", "Y")],
    ]);

    let plan = analysis.merge_plan(&mut AutoResolver::KeepFirst).unwrap();

    let outputs: Vec<&Path> = plan.iter().map(|(path, _)| path).collect();
    assert_eq!(
        outputs,
        vec![
            Path::new("a.md"),
            Path::new("c.md"),
            Path::new("dir/b.md"),
            Path::new("notes/todo.md"),
        ]
    );
}
