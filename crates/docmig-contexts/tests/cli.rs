//! `docmig` subcommands against real files

use std::path::Path;

use docmig_contexts::{command, run, template, V0_0_1, V0_0_2, V0_0_4};
use docmig_layer::backup_path;
use docmig_test_utils::{read_file, write_file};
use pretty_assertions::assert_eq;
use tempfile::tempdir;

/// Run `docmig <args>`; returns (success, stdout)
fn docmig(args: &[&str]) -> (bool, String) {
    let matches = command()
        .try_get_matches_from(std::iter::once("docmig").chain(args.iter().copied()))
        .unwrap();
    let mut out = Vec::new();
    let ok = run(&matches, &mut out).unwrap();
    (ok, String::from_utf8(out).unwrap())
}

fn arg(path: &Path) -> &str {
    path.to_str().unwrap()
}

#[test]
fn migrate_directory_in_place_with_backup() {
    let dir = tempdir().unwrap();
    let old = write_file(dir.path(), "devnet.yaml", template(V0_0_1).unwrap());
    let current = write_file(dir.path(), "current.yml", template(V0_0_4).unwrap());
    write_file(dir.path(), "README.md", "not a document");

    let (ok, out) = docmig(&["migrate", arg(dir.path()), "--backup"]);

    assert!(ok);
    assert_eq!(read_file(&old), template(V0_0_4).unwrap());
    assert_eq!(read_file(&backup_path(&old)), template(V0_0_1).unwrap());
    assert_eq!(read_file(&current), template(V0_0_4).unwrap());
    assert!(!backup_path(&current).exists());

    assert!(out.contains("current.yml: up to date at 0.0.4"), "{out}");
    assert!(out.contains("devnet.yaml: migrated 0.0.1 -> 0.0.4 (3 steps), original kept at"), "{out}");
    assert!(out.ends_with("2 documents: 1 migrated, 0 pending, 1 up to date, 0 failed\n"), "{out}");
}

#[test]
fn check_fails_until_migrated() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "devnet.yaml", template(V0_0_2).unwrap());

    let (ok, out) = docmig(&["check", arg(&file)]);
    assert!(!ok);
    assert!(out.contains("needs migrating 0.0.2 -> 0.0.4 (2 steps)"), "{out}");
    assert_eq!(read_file(&file), template(V0_0_2).unwrap());

    let (ok, _) = docmig(&["migrate", arg(&file)]);
    assert!(ok);
    let (ok, _) = docmig(&["check", arg(&file)]);
    assert!(ok);
}

#[test]
fn dry_run_and_explicit_target() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "devnet.yaml", template(V0_0_1).unwrap());

    let (ok, _) = docmig(&["migrate", "--dry-run", arg(&file)]);
    assert!(ok);
    assert_eq!(read_file(&file), template(V0_0_1).unwrap());

    let (ok, out) = docmig(&["migrate", "--to", "0.0.2", arg(&file)]);
    assert!(ok);
    assert!(out.contains("migrated 0.0.1 -> 0.0.2 (1 steps)"), "{out}");
    assert_eq!(read_file(&file), template(V0_0_2).unwrap());
}

#[test]
fn failures_are_reported_per_file_and_in_json() {
    let dir = tempdir().unwrap();
    let good = write_file(dir.path(), "good.yaml", template(V0_0_1).unwrap());
    let bad = write_file(dir.path(), "bad.yaml", "version: 0.0.2\nname: devnet\n");
    let missing = dir.path().join("missing.yaml");

    let (ok, out) = docmig(&["migrate", "--json", arg(&good), arg(&bad), arg(&missing)]);
    assert!(!ok);

    let rows: serde_json::Value = serde_json::from_str(&out).unwrap();
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["status"], "migrated");
    assert_eq!(rows[0]["steps"], 3);
    assert!(rows[1]["error"]
        .as_str()
        .unwrap()
        .contains("migration step 0.0.2 -> 0.0.3 failed"));
    assert!(rows[2]["error"].as_str().unwrap().contains("missing.yaml"));

    assert_eq!(read_file(&good), template(V0_0_4).unwrap());
    assert_eq!(read_file(&bad), "version: 0.0.2\nname: devnet\n");
}

#[test]
fn template_prints_the_requested_default() {
    assert_eq!(docmig(&["template", "0.0.2"]).1, template(V0_0_2).unwrap());
    assert_eq!(docmig(&["template"]).1, template(V0_0_4).unwrap());

    let matches = command()
        .try_get_matches_from(["docmig", "template", "9.9.9"])
        .unwrap();
    let err = run(&matches, &mut Vec::new()).unwrap_err();
    assert!(err.to_string().contains("no version 9.9.9"), "{err}");
}
