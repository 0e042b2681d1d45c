//! Testing utilities for the docmig workspace
//!
//! Shared test helpers and fixtures.

#![allow(missing_docs)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use docmig_chain::{bump_version, MigrationChain, MigrationStep, Version};
use docmig_tree::{DocPath, Document};

pub fn doc(src: &str) -> Document {
    Document::parse(src).unwrap()
}

pub fn path(s: &str) -> DocPath {
    s.parse().unwrap()
}

pub fn v(s: &str) -> Version {
    s.parse().unwrap()
}

/// `0.0.{n}`
pub fn patch_version(n: u64) -> Version {
    Version::new(0, 0, n)
}

/// Steps applied by a [`recording_chain`], in order
pub type StepLog = Arc<Mutex<Vec<(Version, Version)>>>;

/// Chain `0.0.1 -> 0.0.2 -> ... -> 0.0.{steps + 1}` whose steps bump the
/// version and record themselves in the returned log
pub fn recording_chain(steps: u64) -> (MigrationChain, StepLog) {
    let log: StepLog = Arc::default();
    let chain = (1..=steps)
        .map(|n| {
            let (from, to) = (patch_version(n), patch_version(n + 1));
            let log = Arc::clone(&log);
            MigrationStep::new(
                from,
                to,
                format!("version: {from}\n"),
                format!("version: {to}\n"),
                move |mut user, _, _| {
                    log.lock().unwrap().push((from, to));
                    bump_version(&mut user, to)?;
                    Ok(user)
                },
            )
        })
        .collect();
    (MigrationChain::new(chain), log)
}

/// Write `contents` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

pub fn read_file(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}
