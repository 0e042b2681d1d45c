//! `docmig` command line
//!
//! Built with the clap builder API. [`run`] writes everything meant for the
//! user to the given writer and reports whether the command succeeded, so
//! the binary only sets up logging and maps the result to an exit code.

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use docmig_chain::{MigrationRegistry, Version};
use docmig_layer::{discover, FileReport, FileStatus, LayerError, MigrateOptions, MigrationLayer};
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::{default_registry, CONTEXT_FAMILY};

fn paths_arg() -> Arg {
    Arg::new("paths")
        .value_name("PATH")
        .required(true)
        .num_args(1..)
        .value_parser(value_parser!(PathBuf))
        .help("Documents to process; a directory contributes its .yaml/.yml files")
}

fn family_arg() -> Arg {
    Arg::new("family")
        .long("family")
        .default_value(CONTEXT_FAMILY)
        .help("Schema family of the documents")
}

fn target_arg() -> Arg {
    Arg::new("to")
        .long("to")
        .value_name("VERSION")
        .value_parser(value_parser!(Version))
        .help("Target version (default: newest)")
}

fn json_arg() -> Arg {
    Arg::new("json")
        .long("json")
        .action(ArgAction::SetTrue)
        .help("Output as JSON")
}

/// Argument definitions of the `docmig` binary
#[must_use]
pub fn command() -> Command {
    Command::new("docmig")
        .version(crate::VERSION)
        .about("Upgrade hand-edited configuration documents to newer schema versions")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Write logs to stderr as JSON lines"),
        )
        .arg(
            Arg::new("quiet")
                .short('q')
                .long("quiet")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log warnings and errors only"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Migrate documents in place")
                .arg(paths_arg())
                .arg(family_arg())
                .arg(target_arg())
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Run the migration without writing"),
                )
                .arg(
                    Arg::new("backup")
                        .long("backup")
                        .action(ArgAction::SetTrue)
                        .help("Keep the original as <file>.bak"),
                )
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Report documents that need migrating; fails if any do")
                .arg(paths_arg())
                .arg(family_arg())
                .arg(target_arg())
                .arg(json_arg()),
        )
        .subcommand(
            Command::new("versions")
                .about("List the schema versions of a family")
                .arg(family_arg()),
        )
        .subcommand(
            Command::new("template")
                .about("Print the default document of a schema version")
                .arg(family_arg())
                .arg(
                    Arg::new("schema-version")
                        .value_name("VERSION")
                        .value_parser(value_parser!(Version))
                        .help("Schema version (default: newest)"),
                ),
        )
}

/// Run a parsed command line against the built-in registry
///
/// Returns `Ok(false)` when the command ran but some document failed, or,
/// for `check`, needs migrating.
///
/// # Errors
/// Unknown family or version, or output that cannot be written
pub fn run(matches: &ArgMatches, out: &mut dyn Write) -> Result<bool> {
    let registry = Arc::new(default_registry().context("built-in migration chains are invalid")?);
    run_with(registry, matches, out)
}

/// [`run`] against a caller-supplied registry
///
/// # Errors
/// See [`run`]
pub fn run_with(registry: Arc<MigrationRegistry>, matches: &ArgMatches, out: &mut dyn Write) -> Result<bool> {
    match matches.subcommand() {
        Some(("migrate", args)) => {
            let options = MigrateOptions::new()
                .with_dry_run(args.get_flag("dry-run"))
                .with_backup(args.get_flag("backup"));
            migrate(registry, options, args, out, false)
        }
        Some(("check", args)) => {
            let options = MigrateOptions::new().with_dry_run(true);
            migrate(registry, options, args, out, true)
        }
        Some(("versions", args)) => versions(&registry, family(args), out),
        Some(("template", args)) => template(&registry, family(args), args, out),
        _ => Ok(false),
    }
}

fn family(args: &ArgMatches) -> &str {
    args.get_one::<String>("family")
        .map_or(CONTEXT_FAMILY, String::as_str)
}

/// Files named directly plus the documents of named directories
fn expand(args: &ArgMatches) -> (Vec<PathBuf>, Vec<LayerError>) {
    let mut files = Vec::new();
    let mut failed = Vec::new();
    for path in args.get_many::<PathBuf>("paths").into_iter().flatten() {
        if !path.is_dir() {
            files.push(path.clone());
            continue;
        }
        match discover(path) {
            Ok(found) if found.is_empty() => warn!(dir = %path.display(), "no documents found"),
            Ok(found) => files.extend(found),
            Err(err) => failed.push(err),
        }
    }
    (files, failed)
}

fn migrate(
    registry: Arc<MigrationRegistry>,
    mut options: MigrateOptions,
    args: &ArgMatches,
    out: &mut dyn Write,
    check: bool,
) -> Result<bool> {
    if let Some(target) = args.get_one::<Version>("to") {
        options = options.with_target(*target);
    }
    let family = family(args);
    registry.chain(family)?;

    let (files, failed) = expand(args);
    let layer = MigrationLayer::with_options(registry, options);
    let results: Vec<Result<FileReport, LayerError>> = failed
        .into_iter()
        .map(Err)
        .chain(layer.migrate_files(family, &files))
        .collect();

    let mut success = true;
    for result in &results {
        match result {
            Ok(report) if check && report.status != FileStatus::UpToDate => success = false,
            Ok(_) => {}
            Err(err) => {
                error!(path = %err.path().display(), "{err}");
                success = false;
            }
        }
    }

    if args.get_flag("json") {
        let rows = results.iter().map(json_row).collect::<Result<Vec<_>>>()?;
        serde_json::to_writer_pretty(&mut *out, &rows)?;
        writeln!(out)?;
    } else {
        for result in &results {
            match result {
                Ok(report) => writeln!(out, "{}", describe(report))?,
                Err(err) => writeln!(out, "error: {err}")?,
            }
        }
        writeln!(out, "{}", summary(&results))?;
    }
    Ok(success)
}

fn json_row(result: &Result<FileReport, LayerError>) -> Result<Value> {
    Ok(match result {
        Ok(report) => serde_json::to_value(report)?,
        Err(err) => json!({
            "path": err.path().display().to_string(),
            "error": err.to_string(),
        }),
    })
}

fn describe(report: &FileReport) -> String {
    let path = report.path.display();
    match report.status {
        FileStatus::UpToDate => format!("{path}: up to date at {}", report.to),
        FileStatus::DryRun => format!(
            "{path}: needs migrating {} -> {} ({} steps)",
            report.from, report.to, report.steps
        ),
        FileStatus::Migrated => {
            let mut line = format!(
                "{path}: migrated {} -> {} ({} steps)",
                report.from, report.to, report.steps
            );
            if let Some(backup) = &report.backup {
                line.push_str(&format!(", original kept at {}", backup.display()));
            }
            line
        }
    }
}

fn summary(results: &[Result<FileReport, LayerError>]) -> String {
    let count = |status: FileStatus| {
        results
            .iter()
            .filter(|r| matches!(r, Ok(report) if report.status == status))
            .count()
    };
    let failed = results.iter().filter(|r| r.is_err()).count();
    format!(
        "{} documents: {} migrated, {} pending, {} up to date, {} failed",
        results.len(),
        count(FileStatus::Migrated),
        count(FileStatus::DryRun),
        count(FileStatus::UpToDate),
        failed
    )
}

fn versions(registry: &MigrationRegistry, family: &str, out: &mut dyn Write) -> Result<bool> {
    let chain = registry.chain(family)?;
    let latest = chain.latest();
    for version in chain.versions() {
        if Some(version) == latest {
            writeln!(out, "{version} (latest)")?;
        } else {
            writeln!(out, "{version}")?;
        }
    }
    Ok(true)
}

fn template(
    registry: &MigrationRegistry,
    family: &str,
    args: &ArgMatches,
    out: &mut dyn Write,
) -> Result<bool> {
    let chain = registry.chain(family)?;
    let version = match args.get_one::<Version>("schema-version") {
        Some(version) => *version,
        None => registry.latest(family)?,
    };
    let text = chain
        .template(version)
        .with_context(|| format!("family '{family}' has no version {version}"))?;
    out.write_all(text.as_bytes())?;
    Ok(true)
}
