//! Migration Layer
//!
//! The file boundary for document migrations: size-limited reads, chain
//! runs on in-memory copies, and atomic write-back.
//!
//! # Core Concepts
//!
//! - [`MigrationLayer`]: migrates files with a shared [`MigrationRegistry`]
//! - [`MigrateOptions`]: target version, dry run, backups, size limit
//! - [`FileReport`]: per-file outcome with before/after fingerprints
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use docmig_layer::{MigrateOptions, MigrationLayer};
//!
//! let layer = MigrationLayer::with_options(Arc::new(registry), MigrateOptions::new().with_backup(true));
//! let report = layer.migrate_file("context", "contexts/devnet.yaml")?;
//! println!("{} -> {} ({:?})", report.from, report.to, report.status);
//! ```
//!
//! [`MigrationRegistry`]: docmig_chain::MigrationRegistry

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod error;
mod layer;
mod options;

pub use error::LayerError;
pub use layer::{backup_path, discover, FileReport, FileStatus, MigrationLayer};
pub use options::{MigrateOptions, DEFAULT_MAX_FILE_SIZE};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
