//! Migration Chains
//!
//! Versioned migration steps for one schema family, the runner that walks
//! them from a document's declared version to a target version, and the
//! registry that maps family names to chains.
//!
//! # Core Concepts
//!
//! - [`Version`]: `major.minor.patch`, ordered per component
//! - [`MigrationStep`]: `from`/`to` versions, embedded default documents,
//!   and a [`Migrate`] function
//! - [`MigrationChain`]: the runner; [`MigrationOutcome::UpToDate`] signals
//!   a document already at the target
//! - [`MigrationRegistry`]: validated chains by family name
//!
//! # Example
//!
//! ```rust
//! use docmig_chain::{MigrationChain, MigrationStep, Version};
//! use docmig_patch::PatchRule;
//! use docmig_tree::Document;
//!
//! let step = MigrationStep::from_rules(
//!     Version::new(0, 0, 1),
//!     Version::new(0, 0, 2),
//!     "version: 0.0.1\nblock: 100\n",
//!     "version: 0.0.2\nblock: 200\n",
//!     vec![PatchRule::if_unchanged("block".parse().unwrap())],
//! );
//! let chain = MigrationChain::new(vec![step]);
//!
//! let user = Document::parse("version: 0.0.1\nblock: 100 # pinned\n").unwrap();
//! let outcome = chain.migrate_to(user, Version::new(0, 0, 2)).unwrap();
//! assert_eq!(outcome.document().to_yaml(), "version: 0.0.2\nblock: 100 # pinned\n");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod chain;
mod error;
mod registry;
mod step;
mod version;

pub use chain::{declared_version, Migration, MigrationChain, MigrationOutcome};
pub use error::{ChainError, ChainResult, StepError, VersionError};
pub use registry::MigrationRegistry;
pub use step::{bump_version, Migrate, MigrationStep};
pub use version::Version;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
