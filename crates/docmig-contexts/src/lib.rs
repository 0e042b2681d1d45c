//! Built-in Context Family
//!
//! Default documents and migration steps for devnet context files, and the
//! registry the `docmig` tool starts from.
//!
//! # Core Concepts
//!
//! - [`TEMPLATES`]: the default context document of every schema version
//! - [`context_chain`]: steps from `0.0.1` to the newest version
//! - [`default_registry`]: every built-in family, ready for a
//!   `MigrationLayer`
//! - [`command`] / [`run`]: the `docmig` command line
//!
//! # Example
//!
//! ```rust
//! use docmig_contexts::{default_registry, template, CONTEXT_FAMILY, V0_0_1, V0_0_4};
//! use docmig_tree::Document;
//!
//! let registry = default_registry().unwrap();
//! let old = Document::parse(template(V0_0_1).unwrap()).unwrap();
//! let outcome = registry.migrate(CONTEXT_FAMILY, old, None).unwrap();
//! assert_eq!(outcome.document().to_yaml(), template(V0_0_4).unwrap());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod cli;
mod steps;
mod templates;

pub use cli::{command, run, run_with};
pub use steps::context_chain;
pub use templates::{
    latest_version, template, CONTEXT_FAMILY, TEMPLATES, V0_0_1, V0_0_2, V0_0_3, V0_0_4,
};

use docmig_chain::{ChainResult, MigrationRegistry};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Registry holding every built-in schema family
///
/// # Errors
/// Fails only if a built-in chain is malformed
pub fn default_registry() -> ChainResult<MigrationRegistry> {
    MigrationRegistry::new().with(CONTEXT_FAMILY, context_chain())
}
