//! Document Patching
//!
//! Declarative patch rules and the engine that applies them to a user
//! document, given the old and new default documents of one version step.
//!
//! # Core Concepts
//!
//! - [`PatchRule`]: path, [`Condition`], optional [`Transform`], remove flag
//! - [`Condition`]: `Always`, or `IfUnchanged` from the old default
//! - [`PatchEngine`]: applies rules in order and returns a [`PatchReport`]
//!
//! # Example
//!
//! ```rust
//! use docmig_patch::{PatchEngine, RuleBuilder};
//! use docmig_tree::Document;
//!
//! let old = Document::parse("block: 100\n").unwrap();
//! let new = Document::parse("block: 200\nblock_time: 12\n").unwrap();
//! let mut user = Document::parse("# my devnet\nblock: 100\n").unwrap();
//!
//! let engine = PatchEngine::new(vec![
//!     RuleBuilder::new().path("block").if_unchanged().build().unwrap(),
//!     RuleBuilder::new().path("block_time").build().unwrap(),
//! ]);
//! engine.apply(user.root_mut(), old.root(), new.root()).unwrap();
//! assert_eq!(user.to_yaml(), "# my devnet\nblock: 200\nblock_time: 12\n");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod condition;
mod engine;
mod error;
mod rule;
mod transform;

pub use condition::Condition;
pub use engine::{PatchEngine, PatchReport, RuleOutcome, SkipReason};
pub use error::{PatchError, PatchResult};
pub use rule::{PatchRule, RuleBuilder};
pub use transform::{transform_fn, FnTransform, Transform, TransformError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
