//! Document Tree
//!
//! Order-preserving, comment-carrying trees for hand-edited configuration
//! documents, with a YAML reader/writer that round-trips comments.
//!
//! # Core Concepts
//!
//! - [`Node`]: mapping, sequence or scalar, plus head/line/foot [`Comments`]
//! - [`DocPath`]: dotted addressing of nodes (`context.chains.l1`)
//! - [`Document`]: a parsed document and its top-level `version` field
//! - Tree utilities: [`resolve`], [`find_parent`], [`deep_merge`],
//!   [`insert_at`], [`delete_at`]
//! - [`Fingerprint`]: Blake3 digest of serialized text
//!
//! # Example
//!
//! ```rust
//! use docmig_tree::{Document, DocPath, Node};
//!
//! let mut doc = Document::parse("version: 0.0.1\nport: 8545 # rpc\n").unwrap();
//! let port: DocPath = "port".parse().unwrap();
//! *doc.get_mut(&port).unwrap() = Node::int(8546).with_line_comment("rpc");
//! doc.set_version("0.0.2").unwrap();
//! assert_eq!(doc.to_yaml(), "version: 0.0.2\nport: 8546 # rpc\n");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod document;
mod emit;
mod error;
mod fingerprint;
mod node;
mod parse;
mod path;
mod tree;

pub use document::{Document, VERSION_KEY};
pub use error::{TreeError, TreeResult};
pub use fingerprint::{Fingerprint, FingerprintError};
pub use node::{
    CollectionStyle, Comments, Entry, Node, NodeKind, NodeValue, Scalar, ScalarStyle, ScalarTag,
};
pub use path::{DocPath, PathError};
pub use tree::{
    child, child_mut, deep_merge, delete_at, find_parent, find_parent_mut, insert_at, resolve,
    resolve_mut, Slot,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
