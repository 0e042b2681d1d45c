//! Error types for patch rules and the patch engine

use docmig_tree::{DocPath, PathError, TreeError};

use crate::transform::TransformError;

/// Errors building or applying patch rules
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PatchError {
    /// Rule path string did not parse
    #[error("invalid rule path '{path}': {source}")]
    InvalidPath {
        path: String,
        #[source]
        source: PathError,
    },

    /// Rule built without a path
    #[error("rule has no path")]
    MissingPath,

    /// A rule's transform rejected the new default's value
    #[error("transform at '{path}' failed: {source}")]
    Transform {
        path: DocPath,
        #[source]
        source: TransformError,
    },

    /// A structural edit was rejected by the tree
    #[error("edit at '{path}' failed: {source}")]
    Tree {
        path: DocPath,
        #[source]
        source: TreeError,
    },
}

/// Result alias for patch operations
pub type PatchResult<T> = Result<T, PatchError>;
