//! Error types for versions, migration steps and chain runs

use docmig_patch::PatchError;
use docmig_tree::TreeError;

use crate::version::Version;

/// Errors parsing a version string
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VersionError {
    /// Nothing to parse
    #[error("empty version string")]
    Empty,

    /// Not exactly three dot-separated components
    #[error("version '{0}' must have exactly three components (major.minor.patch)")]
    Arity(String),

    /// A component is not a non-negative integer
    #[error("version component '{component}' in '{input}' is not a non-negative integer")]
    Component { input: String, component: String },
}

/// Errors raised inside a migration step
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepError {
    /// A patch pass failed
    #[error(transparent)]
    Patch(#[from] PatchError),

    /// A bespoke structural edit failed
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// The document does not have the shape the step requires
    #[error("precondition failed: {0}")]
    Precondition(String),
}

impl StepError {
    /// Create precondition failure
    pub fn precondition(message: impl Into<String>) -> Self {
        Self::Precondition(message.into())
    }
}

/// Errors running or assembling a migration chain
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChainError {
    /// The document's `version` field does not parse
    #[error("invalid version '{value}': {source}")]
    InvalidVersion {
        value: String,
        #[source]
        source: VersionError,
    },

    /// The document has no `version` field
    #[error("document has no version field")]
    MissingVersion,

    /// Requested target is older than the document
    #[error("cannot migrate {from} down to {target}")]
    Downgrade { from: Version, target: Version },

    /// No step continues from `stalled`
    #[error("migration chain is incomplete: stalled at {stalled}, target {target}")]
    Incomplete { stalled: Version, target: Version },

    /// A step's embedded reference document does not parse
    #[error("reference document for {version} does not parse: {source}")]
    ReferenceParse {
        version: Version,
        #[source]
        source: TreeError,
    },

    /// A step's migration failed
    #[error("migration step {from} -> {to} failed: {source}")]
    StepFailed {
        from: Version,
        to: Version,
        #[source]
        source: StepError,
    },

    /// Two steps start from the same version
    #[error("more than one step migrates from {from}")]
    DuplicateStep { from: Version },

    /// A step does not move the version forward
    #[error("step {from} -> {to} does not advance the version")]
    NonAdvancingStep { from: Version, to: Version },

    /// No step continues from an intermediate version
    #[error("no step migrates from {version}, which an earlier step produces")]
    Gap { version: Version },

    /// A chain with no steps
    #[error("schema family '{0}' has no migration steps")]
    EmptyChain(String),

    /// No chain registered under the family name
    #[error("unknown schema family '{0}'")]
    UnknownFamily(String),
}

/// Result alias for chain operations
pub type ChainResult<T> = Result<T, ChainError>;
