//! Error types for the document tree
//!
//! Covers:
//! - Reading text into a tree (syntax, unsupported features)
//! - Structural edits on a tree

use crate::node::NodeKind;

/// Errors produced while reading or editing a document tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Malformed input
    #[error("line {line}: {message}")]
    Syntax { line: usize, message: String },

    /// Tab used for indentation
    #[error("line {line}: tabs are not allowed in indentation")]
    TabIndentation { line: usize },

    /// The same key appears twice in one mapping
    #[error("line {line}: duplicate mapping key '{key}'")]
    DuplicateKey { line: usize, key: String },

    /// Valid YAML this reader deliberately does not handle
    #[error("line {line}: {feature} are not supported")]
    Unsupported { line: usize, feature: &'static str },

    /// Edit expected a different node kind
    #[error("expected a {expected} node, found {found}")]
    KindMismatch { expected: NodeKind, found: NodeKind },

    /// Edit position past the end of a container
    #[error("index {index} is out of range for a container of {len} children")]
    IndexOutOfRange { index: usize, len: usize },

    /// Inserted key already present in the mapping
    #[error("key '{0}' already exists")]
    KeyExists(String),

    /// Edit is malformed for the target container
    #[error("invalid edit: {0}")]
    InvalidEdit(String),

    /// Conversion to a typed value failed
    #[error("conversion failed: {0}")]
    Conversion(String),
}

impl TreeError {
    /// Create syntax error for a line
    pub fn syntax(line: usize, message: impl Into<String>) -> Self {
        Self::Syntax {
            line,
            message: message.into(),
        }
    }

    /// Line number the error refers to, if it came from the reader
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax { line, .. }
            | Self::TabIndentation { line }
            | Self::DuplicateKey { line, .. }
            | Self::Unsupported { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Result type alias for tree operations
pub type TreeResult<T> = Result<T, TreeError>;
