//! Error types for the file layer

use std::path::PathBuf;

use docmig_chain::ChainError;
use docmig_tree::TreeError;

/// Errors migrating a file
///
/// Every variant names the file. None of them leave a partially written file
/// behind.
#[derive(Debug, thiserror::Error)]
pub enum LayerError {
    /// Reading the file or listing a directory failed
    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// File exceeds the configured size limit
    #[error("{path} is {size} bytes, over the {max} byte limit")]
    TooLarge { path: PathBuf, size: u64, max: u64 },

    /// File is not a readable document
    #[error("cannot parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: TreeError,
    },

    /// The migration chain failed
    #[error("cannot migrate {path}: {source}")]
    Migration {
        path: PathBuf,
        #[source]
        source: ChainError,
    },

    /// Writing the result or its backup failed
    #[error("cannot write {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LayerError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create write error for path
    pub fn persist_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Persist {
            path: path.into(),
            source,
        }
    }

    /// File the error is about
    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        match self {
            Self::Io { path, .. }
            | Self::TooLarge { path, .. }
            | Self::Parse { path, .. }
            | Self::Migration { path, .. }
            | Self::Persist { path, .. } => path,
        }
    }
}
