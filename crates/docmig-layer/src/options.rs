//! Options for file migrations

use docmig_chain::Version;
use serde::{Deserialize, Serialize};

/// Largest file the layer reads by default (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// How files are migrated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrateOptions {
    /// Version to migrate to; the family's latest when unset
    pub target: Option<Version>,
    /// Run the chain but never write
    pub dry_run: bool,
    /// Keep the original next to the file as `<name>.bak`
    pub backup: bool,
    /// Files larger than this are rejected unread
    pub max_file_size: u64,
}

impl MigrateOptions {
    /// Create default options
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_target(mut self, target: Version) -> Self {
        self.target = Some(target);
        self
    }

    #[inline]
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_backup(mut self, backup: bool) -> Self {
        self.backup = backup;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_file_size(mut self, bytes: u64) -> Self {
        self.max_file_size = bytes;
        self
    }
}

impl Default for MigrateOptions {
    fn default() -> Self {
        Self {
            target: None,
            dry_run: false,
            backup: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = MigrateOptions::new();
        assert_eq!(options.target, None);
        assert!(!options.dry_run);
        assert!(!options.backup);
        assert_eq!(options.max_file_size, 10 * 1024 * 1024);
    }

    #[test]
    fn builder_sets_fields() {
        let options = MigrateOptions::new()
            .with_target(Version::new(0, 0, 3))
            .with_dry_run(true)
            .with_backup(true)
            .with_max_file_size(64);
        assert_eq!(options.target, Some(Version::new(0, 0, 3)));
        assert!(options.dry_run && options.backup);
        assert_eq!(options.max_file_size, 64);
    }
}
