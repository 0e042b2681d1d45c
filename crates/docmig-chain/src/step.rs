//! One version-to-version migration

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use docmig_patch::{PatchEngine, PatchRule};
use docmig_tree::Document;

use crate::error::{ChainError, ChainResult, StepError};
use crate::version::Version;

/// Migration function of a step
///
/// Receives the user document and the parsed old/new reference documents
/// and returns the migrated user document. Must depend on nothing but its
/// inputs, and must leave the document's `version` field at the step's `to`
/// (see [`bump_version`]).
pub trait Migrate: Send + Sync {
    /// Migrate `user` from the old default's schema to the new default's
    ///
    /// # Errors
    /// Returns [`StepError`] when a patch pass, an edit or a precondition fails
    fn migrate(&self, user: Document, old: &Document, new: &Document) -> Result<Document, StepError>;
}

impl<F> Migrate for F
where
    F: Fn(Document, &Document, &Document) -> Result<Document, StepError> + Send + Sync,
{
    fn migrate(&self, user: Document, old: &Document, new: &Document) -> Result<Document, StepError> {
        self(user, old, new)
    }
}

/// Set the document's `version` field to `to`
///
/// # Errors
/// [`StepError::Tree`] if the document root is not a mapping
pub fn bump_version(doc: &mut Document, to: Version) -> Result<(), StepError> {
    doc.set_version(&to.to_string())?;
    Ok(())
}

/// Migration from one schema version to the next
///
/// Carries the default documents of both versions as text; they are parsed
/// on each run so concurrent runs never share a tree.
#[derive(Clone)]
pub struct MigrationStep {
    from: Version,
    to: Version,
    old_doc: Cow<'static, str>,
    new_doc: Cow<'static, str>,
    migrate: Arc<dyn Migrate>,
}

impl MigrationStep {
    /// Step with a closure as its migration function
    ///
    /// # Examples
    /// ```
    /// use docmig_chain::{bump_version, MigrationStep, Version};
    ///
    /// let step = MigrationStep::new(
    ///     Version::new(0, 0, 1),
    ///     Version::new(0, 0, 2),
    ///     "version: 0.0.1\n",
    ///     "version: 0.0.2\nnew: true\n",
    ///     |mut user, _old, _new| {
    ///         bump_version(&mut user, Version::new(0, 0, 2))?;
    ///         Ok(user)
    ///     },
    /// );
    /// let out = step.apply(docmig_tree::Document::parse("version: 0.0.1\n").unwrap()).unwrap();
    /// assert_eq!(out.version(), Some("0.0.2"));
    /// ```
    pub fn new<F>(
        from: Version,
        to: Version,
        old_doc: impl Into<Cow<'static, str>>,
        new_doc: impl Into<Cow<'static, str>>,
        migrate: F,
    ) -> Self
    where
        F: Fn(Document, &Document, &Document) -> Result<Document, StepError> + Send + Sync + 'static,
    {
        Self::with_migrator(from, to, old_doc, new_doc, migrate)
    }

    /// Step with any [`Migrate`] implementation
    pub fn with_migrator(
        from: Version,
        to: Version,
        old_doc: impl Into<Cow<'static, str>>,
        new_doc: impl Into<Cow<'static, str>>,
        migrate: impl Migrate + 'static,
    ) -> Self {
        Self {
            from,
            to,
            old_doc: old_doc.into(),
            new_doc: new_doc.into(),
            migrate: Arc::new(migrate),
        }
    }

    /// Step that runs one patch pass and bumps the version
    pub fn from_rules(
        from: Version,
        to: Version,
        old_doc: impl Into<Cow<'static, str>>,
        new_doc: impl Into<Cow<'static, str>>,
        rules: Vec<PatchRule>,
    ) -> Self {
        let engine = PatchEngine::new(rules);
        Self::new(from, to, old_doc, new_doc, move |mut user, old, new| {
            engine.apply(user.root_mut(), old.root(), new.root())?;
            bump_version(&mut user, to)?;
            Ok(user)
        })
    }

    #[inline]
    #[must_use]
    pub fn from(&self) -> Version {
        self.from
    }

    #[inline]
    #[must_use]
    pub fn to(&self) -> Version {
        self.to
    }

    /// Default document text of the `from` version
    #[inline]
    #[must_use]
    pub fn old_doc(&self) -> &str {
        &self.old_doc
    }

    /// Default document text of the `to` version
    #[inline]
    #[must_use]
    pub fn new_doc(&self) -> &str {
        &self.new_doc
    }

    /// Parse both reference documents
    ///
    /// # Errors
    /// [`ChainError::ReferenceParse`] naming the version whose document failed
    pub fn materialize(&self) -> ChainResult<(Document, Document)> {
        let parse = |text: &str, version: Version| {
            Document::parse(text).map_err(|source| ChainError::ReferenceParse { version, source })
        };
        Ok((parse(&self.old_doc, self.from)?, parse(&self.new_doc, self.to)?))
    }

    /// Run this step on `user`
    ///
    /// # Errors
    /// - [`ChainError::ReferenceParse`] if a reference document is malformed
    /// - [`ChainError::StepFailed`] if the migration function fails
    pub fn apply(&self, user: Document) -> ChainResult<Document> {
        let (old, new) = self.materialize()?;
        self.migrate
            .migrate(user, &old, &new)
            .map_err(|source| ChainError::StepFailed {
                from: self.from,
                to: self.to,
                source,
            })
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}
