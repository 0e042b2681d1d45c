//! Migration chain runner
//!
//! Walks the steps of one schema family from a document's declared version
//! up to a target version.

use std::collections::{BTreeMap, BTreeSet};

use docmig_tree::Document;
use tracing::{debug, info, warn};

use crate::error::{ChainError, ChainResult};
use crate::step::MigrationStep;
use crate::version::Version;

/// A document that went through at least one step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub document: Document,
    pub from: Version,
    pub to: Version,
    /// `(from, to)` of each applied step, in order
    pub applied: Vec<(Version, Version)>,
}

/// Result of a chain run
///
/// `UpToDate` is the "already at the target" signal: not an error, and the
/// document comes back unmodified so callers can skip the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MigrationOutcome {
    UpToDate(Document),
    Migrated(Migration),
}

impl MigrationOutcome {
    #[inline]
    #[must_use]
    pub fn is_up_to_date(&self) -> bool {
        matches!(self, Self::UpToDate(_))
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        match self {
            Self::UpToDate(doc) => doc,
            Self::Migrated(m) => &m.document,
        }
    }

    #[must_use]
    pub fn into_document(self) -> Document {
        match self {
            Self::UpToDate(doc) => doc,
            Self::Migrated(m) => m.document,
        }
    }

    /// Number of steps applied
    #[must_use]
    pub fn steps_applied(&self) -> usize {
        match self {
            Self::UpToDate(_) => 0,
            Self::Migrated(m) => m.applied.len(),
        }
    }
}

/// Version recorded in the document's top-level `version` field
///
/// # Errors
/// - [`ChainError::MissingVersion`] if there is no such field
/// - [`ChainError::InvalidVersion`] if it does not parse
pub fn declared_version(doc: &Document) -> ChainResult<Version> {
    let raw = doc.version().ok_or(ChainError::MissingVersion)?;
    raw.parse().map_err(|source| ChainError::InvalidVersion {
        value: raw.to_string(),
        source,
    })
}

/// Steps of one schema family
///
/// The list does not need to be sorted; the runner looks up the step whose
/// `from` matches the current version.
#[derive(Debug, Clone, Default)]
pub struct MigrationChain {
    steps: Vec<MigrationStep>,
}

impl MigrationChain {
    #[inline]
    #[must_use]
    pub fn new(steps: Vec<MigrationStep>) -> Self {
        Self { steps }
    }

    /// Append a step
    #[must_use]
    pub fn step(mut self, step: MigrationStep) -> Self {
        self.steps.push(step);
        self
    }

    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[MigrationStep] {
        &self.steps
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// First step whose `from` is `version`
    #[must_use]
    pub fn step_from(&self, version: Version) -> Option<&MigrationStep> {
        self.steps.iter().find(|s| s.from() == version)
    }

    /// Newest version any step produces
    #[must_use]
    pub fn latest(&self) -> Option<Version> {
        self.steps.iter().map(MigrationStep::to).max()
    }

    /// Every version the chain mentions, ascending
    #[must_use]
    pub fn versions(&self) -> BTreeSet<Version> {
        self.steps
            .iter()
            .flat_map(|s| [s.from(), s.to()])
            .collect()
    }

    /// Default document text for `version`, taken from the step that
    /// produces it, or from the first step when nothing produces it
    #[must_use]
    pub fn template(&self, version: Version) -> Option<&str> {
        self.steps
            .iter()
            .find(|s| s.to() == version)
            .map(MigrationStep::new_doc)
            .or_else(|| self.step_from(version).map(MigrationStep::old_doc))
    }

    /// Check the chain for authoring defects
    ///
    /// # Errors
    /// - [`ChainError::DuplicateStep`] if two steps share a `from`
    /// - [`ChainError::NonAdvancingStep`] if a step's `to` is not newer than its `from`
    /// - [`ChainError::Gap`] if a step produces a version no step continues from,
    ///   other than the latest
    pub fn validate(&self) -> ChainResult<()> {
        let mut by_from: BTreeMap<Version, &MigrationStep> = BTreeMap::new();
        for step in &self.steps {
            if by_from.insert(step.from(), step).is_some() {
                return Err(ChainError::DuplicateStep { from: step.from() });
            }
        }
        if let Some(step) = self.steps.iter().find(|s| s.to() <= s.from()) {
            return Err(ChainError::NonAdvancingStep {
                from: step.from(),
                to: step.to(),
            });
        }

        let latest = self.latest();
        match self
            .steps
            .iter()
            .map(MigrationStep::to)
            .find(|to| Some(*to) != latest && !by_from.contains_key(to))
        {
            Some(version) => Err(ChainError::Gap { version }),
            None => Ok(()),
        }
    }

    /// Migrate `doc` from its declared version to `target`
    ///
    /// # Errors
    /// [`ChainError::MissingVersion`] or [`ChainError::InvalidVersion`] if the
    /// declared version is unusable, otherwise as [`Self::migrate_from`]
    pub fn migrate_to(&self, doc: Document, target: Version) -> ChainResult<MigrationOutcome> {
        let from = declared_version(&doc)?;
        self.migrate_from(doc, from, target)
    }

    /// Migrate `doc`, currently at `from`, to `target`
    ///
    /// Applies the step starting at the current version, advances to its
    /// `to`, and repeats. A step that would overshoot `target` ends the walk.
    ///
    /// # Errors
    /// - [`ChainError::Downgrade`] if `from` is newer than `target`
    /// - [`ChainError::Incomplete`] if the walk ends short of `target`
    /// - [`ChainError::NonAdvancingStep`] if a step does not move forward
    /// - [`ChainError::StepFailed`] or [`ChainError::ReferenceParse`] from a step;
    ///   later steps are not attempted
    ///
    /// # Examples
    /// ```
    /// use docmig_chain::{bump_version, MigrationChain, MigrationStep, StepError, Version};
    /// use docmig_tree::Document;
    ///
    /// let bump = |to: Version| {
    ///     move |mut user: Document, _: &Document, _: &Document| -> Result<Document, StepError> {
    ///         bump_version(&mut user, to)?;
    ///         Ok(user)
    ///     }
    /// };
    /// let (v1, v2, v3) = (Version::new(0, 0, 1), Version::new(0, 0, 2), Version::new(0, 0, 3));
    /// let chain = MigrationChain::default()
    ///     .step(MigrationStep::new(v2, v3, "", "", bump(v3)))
    ///     .step(MigrationStep::new(v1, v2, "", "", bump(v2)));
    ///
    /// let doc = Document::parse("version: 0.0.1\n").unwrap();
    /// let outcome = chain.migrate_to(doc, v3).unwrap();
    /// assert_eq!(outcome.steps_applied(), 2);
    /// assert_eq!(outcome.document().version(), Some("0.0.3"));
    /// ```
    pub fn migrate_from(
        &self,
        doc: Document,
        from: Version,
        target: Version,
    ) -> ChainResult<MigrationOutcome> {
        if from == target {
            debug!(%from, "already at target version");
            return Ok(MigrationOutcome::UpToDate(doc));
        }
        if from > target {
            return Err(ChainError::Downgrade { from, target });
        }

        let mut doc = doc;
        let mut current = from;
        let mut applied = Vec::new();
        while current != target {
            let Some(step) = self.step_from(current) else {
                debug!(%current, "no step continues from current version");
                break;
            };
            if step.to() <= step.from() {
                return Err(ChainError::NonAdvancingStep {
                    from: step.from(),
                    to: step.to(),
                });
            }
            if step.to() > target {
                debug!(%current, next = %step.to(), %target, "next step overshoots target");
                break;
            }

            doc = step.apply(doc)?;
            if doc.version() != Some(step.to().to_string().as_str()) {
                warn!(
                    from = %step.from(),
                    to = %step.to(),
                    declared = doc.version().unwrap_or("<none>"),
                    "step did not record its target version"
                );
            }
            info!(from = %step.from(), to = %step.to(), "applied migration step");
            applied.push((step.from(), step.to()));
            current = step.to();
        }

        if current != target {
            return Err(ChainError::Incomplete {
                stalled: current,
                target,
            });
        }
        Ok(MigrationOutcome::Migrated(Migration {
            document: doc,
            from,
            to: current,
            applied,
        }))
    }
}
