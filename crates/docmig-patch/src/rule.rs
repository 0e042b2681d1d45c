//! Patch rules: where to look, whether to act, and what to write

use std::fmt;
use std::sync::Arc;

use docmig_tree::{DocPath, Node};

use crate::condition::Condition;
use crate::error::{PatchError, PatchResult};
use crate::transform::{Transform, TransformError};

/// One potential edit at a single path
///
/// When the user document lacks the path, the new default's value is
/// inserted. When it has it and the condition holds, the value is replaced
/// by the new default's, or removed if `remove` is set.
#[derive(Clone)]
pub struct PatchRule {
    path: DocPath,
    condition: Condition,
    transform: Option<Arc<dyn Transform>>,
    remove: bool,
}

impl PatchRule {
    /// Rule at `path` with the given condition, no transform, not removing
    #[inline]
    #[must_use]
    pub fn new(path: DocPath, condition: Condition) -> Self {
        Self {
            path,
            condition,
            transform: None,
            remove: false,
        }
    }

    /// Rule that follows the new default only where the user kept the old one
    #[inline]
    #[must_use]
    pub fn if_unchanged(path: DocPath) -> Self {
        Self::new(path, Condition::IfUnchanged)
    }

    /// Rule that always writes the new default's value
    #[inline]
    #[must_use]
    pub fn always(path: DocPath) -> Self {
        Self::new(path, Condition::Always)
    }

    /// Post-process the replacement value
    #[must_use]
    pub fn with_transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Delete the node instead of replacing it
    #[inline]
    #[must_use]
    pub fn removing(mut self) -> Self {
        self.remove = true;
        self
    }

    #[inline]
    #[must_use]
    pub fn path(&self) -> &DocPath {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn condition(&self) -> Condition {
        self.condition
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> Option<&dyn Transform> {
        self.transform.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn removes(&self) -> bool {
        self.remove
    }

    /// Value to write: the new default's node, run through the transform
    pub(crate) fn replacement(&self, new: &Node) -> Result<Node, TransformError> {
        match &self.transform {
            Some(t) => t.transform(new.clone()),
            None => Ok(new.clone()),
        }
    }
}

impl fmt::Debug for PatchRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PatchRule")
            .field("path", &self.path.to_string())
            .field("condition", &self.condition)
            .field("transform", &self.transform.as_ref().map(|t| t.describe()))
            .field("remove", &self.remove)
            .finish()
    }
}

/// Builder for patch rules from dotted path strings
///
/// # Examples
/// ```
/// use docmig_patch::{Condition, RuleBuilder};
///
/// let rule = RuleBuilder::new()
///     .path("context.chains.l1.fork.block")
///     .if_unchanged()
///     .build()
///     .unwrap();
/// assert_eq!(rule.path().to_string(), "context.chains.l1.fork.block");
/// assert_eq!(rule.condition(), Condition::IfUnchanged);
/// ```
#[derive(Debug, Default)]
pub struct RuleBuilder {
    path: Option<String>,
    condition: Condition,
    transform: Option<Arc<dyn Transform>>,
    remove: bool,
}

impl RuleBuilder {
    /// Create new builder
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set target path
    #[must_use]
    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Fire only while the user kept the old default (the default)
    #[inline]
    #[must_use]
    pub fn if_unchanged(mut self) -> Self {
        self.condition = Condition::IfUnchanged;
        self
    }

    /// Fire unconditionally
    #[inline]
    #[must_use]
    pub fn always(mut self) -> Self {
        self.condition = Condition::Always;
        self
    }

    /// Set transform
    #[must_use]
    pub fn transform(mut self, transform: impl Transform + 'static) -> Self {
        self.transform = Some(Arc::new(transform));
        self
    }

    /// Delete instead of replace
    #[inline]
    #[must_use]
    pub fn remove(mut self) -> Self {
        self.remove = true;
        self
    }

    /// Build rule
    ///
    /// # Errors
    /// - [`PatchError::MissingPath`] if no path was set
    /// - [`PatchError::InvalidPath`] if the path does not parse
    pub fn build(self) -> PatchResult<PatchRule> {
        let raw = self.path.ok_or(PatchError::MissingPath)?;
        let path = raw
            .parse::<DocPath>()
            .map_err(|source| PatchError::InvalidPath {
                path: raw.clone(),
                source,
            })?;

        Ok(PatchRule {
            path,
            condition: self.condition,
            transform: self.transform,
            remove: self.remove,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::transform_fn;

    #[test]
    fn builder_defaults_to_if_unchanged() {
        let rule = RuleBuilder::new().path("a.b").build().unwrap();
        assert_eq!(rule.condition(), Condition::IfUnchanged);
        assert!(!rule.removes());
        assert!(rule.transform().is_none());
    }

    #[test]
    fn builder_requires_a_valid_path() {
        assert_eq!(RuleBuilder::new().build().unwrap_err(), PatchError::MissingPath);
        assert!(matches!(
            RuleBuilder::new().path("a..b").build(),
            Err(PatchError::InvalidPath { .. })
        ));
    }

    #[test]
    fn builder_carries_transform_and_remove() {
        let rule = RuleBuilder::new()
            .path("x")
            .always()
            .transform(transform_fn("zero", |_| Ok(Node::int(0))))
            .remove()
            .build()
            .unwrap();
        assert_eq!(rule.condition(), Condition::Always);
        assert!(rule.removes());
        assert_eq!(rule.transform().map(|t| t.describe()).as_deref(), Some("zero"));
    }

    #[test]
    fn replacement_copies_the_new_value() {
        let new = Node::string("v2");
        let plain = PatchRule::always("x".parse().unwrap());
        assert_eq!(plain.replacement(&new).unwrap(), new);

        let wrapped = PatchRule::always("x".parse().unwrap())
            .with_transform(transform_fn("wrap", |n| Ok(Node::sequence(vec![n]))));
        assert_eq!(
            wrapped.replacement(&new).unwrap(),
            Node::sequence(vec![Node::string("v2")])
        );
    }

    #[test]
    fn debug_names_the_transform() {
        let rule = PatchRule::if_unchanged("a".parse().unwrap())
            .with_transform(transform_fn("bump", |n| Ok(n)));
        let dbg = format!("{rule:?}");
        assert!(dbg.contains("bump"));
        assert!(dbg.contains("IfUnchanged"));
    }
}
