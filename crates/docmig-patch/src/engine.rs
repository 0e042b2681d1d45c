//! Three-way patch engine
//!
//! Applies a rule list to a user document given the old and new defaults for
//! one version step. Untouched values, comments and key order are kept.

use std::fmt;

use docmig_tree::{
    delete_at, find_parent, find_parent_mut, insert_at, resolve, resolve_mut, DocPath, Entry, Node,
};
use tracing::debug;

use crate::error::{PatchError, PatchResult};
use crate::rule::PatchRule;

/// What a rule did to the user document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleOutcome {
    /// Path was missing and the new default's value was inserted at `index`
    Inserted { index: usize },
    /// Condition held and the value was replaced
    Replaced,
    /// Condition held and the node was deleted
    Removed,
    /// Condition did not hold; the user's value was left alone
    Preserved,
    /// Rule did not apply
    Skipped(SkipReason),
}

impl RuleOutcome {
    /// True if the user document changed
    #[inline]
    #[must_use]
    pub fn is_change(self) -> bool {
        matches!(self, Self::Inserted { .. } | Self::Replaced | Self::Removed)
    }
}

/// Why a rule did not apply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nothing at the path in the new default
    AbsentInNew,
    /// The user document has no container to insert into
    NoParent,
    /// A sequence index past the end of the user's sequence
    PastEnd,
    /// The document root cannot be removed
    RootRemoval,
    /// A removal rule whose path the user document lacks
    NothingToRemove,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::AbsentInNew => "absent in new default",
            Self::NoParent => "no parent in user document",
            Self::PastEnd => "index past the end of the sequence",
            Self::RootRemoval => "cannot remove the document root",
            Self::NothingToRemove => "nothing to remove",
        })
    }
}

/// Per-rule outcomes of one [`PatchEngine::apply`] call, in rule order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PatchReport {
    outcomes: Vec<(DocPath, RuleOutcome)>,
}

impl PatchReport {
    #[inline]
    #[must_use]
    pub fn outcomes(&self) -> &[(DocPath, RuleOutcome)] {
        &self.outcomes
    }

    /// Outcome of the first rule at `path`
    #[must_use]
    pub fn outcome(&self, path: &str) -> Option<RuleOutcome> {
        self.outcomes
            .iter()
            .find(|(p, _)| p.to_string() == path)
            .map(|(_, o)| *o)
    }

    /// Number of rules that changed the document
    #[must_use]
    pub fn changes(&self) -> usize {
        self.outcomes.iter().filter(|(_, o)| o.is_change()).count()
    }

    /// True if any rule changed the document
    #[must_use]
    pub fn changed(&self) -> bool {
        self.changes() > 0
    }

    fn record(&mut self, rule: &PatchRule, outcome: RuleOutcome) {
        debug!(path = %rule.path(), condition = %rule.condition(), ?outcome, "patch rule");
        self.outcomes.push((rule.path().clone(), outcome));
    }
}

/// Executes patch rules against a (user, old default, new default) triple
///
/// # Examples
/// ```
/// use docmig_patch::{PatchEngine, PatchRule, RuleOutcome};
/// use docmig_tree::Document;
///
/// let old = Document::parse("port: 8545\nhost: localhost\n").unwrap();
/// let new = Document::parse("port: 8545\nhost: 127.0.0.1\ntimeout: 30\n").unwrap();
/// let mut user = Document::parse("port: 9000 # mine\nhost: localhost\n").unwrap();
///
/// let engine = PatchEngine::new(vec![
///     PatchRule::if_unchanged("port".parse().unwrap()),
///     PatchRule::if_unchanged("host".parse().unwrap()),
///     PatchRule::if_unchanged("timeout".parse().unwrap()),
/// ]);
/// let report = engine.apply(user.root_mut(), old.root(), new.root()).unwrap();
///
/// assert_eq!(report.outcome("port"), Some(RuleOutcome::Preserved));
/// assert_eq!(user.to_yaml(), "port: 9000 # mine\nhost: 127.0.0.1\ntimeout: 30\n");
/// ```
#[derive(Debug, Clone, Default)]
pub struct PatchEngine {
    rules: Vec<PatchRule>,
}

impl PatchEngine {
    #[inline]
    #[must_use]
    pub fn new(rules: Vec<PatchRule>) -> Self {
        Self { rules }
    }

    /// Append a rule
    #[must_use]
    pub fn rule(mut self, rule: PatchRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[inline]
    #[must_use]
    pub fn rules(&self) -> &[PatchRule] {
        &self.rules
    }

    /// Apply every rule in order to `user`
    ///
    /// Each rule's path is resolved independently in the three trees. Paths
    /// that do not resolve are not errors: a value missing from the user
    /// document is inserted from `new`, and a rule with nothing to take from
    /// `new` is skipped.
    ///
    /// # Errors
    /// - [`PatchError::Transform`] if a rule's transform fails
    /// - [`PatchError::Tree`] if the tree rejects an edit
    ///
    /// The user tree keeps the edits of rules applied before the failure.
    pub fn apply(&self, user: &mut Node, old: &Node, new: &Node) -> PatchResult<PatchReport> {
        let mut report = PatchReport::default();
        for rule in &self.rules {
            let fires = resolve(user, rule.path())
                .map(|current| rule.condition().holds(current, resolve(old, rule.path())));
            let outcome = match fires {
                None => insert_missing(rule, user, new)?,
                Some(false) => RuleOutcome::Preserved,
                Some(true) if rule.removes() => remove_present(rule, user)?,
                Some(true) => replace_present(rule, user, new)?,
            };
            report.record(rule, outcome);
        }
        Ok(report)
    }
}

fn insert_missing(rule: &PatchRule, user: &mut Node, new: &Node) -> PatchResult<RuleOutcome> {
    let path = rule.path();
    if rule.removes() {
        return Ok(RuleOutcome::Skipped(SkipReason::NothingToRemove));
    }
    let Some(source) = resolve(new, path) else {
        return Ok(RuleOutcome::Skipped(SkipReason::AbsentInNew));
    };
    let value = rule
        .replacement(source)
        .map_err(|source| PatchError::Transform {
            path: path.clone(),
            source,
        })?;

    let Some((parent, slot)) = find_parent_mut(user, path) else {
        return Ok(RuleOutcome::Skipped(SkipReason::NoParent));
    };

    let (index, key) = if parent.is_mapping() {
        let Some((new_parent, new_slot)) = find_parent(new, path) else {
            return Ok(RuleOutcome::Skipped(SkipReason::AbsentInNew));
        };
        let Some(entries) = new_parent.entries() else {
            return Ok(RuleOutcome::Skipped(SkipReason::AbsentInNew));
        };
        let Some(entry) = entries.get(new_slot.index) else {
            return Ok(RuleOutcome::Skipped(SkipReason::AbsentInNew));
        };
        let index = placement(parent, entries, new_slot.index);
        (index, Some(entry.key.clone()))
    } else {
        if slot.index > parent.len() {
            return Ok(RuleOutcome::Skipped(SkipReason::PastEnd));
        }
        (slot.index, None)
    };

    insert_at(parent, index, key, value).map_err(|source| PatchError::Tree {
        path: path.clone(),
        source,
    })?;
    Ok(RuleOutcome::Inserted { index })
}

/// Index for a key that sits at `position` in the new default's `entries`:
/// right after the nearest earlier sibling the user has; first if the key is
/// first in the new default; last otherwise
fn placement(parent: &Node, entries: &[Entry], position: usize) -> usize {
    entries[..position]
        .iter()
        .rev()
        .find_map(|e| e.key_str().and_then(|k| parent.key_position(k)))
        .map_or(if position == 0 { 0 } else { parent.len() }, |i| i + 1)
}

fn remove_present(rule: &PatchRule, user: &mut Node) -> PatchResult<RuleOutcome> {
    let path = rule.path();
    let Some((parent, slot)) = find_parent_mut(user, path) else {
        return Ok(RuleOutcome::Skipped(SkipReason::RootRemoval));
    };
    delete_at(parent, slot.index).map_err(|source| PatchError::Tree {
        path: path.clone(),
        source,
    })?;
    Ok(RuleOutcome::Removed)
}

fn replace_present(rule: &PatchRule, user: &mut Node, new: &Node) -> PatchResult<RuleOutcome> {
    let path = rule.path();
    let Some(source) = resolve(new, path) else {
        return Ok(RuleOutcome::Skipped(SkipReason::AbsentInNew));
    };
    let replacement = rule
        .replacement(source)
        .map_err(|source| PatchError::Transform {
            path: path.clone(),
            source,
        })?;

    if let Some(target) = resolve_mut(user, path) {
        let previous = std::mem::take(&mut target.comments);
        *target = replacement;
        if target.comments.is_empty() {
            target.comments = previous;
        }
    }
    Ok(RuleOutcome::Replaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::condition::Condition;
    use crate::rule::RuleBuilder;
    use crate::transform::{transform_fn, TransformError};
    use docmig_tree::Document;
    use pretty_assertions::assert_eq;

    fn root(src: &str) -> Node {
        Document::parse(src).unwrap().into_root()
    }

    fn yaml(node: &Node) -> String {
        Document::from_root(node.clone()).to_yaml()
    }

    fn rule(path: &str, condition: Condition) -> PatchRule {
        PatchRule::new(path.parse().unwrap(), condition)
    }

    #[test]
    fn unchanged_value_follows_new_default() {
        let old = root("a: 1\nb: x\n");
        let new = root("a: 2\nb: x\n");
        let mut user = root("a: 1\nb: y\n");

        let report = PatchEngine::new(vec![rule("a", Condition::IfUnchanged)])
            .apply(&mut user, &old, &new)
            .unwrap();

        assert_eq!(report.outcome("a"), Some(RuleOutcome::Replaced));
        assert_eq!(yaml(&user), "a: 2\nb: y\n");
    }

    #[test]
    fn customized_value_is_preserved_with_its_comment() {
        let old = root("a: 1\n");
        let new = root("a: 2\n");
        let mut user = root("# about a\na: 7 # tuned\n");
        let before = yaml(&user);

        let report = PatchEngine::new(vec![rule("a", Condition::IfUnchanged)])
            .apply(&mut user, &old, &new)
            .unwrap();

        assert_eq!(report.outcome("a"), Some(RuleOutcome::Preserved));
        assert!(!report.changed());
        assert_eq!(yaml(&user), before);
    }

    #[test]
    fn always_overwrites_customizations() {
        let old = root("a: 1\n");
        let new = root("a: 2\n");
        let mut user = root("a: 7 # tuned\n");

        PatchEngine::new(vec![rule("a", Condition::Always)])
            .apply(&mut user, &old, &new)
            .unwrap();
        assert_eq!(yaml(&user), "a: 2 # tuned\n");
    }

    #[test]
    fn missing_key_is_inserted_after_nearest_sibling() {
        let old = root("a: 1\nc: 3\n");
        let new = root("a: 1\nb: 2\nc: 3\n");
        let mut user = root("c: 3\nextra: true\na: 1\n");

        let report = PatchEngine::new(vec![rule("b", Condition::IfUnchanged)])
            .apply(&mut user, &old, &new)
            .unwrap();

        assert_eq!(report.outcome("b"), Some(RuleOutcome::Inserted { index: 3 }));
        assert_eq!(yaml(&user), "c: 3\nextra: true\na: 1\nb: 2\n");
    }

    #[test]
    fn missing_first_key_goes_first_and_others_go_last() {
        let new = root("z: 0\na: 1\nlast: 9\n");
        let mut user = root("other: x\n");

        PatchEngine::new(vec![
            rule("last", Condition::IfUnchanged),
            rule("z", Condition::IfUnchanged),
        ])
        .apply(&mut user, &Node::mapping(vec![]), &new)
        .unwrap();

        assert_eq!(yaml(&user), "z: 0\nother: x\nlast: 9\n");
    }

    #[test]
    fn inserted_subtree_keeps_comments_from_new_default() {
        let new = root("a: 1\n# second chain\nl2:\n  chain_id: 31338 # local\n");
        let mut user = root("a: 5\n");

        PatchEngine::new(vec![rule("l2", Condition::IfUnchanged)])
            .apply(&mut user, &root("a: 1\n"), &new)
            .unwrap();

        assert_eq!(
            yaml(&user),
            "a: 5\n# second chain\nl2:\n  chain_id: 31338 # local\n"
        );
    }

    #[test]
    fn nested_insert_without_parent_is_skipped() {
        let new = root("a:\n  b: 1\n");
        let mut user = root("x: 1\n");
        let report = PatchEngine::new(vec![rule("a.b", Condition::Always)])
            .apply(&mut user, &new, &new)
            .unwrap();
        assert_eq!(
            report.outcome("a.b"),
            Some(RuleOutcome::Skipped(SkipReason::NoParent))
        );
        assert_eq!(yaml(&user), "x: 1\n");
    }

    #[test]
    fn absent_everywhere_is_skipped() {
        let mut user = root("a: 1\n");
        let report = PatchEngine::new(vec![rule("nope", Condition::Always)])
            .apply(&mut user, &root("a: 1\n"), &root("a: 1\n"))
            .unwrap();
        assert_eq!(
            report.outcome("nope"),
            Some(RuleOutcome::Skipped(SkipReason::AbsentInNew))
        );
    }

    #[test]
    fn remove_deletes_only_when_condition_holds() {
        let old = root("legacy: true\nkeep: 1\n");
        let new = root("keep: 1\n");

        let mut untouched = root("legacy: true\nkeep: 1\n");
        let mut edited = root("legacy: false\nkeep: 1\n");
        let engine = PatchEngine::new(vec![rule("legacy", Condition::IfUnchanged).removing()]);

        engine.apply(&mut untouched, &old, &new).unwrap();
        engine.apply(&mut edited, &old, &new).unwrap();

        assert_eq!(yaml(&untouched), "keep: 1\n");
        assert_eq!(yaml(&edited), "legacy: false\nkeep: 1\n");
    }

    #[test]
    fn remove_of_missing_key_does_not_insert() {
        let old = root("legacy: true\n");
        let mut user = root("keep: 1\n");
        let report = PatchEngine::new(vec![rule("legacy", Condition::Always).removing()])
            .apply(&mut user, &old, &old)
            .unwrap();
        assert!(!report.changed());
        assert_eq!(yaml(&user), "keep: 1\n");
    }

    #[test]
    fn sequence_items_are_addressed_by_index() {
        let old = root("ports: [8545, 8546]\n");
        let new = root("ports: [8545, 9546, 9547]\n");
        let mut user = root("ports: [8545, 8546]\n");

        PatchEngine::new(vec![
            rule("ports.1", Condition::IfUnchanged),
            rule("ports.2", Condition::IfUnchanged),
        ])
        .apply(&mut user, &old, &new)
        .unwrap();
        assert_eq!(yaml(&user), "ports: [8545, 9546, 9547]\n");
    }

    #[test]
    fn sequence_index_past_end_is_skipped() {
        let new = root("ports: [1, 2, 3, 4]\n");
        let mut user = root("ports: [1]\n");
        let report = PatchEngine::new(vec![rule("ports.3", Condition::Always)])
            .apply(&mut user, &new, &new)
            .unwrap();
        assert_eq!(
            report.outcome("ports.3"),
            Some(RuleOutcome::Skipped(SkipReason::PastEnd))
        );
    }

    #[test]
    fn transform_post_processes_the_new_value() {
        let old = root("url: http://localhost:8545\n");
        let new = root("url: http://127.0.0.1:8545\n");
        let mut user = root("url: http://localhost:8545\n");

        let rule = RuleBuilder::new()
            .path("url")
            .transform(transform_fn("https", |node: Node| {
                let text = node.as_str().unwrap_or_default().replacen("http:", "https:", 1);
                Ok(Node::string(text))
            }))
            .build()
            .unwrap();
        PatchEngine::new(vec![rule]).apply(&mut user, &old, &new).unwrap();

        assert_eq!(yaml(&user), "url: https://127.0.0.1:8545\n");
    }

    #[test]
    fn transform_failure_names_the_path() {
        let doc = root("a: 1\n");
        let mut user = root("b: 2\n");
        let failing = PatchRule::always("a".parse().unwrap())
            .with_transform(transform_fn("fail", |_| Err(TransformError::Failed("nope".into()))));

        let err = PatchEngine::new(vec![failing])
            .apply(&mut user, &doc, &doc)
            .unwrap_err();
        assert!(matches!(err, PatchError::Transform { ref path, .. } if path.to_string() == "a"));
        assert_eq!(err.to_string(), "transform at 'a' failed: nope");
    }

    #[test]
    fn replacement_is_a_copy_of_the_new_default() {
        let old = root("m:\n  k: 1\n");
        let new = root("m:\n  k: 2\n");
        let mut user = root("m:\n  k: 1\n");

        PatchEngine::new(vec![rule("m", Condition::IfUnchanged)])
            .apply(&mut user, &old, &new)
            .unwrap();
        user.get_mut("m").unwrap().set("k", Node::int(3)).unwrap();

        assert_eq!(yaml(&new), "m:\n  k: 2\n");
    }

    #[test]
    fn rules_run_in_order_over_the_shared_tree() {
        let old = root("a:\n  x: 1\n");
        let new = root("a:\n  x: 2\n  y: 3\n");
        let mut user = root("b: 0\n");

        let report = PatchEngine::default()
            .rule(rule("a", Condition::IfUnchanged))
            .rule(rule("a.y", Condition::IfUnchanged))
            .apply(&mut user, &old, &new)
            .unwrap();

        assert_eq!(report.changes(), 1);
        assert_eq!(report.outcome("a.y"), Some(RuleOutcome::Preserved));
        assert_eq!(yaml(&user), "a:\n  x: 2\n  y: 3\nb: 0\n");
    }
}
