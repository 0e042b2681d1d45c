//! Conditions deciding whether a rule fires on a node the user already has

use std::fmt;

use docmig_tree::Node;

/// Predicate over a user node and the old default's node at the same path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Condition {
    /// Fire unconditionally
    Always,
    /// Fire only while the user still has the old default's value
    ///
    /// Compares canonical serializations, comments included. When the old
    /// default has nothing at the path, the user's node is their own addition
    /// and the rule does not fire.
    #[default]
    IfUnchanged,
}

impl Condition {
    /// Evaluate against the user's node and the old default's node
    #[must_use]
    pub fn holds(self, user: &Node, old: Option<&Node>) -> bool {
        match self {
            Self::Always => true,
            Self::IfUnchanged => old.is_some_and(|old| user.to_canonical() == old.to_canonical()),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Always => f.write_str("always"),
            Self::IfUnchanged => f.write_str("if-unchanged"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docmig_tree::{Document, Scalar, ScalarStyle, ScalarTag};

    fn value(src: &str) -> Node {
        Document::parse(&format!("v: {src}\n"))
            .unwrap()
            .root()
            .get("v")
            .cloned()
            .unwrap()
    }

    #[test]
    fn always_ignores_both_sides() {
        assert!(Condition::Always.holds(&value("1"), None));
        assert!(Condition::Always.holds(&value("1"), Some(&value("2"))));
    }

    #[test]
    fn unchanged_compares_canonical_text() {
        let cond = Condition::IfUnchanged;
        assert!(cond.holds(&value("22475020"), Some(&value("22475020"))));
        assert!(!cond.holds(&value("22475021"), Some(&value("22475020"))));
        assert!(cond.holds(&value("{a: 1,   b: 2}"), Some(&value("{a: 1, b: 2}"))));
    }

    #[test]
    fn unchanged_counts_comments_and_quoting_as_edits() {
        let cond = Condition::IfUnchanged;
        assert!(!cond.holds(&value("8545 # mine"), Some(&value("8545"))));

        let quoted = Node::scalar(Scalar::with_style("x", ScalarTag::Str, ScalarStyle::DoubleQuoted));
        assert!(!cond.holds(&quoted, Some(&Node::string("x"))));
    }

    #[test]
    fn unchanged_without_old_value_never_fires() {
        assert!(!Condition::IfUnchanged.holds(&value("1"), None));
    }

    #[test]
    fn default_is_if_unchanged() {
        assert_eq!(Condition::default(), Condition::IfUnchanged);
        assert_eq!(Condition::IfUnchanged.to_string(), "if-unchanged");
    }
}
