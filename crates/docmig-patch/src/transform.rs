//! Post-processing of replacement values taken from the new default

use std::fmt::{self, Debug};

use docmig_tree::{Node, NodeKind};

/// Produces the value a rule writes, given a copy of the new default's node
///
/// Implement this for step-specific rewrites, or wrap a closure with
/// [`transform_fn`].
pub trait Transform: Send + Sync + Debug {
    /// Turn the new default's node into the value to write
    ///
    /// # Errors
    /// Returns error if the node does not have the shape the transform expects
    fn transform(&self, node: Node) -> Result<Node, TransformError>;

    /// Describe the transform for logs
    fn describe(&self) -> String;
}

/// Errors during transformation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    /// Generic failure
    #[error("{0}")]
    Failed(String),

    /// Node had an unexpected kind
    #[error("expected a {expected} node, found {found}")]
    KindMismatch { expected: NodeKind, found: NodeKind },

    /// Invalid input
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// [`Transform`] backed by a closure
pub struct FnTransform<F> {
    name: String,
    f: F,
}

impl<F> Debug for FnTransform<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnTransform")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl<F> Transform for FnTransform<F>
where
    F: Fn(Node) -> Result<Node, TransformError> + Send + Sync,
{
    fn transform(&self, node: Node) -> Result<Node, TransformError> {
        (self.f)(node)
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

/// Wrap a closure as a named [`Transform`]
///
/// # Examples
/// ```
/// use docmig_patch::{transform_fn, Transform};
/// use docmig_tree::Node;
///
/// let upper = transform_fn("uppercase", |node: Node| {
///     Ok(Node::string(node.as_str().unwrap_or_default().to_uppercase()))
/// });
/// assert_eq!(upper.transform(Node::string("anvil")).unwrap().as_str(), Some("ANVIL"));
/// assert_eq!(upper.describe(), "uppercase");
/// ```
pub fn transform_fn<F>(name: impl Into<String>, f: F) -> FnTransform<F>
where
    F: Fn(Node) -> Result<Node, TransformError> + Send + Sync,
{
    FnTransform {
        name: name.into(),
        f,
    }
}
