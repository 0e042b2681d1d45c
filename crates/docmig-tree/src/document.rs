//! Whole documents: reading, writing and the top-level `version` field

use std::fmt;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde_yaml::Value;

use crate::emit::emit_document;
use crate::error::{TreeError, TreeResult};
use crate::fingerprint::Fingerprint;
use crate::node::{Entry, Node, NodeKind, NodeValue, Scalar, ScalarStyle, ScalarTag};
use crate::parse::parse_document;
use crate::path::DocPath;
use crate::tree::{resolve, resolve_mut};

/// Top-level key holding a document's schema version
pub const VERSION_KEY: &str = "version";

/// A parsed document
///
/// Owns its root node. Writing an untouched document reproduces the writer's
/// canonical form of the input, comments and key order included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    root: Node,
}

impl Document {
    /// Parse document text
    ///
    /// # Errors
    /// Returns [`TreeError`] on malformed input or unsupported YAML features,
    /// with the offending line number
    ///
    /// # Examples
    /// ```
    /// use docmig_tree::Document;
    ///
    /// let doc = Document::parse("# managed\nversion: 0.0.1\n").unwrap();
    /// assert_eq!(doc.version(), Some("0.0.1"));
    /// assert_eq!(doc.to_yaml(), "# managed\nversion: 0.0.1\n");
    /// ```
    pub fn parse(src: &str) -> TreeResult<Self> {
        parse_document(src).map(Self::from_root)
    }

    /// Wrap an existing root node
    #[inline]
    #[must_use]
    pub fn from_root(root: Node) -> Self {
        Self { root }
    }

    #[inline]
    #[must_use]
    pub fn root(&self) -> &Node {
        &self.root
    }

    #[inline]
    pub fn root_mut(&mut self) -> &mut Node {
        &mut self.root
    }

    #[inline]
    #[must_use]
    pub fn into_root(self) -> Node {
        self.root
    }

    /// Serialize to text
    #[must_use]
    pub fn to_yaml(&self) -> String {
        emit_document(&self.root)
    }

    /// Node at `path`
    #[must_use]
    pub fn get(&self, path: &DocPath) -> Option<&Node> {
        resolve(&self.root, path)
    }

    /// Mutable node at `path`
    pub fn get_mut(&mut self, path: &DocPath) -> Option<&mut Node> {
        resolve_mut(&mut self.root, path)
    }

    /// Declared schema version: the text of the top-level `version` scalar
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root
            .get(VERSION_KEY)
            .and_then(Node::as_str)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Record `version` in the top-level `version` field
    ///
    /// An existing field keeps its position, quoting and comments. A missing
    /// one is inserted as the first key.
    ///
    /// # Errors
    /// [`TreeError::KindMismatch`] if the root is not a mapping
    pub fn set_version(&mut self, version: &str) -> TreeResult<()> {
        let found = self.root.kind();
        let Some(entries) = self.root.entries_mut() else {
            return Err(TreeError::KindMismatch {
                expected: NodeKind::Mapping,
                found,
            });
        };

        match entries.iter_mut().find(|e| e.key_str() == Some(VERSION_KEY)) {
            Some(entry) => {
                let style = match entry.value.as_scalar().map(|s| s.style) {
                    Some(style @ (ScalarStyle::SingleQuoted | ScalarStyle::DoubleQuoted)) => style,
                    _ => ScalarStyle::Plain,
                };
                entry.value.value =
                    NodeValue::Scalar(Scalar::with_style(version, ScalarTag::Str, style));
            }
            None => entries.insert(0, Entry::new(VERSION_KEY, Node::string(version))),
        }
        Ok(())
    }

    /// Comment-free `serde_yaml` view of the document
    #[must_use]
    pub fn to_value(&self) -> Value {
        self.root.to_value()
    }

    /// Deserialize into a typed value, e.g. to check required fields
    ///
    /// # Errors
    /// [`TreeError::Conversion`] if the document does not match `T`
    pub fn deserialize<T: DeserializeOwned>(&self) -> TreeResult<T> {
        serde_yaml::from_value(self.to_value()).map_err(|e| TreeError::Conversion(e.to_string()))
    }

    /// Fingerprint of the serialized text
    #[must_use]
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(self.to_yaml().as_bytes())
    }
}

impl FromStr for Document {
    type Err = TreeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_yaml())
    }
}

impl From<Node> for Document {
    fn from(root: Node) -> Self {
        Self::from_root(root)
    }
}
