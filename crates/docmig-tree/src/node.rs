//! Document tree nodes
//!
//! A [`Node`] is a mapping, a sequence or a scalar, plus the comments attached
//! to it. Mappings keep their entries in document order; nothing is sorted.
//!
//! # Comment slots
//!
//! - `head`: lines above the node (blank lines are stored as empty strings)
//! - `line`: the trailing `# ...` on the node's own line
//! - `foot`: lines after the last child of a block collection
//!
//! For a mapping entry the head comment lives on the entry's key node.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::Value;

use crate::emit;
use crate::error::TreeError;

static INT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[-+]?[0-9]+|0o[0-7]+|0x[0-9a-fA-F]+)$").expect("valid regex"));

static FLOAT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(?:[-+]?(?:\.[0-9]+|[0-9]+(?:\.[0-9]*)?)(?:[eE][-+]?[0-9]+)?|[-+]?\.(?:inf|Inf|INF)|\.(?:nan|NaN|NAN))$",
    )
    .expect("valid regex")
});

/// Discriminant of a [`Node`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Mapping => "mapping",
            Self::Sequence => "sequence",
            Self::Scalar => "scalar",
        })
    }
}

/// Resolved type of a scalar
///
/// Controls how the writer emits the scalar: a `Str` whose text would read
/// back as another type is quoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarTag {
    Str,
    Int,
    Float,
    Bool,
    Null,
}

impl ScalarTag {
    /// Resolve the tag of an unquoted scalar (YAML 1.2 core schema)
    #[must_use]
    pub fn resolve(text: &str) -> Self {
        match text {
            "" | "~" | "null" | "Null" | "NULL" => Self::Null,
            "true" | "True" | "TRUE" | "false" | "False" | "FALSE" => Self::Bool,
            _ if INT_RE.is_match(text) => Self::Int,
            _ if FLOAT_RE.is_match(text) => Self::Float,
            _ => Self::Str,
        }
    }
}

/// How a scalar was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ScalarStyle {
    #[default]
    Plain,
    SingleQuoted,
    DoubleQuoted,
    Literal,
}

/// How a collection was written in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CollectionStyle {
    #[default]
    Block,
    Flow,
}

/// Comments attached to a node
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Comments {
    /// Lines above the node
    pub head: Vec<String>,
    /// Trailing comment on the node's line
    pub line: Option<String>,
    /// Lines after the last child of a block collection
    pub foot: Vec<String>,
}

impl Comments {
    /// True when no comment of any kind is attached
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.head.is_empty() && self.line.is_none() && self.foot.is_empty()
    }
}

/// Leaf value with its type tag and source style
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scalar {
    pub text: String,
    pub tag: ScalarTag,
    pub style: ScalarStyle,
}

impl Scalar {
    /// Unquoted scalar whose tag is resolved from its text
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        let text = text.into();
        let tag = ScalarTag::resolve(&text);
        Self {
            text,
            tag,
            style: ScalarStyle::Plain,
        }
    }

    /// String scalar; quoted on output if the text would read back as another type
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tag: ScalarTag::Str,
            style: ScalarStyle::Plain,
        }
    }

    /// Scalar with an explicit tag and style
    #[must_use]
    pub fn with_style(text: impl Into<String>, tag: ScalarTag, style: ScalarStyle) -> Self {
        Self {
            text: text.into(),
            tag,
            style,
        }
    }
}

/// One key/value pair of a mapping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Node,
    pub value: Node,
}

impl Entry {
    /// Entry with a plain string key
    #[must_use]
    pub fn new(key: impl Into<String>, value: Node) -> Self {
        Self {
            key: Node::scalar(Scalar::plain(key)),
            value,
        }
    }

    /// Key text (keys are scalars)
    #[inline]
    #[must_use]
    pub fn key_str(&self) -> Option<&str> {
        self.key.as_str()
    }

    /// Attach head comment lines above the key
    #[must_use]
    pub fn with_head_comment(mut self, lines: &[&str]) -> Self {
        self.key.comments.head = lines.iter().map(|l| normalize_comment(l)).collect();
        self
    }
}

/// Payload of a node, by kind
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeValue {
    Mapping {
        entries: Vec<Entry>,
        style: CollectionStyle,
    },
    Sequence {
        items: Vec<Node>,
        style: CollectionStyle,
    },
    Scalar(Scalar),
}

/// A node of the document tree
///
/// `Clone` is a deep copy: children and comments are owned, so a clone never
/// shares state with its source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub value: NodeValue,
    pub comments: Comments,
}

impl Node {
    /// Node with no comments
    #[inline]
    #[must_use]
    pub fn new(value: NodeValue) -> Self {
        Self {
            value,
            comments: Comments::default(),
        }
    }

    /// Block mapping
    #[must_use]
    pub fn mapping(entries: Vec<Entry>) -> Self {
        Self::new(NodeValue::Mapping {
            entries,
            style: CollectionStyle::Block,
        })
    }

    /// Block sequence
    #[must_use]
    pub fn sequence(items: Vec<Node>) -> Self {
        Self::new(NodeValue::Sequence {
            items,
            style: CollectionStyle::Block,
        })
    }

    /// Scalar node
    #[inline]
    #[must_use]
    pub fn scalar(scalar: Scalar) -> Self {
        Self::new(NodeValue::Scalar(scalar))
    }

    /// String scalar
    #[must_use]
    pub fn string(text: impl Into<String>) -> Self {
        Self::scalar(Scalar::string(text))
    }

    /// Unquoted scalar with a resolved tag
    #[must_use]
    pub fn plain(text: impl Into<String>) -> Self {
        Self::scalar(Scalar::plain(text))
    }

    /// Integer scalar
    #[must_use]
    pub fn int(value: i64) -> Self {
        Self::scalar(Scalar::with_style(
            value.to_string(),
            ScalarTag::Int,
            ScalarStyle::Plain,
        ))
    }

    /// Boolean scalar
    #[must_use]
    pub fn bool(value: bool) -> Self {
        Self::scalar(Scalar::with_style(
            value.to_string(),
            ScalarTag::Bool,
            ScalarStyle::Plain,
        ))
    }

    /// Empty null scalar (`key:` with nothing after it)
    #[must_use]
    pub fn null() -> Self {
        Self::scalar(Scalar::with_style("", ScalarTag::Null, ScalarStyle::Plain))
    }

    /// Attach head comment lines
    #[must_use]
    pub fn with_head_comment(mut self, lines: &[&str]) -> Self {
        self.comments.head = lines.iter().map(|l| normalize_comment(l)).collect();
        self
    }

    /// Attach a trailing comment
    #[must_use]
    pub fn with_line_comment(mut self, comment: &str) -> Self {
        let comment = normalize_comment(comment);
        self.comments.line = (!comment.is_empty()).then_some(comment);
        self
    }

    /// Node kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self.value {
            NodeValue::Mapping { .. } => NodeKind::Mapping,
            NodeValue::Sequence { .. } => NodeKind::Sequence,
            NodeValue::Scalar(_) => NodeKind::Scalar,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_mapping(&self) -> bool {
        self.kind() == NodeKind::Mapping
    }

    #[inline]
    #[must_use]
    pub fn is_sequence(&self) -> bool {
        self.kind() == NodeKind::Sequence
    }

    #[inline]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        self.kind() == NodeKind::Scalar
    }

    /// Scalar payload
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&Scalar> {
        match &self.value {
            NodeValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Scalar text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().map(|s| s.text.as_str())
    }

    /// Mapping entries
    #[inline]
    #[must_use]
    pub fn entries(&self) -> Option<&[Entry]> {
        match &self.value {
            NodeValue::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Mutable mapping entries
    #[inline]
    pub fn entries_mut(&mut self) -> Option<&mut Vec<Entry>> {
        match &mut self.value {
            NodeValue::Mapping { entries, .. } => Some(entries),
            _ => None,
        }
    }

    /// Sequence items
    #[inline]
    #[must_use]
    pub fn items(&self) -> Option<&[Node]> {
        match &self.value {
            NodeValue::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Mutable sequence items
    #[inline]
    pub fn items_mut(&mut self) -> Option<&mut Vec<Node>> {
        match &mut self.value {
            NodeValue::Sequence { items, .. } => Some(items),
            _ => None,
        }
    }

    /// Number of children (0 for scalars)
    #[must_use]
    pub fn len(&self) -> usize {
        match &self.value {
            NodeValue::Mapping { entries, .. } => entries.len(),
            NodeValue::Sequence { items, .. } => items.len(),
            NodeValue::Scalar(_) => 0,
        }
    }

    /// True for scalars and empty collections
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Position of `key` in this mapping
    #[must_use]
    pub fn key_position(&self, key: &str) -> Option<usize> {
        self.entries()?
            .iter()
            .position(|e| e.key_str() == Some(key))
    }

    /// Value under `key` in this mapping
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries()?
            .iter()
            .find(|e| e.key_str() == Some(key))
            .map(|e| &e.value)
    }

    /// Mutable value under `key` in this mapping
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Node> {
        self.entries_mut()?
            .iter_mut()
            .find(|e| e.key_str() == Some(key))
            .map(|e| &mut e.value)
    }

    /// Canonical serialization: the writer's output for this node alone,
    /// comments included
    #[must_use]
    pub fn to_canonical(&self) -> String {
        emit::emit_document(self)
    }

    /// Convert to a `serde_yaml` value, dropping comments and styles
    #[must_use]
    pub fn to_value(&self) -> Value {
        match &self.value {
            NodeValue::Mapping { entries, .. } => Value::Mapping(
                entries
                    .iter()
                    .map(|e| (e.key.to_value(), e.value.to_value()))
                    .collect(),
            ),
            NodeValue::Sequence { items, .. } => {
                Value::Sequence(items.iter().map(Node::to_value).collect())
            }
            NodeValue::Scalar(s) => scalar_value(s),
        }
    }

    /// Build a node from a `serde_yaml` value
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Null => Self::scalar(Scalar::with_style(
                "null",
                ScalarTag::Null,
                ScalarStyle::Plain,
            )),
            Value::Bool(b) => Self::bool(*b),
            Value::Number(n) => {
                let tag = if n.is_f64() {
                    ScalarTag::Float
                } else {
                    ScalarTag::Int
                };
                Self::scalar(Scalar::with_style(n.to_string(), tag, ScalarStyle::Plain))
            }
            Value::String(s) => Self::string(s.clone()),
            Value::Sequence(items) => Self::sequence(items.iter().map(Self::from_value).collect()),
            Value::Mapping(map) => Self::mapping(
                map.iter()
                    .map(|(k, v)| Entry {
                        key: Self::from_value(k),
                        value: Self::from_value(v),
                    })
                    .collect(),
            ),
            Value::Tagged(tagged) => Self::from_value(&tagged.value),
        }
    }

    /// Build a node from any serializable value
    ///
    /// # Errors
    /// Returns [`TreeError::Conversion`] if `serde_yaml` rejects the value
    pub fn from_serialize<T: serde::Serialize>(value: &T) -> Result<Self, TreeError> {
        let value = serde_yaml::to_value(value).map_err(|e| TreeError::Conversion(e.to_string()))?;
        Ok(Self::from_value(&value))
    }
}

fn scalar_value(s: &Scalar) -> Value {
    match s.tag {
        ScalarTag::Str => Value::String(s.text.clone()),
        ScalarTag::Null => Value::Null,
        ScalarTag::Bool => Value::Bool(s.text.eq_ignore_ascii_case("true")),
        ScalarTag::Int | ScalarTag::Float => match serde_yaml::from_str::<Value>(&s.text) {
            Ok(number @ Value::Number(_)) => number,
            _ => Value::String(s.text.clone()),
        },
    }
}

/// Prefix `#` when a caller passes bare comment text; blank stays blank
pub(crate) fn normalize_comment(text: &str) -> String {
    let text = text.trim_end();
    if text.is_empty() || text.starts_with('#') {
        text.to_string()
    } else {
        format!("# {text}")
    }
}
