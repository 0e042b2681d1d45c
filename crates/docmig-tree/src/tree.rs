//! Tree utilities: path resolution, parent lookup, deep merge and
//! order-preserving structural edits
//!
//! Lookups never fail: a path through a scalar, a missing key or an
//! out-of-range index resolves to `None`. Edits return [`TreeError`] when the
//! target container cannot take them.

use crate::error::{TreeError, TreeResult};
use crate::node::{Entry, Node, NodeKind, NodeValue, Scalar};
use crate::path::DocPath;

/// Position of a path's last segment inside its parent container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    /// Index of the entry or item; for a missing mapping key, the index a
    /// newly appended entry would get
    pub index: usize,
    /// Whether the segment currently exists in the parent
    pub present: bool,
}

/// Sequence segments are plain base-10 digits, nothing else
fn parse_index(segment: &str) -> Option<usize> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}

/// Child addressed by one path segment
#[must_use]
pub fn child<'a>(node: &'a Node, segment: &str) -> Option<&'a Node> {
    match &node.value {
        NodeValue::Mapping { entries, .. } => entries
            .iter()
            .find(|e| e.key_str() == Some(segment))
            .map(|e| &e.value),
        NodeValue::Sequence { items, .. } => parse_index(segment).and_then(|i| items.get(i)),
        NodeValue::Scalar(_) => None,
    }
}

/// Mutable child addressed by one path segment
pub fn child_mut<'a>(node: &'a mut Node, segment: &str) -> Option<&'a mut Node> {
    match &mut node.value {
        NodeValue::Mapping { entries, .. } => entries
            .iter_mut()
            .find(|e| e.key_str() == Some(segment))
            .map(|e| &mut e.value),
        NodeValue::Sequence { items, .. } => parse_index(segment).and_then(|i| items.get_mut(i)),
        NodeValue::Scalar(_) => None,
    }
}

/// Walk `path` from `root`; the empty path resolves to `root` itself
///
/// # Examples
/// ```
/// use docmig_tree::{resolve, Document, DocPath};
///
/// let doc = Document::parse("a:\n  b: [x, y]\n").unwrap();
/// let path: DocPath = "a.b.1".parse().unwrap();
/// assert_eq!(resolve(doc.root(), &path).and_then(|n| n.as_str()), Some("y"));
/// ```
#[must_use]
pub fn resolve<'a>(root: &'a Node, path: &DocPath) -> Option<&'a Node> {
    path.iter().try_fold(root, |node, segment| child(node, segment))
}

/// Mutable variant of [`resolve`]; edits through the result are edits of the tree
pub fn resolve_mut<'a>(root: &'a mut Node, path: &DocPath) -> Option<&'a mut Node> {
    path.iter()
        .try_fold(root, |node, segment| child_mut(node, segment))
}

fn slot_in(parent: &Node, segment: &str) -> Option<Slot> {
    match &parent.value {
        NodeValue::Mapping { entries, .. } => Some(
            match entries.iter().position(|e| e.key_str() == Some(segment)) {
                Some(index) => Slot {
                    index,
                    present: true,
                },
                None => Slot {
                    index: entries.len(),
                    present: false,
                },
            },
        ),
        NodeValue::Sequence { items, .. } => parse_index(segment).map(|index| Slot {
            index,
            present: index < items.len(),
        }),
        NodeValue::Scalar(_) => None,
    }
}

/// Parent container of `path` and the slot of its last segment
///
/// Returns `None` for the root path, when the parent does not resolve, or
/// when the parent cannot hold the segment (a scalar, or a non-index segment
/// into a sequence).
#[must_use]
pub fn find_parent<'a>(root: &'a Node, path: &DocPath) -> Option<(&'a Node, Slot)> {
    let (last, parent_path) = path.segments().split_last()?;
    let parent = parent_path
        .iter()
        .try_fold(root, |node, segment| child(node, segment))?;
    let slot = slot_in(parent, last)?;
    Some((parent, slot))
}

/// Mutable variant of [`find_parent`]
pub fn find_parent_mut<'a>(root: &'a mut Node, path: &DocPath) -> Option<(&'a mut Node, Slot)> {
    let (last, parent_path) = path.segments().split_last()?;
    let parent = parent_path
        .iter()
        .try_fold(root, |node, segment| child_mut(node, segment))?;
    let slot = slot_in(parent, last)?;
    Some((parent, slot))
}

/// Merge `src` into a copy of `dst`
///
/// Mappings merge key by key, recursing where both sides hold mappings and
/// appending keys only `src` has. Any other pair yields a copy of `src`. A
/// missing side yields a copy of the other. Neither input is modified.
#[must_use]
pub fn deep_merge(dst: Option<&Node>, src: Option<&Node>) -> Option<Node> {
    match (dst, src) {
        (None, None) => None,
        (Some(only), None) | (None, Some(only)) => Some(only.clone()),
        (Some(dst), Some(src)) => Some(merge_nodes(dst, src)),
    }
}

fn merge_nodes(dst: &Node, src: &Node) -> Node {
    match (&dst.value, &src.value) {
        (
            NodeValue::Mapping {
                entries: dst_entries,
                style,
            },
            NodeValue::Mapping {
                entries: src_entries,
                ..
            },
        ) => {
            let mut entries = dst_entries.clone();
            for incoming in src_entries {
                let key = incoming.key_str();
                match entries
                    .iter_mut()
                    .find(|e| key.is_some() && e.key_str() == key)
                {
                    Some(existing) => existing.value = merge_nodes(&existing.value, &incoming.value),
                    None => entries.push(incoming.clone()),
                }
            }
            Node {
                value: NodeValue::Mapping {
                    entries,
                    style: *style,
                },
                comments: dst.comments.clone(),
            }
        }
        _ => src.clone(),
    }
}

/// Insert a child at `index`, shifting later siblings right
///
/// Mappings take a key, sequences take none.
///
/// # Errors
/// - [`TreeError::KindMismatch`] if `parent` is a scalar
/// - [`TreeError::InvalidEdit`] if `key` does not match the container kind
/// - [`TreeError::IndexOutOfRange`] if `index` is past the end
/// - [`TreeError::KeyExists`] if the mapping already has the key
pub fn insert_at(parent: &mut Node, index: usize, key: Option<Node>, value: Node) -> TreeResult<()> {
    match (&mut parent.value, key) {
        (NodeValue::Mapping { entries, .. }, Some(key)) => {
            if index > entries.len() {
                return Err(TreeError::IndexOutOfRange {
                    index,
                    len: entries.len(),
                });
            }
            if let Some(name) = key.as_str() {
                if entries.iter().any(|e| e.key_str() == Some(name)) {
                    return Err(TreeError::KeyExists(name.to_string()));
                }
            }
            entries.insert(index, Entry { key, value });
            Ok(())
        }
        (NodeValue::Sequence { items, .. }, None) => {
            if index > items.len() {
                return Err(TreeError::IndexOutOfRange {
                    index,
                    len: items.len(),
                });
            }
            items.insert(index, value);
            Ok(())
        }
        (NodeValue::Mapping { .. }, None) => Err(TreeError::InvalidEdit(
            "inserting into a mapping requires a key".into(),
        )),
        (NodeValue::Sequence { .. }, Some(_)) => Err(TreeError::InvalidEdit(
            "inserting into a sequence takes no key".into(),
        )),
        (NodeValue::Scalar(_), _) => Err(TreeError::KindMismatch {
            expected: NodeKind::Mapping,
            found: NodeKind::Scalar,
        }),
    }
}

/// Remove the child at `index`, keeping the order of the rest
///
/// Returns the removed value (for a mapping, the entry's key is dropped).
///
/// # Errors
/// - [`TreeError::KindMismatch`] if `parent` is a scalar
/// - [`TreeError::IndexOutOfRange`] if there is no child at `index`
pub fn delete_at(parent: &mut Node, index: usize) -> TreeResult<Node> {
    let len = parent.len();
    match &mut parent.value {
        NodeValue::Mapping { entries, .. } if index < len => Ok(entries.remove(index).value),
        NodeValue::Sequence { items, .. } if index < len => Ok(items.remove(index)),
        NodeValue::Scalar(_) => Err(TreeError::KindMismatch {
            expected: NodeKind::Mapping,
            found: NodeKind::Scalar,
        }),
        _ => Err(TreeError::IndexOutOfRange { index, len }),
    }
}

fn expect_mapping(node: &mut Node) -> TreeResult<&mut Vec<Entry>> {
    let found = node.kind();
    node.entries_mut().ok_or(TreeError::KindMismatch {
        expected: NodeKind::Mapping,
        found,
    })
}

impl Node {
    /// Insert `entry` right after the sibling `after`, or at the end when
    /// `after` is absent. Returns the index the entry landed at.
    ///
    /// # Errors
    /// - [`TreeError::KindMismatch`] if `self` is not a mapping
    /// - [`TreeError::KeyExists`] if the key is already present
    pub fn insert_after(&mut self, after: &str, entry: Entry) -> TreeResult<usize> {
        let index = self.key_position(after).map_or(self.len(), |i| i + 1);
        let found = self.kind();
        if found != NodeKind::Mapping {
            return Err(TreeError::KindMismatch {
                expected: NodeKind::Mapping,
                found,
            });
        }
        insert_at(self, index, Some(entry.key), entry.value)?;
        Ok(index)
    }

    /// Rename a key in place, keeping its position, value and comments.
    /// Returns `false` when `from` is absent.
    ///
    /// # Errors
    /// - [`TreeError::KindMismatch`] if `self` is not a mapping
    /// - [`TreeError::KeyExists`] if `to` is already taken by another entry
    pub fn rename_key(&mut self, from: &str, to: &str) -> TreeResult<bool> {
        let entries = expect_mapping(self)?;
        if from != to && entries.iter().any(|e| e.key_str() == Some(to)) {
            return Err(TreeError::KeyExists(to.to_string()));
        }
        let Some(entry) = entries.iter_mut().find(|e| e.key_str() == Some(from)) else {
            return Ok(false);
        };
        entry.key.value = NodeValue::Scalar(Scalar::plain(to));
        Ok(true)
    }

    /// Remove the entry under `key`
    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        let index = self.key_position(key)?;
        self.entries_mut().map(|entries| entries.remove(index))
    }

    /// Set the value under `key`, appending the entry if absent. An existing
    /// value's comments carry over when the new value has none.
    ///
    /// # Errors
    /// [`TreeError::KindMismatch`] if `self` is not a mapping
    pub fn set(&mut self, key: &str, value: Node) -> TreeResult<()> {
        let entries = expect_mapping(self)?;
        match entries.iter_mut().find(|e| e.key_str() == Some(key)) {
            Some(entry) => {
                let previous = std::mem::take(&mut entry.value.comments);
                entry.value = value;
                if entry.value.comments.is_empty() {
                    entry.value.comments = previous;
                }
            }
            None => entries.push(Entry::new(key, value)),
        }
        Ok(())
    }
}
