//! Writer for document trees
//!
//! Output is two-space indented block YAML. Sequences under a key are
//! indented below it, sequence items holding a collection use the compact
//! `- key: value` form unless the item carries a line comment. Scalars are
//! quoted only when reading them back unquoted would change their text or
//! type.

use std::fmt::Write as _;

use crate::node::{normalize_comment, CollectionStyle, Entry, Node, NodeValue, Scalar, ScalarStyle, ScalarTag};
use crate::parse::quote_can_open;

const INDENT: usize = 2;

/// Serialize a node as a whole document
pub(crate) fn emit_document(root: &Node) -> String {
    let mut emitter = Emitter::default();
    emitter.document(root);
    emitter.out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ctx {
    Root,
    Entry,
    Item,
}

#[derive(Debug, Default)]
struct Emitter {
    out: String,
}

impl Emitter {
    fn document(&mut self, root: &Node) {
        if is_block(root) && root.is_empty() {
            self.comments(trim_blank(&root.comments.head), 0, false);
            self.comments(foot(root), 0, false);
            return;
        }

        // blank lines after the head are kept; at least one separates it
        let head = skip_leading_blank(&root.comments.head);
        self.comments(head, 0, false);
        if head.last().is_some_and(|l| !l.is_empty()) {
            self.out.push('\n');
        }
        if is_block(root) {
            self.block(root, 0, false, true);
        } else {
            self.value(root, 0, Ctx::Root, None);
            self.comments(foot(root), 0, false);
        }
    }

    fn pad(&mut self, indent: usize) {
        self.out.extend(std::iter::repeat(' ').take(indent));
    }

    fn comments<S: AsRef<str>>(&mut self, lines: &[S], indent: usize, trim_leading_blank: bool) {
        let mut lines = lines.iter().map(AsRef::as_ref).peekable();
        if trim_leading_blank {
            while lines.next_if(|l| l.is_empty()).is_some() {}
        }
        for line in lines {
            if !line.is_empty() {
                self.pad(indent);
                self.out.push_str(&normalize_comment(line));
            }
            self.out.push('\n');
        }
    }

    fn line_comments(&mut self, comments: [Option<&str>; 2]) {
        for comment in comments.into_iter().flatten() {
            let comment = normalize_comment(comment);
            if !comment.is_empty() {
                self.out.push(' ');
                self.out.push_str(&comment);
            }
        }
    }

    /// Children of a block collection, then its foot. With `inline_first`
    /// the first child continues the current line and its head comments
    /// have already been written above the dash.
    fn block(&mut self, node: &Node, indent: usize, inline_first: bool, trim_first: bool) {
        match &node.value {
            NodeValue::Mapping { entries, .. } => {
                for (i, entry) in entries.iter().enumerate() {
                    if !(inline_first && i == 0) {
                        self.comments(&entry_heads(entry), indent, trim_first && i == 0);
                        self.pad(indent);
                    }
                    self.out.push_str(&key_text(&entry.key));
                    self.out.push(':');
                    self.value(
                        &entry.value,
                        indent,
                        Ctx::Entry,
                        entry.key.comments.line.as_deref(),
                    );
                }
            }
            NodeValue::Sequence { items, .. } => {
                for (i, item) in items.iter().enumerate() {
                    if !(inline_first && i == 0) {
                        let mut heads: Vec<&str> =
                            item.comments.head.iter().map(String::as_str).collect();
                        if compact(item) {
                            heads.extend(hoisted(item));
                        }
                        self.comments(&heads, indent, trim_first && i == 0);
                        self.pad(indent);
                    }
                    self.out.push('-');
                    if compact(item) {
                        self.out.push(' ');
                        self.block(item, indent + INDENT, true, false);
                    } else {
                        self.value(item, indent, Ctx::Item, None);
                    }
                }
            }
            NodeValue::Scalar(_) => return,
        }
        self.comments(foot(node), indent, false);
    }

    /// Rest of the line after `key:` or `-`, plus any nested lines
    fn value(&mut self, node: &Node, indent: usize, ctx: Ctx, key_comment: Option<&str>) {
        let comments = [key_comment, node.comments.line.as_deref()];
        let sep = if ctx == Ctx::Root { "" } else { " " };

        if is_block(node) && !node.is_empty() {
            self.line_comments(comments);
            self.out.push('\n');
            let child = indent + INDENT;
            if ctx == Ctx::Entry {
                self.comments(&node.comments.head, child, false);
            }
            self.block(node, child, false, false);
            return;
        }

        match &node.value {
            NodeValue::Scalar(s) if literal_ok(s) => {
                self.out.push_str(sep);
                self.out.push('|');
                if !s.text.ends_with('\n') {
                    self.out.push('-');
                }
                self.line_comments(comments);
                self.out.push('\n');
                let body = s.text.strip_suffix('\n').unwrap_or(&s.text);
                for line in body.split('\n') {
                    if !line.is_empty() {
                        self.pad(indent + INDENT);
                        self.out.push_str(line);
                    }
                    self.out.push('\n');
                }
            }
            NodeValue::Scalar(s)
                if ctx != Ctx::Root && s.tag == ScalarTag::Null && s.text.is_empty() =>
            {
                self.line_comments(comments);
                self.out.push('\n');
            }
            _ => {
                self.out.push_str(sep);
                self.out.push_str(&flow_text(node));
                self.line_comments(comments);
                self.out.push('\n');
            }
        }
    }
}

fn is_block(node: &Node) -> bool {
    matches!(
        node.value,
        NodeValue::Mapping {
            style: CollectionStyle::Block,
            ..
        } | NodeValue::Sequence {
            style: CollectionStyle::Block,
            ..
        }
    )
}

/// Sequence item written as `- first child` on the dash line
fn compact(item: &Node) -> bool {
    is_block(item) && !item.is_empty() && !has_line_comment(item)
}

/// Line comment that produces text; blank ones are never written
fn has_line_comment(node: &Node) -> bool {
    node.comments
        .line
        .as_deref()
        .is_some_and(|c| !normalize_comment(c).is_empty())
}

/// Comments written above an entry's key line
fn entry_heads(entry: &Entry) -> Vec<&str> {
    let mut heads: Vec<&str> = entry.key.comments.head.iter().map(String::as_str).collect();
    if !(is_block(&entry.value) && !entry.value.is_empty()) {
        heads.extend(entry.value.comments.head.iter().map(String::as_str));
    }
    heads
}

/// Head comments of the first child of a compact item, which move above the dash
fn hoisted(node: &Node) -> Vec<&str> {
    match &node.value {
        NodeValue::Mapping { entries, .. } => entries.first().map(entry_heads).unwrap_or_default(),
        NodeValue::Sequence { items, .. } => items
            .first()
            .map(|first| {
                let mut heads: Vec<&str> = first.comments.head.iter().map(String::as_str).collect();
                if compact(first) {
                    heads.extend(hoisted(first));
                }
                heads
            })
            .unwrap_or_default(),
        NodeValue::Scalar(_) => Vec::new(),
    }
}

/// Foot comments without trailing blank lines, which would not read back
fn foot(node: &Node) -> &[String] {
    let lines = &node.comments.foot;
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(0, |i| i + 1);
    &lines[..end]
}

fn skip_leading_blank(lines: &[String]) -> &[String] {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    &lines[start..]
}

fn trim_blank(lines: &[String]) -> &[String] {
    let start = lines.iter().position(|l| !l.is_empty()).unwrap_or(lines.len());
    let end = lines.iter().rposition(|l| !l.is_empty()).map_or(start, |i| i + 1);
    &lines[start..end]
}

fn key_text(key: &Node) -> String {
    match &key.value {
        NodeValue::Scalar(s) => scalar_text(s, false),
        _ => flow_text(key),
    }
}

fn flow_text(node: &Node) -> String {
    match &node.value {
        NodeValue::Mapping { entries, .. } => {
            let body: Vec<String> = entries
                .iter()
                .map(|e| format!("{}: {}", flow_text(&e.key), flow_text(&e.value)))
                .collect();
            format!("{{{}}}", body.join(", "))
        }
        NodeValue::Sequence { items, .. } => {
            let body: Vec<String> = items.iter().map(flow_text).collect();
            format!("[{}]", body.join(", "))
        }
        NodeValue::Scalar(s) => scalar_text(s, true),
    }
}

fn scalar_text(s: &Scalar, flow: bool) -> String {
    match s.style {
        ScalarStyle::SingleQuoted if !s.text.chars().any(char::is_control) => {
            format!("'{}'", s.text.replace('\'', "''"))
        }
        ScalarStyle::DoubleQuoted => double_quoted(&s.text),
        _ => match s.tag {
            ScalarTag::Null if s.text.is_empty() => "null".to_string(),
            ScalarTag::Str if plain_safe(&s.text, flow) => s.text.clone(),
            ScalarTag::Str => double_quoted(&s.text),
            tag if ScalarTag::resolve(&s.text) == tag => s.text.clone(),
            _ => double_quoted(&s.text),
        },
    }
}

/// True when `text` reads back unquoted as the same string
fn plain_safe(text: &str, flow: bool) -> bool {
    if ScalarTag::resolve(text) != ScalarTag::Str {
        return false;
    }
    let Some(first) = text.chars().next() else {
        return false;
    };
    if text.starts_with([' ', '\t'])
        || text.ends_with([' ', '\t'])
        || text.starts_with("---")
        || text.starts_with("...")
    {
        return false;
    }

    let second = text[first.len_utf8()..].chars().next();
    match first {
        '-' | '?' | ':' => {
            if second.map_or(true, |c| c.is_whitespace() || (flow && ",[]{}".contains(c))) {
                return false;
            }
        }
        ',' | '[' | ']' | '{' | '}' | '#' | '&' | '*' | '!' | '|' | '>' | '\'' | '"' | '%'
        | '@' | '`' => return false,
        _ => {}
    }

    if text.chars().any(char::is_control)
        || text.contains(" #")
        || text.contains(": ")
        || text.ends_with(':')
    {
        return false;
    }
    if flow && text.contains([',', '[', ']', '{', '}']) {
        return false;
    }
    !text
        .char_indices()
        .any(|(i, c)| matches!(c, '\'' | '"') && quote_can_open(&text[..i]))
}

fn double_quoted(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => {
                let _ = write!(out, "\\u{:04X}", u32::from(c));
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Literal block form is used only when it reads back to the same text
fn literal_ok(s: &Scalar) -> bool {
    if s.style != ScalarStyle::Literal || s.tag != ScalarTag::Str || s.text.ends_with("\n\n") {
        return false;
    }
    let body = s.text.strip_suffix('\n').unwrap_or(&s.text);
    if body.is_empty() || body.chars().any(|c| c.is_control() && c != '\n' && c != '\t') {
        return false;
    }
    let starts_indented = body
        .split('\n')
        .find(|l| !l.is_empty())
        .map_or(true, |l| l.starts_with([' ', '\t']));
    !starts_indented && !body.split('\n').any(|l| l.ends_with([' ', '\t']))
}
