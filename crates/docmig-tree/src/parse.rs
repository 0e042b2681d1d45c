//! Reader for the block-structured YAML subset
//!
//! Supported: block mappings and sequences (including compact `- key: value`
//! items), single-line flow collections, plain and quoted scalars, literal and
//! folded block scalars, comments, one optional `---` start marker and one
//! optional `...` end marker.
//!
//! Anchors, aliases, tags, directives, complex keys, multi-line flow
//! collections and multi-document streams are rejected with
//! [`TreeError::Unsupported`] or [`TreeError::Syntax`].
//!
//! Comment attachment:
//! - comment and blank lines above a node become its head comments
//! - a trailing `# ...` becomes the line comment of the value on that line,
//!   or of the key when the value is a nested block
//! - comments after the last child of a block collection, indented at least
//!   as deep as that collection, become its foot comments
//! - a head block separated from the first node by a blank line is the
//!   document head, stored on the root

use std::collections::HashSet;

use crate::error::{TreeError, TreeResult};
use crate::node::{CollectionStyle, Entry, Node, NodeValue, Scalar, ScalarStyle, ScalarTag};

/// Parse a whole document into its root node
pub(crate) fn parse_document(src: &str) -> TreeResult<Node> {
    let src = src.strip_prefix('\u{feff}').unwrap_or(src);
    Parser::new(src).document()
}

#[derive(Debug, Clone, Copy)]
struct Line<'a> {
    number: usize,
    /// Leading spaces
    indent: usize,
    /// Content without indentation or trailing whitespace
    text: &'a str,
    raw: &'a str,
    tab: bool,
}

impl<'a> Line<'a> {
    fn new(number: usize, raw: &'a str) -> Self {
        let content = raw.trim_start_matches([' ', '\t']);
        let lead = raw.len() - content.len();
        let indent = raw.len() - raw.trim_start_matches(' ').len();
        let text = content.trim_end();
        let tab = raw[..lead].contains('\t') && !text.is_empty() && !text.starts_with('#');
        Self {
            number,
            indent,
            text,
            raw,
            tab,
        }
    }

    fn is_trivia(&self) -> bool {
        self.text.is_empty() || self.text.starts_with('#')
    }

    fn is_blank(&self) -> bool {
        self.raw.trim_matches([' ', '\t']).is_empty()
    }

    fn is_start_marker(&self) -> bool {
        self.indent == 0
            && (self.text == "---" || self.text.starts_with("--- ") || self.text.starts_with("---\t"))
    }

    fn is_marker(&self) -> bool {
        self.is_start_marker() || (self.indent == 0 && self.text == "...")
    }
}

#[derive(Debug)]
struct Pending {
    text: String,
    indent: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Chomp {
    Strip,
    Clip,
    Keep,
}

struct Parser<'a> {
    lines: Vec<Line<'a>>,
    pos: usize,
    pending: Vec<Pending>,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            lines: src
                .lines()
                .enumerate()
                .map(|(i, raw)| Line::new(i + 1, raw))
                .collect(),
            pos: 0,
            pending: Vec::new(),
        }
    }

    fn document(mut self) -> TreeResult<Node> {
        let mut first = self.structural()?;
        if let Some(line) = first {
            if line.text.starts_with('%') {
                return Err(unsupported(line.number, "directives"));
            }
            if line.is_start_marker() {
                let (inline, _) = split_comment(&line.text[3..]);
                if !inline.is_empty() {
                    return Err(unsupported(line.number, "values on the document start line"));
                }
                self.pos += 1;
                first = self.structural()?;
            }
        }

        let mut root = match first {
            Some(line) if !line.is_marker() => self.block(line, -1)?,
            _ => Node::mapping(Vec::new()),
        };

        if let Some(line) = self.structural()? {
            if line.is_start_marker() {
                return Err(unsupported(line.number, "multiple documents"));
            }
            if line.text != "..." {
                return Err(TreeError::syntax(
                    line.number,
                    "unexpected content at this indentation",
                ));
            }
            self.pos += 1;
            if let Some(next) = self.structural()? {
                return Err(if next.is_start_marker() {
                    unsupported(next.number, "multiple documents")
                } else {
                    TreeError::syntax(next.number, "content after the document end marker")
                });
            }
        }

        let mut rest = self.take_head();
        while rest.last().is_some_and(String::is_empty) {
            rest.pop();
        }
        root.comments.foot.extend(rest);
        split_document_head(&mut root);
        Ok(root)
    }

    fn peek(&self) -> Option<Line<'a>> {
        self.lines.get(self.pos).copied()
    }

    fn skip_trivia(&mut self) {
        while let Some(line) = self.peek() {
            if !line.is_trivia() {
                break;
            }
            self.pending.push(Pending {
                text: line.text.to_string(),
                indent: line.indent,
            });
            self.pos += 1;
        }
    }

    /// Next non-trivia line, queueing comments on the way
    fn structural(&mut self) -> TreeResult<Option<Line<'a>>> {
        self.skip_trivia();
        match self.peek() {
            Some(line) if line.tab => Err(TreeError::TabIndentation { line: line.number }),
            other => Ok(other),
        }
    }

    fn take_head(&mut self) -> Vec<String> {
        self.pending.drain(..).map(|p| p.text).collect()
    }

    fn take_foot(&mut self, indent: usize) -> Vec<String> {
        match self
            .pending
            .iter()
            .rposition(|p| !p.text.is_empty() && p.indent >= indent)
        {
            Some(last) => self.pending.drain(..=last).map(|p| p.text).collect(),
            None => Vec::new(),
        }
    }

    /// Node whose first line is `line`; `parent` is the enclosing indent
    fn block(&mut self, line: Line<'a>, parent: isize) -> TreeResult<Node> {
        if is_dash(line.text) {
            return self.sequence(line.indent, line.indent);
        }
        if split_key(line.text, line.number)?.is_some() {
            return self.mapping(line.indent);
        }

        self.pos += 1;
        let head = self.take_head();
        let (text, comment) = split_comment(line.text);
        let mut node = with_line(self.value(text, line.number, parent)?, comment);
        node.comments.head = head;
        Ok(node)
    }

    /// Block value following `key:` or `-` on a line of its own
    fn nested(&mut self, parent: usize, same_indent_seq: bool) -> TreeResult<Option<Node>> {
        let Some(line) = self.structural()? else {
            return Ok(None);
        };
        if line.is_marker() {
            return Ok(None);
        }
        if line.indent > parent {
            return self.block(line, to_signed(parent)).map(Some);
        }
        if same_indent_seq && line.indent == parent && is_dash(line.text) {
            return self.sequence(parent, parent + 1).map(Some);
        }
        Ok(None)
    }

    fn mapping(&mut self, indent: usize) -> TreeResult<Node> {
        let mut entries = Vec::new();
        let mut seen = HashSet::new();

        while let Some(line) = self.structural()? {
            if line.indent < indent || line.is_marker() {
                break;
            }
            if line.indent > indent {
                return Err(TreeError::syntax(line.number, "unexpected indentation"));
            }
            if is_dash(line.text) {
                return Err(TreeError::syntax(
                    line.number,
                    "expected a mapping key, found a sequence item",
                ));
            }
            let Some((mut key, rest)) = split_key(line.text, line.number)? else {
                return Err(TreeError::syntax(line.number, "expected a mapping key"));
            };
            let name = key.as_str().unwrap_or_default().to_string();
            if !seen.insert(name.clone()) {
                return Err(TreeError::DuplicateKey {
                    line: line.number,
                    key: name,
                });
            }

            self.pos += 1;
            key.comments.head = self.take_head();
            let (text, comment) = split_comment(rest.trim_start());
            let value = if text.is_empty() {
                if let Some(node) = self.nested(indent, true)? {
                    key.comments.line = comment;
                    node
                } else {
                    with_line(Node::null(), comment)
                }
            } else {
                with_line(self.value(text, line.number, to_signed(indent))?, comment)
            };
            entries.push(Entry { key, value });
        }

        let mut node = Node::mapping(entries);
        node.comments.foot = self.take_foot(indent);
        Ok(node)
    }

    /// `foot_indent` is deeper than `indent` for a sequence sitting at the
    /// same indentation as its parent key
    fn sequence(&mut self, indent: usize, foot_indent: usize) -> TreeResult<Node> {
        let mut items = Vec::new();

        while let Some(line) = self.structural()? {
            if line.indent < indent || line.is_marker() {
                break;
            }
            if line.indent > indent {
                return Err(TreeError::syntax(line.number, "unexpected indentation"));
            }
            if !is_dash(line.text) {
                if foot_indent > indent {
                    break;
                }
                return Err(TreeError::syntax(line.number, "expected a sequence item"));
            }

            self.pos += 1;
            let head = self.take_head();
            let rest = line.text[1..].trim_start_matches(' ');
            let offset = line.text.len() - rest.len();
            let (text, comment) = split_comment(rest);

            let mut item = if text.is_empty() {
                let node = self.nested(indent, false)?.unwrap_or_else(Node::null);
                with_line(node, comment)
            } else if is_dash(text) || split_key(text, line.number)?.is_some() {
                // `- key: value` or `- - item`: re-read the rest of the line as
                // the first line of a block indented past the dash
                let compact = Line {
                    indent: indent + offset,
                    text: rest,
                    ..line
                };
                self.pos -= 1;
                self.lines[self.pos] = compact;
                self.block(compact, to_signed(indent))?
            } else {
                with_line(self.value(text, line.number, to_signed(indent))?, comment)
            };

            if !head.is_empty() {
                let mut combined = head;
                combined.append(&mut item.comments.head);
                item.comments.head = combined;
            }
            items.push(item);
        }

        let mut node = Node::sequence(items);
        node.comments.foot = self.take_foot(foot_indent);
        Ok(node)
    }

    fn value(&mut self, text: &str, number: usize, parent: isize) -> TreeResult<Node> {
        if text.starts_with('|') || text.starts_with('>') {
            return self.block_scalar(text, number, parent);
        }
        inline_value(text, number)
    }

    fn block_scalar(&mut self, header: &str, number: usize, parent: isize) -> TreeResult<Node> {
        let folded = header.starts_with('>');
        let mut chomp = None;
        let mut explicit = None;
        for c in header[1..].chars() {
            match c {
                '-' if chomp.is_none() => chomp = Some(Chomp::Strip),
                '+' if chomp.is_none() => chomp = Some(Chomp::Keep),
                '1'..='9' if explicit.is_none() => explicit = c.to_digit(10),
                _ => {
                    return Err(TreeError::syntax(
                        number,
                        format!("invalid block scalar header '{header}'"),
                    ))
                }
            }
        }
        let chomp = chomp.unwrap_or(Chomp::Clip);

        let min_indent = usize::try_from(parent).map_or(0, |p| p + 1);
        let content_indent = match explicit {
            Some(n) => min_indent + n as usize - 1,
            None => self.lines[self.pos..]
                .iter()
                .find(|l| !l.is_blank())
                .map(|l| l.indent)
                .filter(|&i| i >= min_indent)
                .unwrap_or(usize::MAX),
        };

        let mut lines: Vec<&str> = Vec::new();
        let mut idx = self.pos;
        let mut end = self.pos;
        while let Some(line) = self.lines.get(idx).copied() {
            if line.is_blank() {
                // whitespace past the content indent is content
                match line.raw.get(content_indent..) {
                    Some(rest) if !rest.is_empty() => {
                        lines.push(rest);
                        end = idx + 1;
                    }
                    _ => lines.push(""),
                }
            } else if line.indent < content_indent {
                break;
            } else {
                lines.push(&line.raw[content_indent..]);
                end = idx + 1;
            }
            idx += 1;
        }

        let content = end - self.pos;
        let trailing = lines.len() - content;
        lines.truncate(content);
        self.pos = if chomp == Chomp::Keep { idx } else { end };

        let mut text = if folded {
            fold(&lines)
        } else {
            lines.join("\n")
        };
        if !lines.is_empty() && chomp != Chomp::Strip {
            text.push('\n');
        }
        if chomp == Chomp::Keep {
            text.extend(std::iter::repeat('\n').take(trailing));
        }

        Ok(Node::scalar(Scalar::with_style(
            text,
            ScalarTag::Str,
            ScalarStyle::Literal,
        )))
    }
}

fn to_signed(indent: usize) -> isize {
    isize::try_from(indent).unwrap_or(isize::MAX)
}

fn unsupported(line: usize, feature: &'static str) -> TreeError {
    TreeError::Unsupported { line, feature }
}

fn with_line(mut node: Node, comment: Option<String>) -> Node {
    if comment.is_some() {
        node.comments.line = comment;
    }
    node
}

fn is_dash(text: &str) -> bool {
    text == "-" || text.starts_with("- ")
}

/// Move a head block that is separated from the first node by a blank line
/// onto the root
fn split_document_head(root: &mut Node) {
    let Node { value, comments } = root;
    let head = match value {
        NodeValue::Mapping {
            entries,
            style: CollectionStyle::Block,
        } => entries.first_mut().map(|e| &mut e.key.comments.head),
        NodeValue::Sequence {
            items,
            style: CollectionStyle::Block,
        } => items.first_mut().map(|n| &mut n.comments.head),
        _ => None,
    };
    let Some(head) = head else { return };
    let Some(split) = head.iter().rposition(String::is_empty) else {
        return;
    };

    // trailing blank lines stay so the writer reproduces the spacing
    let mut doc_head: Vec<String> = head.drain(..=split).collect();
    let leading = doc_head.iter().take_while(|l| l.is_empty()).count();
    doc_head.drain(..leading);
    comments.head = doc_head;
}

/// Split a trailing `# comment` off a line, respecting quotes
pub(crate) fn split_comment(text: &str) -> (&str, Option<String>) {
    let mut quote: Option<char> = None;
    let mut prev: Option<char> = None;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        match quote {
            Some('"') => match c {
                '\\' => {
                    chars.next();
                }
                '"' => quote = None,
                _ => {}
            },
            Some(_) => {
                if c == '\'' {
                    if chars.peek().map(|&(_, n)| n) == Some('\'') {
                        chars.next();
                    } else {
                        quote = None;
                    }
                }
            }
            None => match c {
                '#' if prev.map_or(true, char::is_whitespace) => {
                    return (text[..i].trim_end(), Some(text[i..].trim_end().to_string()));
                }
                '"' | '\'' if quote_can_open(&text[..i]) => quote = Some(c),
                _ => {}
            },
        }
        prev = Some(c);
    }

    (text.trim_end(), None)
}

/// A quote starts a quoted scalar only at the start of a value
pub(crate) fn quote_can_open(before: &str) -> bool {
    before
        .trim_end()
        .chars()
        .last()
        .map_or(true, |p| matches!(p, '[' | '{' | ',' | ':'))
}

/// Split `key: rest`; `None` when the line is not a mapping entry
fn split_key(text: &str, number: usize) -> TreeResult<Option<(Node, &str)>> {
    let Some(first) = text.chars().next() else {
        return Ok(None);
    };
    match first {
        '"' | '\'' => {
            let (scalar, used) = quoted(text, number)?;
            let after = text[used..].trim_start_matches(' ');
            Ok(after
                .strip_prefix(':')
                .filter(|r| r.is_empty() || r.starts_with(' '))
                .map(|r| (Node::scalar(scalar), r)))
        }
        '?' if text.len() == 1 || text[1..].starts_with(' ') => {
            Err(unsupported(number, "complex mapping keys"))
        }
        '&' => Err(unsupported(number, "anchors")),
        '*' => Err(unsupported(number, "aliases")),
        '!' => Err(unsupported(number, "tags")),
        '[' | '{' | '#' | '|' | '>' => Ok(None),
        '-' if is_dash(text) => Ok(None),
        _ => {
            for (i, c) in text.char_indices() {
                if c == '#' && text[..i].ends_with([' ', '\t']) {
                    return Ok(None);
                }
                if c == ':' {
                    let after = &text[i + 1..];
                    if after.is_empty() || after.starts_with(' ') {
                        let key = text[..i].trim_end();
                        if key.is_empty() {
                            return Ok(None);
                        }
                        return Ok(Some((Node::plain(key), after)));
                    }
                }
            }
            Ok(None)
        }
    }
}

/// Single-line value: quoted scalar, flow collection or plain scalar
fn inline_value(text: &str, number: usize) -> TreeResult<Node> {
    match text.chars().next() {
        Some('"' | '\'') => {
            let (scalar, used) = quoted(text, number)?;
            if !text[used..].trim().is_empty() {
                return Err(TreeError::syntax(
                    number,
                    "unexpected text after quoted scalar",
                ));
            }
            Ok(Node::scalar(scalar))
        }
        Some('[' | '{') => flow(text, number),
        Some('&') => Err(unsupported(number, "anchors")),
        Some('*') => Err(unsupported(number, "aliases")),
        Some('!') => Err(unsupported(number, "tags")),
        _ => plain(text, number).map(Node::scalar),
    }
}

fn plain(text: &str, number: usize) -> TreeResult<Scalar> {
    if text.contains(": ") || text.ends_with(':') {
        return Err(TreeError::syntax(number, "mapping values are not allowed here"));
    }
    if is_dash(text) {
        return Err(TreeError::syntax(number, "sequence items are not allowed here"));
    }
    if let Some(c @ (',' | ']' | '}' | '%' | '@' | '`')) = text.chars().next() {
        return Err(TreeError::syntax(
            number,
            format!("plain scalar cannot start with '{c}'"),
        ));
    }
    Ok(Scalar::plain(text))
}

/// Quoted scalar at the start of `text`; returns the scalar and bytes consumed
fn quoted(text: &str, number: usize) -> TreeResult<(Scalar, usize)> {
    let mut out = String::new();

    if text.starts_with('\'') {
        let mut chars = text[1..].char_indices().peekable();
        while let Some((i, c)) = chars.next() {
            if c == '\'' {
                if chars.peek().map(|&(_, n)| n) == Some('\'') {
                    chars.next();
                    out.push('\'');
                    continue;
                }
                return Ok((
                    Scalar::with_style(out, ScalarTag::Str, ScalarStyle::SingleQuoted),
                    i + 2,
                ));
            }
            out.push(c);
        }
        return Err(TreeError::syntax(
            number,
            "unterminated single-quoted scalar (multi-line quoted scalars are not supported)",
        ));
    }

    let mut chars = text[1..].char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            '"' => {
                return Ok((
                    Scalar::with_style(out, ScalarTag::Str, ScalarStyle::DoubleQuoted),
                    i + 2,
                ))
            }
            '\\' => {
                let Some((_, escape)) = chars.next() else {
                    break;
                };
                let decoded = match escape {
                    '0' => '\0',
                    'a' => '\x07',
                    'b' => '\x08',
                    't' | '\t' => '\t',
                    'n' => '\n',
                    'v' => '\x0b',
                    'f' => '\x0c',
                    'r' => '\r',
                    'e' => '\x1b',
                    ' ' => ' ',
                    '"' => '"',
                    '/' => '/',
                    '\\' => '\\',
                    'N' => '\u{85}',
                    '_' => '\u{a0}',
                    'x' => hex_escape(&mut chars, 2, number)?,
                    'u' => hex_escape(&mut chars, 4, number)?,
                    'U' => hex_escape(&mut chars, 8, number)?,
                    other => {
                        return Err(TreeError::syntax(
                            number,
                            format!("invalid escape sequence '\\{other}'"),
                        ))
                    }
                };
                out.push(decoded);
            }
            _ => out.push(c),
        }
    }
    Err(TreeError::syntax(
        number,
        "unterminated double-quoted scalar (multi-line quoted scalars are not supported)",
    ))
}

fn hex_escape(chars: &mut std::str::CharIndices<'_>, width: usize, number: usize) -> TreeResult<char> {
    let digits: String = chars.by_ref().take(width).map(|(_, c)| c).collect();
    if digits.len() == width {
        if let Some(c) = u32::from_str_radix(&digits, 16).ok().and_then(char::from_u32) {
            return Ok(c);
        }
    }
    Err(TreeError::syntax(
        number,
        format!("invalid hex escape '{digits}'"),
    ))
}

/// Folding for `>` block scalars: single line breaks between text lines
/// become spaces, blank lines and more-indented lines keep their breaks
fn fold(lines: &[&str]) -> String {
    let mut out = String::new();
    let mut first = true;
    let mut prev_more = false;
    let mut breaks = 0;

    for line in lines {
        if line.is_empty() {
            breaks += 1;
            continue;
        }
        let more = line.starts_with([' ', '\t']);
        if !first {
            if more || prev_more {
                out.push('\n');
            } else if breaks == 0 {
                out.push(' ');
            }
        }
        out.extend(std::iter::repeat('\n').take(breaks));
        out.push_str(line);
        breaks = 0;
        first = false;
        prev_more = more;
    }
    out
}

fn flow(text: &str, number: usize) -> TreeResult<Node> {
    let mut reader = Flow {
        src: text,
        pos: 0,
        line: number,
    };
    let node = reader.node()?;
    reader.skip_ws();
    if reader.pos < text.len() {
        return Err(TreeError::syntax(
            number,
            "unexpected text after flow collection",
        ));
    }
    Ok(node)
}

/// Single-line flow collection reader
struct Flow<'s> {
    src: &'s str,
    pos: usize,
    line: usize,
}

impl Flow<'_> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn skip_ws(&mut self) {
        while matches!(self.peek(), Some(' ' | '\t')) {
            self.pos += 1;
        }
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn unterminated(&self) -> TreeError {
        TreeError::syntax(
            self.line,
            "unterminated flow collection (multi-line flow collections are not supported)",
        )
    }

    fn unexpected(&self, context: &str) -> TreeError {
        match self.peek() {
            None => self.unterminated(),
            Some(c) => TreeError::syntax(self.line, format!("unexpected '{c}' in flow {context}")),
        }
    }

    fn node(&mut self) -> TreeResult<Node> {
        self.skip_ws();
        match self.peek() {
            Some('[') => self.sequence(),
            Some('{') => self.mapping(),
            Some('"' | '\'') => {
                let (scalar, used) = quoted(&self.src[self.pos..], self.line)?;
                self.pos += used;
                Ok(Node::scalar(scalar))
            }
            Some('&') => Err(unsupported(self.line, "anchors")),
            Some('*') => Err(unsupported(self.line, "aliases")),
            Some('!') => Err(unsupported(self.line, "tags")),
            Some(_) => Ok(Node::scalar(self.plain())),
            None => Err(self.unterminated()),
        }
    }

    fn plain(&mut self) -> Scalar {
        let rest = &self.src[self.pos..];
        let mut end = rest.len();
        for (i, c) in rest.char_indices() {
            if matches!(c, ',' | '[' | ']' | '{' | '}') {
                end = i;
                break;
            }
            if c == ':'
                && rest[i + 1..]
                    .chars()
                    .next()
                    .map_or(true, |n| matches!(n, ' ' | ',' | ']' | '}'))
            {
                end = i;
                break;
            }
        }
        self.pos += end;
        Scalar::plain(rest[..end].trim_end())
    }

    fn sequence(&mut self) -> TreeResult<Node> {
        self.pos += 1;
        let mut items = Vec::new();
        loop {
            self.skip_ws();
            if self.eat(']') {
                break;
            }
            if self.peek().is_none() {
                return Err(self.unterminated());
            }
            items.push(self.node()?);
            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat(']') {
                break;
            }
            return Err(self.unexpected("sequence"));
        }
        Ok(Node::new(NodeValue::Sequence {
            items,
            style: CollectionStyle::Flow,
        }))
    }

    fn mapping(&mut self) -> TreeResult<Node> {
        self.pos += 1;
        let mut entries: Vec<Entry> = Vec::new();
        loop {
            self.skip_ws();
            if self.eat('}') {
                break;
            }
            if self.peek().is_none() {
                return Err(self.unterminated());
            }
            let key = self.node()?;
            let Some(name) = key.as_str().map(str::to_string) else {
                return Err(unsupported(self.line, "complex mapping keys"));
            };
            if entries.iter().any(|e| e.key_str() == Some(name.as_str())) {
                return Err(TreeError::DuplicateKey {
                    line: self.line,
                    key: name,
                });
            }
            self.skip_ws();
            let value = if self.eat(':') {
                self.skip_ws();
                if matches!(self.peek(), Some(',' | '}')) {
                    Node::null()
                } else {
                    self.node()?
                }
            } else {
                Node::null()
            };
            entries.push(Entry { key, value });

            self.skip_ws();
            if self.eat(',') {
                continue;
            }
            if self.eat('}') {
                break;
            }
            return Err(self.unexpected("mapping"));
        }
        Ok(Node::new(NodeValue::Mapping {
            entries,
            style: CollectionStyle::Flow,
        }))
    }
}
