//! The syntax tree produced by the parser.
//!
//! Every node carries the [`Range`] of the source text it was parsed from.
//! Leaves borrow their value straight from the input, so for any leaf
//! `&text[leaf.range().start.offset..leaf.range().end.offset] == leaf.value()`.

use std::fmt;

/// A point in the source text.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Position {
    /// Line in the source text, starting at 1.
    pub line: usize,
    /// Column in the line, counted in characters, starting at 1.
    pub column: usize,
    /// Byte offset into the source text, starting at 0.
    pub offset: usize,
}

impl Position {
    /// The first character of a text.
    pub const START: Position = Position::new(1, 1, 0);

    /// Piece together a position.
    pub const fn new(line: usize, column: usize, offset: usize) -> Self {
        Self {
            line,
            column,
            offset,
        }
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// The span of a node, `end` being exclusive.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Range {
    /// Place of the first character of the node.
    pub start: Position,
    /// Place of the first character after the node.
    pub end: Position,
}

impl Range {
    /// Piece together a range.
    pub const fn new(start: Position, end: Position) -> Self {
        Self { start, end }
    }

    /// Whether `other` lies within `self`.
    pub fn contains(&self, other: &Range) -> bool {
        self.start.offset <= other.start.offset && other.end.offset <= self.end.offset
    }

    /// Split the range of a fused token, such as `!:`, into the range of its
    /// first character and the range of the remainder.
    ///
    /// The token must not contain a line break.
    pub(crate) fn split_ligature(self, token: &str) -> (Range, Range) {
        let width = token.chars().next().map_or(0, char::len_utf8);
        let mid = Position::new(
            self.start.line,
            self.start.column + usize::from(width > 0),
            self.start.offset + width,
        );
        (Range::new(self.start, mid), Range::new(mid, self.end))
    }
}

/// Kinds of nodes holding a single value.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LeafKind {
    /// The commit type, or a footer token.
    Type,
    /// The parenthesized scope.
    Scope,
    /// Free-form text up to the end of a line.
    Text,
    /// A run of non-newline whitespace.
    Whitespace,
    /// A run of line breaks.
    Newline,
    /// `!`, `BREAKING CHANGE` or `BREAKING-CHANGE`.
    BreakingChange,
    /// `:` or ` #`.
    Separator,
}

impl LeafKind {
    /// Access `str` representation of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            LeafKind::Type => "type",
            LeafKind::Scope => "scope",
            LeafKind::Text => "text",
            LeafKind::Whitespace => "whitespace",
            LeafKind::Newline => "newline",
            LeafKind::BreakingChange => "breaking-change",
            LeafKind::Separator => "separator",
        }
    }
}

/// Kinds of nodes holding other nodes.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParentKind {
    /// The whole commit message.
    Message,
    /// The first line.
    Summary,
    /// Free-form lines between summary and footers.
    Body,
    /// A `token: value` or `token #value` trailer.
    Footer,
    /// The key of a footer.
    Token,
    /// The value of a footer, including continuation lines.
    Value,
    /// An indented line extending a footer value.
    Continuation,
}

impl ParentKind {
    /// Access `str` representation of the kind.
    pub const fn as_str(self) -> &'static str {
        match self {
            ParentKind::Message => "message",
            ParentKind::Summary => "summary",
            ParentKind::Body => "body",
            ParentKind::Footer => "footer",
            ParentKind::Token => "token",
            ParentKind::Value => "value",
            ParentKind::Continuation => "continuation",
        }
    }
}

/// A node holding a slice of the source text.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Leaf<'a> {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    kind: LeafKind,
    value: &'a str,
    #[cfg_attr(feature = "serde", serde(rename = "position"))]
    range: Range,
}

impl<'a> Leaf<'a> {
    pub(crate) const fn new(kind: LeafKind, value: &'a str, range: Range) -> Self {
        Self { kind, value, range }
    }

    /// The kind of the leaf.
    pub const fn kind(&self) -> LeafKind {
        self.kind
    }

    /// The source text covered by the leaf.
    pub const fn value(&self) -> &'a str {
        self.value
    }

    /// Where the leaf was found.
    pub const fn range(&self) -> Range {
        self.range
    }
}

/// A node holding an ordered list of child nodes.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parent<'a> {
    #[cfg_attr(feature = "serde", serde(rename = "type"))]
    kind: ParentKind,
    children: Vec<Node<'a>>,
    #[cfg_attr(feature = "serde", serde(rename = "position"))]
    range: Range,
}

impl<'a> Parent<'a> {
    pub(crate) fn new(kind: ParentKind, children: Vec<Node<'a>>, range: Range) -> Self {
        Self {
            kind,
            children,
            range,
        }
    }

    /// The kind of the node.
    pub const fn kind(&self) -> ParentKind {
        self.kind
    }

    /// The child nodes, in source order.
    pub fn children(&self) -> &[Node<'a>] {
        &self.children
    }

    /// Where the node was found.
    pub const fn range(&self) -> Range {
        self.range
    }

    /// The first direct child with the given kind.
    pub fn child(&self, kind: &str) -> Option<&Node<'a>> {
        self.children.iter().find(|node| node.kind() == kind)
    }
}

/// A node of the syntax tree.
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node<'a> {
    /// A node holding a value.
    Leaf(Leaf<'a>),
    /// A node holding children.
    Parent(Parent<'a>),
}

impl<'a> Node<'a> {
    /// The kind of the node, e.g. `"summary"` or `"breaking-change"`.
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Leaf(leaf) => leaf.kind.as_str(),
            Node::Parent(parent) => parent.kind.as_str(),
        }
    }

    /// Where the node was found.
    pub fn range(&self) -> Range {
        match self {
            Node::Leaf(leaf) => leaf.range,
            Node::Parent(parent) => parent.range,
        }
    }

    /// The value of a leaf.
    pub fn value(&self) -> Option<&'a str> {
        self.as_leaf().map(Leaf::value)
    }

    /// The children of a parent, empty for leaves.
    pub fn children(&self) -> &[Node<'a>] {
        match self {
            Node::Leaf(_) => &[],
            Node::Parent(parent) => parent.children(),
        }
    }

    /// Access the node as a leaf.
    pub fn as_leaf(&self) -> Option<&Leaf<'a>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Parent(_) => None,
        }
    }

    /// Access the node as a parent.
    pub fn as_parent(&self) -> Option<&Parent<'a>> {
        match self {
            Node::Leaf(_) => None,
            Node::Parent(parent) => Some(parent),
        }
    }

    /// All leaves below this node, in source order.
    pub fn leaves(&self) -> Vec<&Leaf<'a>> {
        let mut leaves = Vec::new();
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            match node {
                Node::Leaf(leaf) => leaves.push(leaf),
                Node::Parent(parent) => pending.extend(parent.children.iter().rev()),
            }
        }
        leaves
    }
}

impl<'a> From<Leaf<'a>> for Node<'a> {
    fn from(leaf: Leaf<'a>) -> Self {
        Node::Leaf(leaf)
    }
}

impl<'a> From<Parent<'a>> for Node<'a> {
    fn from(parent: Parent<'a>) -> Self {
        Node::Parent(parent)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_split_ligature() {
        let range = Range::new(Position::new(2, 5, 14), Position::new(2, 7, 16));
        let (first, second) = range.split_ligature("!:");

        assert_eq!(first.start, Position::new(2, 5, 14));
        assert_eq!(first.end, Position::new(2, 6, 15));
        assert_eq!(second.start, first.end);
        assert_eq!(second.end, Position::new(2, 7, 16));
    }

    #[test]
    fn test_leaves_in_source_order() {
        let at = |offset| Position::new(1, offset + 1, offset);
        let tree = Node::from(Parent::new(
            ParentKind::Token,
            vec![
                Leaf::new(LeafKind::Type, "fix", Range::new(at(0), at(3))).into(),
                Leaf::new(LeafKind::Scope, "api", Range::new(at(4), at(7))).into(),
            ],
            Range::new(at(0), at(8)),
        ));

        let kinds: Vec<_> = tree.leaves().iter().map(|leaf| leaf.kind()).collect();
        assert_eq!(kinds, [LeafKind::Type, LeafKind::Scope]);
        assert_eq!(tree.kind(), "token");
        assert_eq!(tree.value(), None);
        assert_eq!(tree.children()[1].value(), Some("api"));
        assert!(tree.range().contains(&tree.children()[1].range()));
    }
}
