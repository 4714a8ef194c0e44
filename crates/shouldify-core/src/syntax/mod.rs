/*!
# Syntax Tree

Immutable, lossless syntax tree for C# compilation units.

Nodes are reference-counted and never mutated: every edit builds a new
parent chain up to the root and shares every untouched subtree with the
previous version. Each node carries a [`NodeId`] that survives structural
sharing, so an edit to one branch never invalidates the identity of nodes
in another branch.

Source text is owned by tokens. Whitespace, newlines and comments are kept
as [`Trivia`] attached to the neighbouring token, which lets a rewritten
node inherit the exact spacing of the node it replaces.
*/

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

pub mod line_index;
pub mod make;
pub mod parser;

#[cfg(test)]
mod parser_tests;

pub use line_index::{LineCol, LineIndex};
pub use parser::{has_syntax_errors, CSharpParser, ParseError, SourceFile};

/// Stable identity of a node across edits of unrelated branches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

impl NodeId {
    fn fresh() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        NodeId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Grammar kind of a node or token, named after the tree-sitter C# grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SyntaxKind(&'static str);

impl SyntaxKind {
    pub const COMPILATION_UNIT: Self = Self("compilation_unit");
    pub const USING_DIRECTIVE: Self = Self("using_directive");
    pub const NAMESPACE_DECLARATION: Self = Self("namespace_declaration");
    pub const DECLARATION_LIST: Self = Self("declaration_list");
    pub const EXPRESSION_STATEMENT: Self = Self("expression_statement");
    pub const INVOCATION_EXPRESSION: Self = Self("invocation_expression");
    pub const MEMBER_ACCESS_EXPRESSION: Self = Self("member_access_expression");
    pub const GENERIC_NAME: Self = Self("generic_name");
    pub const QUALIFIED_NAME: Self = Self("qualified_name");
    pub const TYPE_ARGUMENT_LIST: Self = Self("type_argument_list");
    pub const ARGUMENT_LIST: Self = Self("argument_list");
    pub const ARGUMENT: Self = Self("argument");
    pub const IDENTIFIER: Self = Self("identifier");
    pub const PREDEFINED_TYPE: Self = Self("predefined_type");
    pub const TYPEOF_EXPRESSION: Self = Self("typeof_expression");
    pub const PARENTHESIZED_EXPRESSION: Self = Self("parenthesized_expression");
    pub const LAMBDA_EXPRESSION: Self = Self("lambda_expression");
    pub const BINARY_EXPRESSION: Self = Self("binary_expression");
    pub const IS_EXPRESSION: Self = Self("is_expression");
    pub const NULL_LITERAL: Self = Self("null_literal");
    pub const BOOLEAN_LITERAL: Self = Self("boolean_literal");
    pub const COMMENT: Self = Self("comment");
    pub const ERROR: Self = Self("ERROR");
    pub const END_OF_FILE: Self = Self("end_of_file");

    pub const fn new(name: &'static str) -> Self {
        Self(name)
    }

    pub fn as_str(self) -> &'static str {
        self.0
    }

    /// Statement kinds end in `_statement` in the C# grammar.
    pub fn is_statement(self) -> bool {
        self.0.ends_with("_statement")
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Half-open byte range into the rendered text of a tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains_range(&self, other: TextRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for TextRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    Comment,
    /// Text the lexer could not classify, kept verbatim.
    Skipped,
}

/// Non-semantic text attached to a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub text: String,
}

impl Trivia {
    pub fn new(kind: TriviaKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn whitespace(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Whitespace, text)
    }

    pub fn newline(text: impl Into<String>) -> Self {
        Self::new(TriviaKind::Newline, text)
    }

    pub fn is_newline(&self) -> bool {
        self.kind == TriviaKind::Newline
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

fn trivia_len(trivia: &[Trivia]) -> usize {
    trivia.iter().map(Trivia::len).sum()
}

#[derive(Debug, PartialEq, Eq, Hash)]
struct TokenData {
    kind: SyntaxKind,
    text: String,
    leading: Vec<Trivia>,
    trailing: Vec<Trivia>,
}

/// A terminal of the tree: keyword, punctuation or the text of a named leaf.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SyntaxToken(Arc<TokenData>);

impl SyntaxToken {
    pub fn new(kind: SyntaxKind, text: impl Into<String>) -> Self {
        Self::with_trivia(kind, text, Vec::new(), Vec::new())
    }

    pub fn with_trivia(
        kind: SyntaxKind,
        text: impl Into<String>,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    ) -> Self {
        SyntaxToken(Arc::new(TokenData {
            kind,
            text: text.into(),
            leading,
            trailing,
        }))
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn text(&self) -> &str {
        &self.0.text
    }

    pub fn leading(&self) -> &[Trivia] {
        &self.0.leading
    }

    pub fn trailing(&self) -> &[Trivia] {
        &self.0.trailing
    }

    /// Length including trivia.
    pub fn full_len(&self) -> usize {
        trivia_len(self.leading()) + self.0.text.len() + trivia_len(self.trailing())
    }

    pub fn with_leading(&self, leading: Vec<Trivia>) -> Self {
        Self::with_trivia(self.kind(), self.text(), leading, self.0.trailing.clone())
    }

    pub fn with_trailing(&self, trailing: Vec<Trivia>) -> Self {
        Self::with_trivia(self.kind(), self.text(), self.0.leading.clone(), trailing)
    }

    fn write_to(&self, out: &mut impl fmt::Write) -> fmt::Result {
        for trivia in self.leading() {
            out.write_str(&trivia.text)?;
        }
        out.write_str(self.text())?;
        for trivia in self.trailing() {
            out.write_str(&trivia.text)?;
        }
        Ok(())
    }
}

impl fmt::Debug for SyntaxToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{:?}", self.kind(), self.text())
    }
}

#[derive(Debug, Clone)]
pub enum SyntaxElement {
    Node(SyntaxNode),
    Token(SyntaxToken),
}

impl SyntaxElement {
    pub fn full_len(&self) -> usize {
        match self {
            SyntaxElement::Node(node) => node.text_len(),
            SyntaxElement::Token(token) => token.full_len(),
        }
    }

    fn has_token(&self) -> bool {
        match self {
            SyntaxElement::Node(node) => node.first_token().is_some(),
            SyntaxElement::Token(_) => true,
        }
    }

    pub fn as_node(&self) -> Option<&SyntaxNode> {
        match self {
            SyntaxElement::Node(node) => Some(node),
            SyntaxElement::Token(_) => None,
        }
    }

    pub fn as_token(&self) -> Option<&SyntaxToken> {
        match self {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(_) => None,
        }
    }
}

/// An element of a node's ordered child list, optionally labelled with the
/// grammar field it fills (`function`, `arguments`, `name`, ...).
#[derive(Debug, Clone)]
pub struct Child {
    pub field: Option<&'static str>,
    pub element: SyntaxElement,
}

impl Child {
    pub fn node(node: SyntaxNode) -> Self {
        Self {
            field: None,
            element: SyntaxElement::Node(node),
        }
    }

    pub fn token(token: SyntaxToken) -> Self {
        Self {
            field: None,
            element: SyntaxElement::Token(token),
        }
    }

    pub fn field(mut self, name: &'static str) -> Self {
        self.field = Some(name);
        self
    }
}

struct NodeData {
    id: NodeId,
    kind: SyntaxKind,
    children: Vec<Child>,
    text_len: usize,
}

/// An interior node of the tree. Cloning is cheap and preserves identity.
#[derive(Clone)]
pub struct SyntaxNode(Arc<NodeData>);

impl SyntaxNode {
    pub fn new(kind: SyntaxKind, children: Vec<Child>) -> Self {
        let text_len = children.iter().map(|child| child.element.full_len()).sum();
        SyntaxNode(Arc::new(NodeData {
            id: NodeId::fresh(),
            kind,
            children,
            text_len,
        }))
    }

    pub fn id(&self) -> NodeId {
        self.0.id
    }

    pub fn kind(&self) -> SyntaxKind {
        self.0.kind
    }

    pub fn children(&self) -> &[Child] {
        &self.0.children
    }

    pub fn child_nodes(&self) -> impl Iterator<Item = &SyntaxNode> + '_ {
        self.0.children.iter().filter_map(|child| child.element.as_node())
    }

    pub fn child_tokens(&self) -> impl Iterator<Item = &SyntaxToken> + '_ {
        self.0.children.iter().filter_map(|child| child.element.as_token())
    }

    pub fn child_by_field(&self, field: &str) -> Option<&SyntaxNode> {
        self.0
            .children
            .iter()
            .filter(|child| child.field == Some(field))
            .find_map(|child| child.element.as_node())
    }

    pub fn child_of_kind(&self, kind: SyntaxKind) -> Option<&SyntaxNode> {
        self.child_nodes().find(|node| node.kind() == kind)
    }

    pub fn has_token(&self, text: &str) -> bool {
        self.child_tokens().any(|token| token.text() == text)
    }

    /// Length of the rendered text including trivia.
    pub fn text_len(&self) -> usize {
        self.0.text_len
    }

    pub fn text(&self) -> String {
        self.to_string()
    }

    /// Rendered text without the outer leading and trailing trivia.
    pub fn trimmed_text(&self) -> String {
        let text = self.text();
        let start = self.leading_len();
        let end = text.len() - self.trailing_len();
        text.get(start..end.max(start)).unwrap_or_default().to_string()
    }

    pub fn first_token(&self) -> Option<&SyntaxToken> {
        self.0.children.iter().find_map(|child| match &child.element {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(node) => node.first_token(),
        })
    }

    pub fn last_token(&self) -> Option<&SyntaxToken> {
        self.0.children.iter().rev().find_map(|child| match &child.element {
            SyntaxElement::Token(token) => Some(token),
            SyntaxElement::Node(node) => node.last_token(),
        })
    }

    /// All tokens in source order.
    pub fn tokens(&self) -> Vec<SyntaxToken> {
        let mut tokens = Vec::new();
        self.collect_tokens(&mut tokens);
        tokens
    }

    fn collect_tokens(&self, out: &mut Vec<SyntaxToken>) {
        for child in self.children() {
            match &child.element {
                SyntaxElement::Token(token) => out.push(token.clone()),
                SyntaxElement::Node(node) => node.collect_tokens(out),
            }
        }
    }

    pub fn leading_trivia(&self) -> &[Trivia] {
        self.first_token().map(SyntaxToken::leading).unwrap_or_default()
    }

    pub fn trailing_trivia(&self) -> &[Trivia] {
        self.last_token().map(SyntaxToken::trailing).unwrap_or_default()
    }

    pub fn leading_len(&self) -> usize {
        trivia_len(self.leading_trivia())
    }

    pub fn trailing_len(&self) -> usize {
        trivia_len(self.trailing_trivia())
    }

    /// Builds a sibling node with the same kind and a new child list.
    pub fn with_children(&self, children: Vec<Child>) -> SyntaxNode {
        SyntaxNode::new(self.kind(), children)
    }

    pub fn with_leading_trivia(&self, leading: Vec<Trivia>) -> SyntaxNode {
        self.map_edge_token(Edge::First, |token| token.with_leading(leading))
            .unwrap_or_else(|| self.clone())
    }

    pub fn with_trailing_trivia(&self, trailing: Vec<Trivia>) -> SyntaxNode {
        self.map_edge_token(Edge::Last, |token| token.with_trailing(trailing))
            .unwrap_or_else(|| self.clone())
    }

    /// The same node with the outer leading and trailing trivia removed.
    pub fn trimmed(&self) -> SyntaxNode {
        self.with_leading_trivia(Vec::new())
            .with_trailing_trivia(Vec::new())
    }

    /// The node re-dressed in the outer trivia of `other`.
    pub fn with_trivia_of(&self, other: &SyntaxNode) -> SyntaxNode {
        self.with_leading_trivia(other.leading_trivia().to_vec())
            .with_trailing_trivia(other.trailing_trivia().to_vec())
    }

    fn map_edge_token(
        &self,
        edge: Edge,
        f: impl FnOnce(&SyntaxToken) -> SyntaxToken,
    ) -> Option<SyntaxNode> {
        let position = match edge {
            Edge::First => self
                .0
                .children
                .iter()
                .position(|child| child.element.has_token()),
            Edge::Last => self
                .0
                .children
                .iter()
                .rposition(|child| child.element.has_token()),
        }?;

        let replaced = match &self.0.children[position].element {
            SyntaxElement::Token(token) => SyntaxElement::Token(f(token)),
            SyntaxElement::Node(node) => SyntaxElement::Node(node.map_edge_token(edge, f)?),
        };

        let mut children = self.0.children.clone();
        children[position].element = replaced;
        Some(self.with_children(children))
    }

    /// Returns a new tree where the descendant `target` (or `self`) is
    /// replaced. Untouched subtrees are shared, not copied.
    pub fn replace_descendant(
        &self,
        target: NodeId,
        replacement: SyntaxNode,
    ) -> Option<SyntaxNode> {
        if self.id() == target {
            return Some(replacement);
        }
        for (index, child) in self.0.children.iter().enumerate() {
            if let SyntaxElement::Node(node) = &child.element {
                if let Some(rebuilt) = node.replace_descendant(target, replacement.clone()) {
                    let mut children = self.0.children.clone();
                    children[index].element = SyntaxElement::Node(rebuilt);
                    return Some(self.with_children(children));
                }
            }
        }
        None
    }

    /// Path from `self` down to the deepest node of `kind` whose trimmed
    /// range equals `range`, both inclusive.
    pub fn path_to_range(&self, range: TextRange, kind: SyntaxKind) -> Option<Vec<SyntaxNode>> {
        let mut path = Vec::new();
        if self.find_range(0, range, kind, &mut path) {
            Some(path)
        } else {
            None
        }
    }

    fn find_range(
        &self,
        offset: usize,
        range: TextRange,
        kind: SyntaxKind,
        path: &mut Vec<SyntaxNode>,
    ) -> bool {
        if !self.text_range(offset).contains_range(range) {
            return false;
        }
        path.push(self.clone());

        let mut child_offset = offset;
        for child in self.children() {
            let len = child.element.full_len();
            if let SyntaxElement::Node(node) = &child.element {
                if node.find_range(child_offset, range, kind, path) {
                    return true;
                }
            }
            child_offset += len;
        }

        if self.kind() == kind && self.trimmed_range(offset) == range {
            return true;
        }
        path.pop();
        false
    }

    /// The invocation whose trimmed range is exactly `range`.
    pub fn find_invocation_at(&self, range: TextRange) -> Option<SyntaxNode> {
        self.path_to_range(range, SyntaxKind::INVOCATION_EXPRESSION)
            .and_then(|mut path| path.pop())
    }

    /// Path from `self` down to the node with identity `target`.
    pub fn path_to(&self, target: NodeId) -> Option<Vec<SyntaxNode>> {
        if self.id() == target {
            return Some(vec![self.clone()]);
        }
        self.child_nodes().find_map(|child| {
            let mut path = child.path_to(target)?;
            path.insert(0, self.clone());
            Some(path)
        })
    }

    /// A new node with `child` inserted at `index` (clamped to the end).
    pub fn insert_child(&self, index: usize, child: Child) -> SyntaxNode {
        let mut children = self.0.children.clone();
        children.insert(index.min(children.len()), child);
        self.with_children(children)
    }

    /// Range of the node including trivia, given its start offset.
    pub fn text_range(&self, offset: usize) -> TextRange {
        TextRange::new(offset, offset + self.text_len())
    }

    /// Range of the node without outer trivia, given its start offset.
    pub fn trimmed_range(&self, offset: usize) -> TextRange {
        let start = offset + self.leading_len();
        let end = (offset + self.text_len()).saturating_sub(self.trailing_len()).max(start);
        TextRange::new(start, end)
    }

    /// Lazy pre-order walk over `self` and every descendant node.
    pub fn descendants(&self) -> Preorder {
        Preorder {
            stack: vec![(self.clone(), 0)],
        }
    }
}

#[derive(Clone, Copy)]
enum Edge {
    First,
    Last,
}

impl fmt::Display for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for child in self.children() {
            match &child.element {
                SyntaxElement::Token(token) => token.write_to(f)?,
                SyntaxElement::Node(node) => fmt::Display::fmt(node, f)?,
            }
        }
        Ok(())
    }
}

impl fmt::Debug for SyntaxNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{} {:?}", self.kind(), self.id(), self.trimmed_text())
    }
}

/// A node paired with the offset of its first byte (including trivia).
#[derive(Debug, Clone)]
pub struct Positioned {
    pub node: SyntaxNode,
    pub offset: usize,
}

impl Positioned {
    pub fn trimmed_range(&self) -> TextRange {
        self.node.trimmed_range(self.offset)
    }
}

/// Pre-order iterator produced by [`SyntaxNode::descendants`].
pub struct Preorder {
    stack: Vec<(SyntaxNode, usize)>,
}

impl Iterator for Preorder {
    type Item = Positioned;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, offset) = self.stack.pop()?;

        let mut children = Vec::new();
        let mut child_offset = offset;
        for child in node.children() {
            if let SyntaxElement::Node(child_node) = &child.element {
                children.push((child_node.clone(), child_offset));
            }
            child_offset += child.element.full_len();
        }
        self.stack.extend(children.into_iter().rev());

        Some(Positioned { node, offset })
    }
}
