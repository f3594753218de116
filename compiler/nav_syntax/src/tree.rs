//! Arena-backed syntax tree.
//!
//! A [`SyntaxTree`] owns the source text of one compilation unit together
//! with flat arrays of tokens, trivia, nodes and child slots. Nodes refer to
//! their children through index ranges into the child array, so the whole
//! tree is a handful of `Vec`s: cheap to drop regardless of depth, trivially
//! `Send + Sync`, and free of ownership cycles.
//!
//! [`NodeRef`] and [`TokenRef`] are `Copy` cursors pairing the tree with an
//! index; they are the read API used by visitors and the locator.

use std::fmt;

use crate::kind::{NodeKind, TokenKind, TriviaKind};
use crate::line_index::LineIndex;
use crate::span::Span;

/// Index into the node arena of a [`SyntaxTree`].
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(u32);

impl NodeId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        NodeId(index)
    }

    /// Get the index into the arena.
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({})", self.0)
    }
}

/// Index into the token arena of a [`SyntaxTree`].
///
/// Tokens are stored in document order, so comparing two ids compares
/// their positions.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TokenId(u32);

impl TokenId {
    #[inline]
    pub const fn new(index: u32) -> Self {
        TokenId(index)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    #[inline]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TokenId({})", self.0)
    }
}

/// One piece of trivia (whitespace, newline or comment).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Trivia {
    pub kind: TriviaKind,
    pub span: Span,
}

/// A child slot of a composite node.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Child {
    Node(NodeId),
    Token(TokenId),
    /// Placeholder for a child the parser expected but did not find.
    Missing,
}

/// Range into one of the flat arrays (`children`, `trivia`).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub(crate) struct ListRange {
    pub(crate) start: u32,
    pub(crate) len: u32,
}

impl ListRange {
    #[inline]
    pub(crate) fn to_range(self) -> std::ops::Range<usize> {
        self.start as usize..(self.start + self.len) as usize
    }
}

#[derive(Clone, Debug)]
pub(crate) struct TokenData {
    pub(crate) kind: TokenKind,
    /// Span of the token text, without trivia.
    pub(crate) span: Span,
    pub(crate) leading: ListRange,
    pub(crate) trailing: ListRange,
}

#[derive(Clone, Debug)]
pub(crate) struct NodeData {
    pub(crate) kind: NodeKind,
    /// Span covering every child including attached trivia.
    pub(crate) full_span: Span,
    pub(crate) children: ListRange,
    /// First and last descendant token, if the node owns any.
    pub(crate) tokens: Option<(TokenId, TokenId)>,
}

/// Immutable syntax tree of one compilation unit.
#[derive(Clone)]
pub struct SyntaxTree {
    pub(crate) text: Box<str>,
    pub(crate) tokens: Vec<TokenData>,
    pub(crate) trivia: Vec<Trivia>,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) children: Vec<Child>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    /// The root node (module part).
    #[inline]
    pub fn root(&self) -> NodeRef<'_> {
        NodeRef {
            tree: self,
            id: self.root,
        }
    }

    /// Look up a node by id.
    ///
    /// Returns `None` if the id does not belong to this tree.
    #[inline]
    pub fn node(&self, id: NodeId) -> Option<NodeRef<'_>> {
        (id.index() < self.nodes.len()).then_some(NodeRef { tree: self, id })
    }

    /// Look up a token by id.
    #[inline]
    pub fn token(&self, id: TokenId) -> Option<TokenRef<'_>> {
        (id.index() < self.tokens.len()).then_some(TokenRef { tree: self, id })
    }

    /// The full source text. Equal to the concatenation of every token and
    /// its trivia in document order.
    #[inline]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Slice the source text.
    ///
    /// Out-of-range spans yield an empty string.
    #[inline]
    pub fn slice(&self, span: Span) -> &str {
        self.text.get(span.to_range()).unwrap_or("")
    }

    #[inline]
    pub fn len(&self) -> u32 {
        // Builder guarantees the text fits in u32 (spans are u32).
        u32::try_from(self.text.len()).unwrap_or(u32::MAX)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }

    /// All tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = TokenRef<'_>> + '_ {
        (0..self.tokens.len()).map(move |i| TokenRef {
            tree: self,
            id: TokenId::new(u32::try_from(i).unwrap_or(u32::MAX)),
        })
    }

    /// Line/column conversion over this tree's text.
    pub fn line_index(&self) -> LineIndex<'_> {
        LineIndex::new(&self.text)
    }

    #[inline]
    fn node_data(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.index()]
    }

    #[inline]
    fn token_data(&self, id: TokenId) -> &TokenData {
        &self.tokens[id.index()]
    }
}

impl fmt::Debug for SyntaxTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyntaxTree")
            .field("len", &self.text.len())
            .field("nodes", &self.nodes.len())
            .field("tokens", &self.tokens.len())
            .finish()
    }
}

/// Borrowed view of a composite node.
#[derive(Copy, Clone)]
pub struct NodeRef<'t> {
    tree: &'t SyntaxTree,
    id: NodeId,
}

impl<'t> NodeRef<'t> {
    #[inline]
    pub fn id(self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn tree(self) -> &'t SyntaxTree {
        self.tree
    }

    #[inline]
    pub fn kind(self) -> NodeKind {
        self.tree.node_data(self.id).kind
    }

    /// Span covering the node including leading trivia of its first token and
    /// trailing trivia of its last token.
    #[inline]
    pub fn full_span(self) -> Span {
        self.tree.node_data(self.id).full_span
    }

    /// Span from the first token's text to the last token's text.
    pub fn span(self) -> Span {
        match (self.first_token(), self.last_token()) {
            (Some(first), Some(last)) => Span::new(first.span().start, last.span().end),
            _ => Span::point(self.full_span().start),
        }
    }

    /// Number of child slots (including missing placeholders).
    #[inline]
    pub fn child_count(self) -> usize {
        self.tree.node_data(self.id).children.len as usize
    }

    /// Child slots in order.
    pub fn children(self) -> impl DoubleEndedIterator<Item = ChildRef<'t>> + 't {
        let tree = self.tree;
        let range = tree.node_data(self.id).children.to_range();
        tree.children[range]
            .iter()
            .map(move |child| ChildRef::new(tree, *child))
    }

    /// Child slot at `index`.
    pub fn child(self, index: usize) -> Option<ChildRef<'t>> {
        let range = self.tree.node_data(self.id).children.to_range();
        self.tree.children[range]
            .get(index)
            .map(|child| ChildRef::new(self.tree, *child))
    }

    /// Composite children only.
    pub fn child_nodes(self) -> impl Iterator<Item = NodeRef<'t>> + 't {
        self.children().filter_map(ChildRef::into_node)
    }

    /// Direct token children only.
    pub fn child_tokens(self) -> impl Iterator<Item = TokenRef<'t>> + 't {
        self.children().filter_map(ChildRef::into_token)
    }

    /// First descendant token in document order.
    #[inline]
    pub fn first_token(self) -> Option<TokenRef<'t>> {
        let (first, _) = self.tree.node_data(self.id).tokens?;
        Some(TokenRef {
            tree: self.tree,
            id: first,
        })
    }

    /// Last descendant token in document order.
    #[inline]
    pub fn last_token(self) -> Option<TokenRef<'t>> {
        let (_, last) = self.tree.node_data(self.id).tokens?;
        Some(TokenRef {
            tree: self.tree,
            id: last,
        })
    }

    /// Source text covered by [`NodeRef::span`].
    pub fn text(self) -> &'t str {
        self.tree.slice(self.span())
    }
}

impl PartialEq for NodeRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for NodeRef<'_> {}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {:?}", self.kind(), self.full_span(), self.id)
    }
}

/// Borrowed view of a token.
#[derive(Copy, Clone)]
pub struct TokenRef<'t> {
    tree: &'t SyntaxTree,
    id: TokenId,
}

impl<'t> TokenRef<'t> {
    #[inline]
    pub fn id(self) -> TokenId {
        self.id
    }

    #[inline]
    pub fn kind(self) -> TokenKind {
        self.tree.token_data(self.id).kind
    }

    /// Span of the token text, trivia excluded.
    #[inline]
    pub fn span(self) -> Span {
        self.tree.token_data(self.id).span
    }

    /// Span of the token text plus its leading and trailing trivia.
    pub fn full_span(self) -> Span {
        let data = self.tree.token_data(self.id);
        let start = self.leading_trivia().first().map_or(data.span.start, |t| t.span.start);
        let end = self.trailing_trivia().last().map_or(data.span.end, |t| t.span.end);
        Span::new(start, end)
    }

    #[inline]
    pub fn text(self) -> &'t str {
        self.tree.slice(self.span())
    }

    #[inline]
    pub fn leading_trivia(self) -> &'t [Trivia] {
        &self.tree.trivia[self.tree.token_data(self.id).leading.to_range()]
    }

    #[inline]
    pub fn trailing_trivia(self) -> &'t [Trivia] {
        &self.tree.trivia[self.tree.token_data(self.id).trailing.to_range()]
    }

    /// Concatenated text of the leading trivia.
    pub fn leading_text(self) -> &'t str {
        let data = self.tree.token_data(self.id);
        self.tree
            .slice(Span::new(self.full_span().start, data.span.start))
    }

    /// Concatenated text of the trailing trivia.
    pub fn trailing_text(self) -> &'t str {
        let data = self.tree.token_data(self.id);
        self.tree.slice(Span::new(data.span.end, self.full_span().end))
    }
}

impl PartialEq for TokenRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for TokenRef<'_> {}

impl fmt::Debug for TokenRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}@{} {:?}", self.kind(), self.span(), self.text())
    }
}

/// Borrowed view of a child slot.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum ChildRef<'t> {
    Node(NodeRef<'t>),
    Token(TokenRef<'t>),
    Missing,
}

impl<'t> ChildRef<'t> {
    #[inline]
    fn new(tree: &'t SyntaxTree, child: Child) -> Self {
        match child {
            Child::Node(id) => ChildRef::Node(NodeRef { tree, id }),
            Child::Token(id) => ChildRef::Token(TokenRef { tree, id }),
            Child::Missing => ChildRef::Missing,
        }
    }

    /// Width of the slot including trivia. Missing slots are zero-width.
    #[inline]
    pub fn full_width(self) -> u32 {
        match self {
            ChildRef::Node(node) => node.full_span().len(),
            ChildRef::Token(token) => token.full_span().len(),
            ChildRef::Missing => 0,
        }
    }

    #[inline]
    pub fn into_node(self) -> Option<NodeRef<'t>> {
        match self {
            ChildRef::Node(node) => Some(node),
            _ => None,
        }
    }

    #[inline]
    pub fn into_token(self) -> Option<TokenRef<'t>> {
        match self {
            ChildRef::Token(token) => Some(token),
            _ => None,
        }
    }

    #[inline]
    pub fn is_missing(self) -> bool {
        matches!(self, ChildRef::Missing)
    }
}
