//! Bottom-up tree construction.
//!
//! Parsers drive a [`TreeBuilder`] with `start_node` / `token` / `missing` /
//! `finish_node` calls in document order. The builder appends every token and
//! its trivia to the tree's own text buffer, so the finished tree reproduces
//! exactly what was fed into it.
//!
//! # Example
//!
//! ```
//! use nav_syntax::{NodeKind, RawTrivia, TokenKind, TreeBuilder, TriviaKind};
//!
//! let mut builder = TreeBuilder::new();
//! builder.start_node(NodeKind::ModulePart);
//! builder.start_node(NodeKind::SimpleNameReference);
//! builder.token(TokenKind::Identifier, "x", &[], &[RawTrivia::new(TriviaKind::Newline, "\n")]);
//! builder.finish_node().unwrap();
//! builder.token(TokenKind::EndOfFile, "", &[], &[]);
//! builder.finish_node().unwrap();
//! let tree = builder.finish().unwrap();
//! assert_eq!(tree.text(), "x\n");
//! ```

use crate::kind::{NodeKind, TokenKind, TriviaKind};
use crate::span::Span;
use crate::tree::{Child, ListRange, NodeData, NodeId, SyntaxTree, TokenData, TokenId, Trivia};

/// Trivia as handed over by a lexer: a kind and its exact source text.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct RawTrivia<'a> {
    pub kind: TriviaKind,
    pub text: &'a str,
}

impl<'a> RawTrivia<'a> {
    #[inline]
    pub const fn new(kind: TriviaKind, text: &'a str) -> Self {
        RawTrivia { kind, text }
    }
}

/// Misuse of the builder protocol.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("finish_node called with no open node")]
    NoOpenNode,
    #[error("{0} node(s) still open at finish")]
    UnclosedNodes(usize),
    #[error("expected exactly one root node, found {0} top-level slot(s)")]
    InvalidRoot(usize),
    #[error("source text exceeds u32::MAX bytes")]
    TooLarge,
    #[error("checkpoint no longer matches the open node stack")]
    StaleCheckpoint,
}

/// Position in the builder's output, for wrapping already-built children in
/// a node opened later (left operands of binary expressions, statements
/// whose kind is known only after their first expression).
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct Checkpoint {
    pending: usize,
    offset: u32,
    depth: usize,
}

struct OpenNode {
    kind: NodeKind,
    /// Index into `pending` where this node's children begin.
    first_child: usize,
    /// Text offset at `start_node`.
    start: u32,
}

/// Incremental builder for a [`SyntaxTree`].
#[derive(Default)]
pub struct TreeBuilder {
    text: String,
    tokens: Vec<TokenData>,
    trivia: Vec<Trivia>,
    nodes: Vec<NodeData>,
    children: Vec<Child>,
    open: Vec<OpenNode>,
    /// Children of all open nodes, innermost last.
    pending: Vec<Child>,
    too_large: bool,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder::default()
    }

    /// Open a composite node. Every following slot belongs to it until the
    /// matching [`finish_node`](Self::finish_node).
    pub fn start_node(&mut self, kind: NodeKind) {
        let start = self.offset();
        self.open.push(OpenNode {
            kind,
            first_child: self.pending.len(),
            start,
        });
    }

    pub fn checkpoint(&mut self) -> Checkpoint {
        Checkpoint {
            pending: self.pending.len(),
            offset: self.offset(),
            depth: self.open.len(),
        }
    }

    /// Open a node whose children start at `checkpoint`.
    ///
    /// Every node opened since the checkpoint must already be finished.
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) -> Result<(), BuildError> {
        if checkpoint.depth != self.open.len() || checkpoint.pending > self.pending.len() {
            return Err(BuildError::StaleCheckpoint);
        }
        self.open.push(OpenNode {
            kind,
            first_child: checkpoint.pending,
            start: checkpoint.offset,
        });
        Ok(())
    }

    /// Append a token with its attached trivia.
    pub fn token(
        &mut self,
        kind: TokenKind,
        text: &str,
        leading: &[RawTrivia<'_>],
        trailing: &[RawTrivia<'_>],
    ) -> TokenId {
        let leading = self.push_trivia(leading);
        let start = self.offset();
        self.text.push_str(text);
        let span = Span::new(start, self.offset());
        let trailing = self.push_trivia(trailing);

        let id = TokenId::new(to_u32(self.tokens.len()));
        self.tokens.push(TokenData {
            kind,
            span,
            leading,
            trailing,
        });
        self.pending.push(Child::Token(id));
        id
    }

    /// Append a placeholder for an expected-but-absent child.
    pub fn missing(&mut self) {
        self.pending.push(Child::Missing);
    }

    /// Close the innermost open node.
    pub fn finish_node(&mut self) -> Result<NodeId, BuildError> {
        let open = self.open.pop().ok_or(BuildError::NoOpenNode)?;

        let start = to_u32(self.children.len());
        let slots: Vec<Child> = self.pending.drain(open.first_child..).collect();
        let tokens = self.token_bounds(&slots);
        self.children.extend_from_slice(&slots);

        let end = self.offset();
        let id = NodeId::new(to_u32(self.nodes.len()));
        self.nodes.push(NodeData {
            kind: open.kind,
            full_span: Span::new(open.start, end),
            children: ListRange {
                start,
                len: to_u32(slots.len()),
            },
            tokens,
        });
        self.pending.push(Child::Node(id));
        Ok(id)
    }

    /// Number of currently open nodes.
    #[inline]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Finish construction. Exactly one top-level node must remain.
    pub fn finish(self) -> Result<SyntaxTree, BuildError> {
        if !self.open.is_empty() {
            return Err(BuildError::UnclosedNodes(self.open.len()));
        }
        if self.too_large {
            return Err(BuildError::TooLarge);
        }
        let root = match self.pending.as_slice() {
            [Child::Node(root)] => *root,
            other => return Err(BuildError::InvalidRoot(other.len())),
        };
        Ok(SyntaxTree {
            text: self.text.into_boxed_str(),
            tokens: self.tokens,
            trivia: self.trivia,
            nodes: self.nodes,
            children: self.children,
            root,
        })
    }

    fn push_trivia(&mut self, raw: &[RawTrivia<'_>]) -> ListRange {
        let start = to_u32(self.trivia.len());
        for piece in raw {
            let begin = self.offset();
            self.text.push_str(piece.text);
            let end = self.offset();
            self.trivia.push(Trivia {
                kind: piece.kind,
                span: Span::new(begin, end),
            });
        }
        ListRange {
            start,
            len: to_u32(raw.len()),
        }
    }

    /// First and last token among `slots`, looking through finished nodes.
    fn token_bounds(&self, slots: &[Child]) -> Option<(TokenId, TokenId)> {
        let bound = |child: &Child| match *child {
            Child::Token(id) => Some((id, id)),
            Child::Node(id) => self.nodes[id.index()].tokens,
            Child::Missing => None,
        };
        let first = slots.iter().find_map(bound)?;
        let last = slots.iter().rev().find_map(bound)?;
        Some((first.0, last.1))
    }

    fn offset(&mut self) -> u32 {
        match u32::try_from(self.text.len()) {
            Ok(offset) => offset,
            Err(_) => {
                self.too_large = true;
                u32::MAX
            }
        }
    }
}

#[inline]
fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "tests use unwrap to panic on unexpected state")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unbalanced_finish_node() {
        let mut builder = TreeBuilder::new();
        assert_eq!(builder.finish_node(), Err(BuildError::NoOpenNode));
    }

    #[test]
    fn test_unclosed_nodes_rejected() {
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::ModulePart);
        builder.start_node(NodeKind::FunctionDefinition);
        assert_eq!(builder.depth(), 2);
        assert!(matches!(builder.finish(), Err(BuildError::UnclosedNodes(2))));
    }

    #[test]
    fn test_two_roots_rejected() {
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::ModulePart);
        builder.finish_node().unwrap();
        builder.start_node(NodeKind::ModulePart);
        builder.finish_node().unwrap();
        assert!(matches!(builder.finish(), Err(BuildError::InvalidRoot(2))));
    }

    #[test]
    fn test_checkpoint_wraps_previous_children() {
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::ModulePart);
        let checkpoint = builder.checkpoint();
        builder.start_node(NodeKind::BasicLiteral);
        builder.token(TokenKind::Literal, "1", &[], &[]);
        builder.finish_node().unwrap();
        builder.start_node_at(checkpoint, NodeKind::BinaryExpression).unwrap();
        builder.token(TokenKind::Punctuation, "+", &[], &[]);
        builder.start_node(NodeKind::BasicLiteral);
        builder.token(TokenKind::Literal, "2", &[], &[]);
        builder.finish_node().unwrap();
        builder.finish_node().unwrap();
        builder.finish_node().unwrap();
        let tree = builder.finish().unwrap();

        let binary = tree.root().child_nodes().next().unwrap();
        assert_eq!(binary.kind(), NodeKind::BinaryExpression);
        assert_eq!(binary.child_count(), 3);
        assert_eq!(binary.text(), "1+2");
        assert_eq!(
            binary.child_nodes().map(|n| n.kind()).collect::<Vec<_>>(),
            vec![NodeKind::BasicLiteral, NodeKind::BasicLiteral]
        );
    }

    #[test]
    fn test_stale_checkpoint_rejected() {
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::ModulePart);
        let checkpoint = builder.checkpoint();
        builder.start_node(NodeKind::FunctionDefinition);
        assert_eq!(
            builder.start_node_at(checkpoint, NodeKind::BinaryExpression),
            Err(BuildError::StaleCheckpoint)
        );
    }

    #[test]
    fn test_spans_include_trivia() {
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::ModulePart);
        let id = builder.token(
            TokenKind::Identifier,
            "foo",
            &[RawTrivia::new(TriviaKind::Whitespace, "  ")],
            &[RawTrivia::new(TriviaKind::LineComment, "// c")],
        );
        builder.finish_node().unwrap();
        let tree = builder.finish().unwrap();

        let token = tree.token(id).unwrap();
        assert_eq!(token.span(), Span::new(2, 5));
        assert_eq!(token.full_span(), Span::new(0, 9));
        assert_eq!(token.leading_text(), "  ");
        assert_eq!(token.trailing_text(), "// c");
        assert_eq!(tree.root().full_span(), Span::new(0, 9));
        assert_eq!(tree.root().span(), Span::new(2, 5));
    }

    #[test]
    fn test_each_trivia_piece_and_node_ends_at_its_own_offset() {
        let mut builder = TreeBuilder::new();
        builder.start_node(NodeKind::ModulePart);
        builder.start_node(NodeKind::SimpleNameReference);
        let id = builder.token(
            TokenKind::Identifier,
            "ab",
            &[
                RawTrivia::new(TriviaKind::LineComment, "// x"),
                RawTrivia::new(TriviaKind::Newline, "\n"),
            ],
            &[RawTrivia::new(TriviaKind::Whitespace, "   ")],
        );
        let inner = builder.finish_node().unwrap();
        builder.token(TokenKind::EndOfFile, "", &[], &[]);
        builder.finish_node().unwrap();
        let tree = builder.finish().unwrap();

        let token = tree.token(id).unwrap();
        let leading: Vec<Span> = token.leading_trivia().iter().map(|t| t.span).collect();
        assert_eq!(leading, vec![Span::new(0, 4), Span::new(4, 5)]);
        assert_eq!(token.trailing_trivia()[0].span, Span::new(7, 10));
        assert_eq!(tree.node(inner).unwrap().full_span(), Span::new(0, 10));
        assert_eq!(tree.root().full_span(), Span::new(0, 10));
    }
}
