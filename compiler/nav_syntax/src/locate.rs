//! Cursor lookup: byte offset → innermost token.
//!
//! Starting at the root, each step picks the child whose full width (text
//! plus attached trivia) contains the offset, by accumulating widths over the
//! ordered children, and descends until it reaches a token. An offset inside
//! trivia therefore resolves to the token owning that trivia.
//!
//! The descent is a loop, not recursion, so depth is bounded only by memory.
//! The nodes passed on the way down are returned as a [`TokenPath`]; this is
//! how callers climb back up without parent pointers.

use smallvec::SmallVec;

use crate::tree::{ChildRef, NodeId, NodeRef, SyntaxTree, TokenId, TokenRef};

/// Failure to map an offset to a token.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum LocateError {
    /// The offset lies at or after the end-of-file token (trailing
    /// whitespace, or past the text).
    #[error("no token at offset {offset} (text length {len})")]
    PositionNotFound { offset: u32, len: u32 },
}

/// A token together with its ancestors, root first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TokenPath {
    ancestors: SmallVec<[NodeId; 16]>,
    token: TokenId,
}

impl TokenPath {
    #[inline]
    pub fn token(&self) -> TokenId {
        self.token
    }

    /// Ancestors from the root down to the token's parent.
    #[inline]
    pub fn ancestors(&self) -> &[NodeId] {
        &self.ancestors
    }

    /// Ancestors from the token's parent up to the root.
    pub fn innermost_first(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.ancestors.iter().rev().copied()
    }

    /// The token's direct parent.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.ancestors.last().copied()
    }

    /// Resolve the token against its tree.
    pub fn resolve<'t>(&self, tree: &'t SyntaxTree) -> Option<TokenRef<'t>> {
        tree.token(self.token)
    }
}

/// Find the innermost token whose full span contains `offset`.
///
/// Fails with [`LocateError::PositionNotFound`] when the offset lands on the
/// end-of-file token or beyond the text.
pub fn locate_token(tree: &SyntaxTree, offset: u32) -> Result<TokenPath, LocateError> {
    let not_found = || LocateError::PositionNotFound {
        offset,
        len: tree.len(),
    };

    let mut node: NodeRef<'_> = tree.root();
    let mut ancestors: SmallVec<[NodeId; 16]> = SmallVec::new();
    let mut cursor = node.full_span().start;

    'descend: loop {
        ancestors.push(node.id());
        for child in node.children() {
            let width = child.full_width();
            if offset < cursor + width {
                match child {
                    ChildRef::Node(inner) => {
                        node = inner;
                        continue 'descend;
                    }
                    ChildRef::Token(token) if token.kind().is_eof() => return Err(not_found()),
                    ChildRef::Token(token) => {
                        return Ok(TokenPath {
                            ancestors,
                            token: token.id(),
                        });
                    }
                    // Zero width, can never contain the offset.
                    ChildRef::Missing => {}
                }
            }
            cursor += width;
        }
        return Err(not_found());
    }
}

/// Like [`locate_token`], but when the offset is past the last real token
/// fall back to the nearest token before it.
///
/// Used by quiet-mode requests (hover) that must not fail while the user is
/// typing at the end of a file.
pub fn locate_token_or_preceding(tree: &SyntaxTree, offset: u32) -> Result<TokenPath, LocateError> {
    match locate_token(tree, offset) {
        Ok(path) => Ok(path),
        Err(err) => {
            let preceding = tree
                .tokens()
                .filter(|t| !t.kind().is_eof() && t.span().start <= offset)
                .last()
                .ok_or_else(|| err.clone())?;
            locate_token(tree, preceding.full_span().start).map_err(|_| err)
        }
    }
}
