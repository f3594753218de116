//! Token, trivia and composite node kinds.

use std::fmt;

/// Lexical class of a token.
///
/// The navigation engine only needs coarse classes: rename is allowed on
/// identifiers and nothing else, and the end-of-file token marks the point
/// past which cursor lookup fails.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TokenKind {
    Identifier,
    Keyword,
    Literal,
    Punctuation,
    /// Characters the lexer could not classify. Kept for lossless round-trip.
    Unknown,
    /// Zero-width token closing every tree. Its leading trivia holds the
    /// whitespace and comments after the last real token.
    EndOfFile,
}

impl TokenKind {
    #[inline]
    pub fn is_identifier(self) -> bool {
        matches!(self, TokenKind::Identifier)
    }

    #[inline]
    pub fn is_eof(self) -> bool {
        matches!(self, TokenKind::EndOfFile)
    }
}

/// Kind of non-semantic lexical material attached to a token.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum TriviaKind {
    Whitespace,
    Newline,
    LineComment,
    BlockComment,
}

impl TriviaKind {
    #[inline]
    pub fn is_comment(self) -> bool {
        matches!(self, TriviaKind::LineComment | TriviaKind::BlockComment)
    }
}

macro_rules! define_node_kind {
    ($($variant:ident => $visit:ident, $label:literal;)*) => {
        /// Kind tag of a composite node.
        ///
        /// This is a closed set: every kind has a matching `visit_*` method on
        /// [`Visitor`](crate::Visitor).
        #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
        pub enum NodeKind {
            $($variant,)*
        }

        impl NodeKind {
            /// Every node kind, in declaration order.
            pub const ALL: &'static [NodeKind] = &[$(NodeKind::$variant,)*];

            /// Human-readable name, e.g. `"function definition"`.
            pub const fn label(self) -> &'static str {
                match self {
                    $(NodeKind::$variant => $label,)*
                }
            }
        }
    };
}

with_node_kinds!(define_node_kind);

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
