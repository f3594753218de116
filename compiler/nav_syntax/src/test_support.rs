//! Hand-built trees shared by unit tests.

use crate::{NodeKind, RawTrivia, SyntaxTree, TokenKind, TreeBuilder, TriviaKind};

const SPACE: RawTrivia<'static> = RawTrivia::new(TriviaKind::Whitespace, " ");
const NEWLINE: RawTrivia<'static> = RawTrivia::new(TriviaKind::Newline, "\n");
const INDENT: RawTrivia<'static> = RawTrivia::new(TriviaKind::Whitespace, "    ");

/// Tree for `"fn foo() {\n    bar(1);\n}\n\n"`.
///
/// Byte offsets: `foo` 3..6, `bar` 15..18, `1` 19..20, `}` 23..24, and
/// the final newline (25) is leading trivia of the end-of-file token.
#[expect(clippy::unwrap_used, reason = "fixed builder sequence")]
pub(crate) fn sample_tree() -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.start_node(NodeKind::ModulePart);
    {
        b.start_node(NodeKind::FunctionDefinition);
        b.token(TokenKind::Keyword, "fn", &[], &[SPACE]);
        b.token(TokenKind::Identifier, "foo", &[], &[]);
        b.start_node(NodeKind::ParameterList);
        b.token(TokenKind::Punctuation, "(", &[], &[]);
        b.token(TokenKind::Punctuation, ")", &[], &[SPACE]);
        b.finish_node().unwrap();
        b.start_node(NodeKind::FunctionBody);
        b.token(TokenKind::Punctuation, "{", &[], &[NEWLINE]);
        {
            b.start_node(NodeKind::ExpressionStatement);
            b.start_node(NodeKind::FunctionCall);
            b.start_node(NodeKind::SimpleNameReference);
            b.token(TokenKind::Identifier, "bar", &[INDENT], &[]);
            b.finish_node().unwrap();
            b.start_node(NodeKind::ArgumentList);
            b.token(TokenKind::Punctuation, "(", &[], &[]);
            b.start_node(NodeKind::PositionalArgument);
            b.start_node(NodeKind::BasicLiteral);
            b.token(TokenKind::Literal, "1", &[], &[]);
            b.finish_node().unwrap();
            b.finish_node().unwrap();
            b.token(TokenKind::Punctuation, ")", &[], &[]);
            b.finish_node().unwrap();
            b.finish_node().unwrap();
            b.token(TokenKind::Punctuation, ";", &[], &[NEWLINE]);
            b.finish_node().unwrap();
        }
        b.token(TokenKind::Punctuation, "}", &[], &[NEWLINE]);
        b.finish_node().unwrap();
        b.finish_node().unwrap();
    }
    b.token(TokenKind::EndOfFile, "", &[NEWLINE], &[]);
    b.finish_node().unwrap();
    b.finish().unwrap()
}

/// `depth` nested braced expressions around a single literal.
#[expect(clippy::unwrap_used, reason = "fixed builder sequence")]
pub(crate) fn nested_tree(depth: usize) -> SyntaxTree {
    let mut b = TreeBuilder::new();
    b.start_node(NodeKind::ModulePart);
    for _ in 0..depth {
        b.start_node(NodeKind::BracedExpression);
        b.token(TokenKind::Punctuation, "(", &[], &[]);
    }
    b.start_node(NodeKind::BasicLiteral);
    b.token(TokenKind::Literal, "0", &[], &[]);
    b.finish_node().unwrap();
    for _ in 0..depth {
        b.token(TokenKind::Punctuation, ")", &[], &[]);
        b.finish_node().unwrap();
    }
    b.token(TokenKind::EndOfFile, "", &[], &[]);
    b.finish_node().unwrap();
    b.finish().unwrap()
}
