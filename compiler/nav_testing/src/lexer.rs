//! Fixture language lexer.
//!
//! Produces tokens with trivia already attached:
//!
//! - **Trailing trivia**: whitespace and comments after a token, up to and
//!   including the first newline
//! - **Leading trivia**: everything else before a token
//!
//! The final end-of-file token takes whatever trivia remains, so the
//! concatenation of all tokens and trivia is exactly the input.

use nav_syntax::{RawTrivia, TokenKind, TriviaKind};

pub const KEYWORDS: &[&str] = &[
    "import", "fn", "type", "record", "let", "return", "if", "else", "while",
];

const LITERAL_KEYWORDS: &[&str] = &["true", "false"];

const TWO_CHAR_PUNCT: &[&str] = &["->", "==", "!=", "<=", ">=", "&&", "||"];

const ONE_CHAR_PUNCT: &[u8] = b"(){};:,.=+-*/<>!";

/// A token with its attached trivia, borrowing the source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lexeme<'s> {
    pub kind: TokenKind,
    pub text: &'s str,
    pub leading: Vec<RawTrivia<'s>>,
    pub trailing: Vec<RawTrivia<'s>>,
}

impl Lexeme<'_> {
    #[inline]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    #[inline]
    pub fn is_punct(&self, text: &str) -> bool {
        self.is(TokenKind::Punctuation, text)
    }

    #[inline]
    pub fn is_keyword(&self, text: &str) -> bool {
        self.is(TokenKind::Keyword, text)
    }
}

/// Split `source` into lexemes. The last lexeme is always end-of-file.
pub fn lex(source: &str) -> Vec<Lexeme<'_>> {
    let mut cursor = Cursor { src: source, pos: 0 };
    let mut out = Vec::new();
    let mut leading = cursor.trivia(false);

    while !cursor.at_end() {
        let (kind, text) = cursor.token();
        let trailing = cursor.trivia(true);
        out.push(Lexeme {
            kind,
            text,
            leading,
            trailing,
        });
        leading = cursor.trivia(false);
    }

    out.push(Lexeme {
        kind: TokenKind::EndOfFile,
        text: "",
        leading,
        trailing: Vec::new(),
    });
    out
}

struct Cursor<'s> {
    src: &'s str,
    pos: usize,
}

impl<'s> Cursor<'s> {
    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn rest(&self) -> &'s str {
        &self.src[self.pos..]
    }

    fn take(&mut self, len: usize) -> &'s str {
        let text = &self.src[self.pos..self.pos + len];
        self.pos += len;
        text
    }

    /// Consume trivia. In trailing mode stop after the first newline.
    fn trivia(&mut self, trailing: bool) -> Vec<RawTrivia<'s>> {
        let mut out = Vec::new();
        loop {
            let rest = self.rest();
            let piece = if rest.starts_with("\r\n") {
                RawTrivia::new(TriviaKind::Newline, self.take(2))
            } else if rest.starts_with('\n') {
                RawTrivia::new(TriviaKind::Newline, self.take(1))
            } else if rest.starts_with("//") {
                let len = rest.find(|c: char| c == '\n' || c == '\r').unwrap_or(rest.len());
                RawTrivia::new(TriviaKind::LineComment, self.take(len))
            } else if rest.starts_with("/*") {
                let len = rest[2..].find("*/").map_or(rest.len(), |i| i + 4);
                RawTrivia::new(TriviaKind::BlockComment, self.take(len))
            } else {
                let len = rest
                    .find(|c: char| !matches!(c, ' ' | '\t' | '\r'))
                    .unwrap_or(rest.len());
                if len == 0 {
                    break;
                }
                // A lone `\r` directly before `\n` belongs to the newline.
                let len = if rest[..len].ends_with('\r') && rest[len..].starts_with('\n') {
                    len - 1
                } else {
                    len
                };
                if len == 0 {
                    break;
                }
                RawTrivia::new(TriviaKind::Whitespace, self.take(len))
            };
            let newline = piece.kind == TriviaKind::Newline;
            out.push(piece);
            if trailing && newline {
                break;
            }
        }
        out
    }

    fn token(&mut self) -> (TokenKind, &'s str) {
        let rest = self.rest();
        let mut chars = rest.chars();
        let Some(first) = chars.next() else {
            return (TokenKind::EndOfFile, "");
        };

        if first.is_ascii_alphabetic() || first == '_' {
            let len = rest
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(rest.len());
            let word = self.take(len);
            let kind = if LITERAL_KEYWORDS.contains(&word) {
                TokenKind::Literal
            } else if KEYWORDS.contains(&word) {
                TokenKind::Keyword
            } else {
                TokenKind::Identifier
            };
            return (kind, word);
        }

        if first.is_ascii_digit() {
            let len = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            return (TokenKind::Literal, self.take(len));
        }

        if first == '"' {
            let len = rest[1..]
                .find(|c: char| c == '"' || c == '\n')
                .map_or(rest.len(), |i| {
                    if rest.as_bytes()[i + 1] == b'"' {
                        i + 2
                    } else {
                        i + 1
                    }
                });
            return (TokenKind::Literal, self.take(len));
        }

        if let Some(punct) = TWO_CHAR_PUNCT.iter().find(|p| rest.starts_with(**p)) {
            return (TokenKind::Punctuation, self.take(punct.len()));
        }
        if first.is_ascii() && ONE_CHAR_PUNCT.contains(&(first as u8)) {
            return (TokenKind::Punctuation, self.take(1));
        }

        (TokenKind::Unknown, self.take(first.len_utf8()))
    }
}
