//! Fixture language parser.
//!
//! ```text
//! module     = item* EOF
//! item       = "import" IDENT ";"
//!            | "fn" IDENT params ("->" type)? body
//!            | "type" IDENT "=" type ";"
//!            | "let" IDENT (":" type)? ("=" expr)? ";"
//! params     = "(" (IDENT ":" type ("," IDENT ":" type)*)? ")"
//! type       = record | IDENT (":" IDENT)?
//! record     = "record" "{" (IDENT ":" type ";")* "}"
//! stmt       = let | "return" expr? ";" | "if" expr block ("else" (if | block))?
//!            | "while" expr block | block | expr ("=" expr)? ";"
//! expr       = binary over unary over postfix (call, .field, .method())
//! primary    = IDENT (":" IDENT)? | literal | "(" expr ")"
//! ```
//!
//! Parsing never fails on bad input: absent children become missing slots
//! and stray tokens are wrapped in `Invalid` nodes, so every byte of the
//! input ends up in the tree.

use nav_syntax::stack::ensure_sufficient_stack;
use nav_syntax::{BuildError, Checkpoint, NodeKind, SyntaxTree, TokenKind, TreeBuilder};

use crate::lexer::{lex, Lexeme};

/// Parse `source` into a full-fidelity tree.
pub fn parse(source: &str) -> Result<SyntaxTree, BuildError> {
    let mut parser = Parser {
        lexemes: lex(source),
        pos: 0,
        builder: TreeBuilder::new(),
        error: None,
    };
    parser.module();
    match parser.error {
        Some(err) => Err(err),
        None => parser.builder.finish(),
    }
}

fn binary_precedence(lexeme: &Lexeme<'_>) -> Option<u8> {
    if lexeme.kind != TokenKind::Punctuation {
        return None;
    }
    Some(match lexeme.text {
        "||" => 1,
        "&&" => 2,
        "==" | "!=" => 3,
        "<" | ">" | "<=" | ">=" => 4,
        "+" | "-" => 5,
        "*" | "/" => 6,
        _ => return None,
    })
}

struct Parser<'s> {
    lexemes: Vec<Lexeme<'s>>,
    pos: usize,
    builder: TreeBuilder,
    error: Option<BuildError>,
}

impl<'s> Parser<'s> {
    // Cursor helpers

    fn nth(&self, n: usize) -> Option<&Lexeme<'s>> {
        let last = self.lexemes.len().checked_sub(1)?;
        self.lexemes.get((self.pos + n).min(last))
    }

    fn at_eof(&self) -> bool {
        self.nth(0).map_or(true, |l| l.kind == TokenKind::EndOfFile)
    }

    fn at_punct(&self, text: &str) -> bool {
        self.nth(0).is_some_and(|l| l.is_punct(text))
    }

    fn at_keyword(&self, text: &str) -> bool {
        self.nth(0).is_some_and(|l| l.is_keyword(text))
    }

    fn at_kind(&self, n: usize, kind: TokenKind) -> bool {
        self.nth(n).is_some_and(|l| l.kind == kind)
    }

    fn at_ident(&self) -> bool {
        self.at_kind(0, TokenKind::Identifier)
    }

    fn at_expr_start(&self) -> bool {
        self.at_ident()
            || self.at_kind(0, TokenKind::Literal)
            || self.at_punct("(")
            || self.at_punct("-")
            || self.at_punct("!")
    }

    /// Push the current token into the tree and advance. End-of-file is
    /// only consumed by [`module`](Self::module).
    fn bump(&mut self) {
        let Some(lexeme) = self.lexemes.get(self.pos) else {
            return;
        };
        self.builder
            .token(lexeme.kind, lexeme.text, &lexeme.leading, &lexeme.trailing);
        self.pos += 1;
    }

    fn expect_punct(&mut self, text: &str) {
        if self.at_punct(text) {
            self.bump();
        } else {
            self.builder.missing();
        }
    }

    fn expect_ident(&mut self) {
        if self.at_ident() {
            self.bump();
        } else {
            self.builder.missing();
        }
    }

    // Builder helpers

    fn start(&mut self, kind: NodeKind) {
        self.builder.start_node(kind);
    }

    fn start_at(&mut self, checkpoint: Checkpoint, kind: NodeKind) {
        if let Err(err) = self.builder.start_node_at(checkpoint, kind) {
            self.error.get_or_insert(err);
            // Keep the node stack balanced for the matching `finish`.
            self.builder.start_node(kind);
        }
    }

    fn finish(&mut self) {
        if let Err(err) = self.builder.finish_node() {
            self.error.get_or_insert(err);
        }
    }

    /// Wrap the current token in an `Invalid` node.
    fn invalid(&mut self) {
        self.start(NodeKind::Invalid);
        self.bump();
        self.finish();
    }

    // Items

    fn module(&mut self) {
        self.start(NodeKind::ModulePart);
        while !self.at_eof() {
            self.item();
        }
        self.bump();
        self.finish();
    }

    fn item(&mut self) {
        if self.at_keyword("import") {
            self.start(NodeKind::ImportDeclaration);
            self.bump();
            self.expect_ident();
            self.expect_punct(";");
            self.finish();
        } else if self.at_keyword("fn") {
            self.function();
        } else if self.at_keyword("type") {
            self.type_definition();
        } else if self.at_keyword("let") {
            self.let_declaration(NodeKind::ModuleVariableDeclaration);
        } else {
            self.invalid();
        }
    }

    fn function(&mut self) {
        self.start(NodeKind::FunctionDefinition);
        self.bump();
        self.expect_ident();
        self.parameters();
        if self.at_punct("->") {
            self.start(NodeKind::ReturnTypeDescriptor);
            self.bump();
            self.type_descriptor();
            self.finish();
        }
        if self.at_punct("{") {
            self.block(NodeKind::FunctionBody);
        } else {
            self.builder.missing();
        }
        self.finish();
    }

    fn parameters(&mut self) {
        if !self.at_punct("(") {
            self.builder.missing();
            return;
        }
        self.start(NodeKind::ParameterList);
        self.bump();
        while self.at_ident() {
            self.start(NodeKind::RequiredParameter);
            self.bump();
            self.expect_punct(":");
            self.type_descriptor();
            self.finish();
            if self.at_punct(",") {
                self.bump();
            } else {
                break;
            }
        }
        self.expect_punct(")");
        self.finish();
    }

    /// A named type, or an anonymous record written in place.
    fn type_descriptor(&mut self) {
        if self.at_keyword("record") {
            ensure_sufficient_stack(|| self.record());
        } else {
            self.type_reference();
        }
    }

    fn record(&mut self) {
        self.start(NodeKind::RecordTypeDescriptor);
        self.bump();
        self.expect_punct("{");
        while self.at_ident() {
            self.start(NodeKind::RecordField);
            self.bump();
            self.expect_punct(":");
            self.type_descriptor();
            self.expect_punct(";");
            self.finish();
        }
        self.expect_punct("}");
        self.finish();
    }

    fn type_reference(&mut self) {
        if !self.at_ident() {
            self.builder.missing();
            return;
        }
        self.start(NodeKind::TypeReference);
        self.bump();
        if self.at_punct(":") && self.at_kind(1, TokenKind::Identifier) {
            self.bump();
            self.bump();
        }
        self.finish();
    }

    fn type_definition(&mut self) {
        self.start(NodeKind::TypeDefinition);
        self.bump();
        self.expect_ident();
        self.expect_punct("=");
        self.type_descriptor();
        self.expect_punct(";");
        self.finish();
    }

    fn let_declaration(&mut self, kind: NodeKind) {
        self.start(kind);
        self.bump();
        self.expect_ident();
        if self.at_punct(":") {
            self.bump();
            self.type_descriptor();
        }
        if self.at_punct("=") {
            self.bump();
            self.expr();
        }
        self.expect_punct(";");
        self.finish();
    }

    // Statements

    fn block(&mut self, kind: NodeKind) {
        self.start(kind);
        self.bump();
        while !self.at_punct("}") && !self.at_eof() {
            self.statement();
        }
        self.expect_punct("}");
        self.finish();
    }

    fn block_or_missing(&mut self) {
        if self.at_punct("{") {
            self.block(NodeKind::BlockStatement);
        } else {
            self.builder.missing();
        }
    }

    fn statement(&mut self) {
        if self.at_keyword("let") {
            self.let_declaration(NodeKind::VariableDeclaration);
        } else if self.at_keyword("return") {
            self.start(NodeKind::ReturnStatement);
            self.bump();
            if self.at_expr_start() {
                self.expr();
            }
            self.expect_punct(";");
            self.finish();
        } else if self.at_keyword("if") {
            self.if_statement();
        } else if self.at_keyword("while") {
            self.start(NodeKind::WhileStatement);
            self.bump();
            self.expr();
            self.block_or_missing();
            self.finish();
        } else if self.at_punct("{") {
            self.block(NodeKind::BlockStatement);
        } else if self.at_expr_start() {
            let checkpoint = self.builder.checkpoint();
            self.expr();
            if self.at_punct("=") {
                self.start_at(checkpoint, NodeKind::AssignmentStatement);
                self.bump();
                self.expr();
            } else {
                self.start_at(checkpoint, NodeKind::ExpressionStatement);
            }
            self.expect_punct(";");
            self.finish();
        } else {
            self.invalid();
        }
    }

    fn if_statement(&mut self) {
        ensure_sufficient_stack(|| {
            self.start(NodeKind::IfElseStatement);
            self.bump();
            self.expr();
            self.block_or_missing();
            if self.at_keyword("else") {
                self.start(NodeKind::ElseBlock);
                self.bump();
                if self.at_keyword("if") {
                    self.if_statement();
                } else {
                    self.block_or_missing();
                }
                self.finish();
            }
            self.finish();
        });
    }

    // Expressions

    fn expr(&mut self) {
        if self.at_expr_start() {
            self.binary(0);
        } else {
            self.builder.missing();
        }
    }

    fn binary(&mut self, min_precedence: u8) {
        ensure_sufficient_stack(|| {
            let checkpoint = self.builder.checkpoint();
            self.unary();
            while let Some(precedence) = self.nth(0).and_then(binary_precedence) {
                if precedence < min_precedence {
                    break;
                }
                self.start_at(checkpoint, NodeKind::BinaryExpression);
                self.bump();
                if self.at_expr_start() {
                    self.binary(precedence + 1);
                } else {
                    self.builder.missing();
                }
                self.finish();
            }
        });
    }

    fn unary(&mut self) {
        if self.at_punct("-") || self.at_punct("!") {
            ensure_sufficient_stack(|| {
                self.start(NodeKind::UnaryExpression);
                self.bump();
                if self.at_expr_start() {
                    self.unary();
                } else {
                    self.builder.missing();
                }
                self.finish();
            });
        } else {
            self.postfix();
        }
    }

    fn postfix(&mut self) {
        let checkpoint = self.builder.checkpoint();
        let mut callable = self.primary();
        loop {
            if callable && self.at_punct("(") {
                self.start_at(checkpoint, NodeKind::FunctionCall);
                self.arguments();
                self.finish();
            } else if self.at_punct(".") && self.at_kind(1, TokenKind::Identifier) {
                let method = self.nth(2).is_some_and(|l| l.is_punct("("));
                let kind = if method {
                    NodeKind::MethodCall
                } else {
                    NodeKind::FieldAccess
                };
                self.start_at(checkpoint, kind);
                self.bump();
                self.bump();
                if method {
                    self.arguments();
                }
                self.finish();
            } else {
                break;
            }
            callable = false;
        }
    }

    /// Returns `true` if the primary was a name (and may be called).
    fn primary(&mut self) -> bool {
        if self.at_ident() {
            let qualified = self.nth(1).is_some_and(|l| l.is_punct(":"))
                && self.at_kind(2, TokenKind::Identifier);
            if qualified {
                self.start(NodeKind::QualifiedNameReference);
                self.bump();
                self.bump();
                self.bump();
            } else {
                self.start(NodeKind::SimpleNameReference);
                self.bump();
            }
            self.finish();
            true
        } else if self.at_kind(0, TokenKind::Literal) {
            self.start(NodeKind::BasicLiteral);
            self.bump();
            self.finish();
            false
        } else if self.at_punct("(") {
            self.start(NodeKind::BracedExpression);
            self.bump();
            self.expr();
            self.expect_punct(")");
            self.finish();
            false
        } else {
            self.builder.missing();
            false
        }
    }

    fn arguments(&mut self) {
        self.start(NodeKind::ArgumentList);
        self.bump();
        while self.at_expr_start() {
            self.start(NodeKind::PositionalArgument);
            self.expr();
            self.finish();
            if self.at_punct(",") {
                self.bump();
            } else {
                break;
            }
        }
        self.expect_punct(")");
        self.finish();
    }
}
