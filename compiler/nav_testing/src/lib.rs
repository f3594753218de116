//! Nav Testing - Fixture Language and Workspaces
//!
//! A small C-like language, just rich enough to exercise navigation:
//! modules with several units, imports, qualified names, functions,
//! parameters, block-scoped locals, record types with fields and type
//! aliases.
//!
//! - [`lex`] / [`parse`]: lossless parsing into a [`nav_syntax::SyntaxTree`]
//! - [`FixtureCompiler`]: a [`nav_project::Compiler`] annotating every name
//! - [`WorkspaceBuilder`]: in-memory projects with a derived module graph

mod binder;
mod compiler;
mod declarations;
mod lexer;
mod parser;
mod workspace;

pub use compiler::FixtureCompiler;
pub use declarations::{imported_modules, BUILTIN_MODULE};
pub use lexer::{lex, Lexeme, KEYWORDS};
pub use parser::parse;
pub use workspace::{Workspace, WorkspaceBuilder};
