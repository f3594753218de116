//! The external semantic pass.

use nav_syntax::Span;

use crate::module::{ModuleGraph, ModuleId};
use crate::unit::CompilationUnit;

/// Failure of the semantic pass on one unit.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompileError {
    pub message: String,
    /// Offending source range, when known.
    pub span: Option<Span>,
}

impl CompileError {
    pub fn new(message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
            span: None,
        }
    }

    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }
}

/// Parses and resolves one unit of a module.
///
/// Implementations must be callable from several threads at once; the
/// navigation engine serializes access per file, not per compiler.
pub trait Compiler: Send + Sync {
    /// Compile `source`, the current content of `unit` in `module`.
    ///
    /// The result must annotate every name node with the symbol it resolves
    /// to, including declaration names.
    fn compile_unit(
        &self,
        graph: &ModuleGraph,
        module: &ModuleId,
        unit: &str,
        source: &str,
    ) -> Result<CompilationUnit, CompileError>;
}
