//! Resolved symbols.
//!
//! Symbols are produced by the semantic pass and attached to syntax nodes.
//! Identity is a [`SymbolId`] derived from the symbol's qualified path, so
//! the same declaration yields the same id no matter which unit or request
//! compiled it.

use std::fmt;
use std::hash::{Hash, Hasher};

use nav_syntax::Span;
use rustc_hash::FxHasher;

use crate::module::ModuleId;

/// Stable symbol identity.
#[derive(Copy, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u64);

impl SymbolId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        SymbolId(raw)
    }

    /// Derive an id from a qualified path such as `lib::Point::x`.
    ///
    /// Deterministic across runs and threads.
    pub fn from_path(path: &str) -> Self {
        let mut hasher = FxHasher::default();
        path.hash(&mut hasher);
        SymbolId(hasher.finish())
    }

    #[inline]
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({:#018x})", self.0)
    }
}

/// What kind of entity a symbol names.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum SymbolKind {
    Module,
    Function,
    Parameter,
    Variable,
    Type,
    Field,
    /// Language-provided entity with no source declaration.
    Builtin,
}

impl SymbolKind {
    pub const fn label(self) -> &'static str {
        match self {
            SymbolKind::Module => "module",
            SymbolKind::Function => "function",
            SymbolKind::Parameter => "parameter",
            SymbolKind::Variable => "variable",
            SymbolKind::Type => "type",
            SymbolKind::Field => "field",
            SymbolKind::Builtin => "builtin",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a symbol is declared: a unit of its owning module, and the span of
/// the declaring name token.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct Declaration {
    pub unit: String,
    pub span: Span,
}

impl Declaration {
    pub fn new(unit: impl Into<String>, span: Span) -> Self {
        Declaration {
            unit: unit.into(),
            span,
        }
    }
}

/// A resolved entity.
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    /// Module that owns the declaration.
    pub owner: ModuleId,
    /// `None` for builtins.
    pub declaration: Option<Declaration>,
    /// Underlying type symbol; structurally identical anonymous types share
    /// one.
    pub type_symbol: Option<SymbolId>,
    /// Signature text for hover, if the semantic pass provides one.
    pub detail: Option<String>,
}

impl Symbol {
    pub fn new(id: SymbolId, name: impl Into<String>, kind: SymbolKind, owner: ModuleId) -> Self {
        Symbol {
            id,
            name: name.into(),
            kind,
            owner,
            declaration: None,
            type_symbol: None,
            detail: None,
        }
    }

    #[must_use]
    pub fn with_declaration(mut self, declaration: Declaration) -> Self {
        self.declaration = Some(declaration);
        self
    }

    #[must_use]
    pub fn with_type_symbol(mut self, type_symbol: SymbolId) -> Self {
        self.type_symbol = Some(type_symbol);
        self
    }

    #[must_use]
    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }

    /// Two symbols are equivalent when they are the same symbol, or when
    /// both have the same underlying type symbol.
    pub fn is_equivalent(&self, other: &Symbol) -> bool {
        if self.id == other.id {
            return true;
        }
        matches!(
            (self.type_symbol, other.type_symbol),
            (Some(a), Some(b)) if a == b
        )
    }

    /// `true` if the occurrence at `(module, unit, span)` is this symbol's
    /// declaration site.
    pub fn is_declared_at(&self, module: &ModuleId, unit: &str, span: Span) -> bool {
        self.declaration
            .as_ref()
            .is_some_and(|d| &self.owner == module && d.unit == unit && d.span == span)
    }
}
