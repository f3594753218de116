//! Nav Project - What a Navigation Request Consumes
//!
//! The navigation engine does not parse, type-check or load files itself.
//! This crate defines the narrow interfaces it consumes instead:
//!
//! - [`ModuleGraph`]: immutable snapshot of modules, their units and imports
//! - [`Symbol`] / [`SymbolId`]: resolved entities with stable identity
//! - [`CompilationUnit`]: a syntax tree plus its node annotations
//! - [`Compiler`]: the external semantic pass producing compilation units
//! - [`DocumentManager`]: URI mapping, current file content and per-file locks
//! - [`ProjectLayout`]: the on-disk convention mapping modules to paths
//!
//! It also ships an in-memory [`Documents`] store and [`ChangeSet`] text
//! editing, used by hosts that keep open files in memory.

mod compiler;
mod documents;
mod edit;
mod layout;
mod module;
mod symbol;
mod unit;

pub use compiler::{CompileError, Compiler};
pub use documents::{DocumentError, DocumentLock, DocumentManager, Documents, LockTable};
pub use edit::{ChangeSet, EditConflict, SpanEdit};
pub use layout::ProjectLayout;
pub use module::{Module, ModuleGraph, ModuleGraphBuilder, ModuleId};
pub use symbol::{Declaration, Symbol, SymbolId, SymbolKind};
pub use unit::{Annotation, CompilationUnit};
