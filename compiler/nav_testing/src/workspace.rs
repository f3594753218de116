//! In-memory workspaces for end-to-end tests.
//!
//! ```
//! use nav_testing::WorkspaceBuilder;
//!
//! let ws = WorkspaceBuilder::new()
//!     .file("lib", "lib.nav", "fn helper() { }\n")
//!     .file(".", "main.nav", "import lib;\nfn main() { lib:helper(); }\n")
//!     .build();
//! assert_eq!(ws.graph.len(), 2);
//! let pos = ws.position(".", "main.nav", "helper");
//! assert_eq!((pos.line, pos.character), (1, 16));
//! ```

#![allow(clippy::expect_used, reason = "fixture helpers panic on malformed test input")]

use std::path::PathBuf;
use std::sync::Arc;

use lsp_types::{Location, Position, Url};
use nav_project::{DocumentManager, Documents, Module, ModuleGraph, ModuleId, ProjectLayout};
use nav_syntax::{LineCol, LineIndex, Span};

use crate::compiler::FixtureCompiler;
use crate::declarations::imported_modules;
use crate::parser::parse;

#[cfg(not(windows))]
const ROOT: &str = "/workspace";
#[cfg(windows)]
const ROOT: &str = r"C:\workspace";

/// Collects fixture files, then derives the module graph from their
/// imports.
#[derive(Debug, Default)]
pub struct WorkspaceBuilder {
    files: Vec<(ModuleId, String, String)>,
}

impl WorkspaceBuilder {
    pub fn new() -> Self {
        WorkspaceBuilder::default()
    }

    /// Add `unit` to `module` (`"."` for the unnamed module).
    #[must_use]
    pub fn file(mut self, module: &str, unit: &str, text: &str) -> Self {
        self.files
            .push((ModuleId::new(module), unit.to_owned(), text.to_owned()));
        self
    }

    pub fn build(self) -> Workspace {
        let layout = ProjectLayout::new(ROOT);
        let documents = Arc::new(Documents::new());

        // Modules in first-mention order; imports only to modules that exist.
        let mut modules: Vec<Module> = Vec::new();
        for (module, unit, text) in &self.files {
            documents.open(layout.path_for(module, unit), text.as_str());
            let index = match modules.iter().position(|m| m.id() == module) {
                Some(index) => index,
                None => {
                    modules.push(Module::new(module.clone()));
                    modules.len() - 1
                }
            };
            let imports = parse(text).map(|tree| imported_modules(&tree)).unwrap_or_default();
            let mut updated = modules[index].clone().with_unit(unit.as_str());
            for import in imports {
                let import = ModuleId::new(import);
                if self.files.iter().any(|(m, _, _)| *m == import) {
                    updated = updated.with_import(import);
                }
            }
            modules[index] = updated;
        }

        let mut builder = ModuleGraph::builder();
        for module in modules {
            builder.add(module);
        }
        let manager: Arc<dyn DocumentManager> = documents.clone();
        Workspace {
            compiler: Arc::new(FixtureCompiler::new(layout.clone(), manager)),
            graph: Arc::new(builder.build()),
            documents,
            layout,
        }
    }
}

/// A built workspace: everything an analysis host needs.
#[derive(Debug)]
pub struct Workspace {
    pub layout: ProjectLayout,
    pub graph: Arc<ModuleGraph>,
    pub documents: Arc<Documents>,
    pub compiler: Arc<FixtureCompiler>,
}

impl Workspace {
    pub fn path(&self, module: &str, unit: &str) -> PathBuf {
        self.layout.path_for(&ModuleId::new(module), unit)
    }

    pub fn uri(&self, module: &str, unit: &str) -> Url {
        self.layout
            .uri_for(&ModuleId::new(module), unit)
            .expect("fixture root is absolute")
    }

    /// Current text of a unit.
    pub fn text(&self, module: &str, unit: &str) -> Arc<str> {
        self.documents
            .get(&self.path(module, unit))
            .expect("unit exists in the workspace")
    }

    /// Position of the first occurrence of `needle` in a unit.
    pub fn position(&self, module: &str, unit: &str, needle: &str) -> Position {
        self.position_nth(module, unit, needle, 0)
    }

    /// Position of the `nth` (zero-based) occurrence of `needle`.
    pub fn position_nth(&self, module: &str, unit: &str, needle: &str, nth: usize) -> Position {
        let text = self.text(module, unit);
        let offset = text
            .match_indices(needle)
            .nth(nth)
            .map(|(offset, _)| offset)
            .expect("needle occurs in the unit");
        let pos = LineIndex::new(&text).line_col(u32::try_from(offset).expect("small fixture"));
        Position::new(pos.line, pos.character)
    }

    /// Text a location covers, read from the current document content.
    pub fn location_text(&self, location: &Location) -> String {
        let path = self
            .documents
            .path_from_uri(&location.uri)
            .expect("file URI");
        let text = self.documents.get(&path).expect("location points into the workspace");
        let index = LineIndex::new(&text);
        let start = index
            .offset(LineCol::new(location.range.start.line, location.range.start.character))
            .expect("start inside text");
        let end = index
            .offset(LineCol::new(location.range.end.line, location.range.end.character))
            .expect("end inside text");
        text[Span::new(start, end).to_range()].to_owned()
    }
}
