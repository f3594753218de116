//! [`Compiler`] implementation for the fixture language.

use std::sync::Arc;

use nav_project::{
    CompilationUnit, CompileError, Compiler, DocumentManager, ModuleGraph, ModuleId, ProjectLayout,
};
use nav_syntax::{SyntaxTree, TokenKind};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::binder::bind;
use crate::declarations::{imported_modules, ModuleScope};
use crate::parser::parse;

/// Parses and binds fixture units.
///
/// Sibling units of the compiled module, and units of imported modules,
/// are read through the document manager without taking their locks.
/// Every `compile_unit` call is recorded so tests can check which units a
/// request touched.
pub struct FixtureCompiler {
    layout: ProjectLayout,
    documents: Arc<dyn DocumentManager>,
    log: Mutex<Vec<(ModuleId, String)>>,
}

impl FixtureCompiler {
    pub fn new(layout: ProjectLayout, documents: Arc<dyn DocumentManager>) -> Self {
        FixtureCompiler {
            layout,
            documents,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Units compiled so far, in call order.
    pub fn compiled(&self) -> Vec<(ModuleId, String)> {
        self.log.lock().clone()
    }

    pub fn clear_log(&self) {
        self.log.lock().clear();
    }

    fn read_tree(&self, module: &ModuleId, unit: &str) -> Result<SyntaxTree, CompileError> {
        let path = self.layout.path_for(module, unit);
        let text = self.documents.content(&path).map_err(|err| {
            CompileError::new(format!("cannot read unit `{unit}` of module `{module}`: {err}"))
        })?;
        parse(&text).map_err(|err| CompileError::new(err.to_string()))
    }

    /// Top-level declarations of `module`. `current` supplies the tree of
    /// the unit being compiled so it is not read twice.
    fn module_scope(
        &self,
        graph: &ModuleGraph,
        module: &ModuleId,
        current: Option<(&str, &SyntaxTree)>,
    ) -> Result<ModuleScope, CompileError> {
        let mut scope = ModuleScope::new(module.clone());
        let units = graph.get(module).map(|m| m.units()).unwrap_or_default();
        for unit in units {
            match current {
                Some((name, tree)) if name == unit => scope.collect(unit, tree),
                _ => scope.collect(unit, &self.read_tree(module, unit)?),
            }
        }
        if let Some((name, tree)) = current {
            if !units.iter().any(|u| u == name) {
                scope.collect(name, tree);
            }
        }
        Ok(scope)
    }
}

impl Compiler for FixtureCompiler {
    fn compile_unit(
        &self,
        graph: &ModuleGraph,
        module: &ModuleId,
        unit: &str,
        source: &str,
    ) -> Result<CompilationUnit, CompileError> {
        debug!(module = %module, unit, "compiling fixture unit");
        self.log.lock().push((module.clone(), unit.to_owned()));

        let tree = parse(source).map_err(|err| CompileError::new(err.to_string()))?;
        if let Some(bad) = tree.tokens().find(|t| t.kind() == TokenKind::Unknown) {
            return Err(
                CompileError::new(format!("unexpected character `{}`", bad.text())).with_span(bad.span()),
            );
        }

        let own = self.module_scope(graph, module, Some((unit, &tree)))?;
        let mut imports = FxHashMap::default();
        for name in imported_modules(&tree) {
            let id = ModuleId::new(&name);
            if graph.contains(&id) && id != *module {
                let scope = self.module_scope(graph, &id, None)?;
                imports.insert(name, scope);
            }
        }

        let annotations = bind(module, unit, &tree, &own, &imports);
        let mut compiled = CompilationUnit::new(module.clone(), unit, tree);
        for (node, annotation) in annotations {
            compiled.annotate(node, annotation);
        }
        Ok(compiled)
    }
}

impl std::fmt::Debug for FixtureCompiler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FixtureCompiler")
            .field("layout", &self.layout)
            .field("compiled", &self.log.lock().len())
            .finish_non_exhaustive()
    }
}
