//! Annotated compilation units.

use nav_syntax::{NodeId, SyntaxTree, TokenId};
use rustc_hash::FxHashMap;

use crate::module::ModuleId;
use crate::symbol::Symbol;

/// Resolution attached to one node: the symbol it refers to or declares,
/// and the identifier token naming it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Annotation {
    pub symbol: Symbol,
    /// Token whose range is the occurrence's range.
    pub name: TokenId,
}

/// One file after the semantic pass: its tree plus node annotations.
#[derive(Debug)]
pub struct CompilationUnit {
    module: ModuleId,
    name: String,
    tree: SyntaxTree,
    annotations: FxHashMap<NodeId, Annotation>,
}

impl CompilationUnit {
    pub fn new(module: ModuleId, name: impl Into<String>, tree: SyntaxTree) -> Self {
        CompilationUnit {
            module,
            name: name.into(),
            tree,
            annotations: FxHashMap::default(),
        }
    }

    /// Attach a resolution to a node. A later annotation of the same node
    /// replaces the earlier one.
    pub fn annotate(&mut self, node: NodeId, annotation: Annotation) {
        self.annotations.insert(node, annotation);
    }

    #[inline]
    pub fn module(&self) -> &ModuleId {
        &self.module
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn tree(&self) -> &SyntaxTree {
        &self.tree
    }

    #[inline]
    pub fn annotation(&self, node: NodeId) -> Option<&Annotation> {
        self.annotations.get(&node)
    }

    pub fn annotation_count(&self) -> usize {
        self.annotations.len()
    }
}
