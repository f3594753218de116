//! Walks one compilation unit and records every occurrence equivalent to a
//! target symbol.

use nav_project::{CompilationUnit, Symbol};
use nav_syntax::{dispatch_node, LineIndex, NodeId, NodeRef, Visitor};

use super::{Reference, ReferenceModel, ReferenceRole};

pub(crate) struct ReferenceCollector<'u, 'm> {
    unit: &'u CompilationUnit,
    target: &'m Symbol,
    /// Annotated node the cursor resolved to, when walking the cursor unit.
    cursor: Option<NodeId>,
    lines: LineIndex<'u>,
    model: &'m mut ReferenceModel,
    found: usize,
}

impl<'u, 'm> ReferenceCollector<'u, 'm> {
    pub(crate) fn new(
        unit: &'u CompilationUnit,
        target: &'m Symbol,
        model: &'m mut ReferenceModel,
    ) -> Self {
        ReferenceCollector {
            unit,
            target,
            cursor: None,
            lines: unit.tree().line_index(),
            model,
            found: 0,
        }
    }

    #[must_use]
    pub(crate) fn with_cursor(mut self, node: NodeId) -> Self {
        self.cursor = Some(node);
        self
    }

    /// Walk the whole unit. Returns the number of occurrences found.
    pub(crate) fn collect(mut self) -> usize {
        let unit = self.unit;
        nav_syntax::walk_tree(&mut self, unit.tree());
        self.found
    }

    fn record(&mut self, node: NodeRef<'u>) {
        let Some(annotation) = self.unit.annotation(node.id()) else {
            return;
        };
        if !annotation.symbol.is_equivalent(self.target) {
            return;
        }
        let Some(name) = self.unit.tree().token(annotation.name) else {
            return;
        };

        let span = name.span();
        let (start, end) = self.lines.range(span);
        let module = self.unit.module();
        let declared = annotation.symbol.is_declared_at(module, self.unit.name(), span);
        let reference = Reference {
            symbol: annotation.symbol.clone(),
            module: module.clone(),
            unit: self.unit.name().to_string(),
            span,
            start,
            end,
            role: ReferenceRole::Usage,
        };
        self.found += 1;

        if self.cursor == Some(node.id()) {
            if declared {
                self.model.add_definition(reference.clone());
            }
            self.model.set_cursor(reference);
        } else if declared {
            self.model.add_definition(reference);
        } else {
            self.model.add_usage(reference);
        }
    }
}

impl<'u> Visitor<'u> for ReferenceCollector<'u, '_> {
    fn visit_node(&mut self, node: NodeRef<'u>) {
        self.record(node);
        dispatch_node(self, node);
    }
}
