//! Name resolution for one unit.
//!
//! Walks the tree once with a scope stack. Lookup order for a bare name is
//! locals (innermost first), then the module's top-level declarations, then
//! builtins. `lib:name` resolves in module `lib` only if this unit imports
//! it. Expression types are tracked just far enough to resolve field
//! accesses: variables and parameters with a declared (or inferred) record
//! type, calls of functions with a declared return type.
//!
//! A `record { .. }` written in a type position (anything but the body of
//! a `type` definition) is anonymous. Each occurrence is its own symbol,
//! named by its `record` keyword, and carries a type symbol derived from
//! its shape: field names with their resolved types, in order. Occurrences
//! with the same shape are therefore equivalent. Named types never carry
//! one, so `type A` and `type B` stay distinct whatever their fields.

use nav_project::{Annotation, Declaration, ModuleId, Symbol, SymbolId, SymbolKind};
use nav_syntax::{walk_node, walk_tree, NodeId, NodeKind, NodeRef, SyntaxTree, TokenRef, Visitor};
use rustc_hash::FxHashMap;

use crate::declarations::{
    builtin, declare, header_text, ident_at, is_builtin_type, module_symbol, Field, ModuleScope,
    TypeName,
};

/// Alias chains longer than this are treated as unresolved.
const MAX_ALIAS_DEPTH: usize = 8;

/// A record type whose fields can be looked up.
#[derive(Clone, Debug, PartialEq, Eq)]
enum TypeKey {
    Named { module: ModuleId, name: String },
    /// `RecordTypeDescriptor` node of an anonymous record in this unit.
    Anonymous(NodeId),
}

struct AnonymousField {
    symbol: Symbol,
    ty: Option<TypeKey>,
}

struct Local {
    symbol: Symbol,
    ty: Option<TypeKey>,
}

/// Resolve every name in `tree`, returning the annotations to attach.
///
/// `imports` holds the scopes of modules this unit imports, keyed by the
/// name used in source.
pub(crate) fn bind(
    module: &ModuleId,
    unit: &str,
    tree: &SyntaxTree,
    own: &ModuleScope,
    imports: &FxHashMap<String, ModuleScope>,
) -> Vec<(NodeId, Annotation)> {
    let mut binder = Binder {
        module,
        unit,
        own,
        imports,
        scopes: Vec::new(),
        function: None,
        ordinals: FxHashMap::default(),
        types: FxHashMap::default(),
        returns: FxHashMap::default(),
        anonymous: FxHashMap::default(),
        shapes: FxHashMap::default(),
        annotations: Vec::new(),
    };
    walk_tree(&mut binder, tree);
    tracing::trace!(
        module = %module,
        unit,
        annotations = binder.annotations.len(),
        "bound unit"
    );
    binder.annotations
}

struct Binder<'c> {
    module: &'c ModuleId,
    unit: &'c str,
    own: &'c ModuleScope,
    imports: &'c FxHashMap<String, ModuleScope>,
    scopes: Vec<FxHashMap<String, Local>>,
    /// Enclosing function name.
    function: Option<String>,
    /// Declarations seen so far per local name in the current function.
    ordinals: FxHashMap<String, u32>,
    /// Record type of expression nodes.
    types: FxHashMap<NodeId, TypeKey>,
    /// Return type of callee name nodes.
    returns: FxHashMap<NodeId, TypeKey>,
    /// Fields of anonymous records, by descriptor node.
    anonymous: FxHashMap<NodeId, Vec<AnonymousField>>,
    /// Shape text of anonymous records, by descriptor node.
    shapes: FxHashMap<NodeId, String>,
    annotations: Vec<(NodeId, Annotation)>,
}

impl<'c> Binder<'c> {
    fn annotate(&mut self, node: NodeRef<'_>, name: TokenRef<'_>, symbol: Symbol) {
        self.annotations.push((
            node.id(),
            Annotation {
                symbol,
                name: name.id(),
            },
        ));
    }

    fn scope_of(&self, module: &ModuleId) -> Option<&'c ModuleScope> {
        if module == self.own.module() {
            return Some(self.own);
        }
        self.imports.values().find(|scope| scope.module() == module)
    }

    /// Resolve a written type as seen from `scope`.
    fn resolve_type(&self, scope: &'c ModuleScope, ty: &TypeName) -> Option<(Symbol, Option<TypeKey>)> {
        let (scope, item) = match &ty.qualifier {
            Some(qualifier) => {
                let target = self.imports.get(qualifier)?;
                (target, target.type_item(&ty.name)?)
            }
            None => match scope.type_item(&ty.name) {
                Some(item) => (scope, item),
                None if is_builtin_type(&ty.name) => return Some((builtin(&ty.name)?, None)),
                None => return None,
            },
        };
        let key = TypeKey::Named {
            module: scope.module().clone(),
            name: ty.name.clone(),
        };
        Some((item.symbol.clone(), Some(key)))
    }

    fn resolve_type_key(&self, scope: &'c ModuleScope, ty: Option<&TypeName>) -> Option<TypeKey> {
        self.resolve_type(scope, ty?).and_then(|(_, key)| key)
    }

    /// Fields of a named record type, following aliases, with the scope
    /// their types are written in.
    fn named_fields(&self, module: &ModuleId, name: &str) -> Option<(&'c ModuleScope, &'c [Field])> {
        let (mut module, mut name) = (module.clone(), name.to_owned());
        for _ in 0..MAX_ALIAS_DEPTH {
            let scope = self.scope_of(&module)?;
            let item = scope.type_item(&name)?;
            if !item.fields.is_empty() {
                return Some((scope, &item.fields));
            }
            match self.resolve_type_key(scope, item.ty.as_ref())? {
                TypeKey::Named { module: m, name: n } => (module, name) = (m, n),
                TypeKey::Anonymous(_) => return None,
            }
        }
        None
    }

    /// The field `name` of a record type and the field's own type.
    fn field_of(&self, key: &TypeKey, name: &str) -> Option<(Symbol, Option<TypeKey>)> {
        match key {
            TypeKey::Named { module, name: ty } => {
                let (scope, fields) = self.named_fields(module, ty)?;
                let field = fields.iter().find(|f| f.symbol.name == name)?;
                Some((field.symbol.clone(), self.resolve_type_key(scope, field.ty.as_ref())))
            }
            TypeKey::Anonymous(record) => {
                let field = self.anonymous.get(record)?.iter().find(|f| f.symbol.name == name)?;
                Some((field.symbol.clone(), field.ty.clone()))
            }
        }
    }

    /// Type of a type node written in this unit.
    fn written_type_key(&self, node: NodeRef<'_>) -> Option<TypeKey> {
        match node.kind() {
            NodeKind::RecordTypeDescriptor => Some(TypeKey::Anonymous(node.id())),
            _ => self.resolve_type_key(self.own, TypeName::from_node(node).as_ref()),
        }
    }

    /// The type node among `node`'s children, if one is written.
    fn type_child<'t>(node: NodeRef<'t>) -> Option<NodeRef<'t>> {
        node.child_nodes().find(|n| is_type_node(*n))
    }

    /// Shape text of a field type: the resolved type's path, a nested
    /// record's shape, or the written text when unresolved.
    fn shape_of(&self, node: NodeRef<'_>) -> String {
        if node.kind() == NodeKind::RecordTypeDescriptor {
            return self.shapes.get(&node.id()).cloned().unwrap_or_default();
        }
        match TypeName::from_node(node).and_then(|ty| self.resolve_type(self.own, &ty)) {
            Some((symbol, _)) => format!("{}::{}", symbol.owner, symbol.name),
            None => format!("?{}", header_text(node, |_| true)),
        }
    }

    /// Annotate an anonymous record and its fields. Nested records and
    /// field types must already be bound.
    fn declare_anonymous(&mut self, node: NodeRef<'_>) {
        let Some(keyword) = node.child(0).and_then(|c| c.into_token()) else {
            return;
        };
        let path = format!(
            "{}::{}::<record@{}>",
            self.module,
            self.unit,
            keyword.span().start
        );
        let mut shape = String::from("record{");
        let mut fields = Vec::new();
        for field in node.child_nodes() {
            let Some(name) = ident_at(field, 0) else {
                continue;
            };
            let written = Self::type_child(field);
            let field_shape = written.map_or_else(|| "?".to_owned(), |ty| self.shape_of(ty));
            shape.push_str(&format!("{}:{field_shape};", name.text()));
            let symbol = Symbol::new(
                SymbolId::from_path(&format!("{path}::{}", name.text())),
                name.text(),
                SymbolKind::Field,
                self.module.clone(),
            )
            .with_declaration(Declaration::new(self.unit, name.span()))
            .with_detail(header_text(field, |c| c.into_token().map_or(true, |t| t.text() != ";")));
            self.annotate(field, name, symbol.clone());
            fields.push(AnonymousField {
                symbol,
                ty: written.and_then(|ty| self.written_type_key(ty)),
            });
        }
        shape.push('}');

        let symbol = Symbol::new(SymbolId::from_path(&path), "record", SymbolKind::Type, self.module.clone())
            .with_type_symbol(SymbolId::from_path(&format!("<{shape}>")))
            .with_detail(header_text(node, |_| true));
        self.annotate(node, keyword, symbol);
        self.shapes.insert(node.id(), shape);
        self.anonymous.insert(node.id(), fields);
    }

    /// Type of a top-level item when used as a value.
    fn item_value_type(&self, scope: &'c ModuleScope, name: &str) -> Option<TypeKey> {
        let item = scope.get(name)?;
        (item.symbol.kind == SymbolKind::Variable)
            .then(|| self.resolve_type_key(scope, item.ty.as_ref()))
            .flatten()
    }

    fn item_return_type(&self, scope: &'c ModuleScope, name: &str) -> Option<TypeKey> {
        let item = scope.get(name)?;
        (item.symbol.kind == SymbolKind::Function)
            .then(|| self.resolve_type_key(scope, item.ty.as_ref()))
            .flatten()
    }

    fn local_path(&self, name: &str) -> String {
        let function = self.function.as_deref().unwrap_or("<module>");
        format!("{}::{}::{function}::{name}", self.module, self.unit)
    }

    fn bind_local(&mut self, name: &str, local: Local) {
        if let Some(scope) = self.scopes.last_mut() {
            scope.insert(name.to_owned(), local);
        }
    }

    fn lookup_local(&self, name: &str) -> Option<&Local> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    fn with_scope(&mut self, node: NodeRef<'_>) {
        self.scopes.push(FxHashMap::default());
        walk_node(self, node);
        self.scopes.pop();
    }

    fn record_type(&mut self, node: NodeRef<'_>, ty: Option<TypeKey>) {
        if let Some(ty) = ty {
            self.types.insert(node.id(), ty);
        }
    }

    /// Annotate a top-level declaration node and its record fields.
    fn declare_item(&mut self, node: NodeRef<'_>) {
        let Some(item) = declare(self.module, self.unit, node) else {
            return;
        };
        let tree = node.tree();
        for field in &item.fields {
            if let (Some(field_node), Some(name)) = (tree.node(field.node), tree.token(field.name)) {
                self.annotate(field_node, name, field.symbol.clone());
            }
        }
        if let Some(name) = tree.token(item.name) {
            self.annotate(node, name, item.symbol);
        }
    }
}

impl<'t> Visitor<'t> for Binder<'_> {
    fn visit_import_declaration(&mut self, node: NodeRef<'t>) {
        if let Some(name) = ident_at(node, 1) {
            self.annotate(node, name, module_symbol(name.text()));
        }
    }

    fn visit_function_definition(&mut self, node: NodeRef<'t>) {
        self.declare_item(node);
        self.function = ident_at(node, 1).map(|t| t.text().to_owned());
        self.ordinals.clear();
        self.with_scope(node);
        self.function = None;
    }

    fn visit_type_definition(&mut self, node: NodeRef<'t>) {
        self.declare_item(node);
        // The body record is the named type itself, not an anonymous one.
        for body in node.child_nodes() {
            if body.kind() == NodeKind::RecordTypeDescriptor {
                walk_node(self, body);
            } else {
                self.visit_node(body);
            }
        }
    }

    fn visit_record_type_descriptor(&mut self, node: NodeRef<'t>) {
        walk_node(self, node);
        self.declare_anonymous(node);
    }

    fn visit_module_variable_declaration(&mut self, node: NodeRef<'t>) {
        self.declare_item(node);
        walk_node(self, node);
    }

    fn visit_required_parameter(&mut self, node: NodeRef<'t>) {
        walk_node(self, node);
        let Some(name) = ident_at(node, 0) else {
            return;
        };
        let symbol = Symbol::new(
            SymbolId::from_path(&self.local_path(name.text())),
            name.text(),
            SymbolKind::Parameter,
            self.module.clone(),
        )
        .with_declaration(Declaration::new(self.unit, name.span()))
        .with_detail(header_text(node, |_| true));
        let ty = Self::type_child(node).and_then(|ty| self.written_type_key(ty));
        self.annotate(node, name, symbol.clone());
        self.bind_local(name.text(), Local { symbol, ty });
    }

    fn visit_function_body(&mut self, node: NodeRef<'t>) {
        self.with_scope(node);
    }

    fn visit_block_statement(&mut self, node: NodeRef<'t>) {
        self.with_scope(node);
    }

    fn visit_variable_declaration(&mut self, node: NodeRef<'t>) {
        // The initializer sees the previous binding of the same name.
        walk_node(self, node);
        let Some(name) = ident_at(node, 1) else {
            return;
        };
        let ordinal = {
            let count = self.ordinals.entry(name.text().to_owned()).or_insert(0);
            *count += 1;
            *count
        };
        let path = format!("{}#{ordinal}", self.local_path(name.text()));

        let ty = match Self::type_child(node) {
            Some(declared) => self.written_type_key(declared),
            None => node
                .child_nodes()
                .filter(|n| !is_type_node(*n))
                .last()
                .and_then(|init| self.types.get(&init.id()).cloned()),
        };
        let symbol = Symbol::new(
            SymbolId::from_path(&path),
            name.text(),
            SymbolKind::Variable,
            self.module.clone(),
        )
        .with_declaration(Declaration::new(self.unit, name.span()))
        .with_detail(header_text(node, |c| {
            c.into_token().map_or(true, |t| t.text() != "=" && t.text() != ";")
        }));
        self.annotate(node, name, symbol.clone());
        self.bind_local(name.text(), Local { symbol, ty });
    }

    fn visit_type_reference(&mut self, node: NodeRef<'t>) {
        let Some(ty) = TypeName::from_node(node) else {
            return;
        };
        let Some(name) = node.child_tokens().filter(|t| t.kind().is_identifier()).last() else {
            return;
        };
        if let Some((symbol, _)) = self.resolve_type(self.own, &ty) {
            self.annotate(node, name, symbol);
        }
    }

    fn visit_simple_name_reference(&mut self, node: NodeRef<'t>) {
        let Some(name) = ident_at(node, 0) else {
            return;
        };
        let text = name.text();
        if let Some(local) = self.lookup_local(text) {
            let (symbol, ty) = (local.symbol.clone(), local.ty.clone());
            self.annotate(node, name, symbol);
            self.record_type(node, ty);
        } else if let Some(item) = self.own.get(text) {
            let symbol = item.symbol.clone();
            let ty = self.item_value_type(self.own, text);
            if let Some(ret) = self.item_return_type(self.own, text) {
                self.returns.insert(node.id(), ret);
            }
            self.annotate(node, name, symbol);
            self.record_type(node, ty);
        } else if let Some(symbol) = builtin(text) {
            self.annotate(node, name, symbol);
        }
    }

    fn visit_qualified_name_reference(&mut self, node: NodeRef<'t>) {
        let (Some(qualifier), Some(name)) = (ident_at(node, 0), ident_at(node, 2)) else {
            return;
        };
        let Some(scope) = self.imports.get(qualifier.text()) else {
            return;
        };
        let Some(item) = scope.get(name.text()) else {
            return;
        };
        let symbol = item.symbol.clone();
        let ty = self.item_value_type(scope, name.text());
        if let Some(ret) = self.item_return_type(scope, name.text()) {
            self.returns.insert(node.id(), ret);
        }
        self.annotate(node, name, symbol);
        self.record_type(node, ty);
    }

    fn visit_function_call(&mut self, node: NodeRef<'t>) {
        walk_node(self, node);
        let ret = node
            .child_nodes()
            .next()
            .and_then(|callee| self.returns.get(&callee.id()).cloned());
        self.record_type(node, ret);
    }

    fn visit_field_access(&mut self, node: NodeRef<'t>) {
        walk_node(self, node);
        let Some(name) = ident_at(node, 2) else {
            return;
        };
        let Some(key) = node
            .child_nodes()
            .next()
            .and_then(|receiver| self.types.get(&receiver.id()).cloned())
        else {
            return;
        };
        let Some((symbol, ty)) = self.field_of(&key, name.text()) else {
            return;
        };
        self.annotate(node, name, symbol);
        self.record_type(node, ty);
    }

    fn visit_braced_expression(&mut self, node: NodeRef<'t>) {
        walk_node(self, node);
        let inner = node
            .child_nodes()
            .next()
            .and_then(|inner| self.types.get(&inner.id()).cloned());
        self.record_type(node, inner);
    }
}

fn is_type_node(node: NodeRef<'_>) -> bool {
    matches!(
        node.kind(),
        NodeKind::TypeReference | NodeKind::RecordTypeDescriptor
    )
}
