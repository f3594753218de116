//! Top-level declarations, gathered per module before binding.
//!
//! Symbol paths:
//!
//! ```text
//! <module>::<item>                      functions, types, module variables
//! <module>::<type>::<field>             record fields
//! <module>::<unit>::<fn>::<name>        parameters
//! <module>::<unit>::<fn>::<name>#<n>    locals, n-th declaration of that name
//! module::<name>                        imported module
//! lang::<name>                          builtins
//! ```

use std::fmt;

use nav_project::{Declaration, ModuleId, Symbol, SymbolId, SymbolKind};
use nav_syntax::{ChildRef, NodeId, NodeKind, NodeRef, Span, SyntaxTree, TokenId, TokenRef};
use rustc_hash::FxHashMap;

/// Owner of every builtin symbol.
pub const BUILTIN_MODULE: &str = "lang";

const BUILTIN_TYPES: &[&str] = &["int", "string", "bool"];

const BUILTIN_FUNCTIONS: &[(&str, &str)] = &[("print", "fn print(value: string)")];

/// Look up a builtin type or function by name.
pub(crate) fn builtin(name: &str) -> Option<Symbol> {
    let detail = if BUILTIN_TYPES.contains(&name) {
        format!("type {name}")
    } else {
        BUILTIN_FUNCTIONS
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, detail)| (*detail).to_owned())?
    };
    let path = format!("{BUILTIN_MODULE}::{name}");
    Some(
        Symbol::new(
            SymbolId::from_path(&path),
            name,
            SymbolKind::Builtin,
            ModuleId::new(BUILTIN_MODULE),
        )
        .with_detail(detail),
    )
}

/// Whether `name` is a builtin type (usable in type position).
pub(crate) fn is_builtin_type(name: &str) -> bool {
    BUILTIN_TYPES.contains(&name)
}

/// Symbol for an imported module.
pub(crate) fn module_symbol(name: &str) -> Symbol {
    Symbol::new(
        SymbolId::from_path(&format!("module::{name}")),
        name,
        SymbolKind::Module,
        ModuleId::new(name),
    )
    .with_detail(format!("module {name}"))
}

/// A type as written: `T` or `lib:T`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct TypeName {
    pub qualifier: Option<String>,
    pub name: String,
}

impl TypeName {
    /// Read a `TypeReference` node. `None` for anything else.
    pub(crate) fn from_node(node: NodeRef<'_>) -> Option<Self> {
        if node.kind() != NodeKind::TypeReference {
            return None;
        }
        let idents: Vec<TokenRef<'_>> = node
            .child_tokens()
            .filter(|t| t.kind().is_identifier())
            .collect();
        match idents.as_slice() {
            [name] => Some(TypeName {
                qualifier: None,
                name: name.text().to_owned(),
            }),
            [qualifier, name] => Some(TypeName {
                qualifier: Some(qualifier.text().to_owned()),
                name: name.text().to_owned(),
            }),
            _ => None,
        }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.qualifier {
            Some(qualifier) => write!(f, "{qualifier}:{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Field {
    /// `RecordField` node, valid in the tree the field was declared from.
    pub node: NodeId,
    pub name: TokenId,
    pub symbol: Symbol,
    pub ty: Option<TypeName>,
}

/// A top-level declaration.
#[derive(Clone, Debug)]
pub(crate) struct Item {
    pub name: TokenId,
    pub symbol: Symbol,
    /// Declared type of a variable, return type of a function, aliased
    /// type of a non-record type definition.
    pub ty: Option<TypeName>,
    pub fields: Vec<Field>,
}

/// Identifier token at child `index` of `node`.
pub(crate) fn ident_at(node: NodeRef<'_>, index: usize) -> Option<TokenRef<'_>> {
    node.child(index)?
        .into_token()
        .filter(|t| t.kind().is_identifier())
}

fn child_span(child: ChildRef<'_>) -> Option<Span> {
    match child {
        ChildRef::Node(node) => Some(node.span()),
        ChildRef::Token(token) => Some(token.span()),
        ChildRef::Missing => None,
    }
}

/// Source text of `node` from its first token through the last child
/// accepted by `take`, with whitespace runs collapsed.
pub(crate) fn header_text(node: NodeRef<'_>, take: impl Fn(ChildRef<'_>) -> bool) -> String {
    let start = node.span().start;
    let end = node
        .children()
        .take_while(|child| take(*child))
        .filter_map(child_span)
        .last()
        .map_or(start, |span| span.end);
    let text = node.tree().slice(Span::new(start, end.max(start)));
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn is_token(child: ChildRef<'_>, text: &str) -> bool {
    child.into_token().is_some_and(|t| t.text() == text)
}

/// Describe a top-level declaration node, or `None` if `node` is not one
/// or has no name.
pub(crate) fn declare(module: &ModuleId, unit: &str, node: NodeRef<'_>) -> Option<Item> {
    let kind = match node.kind() {
        NodeKind::FunctionDefinition => SymbolKind::Function,
        NodeKind::TypeDefinition => SymbolKind::Type,
        NodeKind::ModuleVariableDeclaration => SymbolKind::Variable,
        _ => return None,
    };
    let name = ident_at(node, 1)?;
    let path = format!("{module}::{}", name.text());
    let mut symbol = Symbol::new(SymbolId::from_path(&path), name.text(), kind, module.clone())
        .with_declaration(Declaration::new(unit, name.span()));
    let mut ty = None;
    let mut fields = Vec::new();

    match node.kind() {
        NodeKind::FunctionDefinition => {
            symbol = symbol.with_detail(header_text(node, |c| {
                c.into_node().map_or(true, |n| n.kind() != NodeKind::FunctionBody)
            }));
            ty = node
                .child_nodes()
                .find(|n| n.kind() == NodeKind::ReturnTypeDescriptor)
                .and_then(|n| n.child_nodes().find_map(TypeName::from_node));
        }
        NodeKind::TypeDefinition => {
            symbol = symbol.with_detail(format!("type {}", name.text()));
            let body = node.child_nodes().next();
            match body {
                Some(record) if record.kind() == NodeKind::RecordTypeDescriptor => {
                    for field in record.child_nodes() {
                        let Some(field_name) = ident_at(field, 0) else {
                            continue;
                        };
                        let field_ty = field.child_nodes().find_map(TypeName::from_node);
                        let field_path = format!("{path}::{}", field_name.text());
                        let detail = match &field_ty {
                            Some(t) => format!("{}: {t}", field_name.text()),
                            None => header_text(field, |c| !is_token(c, ";")),
                        };
                        fields.push(Field {
                            node: field.id(),
                            name: field_name.id(),
                            symbol: Symbol::new(
                                SymbolId::from_path(&field_path),
                                field_name.text(),
                                SymbolKind::Field,
                                module.clone(),
                            )
                            .with_declaration(Declaration::new(unit, field_name.span()))
                            .with_detail(detail),
                            ty: field_ty,
                        });
                    }
                }
                Some(other) => ty = TypeName::from_node(other),
                None => {}
            }
        }
        _ => {
            symbol = symbol.with_detail(header_text(node, |c| !is_token(c, "=") && !is_token(c, ";")));
            ty = node.child_nodes().find_map(TypeName::from_node);
        }
    }

    Some(Item {
        name: name.id(),
        symbol,
        ty,
        fields,
    })
}

/// Module names imported by a unit, in source order.
pub fn imported_modules(tree: &SyntaxTree) -> Vec<String> {
    tree.root()
        .child_nodes()
        .filter(|n| n.kind() == NodeKind::ImportDeclaration)
        .filter_map(|n| ident_at(n, 1).map(|t| t.text().to_owned()))
        .collect()
}

/// Every top-level declaration of one module, across its units.
///
/// When a name is declared twice the first declaration (in unit order)
/// is the one name lookups see.
#[derive(Debug)]
pub(crate) struct ModuleScope {
    module: ModuleId,
    items: FxHashMap<String, Item>,
}

impl ModuleScope {
    pub(crate) fn new(module: ModuleId) -> Self {
        ModuleScope {
            module,
            items: FxHashMap::default(),
        }
    }

    #[inline]
    pub(crate) fn module(&self) -> &ModuleId {
        &self.module
    }

    pub(crate) fn collect(&mut self, unit: &str, tree: &SyntaxTree) {
        for node in tree.root().child_nodes() {
            if let Some(item) = declare(&self.module, unit, node) {
                self.items.entry(item.symbol.name.clone()).or_insert(item);
            }
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&Item> {
        self.items.get(name)
    }

    /// A type definition named `name`.
    pub(crate) fn type_item(&self, name: &str) -> Option<&Item> {
        self.get(name).filter(|item| item.symbol.kind == SymbolKind::Type)
    }
}
