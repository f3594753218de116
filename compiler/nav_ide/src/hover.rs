//! Hover text for a resolved symbol.

use nav_project::{Symbol, SymbolKind};

/// Markdown shown when hovering `symbol`.
///
/// ````text
/// ```
/// function area
/// ```
/// Declared in module `geometry`
/// ````
pub(crate) fn hover_markdown(symbol: &Symbol) -> String {
    let signature = match &symbol.detail {
        Some(detail) => detail.clone(),
        None => format!("{} {}", symbol.kind, symbol.name),
    };
    let mut out = format!("```\n{signature}\n```");
    if symbol.kind != SymbolKind::Builtin && symbol.declaration.is_some() {
        out.push_str(&format!("\nDeclared in module `{}`", symbol.owner));
    }
    out
}
