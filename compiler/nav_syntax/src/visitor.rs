//! Syntax Tree Visitor
//!
//! Generic traversal over a [`SyntaxTree`].
//!
//! # Design
//!
//! [`Visitor`] has one `visit_*` method per [`NodeKind`], each defaulting to
//! [`walk_node`] (recurse into children left to right), plus `visit_token`
//! and `visit_missing` which do nothing by default. Implementers override
//! only the kinds they care about; every other kind still recurses, so a
//! visitor never silently skips a subtree.
//!
//! `visit_node` is the kind-agnostic entry point. Its default calls
//! [`dispatch_node`], which selects the per-kind method. Override it for
//! hooks that apply to every node (the reference collector does this).
//!
//! The visitor may mutate its own state; the tree stays immutable.
//!
//! # Example
//!
//! ```
//! use nav_syntax::{walk_node, walk_tree, NodeRef, SyntaxTree, Visitor};
//!
//! struct CountCalls(usize);
//!
//! impl<'t> Visitor<'t> for CountCalls {
//!     fn visit_function_call(&mut self, node: NodeRef<'t>) {
//!         self.0 += 1;
//!         walk_node(self, node);
//!     }
//! }
//!
//! fn count_calls(tree: &SyntaxTree) -> usize {
//!     let mut counter = CountCalls(0);
//!     walk_tree(&mut counter, tree);
//!     counter.0
//! }
//! ```

use crate::kind::NodeKind;
use crate::stack::ensure_sufficient_stack;
use crate::tree::{ChildRef, NodeRef, SyntaxTree, TokenRef};

macro_rules! define_visitor {
    ($($variant:ident => $visit:ident, $label:literal;)*) => {
        /// Syntax tree visitor trait.
        ///
        /// Override `visit_*` methods to add behavior at specific node kinds.
        /// Call [`walk_node`] from an override to continue into children.
        pub trait Visitor<'t> {
            /// Visit any composite node. Dispatches on its kind by default.
            fn visit_node(&mut self, node: NodeRef<'t>) {
                dispatch_node(self, node);
            }

            $(
                #[doc = concat!("Visit a ", $label, " node.")]
                fn $visit(&mut self, node: NodeRef<'t>) {
                    walk_node(self, node);
                }
            )*

            /// Visit a token. Tokens have no children.
            fn visit_token(&mut self, token: TokenRef<'t>) {
                let _ = token;
            }

            /// Visit a missing-child placeholder.
            fn visit_missing(&mut self, parent: NodeRef<'t>, index: usize) {
                let _ = (parent, index);
            }
        }

        /// Call the `visit_*` method matching the node's kind.
        pub fn dispatch_node<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, node: NodeRef<'t>) {
            match node.kind() {
                $(NodeKind::$variant => visitor.$visit(node),)*
            }
        }
    };
}

with_node_kinds!(define_visitor);

/// Walk a node's children in document order.
///
/// Runs under [`ensure_sufficient_stack`] so arbitrarily deep trees do not
/// overflow the native stack.
pub fn walk_node<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, node: NodeRef<'t>) {
    ensure_sufficient_stack(|| {
        for (index, child) in node.children().enumerate() {
            match child {
                ChildRef::Node(inner) => visitor.visit_node(inner),
                ChildRef::Token(token) => visitor.visit_token(token),
                ChildRef::Missing => visitor.visit_missing(node, index),
            }
        }
    });
}

/// Walk a whole tree starting at its root.
pub fn walk_tree<'t, V: Visitor<'t> + ?Sized>(visitor: &mut V, tree: &'t SyntaxTree) {
    visitor.visit_node(tree.root());
}

/// Reassemble the source by concatenating every token's leading trivia,
/// text and trailing trivia in traversal order.
pub fn collect_text(tree: &SyntaxTree) -> String {
    struct TextCollector {
        out: String,
    }

    impl<'t> Visitor<'t> for TextCollector {
        fn visit_token(&mut self, token: TokenRef<'t>) {
            self.out.push_str(token.leading_text());
            self.out.push_str(token.text());
            self.out.push_str(token.trailing_text());
        }
    }

    let mut collector = TextCollector {
        out: String::with_capacity(tree.text().len()),
    };
    walk_tree(&mut collector, tree);
    collector.out
}
