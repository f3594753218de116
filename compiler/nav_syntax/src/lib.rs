//! Nav Syntax - Full-Fidelity Syntax Trees
//!
//! This crate contains the tree model every navigation request walks:
//! - Spans for byte ranges
//! - Tokens with attached leading/trailing trivia
//! - Composite nodes with a closed set of kinds
//! - A single arena owning every node of one compilation unit
//! - A visitor with one overridable method per node kind
//! - Cursor lookup (line/column to innermost token)
//!
//! # Design Philosophy
//!
//! - **Flatten Everything**: nodes and tokens live in arenas, addressed by
//!   `NodeId(u32)` / `TokenId(u32)`
//! - **No Parent Links**: ancestry is carried by traversal state
//!   ([`TokenPath`]) instead of back-pointers
//! - **Lossless**: concatenating every token with its trivia in document
//!   order reproduces the source text byte-for-byte

/// Invokes `$callback!` with the full list of composite node kinds.
///
/// Each entry is `Variant => visit_method, "label";`. The list is the single
/// source of truth for [`NodeKind`] and the per-kind methods of [`Visitor`].
macro_rules! with_node_kinds {
    ($callback:ident) => {
        $callback! {
            ModulePart => visit_module_part, "module part";
            ImportDeclaration => visit_import_declaration, "import declaration";
            FunctionDefinition => visit_function_definition, "function definition";
            ParameterList => visit_parameter_list, "parameter list";
            RequiredParameter => visit_required_parameter, "required parameter";
            ReturnTypeDescriptor => visit_return_type_descriptor, "return type descriptor";
            FunctionBody => visit_function_body, "function body";
            TypeDefinition => visit_type_definition, "type definition";
            RecordTypeDescriptor => visit_record_type_descriptor, "record type descriptor";
            RecordField => visit_record_field, "record field";
            TypeReference => visit_type_reference, "type reference";
            ModuleVariableDeclaration => visit_module_variable_declaration, "module variable declaration";
            BlockStatement => visit_block_statement, "block statement";
            VariableDeclaration => visit_variable_declaration, "variable declaration";
            AssignmentStatement => visit_assignment_statement, "assignment statement";
            ExpressionStatement => visit_expression_statement, "expression statement";
            ReturnStatement => visit_return_statement, "return statement";
            IfElseStatement => visit_if_else_statement, "if/else statement";
            ElseBlock => visit_else_block, "else block";
            WhileStatement => visit_while_statement, "while statement";
            BinaryExpression => visit_binary_expression, "binary expression";
            UnaryExpression => visit_unary_expression, "unary expression";
            BracedExpression => visit_braced_expression, "braced expression";
            FunctionCall => visit_function_call, "function call";
            MethodCall => visit_method_call, "method call";
            FieldAccess => visit_field_access, "field access";
            ArgumentList => visit_argument_list, "argument list";
            PositionalArgument => visit_positional_argument, "positional argument";
            SimpleNameReference => visit_simple_name_reference, "simple name reference";
            QualifiedNameReference => visit_qualified_name_reference, "qualified name reference";
            BasicLiteral => visit_basic_literal, "basic literal";
            Invalid => visit_invalid, "invalid syntax";
        }
    };
}

mod builder;
mod kind;
mod line_index;
mod locate;
mod span;
pub mod stack;
mod tree;
pub mod visitor;

#[cfg(test)]
mod test_support;

pub use builder::{BuildError, Checkpoint, RawTrivia, TreeBuilder};
pub use kind::{NodeKind, TokenKind, TriviaKind};
pub use line_index::{LineCol, LineIndex};
pub use locate::{locate_token, locate_token_or_preceding, LocateError, TokenPath};
pub use span::{Span, SpanError};
pub use tree::{Child, ChildRef, NodeId, NodeRef, SyntaxTree, TokenId, TokenRef, Trivia};
pub use visitor::{collect_text, dispatch_node, walk_node, walk_tree, Visitor};
