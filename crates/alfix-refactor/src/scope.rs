//! Declarations visible from a procedure or trigger.
//!
//! Everything here works on a single tree. Lookups that need other
//! documents (base pages, tables for record fields) live in `resolve`.

use alfix_syntax::{names_equal, SyntaxKind, SyntaxNode};
use smol_str::SmolStr;

use crate::variable::{parse_parameter, parse_return_value, parse_variable, ReturnValue, Variable};

/// The application object enclosing `node` (or `node` itself).
#[must_use]
pub fn enclosing_object(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    node.ancestors().find(|n| n.kind().is_object())
}

/// The procedure or trigger enclosing `node` (or `node` itself).
#[must_use]
pub fn enclosing_method(node: SyntaxNode<'_>) -> Option<SyntaxNode<'_>> {
    node.ancestors().find(|n| n.kind().is_method_like())
}

/// Declaration nodes of a var section: single declarations and list members.
#[must_use]
pub fn declaration_nodes(section: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    let mut out = Vec::new();
    for child in section.child_nodes() {
        match child.kind() {
            SyntaxKind::VariableDeclaration => out.push(child),
            SyntaxKind::VariableListDeclaration => {
                out.extend(child.children_of_kind(SyntaxKind::VariableDeclarationName));
            }
            _ => {}
        }
    }
    out
}

/// Local declaration nodes of a procedure or trigger.
#[must_use]
pub fn local_declarations(method: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    method
        .first_child_of_kind(SyntaxKind::VarSection)
        .map(declaration_nodes)
        .unwrap_or_default()
}

/// Global declaration nodes of an object (direct var sections only).
#[must_use]
pub fn global_declarations(object: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    object
        .children_of_kind(SyntaxKind::GlobalVarSection)
        .flat_map(declaration_nodes)
        .collect()
}

/// Parsed locals of a procedure or trigger.
#[must_use]
pub fn locals(method: SyntaxNode<'_>) -> Vec<Variable> {
    local_declarations(method).into_iter().map(parse_variable).collect()
}

/// Parsed globals of an object.
#[must_use]
pub fn globals(object: SyntaxNode<'_>) -> Vec<Variable> {
    global_declarations(object).into_iter().map(parse_variable).collect()
}

/// `Parameter` nodes of a procedure or trigger.
#[must_use]
pub fn parameter_nodes(method: SyntaxNode<'_>) -> Vec<SyntaxNode<'_>> {
    method
        .first_child_of_kind(SyntaxKind::ParameterList)
        .map(|list| list.children_of_kind(SyntaxKind::Parameter).collect())
        .unwrap_or_default()
}

/// Parsed parameters of a procedure or trigger.
#[must_use]
pub fn parameters(method: SyntaxNode<'_>) -> Vec<Variable> {
    parameter_nodes(method).into_iter().map(parse_parameter).collect()
}

/// Parsed return value of a procedure, if it has one.
#[must_use]
pub fn return_value(method: SyntaxNode<'_>) -> Option<ReturnValue> {
    method
        .first_child_of_kind(SyntaxKind::ReturnValue)
        .map(parse_return_value)
}

/// Procedures of `object` called `name`, in source order.
#[must_use]
pub fn procedures_named<'t>(object: SyntaxNode<'t>, name: &str) -> Vec<SyntaxNode<'t>> {
    object
        .children_of_kind(SyntaxKind::MethodDeclaration)
        .filter(|method| method.name().is_some_and(|n| names_equal(n, name)))
        .collect()
}

/// Names already taken around a method, split by where they are declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeNames {
    /// Local variable names (a named return value counts as local).
    pub locals: Vec<SmolStr>,
    /// Parameter names.
    pub parameters: Vec<SmolStr>,
    /// Global variable names of the enclosing object.
    pub globals: Vec<SmolStr>,
}

impl ScopeNames {
    /// Collects the names visible inside `method`.
    #[must_use]
    pub fn of_method(method: SyntaxNode<'_>) -> Self {
        let mut locals: Vec<SmolStr> = locals(method).into_iter().map(|v| v.name).collect();
        if let Some(name) = return_value(method).and_then(|r| r.name) {
            locals.push(name);
        }
        Self {
            locals,
            parameters: parameters(method).into_iter().map(|v| v.name).collect(),
            globals: enclosing_object(method)
                .map(|object| globals(object).into_iter().map(|v| v.name).collect())
                .unwrap_or_default(),
        }
    }

    /// Returns `true` if any collection holds `name` (case-insensitive).
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.locals
            .iter()
            .chain(&self.parameters)
            .chain(&self.globals)
            .any(|taken| names_equal(taken, name))
    }
}
