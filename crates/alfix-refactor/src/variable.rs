//! Canonical variable records built from declaration nodes.
//!
//! A declared type is kept as its rendered source text (`Record Customer`,
//! `Code[20]`); compatibility checks compare text, never resolved types.

use alfix_syntax::{SyntaxKind, SyntaxNode};
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// A declared or synthesized name/type binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variable {
    /// Identifier text as written (quoted identifiers keep their quotes).
    pub name: SmolStr,
    /// Full rendered type text.
    pub type_name: String,
    /// Enclosing procedure or trigger, `None` for globals.
    pub owning_scope: Option<SmolStr>,
    /// Passed by reference (`var`).
    pub is_var: bool,
    /// Declared inside a procedure or trigger.
    pub is_local: bool,
    /// Trimmed attribute texts in source order.
    pub member_attributes: Vec<String>,
}

impl Variable {
    /// Creates a global, by-value variable without attributes.
    pub fn new(name: impl Into<SmolStr>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: type_name.into(),
            owning_scope: None,
            is_var: false,
            is_local: false,
            member_attributes: Vec::new(),
        }
    }

    /// Sets the by-reference flag.
    #[must_use]
    pub fn with_var(mut self, is_var: bool) -> Self {
        self.is_var = is_var;
        self
    }

    /// Makes the variable local to `scope`.
    #[must_use]
    pub fn in_scope(mut self, scope: impl Into<SmolStr>) -> Self {
        self.owning_scope = Some(scope.into());
        self.is_local = true;
        self
    }

    /// Type text before any length or subtype qualifier: `Record` for
    /// `Record Customer`, `Code` for `Code[20]`.
    #[must_use]
    pub fn type_short(&self) -> &str {
        type_short(&self.type_name)
    }

    /// Whether the type can be passed by reference. Constant-like types cannot.
    #[must_use]
    pub fn can_be_var(&self) -> bool {
        let short = self.type_short();
        !(short.eq_ignore_ascii_case("label") || short.eq_ignore_ascii_case("textconst"))
    }

    /// `name: Type` or `var name: Type`.
    #[must_use]
    pub fn declaration_text(&self) -> String {
        if self.is_var {
            format!("var {}: {}", self.name, self.type_name)
        } else {
            format!("{}: {}", self.name, self.type_name)
        }
    }

    /// `name: Type;` as written in a var section.
    #[must_use]
    pub fn var_section_text(&self) -> String {
        format!("{}: {};", self.name, self.type_name)
    }
}

/// Short form of a rendered type.
#[must_use]
pub fn type_short(type_name: &str) -> &str {
    let trimmed = type_name.trim();
    let end = trimmed
        .find(|c: char| c == '[' || c.is_whitespace())
        .unwrap_or(trimmed.len());
    &trimmed[..end]
}

/// Return value of a procedure; unnamed returns have no name yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnValue {
    /// Name of a named return value.
    pub name: Option<SmolStr>,
    /// Rendered return type.
    pub type_name: String,
    /// Procedure the value belongs to.
    pub owning_scope: Option<SmolStr>,
}

impl ReturnValue {
    /// The return value as a variable called `name` (its own name when named).
    #[must_use]
    pub fn to_variable(&self, name: Option<&str>) -> Option<Variable> {
        let name = name.map(SmolStr::new).or_else(|| self.name.clone())?;
        let mut variable = Variable::new(name, self.type_name.clone());
        if let Some(scope) = &self.owning_scope {
            variable = variable.in_scope(scope.clone());
        }
        Some(variable)
    }
}

/// A call-site argument with its inferred type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArgument {
    /// Parameter to create for the argument (name and type).
    pub variable: Variable,
    /// Argument expression as written.
    pub expression: String,
    /// Whether the argument can be passed to a `var` parameter.
    pub assignable: bool,
}

/// Parses a `VariableDeclaration` or a `VariableDeclarationName` of a list.
///
/// # Panics
///
/// Panics when `node` is not one of these kinds.
#[must_use]
pub fn parse_variable(node: SyntaxNode<'_>) -> Variable {
    assert!(
        node.is_kind_in(&[
            SyntaxKind::VariableDeclaration,
            SyntaxKind::VariableDeclarationName
        ]),
        "parse_variable called on {:?}",
        node.kind()
    );

    // List members share the type and attributes of their list.
    let declaration = if node.kind() == SyntaxKind::VariableDeclarationName {
        node.parent().unwrap_or(node)
    } else {
        node
    };

    let type_name = declaration
        .last_child_of_kind(SyntaxKind::TypeReference)
        .map(|t| t.text().to_string())
        .unwrap_or_default();
    let member_attributes = declaration
        .children_of_kind(SyntaxKind::MemberAttribute)
        .map(|a| a.text().trim().to_string())
        .collect();

    let mut variable = Variable::new(node.name().unwrap_or_default(), type_name);
    variable.member_attributes = member_attributes;
    if let Some(scope) = owning_scope(node) {
        variable = variable.in_scope(scope);
    }
    variable
}

/// Parses a procedure `Parameter`.
///
/// # Panics
///
/// Panics when `node` is not a parameter.
#[must_use]
pub fn parse_parameter(node: SyntaxNode<'_>) -> Variable {
    assert_eq!(node.kind(), SyntaxKind::Parameter, "parse_parameter called on {:?}", node.kind());

    let type_name = node
        .first_child_of_kind(SyntaxKind::TypeReference)
        .map(|t| t.text().to_string())
        .unwrap_or_default();
    let mut variable = Variable::new(node.name().unwrap_or_default(), type_name)
        .with_var(node.token_of_kind(SyntaxKind::KwVar).is_some());
    if let Some(scope) = owning_scope(node) {
        variable = variable.in_scope(scope);
    }
    variable
}

/// Parses a `ReturnValue` node: `: Type` or `Name: Type`.
///
/// # Panics
///
/// Panics when `node` is not a return value.
#[must_use]
pub fn parse_return_value(node: SyntaxNode<'_>) -> ReturnValue {
    assert_eq!(node.kind(), SyntaxKind::ReturnValue, "parse_return_value called on {:?}", node.kind());

    ReturnValue {
        name: node.name().map(SmolStr::new),
        type_name: node
            .first_child_of_kind(SyntaxKind::TypeReference)
            .map(|t| t.text().to_string())
            .unwrap_or_default(),
        owning_scope: owning_scope(node).map(SmolStr::new),
    }
}

fn owning_scope<'t>(node: SyntaxNode<'t>) -> Option<&'t str> {
    node.ancestor_in(&[SyntaxKind::MethodDeclaration, SyntaxKind::TriggerDeclaration])
        .and_then(|method| method.name())
}

/// Folds German diacritics and strips everything that is not `[A-Za-z0-9_]`.
#[must_use]
pub fn sanitize_name(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'Ä' => out.push_str("Ae"),
            'Ö' => out.push_str("Oe"),
            'Ü' => out.push_str("Ue"),
            'ß' => out.push_str("ss"),
            c if c.is_ascii_alphanumeric() || c == '_' => out.push(c),
            _ => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alfix_syntax::SyntaxTree;

    const SOURCE: &str = r#"codeunit 50100 "Sales Mgt."
{
    var
        GlobalCust: Record Customer;

    procedure Post(var SalesHeader: Record "Sales Header"; Qty: Decimal) Result: Boolean
    var
        [NonDebuggable]
        a, "b c": Decimal;
        Greeting: Label 'Hi';
    begin
    end;

    procedure Count(): Integer
    begin
    end;
}"#;

    fn nodes(tree: &SyntaxTree, kind: SyntaxKind) -> Vec<SyntaxNode<'_>> {
        tree.root().collect_descendants(&[kind], true)
    }

    #[test]
    fn test_parse_global_variable() {
        let tree = SyntaxTree::parse(SOURCE);
        let global = parse_variable(nodes(&tree, SyntaxKind::VariableDeclaration)[0]);
        assert_eq!(global.name, "GlobalCust");
        assert_eq!(global.type_name, "Record Customer");
        assert_eq!(global.type_short(), "Record");
        assert_eq!(global.owning_scope, None);
        assert!(!global.is_local);
    }

    #[test]
    fn test_list_members_share_type_and_attributes() {
        let tree = SyntaxTree::parse(SOURCE);
        let names = nodes(&tree, SyntaxKind::VariableDeclarationName);
        let second = parse_variable(names[1]);
        assert_eq!(second.name, "\"b c\"");
        assert_eq!(second.type_name, "Decimal");
        assert_eq!(second.member_attributes, ["[NonDebuggable]"]);
        assert_eq!(second.owning_scope.as_deref(), Some("Post"));
        assert!(second.is_local);
    }

    #[test]
    fn test_parse_parameters() {
        let tree = SyntaxTree::parse(SOURCE);
        let params = nodes(&tree, SyntaxKind::Parameter);
        let header = parse_parameter(params[0]);
        assert_eq!(header.declaration_text(), "var SalesHeader: Record \"Sales Header\"");
        let qty = parse_parameter(params[1]);
        assert_eq!(qty.declaration_text(), "Qty: Decimal");
    }

    #[test]
    fn test_parse_return_value_shapes() {
        let tree = SyntaxTree::parse(SOURCE);
        let returns = nodes(&tree, SyntaxKind::ReturnValue);
        let named = parse_return_value(returns[0]);
        assert_eq!(named.name.as_deref(), Some("Result"));
        assert_eq!(named.type_name, "Boolean");
        let unnamed = parse_return_value(returns[1]);
        assert_eq!(unnamed.name, None);
        assert_eq!(unnamed.type_name, "Integer");
        assert_eq!(unnamed.to_variable(None), None);
        assert_eq!(
            unnamed.to_variable(Some("Total")).map(|v| v.var_section_text()),
            Some("Total: Integer;".to_string())
        );
    }

    #[test]
    fn test_label_cannot_be_var() {
        let tree = SyntaxTree::parse(SOURCE);
        let label = nodes(&tree, SyntaxKind::VariableDeclaration)
            .into_iter()
            .map(parse_variable)
            .find(|v| v.name == "Greeting")
            .unwrap();
        assert!(!label.can_be_var());
        assert!(Variable::new("X", "Record Item").can_be_var());
    }

    #[test]
    #[should_panic(expected = "parse_variable called on Parameter")]
    fn test_wrong_kind_panics() {
        let tree = SyntaxTree::parse(SOURCE);
        let _ = parse_variable(nodes(&tree, SyntaxKind::Parameter)[0]);
    }

    #[test]
    fn test_parsed_names_match_identifier_text() {
        let tree = SyntaxTree::parse(SOURCE);
        for node in tree.root().collect_descendants(
            &[
                SyntaxKind::VariableDeclaration,
                SyntaxKind::VariableDeclarationName,
            ],
            true,
        ) {
            let ident = node.first_child_of_kind(SyntaxKind::IdentifierName).unwrap();
            assert_eq!(parse_variable(node).name, ident.text().trim());
        }
    }

    #[test]
    fn test_sanitize_name() {
        assert_eq!(sanitize_name("Größe ändern!"), "Groesseaendern");
        assert_eq!(sanitize_name("\"No.\""), "No");
        assert_eq!(sanitize_name("Übersicht_2"), "Uebersicht_2");
    }
}
