//! Name and type resolution across the documents of a workspace.
//!
//! Resolution is textual: a record variable's table is found by comparing
//! the name in its declared type with object names, and argument types are
//! the declared type texts of what they reference.

use std::sync::Arc;

use alfix_syntax::{names_equal, unquote, DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;

use crate::scope::{enclosing_object, globals, locals, parameters, return_value};
use crate::variable::{sanitize_name, type_short, CallArgument, Variable};

/// Syntax trees of every workspace document, fetched once per refactoring.
#[derive(Debug, Clone, Default)]
pub struct WorkspaceTrees {
    trees: Vec<(DocumentId, Arc<SyntaxTree>)>,
}

impl WorkspaceTrees {
    /// Wraps already parsed trees.
    #[must_use]
    pub fn new(trees: Vec<(DocumentId, Arc<SyntaxTree>)>) -> Self {
        Self { trees }
    }

    /// The tree of `document`.
    #[must_use]
    pub fn tree(&self, document: DocumentId) -> Option<&SyntaxTree> {
        self.trees
            .iter()
            .find(|(id, _)| *id == document)
            .map(|(_, tree)| tree.as_ref())
    }

    /// All top-level objects with their document.
    pub fn objects(&self) -> impl Iterator<Item = (DocumentId, SyntaxNode<'_>)> + '_ {
        self.trees.iter().flat_map(|(id, tree)| {
            tree.root()
                .child_nodes()
                .filter(|node| node.kind().is_object())
                .map(move |node| (*id, node))
        })
    }

    /// First object of one of `kinds` called `name`.
    #[must_use]
    pub fn find_object(
        &self,
        kinds: &[SyntaxKind],
        name: &str,
    ) -> Option<(DocumentId, SyntaxNode<'_>)> {
        self.objects().find(|(_, object)| {
            object.is_kind_in(kinds) && object.name().is_some_and(|n| names_equal(n, name))
        })
    }
}

/// Splits an object-typed declaration like `Record "Sales Header" temporary`
/// into its short type and the object name as written.
#[must_use]
pub fn object_reference(type_name: &str) -> Option<(&str, &str)> {
    let trimmed = type_name.trim();
    let short = type_short(trimmed);
    let rest = trimmed[short.len()..].trim_start();
    if rest.is_empty() {
        return None;
    }
    let name = if rest.starts_with('"') {
        let close = rest[1..].find('"')? + 2;
        &rest[..close]
    } else {
        let end = rest.find(char::is_whitespace).unwrap_or(rest.len());
        &rest[..end]
    };
    Some((short, name))
}

/// Value text of property `name` on `owner` (`SourceTable = Customer;` gives `Customer`).
#[must_use]
pub fn property_value<'t>(owner: SyntaxNode<'t>, name: &str) -> Option<&'t str> {
    let property = owner
        .children_of_kind(SyntaxKind::PropertyDeclaration)
        .find(|p| p.name().is_some_and(|n| names_equal(n, name)))?;
    let eq = property.token_of_kind(SyntaxKind::Eq)?;
    let start = eq.text_range().end();
    let end = property
        .last_child_of_kind(SyntaxKind::Semicolon)
        .map_or(property.text_range().end(), |semi| semi.text_range().start());
    (start < end).then(|| property.tree().slice(TextRange::new(start, end)).trim())
}

/// Type of the implicit `Rec`/`xRec` variables inside `object`.
#[must_use]
pub fn rec_type(trees: &WorkspaceTrees, object: SyntaxNode<'_>) -> Option<String> {
    let table = match object.kind() {
        SyntaxKind::TableObject => object.name()?.to_string(),
        SyntaxKind::TableExtensionObject => extends_name(object)?.to_string(),
        SyntaxKind::PageObject => property_value(object, "SourceTable")?.to_string(),
        SyntaxKind::PageExtensionObject => {
            let base = extends_name(object)?;
            let (_, page) = trees.find_object(&[SyntaxKind::PageObject], base)?;
            property_value(page, "SourceTable")?.to_string()
        }
        _ => return None,
    };
    Some(format!("Record {table}"))
}

fn extends_name(object: SyntaxNode<'_>) -> Option<&str> {
    object
        .first_child_of_kind(SyntaxKind::ExtendsClause)?
        .first_child_of_kind(SyntaxKind::IdentifierName)
        .map(|name| name.text())
}

/// Finds a variable visible inside `method`: locals, parameters, a named
/// return value, globals, then the implicit `Rec` and `xRec`.
#[must_use]
pub fn lookup_variable(
    trees: &WorkspaceTrees,
    method: SyntaxNode<'_>,
    name: &str,
) -> Option<Variable> {
    let object = enclosing_object(method);

    let found = locals(method)
        .into_iter()
        .chain(parameters(method))
        .chain(
            return_value(method)
                .and_then(|r| r.to_variable(None))
                .into_iter(),
        )
        .chain(object.map(globals).unwrap_or_default())
        .find(|v| names_equal(&v.name, name));
    if found.is_some() {
        return found;
    }

    if names_equal(name, "Rec") || names_equal(name, "xRec") {
        let type_name = rec_type(trees, object?)?;
        return Some(Variable::new(name, type_name));
    }
    None
}

/// Fields of `table` and of every table extension of it in the workspace,
/// as `(name, type)` pairs.
#[must_use]
pub fn table_fields(trees: &WorkspaceTrees, table: &str) -> Vec<(String, String)> {
    let mut fields = Vec::new();
    for (_, object) in trees.objects() {
        let matches = match object.kind() {
            SyntaxKind::TableObject => object.name().is_some_and(|n| names_equal(n, table)),
            SyntaxKind::TableExtensionObject => {
                extends_name(object).is_some_and(|n| names_equal(n, table))
            }
            _ => false,
        };
        if matches {
            fields.extend(object_fields(object));
        }
    }
    fields
}

fn object_fields(object: SyntaxNode<'_>) -> Vec<(String, String)> {
    object
        .children_of_kind(SyntaxKind::SectionDeclaration)
        .filter(|section| section.name().is_some_and(|n| names_equal(n, "fields")))
        .flat_map(|section| section.children_of_kind(SyntaxKind::SectionDeclaration))
        .filter(|field| field.name().is_some_and(|n| names_equal(n, "field")))
        .filter_map(|field| {
            let args = field.first_child_of_kind(SyntaxKind::SectionArguments)?.text();
            let inner = args.strip_prefix('(')?.strip_suffix(')')?;
            let mut parts = inner.splitn(3, ';').map(str::trim);
            let _id = parts.next()?;
            let name = parts.next()?;
            let type_name = parts.next()?;
            Some((name.to_string(), type_name.to_string()))
        })
        .collect()
}

/// Type of `table.field`, if the table is part of the workspace.
#[must_use]
pub fn field_type(trees: &WorkspaceTrees, table: &str, field: &str) -> Option<String> {
    table_fields(trees, table)
        .into_iter()
        .find(|(name, _)| names_equal(name, field))
        .map(|(_, type_name)| type_name)
}

fn literal_type(literal: SyntaxNode<'_>) -> Option<&'static str> {
    let token = literal.first_token()?;
    Some(match token.kind() {
        SyntaxKind::IntLiteral => "Integer",
        SyntaxKind::DecimalLiteral => "Decimal",
        SyntaxKind::StringLiteral => "Text",
        SyntaxKind::KwTrue | SyntaxKind::KwFalse => "Boolean",
        SyntaxKind::DateTimeLiteral => {
            let text = token.text().to_ascii_lowercase();
            if text.ends_with("dt") {
                "DateTime"
            } else if text.ends_with('d') {
                "Date"
            } else {
                "Time"
            }
        }
        _ => return None,
    })
}

fn literal_argument(expression: SyntaxNode<'_>, literal: SyntaxNode<'_>) -> Option<CallArgument> {
    let type_name = literal_type(literal)?;
    Some(CallArgument {
        variable: Variable::new(format!("{type_name}Value"), type_name),
        expression: expression.text().to_string(),
        assignable: false,
    })
}

/// Infers the parameter a call argument would need.
///
/// Returns `None` when the expression's type cannot be determined.
#[must_use]
pub fn argument_for(
    trees: &WorkspaceTrees,
    method: SyntaxNode<'_>,
    expression: SyntaxNode<'_>,
) -> Option<CallArgument> {
    let text = expression.text().to_string();
    match expression.kind() {
        SyntaxKind::IdentifierName => {
            let variable = lookup_variable(trees, method, expression.text())?;
            Some(CallArgument {
                variable: Variable::new(variable.name.clone(), variable.type_name),
                expression: text,
                assignable: true,
            })
        }
        SyntaxKind::LiteralExpression => literal_argument(expression, expression),
        SyntaxKind::UnaryExpression => {
            let operand = expression.child_nodes().next()?;
            (operand.kind() == SyntaxKind::LiteralExpression)
                .then(|| literal_argument(expression, operand))
                .flatten()
        }
        SyntaxKind::OptionAccessExpression => {
            // Enum::"Sales Line Type"::Item
            let qualifier = expression.child_nodes().next()?;
            if qualifier.kind() != SyntaxKind::OptionAccessExpression {
                return None;
            }
            let mut parts = qualifier.children_of_kind(SyntaxKind::IdentifierName);
            let keyword = parts.next()?;
            let enum_name = parts.next()?;
            if !names_equal(keyword.text(), "Enum") {
                return None;
            }
            Some(CallArgument {
                variable: Variable::new(
                    non_empty_name(sanitize_name(unquote(enum_name.text()))),
                    format!("Enum {}", enum_name.text()),
                ),
                expression: text,
                assignable: false,
            })
        }
        SyntaxKind::MemberAccessExpression => {
            let receiver = expression.child_nodes().next()?;
            let member = expression.last_child_of_kind(SyntaxKind::IdentifierName)?;
            if receiver.kind() != SyntaxKind::IdentifierName {
                return None;
            }
            let record = lookup_variable(trees, method, receiver.text())?;
            let (short, table) = object_reference(&record.type_name)?;
            if !short.eq_ignore_ascii_case("record") {
                return None;
            }
            let type_name = field_type(trees, table, member.text())?;
            Some(CallArgument {
                variable: Variable::new(
                    non_empty_name(sanitize_name(unquote(member.text()))),
                    type_name,
                ),
                expression: text,
                assignable: true,
            })
        }
        _ => None,
    }
}

fn non_empty_name(name: String) -> String {
    if name.is_empty() {
        "Value".to_string()
    } else {
        name
    }
}
