use alfix_syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;

use crate::edit::TextEdit;
use crate::scope::{parameters, return_value};
use crate::text::{indent_unit_for, line_indent_at_offset, line_start, newline_for};
use crate::variable::Variable;

use super::parameters::append_parameters;

/// Literal passed for a missing parameter of a simple type.
#[must_use]
pub fn default_value(type_name: &str) -> Option<&'static str> {
    let short = crate::variable::type_short(type_name).to_ascii_lowercase();
    match short.as_str() {
        "boolean" => Some("false"),
        "integer" | "biginteger" | "decimal" | "byte" | "duration" => Some("0"),
        "text" | "code" | "char" => Some("''"),
        _ => None,
    }
}

/// Text from the first modifier or `procedure` keyword to the end of the
/// return value (or parameter list).
fn signature_text<'t>(method: SyntaxNode<'t>) -> Option<&'t str> {
    let start = method
        .children()
        .find(|child| !matches!(child.kind(), SyntaxKind::MemberAttribute))?
        .text_range()
        .start();
    let end = method
        .first_child_of_kind(SyntaxKind::ReturnValue)
        .or_else(|| method.first_child_of_kind(SyntaxKind::ParameterList))?
        .text_range()
        .end();
    Some(method.tree().slice(TextRange::new(start, end)))
}

/// Keeps the current signature of `method` as a forwarding overload and
/// appends `missing` to the original.
///
/// The overload is inserted above the original (above its attributes). It
/// declares locals for missing parameters without a literal default and
/// calls the original, returning its result when there is one. With
/// `obsolete_old` the overload is marked `[Obsolete]`.
#[must_use]
pub fn create_overload(
    tree: &SyntaxTree,
    method: NodeId,
    missing: &[Variable],
    obsolete_old: bool,
    version: Option<&str>,
) -> Vec<TextEdit> {
    let Some(node) = tree.get(method) else {
        return Vec::new();
    };
    let (Some(name), Some(signature)) = (node.name(), signature_text(node)) else {
        return Vec::new();
    };
    let append = append_parameters(tree, method, missing);
    if append.is_empty() {
        return Vec::new();
    }

    let text = tree.text();
    let newline = newline_for(text);
    let method_start = node.text_range().start();
    let indent = line_indent_at_offset(text, method_start);
    let body_indent = format!("{indent}{}", indent_unit_for(&indent));

    let existing = parameters(node);
    let mut locals = Vec::new();
    let mut arguments: Vec<String> = existing.iter().map(|p| p.name.to_string()).collect();
    for parameter in missing {
        match default_value(&parameter.type_name) {
            Some(value) => arguments.push(value.to_string()),
            None => {
                locals.push(parameter);
                arguments.push(parameter.name.to_string());
            }
        }
    }
    let call = format!("{name}({})", arguments.join(", "));
    let statement = match return_value(node) {
        Some(ret) => match ret.name {
            Some(result) => format!("{result} := {call};"),
            None => format!("exit({call});"),
        },
        None => format!("{call};"),
    };

    let mut lines = Vec::new();
    if obsolete_old {
        lines.push(format!(
            "{indent}[Obsolete('Please use the overload with {} parameters.', '{}')]",
            existing.len() + missing.len(),
            version.map(|v| format!("v{v}")).unwrap_or_default()
        ));
    }
    lines.push(format!("{indent}{signature}"));
    if !locals.is_empty() {
        lines.push(format!("{indent}var"));
        for local in locals {
            lines.push(format!("{body_indent}{}", local.var_section_text()));
        }
    }
    lines.push(format!("{indent}begin"));
    lines.push(format!("{body_indent}{statement}"));
    lines.push(format!("{indent}end;"));

    let mut block = lines.join(newline);
    block.push_str(newline);
    block.push_str(newline);

    let mut edits = vec![TextEdit::insert(line_start(text, method_start), block)];
    edits.extend(append);
    edits
}
