use alfix_syntax::{NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
use once_cell::sync::Lazy;
use rustc_hash::{FxHashMap, FxHashSet};
use text_size::{TextRange, TextSize};

use crate::edit::TextEdit;
use crate::scope::declaration_nodes;
use crate::text::{
    at_line_start, indent_unit_for, is_first_on_line, line_indent_at_offset, line_start,
    newline_for, whole_lines_range,
};
use crate::variable::{type_short, Variable};

/// Declaration order of object-like types inside a var section.
const TYPE_ORDER: &[&str] = &[
    "record",
    "report",
    "codeunit",
    "xmlport",
    "page",
    "query",
    "notification",
    "bigtext",
    "dateformula",
    "recordid",
    "recordref",
    "fieldref",
    "filterpagebuilder",
];

static TYPE_PRIORITY: Lazy<FxHashMap<&'static str, usize>> = Lazy::new(|| {
    TYPE_ORDER
        .iter()
        .enumerate()
        .map(|(rank, name)| (*name, rank))
        .collect()
});

/// Rank of a type in var-section order; lower ranks come first and every
/// type outside the table shares the last rank.
#[must_use]
pub fn type_priority(type_name: &str) -> usize {
    let short = type_short(type_name).to_ascii_lowercase();
    TYPE_PRIORITY
        .get(short.as_str())
        .copied()
        .unwrap_or(TYPE_ORDER.len())
}

/// Declared type text of a `VariableDeclaration` or `VariableListDeclaration`.
fn entry_type<'t>(entry: SyntaxNode<'t>) -> &'t str {
    entry
        .last_child_of_kind(SyntaxKind::TypeReference)
        .map_or("", |t| t.text())
}

/// Inserts `line` as a new line right after `node`'s line.
fn insert_line_after(text: &str, node: SyntaxNode<'_>, line: &str, newline: &str) -> TextEdit {
    let end = node.full_range().end();
    if at_line_start(text, end) && end > node.text_range().end() {
        TextEdit::insert(end, format!("{line}{newline}"))
    } else {
        TextEdit::insert(node.text_range().end(), format!("{newline}{line}"))
    }
}

/// Adds `variable` to the var section of `scope`, a procedure, trigger
/// (local) or object (global).
///
/// Inside an existing section the declaration goes after the last entry
/// of the same type, else after the last entry of a type that sorts
/// earlier, else before the first entry. Without a section a new one is
/// created before `begin` (local) or before the first procedure, or the
/// closing brace, of the object (global).
#[must_use]
pub fn insert_variable(tree: &SyntaxTree, scope: NodeId, variable: &Variable) -> Option<TextEdit> {
    let scope = tree.get(scope)?;
    let text = tree.text();
    let newline = newline_for(text);
    let declaration = variable.var_section_text();

    let section = if scope.kind().is_method_like() {
        scope.first_child_of_kind(SyntaxKind::VarSection)
    } else if scope.kind().is_object() {
        scope.first_child_of_kind(SyntaxKind::GlobalVarSection)
    } else {
        return None;
    };

    if let Some(section) = section {
        return Some(insert_into_section(text, section, variable, &declaration, newline));
    }

    let (anchor, indent) = if scope.kind().is_method_like() {
        let begin = scope
            .first_child_of_kind(SyntaxKind::Block)?
            .token_of_kind(SyntaxKind::KwBegin)?;
        let at = begin.text_range().start();
        (at, line_indent_at_offset(text, at))
    } else if let Some(member) = scope.first_child_in(&[
        SyntaxKind::MethodDeclaration,
        SyntaxKind::TriggerDeclaration,
    ]) {
        let at = member.text_range().start();
        (at, line_indent_at_offset(text, at))
    } else {
        let brace = scope.last_child_of_kind(SyntaxKind::RBrace)?;
        let at = brace.text_range().start();
        let outer = line_indent_at_offset(text, at);
        let unit = indent_unit_for(&outer);
        (at, format!("{outer}{unit}"))
    };

    let unit = indent_unit_for(&indent);
    let blank = if scope.kind().is_object() && anchor_is_member(scope, anchor) {
        newline
    } else {
        ""
    };
    let block = format!("{indent}var{newline}{indent}{unit}{declaration}{newline}{blank}");

    if is_first_on_line(text, anchor) {
        Some(TextEdit::insert(line_start(text, anchor), block))
    } else {
        Some(TextEdit::insert(
            anchor,
            format!("{newline}{block}{indent}"),
        ))
    }
}

fn anchor_is_member(scope: SyntaxNode<'_>, anchor: TextSize) -> bool {
    scope
        .child_nodes()
        .any(|child| child.kind().is_method_like() && child.text_range().start() == anchor)
}

fn insert_into_section(
    text: &str,
    section: SyntaxNode<'_>,
    variable: &Variable,
    declaration: &str,
    newline: &str,
) -> TextEdit {
    let entries: Vec<SyntaxNode<'_>> = section
        .child_nodes()
        .filter(|n| {
            matches!(
                n.kind(),
                SyntaxKind::VariableDeclaration | SyntaxKind::VariableListDeclaration
            )
        })
        .collect();

    let short = variable.type_short();
    let priority = type_priority(&variable.type_name);

    let same_type = entries
        .iter()
        .rev()
        .find(|entry| type_short(entry_type(**entry)).eq_ignore_ascii_case(short));
    let earlier_type = || {
        entries
            .iter()
            .rev()
            .find(|entry| type_priority(entry_type(**entry)) < priority)
    };

    if let Some(after) = same_type.or_else(earlier_type) {
        let indent = line_indent_at_offset(text, after.text_range().start());
        return insert_line_after(text, *after, &format!("{indent}{declaration}"), newline);
    }

    if let Some(first) = entries.first() {
        let at = first.text_range().start();
        let indent = line_indent_at_offset(text, at);
        if is_first_on_line(text, at) {
            return TextEdit::insert(line_start(text, at), format!("{indent}{declaration}{newline}"));
        }
        return TextEdit::insert(at, format!("{declaration} "));
    }

    let var = section
        .token_of_kind(SyntaxKind::KwVar)
        .unwrap_or(section);
    let indent = line_indent_at_offset(text, var.text_range().start());
    let unit = indent_unit_for(&indent);
    TextEdit::insert(
        var.text_range().end(),
        format!("{newline}{indent}{unit}{declaration}"),
    )
}

/// Removes one declaration: a `VariableDeclaration` or one name of a list.
///
/// The var section goes away with its only declaration. Whole lines are
/// removed when nothing else shares them.
#[must_use]
pub fn remove_variable(tree: &SyntaxTree, declaration: NodeId) -> Vec<TextEdit> {
    remove_variables(tree, &[declaration])
}

/// Removes several declarations at once without producing overlapping edits.
///
/// Lists and sections that lose every entry are removed as a whole.
#[must_use]
pub fn remove_variables(tree: &SyntaxTree, declarations: &[NodeId]) -> Vec<TextEdit> {
    let text = tree.text();
    let doomed: FxHashSet<NodeId> = declarations.iter().copied().collect();
    let mut sections: Vec<SyntaxNode<'_>> = Vec::new();
    for &id in declarations {
        let Some(node) = tree.get(id) else { continue };
        assert!(
            node.is_kind_in(&[
                SyntaxKind::VariableDeclaration,
                SyntaxKind::VariableDeclarationName
            ]),
            "remove_variables called on {:?}",
            node.kind()
        );
        if let Some(section) = node.ancestors().find(|n| n.kind().is_var_section()) {
            if !sections.contains(&section) {
                sections.push(section);
            }
        }
    }

    let mut edits = Vec::new();
    for section in sections {
        let entries = declaration_nodes(section);
        if entries.iter().all(|entry| doomed.contains(&entry.id())) {
            edits.push(TextEdit::delete(whole_lines_range(text, section.text_range())));
            continue;
        }

        for entry in section.child_nodes() {
            match entry.kind() {
                SyntaxKind::VariableDeclaration if doomed.contains(&entry.id()) => {
                    edits.push(TextEdit::delete(whole_lines_range(text, entry.text_range())));
                }
                SyntaxKind::VariableListDeclaration => {
                    edits.extend(remove_list_members(text, entry, &doomed));
                }
                _ => {}
            }
        }
    }
    edits.sort_by_key(|edit| edit.range.start());
    edits
}

fn remove_list_members(
    text: &str,
    list: SyntaxNode<'_>,
    doomed: &FxHashSet<NodeId>,
) -> Vec<TextEdit> {
    let names: Vec<SyntaxNode<'_>> = list
        .children_of_kind(SyntaxKind::VariableDeclarationName)
        .collect();
    if !names.iter().any(|name| doomed.contains(&name.id())) {
        return Vec::new();
    }
    if names.iter().all(|name| doomed.contains(&name.id())) {
        return vec![TextEdit::delete(whole_lines_range(text, list.text_range()))];
    }

    // One deletion per run of adjacent names: `"a, b, "` when the run starts
    // the list, `", b, c"` otherwise.
    let mut edits = Vec::new();
    let mut index = 0;
    while index < names.len() {
        if !doomed.contains(&names[index].id()) {
            index += 1;
            continue;
        }
        let start = index;
        while index < names.len() && doomed.contains(&names[index].id()) {
            index += 1;
        }
        let last = index - 1;
        let range = if start == 0 {
            TextRange::new(names[0].text_range().start(), names[index].text_range().start())
        } else {
            TextRange::new(names[start - 1].text_range().end(), names[last].text_range().end())
        };
        edits.push(TextEdit::delete(range));
    }
    edits
}
