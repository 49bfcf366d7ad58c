//! Placement of generated procedures inside an object.

use alfix_syntax::{unquote, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextSize;

use crate::config::ProcedureLocation;
use crate::edit::TextEdit;
use crate::text::{
    at_line_start, indent_unit_for, is_first_on_line, line_indent_at_offset, line_start, newline_for,
};

/// Access modifier of a procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Access {
    /// No modifier.
    Public,
    /// `internal`.
    Internal,
    /// `protected`.
    Protected,
    /// `local`.
    Local,
}

impl Access {
    /// Keyword written before `procedure`, with a trailing space.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Public => "",
            Self::Internal => "internal ",
            Self::Protected => "protected ",
            Self::Local => "local ",
        }
    }
}

/// Access of a procedure; triggers have none.
#[must_use]
pub fn access_of(method: SyntaxNode<'_>) -> Option<Access> {
    if method.kind() != SyntaxKind::MethodDeclaration {
        return None;
    }
    let access = method.child_tokens().find_map(|token| match token.kind() {
        SyntaxKind::KwLocal => Some(Access::Local),
        SyntaxKind::KwInternal => Some(Access::Internal),
        SyntaxKind::KwProtected => Some(Access::Protected),
        _ => None,
    });
    Some(access.unwrap_or(Access::Public))
}

#[derive(Debug, Clone, Copy)]
enum Anchor {
    After(NodeId),
    Before(NodeId),
    ClosingBrace(NodeId),
}

/// Finds where a new procedure goes.
#[derive(Debug, Clone, Copy)]
pub struct ProcedureLocator {
    location: ProcedureLocation,
}

impl ProcedureLocator {
    /// Locator following `location`.
    #[must_use]
    pub fn new(location: ProcedureLocation) -> Self {
        Self { location }
    }

    fn anchor(
        self,
        object: SyntaxNode<'_>,
        current: Option<SyntaxNode<'_>>,
        name: &str,
        access: Access,
    ) -> Option<Anchor> {
        let same_access: Vec<_> = object
            .children_of_kind(SyntaxKind::MethodDeclaration)
            .filter(|method| access_of(*method) == Some(access))
            .collect();

        if self.location == ProcedureLocation::SortedByName {
            let key = unquote(name).to_lowercase();
            if let Some(next) = same_access.iter().find(|method| {
                method
                    .name()
                    .is_some_and(|n| unquote(n).to_lowercase() > key)
            }) {
                return Some(Anchor::Before(next.id()));
            }
        } else if let Some(current) = current.filter(|c| access_of(*c) == Some(access)) {
            return Some(Anchor::After(current.id()));
        }

        if let Some(last) = same_access.last() {
            return Some(Anchor::After(last.id()));
        }
        object
            .last_child_of_kind(SyntaxKind::RBrace)
            .map(|brace| Anchor::ClosingBrace(brace.id()))
    }

    /// Offset a procedure called `name` would be inserted at.
    #[must_use]
    pub fn insertion_offset(
        self,
        object: SyntaxNode<'_>,
        current: Option<SyntaxNode<'_>>,
        name: &str,
        access: Access,
    ) -> Option<TextSize> {
        let tree = object.tree();
        Some(match self.anchor(object, current, name, access)? {
            Anchor::After(id) => tree.node(id).full_range().end(),
            Anchor::Before(id) => line_start(tree.text(), tree.node(id).text_range().start()),
            Anchor::ClosingBrace(id) => line_start(tree.text(), tree.node(id).text_range().start()),
        })
    }

    /// Inserts `lines` (procedure text) into `object`.
    ///
    /// Nested lines carry their indentation relative to the procedure in the
    /// document's own unit. Lines are indented like the object's members and separated from
    /// their neighbours by one blank line.
    #[must_use]
    pub fn insert_procedure(
        self,
        tree: &SyntaxTree,
        object: NodeId,
        current: Option<NodeId>,
        name: &str,
        access: Access,
        lines: &[String],
    ) -> Option<TextEdit> {
        let object = tree.get(object)?;
        if !object.kind().is_object() {
            return None;
        }
        let current = current.and_then(|id| tree.get(id));
        let anchor = self.anchor(object, current, name, access)?;

        let text = tree.text();
        let newline = newline_for(text);
        let indent = member_indent(object);
        let block = lines
            .iter()
            .map(|line| {
                if line.is_empty() {
                    String::new()
                } else {
                    format!("{indent}{line}")
                }
            })
            .collect::<Vec<_>>()
            .join(newline);

        match anchor {
            Anchor::After(id) => {
                let at = tree.node(id).full_range().end();
                let lead = if at_line_start(text, at) {
                    newline.to_string()
                } else {
                    format!("{newline}{newline}")
                };
                Some(TextEdit::insert(at, format!("{lead}{block}{newline}")))
            }
            Anchor::Before(id) => {
                let at = line_start(text, tree.node(id).text_range().start());
                Some(TextEdit::insert(at, format!("{block}{newline}{newline}")))
            }
            Anchor::ClosingBrace(id) => {
                let brace = tree.node(id);
                let empty = brace
                    .prev_sibling()
                    .is_some_and(|prev| prev.kind() == SyntaxKind::LBrace);
                let lead = if empty { "" } else { newline };
                let start = brace.text_range().start();
                if is_first_on_line(text, start) {
                    Some(TextEdit::insert(
                        line_start(text, start),
                        format!("{lead}{block}{newline}"),
                    ))
                } else {
                    let outer = line_indent_at_offset(text, start);
                    Some(TextEdit::insert(
                        start,
                        format!("{newline}{block}{newline}{outer}"),
                    ))
                }
            }
        }
    }
}

/// Indentation of the members of `object`.
#[must_use]
pub fn member_indent(object: SyntaxNode<'_>) -> String {
    let text = object.tree().text();
    if let Some(member) = object
        .child_nodes()
        .find(|child| child.kind().is_method_like() || child.kind() == SyntaxKind::GlobalVarSection)
    {
        return line_indent_at_offset(text, member.text_range().start());
    }
    let outer = line_indent_at_offset(text, object.text_range().start());
    format!("{outer}{}", indent_unit_for(&outer))
}
