//! Replace a string literal in a method body with a `Label` variable.

use alfix_syntax::{DocumentId, SyntaxKind, SyntaxNode, SyntaxTree};
use text_size::TextRange;
use tracing::debug;

use crate::config::RefactorConfig;
use crate::context::RefactorContext;
use crate::edit::{SourceChange, TextEdit};
use crate::scope::{enclosing_method, ScopeNames};
use crate::synthesis::insert_variable;
use crate::text::unique_name;
use crate::variable::{sanitize_name, Variable};

use super::{CodeAction, CodeActionKind, RefactoringProvider};

/// Longest generated name before the suffix.
const MAX_BASE_LEN: usize = 26;

/// Offers "Extract to label" on string literals inside method bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractLabelProvider;

fn literal_at(tree: &SyntaxTree, range: TextRange) -> Option<SyntaxNode<'_>> {
    let literal = tree.find_node_at(range.start(), &[SyntaxKind::LiteralExpression])?;
    let token = literal.first_token()?;
    if token.kind() != SyntaxKind::StringLiteral || token.text() == "''" {
        return None;
    }
    literal.ancestor_in(&[SyntaxKind::Block])?;
    enclosing_method(literal)?;
    Some(literal)
}

/// Name of the procedure the literal is the first argument of.
fn called_with_message(literal: SyntaxNode<'_>) -> Option<(&str, Vec<SyntaxNode<'_>>)> {
    let list = literal.parent().filter(|p| p.kind() == SyntaxKind::ArgumentList)?;
    let arguments: Vec<_> = list.child_nodes().collect();
    if arguments.first() != Some(&literal) {
        return None;
    }
    let callee = list.parent()?.child_nodes().next()?;
    let name = match callee.kind() {
        SyntaxKind::IdentifierName => callee.text(),
        SyntaxKind::MemberAccessExpression => callee.last_child_of_kind(SyntaxKind::IdentifierName)?.text(),
        _ => return None,
    };
    Some((name, arguments[1..].to_vec()))
}

fn suffix_for(callee: Option<&str>) -> &'static str {
    match callee.map(str::to_ascii_lowercase).as_deref() {
        Some("message") => "Msg",
        Some("error") => "Err",
        Some("confirm" | "strmenu") => "Qst",
        _ => "Lbl",
    }
}

/// `%1`..`%9` placeholders in order of first appearance.
fn placeholders(content: &str) -> Vec<u32> {
    let bytes = content.as_bytes();
    let mut found = Vec::new();
    for (index, pair) in bytes.windows(2).enumerate() {
        if pair[0] == b'%' && pair[1].is_ascii_digit() && (index == 0 || bytes[index - 1] != b'%') {
            let number = u32::from(pair[1] - b'0');
            if number > 0 && !found.contains(&number) {
                found.push(number);
            }
        }
    }
    found
}

/// CamelCase base name from the literal's words, without placeholders.
fn label_base(content: &str) -> String {
    let mut base = String::new();
    for word in content.split(|c: char| c.is_whitespace() || c == '-' || c == '/') {
        let word = word.trim_start_matches(|c: char| c == '%' || c == '#' || c.is_ascii_digit());
        let clean = sanitize_name(word);
        let mut chars = clean.chars();
        if let Some(first) = chars.next() {
            base.extend(first.to_uppercase());
            base.push_str(chars.as_str());
        }
    }
    base.truncate(MAX_BASE_LEN);
    if base.is_empty() || base.starts_with(|c: char| c.is_ascii_digit()) {
        base.insert_str(0, "Text");
        base.truncate(MAX_BASE_LEN);
    }
    base
}

fn translation_comment(
    config: &RefactorConfig,
    content: &str,
    arguments: &[SyntaxNode<'_>],
) -> Option<String> {
    if !config.extract_to_label_creates_comment || config.comments_contain_translations {
        return None;
    }
    let numbers = placeholders(content);
    if numbers.is_empty() {
        return None;
    }
    let parts: Vec<String> = numbers
        .into_iter()
        .map(|n| match arguments.get(n as usize - 1) {
            Some(argument) => format!("%{n} = {}", argument.text().trim()),
            None => format!("%{n}"),
        })
        .collect();
    Some(parts.join(", ").replace('\'', "''"))
}

impl RefactoringProvider for ExtractLabelProvider {
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool {
        ctx.tree(document)
            .is_ok_and(|tree| literal_at(&tree, range).is_some())
    }

    fn create_actions(
        &self,
        ctx: &RefactorContext<'_>,
        document: DocumentId,
        range: TextRange,
    ) -> Vec<CodeAction> {
        let Ok(tree) = ctx.tree(document) else {
            return Vec::new();
        };
        let Some(literal) = literal_at(&tree, range) else {
            return Vec::new();
        };
        let Some(method) = enclosing_method(literal) else {
            return Vec::new();
        };

        let quoted = literal.text().trim();
        let content = quoted
            .strip_prefix('\'')
            .and_then(|rest| rest.strip_suffix('\''))
            .unwrap_or(quoted)
            .replace("''", "'");
        let call = called_with_message(literal);
        let suffix = suffix_for(call.as_ref().map(|(name, _)| *name));

        let names = ScopeNames::of_method(method);
        let name = unique_name(&format!("{}{suffix}", label_base(&content)), |candidate| {
            names.contains(candidate)
        });

        let mut type_name = format!("Label {quoted}");
        let arguments = call.map(|(_, arguments)| arguments).unwrap_or_default();
        if let Some(comment) = translation_comment(ctx.config, &content, &arguments) {
            type_name.push_str(&format!(", Comment = '{comment}'"));
        }

        let variable = Variable::new(name.as_str(), type_name).in_scope(method.name().unwrap_or_default());
        let Some(declaration) = insert_variable(&tree, method.id(), &variable) else {
            debug!(method = ?method.name(), "no place for a label declaration");
            return Vec::new();
        };
        let mut change = SourceChange::new();
        change.add_edit(document, declaration);
        change.add_edit(document, TextEdit::replace(literal.text_range(), name));

        vec![CodeAction::with_edit(
            "Extract to label",
            CodeActionKind::RefactorExtract,
            change,
        )]
    }
}
