//! Shared helpers for parser snapshot tests.
#![allow(dead_code, unused_imports)]

pub use alfix_syntax::syntax::{SyntaxKind, SyntaxNode, SyntaxTree};

/// Formats the tree shape of `source`: one line per node, tokens with their text.
///
/// Ranges are left out so snapshots stay readable; range behaviour has its own tests.
pub fn snapshot_parse(source: &str) -> String {
    let tree = SyntaxTree::parse(source);

    let mut output = String::new();
    format_node(tree.root(), &mut output, 0);

    if !tree.ok() {
        output.push_str("---\nErrors:\n");
        for err in tree.errors() {
            output.push_str(&format!("  - {}\n", err.message));
        }
    }

    output
}

/// Wraps `statements` in a procedure body and formats only the body block.
pub fn snapshot_body(statements: &str) -> String {
    let source = format!("codeunit 1 T\n{{\n    procedure P()\n    begin\n{statements}\n    end;\n}}\n");
    let tree = SyntaxTree::parse(source.as_str());
    let block = tree
        .root()
        .collect_descendants(&[SyntaxKind::Block], false)
        .into_iter()
        .next()
        .expect("procedure body");

    let mut output = String::new();
    format_node(block, &mut output, 0);
    for err in tree.errors() {
        output.push_str(&format!("error: {}\n", err.message));
    }
    output
}

fn format_node(node: SyntaxNode<'_>, out: &mut String, depth: usize) {
    let indent = "  ".repeat(depth);

    if node.is_token() {
        out.push_str(&format!("{indent}{:?} {:?}\n", node.kind(), node.text()));
        return;
    }

    out.push_str(&format!("{indent}{:?}\n", node.kind()));
    for child in node.children() {
        format_node(child, out, depth + 1);
    }
}
