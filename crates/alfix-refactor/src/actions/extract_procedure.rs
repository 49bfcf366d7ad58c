//! Extract a run of statements into a new local procedure.
//!
//! The selection must cover whole statements of one block. Names read or
//! written by the statements are classified against the declarations of the
//! enclosing method:
//!
//! * parameters and a named return value become parameters of the new
//!   procedure,
//! * locals that are also used outside the selection become parameters,
//! * locals used only inside the selection move into the new procedure.
//!
//! A parameter is passed by reference when the statements assign to it or
//! when it is a record. Globals stay visible and are not passed.

use alfix_syntax::{names_equal, DocumentId, NodeId, SyntaxKind, SyntaxNode, SyntaxTree};
use indexmap::IndexMap;
use text_size::{TextRange, TextSize};
use tracing::debug;

use crate::config::ProcedureLocation;
use crate::context::RefactorContext;
use crate::edit::{offset_in_result, SourceChange, TextEdit};
use crate::error::RefactorError;
use crate::locator::{Access, ProcedureLocator};
use crate::prompt::{validate_new_name, TextPrompt};
use crate::scope::{
    enclosing_method, enclosing_object, local_declarations, parameter_nodes, procedures_named,
    return_value, ScopeNames,
};
use crate::synthesis::{parameter_list_text, remove_variables};
use crate::text::{
    indent_unit_for, line_indent_at_offset, reindent_block, trim_range_to_non_whitespace, unique_name,
};
use crate::variable::{parse_parameter, parse_variable, Variable};

use super::{CodeAction, CodeActionKind, CommandKind, CommandResult, DeferredCommand, RefactoringProvider};

/// Name used when nobody is asked.
const DEFAULT_PROCEDURE_NAME: &str = "NewProcedure";

/// Offers "Extract procedure" on selections of whole statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExtractProcedureProvider;

/// Statements of one block exactly covered by `range`, with their range.
///
/// The selection may stop short of the final `;`.
fn selected_statements(tree: &SyntaxTree, range: TextRange) -> Option<(Vec<SyntaxNode<'_>>, TextRange)> {
    let text = tree.text();
    let selection = trim_range_to_non_whitespace(text, range)?;
    let block = tree
        .covering_node(selection)
        .ancestors()
        .find(|node| node.kind() == SyntaxKind::Block)?;
    enclosing_method(block)?;

    let statements: Vec<_> = block
        .child_nodes()
        .filter(|node| node.kind().is_statement())
        .filter(|node| node.text_range().intersect(selection).is_some_and(|r| !r.is_empty()))
        .collect();
    let covered = TextRange::new(
        statements.first()?.text_range().start(),
        statements.last()?.text_range().end(),
    );
    if covered.start() != selection.start() || selection.end() > covered.end() {
        return None;
    }
    let rest = &text[TextRange::new(selection.end(), covered.end())];
    (rest.is_empty() || rest == ";").then_some((statements, covered))
}

fn contains_exit(statements: &[SyntaxNode<'_>]) -> bool {
    statements
        .iter()
        .flat_map(SyntaxNode::descendants)
        .any(|node| node.kind() == SyntaxKind::ExitStatement)
}

/// Whether `name` refers to a variable rather than a callee, member or option value.
fn is_variable_reference(name: SyntaxNode<'_>) -> bool {
    let Some(parent) = name.parent() else {
        return true;
    };
    let first = parent.child_nodes().next() == Some(name);
    match parent.kind() {
        SyntaxKind::MemberAccessExpression | SyntaxKind::OptionAccessExpression => first,
        SyntaxKind::InvocationExpression => !first,
        _ => true,
    }
}

fn is_write_context(name: SyntaxNode<'_>) -> bool {
    let mut current = name;
    while let Some(parent) = current.parent() {
        let first = parent.child_nodes().next() == Some(current);
        match parent.kind() {
            SyntaxKind::AssignmentStatement
            | SyntaxKind::CompoundAssignmentStatement
            | SyntaxKind::ForStatement
            | SyntaxKind::ForEachStatement => return first,
            SyntaxKind::MemberAccessExpression | SyntaxKind::ElementAccessExpression if first => {
                current = parent;
            }
            _ => return false,
        }
    }
    false
}

fn variable_references<'t>(node: SyntaxNode<'t>) -> impl Iterator<Item = SyntaxNode<'t>> + 't {
    node.descendants()
        .filter(|n| n.kind() == SyntaxKind::IdentifierName && is_variable_reference(*n))
}

/// A declaration of the enclosing method that the statements use.
struct Usage {
    variable: Variable,
    declaration: Option<NodeId>,
    written: bool,
}

/// Splits the used declarations into parameters and moved locals.
struct Plan {
    parameters: Vec<Variable>,
    moved: Vec<Variable>,
    removed: Vec<NodeId>,
}

fn plan_variables(method: SyntaxNode<'_>, statements: &[SyntaxNode<'_>], covered: TextRange) -> Plan {
    let mut declared: Vec<(Variable, Option<NodeId>)> = parameter_nodes(method)
        .into_iter()
        .map(|node| (parse_parameter(node), None))
        .collect();
    if let Some(variable) = return_value(method).and_then(|r| r.to_variable(None)) {
        declared.push((variable, None));
    }
    declared.extend(
        local_declarations(method)
            .into_iter()
            .map(|node| (parse_variable(node), Some(node.id()))),
    );

    // First use decides the parameter order.
    let mut used: IndexMap<usize, Usage> = IndexMap::new();
    for reference in statements.iter().flat_map(|s| variable_references(*s)) {
        let Some(index) = declared
            .iter()
            .position(|(variable, _)| names_equal(&variable.name, reference.text()))
        else {
            continue;
        };
        let usage = used.entry(index).or_insert_with(|| Usage {
            variable: declared[index].0.clone(),
            declaration: declared[index].1,
            written: false,
        });
        usage.written |= is_write_context(reference);
    }

    let used_outside = |name: &str| {
        method
            .first_child_of_kind(SyntaxKind::Block)
            .into_iter()
            .flat_map(variable_references)
            .filter(|reference| !covered.contains_range(reference.text_range()))
            .any(|reference| names_equal(reference.text(), name))
    };

    let mut plan = Plan {
        parameters: Vec::new(),
        moved: Vec::new(),
        removed: Vec::new(),
    };
    for usage in used.into_values() {
        let Usage {
            variable,
            declaration,
            written,
        } = usage;
        match declaration {
            Some(id) if !used_outside(&variable.name) => {
                plan.moved.push(Variable::new(variable.name, variable.type_name));
                plan.removed.push(id);
            }
            _ => {
                let by_reference = variable.can_be_var()
                    && (written || variable.type_short().eq_ignore_ascii_case("record"));
                plan.parameters
                    .push(Variable::new(variable.name, variable.type_name).with_var(by_reference));
            }
        }
    }
    plan
}

fn procedure_name(
    ctx: &RefactorContext<'_>,
    ask: bool,
    method: SyntaxNode<'_>,
    object: SyntaxNode<'_>,
) -> Result<String, RefactorError> {
    let globals_only = ScopeNames {
        globals: ScopeNames::of_method(method).globals,
        ..ScopeNames::default()
    };
    let check = |name: &str| -> Option<String> {
        if let Err(conflict) = validate_new_name(name, &globals_only) {
            return Some(conflict.to_string());
        }
        (!procedures_named(object, name).is_empty())
            .then(|| format!("a procedure named '{name}' already exists"))
    };

    if ask {
        let prompt = TextPrompt {
            prompt: "Name of the new procedure".to_string(),
            placeholder: DEFAULT_PROCEDURE_NAME.to_string(),
        };
        let validate = |text: &str| check(text.trim());
        return ctx
            .ui
            .prompt_text(&prompt, &validate)
            .map(|answer| answer.trim().to_string())
            .ok_or(RefactorError::Cancelled);
    }
    Ok(unique_name(DEFAULT_PROCEDURE_NAME, |candidate| check(candidate).is_some()))
}

/// Lines of the new procedure, nested lines indented by `unit`.
fn procedure_lines(name: &str, plan: &Plan, body: &str, unit: &str) -> Vec<String> {
    let mut lines = vec![format!(
        "local procedure {name}({})",
        parameter_list_text(&plan.parameters)
    )];
    if !plan.moved.is_empty() {
        lines.push("var".to_string());
        lines.extend(plan.moved.iter().map(|v| format!("{unit}{}", v.var_section_text())));
    }
    lines.push("begin".to_string());
    lines.extend(body.split('\n').map(|line| {
        if line.is_empty() {
            String::new()
        } else {
            format!("{unit}{line}")
        }
    }));
    lines.push("end;".to_string());
    lines
}

/// Extracts the statements covered by `range` of `document`.
///
/// Returns `Ok(None)` when the selection is not a run of whole statements
/// of a method body or contains an `exit`.
pub fn extract_procedure(
    ctx: &RefactorContext<'_>,
    document: DocumentId,
    tree: &SyntaxTree,
    range: TextRange,
) -> Result<Option<CommandResult>, RefactorError> {
    let Some((statements, covered)) = selected_statements(tree, range) else {
        debug!(?range, "selection does not cover whole statements");
        return Ok(None);
    };
    if contains_exit(&statements) {
        debug!(?range, "selection contains exit");
        return Ok(None);
    }
    let Some(method) = enclosing_method(statements[0]) else {
        return Ok(None);
    };
    let Some(object) = enclosing_object(method) else {
        return Ok(None);
    };

    // Sorted placement needs the final name up front.
    let ask = ctx.config.find_new_procedure_location == ProcedureLocation::SortedByName
        && !ctx.ui.is_suppressed();
    let name = procedure_name(ctx, ask, method, object)?;
    let plan = plan_variables(method, &statements, covered);

    let text = tree.text();
    let selected = &text[covered];
    let indent = line_indent_at_offset(text, covered.start());
    let body = reindent_block(selected, &indent, "", "\n");
    let lines = procedure_lines(&name, &plan, &body, indent_unit_for(&indent));

    let locator = ProcedureLocator::new(ctx.config.find_new_procedure_location);
    let Some(declaration) =
        locator.insert_procedure(tree, object.id(), Some(method.id()), &name, Access::Local, &lines)
    else {
        debug!(object = ?object.name(), "no place for the new procedure");
        return Ok(None);
    };

    let arguments: Vec<&str> = plan.parameters.iter().map(|p| p.name.as_str()).collect();
    let separator = if selected.ends_with(';') { ";" } else { "" };
    let call = TextEdit::replace(covered, format!("{name}({}){separator}", arguments.join(", ")));

    let mut edits = vec![call, declaration];
    edits.extend(remove_variables(tree, &plan.removed));
    let rename = (!ask).then(|| (document, offset_in_result(&edits, 0, TextSize::from(0))));

    Ok(Some(CommandResult {
        change: SourceChange::from_edits(document, edits),
        rename,
    }))
}

impl RefactoringProvider for ExtractProcedureProvider {
    fn consider_line(&self, ctx: &RefactorContext<'_>, document: DocumentId, range: TextRange) -> bool {
        !range.is_empty()
            && ctx.tree(document).is_ok_and(|tree| {
                selected_statements(&tree, range).is_some_and(|(statements, _)| !contains_exit(&statements))
            })
    }

    fn create_actions(
        &self,
        _ctx: &RefactorContext<'_>,
        document: DocumentId,
        range: TextRange,
    ) -> Vec<CodeAction> {
        vec![CodeAction::with_command(
            "Extract procedure",
            CodeActionKind::RefactorExtract,
            DeferredCommand::new(
                CommandKind::ExtractProcedure { end: range.end() },
                document,
                range.start(),
            ),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::execute_command;
    use crate::edit::apply_edits;
    use crate::fixture::Fixture;
    use crate::prompt::{RefactorUi, ScriptedUi, SuppressedUi, UiRequest};
    use expect_test::expect;

    const SOURCE: &str = "codeunit 50100 Calc
{
    procedure Run(var Customer: Record Customer; Qty: Integer)
    var
        Total: Decimal;
        Factor: Decimal;
    begin
        Factor := 2;
        Total := Qty * Factor;
        Customer.Amount := Total;
    end;
}
";

    const SELECTION: &str = "Factor := 2;\n        Total := Qty * Factor;";

    fn run(fixture: &Fixture, ui: &dyn RefactorUi, range: TextRange) -> Result<CommandResult, RefactorError> {
        let actions = fixture.actions(&ExtractProcedureProvider, range);
        assert_eq!(actions.len(), 1);
        let command = actions[0].command.clone().unwrap();
        execute_command(&fixture.ctx(ui), &command)
    }

    fn apply(fixture: &Fixture, result: &CommandResult) -> String {
        apply_edits(fixture.source(), result.change.edits_for(fixture.document)).unwrap()
    }

    #[test]
    fn test_extract_moves_private_locals_and_passes_the_rest() {
        let fixture = Fixture::new(SOURCE);
        let result = run(&fixture, &SuppressedUi, fixture.range_of(SELECTION)).unwrap();
        let output = apply(&fixture, &result);
        expect![[r#"
            codeunit 50100 Calc
            {
                procedure Run(var Customer: Record Customer; Qty: Integer)
                var
                    Total: Decimal;
                begin
                    NewProcedure(Total, Qty);
                    Customer.Amount := Total;
                end;

                local procedure NewProcedure(var Total: Decimal; Qty: Integer)
                var
                    Factor: Decimal;
                begin
                    Factor := 2;
                    Total := Qty * Factor;
                end;
            }
        "#]]
        .assert_eq(&output);

        let (document, offset) = result.rename.unwrap();
        assert_eq!(document, fixture.document);
        assert!(output[usize::from(offset)..].starts_with("NewProcedure(Total, Qty);"));
    }

    #[test]
    fn test_records_are_passed_by_reference() {
        let fixture = Fixture::new(SOURCE);
        let range = fixture.range_of("Customer.Amount := Total;");
        let output = apply(&fixture, &run(&fixture, &SuppressedUi, range).unwrap());
        assert!(output.contains("local procedure NewProcedure(var Customer: Record Customer; Total: Decimal)"));
        assert!(output.contains("        NewProcedure(Customer, Total);\n"));
    }

    #[test]
    fn test_new_procedure_follows_tab_indentation() {
        let source = "codeunit 50100 Calc\n{\n\tprocedure Run()\n\tvar\n\t\tTotal: Decimal;\n\tbegin\n\t\tTotal := 1;\n\t\tif Total > 0 then\n\t\t\tTotal := 2;\n\tend;\n}\n";
        let fixture = Fixture::new(source);
        let range = fixture.range_of("Total := 1;\n\t\tif Total > 0 then\n\t\t\tTotal := 2;");
        let output = apply(&fixture, &run(&fixture, &SuppressedUi, range).unwrap());
        assert!(output.contains(
            "\tlocal procedure NewProcedure()\n\tvar\n\t\tTotal: Decimal;\n\tbegin\n\t\tTotal := 1;\n\t\tif Total > 0 then\n\t\t\tTotal := 2;\n\tend;"
        ));
    }

    #[test]
    fn test_moves_locals_declared_in_one_list() {
        let source = "codeunit 50100 Calc
{
    procedure Run()
    var
        a, b, c: Decimal;
    begin
        a := 1;
        b := 2;
        c := 3;
        Message('%1', c);
    end;
}
";
        let fixture = Fixture::new(source);
        let range = fixture.range_of("a := 1;\n        b := 2;");
        let output = apply(&fixture, &run(&fixture, &SuppressedUi, range).unwrap());
        expect![[r#"
            codeunit 50100 Calc
            {
                procedure Run()
                var
                    c: Decimal;
                begin
                    NewProcedure();
                    c := 3;
                    Message('%1', c);
                end;

                local procedure NewProcedure()
                var
                    a: Decimal;
                    b: Decimal;
                begin
                    a := 1;
                    b := 2;
                end;
            }
        "#]]
        .assert_eq(&output);
    }

    #[test]
    fn test_selection_without_final_semicolon() {
        let fixture = Fixture::new(SOURCE);
        let range = fixture.range_of("Factor := 2");
        let output = apply(&fixture, &run(&fixture, &SuppressedUi, range).unwrap());
        assert!(output.contains("        NewProcedure(Factor);\n        Total := Qty * Factor;"));
        assert!(output.contains("local procedure NewProcedure(var Factor: Decimal)"));
    }

    #[test]
    fn test_not_offered_for_partial_statements_or_exit() {
        let fixture = Fixture::new(SOURCE);
        assert!(fixture
            .actions(&ExtractProcedureProvider, fixture.range_of("Qty * Factor"))
            .is_empty());

        let with_exit = "codeunit 50100 Calc
{
    procedure Run(): Integer
    begin
        Message('x');
        exit(1);
    end;
}
";
        let fixture = Fixture::new(with_exit);
        let range = fixture.range_of("Message('x');\n        exit(1);");
        assert!(fixture.actions(&ExtractProcedureProvider, range).is_empty());
    }

    #[test]
    fn test_sorted_placement_prompts_for_name() {
        let mut fixture = Fixture::new(SOURCE);
        fixture.config.find_new_procedure_location = ProcedureLocation::SortedByName;
        let ui = ScriptedUi::new().text(Some("Run")).text(Some("ApplyFactor"));
        let result = run(&fixture, &ui, fixture.range_of(SELECTION)).unwrap();
        assert_eq!(result.rename, None);
        let output = apply(&fixture, &result);
        assert!(output.contains("local procedure ApplyFactor(var Total: Decimal; Qty: Integer)"));

        let requests = ui.requests();
        let [UiRequest::Text { prompt, rejected }] = requests.as_slice() else {
            panic!("unexpected requests: {requests:?}");
        };
        assert_eq!(prompt.placeholder, "NewProcedure");
        assert_eq!(rejected[0].0, "Run");
    }

    #[test]
    fn test_cancelled_prompt_produces_no_change() {
        let mut fixture = Fixture::new(SOURCE);
        fixture.config.find_new_procedure_location = ProcedureLocation::SortedByName;
        let ui = ScriptedUi::new().text(None);
        let error = run(&fixture, &ui, fixture.range_of(SELECTION)).unwrap_err();
        assert_eq!(error, RefactorError::Cancelled);
    }
}
