//! End-to-end refactorings driven through providers and deferred commands.

mod common;

use alfix_refactor::synthesis::remove_variable;
use alfix_refactor::{
    execute_command, plan_publisher_parameters, PublisherKind, ScriptedUi, SuppressedUi,
};
use alfix_syntax::{SyntaxKind, SyntaxTree};
use common::Workbench;
use text_size::TextRange;

fn run(bench: &Workbench, ui: &dyn alfix_refactor::RefactorUi, needle: &str, title: &str) -> alfix_refactor::SourceChange {
    let action = bench.action(ui, needle, title);
    let command = action.command.expect("deferred action");
    execute_command(&bench.ctx(ui), &command).unwrap().change
}

#[test]
fn test_add_parameter_to_empty_list() {
    let bench = Workbench::new(
        "codeunit 50100 Demo
{
    procedure ReturnSomething(): Integer
    var
        MyBool: Boolean;
    begin
        ReturnSomething(MyBool);
    end;
}
",
    );
    let change = run(&bench, &SuppressedUi, "ReturnSomething(MyBool)", "Add parameters to 'ReturnSomething'");
    let edits = change.edits_for(bench.document);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].new_text, "MyBool: Boolean");
    assert!(bench
        .apply(&change)
        .contains("procedure ReturnSomething(MyBool: Boolean): Integer"));
}

#[test]
fn test_add_parameter_after_existing_one() {
    let bench = Workbench::new(
        "codeunit 50100 Demo
{
    procedure ReturnSomething(Customer: Record Customer): Integer
    var
        MyBool: Boolean;
    begin
        ReturnSomething(Customer, MyBool);
    end;
}
",
    );
    let change = run(&bench, &SuppressedUi, "ReturnSomething(Customer,", "Add parameters to 'ReturnSomething'");
    let edits = change.edits_for(bench.document);
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].new_text, "; MyBool: Boolean");
}

#[test]
fn test_obsolete_overload_attribute_above_copied_signature() {
    let mut bench = Workbench::new(
        "codeunit 50100 Demo
{
    procedure Calc(Qty: Integer)
    begin
    end;

    procedure Run()
    var
        Qty: Integer;
        Flag: Boolean;
    begin
        Calc(Qty, Flag);
    end;
}
",
    );
    bench.project.version = Some("1.0.0.0".to_string());
    let change = run(
        &bench,
        &SuppressedUi,
        "Calc(Qty, Flag)",
        "Create overload of 'Calc' and mark the old one obsolete",
    );
    let output = bench.apply(&change);
    assert!(output.contains(
        "    [Obsolete('Please use the overload with 2 parameters.', 'v1.0.0.0')]\n    procedure Calc(Qty: Integer)\n    begin\n        Calc(Qty, false);\n    end;\n"
    ));
    assert!(output.contains("    procedure Calc(Qty: Integer; Flag: Boolean)\n"));
}

#[test]
fn test_remove_first_list_member() {
    let source = "codeunit 50100 Demo
{
    procedure Run()
    var
        a, b: Decimal;
    begin
    end;
}
";
    let tree = SyntaxTree::parse(source);
    let first = tree
        .root()
        .collect_descendants(&[SyntaxKind::VariableDeclarationName], true)[0];
    let edits = remove_variable(&tree, first.id());
    assert_eq!(edits.len(), 1);
    assert!(edits[0].new_text.is_empty());
    assert_eq!(&source[edits[0].range], "a, ");
}

#[test]
fn test_before_publisher_with_is_handled_only() {
    let bench = Workbench::new(
        "codeunit 50100 Demo
{
    procedure Post()
    begin
        Message('Posting');
    end;
}
",
    );
    let ui = ScriptedUi::new().pick(Some(vec![0]));
    let change = run(&bench, &ui, "Post()", "Add OnBefore publisher");
    let edits = change.edits_for(bench.document);
    assert_eq!(edits.len(), 3);
    assert!(edits[0].new_text.contains("IsHandled: Boolean;"));
    assert!(edits[1].new_text.contains("IsHandled := false;"));
    assert!(edits[1].new_text.contains("OnBeforePost(IsHandled);"));
    assert!(edits[1].new_text.contains("if IsHandled then exit;"));
    assert!(edits[2]
        .new_text
        .contains("[IntegrationEvent(false, false)]\n    local procedure OnBeforePost(var IsHandled: Boolean)"));

    let output = bench.apply(&change);
    assert!(output.contains(
        "    procedure Post()
    var
        IsHandled: Boolean;
    begin
        IsHandled := false;
        OnBeforePost(IsHandled);
        if IsHandled then exit;
        Message('Posting');
    end;"
    ));
}

#[test]
fn test_after_publisher_passes_exit_variable_by_reference() {
    let bench = Workbench::new(
        "codeunit 50100 Demo
{
    var
        LastResult: Decimal;

    procedure Calc(): Decimal
    begin
        exit(LastResult);
    end;
}
",
    );
    let ctx = bench.ctx(&SuppressedUi);
    let tree = ctx.tree(bench.document).unwrap();
    let method = tree
        .root()
        .collect_descendants(&[SyntaxKind::MethodDeclaration], true)[0];
    let plan = plan_publisher_parameters(&ctx, PublisherKind::After, method).unwrap();
    assert_eq!(plan.parameters.len(), 1);
    let parameter = &plan.parameters[0];
    assert_eq!(parameter.variable.name, "LastResult");
    assert!(parameter.variable.is_var);
    assert_eq!(parameter.reason, "used in exit statement");
    assert_eq!(plan.return_name, None);

    let change = run(&bench, &SuppressedUi, "Calc()", "Add OnAfter publisher");
    let output = bench.apply(&change);
    assert!(output.contains("        OnAfterCalc(LastResult);\n        exit(LastResult);"));
    assert!(output.contains("local procedure OnAfterCalc(var LastResult: Decimal)"));
}

#[test]
fn test_cancelled_pick_leaves_source_untouched() {
    let bench = Workbench::new(
        "codeunit 50100 Demo
{
    procedure Post()
    begin
    end;
}
",
    );
    let ui = ScriptedUi::new().pick(None);
    let action = bench.action(&ui, "Post()", "Add OnBefore publisher");
    let error = execute_command(&bench.ctx(&ui), &action.command.unwrap()).unwrap_err();
    assert_eq!(error, alfix_refactor::RefactorError::Cancelled);
}

#[test]
fn test_qualified_call_reaches_other_document() {
    let mut bench = Workbench::new(
        "codeunit 50100 Caller
{
    procedure Run()
    var
        Mgt: Codeunit \"Sales Mgt\";
        Qty: Integer;
        Flag: Boolean;
    begin
        Mgt.Post(Qty, Flag);
    end;
}
",
    );
    let target = bench.add(
        "src/SalesMgt.Codeunit.al",
        "codeunit 50101 \"Sales Mgt\"
{
    procedure Post(Qty: Integer)
    begin
    end;
}
",
    );
    let action = bench.action(&SuppressedUi, "Mgt.Post", "Add parameters to 'Post'");
    let command = action.command.unwrap();
    assert_eq!(command.document, target);
    let change = execute_command(&bench.ctx(&SuppressedUi), &command).unwrap();
    assert!(change.change.edits_for(bench.document).is_empty());
    assert_eq!(change.change.edits_for(target)[0].new_text, "; Flag: Boolean");
}

#[test]
fn test_extract_then_rename_offset_points_at_call() {
    let bench = Workbench::new(
        "codeunit 50100 Demo
{
    procedure Run()
    var
        Counter: Integer;
    begin
        Counter := 1;
        Message('%1', Counter);
    end;
}
",
    );
    let start = bench.offset_of("Counter := 1;");
    let end = bench.offset_of("    end;");
    let actions = alfix_refactor::code_actions(
        &bench.ctx(&SuppressedUi),
        &alfix_refactor::default_providers(),
        bench.document,
        TextRange::new(start, end),
    );
    let extract = actions
        .iter()
        .find(|a| a.title == "Extract procedure")
        .unwrap();
    let result = execute_command(&bench.ctx(&SuppressedUi), extract.command.as_ref().unwrap()).unwrap();
    let output = bench.apply(&result.change);
    let (_, offset) = result.rename.unwrap();
    assert!(output[usize::from(offset)..].starts_with("NewProcedure();"));
    assert!(output.contains("    local procedure NewProcedure()\n    var\n        Counter: Integer;\n    begin\n        Counter := 1;\n        Message('%1', Counter);\n    end;\n"));
    assert!(!output.contains("    procedure Run()\n    var"));
}
