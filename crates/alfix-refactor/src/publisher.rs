//! OnBefore/OnAfter publisher insertion.
//!
//! Planning collects every variable a subscriber may want, lets the user
//! choose, and orders the chosen ones. [`add_publisher`] turns a plan into
//! edits: the call, the `IsHandled` declaration, the event declaration and
//! the name of a previously unnamed return value.

use std::fmt;

use alfix_syntax::{names_equal, unquote, DocumentId, SyntaxKind, SyntaxNode};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use tracing::debug;

use crate::config::RefactorConfig;
use crate::context::RefactorContext;
use crate::edit::SourceChange;
use crate::error::RefactorError;
use crate::locator::{Access, ProcedureLocator};
use crate::prompt::{ask_return_name, PickItem};
use crate::resolve::{argument_for, lookup_variable, rec_type};
use crate::scope::{enclosing_object, locals, parameters, procedures_named, return_value, ScopeNames};
use crate::synthesis::{
    add_return_value_name, insert_publisher_call, insert_variable, parameter_list_text,
    PublisherPosition,
};
use crate::text::unique_name;
use crate::variable::{sanitize_name, ReturnValue, Variable};

const IS_HANDLED: &str = "IsHandled";

/// Which side of the method body the publisher is raised on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PublisherKind {
    /// `OnBefore...`, raised first and able to skip the body.
    Before,
    /// `OnAfter...`, raised last.
    After,
}

impl PublisherKind {
    fn prefix(self) -> &'static str {
        match self {
            Self::Before => "OnBefore",
            Self::After => "OnAfter",
        }
    }
}

impl fmt::Display for PublisherKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// A variable offered as publisher parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateParameter {
    /// Why it is offered.
    pub reason: String,
    /// The publisher parameter.
    pub variable: Variable,
    /// Expression passed in the publisher call.
    pub argument: String,
    /// Preselected in the picker.
    pub picked_by_default: bool,
    /// Higher values come first in the parameter list.
    pub position_priority: u8,
}

/// Parameters chosen for a publisher.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherPlan {
    /// Chosen parameters in declaration order.
    pub parameters: Vec<CandidateParameter>,
    /// Name given to a previously unnamed return value.
    pub return_name: Option<SmolStr>,
}

impl PublisherPlan {
    /// Returns `true` if the `IsHandled` pattern was chosen.
    #[must_use]
    pub fn uses_is_handled(&self) -> bool {
        self.parameters.iter().any(|p| p.reason == REASON_HANDLED)
    }
}

const REASON_HANDLED: &str = "handled pattern";
const REASON_EXIT: &str = "used in exit statement";

struct Candidates<'c> {
    config: &'c RefactorConfig,
    entries: IndexMap<String, CandidateParameter>,
}

impl<'c> Candidates<'c> {
    fn new(config: &'c RefactorConfig) -> Self {
        Self {
            config,
            entries: IndexMap::new(),
        }
    }

    /// Adds a candidate unless one with the same name exists.
    fn push(
        &mut self,
        variable: Variable,
        argument: String,
        reason: impl Into<String>,
        by_reference: bool,
        picked: bool,
        priority: u8,
    ) {
        let key = unquote(&variable.name).to_lowercase();
        if self.entries.contains_key(&key) {
            return;
        }
        let config = self.config;
        let by_reference = by_reference
            || variable.is_var
            || config.is_var_parameter(&variable.name)
            || config.publisher_has_var_parameters_only;
        let mut variable = Variable::new(variable.name, variable.type_name);
        variable.is_var = by_reference && variable.can_be_var();
        self.entries.insert(
            key,
            CandidateParameter {
                reason: reason.into(),
                variable,
                argument,
                picked_by_default: picked,
                position_priority: priority,
            },
        );
    }

    fn push_variable(&mut self, variable: Variable, reason: &str, by_reference: bool, picked: bool, priority: u8) {
        let argument = variable.name.to_string();
        self.push(variable, argument, reason, by_reference, picked, priority);
    }

    fn into_vec(self) -> Vec<CandidateParameter> {
        self.entries.into_values().collect()
    }
}

/// The trailing `exit(expr)` of the body of `method` as a variable and the
/// passed expression. Exits nested in other statements do not count.
fn exit_variable(ctx: &RefactorContext<'_>, method: SyntaxNode<'_>) -> Option<(Variable, String)> {
    let expression = method
        .first_child_of_kind(SyntaxKind::Block)?
        .child_nodes()
        .last()
        .filter(|stmt| stmt.kind() == SyntaxKind::ExitStatement)?
        .child_nodes()
        .next()?;
    match expression.kind() {
        SyntaxKind::IdentifierName => {
            let variable = lookup_variable(&ctx.trees(), method, expression.text())?;
            Some((variable, expression.text().to_string()))
        }
        SyntaxKind::MemberAccessExpression => {
            let argument = argument_for(&ctx.trees(), method, expression)?;
            Some((argument.variable, argument.expression))
        }
        _ => None,
    }
}

fn has_exit_value(method: SyntaxNode<'_>) -> bool {
    method
        .collect_descendants(&[SyntaxKind::ExitStatement], false)
        .iter()
        .any(|exit| exit.child_nodes().next().is_some())
}

/// The return value as candidate, asking for a name when it has none.
/// The second element is the name that was asked for.
fn return_candidate(
    ctx: &RefactorContext<'_>,
    ret: Option<&ReturnValue>,
    names: &ScopeNames,
) -> Result<Option<(Variable, Option<SmolStr>)>, RefactorError> {
    let Some(ret) = ret else {
        return Ok(None);
    };
    if ret.name.is_some() {
        return Ok(ret.to_variable(None).map(|v| (v, None)));
    }
    let name = ask_return_name(ctx.ui, names).ok_or(RefactorError::Cancelled)?;
    Ok(ret.to_variable(Some(&name)).map(|v| (v, Some(name))))
}

/// Collects, offers and orders the parameters of a new publisher for `method`.
///
/// A cancelled prompt yields [`RefactorError::Cancelled`].
pub fn plan_publisher_parameters(
    ctx: &RefactorContext<'_>,
    kind: PublisherKind,
    method: SyntaxNode<'_>,
) -> Result<PublisherPlan, RefactorError> {
    assert!(method.kind().is_method_like(), "not a method: {:?}", method.kind());

    let names = ScopeNames::of_method(method);
    let params = parameters(method);
    let local_vars = locals(method);
    let ret = return_value(method);
    let mut return_name = None;
    let mut candidates = Candidates::new(ctx.config);

    match kind {
        PublisherKind::Before => {
            candidates.push_variable(Variable::new(IS_HANDLED, "Boolean"), REASON_HANDLED, true, true, 100);
            if let Some((variable, asked)) = return_candidate(ctx, ret.as_ref(), &names)? {
                return_name = asked;
                candidates.push_variable(variable, "return value", true, true, 90);
            }
        }
        PublisherKind::After => {
            let exit = exit_variable(ctx, method);
            if let Some((variable, argument)) = &exit {
                let is = |list: &[Variable]| list.iter().any(|v| names_equal(&v.name, &variable.name));
                let mut reason = REASON_EXIT.to_string();
                if ret
                    .as_ref()
                    .and_then(|r| r.name.as_deref())
                    .is_some_and(|n| names_equal(n, &variable.name))
                {
                    reason.push_str(" (return variable)");
                } else if is(&params) {
                    reason.push_str(" (parameter)");
                } else if is(&local_vars) {
                    reason.push_str(" (local variable)");
                }
                candidates.push(variable.clone(), argument.clone(), reason, true, true, 100);
            }
            // An unnamed return value next to `exit(value)` is not offered.
            let named = ret.as_ref().is_some_and(|r| r.name.is_some());
            if named || !has_exit_value(method) {
                if let Some((variable, asked)) = return_candidate(ctx, ret.as_ref(), &names)? {
                    return_name = asked;
                    candidates.push_variable(variable, "return value", true, exit.is_none(), 90);
                }
            }
        }
    }

    if let Some(type_name) = enclosing_object(method).and_then(|object| rec_type(&ctx.trees(), object)) {
        candidates.push_variable(Variable::new("Rec", type_name.clone()), "current record", true, false, 60);
        candidates.push_variable(Variable::new("xRec", type_name), "previous record", false, false, 60);
    }
    for param in params {
        candidates.push_variable(param, "parameter", false, true, 80);
    }
    for local in local_vars {
        candidates.push_variable(local, "local variable", false, false, 70);
    }

    let offered = candidates.into_vec();
    let chosen: Vec<usize> = if ctx.ui.is_suppressed() {
        (0..offered.len()).filter(|&i| offered[i].picked_by_default).collect()
    } else {
        let items: Vec<PickItem> = offered
            .iter()
            .map(|c| PickItem {
                label: c.variable.name.to_string(),
                description: format!(
                    "{}, var: {}, reason: {}",
                    c.variable.type_name, c.variable.is_var, c.reason
                ),
                picked: c.picked_by_default,
            })
            .collect();
        ctx.ui.pick_many(&items).ok_or(RefactorError::Cancelled)?
    };

    let mut parameters: Vec<CandidateParameter> = offered
        .into_iter()
        .enumerate()
        .filter(|(i, _)| chosen.contains(i))
        .map(|(_, c)| c)
        .collect();
    parameters.sort_by(|a, b| b.position_priority.cmp(&a.position_priority));

    debug!(count = parameters.len(), %kind, "planned publisher parameters");
    Ok(PublisherPlan {
        parameters,
        return_name,
    })
}

/// Adds an `OnBefore`/`OnAfter` integration event to `method` and raises it.
pub fn add_publisher(
    ctx: &RefactorContext<'_>,
    document: DocumentId,
    method: SyntaxNode<'_>,
    kind: PublisherKind,
) -> Result<SourceChange, RefactorError> {
    let not_found = RefactorError::TargetNotFound {
        document,
        offset: method.text_range().start().into(),
    };
    let tree = method.tree();
    let (Some(object), Some(block), Some(method_name)) = (
        enclosing_object(method),
        method.first_child_of_kind(SyntaxKind::Block),
        method.name(),
    ) else {
        return Err(not_found);
    };

    let plan = plan_publisher_parameters(ctx, kind, method)?;

    let base = format!("{}{}", kind.prefix(), sanitize_name(unquote(method_name)));
    let publisher = unique_name(&base, |candidate| !procedures_named(object, candidate).is_empty());

    let mut change = SourceChange::new();
    if let Some(name) = &plan.return_name {
        change.extend(document, add_return_value_name(tree, method.id(), name));
    }

    let is_handled = kind == PublisherKind::Before && plan.uses_is_handled();
    if is_handled && !ScopeNames::of_method(method).contains(IS_HANDLED) {
        change.extend(
            document,
            insert_variable(tree, method.id(), &Variable::new(IS_HANDLED, "Boolean")),
        );
    }

    let arguments: Vec<String> = plan.parameters.iter().map(|p| p.argument.clone()).collect();
    let position = match kind {
        PublisherKind::Before => PublisherPosition::Top,
        PublisherKind::After => PublisherPosition::Bottom,
    };
    let call = insert_publisher_call(tree, block.id(), &publisher, &arguments, is_handled, position)
        .ok_or(not_found.clone())?;
    change.add_edit(document, call);

    let variables: Vec<Variable> = plan.parameters.iter().map(|p| p.variable.clone()).collect();
    let lines = vec![
        "[IntegrationEvent(false, false)]".to_string(),
        format!(
            "{}procedure {publisher}({})",
            Access::Local.prefix(),
            parameter_list_text(&variables)
        ),
        "begin".to_string(),
        "end;".to_string(),
    ];
    let declaration = ProcedureLocator::new(ctx.config.find_new_procedure_location)
        .insert_procedure(tree, object.id(), Some(method.id()), &publisher, Access::Local, &lines)
        .ok_or(not_found)?;
    change.add_edit(document, declaration);

    Ok(change)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::apply_edits;
    use crate::fixture::Fixture;
    use crate::prompt::{ScriptedUi, SuppressedUi, UiRequest};
    use alfix_syntax::SyntaxTree;
    use expect_test::expect;

    fn method<'t>(tree: &'t SyntaxTree, name: &str) -> SyntaxNode<'t> {
        tree.root()
            .collect_descendants(&[SyntaxKind::MethodDeclaration, SyntaxKind::TriggerDeclaration], false)
            .into_iter()
            .find(|m| m.name() == Some(name))
            .unwrap()
    }

    fn names(plan: &PublisherPlan) -> Vec<&str> {
        plan.parameters.iter().map(|p| p.variable.name.as_str()).collect()
    }

    const TABLE: &str = "table 50100 Item
{
    procedure Calc(Qty: Integer): Decimal
    var
        Factor: Decimal;
    begin
        Factor := 2;
        exit(Qty * Factor);
    end;
}
";

    #[test]
    fn test_before_plan_defaults() {
        let fixture = Fixture::new(TABLE);
        let ctx = fixture.ctx(&SuppressedUi);
        let tree = ctx.tree(fixture.document).unwrap();
        let plan = plan_publisher_parameters(&ctx, PublisherKind::Before, method(&tree, "Calc")).unwrap();
        assert_eq!(names(&plan), vec!["IsHandled", "ReturnValue", "Qty"]);
        assert_eq!(plan.return_name.as_deref(), Some("ReturnValue"));
        assert!(plan.parameters[0].variable.is_var);
        assert!(plan.parameters[1].variable.is_var);
        assert!(!plan.parameters[2].variable.is_var);
    }

    #[test]
    fn test_picker_payload_and_priority_order() {
        let fixture = Fixture::new(TABLE);
        // Offered: IsHandled, return value, Rec, xRec, Qty, Factor.
        let ui = ScriptedUi::new().text(Some("Result")).pick(Some(vec![5, 2, 0]));
        let ctx = fixture.ctx(&ui);
        let tree = ctx.tree(fixture.document).unwrap();
        let plan = plan_publisher_parameters(&ctx, PublisherKind::Before, method(&tree, "Calc")).unwrap();
        assert_eq!(names(&plan), vec!["IsHandled", "Factor", "Rec"]);

        let requests = ui.requests();
        let Some(UiRequest::Pick(items)) = requests.last() else {
            panic!("no picker shown: {requests:?}");
        };
        let labels: Vec<&str> = items.iter().map(|i| i.label.as_str()).collect();
        assert_eq!(labels, vec!["IsHandled", "Result", "Rec", "xRec", "Qty", "Factor"]);
        assert_eq!(items[2].description, "Record Item, var: true, reason: current record");
        assert_eq!(items[3].description, "Record Item, var: false, reason: previous record");
        let picked: Vec<bool> = items.iter().map(|i| i.picked).collect();
        assert_eq!(picked, vec![true, true, false, false, true, false]);
    }

    #[test]
    fn test_cancel_in_name_prompt_or_picker() {
        let fixture = Fixture::new(TABLE);
        let ui = ScriptedUi::new().text(None);
        let ctx = fixture.ctx(&ui);
        let tree = ctx.tree(fixture.document).unwrap();
        let result = plan_publisher_parameters(&ctx, PublisherKind::Before, method(&tree, "Calc"));
        assert_eq!(result, Err(RefactorError::Cancelled));

        let ui = ScriptedUi::new().text(Some("Result")).pick(None);
        let ctx = fixture.ctx(&ui);
        let result = plan_publisher_parameters(&ctx, PublisherKind::Before, method(&tree, "Calc"));
        assert_eq!(result, Err(RefactorError::Cancelled));
    }

    #[test]
    fn test_after_with_exit_variable() {
        let source = "codeunit 50100 Pricing
{
    procedure Price(Qty: Integer): Decimal
    var
        Total: Decimal;
    begin
        Total := Qty * 2;
        exit(Total);
    end;
}
";
        let fixture = Fixture::new(source);
        let ctx = fixture.ctx(&SuppressedUi);
        let tree = ctx.tree(fixture.document).unwrap();
        let plan = plan_publisher_parameters(&ctx, PublisherKind::After, method(&tree, "Price")).unwrap();
        assert_eq!(plan.return_name, None);
        assert_eq!(names(&plan), vec!["Total", "Qty"]);
        assert_eq!(plan.parameters[0].reason, "used in exit statement (local variable)");
        assert!(plan.parameters[0].variable.is_var);

        let change = add_publisher(&ctx, fixture.document, method(&tree, "Price"), PublisherKind::After).unwrap();
        expect![[r#"
            codeunit 50100 Pricing
            {
                procedure Price(Qty: Integer): Decimal
                var
                    Total: Decimal;
                begin
                    Total := Qty * 2;
                    OnAfterPrice(Total, Qty);
                    exit(Total);
                end;

                [IntegrationEvent(false, false)]
                local procedure OnAfterPrice(var Total: Decimal; Qty: Integer)
                begin
                end;
            }
        "#]]
        .assert_eq(&apply_edits(fixture.source(), change.edits_for(fixture.document)).unwrap());
    }

    #[test]
    fn test_after_ignores_exits_before_the_last_statement() {
        let source = "codeunit 50100 Pricing
{
    procedure Price(A: Decimal; B: Decimal; C: Boolean): Decimal
    begin
        exit(A);
        if C then
            exit(B);
        Foo();
    end;
}
";
        let fixture = Fixture::new(source);
        let ctx = fixture.ctx(&SuppressedUi);
        let tree = ctx.tree(fixture.document).unwrap();
        let plan = plan_publisher_parameters(&ctx, PublisherKind::After, method(&tree, "Price")).unwrap();
        assert_eq!(names(&plan), vec!["A", "B", "C"]);
        assert!(plan.parameters.iter().all(|p| p.reason == "parameter"));
    }

    #[test]
    fn test_add_before_publisher_names_return_and_declares_is_handled() {
        let source = "codeunit 50100 Pricing
{
    procedure Price(Qty: Integer): Decimal
    begin
        exit(Qty * 2);
    end;
}
";
        let fixture = Fixture::new(source);
        let ctx = fixture.ctx(&SuppressedUi);
        let tree = ctx.tree(fixture.document).unwrap();
        let change = add_publisher(&ctx, fixture.document, method(&tree, "Price"), PublisherKind::Before).unwrap();
        expect![[r#"
            codeunit 50100 Pricing
            {
                procedure Price(Qty: Integer) ReturnValue: Decimal
                var
                    IsHandled: Boolean;
                begin
                    IsHandled := false;
                    OnBeforePrice(IsHandled, ReturnValue, Qty);
                    if IsHandled then exit;
                    exit(Qty * 2);
                end;

                [IntegrationEvent(false, false)]
                local procedure OnBeforePrice(var IsHandled: Boolean; var ReturnValue: Decimal; Qty: Integer)
                begin
                end;
            }
        "#]]
        .assert_eq(&apply_edits(fixture.source(), change.edits_for(fixture.document)).unwrap());
    }

    #[test]
    fn test_var_parameters_only_promotes_everything() {
        let mut fixture = Fixture::new(TABLE);
        fixture.config.publisher_has_var_parameters_only = true;
        let ctx = fixture.ctx(&SuppressedUi);
        let tree = ctx.tree(fixture.document).unwrap();
        let plan = plan_publisher_parameters(&ctx, PublisherKind::Before, method(&tree, "Calc")).unwrap();
        assert!(plan.parameters.iter().all(|p| p.variable.is_var));
    }
}
