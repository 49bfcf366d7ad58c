//! Call-site to declaration matching.
//!
//! A call with more arguments than any same-named procedure has parameters
//! is matched against each candidate: the leading arguments are compared
//! with the existing parameters, the remaining ones become the parameters
//! to add.

use alfix_syntax::{NodeId, SyntaxTree};

use crate::config::RefactorConfig;
use crate::method_type::classify;
use crate::scope::parameters;
use crate::text::unique_name;
use crate::variable::{CallArgument, Variable};

/// Short types that are assignment compatible with each other.
const TEXT_TYPES: &[&str] = &["code", "text"];
const NUMBER_TYPES: &[&str] = &["integer", "decimal", "enum", "option"];

/// Outcome of matching a call against its candidates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadMatch {
    /// The chosen procedure.
    pub method: NodeId,
    /// Parameters to append, one per surplus argument.
    pub missing_parameters: Vec<Variable>,
    /// The chosen procedure is an event publisher.
    pub is_publisher: bool,
}

/// How well the existing parameters fit the leading arguments.
///
/// Fields are compared in declaration order, so one more exact match
/// outweighs any number of weaker ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct MatchScore {
    /// Parameters whose type text equals the argument type.
    pub exact: u32,
    /// Parameters with the same short type.
    pub same_base_type: u32,
    /// Parameters the argument can be assigned to.
    pub valid_assignment: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tier {
    Exact,
    SameBaseType,
    ValidAssignment,
}

fn in_group(group: &[&str], short: &str) -> bool {
    group.iter().any(|t| t.eq_ignore_ascii_case(short))
}

fn tier(parameter: &Variable, argument: &CallArgument) -> Option<Tier> {
    if parameter.is_var && !argument.assignable {
        return None;
    }
    let (param_short, arg_short) = (parameter.type_short(), argument.variable.type_short());
    if parameter.type_name.trim().eq_ignore_ascii_case(argument.variable.type_name.trim()) {
        Some(Tier::Exact)
    } else if param_short.eq_ignore_ascii_case(arg_short) {
        Some(Tier::SameBaseType)
    } else if (in_group(TEXT_TYPES, param_short) && in_group(TEXT_TYPES, arg_short))
        || (in_group(NUMBER_TYPES, param_short) && in_group(NUMBER_TYPES, arg_short))
    {
        Some(Tier::ValidAssignment)
    } else {
        None
    }
}

/// Scores `params` against the leading `arguments`.
///
/// Returns `None` when a parameter does not accept its argument, or when
/// `exact_only` is set and a type differs.
#[must_use]
pub fn score(params: &[Variable], arguments: &[CallArgument], exact_only: bool) -> Option<MatchScore> {
    let mut score = MatchScore::default();
    for (parameter, argument) in params.iter().zip(arguments) {
        match tier(parameter, argument)? {
            Tier::Exact => score.exact += 1,
            Tier::SameBaseType if !exact_only => score.same_base_type += 1,
            Tier::ValidAssignment if !exact_only => score.valid_assignment += 1,
            _ => return None,
        }
    }
    Some(score)
}

/// Picks the procedure a call most likely meant to reach.
///
/// Among equally scored candidates the last one wins.
#[must_use]
pub fn find_best_overload(
    tree: &SyntaxTree,
    candidates: &[NodeId],
    arguments: &[CallArgument],
    config: &RefactorConfig,
) -> Option<OverloadMatch> {
    find_overload(tree, candidates, arguments, config, false)
}

/// Like [`find_best_overload`], but every existing parameter must have
/// exactly the type of its argument. Used for calls on another object.
#[must_use]
pub fn find_exact_overload(
    tree: &SyntaxTree,
    candidates: &[NodeId],
    arguments: &[CallArgument],
    config: &RefactorConfig,
) -> Option<OverloadMatch> {
    find_overload(tree, candidates, arguments, config, true)
}

fn find_overload(
    tree: &SyntaxTree,
    candidates: &[NodeId],
    arguments: &[CallArgument],
    config: &RefactorConfig,
    exact_only: bool,
) -> Option<OverloadMatch> {
    let (method, params, _) = candidates
        .iter()
        .filter_map(|&id| {
            let params = parameters(tree.get(id)?);
            if params.len() >= arguments.len() {
                return None;
            }
            let fit = score(&params, arguments, exact_only)?;
            Some((id, params, fit))
        })
        .max_by_key(|(_, _, fit)| *fit)?;

    let is_publisher = classify(tree.node(method)).is_event_publisher();
    let promote = is_publisher && config.publisher_has_var_parameters_only;

    let mut taken: Vec<String> = params.iter().map(|p| p.name.to_string()).collect();
    let missing_parameters = arguments[params.len()..]
        .iter()
        .map(|argument| {
            let name = unique_name(&argument.variable.name, |candidate| {
                taken.iter().any(|t| alfix_syntax::names_equal(t, candidate))
            });
            taken.push(name.clone());
            let mut parameter = Variable::new(name, argument.variable.type_name.clone());
            parameter.is_var = promote && parameter.can_be_var();
            parameter
        })
        .collect();

    tracing::debug!(
        method = ?tree.node(method).name(),
        is_publisher,
        "matched call to existing procedure"
    );

    Some(OverloadMatch {
        method,
        missing_parameters,
        is_publisher,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use alfix_syntax::{SyntaxKind, SyntaxNode};

    fn arg(name: &str, type_name: &str) -> CallArgument {
        CallArgument {
            variable: Variable::new(name, type_name),
            expression: name.to_string(),
            assignable: true,
        }
    }

    fn literal(type_name: &str) -> CallArgument {
        CallArgument {
            variable: Variable::new(format!("{type_name}Value"), type_name),
            expression: "1".to_string(),
            assignable: false,
        }
    }

    fn methods(tree: &SyntaxTree) -> Vec<SyntaxNode<'_>> {
        tree.root()
            .collect_descendants(&[SyntaxKind::MethodDeclaration], true)
    }

    fn ids(tree: &SyntaxTree) -> Vec<NodeId> {
        methods(tree).iter().map(SyntaxNode::id).collect()
    }

    #[test]
    fn test_exact_matches_outrank_weaker_tiers() {
        let exact_two = MatchScore {
            exact: 2,
            ..MatchScore::default()
        };
        let mixed = MatchScore {
            exact: 1,
            same_base_type: 1,
            valid_assignment: 0,
        };
        assert!(exact_two > mixed);

        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure Calc(A: Code[20]; B: Integer)
    begin
    end;

    procedure Calc(A: Code[10]; B: Decimal)
    begin
    end;
}",
        );
        let args = [arg("No", "Code[20]"), arg("Qty", "Integer"), arg("Flag", "Boolean")];
        let found = find_best_overload(&tree, &ids(&tree), &args, &RefactorConfig::default()).unwrap();
        assert_eq!(found.method, ids(&tree)[0]);
        assert_eq!(found.missing_parameters, [Variable::new("Flag", "Boolean")]);
        assert!(!found.is_publisher);
    }

    #[test]
    fn test_parameter_count_boundary() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure Calc(A: Integer; B: Integer)
    begin
    end;
}",
        );
        let config = RefactorConfig::default();
        let two = [arg("A", "Integer"), arg("B", "Integer")];
        assert!(find_best_overload(&tree, &ids(&tree), &two, &config).is_none());
        let three = [arg("A", "Integer"), arg("B", "Integer"), arg("C", "Integer")];
        let found = find_best_overload(&tree, &ids(&tree), &three, &config).unwrap();
        assert_eq!(found.missing_parameters.len(), 1);
    }

    #[test]
    fn test_var_parameter_rejects_literal() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure Calc(var A: Integer)
    begin
    end;
}",
        );
        let args = [literal("Integer"), literal("Text")];
        assert!(find_best_overload(&tree, &ids(&tree), &args, &RefactorConfig::default()).is_none());
    }

    #[test]
    fn test_incompatible_parameter_invalidates_candidate() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure Calc(A: Boolean)
    begin
    end;
}",
        );
        let args = [arg("A", "Text"), arg("B", "Text")];
        assert!(find_best_overload(&tree, &ids(&tree), &args, &RefactorConfig::default()).is_none());
    }

    #[test]
    fn test_equal_scores_pick_last_candidate() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure Calc(A: Text)
    begin
    end;

    procedure Calc(A: Text[30])
    begin
    end;
}",
        );
        let args = [arg("Name", "Text[50]"), arg("Qty", "Integer")];
        let found = find_best_overload(&tree, &ids(&tree), &args, &RefactorConfig::default()).unwrap();
        assert_eq!(found.method, ids(&tree)[1]);
    }

    #[test]
    fn test_exact_variant_requires_identical_types() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure Calc(A: Code[20])
    begin
    end;
}",
        );
        let config = RefactorConfig::default();
        let close = [arg("A", "Code[10]"), arg("B", "Integer")];
        assert!(find_exact_overload(&tree, &ids(&tree), &close, &config).is_none());
        let exact = [arg("A", "code[20]"), arg("B", "Integer")];
        assert!(find_exact_overload(&tree, &ids(&tree), &exact, &config).is_some());
    }

    #[test]
    fn test_missing_names_are_unique_and_publishers_promote() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    [IntegrationEvent(false, false)]
    local procedure OnBeforeRun(Qty: Integer)
    begin
    end;
}",
        );
        let config = RefactorConfig {
            publisher_has_var_parameters_only: true,
            ..RefactorConfig::default()
        };
        let args = [
            arg("Qty", "Integer"),
            arg("Qty", "Decimal"),
            arg("Caption", "Label 'x'"),
        ];
        let found = find_best_overload(&tree, &ids(&tree), &args, &config).unwrap();
        assert!(found.is_publisher);
        let rendered: Vec<_> = found
            .missing_parameters
            .iter()
            .map(Variable::declaration_text)
            .collect();
        assert_eq!(rendered, ["var Qty2: Decimal", "Caption: Label 'x'"]);
    }
}
