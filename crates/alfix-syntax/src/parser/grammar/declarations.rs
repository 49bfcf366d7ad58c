//! Declaration parsing for AL.
//!
//! Handles:
//! - Member attributes: `[EventSubscriber(...)]`
//! - Var sections with single (`a: Integer;`) and list (`a, b: Decimal;`) declarations
//! - Parameter lists and return values
//! - Type references, kept as the rendered source text of the type

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::Parser;

/// Type words that are followed by the name or number of an object.
const OBJECT_TYPE_WORDS: &[&str] = &[
    "record",
    "codeunit",
    "page",
    "report",
    "query",
    "xmlport",
    "enum",
    "interface",
    "dotnet",
    "testpage",
    "testrequestpage",
];

impl Parser<'_, '_> {
    /// Parse zero or more `[...]` attributes.
    pub(crate) fn parse_attributes(&mut self) {
        while self.at(TokenKind::LBracket) {
            self.start_node(SyntaxKind::MemberAttribute);
            self.bump_balanced();
            self.finish_node();
        }
    }

    /// Returns `true` if the upcoming tokens are (attributes followed by) a
    /// variable declaration rather than the attributes of the next member.
    fn at_variable_declaration(&self) -> bool {
        let mut n = 0;
        while self.peek_kind_n(n) == TokenKind::LBracket {
            n = self.source.skip_balanced_from(n);
        }
        self.peek_kind_n(n).is_name()
            && matches!(
                self.peek_kind_n(n + 1),
                TokenKind::Colon | TokenKind::Comma
            )
    }

    /// Parse a `var` section (`kind` is `VarSection` or `GlobalVarSection`).
    pub(crate) fn parse_var_section(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.eat(TokenKind::KwProtected);
        self.bump(); // var

        while self.at_variable_declaration() {
            self.parse_variable_declaration();
        }

        self.finish_node();
    }

    fn parse_variable_declaration(&mut self) {
        let marker = self.start();
        self.parse_attributes();

        let kind = if self.peek_kind_n(1) == TokenKind::Comma {
            loop {
                self.start_node(SyntaxKind::VariableDeclarationName);
                self.parse_name();
                self.finish_node();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
                if !self.current().is_name() {
                    self.error("expected variable name");
                    break;
                }
            }
            SyntaxKind::VariableListDeclaration
        } else {
            self.parse_name();
            SyntaxKind::VariableDeclaration
        };

        if self.expect(TokenKind::Colon, "expected ':'") {
            self.parse_type_reference();
        }
        self.expect(TokenKind::Semicolon, "expected ';'");

        marker.complete(self, kind);
    }

    /// Parse `(a: Integer; var b: Record Customer)`.
    pub(crate) fn parse_parameter_list(&mut self) {
        self.start_node(SyntaxKind::ParameterList);
        self.bump(); // (

        while !self.at(TokenKind::RParen) && !self.at_end() {
            if !self.at(TokenKind::KwVar) && !self.current().is_name() {
                self.error("expected parameter");
                break;
            }
            self.parse_parameter();
            if !self.eat(TokenKind::Semicolon) {
                break;
            }
        }

        self.expect(TokenKind::RParen, "expected ')'");
        self.finish_node();
    }

    fn parse_parameter(&mut self) {
        self.start_node(SyntaxKind::Parameter);
        self.eat(TokenKind::KwVar);

        if self.current().is_name() {
            self.parse_name();
        } else {
            self.error("expected parameter name");
        }

        if self.expect(TokenKind::Colon, "expected ':'") {
            self.parse_type_reference();
        }

        self.finish_node();
    }

    /// Parse `: Type` or `Name: Type` after a parameter list.
    pub(crate) fn parse_return_value(&mut self) {
        self.start_node(SyntaxKind::ReturnValue);
        if self.current().is_name() {
            self.parse_name();
        }
        self.bump(); // :
        self.parse_type_reference();
        self.finish_node();
    }

    /// Parse a type into a `TypeReference` node.
    pub(crate) fn parse_type_reference(&mut self) {
        self.start_node(SyntaxKind::TypeReference);
        self.parse_type_tokens();
        self.finish_node();
    }

    fn parse_type_tokens(&mut self) {
        if !self.current().is_name() {
            self.error("expected type");
            return;
        }

        let word = self.current_text().to_ascii_lowercase();
        self.bump();

        // Code[20], Text[100], array[10]
        if self.at(TokenKind::LBracket) {
            self.bump_balanced();
        }

        match word.as_str() {
            "array" => {
                if self.eat(TokenKind::KwOf) {
                    self.parse_type_tokens();
                }
            }
            "list" | "dictionary" => {
                if self.eat(TokenKind::KwOf) && self.at(TokenKind::LBracket) {
                    self.bump_balanced();
                }
            }
            // Label 'Text', Comment = '...', Locked = true
            // Option A,"B C",D
            "label" | "textconst" | "option" => {
                self.bump_until(&[TokenKind::Semicolon]);
            }
            _ if OBJECT_TYPE_WORDS.contains(&word.as_str()) => {
                if self.current().is_name() || self.at(TokenKind::IntLiteral) {
                    self.bump();
                }
                if self.at_contextual("temporary") {
                    self.bump();
                }
                if self.at_contextual("securityfiltering") {
                    self.bump();
                    if self.at(TokenKind::LParen) {
                        self.bump_balanced();
                    }
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::syntax::{SyntaxKind, SyntaxTree};

    fn type_texts(source: &str) -> Vec<String> {
        let tree = SyntaxTree::parse(source);
        assert!(tree.ok(), "errors: {:?}", tree.errors());
        tree.root()
            .collect_descendants(&[SyntaxKind::TypeReference], true)
            .iter()
            .map(|t| t.text().to_string())
            .collect()
    }

    #[test]
    fn test_type_reference_shapes() {
        let types = type_texts(
            r#"codeunit 1 X
{
    var
        Cust: Record Customer temporary;
        Header: Record "Sales Header";
        No: Code[20];
        Names: array[10] of Text[30];
        Map: Dictionary of [Code[20], Decimal];
        Status: Option Open,"In Progress",Closed;
        Greeting: Label 'Hello %1', Comment = '%1 = Name', Locked = true;
        Mgt: Codeunit 80;
}"#,
        );
        assert_eq!(
            types,
            [
                "Record Customer temporary",
                "Record \"Sales Header\"",
                "Code[20]",
                "array[10] of Text[30]",
                "Dictionary of [Code[20], Decimal]",
                "Option Open,\"In Progress\",Closed",
                "Label 'Hello %1', Comment = '%1 = Name', Locked = true",
                "Codeunit 80",
            ]
        );
    }

    #[test]
    fn test_variable_list_declaration() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure P()
    var
        [NonDebuggable]
        a, b: Decimal;
    begin
    end;
}",
        );
        assert!(tree.ok(), "errors: {:?}", tree.errors());
        let list = tree
            .root()
            .collect_descendants(&[SyntaxKind::VariableListDeclaration], true);
        assert_eq!(list.len(), 1);
        let names: Vec<_> = list[0]
            .children_of_kind(SyntaxKind::VariableDeclarationName)
            .map(|n| n.name().unwrap_or_default())
            .collect();
        assert_eq!(names, ["a", "b"]);
        assert!(list[0].first_child_of_kind(SyntaxKind::MemberAttribute).is_some());
    }

    #[test]
    fn test_global_var_section_stops_before_attributed_procedure() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    var
        Counter: Integer;

    [EventSubscriber(ObjectType::Table, Database::Customer, 'OnAfterInsertEvent', '', false, false)]
    local procedure OnAfterInsertCustomer(var Rec: Record Customer)
    begin
    end;
}",
        );
        assert!(tree.ok(), "errors: {:?}", tree.errors());
        let section = tree
            .root()
            .collect_descendants(&[SyntaxKind::GlobalVarSection], true);
        assert_eq!(section[0].text(), "var\n        Counter: Integer;");
        let method = tree
            .root()
            .collect_descendants(&[SyntaxKind::MethodDeclaration], true);
        assert!(method[0].first_child_of_kind(SyntaxKind::MemberAttribute).is_some());
    }

    #[test]
    fn test_parameters_and_return_values() {
        let tree = SyntaxTree::parse(
            r"codeunit 1 X
{
    procedure A(var Cust: Record Customer; Qty: Decimal): Boolean
    begin
    end;

    procedure B() Result: Text[50]
    begin
    end;
}",
        );
        assert!(tree.ok(), "errors: {:?}", tree.errors());
        let methods = tree
            .root()
            .collect_descendants(&[SyntaxKind::MethodDeclaration], true);
        let params = methods[0]
            .first_child_of_kind(SyntaxKind::ParameterList)
            .unwrap();
        assert_eq!(params.children_of_kind(SyntaxKind::Parameter).count(), 2);
        let ret_a = methods[0].first_child_of_kind(SyntaxKind::ReturnValue).unwrap();
        assert_eq!(ret_a.name(), None);
        assert_eq!(ret_a.text(), ": Boolean");
        let ret_b = methods[1].first_child_of_kind(SyntaxKind::ReturnValue).unwrap();
        assert_eq!(ret_b.name(), Some("Result"));
        assert_eq!(ret_b.text(), "Result: Text[50]");
    }
}
