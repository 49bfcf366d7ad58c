//! Object-level parsing for AL.
//!
//! Handles:
//! - `namespace` / `using` directives
//! - Object headers: `codeunit 50100 "Name" extends Base implements IFoo`
//! - Member lists: properties, generic sections (`field(...) { }`, `layout { }`),
//!   global var sections, procedures and triggers

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::Parser;

impl Parser<'_, '_> {
    pub(crate) fn at_object_keyword(&self) -> bool {
        self.at(TokenKind::Ident) && SyntaxKind::object_from_keyword(self.current_text()).is_some()
    }

    /// Parse a `namespace X.Y;` or `using X.Y;` line.
    pub(crate) fn parse_directive_like(&mut self, kind: SyntaxKind) {
        self.start_node(kind);
        self.bump();
        self.bump_until(&[TokenKind::Semicolon]);
        self.expect(TokenKind::Semicolon, "expected ';'");
        self.finish_node();
    }

    /// Parse an application object.
    pub(crate) fn parse_object(&mut self) {
        let kind = SyntaxKind::object_from_keyword(self.current_text())
            .unwrap_or(SyntaxKind::UnknownObject);
        self.start_node(kind);
        self.bump(); // object keyword

        if self.at(TokenKind::IntLiteral) {
            self.start_node(SyntaxKind::ObjectId);
            self.bump();
            self.finish_node();
        }

        if self.current().is_name() {
            self.parse_name();
        } else {
            self.error("expected object name");
        }

        if self.at(TokenKind::KwExtends) {
            self.start_node(SyntaxKind::ExtendsClause);
            self.bump();
            if self.current().is_name() {
                self.parse_name();
            } else {
                self.error("expected name of the extended object");
            }
            self.finish_node();
        }

        if self.at(TokenKind::KwImplements) {
            self.start_node(SyntaxKind::ImplementsClause);
            self.bump();
            loop {
                if self.current().is_name() {
                    self.parse_name();
                } else {
                    self.error("expected interface name");
                    break;
                }
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
            self.finish_node();
        }

        // Header words this grammar does not model (`customizes`, `Access`, ...).
        if !self.at(TokenKind::LBrace) && !self.at_end() {
            self.error("expected '{'");
            while !self.at(TokenKind::LBrace) && !self.at_end() && !self.at_object_keyword() {
                self.bump();
            }
        }

        self.parse_member_list();
        self.finish_node();
    }

    /// Parse `{ members }`.
    fn parse_member_list(&mut self) {
        if !self.eat(TokenKind::LBrace) {
            return;
        }

        while !self.at(TokenKind::RBrace) && !self.at_end() {
            self.parse_member();
        }

        self.expect(TokenKind::RBrace, "expected '}'");
    }

    fn parse_member(&mut self) {
        match self.current() {
            TokenKind::KwVar => self.parse_var_section(SyntaxKind::GlobalVarSection),
            TokenKind::KwProtected if self.peek_kind_n(1) == TokenKind::KwVar => {
                self.parse_var_section(SyntaxKind::GlobalVarSection);
            }
            TokenKind::LBracket
            | TokenKind::KwProcedure
            | TokenKind::KwTrigger
            | TokenKind::KwLocal
            | TokenKind::KwInternal
            | TokenKind::KwProtected => self.parse_method(),
            TokenKind::Semicolon => self.bump(),
            kind if kind.is_name() && self.peek_kind_n(1) == TokenKind::Eq => {
                self.parse_property();
            }
            TokenKind::Ident
                if matches!(self.peek_kind_n(1), TokenKind::LParen | TokenKind::LBrace) =>
            {
                self.parse_section();
            }
            _ => {
                self.error("expected member declaration");
                self.bump();
            }
        }
    }

    /// Parse `Name = value;`. The value is kept as raw tokens.
    fn parse_property(&mut self) {
        self.start_node(SyntaxKind::PropertyDeclaration);
        self.parse_name();
        self.bump(); // =
        self.bump_until(&[TokenKind::Semicolon]);
        self.expect(TokenKind::Semicolon, "expected ';'");
        self.finish_node();
    }

    /// Parse a generic section: `keyword(args) { members }` or `keyword(args);`.
    fn parse_section(&mut self) {
        self.start_node(SyntaxKind::SectionDeclaration);
        self.parse_name();

        if self.at(TokenKind::LParen) {
            self.start_node(SyntaxKind::SectionArguments);
            self.bump_balanced();
            self.finish_node();
        }

        if self.at(TokenKind::LBrace) {
            self.parse_member_list();
        } else {
            self.expect(TokenKind::Semicolon, "expected '{' or ';'");
        }

        self.finish_node();
    }

    /// Parse a procedure or trigger with its attributes.
    pub(crate) fn parse_method(&mut self) {
        let marker = self.start();
        self.parse_attributes();

        while self.current().is_access_modifier() {
            self.bump();
        }

        let kind = if self.eat(TokenKind::KwTrigger) {
            SyntaxKind::TriggerDeclaration
        } else if self.eat(TokenKind::KwProcedure) {
            SyntaxKind::MethodDeclaration
        } else {
            self.error("expected 'procedure' or 'trigger'");
            marker.complete(self, SyntaxKind::Error);
            return;
        };

        if self.current().is_name() {
            self.parse_name();
        } else {
            self.error("expected procedure name");
        }

        if self.at(TokenKind::LParen) {
            self.parse_parameter_list();
        } else {
            self.error("expected '('");
        }

        if self.at(TokenKind::Colon)
            || (self.current().is_name() && self.peek_kind_n(1) == TokenKind::Colon)
        {
            self.parse_return_value();
        }

        self.eat(TokenKind::Semicolon);

        if self.at(TokenKind::KwVar) {
            self.parse_var_section(SyntaxKind::VarSection);
        }

        if self.at(TokenKind::KwBegin) {
            self.parse_block();
            self.eat(TokenKind::Semicolon);
        }

        marker.complete(self, kind);
    }

    /// Parse a name into an `IdentifierName` node.
    pub(crate) fn parse_name(&mut self) {
        self.start_node(SyntaxKind::IdentifierName);
        self.bump();
        self.finish_node();
    }
}
