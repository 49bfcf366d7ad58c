//! Statement parsing for AL.
//!
//! Supported statements:
//! - Assignment: `x := expr;` and compound `x += expr;`
//! - Expression statement: `Foo();`
//! - `begin ... end` blocks
//! - if/then/else, case/of/else/end
//! - while/do, repeat/until, for/to/downto/do, foreach/in/do, with/do
//! - `exit;` and `exit(expr);`
//! - Empty statement: `;`

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::Parser;

impl Parser<'_, '_> {
    /// Parse a procedure or trigger body. The trailing `;` belongs to the member.
    pub(crate) fn parse_block(&mut self) {
        self.start_node(SyntaxKind::Block);
        self.bump(); // begin
        self.parse_statement_list(&[TokenKind::KwEnd]);
        self.expect(TokenKind::KwEnd, "expected 'end'");
        self.finish_node();
    }

    /// Returns `true` when a statement list must stop to let the member list recover.
    fn at_member_start(&self) -> bool {
        matches!(
            self.current(),
            TokenKind::KwProcedure
                | TokenKind::KwTrigger
                | TokenKind::KwLocal
                | TokenKind::KwInternal
                | TokenKind::KwProtected
                | TokenKind::KwVar
                | TokenKind::RBrace
        )
    }

    fn parse_statement_list(&mut self, terminators: &[TokenKind]) {
        while !self.at_end() && !self.at_any(terminators) && !self.at_member_start() {
            self.parse_statement();
        }
    }

    /// Parse a single statement, including its `;` separator when present.
    pub(crate) fn parse_statement(&mut self) {
        match self.current() {
            TokenKind::KwBegin => {
                self.start_node(SyntaxKind::Block);
                self.bump();
                self.parse_statement_list(&[TokenKind::KwEnd]);
                self.expect(TokenKind::KwEnd, "expected 'end'");
                self.eat_statement_separator();
                self.finish_node();
            }
            TokenKind::KwIf => self.parse_if_stmt(),
            TokenKind::KwCase => self.parse_case_stmt(),
            TokenKind::KwWhile => {
                self.parse_loop_stmt(SyntaxKind::WhileStatement, TokenKind::KwDo);
            }
            TokenKind::KwWith => {
                self.parse_loop_stmt(SyntaxKind::WithStatement, TokenKind::KwDo);
            }
            TokenKind::KwRepeat => self.parse_repeat_stmt(),
            TokenKind::KwFor => self.parse_for_stmt(),
            TokenKind::KwForEach => self.parse_foreach_stmt(),
            TokenKind::KwExit => self.parse_exit_stmt(),
            TokenKind::Semicolon => {
                self.start_node(SyntaxKind::EmptyStatement);
                self.bump();
                self.finish_node();
            }
            kind if kind.can_start_expr() => self.parse_assign_or_call_stmt(),
            _ => {
                self.error("expected statement");
                self.bump();
            }
        }
    }

    /// Parse the statement controlled by `then`, `do`, `else` or a case label.
    fn parse_embedded_statement(&mut self) {
        if self.at_end()
            || self.at_any(&[TokenKind::KwElse, TokenKind::KwEnd, TokenKind::KwUntil])
            || self.at_member_start()
        {
            return;
        }
        self.parse_statement();
    }

    /// Parse `if cond then stmt [else stmt]`.
    fn parse_if_stmt(&mut self) {
        self.start_node(SyntaxKind::IfStatement);
        self.bump(); // if

        self.parse_expression();
        self.expect(TokenKind::KwThen, "expected 'then'");
        self.parse_embedded_statement();

        if self.at(TokenKind::KwElse) {
            self.start_node(SyntaxKind::ElseClause);
            self.bump();
            self.parse_embedded_statement();
            self.finish_node();
        }

        self.finish_node();
    }

    /// Parse `case expr of lines [else stmts] end`.
    fn parse_case_stmt(&mut self) {
        self.start_node(SyntaxKind::CaseStatement);
        self.bump(); // case

        self.parse_expression();
        self.expect(TokenKind::KwOf, "expected 'of'");

        while !self.at_end()
            && !self.at_any(&[TokenKind::KwEnd, TokenKind::KwElse, TokenKind::KwUntil])
            && !self.at_member_start()
        {
            self.start_node(SyntaxKind::CaseLine);
            self.parse_expression();
            while self.eat(TokenKind::Comma) {
                self.parse_expression();
            }
            self.expect(TokenKind::Colon, "expected ':'");
            self.parse_embedded_statement();
            self.finish_node();
        }

        if self.at(TokenKind::KwElse) {
            self.start_node(SyntaxKind::CaseElse);
            self.bump();
            self.parse_statement_list(&[TokenKind::KwEnd]);
            self.finish_node();
        }

        self.expect(TokenKind::KwEnd, "expected 'end'");
        self.eat_statement_separator();
        self.finish_node();
    }

    /// Parse `while cond do stmt` and `with rec do stmt`.
    fn parse_loop_stmt(&mut self, kind: SyntaxKind, keyword: TokenKind) {
        self.start_node(kind);
        self.bump();
        self.parse_expression();
        self.expect(keyword, "expected 'do'");
        self.parse_embedded_statement();
        self.finish_node();
    }

    /// Parse `repeat stmts until cond`.
    fn parse_repeat_stmt(&mut self) {
        self.start_node(SyntaxKind::RepeatStatement);
        self.bump(); // repeat

        self.parse_statement_list(&[TokenKind::KwUntil]);

        if self.expect(TokenKind::KwUntil, "expected 'until'") {
            self.parse_expression();
        }
        self.eat_statement_separator();

        self.finish_node();
    }

    /// Parse `for i := a to|downto b do stmt`.
    fn parse_for_stmt(&mut self) {
        self.start_node(SyntaxKind::ForStatement);
        self.bump(); // for

        self.parse_expression();
        if self.expect(TokenKind::Assign, "expected ':='") {
            self.parse_expression();
        }
        if self.at_any(&[TokenKind::KwTo, TokenKind::KwDownTo]) {
            self.bump();
            self.parse_expression();
        } else {
            self.error("expected 'to' or 'downto'");
        }
        self.expect(TokenKind::KwDo, "expected 'do'");
        self.parse_embedded_statement();

        self.finish_node();
    }

    /// Parse `foreach x in list do stmt`.
    fn parse_foreach_stmt(&mut self) {
        self.start_node(SyntaxKind::ForEachStatement);
        self.bump(); // foreach

        self.parse_expression_no_in();
        if self.expect(TokenKind::KwIn, "expected 'in'") {
            self.parse_expression();
        }
        self.expect(TokenKind::KwDo, "expected 'do'");
        self.parse_embedded_statement();

        self.finish_node();
    }

    /// Parse `exit;` or `exit(expr);`.
    fn parse_exit_stmt(&mut self) {
        self.start_node(SyntaxKind::ExitStatement);
        self.bump(); // exit

        if self.eat(TokenKind::LParen) {
            if !self.at(TokenKind::RParen) {
                self.parse_expression();
            }
            self.expect(TokenKind::RParen, "expected ')'");
        }
        self.eat_statement_separator();

        self.finish_node();
    }

    /// Parse assignment, compound assignment or call statement.
    fn parse_assign_or_call_stmt(&mut self) {
        let marker = self.start();

        self.parse_expression();

        let kind = if self.eat(TokenKind::Assign) {
            self.parse_expression();
            SyntaxKind::AssignmentStatement
        } else if self.current().is_assignment_op() {
            self.bump();
            self.parse_expression();
            SyntaxKind::CompoundAssignmentStatement
        } else {
            SyntaxKind::ExpressionStatement
        };

        self.eat_statement_separator();
        marker.complete(self, kind);
    }
}
