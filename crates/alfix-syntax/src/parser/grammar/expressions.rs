//! Expression parsing for AL using Pratt parsing.
//!
//! Precedence levels, lowest first:
//! 1. Range (`..`)
//! 2. Relational (`=`, `<>`, `<`, `<=`, `>`, `>=`, `in`)
//! 3. Additive (`+`, `-`, `or`, `xor`)
//! 4. Multiplicative (`*`, `/`, `div`, `mod`, `and`)
//! 5. Unary (`not`, `-`, `+`)
//! 6. Postfix (`.member`, `::value`, `(args)`, `[index]`)

use crate::lexer::TokenKind;
use crate::syntax::SyntaxKind;

use super::super::{CompletedMarker, Parser};

impl Parser<'_, '_> {
    /// Parse an expression.
    pub(crate) fn parse_expression(&mut self) {
        self.parse_expr_bp(0, true);
    }

    /// Parse an expression in which `in` is not an operator (`foreach x in ...`).
    pub(crate) fn parse_expression_no_in(&mut self) {
        self.parse_expr_bp(0, false);
    }

    /// Parse an expression with minimum binding power.
    fn parse_expr_bp(&mut self, min_bp: u8, allow_in: bool) -> Option<CompletedMarker> {
        let mut lhs = if let Some(r_bp) = self.current().prefix_binding_power() {
            let marker = self.start();
            self.bump();
            self.parse_expr_bp(r_bp, allow_in);
            marker.complete(self, SyntaxKind::UnaryExpression)
        } else {
            let primary = self.parse_primary_expr()?;
            self.parse_postfix_expr(primary)
        };

        loop {
            let op = self.current();
            if op == TokenKind::KwIn && !allow_in {
                break;
            }
            let Some((l_bp, r_bp)) = op.infix_binding_power() else {
                break;
            };
            if l_bp < min_bp {
                break;
            }

            let marker = lhs.precede(self);
            self.bump();
            self.parse_expr_bp(r_bp, allow_in);

            let kind = if op == TokenKind::DotDot {
                SyntaxKind::RangeExpression
            } else {
                SyntaxKind::BinaryExpression
            };
            lhs = marker.complete(self, kind);
        }

        Some(lhs)
    }

    /// Parse member access, option access, calls and indexing.
    fn parse_postfix_expr(&mut self, mut lhs: CompletedMarker) -> CompletedMarker {
        loop {
            lhs = match self.current() {
                TokenKind::Dot => {
                    let marker = lhs.precede(self);
                    self.bump();
                    if self.current().is_name() || self.current().is_keyword() {
                        self.parse_name();
                    } else {
                        self.error("expected member name");
                    }
                    marker.complete(self, SyntaxKind::MemberAccessExpression)
                }
                TokenKind::ColonColon => {
                    let marker = lhs.precede(self);
                    self.bump();
                    if self.current().is_name() || self.current().is_keyword() {
                        self.parse_name();
                    } else {
                        self.error("expected option value");
                    }
                    marker.complete(self, SyntaxKind::OptionAccessExpression)
                }
                TokenKind::LParen => {
                    let marker = lhs.precede(self);
                    self.parse_argument_list(TokenKind::RParen, "expected ')'");
                    marker.complete(self, SyntaxKind::InvocationExpression)
                }
                TokenKind::LBracket => {
                    let marker = lhs.precede(self);
                    self.parse_argument_list(TokenKind::RBracket, "expected ']'");
                    marker.complete(self, SyntaxKind::ElementAccessExpression)
                }
                _ => break,
            };
        }
        lhs
    }

    /// Parse `(a, b)` or `[i, j]` into an `ArgumentList` node.
    fn parse_argument_list(&mut self, close: TokenKind, message: &str) {
        self.start_node(SyntaxKind::ArgumentList);
        self.bump(); // ( or [

        if !self.at(close) {
            loop {
                self.parse_expression();
                if !self.eat(TokenKind::Comma) {
                    break;
                }
            }
        }

        self.expect(close, message);
        self.finish_node();
    }

    /// Parse a primary expression: literal, name, parenthesized expression or set.
    fn parse_primary_expr(&mut self) -> Option<CompletedMarker> {
        let kind = self.current();

        if kind.is_literal() {
            let marker = self.start();
            self.bump();
            return Some(marker.complete(self, SyntaxKind::LiteralExpression));
        }

        if kind.is_name() {
            let marker = self.start();
            self.bump();
            return Some(marker.complete(self, SyntaxKind::IdentifierName));
        }

        match kind {
            TokenKind::LParen => {
                let marker = self.start();
                self.bump();
                self.parse_expression();
                self.expect(TokenKind::RParen, "expected ')'");
                Some(marker.complete(self, SyntaxKind::ParenthesizedExpression))
            }
            TokenKind::LBracket => {
                let marker = self.start();
                self.bump();
                if !self.at(TokenKind::RBracket) {
                    loop {
                        self.parse_expression();
                        if !self.eat(TokenKind::Comma) {
                            break;
                        }
                    }
                }
                self.expect(TokenKind::RBracket, "expected ']'");
                Some(marker.complete(self, SyntaxKind::SetExpression))
            }
            _ => {
                self.error("expected expression");
                let stops = [
                    TokenKind::KwThen,
                    TokenKind::KwDo,
                    TokenKind::KwOf,
                    TokenKind::KwElse,
                    TokenKind::KwTo,
                    TokenKind::KwDownTo,
                    TokenKind::RParen,
                    TokenKind::RBracket,
                    TokenKind::Comma,
                    TokenKind::Colon,
                ];
                if !self.at_end() && !self.is_sync_point() && !self.at_any(&stops) {
                    self.bump();
                }
                None
            }
        }
    }
}
