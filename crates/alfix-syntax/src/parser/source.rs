//! Token source for the parser.
//!
//! This module provides the `Source` struct that wraps a token stream
//! and provides lookahead and consumption operations over non-trivia tokens.

use crate::lexer::{Token, TokenKind};

/// A token source that provides tokens to the parser.
pub struct Source<'t, 'src> {
    tokens: &'t [Token],
    source: &'src str,
    cursor: usize,
}

impl<'t, 'src> Source<'t, 'src> {
    /// Creates a new source from tokens and source text.
    pub fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            tokens,
            source,
            cursor: 0,
        }
    }

    /// Returns the current token kind, or `Eof` if at end.
    pub fn current(&self) -> TokenKind {
        self.peek_kind_n(0)
    }

    /// Returns the current token, or `None` if at end.
    pub fn current_token(&self) -> Option<&Token> {
        self.peek_token_n(0)
    }

    /// Peeks at the nth non-trivia token ahead.
    pub fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.peek_token_n(n).map_or(TokenKind::Eof, |token| token.kind)
    }

    /// Peeks at the nth non-trivia token ahead and returns the token.
    pub fn peek_token_n(&self, n: usize) -> Option<&Token> {
        self.tokens[self.cursor..]
            .iter()
            .filter(|token| !token.kind.is_trivia())
            .nth(n)
    }

    /// Text of the nth non-trivia token ahead, empty at end of input.
    pub fn peek_text_n(&self, n: usize) -> &'src str {
        self.peek_token_n(n)
            .map_or("", |t| &self.source[usize::from(t.range.start())..usize::from(t.range.end())])
    }

    /// Advances past the current token.
    pub fn bump(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            self.cursor += 1;
            if !token.kind.is_trivia() {
                break;
            }
        }
    }

    /// Returns `true` if at end of input.
    pub fn at_end(&self) -> bool {
        self.peek_kind_n(0) == TokenKind::Eof
    }

    /// Returns the text of the current token.
    pub fn current_text(&self) -> &'src str {
        self.peek_text_n(0)
    }

    /// End offset of the last consumed token.
    pub fn previous_end(&self) -> Option<text_size::TextSize> {
        self.tokens[..self.cursor]
            .iter()
            .rev()
            .find(|token| !token.kind.is_trivia())
            .map(|token| token.range.end())
    }

    /// Given the lookahead distance of an opening bracket, returns the
    /// lookahead distance just past its matching closing bracket.
    pub fn skip_balanced_from(&self, open_at: usize) -> usize {
        let mut depth = 0u32;
        let mut n = open_at;
        loop {
            match self.peek_kind_n(n) {
                TokenKind::LBracket | TokenKind::LParen => depth += 1,
                TokenKind::RBracket | TokenKind::RParen => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return n + 1;
                    }
                }
                TokenKind::Eof => return n,
                _ => {}
            }
            n += 1;
        }
    }
}
