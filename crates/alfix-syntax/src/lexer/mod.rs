//! Lexer for AL.
//!
//! This module provides a lexer that tokenizes AL source code into a stream
//! of tokens with their positions in the source text. Every byte of the input
//! is covered by exactly one token; trivia is produced like any other token
//! and filtered by the parser.

mod tokens;

pub use tokens::TokenKind;

use logos::Logos;
use std::collections::VecDeque;
use text_size::{TextRange, TextSize};

/// A token produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The byte range of the token in the source text.
    pub range: TextRange,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    /// Returns the length of the token in bytes.
    #[must_use]
    pub fn len(&self) -> TextSize {
        self.range.len()
    }

    /// Returns true if the token has zero length.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }
}

/// Lexer for AL source code.
///
/// The lexer is an iterator over tokens. It handles all error recovery
/// internally - any unrecognized characters are returned as `TokenKind::Error`.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    pending: VecDeque<Token>,
}

impl<'src> Lexer<'src> {
    /// Creates a new lexer for the given source text.
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            pending: VecDeque::new(),
        }
    }

    /// Returns the source text being lexed.
    #[must_use]
    pub fn source(&self) -> &'src str {
        self.source
    }

    /// Returns the text of the current token.
    #[must_use]
    pub fn slice(&self) -> &'src str {
        self.inner.slice()
    }
}

fn range(start: usize, end: usize) -> TextRange {
    TextRange::new(TextSize::from(start as u32), TextSize::from(end as u32))
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(token);
        }

        let kind = self.inner.next()?;
        let span = self.inner.span();
        let kind = kind.unwrap_or(TokenKind::Error);

        // `1..5` must lex as int, range, int. Split a number that swallowed
        // the first dot of a range operator.
        let text = &self.source[span.start..span.end];
        if matches!(kind, TokenKind::IntLiteral | TokenKind::Error)
            && text.len() > 1
            && text.ends_with('.')
            && text[..text.len() - 1].bytes().all(|b| b.is_ascii_digit())
        {
            let dot_start = span.end - 1;
            self.pending
                .push_back(Token::new(TokenKind::IntLiteral, range(span.start, dot_start)));

            if let Some(next_kind) = self.inner.next() {
                let next_span = self.inner.span();
                let next_kind = next_kind.unwrap_or(TokenKind::Error);
                if next_kind == TokenKind::Dot && next_span.start == span.end {
                    self.pending
                        .push_back(Token::new(TokenKind::DotDot, range(dot_start, next_span.end)));
                } else {
                    self.pending
                        .push_back(Token::new(TokenKind::Dot, range(dot_start, span.end)));
                    self.pending
                        .push_back(Token::new(next_kind, range(next_span.start, next_span.end)));
                }
            } else {
                self.pending
                    .push_back(Token::new(TokenKind::Dot, range(dot_start, span.end)));
            }

            return self.pending.pop_front();
        }

        Some(Token::new(kind, range(span.start, span.end)))
    }
}

/// Lex the entire source and return all tokens.
///
/// This is a convenience function for testing and simple use cases.
/// For the parser, use the `Lexer` iterator directly.
#[must_use]
pub fn lex(source: &str) -> Vec<Token> {
    Lexer::new(source).collect()
}

/// Lex source and return tokens paired with their text.
///
/// Useful for debugging and testing.
#[must_use]
pub fn lex_with_text(source: &str) -> Vec<(Token, &str)> {
    Lexer::new(source)
        .map(|token| {
            let text = &source[usize::from(token.range.start())..usize::from(token.range.end())];
            (token, text)
        })
        .collect()
}
