//! Main parser implementation.

use crate::lexer::{lex, Token, TokenKind};
use crate::parser::event::Event;
use crate::parser::sink::Sink;
use crate::parser::source::Source;
use crate::parser::ParseError;
use crate::syntax::{SyntaxKind, SyntaxTree};
use drop_bomb::DropBomb;

/// Parses source text into a syntax tree.
#[must_use]
pub fn parse(source: String) -> SyntaxTree {
    let tokens = lex(&source);
    let parser = Parser::new(&tokens, &source);
    let (events, errors) = parser.parse();

    Sink::new(&tokens, source, events).finish(errors)
}

/// The parser state.
pub(crate) struct Parser<'t, 'src> {
    pub(crate) source: Source<'t, 'src>,
    pub(crate) events: Vec<Event>,
    errors: Vec<ParseError>,
}

pub(crate) struct Marker {
    pos: usize,
    bomb: DropBomb,
}

impl Marker {
    pub(crate) fn complete(
        mut self,
        parser: &mut Parser<'_, '_>,
        kind: SyntaxKind,
    ) -> CompletedMarker {
        self.bomb.defuse();
        match parser.events.get_mut(self.pos) {
            Some(Event::Tombstone) => {
                parser.events[self.pos] = Event::Start {
                    kind,
                    forward_parent: None,
                };
            }
            Some(Event::Start {
                kind: existing_kind,
                ..
            }) => {
                *existing_kind = kind;
            }
            _ => {}
        }
        parser.events.push(Event::Finish);
        CompletedMarker { pos: self.pos }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct CompletedMarker {
    pub(crate) pos: usize,
}

impl CompletedMarker {
    pub(crate) fn precede(self, parser: &mut Parser<'_, '_>) -> Marker {
        let new_pos = parser.events.len();
        parser.events.push(Event::Tombstone);
        set_forward_parent(&mut parser.events, self.pos, new_pos);
        Marker {
            pos: new_pos,
            bomb: DropBomb::new("uncompleted marker"),
        }
    }
}

fn set_forward_parent(events: &mut [Event], from: usize, to: usize) {
    let mut current = from;
    loop {
        match &mut events[current] {
            Event::Start {
                forward_parent: Some(fp),
                ..
            } => {
                current += *fp as usize;
            }
            Event::Start { forward_parent, .. } => {
                *forward_parent = Some((to - current) as u32);
                break;
            }
            _ => break,
        }
    }
}

impl<'t, 'src> Parser<'t, 'src> {
    fn new(tokens: &'t [Token], source: &'src str) -> Self {
        Self {
            source: Source::new(tokens, source),
            events: Vec::new(),
            errors: Vec::new(),
        }
    }

    fn parse(mut self) -> (Vec<Event>, Vec<ParseError>) {
        self.start_node(SyntaxKind::CompilationUnit);

        while !self.at_end() {
            if self.at_contextual("namespace") {
                self.parse_directive_like(SyntaxKind::NamespaceDeclaration);
            } else if self.at_contextual("using") {
                self.parse_directive_like(SyntaxKind::UsingDirective);
            } else if self.at_object_keyword() {
                self.parse_object();
            } else {
                // Error recovery: skip unknown token
                self.error("expected object declaration");
                self.bump();
            }
        }

        self.finish_node();

        (self.events, self.errors)
    }

    // =========================================================================
    // Helper Methods
    // =========================================================================

    pub(crate) fn current(&self) -> TokenKind {
        self.source.current()
    }

    pub(crate) fn current_text(&self) -> &'src str {
        self.source.current_text()
    }

    pub(crate) fn at(&self, kind: TokenKind) -> bool {
        self.source.current() == kind
    }

    pub(crate) fn at_any(&self, kinds: &[TokenKind]) -> bool {
        kinds.contains(&self.current())
    }

    /// Returns `true` if the current token is the identifier `word` (any case).
    pub(crate) fn at_contextual(&self, word: &str) -> bool {
        self.at(TokenKind::Ident) && self.current_text().eq_ignore_ascii_case(word)
    }

    pub(crate) fn at_end(&self) -> bool {
        self.source.at_end()
    }

    pub(crate) fn peek_kind_n(&self, n: usize) -> TokenKind {
        self.source.peek_kind_n(n)
    }

    pub(crate) fn bump(&mut self) {
        let kind = self.source.current();
        self.events.push(Event::Token(SyntaxKind::from(kind)));
        self.source.bump();
    }

    /// Bumps the current token if it is `kind`, otherwise reports `message`.
    pub(crate) fn expect(&mut self, kind: TokenKind, message: &str) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            self.error(message);
            false
        }
    }

    /// Bumps the current token if it is `kind`.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> bool {
        if self.at(kind) {
            self.bump();
            true
        } else {
            false
        }
    }

    pub(crate) fn start(&mut self) -> Marker {
        let pos = self.events.len();
        self.events.push(Event::Tombstone);
        Marker {
            pos,
            bomb: DropBomb::new("uncompleted marker"),
        }
    }

    pub(crate) fn start_node(&mut self, kind: SyntaxKind) {
        self.events.push(Event::start(kind));
    }

    pub(crate) fn finish_node(&mut self) {
        self.events.push(Event::Finish);
    }

    pub(crate) fn error(&mut self, message: &str) {
        let range = self.source.current_token().map_or_else(
            || {
                text_size::TextRange::empty(
                    self.source.previous_end().unwrap_or_default(),
                )
            },
            |t| t.range,
        );

        self.errors.push(ParseError {
            message: message.to_string(),
            range,
        });
    }

    /// Bumps tokens up to and including the bracket matching the current one.
    pub(crate) fn bump_balanced(&mut self) {
        let mut depth = 0u32;
        while !self.at_end() {
            match self.current() {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.bump();
                        return;
                    }
                }
                TokenKind::LBrace | TokenKind::RBrace => {
                    self.error("unbalanced brackets");
                    return;
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Bumps tokens until one of `terminators` appears outside brackets.
    pub(crate) fn bump_until(&mut self, terminators: &[TokenKind]) {
        let mut depth = 0u32;
        while !self.at_end() {
            let kind = self.current();
            if depth == 0 && (terminators.contains(&kind) || kind == TokenKind::RBrace) {
                return;
            }
            match kind {
                TokenKind::LParen | TokenKind::LBracket => depth += 1,
                TokenKind::RParen | TokenKind::RBracket => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.bump();
        }
    }

    /// Returns true if the current token is a synchronization point.
    pub(crate) fn is_sync_point(&self) -> bool {
        matches!(
            self.current(),
            // Statement terminators
            TokenKind::Semicolon
            // End of blocks
            | TokenKind::KwEnd
            | TokenKind::KwUntil
            | TokenKind::RBrace
            // Start of new members
            | TokenKind::KwProcedure
            | TokenKind::KwTrigger
            | TokenKind::KwLocal
            | TokenKind::KwInternal
            | TokenKind::KwProtected
            | TokenKind::KwVar
            | TokenKind::KwBegin
        )
    }

    /// Recover at statement level - skip to next statement or block end.
    pub(crate) fn recover_statement(&mut self) {
        while !self.at_end() {
            if self.at(TokenKind::Semicolon) {
                self.bump();
                break;
            }
            if self.is_sync_point() || self.current().can_start_statement() {
                break;
            }
            self.bump();
        }
    }

    /// Consume a statement separator.
    ///
    /// AL separates statements rather than terminating them, so the `;` may
    /// be left out before `end`, `else`, `until` and the next case line.
    pub(crate) fn eat_statement_separator(&mut self) {
        if self.eat(TokenKind::Semicolon) {
            return;
        }

        if self.at_end()
            || self.at_any(&[
                TokenKind::KwEnd,
                TokenKind::KwElse,
                TokenKind::KwUntil,
                TokenKind::RBrace,
            ])
        {
            return;
        }

        self.error("expected ';'");
        if !self.current().can_start_statement() && !self.is_sync_point() {
            self.recover_statement();
        }
    }
}
