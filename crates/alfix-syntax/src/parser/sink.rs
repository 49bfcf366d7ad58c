//! Sink for converting parser events into a syntax tree.
//!
//! The sink takes the flat event stream and fills the node arena. Trivia
//! tokens are not stored; instead each token leaf gets a full range that
//! includes its leading trivia and the trailing trivia on its own line
//! (up to and including the first line break). Composite ranges are derived
//! from their children when the node is finished.

use text_size::{TextRange, TextSize};

use crate::lexer::{Token, TokenKind};
use crate::parser::event::Event;
use crate::parser::ParseError;
use crate::syntax::{NodeData, NodeId, SyntaxKind, SyntaxTree};

/// Builds a syntax tree from parser events.
pub struct Sink<'t> {
    tokens: &'t [Token],
    source: String,
    events: Vec<Event>,
    cursor: usize,
    full_ranges: Vec<TextRange>,
    nodes: Vec<NodeData>,
    stack: Vec<NodeId>,
    errors: Vec<ParseError>,
}

impl<'t> Sink<'t> {
    /// Creates a new sink.
    pub fn new(tokens: &'t [Token], source: String, events: Vec<Event>) -> Self {
        let full_ranges = token_full_ranges(tokens);
        Self {
            tokens,
            source,
            events,
            cursor: 0,
            full_ranges,
            nodes: Vec::new(),
            stack: Vec::new(),
            errors: Vec::new(),
        }
    }

    /// Consumes the sink and returns the finished tree.
    pub fn finish(mut self, mut errors: Vec<ParseError>) -> SyntaxTree {
        for i in 0..self.events.len() {
            match std::mem::replace(&mut self.events[i], Event::Tombstone) {
                Event::Start {
                    kind,
                    forward_parent,
                } => {
                    // Outermost adopter first.
                    let mut kinds = vec![kind];
                    let mut idx = i;
                    let mut fp = forward_parent;

                    while let Some(fp_idx) = fp {
                        idx += fp_idx as usize;
                        if let Event::Start {
                            kind,
                            forward_parent,
                        } = std::mem::replace(&mut self.events[idx], Event::Tombstone)
                        {
                            kinds.push(kind);
                            fp = forward_parent;
                        } else {
                            break;
                        }
                    }

                    for kind in kinds.into_iter().rev() {
                        self.start_node(kind);
                    }
                }
                Event::Token(kind) => {
                    self.eat_trivia();
                    self.token(kind);
                }
                Event::Finish => self.finish_node(),
                Event::Tombstone => {}
            }
        }

        if let Some(root) = self.nodes.first_mut() {
            let everything = TextRange::up_to(TextSize::of(self.source.as_str()));
            root.range = everything;
            root.full_range = everything;
        }

        errors.append(&mut self.errors);
        SyntaxTree::new(self.source, self.nodes, errors)
    }

    fn start_node(&mut self, kind: SyntaxKind) {
        let id = NodeId::new(self.nodes.len());
        let parent = self.stack.last().copied();
        let at = self.next_token_start();
        self.nodes.push(NodeData {
            kind,
            range: TextRange::empty(at),
            full_range: TextRange::empty(at),
            parent,
            children: Vec::new(),
            name: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        self.stack.push(id);
    }

    fn finish_node(&mut self) {
        let Some(id) = self.stack.pop() else {
            self.errors.push(ParseError {
                message: "unbalanced node events".to_string(),
                range: TextRange::empty(self.next_token_start()),
            });
            return;
        };

        let children = &self.nodes[id.index()].children;
        let first = children.first().map(|c| &self.nodes[c.index()]);
        let last = children.last().map(|c| &self.nodes[c.index()]);
        let ranges = first.zip(last).map(|(first, last)| {
            (
                first.range.cover(last.range),
                first.full_range.cover(last.full_range),
            )
        });

        let kind = self.nodes[id.index()].kind;
        let name = if kind.caches_name() {
            self.nodes[id.index()]
                .children
                .iter()
                .map(|c| &self.nodes[c.index()])
                .find(|child| child.kind == SyntaxKind::IdentifierName)
                .map(|child| self.source[child.range].into())
        } else {
            None
        };

        let node = &mut self.nodes[id.index()];
        if let Some((range, full_range)) = ranges {
            node.range = range;
            node.full_range = full_range;
        }
        node.name = name;
    }

    /// Skips trivia; it is only reflected in full ranges.
    fn eat_trivia(&mut self) {
        while let Some(token) = self.tokens.get(self.cursor) {
            if !token.kind.is_trivia() {
                break;
            }
            self.cursor += 1;
        }
    }

    /// Adds a token leaf to the current node.
    fn token(&mut self, kind: SyntaxKind) {
        let Some(token) = self.tokens.get(self.cursor) else {
            return;
        };
        let id = NodeId::new(self.nodes.len());
        let parent = self.stack.last().copied();
        self.nodes.push(NodeData {
            kind,
            range: token.range,
            full_range: self.full_ranges[self.cursor],
            parent,
            children: Vec::new(),
            name: None,
        });
        if let Some(parent) = parent {
            self.nodes[parent.index()].children.push(id);
        }
        self.cursor += 1;
    }

    fn next_token_start(&self) -> TextSize {
        self.tokens[self.cursor.min(self.tokens.len())..]
            .iter()
            .find(|token| !token.kind.is_trivia())
            .map_or_else(|| TextSize::of(self.source.as_str()), |token| token.range.start())
    }
}

/// Full range of every non-trivia token; trivia entries hold their own range.
///
/// Trailing trivia of a token runs to the end of its line (first line break
/// included). Leading trivia is whatever follows the previous token's
/// trailing trivia.
fn token_full_ranges(tokens: &[Token]) -> Vec<TextRange> {
    let mut full: Vec<TextRange> = tokens.iter().map(|token| token.range).collect();
    let mut leading_start = TextSize::from(0);
    let mut i = 0;

    while i < tokens.len() {
        if tokens[i].kind.is_trivia() {
            i += 1;
            continue;
        }

        let mut end = tokens[i].range.end();
        let mut j = i + 1;
        while let Some(next) = tokens.get(j) {
            if !next.kind.is_trivia() || next.kind == TokenKind::Directive {
                break;
            }
            end = next.range.end();
            j += 1;
            if next.kind == TokenKind::Newline {
                break;
            }
        }

        full[i] = TextRange::new(leading_start, end);
        leading_start = end;
        i = j;
    }

    full
}
