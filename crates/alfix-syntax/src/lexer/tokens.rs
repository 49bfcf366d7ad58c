//! Token definitions for AL.
//!
//! Object and section words (`codeunit`, `table`, `field`, `layout`, ...) are
//! not reserved in AL and lex as plain identifiers; the parser recognises them
//! by text. Only words that change the shape of code are keywords here.

use logos::Logos;

fn lex_block_comment(lex: &mut logos::Lexer<TokenKind>) -> bool {
    let bytes = lex.remainder().as_bytes();
    let mut i = 0usize;

    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            lex.bump(i + 2);
            return true;
        }
        i += 1;
    }

    lex.bump(bytes.len());
    false
}

/// All token kinds in AL.
///
/// Token kinds are divided into categories:
/// - Trivia (whitespace, line breaks, comments, preprocessor directives)
/// - Punctuation and operators
/// - Keywords
/// - Literals and identifiers
/// - Special tokens (errors, EOF)
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[derive(Default)]
pub enum TokenKind {
    // =========================================================================
    // TRIVIA
    // =========================================================================
    /// Horizontal whitespace
    #[regex(r"[ \t\x0C\u{FEFF}]+")]
    Whitespace,

    /// A single line break. Kept apart from whitespace so trailing trivia
    /// can stop at the end of a line.
    #[regex(r"\r\n|\n|\r")]
    Newline,

    /// Single-line comment: // ...
    #[regex(r"//[^\r\n]*", allow_greedy = true)]
    LineComment,

    /// Block comment: /* ... */
    #[token("/*", lex_block_comment)]
    BlockComment,

    /// Preprocessor directive: `#if`, `#region`, `#pragma warning disable`, ...
    #[regex(r"#[A-Za-z][^\r\n]*", allow_greedy = true)]
    Directive,

    // =========================================================================
    // PUNCTUATION
    // =========================================================================
    /// `;`
    #[token(";")]
    Semicolon,

    /// `:`
    #[token(":")]
    Colon,

    /// `::`
    #[token("::")]
    ColonColon,

    /// `,`
    #[token(",")]
    Comma,

    /// `.`
    #[token(".")]
    Dot,

    /// `..`
    #[token("..")]
    DotDot,

    /// `(`
    #[token("(")]
    LParen,

    /// `)`
    #[token(")")]
    RParen,

    /// `[`
    #[token("[")]
    LBracket,

    /// `]`
    #[token("]")]
    RBracket,

    /// `{`
    #[token("{")]
    LBrace,

    /// `}`
    #[token("}")]
    RBrace,

    /// `@`
    #[token("@")]
    At,

    // =========================================================================
    // OPERATORS
    // =========================================================================
    /// `:=`
    #[token(":=")]
    Assign,

    /// `+=`
    #[token("+=")]
    PlusAssign,

    /// `-=`
    #[token("-=")]
    MinusAssign,

    /// `*=`
    #[token("*=")]
    StarAssign,

    /// `/=`
    #[token("/=")]
    SlashAssign,

    /// `=`
    #[token("=")]
    Eq,

    /// `<>`
    #[token("<>")]
    Neq,

    /// `<`
    #[token("<")]
    Lt,

    /// `<=`
    #[token("<=")]
    LtEq,

    /// `>`
    #[token(">")]
    Gt,

    /// `>=`
    #[token(">=")]
    GtEq,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    // =========================================================================
    // KEYWORDS - Members
    // =========================================================================
    /// `procedure`
    #[token("procedure", ignore(case))]
    KwProcedure,

    /// `trigger`
    #[token("trigger", ignore(case))]
    KwTrigger,

    /// `local`
    #[token("local", ignore(case))]
    KwLocal,

    /// `internal`
    #[token("internal", ignore(case))]
    KwInternal,

    /// `protected`
    #[token("protected", ignore(case))]
    KwProtected,

    /// `var`
    #[token("var", ignore(case))]
    KwVar,

    /// `extends`
    #[token("extends", ignore(case))]
    KwExtends,

    /// `implements`
    #[token("implements", ignore(case))]
    KwImplements,

    // =========================================================================
    // KEYWORDS - Statements
    // =========================================================================
    /// `begin`
    #[token("begin", ignore(case))]
    KwBegin,

    /// `end`
    #[token("end", ignore(case))]
    KwEnd,

    /// `if`
    #[token("if", ignore(case))]
    KwIf,

    /// `then`
    #[token("then", ignore(case))]
    KwThen,

    /// `else`
    #[token("else", ignore(case))]
    KwElse,

    /// `case`
    #[token("case", ignore(case))]
    KwCase,

    /// `of`
    #[token("of", ignore(case))]
    KwOf,

    /// `while`
    #[token("while", ignore(case))]
    KwWhile,

    /// `do`
    #[token("do", ignore(case))]
    KwDo,

    /// `repeat`
    #[token("repeat", ignore(case))]
    KwRepeat,

    /// `until`
    #[token("until", ignore(case))]
    KwUntil,

    /// `for`
    #[token("for", ignore(case))]
    KwFor,

    /// `to`
    #[token("to", ignore(case))]
    KwTo,

    /// `downto`
    #[token("downto", ignore(case))]
    KwDownTo,

    /// `foreach`
    #[token("foreach", ignore(case))]
    KwForEach,

    /// `in`
    #[token("in", ignore(case))]
    KwIn,

    /// `with`
    #[token("with", ignore(case))]
    KwWith,

    /// `exit`
    #[token("exit", ignore(case))]
    KwExit,

    // =========================================================================
    // KEYWORDS - Operators and constants
    // =========================================================================
    /// `not`
    #[token("not", ignore(case))]
    KwNot,

    /// `and`
    #[token("and", ignore(case))]
    KwAnd,

    /// `or`
    #[token("or", ignore(case))]
    KwOr,

    /// `xor`
    #[token("xor", ignore(case))]
    KwXor,

    /// `div`
    #[token("div", ignore(case))]
    KwDiv,

    /// `mod`
    #[token("mod", ignore(case))]
    KwMod,

    /// `true`
    #[token("true", ignore(case))]
    KwTrue,

    /// `false`
    #[token("false", ignore(case))]
    KwFalse,

    // =========================================================================
    // LITERALS
    // =========================================================================
    /// Integer literal: `42`
    #[regex(r"[0-9]+")]
    IntLiteral,

    /// Decimal literal: `3.14`
    #[regex(r"[0-9]+\.[0-9]+")]
    DecimalLiteral,

    /// Date, time, or datetime literal: `20240101D`, `120000T`, `0DT`
    #[regex(r"[0-9]+([dD][tT]?|[tT])")]
    DateTimeLiteral,

    /// String literal with `''` escapes: `'It''s'`
    #[regex(r"'([^'\r\n]|'')*'")]
    StringLiteral,

    // =========================================================================
    // IDENTIFIERS
    // =========================================================================
    /// Identifier: starts with letter or underscore, contains letters, digits, underscores
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    /// Quoted identifier: `"Sales Header"`
    #[regex(r#""[^"\r\n]*""#)]
    QuotedIdent,

    // =========================================================================
    // SPECIAL TOKENS
    // =========================================================================
    /// Lexer error - unrecognized character or unterminated literal
    #[default]
    Error,

    /// End of file marker (not produced by lexer, added by parser)
    Eof,
}

impl TokenKind {
    /// Returns `true` if this token is trivia (whitespace, line break, comment, or directive).
    #[inline]
    pub fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace
                | Self::Newline
                | Self::LineComment
                | Self::BlockComment
                | Self::Directive
        )
    }

    /// Returns `true` if this token is a keyword.
    pub fn is_keyword(self) -> bool {
        (self as u16) >= (Self::KwProcedure as u16) && (self as u16) <= (Self::KwFalse as u16)
    }

    /// Returns `true` if this token names something: a plain or quoted identifier.
    pub fn is_name(self) -> bool {
        matches!(self, Self::Ident | Self::QuotedIdent)
    }

    /// Returns `true` if this token is a literal value.
    pub fn is_literal(self) -> bool {
        matches!(
            self,
            Self::IntLiteral
                | Self::DecimalLiteral
                | Self::DateTimeLiteral
                | Self::StringLiteral
                | Self::KwTrue
                | Self::KwFalse
        )
    }

    /// Returns `true` if this token can start an expression.
    pub fn can_start_expr(self) -> bool {
        self.is_name()
            || self.is_literal()
            || matches!(
                self,
                Self::KwNot | Self::LParen | Self::LBracket | Self::Minus | Self::Plus
            )
    }

    /// Returns `true` if this token can start a statement.
    pub fn can_start_statement(self) -> bool {
        self.is_name()
            || matches!(
                self,
                Self::KwBegin
                    | Self::KwIf
                    | Self::KwCase
                    | Self::KwWhile
                    | Self::KwRepeat
                    | Self::KwFor
                    | Self::KwForEach
                    | Self::KwWith
                    | Self::KwExit
                    | Self::LParen
                    | Self::Semicolon // Empty statement
            )
    }

    /// Returns `true` if this token is `:=` or one of the compound assignments.
    pub fn is_assignment_op(self) -> bool {
        matches!(
            self,
            Self::Assign | Self::PlusAssign | Self::MinusAssign | Self::StarAssign | Self::SlashAssign
        )
    }

    /// Returns `true` if this token starts a procedure declaration, possibly
    /// behind an access modifier.
    pub fn is_access_modifier(self) -> bool {
        matches!(self, Self::KwLocal | Self::KwInternal | Self::KwProtected)
    }

    /// Returns the binding power for Pratt parsing (left, right).
    /// Returns None if not an infix operator.
    ///
    /// AL keeps the Pascal precedence levels: relational operators bind
    /// loosest, `and` groups with the multiplicative operators and `or`/`xor`
    /// with the additive ones.
    pub fn infix_binding_power(self) -> Option<(u8, u8)> {
        Some(match self {
            Self::DotDot => (1, 2),
            Self::Eq | Self::Neq | Self::Lt | Self::LtEq | Self::Gt | Self::GtEq | Self::KwIn => {
                (3, 4)
            }
            Self::Plus | Self::Minus | Self::KwOr | Self::KwXor => (5, 6),
            Self::Star | Self::Slash | Self::KwDiv | Self::KwMod | Self::KwAnd => (7, 8),
            _ => return None,
        })
    }

    /// Returns the binding power for prefix operators.
    pub fn prefix_binding_power(self) -> Option<u8> {
        Some(match self {
            Self::KwNot | Self::Plus | Self::Minus => 9,
            _ => return None,
        })
    }
}
