//! Single source of truth for the token kinds shared by `TokenKind` and `SyntaxKind`.
//!
//! `Eof` must stay last: `SyntaxKind::is_token` relies on it.

macro_rules! for_each_token_kind {
    ($m:ident) => {
        $m! {
            Whitespace,
            Newline,
            LineComment,
            BlockComment,
            Directive,
            Semicolon,
            Colon,
            ColonColon,
            Comma,
            Dot,
            DotDot,
            LParen,
            RParen,
            LBracket,
            RBracket,
            LBrace,
            RBrace,
            At,
            Assign,
            PlusAssign,
            MinusAssign,
            StarAssign,
            SlashAssign,
            Eq,
            Neq,
            Lt,
            LtEq,
            Gt,
            GtEq,
            Plus,
            Minus,
            Star,
            Slash,
            KwProcedure,
            KwTrigger,
            KwLocal,
            KwInternal,
            KwProtected,
            KwVar,
            KwExtends,
            KwImplements,
            KwBegin,
            KwEnd,
            KwIf,
            KwThen,
            KwElse,
            KwCase,
            KwOf,
            KwWhile,
            KwDo,
            KwRepeat,
            KwUntil,
            KwFor,
            KwTo,
            KwDownTo,
            KwForEach,
            KwIn,
            KwWith,
            KwExit,
            KwNot,
            KwAnd,
            KwOr,
            KwXor,
            KwDiv,
            KwMod,
            KwTrue,
            KwFalse,
            IntLiteral,
            DecimalLiteral,
            DateTimeLiteral,
            StringLiteral,
            Ident,
            QuotedIdent,
            Error,
            Eof,
        }
    };
}

pub(crate) use for_each_token_kind;
