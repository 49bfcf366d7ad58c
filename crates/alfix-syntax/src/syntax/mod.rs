//! Syntax tree types for AL.
//!
//! This module provides the `SyntaxKind` enum that covers both tokens and
//! composite nodes, and the arena-backed [`SyntaxTree`] built by the parser.

mod tree;

pub use tree::{names_equal, unquote, NodeId, SyntaxNode, SyntaxTree};
pub(crate) use tree::NodeData;

use crate::lexer::TokenKind;
use crate::token_kinds::for_each_token_kind;

macro_rules! define_syntax_kind {
    ($($token:ident),* $(,)?) => {
        /// All syntax node and token kinds in AL.
        ///
        /// This enum includes both token kinds (from the lexer) and composite
        /// node kinds (produced by the parser).
        // Variants mirror lexer/token names; documenting each would be noisy.
        #[allow(missing_docs)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[repr(u16)]
        pub enum SyntaxKind {
            // =========================================================================
            // TOKEN KINDS (mirrors TokenKind)
            // =========================================================================
            $($token,)*

            // =========================================================================
            // COMPOSITE NODE KINDS (produced by parser)
            // =========================================================================
            /// Root node of a source file
            CompilationUnit,

            /// `namespace Company.Sales;`
            NamespaceDeclaration,

            /// `using Microsoft.Sales.Customer;`
            UsingDirective,

            /// `codeunit 50100 "Name" { ... }`
            CodeunitObject,
            /// `table 50100 "Name" { ... }`
            TableObject,
            /// `tableextension 50100 "Name" extends "Base" { ... }`
            TableExtensionObject,
            /// `page 50100 "Name" { ... }`
            PageObject,
            /// `pageextension 50100 "Name" extends "Base" { ... }`
            PageExtensionObject,
            /// `report 50100 "Name" { ... }`
            ReportObject,
            /// `reportextension 50100 "Name" extends "Base" { ... }`
            ReportExtensionObject,
            /// `query 50100 "Name" { ... }`
            QueryObject,
            /// `xmlport 50100 "Name" { ... }`
            XmlPortObject,
            /// `enum 50100 "Name" { ... }`
            EnumObject,
            /// `enumextension 50100 "Name" extends "Base" { ... }`
            EnumExtensionObject,
            /// `interface "Name" { ... }`
            InterfaceObject,
            /// `permissionset 50100 "Name" { ... }`
            PermissionSetObject,
            /// Any other object type (`profile`, `controladdin`, `entitlement`, ...)
            UnknownObject,

            /// Object number following the object keyword
            ObjectId,

            /// `extends "Base"`
            ExtendsClause,

            /// `implements IFoo, IBar`
            ImplementsClause,

            /// `Caption = 'Customer';`
            PropertyDeclaration,

            /// `field(1; "No."; Code[20]) { ... }`, `layout { ... }`
            SectionDeclaration,

            /// Parenthesized header of a section: `(1; "No."; Code[20])`
            SectionArguments,

            /// `var` section at object level
            GlobalVarSection,

            /// `var` section inside a procedure or trigger
            VarSection,

            /// `Name: Type;`
            VariableDeclaration,

            /// `a, b, c: Type;`
            VariableListDeclaration,

            /// One name inside a variable list declaration
            VariableDeclarationName,

            /// `[EventSubscriber(...)]`
            MemberAttribute,

            /// `local procedure Name(...) ... begin ... end;`
            MethodDeclaration,

            /// `trigger OnRun() ... begin ... end;`
            TriggerDeclaration,

            /// `(a: Integer; var b: Text)`
            ParameterList,

            /// `var Name: Type`
            Parameter,

            /// `: Type` or `Name: Type` after a parameter list
            ReturnValue,

            /// Rendered type text: `Record Customer`, `Code[20]`, `Label 'x'`
            TypeReference,

            /// `begin ... end`
            Block,

            /// `x := expr`
            AssignmentStatement,

            /// `x += expr`
            CompoundAssignmentStatement,

            /// `Foo();`
            ExpressionStatement,

            /// `exit;` or `exit(expr);`
            ExitStatement,

            /// `if cond then ... else ...`
            IfStatement,

            /// `else ...` branch of an if statement
            ElseClause,

            /// `case expr of ... end`
            CaseStatement,

            /// `value1, value2: statement`
            CaseLine,

            /// `else` branch of a case statement
            CaseElse,

            /// `while cond do ...`
            WhileStatement,

            /// `repeat ... until cond`
            RepeatStatement,

            /// `for i := a to b do ...`
            ForStatement,

            /// `foreach x in list do ...`
            ForEachStatement,

            /// `with Rec do ...`
            WithStatement,

            /// `;`
            EmptyStatement,

            /// `Callee(args)`
            InvocationExpression,

            /// `(a, b)` of an invocation or `[i]` of an element access
            ArgumentList,

            /// `Rec.Field`
            MemberAccessExpression,

            /// `Enum::Value`
            OptionAccessExpression,

            /// `Arr[i]`
            ElementAccessExpression,

            /// A plain or quoted identifier
            IdentifierName,

            /// Literal value
            LiteralExpression,

            /// `a + b`
            BinaryExpression,

            /// `not a`, `-a`
            UnaryExpression,

            /// `(a)`
            ParenthesizedExpression,

            /// `a..b`
            RangeExpression,

            /// `[a, b..c]`
            SetExpression,
        }
    };
}

for_each_token_kind!(define_syntax_kind);

impl SyntaxKind {
    /// Returns `true` if this is a trivia kind.
    #[must_use]
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

    /// Returns `true` if this is a token kind (not a composite node).
    #[must_use]
    pub fn is_token(self) -> bool {
        (self as u16) <= (Self::Eof as u16)
    }

    /// Returns `true` if this is a composite node kind.
    #[must_use]
    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    /// Returns `true` if this is an application object declaration.
    #[must_use]
    pub fn is_object(self) -> bool {
        (self as u16) >= (Self::CodeunitObject as u16)
            && (self as u16) <= (Self::UnknownObject as u16)
    }

    /// Returns `true` for procedures and triggers.
    #[must_use]
    pub fn is_method_like(self) -> bool {
        matches!(self, Self::MethodDeclaration | Self::TriggerDeclaration)
    }

    /// Returns `true` for both local and global var sections.
    #[must_use]
    pub fn is_var_section(self) -> bool {
        matches!(self, Self::VarSection | Self::GlobalVarSection)
    }

    /// Returns `true` if this is a statement node.
    #[must_use]
    pub fn is_statement(self) -> bool {
        (self as u16) >= (Self::Block as u16) && (self as u16) <= (Self::EmptyStatement as u16)
            && !matches!(self, Self::ElseClause | Self::CaseLine | Self::CaseElse)
    }

    /// Returns `true` if this is an expression node.
    #[must_use]
    pub fn is_expression(self) -> bool {
        (self as u16) >= (Self::InvocationExpression as u16)
            && (self as u16) <= (Self::SetExpression as u16)
            && self != Self::ArgumentList
    }

    /// Returns `true` for nodes whose first `IdentifierName` child names them.
    #[must_use]
    pub fn caches_name(self) -> bool {
        self.is_object()
            || matches!(
                self,
                Self::PropertyDeclaration
                    | Self::SectionDeclaration
                    | Self::VariableDeclaration
                    | Self::VariableDeclarationName
                    | Self::MethodDeclaration
                    | Self::TriggerDeclaration
                    | Self::Parameter
                    | Self::ReturnValue
            )
    }

    /// Maps an object keyword (`codeunit`, `tableextension`, ...) to its node kind.
    #[must_use]
    pub fn object_from_keyword(text: &str) -> Option<Self> {
        Some(match text.to_ascii_lowercase().as_str() {
            "codeunit" => Self::CodeunitObject,
            "table" => Self::TableObject,
            "tableextension" => Self::TableExtensionObject,
            "page" => Self::PageObject,
            "pageextension" => Self::PageExtensionObject,
            "report" => Self::ReportObject,
            "reportextension" => Self::ReportExtensionObject,
            "query" => Self::QueryObject,
            "xmlport" => Self::XmlPortObject,
            "enum" => Self::EnumObject,
            "enumextension" => Self::EnumExtensionObject,
            "interface" => Self::InterfaceObject,
            "permissionset" => Self::PermissionSetObject,
            "permissionsetextension" | "profile" | "profileextension" | "controladdin"
            | "entitlement" | "dotnet" | "pagecustomization" => Self::UnknownObject,
            _ => return None,
        })
    }
}

macro_rules! map_token_kinds {
    ($($name:ident),* $(,)?) => {
        impl From<TokenKind> for SyntaxKind {
            fn from(kind: TokenKind) -> Self {
                match kind {
                    $(TokenKind::$name => SyntaxKind::$name,)*
                }
            }
        }
    };
}

for_each_token_kind!(map_token_kinds);
