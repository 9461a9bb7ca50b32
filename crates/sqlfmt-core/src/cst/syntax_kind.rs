//! Syntax kind enumeration for the SQL CST
//!
//! This module defines all possible node and token types in the SQL syntax tree.
//! Keywords share a single token kind; which keyword a token spells is looked up
//! through [`crate::dialect::Keyword`], so the kind set stays dialect independent.

use std::fmt;

/// Syntax kind for SQL language elements
///
/// The discriminants are grouped in ranges:
/// - Trivia (0-9)
/// - Word and literal tokens (10-29)
/// - Punctuation and operators (30-89)
/// - Error / sentinel tokens (90-99)
/// - Structural nodes (100+)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
pub enum SqlSyntaxKind {
    // ==================
    // Trivia (0-9)
    // ==================
    /// Spaces and tabs
    Whitespace = 0,
    /// `\n` or `\r\n`
    Newline = 1,
    /// `-- ...` or `# ...`
    LineComment = 2,
    /// `/* ... */`
    BlockComment = 3,

    // ==================
    // Words and literals (10-29)
    // ==================
    /// Reserved word, or a contextual word consumed in keyword position
    Keyword = 10,
    /// Plain identifier
    Ident = 11,
    /// Quoted identifier (`"x"`, `` `x` ``, `[x]`)
    QuotedIdent = 12,
    /// Numeric literal
    Number = 13,
    /// String literal of any quoting flavour
    String = 14,
    /// Bind parameter (`?`, `$1`, `:name`, ...)
    Placeholder = 15,

    // ==================
    // Punctuation (30-49)
    // ==================
    Comma = 30,
    Semicolon = 31,
    Dot = 32,
    LParen = 33,
    RParen = 34,
    LBracket = 35,
    RBracket = 36,
    /// `:` not followed by a name
    Colon = 37,
    /// `?` that is not a placeholder
    Question = 38,
    /// `@` that is not a placeholder
    At = 39,
    /// `$` that is not a placeholder
    Dollar = 40,

    // ==================
    // Operators (50-89)
    // ==================
    Star = 50,
    Plus = 51,
    Minus = 52,
    Slash = 53,
    Percent = 54,
    /// `=`
    Eq = 55,
    /// `==`
    EqEq = 56,
    /// `<>`
    LtGt = 57,
    /// `!=`
    BangEq = 58,
    Lt = 59,
    Gt = 60,
    LtEq = 61,
    GtEq = 62,
    /// `||`
    PipePipe = 63,
    /// `&&`
    AmpAmp = 64,
    /// `::`
    ColonColon = 65,
    Amp = 66,
    Pipe = 67,
    Caret = 68,
    Tilde = 69,
    Bang = 70,
    /// `~*`
    TildeStar = 71,
    /// `!~`
    BangTilde = 72,
    /// `!~*`
    BangTildeStar = 73,

    // ==================
    // Error / sentinel (90-99)
    // ==================
    /// Unlexable input, kept so the tree stays lossless
    Error = 90,
    /// End of input (never stored in a tree)
    Eof = 99,

    // ==================
    // Root and statements (100-119)
    // ==================
    SourceFile = 100,
    SelectStmt = 101,
    InsertStmt = 102,
    UpdateStmt = 103,
    DeleteStmt = 104,

    // ==================
    // Clauses (120-169)
    // ==================
    WithClause = 120,
    Cte = 121,
    SelectCore = 122,
    CompoundSelect = 123,
    SelectClause = 124,
    SelectItem = 125,
    Alias = 126,
    FromClause = 127,
    TableRef = 128,
    DerivedTable = 129,
    JoinExpr = 130,
    OnClause = 131,
    UsingClause = 132,
    WhereClause = 133,
    GroupByClause = 134,
    HavingClause = 135,
    OrderByClause = 136,
    OrderItem = 137,
    LimitClause = 138,
    OffsetClause = 139,
    ValuesClause = 140,
    ColumnList = 141,
    SetClause = 142,
    Assignment = 143,
    ReturningClause = 144,
    QualifiedName = 145,
    /// `DISTINCT ON (...)` inside a select clause
    DistinctOn = 146,
    OnConflictClause = 147,
    /// `(columns) [WHERE ...]` or `ON CONSTRAINT name`
    ConflictTarget = 148,
    /// `DO NOTHING` or `DO UPDATE SET ...`
    ConflictAction = 149,
    LockingClause = 150,

    // ==================
    // Expressions (170-219)
    // ==================
    Literal = 170,
    ColumnRef = 171,
    AllColumns = 172,
    PlaceholderExpr = 173,
    FuncCall = 174,
    ArgList = 175,
    BinaryExpr = 176,
    PrefixExpr = 177,
    ParenExpr = 178,
    IsExpr = 179,
    InExpr = 180,
    BetweenExpr = 181,
    CaseExpr = 182,
    WhenClause = 183,
    ElseClause = 184,
    CastExpr = 185,
    TypeCastExpr = 186,
    DataType = 187,
    TypeParams = 188,
    SubqueryExpr = 189,
    ExistsExpr = 190,
    ExprList = 191,
    /// `ARRAY[...]` or `ARRAY(subquery)`
    ArrayExpr = 192,
    /// `expr[i]` or `expr[a:b]`
    SubscriptExpr = 193,
    CollateExpr = 194,
    /// `DATE '2024-01-01'`, `INTERVAL '1 day'`
    TypedLiteral = 195,

    /// Tokens skipped during best-effort recovery
    ErrorNode = 250,
}

impl SqlSyntaxKind {
    /// Check if this is a trivia kind (whitespace, newlines, comments)
    pub const fn is_trivia(self) -> bool {
        matches!(
            self,
            Self::Whitespace | Self::Newline | Self::LineComment | Self::BlockComment
        )
    }

    /// Check if this is a comment
    pub const fn is_comment(self) -> bool {
        matches!(self, Self::LineComment | Self::BlockComment)
    }

    /// Check if this is punctuation
    pub const fn is_punct(self) -> bool {
        (self as u16) >= 30 && (self as u16) < 50
    }

    /// Check if this is an operator
    pub const fn is_operator(self) -> bool {
        (self as u16) >= 50 && (self as u16) < 90
    }

    /// Check if this is a literal
    pub const fn is_literal(self) -> bool {
        matches!(self, Self::Number | Self::String)
    }

    /// Check if this is a structural node
    pub const fn is_node(self) -> bool {
        (self as u16) >= 100
    }

    /// Check if this is a statement node
    pub const fn is_statement(self) -> bool {
        matches!(
            self,
            Self::SelectStmt | Self::InsertStmt | Self::UpdateStmt | Self::DeleteStmt
        )
    }

    /// Fixed spelling of punctuation and operator tokens
    pub const fn static_text(self) -> Option<&'static str> {
        match self {
            Self::Comma => Some(","),
            Self::Semicolon => Some(";"),
            Self::Dot => Some("."),
            Self::LParen => Some("("),
            Self::RParen => Some(")"),
            Self::LBracket => Some("["),
            Self::RBracket => Some("]"),
            Self::Colon => Some(":"),
            Self::Question => Some("?"),
            Self::At => Some("@"),
            Self::Dollar => Some("$"),
            Self::Star => Some("*"),
            Self::Plus => Some("+"),
            Self::Minus => Some("-"),
            Self::Slash => Some("/"),
            Self::Percent => Some("%"),
            Self::Eq => Some("="),
            Self::EqEq => Some("=="),
            Self::LtGt => Some("<>"),
            Self::BangEq => Some("!="),
            Self::Lt => Some("<"),
            Self::Gt => Some(">"),
            Self::LtEq => Some("<="),
            Self::GtEq => Some(">="),
            Self::PipePipe => Some("||"),
            Self::AmpAmp => Some("&&"),
            Self::ColonColon => Some("::"),
            Self::Amp => Some("&"),
            Self::Pipe => Some("|"),
            Self::Caret => Some("^"),
            Self::Tilde => Some("~"),
            Self::Bang => Some("!"),
            Self::TildeStar => Some("~*"),
            Self::BangTilde => Some("!~"),
            Self::BangTildeStar => Some("!~*"),
            _ => None,
        }
    }

    /// Human readable name used in "expected ..." diagnostics
    pub fn describe(self) -> String {
        match self.static_text() {
            Some(text) => format!("`{text}`"),
            None => match self {
                Self::Ident | Self::QuotedIdent => "identifier".to_string(),
                Self::Number => "number".to_string(),
                Self::String => "string".to_string(),
                Self::Placeholder => "placeholder".to_string(),
                Self::Eof => "end of input".to_string(),
                other => format!("{other:?}"),
            },
        }
    }
}

impl fmt::Display for SqlSyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<SqlSyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SqlSyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trivia_classification() {
        assert!(SqlSyntaxKind::Whitespace.is_trivia());
        assert!(SqlSyntaxKind::Newline.is_trivia());
        assert!(SqlSyntaxKind::LineComment.is_trivia());
        assert!(SqlSyntaxKind::BlockComment.is_comment());
        assert!(!SqlSyntaxKind::Keyword.is_trivia());
        assert!(!SqlSyntaxKind::Whitespace.is_comment());
    }

    #[test]
    fn test_ranges() {
        assert!(SqlSyntaxKind::Comma.is_punct());
        assert!(SqlSyntaxKind::PipePipe.is_operator());
        assert!(!SqlSyntaxKind::PipePipe.is_punct());
        assert!(SqlSyntaxKind::SelectStmt.is_node());
        assert!(SqlSyntaxKind::SelectStmt.is_statement());
        assert!(!SqlSyntaxKind::SelectCore.is_statement());
    }

    #[test]
    fn test_static_text() {
        assert_eq!(SqlSyntaxKind::LtGt.static_text(), Some("<>"));
        assert_eq!(SqlSyntaxKind::ColonColon.static_text(), Some("::"));
        assert_eq!(SqlSyntaxKind::BangTildeStar.static_text(), Some("!~*"));
        assert!(SqlSyntaxKind::TildeStar.is_operator());
        assert_eq!(SqlSyntaxKind::Ident.static_text(), None);
        assert_eq!(SqlSyntaxKind::Semicolon.describe(), "`;`");
        assert_eq!(SqlSyntaxKind::Eof.describe(), "end of input");
    }
}
