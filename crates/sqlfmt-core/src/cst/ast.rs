//! Typed AST layer over CST
//!
//! This module provides type-safe wrappers over the raw CST nodes. Each
//! wrapper implements [`AstNode::cast`] to convert from an untyped node and
//! exposes accessors that skip trivia, so callers never have to reason about
//! where whitespace and comments sit.
//!
//! # Example
//!
//! ```ignore
//! use sqlfmt_core::cst::{parse_sql, ast::{AstNode, SourceFile}};
//!
//! let parse = parse_sql("SELECT a FROM t", &POSTGRESQL)?;
//! let file = SourceFile::cast(parse.root).unwrap();
//! assert_eq!(file.statements().count(), 1);
//! ```

use super::{SqlSyntaxElement, SqlSyntaxKind, SqlSyntaxNode, SqlSyntaxToken};
use crate::dialect::{BinaryOp, Dialect, Keyword};

/// Helper trait for casting CST nodes to typed wrappers
pub trait AstNode: Sized {
    fn can_cast(kind: SqlSyntaxKind) -> bool;
    fn cast(node: SqlSyntaxNode) -> Option<Self>;
    fn syntax(&self) -> &SqlSyntaxNode;
}

macro_rules! ast_node {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash)]
        pub struct $name {
            syntax: SqlSyntaxNode,
        }

        impl AstNode for $name {
            fn can_cast(kind: SqlSyntaxKind) -> bool {
                kind == SqlSyntaxKind::$kind
            }

            fn cast(node: SqlSyntaxNode) -> Option<Self> {
                if Self::can_cast(node.kind()) {
                    Some(Self { syntax: node })
                } else {
                    None
                }
            }

            fn syntax(&self) -> &SqlSyntaxNode {
                &self.syntax
            }
        }
    };
}

/// Child nodes and non-trivia tokens of `node`, in source order
pub fn significant_children(node: &SqlSyntaxNode) -> impl Iterator<Item = SqlSyntaxElement> + use<> {
    node.children_with_tokens()
        .filter(|element| !element.kind().is_trivia())
}

/// First non-trivia token at or below `node`
pub fn first_significant_token(node: &SqlSyntaxNode) -> Option<SqlSyntaxToken> {
    node.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| !token.kind().is_trivia())
}

fn child_of_kind(parent: &SqlSyntaxNode, kind: SqlSyntaxKind) -> Option<SqlSyntaxNode> {
    parent.children().find(|n| n.kind() == kind)
}

fn tokens(parent: &SqlSyntaxNode) -> impl Iterator<Item = SqlSyntaxToken> + use<> {
    parent
        .children_with_tokens()
        .filter_map(|e| e.into_token())
        .filter(|t| !t.kind().is_trivia())
}

/// Keyword spelled by a `Keyword` token
pub fn keyword_of(token: &SqlSyntaxToken) -> Option<Keyword> {
    if token.kind() == SqlSyntaxKind::Keyword {
        Keyword::from_word(token.text())
    } else {
        None
    }
}

fn keyword_token(parent: &SqlSyntaxNode, keyword: Keyword) -> Option<SqlSyntaxToken> {
    tokens(parent).find(|t| keyword_of(t) == Some(keyword))
}

// ============================================================================
// Statements
// ============================================================================

ast_node!(
    /// Root of every tree
    SourceFile => SourceFile
);

impl SourceFile {
    pub fn statements(&self) -> impl Iterator<Item = Statement> + use<> {
        self.syntax.children().filter_map(Statement::cast)
    }

    pub fn semicolons(&self) -> impl Iterator<Item = SqlSyntaxToken> + use<> {
        tokens(&self.syntax).filter(|t| t.kind() == SqlSyntaxKind::Semicolon)
    }

    /// Regions skipped by best-effort recovery
    pub fn error_nodes(&self) -> impl Iterator<Item = SqlSyntaxNode> + use<> {
        self.syntax
            .children()
            .filter(|n| n.kind() == SqlSyntaxKind::ErrorNode)
    }
}

/// Any top-level statement
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Statement {
    Select(SelectStmt),
    Insert(InsertStmt),
    Update(UpdateStmt),
    Delete(DeleteStmt),
}

impl AstNode for Statement {
    fn can_cast(kind: SqlSyntaxKind) -> bool {
        kind.is_statement()
    }

    fn cast(node: SqlSyntaxNode) -> Option<Self> {
        match node.kind() {
            SqlSyntaxKind::SelectStmt => SelectStmt::cast(node).map(Statement::Select),
            SqlSyntaxKind::InsertStmt => InsertStmt::cast(node).map(Statement::Insert),
            SqlSyntaxKind::UpdateStmt => UpdateStmt::cast(node).map(Statement::Update),
            SqlSyntaxKind::DeleteStmt => DeleteStmt::cast(node).map(Statement::Delete),
            _ => None,
        }
    }

    fn syntax(&self) -> &SqlSyntaxNode {
        match self {
            Statement::Select(stmt) => stmt.syntax(),
            Statement::Insert(stmt) => stmt.syntax(),
            Statement::Update(stmt) => stmt.syntax(),
            Statement::Delete(stmt) => stmt.syntax(),
        }
    }
}

ast_node!(SelectStmt => SelectStmt);

impl SelectStmt {
    pub fn with_clause(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::WithClause)
    }

    /// `SelectCore`, `CompoundSelect` or a parenthesized `SubqueryExpr`
    pub fn body(&self) -> Option<SqlSyntaxNode> {
        self.syntax.children().find(|n| {
            matches!(
                n.kind(),
                SqlSyntaxKind::SelectCore
                    | SqlSyntaxKind::CompoundSelect
                    | SqlSyntaxKind::SubqueryExpr
            )
        })
    }

    /// Clauses in source order, with a plain select core's clauses inlined
    pub fn clauses(&self) -> Vec<SqlSyntaxNode> {
        let mut clauses = Vec::new();
        for child in self.syntax.children() {
            if child.kind() == SqlSyntaxKind::SelectCore {
                clauses.extend(child.children());
            } else {
                clauses.push(child);
            }
        }
        clauses
    }
}

ast_node!(InsertStmt => InsertStmt);

impl InsertStmt {
    pub fn into_keyword(&self) -> Option<SqlSyntaxToken> {
        keyword_token(&self.syntax, Keyword::Into)
    }

    pub fn table(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::QualifiedName)
    }

    pub fn columns(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::ColumnList)
    }

    pub fn values(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::ValuesClause)
    }

    pub fn query(&self) -> Option<SelectStmt> {
        self.syntax.children().find_map(SelectStmt::cast)
    }

    pub fn is_default_values(&self) -> bool {
        keyword_token(&self.syntax, Keyword::Default).is_some()
    }
}

ast_node!(UpdateStmt => UpdateStmt);

impl UpdateStmt {
    pub fn table(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::TableRef)
    }

    pub fn assignments(&self) -> impl Iterator<Item = SqlSyntaxNode> + use<> {
        child_of_kind(&self.syntax, SqlSyntaxKind::SetClause)
            .into_iter()
            .flat_map(|set| set.children())
            .filter(|n| n.kind() == SqlSyntaxKind::Assignment)
    }
}

ast_node!(DeleteStmt => DeleteStmt);

impl DeleteStmt {
    pub fn from_keyword(&self) -> Option<SqlSyntaxToken> {
        keyword_token(&self.syntax, Keyword::From)
    }

    pub fn table(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::TableRef)
    }
}

// ============================================================================
// Clauses
// ============================================================================

ast_node!(
    /// `AS name` or a bare `name` after an expression or table
    Alias => Alias
);

impl Alias {
    pub fn as_keyword(&self) -> Option<SqlSyntaxToken> {
        keyword_token(&self.syntax, Keyword::As)
    }

    pub fn name(&self) -> Option<SqlSyntaxToken> {
        tokens(&self.syntax)
            .find(|t| matches!(t.kind(), SqlSyntaxKind::Ident | SqlSyntaxKind::QuotedIdent))
    }
}

ast_node!(SelectClause => SelectClause);

impl SelectClause {
    pub fn items(&self) -> impl Iterator<Item = SqlSyntaxNode> + use<> {
        self.syntax
            .children()
            .filter(|n| n.kind() == SqlSyntaxKind::SelectItem)
    }

    /// Comma after the last item, if any
    pub fn trailing_comma(&self) -> Option<SqlSyntaxToken> {
        let last = self
            .syntax
            .children_with_tokens()
            .filter(|e| !e.kind().is_trivia())
            .last()?;
        last.into_token()
            .filter(|t| t.kind() == SqlSyntaxKind::Comma)
    }
}

ast_node!(QualifiedName => QualifiedName);

impl QualifiedName {
    /// Name parts without the dots
    pub fn parts(&self) -> Vec<String> {
        tokens(&self.syntax)
            .filter(|t| t.kind() != SqlSyntaxKind::Dot)
            .map(|t| t.text().to_string())
            .collect()
    }
}

// ============================================================================
// Expressions
// ============================================================================

ast_node!(PlaceholderExpr => PlaceholderExpr);

impl PlaceholderExpr {
    pub fn token(&self) -> Option<SqlSyntaxToken> {
        tokens(&self.syntax).find(|t| t.kind() == SqlSyntaxKind::Placeholder)
    }

    pub fn text(&self) -> Option<String> {
        self.token().map(|t| t.text().to_string())
    }
}

ast_node!(ParenExpr => ParenExpr);

impl ParenExpr {
    pub fn inner(&self) -> Option<SqlSyntaxNode> {
        self.syntax.first_child()
    }

    pub fn l_paren(&self) -> Option<SqlSyntaxToken> {
        tokens(&self.syntax).find(|t| t.kind() == SqlSyntaxKind::LParen)
    }

    pub fn r_paren(&self) -> Option<SqlSyntaxToken> {
        tokens(&self.syntax).find(|t| t.kind() == SqlSyntaxKind::RParen)
    }
}

ast_node!(BinaryExpr => BinaryExpr);

impl BinaryExpr {
    pub fn lhs(&self) -> Option<SqlSyntaxNode> {
        self.syntax.first_child()
    }

    pub fn rhs(&self) -> Option<SqlSyntaxNode> {
        self.syntax.children().nth(1)
    }

    /// Operator tokens, `NOT` first for negated forms (`NOT LIKE`)
    pub fn operator_tokens(&self) -> Vec<SqlSyntaxToken> {
        tokens(&self.syntax).collect()
    }

    /// Operator meaning under `dialect`
    pub fn op(&self, dialect: &Dialect) -> Option<BinaryOp> {
        let operator = self.operator_tokens().pop()?;
        dialect
            .binary_operator(operator.kind(), keyword_of(&operator))
            .map(|entry| entry.op)
    }
}

ast_node!(PrefixExpr => PrefixExpr);

impl PrefixExpr {
    pub fn operator(&self) -> Option<SqlSyntaxToken> {
        tokens(&self.syntax).next()
    }

    pub fn operand(&self) -> Option<SqlSyntaxNode> {
        self.syntax.first_child()
    }
}

ast_node!(FuncCall => FuncCall);

impl FuncCall {
    /// Function name as written, including any qualifier
    pub fn name(&self) -> String {
        tokens(&self.syntax).map(|t| t.text().to_string()).collect()
    }

    pub fn args(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::ArgList)
    }
}

ast_node!(DataType => DataType);

impl DataType {
    /// Type name words (`DOUBLE`, `PRECISION`)
    pub fn words(&self) -> Vec<SqlSyntaxToken> {
        tokens(&self.syntax).collect()
    }

    pub fn params(&self) -> Option<SqlSyntaxNode> {
        child_of_kind(&self.syntax, SqlSyntaxKind::TypeParams)
    }
}
