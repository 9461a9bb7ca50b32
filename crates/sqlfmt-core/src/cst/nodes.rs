//! Type aliases for SQL CST nodes
//!
//! These types are Rowan's generic tree types parameterized with
//! [`SqlLanguage`]. Trees are built per format call on one thread and
//! dropped after printing, so the `!Send` red nodes never cross threads.

use super::SqlLanguage;

/// A node in the SQL concrete syntax tree
///
/// ```rust,ignore
/// use sqlfmt_core::cst::{SqlSyntaxKind, parse_sql};
///
/// let parse = parse_sql("SELECT 1", &POSTGRESQL)?;
/// assert_eq!(parse.root.kind(), SqlSyntaxKind::SourceFile);
/// assert_eq!(parse.root.text().to_string(), "SELECT 1");
/// ```
pub type SqlSyntaxNode = rowan::SyntaxNode<SqlLanguage>;

/// A token in the SQL concrete syntax tree (keywords, identifiers, trivia, ...)
pub type SqlSyntaxToken = rowan::SyntaxToken<SqlLanguage>;

/// Either a node or a token
pub type SqlSyntaxElement = rowan::SyntaxElement<SqlLanguage>;

/// Iterator over the children of a node
pub type SqlSyntaxNodeChildren = rowan::SyntaxNodeChildren<SqlLanguage>;
