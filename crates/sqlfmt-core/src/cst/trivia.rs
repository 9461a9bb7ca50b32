//! Trivia handling for the SQL CST
//!
//! Whitespace, newlines and comments live in the tree as ordinary tokens next
//! to the significant token that owns them. [`TriviaCollector`] recovers that
//! ownership from a built tree: which trivia leads a token, which trails it,
//! and what is left at end of file. The printer uses the result to place
//! comments; the driver uses [`TriviaCollector::check_attachment`] to verify
//! every trivia token sits under the same node as its owner.

use super::lexer::split_trivia;
use super::{SqlSyntaxKind, SqlSyntaxNode, SqlSyntaxToken};
use rowan::{TextRange, TextSize};
use std::collections::HashMap;

/// A single trivia token copied out of the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriviaToken {
    pub kind: SqlSyntaxKind,
    pub text: String,
    pub range: TextRange,
}

impl TriviaToken {
    pub fn from_token(token: &SqlSyntaxToken) -> Self {
        Self {
            kind: token.kind(),
            text: token.text().to_string(),
            range: token.text_range(),
        }
    }

    pub fn is_comment(&self) -> bool {
        self.kind.is_comment()
    }

    pub fn is_newline(&self) -> bool {
        self.kind == SqlSyntaxKind::Newline
    }

    /// Whether a newline must follow this token when printed
    pub fn ends_line(&self) -> bool {
        self.kind == SqlSyntaxKind::LineComment
    }
}

/// Trivia owned by one significant token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriviaInfo {
    pub leading: Vec<TriviaToken>,
    pub trailing: Vec<TriviaToken>,
}

impl TriviaInfo {
    pub fn is_empty(&self) -> bool {
        self.leading.is_empty() && self.trailing.is_empty()
    }

    pub fn has_comments(&self) -> bool {
        self.leading
            .iter()
            .chain(&self.trailing)
            .any(TriviaToken::is_comment)
    }

    pub fn leading_comments(&self) -> impl Iterator<Item = &TriviaToken> {
        self.leading.iter().filter(|t| t.is_comment())
    }

    pub fn trailing_comments(&self) -> impl Iterator<Item = &TriviaToken> {
        self.trailing.iter().filter(|t| t.is_comment())
    }

    /// Number of newlines in the leading trivia
    pub fn leading_newlines(&self) -> usize {
        self.leading.iter().filter(|t| t.is_newline()).count()
    }
}

/// Trivia of a whole tree, keyed by the start offset of the owning token
#[derive(Debug, Clone, Default)]
pub struct TriviaMap {
    by_token: HashMap<TextSize, TriviaInfo>,
    pub eof: Vec<TriviaToken>,
    /// Total number of trivia tokens in the tree
    pub trivia_count: usize,
    /// Total number of comments in the tree
    pub comment_count: usize,
}

impl TriviaMap {
    pub fn get(&self, token: &SqlSyntaxToken) -> Option<&TriviaInfo> {
        self.by_token.get(&token.text_range().start())
    }

    pub fn get_at(&self, offset: TextSize) -> Option<&TriviaInfo> {
        self.by_token.get(&offset)
    }

    pub fn eof_comments(&self) -> impl Iterator<Item = &TriviaToken> {
        self.eof.iter().filter(|t| t.is_comment())
    }
}

/// Collects trivia ownership from a CST
#[derive(Debug, Default)]
pub struct TriviaCollector;

impl TriviaCollector {
    pub fn new() -> Self {
        Self
    }

    /// Map every significant token to its leading and trailing trivia
    pub fn collect(&self, root: &SqlSyntaxNode) -> TriviaMap {
        let tokens = all_tokens(root);
        let kinds: Vec<SqlSyntaxKind> = tokens.iter().map(|t| t.kind()).collect();
        let (slots, eof) = split_trivia(&kinds);

        let copy = |range: std::ops::Range<usize>| -> Vec<TriviaToken> {
            tokens[range].iter().map(TriviaToken::from_token).collect()
        };

        let mut map = TriviaMap {
            trivia_count: kinds.iter().filter(|k| k.is_trivia()).count(),
            comment_count: kinds.iter().filter(|k| k.is_comment()).count(),
            eof: copy(eof),
            ..TriviaMap::default()
        };
        for slot in slots {
            if slot.leading.is_empty() && slot.trailing.is_empty() {
                continue;
            }
            map.by_token.insert(
                tokens[slot.token].text_range().start(),
                TriviaInfo {
                    leading: copy(slot.leading),
                    trailing: copy(slot.trailing),
                },
            );
        }
        map
    }

    /// Verify each trivia token has the same parent as the token owning it
    ///
    /// End-of-file trivia must be a direct child of the root. Returns a
    /// description of the first misplaced trivia token.
    pub fn check_attachment(&self, root: &SqlSyntaxNode) -> Result<(), String> {
        let tokens = all_tokens(root);
        let kinds: Vec<SqlSyntaxKind> = tokens.iter().map(|t| t.kind()).collect();
        let (slots, eof) = split_trivia(&kinds);

        for slot in &slots {
            let owner = &tokens[slot.token];
            for index in slot.leading.clone().chain(slot.trailing.clone()) {
                if tokens[index].parent() != owner.parent() {
                    return Err(misplaced(&tokens[index], owner.kind()));
                }
            }
        }
        for index in eof {
            if tokens[index].parent().as_ref() != Some(root) {
                return Err(misplaced(&tokens[index], SqlSyntaxKind::SourceFile));
            }
        }
        Ok(())
    }
}

fn all_tokens(root: &SqlSyntaxNode) -> Vec<SqlSyntaxToken> {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .collect()
}

fn misplaced(trivia: &SqlSyntaxToken, owner: SqlSyntaxKind) -> String {
    format!(
        "{} at {:?} is not attached next to its owning {}",
        trivia.kind(),
        trivia.text_range(),
        owner
    )
}
