//! Green tree builder
//!
//! Thin wrapper over [`rowan::GreenNodeBuilder`] speaking [`SqlSyntaxKind`]
//! instead of raw kinds. The parser drives it; checkpoints let a node be
//! opened retroactively once an infix operator shows what the left operand
//! belonged to.

use rowan::{Checkpoint, GreenNodeBuilder};

use super::{SqlSyntaxKind, SqlSyntaxNode, SqlToken, lexer::Trivia};

/// Builder for SQL concrete syntax trees
#[derive(Default)]
pub struct CstBuilder {
    builder: GreenNodeBuilder<'static>,
}

impl CstBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start_node(&mut self, kind: SqlSyntaxKind) {
        self.builder.start_node(kind.into());
    }

    pub fn finish_node(&mut self) {
        self.builder.finish_node();
    }

    pub fn checkpoint(&self) -> Checkpoint {
        self.builder.checkpoint()
    }

    /// Wrap everything emitted since `checkpoint` in a new node of `kind`
    pub fn start_node_at(&mut self, checkpoint: Checkpoint, kind: SqlSyntaxKind) {
        self.builder.start_node_at(checkpoint, kind.into());
    }

    pub fn token(&mut self, kind: SqlSyntaxKind, text: &str) {
        self.builder.token(kind.into(), text);
    }

    /// Emit a significant token together with its attached trivia
    ///
    /// `kind` may differ from `token.kind` when the parser re-tags a
    /// contextual word as a keyword.
    pub fn add_token(&mut self, token: &SqlToken, kind: SqlSyntaxKind) {
        self.add_trivia(&token.leading);
        self.token(kind, &token.text);
        self.add_trivia(&token.trailing);
    }

    pub fn add_trivia(&mut self, trivia: &[Trivia]) {
        for piece in trivia {
            self.token(piece.kind, &piece.text);
        }
    }

    pub fn finish(self) -> SqlSyntaxNode {
        SqlSyntaxNode::new_root(self.builder.finish())
    }
}
