//! Recursive-descent parser producing a lossless CST
//!
//! The parser walks the significant tokens from [`tokenize`](super::lexer::tokenize)
//! and emits them, together with their attached trivia, into a rowan green
//! tree. Statements and clauses are plain recursive descent; expressions use
//! precedence climbing driven by the dialect's operator table (see
//! [`expressions`]).
//!
//! Errors never unwind. The first error "halts" the parser: every lookahead
//! then reports end of input, so the enclosing productions close their nodes
//! without consuming anything. In strict mode parsing stops there. In
//! best-effort mode the tokens up to the next `;` are wrapped in an
//! `ErrorNode` and parsing resumes with the next statement. Either way every
//! token ends up in the tree.

mod expressions;

use super::lexer::{SqlToken, TokenStream, Trivia};
use super::{CstBuilder, SqlSyntaxKind, SqlSyntaxNode};
use crate::config::ParseMode;
use crate::diagnostics::{LineIndex, Span};
use crate::dialect::{Dialect, GrammarFeature, Keyword, ListSite};
use crate::error::ParseError;

use GrammarFeature as G;
use Keyword as K;
use SqlSyntaxKind as S;

const STATEMENT_START: &[&str] = &["`SELECT`", "`INSERT`", "`UPDATE`", "`DELETE`", "`WITH`", "`(`"];

/// Result of parsing one source file
#[derive(Debug, Clone)]
pub struct Parse {
    pub root: SqlSyntaxNode,
    pub errors: Vec<ParseError>,
    /// Trivia tokens the lexer produced, for the driver's completeness check
    pub lexed_trivia: usize,
}

impl Parse {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Parse a token stream into a CST
pub fn parse(
    source: &str,
    stream: &TokenStream,
    dialect: &'static Dialect,
    mode: ParseMode,
) -> Parse {
    let mut parser = Parser::new(source, &stream.tokens, dialect, mode);
    parser.source_file(&stream.eof_trivia);
    parser.finish(stream.trivia_count())
}

pub(crate) struct Parser<'a> {
    tokens: &'a [SqlToken],
    pos: usize,
    builder: CstBuilder,
    dialect: &'static Dialect,
    mode: ParseMode,
    line_index: LineIndex<'a>,
    source_len: usize,
    errors: Vec<ParseError>,
    /// Names of the statements being parsed, innermost last
    contexts: Vec<&'static str>,
    /// Statement that just closed, named by errors about what follows it
    closed_context: Option<&'static str>,
    halted: bool,
}

impl<'a> Parser<'a> {
    fn new(
        source: &'a str,
        tokens: &'a [SqlToken],
        dialect: &'static Dialect,
        mode: ParseMode,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            builder: CstBuilder::new(),
            dialect,
            mode,
            line_index: LineIndex::new(source),
            source_len: source.len(),
            errors: Vec::new(),
            contexts: Vec::new(),
            closed_context: None,
            halted: false,
        }
    }

    fn finish(self, lexed_trivia: usize) -> Parse {
        Parse {
            root: self.builder.finish(),
            errors: self.errors,
            lexed_trivia,
        }
    }

    // ---------------------------------------------------------------
    // Token access
    // ---------------------------------------------------------------

    fn nth(&self, n: usize) -> Option<&'a SqlToken> {
        if self.halted {
            return None;
        }
        self.tokens.get(self.pos + n)
    }

    fn current(&self) -> Option<&'a SqlToken> {
        self.nth(0)
    }

    fn nth_kind(&self, n: usize) -> SqlSyntaxKind {
        self.nth(n).map_or(S::Eof, |token| token.kind)
    }

    fn current_kind(&self) -> SqlSyntaxKind {
        self.nth_kind(0)
    }

    fn at(&self, kind: SqlSyntaxKind) -> bool {
        self.current_kind() == kind
    }

    fn at_end(&self) -> bool {
        self.current().is_none()
    }

    /// Reserved keyword at offset `n`
    fn nth_at_keyword(&self, n: usize, keyword: Keyword) -> bool {
        self.nth(n)
            .is_some_and(|token| token.kind == S::Keyword && token.is(keyword))
    }

    fn at_keyword(&self, keyword: Keyword) -> bool {
        self.nth_at_keyword(0, keyword)
    }

    fn at_any_keyword(&self, keywords: &[Keyword]) -> bool {
        keywords.iter().any(|keyword| self.at_keyword(*keyword))
    }

    /// Reserved or contextual keyword at offset `n`
    fn nth_at_word(&self, n: usize, keyword: Keyword) -> bool {
        self.nth(n).is_some_and(|token| {
            matches!(token.kind, S::Keyword | S::Ident) && token.is(keyword)
        })
    }

    fn at_word(&self, keyword: Keyword) -> bool {
        self.nth_at_word(0, keyword)
    }

    fn bump(&mut self) {
        if let Some(token) = self.current() {
            self.builder.add_token(token, token.kind);
            self.pos += 1;
        }
    }

    fn bump_as(&mut self, kind: SqlSyntaxKind) {
        if let Some(token) = self.current() {
            self.builder.add_token(token, kind);
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: SqlSyntaxKind) -> bool {
        if self.at(kind) {
            self.bump();
            return true;
        }
        false
    }

    fn eat_keyword(&mut self, keyword: Keyword) -> bool {
        if self.at_keyword(keyword) {
            self.bump();
            return true;
        }
        false
    }

    /// Consume a contextual word, re-tagging it as a keyword
    fn eat_word(&mut self, keyword: Keyword) -> bool {
        if self.at_word(keyword) {
            self.bump_as(S::Keyword);
            return true;
        }
        false
    }

    fn expect_word(&mut self, keyword: Keyword) -> bool {
        if self.eat_word(keyword) {
            return true;
        }
        let expected = format!("`{}`", keyword.as_str());
        self.error(&[expected.as_str()]);
        false
    }

    fn expect(&mut self, kind: SqlSyntaxKind) -> bool {
        if self.eat(kind) {
            return true;
        }
        let expected = kind.describe();
        self.error(&[expected.as_str()]);
        false
    }

    fn expect_keyword(&mut self, keyword: Keyword) -> bool {
        if self.eat_keyword(keyword) {
            return true;
        }
        let expected = format!("`{}`", keyword.as_str());
        self.error(&[expected.as_str()]);
        false
    }

    fn node(&mut self, kind: SqlSyntaxKind, parse: impl FnOnce(&mut Self)) {
        self.builder.start_node(kind);
        parse(self);
        self.builder.finish_node();
    }

    fn in_context(&mut self, context: &'static str, parse: impl FnOnce(&mut Self)) {
        self.contexts.push(context);
        parse(self);
        self.contexts.pop();
        if self.contexts.is_empty() {
            self.closed_context = Some(context);
        }
    }

    // ---------------------------------------------------------------
    // Errors and recovery
    // ---------------------------------------------------------------

    /// Record an error at the current token and halt
    ///
    /// Errors while halted are follow-ups of the first one and are dropped,
    /// as are errors at `Error` tokens, which the lexer already reported.
    fn error(&mut self, expected: &[&str]) {
        if self.halted {
            return;
        }
        self.halted = true;

        let token = self.tokens.get(self.pos);
        if token.is_some_and(|token| token.kind == S::Error) {
            return;
        }
        let (span, found) = match token {
            Some(token) => (token.span, describe_found(token)),
            None => (
                Span::new(self.source_len, self.source_len),
                S::Eof.describe(),
            ),
        };
        let error = ParseError {
            span,
            position: self.line_index.position(span.start),
            expected_one_of: expected.iter().map(|item| item.to_string()).collect(),
            found,
            context: self.contexts.last().copied().or(self.closed_context),
        };
        tracing::debug!(error = %error, "parse error");
        self.errors.push(error);
    }

    /// Wrap tokens up to the next `;` in an error node and resume
    fn recover(&mut self) {
        self.halted = false;
        if self.at_end() || self.at(S::Semicolon) {
            return;
        }
        self.builder.start_node(S::ErrorNode);
        while !self.at_end() && !self.at(S::Semicolon) {
            self.bump();
        }
        self.builder.finish_node();
    }

    /// Keep whatever strict mode left unparsed so the tree stays lossless
    fn skip_rest(&mut self) {
        self.halted = false;
        if self.at_end() {
            return;
        }
        self.builder.start_node(S::ErrorNode);
        while !self.at_end() {
            self.bump();
        }
        self.builder.finish_node();
    }

    // ---------------------------------------------------------------
    // Statements
    // ---------------------------------------------------------------

    fn source_file(&mut self, eof_trivia: &[Trivia]) {
        self.builder.start_node(S::SourceFile);
        loop {
            while self.eat(S::Semicolon) {}
            if self.at_end() {
                break;
            }

            self.closed_context = None;
            self.statement();
            if !self.halted && !self.at_end() && !self.at(S::Semicolon) {
                self.error(&["`;`", "end of input"]);
            }
            if self.halted {
                if self.mode == ParseMode::Strict {
                    break;
                }
                self.recover();
            }
        }
        self.skip_rest();
        self.builder.add_trivia(eof_trivia);
        self.builder.finish_node();
    }

    fn statement(&mut self) {
        if self.at_any_keyword(&[K::Select, K::With]) || self.at(S::LParen) {
            self.select_stmt();
        } else if self.at_keyword(K::Insert) {
            self.insert_stmt();
        } else if self.at_keyword(K::Update) {
            self.update_stmt();
        } else if self.at_keyword(K::Delete) {
            self.delete_stmt();
        } else {
            self.error(STATEMENT_START);
        }
    }

    pub(crate) fn select_stmt(&mut self) {
        self.in_context("SELECT statement", |p| {
            p.node(S::SelectStmt, |p| {
                if p.at_keyword(K::With) {
                    p.with_clause();
                }
                p.query_body();
                if p.at_keyword(K::Order) {
                    p.order_by_clause();
                }
                if p.at_keyword(K::Limit) {
                    p.limit_clause();
                }
                if p.at_keyword(K::Offset) {
                    p.offset_clause();
                }
                while p.at_keyword(K::For) && p.dialect.supports(G::LockingClause) {
                    p.locking_clause();
                }
            });
        });
    }

    fn with_clause(&mut self) {
        self.node(S::WithClause, |p| {
            p.bump();
            p.eat_word(K::Recursive);
            loop {
                p.cte();
                if !p.eat(S::Comma) {
                    break;
                }
            }
        });
    }

    fn cte(&mut self) {
        self.node(S::Cte, |p| {
            p.name();
            if p.at(S::LParen) {
                p.column_list();
            }
            p.expect_keyword(K::As);
            p.subquery();
        });
    }

    /// Select cores joined by set operators, left-associative
    fn query_body(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.query_operand();
        while self.at_any_keyword(&[K::Union, K::Intersect, K::Except]) {
            self.builder.start_node_at(checkpoint, S::CompoundSelect);
            self.bump();
            if !self.eat_keyword(K::All) {
                self.eat_keyword(K::Distinct);
            }
            self.query_operand();
            self.builder.finish_node();
        }
    }

    fn query_operand(&mut self) {
        if self.at(S::LParen) {
            self.subquery();
        } else if self.at_keyword(K::Select) {
            self.select_core();
        } else {
            self.error(&["`SELECT`", "`(`"]);
        }
    }

    /// `( select )`
    pub(crate) fn subquery(&mut self) {
        self.node(S::SubqueryExpr, |p| {
            if p.expect(S::LParen) {
                p.select_stmt();
                p.expect(S::RParen);
            }
        });
    }

    fn select_core(&mut self) {
        self.node(S::SelectCore, |p| {
            p.select_clause();
            if p.at_keyword(K::From) {
                p.from_clause();
            }
            if p.at_keyword(K::Where) {
                p.where_clause();
            }
            if p.at_keyword(K::Group) {
                p.group_by_clause();
            }
            if p.at_keyword(K::Having) {
                p.having_clause();
            }
        });
    }

    fn select_clause(&mut self) {
        self.node(S::SelectClause, |p| {
            p.bump();
            if p.at_keyword(K::Distinct)
                && p.nth_at_keyword(1, K::On)
                && p.dialect.supports(G::DistinctOn)
            {
                p.node(S::DistinctOn, |p| {
                    p.bump();
                    p.bump();
                    p.expr_list();
                });
            } else if !p.eat_keyword(K::Distinct) {
                p.eat_keyword(K::All);
            }
            p.select_items(Some(ListSite::SelectList));
        });
    }

    /// Comma-separated select items; `site` marks lists that may end in a comma
    fn select_items(&mut self, site: Option<ListSite>) {
        loop {
            self.node(S::SelectItem, |p| {
                p.expr();
                p.opt_alias();
            });
            if !self.eat(S::Comma) {
                break;
            }
            if let Some(site) = site
                && self.dialect.allows_trailing_comma(site)
                && !self.can_start_expression()
            {
                break;
            }
        }
    }

    fn opt_alias(&mut self) {
        if self.at_keyword(K::As) {
            self.node(S::Alias, |p| {
                p.bump();
                p.name();
            });
        } else if matches!(self.current_kind(), S::Ident | S::QuotedIdent) {
            self.node(S::Alias, Self::bump);
        }
    }

    /// Table alias, optionally renaming the table's columns (`AS x (a, b)`)
    fn opt_table_alias(&mut self) {
        let named = self.at_keyword(K::As) || matches!(self.current_kind(), S::Ident | S::QuotedIdent);
        if !named {
            return;
        }
        self.node(S::Alias, |p| {
            if p.eat_keyword(K::As) {
                p.name();
            } else {
                p.bump();
            }
            if p.at(S::LParen) && p.dialect.supports(G::AliasColumnList) {
                p.column_list();
            }
        });
    }

    fn name(&mut self) -> bool {
        if matches!(self.current_kind(), S::Ident | S::QuotedIdent) {
            self.bump();
            return true;
        }
        self.error(&["identifier"]);
        false
    }

    fn qualified_name(&mut self) {
        self.node(S::QualifiedName, |p| {
            if p.name() {
                while p.at(S::Dot) && matches!(p.nth_kind(1), S::Ident | S::QuotedIdent) {
                    p.bump();
                    p.bump();
                }
            }
        });
    }

    fn column_list(&mut self) {
        self.node(S::ColumnList, |p| {
            if !p.expect(S::LParen) {
                return;
            }
            loop {
                p.name();
                if !p.eat(S::Comma) {
                    break;
                }
            }
            p.expect(S::RParen);
        });
    }

    fn from_clause(&mut self) {
        self.node(S::FromClause, |p| {
            p.bump();
            loop {
                p.from_item();
                if !p.eat(S::Comma) {
                    break;
                }
            }
        });
    }

    /// A table followed by any number of joins, left-associative
    fn from_item(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.table_primary();
        while self.at_any_keyword(&[
            K::Join,
            K::Inner,
            K::Left,
            K::Right,
            K::Full,
            K::Cross,
            K::Natural,
        ]) {
            self.builder.start_node_at(checkpoint, S::JoinExpr);
            self.join_operator();
            self.table_primary();
            if self.at_keyword(K::On) {
                self.node(S::OnClause, |p| {
                    p.bump();
                    p.expr();
                });
            } else if self.at_keyword(K::Using) {
                self.node(S::UsingClause, |p| {
                    p.bump();
                    p.column_list();
                });
            }
            self.builder.finish_node();
        }
    }

    fn join_operator(&mut self) {
        self.eat_keyword(K::Natural);
        if self.eat_keyword(K::Left) || self.eat_keyword(K::Right) || self.eat_keyword(K::Full) {
            self.eat_keyword(K::Outer);
        } else if !self.eat_keyword(K::Inner) {
            self.eat_keyword(K::Cross);
        }
        self.expect_keyword(K::Join);
    }

    fn table_primary(&mut self) {
        if self.at(S::LParen) {
            self.node(S::DerivedTable, |p| {
                p.subquery();
                p.opt_table_alias();
            });
        } else {
            self.table_ref();
        }
    }

    fn table_ref(&mut self) {
        self.node(S::TableRef, |p| {
            p.qualified_name();
            p.opt_table_alias();
        });
    }

    fn where_clause(&mut self) {
        self.node(S::WhereClause, |p| {
            p.bump();
            p.expr();
        });
    }

    fn group_by_clause(&mut self) {
        self.node(S::GroupByClause, |p| {
            p.bump();
            p.expect_keyword(K::By);
            loop {
                p.expr();
                if !p.eat(S::Comma) {
                    break;
                }
            }
        });
    }

    fn having_clause(&mut self) {
        self.node(S::HavingClause, |p| {
            p.bump();
            p.expr();
        });
    }

    fn order_by_clause(&mut self) {
        self.node(S::OrderByClause, |p| {
            p.bump();
            p.expect_keyword(K::By);
            loop {
                p.order_item();
                if !p.eat(S::Comma) {
                    break;
                }
            }
        });
    }

    fn order_item(&mut self) {
        self.node(S::OrderItem, |p| {
            p.expr();
            if !p.eat_keyword(K::Asc) {
                p.eat_keyword(K::Desc);
            }
            if p.eat_word(K::Nulls) && !p.eat_word(K::First) && !p.eat_word(K::Last) {
                p.error(&["`FIRST`", "`LAST`"]);
            }
        });
    }

    fn limit_clause(&mut self) {
        self.node(S::LimitClause, |p| {
            p.bump();
            if p.at_keyword(K::All) && p.dialect.supports(G::LimitAll) {
                p.node(S::Literal, Self::bump);
                return;
            }
            p.expr();
            if p.eat(S::Comma) {
                p.expr();
            }
        });
    }

    fn offset_clause(&mut self) {
        self.node(S::OffsetClause, |p| {
            p.bump();
            p.expr();
        });
    }

    /// `FOR UPDATE | NO KEY UPDATE | SHARE | KEY SHARE [OF t, ...] [NOWAIT | SKIP LOCKED]`
    fn locking_clause(&mut self) {
        self.node(S::LockingClause, |p| {
            p.bump();
            if p.eat_word(K::No) {
                p.expect_word(K::Key);
                p.expect_keyword(K::Update);
            } else if p.eat_word(K::Key) {
                p.expect_word(K::Share);
            } else if !p.eat_keyword(K::Update) && !p.eat_word(K::Share) {
                p.error(&["`UPDATE`", "`SHARE`", "`NO KEY`", "`KEY SHARE`"]);
                return;
            }
            if p.eat_word(K::Of) {
                loop {
                    p.qualified_name();
                    if !p.eat(S::Comma) {
                        break;
                    }
                }
            }
            if !p.eat_word(K::Nowait) && p.eat_word(K::Skip) {
                p.expect_word(K::Locked);
            }
        });
    }

    fn returning_clause(&mut self) {
        self.node(S::ReturningClause, |p| {
            p.bump();
            p.select_items(None);
        });
    }

    fn insert_stmt(&mut self) {
        self.in_context("INSERT statement", |p| {
            p.node(S::InsertStmt, |p| {
                p.bump();
                if !p.eat_keyword(K::Into) && !p.dialect.insert_into_optional {
                    p.error(&["`INTO`"]);
                }
                p.qualified_name();
                if p.at(S::LParen) && !p.nth_at_keyword(1, K::Select) && !p.nth_at_keyword(1, K::With) {
                    p.column_list();
                }

                if p.at_keyword(K::Values) {
                    p.values_clause();
                } else if p.at_keyword(K::Default) {
                    p.bump();
                    p.expect_keyword(K::Values);
                } else if p.at_any_keyword(&[K::Select, K::With]) || p.at(S::LParen) {
                    p.select_stmt();
                } else {
                    p.error(&["`VALUES`", "`SELECT`", "`DEFAULT`"]);
                }

                while p.at_keyword(K::On)
                    && p.nth_at_word(1, K::Conflict)
                    && p.dialect.supports(G::OnConflict)
                {
                    p.on_conflict_clause();
                }
                if p.at_keyword(K::Returning) {
                    p.returning_clause();
                }
            });
        });
    }

    fn values_clause(&mut self) {
        self.node(S::ValuesClause, |p| {
            p.bump();
            loop {
                p.expr_list();
                if !p.eat(S::Comma) {
                    break;
                }
            }
        });
    }

    /// `ON CONFLICT [target] DO NOTHING | DO UPDATE SET ... [WHERE ...]`
    fn on_conflict_clause(&mut self) {
        self.node(S::OnConflictClause, |p| {
            p.bump();
            p.eat_word(K::Conflict);
            if p.at(S::LParen) || p.at_keyword(K::On) {
                p.node(S::ConflictTarget, |p| {
                    if p.eat_keyword(K::On) {
                        p.expect_word(K::Constraint);
                        p.name();
                        return;
                    }
                    p.expr_list();
                    if p.at_keyword(K::Where) {
                        p.where_clause();
                    }
                });
            }
            p.node(S::ConflictAction, |p| {
                if !p.expect_word(K::Do) || p.eat_word(K::Nothing) {
                    return;
                }
                if !p.at_keyword(K::Update) {
                    p.error(&["`NOTHING`", "`UPDATE`"]);
                    return;
                }
                p.bump();
                p.set_clause();
                if p.at_keyword(K::Where) {
                    p.where_clause();
                }
            });
        });
    }

    fn set_clause(&mut self) {
        self.node(S::SetClause, |p| {
            if !p.expect_keyword(K::Set) {
                return;
            }
            loop {
                p.assignment();
                if !p.eat(S::Comma) {
                    break;
                }
            }
        });
    }

    fn update_stmt(&mut self) {
        self.in_context("UPDATE statement", |p| {
            p.node(S::UpdateStmt, |p| {
                p.bump();
                p.table_ref();
                p.set_clause();
                if p.at_keyword(K::From) {
                    p.from_clause();
                }
                if p.at_keyword(K::Where) {
                    p.where_clause();
                }
                if p.at_keyword(K::Returning) {
                    p.returning_clause();
                }
            });
        });
    }

    fn assignment(&mut self) {
        self.node(S::Assignment, |p| {
            p.node(S::ColumnRef, |p| {
                if p.name() {
                    while p.at(S::Dot) && matches!(p.nth_kind(1), S::Ident | S::QuotedIdent) {
                        p.bump();
                        p.bump();
                    }
                }
            });
            p.expect(S::Eq);
            p.expr();
        });
    }

    fn delete_stmt(&mut self) {
        self.in_context("DELETE statement", |p| {
            p.node(S::DeleteStmt, |p| {
                p.bump();
                if !p.eat_keyword(K::From) && !p.dialect.delete_from_optional {
                    p.error(&["`FROM`"]);
                }
                p.table_ref();
                if p.at_keyword(K::Where) {
                    p.where_clause();
                }
                if p.at_keyword(K::Returning) {
                    p.returning_clause();
                }
            });
        });
    }
}

fn describe_found(token: &SqlToken) -> String {
    match token.kind {
        S::Keyword | S::Ident | S::QuotedIdent | S::Number | S::String | S::Placeholder => {
            format!("`{}`", token.text)
        }
        kind => kind.describe(),
    }
}
