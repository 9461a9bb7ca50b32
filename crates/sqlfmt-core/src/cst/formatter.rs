//! CST-based formatter for SQL
//!
//! Lowers a parsed tree into [`FormatElement`]s under a resolved
//! [`StylePolicy`] and hands them to the [`Printer`]. It can:
//! - Re-case keywords and re-quote identifiers
//! - Apply the dialect's canonical rewrites when `canonicalSyntax` is on
//! - Lay statements out clause by clause, breaking only what does not fit
//! - Keep every comment next to the token that owns it
//!
//! Statements print as one group, each clause as a nested group whose body
//! is indented under its keyword:
//!
//! ```text
//! SELECT a, b FROM t WHERE a = 1        -- fits
//!
//! SELECT
//!   customer_id,
//!   sum(amount) AS total
//! FROM orders
//! WHERE
//!   status = 'paid'
//!   AND created_at > $1
//! ```
//!
//! With `layout: preserve` nothing is lowered: every token and trivia token
//! is copied verbatim and only keywords are re-cased.

use super::ast::{
    Alias, AstNode, BinaryExpr, DataType, DeleteStmt, InsertStmt, ParenExpr, PrefixExpr,
    SelectStmt, first_significant_token, keyword_of, significant_children,
};
use super::format_element::{
    FormatElement, dedent, empty_line, group, hard_line_break, if_break, indent, line_suffix,
    soft_line_break, soft_line_break_or_empty, space, text, token,
};
use super::printer::{Printer, PrinterOptions};
use super::trivia::{TriviaCollector, TriviaMap};
use super::{SqlSyntaxElement, SqlSyntaxKind, SqlSyntaxNode, SqlSyntaxToken};
use crate::config::{IdentifierQuotes, KeywordCase, LayoutMode};
use crate::dialect::{BinaryOp, CanonicalRule, Keyword, ListSite, QuoteStyle};
use crate::error::SqlFmtError;
use crate::style::{StylePolicy, TrailingCommaDecision};
use crate::Result;
use rowan::{NodeOrToken, TextSize};
use std::borrow::Cow;
use std::collections::HashSet;

use SqlSyntaxKind as S;

type FormatResult = Result<()>;

/// Print a parsed tree under `policy`
///
/// The tree must be free of error nodes. Fails with
/// [`SqlFmtError::InternalInvariantViolation`] if the tree contains a node
/// kind the formatter does not know or a comment goes unprinted.
pub fn print_tree(root: &SqlSyntaxNode, policy: &StylePolicy) -> Result<String> {
    if policy.layout == LayoutMode::Preserve {
        return Ok(print_verbatim(root, policy));
    }

    let trivia = TriviaCollector::new().collect(root);
    let mut formatter = Formatter::new(policy, trivia, reference_case(root));
    formatter.source_file(root)?;
    formatter.check_comments()?;

    let elements = formatter.finish();
    let mut printer = Printer::new(PrinterOptions::from(policy));
    Ok(printer.print(&elements))
}

/// Copy every token as written, re-casing keywords only
pub fn print_verbatim(root: &SqlSyntaxNode, policy: &StylePolicy) -> String {
    let mut output = String::with_capacity(usize::from(root.text_range().len()));
    for token in root
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
    {
        if token.kind() == S::Keyword {
            output.push_str(&policy.keyword_text(token.text()));
        } else {
            output.push_str(token.text());
        }
    }
    output
}

/// Case the author used for the file's first keyword
fn reference_case(root: &SqlSyntaxNode) -> KeywordCase {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .find(|token| token.kind() == S::Keyword)
        .map_or(KeywordCase::Upper, |token| case_of(token.text()))
}

fn case_of(word: &str) -> KeywordCase {
    let has_lower = word.bytes().any(|b| b.is_ascii_lowercase());
    let has_upper = word.bytes().any(|b| b.is_ascii_uppercase());
    if has_lower && !has_upper {
        KeywordCase::Lower
    } else {
        KeywordCase::Upper
    }
}

/// Expressions whose parentheses never change meaning
fn is_primary(kind: SqlSyntaxKind) -> bool {
    matches!(
        kind,
        S::Literal
            | S::ColumnRef
            | S::AllColumns
            | S::PlaceholderExpr
            | S::FuncCall
            | S::ParenExpr
            | S::CaseExpr
            | S::CastExpr
            | S::ExistsExpr
            | S::SubqueryExpr
            | S::TypedLiteral
            | S::SubscriptExpr
    )
}

/// Clause nodes that start a new line when their statement breaks
fn is_clause(kind: SqlSyntaxKind) -> bool {
    matches!(
        kind,
        S::WithClause
            | S::SelectClause
            | S::FromClause
            | S::WhereClause
            | S::GroupByClause
            | S::HavingClause
            | S::OrderByClause
            | S::LimitClause
            | S::OffsetClause
            | S::ValuesClause
            | S::SetClause
            | S::ReturningClause
            | S::OnConflictClause
            | S::LockingClause
            | S::SelectStmt
            | S::CompoundSelect
            | S::SubqueryExpr
    )
}

fn unprintable(element: impl std::fmt::Debug) -> SqlFmtError {
    SqlFmtError::invariant(format!("formatter cannot print {element:?}"))
}

struct Formatter<'a> {
    policy: &'a StylePolicy,
    trivia: TriviaMap,
    reference_case: KeywordCase,
    out: Vec<FormatElement>,
    /// Tokens whose leading comments were already printed ahead of a group
    hoisted: HashSet<TextSize>,
    /// Trailing line comments moved past the following `,` or `;`
    deferred: Vec<String>,
    comments_printed: usize,
}

impl<'a> Formatter<'a> {
    fn new(policy: &'a StylePolicy, trivia: TriviaMap, reference_case: KeywordCase) -> Self {
        Self {
            policy,
            trivia,
            reference_case,
            out: Vec::new(),
            hoisted: HashSet::new(),
            deferred: Vec::new(),
            comments_printed: 0,
        }
    }

    fn finish(self) -> Vec<FormatElement> {
        self.out
    }

    fn check_comments(&self) -> FormatResult {
        if self.comments_printed != self.trivia.comment_count || !self.deferred.is_empty() {
            return Err(SqlFmtError::invariant(format!(
                "printed {} of {} comments",
                self.comments_printed, self.trivia.comment_count
            )));
        }
        Ok(())
    }

    fn rewrites(&self, rule: CanonicalRule) -> bool {
        self.policy.rewrites(rule)
    }

    // ---------------------------------------------------------------
    // Building blocks
    // ---------------------------------------------------------------

    fn push(&mut self, element: FormatElement) {
        self.out.push(element);
    }

    fn group(&mut self, build: impl FnOnce(&mut Self) -> FormatResult) -> FormatResult {
        let start = self.out.len();
        build(self)?;
        let children = self.out.split_off(start);
        self.out.push(group(children));
        Ok(())
    }

    /// Source token, spelled under the style policy, with its comments
    fn token(&mut self, token: &SqlSyntaxToken) {
        let spelled = self.spell(token);
        self.replaced_token(token, &spelled);
    }

    /// Source token printed as `replacement`, keeping its comments
    fn replaced_token(&mut self, token: &SqlSyntaxToken, replacement: &str) {
        self.leading_comments(token);
        self.out
            .push(text(replacement, token.text_range().start()));
        self.trailing_comments(token);
    }

    /// Source token removed by a rewrite; only its comments are printed
    fn dropped_token(&mut self, token: &SqlSyntaxToken) {
        self.leading_comments(token);
        self.trailing_comments(token);
    }

    /// Keyword that is not in the source
    fn inserted_keyword(&mut self, upper: &'static str) {
        match self.policy.inserted_keyword(upper, self.reference_case) {
            Cow::Borrowed(spelling) => self.push(token(spelling)),
            Cow::Owned(spelling) => self.push(text(&spelling, TextSize::default())),
        }
    }

    fn spell<'t>(&self, token: &'t SqlSyntaxToken) -> Cow<'t, str> {
        match token.kind() {
            S::Keyword => self.policy.keyword_text(token.text()),
            S::QuotedIdent => self.requote(token.text()),
            _ => Cow::Borrowed(token.text()),
        }
    }

    /// Re-quote with the dialect's primary style when no escaping is involved
    fn requote<'t>(&self, quoted: &'t str) -> Cow<'t, str> {
        if self.policy.identifier_quotes != IdentifierQuotes::Canonical {
            return Cow::Borrowed(quoted);
        }
        let (Some(current), Some(target)) =
            (QuoteStyle::of(quoted), self.policy.dialect.canonical_quote())
        else {
            return Cow::Borrowed(quoted);
        };
        if current == target || quoted.len() < 2 {
            return Cow::Borrowed(quoted);
        }
        let inner = &quoted[1..quoted.len() - 1];
        if inner.contains([current.close(), target.open(), target.close()]) {
            return Cow::Borrowed(quoted);
        }
        Cow::Owned(format!("{}{inner}{}", target.open(), target.close()))
    }

    // ---------------------------------------------------------------
    // Comments
    // ---------------------------------------------------------------

    fn leading_comments(&mut self, token: &SqlSyntaxToken) {
        let offset = token.text_range().start();
        if self.hoisted.contains(&offset) {
            return;
        }
        let Some(info) = self.trivia.get_at(offset) else {
            return;
        };
        for comment in info.leading_comments() {
            self.out.push(hard_line_break());
            self.out
                .push(text(&comment.text, comment.range.start()));
            self.out.push(hard_line_break());
            self.comments_printed += 1;
        }
    }

    fn trailing_comments(&mut self, token: &SqlSyntaxToken) {
        let offset = token.text_range().start();
        let mut line_comments = std::mem::take(&mut self.deferred);
        if let Some(info) = self.trivia.get_at(offset) {
            for comment in info.trailing_comments() {
                self.comments_printed += 1;
                if comment.ends_line() {
                    line_comments.push(comment.text.clone());
                } else {
                    self.out.push(space());
                    self.out
                        .push(text(&comment.text, comment.range.start()));
                }
            }
        }
        if line_comments.is_empty() {
            return;
        }

        let next = next_significant_token(token);
        if next.is_some_and(|next| matches!(next.kind(), S::Comma | S::Semicolon)) {
            self.deferred = line_comments;
        } else {
            for comment in line_comments {
                self.out.push(line_suffix(&comment));
            }
        }
    }

    /// Print the leading comments of `node`'s first token ahead of whatever
    /// group is about to open, keeping blank lines in front of them
    fn hoist_comments(&mut self, node: &SqlSyntaxNode) {
        let Some(first) = first_significant_token(node) else {
            return;
        };
        let offset = first.text_range().start();
        if !self.hoisted.insert(offset) {
            return;
        }
        let Some(info) = self.trivia.get_at(offset) else {
            return;
        };

        let mut newlines = 0;
        let mut printed = false;
        for trivia in &info.leading {
            if trivia.is_newline() {
                newlines += 1;
            } else if trivia.is_comment() {
                self.out.push(if newlines >= 2 {
                    empty_line()
                } else {
                    hard_line_break()
                });
                self.out
                    .push(text(&trivia.text, trivia.range.start()));
                self.comments_printed += 1;
                newlines = 0;
                printed = true;
            }
        }
        if printed {
            self.out.push(if newlines >= 2 {
                empty_line()
            } else {
                hard_line_break()
            });
        }
    }

    /// Whether a blank line precedes `node` (before any comment) in the source
    fn blank_line_before(&self, node: &SqlSyntaxElement) -> bool {
        let first = match node {
            NodeOrToken::Node(node) => first_significant_token(node),
            NodeOrToken::Token(token) => Some(token.clone()),
        };
        let Some(info) = first.and_then(|t| self.trivia.get_at(t.text_range().start())) else {
            return false;
        };
        info.leading
            .iter()
            .take_while(|t| !t.is_comment())
            .filter(|t| t.is_newline())
            .count()
            >= 2
    }

    // ---------------------------------------------------------------
    // File and statements
    // ---------------------------------------------------------------

    fn source_file(&mut self, root: &SqlSyntaxNode) -> FormatResult {
        let children: Vec<SqlSyntaxElement> = significant_children(root).collect();
        let mut index = 0;
        while index < children.len() {
            let element = &children[index];
            if index > 0 {
                self.push(if self.blank_line_before(element) {
                    empty_line()
                } else {
                    hard_line_break()
                });
            }

            match element {
                NodeOrToken::Node(statement) if statement.kind().is_statement() => {
                    let semicolon = children
                        .get(index + 1)
                        .and_then(|next| next.as_token())
                        .filter(|next| next.kind() == S::Semicolon)
                        .cloned();
                    self.hoist_comments(statement);
                    self.group(|f| {
                        f.statement(statement)?;
                        if let Some(semicolon) = &semicolon {
                            f.token(semicolon);
                        }
                        Ok(())
                    })?;
                    index += if semicolon.is_some() { 2 } else { 1 };
                }
                NodeOrToken::Token(semicolon) if semicolon.kind() == S::Semicolon => {
                    self.token(semicolon);
                    index += 1;
                }
                other => return Err(unprintable(other)),
            }
        }

        self.eof_comments();
        let ends_with_newline = root
            .last_token()
            .is_some_and(|token| token.text().ends_with('\n'));
        if ends_with_newline {
            self.push(hard_line_break());
        }
        Ok(())
    }

    fn eof_comments(&mut self) {
        let mut newlines = 0;
        let mut elements = Vec::new();
        for trivia in &self.trivia.eof {
            if trivia.is_newline() {
                newlines += 1;
            } else if trivia.is_comment() {
                elements.push(if newlines >= 2 {
                    empty_line()
                } else {
                    hard_line_break()
                });
                elements.push(text(&trivia.text, trivia.range.start()));
                newlines = 0;
            }
        }
        self.comments_printed += self.trivia.eof_comments().count();
        self.out.extend(elements);
    }

    /// Statement contents without the enclosing group
    fn statement(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        match node.kind() {
            S::SelectStmt => {
                let select = SelectStmt::cast(node.clone()).ok_or_else(|| unprintable(node))?;
                self.clause_sequence(select.clauses())
            }
            S::InsertStmt => {
                let insert = InsertStmt::cast(node.clone()).ok_or_else(|| unprintable(node))?;
                let into = insert.into_keyword().is_none() && self.rewrites(CanonicalRule::InsertInto);
                self.dml_statement(node, into.then_some("INTO"))
            }
            S::DeleteStmt => {
                let delete = DeleteStmt::cast(node.clone()).ok_or_else(|| unprintable(node))?;
                let from = delete.from_keyword().is_none() && self.rewrites(CanonicalRule::DeleteFrom);
                self.dml_statement(node, from.then_some("FROM"))
            }
            S::UpdateStmt => self.dml_statement(node, None),
            _ => Err(unprintable(node)),
        }
    }

    /// Clauses separated by soft breaks
    fn clause_sequence(&mut self, clauses: Vec<SqlSyntaxNode>) -> FormatResult {
        for (index, clause) in clauses.iter().enumerate() {
            if index > 0 {
                self.push(soft_line_break());
            }
            self.hoist_comments(clause);
            self.node(clause)?;
        }
        Ok(())
    }

    /// `INSERT`, `UPDATE` and `DELETE`: a head line followed by clauses
    ///
    /// `inserted` is a keyword added right after the statement keyword.
    fn dml_statement(
        &mut self,
        node: &SqlSyntaxNode,
        inserted: Option<&'static str>,
    ) -> FormatResult {
        for (index, element) in significant_children(node).enumerate() {
            match element {
                NodeOrToken::Node(child) if is_clause(child.kind()) => {
                    self.push(soft_line_break());
                    self.hoist_comments(&child);
                    self.node(&child)?;
                }
                NodeOrToken::Node(child) => {
                    self.push(space());
                    self.node(&child)?;
                }
                NodeOrToken::Token(word) => {
                    if index > 0 {
                        let starts_clause = keyword_of(&word) == Some(Keyword::Default);
                        self.push(if starts_clause { soft_line_break() } else { space() });
                    }
                    self.token(&word);
                }
            }
            if index == 0
                && let Some(keyword) = inserted
            {
                self.push(space());
                self.inserted_keyword(keyword);
            }
        }
        Ok(())
    }

    // ---------------------------------------------------------------
    // Nodes
    // ---------------------------------------------------------------

    fn node(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        match node.kind() {
            S::SelectStmt | S::InsertStmt | S::UpdateStmt | S::DeleteStmt => {
                self.group(|f| f.statement(node))
            }
            S::CompoundSelect => self.compound_select(node),
            S::SelectCore => self.clause_sequence(node.children().collect()),

            S::WithClause
            | S::SelectClause
            | S::FromClause
            | S::WhereClause
            | S::GroupByClause
            | S::HavingClause
            | S::OrderByClause
            | S::LimitClause
            | S::OffsetClause
            | S::ValuesClause
            | S::SetClause
            | S::ReturningClause => self.keyword_clause(node),

            S::Cte
            | S::SelectItem
            | S::TableRef
            | S::DerivedTable
            | S::OrderItem
            | S::IsExpr
            | S::InExpr
            | S::BetweenExpr
            | S::WhenClause
            | S::ElseClause
            | S::ExistsExpr
            | S::Assignment
            | S::UsingClause
            | S::DistinctOn
            | S::ConflictTarget
            | S::LockingClause
            | S::CollateExpr
            | S::TypedLiteral => self.spaced(node),

            S::QualifiedName
            | S::ColumnRef
            | S::AllColumns
            | S::Literal
            | S::PlaceholderExpr
            | S::FuncCall
            | S::TypeCastExpr
            | S::ArrayExpr
            | S::SubscriptExpr => self.tight(node),

            S::ColumnList | S::ExprList | S::ArgList | S::TypeParams | S::SubqueryExpr => {
                self.parenthesized(node)
            }

            S::Alias => self.alias(node),
            S::JoinExpr => self.join(node),
            S::OnClause => self.on_clause(node),
            S::OnConflictClause => self.on_conflict(node),
            S::ConflictAction => self.conflict_action(node),
            S::BinaryExpr => self.binary(node),
            S::PrefixExpr => self.prefix(node),
            S::ParenExpr => self.paren_expr(node),
            S::CaseExpr => self.case_expr(node),
            S::CastExpr => self.cast_expr(node),
            S::DataType => self.data_type(node),

            _ => Err(unprintable(node)),
        }
    }

    /// Children separated by single spaces, commas attached to what precedes them
    fn spaced(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        for (index, element) in significant_children(node).enumerate() {
            if index > 0 && element.kind() != S::Comma {
                self.push(space());
            }
            self.element(&element)?;
        }
        Ok(())
    }

    /// Children printed back to back (`schema.table`, `f(x)`, `a::int`)
    fn tight(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        for element in significant_children(node) {
            self.element(&element)?;
        }
        Ok(())
    }

    fn element(&mut self, element: &SqlSyntaxElement) -> FormatResult {
        match element {
            NodeOrToken::Node(node) => self.node(node),
            NodeOrToken::Token(token) => {
                self.token(token);
                Ok(())
            }
        }
    }

    /// `KEYWORD body`: the keywords, then the body indented on its own
    /// lines when the clause does not fit
    fn keyword_clause(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let kind = node.kind();
        let children: Vec<SqlSyntaxElement> = significant_children(node).collect();
        let body_start = children
            .iter()
            .position(|element| !matches!(element.kind(), S::Keyword | S::DistinctOn))
            .unwrap_or(children.len());
        let last_item = children.iter().rposition(|element| element.as_node().is_some());

        self.group(|f| {
            for (index, keyword) in children[..body_start].iter().enumerate() {
                if index > 0 {
                    f.push(space());
                }
                f.element(keyword)?;
            }
            f.push(indent());
            f.push(soft_line_break());

            let mut had_trailing_comma = false;
            for (index, element) in children.iter().enumerate().skip(body_start) {
                match element {
                    NodeOrToken::Node(item) => match kind {
                        S::WhereClause | S::HavingClause => f.clause_expr(item)?,
                        _ => f.node(item)?,
                    },
                    NodeOrToken::Token(comma) if comma.kind() == S::Comma => {
                        if last_item.is_none_or(|last| index > last) {
                            had_trailing_comma = true;
                            f.trailing_comma(comma);
                        } else if kind == S::FromClause
                            && f.rewrites(CanonicalRule::ExplicitCrossJoin)
                        {
                            f.dropped_token(comma);
                            f.push(soft_line_break());
                            f.inserted_keyword("CROSS");
                            f.push(space());
                            f.inserted_keyword("JOIN");
                            f.push(space());
                        } else {
                            f.token(comma);
                            f.push(soft_line_break());
                        }
                    }
                    other => return Err(unprintable(other)),
                }
            }
            if kind == S::SelectClause && !had_trailing_comma {
                let decision = f.policy.trailing_comma_at(ListSite::SelectList, false);
                if decision == TrailingCommaDecision::WhenBroken {
                    f.push(if_break(","));
                }
            }
            f.push(dedent());
            Ok(())
        })
    }

    fn trailing_comma(&mut self, comma: &SqlSyntaxToken) {
        match self.policy.trailing_comma_at(ListSite::SelectList, true) {
            TrailingCommaDecision::Always => self.token(comma),
            TrailingCommaDecision::Never => self.dropped_token(comma),
            TrailingCommaDecision::WhenBroken => {
                self.push(if_break(","));
                self.dropped_token(comma);
            }
        }
    }

    /// Condition of `WHERE`, `HAVING` and `ON`; outer parentheses are
    /// redundant there
    fn clause_expr(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        if self.rewrites(CanonicalRule::RedundantParens)
            && let Some(paren) = ParenExpr::cast(node.clone())
            && let (Some(open), Some(inner), Some(close)) =
                (paren.l_paren(), paren.inner(), paren.r_paren())
        {
            self.dropped_token(&open);
            self.clause_expr(&inner)?;
            self.dropped_token(&close);
            return Ok(());
        }
        self.node(node)
    }

    /// Set operations, flattened: operands and operator keywords each start
    /// a line when the statement breaks
    fn compound_select(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let mut previous = None;
        for element in significant_children(node) {
            let kind = element.kind();
            match element {
                NodeOrToken::Node(operand) => {
                    if previous.is_some() {
                        self.push(soft_line_break());
                    }
                    self.hoist_comments(&operand);
                    match operand.kind() {
                        S::CompoundSelect => self.compound_select(&operand)?,
                        S::SelectCore => self.group(|f| f.node(&operand))?,
                        _ => self.node(&operand)?,
                    }
                }
                NodeOrToken::Token(keyword) => {
                    self.push(if previous == Some(S::Keyword) {
                        space()
                    } else {
                        soft_line_break()
                    });
                    self.token(&keyword);
                }
            }
            previous = Some(kind);
        }
        Ok(())
    }

    /// `( items )` or `[ items ]`, broken one item per line when too long
    fn parenthesized(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let children: Vec<SqlSyntaxElement> = significant_children(node).collect();
        let (Some(open), Some(close)) = (
            children
                .first()
                .and_then(|e| e.as_token())
                .filter(|t| matches!(t.kind(), S::LParen | S::LBracket)),
            children
                .last()
                .and_then(|e| e.as_token())
                .filter(|t| matches!(t.kind(), S::RParen | S::RBracket)),
        ) else {
            return Err(unprintable(node));
        };
        let inner = &children[1..children.len() - 1];
        if inner.is_empty() {
            self.token(open);
            self.token(close);
            return Ok(());
        }

        self.group(|f| {
            f.token(open);
            f.push(indent());
            f.push(soft_line_break_or_empty());
            for element in inner {
                match element {
                    NodeOrToken::Token(comma) if comma.kind() == S::Comma => {
                        f.token(comma);
                        f.push(soft_line_break());
                    }
                    NodeOrToken::Token(word) if word.kind() == S::Keyword => {
                        f.token(word);
                        f.push(space());
                    }
                    other => f.element(other)?,
                }
            }
            f.push(dedent());
            f.push(soft_line_break_or_empty());
            f.token(close);
            Ok(())
        })
    }

    fn alias(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let alias = Alias::cast(node.clone()).ok_or_else(|| unprintable(node))?;
        if alias.as_keyword().is_none() && self.rewrites(CanonicalRule::ExplicitAlias) {
            self.inserted_keyword("AS");
            self.push(space());
        }
        for (index, element) in significant_children(node).enumerate() {
            // `x (a, b)` renames columns; keep the list against the name
            if index > 0 && element.kind() != S::ColumnList {
                self.push(space());
            }
            self.element(&element)?;
        }
        Ok(())
    }

    /// `left JOIN right ON cond`; each join starts a line when the `FROM`
    /// clause breaks
    fn join(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let mut seen_keyword = false;
        for (index, element) in significant_children(node).enumerate() {
            match &element {
                NodeOrToken::Token(keyword) => {
                    self.push(if seen_keyword {
                        space()
                    } else {
                        soft_line_break()
                    });
                    seen_keyword = true;
                    self.token(keyword);
                }
                NodeOrToken::Node(child) => {
                    if index > 0 {
                        self.push(space());
                    }
                    self.node(child)?;
                }
            }
        }
        Ok(())
    }

    fn on_clause(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        for element in significant_children(node) {
            match element {
                NodeOrToken::Token(keyword) => {
                    self.token(&keyword);
                    self.push(space());
                }
                NodeOrToken::Node(condition) => {
                    self.push(indent());
                    self.clause_expr(&condition)?;
                    self.push(dedent());
                }
            }
        }
        Ok(())
    }

    /// `ON CONFLICT target`, with the action indented on the next line when
    /// the clause does not fit
    fn on_conflict(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        self.group(|f| {
            for (index, element) in significant_children(node).enumerate() {
                match &element {
                    NodeOrToken::Node(action) if action.kind() == S::ConflictAction => {
                        f.push(indent());
                        f.push(soft_line_break());
                        f.conflict_action(action)?;
                        f.push(dedent());
                    }
                    other => {
                        if index > 0 {
                            f.push(space());
                        }
                        f.element(other)?;
                    }
                }
            }
            Ok(())
        })
    }

    /// `DO NOTHING` or `DO UPDATE SET ...`; a filter starts its own line
    fn conflict_action(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        for (index, element) in significant_children(node).enumerate() {
            match &element {
                NodeOrToken::Node(filter) if filter.kind() == S::WhereClause => {
                    self.push(soft_line_break());
                    self.node(filter)?;
                }
                other => {
                    if index > 0 {
                        self.push(space());
                    }
                    self.element(other)?;
                }
            }
        }
        Ok(())
    }

    fn binary(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let expr = BinaryExpr::cast(node.clone()).ok_or_else(|| unprintable(node))?;
        let dialect = self.policy.dialect;
        let op = expr.op(dialect);
        if let Some(op) = op.filter(|op| op.is_logical()) {
            return self.logical_chain(&expr, op);
        }

        let (Some(lhs), Some(rhs)) = (expr.lhs(), expr.rhs()) else {
            return Err(unprintable(node));
        };
        self.node(&lhs)?;
        for operator in expr.operator_tokens() {
            self.push(space());
            let replacement = match operator.kind() {
                S::LtGt | S::BangEq
                    if self.rewrites(CanonicalRule::NotEqualSpelling)
                        && operator.kind() != dialect.not_equal =>
                {
                    dialect.not_equal.static_text()
                }
                S::EqEq if self.rewrites(CanonicalRule::DoubleEquals) => Some("="),
                _ => None,
            };
            match replacement {
                Some(spelling) => self.replaced_token(&operator, spelling),
                None => self.token(&operator),
            }
        }
        self.push(space());
        self.node(&rhs)
    }

    /// `a AND b AND c` as one group, one operand per line when broken
    fn logical_chain(&mut self, expr: &BinaryExpr, op: BinaryOp) -> FormatResult {
        let mut operands = Vec::new();
        let mut operators = Vec::new();
        self.flatten_chain(expr.syntax(), op, &mut operands, &mut operators);

        self.group(|f| {
            for (index, operand) in operands.iter().enumerate() {
                if index > 0 {
                    f.push(soft_line_break());
                    let operator = &operators[index - 1];
                    let word = match operator.kind() {
                        S::AmpAmp => Some("AND"),
                        S::PipePipe => Some("OR"),
                        _ => None,
                    };
                    match word {
                        Some(word) if f.rewrites(CanonicalRule::LogicalOperatorWords) => {
                            f.leading_comments(operator);
                            f.inserted_keyword(word);
                            f.trailing_comments(operator);
                        }
                        _ => f.token(operator),
                    }
                    f.push(space());
                }
                f.node(operand)?;
            }
            Ok(())
        })
    }

    fn flatten_chain(
        &self,
        node: &SqlSyntaxNode,
        op: BinaryOp,
        operands: &mut Vec<SqlSyntaxNode>,
        operators: &mut Vec<SqlSyntaxToken>,
    ) {
        let same_op = BinaryExpr::cast(node.clone())
            .filter(|expr| expr.op(self.policy.dialect) == Some(op));
        let Some(expr) = same_op else {
            operands.push(node.clone());
            return;
        };
        let (Some(lhs), Some(operator), Some(rhs)) =
            (expr.lhs(), expr.operator_tokens().pop(), expr.rhs())
        else {
            operands.push(node.clone());
            return;
        };
        self.flatten_chain(&lhs, op, operands, operators);
        operators.push(operator);
        self.flatten_chain(&rhs, op, operands, operators);
    }

    fn prefix(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let expr = PrefixExpr::cast(node.clone()).ok_or_else(|| unprintable(node))?;
        let (Some(operator), Some(operand)) = (expr.operator(), expr.operand()) else {
            return Err(unprintable(node));
        };
        self.token(&operator);
        let operand_start = first_significant_token(&operand).map(|t| t.kind());
        // `- -x` must not become a `--` comment
        if operator.kind() == S::Keyword
            || (operator.kind() == S::Minus && operand_start == Some(S::Minus))
        {
            self.push(space());
        }
        self.node(&operand)
    }

    fn paren_expr(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let paren = ParenExpr::cast(node.clone()).ok_or_else(|| unprintable(node))?;
        // `(f(x))[1]` needs its parentheses
        let subscripted = node
            .parent()
            .is_some_and(|parent| parent.kind() == S::SubscriptExpr);
        if self.rewrites(CanonicalRule::RedundantParens)
            && !subscripted
            && let (Some(open), Some(inner), Some(close)) =
                (paren.l_paren(), paren.inner(), paren.r_paren())
            && is_primary(inner.kind())
        {
            self.dropped_token(&open);
            self.node(&inner)?;
            self.dropped_token(&close);
            return Ok(());
        }
        self.parenthesized(node)
    }

    fn case_expr(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        self.group(|f| {
            let mut indented = false;
            for element in significant_children(node) {
                match element {
                    NodeOrToken::Node(branch)
                        if matches!(branch.kind(), S::WhenClause | S::ElseClause) =>
                    {
                        if !indented {
                            f.push(indent());
                            indented = true;
                        }
                        f.push(soft_line_break());
                        f.node(&branch)?;
                    }
                    NodeOrToken::Node(operand) => {
                        f.push(space());
                        f.node(&operand)?;
                    }
                    NodeOrToken::Token(keyword) if keyword_of(&keyword) == Some(Keyword::End) => {
                        if indented {
                            f.push(dedent());
                        }
                        f.push(soft_line_break());
                        f.token(&keyword);
                    }
                    NodeOrToken::Token(keyword) => f.token(&keyword),
                }
            }
            Ok(())
        })
    }

    /// `CAST(expr AS type)`
    fn cast_expr(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        for element in significant_children(node) {
            match &element {
                NodeOrToken::Token(keyword) if keyword_of(keyword) == Some(Keyword::As) => {
                    self.push(space());
                    self.token(keyword);
                    self.push(space());
                }
                other => self.element(other)?,
            }
        }
        Ok(())
    }

    fn data_type(&mut self, node: &SqlSyntaxNode) -> FormatResult {
        let data_type = DataType::cast(node.clone()).ok_or_else(|| unprintable(node))?;
        let words = data_type.words();
        let params = data_type.params();

        if self.rewrites(CanonicalRule::TypeAliases)
            && params.is_none()
            && let [word] = words.as_slice()
            && let Some(alias) = Keyword::from_word(word.text())
                .and_then(|keyword| self.policy.dialect.type_alias(keyword))
        {
            let spelling = alias
                .iter()
                .map(|keyword| {
                    self.policy
                        .inserted_keyword(keyword.as_str(), self.reference_case)
                        .into_owned()
                })
                .collect::<Vec<_>>()
                .join(" ");
            self.replaced_token(word, &spelling);
            return Ok(());
        }

        for (index, word) in words.iter().enumerate() {
            if index > 0 {
                self.push(space());
            }
            self.token(word);
        }
        if let Some(params) = params {
            self.node(&params)?;
        }
        Ok(())
    }
}

fn next_significant_token(token: &SqlSyntaxToken) -> Option<SqlSyntaxToken> {
    let mut next = token.next_token();
    while let Some(candidate) = next {
        if !candidate.kind().is_trivia() {
            return Some(candidate);
        }
        next = candidate.next_token();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatOptions, TrailingComma};
    use crate::cst::parse_sql_with;
    use crate::dialect::Dialect;

    fn format_with(source: &str, dialect: &str, options: FormatOptions) -> String {
        let policy = StylePolicy::resolve(&options, dialect).expect("valid options");
        let parse = parse_sql_with(source, policy.dialect, policy.param_types, policy.parse_mode)
            .expect("valid SQL");
        print_tree(&parse.root, &policy).expect("printable tree")
    }

    fn format(source: &str, dialect: &str) -> String {
        format_with(source, dialect, FormatOptions::new())
    }

    fn canonical(source: &str, dialect: &str) -> String {
        format_with(source, dialect, FormatOptions::new().canonical_syntax(true))
    }

    #[test]
    fn test_short_statement_stays_on_one_line() {
        assert_eq!(
            canonical("select a,b from t where a=1", "postgresql"),
            "SELECT a, b FROM t WHERE a = 1"
        );
    }

    #[test]
    fn test_long_statement_breaks_by_clause() {
        let source = "select customer_id, sum(amount) as total from orders \
                      where status = 'paid' and created_at > $1 group by customer_id\n";
        insta::assert_snapshot!(format(source, "postgresql"), @r"
        SELECT customer_id, sum(amount) AS total
        FROM orders
        WHERE status = 'paid' AND created_at > $1
        GROUP BY customer_id
        ");
    }

    #[test]
    fn test_narrow_width_breaks_lists_and_conditions() {
        let options = FormatOptions::new().print_width(20);
        let source = "SELECT alpha, beta FROM t WHERE alpha = 1 AND beta = 2\n";
        insta::assert_snapshot!(format_with(source, "sqlite", options), @r"
        SELECT alpha, beta
        FROM t
        WHERE
          alpha = 1
          AND beta = 2
        ");
    }

    #[test]
    fn test_keyword_case() {
        let lower = FormatOptions::new().keyword_case(KeywordCase::Lower);
        assert_eq!(
            format_with("SELECT Name FROM People", "sqlite", lower),
            "select Name from People"
        );
        let preserve = FormatOptions::new().keyword_case(KeywordCase::Preserve);
        assert_eq!(
            format_with("Select Name From People", "sqlite", preserve),
            "Select Name From People"
        );
    }

    #[test]
    fn test_preserve_layout_is_verbatim() {
        let source = "select  a ,\n  b -- keep\nFROM t ;\n";
        let options = FormatOptions::new()
            .layout(LayoutMode::Preserve)
            .keyword_case(KeywordCase::Preserve);
        assert_eq!(format_with(source, "sqlite", options), source);

        let upper = FormatOptions::new().layout(LayoutMode::Preserve);
        assert_eq!(
            format_with(source, "sqlite", upper),
            "SELECT  a ,\n  b -- keep\nFROM t ;\n"
        );
    }

    #[test]
    fn test_final_newline_follows_input() {
        assert_eq!(format("select 1", "sqlite"), "SELECT 1");
        assert_eq!(format("select 1\n\n", "sqlite"), "SELECT 1\n");
        assert_eq!(format("", "sqlite"), "");
    }

    #[test]
    fn test_statements_and_blank_lines() {
        let source = "select 1;select 2;\n\n\nselect 3;\n";
        assert_eq!(format(source, "sqlite"), "SELECT 1;\nSELECT 2;\n\nSELECT 3;\n");
    }

    #[test]
    fn test_comments_stay_with_their_tokens() {
        let source = "-- header\nselect a, -- first\n  b\nfrom t; -- done\n";
        insta::assert_snapshot!(format(source, "sqlite"), @r"
        -- header
        SELECT
          a, -- first
          b
        FROM t; -- done
        ");
    }

    #[test]
    fn test_trailing_comment_moves_past_comma() {
        let source = "select a -- first\n, b from t\n";
        let once = format(source, "sqlite");
        assert_eq!(once, "SELECT\n  a, -- first\n  b\nFROM t\n");
        assert_eq!(format(&once, "sqlite"), once);
    }

    #[test]
    fn test_block_comments_stay_inline() {
        assert_eq!(
            format("select /*+ hint */ a from t", "mysql"),
            "SELECT /*+ hint */ a FROM t"
        );
    }

    #[test]
    fn test_comment_before_clause_keeps_clause_flat() {
        let source = "select a from t\n-- only paid\nwhere paid\n";
        assert_eq!(
            format(source, "sqlite"),
            "SELECT a\nFROM t\n-- only paid\nWHERE paid\n"
        );
    }

    #[test]
    fn test_explicit_alias_and_cross_join() {
        assert_eq!(
            canonical("select a x from t1 u, t2", "sqlite"),
            "SELECT a AS x FROM t1 AS u CROSS JOIN t2"
        );
        assert_eq!(format("select a x from t1 u, t2", "sqlite"), "SELECT a x FROM t1 u, t2");
    }

    #[test]
    fn test_redundant_parens() {
        assert_eq!(
            canonical("select ((a + 1)), (b) from t where (a = 1 or b = 2)", "postgresql"),
            "SELECT (a + 1), b FROM t WHERE a = 1 OR b = 2"
        );
        assert_eq!(
            canonical("select (a + 1) * 2 from t", "postgresql"),
            "SELECT (a + 1) * 2 FROM t"
        );
    }

    #[test]
    fn test_operator_spelling_rewrites() {
        assert_eq!(canonical("select a != b", "postgresql"), "SELECT a <> b");
        assert_eq!(canonical("select a <> b", "sqlite"), "SELECT a != b");
        assert_eq!(canonical("select a == b", "sqlite"), "SELECT a = b");
        assert_eq!(
            canonical("select * from t where a && b || c", "mysql"),
            "SELECT * FROM t WHERE a AND b OR c"
        );
        assert_eq!(format("select a != b", "postgresql"), "SELECT a != b");
    }

    #[test]
    fn test_optional_keywords_are_inserted() {
        assert_eq!(canonical("insert t values (1)", "mysql"), "INSERT INTO t VALUES (1)");
        assert_eq!(canonical("delete t where a = 1", "bigquery"), "DELETE FROM t WHERE a = 1");
        let preserve = FormatOptions::new()
            .canonical_syntax(true)
            .keyword_case(KeywordCase::Preserve);
        assert_eq!(
            format_with("insert t values (1)", "mysql", preserve),
            "insert into t values (1)"
        );
    }

    #[test]
    fn test_type_aliases() {
        assert_eq!(
            canonical("select cast(a as int), b::float from t", "postgresql"),
            "SELECT CAST(a AS INTEGER), b::DOUBLE PRECISION FROM t"
        );
        assert_eq!(
            canonical("select cast(a as varchar(10))", "postgresql"),
            "SELECT CAST(a AS VARCHAR(10))"
        );
    }

    #[test]
    fn test_identifier_requoting() {
        let options = FormatOptions::new().identifier_quotes(IdentifierQuotes::Canonical);
        assert_eq!(
            format_with("select [a b], \"c\" from t", "sqlite", options.clone()),
            "SELECT \"a b\", \"c\" FROM t"
        );
        assert_eq!(
            format_with("select [say \"hi\"] from t", "sqlite", options),
            "SELECT [say \"hi\"] FROM t"
        );
    }

    #[test]
    fn test_trailing_comma_policies() {
        let all = FormatOptions::new()
            .trailing_comma(TrailingComma::All)
            .print_width(12);
        assert_eq!(
            format_with("select alpha, beta from t", "bigquery", all),
            "SELECT\n  alpha,\n  beta,\nFROM t"
        );
        let none = FormatOptions::new();
        assert_eq!(
            format_with("select a, b, from t", "bigquery", none),
            "SELECT a, b FROM t"
        );
        let preserve = FormatOptions::new().trailing_comma(TrailingComma::Preserve);
        assert_eq!(
            format_with("select a, b, from t", "bigquery", preserve),
            "SELECT a, b, FROM t"
        );
    }

    #[test]
    fn test_double_minus_keeps_space() {
        assert_eq!(format("select - -a, -b", "sqlite"), "SELECT - -a, -b");
    }

    #[test]
    fn test_case_and_subquery_layout() {
        let options = FormatOptions::new().print_width(30);
        let source = "select case when a = 1 then 'one' else 'many' end from (select a from t) s";
        insta::assert_snapshot!(format_with(source, "postgresql", options), @r"
        SELECT
          CASE
            WHEN a = 1 THEN 'one'
            ELSE 'many'
          END
        FROM (SELECT a FROM t) s
        ");
    }

    #[test]
    fn test_union_operands_group_separately() {
        let options = FormatOptions::new().print_width(20);
        let source = "select a from t union all select b from u";
        insta::assert_snapshot!(format_with(source, "sqlite", options), @r"
        SELECT a FROM t
        UNION ALL
        SELECT b FROM u
        ");
    }

    #[test]
    fn test_insert_update_delete() {
        assert_eq!(
            format("insert into t (a, b) values (1, 2), (3, 4) returning a", "postgresql"),
            "INSERT INTO t (a, b) VALUES (1, 2), (3, 4) RETURNING a"
        );
        assert_eq!(
            format("update t set a = 1, b = b + 1 where id = $1", "postgresql"),
            "UPDATE t SET a = 1, b = b + 1 WHERE id = $1"
        );
        assert_eq!(
            format("insert into t default values", "sqlite"),
            "INSERT INTO t DEFAULT VALUES"
        );
    }

    #[test]
    fn test_postgres_select_extensions() {
        assert_eq!(
            format("select distinct on (a,b) a, b from t order by a limit all", "postgresql"),
            "SELECT DISTINCT ON (a, b) a, b FROM t ORDER BY a LIMIT ALL"
        );
        assert_eq!(
            format("select * from jobs for no key update of jobs skip locked", "postgresql"),
            "SELECT * FROM jobs FOR NO KEY UPDATE OF jobs SKIP LOCKED"
        );
        assert_eq!(
            format("select s.a from (select 1, 2) as s(a,b)", "postgresql"),
            "SELECT s.a FROM (SELECT 1, 2) AS s(a, b)"
        );
        assert_eq!(
            format("select array[1,2][1], (f(x))[2:3], interval '1 day'", "postgresql"),
            "SELECT ARRAY[1, 2][1], (f(x))[2:3], INTERVAL '1 day'"
        );
        assert_eq!(
            format("select a from t where a is not distinct from b and c !~* 'x' collate \"C\"", "postgresql"),
            "SELECT a FROM t WHERE a IS NOT DISTINCT FROM b AND c !~* 'x' COLLATE \"C\""
        );
    }

    #[test]
    fn test_subscript_keeps_needed_parens() {
        assert_eq!(
            canonical("select (f(x))[1], ((a))[1]", "postgresql"),
            "SELECT (f(x))[1], (a)[1]"
        );
    }

    #[test]
    fn test_on_conflict_layout() {
        assert_eq!(
            format("insert into t (a) values (1) on conflict do nothing", "sqlite"),
            "INSERT INTO t (a) VALUES (1) ON CONFLICT DO NOTHING"
        );
        let options = FormatOptions::new().print_width(40);
        let source = "insert into t (a) values (1) on conflict (a) \
                      do update set a = excluded.a where t.a < 10\n";
        insta::assert_snapshot!(format_with(source, "postgresql", options), @r"
        INSERT INTO t (a)
        VALUES (1)
        ON CONFLICT (a)
          DO UPDATE SET a = excluded.a
          WHERE t.a < 10
        ");
    }

    #[test]
    fn test_placeholders_print_unchanged() {
        let options = FormatOptions::new().param_types(["?", "$nr", "@name"]);
        assert_eq!(
            format_with("SELECT * FROM t WHERE id = ? AND name = @name", "postgresql", options),
            "SELECT * FROM t WHERE id = ? AND name = @name"
        );
        let sqlite = FormatOptions::new();
        assert_eq!(
            format_with("select * from t where x=:x or y=?2", "sqlite", sqlite),
            "SELECT * FROM t WHERE x = :x OR y = ?2"
        );
    }

    #[test]
    fn test_unknown_node_is_an_invariant_violation() {
        let policy = StylePolicy::resolve(&FormatOptions::new(), "sqlite").unwrap();
        let mut builder = crate::cst::CstBuilder::new();
        builder.start_node(S::SourceFile);
        builder.start_node(S::ErrorNode);
        builder.token(S::Ident, "oops");
        builder.finish_node();
        builder.finish_node();
        let err = print_tree(&builder.finish(), &policy).unwrap_err();
        assert!(matches!(err, SqlFmtError::InternalInvariantViolation { .. }));
    }

    #[test]
    fn test_idempotent_on_mixed_input() {
        let dialect: &'static Dialect = &crate::dialect::POSTGRESQL;
        let source = "with recent as (select * from orders where created_at > now() - 1)\n\
                      select r.id, count(*) filter_count from recent r left join items i on i.order_id = r.id \
                      group by r.id having count(*) > 1 order by 2 desc nulls last limit 10;\n";
        let once = format(source, dialect.name);
        assert_eq!(format(&once, dialect.name), once);
    }
}
