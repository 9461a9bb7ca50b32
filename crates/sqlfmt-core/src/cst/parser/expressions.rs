//! Expression parsing
//!
//! Precedence climbing over the dialect's binary operator table. Operands
//! start at a checkpoint so that an infix operator can wrap the operand it
//! follows once the operator has been seen.

use super::{G, K, Parser, S};
use crate::dialect::{BinaryOp, OperatorEntry};

impl Parser<'_> {
    pub(crate) fn expr(&mut self) {
        self.expr_bp(0);
    }

    /// Parse an expression whose operators all bind at least as tight as `min_precedence`
    fn expr_bp(&mut self, min_precedence: u8) {
        let checkpoint = self.builder.checkpoint();
        self.prefix_expr();

        loop {
            if self.at(S::ColonColon)
                && self.dialect.double_colon_cast
                && self.dialect.cast_precedence >= min_precedence
            {
                self.builder.start_node_at(checkpoint, S::TypeCastExpr);
                self.bump();
                self.data_type();
                self.builder.finish_node();
                continue;
            }
            if self.at(S::LBracket)
                && self.dialect.supports(G::ArraySyntax)
                && self.dialect.cast_precedence >= min_precedence
            {
                self.builder.start_node_at(checkpoint, S::SubscriptExpr);
                self.subscript();
                self.builder.finish_node();
                continue;
            }
            if self.at_keyword(K::Collate)
                && self.dialect.supports(G::Collate)
                && self.dialect.unary_precedence >= min_precedence
            {
                self.builder.start_node_at(checkpoint, S::CollateExpr);
                self.bump();
                self.qualified_name();
                self.builder.finish_node();
                continue;
            }

            let Some((entry, negated)) = self.infix_operator() else {
                break;
            };
            if entry.precedence < min_precedence {
                break;
            }

            match entry.op {
                BinaryOp::Is => {
                    self.builder.start_node_at(checkpoint, S::IsExpr);
                    self.is_tail(entry.precedence);
                }
                BinaryOp::In => {
                    self.builder.start_node_at(checkpoint, S::InExpr);
                    if negated {
                        self.bump();
                    }
                    self.bump();
                    if self.at(S::LParen)
                        && (self.nth_at_keyword(1, K::Select) || self.nth_at_keyword(1, K::With))
                    {
                        self.subquery();
                    } else {
                        self.expr_list();
                    }
                }
                BinaryOp::Between => {
                    self.builder.start_node_at(checkpoint, S::BetweenExpr);
                    if negated {
                        self.bump();
                    }
                    self.bump();
                    self.expr_bp(entry.precedence + 1);
                    self.expect_keyword(K::And);
                    self.expr_bp(entry.precedence + 1);
                }
                _ => {
                    self.builder.start_node_at(checkpoint, S::BinaryExpr);
                    if negated {
                        self.bump();
                    }
                    self.bump();
                    self.expr_bp(entry.precedence + 1);
                }
            }
            self.builder.finish_node();
        }
    }

    /// Operator at the current token; `NOT IN`, `NOT LIKE`, `NOT ILIKE` and
    /// `NOT BETWEEN` report the second word's entry with `negated` set
    fn infix_operator(&self) -> Option<(&'static OperatorEntry, bool)> {
        let token = self.current()?;
        if token.kind == S::Keyword && token.is(K::Not) {
            let next = self.nth(1)?;
            let entry = self.dialect.binary_operator(next.kind, next.keyword)?;
            let negatable = matches!(
                entry.op,
                BinaryOp::In | BinaryOp::Like | BinaryOp::ILike | BinaryOp::Between
            );
            return negatable.then_some((entry, true));
        }
        self.dialect
            .binary_operator(token.kind, token.keyword)
            .map(|entry| (entry, false))
    }

    /// `IS [NOT] NULL | TRUE | FALSE | UNKNOWN`, or `IS [NOT] DISTINCT FROM expr`
    fn is_tail(&mut self, precedence: u8) {
        self.bump();
        self.eat_keyword(K::Not);
        if self.at_keyword(K::Distinct) && self.dialect.supports(G::IsDistinctFrom) {
            self.bump();
            self.expect_keyword(K::From);
            self.expr_bp(precedence + 1);
            return;
        }
        if !(self.eat_keyword(K::Null)
            || self.eat_keyword(K::True)
            || self.eat_keyword(K::False)
            || self.eat_word(K::Unknown))
        {
            self.error(&["`NULL`", "`TRUE`", "`FALSE`", "`UNKNOWN`"]);
        }
    }

    /// `[i]`, `[a:b]`, `[:b]` or `[a:]`
    fn subscript(&mut self) {
        self.bump();
        if !self.at(S::Colon) {
            self.expr();
        }
        if self.eat(S::Colon) && !self.at(S::RBracket) {
            self.expr();
        }
        self.expect(S::RBracket);
    }

    fn prefix_expr(&mut self) {
        if self.at_keyword(K::Not) {
            let precedence = self.dialect.not_precedence;
            self.node(S::PrefixExpr, |p| {
                p.bump();
                p.expr_bp(precedence);
            });
        } else if matches!(self.current_kind(), S::Minus | S::Plus | S::Tilde) {
            let precedence = self.dialect.unary_precedence;
            self.node(S::PrefixExpr, |p| {
                p.bump();
                p.expr_bp(precedence);
            });
        } else {
            self.primary();
        }
    }

    fn primary(&mut self) {
        let Some(token) = self.current() else {
            self.error(&["expression"]);
            return;
        };
        match token.kind {
            S::Number | S::String => self.node(S::Literal, Self::bump),
            S::Placeholder => self.node(S::PlaceholderExpr, Self::bump),
            S::Star => self.node(S::AllColumns, Self::bump),
            S::LParen => self.paren_expr(),
            S::Ident
                if self.nth_kind(1) == S::String
                    && token
                        .keyword
                        .is_some_and(|keyword| self.dialect.is_type_name(keyword)) =>
            {
                self.node(S::TypedLiteral, |p| {
                    p.bump_type_word();
                    p.bump();
                });
            }
            S::Ident | S::QuotedIdent => self.name_expr(),
            S::Keyword => match token.keyword {
                Some(K::Null | K::True | K::False) => self.node(S::Literal, Self::bump),
                Some(K::Case) => self.case_expr(),
                Some(K::Cast) => self.cast_expr(),
                Some(K::Exists) => self.node(S::ExistsExpr, |p| {
                    p.bump();
                    p.subquery();
                }),
                Some(K::Array)
                    if self.dialect.supports(G::ArraySyntax)
                        && matches!(self.nth_kind(1), S::LBracket | S::LParen) =>
                {
                    self.array_expr();
                }
                // Reserved words that double as function names
                Some(K::Left | K::Right) if self.nth_kind(1) == S::LParen => self.name_expr(),
                _ => self.error(&["expression"]),
            },
            _ => self.error(&["expression"]),
        }
    }

    /// Column reference, `t.*`, or function call
    fn name_expr(&mut self) {
        let checkpoint = self.builder.checkpoint();
        self.bump();
        while self.at(S::Dot) {
            match self.nth_kind(1) {
                S::Ident | S::QuotedIdent => {
                    self.bump();
                    self.bump();
                }
                S::Star => {
                    self.bump();
                    self.bump();
                    self.builder.start_node_at(checkpoint, S::AllColumns);
                    self.builder.finish_node();
                    return;
                }
                _ => break,
            }
        }

        if self.at(S::LParen) {
            self.builder.start_node_at(checkpoint, S::FuncCall);
            self.arg_list();
        } else {
            self.builder.start_node_at(checkpoint, S::ColumnRef);
        }
        self.builder.finish_node();
    }

    fn arg_list(&mut self) {
        self.node(S::ArgList, |p| {
            p.bump();
            if p.at(S::Star) {
                p.node(S::AllColumns, Self::bump);
            } else if !p.at(S::RParen) {
                if !p.eat_keyword(K::Distinct) {
                    p.eat_keyword(K::All);
                }
                loop {
                    p.expr();
                    if !p.eat(S::Comma) {
                        break;
                    }
                }
            }
            p.expect(S::RParen);
        });
    }

    /// `( expr )`, a row `( expr, ... )`, or a scalar subquery
    fn paren_expr(&mut self) {
        if self.nth_at_keyword(1, K::Select) || self.nth_at_keyword(1, K::With) {
            self.subquery();
            return;
        }

        let checkpoint = self.builder.checkpoint();
        self.bump();
        self.expr();
        let mut kind = S::ParenExpr;
        while self.eat(S::Comma) {
            kind = S::ExprList;
            self.expr();
        }
        self.expect(S::RParen);
        self.builder.start_node_at(checkpoint, kind);
        self.builder.finish_node();
    }

    /// `ARRAY[...]` or `ARRAY(subquery)`
    fn array_expr(&mut self) {
        self.node(S::ArrayExpr, |p| {
            p.bump();
            if p.at(S::LParen) {
                p.subquery();
            } else {
                p.array_elements();
            }
        });
    }

    /// `[a, b]`; elements of a multidimensional array are bare `[...]` lists
    fn array_elements(&mut self) {
        self.node(S::ExprList, |p| {
            p.bump();
            if !p.at(S::RBracket) {
                loop {
                    if p.at(S::LBracket) {
                        p.array_elements();
                    } else {
                        p.expr();
                    }
                    if !p.eat(S::Comma) {
                        break;
                    }
                }
            }
            p.expect(S::RBracket);
        });
    }

    /// Parenthesized, possibly empty, expression list
    pub(crate) fn expr_list(&mut self) {
        self.node(S::ExprList, |p| {
            if !p.expect(S::LParen) {
                return;
            }
            if !p.at(S::RParen) {
                loop {
                    p.expr();
                    if !p.eat(S::Comma) {
                        break;
                    }
                }
            }
            p.expect(S::RParen);
        });
    }

    fn case_expr(&mut self) {
        self.node(S::CaseExpr, |p| {
            p.bump();
            if !p.at_keyword(K::When) {
                p.expr();
            }
            if !p.at_keyword(K::When) {
                p.error(&["`WHEN`"]);
            }
            while p.at_keyword(K::When) {
                p.node(S::WhenClause, |p| {
                    p.bump();
                    p.expr();
                    p.expect_keyword(K::Then);
                    p.expr();
                });
            }
            if p.at_keyword(K::Else) {
                p.node(S::ElseClause, |p| {
                    p.bump();
                    p.expr();
                });
            }
            p.expect_keyword(K::End);
        });
    }

    fn cast_expr(&mut self) {
        self.node(S::CastExpr, |p| {
            p.bump();
            if !p.expect(S::LParen) {
                return;
            }
            p.expr();
            p.expect_keyword(K::As);
            p.data_type();
            p.expect(S::RParen);
        });
    }

    /// Type name words plus optional `(n, m)` parameters
    pub(crate) fn data_type(&mut self) {
        self.node(S::DataType, |p| {
            if !matches!(p.current_kind(), S::Ident | S::QuotedIdent | S::Keyword) {
                p.error(&["type name"]);
                return;
            }
            p.bump_type_word();
            while p
                .current()
                .is_some_and(|token| matches!(token.keyword, Some(K::Precision | K::Varying)))
            {
                p.bump_type_word();
            }

            if p.at(S::LParen) {
                p.node(S::TypeParams, |p| {
                    p.bump();
                    loop {
                        if !p.expect(S::Number) || !p.eat(S::Comma) {
                            break;
                        }
                    }
                    p.expect(S::RParen);
                });
            }
        });
    }

    /// Type names the dialect knows are re-tagged as keywords
    fn bump_type_word(&mut self) {
        let Some(token) = self.current() else {
            return;
        };
        let is_type_name = token.kind == S::Ident
            && token
                .keyword
                .is_some_and(|keyword| self.dialect.is_type_name(keyword));
        self.bump_as(if is_type_name { S::Keyword } else { token.kind });
    }

    /// Whether the current token can begin an expression
    pub(crate) fn can_start_expression(&self) -> bool {
        let Some(token) = self.current() else {
            return false;
        };
        match token.kind {
            S::Number
            | S::String
            | S::Placeholder
            | S::Ident
            | S::QuotedIdent
            | S::LParen
            | S::Star
            | S::Minus
            | S::Plus
            | S::Tilde => true,
            S::Keyword => matches!(
                token.keyword,
                Some(
                    K::Null
                        | K::True
                        | K::False
                        | K::Case
                        | K::Cast
                        | K::Exists
                        | K::Not
                        | K::Array
                )
            ),
            _ => false,
        }
    }
}
