//! Lossless syntax tree for SQL
//!
//! Source text goes through three steps here:
//!
//! 1. [`lexer`] splits it into significant tokens, each carrying its own
//!    leading and trailing trivia (whitespace and comments)
//! 2. [`parser`] builds a rowan green tree from those tokens; trivia becomes
//!    sibling tokens inside the node that owns the significant token, so
//!    `parse.root.text() == source` always holds
//! 3. [`formatter`] lowers the tree to [`format_element`]s under a
//!    [`StylePolicy`](crate::style::StylePolicy) and [`printer`] lays them out
//!
//! A token's trailing trivia is the same-line run of whitespace and comments
//! that ends in a comment; everything else, line breaks included, leads the
//! next token. Trivia after the last token belongs to the root.
//!
//! ```rust,ignore
//! use sqlfmt_core::cst::{SqlSyntaxKind, parse_sql};
//! use sqlfmt_core::dialect::POSTGRESQL;
//!
//! let parse = parse_sql("SELECT a -- note\nFROM t", &POSTGRESQL)?;
//! assert_eq!(parse.root.text().to_string(), "SELECT a -- note\nFROM t");
//!
//! let comments: Vec<_> = parse
//!     .root
//!     .descendants_with_tokens()
//!     .filter_map(|element| element.into_token())
//!     .filter(|token| token.kind() == SqlSyntaxKind::LineComment)
//!     .collect();
//! assert_eq!(comments.len(), 1);
//! ```

mod builder;
mod language;
mod nodes;
mod syntax_kind;

pub mod ast;
pub mod format_element;
pub mod formatter;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod round_trip;
pub mod trivia;

pub use builder::CstBuilder;
pub use formatter::{print_tree, print_verbatim};
pub use language::SqlLanguage;
pub use lexer::{CstToken, LexResult, Lexer, SqlToken, TokenStream, Trivia, tokenize};
pub use nodes::*;
pub use parser::{Parse, parse};
pub use round_trip::{RoundTripValidator, ValidationIssue, ValidationResult};
pub use syntax_kind::SqlSyntaxKind;
pub use trivia::{TriviaCollector, TriviaInfo, TriviaMap, TriviaToken};

use crate::config::ParseMode;
use crate::dialect::{Dialect, ParamTypeSet};
use crate::error::SqlFmtError;
use crate::Result;

/// Lex and parse `source` with the dialect's default placeholder syntaxes
///
/// Strict mode: the first lexer or parser error is returned as is.
pub fn parse_sql(source: &str, dialect: &'static Dialect) -> Result<Parse> {
    parse_sql_with(
        source,
        dialect,
        ParamTypeSet::from_slice(dialect.default_param_types),
        ParseMode::Strict,
    )
}

/// Lex and parse `source`
///
/// In strict mode lexing errors stop the pipeline before parsing and the
/// first error is returned. In best-effort mode every lexer and parser
/// error is collected into [`SqlFmtError::Diagnostics`].
pub fn parse_sql_with(
    source: &str,
    dialect: &'static Dialect,
    params: ParamTypeSet,
    mode: ParseMode,
) -> Result<Parse> {
    let lexed = tokenize(source, dialect, params);
    tracing::trace!(
        tokens = lexed.stream.tokens.len(),
        trivia = lexed.stream.trivia_count(),
        "lexed"
    );

    if mode == ParseMode::Strict
        && let Some(error) = lexed.errors.first()
    {
        return Err(error.clone().into());
    }

    let parsed = parse(source, &lexed.stream, dialect, mode);
    match mode {
        ParseMode::Strict => match parsed.errors.first() {
            Some(error) => Err(error.clone().into()),
            None => Ok(parsed),
        },
        ParseMode::BestEffort => {
            if lexed.errors.is_empty() && parsed.errors.is_empty() {
                return Ok(parsed);
            }
            let mut diagnostics: Vec<_> = lexed
                .errors
                .iter()
                .map(|error| error.to_diagnostic())
                .chain(parsed.errors.iter().map(|error| error.to_diagnostic()))
                .collect();
            diagnostics.sort_by_key(|diagnostic| diagnostic.span.start);
            for diagnostic in &diagnostics {
                tracing::warn!(message = %diagnostic.message, "recovered syntax error");
            }
            Err(SqlFmtError::Diagnostics(diagnostics))
        }
    }
}
