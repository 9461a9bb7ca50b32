//! Formatting driver
//!
//! Runs the pipeline resolve → lex → parse → invariant check → print. Every
//! stage either succeeds or returns its error unchanged; no partially
//! formatted text ever leaves this module.

use crate::config::FormatOptions;
use crate::cst::trivia::TriviaCollector;
use crate::cst::{Parse, SqlSyntaxNode, parse_sql_with, print_tree};
use crate::error::SqlFmtError;
use crate::style::StylePolicy;
use crate::Result;
use rayon::prelude::*;
use tracing::{debug, debug_span};

/// Reusable formatter for one dialect and one set of options
///
/// Holds only the resolved, immutable [`StylePolicy`], so a single value can
/// be shared by any number of threads.
#[derive(Debug, Clone)]
pub struct SqlFormatter {
    policy: StylePolicy,
}

impl SqlFormatter {
    /// Resolve `options` for `dialect_name`
    ///
    /// Configuration problems are reported here, before any SQL is read.
    pub fn new(options: &FormatOptions, dialect_name: &str) -> Result<Self> {
        let policy = StylePolicy::resolve(options, dialect_name)?;
        Ok(Self { policy })
    }

    pub fn from_policy(policy: StylePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &StylePolicy {
        &self.policy
    }

    /// Format one source text
    pub fn format(&self, source: &str) -> Result<String> {
        let _span = debug_span!(
            "format",
            dialect = self.policy.dialect.name,
            bytes = source.len()
        )
        .entered();

        let parse = self.parse(source)?;
        check_invariants(source, &parse)?;
        debug!("tree checked");

        let formatted = print_tree(&parse.root, &self.policy)?;
        debug!(bytes = formatted.len(), "printed");
        Ok(formatted)
    }

    /// Whether `source` is already formatted
    pub fn is_formatted(&self, source: &str) -> Result<bool> {
        Ok(self.format(source)? == source)
    }

    /// Format independent sources in parallel
    ///
    /// Results come back in input order.
    pub fn format_many<S>(&self, sources: &[S]) -> Vec<Result<String>>
    where
        S: AsRef<str> + Sync,
    {
        sources
            .par_iter()
            .map(|source| self.format(source.as_ref()))
            .collect()
    }

    /// Lex and parse under the policy's placeholder set and parse mode
    pub fn parse(&self, source: &str) -> Result<Parse> {
        let parse = parse_sql_with(
            source,
            self.policy.dialect,
            self.policy.param_types,
            self.policy.parse_mode,
        )?;
        debug!(errors = parse.errors.len(), "parsed");
        Ok(parse)
    }
}

/// Format `source` with `options` for the dialect called `dialect_name`
pub fn format(source: &str, options: &FormatOptions, dialect_name: &str) -> Result<String> {
    SqlFormatter::new(options, dialect_name)?.format(source)
}

/// Tree well-formedness: lossless text, complete trivia, sibling attachment
fn check_invariants(source: &str, parse: &Parse) -> Result<()> {
    let root: &SqlSyntaxNode = &parse.root;
    if root.text() != source {
        return Err(SqlFmtError::invariant(
            "tree text differs from the source text",
        ));
    }

    let in_tree = root
        .descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind().is_trivia())
        .count();
    if in_tree != parse.lexed_trivia {
        return Err(SqlFmtError::invariant(format!(
            "lexer produced {} trivia tokens but the tree holds {in_tree}",
            parse.lexed_trivia
        )));
    }

    TriviaCollector::new()
        .check_attachment(root)
        .map_err(SqlFmtError::invariant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{KeywordCase, LayoutMode, ParseMode};
    use crate::cst::CstBuilder;
    use crate::cst::SqlSyntaxKind as S;
    use crate::error::ErrorKind;

    #[test]
    fn test_format_scenario() {
        let options = FormatOptions::new()
            .keyword_case(KeywordCase::Upper)
            .canonical_syntax(true);
        assert_eq!(
            format("select a,b from t where a=1", &options, "postgresql").unwrap(),
            "SELECT a, b FROM t WHERE a = 1"
        );
    }

    #[test]
    fn test_config_error_before_parsing() {
        let options = FormatOptions::new().print_width(0);
        let err = format("this is not SQL", &options, "sqlite").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);

        let err = SqlFormatter::new(&FormatOptions::new(), "oracle").unwrap_err();
        assert!(err.to_string().contains("oracle"));
    }

    #[test]
    fn test_parse_error_has_span() {
        let err = format("SELEC * FROM t", &FormatOptions::new(), "sqlite").unwrap_err();
        match err {
            SqlFmtError::Parse(error) => {
                assert_eq!((error.span.start, error.span.end), (0, 5));
                assert!(error.message().contains("SELEC"));
            }
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_lex_error_stops_pipeline() {
        let err = format("select 'open", &FormatOptions::new(), "sqlite").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Lex);
    }

    #[test]
    fn test_best_effort_collects_all_errors() {
        let options = FormatOptions::new().parse_mode(ParseMode::BestEffort);
        let err = format("select from;\nselect 1;\nupdate;", &options, "sqlite").unwrap_err();
        match err {
            SqlFmtError::Diagnostics(diagnostics) => assert_eq!(diagnostics.len(), 2),
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }

    #[test]
    fn test_preserve_is_lossless() {
        let source = "select  *\n  from t -- why\n where x=1 ;\n\n";
        let options = FormatOptions::new()
            .layout(LayoutMode::Preserve)
            .keyword_case(KeywordCase::Preserve);
        assert_eq!(format(source, &options, "sqlite").unwrap(), source);
    }

    #[test]
    fn test_format_many_keeps_order() {
        let formatter = SqlFormatter::new(&FormatOptions::new(), "mysql").unwrap();
        let sources = ["select 1", "select", "delete from t"];
        let results = formatter.format_many(&sources);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_deref().ok(), Some("SELECT 1"));
        assert!(results[1].is_err());
        assert_eq!(results[2].as_deref().ok(), Some("DELETE FROM t"));
    }

    #[test]
    fn test_is_formatted() {
        let formatter = SqlFormatter::new(&FormatOptions::new(), "sqlite").unwrap();
        assert!(formatter.is_formatted("SELECT 1;\n").unwrap());
        assert!(!formatter.is_formatted("select 1;\n").unwrap());
    }

    #[test]
    fn test_misplaced_trivia_is_an_invariant_violation() {
        let mut builder = CstBuilder::new();
        builder.start_node(S::SourceFile);
        builder.token(S::Whitespace, " ");
        builder.start_node(S::ColumnRef);
        builder.token(S::Ident, "a");
        builder.finish_node();
        builder.finish_node();
        let parse = Parse {
            root: builder.finish(),
            errors: Vec::new(),
            lexed_trivia: 1,
        };
        let err = check_invariants(" a", &parse).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);

        let lost = Parse {
            lexed_trivia: 2,
            ..parse
        };
        let err = check_invariants(" a", &lost).unwrap_err();
        assert!(err.to_string().contains("trivia"));
    }

    #[test]
    fn test_formatter_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SqlFormatter>();
    }
}
