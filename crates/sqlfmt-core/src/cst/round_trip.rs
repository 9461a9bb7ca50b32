//! Round-trip validation for SQL formatting
//!
//! Checks that a source file can be parsed, printed and parsed again without
//! losing anything:
//! 1. `parse(source).root.text() == source` and the verbatim printer
//!    reproduces the input when keywords are not re-cased
//! 2. The formatted text parses, and formatting it again changes nothing
//! 3. Every comment of the input appears in the output
//! 4. Without canonical rewrites, the significant tokens are unchanged up to
//!    keyword case and select-list trailing commas
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlfmt_core::cst::round_trip::RoundTripValidator;
//! use sqlfmt_core::{FormatOptions, StylePolicy};
//!
//! let policy = StylePolicy::resolve(&FormatOptions::new(), "postgresql")?;
//! let result = RoundTripValidator::new(policy).validate("select 1 -- one\n")?;
//! assert!(result.is_valid(), "{:?}", result.issues);
//! ```

use super::ast::{AstNode, SelectClause};
use super::formatter::{print_tree, print_verbatim};
use super::{SqlSyntaxKind, SqlSyntaxNode, parse_sql_with};
use crate::config::{IdentifierQuotes, KeywordCase, ParseMode};
use crate::style::StylePolicy;
use crate::Result;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::fmt;

/// Result of round-trip validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Original source code
    pub original: String,
    /// Source formatted once
    pub formatted: String,
    /// Formatted source formatted again (equals `formatted` when idempotent)
    pub reformatted: String,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

/// One failed round-trip property
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationIssue {
    /// The tree text differs from the source
    LossyParse,
    /// The verbatim printer did not reproduce the source
    VerbatimMismatch,
    /// The formatted text no longer parses
    ReparseFailed { message: String },
    /// Formatting the output again changed it
    NotIdempotent,
    /// Comments present on one side only
    CommentsChanged {
        missing: Vec<String>,
        added: Vec<String>,
    },
    /// Significant tokens differ beyond keyword case
    TokensChanged {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationIssue::LossyParse => write!(f, "parse tree text differs from the source"),
            ValidationIssue::VerbatimMismatch => {
                write!(f, "verbatim printing does not reproduce the source")
            }
            ValidationIssue::ReparseFailed { message } => {
                write!(f, "formatted output does not parse: {message}")
            }
            ValidationIssue::NotIdempotent => write!(f, "formatting the output again changes it"),
            ValidationIssue::CommentsChanged { missing, added } => write!(
                f,
                "{} comment(s) missing and {} added after formatting",
                missing.len(),
                added.len()
            ),
            ValidationIssue::TokensChanged { expected, actual } => write!(
                f,
                "token stream changed ({} tokens before, {} after)",
                expected.len(),
                actual.len()
            ),
        }
    }
}

/// Round-trip validator for one style policy
#[derive(Debug, Clone)]
pub struct RoundTripValidator {
    policy: StylePolicy,
}

impl RoundTripValidator {
    pub fn new(policy: StylePolicy) -> Self {
        Self { policy }
    }

    /// Validate `source`
    ///
    /// Fails only if `source` itself cannot be parsed or printed; problems
    /// with the output are reported as [`ValidationIssue`]s.
    pub fn validate(&self, source: &str) -> Result<ValidationResult> {
        let original = self.parse(source)?;
        let mut issues = Vec::new();

        if original.text() != source {
            issues.push(ValidationIssue::LossyParse);
        }
        let mut verbatim = self.policy.clone();
        verbatim.keyword_case = KeywordCase::Preserve;
        if print_verbatim(&original, &verbatim) != source {
            issues.push(ValidationIssue::VerbatimMismatch);
        }

        let formatted = print_tree(&original, &self.policy)?;
        let reparsed = match self.parse(&formatted) {
            Ok(reparsed) => reparsed,
            Err(err) => {
                issues.push(ValidationIssue::ReparseFailed {
                    message: err.to_string(),
                });
                return Ok(ValidationResult {
                    original: source.to_string(),
                    reformatted: formatted.clone(),
                    formatted,
                    issues,
                });
            }
        };

        let reformatted = print_tree(&reparsed, &self.policy)?;
        if reformatted != formatted {
            issues.push(ValidationIssue::NotIdempotent);
        }

        let (missing, added) = diff_multisets(comments(&original), comments(&reparsed));
        if !missing.is_empty() || !added.is_empty() {
            issues.push(ValidationIssue::CommentsChanged { missing, added });
        }

        if self.token_stream_is_stable() {
            let expected = significant_tokens(&original);
            let actual = significant_tokens(&reparsed);
            if expected != actual {
                issues.push(ValidationIssue::TokensChanged { expected, actual });
            }
        }

        tracing::debug!(issues = issues.len(), "round-trip validated");
        Ok(ValidationResult {
            original: source.to_string(),
            formatted,
            reformatted,
            issues,
        })
    }

    fn parse(&self, source: &str) -> Result<SqlSyntaxNode> {
        let parse = parse_sql_with(
            source,
            self.policy.dialect,
            self.policy.param_types,
            ParseMode::Strict,
        )?;
        Ok(parse.root)
    }

    /// Only canonical rewrites and re-quoting change the significant tokens
    fn token_stream_is_stable(&self) -> bool {
        !self.policy.canonical_syntax && self.policy.identifier_quotes == IdentifierQuotes::Preserve
    }
}

fn comments(root: &SqlSyntaxNode) -> Vec<String> {
    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| token.kind().is_comment())
        .map(|token| token.text().trim_end().to_string())
        .collect()
}

/// Significant tokens with keywords upper-cased and trailing select-list
/// commas left out
fn significant_tokens(root: &SqlSyntaxNode) -> Vec<String> {
    let trailing_commas: HashSet<_> = root
        .descendants()
        .filter_map(SelectClause::cast)
        .filter_map(|clause| clause.trailing_comma())
        .map(|comma| comma.text_range())
        .collect();

    root.descendants_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(|token| !token.kind().is_trivia())
        .filter(|token| !trailing_commas.contains(&token.text_range()))
        .map(|token| match token.kind() {
            SqlSyntaxKind::Keyword => token.text().to_ascii_uppercase(),
            _ => token.text().to_string(),
        })
        .collect()
}

/// Items only in `left` and items only in `right`, counting duplicates
fn diff_multisets(mut left: Vec<String>, mut right: Vec<String>) -> (Vec<String>, Vec<String>) {
    left.sort();
    right.sort();
    let (mut only_left, mut only_right) = (Vec::new(), Vec::new());
    let (mut l, mut r) = (left.into_iter().peekable(), right.into_iter().peekable());
    loop {
        let ordering = match (l.peek(), r.peek()) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => break,
        };
        match ordering {
            Ordering::Equal => {
                l.next();
                r.next();
            }
            Ordering::Less => only_left.extend(l.next()),
            Ordering::Greater => only_right.extend(r.next()),
        }
    }
    (only_left, only_right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FormatOptions, TrailingComma};

    fn validator(options: FormatOptions, dialect: &str) -> RoundTripValidator {
        RoundTripValidator::new(StylePolicy::resolve(&options, dialect).expect("valid options"))
    }

    #[test]
    fn test_simple_select_round_trip() {
        let result = validator(FormatOptions::new(), "postgresql")
            .validate("select a, b from t where a = $1;\n")
            .unwrap();
        assert!(result.is_valid(), "{:?}", result.issues);
        assert_eq!(result.formatted, "SELECT a, b FROM t WHERE a = $1;\n");
        assert_eq!(result.formatted, result.reformatted);
    }

    #[test]
    fn test_comments_survive_narrow_layout() {
        let source = "-- totals per customer\n\
                      select customer_id, /* inline */ sum(amount) total -- sum\n\
                      from orders\n\
                      # legacy hash comment\n\
                      where paid = 1;\n";
        let options = FormatOptions::new().print_width(20);
        let result = validator(options, "mysql").validate(source).unwrap();
        assert!(result.is_valid(), "{:?}\n{}", result.issues, result.formatted);
        assert!(result.formatted.contains("# legacy hash comment"));
    }

    #[test]
    fn test_canonical_rewrites_skip_token_check() {
        let options = FormatOptions::new().canonical_syntax(true);
        let result = validator(options, "sqlite")
            .validate("select a x from t1, t2 where (a == 1)")
            .unwrap();
        assert!(result.is_valid(), "{:?}", result.issues);
        assert_eq!(result.formatted, "SELECT a AS x FROM t1 CROSS JOIN t2 WHERE a = 1");
    }

    #[test]
    fn test_trailing_commas_are_not_token_changes() {
        let options = FormatOptions::new()
            .trailing_comma(TrailingComma::All)
            .print_width(10);
        let result = validator(options, "bigquery")
            .validate("select alpha, beta from t")
            .unwrap();
        assert!(result.is_valid(), "{:?}", result.issues);
        assert!(result.formatted.contains("beta,\n"));
    }

    #[test]
    fn test_unparsable_source_is_an_error() {
        let err = validator(FormatOptions::new(), "sqlite")
            .validate("SELEC * FROM t")
            .unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Parse);
    }

    #[test]
    fn test_diff_multisets_counts_duplicates() {
        let (missing, added) = diff_multisets(
            vec!["-- a".into(), "-- a".into(), "-- b".into()],
            vec!["-- a".into(), "-- c".into()],
        );
        assert_eq!(missing, vec!["-- a".to_string(), "-- b".to_string()]);
        assert_eq!(added, vec!["-- c".to_string()]);
    }

    #[test]
    fn test_issue_display() {
        let issue = ValidationIssue::CommentsChanged {
            missing: vec!["-- gone".into()],
            added: Vec::new(),
        };
        assert_eq!(issue.to_string(), "1 comment(s) missing and 0 added after formatting");
        assert_eq!(
            ValidationIssue::NotIdempotent.to_string(),
            "formatting the output again changes it"
        );
    }
}
