//! Error reporting: lexer, parser and configuration failures
//!
//! No failing call may produce output, and every error must point at the
//! exact bytes it is about.

use sqlfmt_core::error::LexErrorKind;
use sqlfmt_core::{
    ErrorKind, FormatOptions, ParseMode, Severity, SqlFmtError, SqlFormatter, format,
};

fn strict(source: &str, dialect: &str) -> SqlFmtError {
    format(source, &FormatOptions::new(), dialect).unwrap_err()
}

#[test]
fn test_misspelled_keyword_span() {
    let source = "SELEC * FROM t";
    match strict(source, "postgresql") {
        SqlFmtError::Parse(error) => {
            assert_eq!(&source[error.span.start..error.span.end], "SELEC");
            assert_eq!(error.found, "`SELEC`");
            assert!(error.context.is_none());
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_error_inside_statement_names_it() {
    let source = "SELECT a FROM WHERE b = 1";
    match strict(source, "sqlite") {
        SqlFmtError::Parse(error) => {
            assert_eq!(&source[error.span.start..error.span.end], "WHERE");
            assert_eq!(error.context, Some("SELECT statement"));
            assert_eq!(error.position.line, 1);
        }
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_trailing_tokens_name_the_statement_before_them() {
    let cases = [
        ("SELECT a FROM t WHERE b = 1 c", "sqlite", "c", "SELECT statement"),
        ("SELECT a FROM t WHERE b ~ 'x'", "sqlite", "~", "SELECT statement"),
        (
            "INSERT INTO t (a) VALUES (1) ON DUPLICATE KEY UPDATE a = 2",
            "mysql",
            "ON",
            "INSERT statement",
        ),
    ];
    for (source, dialect, found, context) in cases {
        match strict(source, dialect) {
            SqlFmtError::Parse(error) => {
                assert_eq!(&source[error.span.start..error.span.end], found, "{source}");
                assert_eq!(error.context, Some(context), "{source}");
                assert!(error.to_string().contains(&format!("in {context}")), "{source}");
            }
            other => panic!("expected a parse error for {source:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_unexpected_end_of_input() {
    match strict("SELECT a FROM", "mysql") {
        SqlFmtError::Parse(error) => assert_eq!(error.found, "end of input"),
        other => panic!("expected a parse error, got {other:?}"),
    }
}

#[test]
fn test_unterminated_tokens() {
    let cases = [
        ("select 'abc", "sqlite", LexErrorKind::UnterminatedString),
        ("select \"abc", "postgresql", LexErrorKind::UnterminatedQuotedIdentifier),
        ("select 1 /* never closed", "mysql", LexErrorKind::UnterminatedBlockComment),
    ];
    for (source, dialect, kind) in cases {
        match strict(source, dialect) {
            SqlFmtError::Lex(error) => {
                assert_eq!(error.kind, kind, "{source}");
                assert_eq!(error.span.end, source.len(), "{source}");
            }
            other => panic!("expected a lex error for {source:?}, got {other:?}"),
        }
    }
}

#[test]
fn test_hash_is_not_a_comment_outside_mysql() {
    assert_eq!(strict("select 1 # note", "sqlite").kind(), ErrorKind::Lex);
    assert!(format("select 1 # note", &FormatOptions::new(), "mysql").is_ok());
}

#[test]
fn test_placeholder_outside_configured_set() {
    // `?` is lexable in PostgreSQL but only `$nr` is enabled by default
    assert!(strict("select * from t where id = ?", "postgresql").is_user_error());
    let options = FormatOptions::new().param_types(["?"]);
    assert_eq!(
        format("select * from t where id = ?", &options, "postgresql").unwrap(),
        "SELECT * FROM t WHERE id = ?"
    );
}

#[test]
fn test_best_effort_reports_every_statement() {
    let options = FormatOptions::new().parse_mode(ParseMode::BestEffort);
    let source = "select from t;\nselect 1;\ndelete where;\nselect 'open\n";
    let err = format(source, &options, "sqlite").unwrap_err();
    let diagnostics = err.diagnostics();
    assert_eq!(diagnostics.len(), 3);
    assert!(
        diagnostics
            .windows(2)
            .all(|pair| pair[0].span.start <= pair[1].span.start)
    );
    assert!(diagnostics.iter().all(|d| d.severity == Severity::Error));
    assert_eq!(diagnostics[2].code, "lex");
}

#[test]
fn test_best_effort_without_errors_formats() {
    let options = FormatOptions::new().parse_mode(ParseMode::BestEffort);
    assert_eq!(format("select 1", &options, "sqlite").unwrap(), "SELECT 1");
}

#[test]
fn test_configuration_errors() {
    let cases = [
        (FormatOptions::new().print_width(0), "sqlite", "printWidth"),
        (FormatOptions::new().tab_width(0), "sqlite", "tabWidth"),
        (FormatOptions::new().param_types(["%s"]), "sqlite", "paramTypes"),
        (FormatOptions::new().param_types(["$nr"]), "mysql", "paramTypes"),
        (
            FormatOptions::new().trailing_comma(sqlfmt_core::TrailingComma::All),
            "postgresql",
            "trailingComma",
        ),
        (
            FormatOptions::new()
                .layout(sqlfmt_core::LayoutMode::Preserve)
                .canonical_syntax(true),
            "sqlite",
            "canonicalSyntax",
        ),
        (FormatOptions::new(), "oracle", "dialect"),
    ];
    for (options, dialect, option_name) in cases {
        match SqlFormatter::new(&options, dialect).unwrap_err() {
            SqlFmtError::Config(error) => assert_eq!(error.option_name, option_name),
            other => panic!("expected a config error for {option_name}, got {other:?}"),
        }
    }
}

#[test]
fn test_diagnostics_serialize_with_spans() {
    let err = strict("SELEC 1", "sqlite");
    let json = serde_json::to_value(err.diagnostics()).unwrap();
    assert_eq!(json[0]["span"]["start"], 0);
    assert_eq!(json[0]["span"]["end"], 5);
    assert_eq!(json[0]["severity"], "error");
}
