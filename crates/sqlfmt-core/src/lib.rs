//! sqlfmt core
//!
//! Lossless SQL parsing and dialect-aware formatting.
//! This crate provides the lexer, the parser producing a full-fidelity
//! concrete syntax tree, the style resolver and the printer, for SQLite,
//! PostgreSQL, MySQL and BigQuery.

pub mod config;
pub mod console;
pub mod cst;
pub mod diagnostics;
pub mod dialect;
pub mod driver;
pub mod error;
pub mod result;
pub mod style;

// Re-export commonly used types
pub use config::{
    ConfigFile, ConfigLoader, FormatOptions, IdentifierQuotes, KeywordCase, LayoutMode, ParseMode,
    TrailingComma,
};
pub use console::{Color, Console};
pub use cst::round_trip::{RoundTripValidator, ValidationIssue, ValidationResult};
pub use diagnostics::{
    Diagnostic, DiagnosticRenderer, LineIndex, OutputFormat, Position, Severity, Span,
};
pub use dialect::{BIGQUERY, Dialect, MYSQL, POSTGRESQL, ParamType, SQLITE};
pub use driver::{SqlFormatter, format};
pub use error::{ConfigError, ErrorKind, LexError, ParseError, SqlFmtError};
pub use result::{Result, ResultExt};
pub use style::StylePolicy;

/// Initialize the tracing subscriber for logging
pub fn init_tracing() {
    use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sqlfmt=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
