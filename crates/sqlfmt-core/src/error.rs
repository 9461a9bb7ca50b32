//! Error types for lexing, parsing, option resolution and printing

use crate::diagnostics::{Diagnostic, Position, Span};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for formatting operations
#[derive(Debug, Error)]
pub enum SqlFmtError {
    /// Unrecognized character or unterminated token
    #[error(transparent)]
    Lex(#[from] LexError),

    /// Token sequence matches no grammar production
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Options inconsistent with each other or with the dialect
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every lexer and parser problem found in best-effort mode
    #[error("{} syntax error(s), first: {}", .0.len(), first_message(.0))]
    Diagnostics(Vec<Diagnostic>),

    /// Engine bug: tree well-formedness or trivia bookkeeping failed
    #[error("Internal invariant violated: {message}")]
    InternalInvariantViolation { message: String },

    /// File system I/O errors (hosts only)
    #[error("IO error for path '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration file could not be read or deserialized (hosts only)
    #[error("Failed to load config from '{path}': {message}")]
    ConfigFile { path: PathBuf, message: String },
}

fn first_message(diagnostics: &[Diagnostic]) -> &str {
    diagnostics
        .first()
        .map(|diagnostic| diagnostic.message.as_str())
        .unwrap_or("none")
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Lex,
    Parse,
    Config,
    Internal,
    Io,
}

impl SqlFmtError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            SqlFmtError::Lex(_) => ErrorKind::Lex,
            SqlFmtError::Parse(_) => ErrorKind::Parse,
            SqlFmtError::Diagnostics(diagnostics) => {
                if diagnostics.iter().all(|d| d.code == "lex") {
                    ErrorKind::Lex
                } else {
                    ErrorKind::Parse
                }
            }
            SqlFmtError::Config(_) | SqlFmtError::ConfigFile { .. } => ErrorKind::Config,
            SqlFmtError::InternalInvariantViolation { .. } => ErrorKind::Internal,
            SqlFmtError::Io { .. } => ErrorKind::Io,
        }
    }

    /// Check if the user can fix this by editing the input (as opposed to an engine bug)
    pub fn is_user_error(&self) -> bool {
        !matches!(self.kind(), ErrorKind::Internal)
    }

    /// Create an internal invariant violation
    pub fn invariant(message: impl Into<String>) -> Self {
        Self::InternalInvariantViolation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(option_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Config(ConfigError::new(option_name, reason))
    }

    /// Create an IO error with path context
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// User-facing diagnostics for this error
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        match self {
            SqlFmtError::Lex(error) => vec![error.to_diagnostic()],
            SqlFmtError::Parse(error) => vec![error.to_diagnostic()],
            SqlFmtError::Diagnostics(diagnostics) => diagnostics.clone(),
            SqlFmtError::Config(_) | SqlFmtError::ConfigFile { .. } => {
                vec![Diagnostic::error("config", self.to_string(), Span::default(), Position::default())]
            }
            SqlFmtError::InternalInvariantViolation { .. } => {
                vec![Diagnostic::error("internal", self.to_string(), Span::default(), Position::default())]
            }
            SqlFmtError::Io { .. } => {
                vec![Diagnostic::error("io", self.to_string(), Span::default(), Position::default())]
            }
        }
    }
}

/// What went wrong while lexing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    UnexpectedCharacter,
    UnterminatedString,
    UnterminatedQuotedIdentifier,
    UnterminatedBlockComment,
}

/// Lexer failure at a single source position
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Span of the offending text (the whole unterminated token, if any)
    pub span: Span,
    pub position: Position,
    /// Character the error was detected at (the opening quote for unterminated tokens)
    pub unexpected_char: char,
}

impl LexError {
    pub fn message(&self) -> String {
        match self.kind {
            LexErrorKind::UnexpectedCharacter => {
                format!("unexpected character `{}`", self.unexpected_char.escape_debug())
            }
            LexErrorKind::UnterminatedString => {
                format!("unterminated string literal starting with `{}`", self.unexpected_char)
            }
            LexErrorKind::UnterminatedQuotedIdentifier => format!(
                "unterminated quoted identifier starting with `{}`",
                self.unexpected_char
            ),
            LexErrorKind::UnterminatedBlockComment => "unterminated block comment".to_string(),
        }
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error("lex", self.message(), self.span, self.position)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lex error: {} at {}", self.message(), self.position)
    }
}

/// Parser failure: what was expected, what was found, and where
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub struct ParseError {
    /// Span of the unexpected token
    pub span: Span,
    pub position: Position,
    /// Human readable descriptions such as `` `FROM` `` or `expression`
    pub expected_one_of: Vec<String>,
    /// Text of the unexpected token, or `end of input`
    pub found: String,
    /// Nearest enclosing statement, e.g. `SELECT statement`
    pub context: Option<&'static str>,
}

impl ParseError {
    pub fn message(&self) -> String {
        let expected = match self.expected_one_of.as_slice() {
            [] => "something else".to_string(),
            [single] => single.clone(),
            many => format!("one of {}", many.join(", ")),
        };
        let context = match self.context {
            Some(statement) => format!("in {statement}"),
            None => "at start of statement".to_string(),
        };
        format!("expected {expected} but found {} {context}", self.found)
    }

    pub fn to_diagnostic(&self) -> Diagnostic {
        Diagnostic::error("parse", self.message(), self.span, self.position)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Parse error: {} at {}", self.message(), self.position)
    }
}

/// Invalid option value or combination, raised before any lexing
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid option `{option_name}`: {reason}")]
pub struct ConfigError {
    pub option_name: String,
    pub reason: String,
}

impl ConfigError {
    pub fn new(option_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            option_name: option_name.into(),
            reason: reason.into(),
        }
    }
}
