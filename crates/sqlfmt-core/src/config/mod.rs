//! Formatting options
//!
//! [`FormatOptions`] is the flat, declarative record a host hands to the
//! engine. Every field is optional; unset fields take the per-dialect defaults
//! documented on [`crate::style::StylePolicy`]. Option names are camelCase on
//! the wire so the same record can be read from JSON, TOML or YAML:
//!
//! ```json
//! {
//!   "dialect": "postgresql",
//!   "keywordCase": "upper",
//!   "canonicalSyntax": true,
//!   "paramTypes": ["?", "$nr", "@name"],
//!   "trailingComma": "none",
//!   "printWidth": 80,
//!   "tabWidth": 2
//! }
//! ```

mod loader;

pub use loader::{ConfigFile, ConfigLoader};

use serde::{Deserialize, Serialize};

/// How keyword tokens are re-cased
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeywordCase {
    #[default]
    Upper,
    Lower,
    Preserve,
}

/// Trailing comma policy at list sites that allow one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrailingComma {
    /// Drop trailing commas
    #[default]
    None,
    /// Keep them where the author wrote them
    Preserve,
    /// Add one whenever the list is broken across lines
    All,
}

/// How quoted identifiers are spelled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentifierQuotes {
    #[default]
    Preserve,
    /// Re-quote with the dialect's primary quote style where lossless
    Canonical,
}

/// Whether whitespace is reflowed or kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutMode {
    /// Width-aware layout
    #[default]
    Reflow,
    /// Verbatim: print every token and trivia as written, re-casing keywords only
    Preserve,
}

/// Error reporting strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ParseMode {
    /// Abort at the first error
    #[default]
    Strict,
    /// Recover at statement boundaries and report every error
    BestEffort,
}

/// Formatter options as supplied by the host
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    /// Keyword casing (default: upper)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyword_case: Option<KeywordCase>,

    /// Rewrite optional surface syntax to one canonical spelling (default: false)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_syntax: Option<bool>,

    /// Recognized placeholder syntaxes: `?`, `?nr`, `$nr`, `:name`, `@name`, `$name`
    #[serde(
        alias = "placeholderSyntaxes",
        skip_serializing_if = "Option::is_none"
    )]
    pub param_types: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_comma: Option<TrailingComma>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub identifier_quotes: Option<IdentifierQuotes>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<LayoutMode>,

    /// Maximum line width (default: 80)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub print_width: Option<usize>,

    /// Spaces per indentation level (default: 2)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tab_width: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_tabs: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<ParseMode>,
}

impl FormatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword_case(mut self, case: KeywordCase) -> Self {
        self.keyword_case = Some(case);
        self
    }

    pub fn canonical_syntax(mut self, enabled: bool) -> Self {
        self.canonical_syntax = Some(enabled);
        self
    }

    pub fn param_types<I, S>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.param_types = Some(params.into_iter().map(Into::into).collect());
        self
    }

    pub fn trailing_comma(mut self, policy: TrailingComma) -> Self {
        self.trailing_comma = Some(policy);
        self
    }

    pub fn identifier_quotes(mut self, quotes: IdentifierQuotes) -> Self {
        self.identifier_quotes = Some(quotes);
        self
    }

    pub fn layout(mut self, layout: LayoutMode) -> Self {
        self.layout = Some(layout);
        self
    }

    pub fn print_width(mut self, width: usize) -> Self {
        self.print_width = Some(width);
        self
    }

    pub fn tab_width(mut self, width: usize) -> Self {
        self.tab_width = Some(width);
        self
    }

    pub fn use_tabs(mut self, enabled: bool) -> Self {
        self.use_tabs = Some(enabled);
        self
    }

    pub fn parse_mode(mut self, mode: ParseMode) -> Self {
        self.parse_mode = Some(mode);
        self
    }

    /// Fill every unset field from `fallback`
    pub fn or(self, fallback: &FormatOptions) -> Self {
        Self {
            keyword_case: self.keyword_case.or(fallback.keyword_case),
            canonical_syntax: self.canonical_syntax.or(fallback.canonical_syntax),
            param_types: self.param_types.or_else(|| fallback.param_types.clone()),
            trailing_comma: self.trailing_comma.or(fallback.trailing_comma),
            identifier_quotes: self.identifier_quotes.or(fallback.identifier_quotes),
            layout: self.layout.or(fallback.layout),
            print_width: self.print_width.or(fallback.print_width),
            tab_width: self.tab_width.or(fallback.tab_width),
            use_tabs: self.use_tabs.or(fallback.use_tabs),
            parse_mode: self.parse_mode.or(fallback.parse_mode),
        }
    }
}
