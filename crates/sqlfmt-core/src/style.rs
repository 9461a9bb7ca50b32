//! Style resolution
//!
//! [`StylePolicy::resolve`] validates a [`FormatOptions`] record against a
//! dialect and folds it into one immutable policy. The printer only asks the
//! policy questions ("is this rewrite on?", "how is this keyword spelled?");
//! it never looks at raw options.

use crate::config::{
    FormatOptions, IdentifierQuotes, KeywordCase, LayoutMode, ParseMode, TrailingComma,
};
use crate::dialect::{CanonicalRule, Dialect, ListSite, ParamType, ParamTypeSet};
use crate::error::ConfigError;
use std::borrow::Cow;

pub const DEFAULT_PRINT_WIDTH: usize = 80;
pub const DEFAULT_TAB_WIDTH: usize = 2;
const MAX_TAB_WIDTH: usize = 16;

/// Resolved, immutable printing policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylePolicy {
    pub dialect: &'static Dialect,
    pub keyword_case: KeywordCase,
    pub canonical_syntax: bool,
    pub param_types: ParamTypeSet,
    pub trailing_comma: TrailingComma,
    pub identifier_quotes: IdentifierQuotes,
    pub layout: LayoutMode,
    pub print_width: usize,
    pub tab_width: usize,
    pub use_tabs: bool,
    pub parse_mode: ParseMode,
}

impl StylePolicy {
    /// Resolve options for the dialect called `dialect_name`
    pub fn resolve(options: &FormatOptions, dialect_name: &str) -> Result<Self, ConfigError> {
        let dialect = Dialect::by_name(dialect_name).ok_or_else(|| {
            let known = Dialect::all()
                .iter()
                .map(|dialect| dialect.name)
                .collect::<Vec<_>>()
                .join(", ");
            ConfigError::new(
                "dialect",
                format!("unknown dialect `{dialect_name}` (expected one of {known})"),
            )
        })?;
        Self::resolve_for(options, dialect)
    }

    /// Resolve options for an already selected dialect
    pub fn resolve_for(
        options: &FormatOptions,
        dialect: &'static Dialect,
    ) -> Result<Self, ConfigError> {
        let param_types = resolve_param_types(options.param_types.as_deref(), dialect)?;

        let trailing_comma = options.trailing_comma.unwrap_or_default();
        if trailing_comma == TrailingComma::All && dialect.trailing_comma_sites.is_empty() {
            return Err(ConfigError::new(
                "trailingComma",
                format!("`all` requires trailing-comma support, which {dialect} does not have"),
            ));
        }

        let layout = options.layout.unwrap_or_default();
        let canonical_syntax = options.canonical_syntax.unwrap_or(false);
        let identifier_quotes = options.identifier_quotes.unwrap_or_default();
        if layout == LayoutMode::Preserve {
            if canonical_syntax {
                return Err(ConfigError::new(
                    "canonicalSyntax",
                    "canonical rewrites cannot be applied with `layout: preserve`",
                ));
            }
            if identifier_quotes == IdentifierQuotes::Canonical {
                return Err(ConfigError::new(
                    "identifierQuotes",
                    "identifier re-quoting cannot be applied with `layout: preserve`",
                ));
            }
        }

        let print_width = options.print_width.unwrap_or(DEFAULT_PRINT_WIDTH);
        if print_width == 0 {
            return Err(ConfigError::new("printWidth", "must be greater than zero"));
        }
        let tab_width = options.tab_width.unwrap_or(DEFAULT_TAB_WIDTH);
        if tab_width == 0 || tab_width > MAX_TAB_WIDTH {
            return Err(ConfigError::new(
                "tabWidth",
                format!("must be between 1 and {MAX_TAB_WIDTH}"),
            ));
        }

        let policy = Self {
            dialect,
            keyword_case: options.keyword_case.unwrap_or_default(),
            canonical_syntax,
            param_types,
            trailing_comma,
            identifier_quotes,
            layout,
            print_width,
            tab_width,
            use_tabs: options.use_tabs.unwrap_or(false),
            parse_mode: options.parse_mode.unwrap_or_default(),
        };
        tracing::debug!(
            dialect = dialect.name,
            keyword_case = ?policy.keyword_case,
            canonical = policy.canonical_syntax,
            "resolved style policy"
        );
        Ok(policy)
    }

    /// Whether the printer applies `rule`
    pub fn rewrites(&self, rule: CanonicalRule) -> bool {
        self.canonical_syntax && self.dialect.has_canonical_rule(rule)
    }

    /// Source spelling of a keyword under the keyword-case policy
    pub fn keyword_text<'a>(&self, source: &'a str) -> Cow<'a, str> {
        recase(source, self.keyword_case)
    }

    /// Spelling for a keyword the printer inserts itself
    ///
    /// Under `preserve`, inserted keywords follow `reference_case`, the case
    /// the author used for the surrounding keywords.
    pub fn inserted_keyword(
        &self,
        upper: &'static str,
        reference_case: KeywordCase,
    ) -> Cow<'static, str> {
        match self.keyword_case {
            KeywordCase::Upper => Cow::Borrowed(upper),
            KeywordCase::Lower => Cow::Owned(upper.to_ascii_lowercase()),
            KeywordCase::Preserve => recase(upper, reference_case),
        }
    }

    /// Whether a trailing comma is printed at `site`
    ///
    /// `had_comma` tells whether the source had one. Whether the list ends up
    /// broken across lines is only known while printing, so `All` is answered
    /// with [`TrailingCommaDecision::WhenBroken`].
    pub fn trailing_comma_at(&self, site: ListSite, had_comma: bool) -> TrailingCommaDecision {
        if !self.dialect.allows_trailing_comma(site) {
            return TrailingCommaDecision::Never;
        }
        match self.trailing_comma {
            TrailingComma::None => TrailingCommaDecision::Never,
            TrailingComma::Preserve if had_comma => TrailingCommaDecision::Always,
            TrailingComma::Preserve => TrailingCommaDecision::Never,
            TrailingComma::All => TrailingCommaDecision::WhenBroken,
        }
    }
}

/// Answer of [`StylePolicy::trailing_comma_at`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingCommaDecision {
    Never,
    Always,
    WhenBroken,
}

fn recase(text: &str, case: KeywordCase) -> Cow<'_, str> {
    match case {
        KeywordCase::Upper if text.bytes().any(|b| b.is_ascii_lowercase()) => {
            Cow::Owned(text.to_ascii_uppercase())
        }
        KeywordCase::Lower if text.bytes().any(|b| b.is_ascii_uppercase()) => {
            Cow::Owned(text.to_ascii_lowercase())
        }
        _ => Cow::Borrowed(text),
    }
}

fn resolve_param_types(
    requested: Option<&[String]>,
    dialect: &'static Dialect,
) -> Result<ParamTypeSet, ConfigError> {
    let Some(requested) = requested else {
        return Ok(ParamTypeSet::from_slice(dialect.default_param_types));
    };

    let mut set = ParamTypeSet::EMPTY;
    for spelling in requested {
        let param = ParamType::from_spelling(spelling).ok_or_else(|| {
            let known = ParamType::ALL
                .iter()
                .map(|param| format!("`{param}`"))
                .collect::<Vec<_>>()
                .join(", ");
            ConfigError::new(
                "paramTypes",
                format!("unknown placeholder syntax `{spelling}` (expected one of {known})"),
            )
        })?;
        if !dialect.supports_param_type(param) {
            return Err(ConfigError::new(
                "paramTypes",
                format!("placeholder syntax `{param}` cannot be lexed in {dialect}"),
            ));
        }
        set = set.with(param);
    }
    Ok(set)
}
