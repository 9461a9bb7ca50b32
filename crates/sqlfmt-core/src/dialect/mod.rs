//! Dialect descriptors
//!
//! Every supported SQL dialect is a `'static` [`Dialect`] value: keyword
//! reservations, lexical features, placeholder syntaxes, the binary operator
//! precedence table, grammar switches, and the canonicalization rules the
//! printer may apply. A single parametric lexer and parser read these tables;
//! adding a dialect means adding data in [`tables`], not code.

mod keywords;
mod tables;

pub use keywords::{Keyword, KeywordSet};
pub use tables::{BIGQUERY, MYSQL, POSTGRESQL, SQLITE};

use crate::cst::SqlSyntaxKind;
use std::fmt;

/// Quoting style of a delimited identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteStyle {
    /// `"name"`
    Double,
    /// `` `name` ``
    Backtick,
    /// `[name]`
    Bracket,
}

impl QuoteStyle {
    pub const fn open(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Backtick => '`',
            QuoteStyle::Bracket => '[',
        }
    }

    pub const fn close(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Backtick => '`',
            QuoteStyle::Bracket => ']',
        }
    }

    /// Style of an already lexed quoted identifier
    pub fn of(text: &str) -> Option<QuoteStyle> {
        match text.chars().next()? {
            '"' => Some(QuoteStyle::Double),
            '`' => Some(QuoteStyle::Backtick),
            '[' => Some(QuoteStyle::Bracket),
            _ => None,
        }
    }
}

/// Broad family of a placeholder syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamKind {
    Positional,
    Numbered,
    Named,
}

/// Concrete placeholder syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum ParamType {
    /// `?`
    Positional,
    /// `?1`
    NumberedQuestion,
    /// `$1`
    NumberedDollar,
    /// `:name`
    NamedColon,
    /// `@name`
    NamedAt,
    /// `$name`
    NamedDollar,
}

impl ParamType {
    pub const ALL: [ParamType; 6] = [
        ParamType::Positional,
        ParamType::NumberedQuestion,
        ParamType::NumberedDollar,
        ParamType::NamedColon,
        ParamType::NamedAt,
        ParamType::NamedDollar,
    ];

    /// Spelling used in configuration (`paramTypes`)
    pub const fn spelling(self) -> &'static str {
        match self {
            ParamType::Positional => "?",
            ParamType::NumberedQuestion => "?nr",
            ParamType::NumberedDollar => "$nr",
            ParamType::NamedColon => ":name",
            ParamType::NamedAt => "@name",
            ParamType::NamedDollar => "$name",
        }
    }

    pub fn from_spelling(spelling: &str) -> Option<ParamType> {
        Self::ALL
            .into_iter()
            .find(|param| param.spelling() == spelling)
    }

    pub const fn kind(self) -> ParamKind {
        match self {
            ParamType::Positional => ParamKind::Positional,
            ParamType::NumberedQuestion | ParamType::NumberedDollar => ParamKind::Numbered,
            ParamType::NamedColon | ParamType::NamedAt | ParamType::NamedDollar => {
                ParamKind::Named
            }
        }
    }

    /// Sigil the placeholder starts with
    pub const fn sigil(self) -> char {
        match self {
            ParamType::Positional | ParamType::NumberedQuestion => '?',
            ParamType::NumberedDollar | ParamType::NamedDollar => '$',
            ParamType::NamedColon => ':',
            ParamType::NamedAt => '@',
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.spelling())
    }
}

/// Set of enabled placeholder syntaxes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct ParamTypeSet(u8);

impl ParamTypeSet {
    pub const EMPTY: ParamTypeSet = ParamTypeSet(0);

    pub fn from_slice(params: &[ParamType]) -> Self {
        params.iter().fold(Self::EMPTY, |set, param| set.with(*param))
    }

    pub const fn with(self, param: ParamType) -> Self {
        ParamTypeSet(self.0 | (1 << param as u8))
    }

    pub const fn contains(self, param: ParamType) -> bool {
        self.0 & (1 << param as u8) != 0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = ParamType> {
        ParamType::ALL
            .into_iter()
            .filter(move |param| self.contains(*param))
    }
}

/// Operator associativity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Left,
    Right,
}

/// Binary operator semantics, independent of spelling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    NotEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    Like,
    ILike,
    In,
    Between,
    Is,
    Concat,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    /// `~`
    Match,
    /// `~*`
    IMatch,
    /// `!~`
    NotMatch,
    /// `!~*`
    NotIMatch,
}

impl BinaryOp {
    /// Operators whose chains are laid out one operand per line
    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOp::Or | BinaryOp::And)
    }
}

/// Token an operator entry matches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpToken {
    Punct(SqlSyntaxKind),
    Word(Keyword),
}

/// One row of a dialect's binary operator table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OperatorEntry {
    pub token: OpToken,
    pub op: BinaryOp,
    /// Higher binds tighter
    pub precedence: u8,
    pub assoc: Assoc,
}

impl OperatorEntry {
    pub const fn punct(kind: SqlSyntaxKind, op: BinaryOp, precedence: u8) -> Self {
        Self {
            token: OpToken::Punct(kind),
            op,
            precedence,
            assoc: Assoc::Left,
        }
    }

    pub const fn word(keyword: Keyword, op: BinaryOp, precedence: u8) -> Self {
        Self {
            token: OpToken::Word(keyword),
            op,
            precedence,
            assoc: Assoc::Left,
        }
    }
}

/// List positions where the grammar tolerates an optional trailing comma
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListSite {
    SelectList,
}

/// Grammar beyond the shared core that only some dialects accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GrammarFeature {
    /// `SELECT DISTINCT ON (a, b) ...`
    DistinctOn,
    /// `LIMIT ALL`
    LimitAll,
    /// `INSERT ... ON CONFLICT [target] DO NOTHING | DO UPDATE SET ...`
    OnConflict,
    /// `FOR UPDATE | SHARE ... [OF t] [NOWAIT | SKIP LOCKED]`
    LockingClause,
    /// `ARRAY[...]`, `ARRAY(subquery)` and `expr[i]` / `expr[a:b]`
    ArraySyntax,
    /// `expr COLLATE name`
    Collate,
    /// `t AS x (a, b)`
    AliasColumnList,
    /// `a IS [NOT] DISTINCT FROM b`
    IsDistinctFrom,
    /// `~`, `~*`, `!~` and `!~*` as binary operators
    RegexOperators,
}

/// Surface rewrites applied when `canonicalSyntax` is on
///
/// Each dialect enumerates the rules that are semantically inert for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CanonicalRule {
    /// `expr alias` -> `expr AS alias`, `t x` -> `t AS x`
    ExplicitAlias,
    /// `FROM a, b` -> `FROM a CROSS JOIN b`
    ExplicitCrossJoin,
    /// `((x))` -> `(x)`, `(col)` -> `col`, `WHERE (a = 1)` -> `WHERE a = 1`
    RedundantParens,
    /// Rewrite `<>` / `!=` to the dialect's preferred spelling
    NotEqualSpelling,
    /// `a == b` -> `a = b`
    DoubleEquals,
    /// `INSERT t` -> `INSERT INTO t`
    InsertInto,
    /// `DELETE t` -> `DELETE FROM t`
    DeleteFrom,
    /// `&&` / `||` used as logic -> `AND` / `OR`
    LogicalOperatorWords,
    /// `INT` -> `INTEGER` and similar type-name synonyms
    TypeAliases,
}

/// Type-name synonym expanded by [`CanonicalRule::TypeAliases`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TypeAlias {
    pub from: Keyword,
    pub to: &'static [Keyword],
}

/// Immutable description of one SQL dialect
#[derive(Debug)]
pub struct Dialect {
    pub name: &'static str,
    pub aliases: &'static [&'static str],
    /// Words lexed as keywords
    pub reserved: KeywordSet,
    /// Contextual words re-tagged as keywords inside data types
    pub type_names: KeywordSet,
    /// First entry is the canonical style
    pub identifier_quotes: &'static [QuoteStyle],
    pub double_quoted_strings: bool,
    pub backslash_escapes: bool,
    /// `E'...'`
    pub escape_string_prefix: bool,
    /// `$$...$$` and `$tag$...$tag$`
    pub dollar_quoted_strings: bool,
    /// `# comment`
    pub hash_comments: bool,
    pub nested_block_comments: bool,
    /// `expr::type`
    pub double_colon_cast: bool,
    /// Lexable placeholder syntaxes, highest priority first
    pub param_types: &'static [ParamType],
    pub default_param_types: &'static [ParamType],
    pub binary_operators: &'static [OperatorEntry],
    pub not_precedence: u8,
    pub unary_precedence: u8,
    pub cast_precedence: u8,
    pub trailing_comma_sites: &'static [ListSite],
    pub insert_into_optional: bool,
    pub delete_from_optional: bool,
    pub grammar_features: &'static [GrammarFeature],
    pub canonical_rules: &'static [CanonicalRule],
    /// Preferred not-equal spelling (`LtGt` or `BangEq`)
    pub not_equal: SqlSyntaxKind,
    pub type_aliases: &'static [TypeAlias],
}

static ALL: [&Dialect; 4] = [&SQLITE, &POSTGRESQL, &MYSQL, &BIGQUERY];

impl Dialect {
    /// All built-in dialects
    pub fn all() -> &'static [&'static Dialect] {
        &ALL
    }

    /// Look up a dialect by name or alias, case-insensitively
    pub fn by_name(name: &str) -> Option<&'static Dialect> {
        Self::all().iter().copied().find(|dialect| {
            dialect.name.eq_ignore_ascii_case(name)
                || dialect
                    .aliases
                    .iter()
                    .any(|alias| alias.eq_ignore_ascii_case(name))
        })
    }

    pub fn is_reserved(&self, keyword: Keyword) -> bool {
        self.reserved.contains(keyword)
    }

    pub fn is_type_name(&self, keyword: Keyword) -> bool {
        self.type_names.contains(keyword)
    }

    /// Keyword token kind for reserved words, identifier otherwise
    pub fn classify_word(&self, word: &str) -> SqlSyntaxKind {
        match Keyword::from_word(word) {
            Some(keyword) if self.is_reserved(keyword) => SqlSyntaxKind::Keyword,
            _ => SqlSyntaxKind::Ident,
        }
    }

    pub fn quote_style(&self, open: char) -> Option<QuoteStyle> {
        self.identifier_quotes
            .iter()
            .copied()
            .find(|style| style.open() == open)
    }

    pub fn canonical_quote(&self) -> Option<QuoteStyle> {
        self.identifier_quotes.first().copied()
    }

    pub fn supports_param_type(&self, param: ParamType) -> bool {
        self.param_types.contains(&param)
    }

    /// Position of `param` in the priority list (lower wins ties)
    pub fn param_priority(&self, param: ParamType) -> usize {
        self.param_types
            .iter()
            .position(|candidate| *candidate == param)
            .unwrap_or(usize::MAX)
    }

    /// Binary operator table entry for the current token, if any
    pub fn binary_operator(
        &self,
        kind: SqlSyntaxKind,
        keyword: Option<Keyword>,
    ) -> Option<&'static OperatorEntry> {
        self.binary_operators.iter().find(|entry| match entry.token {
            OpToken::Punct(punct) => punct == kind,
            OpToken::Word(word) => kind == SqlSyntaxKind::Keyword && keyword == Some(word),
        })
    }

    pub fn precedence_of(&self, op: BinaryOp) -> Option<u8> {
        self.binary_operators
            .iter()
            .find(|entry| entry.op == op)
            .map(|entry| entry.precedence)
    }

    pub fn allows_trailing_comma(&self, site: ListSite) -> bool {
        self.trailing_comma_sites.contains(&site)
    }

    pub fn supports(&self, feature: GrammarFeature) -> bool {
        self.grammar_features.contains(&feature)
    }

    pub fn has_canonical_rule(&self, rule: CanonicalRule) -> bool {
        self.canonical_rules.contains(&rule)
    }

    pub fn type_alias(&self, keyword: Keyword) -> Option<&'static [Keyword]> {
        self.type_aliases
            .iter()
            .find(|alias| alias.from == keyword)
            .map(|alias| alias.to)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl PartialEq for Dialect {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Dialect {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_by_name_and_alias() {
        assert_eq!(Dialect::by_name("postgresql").map(|d| d.name), Some("postgresql"));
        assert_eq!(Dialect::by_name("Postgres").map(|d| d.name), Some("postgresql"));
        assert_eq!(Dialect::by_name("SQLite").map(|d| d.name), Some("sqlite"));
        assert!(Dialect::by_name("oracle").is_none());
    }

    #[test]
    fn test_all_lists_each_dialect_once() {
        let all: &'static [&'static Dialect] = Dialect::all();
        let names: Vec<_> = all.iter().map(|dialect| dialect.name).collect();
        assert_eq!(names, vec!["sqlite", "postgresql", "mysql", "bigquery"]);
        for &dialect in all {
            assert_eq!(Dialect::by_name(dialect.name), Some(dialect));
        }
    }

    #[test]
    fn test_param_type_spelling() {
        for param in ParamType::ALL {
            assert_eq!(ParamType::from_spelling(param.spelling()), Some(param));
        }
        assert_eq!(ParamType::from_spelling("%s"), None);
        assert_eq!(ParamType::NumberedDollar.kind(), ParamKind::Numbered);
        assert_eq!(ParamType::NamedAt.sigil(), '@');
    }

    #[test]
    fn test_param_type_set() {
        let set = ParamTypeSet::from_slice(&[ParamType::NamedAt, ParamType::Positional]);
        assert!(set.contains(ParamType::Positional));
        assert!(!set.contains(ParamType::NumberedDollar));
        assert_eq!(
            set.iter().collect::<Vec<_>>(),
            vec![ParamType::Positional, ParamType::NamedAt]
        );
    }

    #[test]
    fn test_word_classification_is_per_dialect() {
        assert_eq!(POSTGRESQL.classify_word("ilike"), SqlSyntaxKind::Keyword);
        assert_eq!(MYSQL.classify_word("ilike"), SqlSyntaxKind::Ident);
        assert_eq!(SQLITE.classify_word("date"), SqlSyntaxKind::Ident);
        assert_eq!(SQLITE.classify_word("users"), SqlSyntaxKind::Ident);
    }

    #[test]
    fn test_operator_tables_differ() {
        let pg_concat = POSTGRESQL
            .binary_operator(SqlSyntaxKind::PipePipe, None)
            .map(|entry| entry.op);
        let mysql_concat = MYSQL
            .binary_operator(SqlSyntaxKind::PipePipe, None)
            .map(|entry| entry.op);
        assert_eq!(pg_concat, Some(BinaryOp::Concat));
        assert_eq!(mysql_concat, Some(BinaryOp::Or));
        assert!(
            SQLITE.precedence_of(BinaryOp::Concat) > SQLITE.precedence_of(BinaryOp::Mul),
            "sqlite binds || tighter than *"
        );
        assert!(
            POSTGRESQL.precedence_of(BinaryOp::Concat) < POSTGRESQL.precedence_of(BinaryOp::Add)
        );
    }

    #[test]
    fn test_grammar_features_are_per_dialect() {
        assert!(POSTGRESQL.supports(GrammarFeature::DistinctOn));
        assert!(!MYSQL.supports(GrammarFeature::DistinctOn));
        assert!(SQLITE.supports(GrammarFeature::OnConflict));
        assert!(MYSQL.supports(GrammarFeature::LockingClause));
        assert!(!SQLITE.supports(GrammarFeature::LockingClause));
        assert!(!BIGQUERY.supports(GrammarFeature::Collate));

        let regex = POSTGRESQL
            .binary_operator(SqlSyntaxKind::BangTildeStar, None)
            .map(|entry| entry.op);
        assert_eq!(regex, Some(BinaryOp::NotIMatch));
        assert_eq!(
            POSTGRESQL.precedence_of(BinaryOp::Match),
            POSTGRESQL.precedence_of(BinaryOp::Concat)
        );
    }

    #[test]
    fn test_every_dialect_is_consistent() {
        for dialect in Dialect::all() {
            for param in dialect.default_param_types {
                assert!(dialect.supports_param_type(*param), "{}", dialect.name);
            }
            for alias in dialect.type_aliases {
                assert!(dialect.is_type_name(alias.from), "{}", dialect.name);
            }
            let and = dialect.precedence_of(BinaryOp::And).unwrap_or(0);
            let or = dialect.precedence_of(BinaryOp::Or).unwrap_or(0);
            assert!(or < and && and < dialect.not_precedence, "{}", dialect.name);
            assert!(!dialect.identifier_quotes.is_empty());
            if dialect.supports(GrammarFeature::Collate) {
                assert!(dialect.is_reserved(Keyword::Collate), "{}", dialect.name);
            }
            if dialect.supports(GrammarFeature::LockingClause) {
                assert!(dialect.is_reserved(Keyword::For), "{}", dialect.name);
            }
            if dialect.supports(GrammarFeature::ArraySyntax) {
                assert!(dialect.is_reserved(Keyword::Array), "{}", dialect.name);
            }
        }
    }
}
