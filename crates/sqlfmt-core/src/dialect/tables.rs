//! Built-in dialect tables

use super::{
    BinaryOp, CanonicalRule, Dialect, GrammarFeature, Keyword, KeywordSet, ListSite,
    OperatorEntry, ParamType, QuoteStyle, TypeAlias,
};
use crate::cst::SqlSyntaxKind;

use GrammarFeature as G;
use Keyword as K;
use SqlSyntaxKind as S;

/// Reserved in every dialect
const CORE_RESERVED: KeywordSet = KeywordSet::from_slice(&[
    K::All,
    K::And,
    K::As,
    K::Asc,
    K::Between,
    K::By,
    K::Case,
    K::Cast,
    K::Cross,
    K::Default,
    K::Delete,
    K::Desc,
    K::Distinct,
    K::Else,
    K::End,
    K::Except,
    K::Exists,
    K::False,
    K::From,
    K::Full,
    K::Group,
    K::Having,
    K::In,
    K::Inner,
    K::Insert,
    K::Intersect,
    K::Into,
    K::Is,
    K::Join,
    K::Left,
    K::Like,
    K::Limit,
    K::Natural,
    K::Not,
    K::Null,
    K::Offset,
    K::On,
    K::Or,
    K::Order,
    K::Outer,
    K::Right,
    K::Select,
    K::Set,
    K::Then,
    K::True,
    K::Union,
    K::Update,
    K::Using,
    K::Values,
    K::When,
    K::Where,
    K::With,
]);

const STANDARD_TYPES: KeywordSet = KeywordSet::from_slice(&[
    K::Bigint,
    K::Char,
    K::Character,
    K::Date,
    K::Decimal,
    K::Double,
    K::Float,
    K::Int,
    K::Integer,
    K::Numeric,
    K::Precision,
    K::Real,
    K::Smallint,
    K::Text,
    K::Time,
    K::Timestamp,
    K::Varchar,
    K::Varying,
    K::Boolean,
]);

const COMMON_CANONICAL: [CanonicalRule; 4] = [
    CanonicalRule::ExplicitAlias,
    CanonicalRule::ExplicitCrossJoin,
    CanonicalRule::RedundantParens,
    CanonicalRule::NotEqualSpelling,
];

pub static SQLITE: Dialect = Dialect {
    name: "sqlite",
    aliases: &[],
    reserved: CORE_RESERVED.union(KeywordSet::from_slice(&[K::Collate, K::Returning])),
    type_names: STANDARD_TYPES,
    identifier_quotes: &[QuoteStyle::Double, QuoteStyle::Backtick, QuoteStyle::Bracket],
    double_quoted_strings: false,
    backslash_escapes: false,
    escape_string_prefix: false,
    dollar_quoted_strings: false,
    hash_comments: false,
    nested_block_comments: false,
    double_colon_cast: false,
    param_types: &[
        ParamType::NumberedQuestion,
        ParamType::Positional,
        ParamType::NamedColon,
        ParamType::NamedAt,
        ParamType::NamedDollar,
    ],
    default_param_types: &[
        ParamType::NumberedQuestion,
        ParamType::Positional,
        ParamType::NamedColon,
        ParamType::NamedAt,
        ParamType::NamedDollar,
    ],
    binary_operators: &[
        OperatorEntry::word(K::Or, BinaryOp::Or, 1),
        OperatorEntry::word(K::And, BinaryOp::And, 2),
        OperatorEntry::punct(S::Eq, BinaryOp::Eq, 4),
        OperatorEntry::punct(S::EqEq, BinaryOp::Eq, 4),
        OperatorEntry::punct(S::LtGt, BinaryOp::NotEq, 4),
        OperatorEntry::punct(S::BangEq, BinaryOp::NotEq, 4),
        OperatorEntry::word(K::Is, BinaryOp::Is, 4),
        OperatorEntry::word(K::In, BinaryOp::In, 4),
        OperatorEntry::word(K::Like, BinaryOp::Like, 4),
        OperatorEntry::word(K::Between, BinaryOp::Between, 4),
        OperatorEntry::punct(S::Lt, BinaryOp::Lt, 5),
        OperatorEntry::punct(S::Gt, BinaryOp::Gt, 5),
        OperatorEntry::punct(S::LtEq, BinaryOp::LtEq, 5),
        OperatorEntry::punct(S::GtEq, BinaryOp::GtEq, 5),
        OperatorEntry::punct(S::Plus, BinaryOp::Add, 6),
        OperatorEntry::punct(S::Minus, BinaryOp::Sub, 6),
        OperatorEntry::punct(S::Star, BinaryOp::Mul, 7),
        OperatorEntry::punct(S::Slash, BinaryOp::Div, 7),
        OperatorEntry::punct(S::Percent, BinaryOp::Mod, 7),
        OperatorEntry::punct(S::PipePipe, BinaryOp::Concat, 8),
    ],
    not_precedence: 3,
    unary_precedence: 9,
    cast_precedence: 10,
    trailing_comma_sites: &[],
    insert_into_optional: false,
    delete_from_optional: false,
    grammar_features: &[G::OnConflict, G::Collate, G::IsDistinctFrom],
    canonical_rules: &[
        COMMON_CANONICAL[0],
        COMMON_CANONICAL[1],
        COMMON_CANONICAL[2],
        COMMON_CANONICAL[3],
        CanonicalRule::DoubleEquals,
    ],
    not_equal: S::BangEq,
    type_aliases: &[],
};

pub static POSTGRESQL: Dialect = Dialect {
    name: "postgresql",
    aliases: &["postgres", "pg"],
    reserved: CORE_RESERVED.union(KeywordSet::from_slice(&[
        K::Array,
        K::Collate,
        K::For,
        K::Ilike,
        K::Returning,
    ])),
    type_names: STANDARD_TYPES.union(KeywordSet::from_slice(&[K::Bool, K::Interval])),
    identifier_quotes: &[QuoteStyle::Double],
    double_quoted_strings: false,
    backslash_escapes: false,
    escape_string_prefix: true,
    dollar_quoted_strings: true,
    hash_comments: false,
    nested_block_comments: true,
    double_colon_cast: true,
    param_types: &[
        ParamType::NumberedDollar,
        ParamType::Positional,
        ParamType::NumberedQuestion,
        ParamType::NamedColon,
        ParamType::NamedAt,
    ],
    default_param_types: &[ParamType::NumberedDollar],
    binary_operators: &[
        OperatorEntry::word(K::Or, BinaryOp::Or, 1),
        OperatorEntry::word(K::And, BinaryOp::And, 2),
        OperatorEntry::word(K::Is, BinaryOp::Is, 4),
        OperatorEntry::punct(S::Eq, BinaryOp::Eq, 5),
        OperatorEntry::punct(S::LtGt, BinaryOp::NotEq, 5),
        OperatorEntry::punct(S::BangEq, BinaryOp::NotEq, 5),
        OperatorEntry::punct(S::Lt, BinaryOp::Lt, 5),
        OperatorEntry::punct(S::Gt, BinaryOp::Gt, 5),
        OperatorEntry::punct(S::LtEq, BinaryOp::LtEq, 5),
        OperatorEntry::punct(S::GtEq, BinaryOp::GtEq, 5),
        OperatorEntry::word(K::In, BinaryOp::In, 6),
        OperatorEntry::word(K::Like, BinaryOp::Like, 6),
        OperatorEntry::word(K::Ilike, BinaryOp::ILike, 6),
        OperatorEntry::word(K::Between, BinaryOp::Between, 6),
        OperatorEntry::punct(S::PipePipe, BinaryOp::Concat, 7),
        OperatorEntry::punct(S::Tilde, BinaryOp::Match, 7),
        OperatorEntry::punct(S::TildeStar, BinaryOp::IMatch, 7),
        OperatorEntry::punct(S::BangTilde, BinaryOp::NotMatch, 7),
        OperatorEntry::punct(S::BangTildeStar, BinaryOp::NotIMatch, 7),
        OperatorEntry::punct(S::Plus, BinaryOp::Add, 8),
        OperatorEntry::punct(S::Minus, BinaryOp::Sub, 8),
        OperatorEntry::punct(S::Star, BinaryOp::Mul, 9),
        OperatorEntry::punct(S::Slash, BinaryOp::Div, 9),
        OperatorEntry::punct(S::Percent, BinaryOp::Mod, 9),
    ],
    not_precedence: 3,
    unary_precedence: 10,
    cast_precedence: 11,
    trailing_comma_sites: &[],
    insert_into_optional: false,
    delete_from_optional: false,
    grammar_features: &[
        G::DistinctOn,
        G::LimitAll,
        G::OnConflict,
        G::LockingClause,
        G::ArraySyntax,
        G::Collate,
        G::AliasColumnList,
        G::IsDistinctFrom,
        G::RegexOperators,
    ],
    canonical_rules: &[
        COMMON_CANONICAL[0],
        COMMON_CANONICAL[1],
        COMMON_CANONICAL[2],
        COMMON_CANONICAL[3],
        CanonicalRule::TypeAliases,
    ],
    not_equal: S::LtGt,
    type_aliases: &[
        TypeAlias {
            from: K::Int,
            to: &[K::Integer],
        },
        TypeAlias {
            from: K::Bool,
            to: &[K::Boolean],
        },
        TypeAlias {
            from: K::Float,
            to: &[K::Double, K::Precision],
        },
    ],
};

pub static MYSQL: Dialect = Dialect {
    name: "mysql",
    aliases: &["mariadb"],
    reserved: CORE_RESERVED
        .without(&[K::Full])
        .union(KeywordSet::from_slice(&[K::Collate, K::For])),
    type_names: STANDARD_TYPES.union(KeywordSet::from_slice(&[K::Bool])),
    identifier_quotes: &[QuoteStyle::Backtick],
    double_quoted_strings: true,
    backslash_escapes: true,
    escape_string_prefix: false,
    dollar_quoted_strings: false,
    hash_comments: true,
    nested_block_comments: false,
    double_colon_cast: false,
    param_types: &[ParamType::Positional, ParamType::NamedColon, ParamType::NamedAt],
    default_param_types: &[ParamType::Positional],
    binary_operators: &[
        OperatorEntry::word(K::Or, BinaryOp::Or, 1),
        OperatorEntry::punct(S::PipePipe, BinaryOp::Or, 1),
        OperatorEntry::word(K::And, BinaryOp::And, 2),
        OperatorEntry::punct(S::AmpAmp, BinaryOp::And, 2),
        OperatorEntry::word(K::Between, BinaryOp::Between, 4),
        OperatorEntry::punct(S::Eq, BinaryOp::Eq, 5),
        OperatorEntry::punct(S::LtGt, BinaryOp::NotEq, 5),
        OperatorEntry::punct(S::BangEq, BinaryOp::NotEq, 5),
        OperatorEntry::punct(S::Lt, BinaryOp::Lt, 5),
        OperatorEntry::punct(S::Gt, BinaryOp::Gt, 5),
        OperatorEntry::punct(S::LtEq, BinaryOp::LtEq, 5),
        OperatorEntry::punct(S::GtEq, BinaryOp::GtEq, 5),
        OperatorEntry::word(K::Is, BinaryOp::Is, 5),
        OperatorEntry::word(K::Like, BinaryOp::Like, 5),
        OperatorEntry::word(K::In, BinaryOp::In, 5),
        OperatorEntry::punct(S::Plus, BinaryOp::Add, 6),
        OperatorEntry::punct(S::Minus, BinaryOp::Sub, 6),
        OperatorEntry::punct(S::Star, BinaryOp::Mul, 7),
        OperatorEntry::punct(S::Slash, BinaryOp::Div, 7),
        OperatorEntry::punct(S::Percent, BinaryOp::Mod, 7),
    ],
    not_precedence: 3,
    unary_precedence: 8,
    cast_precedence: 9,
    trailing_comma_sites: &[],
    insert_into_optional: true,
    delete_from_optional: false,
    grammar_features: &[G::LockingClause, G::Collate],
    canonical_rules: &[
        COMMON_CANONICAL[0],
        COMMON_CANONICAL[1],
        COMMON_CANONICAL[2],
        COMMON_CANONICAL[3],
        CanonicalRule::InsertInto,
        CanonicalRule::LogicalOperatorWords,
        CanonicalRule::TypeAliases,
    ],
    not_equal: S::LtGt,
    type_aliases: &[
        TypeAlias {
            from: K::Int,
            to: &[K::Integer],
        },
        TypeAlias {
            from: K::Bool,
            to: &[K::Boolean],
        },
    ],
};

pub static BIGQUERY: Dialect = Dialect {
    name: "bigquery",
    aliases: &["googlesql"],
    reserved: CORE_RESERVED,
    type_names: KeywordSet::from_slice(&[
        K::Int64,
        K::Int,
        K::Integer,
        K::Bigint,
        K::Smallint,
        K::Float64,
        K::Numeric,
        K::Decimal,
        K::String,
        K::Bool,
        K::Boolean,
        K::Date,
        K::Time,
        K::Timestamp,
        K::Interval,
    ]),
    identifier_quotes: &[QuoteStyle::Backtick],
    double_quoted_strings: true,
    backslash_escapes: true,
    escape_string_prefix: false,
    dollar_quoted_strings: false,
    hash_comments: true,
    nested_block_comments: false,
    double_colon_cast: false,
    param_types: &[ParamType::Positional, ParamType::NamedAt],
    default_param_types: &[ParamType::Positional, ParamType::NamedAt],
    binary_operators: &[
        OperatorEntry::word(K::Or, BinaryOp::Or, 1),
        OperatorEntry::word(K::And, BinaryOp::And, 2),
        OperatorEntry::punct(S::Eq, BinaryOp::Eq, 4),
        OperatorEntry::punct(S::LtGt, BinaryOp::NotEq, 4),
        OperatorEntry::punct(S::BangEq, BinaryOp::NotEq, 4),
        OperatorEntry::punct(S::Lt, BinaryOp::Lt, 4),
        OperatorEntry::punct(S::Gt, BinaryOp::Gt, 4),
        OperatorEntry::punct(S::LtEq, BinaryOp::LtEq, 4),
        OperatorEntry::punct(S::GtEq, BinaryOp::GtEq, 4),
        OperatorEntry::word(K::Is, BinaryOp::Is, 4),
        OperatorEntry::word(K::Like, BinaryOp::Like, 4),
        OperatorEntry::word(K::In, BinaryOp::In, 4),
        OperatorEntry::word(K::Between, BinaryOp::Between, 4),
        OperatorEntry::punct(S::Plus, BinaryOp::Add, 5),
        OperatorEntry::punct(S::Minus, BinaryOp::Sub, 5),
        OperatorEntry::punct(S::Star, BinaryOp::Mul, 6),
        OperatorEntry::punct(S::Slash, BinaryOp::Div, 6),
        OperatorEntry::punct(S::PipePipe, BinaryOp::Concat, 6),
    ],
    not_precedence: 3,
    unary_precedence: 7,
    cast_precedence: 8,
    trailing_comma_sites: &[ListSite::SelectList],
    insert_into_optional: true,
    delete_from_optional: true,
    grammar_features: &[G::IsDistinctFrom],
    canonical_rules: &[
        COMMON_CANONICAL[0],
        COMMON_CANONICAL[1],
        COMMON_CANONICAL[2],
        COMMON_CANONICAL[3],
        CanonicalRule::InsertInto,
        CanonicalRule::DeleteFrom,
        CanonicalRule::TypeAliases,
    ],
    not_equal: S::LtGt,
    type_aliases: &[
        TypeAlias {
            from: K::Int,
            to: &[K::Int64],
        },
        TypeAlias {
            from: K::Integer,
            to: &[K::Int64],
        },
        TypeAlias {
            from: K::Bigint,
            to: &[K::Int64],
        },
        TypeAlias {
            from: K::Smallint,
            to: &[K::Int64],
        },
        TypeAlias {
            from: K::Boolean,
            to: &[K::Bool],
        },
        TypeAlias {
            from: K::Decimal,
            to: &[K::Numeric],
        },
    ],
};
