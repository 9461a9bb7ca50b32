//! SQL keyword vocabulary
//!
//! One enum covers the words every dialect knows about. Whether a word is
//! reserved, a type name, or just an identifier is decided per dialect
//! through [`KeywordSet`] membership.

use std::fmt;

/// Longest keyword spelling, used to bound case-insensitive lookup
const MAX_KEYWORD_LEN: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Keyword {
    All,
    And,
    Array,
    As,
    Asc,
    Between,
    Bigint,
    Bool,
    Boolean,
    By,
    Case,
    Cast,
    Char,
    Character,
    Collate,
    Conflict,
    Constraint,
    Cross,
    Date,
    Decimal,
    Default,
    Delete,
    Desc,
    Distinct,
    Do,
    Double,
    Else,
    End,
    Except,
    Exists,
    False,
    First,
    Float,
    Float64,
    For,
    From,
    Full,
    Group,
    Having,
    Ilike,
    In,
    Inner,
    Insert,
    Int,
    Int64,
    Integer,
    Intersect,
    Interval,
    Into,
    Is,
    Join,
    Key,
    Last,
    Left,
    Like,
    Limit,
    Locked,
    Natural,
    No,
    Not,
    Nothing,
    Nowait,
    Null,
    Nulls,
    Numeric,
    Of,
    Offset,
    On,
    Or,
    Order,
    Outer,
    Precision,
    Real,
    Recursive,
    Returning,
    Right,
    Select,
    Set,
    Share,
    Skip,
    Smallint,
    String,
    Text,
    Then,
    Time,
    Timestamp,
    True,
    Union,
    Unknown,
    Update,
    Using,
    Values,
    Varchar,
    Varying,
    When,
    Where,
    With,
}

impl Keyword {
    pub const ALL: &'static [Keyword] = &[
        Keyword::All,
        Keyword::And,
        Keyword::Array,
        Keyword::As,
        Keyword::Asc,
        Keyword::Between,
        Keyword::Bigint,
        Keyword::Bool,
        Keyword::Boolean,
        Keyword::By,
        Keyword::Case,
        Keyword::Cast,
        Keyword::Char,
        Keyword::Character,
        Keyword::Collate,
        Keyword::Conflict,
        Keyword::Constraint,
        Keyword::Cross,
        Keyword::Date,
        Keyword::Decimal,
        Keyword::Default,
        Keyword::Delete,
        Keyword::Desc,
        Keyword::Distinct,
        Keyword::Do,
        Keyword::Double,
        Keyword::Else,
        Keyword::End,
        Keyword::Except,
        Keyword::Exists,
        Keyword::False,
        Keyword::First,
        Keyword::Float,
        Keyword::Float64,
        Keyword::For,
        Keyword::From,
        Keyword::Full,
        Keyword::Group,
        Keyword::Having,
        Keyword::Ilike,
        Keyword::In,
        Keyword::Inner,
        Keyword::Insert,
        Keyword::Int,
        Keyword::Int64,
        Keyword::Integer,
        Keyword::Intersect,
        Keyword::Interval,
        Keyword::Into,
        Keyword::Is,
        Keyword::Join,
        Keyword::Key,
        Keyword::Last,
        Keyword::Left,
        Keyword::Like,
        Keyword::Limit,
        Keyword::Locked,
        Keyword::Natural,
        Keyword::No,
        Keyword::Not,
        Keyword::Nothing,
        Keyword::Nowait,
        Keyword::Null,
        Keyword::Nulls,
        Keyword::Numeric,
        Keyword::Of,
        Keyword::Offset,
        Keyword::On,
        Keyword::Or,
        Keyword::Order,
        Keyword::Outer,
        Keyword::Precision,
        Keyword::Real,
        Keyword::Recursive,
        Keyword::Returning,
        Keyword::Right,
        Keyword::Select,
        Keyword::Set,
        Keyword::Share,
        Keyword::Skip,
        Keyword::Smallint,
        Keyword::String,
        Keyword::Text,
        Keyword::Then,
        Keyword::Time,
        Keyword::Timestamp,
        Keyword::True,
        Keyword::Union,
        Keyword::Unknown,
        Keyword::Update,
        Keyword::Using,
        Keyword::Values,
        Keyword::Varchar,
        Keyword::Varying,
        Keyword::When,
        Keyword::Where,
        Keyword::With,
    ];

    /// Canonical uppercase spelling
    pub const fn as_str(self) -> &'static str {
        match self {
            Keyword::All => "ALL",
            Keyword::And => "AND",
            Keyword::Array => "ARRAY",
            Keyword::As => "AS",
            Keyword::Asc => "ASC",
            Keyword::Between => "BETWEEN",
            Keyword::Bigint => "BIGINT",
            Keyword::Bool => "BOOL",
            Keyword::Boolean => "BOOLEAN",
            Keyword::By => "BY",
            Keyword::Case => "CASE",
            Keyword::Cast => "CAST",
            Keyword::Char => "CHAR",
            Keyword::Character => "CHARACTER",
            Keyword::Collate => "COLLATE",
            Keyword::Conflict => "CONFLICT",
            Keyword::Constraint => "CONSTRAINT",
            Keyword::Cross => "CROSS",
            Keyword::Date => "DATE",
            Keyword::Decimal => "DECIMAL",
            Keyword::Default => "DEFAULT",
            Keyword::Delete => "DELETE",
            Keyword::Desc => "DESC",
            Keyword::Distinct => "DISTINCT",
            Keyword::Do => "DO",
            Keyword::Double => "DOUBLE",
            Keyword::Else => "ELSE",
            Keyword::End => "END",
            Keyword::Except => "EXCEPT",
            Keyword::Exists => "EXISTS",
            Keyword::False => "FALSE",
            Keyword::First => "FIRST",
            Keyword::Float => "FLOAT",
            Keyword::Float64 => "FLOAT64",
            Keyword::For => "FOR",
            Keyword::From => "FROM",
            Keyword::Full => "FULL",
            Keyword::Group => "GROUP",
            Keyword::Having => "HAVING",
            Keyword::Ilike => "ILIKE",
            Keyword::In => "IN",
            Keyword::Inner => "INNER",
            Keyword::Insert => "INSERT",
            Keyword::Int => "INT",
            Keyword::Int64 => "INT64",
            Keyword::Integer => "INTEGER",
            Keyword::Intersect => "INTERSECT",
            Keyword::Interval => "INTERVAL",
            Keyword::Into => "INTO",
            Keyword::Is => "IS",
            Keyword::Join => "JOIN",
            Keyword::Key => "KEY",
            Keyword::Last => "LAST",
            Keyword::Left => "LEFT",
            Keyword::Like => "LIKE",
            Keyword::Limit => "LIMIT",
            Keyword::Locked => "LOCKED",
            Keyword::Natural => "NATURAL",
            Keyword::No => "NO",
            Keyword::Not => "NOT",
            Keyword::Nothing => "NOTHING",
            Keyword::Nowait => "NOWAIT",
            Keyword::Null => "NULL",
            Keyword::Nulls => "NULLS",
            Keyword::Numeric => "NUMERIC",
            Keyword::Of => "OF",
            Keyword::Offset => "OFFSET",
            Keyword::On => "ON",
            Keyword::Or => "OR",
            Keyword::Order => "ORDER",
            Keyword::Outer => "OUTER",
            Keyword::Precision => "PRECISION",
            Keyword::Real => "REAL",
            Keyword::Recursive => "RECURSIVE",
            Keyword::Returning => "RETURNING",
            Keyword::Right => "RIGHT",
            Keyword::Select => "SELECT",
            Keyword::Set => "SET",
            Keyword::Share => "SHARE",
            Keyword::Skip => "SKIP",
            Keyword::Smallint => "SMALLINT",
            Keyword::String => "STRING",
            Keyword::Text => "TEXT",
            Keyword::Then => "THEN",
            Keyword::Time => "TIME",
            Keyword::Timestamp => "TIMESTAMP",
            Keyword::True => "TRUE",
            Keyword::Union => "UNION",
            Keyword::Unknown => "UNKNOWN",
            Keyword::Update => "UPDATE",
            Keyword::Using => "USING",
            Keyword::Values => "VALUES",
            Keyword::Varchar => "VARCHAR",
            Keyword::Varying => "VARYING",
            Keyword::When => "WHEN",
            Keyword::Where => "WHERE",
            Keyword::With => "WITH",
        }
    }

    /// Case-insensitive lookup of a bare word
    pub fn from_word(word: &str) -> Option<Keyword> {
        if word.len() > MAX_KEYWORD_LEN || !word.is_ascii() {
            return None;
        }
        let mut buffer = [0u8; MAX_KEYWORD_LEN];
        for (slot, byte) in buffer.iter_mut().zip(word.bytes()) {
            *slot = byte.to_ascii_uppercase();
        }
        let upper = std::str::from_utf8(&buffer[..word.len()]).ok()?;
        let keyword = match upper {
            "ALL" => Keyword::All,
            "AND" => Keyword::And,
            "ARRAY" => Keyword::Array,
            "AS" => Keyword::As,
            "ASC" => Keyword::Asc,
            "BETWEEN" => Keyword::Between,
            "BIGINT" => Keyword::Bigint,
            "BOOL" => Keyword::Bool,
            "BOOLEAN" => Keyword::Boolean,
            "BY" => Keyword::By,
            "CASE" => Keyword::Case,
            "CAST" => Keyword::Cast,
            "CHAR" => Keyword::Char,
            "CHARACTER" => Keyword::Character,
            "COLLATE" => Keyword::Collate,
            "CONFLICT" => Keyword::Conflict,
            "CONSTRAINT" => Keyword::Constraint,
            "CROSS" => Keyword::Cross,
            "DATE" => Keyword::Date,
            "DECIMAL" => Keyword::Decimal,
            "DEFAULT" => Keyword::Default,
            "DELETE" => Keyword::Delete,
            "DESC" => Keyword::Desc,
            "DISTINCT" => Keyword::Distinct,
            "DO" => Keyword::Do,
            "DOUBLE" => Keyword::Double,
            "ELSE" => Keyword::Else,
            "END" => Keyword::End,
            "EXCEPT" => Keyword::Except,
            "EXISTS" => Keyword::Exists,
            "FALSE" => Keyword::False,
            "FIRST" => Keyword::First,
            "FLOAT" => Keyword::Float,
            "FLOAT64" => Keyword::Float64,
            "FOR" => Keyword::For,
            "FROM" => Keyword::From,
            "FULL" => Keyword::Full,
            "GROUP" => Keyword::Group,
            "HAVING" => Keyword::Having,
            "ILIKE" => Keyword::Ilike,
            "IN" => Keyword::In,
            "INNER" => Keyword::Inner,
            "INSERT" => Keyword::Insert,
            "INT" => Keyword::Int,
            "INT64" => Keyword::Int64,
            "INTEGER" => Keyword::Integer,
            "INTERSECT" => Keyword::Intersect,
            "INTERVAL" => Keyword::Interval,
            "INTO" => Keyword::Into,
            "IS" => Keyword::Is,
            "JOIN" => Keyword::Join,
            "KEY" => Keyword::Key,
            "LAST" => Keyword::Last,
            "LEFT" => Keyword::Left,
            "LIKE" => Keyword::Like,
            "LIMIT" => Keyword::Limit,
            "LOCKED" => Keyword::Locked,
            "NATURAL" => Keyword::Natural,
            "NO" => Keyword::No,
            "NOT" => Keyword::Not,
            "NOTHING" => Keyword::Nothing,
            "NOWAIT" => Keyword::Nowait,
            "NULL" => Keyword::Null,
            "NULLS" => Keyword::Nulls,
            "NUMERIC" => Keyword::Numeric,
            "OF" => Keyword::Of,
            "OFFSET" => Keyword::Offset,
            "ON" => Keyword::On,
            "OR" => Keyword::Or,
            "ORDER" => Keyword::Order,
            "OUTER" => Keyword::Outer,
            "PRECISION" => Keyword::Precision,
            "REAL" => Keyword::Real,
            "RECURSIVE" => Keyword::Recursive,
            "RETURNING" => Keyword::Returning,
            "RIGHT" => Keyword::Right,
            "SELECT" => Keyword::Select,
            "SET" => Keyword::Set,
            "SHARE" => Keyword::Share,
            "SKIP" => Keyword::Skip,
            "SMALLINT" => Keyword::Smallint,
            "STRING" => Keyword::String,
            "TEXT" => Keyword::Text,
            "THEN" => Keyword::Then,
            "TIME" => Keyword::Time,
            "TIMESTAMP" => Keyword::Timestamp,
            "TRUE" => Keyword::True,
            "UNION" => Keyword::Union,
            "UNKNOWN" => Keyword::Unknown,
            "UPDATE" => Keyword::Update,
            "USING" => Keyword::Using,
            "VALUES" => Keyword::Values,
            "VARCHAR" => Keyword::Varchar,
            "VARYING" => Keyword::Varying,
            "WHEN" => Keyword::When,
            "WHERE" => Keyword::Where,
            "WITH" => Keyword::With,
            _ => return None,
        };
        Some(keyword)
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compact set of keywords, usable in `static` dialect tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeywordSet(u128);

impl KeywordSet {
    pub const EMPTY: KeywordSet = KeywordSet(0);

    pub const fn from_slice(keywords: &[Keyword]) -> Self {
        let mut bits = 0u128;
        let mut i = 0;
        while i < keywords.len() {
            bits |= 1u128 << (keywords[i] as u8);
            i += 1;
        }
        KeywordSet(bits)
    }

    pub const fn union(self, other: KeywordSet) -> Self {
        KeywordSet(self.0 | other.0)
    }

    pub const fn without(self, keywords: &[Keyword]) -> Self {
        let removed = KeywordSet::from_slice(keywords);
        KeywordSet(self.0 & !removed.0)
    }

    pub const fn contains(self, keyword: Keyword) -> bool {
        self.0 & (1u128 << (keyword as u8)) != 0
    }

    pub fn iter(self) -> impl Iterator<Item = Keyword> {
        Keyword::ALL
            .iter()
            .copied()
            .filter(move |keyword| self.contains(*keyword))
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_is_case_insensitive() {
        assert_eq!(Keyword::from_word("select"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("SeLeCt"), Some(Keyword::Select));
        assert_eq!(Keyword::from_word("float64"), Some(Keyword::Float64));
        assert_eq!(Keyword::from_word("Constraint"), Some(Keyword::Constraint));
        assert_eq!(Keyword::from_word("selec"), None);
        assert_eq!(Keyword::from_word("sélect"), None);
        assert_eq!(Keyword::from_word("a_very_long_identifier_name"), None);
    }

    #[test]
    fn test_all_is_in_discriminant_order() {
        for (index, keyword) in Keyword::ALL.iter().enumerate() {
            assert_eq!(*keyword as usize, index);
            assert_eq!(Keyword::from_word(keyword.as_str()), Some(*keyword));
        }
        assert!(Keyword::ALL.len() <= 128);
    }

    #[test]
    fn test_keyword_set() {
        let set = KeywordSet::from_slice(&[Keyword::Select, Keyword::From]);
        assert!(set.contains(Keyword::Select));
        assert!(!set.contains(Keyword::Where));
        let smaller = set.without(&[Keyword::From]);
        assert!(!smaller.contains(Keyword::From));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![Keyword::From, Keyword::Select]);
        assert!(KeywordSet::EMPTY.is_empty());
    }
}
