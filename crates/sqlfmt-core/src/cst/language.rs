//! Rowan language implementation for SQL
//!
//! This module implements the `rowan::Language` trait, connecting
//! [`SqlSyntaxKind`] to Rowan's generic CST infrastructure.

use rowan::Language;

use super::SqlSyntaxKind;

/// Language implementation for SQL
///
/// A zero-sized type implementing `rowan::Language` for every supported
/// dialect; dialect differences live in the token stream, not in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SqlLanguage;

impl Language for SqlLanguage {
    type Kind = SqlSyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        match raw.0 {
            0 => SqlSyntaxKind::Whitespace,
            1 => SqlSyntaxKind::Newline,
            2 => SqlSyntaxKind::LineComment,
            3 => SqlSyntaxKind::BlockComment,
            10 => SqlSyntaxKind::Keyword,
            11 => SqlSyntaxKind::Ident,
            12 => SqlSyntaxKind::QuotedIdent,
            13 => SqlSyntaxKind::Number,
            14 => SqlSyntaxKind::String,
            15 => SqlSyntaxKind::Placeholder,
            30 => SqlSyntaxKind::Comma,
            31 => SqlSyntaxKind::Semicolon,
            32 => SqlSyntaxKind::Dot,
            33 => SqlSyntaxKind::LParen,
            34 => SqlSyntaxKind::RParen,
            35 => SqlSyntaxKind::LBracket,
            36 => SqlSyntaxKind::RBracket,
            37 => SqlSyntaxKind::Colon,
            38 => SqlSyntaxKind::Question,
            39 => SqlSyntaxKind::At,
            40 => SqlSyntaxKind::Dollar,
            50 => SqlSyntaxKind::Star,
            51 => SqlSyntaxKind::Plus,
            52 => SqlSyntaxKind::Minus,
            53 => SqlSyntaxKind::Slash,
            54 => SqlSyntaxKind::Percent,
            55 => SqlSyntaxKind::Eq,
            56 => SqlSyntaxKind::EqEq,
            57 => SqlSyntaxKind::LtGt,
            58 => SqlSyntaxKind::BangEq,
            59 => SqlSyntaxKind::Lt,
            60 => SqlSyntaxKind::Gt,
            61 => SqlSyntaxKind::LtEq,
            62 => SqlSyntaxKind::GtEq,
            63 => SqlSyntaxKind::PipePipe,
            64 => SqlSyntaxKind::AmpAmp,
            65 => SqlSyntaxKind::ColonColon,
            66 => SqlSyntaxKind::Amp,
            67 => SqlSyntaxKind::Pipe,
            68 => SqlSyntaxKind::Caret,
            69 => SqlSyntaxKind::Tilde,
            70 => SqlSyntaxKind::Bang,
            71 => SqlSyntaxKind::TildeStar,
            72 => SqlSyntaxKind::BangTilde,
            73 => SqlSyntaxKind::BangTildeStar,
            90 => SqlSyntaxKind::Error,
            99 => SqlSyntaxKind::Eof,
            100 => SqlSyntaxKind::SourceFile,
            101 => SqlSyntaxKind::SelectStmt,
            102 => SqlSyntaxKind::InsertStmt,
            103 => SqlSyntaxKind::UpdateStmt,
            104 => SqlSyntaxKind::DeleteStmt,
            120 => SqlSyntaxKind::WithClause,
            121 => SqlSyntaxKind::Cte,
            122 => SqlSyntaxKind::SelectCore,
            123 => SqlSyntaxKind::CompoundSelect,
            124 => SqlSyntaxKind::SelectClause,
            125 => SqlSyntaxKind::SelectItem,
            126 => SqlSyntaxKind::Alias,
            127 => SqlSyntaxKind::FromClause,
            128 => SqlSyntaxKind::TableRef,
            129 => SqlSyntaxKind::DerivedTable,
            130 => SqlSyntaxKind::JoinExpr,
            131 => SqlSyntaxKind::OnClause,
            132 => SqlSyntaxKind::UsingClause,
            133 => SqlSyntaxKind::WhereClause,
            134 => SqlSyntaxKind::GroupByClause,
            135 => SqlSyntaxKind::HavingClause,
            136 => SqlSyntaxKind::OrderByClause,
            137 => SqlSyntaxKind::OrderItem,
            138 => SqlSyntaxKind::LimitClause,
            139 => SqlSyntaxKind::OffsetClause,
            140 => SqlSyntaxKind::ValuesClause,
            141 => SqlSyntaxKind::ColumnList,
            142 => SqlSyntaxKind::SetClause,
            143 => SqlSyntaxKind::Assignment,
            144 => SqlSyntaxKind::ReturningClause,
            145 => SqlSyntaxKind::QualifiedName,
            146 => SqlSyntaxKind::DistinctOn,
            147 => SqlSyntaxKind::OnConflictClause,
            148 => SqlSyntaxKind::ConflictTarget,
            149 => SqlSyntaxKind::ConflictAction,
            150 => SqlSyntaxKind::LockingClause,
            170 => SqlSyntaxKind::Literal,
            171 => SqlSyntaxKind::ColumnRef,
            172 => SqlSyntaxKind::AllColumns,
            173 => SqlSyntaxKind::PlaceholderExpr,
            174 => SqlSyntaxKind::FuncCall,
            175 => SqlSyntaxKind::ArgList,
            176 => SqlSyntaxKind::BinaryExpr,
            177 => SqlSyntaxKind::PrefixExpr,
            178 => SqlSyntaxKind::ParenExpr,
            179 => SqlSyntaxKind::IsExpr,
            180 => SqlSyntaxKind::InExpr,
            181 => SqlSyntaxKind::BetweenExpr,
            182 => SqlSyntaxKind::CaseExpr,
            183 => SqlSyntaxKind::WhenClause,
            184 => SqlSyntaxKind::ElseClause,
            185 => SqlSyntaxKind::CastExpr,
            186 => SqlSyntaxKind::TypeCastExpr,
            187 => SqlSyntaxKind::DataType,
            188 => SqlSyntaxKind::TypeParams,
            189 => SqlSyntaxKind::SubqueryExpr,
            190 => SqlSyntaxKind::ExistsExpr,
            191 => SqlSyntaxKind::ExprList,
            192 => SqlSyntaxKind::ArrayExpr,
            193 => SqlSyntaxKind::SubscriptExpr,
            194 => SqlSyntaxKind::CollateExpr,
            195 => SqlSyntaxKind::TypedLiteral,
            250 => SqlSyntaxKind::ErrorNode,
            other => {
                tracing::warn!("Unknown syntax kind: {}", other);
                SqlSyntaxKind::Error
            }
        }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        rowan::SyntaxKind(kind as u16)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [
            SqlSyntaxKind::Whitespace,
            SqlSyntaxKind::Keyword,
            SqlSyntaxKind::Placeholder,
            SqlSyntaxKind::ColonColon,
            SqlSyntaxKind::SourceFile,
            SqlSyntaxKind::SelectStmt,
            SqlSyntaxKind::TypeCastExpr,
            SqlSyntaxKind::BangTildeStar,
            SqlSyntaxKind::OnConflictClause,
            SqlSyntaxKind::LockingClause,
            SqlSyntaxKind::TypedLiteral,
            SqlSyntaxKind::ErrorNode,
        ] {
            let raw = SqlLanguage::kind_to_raw(kind);
            assert_eq!(SqlLanguage::kind_from_raw(raw), kind);
        }
    }

    #[test]
    fn test_unknown_raw_maps_to_error() {
        assert_eq!(
            SqlLanguage::kind_from_raw(rowan::SyntaxKind(9999)),
            SqlSyntaxKind::Error
        );
    }
}
