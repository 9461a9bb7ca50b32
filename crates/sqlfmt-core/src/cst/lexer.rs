//! Dialect-aware lexer that preserves all trivia
//!
//! Lexing happens in two steps:
//! - [`Lexer`] is a lazy iterator of raw tokens. Whitespace, newlines and
//!   comments come out as ordinary tokens and unlexable input becomes an
//!   `Error` token, so concatenating every token text reproduces the input.
//! - [`tokenize`] collects the raw tokens and attaches trivia to significant
//!   tokens: same-line trailing comments go to the preceding token, everything
//!   else leads the next token, and whatever follows the last token is
//!   end-of-file trivia.

use crate::cst::SqlSyntaxKind;
use crate::diagnostics::{LineIndex, Span};
use crate::dialect::{Dialect, GrammarFeature, Keyword, ParamType, ParamTypeSet};
use crate::error::{LexError, LexErrorKind};
use std::cell::OnceCell;
use std::ops::Range;

/// A raw token with its syntax kind and span
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CstToken {
    pub kind: SqlSyntaxKind,
    pub text: String,
    pub span: Span,
}

impl CstToken {
    pub fn new(kind: SqlSyntaxKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }
}

/// Whitespace, newline or comment token
pub type Trivia = CstToken;

/// A significant token with the trivia attached to it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqlToken {
    pub kind: SqlSyntaxKind,
    pub text: String,
    pub span: Span,
    /// Keyword spelled by an unquoted word, reserved or not
    pub keyword: Option<Keyword>,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

impl SqlToken {
    pub fn is(&self, keyword: Keyword) -> bool {
        self.keyword == Some(keyword)
    }

    pub fn has_comments(&self) -> bool {
        self.leading
            .iter()
            .chain(&self.trailing)
            .any(|trivia| trivia.kind.is_comment())
    }
}

/// Significant tokens plus the trivia after the last one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenStream {
    pub tokens: Vec<SqlToken>,
    pub eof_trivia: Vec<Trivia>,
}

impl TokenStream {
    /// Total number of trivia tokens, attached or trailing at end of file
    pub fn trivia_count(&self) -> usize {
        self.tokens
            .iter()
            .map(|token| token.leading.len() + token.trailing.len())
            .sum::<usize>()
            + self.eof_trivia.len()
    }
}

/// Result returned by [`tokenize`]
#[derive(Debug, Clone)]
pub struct LexResult {
    pub stream: TokenStream,
    pub errors: Vec<LexError>,
}

/// Lex `source` and attach trivia
pub fn tokenize(source: &str, dialect: &'static Dialect, params: ParamTypeSet) -> LexResult {
    let mut lexer = Lexer::new(source, dialect, params);
    let raw: Vec<CstToken> = lexer.by_ref().collect();
    let errors = lexer.into_errors();
    tracing::trace!(tokens = raw.len(), errors = errors.len(), "lexed source");
    LexResult {
        stream: attach_trivia(raw),
        errors,
    }
}

/// Lazy raw-token iterator
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    dialect: &'static Dialect,
    params: ParamTypeSet,
    errors: Vec<LexError>,
    line_index: OnceCell<LineIndex<'a>>,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str, dialect: &'static Dialect, params: ParamTypeSet) -> Self {
        Self {
            source,
            pos: 0,
            dialect,
            params,
            errors: Vec::new(),
            line_index: OnceCell::new(),
        }
    }

    /// Errors found so far
    pub fn errors(&self) -> &[LexError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<LexError> {
        self.errors
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.source.get(offset..)?.chars().next()
    }

    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.source.as_bytes().get(offset).copied()
    }

    fn token(&self, kind: SqlSyntaxKind, start: usize, end: usize) -> CstToken {
        CstToken::new(kind, &self.source[start..end], Span::new(start, end))
    }

    fn error(&mut self, kind: LexErrorKind, start: usize, end: usize, unexpected_char: char) {
        let source = self.source;
        let position = self
            .line_index
            .get_or_init(|| LineIndex::new(source))
            .position(start);
        self.errors.push(LexError {
            kind,
            span: Span::new(start, end),
            position,
            unexpected_char,
        });
    }

    fn lex_token(&mut self, start: usize, current: char) -> (SqlSyntaxKind, usize) {
        let next = self.peek(start + current.len_utf8());
        match current {
            '\n' => (SqlSyntaxKind::Newline, start + 1),
            '\r' => {
                let end = if next == Some('\n') { start + 2 } else { start + 1 };
                (SqlSyntaxKind::Newline, end)
            }
            c if c.is_whitespace() => (SqlSyntaxKind::Whitespace, self.scan_whitespace(start)),
            '-' if next == Some('-') => (SqlSyntaxKind::LineComment, self.scan_line_end(start)),
            '#' if self.dialect.hash_comments => {
                (SqlSyntaxKind::LineComment, self.scan_line_end(start))
            }
            '/' if next == Some('*') => self.lex_block_comment(start),
            '\'' => self.lex_string(start, '\'', self.dialect.backslash_escapes),
            'e' | 'E' if next == Some('\'') && self.dialect.escape_string_prefix => {
                self.lex_prefixed_string(start, true)
            }
            'x' | 'X' if next == Some('\'') => self.lex_prefixed_string(start, false),
            '"' if self.dialect.quote_style('"').is_some() => self.lex_quoted_ident(start, '"'),
            '"' if self.dialect.double_quoted_strings => {
                self.lex_string(start, '"', self.dialect.backslash_escapes)
            }
            '`' if self.dialect.quote_style('`').is_some() => self.lex_quoted_ident(start, '`'),
            '[' if self.dialect.quote_style('[').is_some() => self.lex_quoted_ident(start, ']'),
            c if c.is_ascii_digit() => (SqlSyntaxKind::Number, self.scan_number(start)),
            '.' if next.is_some_and(|c| c.is_ascii_digit()) => {
                (SqlSyntaxKind::Number, self.scan_number(start))
            }
            c if is_ident_start(c) => {
                let end = self.scan_word(start);
                (self.dialect.classify_word(&self.source[start..end]), end)
            }
            '?' | '$' | ':' | '@' => self.lex_sigil(start, current),
            _ => self.lex_punct(start, current, next),
        }
    }

    fn scan_whitespace(&self, start: usize) -> usize {
        let rest = &self.source[start..];
        let len = rest
            .find(|c: char| !c.is_whitespace() || c == '\n' || c == '\r')
            .unwrap_or(rest.len());
        start + len
    }

    fn scan_line_end(&self, start: usize) -> usize {
        let rest = &self.source[start..];
        start + rest.find(['\n', '\r']).unwrap_or(rest.len())
    }

    fn scan_word(&self, start: usize) -> usize {
        let rest = &self.source[start..];
        let len = rest
            .find(|c: char| !is_ident_continue(c))
            .unwrap_or(rest.len());
        start + len
    }

    fn scan_digits(&self, mut pos: usize) -> usize {
        while self.peek_byte(pos).is_some_and(|b| b.is_ascii_digit()) {
            pos += 1;
        }
        pos
    }

    fn scan_number(&self, start: usize) -> usize {
        if self.peek_byte(start) == Some(b'0')
            && matches!(self.peek_byte(start + 1), Some(b'x' | b'X'))
            && self.peek_byte(start + 2).is_some_and(|b| b.is_ascii_hexdigit())
        {
            let mut pos = start + 2;
            while self.peek_byte(pos).is_some_and(|b| b.is_ascii_hexdigit()) {
                pos += 1;
            }
            return pos;
        }

        let mut pos = self.scan_digits(start);
        if self.peek_byte(pos) == Some(b'.') {
            pos = self.scan_digits(pos + 1);
        }
        if matches!(self.peek_byte(pos), Some(b'e' | b'E')) {
            let mut exponent = pos + 1;
            if matches!(self.peek_byte(exponent), Some(b'+' | b'-')) {
                exponent += 1;
            }
            if self.peek_byte(exponent).is_some_and(|b| b.is_ascii_digit()) {
                pos = self.scan_digits(exponent);
            }
        }
        pos
    }

    fn lex_block_comment(&mut self, start: usize) -> (SqlSyntaxKind, usize) {
        let bytes = self.source.as_bytes();
        let mut depth = 1usize;
        let mut pos = start + 2;
        while pos < bytes.len() {
            match (bytes[pos], bytes.get(pos + 1)) {
                (b'*', Some(b'/')) => {
                    depth -= 1;
                    pos += 2;
                    if depth == 0 {
                        return (SqlSyntaxKind::BlockComment, pos);
                    }
                }
                (b'/', Some(b'*')) if self.dialect.nested_block_comments => {
                    depth += 1;
                    pos += 2;
                }
                _ => pos += 1,
            }
        }
        self.unterminated(LexErrorKind::UnterminatedBlockComment, start, bytes.len(), '/')
    }

    /// Scan a delimited literal whose opening quote is at `quote_pos`
    ///
    /// Returns the end offset, or `Err(end_of_input)` when unterminated.
    fn lex_delimited(
        &self,
        quote_pos: usize,
        close: char,
        backslash_escapes: bool,
    ) -> Result<usize, usize> {
        let mut chars = self.source[quote_pos + 1..].char_indices().peekable();
        while let Some((offset, c)) = chars.next() {
            if backslash_escapes && c == '\\' {
                chars.next();
                continue;
            }
            if c == close {
                // A doubled closing quote is an escaped quote
                if chars.peek().is_some_and(|(_, next)| *next == close) {
                    chars.next();
                    continue;
                }
                return Ok(quote_pos + 1 + offset + c.len_utf8());
            }
        }
        Err(self.source.len())
    }

    fn lex_string(&mut self, start: usize, quote: char, backslash_escapes: bool) -> (SqlSyntaxKind, usize) {
        match self.lex_delimited(start, quote, backslash_escapes) {
            Ok(end) => (SqlSyntaxKind::String, end),
            Err(end) => self.unterminated(LexErrorKind::UnterminatedString, start, end, quote),
        }
    }

    /// `E'...'` and `X'...'`
    fn lex_prefixed_string(&mut self, start: usize, backslash_escapes: bool) -> (SqlSyntaxKind, usize) {
        match self.lex_delimited(start + 1, '\'', backslash_escapes) {
            Ok(end) => (SqlSyntaxKind::String, end),
            Err(end) => self.unterminated(LexErrorKind::UnterminatedString, start, end, '\''),
        }
    }

    fn lex_quoted_ident(&mut self, start: usize, close: char) -> (SqlSyntaxKind, usize) {
        let open = self.peek(start).unwrap_or(close);
        match self.lex_delimited(start, close, false) {
            Ok(end) => (SqlSyntaxKind::QuotedIdent, end),
            Err(end) => {
                self.unterminated(LexErrorKind::UnterminatedQuotedIdentifier, start, end, open)
            }
        }
    }

    fn unterminated(
        &mut self,
        kind: LexErrorKind,
        start: usize,
        end: usize,
        opening: char,
    ) -> (SqlSyntaxKind, usize) {
        self.error(kind, start, end, opening);
        (SqlSyntaxKind::Error, end)
    }

    /// `?`, `$`, `:` and `@`: placeholders, casts, dollar quotes, or plain punctuation
    fn lex_sigil(&mut self, start: usize, sigil: char) -> (SqlSyntaxKind, usize) {
        if sigil == ':' && self.peek_byte(start + 1) == Some(b':') {
            return (SqlSyntaxKind::ColonColon, start + 2);
        }
        if let Some(end) = self.match_placeholder(start, sigil) {
            return (SqlSyntaxKind::Placeholder, end);
        }
        if sigil == '$'
            && self.dialect.dollar_quoted_strings
            && let Some(result) = self.lex_dollar_quoted(start)
        {
            return result;
        }
        let kind = match sigil {
            '?' => SqlSyntaxKind::Question,
            '$' => SqlSyntaxKind::Dollar,
            ':' => SqlSyntaxKind::Colon,
            _ => SqlSyntaxKind::At,
        };
        (kind, start + 1)
    }

    /// Longest enabled placeholder syntax at `start`; ties go to the dialect's priority order
    fn match_placeholder(&self, start: usize, sigil: char) -> Option<usize> {
        let mut best: Option<(usize, ParamType)> = None;
        for param in self.params.iter().filter(|param| param.sigil() == sigil) {
            let Some(end) = self.placeholder_end(param, start) else {
                continue;
            };
            best = match best {
                Some((best_end, best_param))
                    if end < best_end
                        || (end == best_end
                            && self.dialect.param_priority(best_param)
                                <= self.dialect.param_priority(param)) =>
                {
                    Some((best_end, best_param))
                }
                _ => Some((end, param)),
            };
        }
        best.map(|(end, _)| end)
    }

    fn placeholder_end(&self, param: ParamType, start: usize) -> Option<usize> {
        let body = start + 1;
        match param {
            ParamType::Positional => Some(body),
            ParamType::NumberedQuestion | ParamType::NumberedDollar => {
                let end = self.scan_digits(body);
                (end > body).then_some(end)
            }
            ParamType::NamedColon | ParamType::NamedAt | ParamType::NamedDollar => {
                let first = self.peek(body)?;
                is_ident_start(first).then(|| self.scan_word(body))
            }
        }
    }

    /// `$$ ... $$` or `$tag$ ... $tag$`
    fn lex_dollar_quoted(&mut self, start: usize) -> Option<(SqlSyntaxKind, usize)> {
        let rest = &self.source[start + 1..];
        let tag_len = rest.find('$')?;
        let tag = &rest[..tag_len];
        if let Some(first) = tag.chars().next()
            && (!is_ident_start(first) || !tag.chars().all(|c| is_ident_continue(c) && c != '$'))
        {
            return None;
        }
        let delimiter = &self.source[start..start + tag_len + 2];
        let body_start = start + delimiter.len();
        match self.source[body_start..].find(delimiter) {
            Some(offset) => Some((SqlSyntaxKind::String, body_start + offset + delimiter.len())),
            None => Some(self.unterminated(
                LexErrorKind::UnterminatedString,
                start,
                self.source.len(),
                '$',
            )),
        }
    }

    fn lex_punct(&mut self, start: usize, current: char, next: Option<char>) -> (SqlSyntaxKind, usize) {
        use SqlSyntaxKind as S;

        let two = |kind| (kind, start + 2);
        let one = |kind| (kind, start + 1);
        let regex = self.dialect.supports(GrammarFeature::RegexOperators);
        match (current, next) {
            ('~', Some('*')) if regex => two(S::TildeStar),
            ('!', Some('~')) if regex => match self.peek(start + 2) {
                Some('*') => (S::BangTildeStar, start + 3),
                _ => two(S::BangTilde),
            },
            ('<', Some('=')) => two(S::LtEq),
            ('<', Some('>')) => two(S::LtGt),
            ('>', Some('=')) => two(S::GtEq),
            ('!', Some('=')) => two(S::BangEq),
            ('=', Some('=')) => two(S::EqEq),
            ('|', Some('|')) => two(S::PipePipe),
            ('&', Some('&')) => two(S::AmpAmp),
            (',', _) => one(S::Comma),
            (';', _) => one(S::Semicolon),
            ('.', _) => one(S::Dot),
            ('(', _) => one(S::LParen),
            (')', _) => one(S::RParen),
            ('[', _) => one(S::LBracket),
            (']', _) => one(S::RBracket),
            ('*', _) => one(S::Star),
            ('+', _) => one(S::Plus),
            ('-', _) => one(S::Minus),
            ('/', _) => one(S::Slash),
            ('%', _) => one(S::Percent),
            ('=', _) => one(S::Eq),
            ('<', _) => one(S::Lt),
            ('>', _) => one(S::Gt),
            ('|', _) => one(S::Pipe),
            ('&', _) => one(S::Amp),
            ('^', _) => one(S::Caret),
            ('~', _) => one(S::Tilde),
            ('!', _) => one(S::Bang),
            (other, _) => {
                let end = start + other.len_utf8();
                self.error(LexErrorKind::UnexpectedCharacter, start, end, other);
                (S::Error, end)
            }
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = CstToken;

    fn next(&mut self) -> Option<CstToken> {
        let start = self.pos;
        let current = self.peek(start)?;
        let (kind, end) = self.lex_token(start, current);
        // Every branch consumes at least one character
        let end = end.max(start + current.len_utf8());
        self.pos = end;
        Some(self.token(kind, start, end))
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Index ranges of one significant token and its attached trivia
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct TriviaSlots {
    pub leading: Range<usize>,
    pub token: usize,
    pub trailing: Range<usize>,
}

/// Decide trivia ownership over a flat kind sequence
///
/// A token's trailing trivia is the longest run of same-line whitespace and
/// comments after it that ends in a comment. Everything else before a token
/// leads it. Returns the per-token slots and the end-of-file trivia range.
pub(crate) fn split_trivia(kinds: &[SqlSyntaxKind]) -> (Vec<TriviaSlots>, Range<usize>) {
    let mut slots = Vec::new();
    let mut leading_start = 0;
    let mut index = 0;

    while index < kinds.len() {
        if kinds[index].is_trivia() {
            index += 1;
            continue;
        }

        let token = index;
        let mut trailing_end = token + 1;
        let mut scan = token + 1;
        while let Some(kind) = kinds.get(scan) {
            match kind {
                SqlSyntaxKind::Whitespace => scan += 1,
                SqlSyntaxKind::LineComment | SqlSyntaxKind::BlockComment => {
                    scan += 1;
                    trailing_end = scan;
                }
                _ => break,
            }
        }

        slots.push(TriviaSlots {
            leading: leading_start..token,
            token,
            trailing: token + 1..trailing_end,
        });
        leading_start = trailing_end;
        index = trailing_end;
    }

    (slots, leading_start..kinds.len())
}

/// Group raw tokens into significant tokens with attached trivia
pub fn attach_trivia(raw: Vec<CstToken>) -> TokenStream {
    let kinds: Vec<SqlSyntaxKind> = raw.iter().map(|token| token.kind).collect();
    let (slots, _) = split_trivia(&kinds);

    let mut raw = raw.into_iter();
    let mut tokens = Vec::with_capacity(slots.len());
    for slot in slots {
        let leading: Vec<Trivia> = raw.by_ref().take(slot.leading.len()).collect();
        let Some(token) = raw.next() else {
            break;
        };
        let trailing: Vec<Trivia> = raw.by_ref().take(slot.trailing.len()).collect();
        let keyword = match token.kind {
            SqlSyntaxKind::Keyword | SqlSyntaxKind::Ident => Keyword::from_word(&token.text),
            _ => None,
        };
        tokens.push(SqlToken {
            kind: token.kind,
            text: token.text,
            span: token.span,
            keyword,
            leading,
            trailing,
        });
    }

    TokenStream {
        tokens,
        eof_trivia: raw.collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{BIGQUERY, MYSQL, POSTGRESQL, SQLITE};

    fn raw_kinds(source: &str, dialect: &'static Dialect, params: &[ParamType]) -> Vec<(SqlSyntaxKind, String)> {
        Lexer::new(source, dialect, ParamTypeSet::from_slice(params))
            .map(|token| (token.kind, token.text))
            .collect()
    }

    fn significant(source: &str, dialect: &'static Dialect, params: &[ParamType]) -> Vec<(SqlSyntaxKind, String)> {
        tokenize(source, dialect, ParamTypeSet::from_slice(params))
            .stream
            .tokens
            .into_iter()
            .map(|token| (token.kind, token.text))
            .collect()
    }

    #[test]
    fn test_lossless_reconstruction() {
        let source = "select a, -- first\n  \"b\" /* x */ from t where a = 'it''s';\r\n";
        let text: String = Lexer::new(source, &POSTGRESQL, ParamTypeSet::EMPTY)
            .map(|token| token.text)
            .collect();
        assert_eq!(text, source);
    }

    #[test]
    fn test_keywords_are_dialect_reserved() {
        let tokens = significant("select date from t", &SQLITE, &[]);
        assert_eq!(tokens[0].0, SqlSyntaxKind::Keyword);
        assert_eq!(tokens[1], (SqlSyntaxKind::Ident, "date".to_string()));
        assert_eq!(tokens[2].0, SqlSyntaxKind::Keyword);
    }

    #[test]
    fn test_placeholder_fidelity() {
        let params = [ParamType::Positional, ParamType::NumberedDollar, ParamType::NamedAt];
        let tokens = significant("id = ? AND name = @name OR x = $12", &POSTGRESQL, &params);
        let placeholders: Vec<_> = tokens
            .iter()
            .filter(|(kind, _)| *kind == SqlSyntaxKind::Placeholder)
            .map(|(_, text)| text.as_str())
            .collect();
        assert_eq!(placeholders, vec!["?", "@name", "$12"]);
    }

    #[test]
    fn test_longest_placeholder_wins() {
        let params = [ParamType::Positional, ParamType::NumberedQuestion];
        let tokens = significant("?12", &SQLITE, &params);
        assert_eq!(tokens, vec![(SqlSyntaxKind::Placeholder, "?12".to_string())]);
    }

    #[test]
    fn test_disabled_placeholder_falls_back() {
        let tokens = significant("@name ?", &MYSQL, &[ParamType::Positional]);
        assert_eq!(
            tokens,
            vec![
                (SqlSyntaxKind::At, "@".to_string()),
                (SqlSyntaxKind::Ident, "name".to_string()),
                (SqlSyntaxKind::Placeholder, "?".to_string()),
            ]
        );
    }

    #[test]
    fn test_double_colon_is_not_a_named_placeholder() {
        let tokens = significant("x::int", &POSTGRESQL, &[ParamType::NamedColon]);
        assert_eq!(tokens[1], (SqlSyntaxKind::ColonColon, "::".to_string()));
        assert_eq!(tokens[2], (SqlSyntaxKind::Ident, "int".to_string()));
    }

    #[test]
    fn test_dollar_quoted_strings() {
        let tokens = significant("$$a'b$$ || $fn$x$fn$", &POSTGRESQL, &[ParamType::NumberedDollar]);
        assert_eq!(tokens[0], (SqlSyntaxKind::String, "$$a'b$$".to_string()));
        assert_eq!(tokens[2], (SqlSyntaxKind::String, "$fn$x$fn$".to_string()));
    }

    #[test]
    fn test_quote_styles_per_dialect() {
        assert_eq!(significant("[a b]", &SQLITE, &[])[0].0, SqlSyntaxKind::QuotedIdent);
        assert_eq!(significant("`a`", &MYSQL, &[])[0].0, SqlSyntaxKind::QuotedIdent);
        assert_eq!(significant("\"a\"", &MYSQL, &[])[0].0, SqlSyntaxKind::String);
        assert_eq!(significant("\"a\"", &POSTGRESQL, &[])[0].0, SqlSyntaxKind::QuotedIdent);
        assert_eq!(significant("'a\\'b'", &BIGQUERY, &[]).len(), 1);
    }

    #[test]
    fn test_regex_operators() {
        let kinds: Vec<_> = significant("a ~ b ~* c !~ d !~* e != f", &POSTGRESQL, &[])
            .into_iter()
            .map(|(kind, _)| kind)
            .filter(|kind| kind.is_operator())
            .collect();
        assert_eq!(
            kinds,
            vec![
                SqlSyntaxKind::Tilde,
                SqlSyntaxKind::TildeStar,
                SqlSyntaxKind::BangTilde,
                SqlSyntaxKind::BangTildeStar,
                SqlSyntaxKind::BangEq,
            ]
        );

        let mysql = significant("a !~ b", &MYSQL, &[]);
        assert_eq!(mysql[1].0, SqlSyntaxKind::Bang);
        assert_eq!(mysql[2].0, SqlSyntaxKind::Tilde);
    }

    #[test]
    fn test_hash_comments() {
        let mysql = raw_kinds("# note\nselect", &MYSQL, &[]);
        assert_eq!(mysql[0].0, SqlSyntaxKind::LineComment);

        let result = tokenize("# note", &POSTGRESQL, ParamTypeSet::EMPTY);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].unexpected_char, '#');
    }

    #[test]
    fn test_nested_block_comments() {
        let pg = raw_kinds("/* a /* b */ c */", &POSTGRESQL, &[]);
        assert_eq!(pg.len(), 1);
        assert_eq!(pg[0].0, SqlSyntaxKind::BlockComment);

        let sqlite = raw_kinds("/* a /* b */ c */", &SQLITE, &[]);
        assert_eq!(sqlite[0], (SqlSyntaxKind::BlockComment, "/* a /* b */".to_string()));
    }

    #[test]
    fn test_numbers() {
        let tokens = significant("1 1.5 .5 1e10 2.5E-3 0xFF", &SQLITE, &[]);
        assert!(tokens.iter().all(|(kind, _)| *kind == SqlSyntaxKind::Number));
        assert_eq!(tokens.len(), 6);
    }

    #[test]
    fn test_unterminated_string_is_an_error_token() {
        let result = tokenize("select 'abc", &SQLITE, ParamTypeSet::EMPTY);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, LexErrorKind::UnterminatedString);
        assert_eq!(result.errors[0].span, Span::new(7, 11));
        assert_eq!(result.stream.tokens[1].kind, SqlSyntaxKind::Error);
    }

    #[test]
    fn test_error_position_counts_codepoints() {
        let result = tokenize("select 'é' ¤", &SQLITE, ParamTypeSet::EMPTY);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].position.column, 12);
        assert_eq!(result.errors[0].unexpected_char, '¤');
    }

    #[test]
    fn test_trivia_attachment() {
        let result = tokenize("-- lead\nselect a, -- trail\n  b\n-- eof\n", &SQLITE, ParamTypeSet::EMPTY);
        let tokens = &result.stream.tokens;

        let select = &tokens[0];
        assert_eq!(select.leading.len(), 2);
        assert_eq!(select.leading[0].kind, SqlSyntaxKind::LineComment);

        let comma = &tokens[2];
        assert_eq!(comma.kind, SqlSyntaxKind::Comma);
        assert_eq!(
            comma.trailing.iter().map(|t| t.text.as_str()).collect::<String>(),
            " -- trail"
        );

        let b = &tokens[3];
        assert_eq!(b.leading.iter().map(|t| t.text.as_str()).collect::<String>(), "\n  ");
        assert!(b.trailing.is_empty());

        assert_eq!(
            result.stream.eof_trivia.iter().map(|t| t.text.as_str()).collect::<String>(),
            "\n-- eof\n"
        );
    }

    #[test]
    fn test_trailing_whitespace_without_comment_leads_next_token() {
        let (slots, eof) = split_trivia(&[
            SqlSyntaxKind::Ident,
            SqlSyntaxKind::Whitespace,
            SqlSyntaxKind::Newline,
            SqlSyntaxKind::Ident,
        ]);
        assert_eq!(slots[0].trailing, 1..1);
        assert_eq!(slots[1].leading, 1..3);
        assert_eq!(eof, 4..4);
    }
}
