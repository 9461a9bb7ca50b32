//! Layout IR between the formatter and the printer
//!
//! The formatter lowers a statement into a tree of [`FormatElement`]s and the
//! [`Printer`](super::printer::Printer) picks line breaks for it. Text comes
//! in two flavours:
//! - [`FormatElement::Token`]: ASCII the formatter inserts itself (`,`, `(`,
//!   `AS`, `CROSS JOIN`)
//! - [`FormatElement::Text`]: anything copied out of the source, with the
//!   offset it came from
//!
//! Hard breaks always end the line. Soft breaks end it only when the
//! enclosing [`group`] does not fit in the remaining width, and
//! [`empty_line`] asks for one blank line.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqlfmt_core::cst::format_element::{dedent, group, indent, soft_line_break, text, token};
//! use rowan::TextSize;
//!
//! // SELECT a, b  /  SELECT\n  a,\n  b
//! let select_list = group(vec![
//!     text("SELECT", TextSize::from(0)),
//!     indent(),
//!     soft_line_break(),
//!     text("a", TextSize::from(7)),
//!     token(","),
//!     soft_line_break(),
//!     text("b", TextSize::from(10)),
//!     dedent(),
//! ]);
//! ```

use rowan::TextSize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatElement {
    /// Inserted text; ASCII without line breaks
    Token(&'static str),

    /// Source text: keywords, identifiers, literals, comments
    ///
    /// Block comments and string literals may span lines.
    Text {
        text: Box<str>,
        source_position: TextSize,
    },

    HardLineBreak,

    /// A space in a flat group, a line break in a broken one
    SoftLineBreak,

    /// Nothing in a flat group, a line break in a broken one
    SoftLineBreakOrEmpty,

    /// Line break followed by exactly one blank line
    EmptyLine,

    /// One space, never printed at the start of a line
    Space,

    Indent,
    Dedent,

    /// Trailing `--` comment, written just before the next line break
    ///
    /// A group can still print flat around one as long as nothing but line
    /// breaks follows it inside the group.
    LineSuffix(Box<str>),

    /// Inserted text that only appears when the enclosing group breaks
    IfBreak(&'static str),

    /// Laid out on one line if it fits, broken otherwise
    Group(Vec<FormatElement>),
}

impl FormatElement {
    /// Whether printing this element can never produce a character
    pub fn is_empty(&self) -> bool {
        match self {
            FormatElement::Token(s) | FormatElement::IfBreak(s) => s.is_empty(),
            FormatElement::Text { text, .. } | FormatElement::LineSuffix(text) => text.is_empty(),
            FormatElement::Indent | FormatElement::Dedent => true,
            FormatElement::Group(children) => children.iter().all(FormatElement::is_empty),
            FormatElement::Space
            | FormatElement::HardLineBreak
            | FormatElement::SoftLineBreak
            | FormatElement::SoftLineBreakOrEmpty
            | FormatElement::EmptyLine => false,
        }
    }
}

/// Everything printed flat; used in tests and trace output
impl fmt::Display for FormatElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatElement::Token(s) => f.write_str(s),
            FormatElement::Text { text, .. } => f.write_str(text),
            FormatElement::LineSuffix(text) => write!(f, " {text}"),
            FormatElement::HardLineBreak => f.write_str("\n"),
            FormatElement::EmptyLine => f.write_str("\n\n"),
            FormatElement::SoftLineBreak | FormatElement::Space => f.write_str(" "),
            FormatElement::SoftLineBreakOrEmpty
            | FormatElement::IfBreak(_)
            | FormatElement::Indent
            | FormatElement::Dedent => Ok(()),
            FormatElement::Group(children) => {
                children.iter().try_for_each(|child| write!(f, "{child}"))
            }
        }
    }
}

/// Inserted punctuation or keyword text
///
/// Debug builds panic on non-ASCII text or embedded line breaks; layout
/// belongs in break elements.
pub fn token(text: &'static str) -> FormatElement {
    debug_assert!(text.is_ascii(), "inserted text must be ASCII: {text:?}");
    debug_assert!(
        !text.contains(['\n', '\r', '\t']),
        "inserted text must not contain line breaks or tabs: {text:?}"
    );
    FormatElement::Token(text)
}

/// Text taken from the source at `position`
pub fn text(text: &str, position: TextSize) -> FormatElement {
    FormatElement::Text {
        text: text.into(),
        source_position: position,
    }
}

pub fn hard_line_break() -> FormatElement {
    FormatElement::HardLineBreak
}

pub fn soft_line_break() -> FormatElement {
    FormatElement::SoftLineBreak
}

pub fn soft_line_break_or_empty() -> FormatElement {
    FormatElement::SoftLineBreakOrEmpty
}

pub fn empty_line() -> FormatElement {
    FormatElement::EmptyLine
}

pub fn space() -> FormatElement {
    FormatElement::Space
}

pub fn indent() -> FormatElement {
    FormatElement::Indent
}

pub fn dedent() -> FormatElement {
    FormatElement::Dedent
}

pub fn line_suffix(text: &str) -> FormatElement {
    FormatElement::LineSuffix(text.into())
}

pub fn if_break(text: &'static str) -> FormatElement {
    debug_assert!(text.is_ascii(), "inserted text must be ASCII: {text:?}");
    FormatElement::IfBreak(text)
}

pub fn group(elements: Vec<FormatElement>) -> FormatElement {
    FormatElement::Group(elements)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_text_keeps_its_offset() {
        assert_eq!(
            text("users", TextSize::from(14)),
            FormatElement::Text {
                text: "users".into(),
                source_position: TextSize::from(14),
            }
        );
        assert_eq!(token("AS"), FormatElement::Token("AS"));
    }

    #[test]
    #[should_panic(expected = "must be ASCII")]
    fn test_inserted_text_is_ascii() {
        token("séléct");
    }

    #[test]
    #[should_panic(expected = "must not contain line breaks")]
    fn test_inserted_text_has_no_breaks() {
        token("a\nb");
    }

    #[test]
    fn test_empty_elements() {
        assert!(group(vec![indent(), dedent(), if_break("")]).is_empty());
        assert!(!group(vec![token("(")]).is_empty());
        assert!(!soft_line_break().is_empty());
    }

    #[test]
    fn test_display_is_flat() {
        let doc = group(vec![
            token("SELECT"),
            indent(),
            soft_line_break(),
            text("a", TextSize::from(7)),
            if_break(","),
            dedent(),
            line_suffix("-- note"),
        ]);
        assert_eq!(doc.to_string(), "SELECT a -- note");
    }
}
