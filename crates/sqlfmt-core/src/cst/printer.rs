//! Printer for converting FormatElement IR to formatted strings
//!
//! Groups are laid out greedily: when the printer reaches a [`Group`] in
//! broken mode it measures whether the group, followed by whatever comes
//! after it up to the next possible line break, fits in the remaining width.
//! If so the whole group prints flat; otherwise its soft breaks become
//! newlines and its nested groups get the same choice.
//!
//! Line breaks are requested rather than written. Requests collapse, so a
//! break at the start of a line is a no-op and [`EmptyLine`] never produces
//! more than one blank line. Indentation is written lazily before the first
//! content of a line, and spaces are trimmed off the end of every line.
//!
//! A [`LineSuffix`] (a trailing `--` comment) is written at the end of its
//! line. Only break-only text may follow it on that line; any other content
//! starts a new line first, so the comment stays next to the token it
//! trails.
//!
//! [`Group`]: FormatElement::Group
//! [`EmptyLine`]: FormatElement::EmptyLine
//! [`LineSuffix`]: FormatElement::LineSuffix

use super::format_element::FormatElement;
use crate::style::StylePolicy;
use unicode_width::UnicodeWidthChar;

/// Printer configuration
#[derive(Debug, Clone)]
pub struct PrinterOptions {
    /// Maximum line width before wrapping
    pub line_width: usize,

    /// Number of spaces per indentation level
    pub indent_size: usize,

    /// Whether to use tabs for indentation
    pub use_tabs: bool,

    /// Tab width for width calculations
    pub tab_width: u32,
}

impl Default for PrinterOptions {
    fn default() -> Self {
        Self {
            line_width: 80,
            indent_size: 2,
            use_tabs: false,
            tab_width: 2,
        }
    }
}

impl From<&StylePolicy> for PrinterOptions {
    fn from(policy: &StylePolicy) -> Self {
        Self {
            line_width: policy.print_width,
            indent_size: policy.tab_width,
            use_tabs: policy.use_tabs,
            tab_width: policy.tab_width as u32,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Flat,
    Break,
}

/// Width-aware printer
///
/// - Fast path: bulk string operations for `Token` elements
/// - Slow path: Unicode-aware width tracking for `Text` elements
pub struct Printer {
    options: PrinterOptions,
    buffer: String,
    current_line_width: u32,
    indent_level: usize,
    /// Newlines requested but not yet written
    pending_newlines: usize,
    /// Nothing but (unwritten) indentation on the current line so far
    at_line_start: bool,
    line_suffixes: Vec<Box<str>>,
}

impl Printer {
    /// Create a new printer with the given options
    pub fn new(options: PrinterOptions) -> Self {
        Self {
            options,
            buffer: String::with_capacity(4096),
            current_line_width: 0,
            indent_level: 0,
            pending_newlines: 0,
            at_line_start: true,
            line_suffixes: Vec::new(),
        }
    }

    /// Print a sequence of format elements to a string
    pub fn print(&mut self, elements: &[FormatElement]) -> String {
        let mut commands: Vec<(Mode, &FormatElement)> =
            elements.iter().rev().map(|e| (Mode::Break, e)).collect();

        while let Some((mode, element)) = commands.pop() {
            match element {
                FormatElement::Token(token) => self.write_token(token),
                FormatElement::Text { text, .. } => self.write_text(text),
                FormatElement::Space => self.write_space(),
                FormatElement::HardLineBreak => self.request_newlines(1),
                FormatElement::EmptyLine => self.request_newlines(2),
                FormatElement::SoftLineBreak => match mode {
                    Mode::Flat => self.write_space(),
                    Mode::Break => self.request_newlines(1),
                },
                FormatElement::SoftLineBreakOrEmpty => {
                    if mode == Mode::Break {
                        self.request_newlines(1);
                    }
                }
                FormatElement::Indent => self.indent_level += 1,
                FormatElement::Dedent => self.indent_level = self.indent_level.saturating_sub(1),
                FormatElement::LineSuffix(text) => self.line_suffixes.push(text.clone()),
                FormatElement::IfBreak(text) => {
                    if mode == Mode::Break {
                        self.start_content();
                        self.buffer.push_str(text);
                        self.current_line_width += text.len() as u32;
                    }
                }
                FormatElement::Group(children) => {
                    let child_mode = match mode {
                        Mode::Flat => Mode::Flat,
                        Mode::Break => {
                            let remaining = self.options.line_width as isize
                                - self.next_content_column() as isize;
                            if fits(children, &commands, remaining) {
                                Mode::Flat
                            } else {
                                Mode::Break
                            }
                        }
                    };
                    commands.extend(children.iter().rev().map(|e| (child_mode, e)));
                }
            }
        }

        self.flush_line_suffixes();
        if self.pending_newlines > 0 {
            self.trim_trailing_spaces();
            self.buffer.push('\n');
        }
        self.pending_newlines = 0;
        std::mem::take(&mut self.buffer)
    }

    /// Column the next piece of content lands on
    fn next_content_column(&self) -> u32 {
        if self.pending_newlines > 0 || self.at_line_start {
            self.indent_width()
        } else {
            self.current_line_width
        }
    }

    fn indent_width(&self) -> u32 {
        if self.options.use_tabs {
            self.indent_level as u32 * self.options.tab_width
        } else {
            (self.indent_level * self.options.indent_size) as u32
        }
    }

    fn request_newlines(&mut self, count: usize) {
        self.flush_line_suffixes();
        self.pending_newlines = self.pending_newlines.max(count);
    }

    fn flush_line_suffixes(&mut self) {
        if self.line_suffixes.is_empty() {
            return;
        }
        for suffix in std::mem::take(&mut self.line_suffixes) {
            self.trim_trailing_spaces();
            if !self.at_line_start {
                self.buffer.push(' ');
                self.current_line_width += 1;
            }
            self.write_raw(&suffix);
        }
    }

    /// Write requested newlines and indentation before content
    fn start_content(&mut self) {
        if self.pending_newlines > 0 {
            self.trim_trailing_spaces();
            if !self.buffer.is_empty() {
                let written = self.buffer.chars().rev().take_while(|c| *c == '\n').count();
                for _ in written..self.pending_newlines {
                    self.buffer.push('\n');
                }
            }
            self.pending_newlines = 0;
            self.current_line_width = 0;
            self.at_line_start = true;
        }
        if self.at_line_start {
            self.write_indent();
            self.at_line_start = false;
        }
    }

    /// End the line first if a line suffix is waiting
    fn end_suffixed_line(&mut self) {
        if !self.line_suffixes.is_empty() {
            self.request_newlines(1);
        }
    }

    fn write_token(&mut self, token: &str) {
        self.end_suffixed_line();
        self.start_content();
        // FAST PATH: static ASCII text
        self.buffer.push_str(token);
        self.current_line_width += token.len() as u32;
    }

    fn write_text(&mut self, text: &str) {
        self.end_suffixed_line();
        self.start_content();
        self.write_raw(text);
    }

    /// SLOW PATH: Unicode-aware width tracking, text may span lines
    fn write_raw(&mut self, text: &str) {
        for c in text.chars() {
            let width = match c {
                '\t' => self.options.tab_width,
                '\n' => {
                    self.buffer.push('\n');
                    self.current_line_width = 0;
                    continue;
                }
                c => c.width().unwrap_or(0) as u32,
            };
            self.buffer.push(c);
            self.current_line_width += width;
        }
    }

    fn write_space(&mut self) {
        if self.pending_newlines > 0
            || self.at_line_start
            || !self.line_suffixes.is_empty()
            || self.buffer.ends_with(' ')
        {
            return;
        }
        self.buffer.push(' ');
        self.current_line_width += 1;
    }

    fn trim_trailing_spaces(&mut self) {
        while let Some(c) = self.buffer.pop() {
            match c {
                ' ' => self.current_line_width = self.current_line_width.saturating_sub(1),
                '\t' => {
                    self.current_line_width =
                        self.current_line_width.saturating_sub(self.options.tab_width)
                }
                other => {
                    self.buffer.push(other);
                    break;
                }
            }
        }
    }

    /// Write indentation at the current level
    fn write_indent(&mut self) {
        if self.options.use_tabs {
            for _ in 0..self.indent_level {
                self.buffer.push('\t');
            }
        } else {
            let spaces = self.indent_level * self.options.indent_size;
            self.buffer.extend(std::iter::repeat_n(' ', spaces));
        }
        self.current_line_width = self.indent_width();
    }
}

/// Whether `group` printed flat, followed by the pending `rest` up to the
/// next line break, stays within `remaining` columns
///
/// A line suffix inside the group only fits if nothing but breaks follows
/// it in the group; once the measurement reaches a suffix in `rest` the line
/// is known to end there.
fn fits(group: &[FormatElement], rest: &[(Mode, &FormatElement)], remaining: isize) -> bool {
    let mut measure = Measure {
        remaining,
        suffix_seen: false,
    };

    let mut stack: Vec<(Mode, &FormatElement)> =
        group.iter().rev().map(|e| (Mode::Flat, e)).collect();
    while let Some((mode, element)) = stack.pop() {
        match measure.step(mode, element, &mut stack, false) {
            Step::Continue => {}
            Step::Fits => return true,
            Step::DoesNotFit => return false,
        }
    }
    if measure.suffix_seen {
        return true;
    }

    for (mode, element) in rest.iter().rev() {
        let mut nested = Vec::new();
        match measure.step(*mode, element, &mut nested, true) {
            Step::Continue => {}
            Step::Fits => return true,
            Step::DoesNotFit => return false,
        }
        while let Some((mode, element)) = nested.pop() {
            match measure.step(mode, element, &mut nested, true) {
                Step::Continue => {}
                Step::Fits => return true,
                Step::DoesNotFit => return false,
            }
        }
    }
    true
}

enum Step {
    Continue,
    Fits,
    DoesNotFit,
}

struct Measure {
    remaining: isize,
    suffix_seen: bool,
}

impl Measure {
    fn step<'e>(
        &mut self,
        mode: Mode,
        element: &'e FormatElement,
        stack: &mut Vec<(Mode, &'e FormatElement)>,
        in_rest: bool,
    ) -> Step {
        let width = match element {
            FormatElement::Token(token) => token.len() as isize,
            FormatElement::Text { text, .. } => match text.split_once('\n') {
                Some((first_line, _)) => {
                    if mode == Mode::Flat || self.suffix_seen {
                        return Step::DoesNotFit;
                    }
                    return self.verdict(text_width(first_line));
                }
                None => text_width(text),
            },
            FormatElement::Space => 1,
            FormatElement::SoftLineBreak => match mode {
                Mode::Flat => 1,
                Mode::Break => return Step::Fits,
            },
            FormatElement::SoftLineBreakOrEmpty => match mode {
                Mode::Flat => 0,
                Mode::Break => return Step::Fits,
            },
            FormatElement::HardLineBreak | FormatElement::EmptyLine => {
                return match mode {
                    Mode::Flat => Step::DoesNotFit,
                    Mode::Break => Step::Fits,
                };
            }
            FormatElement::LineSuffix(_) => {
                if in_rest {
                    return Step::Fits;
                }
                self.suffix_seen = true;
                return Step::Continue;
            }
            FormatElement::IfBreak(text) => match mode {
                Mode::Flat => 0,
                Mode::Break => text.len() as isize,
            },
            FormatElement::Indent | FormatElement::Dedent => 0,
            FormatElement::Group(children) => {
                // Undecided groups after the measured one break at their first soft break
                let group_mode = if in_rest { mode } else { Mode::Flat };
                stack.extend(children.iter().rev().map(|e| (group_mode, e)));
                return Step::Continue;
            }
        };

        if width > 0 && self.suffix_seen && !matches!(element, FormatElement::IfBreak(_)) {
            return Step::DoesNotFit;
        }
        self.remaining -= width;
        if self.remaining < 0 {
            Step::DoesNotFit
        } else {
            Step::Continue
        }
    }

    fn verdict(&self, width: isize) -> Step {
        if self.remaining >= width {
            Step::Fits
        } else {
            Step::DoesNotFit
        }
    }
}

fn text_width(text: &str) -> isize {
    text.chars().map(|c| c.width().unwrap_or(0) as isize).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cst::format_element::*;
    use rowan::TextSize;

    fn t(s: &str) -> FormatElement {
        text(s, TextSize::from(0))
    }

    fn print_with_width(elements: &[FormatElement], line_width: usize) -> String {
        let mut printer = Printer::new(PrinterOptions {
            line_width,
            ..PrinterOptions::default()
        });
        printer.print(elements)
    }

    fn select_list() -> FormatElement {
        group(vec![
            token("SELECT"),
            indent(),
            soft_line_break(),
            t("alpha"),
            token(","),
            soft_line_break(),
            t("beta"),
            if_break(","),
            dedent(),
        ])
    }

    #[test]
    fn test_print_tokens() {
        let elements = vec![token("SELECT"), space(), t("a"), hard_line_break()];
        assert_eq!(print_with_width(&elements, 80), "SELECT a\n");
    }

    #[test]
    fn test_group_fits_flat() {
        assert_eq!(print_with_width(&[select_list()], 80), "SELECT alpha, beta");
    }

    #[test]
    fn test_group_breaks_when_too_wide() {
        assert_eq!(
            print_with_width(&[select_list()], 10),
            "SELECT\n  alpha,\n  beta,"
        );
    }

    #[test]
    fn test_exact_width_fits() {
        // "SELECT alpha, beta" is 18 columns
        assert_eq!(print_with_width(&[select_list()], 18), "SELECT alpha, beta");
        assert!(print_with_width(&[select_list()], 17).contains('\n'));
    }

    #[test]
    fn test_rest_counts_towards_fit() {
        let elements = vec![select_list(), token(";")];
        assert!(print_with_width(&elements, 18).starts_with("SELECT\n"));
        assert_eq!(print_with_width(&elements, 19), "SELECT alpha, beta;");
    }

    #[test]
    fn test_hard_break_forces_group_to_break() {
        let elements = vec![group(vec![
            t("a"),
            soft_line_break(),
            t("-- note"),
            hard_line_break(),
            t("b"),
        ])];
        assert_eq!(print_with_width(&elements, 80), "a\n-- note\nb");
    }

    #[test]
    fn test_line_suffix_flushes_before_newline() {
        let elements = vec![
            group(vec![t("a"), token(","), line_suffix("-- c"), soft_line_break(), t("b")]),
            hard_line_break(),
        ];
        assert_eq!(print_with_width(&elements, 80), "a, -- c\nb\n");
    }

    #[test]
    fn test_line_suffix_at_group_end_stays_flat() {
        let elements = vec![
            group(vec![token("SELECT"), space(), t("1"), token(";"), line_suffix("-- c")]),
            hard_line_break(),
        ];
        assert_eq!(print_with_width(&elements, 80), "SELECT 1; -- c\n");
    }

    #[test]
    fn test_content_after_line_suffix_starts_new_line() {
        let elements = vec![t("x"), line_suffix("-- c"), space(), token("+"), space(), t("1")];
        assert_eq!(print_with_width(&elements, 80), "x -- c\n+ 1");
    }

    #[test]
    fn test_break_only_text_stays_before_line_suffix() {
        let elements = vec![group(vec![
            t("a"),
            token(","),
            soft_line_break(),
            t("b"),
            line_suffix("-- c"),
            if_break(","),
            soft_line_break_or_empty(),
        ])];
        assert_eq!(print_with_width(&elements, 3), "a,\nb, -- c\n");
    }

    #[test]
    fn test_breaks_collapse() {
        let elements = vec![
            t("a"),
            hard_line_break(),
            hard_line_break(),
            empty_line(),
            empty_line(),
            t("b"),
        ];
        assert_eq!(print_with_width(&elements, 80), "a\n\nb");
    }

    #[test]
    fn test_leading_breaks_are_dropped() {
        let elements = vec![empty_line(), t("a")];
        assert_eq!(print_with_width(&elements, 80), "a");
    }

    #[test]
    fn test_trailing_spaces_trimmed() {
        let elements = vec![t("a"), space(), hard_line_break(), t("b")];
        assert_eq!(print_with_width(&elements, 80), "a\nb");
    }

    #[test]
    fn test_nested_groups_choose_independently() {
        let inner = group(vec![token("("), t("x"), token(","), soft_line_break(), t("y"), token(")")]);
        let outer = group(vec![
            t("f"),
            indent(),
            soft_line_break(),
            inner,
            soft_line_break(),
            t("long_enough_to_break"),
            dedent(),
        ]);
        assert_eq!(
            print_with_width(&[outer], 20),
            "f\n  (x, y)\n  long_enough_to_break"
        );
    }

    #[test]
    fn test_tab_indentation() {
        let mut printer = Printer::new(PrinterOptions {
            line_width: 4,
            use_tabs: true,
            ..PrinterOptions::default()
        });
        assert_eq!(printer.print(&[select_list()]), "SELECT\n\talpha,\n\tbeta,");
    }

    #[test]
    fn test_multiline_text_keeps_its_lines() {
        let elements = vec![t("/* a\n   b */"), hard_line_break()];
        assert_eq!(print_with_width(&elements, 80), "/* a\n   b */\n");
    }

    #[test]
    fn test_wide_characters_count_double() {
        let elements = [group(vec![t("名前"), soft_line_break(), t("ab")])];
        assert_eq!(print_with_width(&elements, 7), "名前 ab");
        assert_eq!(print_with_width(&elements, 6), "名前\nab");
    }
}
