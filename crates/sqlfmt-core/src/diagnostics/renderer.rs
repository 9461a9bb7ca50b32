//! Diagnostic renderer with code frames

use super::{Diagnostic, LineIndex, Severity};
use crate::console::{Color, Console};

/// Output format for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable text with colors and a code frame
    Text,
    /// JSON array for programmatic consumption
    Json,
}

/// Renders diagnostics against the in-memory source they were produced from
pub struct DiagnosticRenderer {
    console: Console,
    output_format: OutputFormat,
}

impl DiagnosticRenderer {
    /// Text renderer with automatic terminal detection
    pub fn new() -> Self {
        Self {
            console: Console::new(),
            output_format: OutputFormat::Text,
        }
    }

    /// Text renderer with colors disabled
    pub fn no_colors() -> Self {
        Self {
            console: Console::no_colors(),
            output_format: OutputFormat::Text,
        }
    }

    pub fn with_format(format: OutputFormat) -> Self {
        let console = match format {
            OutputFormat::Json => Console::no_colors(),
            OutputFormat::Text => Console::new(),
        };
        Self {
            console,
            output_format: format,
        }
    }

    /// Render all diagnostics for one file
    pub fn render_all(&self, diagnostics: &[Diagnostic], source: &str, file: &str) -> String {
        match self.output_format {
            OutputFormat::Json => serde_json::to_string_pretty(diagnostics)
                .unwrap_or_else(|e| format!("{{\"error\": \"Failed to serialize: {e}\"}}")),
            OutputFormat::Text => diagnostics
                .iter()
                .map(|diagnostic| self.render_text(diagnostic, source, file))
                .collect::<Vec<_>>()
                .join("\n"),
        }
    }

    fn render_text(&self, diagnostic: &Diagnostic, source: &str, file: &str) -> String {
        let mut output = self.render_header(diagnostic);
        output.push('\n');
        match self.render_code_frame(diagnostic, source, file) {
            Some(frame) => output.push_str(&frame),
            None => {
                output.push_str(&format!("  --> {}:{}\n", file, diagnostic.position));
            }
        }
        output
    }

    fn render_header(&self, diagnostic: &Diagnostic) -> String {
        let severity_color = severity_color(diagnostic.severity);
        let severity_text = self
            .console
            .colorize(&diagnostic.severity.to_string(), severity_color);
        let code = self
            .console
            .colorize(&format!("[{}]", diagnostic.code), Color::Dim);

        format!(
            "{}{}: {}",
            severity_text,
            code,
            self.console.colorize(&diagnostic.message, Color::Bold)
        )
    }

    /// Code frame showing the offending line with one line of context
    fn render_code_frame(&self, diagnostic: &Diagnostic, source: &str, file: &str) -> Option<String> {
        let index = LineIndex::new(source);
        let error_line = diagnostic.position.line;
        let error_col = diagnostic.position.column as usize;
        let line_text = index.line_text(error_line)?;

        let start_line = error_line.saturating_sub(1).max(1);
        let end_line = (error_line + 1).min(index.line_count() as u32);
        let gutter_width = end_line.to_string().len();
        let highlight = severity_color(diagnostic.severity);

        let mut frame = String::new();
        frame.push_str(&format!(
            "  {}─[{}:{}]\n",
            self.console.colorize("┌", Color::Blue),
            file,
            diagnostic.position
        ));

        for line_number in start_line..=end_line {
            let Some(content) = index.line_text(line_number) else {
                continue;
            };
            let is_error_line = line_number == error_line;
            frame.push_str(if is_error_line { "> " } else { "  " });
            frame.push_str(
                &self
                    .console
                    .colorize(&format!("{line_number:>gutter_width$}"), Color::Dim),
            );
            frame.push_str(&self.console.colorize(" │ ", Color::Dim));
            frame.push_str(content);
            frame.push('\n');

            if is_error_line {
                // Caret count in columns, clipped to the end of the line
                let remaining = line_text.chars().count().saturating_sub(error_col - 1);
                let span_chars = source
                    .get(diagnostic.span.range())
                    .map(|text| text.chars().take_while(|c| *c != '\n').count())
                    .unwrap_or(1);
                let carets = "^".repeat(span_chars.min(remaining).max(1));

                frame.push_str("  ");
                frame.push_str(&" ".repeat(gutter_width));
                frame.push_str(&self.console.colorize(" │ ", Color::Dim));
                frame.push_str(&" ".repeat(error_col.saturating_sub(1)));
                frame.push_str(&self.console.colorize(&carets, highlight));
                frame.push('\n');
            }
        }

        Some(frame)
    }
}

impl Default for DiagnosticRenderer {
    fn default() -> Self {
        Self::new()
    }
}

fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Error => Color::Red,
        Severity::Warning => Color::Yellow,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{Position, Span};

    fn diagnostic() -> Diagnostic {
        Diagnostic::error(
            "parse",
            "expected one of `SELECT`, `WITH` but found `SELEC`",
            Span::new(0, 5),
            Position { line: 1, column: 1 },
        )
    }

    #[test]
    fn test_text_frame_points_at_span() {
        let renderer = DiagnosticRenderer::no_colors();
        let output = renderer.render_all(&[diagnostic()], "SELEC * FROM t\n", "query.sql");

        assert!(output.starts_with("error[parse]: expected one of"));
        assert!(output.contains("query.sql:1:1"));
        assert!(output.contains("> 1 │ SELEC * FROM t"));
        assert!(output.contains(" │ ^^^^^\n"));
    }

    #[test]
    fn test_json_output() {
        let renderer = DiagnosticRenderer::with_format(OutputFormat::Json);
        let output = renderer.render_all(&[diagnostic()], "SELEC * FROM t", "query.sql");
        let value: serde_json::Value = serde_json::from_str(&output).expect("valid json");

        assert_eq!(value[0]["code"], "parse");
        assert_eq!(value[0]["span"]["end"], 5);
        assert_eq!(value[0]["position"]["line"], 1);
        assert_eq!(value[0]["severity"], "error");
    }
}
