//! Output formatting and reporting
//!
//! Human output goes to stderr, except formatted SQL and diffs which go to
//! stdout. JSON output is a single report object on stdout.

use colored::*;
use serde::Serialize;
use similar::TextDiff;
use sqlfmt_core::{Diagnostic, DiagnosticRenderer, OutputFormat as CoreOutputFormat};
use std::io::Write;

use crate::OutputFormat;

/// What happened to one input
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Unchanged,
    Changed,
    Written,
    Failed,
}

/// Per-input result
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub path: String,
    pub status: FileStatus,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
    /// Round-trip problems found by `--verify`
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub formatted: Option<String>,
}

impl FileReport {
    pub fn new(path: impl Into<String>, status: FileStatus) -> Self {
        Self {
            path: path.into(),
            status,
            diagnostics: Vec::new(),
            issues: Vec::new(),
            formatted: None,
        }
    }

    pub fn is_failure(&self) -> bool {
        self.status == FileStatus::Failed || !self.issues.is_empty()
    }
}

/// Summary statistics for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FormatSummary {
    pub files_checked: usize,
    pub unchanged: usize,
    pub changed: usize,
    pub written: usize,
    pub failed: usize,
    pub unverified: usize,
}

impl FormatSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut summary = Self {
            files_checked: reports.len(),
            ..Self::default()
        };
        for report in reports {
            match report.status {
                FileStatus::Unchanged => summary.unchanged += 1,
                FileStatus::Changed => summary.changed += 1,
                FileStatus::Written => summary.written += 1,
                FileStatus::Failed => summary.failed += 1,
            }
            if !report.issues.is_empty() {
                summary.unverified += 1;
            }
        }
        summary
    }

    pub fn has_failures(&self) -> bool {
        self.failed > 0 || self.unverified > 0
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    files: &'a [FileReport],
    summary: &'a FormatSummary,
}

/// Output formatter for the selected format
pub struct OutputFormatter {
    format: OutputFormat,
    use_colors: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, use_colors: bool) -> Self {
        Self { format, use_colors }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }

    /// Render syntax or configuration errors against their source
    pub fn render_diagnostics(&self, diagnostics: &[Diagnostic], source: &str, file: &str) -> String {
        let renderer = match self.format {
            OutputFormat::Json => DiagnosticRenderer::with_format(CoreOutputFormat::Json),
            OutputFormat::Human if self.use_colors => DiagnosticRenderer::new(),
            OutputFormat::Human => DiagnosticRenderer::no_colors(),
        };
        renderer.render_all(diagnostics, source, file)
    }

    /// Unified diff between the original and formatted text
    pub fn render_diff(&self, file: &str, original: &str, formatted: &str) -> String {
        let diff = TextDiff::from_lines(original, formatted);
        let unified = diff
            .unified_diff()
            .context_radius(3)
            .header(&format!("{file} (original)"), &format!("{file} (formatted)"))
            .to_string();

        if !self.use_colors {
            return unified;
        }
        let mut output = String::with_capacity(unified.len());
        for line in unified.split_inclusive('\n') {
            let colored_line = if line.starts_with("+++") || line.starts_with("---") {
                line.bold().to_string()
            } else if line.starts_with('+') {
                line.green().to_string()
            } else if line.starts_with('-') {
                line.red().to_string()
            } else if line.starts_with("@@") {
                line.cyan().to_string()
            } else {
                line.to_string()
            };
            output.push_str(&colored_line);
        }
        output
    }

    /// Print the final report
    pub fn print_results(
        &self,
        reports: &[FileReport],
        summary: &FormatSummary,
        check: bool,
    ) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Human => {
                self.print_human_format(reports, summary, check);
                Ok(())
            }
            OutputFormat::Json => {
                let report = JsonReport {
                    files: reports,
                    summary,
                };
                let mut stdout = std::io::stdout().lock();
                serde_json::to_writer_pretty(&mut stdout, &report)?;
                writeln!(stdout)?;
                Ok(())
            }
        }
    }

    fn print_human_format(&self, reports: &[FileReport], summary: &FormatSummary, check: bool) {
        for report in reports {
            for issue in &report.issues {
                eprintln!("{} {}: {}", "unverified".yellow().bold(), report.path, issue);
            }
            if check && report.status == FileStatus::Changed {
                eprintln!("{} {}", "Would reformat:".yellow(), report.path);
            }
        }

        eprintln!("\n{}", "Summary:".bold());
        eprintln!("  Files checked: {}", summary.files_checked);
        if summary.written > 0 {
            eprintln!("  Formatted: {}", summary.written.to_string().green());
        }
        if summary.changed > 0 {
            let label = if check { "Need formatting" } else { "Would change" };
            eprintln!("  {}: {}", label, summary.changed.to_string().yellow());
        }
        if summary.unchanged > 0 {
            eprintln!("  Already formatted: {}", summary.unchanged);
        }
        if summary.failed > 0 {
            eprintln!("  Failed: {}", summary.failed.to_string().red());
        }
        if summary.unverified > 0 {
            eprintln!("  Failed verification: {}", summary.unverified.to_string().red());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_counts() {
        let mut verified = FileReport::new("c.sql", FileStatus::Unchanged);
        verified.issues.push("formatting the output again changes it".into());
        let reports = vec![
            FileReport::new("a.sql", FileStatus::Changed),
            FileReport::new("b.sql", FileStatus::Failed),
            verified,
        ];
        let summary = FormatSummary::from_reports(&reports);
        assert_eq!(summary.files_checked, 3);
        assert_eq!(summary.changed, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.unverified, 1);
        assert!(summary.has_failures());
        assert!(reports[2].is_failure());
    }

    #[test]
    fn test_plain_diff() {
        let output = OutputFormatter::new(OutputFormat::Human, false);
        let diff = output.render_diff("q.sql", "select 1\n", "SELECT 1\n");
        assert!(diff.contains("--- q.sql (original)"));
        assert!(diff.contains("-select 1"));
        assert!(diff.contains("+SELECT 1"));
    }

    #[test]
    fn test_report_serialization_skips_empty_fields() {
        let report = FileReport::new("a.sql", FileStatus::Written);
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"path": "a.sql", "status": "written"}));
    }
}
