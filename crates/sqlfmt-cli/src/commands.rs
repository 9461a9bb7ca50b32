//! Command implementation
//!
//! Loads configuration, resolves the inputs, runs the formatter over them and
//! decides the exit code.

use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use sqlfmt_core::{
    ConfigFile, ConfigLoader, FormatOptions, ParseMode, ResultExt, RoundTripValidator,
    SqlFmtError, SqlFormatter,
};
use std::io::{IsTerminal, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::output::{FileReport, FileStatus, FormatSummary, OutputFormatter};
use crate::{Cli, DEFAULT_DIALECT};

const STDIN_NAME: &str = "<stdin>";

/// One input read into memory
#[derive(Debug)]
struct SourceFile {
    path: Option<PathBuf>,
    name: String,
    text: String,
}

/// What to do with formatted text
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Print,
    Check,
    Write,
}

impl Mode {
    fn from_cli(cli: &Cli) -> Self {
        if cli.check {
            Mode::Check
        } else if cli.write {
            Mode::Write
        } else if cli.diff {
            // `--diff` on its own only shows what would change
            Mode::Check
        } else {
            Mode::Print
        }
    }
}

pub fn run(cli: &Cli) -> Result<ExitCode> {
    let use_stdin = cli.stdin || cli.paths.is_empty();
    let config = load_config(cli, use_stdin)?;
    let dialect = cli
        .dialect
        .clone()
        .or_else(|| config.dialect.clone())
        .unwrap_or_else(|| DEFAULT_DIALECT.to_string());
    let options = cli_overrides(cli).or(&config.options);
    debug!(%dialect, ?options, "resolved configuration");

    let formatter = SqlFormatter::new(&options, &dialect)?;
    let mode = Mode::from_cli(cli);
    let use_colors = !cli.no_color && std::io::stderr().is_terminal();
    let output = OutputFormatter::new(cli.output_format, use_colors);

    let sources = if use_stdin {
        vec![read_stdin()?]
    } else {
        let files = collect_files(&cli.paths)?;
        if files.is_empty() {
            eprintln!("No SQL files found in specified paths.");
            return Ok(ExitCode::SUCCESS);
        }
        info!("Formatting {} file(s)", files.len());
        files.into_iter().map(read_file).collect::<Result<Vec<_>>>()?
    };

    let texts: Vec<&str> = sources.iter().map(|source| source.text.as_str()).collect();
    let results = formatter.format_many(&texts);
    let issues = if cli.verify {
        verify_all(&formatter, &sources)
    } else {
        vec![Vec::new(); sources.len()]
    };

    let mut reports = Vec::with_capacity(sources.len());
    for ((source, result), issues) in sources.iter().zip(results).zip(issues) {
        let mut report = match result {
            Ok(formatted) => handle_formatted(source, formatted, mode, cli.diff, &output)?,
            Err(err) => handle_error(source, &err, &output),
        };
        report.issues = issues;
        reports.push(report);
    }

    let summary = FormatSummary::from_reports(&reports);
    if output.is_json() || mode != Mode::Print || summary.has_failures() {
        output.print_results(&reports, &summary, mode == Mode::Check)?;
    }

    let unformatted = mode == Mode::Check && summary.changed > 0;
    Ok(if summary.has_failures() || unformatted {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Explicit `--config`, otherwise discovery from the first input's directory
fn load_config(cli: &Cli, use_stdin: bool) -> Result<ConfigFile> {
    let start_dir = match cli.paths.first() {
        Some(path) if !use_stdin && path.is_dir() => path.clone(),
        Some(path) if !use_stdin => match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        },
        _ => PathBuf::from("."),
    };
    let config = ConfigLoader::load(cli.config.as_deref(), Some(&start_dir))
        .context("failed to load configuration")?;
    Ok(config)
}

fn cli_overrides(cli: &Cli) -> FormatOptions {
    let mut options = FormatOptions::new();
    if let Some(case) = cli.keyword_case {
        options = options.keyword_case(case.into());
    }
    if cli.canonical {
        options = options.canonical_syntax(true);
    }
    if !cli.param_types.is_empty() {
        options = options.param_types(cli.param_types.iter().cloned());
    }
    if let Some(width) = cli.print_width {
        options = options.print_width(width);
    }
    if cli.best_effort {
        options = options.parse_mode(ParseMode::BestEffort);
    }
    options
}

/// Explicit files are taken as given; directories are walked for `*.sql`
fn collect_files(paths: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_file() {
            files.push(path.clone());
        } else if path.is_dir() {
            let mut found: Vec<PathBuf> = WalkDir::new(path)
                .into_iter()
                .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.path()))
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file())
                .map(|entry| entry.into_path())
                .filter(|path| path.extension().is_some_and(|ext| ext == "sql"))
                .collect();
            found.sort();
            files.extend(found);
        } else {
            bail!("path does not exist: {}", path.display());
        }
    }
    Ok(files)
}

fn is_hidden(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

fn read_file(path: PathBuf) -> Result<SourceFile> {
    let text = std::fs::read_to_string(&path).map_err(|e| SqlFmtError::io_error(&path, e))?;
    Ok(SourceFile {
        name: path.display().to_string(),
        path: Some(path),
        text,
    })
}

fn read_stdin() -> Result<SourceFile> {
    let mut text = String::new();
    std::io::stdin()
        .read_to_string(&mut text)
        .context("failed to read standard input")?;
    Ok(SourceFile {
        path: None,
        name: STDIN_NAME.to_string(),
        text,
    })
}

fn verify_all(formatter: &SqlFormatter, sources: &[SourceFile]) -> Vec<Vec<String>> {
    let validator = RoundTripValidator::new(formatter.policy().clone());
    sources
        .par_iter()
        .map(|source| {
            // Unparsable input is already reported by the formatting pass
            validator
                .validate(&source.text)
                .log_and_continue()
                .map(|result| result.issues.iter().map(ToString::to_string).collect())
                .unwrap_or_default()
        })
        .collect()
}

fn handle_formatted(
    source: &SourceFile,
    formatted: String,
    mode: Mode,
    show_diff: bool,
    output: &OutputFormatter,
) -> Result<FileReport> {
    let changed = formatted != source.text;
    if changed && show_diff && !output.is_json() {
        print!("{}", output.render_diff(&source.name, &source.text, &formatted));
    }

    let status = match (mode, changed) {
        (_, false) => FileStatus::Unchanged,
        (Mode::Write, true) => match &source.path {
            Some(path) => {
                std::fs::write(path, &formatted).map_err(|e| SqlFmtError::io_error(path, e))?;
                debug!("wrote {}", path.display());
                FileStatus::Written
            }
            None => FileStatus::Changed,
        },
        (_, true) => FileStatus::Changed,
    };

    let mut report = FileReport::new(source.name.clone(), status);
    if mode == Mode::Print {
        if output.is_json() {
            report.formatted = Some(formatted);
        } else {
            print!("{formatted}");
        }
    }
    Ok(report)
}

fn handle_error(source: &SourceFile, err: &SqlFmtError, output: &OutputFormatter) -> FileReport {
    let diagnostics = err.diagnostics();
    if !output.is_json() {
        eprintln!(
            "{}",
            output.render_diagnostics(&diagnostics, &source.text, &source.name)
        );
    }
    let mut report = FileReport::new(source.name.clone(), FileStatus::Failed);
    report.diagnostics = diagnostics;
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_collect_files_walks_directories() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("nested")).unwrap();
        fs::create_dir_all(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join("b.sql"), "select 1").unwrap();
        fs::write(dir.path().join("nested/a.sql"), "select 2").unwrap();
        fs::write(dir.path().join("notes.txt"), "text").unwrap();
        fs::write(dir.path().join(".hidden/c.sql"), "select 3").unwrap();

        let files = collect_files(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|path| path.strip_prefix(dir.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(names, vec![PathBuf::from("b.sql"), PathBuf::from("nested/a.sql")]);
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let err = collect_files(&[PathBuf::from("definitely/not/here.sql")]).unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }
}
