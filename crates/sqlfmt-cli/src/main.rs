//! sqlfmt CLI
//!
//! Command-line host for the sqlfmt SQL formatter

mod commands;
mod output;

use clap::{Parser, ValueEnum};
use sqlfmt_core::{KeywordCase, init_tracing};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

/// Dialect used when neither the command line nor a config file names one
pub const DEFAULT_DIALECT: &str = "postgresql";

#[derive(Parser, Debug)]
#[command(name = "sqlfmt")]
#[command(about = "sqlfmt: lossless, dialect-aware SQL formatter")]
#[command(version = sqlfmt_core::VERSION)]
#[command(
    long_about = "sqlfmt parses SQL into a lossless syntax tree and prints it back under a\n\
configurable style. Comments are never dropped and formatting is idempotent.\n\
\n\
Examples:\n  \
sqlfmt queries/                     # Print formatted files under queries/\n  \
sqlfmt --write schema.sql           # Format in place\n  \
sqlfmt --check --diff .             # Fail if anything is unformatted\n  \
echo 'select 1' | sqlfmt --stdin    # Format standard input"
)]
pub struct Cli {
    /// Files or directories to format (directories are searched for *.sql)
    #[arg(value_name = "PATHS")]
    pub paths: Vec<PathBuf>,

    /// Read SQL from standard input and write the result to standard output
    #[arg(long, conflicts_with_all = ["paths", "write"])]
    pub stdin: bool,

    /// Check formatting without writing; exit with 1 if anything would change
    #[arg(long, conflicts_with = "write")]
    pub check: bool,

    /// Write formatted output back to the files
    #[arg(short, long)]
    pub write: bool,

    /// Show a unified diff of the changes
    #[arg(long)]
    pub diff: bool,

    /// Also verify round-trip safety (comments, idempotence, token stream)
    #[arg(long)]
    pub verify: bool,

    /// SQL dialect: sqlite, postgresql, mysql or bigquery
    #[arg(short, long, env = "SQLFMT_DIALECT")]
    pub dialect: Option<String>,

    /// Keyword case
    #[arg(long, value_enum)]
    pub keyword_case: Option<KeywordCaseArg>,

    /// Apply the dialect's canonical syntax rewrites
    #[arg(long)]
    pub canonical: bool,

    /// Accepted placeholder syntaxes, e.g. "?,$nr,@name"
    #[arg(long, value_delimiter = ',')]
    pub param_types: Vec<String>,

    /// Maximum line width
    #[arg(long)]
    pub print_width: Option<usize>,

    /// Report every syntax error instead of stopping at the first one
    #[arg(long)]
    pub best_effort: bool,

    /// Configuration file path
    #[arg(
        short,
        long,
        help = "Path to configuration file (.sqlfmtrc.json/.sqlfmtrc.toml/sqlfmt.yaml)"
    )]
    pub config: Option<PathBuf>,

    /// Output format for reports and diagnostics
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub output_format: OutputFormat,

    /// Verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Number of threads to use for parallel processing
    #[arg(
        short = 'j',
        long,
        help = "Number of threads (default: number of CPU cores)"
    )]
    pub threads: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeywordCaseArg {
    Upper,
    Lower,
    Preserve,
}

impl From<KeywordCaseArg> for KeywordCase {
    fn from(arg: KeywordCaseArg) -> Self {
        match arg {
            KeywordCaseArg::Upper => KeywordCase::Upper,
            KeywordCaseArg::Lower => KeywordCase::Lower,
            KeywordCaseArg::Preserve => KeywordCase::Preserve,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Colored, human-readable output
    Human,
    /// One JSON report on standard output
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    if cli.verbose > 0 || std::env::var_os("RUST_LOG").is_none() {
        let log_level = match cli.verbose {
            0 => "sqlfmt=warn",
            1 => "sqlfmt=info",
            2 => "sqlfmt=debug",
            _ => "sqlfmt=trace",
        };
        unsafe {
            std::env::set_var("RUST_LOG", log_level);
        }
    }
    init_tracing();

    if cli.no_color {
        colored::control::set_override(false);
    }

    if let Some(threads) = cli.threads
        && let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
    {
        error!("Failed to set thread pool size: {}", e);
        return ExitCode::from(2);
    }

    match commands::run(&cli) {
        Ok(code) => code,
        Err(e) => {
            error!("sqlfmt failed: {:#}", e);
            eprintln!("error: {e:#}");
            ExitCode::from(2)
        }
    }
}
