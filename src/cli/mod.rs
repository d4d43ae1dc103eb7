//! CLI module for quill
//!
//! This module provides the command-line interface of the formatter.
//!
//! ## Usage
//!
//! - `quill <path>...` - Print formatted files to stdout
//! - `quill --write <path>...` - Format files in place
//! - `quill -l <path>...` - List files whose formatting differs
//! - `quill` / `quill --stdin` - Format standard input
//!
//! ## Modules
//!
//! - `commands` - Command implementations
//! - `config` - `.quillrc.toml` discovery
//! - `logger` - `[warn]` / `[error]` tagged output
//!
//! ## Design
//!
//! The CLI never touches the process directly: every read and side effect goes through a `&mut dyn Host`, so the
//! same code runs under the real [`SystemHost`](crate::host::SystemHost) and under the in-process test harness.
//! Command functions return `CliResult<ExitCode>`. Only the top-level [`run`] reports errors, requests an exit or
//! sets the exit-code flag.

// Enforce explicit error handling - no panicking in production code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]

pub mod commands;
pub mod config;
mod logger;

pub use logger::Logger;

use std::io;
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;

use crate::format::{FormatConfig, QuoteStyle};
use crate::host::Host;
use crate::version::QUILL_VERSION;
use config::ConfigFile;

// ============================================================================
// CLI Error handling
// ============================================================================

/// Exit code for CLI operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExitCode(pub i32);

impl ExitCode {
    pub const SUCCESS: ExitCode = ExitCode(0);
    /// Formatting differs (`--list-different`).
    pub const FAILURE: ExitCode = ExitCode(1);
    /// Invalid input: syntax errors, unreadable or missing files, bad configuration.
    pub const INVALID: ExitCode = ExitCode(2);
}

/// Error type for CLI operations.
#[derive(Debug, Error)]
pub enum CliError {
    /// A user-facing failure. `run` logs the message and exits with the code.
    #[error("{message}")]
    Reported { message: String, exit_code: ExitCode },

    /// The host itself failed (a stream or stdin could not be used). Propagated out of `run`.
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl CliError {
    /// Create a new CLI error with a message and exit code.
    pub fn new(message: impl Into<String>, exit_code: ExitCode) -> Self {
        Self::Reported {
            message: message.into(),
            exit_code,
        }
    }

    /// Create an error with a custom exit code.
    pub fn with_code(message: impl Into<String>, code: i32) -> Self {
        Self::new(message, ExitCode(code))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

// ============================================================================
// Clap CLI definition
// ============================================================================

/// Format JavaScript-style source files
#[derive(Parser, Debug)]
#[command(name = "quill")]
#[command(version = QUILL_VERSION)]
#[command(about = "Format JavaScript-style source files", long_about = None)]
pub struct Cli {
    /// Files or directories to format (standard input is read when none are given)
    #[arg(value_name = "PATH")]
    pub paths: Vec<PathBuf>,

    /// Edit files in place
    #[arg(long)]
    pub write: bool,

    /// Print the names of files whose formatting differs
    #[arg(short = 'l', long = "list-different")]
    pub list_different: bool,

    /// Read source from standard input
    #[arg(long, conflicts_with = "paths")]
    pub stdin: bool,

    /// Number of spaces per indentation level
    #[arg(long = "tab-width", value_name = "N")]
    pub tab_width: Option<usize>,

    /// Prefer single quotes over double quotes
    #[arg(long = "single-quote")]
    pub single_quote: bool,

    /// Do not terminate statements with semicolons
    #[arg(long = "no-semi")]
    pub no_semi: bool,

    /// Ignore `.quillrc.toml`
    #[arg(long = "no-config")]
    pub no_config: bool,
}

impl Cli {
    /// Effective formatting options: defaults, then the config file, then flags.
    pub fn format_config(&self, file: Option<&ConfigFile>) -> FormatConfig {
        let mut config = match file {
            Some(file) => file.apply(FormatConfig::default()),
            None => FormatConfig::default(),
        };
        if let Some(width) = self.tab_width {
            config = config.with_indent_width(width);
        }
        if self.single_quote {
            config = config.with_quote_style(QuoteStyle::Single);
        }
        if self.no_semi {
            config = config.with_semicolons(false);
        }
        config
    }
}

// ============================================================================
// CLI entry point
// ============================================================================

/// Main CLI entry point.
///
/// Parses the host's argument vector (`[launcher, program, args...]`), runs the command and records the outcome:
/// usage errors and reported failures request an exit, completed runs leave a non-zero code in the exit-code flag.
/// Only host I/O failures are returned as errors.
pub fn run(host: &mut dyn Host) -> io::Result<()> {
    let args = host.args();
    let cli = match Cli::try_parse_from(args.iter().skip(1)) {
        Ok(cli) => cli,
        Err(err) => {
            // Help and version land here too, with exit code 0.
            let rendered = err.render().to_string();
            if err.use_stderr() {
                host.write_stderr(&rendered)?;
            } else {
                host.write_stdout(&rendered)?;
            }
            host.exit(err.exit_code());
            return Ok(());
        }
    };

    let logger = Logger::new(host.stdout_is_tty());
    match execute(host, &logger, &cli) {
        Ok(exit_code) => {
            if exit_code != ExitCode::SUCCESS {
                host.set_exit_code(exit_code.0);
            }
            Ok(())
        }
        Err(CliError::Reported { message, exit_code }) => {
            logger.error(host, &message)?;
            host.exit(exit_code.0);
            Ok(())
        }
        Err(CliError::Io(err)) => Err(err),
    }
}

/// Execute the parsed command and return its exit code.
fn execute(host: &mut dyn Host, logger: &Logger, cli: &Cli) -> CliResult<ExitCode> {
    let file_config = if cli.no_config {
        None
    } else {
        let cwd = host.current_dir()?;
        config::load(&cwd).map_err(|e| CliError::with_code(e.to_string(), ExitCode::INVALID.0))?
    };
    let format_config = cli.format_config(file_config.as_ref());
    tracing::debug!(?format_config, paths = cli.paths.len(), "resolved format config");

    if cli.stdin || cli.paths.is_empty() {
        if !cli.stdin && host.stdin_is_tty() {
            logger.warn(host, "Reading from standard input; press Ctrl-D to finish")?;
        }
        return commands::format_stdin(host, logger, &format_config);
    }

    let mode = commands::Mode {
        write: cli.write,
        list_different: cli.list_different,
    };
    commands::format_paths(host, logger, &format_config, &cli.paths, mode)
}

// ============================================================================
// Tests
// ============================================================================
