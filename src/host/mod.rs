//! Host boundary interfaces
//!
//! Everything the quill CLI reads from or does to its process goes through the [`Host`] trait:
//! - Ambient reads: argument vector, working directory, terminal attachment, exit-code flag
//! - Side effects: stdout/stderr writes, severity-tagged log lines, file writes, process exit
//! - Input: reading all of standard input
//!
//! [`SystemHost`] is the real implementation used by the `quill` binary. The in-process test harness supplies its own
//! recording implementation, which lets a full CLI run be observed without spawning a process.
//!
//! The ambient reads have default implementations backed by [`ambient`], the process-wide state both hosts share.

pub mod ambient;
mod system;

pub use system::SystemHost;

use std::io;
use std::path::{Path, PathBuf};

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// The process boundary of the quill CLI.
pub trait Host {
    // ------------------------------------------------------------------------
    // Ambient reads
    // ------------------------------------------------------------------------

    /// The argument vector: `[launcher, program, args...]`.
    fn args(&self) -> Vec<String> {
        ambient::argv()
    }

    fn current_dir(&self) -> io::Result<PathBuf> {
        std::env::current_dir()
    }

    fn stdin_is_tty(&self) -> bool {
        ambient::stdin_is_tty()
    }

    fn stdout_is_tty(&self) -> bool {
        ambient::stdout_is_tty()
    }

    /// The exit code to use if the program returns without calling [`Host::exit`].
    fn exit_code(&self) -> Option<i32> {
        ambient::exit_code()
    }

    fn set_exit_code(&mut self, code: i32) {
        ambient::set_exit_code(Some(code));
    }

    // ------------------------------------------------------------------------
    // Side effects
    // ------------------------------------------------------------------------

    /// Request process exit. Implementations that return from this call must ignore all later output.
    fn exit(&mut self, code: i32);

    fn write_stdout(&mut self, text: &str) -> io::Result<()>;

    fn write_stderr(&mut self, text: &str) -> io::Result<()>;

    /// Write one log line. Info goes to stdout, warnings and errors to stderr.
    fn log(&mut self, level: LogLevel, message: &str) -> io::Result<()> {
        let line = format!("{message}\n");
        match level {
            LogLevel::Info => self.write_stdout(&line),
            LogLevel::Warn | LogLevel::Error => self.write_stderr(&line),
        }
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()>;

    /// Read standard input to the end.
    fn read_stdin(&mut self) -> io::Result<String>;
}
