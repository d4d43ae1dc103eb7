//! Tagged log output
//!
//! Info lines go to stdout untouched. Warnings and errors go to stderr with every line of the message prefixed by
//! `[warn]` or `[error]`, so multi-line messages such as code frames stay attributable.

use std::io;

use crate::host::{Host, LogLevel};

const RED: &str = "\x1b[31m";
const YELLOW: &str = "\x1b[33m";
const GREY: &str = "\x1b[90m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Logger {
    color: bool,
}

impl Logger {
    /// Create a logger. `color` enables ANSI styling of tags and dimmed names.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    pub fn color(&self) -> bool {
        self.color
    }

    pub fn info(&self, host: &mut dyn Host, message: &str) -> io::Result<()> {
        host.log(LogLevel::Info, message)
    }

    pub fn warn(&self, host: &mut dyn Host, message: &str) -> io::Result<()> {
        self.tagged(host, LogLevel::Warn, "warn", YELLOW, message)
    }

    pub fn error(&self, host: &mut dyn Host, message: &str) -> io::Result<()> {
        self.tagged(host, LogLevel::Error, "error", RED, message)
    }

    /// Dim `text` when color is on.
    pub fn grey(&self, text: &str) -> String {
        self.paint(GREY, text)
    }

    fn paint(&self, code: &str, text: &str) -> String {
        if self.color {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn tagged(&self, host: &mut dyn Host, level: LogLevel, tag: &str, code: &str, message: &str) -> io::Result<()> {
        let tag = self.paint(code, tag);
        for line in message.lines() {
            host.log(level, &format!("[{tag}] {line}"))?;
        }
        Ok(())
    }
}
