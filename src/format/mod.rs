//! quill code formatter
//!
//! This module provides formatting for JavaScript-style source files. It follows Prettier conventions:
//! - 2-space indentation
//! - Double quotes for strings (unless that needs more escapes)
//! - Semicolon-terminated statements, one per line
//! - At most one preserved blank line between statements

mod config;
mod formatter;
mod writer;

pub use config::{FormatConfig, QuoteStyle};
pub use formatter::Formatter;
pub use quill_syntax::SyntaxError;

/// Format source code with default settings
pub fn format_source(source: &str) -> Result<String, SyntaxError> {
    format_source_with_config(source, &FormatConfig::default())
}

/// Format source code with custom configuration
pub fn format_source_with_config(source: &str, config: &FormatConfig) -> Result<String, SyntaxError> {
    Formatter::new(config.clone()).format(source)
}
