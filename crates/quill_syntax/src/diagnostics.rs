//! Diagnostics for quill source files
//!
//! A [`SyntaxError`] is located by byte offset; line and column are resolved against the source when the error is
//! built so the `Display` form is self-contained (`Unexpected token ")" (1:14)`).

use thiserror::Error;

/// A syntax error with a resolved 1-based line/column.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({line}:{column})")]
pub struct SyntaxError {
    pub message: String,
    /// Byte offset into the source.
    pub offset: usize,
    pub line: usize,
    pub column: usize,
}

impl SyntaxError {
    /// Build an error at `offset`, resolving line/column against `source`.
    pub fn at(message: impl Into<String>, source: &str, offset: usize) -> Self {
        let offset = offset.min(source.len());
        let (line, column) = line_col(source, offset);
        Self {
            message: message.into(),
            offset,
            line,
            column,
        }
    }

    /// Render a one-line code frame pointing at the error location.
    ///
    /// ```text
    /// > 1 | const x = (1));
    ///     |              ^
    /// ```
    ///
    /// With `color` the caret is painted red.
    pub fn code_frame(&self, source: &str, color: bool) -> String {
        let text = source.lines().nth(self.line - 1).unwrap_or("");
        let number = self.line.to_string();
        let width = number.len();
        let pad = " ".repeat(self.column.saturating_sub(1));
        let caret = if color { "\x1b[31m^\x1b[0m" } else { "^" };
        format!("> {number} | {text}\n  {blank:>width$} | {pad}{caret}", blank = "")
    }
}

/// Resolve a byte offset to a 1-based (line, column) pair, counting columns in chars.
fn line_col(source: &str, offset: usize) -> (usize, usize) {
    let before = source.get(..offset).unwrap_or(source);
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() + 1;
    (line, column)
}
