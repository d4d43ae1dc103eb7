#![forbid(unsafe_code)]
//! quill: a small JavaScript-style source formatter, and the harness that tests it in-process
//!
//! - [`format`]: the token-stream formatter (`format_source`, `FormatConfig`)
//! - [`cli`]: the `quill` command line, written against the [`host::Host`] seam
//! - [`host`]: process boundary (argv, cwd, terminal flags, exit, streams, file writes, stdin)
//! - `harness` (tests and the `test-support` feature): runs the CLI in-process and captures everything it does
//!
//! ## Panic Policy
//!
//! - **Production code**: Use `Result` or `Option` with `?` / `ok_or` / `map_err`. The `cli` module enforces
//!   `#![deny(clippy::unwrap_used)]`.
//!
//! - **Test code**: `.unwrap()` and `.expect()` are acceptable in tests.
//!
//! - **True invariants**: If a panic represents a bug (logic error), use `.expect("INVARIANT: reason")` with a clear
//!   explanation.

pub mod cli;
pub mod format;
#[cfg(any(test, feature = "test-support"))]
pub mod harness;
pub mod host;
pub mod version;

pub use format::{FormatConfig, QuoteStyle, SyntaxError, format_source, format_source_with_config};
pub use host::{Host, SystemHost};
