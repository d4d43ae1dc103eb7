//! Shared syntax frontend for quill: lexer, tokens, diagnostics.
//!
//! This crate is dependency-light and intended for reuse by the formatter and any future tooling that needs to look
//! at JavaScript-style source without building a full AST.
//!
//! ## Notes
//! - This crate is intentionally "token-only": there is no parser and no AST. Bracket balance is the only structural
//!   check, and it lives with the formatter.
//! - Errors carry a byte offset plus a resolved line/column so callers can render a code frame.
//!
//! ## Examples
//! ```rust
//! use quill_syntax::lexer;
//!
//! let tokens = lexer::lex("const x = 1;").unwrap();
//! assert_eq!(tokens.len(), 6); // const, x, =, 1, ;, Eof
//! ```

pub mod diagnostics;
pub mod lexer;

pub use diagnostics::SyntaxError;
pub use lexer::{Token, TokenKind, lex};
