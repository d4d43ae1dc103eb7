//! Lexer for JavaScript-style source
//!
//! Handles tokenization including:
//! - Identifiers and keywords (keywords are plain identifiers; see [`is_keyword`])
//! - Numeric literals and single/double-quoted strings
//! - Line (`//`) and block (`/* */`) comments, kept as tokens
//! - Operators (longest match) and punctuation
//! - Newlines, kept as tokens so the formatter can terminate statements and preserve blank lines
//!
//! There is no regular-expression literal support: `/` always lexes as an operator.

use crate::diagnostics::SyntaxError;

// ============================================================================
// TOKEN TYPES
// ============================================================================

/// Kind of token produced by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Number(String),
    /// String literal; `body` is the raw text between the quotes, escapes untouched.
    Str { quote: char, body: String },
    Operator(&'static str),
    /// One of `( ) [ ] { } , ; . :`
    Punct(char),
    LineComment(String),
    BlockComment(String),
    Newline,
    Eof,
}

/// A token with its kind and starting byte offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self { kind, offset }
    }
}

/// Operators, longest first so the scan can take the first prefix match.
const OPERATORS: &[&str] = &[
    "===", "!==", "**=", "...", "=>", "==", "!=", "<=", ">=", "&&", "||", "??", "++", "--", "+=", "-=", "*=", "/=",
    "%=", "**", "=", "<", ">", "+", "-", "*", "/", "%", "!", "?", "&", "|", "^", "~",
];

const PUNCTUATION: &[char] = &['(', ')', '[', ']', '{', '}', ',', ';', '.', ':'];

/// Statement-level keywords. Value-like words (`this`, `true`, `null`, ...) are deliberately absent.
const KEYWORDS: &[&str] = &[
    "async", "await", "break", "case", "catch", "class", "const", "continue", "debugger", "default", "delete", "do",
    "else", "export", "extends", "finally", "for", "from", "function", "if", "import", "in", "instanceof", "let",
    "new", "of", "return", "switch", "throw", "try", "typeof", "var", "void", "while", "yield",
];

/// Whether `word` is a statement-level keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

// ============================================================================
// LEXER
// ============================================================================

/// Tokenize `source`. The token stream always ends with an `Eof` token.
pub fn lex(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let tokens = Lexer::new(source).tokenize()?;
    tracing::trace!(count = tokens.len(), "lexed source");
    Ok(tokens)
}

struct Lexer<'a> {
    source: &'a str,
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(source: &'a str) -> Self {
        Self {
            source,
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, SyntaxError> {
        while let Some(c) = self.peek() {
            let start = self.pos;
            match c {
                '\n' => {
                    self.bump();
                    self.push(TokenKind::Newline, start);
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.rest().starts_with("//") => {
                    let end = self.rest().find('\n').map_or(self.source.len(), |i| start + i);
                    let text = self.source[start..end].trim_end().to_string();
                    self.pos = end;
                    self.push(TokenKind::LineComment(text), start);
                }
                '/' if self.rest().starts_with("/*") => {
                    let Some(close) = self.rest()[2..].find("*/") else {
                        return Err(SyntaxError::at("Unterminated comment", self.source, start));
                    };
                    let end = start + 2 + close + 2;
                    let text = self.source[start..end].to_string();
                    self.pos = end;
                    self.push(TokenKind::BlockComment(text), start);
                }
                '"' | '\'' => self.scan_string(c)?,
                c if c.is_ascii_digit() => self.scan_number(),
                c if is_ident_start(c) => {
                    let word = self.take_while(is_ident_continue);
                    self.push(TokenKind::Ident(word), start);
                }
                c if PUNCTUATION.contains(&c) && !self.rest().starts_with("...") => {
                    self.bump();
                    self.push(TokenKind::Punct(c), start);
                }
                _ => {
                    let Some(op) = OPERATORS.iter().find(|op| self.rest().starts_with(**op)) else {
                        return Err(SyntaxError::at(
                            format!("Unexpected character \"{c}\""),
                            self.source,
                            start,
                        ));
                    };
                    self.pos += op.len();
                    self.push(TokenKind::Operator(*op), start);
                }
            }
        }

        self.push(TokenKind::Eof, self.source.len());
        Ok(self.tokens)
    }

    // ========================================================================
    // Core character handling
    // ========================================================================

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        Some(c)
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> String {
        let start = self.pos;
        while self.peek().is_some_and(&pred) {
            self.bump();
        }
        self.source[start..self.pos].to_string()
    }

    fn push(&mut self, kind: TokenKind, offset: usize) {
        self.tokens.push(Token::new(kind, offset));
    }

    // ========================================================================
    // Literals
    // ========================================================================

    fn scan_string(&mut self, quote: char) -> Result<(), SyntaxError> {
        let start = self.pos;
        self.bump();
        let body_start = self.pos;
        loop {
            match self.bump() {
                Some('\\') => {
                    // An escaped line break is a continuation, anything else is kept verbatim.
                    if self.bump().is_none() {
                        break;
                    }
                }
                Some('\n') | None => break,
                Some(c) if c == quote => {
                    let body = self.source[body_start..self.pos - 1].to_string();
                    self.push(TokenKind::Str { quote, body }, start);
                    return Ok(());
                }
                Some(_) => {}
            }
        }
        Err(SyntaxError::at("Unterminated string constant", self.source, start))
    }

    fn scan_number(&mut self) {
        let start = self.pos;
        let mut text = self.take_while(|c| c.is_ascii_digit() || c == '_');
        let fraction_follows = self.rest().starts_with('.')
            && self.rest()[1..].chars().next().is_some_and(|c| c.is_ascii_digit());
        if fraction_follows {
            self.bump();
            text.push('.');
            text.push_str(&self.take_while(|c| c.is_ascii_digit() || c == '_'));
        }
        self.push(TokenKind::Number(text), start);
    }
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

// ============================================================================
// Tests
// ============================================================================
