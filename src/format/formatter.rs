//! Token-stream formatter
//!
//! quill has no AST: the formatter walks the lexer's tokens once, building one output line per statement and
//! deciding spacing from the previous token alone. Braces are the only structure it tracks. A `{` after an operator,
//! an opening bracket, a comma or `return` is an inline object literal; anything else opens an indented block.

use quill_syntax::lexer::{self, Token, TokenKind, is_keyword};
use quill_syntax::SyntaxError;

use super::config::FormatConfig;
use super::writer::FormatWriter;

/// Keywords after which a line break ends the statement.
const TERMINAL_KEYWORDS: &[&str] = &["return", "break", "continue", "debugger"];

/// Formatter for quill source
pub struct Formatter {
    config: FormatConfig,
}

impl Formatter {
    /// Create a new formatter with the given config
    pub fn new(config: FormatConfig) -> Self {
        Self { config }
    }

    /// Format a source file.
    pub fn format(&self, source: &str) -> Result<String, SyntaxError> {
        let tokens = lexer::lex(source)?;
        check_brackets(source, &tokens)?;

        let mut printer = Printer::new(self.config.clone());
        for token in &tokens {
            printer.push(&token.kind);
        }
        Ok(printer.finish())
    }
}

// ============================================================================
// Bracket balance
// ============================================================================

fn check_brackets(source: &str, tokens: &[Token]) -> Result<(), SyntaxError> {
    let mut stack: Vec<char> = Vec::new();
    for token in tokens {
        let TokenKind::Punct(c) = &token.kind else {
            continue;
        };
        match *c {
            '(' | '[' | '{' => stack.push(*c),
            ')' | ']' | '}' => {
                if stack.pop() != Some(opener(*c)) {
                    return Err(SyntaxError::at(
                        format!("Unexpected token \"{c}\""),
                        source,
                        token.offset,
                    ));
                }
            }
            _ => {}
        }
    }
    match stack.last() {
        Some(&open) => Err(SyntaxError::at(
            format!("Unexpected end of input, expected \"{}\"", closer(open)),
            source,
            source.len(),
        )),
        None => Ok(()),
    }
}

fn opener(close: char) -> char {
    match close {
        ')' => '(',
        ']' => '[',
        _ => '{',
    }
}

fn closer(open: char) -> char {
    match open {
        '(' => ')',
        '[' => ']',
        _ => '}',
    }
}

// ============================================================================
// Printer
// ============================================================================

/// Class of the previous token on the current line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    /// Identifier, literal, closing bracket or postfix operator.
    Value,
    Keyword,
    /// `(` or `[`
    Open,
    /// `{` of an inline object literal
    OpenBrace,
    Dot,
    /// `,` or a `;` inside parentheses
    Comma,
    Colon,
    Binary,
    Prefix,
}

enum Brace {
    /// Indented block; remembers the bracket depth of the statement it interrupted.
    Block { depth: usize },
    Inline,
}

struct Printer {
    writer: FormatWriter,
    config: FormatConfig,
    /// Text of the statement being built.
    line: String,
    prev: Prev,
    /// Open brackets (and inline braces) in the current statement.
    depth: usize,
    /// Unmatched `?` in the current statement.
    ternaries: usize,
    braces: Vec<Brace>,
    /// Comments met mid-statement, emitted after its terminator.
    trailing: Vec<String>,
    /// Line breaks since the last token.
    newlines: usize,
    /// The last written line may still take a trailing comment.
    line_open: bool,
    block_start: bool,
}

impl Printer {
    fn new(config: FormatConfig) -> Self {
        Self {
            writer: FormatWriter::new(config.clone()),
            config,
            line: String::new(),
            prev: Prev::Start,
            depth: 0,
            ternaries: 0,
            braces: Vec::new(),
            trailing: Vec::new(),
            newlines: 0,
            line_open: false,
            block_start: false,
        }
    }

    fn push(&mut self, kind: &TokenKind) {
        match kind {
            TokenKind::Newline => self.newline(),
            TokenKind::Eof => {}
            TokenKind::LineComment(text) | TokenKind::BlockComment(text) => self.comment(text),
            TokenKind::Punct(';') => self.semicolon(),
            TokenKind::Punct('{') => self.open_brace(),
            TokenKind::Punct('}') => self.close_brace(),
            TokenKind::Punct(c @ ('(' | '[')) => {
                let space = self.prev != Prev::Value && self.space_before_operand();
                self.append(&c.to_string(), space);
                self.depth += 1;
                self.prev = Prev::Open;
            }
            TokenKind::Punct(c @ (')' | ']')) => {
                self.append(&c.to_string(), false);
                self.depth = self.depth.saturating_sub(1);
                self.prev = Prev::Value;
            }
            TokenKind::Punct(',') => {
                self.append(",", false);
                self.prev = Prev::Comma;
            }
            TokenKind::Punct('.') => {
                self.append(".", false);
                self.prev = Prev::Dot;
            }
            TokenKind::Punct(':') => {
                if self.ternaries > 0 {
                    self.ternaries -= 1;
                    self.append(":", true);
                    self.prev = Prev::Binary;
                } else {
                    self.append(":", false);
                    self.prev = Prev::Colon;
                }
            }
            TokenKind::Punct(c) => {
                self.append(&c.to_string(), false);
                self.prev = Prev::Value;
            }
            TokenKind::Ident(word) => {
                // `promise.catch` is a property, not a keyword.
                let keyword = self.prev != Prev::Dot && is_keyword(word);
                self.operand(word);
                if keyword {
                    self.prev = Prev::Keyword;
                }
            }
            TokenKind::Number(text) => self.operand(text),
            TokenKind::Str { quote, body } => {
                let text = requote(*quote, body, self.config.quote_style.as_char());
                self.operand(&text);
            }
            TokenKind::Operator(op) => self.operator(op),
        }
    }

    fn finish(mut self) -> String {
        self.end_statement(false);
        let mut output = self.writer.finish();
        if !output.is_empty() && !output.ends_with('\n') {
            output.push('\n');
        }
        output
    }

    // ========================================================================
    // Line building
    // ========================================================================

    /// Whether an operand placed after the previous token needs a separating space.
    fn space_before_operand(&self) -> bool {
        matches!(
            self.prev,
            Prev::Value | Prev::Keyword | Prev::Comma | Prev::Colon | Prev::Binary | Prev::OpenBrace
        )
    }

    fn append(&mut self, text: &str, space: bool) {
        if self.line.is_empty() {
            self.start_line();
        } else if space {
            self.line.push(' ');
        }
        self.line.push_str(text);
        self.newlines = 0;
        self.block_start = false;
        self.line_open = false;
    }

    /// Emit the preserved blank line, if any, before a new line starts.
    fn start_line(&mut self) {
        if self.newlines >= 2 && !self.block_start && !self.writer.is_empty() {
            self.writer.newline();
        }
    }

    fn operand(&mut self, text: &str) {
        let space = self.space_before_operand();
        self.append(text, space);
        self.prev = Prev::Value;
    }

    fn operator(&mut self, op: &str) {
        match op {
            "++" | "--" if self.prev == Prev::Value => {
                self.append(op, false);
                self.prev = Prev::Value;
            }
            "!" | "~" | "..." | "++" | "--" => self.prefix(op),
            "+" | "-" if self.prev != Prev::Value => self.prefix(op),
            _ => {
                if op == "?" {
                    self.ternaries += 1;
                }
                self.append(op, true);
                self.prev = Prev::Binary;
            }
        }
    }

    fn prefix(&mut self, op: &str) {
        // `- -x` must not collapse into `--x`.
        let collides = self.prev == Prev::Prefix && op.chars().next().is_some_and(|c| self.line.ends_with(c));
        let space = self.space_before_operand() || collides;
        self.append(op, space);
        self.prev = Prev::Prefix;
    }

    fn can_end_statement(&self) -> bool {
        match self.prev {
            Prev::Value => true,
            Prev::Keyword => self
                .line
                .rsplit(' ')
                .next()
                .is_some_and(|word| TERMINAL_KEYWORDS.contains(&word)),
            _ => false,
        }
    }

    fn end_statement(&mut self, explicit: bool) {
        if self.line.is_empty() {
            return;
        }
        let mut text = std::mem::take(&mut self.line);
        if self.config.semicolons && (explicit || text != "}") {
            text.push(';');
        }
        for comment in self.trailing.drain(..) {
            text.push(' ');
            text.push_str(&comment);
        }
        self.writer.writeln(&text);
        self.prev = Prev::Start;
        self.depth = 0;
        self.ternaries = 0;
        self.line_open = true;
    }

    // ========================================================================
    // Token handlers
    // ========================================================================

    fn newline(&mut self) {
        self.newlines += 1;
        if !self.line.is_empty() && self.depth == 0 && self.can_end_statement() {
            self.end_statement(false);
        }
        self.line_open = false;
    }

    fn semicolon(&mut self) {
        if self.depth > 0 {
            self.append(";", false);
            self.prev = Prev::Comma;
            return;
        }
        self.end_statement(true);
        self.newlines = 0;
    }

    fn comment(&mut self, text: &str) {
        if !self.line.is_empty() {
            self.trailing.push(text.to_string());
            return;
        }
        if self.line_open {
            self.writer.append_to_last_line(&format!(" {text}"));
            return;
        }
        self.start_line();
        self.writer.writeln(text);
        self.newlines = 0;
        self.block_start = false;
    }

    fn open_brace(&mut self) {
        let inline = match self.prev {
            Prev::Binary => !self.line.ends_with("=>"),
            Prev::Open | Prev::OpenBrace | Prev::Comma | Prev::Colon | Prev::Prefix => true,
            Prev::Keyword => self.line.ends_with("return"),
            _ => false,
        };
        if inline {
            let space = self.space_before_operand();
            self.append("{", space);
            self.depth += 1;
            self.braces.push(Brace::Inline);
            self.prev = Prev::OpenBrace;
            return;
        }

        let mut text = if self.line.is_empty() {
            self.start_line();
            "{".to_string()
        } else {
            format!("{} {{", std::mem::take(&mut self.line))
        };
        for comment in self.trailing.drain(..) {
            text.push(' ');
            text.push_str(&comment);
        }
        self.writer.writeln(&text);
        self.writer.indent();
        self.braces.push(Brace::Block { depth: self.depth });
        self.depth = 0;
        self.ternaries = 0;
        self.prev = Prev::Start;
        self.newlines = 0;
        self.block_start = true;
        self.line_open = true;
    }

    fn close_brace(&mut self) {
        let depth = match self.braces.pop() {
            Some(Brace::Inline) => {
                let space = self.prev != Prev::OpenBrace;
                self.append("}", space);
                self.depth = self.depth.saturating_sub(1);
                self.prev = Prev::Value;
                return;
            }
            Some(Brace::Block { depth }) => depth,
            None => 0,
        };

        self.end_statement(false);
        self.writer.dedent();
        self.line = "}".to_string();
        self.depth = depth;
        self.prev = Prev::Value;
        self.newlines = 0;
        self.block_start = false;
        self.line_open = false;
    }
}

/// Re-quote a string literal with the preferred quote unless that would need more escaping.
fn requote(quote: char, body: &str, preferred: char) -> String {
    if quote == preferred || body.contains(preferred) {
        return format!("{quote}{body}{quote}");
    }
    let escaped = format!("\\{quote}");
    format!("{preferred}{}{preferred}", body.replace(&escaped, &quote.to_string()))
}
