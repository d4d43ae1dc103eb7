//! Formatting configuration for quill
//!
//! Defaults follow Prettier's conventions: 2-space indentation, double quotes, semicolons.

/// Formatting configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatConfig {
    /// Number of spaces per indentation level
    pub indent_width: usize,
    /// Preferred quote style for strings
    pub quote_style: QuoteStyle,
    /// Whether statements are terminated with `;`
    pub semicolons: bool,
}

/// Quote style for string literals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteStyle {
    Double,
    Single,
}

impl QuoteStyle {
    pub fn as_char(self) -> char {
        match self {
            QuoteStyle::Double => '"',
            QuoteStyle::Single => '\'',
        }
    }
}

impl Default for FormatConfig {
    fn default() -> Self {
        Self {
            indent_width: 2,
            quote_style: QuoteStyle::Double,
            semicolons: true,
        }
    }
}

impl FormatConfig {
    /// Create a new config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the indentation width
    pub fn with_indent_width(mut self, width: usize) -> Self {
        self.indent_width = width;
        self
    }

    /// Set the quote style
    pub fn with_quote_style(mut self, style: QuoteStyle) -> Self {
        self.quote_style = style;
        self
    }

    /// Enable or disable statement semicolons
    pub fn with_semicolons(mut self, semicolons: bool) -> Self {
        self.semicolons = semicolons;
        self
    }
}
