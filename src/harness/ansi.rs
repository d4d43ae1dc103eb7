//! ANSI escape stripping for captured output.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

// CSI and OSC sequences, including the single-byte C1 introducer.
static ANSI_ESCAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"[\x1B\x{9B}][\[\]()#;?]*(?:(?:(?:[a-zA-Z\d]*(?:;[-a-zA-Z\d/#&.:=?%@~_]*)*)?\x07)|(?:(?:\d{1,4}(?:;\d{0,4})*)?[\dA-PR-TZcf-ntqry=><~]))",
    )
    .expect("INVARIANT: ANSI escape pattern is valid")
});

/// Remove terminal color and styling sequences from `text`.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_ESCAPE.replace_all(text, "")
}
