//! Assertion helper for harnessed invocations
//!
//! [`Invocation::test`] checks the four result fields as independent cases named `(status)`, `(stdout)`,
//! `(stderr)` and `(write)`. A field with an explicit expectation is compared for equality. A field without one is
//! compared against an insta snapshot `tests/snapshots/<case>@<field>.snap`, where `<case>` is derived from the
//! directory, arguments and options unless [`Expect::named`] overrides it. A missing snapshot is recorded from the
//! current value and the case passes. Invocations in an absolute directory must be named to use snapshots.
//!
//! Every case runs even when an earlier one fails. The helper then panics once, listing the failed cases.
//! Stdout and stderr have ANSI styling stripped before either kind of comparison.

use std::fmt::Write as _;
use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

use super::{FileWrite, Invocation, InvocationOptions, strip_ansi};

const SNAPSHOT_DIR: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/snapshots");

/// Expected exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Code(i32),
    /// Anything but 0.
    NonZero,
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        Status::Code(code)
    }
}

/// Expectations for [`Invocation::test`]. Unset fields fall back to snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Expect {
    name: Option<String>,
    snapshot_dir: Option<PathBuf>,
    status: Option<Status>,
    stdout: Option<String>,
    stderr: Option<String>,
    write: Option<Vec<FileWrite>>,
}

impl Expect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `name` instead of the derived case name for snapshots.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Keep snapshots in `dir` instead of `tests/snapshots`.
    pub fn snapshot_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.snapshot_dir = Some(dir.into());
        self
    }

    pub fn status(mut self, status: impl Into<Status>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn non_zero(self) -> Self {
        self.status(Status::NonZero)
    }

    pub fn stdout(mut self, stdout: impl Into<String>) -> Self {
        self.stdout = Some(stdout.into());
        self
    }

    pub fn stderr(mut self, stderr: impl Into<String>) -> Self {
        self.stderr = Some(stderr.into());
        self
    }

    pub fn write(mut self, write: Vec<FileWrite>) -> Self {
        self.write = Some(write);
        self
    }
}

impl Invocation {
    /// Check every field of the result against `expect`, panicking if any case fails.
    pub fn test(&self, expect: Expect) {
        let derived = case_name(&self.directory().to_string_lossy(), self.args(), self.options());
        // A derived name for an absolute directory would differ on every machine.
        let baseline_case = match &expect.name {
            Some(name) => Some(name.clone()),
            None if self.directory().is_absolute() => None,
            None => Some(derived.clone()),
        };
        let case = expect.name.clone().unwrap_or(derived);
        let snapshot_dir = expect.snapshot_dir.as_deref().unwrap_or(Path::new(SNAPSHOT_DIR));
        let baseline = |field: &str, value: &str| match &baseline_case {
            Some(name) => assert_baseline(snapshot_dir, name, field, value),
            None => panic!(
                "{case} ({field}): no snapshot name for absolute directory {}, use Expect::named",
                self.directory().display()
            ),
        };
        let status = self.status;
        let stdout = strip_ansi(&self.stdout);
        let stderr = strip_ansi(&self.stderr);

        let mut failed = Vec::new();

        check(&mut failed, "status", || match expect.status {
            Some(Status::NonZero) => assert_ne!(status, 0, "{case} (status): expected a non-zero status"),
            Some(Status::Code(code)) => assert_eq!(status, code, "{case} (status)"),
            None => baseline("status", &status.to_string()),
        });

        check(&mut failed, "stdout", || match &expect.stdout {
            Some(expected) => assert_eq!(&*stdout, expected.as_str(), "{case} (stdout)"),
            None => baseline("stdout", &stdout),
        });

        check(&mut failed, "stderr", || match &expect.stderr {
            Some(expected) => assert_eq!(&*stderr, expected.as_str(), "{case} (stderr)"),
            None => baseline("stderr", &stderr),
        });

        check(&mut failed, "write", || match &expect.write {
            Some(expected) => assert_eq!(&self.write, expected, "{case} (write)"),
            None => baseline("write", &render_writes(&self.write)),
        });

        if !failed.is_empty() {
            panic!("{case}: failed cases {}", failed.join(" "));
        }
    }
}

fn check(failed: &mut Vec<String>, field: &str, assertion: impl FnOnce()) {
    if panic::catch_unwind(AssertUnwindSafe(assertion)).is_err() {
        failed.push(format!("({field})"));
    }
}

/// Compare `value` with the `<case>@<field>` snapshot in `dir`, recording it first if it does not exist yet.
fn assert_baseline(dir: &Path, case: &str, field: &str, value: &str) {
    let path = dir.join(format!("{case}@{field}.snap"));
    if !path.exists() {
        fs::create_dir_all(dir).unwrap_or_else(|err| panic!("cannot create {}: {err}", dir.display()));
        fs::write(&path, format!("---\nsource: src/harness/expect.rs\n---\n{value}\n"))
            .unwrap_or_else(|err| panic!("cannot record {}: {err}", path.display()));
        tracing::info!(snapshot = %path.display(), "recorded new baseline");
        return;
    }

    let mut settings = insta::Settings::clone_current();
    settings.set_snapshot_path(dir);
    settings.set_prepend_module_to_snapshot(false);
    settings.set_omit_expression(true);
    settings.set_snapshot_suffix(field);
    settings.bind(|| insta::assert_snapshot!(case, value));
}

/// Derive a snapshot case name from the directory, arguments and options: `fixtures/bad-syntax` + `broken.js` becomes
/// `fixtures_bad_syntax_broken_js`. Terminal flags add `tty`/`stdout_tty` and an input adds `input_<hash>`.
pub(crate) fn case_name(directory: &str, args: &[String], options: &InvocationOptions) -> String {
    let mut name = String::new();
    let parts = std::iter::once(directory).chain(args.iter().map(String::as_str));
    for part in parts {
        for c in part.chars() {
            if c.is_ascii_alphanumeric() {
                name.push(c.to_ascii_lowercase());
            } else if !name.is_empty() && !name.ends_with('_') {
                name.push('_');
            }
        }
        if !name.is_empty() && !name.ends_with('_') {
            name.push('_');
        }
    }
    let mut name = name.trim_end_matches('_').to_string();
    if name.is_empty() {
        name.push_str("default");
    }
    if options.is_tty {
        name.push_str("_tty");
    }
    if options.stdout_is_tty {
        name.push_str("_stdout_tty");
    }
    if let Some(input) = &options.input {
        let _ = write!(name, "_input_{:08x}", fnv1a(input.as_bytes()) as u32);
    }
    name
}

/// 64-bit FNV-1a, stable across platforms and releases.
fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0000_0100_0000_01b3)
    })
}

/// Writes rendered for a text snapshot: a `== filename` header followed by the content.
fn render_writes(writes: &[FileWrite]) -> String {
    let mut out = String::new();
    for write in writes {
        let _ = writeln!(out, "== {}", write.filename);
        out.push_str(&strip_ansi(&write.content));
        if !write.content.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}
