//! In-process invocation harness
//!
//! Runs the quill CLI (or any entry point speaking [`Host`]) inside the test process and records what it did:
//! exit status, stdout, stderr and the files it tried to write. Nothing reaches the real console or disk.
//!
//! ```ignore
//! use quill::harness::{self, Expect, InvocationOptions};
//!
//! harness::run(".", &["--version"], InvocationOptions::default()).test(Expect::new().status(0));
//! ```
//!
//! ## Isolation
//!
//! The process-wide ambient state (working directory, argv, exit-code flag, terminal flags) is snapshotted on entry
//! and restored by a drop guard on every exit path, panics included. Invocations hold a global lock for their whole
//! duration, so parallel test threads queue instead of observing each other's working directory.
//!
//! Relative directories are resolved against `<crate>/tests`, never against the process working directory.

mod ansi;
mod expect;

pub use ansi::strip_ansi;
pub use expect::{Expect, Status};

use std::any::Any;
use std::fmt::Display;
use std::io;
use std::ops::Deref;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::cli;
use crate::host::Host;
use crate::host::ambient::{self, AmbientSnapshot};

/// Directory that relative invocation directories are resolved against.
pub const HARNESS_ROOT: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests");

/// `argv[0]` of a harnessed invocation.
pub const LAUNCHER_PLACEHOLDER: &str = "path/to/launcher";
/// `argv[1]` of a harnessed invocation.
pub const PROGRAM_PLACEHOLDER: &str = "path/to/quill";

static INVOCATION_LOCK: Mutex<()> = Mutex::new(());

/// Serialize with harnessed invocations.
///
/// Tests that read or mutate ambient state themselves take this lock so they never overlap with an invocation.
/// A test that panicked while holding it does not poison it for the rest.
pub fn lock_ambient() -> MutexGuard<'static, ()> {
    INVOCATION_LOCK.lock().unwrap_or_else(PoisonError::into_inner)
}

// ============================================================================
// Options and results
// ============================================================================

/// How the simulated process is attached to the outside world.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationOptions {
    /// Standard input is a terminal.
    pub is_tty: bool,
    /// Standard output is a terminal.
    pub stdout_is_tty: bool,
    /// What reading standard input yields. Absent means empty.
    pub input: Option<String>,
}

impl InvocationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tty(mut self, is_tty: bool) -> Self {
        self.is_tty = is_tty;
        self
    }

    pub fn with_stdout_tty(mut self, stdout_is_tty: bool) -> Self {
        self.stdout_is_tty = stdout_is_tty;
        self
    }

    pub fn with_input(mut self, input: impl Into<String>) -> Self {
        self.input = Some(input.into());
        self
    }
}

/// A file write the target attempted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    pub filename: String,
    pub content: String,
}

impl FileWrite {
    pub fn new(filename: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
        }
    }
}

/// Everything one invocation produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedResult {
    pub status: i32,
    pub stdout: String,
    pub stderr: String,
    /// Attempted file writes, in order.
    pub write: Vec<FileWrite>,
}

/// The outcome of [`run`]: a [`CapturedResult`] plus the [`Invocation::test`] assertion helper.
#[derive(Debug, Clone)]
pub struct Invocation {
    directory: PathBuf,
    args: Vec<String>,
    options: InvocationOptions,
    result: CapturedResult,
}

impl Invocation {
    pub fn result(&self) -> &CapturedResult {
        &self.result
    }

    pub fn into_result(self) -> CapturedResult {
        self.result
    }

    /// Directory the invocation ran in, as given by the caller.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Arguments after the two placeholders.
    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn options(&self) -> &InvocationOptions {
        &self.options
    }
}

impl Deref for Invocation {
    type Target = CapturedResult;

    fn deref(&self) -> &CapturedResult {
        &self.result
    }
}

// ============================================================================
// Running
// ============================================================================

/// Run the quill CLI in-process in `directory` with `args`.
pub fn run(directory: impl AsRef<Path>, args: &[&str], options: InvocationOptions) -> Invocation {
    run_with(cli::run, directory, args, options)
}

/// Run an arbitrary entry point in-process.
///
/// An `Err` returned from `entry`, or a panic inside it, is reported as status 1 with the message appended to
/// stderr. It never propagates to the caller.
///
/// A panic is caught, but the process panic hook still runs first, so the default hook prints the panic message to
/// the real stderr. Install a quiet hook with [`std::panic::set_hook`] if that output is unwanted.
pub fn run_with<F, E>(entry: F, directory: impl AsRef<Path>, args: &[&str], options: InvocationOptions) -> Invocation
where
    F: FnOnce(&mut dyn Host) -> Result<(), E>,
    E: Display,
{
    let directory = directory.as_ref();
    let resolved = resolve_dir(directory);
    let argv = [LAUNCHER_PLACEHOLDER, PROGRAM_PLACEHOLDER]
        .into_iter()
        .chain(args.iter().copied())
        .map(String::from)
        .collect();

    tracing::debug!(dir = %resolved.display(), ?args, "starting invocation");

    let mut host = CaptureHost::new(options.input.clone());
    let (outcome, status) = {
        let _sandbox = Sandbox::enter(&resolved, argv, &options)
            .unwrap_or_else(|err| panic!("cannot enter {}: {err}", resolved.display()));
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry(&mut host)));
        // The exit-code flag is ambient, so it has to be read before the sandbox restores it.
        let status = host.requested_exit.or_else(|| host.exit_code()).unwrap_or(0);
        (outcome, status)
    };

    let failure = match outcome {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err.to_string()),
        Err(payload) => Some(panic_message(&*payload)),
    };

    let mut result = CapturedResult {
        status,
        stdout: host.stdout,
        stderr: host.stderr,
        write: host.writes,
    };
    if let Some(message) = failure {
        tracing::debug!(%message, "invocation failed");
        result.status = 1;
        result.stderr.push_str(&message);
    }

    tracing::debug!(status = result.status, writes = result.write.len(), "finished invocation");
    Invocation {
        directory: directory.to_path_buf(),
        args: args.iter().map(|arg| arg.to_string()).collect(),
        options,
        result,
    }
}

fn resolve_dir(directory: &Path) -> PathBuf {
    if directory.is_absolute() {
        directory.to_path_buf()
    } else {
        Path::new(HARNESS_ROOT).join(directory)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "entry point panicked".to_string()
    }
}

// ============================================================================
// Sandbox
// ============================================================================

/// Holds the invocation lock and puts the ambient state back when dropped.
struct Sandbox {
    snapshot: AmbientSnapshot,
    // Dropped after `Drop::drop` has restored the snapshot.
    _lock: MutexGuard<'static, ()>,
}

impl Sandbox {
    fn enter(dir: &Path, argv: Vec<String>, options: &InvocationOptions) -> io::Result<Self> {
        let lock = lock_ambient();
        let sandbox = Self {
            snapshot: ambient::snapshot()?,
            _lock: lock,
        };
        std::env::set_current_dir(dir)?;
        ambient::set_argv(argv);
        ambient::set_exit_code(None);
        ambient::set_stdin_is_tty(options.is_tty);
        ambient::set_stdout_is_tty(options.stdout_is_tty);
        Ok(sandbox)
    }
}

impl Drop for Sandbox {
    fn drop(&mut self) {
        if let Err(err) = ambient::restore(&self.snapshot) {
            tracing::warn!(error = %err, cwd = %self.snapshot.cwd.display(), "failed to restore working directory");
        }
    }
}

// ============================================================================
// Capture host
// ============================================================================

/// Records output and file writes instead of performing them.
#[derive(Debug, Default)]
struct CaptureHost {
    input: Option<String>,
    requested_exit: Option<i32>,
    stdout: String,
    stderr: String,
    writes: Vec<FileWrite>,
}

impl CaptureHost {
    fn new(input: Option<String>) -> Self {
        Self {
            input,
            ..Self::default()
        }
    }

    fn frozen(&self) -> bool {
        self.requested_exit.is_some()
    }
}

impl Host for CaptureHost {
    fn exit(&mut self, code: i32) {
        if !self.frozen() {
            self.requested_exit = Some(code);
        }
    }

    fn write_stdout(&mut self, text: &str) -> io::Result<()> {
        if !self.frozen() {
            self.stdout.push_str(text);
        }
        Ok(())
    }

    fn write_stderr(&mut self, text: &str) -> io::Result<()> {
        if !self.frozen() {
            self.stderr.push_str(text);
        }
        Ok(())
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        self.writes.push(FileWrite::new(path.display().to_string(), contents));
        Ok(())
    }

    fn read_stdin(&mut self) -> io::Result<String> {
        Ok(self.input.clone().unwrap_or_default())
    }
}
