//! Process-wide ambient state
//!
//! Rust has no mutable `argv` or exit-code flag, so quill keeps its own copies here, seeded from the real process on
//! first use. The working directory is the real one (`std::env::current_dir`).
//!
//! [`snapshot`] and [`restore`] capture and reinstate all of it, which is what lets an in-process invocation leave no
//! trace behind.

use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::{LazyLock, Mutex, MutexGuard, PoisonError};

/// Ambient values other than the working directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambient {
    /// `[launcher, program, args...]`
    pub argv: Vec<String>,
    pub exit_code: Option<i32>,
    pub stdin_is_tty: bool,
    pub stdout_is_tty: bool,
}

impl Ambient {
    fn from_process() -> Self {
        // A native binary has no separate launcher, so the resolved executable fills that slot.
        let launcher = std::env::current_exe()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        let argv = std::iter::once(launcher)
            .chain(std::env::args_os().map(|arg| arg.to_string_lossy().into_owned()))
            .collect();
        Self {
            argv,
            exit_code: None,
            stdin_is_tty: io::stdin().is_terminal(),
            stdout_is_tty: io::stdout().is_terminal(),
        }
    }
}

static AMBIENT: LazyLock<Mutex<Ambient>> = LazyLock::new(|| Mutex::new(Ambient::from_process()));

fn state() -> MutexGuard<'static, Ambient> {
    AMBIENT.lock().unwrap_or_else(PoisonError::into_inner)
}

pub fn argv() -> Vec<String> {
    state().argv.clone()
}

pub fn set_argv(argv: Vec<String>) {
    state().argv = argv;
}

pub fn exit_code() -> Option<i32> {
    state().exit_code
}

pub fn set_exit_code(code: Option<i32>) {
    state().exit_code = code;
}

pub fn stdin_is_tty() -> bool {
    state().stdin_is_tty
}

pub fn set_stdin_is_tty(is_tty: bool) {
    state().stdin_is_tty = is_tty;
}

pub fn stdout_is_tty() -> bool {
    state().stdout_is_tty
}

pub fn set_stdout_is_tty(is_tty: bool) {
    state().stdout_is_tty = is_tty;
}

/// Everything [`restore`] needs to put the process back the way it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbientSnapshot {
    pub cwd: PathBuf,
    pub state: Ambient,
}

pub fn snapshot() -> io::Result<AmbientSnapshot> {
    Ok(AmbientSnapshot {
        cwd: std::env::current_dir()?,
        state: state().clone(),
    })
}

/// Reinstate a snapshot. The in-memory state is restored even if changing directory fails.
pub fn restore(snapshot: &AmbientSnapshot) -> io::Result<()> {
    *state() = snapshot.state.clone();
    std::env::set_current_dir(&snapshot.cwd)
}
