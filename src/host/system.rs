//! The real process host.

use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process;

use super::Host;

/// [`Host`] backed by the operating system: real streams, real files, real exit.
#[derive(Debug, Default)]
pub struct SystemHost;

impl SystemHost {
    pub fn new() -> Self {
        Self
    }
}

impl Host for SystemHost {
    fn exit(&mut self, code: i32) {
        let _ = io::stdout().flush();
        process::exit(code);
    }

    fn write_stdout(&mut self, text: &str) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(text.as_bytes())?;
        stdout.flush()
    }

    fn write_stderr(&mut self, text: &str) -> io::Result<()> {
        io::stderr().lock().write_all(text.as_bytes())
    }

    fn write_file(&mut self, path: &Path, contents: &str) -> io::Result<()> {
        fs::write(path, contents)
    }

    fn read_stdin(&mut self) -> io::Result<String> {
        let mut input = String::new();
        io::stdin().lock().read_to_string(&mut input)?;
        Ok(input)
    }
}
