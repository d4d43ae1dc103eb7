//! CLI command implementations
//!
//! Each command formats its inputs, reports per-file problems through the [`Logger`] and returns the exit code the
//! run should end with. Problems with one file never stop the others.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use super::{CliError, CliResult, ExitCode, Logger};
use crate::format::{FormatConfig, SyntaxError, format_source_with_config};
use crate::host::Host;

/// Extension of the files picked up when walking a directory.
pub const SOURCE_EXTENSION: &str = "js";

/// What to do with each formatted file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Mode {
    /// Write formatted output back to the file.
    pub write: bool,
    /// Print the names of files whose formatting differs.
    pub list_different: bool,
}

/// Format standard input and print the result to stdout.
pub fn format_stdin(host: &mut dyn Host, logger: &Logger, config: &FormatConfig) -> CliResult<ExitCode> {
    let source = host.read_stdin()?;
    match format_source_with_config(&source, config) {
        Ok(formatted) => {
            host.write_stdout(&formatted)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            report_syntax_error(host, logger, "stdin", &source, &err)?;
            Ok(ExitCode::INVALID)
        }
    }
}

/// Format every file named by `patterns` (files, or directories walked for source files).
pub fn format_paths(
    host: &mut dyn Host,
    logger: &Logger,
    config: &FormatConfig,
    patterns: &[PathBuf],
    mode: Mode,
) -> CliResult<ExitCode> {
    let (files, unmatched) = expand_patterns(patterns);
    if files.is_empty() {
        let tried = patterns
            .iter()
            .map(|p| format!("\"{}\"", p.display()))
            .collect::<Vec<_>>()
            .join(", ");
        return Err(CliError::new(
            format!("No matching files. Patterns tried: {tried}"),
            ExitCode::INVALID,
        ));
    }

    let mut exit_code = ExitCode::SUCCESS;
    for pattern in unmatched {
        logger.error(host, &format!("No matching files for \"{}\"", pattern.display()))?;
        exit_code = exit_code.max(ExitCode::INVALID);
    }

    for file in &files {
        exit_code = exit_code.max(format_file(host, logger, config, file, mode)?);
    }
    Ok(exit_code)
}

fn format_file(
    host: &mut dyn Host,
    logger: &Logger,
    config: &FormatConfig,
    file: &Path,
    mode: Mode,
) -> io::Result<ExitCode> {
    let name = file.display().to_string();

    let source = match fs::read_to_string(file) {
        Ok(source) => source,
        Err(err) => {
            logger.error(host, &format!("Unable to read file: {name}\n{err}"))?;
            return Ok(ExitCode::INVALID);
        }
    };

    let formatted = match format_source_with_config(&source, config) {
        Ok(formatted) => formatted,
        Err(err) => {
            report_syntax_error(host, logger, &name, &source, &err)?;
            return Ok(ExitCode::INVALID);
        }
    };

    let changed = formatted != source;
    tracing::debug!(file = %name, changed, "formatted file");

    let mut exit_code = ExitCode::SUCCESS;
    if mode.list_different && changed {
        logger.info(host, &name)?;
        exit_code = ExitCode::FAILURE;
    }

    if mode.write {
        if changed {
            if let Err(err) = host.write_file(file, &formatted) {
                logger.error(host, &format!("Unable to write file: {name}\n{err}"))?;
                return Ok(ExitCode::INVALID);
            }
            if !mode.list_different {
                logger.info(host, &name)?;
            }
        } else if !mode.list_different {
            logger.info(host, &logger.grey(&name))?;
        }
    } else if !mode.list_different {
        host.write_stdout(&formatted)?;
    }

    Ok(exit_code)
}

/// Log a syntax error as `<name>: SyntaxError: <message> (<line>:<column>)` followed by a code frame.
fn report_syntax_error(
    host: &mut dyn Host,
    logger: &Logger,
    name: &str,
    source: &str,
    err: &SyntaxError,
) -> io::Result<()> {
    let frame = err.code_frame(source, logger.color());
    logger.error(host, &format!("{name}: SyntaxError: {err}\n{frame}"))
}

/// Split `patterns` into the files they name and the patterns that matched nothing.
///
/// Explicit files are taken as-is whatever their extension. Directories contribute their source files in sorted
/// order.
fn expand_patterns(patterns: &[PathBuf]) -> (Vec<PathBuf>, Vec<&PathBuf>) {
    let mut files = Vec::new();
    let mut unmatched = Vec::new();

    for pattern in patterns {
        if pattern.is_file() {
            files.push(pattern.clone());
        } else if pattern.is_dir() {
            let mut found = collect_source_files(pattern);
            if found.is_empty() {
                unmatched.push(pattern);
            }
            found.sort();
            files.extend(found);
        } else {
            unmatched.push(pattern);
        }
    }

    (files, unmatched)
}

fn collect_source_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();

    if let Ok(entries) = fs::read_dir(dir) {
        for entry in entries.flatten() {
            let entry_path = entry.path();
            if entry_path.is_dir() {
                let name = entry_path.file_name().and_then(|n| n.to_str()).unwrap_or("");
                if !name.starts_with('.') && name != "node_modules" {
                    files.extend(collect_source_files(&entry_path));
                }
            } else if entry_path.extension().is_some_and(|ext| ext == SOURCE_EXTENSION) {
                files.push(entry_path);
            }
        }
    }

    files
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_source_files_skips_hidden_and_node_modules() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("src/nested")).unwrap();
        fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        fs::create_dir_all(root.join(".cache")).unwrap();
        fs::write(root.join("src/a.js"), "a").unwrap();
        fs::write(root.join("src/nested/b.js"), "b").unwrap();
        fs::write(root.join("src/notes.txt"), "n").unwrap();
        fs::write(root.join("node_modules/pkg/index.js"), "x").unwrap();
        fs::write(root.join(".cache/c.js"), "c").unwrap();

        let mut found = collect_source_files(root);
        found.sort();
        assert_eq!(found, vec![root.join("src/a.js"), root.join("src/nested/b.js")]);
    }

    #[test]
    fn test_expand_patterns_reports_unmatched() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("style.css");
        fs::write(&file, "").unwrap();
        let missing = dir.path().join("missing.js");
        let empty = dir.path().join("empty");
        fs::create_dir(&empty).unwrap();

        let patterns = vec![file.clone(), missing.clone(), empty.clone()];
        let (files, unmatched) = expand_patterns(&patterns);
        assert_eq!(files, vec![file]);
        assert_eq!(unmatched, vec![&missing, &empty]);
    }
}
