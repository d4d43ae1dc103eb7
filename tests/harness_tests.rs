//! End-to-end tests for the quill CLI, driven in-process through the invocation harness
//!
//! Relative directories are resolved against `tests/`.

use std::fs;
use std::path::Path;

use quill::harness::{self, Expect, FileWrite, HARNESS_ROOT, InvocationOptions, Status};
use quill::host::Host;

const BROKEN_STDERR: &str = "[error] broken.js: SyntaxError: Unexpected token \")\" (1:14)\n\
                             [error] > 1 | const x = (1));\n\
                             [error]     |              ^\n";

const GREET_FORMATTED: &str = "function greet(name) {\n  return \"hi \" + name;\n}\n";

fn opts() -> InvocationOptions {
    InvocationOptions::default()
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_version_prints_to_stdout() {
    let invocation = harness::run(".", &["--version"], opts());
    assert!(invocation.stdout.contains(quill::version::QUILL_VERSION));
    invocation.test(Expect::new().stderr("").write(vec![]));
}

#[test]
fn test_syntax_error_reports_code_frame() {
    harness::run("fixtures/bad-syntax", &["broken.js"], opts()).test(
        Expect::new()
            .status(2)
            .stdout("")
            .stderr(BROKEN_STDERR)
            .write(vec![]),
    );
}

#[test]
fn test_syntax_error_status_is_non_zero() {
    let invocation = harness::run("fixtures/bad-syntax", &["broken.js"], opts());
    assert!(!invocation.stderr.is_empty());
    invocation.test(Expect::new().non_zero().stdout("").stderr(BROKEN_STDERR).write(vec![]));
}

#[test]
fn test_write_records_file_instead_of_touching_disk() {
    let path = Path::new(HARNESS_ROOT).join("fixtures/unformatted/file.js");
    let before = fs::read_to_string(&path).unwrap();

    harness::run("fixtures/unformatted", &["file.js", "--write"], opts()).test(
        Expect::new()
            .status(0)
            .stdout("file.js\n")
            .stderr("")
            .write(vec![FileWrite::new("file.js", GREET_FORMATTED)]),
    );

    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_stdin_input_is_formatted() {
    let options = opts().with_tty(true).with_input("const x=1");
    harness::run(".", &[], options).test(
        Expect::new()
            .status(0)
            .stdout("const x = 1;\n")
            .stderr("[warn] Reading from standard input; press Ctrl-D to finish\n")
            .write(vec![]),
    );
}

// =============================================================================
// CLI behavior
// =============================================================================

#[test]
fn test_explicit_stdin_flag_skips_terminal_hint() {
    let options = opts().with_tty(true).with_input("let a=[1,2]");
    harness::run(".", &["--stdin"], options).test(
        Expect::new()
            .status(0)
            .stdout("let a = [1, 2];\n")
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_stdin_without_input_prints_nothing() {
    harness::run(".", &[], opts()).test(Expect::new().status(0).stdout("").stderr("").write(vec![]));
}

#[test]
fn test_stdin_syntax_error() {
    let invocation = harness::run(".", &["--stdin"], opts().with_input("foo("));
    assert_eq!(invocation.status, 2);
    assert!(invocation.stderr.starts_with("[error] stdin: SyntaxError: Unexpected end of input"));
}

#[test]
fn test_formatted_file_goes_to_stdout() {
    harness::run("fixtures/unformatted", &["file.js"], opts()).test(
        Expect::new()
            .status(0)
            .stdout(GREET_FORMATTED)
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_write_leaves_formatted_file_alone() {
    harness::run("fixtures/formatted", &["--write", "clean.js"], opts()).test(
        Expect::new()
            .status(0)
            .stdout("clean.js\n")
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_list_different_flags_unformatted_files() {
    harness::run("fixtures/project", &["-l", "src"], opts()).test(
        Expect::new()
            .status(1)
            .stdout("src/a.js\nsrc/nested/c.js\n")
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_list_different_clean_file() {
    harness::run("fixtures/formatted", &["--list-different", "clean.js"], opts())
        .test(Expect::new().status(0).stdout("").stderr("").write(vec![]));
}

#[test]
fn test_directory_walk_skips_node_modules_and_other_files() {
    harness::run("fixtures/project", &["src"], opts()).test(
        Expect::new()
            .status(0)
            .stdout("export const a = 1;\nexport const b = 2;\nrun(c);\n")
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_write_over_directory() {
    let invocation = harness::run("fixtures/project", &["--write", "src"], opts());
    assert_eq!(
        invocation.write,
        vec![
            FileWrite::new("src/a.js", "export const a = 1;\n"),
            FileWrite::new("src/nested/c.js", "run(c);\n"),
        ]
    );
    assert_eq!(invocation.stdout, "src/a.js\nsrc/b.js\nsrc/nested/c.js\n");
}

#[test]
fn test_missing_path_is_reported() {
    harness::run(".", &["missing.js"], opts()).test(
        Expect::new()
            .status(2)
            .stdout("")
            .stderr("[error] No matching files. Patterns tried: \"missing.js\"\n")
            .write(vec![]),
    );
}

#[test]
fn test_missing_path_does_not_stop_other_files() {
    let invocation = harness::run("fixtures/unformatted", &["nope.js", "file.js"], opts());
    assert_eq!(invocation.status, 2);
    assert_eq!(invocation.stdout, GREET_FORMATTED);
    assert_eq!(invocation.stderr, "[error] No matching files for \"nope.js\"\n");
}

#[test]
fn test_unknown_flag_is_usage_error() {
    let invocation = harness::run(".", &["--frobnicate"], opts());
    assert_eq!(invocation.status, 2);
    assert!(invocation.stdout.is_empty());
    assert!(invocation.stderr.contains("--frobnicate"));
}

#[test]
fn test_help_goes_to_stdout() {
    let invocation = harness::run(".", &["--help"], opts());
    assert_eq!(invocation.status, 0);
    assert!(invocation.stdout.contains("--list-different"));
    assert!(invocation.stderr.is_empty());
}

#[test]
fn test_formatting_flags() {
    let options = opts().with_input("if(a){b('c')}");
    harness::run(".", &["--tab-width", "4", "--single-quote", "--no-semi"], options).test(
        Expect::new()
            .status(0)
            .stdout("if (a) {\n    b('c')\n}\n")
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_config_file_is_applied() {
    let options = opts().with_input("const s = \"hi\"");
    harness::run("fixtures/configured", &[], options.clone()).test(
        Expect::new()
            .status(0)
            .stdout("const s = 'hi'\n")
            .stderr("")
            .write(vec![]),
    );
    harness::run("fixtures/configured", &["--no-config"], options).test(
        Expect::new()
            .status(0)
            .stdout("const s = \"hi\";\n")
            .stderr("")
            .write(vec![]),
    );
}

#[test]
fn test_invalid_config_file() {
    let invocation = harness::run("fixtures/bad-config", &[], opts().with_input("x"));
    assert_eq!(invocation.status, 2);
    assert!(invocation.stdout.is_empty());
    assert!(
        invocation
            .stderr
            .starts_with("[error] Invalid configuration file .quillrc.toml: ")
    );
}

#[test]
fn test_color_only_with_terminal_stdout() {
    let plain = harness::run("fixtures/bad-syntax", &["broken.js"], opts());
    assert!(!plain.stderr.contains('\x1b'));

    let colored = harness::run("fixtures/bad-syntax", &["broken.js"], opts().with_stdout_tty(true));
    assert!(colored.stderr.contains("\x1b[31m"));
    // The helper strips styling, so the plain expectation still holds.
    colored.test(Expect::new().status(2).stdout("").stderr(BROKEN_STDERR).write(vec![]));
}

#[test]
fn test_write_prints_unchanged_files_grey_on_terminal() {
    let invocation = harness::run("fixtures/formatted", &["--write", "clean.js"], opts().with_stdout_tty(true));
    assert_eq!(invocation.stdout, "\x1b[90mclean.js\x1b[0m\n");
}

// =============================================================================
// Harness behavior
// =============================================================================

#[test]
fn test_identical_invocations_give_identical_results() {
    let first = harness::run("fixtures/unformatted", &["file.js", "--write"], opts()).into_result();
    let second = harness::run("fixtures/unformatted", &["file.js", "--write"], opts()).into_result();
    assert_eq!(first, second);
}

#[test]
fn test_entry_sees_placeholder_argv_and_directory() {
    let invocation = harness::run_with(
        |host: &mut dyn Host| -> std::io::Result<()> {
            let args = host.args().join(" ");
            let cwd = host.current_dir()?;
            host.write_stdout(&format!("{args}\n{}\n", cwd.display()))
        },
        "fixtures",
        &["a", "--b"],
        opts(),
    );
    let expected_dir = fs::canonicalize(Path::new(HARNESS_ROOT).join("fixtures")).unwrap();
    assert_eq!(
        invocation.stdout,
        format!("path/to/launcher path/to/quill a --b\n{}\n", expected_dir.display())
    );
}

#[test]
fn test_entry_sees_terminal_flags() {
    let entry = |host: &mut dyn Host| -> std::io::Result<()> {
        let flags = format!("{} {}", host.stdin_is_tty(), host.stdout_is_tty());
        host.write_stdout(&flags)
    };
    assert_eq!(harness::run_with(entry, ".", &[], opts()).stdout, "false false");
    let options = opts().with_tty(true).with_stdout_tty(true);
    assert_eq!(harness::run_with(entry, ".", &[], options).stdout, "true true");
}

#[test]
fn test_output_after_exit_is_dropped() {
    let invocation = harness::run_with(
        |host: &mut dyn Host| -> std::io::Result<()> {
            host.write_stdout("kept")?;
            host.exit(3);
            host.write_stdout("dropped")?;
            host.write_stderr("dropped")?;
            host.exit(4);
            Ok(())
        },
        ".",
        &[],
        opts(),
    );
    assert_eq!(invocation.status, 3);
    assert_eq!(invocation.stdout, "kept");
    assert_eq!(invocation.stderr, "");
}

#[test]
fn test_explicit_zero_exit_wins_over_flag() {
    let invocation = harness::run_with(
        |host: &mut dyn Host| -> std::io::Result<()> {
            host.set_exit_code(7);
            host.exit(0);
            Ok(())
        },
        ".",
        &[],
        opts(),
    );
    assert_eq!(invocation.status, 0);
}

#[test]
fn test_exit_code_flag_is_fallback() {
    let invocation = harness::run_with(
        |host: &mut dyn Host| -> std::io::Result<()> {
            host.set_exit_code(5);
            Ok(())
        },
        ".",
        &[],
        opts(),
    );
    assert_eq!(invocation.status, 5);
}

#[test]
fn test_exit_code_flag_does_not_carry_over() {
    harness::run_with(
        |host: &mut dyn Host| -> std::io::Result<()> {
            host.set_exit_code(9);
            Ok(())
        },
        ".",
        &[],
        opts(),
    );
    let invocation = harness::run_with(|_: &mut dyn Host| -> std::io::Result<()> { Ok(()) }, ".", &[], opts());
    assert_eq!(invocation.status, 0);
}

#[test]
fn test_panic_becomes_status_one() {
    let invocation = harness::run_with(
        |host: &mut dyn Host| -> std::io::Result<()> {
            host.write_stderr("before\n")?;
            panic!("kaboom");
        },
        ".",
        &[],
        opts(),
    );
    assert_eq!(invocation.status, 1);
    assert_eq!(invocation.stderr, "before\nkaboom");
}

#[test]
fn test_failure_message_is_appended_after_exit() {
    let invocation = harness::run_with(
        |host: &mut dyn Host| -> Result<(), String> {
            host.exit(0);
            Err("late failure".to_string())
        },
        ".",
        &[],
        opts(),
    );
    assert_eq!(invocation.status, 1);
    assert_eq!(invocation.stderr, "late failure");
}

#[test]
fn test_helper_reports_every_failed_case() {
    let invocation = harness::run(".", &["--version"], opts());
    let panic = std::panic::catch_unwind(|| {
        invocation.test(
            Expect::new()
                .status(Status::NonZero)
                .stdout("nope")
                .stderr("")
                .write(vec![]),
        )
    })
    .unwrap_err();
    let message = panic.downcast_ref::<String>().unwrap();
    assert_eq!(message, "version: failed cases (status) (stdout)");
}

#[test]
fn test_failure_message_is_appended_verbatim() {
    let invocation = harness::run_with(
        |_: &mut dyn Host| -> Result<(), String> { Err("two\nlines\n".to_string()) },
        ".",
        &[],
        opts(),
    );
    assert_eq!(invocation.stderr, "two\nlines\n");
}

#[test]
fn test_missing_baseline_is_created_on_first_run() {
    let snapshots = tempfile::tempdir().unwrap();
    let expect = Expect::new()
        .named("fresh")
        .snapshot_dir(snapshots.path())
        .stderr("")
        .write(vec![]);

    harness::run(".", &["--version"], opts()).test(expect.clone());
    let status = snapshots.path().join("fresh@status.snap");
    let stdout = snapshots.path().join("fresh@stdout.snap");
    assert!(status.exists());
    assert!(fs::read_to_string(&stdout).unwrap().contains(quill::version::QUILL_VERSION));
    assert!(!snapshots.path().join("fresh@stderr.snap").exists());

    // The second run compares against what the first one recorded.
    harness::run(".", &["--version"], opts()).test(expect);
}

#[test]
fn test_stdin_runs_differing_only_in_input_get_separate_baselines() {
    let snapshots = tempfile::tempdir().unwrap();
    let expect = Expect::new().snapshot_dir(snapshots.path()).status(0).stderr("").write(vec![]);

    harness::run(".", &["--stdin"], opts().with_input("a=1")).test(expect.clone());
    harness::run(".", &["--stdin"], opts().with_input("b=2")).test(expect.clone());

    let mut names: Vec<_> = fs::read_dir(snapshots.path())
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    assert_eq!(names.len(), 2, "{names:?}");
    assert!(names.iter().all(|name| name.starts_with("stdin_input_") && name.ends_with("@stdout.snap")));

    // Each recorded baseline still matches its own input.
    harness::run(".", &["--stdin"], opts().with_input("b=2")).test(expect.clone());
    harness::run(".", &["--stdin"], opts().with_input("a=1")).test(expect);
}

#[test]
fn test_absolute_directory_needs_a_snapshot_name() {
    let dir = tempfile::tempdir().unwrap();
    let snapshots = tempfile::tempdir().unwrap();
    let invocation = harness::run(dir.path(), &["--version"], opts());

    let panic = std::panic::catch_unwind(|| {
        invocation.test(Expect::new().snapshot_dir(snapshots.path()).stderr("").write(vec![]))
    })
    .unwrap_err();
    let message = panic.downcast_ref::<String>().unwrap();
    assert!(message.ends_with("failed cases (status) (stdout)"), "{message}");
    assert_eq!(fs::read_dir(snapshots.path()).unwrap().count(), 0);

    invocation.test(
        Expect::new()
            .named("absolute_version")
            .snapshot_dir(snapshots.path())
            .stderr("")
            .write(vec![]),
    );
    assert!(snapshots.path().join("absolute_version@stdout.snap").exists());
}
