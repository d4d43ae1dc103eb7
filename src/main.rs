//! quill CLI entry point

use quill::host::{Host, SystemHost};

fn main() {
    // Initialize structured logging with env-based filter, defaulting to warn
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .try_init();

    let mut host = SystemHost::new();
    let code = match quill::cli::run(&mut host) {
        Ok(()) => host.exit_code().unwrap_or(0),
        Err(err) => {
            let _ = host.write_stderr(&format!("{err}\n"));
            1
        }
    };
    host.exit(code);
}
