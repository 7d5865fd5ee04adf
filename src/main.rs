// ============================================================
// File: main.rs
// Author: Bob Jack
// Date: Sept 19, 2025 - Reworked Oct. 8, 2025
//
// Description:
//   Entry point for the B-tree index program. Resolves the
//   configuration, sets up logging, and hands stdin/stdout to
//   the command loop in `lib.rs`.
//
//   Replies are written to standard output and logs to standard
//   error, so automated black-box testing only sees replies.
//   Log verbosity follows `RUST_LOG` (default: warn).
// ============================================================
use std::io;
use std::process::ExitCode;

use btree_index::{repl_loop, Config, Session};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;


/// Entry point for the index REPL.
fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    // Load settings before anything touches the index
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "could not load configuration");
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut session = match Session::new(&config) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };
    info!(min_degree = config.min_degree, "index ready");

    // Hand off to the main command loop
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = repl_loop(&mut session, stdin.lock(), &mut stdout.lock()) {
        error!(error = %e, "command loop stopped on I/O error");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
