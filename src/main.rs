//! taskline — CLI for the declarative command-tree engine.
//!
//! ## Commands
//!
//! - `taskline build <file>...` — merge documents and build the runtime
//!   tree, reporting the first validation failure if any.
//! - `taskline run --file <file>... <path> [-- extra args]` — build, resolve
//!   `<path>` (dot-separated) to a node, and run it.
//!
//! ## Quick Start
//!
//! ```bash
//! taskline build pipeline.yaml
//! taskline run --file pipeline.yaml build.compile -- --release
//! ```

use std::process::ExitCode;

use taskline::infrastructure::Config;

mod cli;

fn main() -> ExitCode {
    let config = Config::default();
    let level = if std::env::var("TASKLINE_DEBUG").is_ok() {
        "debug"
    } else {
        &config.log_level
    };
    taskline::infrastructure::init_logging(level);

    match cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            if std::env::var("TASKLINE_VERBOSE").is_ok() {
                eprintln!("{e:?}");
            }
            ExitCode::FAILURE
        }
    }
}
