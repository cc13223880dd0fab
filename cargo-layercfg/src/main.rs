//! CLI entrypoint for `cargo-layercfg`.

mod cli;

use std::fmt;

use cargo_layercfg::{GenerateError, GenerateOptions, generate};
use tracing_subscriber::EnvFilter;

use crate::cli::Args;

/// Environment variable holding a `tracing` filter directive.
const LOG_ENV: &str = "LAYERCFG_LOG";

/// A failed run, reported on stderr when returned from `main`.
///
/// The standard library prints `main` errors with `Debug`, so this forwards
/// to the `Display` form of the wrapped error.
struct Failure(GenerateError);

impl fmt::Debug for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl From<GenerateError> for Failure {
    fn from(err: GenerateError) -> Self {
        Self(err)
    }
}

fn main() -> Result<(), Failure> {
    let args = Args::parse_from_env();
    init_tracing(args.is_verbose);
    run(&args)
}

fn run(args: &Args) -> Result<(), Failure> {
    let options = GenerateOptions {
        strict: args.strict(),
    };
    let rendered = generate(&args.dir, options)?;
    tracing::debug!(
        sections = rendered.aggregate.fields.len(),
        skipped = rendered.skipped.len(),
        "generation finished"
    );
    Ok(())
}

fn init_tracing(is_verbose: bool) {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(if is_verbose { "debug" } else { "warn" }));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
}
