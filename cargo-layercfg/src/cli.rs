//! Command-line interface definitions for `cargo-layercfg`.

use std::ffi::OsString;

use camino::Utf8PathBuf;
use clap::Parser;

/// Subcommand name Cargo passes as the first argument.
const SUBCOMMAND: &str = "layercfg";

/// Parsed CLI arguments for `cargo-layercfg`.
#[derive(Debug, Parser)]
#[command(name = "cargo-layercfg")]
#[command(about = "Generate layered configuration types from a gated config.rs")]
#[command(version)]
pub struct Args {
    /// Directory to search for the build script.
    #[arg(value_name = "dir", default_value = ".")]
    pub dir: Utf8PathBuf,
    /// Fail when any `build_configs` argument cannot be resolved.
    #[arg(long = "strict")]
    pub is_strict: bool,
    /// Log resolution details to stderr.
    #[arg(short = 'v', long = "verbose")]
    pub is_verbose: bool,
}

impl Args {
    /// Parses arguments, dropping the subcommand name Cargo inserts when the
    /// tool runs as `cargo layercfg`.
    pub fn parse_from_env() -> Self {
        Self::parse_from(strip_subcommand(std::env::args_os()))
    }

    /// Strict override for the library: `Some(true)` when requested,
    /// otherwise deferred to package metadata.
    pub const fn strict(&self) -> Option<bool> {
        if self.is_strict { Some(true) } else { None }
    }
}

fn strip_subcommand(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut collected: Vec<OsString> = args.into_iter().collect();
    if collected.get(1).is_some_and(|arg| arg == SUBCOMMAND) {
        collected.remove(1);
    }
    collected
}
