//! Shared helpers for `cargo-layercfg` integration tests.

use camino::Utf8PathBuf;
use std::error::Error;

/// Resolves the compiled `cargo-layercfg` binary path from test environment
/// variables.
///
/// # Errors
///
/// Returns an error when none of the supported cargo/nextest binary
/// environment variables are present.
pub(crate) fn cargo_layercfg_exe() -> Result<Utf8PathBuf, Box<dyn Error>> {
    let env_vars = [
        "CARGO_BIN_EXE_cargo-layercfg",
        "CARGO_BIN_EXE_cargo_layercfg",
        "NEXTEST_BIN_EXE_cargo-layercfg",
        "NEXTEST_BIN_EXE_cargo_layercfg",
    ];
    for var in env_vars {
        if let Ok(path) = std::env::var(var) {
            return Ok(Utf8PathBuf::from(path));
        }
    }
    Err("cargo-layercfg binary path not found in environment".into())
}

/// Directory of the checked-in fixture package.
pub(crate) fn fixture_package() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("tests")
        .join("fixtures")
        .join("layercfg_fixture")
}
