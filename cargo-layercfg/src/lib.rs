//! Library interface for `cargo-layercfg`.
//!
//! The generator finds the single `config.rs` gated by `#![cfg(layercfg)]`
//! under a directory, resolves the struct literals passed to
//! `layercfg::build_configs!` and writes `config_gen.rs` beside it. The
//! generated module declares a `Config` type with one field per section,
//! defaulting to the literal values from the build script.

pub mod case;
pub mod context;
pub mod emit;
pub mod error;
pub mod extract;
mod fs_helpers;
pub mod imports;
pub mod loader;
pub mod manifest;
pub mod output;
pub mod resolve;
pub mod source;
pub mod synth;

use camino::Utf8Path;

pub use context::{GenerateOptions, GenerationContext, Rendered};
pub use error::GenerateError;

/// Renders the generated module for the build script under `root` without
/// writing it.
///
/// # Errors
///
/// Returns the first fatal [`GenerateError`] of the pipeline.
pub fn render(root: &Utf8Path, options: GenerateOptions) -> Result<Rendered, GenerateError> {
    GenerationContext::load(root, options)?.render()
}

/// Renders the generated module for the build script under `root` and writes
/// it beside the script. Nothing is written when rendering fails.
///
/// # Errors
///
/// Returns the first fatal [`GenerateError`] of the pipeline, or
/// [`GenerateError::Io`] when the output cannot be written.
pub fn generate(root: &Utf8Path, options: GenerateOptions) -> Result<Rendered, GenerateError> {
    let rendered = render(root, options)?;
    output::write_generated(&rendered.output_path, &rendered.text)?;
    tracing::info!(
        path = %rendered.output_path,
        sections = rendered.aggregate.sections().count(),
        skipped = rendered.skipped.len(),
        "wrote generated configuration"
    );
    Ok(rendered)
}
