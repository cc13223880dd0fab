//! Runtime support for configuration types generated by `cargo-layercfg`.
//!
//! A generated `Config` embeds an [`Embedding`] as its first field and
//! implements [`Embedded`]. [`Embedding::init`] layers an optional
//! configuration file and environment variables over the generated defaults,
//! and [`Embedded::echo`] renders the live value in one of the supported
//! [`Format`]s.
//!
//! Build scripts name their sections with [`build_configs!`]; the
//! [`presets`] module offers ready-made sections for common services.

mod echo;
mod embedding;
mod env;
mod error;
mod file;
mod option;
pub mod presets;

pub use echo::Format;
pub use embedding::{Embedded, Embedding};
pub use error::{LayerError, LayerResult};
pub use option::{ConfigOption, with_config_file, with_env_prefix};

/// Name of the `cfg` flag that gates build scripts read by `cargo-layercfg`.
///
/// Build scripts start with `#![cfg(layercfg)]`; generated files start with
/// the complementary `#![cfg(not(layercfg))]`.
pub const BUILD_CFG: &str = "layercfg";

/// Normalize an environment prefix by trimming trailing underscores and
/// converting to uppercase ASCII.
///
/// # Examples
///
/// ```
/// assert_eq!(layercfg::normalize_prefix("app__"), "APP");
/// ```
#[must_use]
pub fn normalize_prefix(prefix: &str) -> String {
    prefix.trim_end_matches('_').to_ascii_uppercase()
}

/// Declares the sections merged into the generated `Config`.
///
/// `cargo-layercfg` reads the arguments of this macro from the syntax tree of
/// the gated build script, so the script itself is never compiled into the
/// crate. Expanding the macro evaluates and drops each argument.
///
/// ```
/// use layercfg::presets::HttpServerConfig;
///
/// layercfg::build_configs!(HttpServerConfig {
///     host: "localhost".to_owned(),
///     port: "8080".to_owned(),
/// });
/// ```
#[macro_export]
macro_rules! build_configs {
    ($($section:expr),* $(,)?) => {{
        $( ::core::mem::drop($section); )*
    }};
}
