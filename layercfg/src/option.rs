//! Options accepted by [`Embedding::init`](crate::Embedding::init).

use camino::Utf8PathBuf;

/// A single initialization option.
///
/// Construct values with [`with_config_file`] and [`with_env_prefix`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigOption {
    /// Layer a configuration file over the defaults. The parser is chosen by
    /// extension: `toml`, `json`, `yaml` or `yml`.
    ConfigFile(Utf8PathBuf),
    /// Only bind environment variables starting with this prefix.
    EnvPrefix(String),
}

/// Reads the configuration file at `path` during initialization.
///
/// A missing or unparsable file makes [`Embedding::init`](crate::Embedding::init)
/// fail.
#[must_use]
pub fn with_config_file(path: impl Into<Utf8PathBuf>) -> ConfigOption {
    ConfigOption::ConfigFile(path.into())
}

/// Binds environment variables named `PREFIX_SECTION__FIELD`.
///
/// Trailing underscores are ignored and the prefix is matched in upper case,
/// so `app`, `APP` and `APP_` are equivalent.
#[must_use]
pub fn with_env_prefix(prefix: impl Into<String>) -> ConfigOption {
    ConfigOption::EnvPrefix(prefix.into())
}
