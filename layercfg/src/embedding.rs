//! The loader marker embedded into generated configuration types.

use std::io::Write;

use camino::{Utf8Path, Utf8PathBuf};
use figment::Figment;
use figment::providers::Serialized;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::echo::{self, Format};
use crate::env;
use crate::file::load_config_file;
use crate::option::ConfigOption;
use crate::{LayerError, LayerResult, normalize_prefix};

/// Separator between nested keys in environment variable names.
pub(crate) const ENV_NESTING: &str = "__";

/// Loader state embedded as the first field of every generated `Config`.
///
/// Generated code marks the field `#[serde(skip)]`; it records the options
/// the configuration was initialized with so that [`Embedded::echo`] can
/// mirror the environment binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Embedding {
    env_prefix: Option<String>,
    file_path: Option<Utf8PathBuf>,
}

impl Embedding {
    /// Normalized environment prefix applied by the last initialization.
    #[must_use]
    pub fn env_prefix(&self) -> Option<&str> {
        self.env_prefix.as_deref()
    }

    /// Configuration file read by the last initialization.
    #[must_use]
    pub fn file_path(&self) -> Option<&Utf8Path> {
        self.file_path.as_deref()
    }

    fn apply(&mut self, option: ConfigOption) {
        match option {
            ConfigOption::ConfigFile(path) => self.file_path = Some(path),
            ConfigOption::EnvPrefix(prefix) => {
                let normalized = normalize_prefix(&prefix);
                self.env_prefix = (!normalized.is_empty()).then_some(normalized);
            }
        }
    }

    /// Binds the process environment against the serialized `defaults`.
    fn env_layer(&self, defaults: &serde_json::Value) -> Serialized<serde_json::Value> {
        let tree = env::bind(
            std::env::vars_os().filter_map(|(name, value)| {
                Some((name.into_string().ok()?, value.into_string().ok()?))
            }),
            self.env_prefix.as_deref(),
            defaults,
        );
        Serialized::defaults(serde_json::Value::Object(tree))
    }

    /// Layers the configured sources over the current value of `config`.
    ///
    /// The current value supplies the defaults, usually the generated
    /// `Config::new_default()`. The configuration file (when set) is merged
    /// over the defaults and environment variables are merged last, so they
    /// take precedence. On success the options are recorded in the embedded
    /// marker of `config`; on failure `config` is left untouched.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] when the configuration file cannot be read or
    /// parsed, or when the merged sources cannot be extracted into `T`.
    pub fn init<T, I>(config: &mut T, opts: I) -> LayerResult<()>
    where
        T: Embedded,
        I: IntoIterator<Item = ConfigOption>,
    {
        let mut embedding = config.embedding().clone();
        for opt in opts {
            embedding.apply(opt);
        }

        tracing::debug!(
            file = ?embedding.file_path,
            env_prefix = ?embedding.env_prefix,
            "layering configuration sources"
        );

        let defaults = serde_json::to_value(&*config).map_err(|err| LayerError::Serialize {
            format: Format::Json,
            message: err.to_string(),
        })?;
        let mut figment = Figment::from(Serialized::defaults(&defaults));
        if let Some(path) = embedding.file_path.as_deref() {
            figment = figment.merge(load_config_file(path)?);
        }
        figment = figment.merge(embedding.env_layer(&defaults));

        let mut loaded: T = figment
            .extract()
            .map_err(|err| LayerError::Gathering(Box::new(err)))?;
        *loaded.embedding_mut() = embedding;
        *config = loaded;
        Ok(())
    }
}

/// Implemented by configuration types that embed an [`Embedding`].
///
/// `cargo-layercfg` emits this implementation for every generated `Config`.
pub trait Embedded: Serialize + DeserializeOwned {
    /// Shared access to the embedded loader state.
    fn embedding(&self) -> &Embedding;

    /// Exclusive access to the embedded loader state.
    fn embedding_mut(&mut self) -> &mut Embedding;

    /// Writes the live configuration to `writer` in `format`.
    ///
    /// The `env` format prints one `KEY=value` line per leaf value, using the
    /// same names [`Embedding::init`] binds.
    ///
    /// # Errors
    ///
    /// Returns a [`LayerError`] when serialization or writing fails.
    fn echo<W: Write>(&self, writer: W, format: Format) -> LayerResult<()>
    where
        Self: Sized,
    {
        echo::write(self, self.embedding().env_prefix(), writer, format)
    }
}
