//! Errors raised while layering or echoing configuration.

use camino::Utf8PathBuf;
use figment::Error as FigmentError;
use thiserror::Error;

use crate::Format;

/// Errors that can occur while loading or echoing configuration.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LayerError {
    /// The configured file could not be read.
    #[error("failed to read configuration file '{path}': {source}")]
    Read {
        /// Path passed through [`crate::with_config_file`].
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The configured file has an extension no parser is registered for.
    #[error("unsupported configuration file format for '{path}'; expected toml, json, yaml or yml")]
    UnsupportedFile {
        /// Path passed through [`crate::with_config_file`].
        path: Utf8PathBuf,
    },

    /// The configured file failed to parse.
    #[error("Configuration file error in '{path}': {source}")]
    File {
        /// Path that triggered the failure.
        path: Utf8PathBuf,
        /// Underlying error reported by the format parser.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Error while gathering configuration from providers.
    #[error("Failed to gather configuration: {0}")]
    Gathering(#[from] Box<FigmentError>),

    /// The live configuration could not be serialized.
    #[error("failed to serialize configuration as {format}: {message}")]
    Serialize {
        /// Requested output format.
        format: Format,
        /// Serializer error message.
        message: String,
    },

    /// The requested echo format is not known.
    #[error("unknown format '{0}'; expected one of json, yaml, env")]
    UnknownFormat(String),

    /// Writing the rendered configuration failed.
    #[error("failed to write configuration: {0}")]
    Write(#[from] std::io::Error),
}

/// Result alias used throughout the runtime.
pub type LayerResult<T> = Result<T, LayerError>;

pub(crate) fn file_error(
    path: &camino::Utf8Path,
    err: impl Into<Box<dyn std::error::Error + Send + Sync>>,
) -> LayerError {
    LayerError::File {
        path: path.to_path_buf(),
        source: err.into(),
    }
}
