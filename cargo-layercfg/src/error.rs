//! Error types for `cargo-layercfg`.

use std::fmt;

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::resolve::Skipped;

/// Errors that abort a generation run.
///
/// Arguments that cannot be resolved are not errors unless strict mode is
/// enabled; see [`crate::resolve::Resolution`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum GenerateError {
    /// `cargo metadata` could not describe the owning package.
    #[error("cargo metadata failed: {0}")]
    Metadata(#[from] cargo_metadata::Error),

    /// `package.metadata.layercfg` is malformed.
    #[error("failed to parse package.metadata.layercfg: {0}")]
    MetadataJson(#[from] serde_json::Error),

    /// No gated build script exists under the root directory.
    #[error("no module under {root} contains a gated config.rs")]
    ModuleNotFound {
        /// Directory that was searched.
        root: Utf8PathBuf,
    },

    /// More than one gated build script exists under the root directory.
    #[error(
        "multiple modules found containing config.rs under {root}: {}",
        join_paths(.candidates)
    )]
    AmbiguousModule {
        /// Directory that was searched.
        root: Utf8PathBuf,
        /// Every build script that was found.
        candidates: Vec<Utf8PathBuf>,
    },

    /// No Cargo package owns the module directory.
    #[error("no Cargo package owns {dir}")]
    ManifestNotFound {
        /// Directory of the build script.
        dir: Utf8PathBuf,
    },

    /// One or more source files failed to parse.
    #[error("{0}")]
    Diagnostics(Diagnostics),

    /// The entry point has an empty body.
    #[error("invalid `main` function body in {path}")]
    InvalidEntryPoint {
        /// Build script declaring the entry point.
        path: Utf8PathBuf,
    },

    /// An import names a crate or module outside the dependency set.
    #[error("imported path `{path}` not found")]
    ImportNotFound {
        /// The imported path as written.
        path: String,
    },

    /// Strict mode is enabled and some arguments were skipped.
    #[error("unresolved build_configs arguments:\n{}", join_skipped(.0))]
    UnresolvedArguments(Vec<Skipped>),

    /// Two sections derive the same aggregate field.
    #[error("sections `{first}` and `{second}` both map to field `{field}`")]
    DuplicateSection {
        /// Section that claimed the field first.
        first: String,
        /// Section that collided with it.
        second: String,
        /// Field name both derive.
        field: String,
    },

    /// A section cannot be emitted under its own name.
    #[error("section `{0}` cannot be emitted: its name is reserved in the generated module")]
    ReservedSectionName(String),

    /// Writing the generated source into the buffer failed.
    #[error("failed to render generated source: {0}")]
    Render(#[from] fmt::Error),

    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path being accessed.
        path: Utf8PathBuf,
        /// Underlying failure.
        #[source]
        source: std::io::Error,
    },

    /// Several independent failures, reported together.
    #[error("multiple errors:\n{0}")]
    Aggregate(AggregatedErrors),
}

impl GenerateError {
    /// Joins `errors` into one error, unwrapping a single entry.
    ///
    /// Returns `None` when `errors` is empty.
    #[must_use]
    pub fn aggregate(mut errors: Vec<Self>) -> Option<Self> {
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(Self::Aggregate(AggregatedErrors(errors))),
        }
    }

    pub(crate) fn io(path: impl Into<Utf8PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let owned = path.into();
        move |source| Self::Io {
            path: owned,
            source,
        }
    }
}

fn join_paths(paths: &[Utf8PathBuf]) -> String {
    paths
        .iter()
        .map(Utf8PathBuf::as_path)
        .map(Utf8Path::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

fn join_skipped(skipped: &[Skipped]) -> String {
    skipped
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A single parse failure located in a source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// File that failed to parse.
    pub path: Utf8PathBuf,
    /// One-based line of the failure.
    pub line: usize,
    /// One-based column of the failure.
    pub column: usize,
    /// Parser message.
    pub message: String,
}

impl Diagnostic {
    /// Expands a `syn` error into one diagnostic per message.
    #[must_use]
    pub fn from_syn(path: &Utf8Path, err: &syn::Error) -> Vec<Self> {
        err.clone()
            .into_iter()
            .map(|single| {
                let start = single.span().start();
                Self {
                    path: path.to_path_buf(),
                    line: start.line,
                    column: start.column + 1,
                    message: single.to_string(),
                }
            })
            .collect()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}: {}",
            self.path, self.line, self.column, self.message
        )
    }
}

/// Parse failures collected across every file of a module.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// Wraps the collected diagnostics.
    #[must_use]
    pub const fn new(diagnostics: Vec<Diagnostic>) -> Self {
        Self(diagnostics)
    }

    /// Iterate over the contained diagnostics.
    #[must_use = "iterators should be consumed to inspect diagnostics"]
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.0.iter()
    }

    /// Number of diagnostics.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no diagnostics were collected.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, diagnostic) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{diagnostic}")?;
        }
        Ok(())
    }
}

/// Collection of [`GenerateError`]s produced by one stage.
#[derive(Debug, Default)]
pub struct AggregatedErrors(Vec<GenerateError>);

impl AggregatedErrors {
    /// Iterate over the contained errors.
    #[must_use = "iterators should be consumed to inspect errors"]
    pub fn iter(&self) -> impl Iterator<Item = &GenerateError> {
        self.0.iter()
    }

    /// Number of errors in the aggregation.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the aggregation is empty.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for AggregatedErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}: {e}", i + 1)?;
        }
        Ok(())
    }
}
