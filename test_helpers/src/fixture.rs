//! Scratch Cargo packages for exercising the generator against real files.
//!
//! # Examples
//!
//! ```no_run
//! use layercfg_test_helpers::fixture::CrateFixture;
//!
//! let fixture = CrateFixture::new("demo").expect("create fixture");
//! fixture
//!     .write("src/settings/config.rs", "#![cfg(layercfg)]\nfn main() {}\n")
//!     .expect("write build script");
//! ```

use std::fs;

use anyhow::{Context, Result, anyhow};
use camino::{Utf8Path, Utf8PathBuf};
use tempfile::TempDir;

/// Absolute path of the workspace's `layercfg` runtime crate.
#[must_use]
pub fn layercfg_path() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .map_or_else(|| Utf8PathBuf::from(".."), Utf8Path::to_path_buf)
        .join("layercfg")
}

/// Renders a minimal library manifest that depends on the runtime crate.
#[must_use]
pub fn manifest(name: &str, extra: &str) -> String {
    format!(
        concat!(
            "[package]\n",
            "name = \"{name}\"\n",
            "version = \"0.1.0\"\n",
            "edition = \"2021\"\n",
            "publish = false\n",
            "\n",
            "[dependencies]\n",
            "layercfg = {{ path = {path:?} }}\n",
            "serde = {{ version = \"1\", features = [\"derive\"] }}\n",
            "{extra}",
        ),
        name = name,
        path = layercfg_path().as_str(),
        extra = extra,
    )
}

/// A temporary directory holding a Cargo package.
///
/// The directory and everything written into it is removed on drop.
#[derive(Debug)]
pub struct CrateFixture {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl CrateFixture {
    /// Creates a library package named `name` with an empty `src/lib.rs`.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory or files cannot be
    /// created.
    pub fn new(name: &str) -> Result<Self> {
        Self::with_manifest(&manifest(name, ""))
    }

    /// Creates a package from a complete `Cargo.toml` body.
    ///
    /// # Errors
    ///
    /// Returns an error when the temporary directory or files cannot be
    /// created.
    pub fn with_manifest(manifest_body: &str) -> Result<Self> {
        let dir = tempfile::tempdir().context("create temp dir")?;
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf())
            .map_err(|path| anyhow!("temp dir is not UTF-8: {}", path.display()))?;
        let fixture = Self { _dir: dir, root };
        fixture.write("Cargo.toml", manifest_body)?;
        fixture.write("src/lib.rs", "")?;
        Ok(fixture)
    }

    /// Root directory of the package.
    #[must_use]
    pub fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Absolute path of `relative` inside the package.
    #[must_use]
    pub fn path(&self, relative: &str) -> Utf8PathBuf {
        self.root.join(relative)
    }

    /// Writes `contents` to `relative`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns an error when a directory or the file cannot be written.
    pub fn write(&self, relative: &str, contents: &str) -> Result<Utf8PathBuf> {
        let path = self.path(relative);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| format!("create {parent}"))?;
        }
        fs::write(&path, contents).with_context(|| format!("write {path}"))?;
        Ok(path)
    }

    /// Reads `relative` as UTF-8 text.
    ///
    /// # Errors
    ///
    /// Returns an error when the file cannot be read.
    pub fn read(&self, relative: &str) -> Result<String> {
        let path = self.path(relative);
        fs::read_to_string(&path).with_context(|| format!("read {path}"))
    }

    /// Reports whether `relative` exists.
    #[must_use]
    pub fn exists(&self, relative: &str) -> bool {
        self.path(relative).exists()
    }
}
