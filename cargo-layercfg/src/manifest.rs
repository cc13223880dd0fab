//! Cargo metadata discovery for the crate that owns a build script.

use camino::{Utf8Path, Utf8PathBuf};
use cargo_metadata::{DependencyKind, MetadataCommand, Package};
use serde::Deserialize;

use crate::error::GenerateError;

/// Deserialised `package.metadata.layercfg` defaults.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct LayercfgMetadata {
    /// Promote skipped `build_configs` arguments to a hard failure.
    #[serde(default)]
    pub strict: bool,
}

/// A dependency as the owning crate refers to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    /// Name used in paths (`rename` or package name, `-` replaced by `_`).
    pub extern_name: String,
    /// Directory of a path dependency; `None` for registry and git sources.
    pub path: Option<Utf8PathBuf>,
}

/// Summary of a package relevant to symbol resolution.
#[derive(Debug, Clone)]
pub struct CrateInfo {
    /// Crate name as used in paths.
    pub ident: String,
    /// Directory containing the package manifest.
    pub root: Utf8PathBuf,
    /// Root source file of the library target, or of the binary when the
    /// package has no library.
    pub crate_root: Option<Utf8PathBuf>,
    /// Normal dependencies declared by the package.
    pub dependencies: Vec<DependencyInfo>,
    /// Generator defaults from the manifest.
    pub metadata: LayercfgMetadata,
}

impl CrateInfo {
    /// Looks up a dependency by the name used in paths.
    #[must_use]
    pub fn dependency(&self, extern_name: &str) -> Option<&DependencyInfo> {
        self.dependencies
            .iter()
            .find(|dep| dep.extern_name == extern_name)
    }
}

/// Finds the package owning `dir` by walking up to the nearest manifest that
/// declares a package.
///
/// # Errors
///
/// Returns [`GenerateError::ManifestNotFound`] when no ancestor holds a
/// package manifest, or the metadata errors of [`load_crate`].
pub fn locate_crate(dir: &Utf8Path) -> Result<CrateInfo, GenerateError> {
    for ancestor in dir.ancestors() {
        let manifest = ancestor.join("Cargo.toml");
        if !manifest.is_file() {
            continue;
        }
        if let Some(info) = load_crate(&manifest)? {
            return Ok(info);
        }
    }
    Err(GenerateError::ManifestNotFound {
        dir: dir.to_path_buf(),
    })
}

/// Loads the package declared by `manifest`.
///
/// Returns `Ok(None)` for virtual workspace manifests.
///
/// # Errors
///
/// Returns [`GenerateError::Metadata`] when `cargo metadata` fails and
/// [`GenerateError::MetadataJson`] when `package.metadata.layercfg` is
/// malformed.
pub fn load_crate(manifest: &Utf8Path) -> Result<Option<CrateInfo>, GenerateError> {
    let canonical = manifest
        .canonicalize_utf8()
        .map_err(GenerateError::io(manifest))?;
    let metadata = MetadataCommand::new()
        .manifest_path(&canonical)
        .no_deps()
        .exec()?;

    let Some(package) = metadata
        .packages
        .iter()
        .find(|package| package.manifest_path == canonical)
    else {
        tracing::debug!(manifest = %canonical, "manifest declares no package");
        return Ok(None);
    };

    Ok(Some(CrateInfo {
        ident: package.name.replace('-', "_"),
        root: canonical
            .parent()
            .map_or_else(|| canonical.clone(), Utf8Path::to_path_buf),
        crate_root: crate_root(package),
        dependencies: dependencies(package),
        metadata: parse_layercfg_metadata(package)?,
    }))
}

fn crate_root(package: &Package) -> Option<Utf8PathBuf> {
    let has_kind = |kind: &str| {
        package
            .targets
            .iter()
            .find(|target| target.kind.iter().any(|k| k == kind))
            .map(|target| target.src_path.clone())
    };
    has_kind("lib").or_else(|| has_kind("bin"))
}

fn dependencies(package: &Package) -> Vec<DependencyInfo> {
    package
        .dependencies
        .iter()
        .filter(|dep| dep.kind == DependencyKind::Normal)
        .map(|dep| DependencyInfo {
            extern_name: dep.rename.as_ref().unwrap_or(&dep.name).replace('-', "_"),
            path: dep.path.clone(),
        })
        .collect()
}

fn parse_layercfg_metadata(package: &Package) -> Result<LayercfgMetadata, GenerateError> {
    let Some(value) = package.metadata.get("layercfg") else {
        return Ok(LayercfgMetadata::default());
    };

    Ok(serde_json::from_value(value.clone())?)
}
