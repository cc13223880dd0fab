//! Filesystem helpers shared across `cargo-layercfg` modules.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::GenerateError;

/// Opens a directory if it exists, returning `None` when the path is missing.
pub fn open_optional_dir(path: &Utf8Path) -> Result<Option<Dir>, GenerateError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(GenerateError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

/// Reads a UTF-8 file, returning `None` when it or its directory is missing.
pub fn read_optional(path: &Utf8Path) -> Result<Option<String>, GenerateError> {
    let (Some(parent), Some(name)) = (path.parent(), path.file_name()) else {
        return Ok(None);
    };
    let Some(dir) = open_optional_dir(parent)? else {
        return Ok(None);
    };
    match dir.read_to_string(name) {
        Ok(text) => Ok(Some(text)),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(GenerateError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}
