//! Output writer for `cargo-layercfg`.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, OpenOptions};
use std::io::Write;

use crate::error::GenerateError;

/// Writes the generated module, replacing any previous output.
///
/// # Errors
///
/// Returns [`GenerateError::Io`] when the directory cannot be opened or the
/// file cannot be written.
pub fn write_generated(path: &Utf8Path, contents: &str) -> Result<(), GenerateError> {
    let (Some(parent), Some(file_name)) = (path.parent(), path.file_name()) else {
        return Err(GenerateError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::from(std::io::ErrorKind::InvalidInput),
        });
    };
    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|io_err| {
        GenerateError::Io {
            path: parent.to_path_buf(),
            source: io_err,
        }
    })?;
    let mut file = dir
        .open_with(
            file_name,
            OpenOptions::new().write(true).create(true).truncate(true),
        )
        .map_err(|io_err| GenerateError::Io {
            path: path.to_path_buf(),
            source: io_err,
        })?;
    file.write_all(contents.as_bytes())
        .map_err(|io_err| GenerateError::Io {
            path: path.to_path_buf(),
            source: io_err,
        })
}

#[cfg(test)]
mod tests {
    //! Tests for the output writer.

    use super::*;
    use camino::Utf8PathBuf;
    use rstest::rstest;

    #[rstest]
    fn replaces_previous_output() {
        let tempdir = tempfile::tempdir().expect("create temp dir");
        let root = Utf8PathBuf::from_path_buf(tempdir.path().to_path_buf())
            .expect("tempdir path is UTF-8");
        let target = root.join("config_gen.rs");

        write_generated(&target, "// first, and longer\n").expect("first write");
        write_generated(&target, "// second\n").expect("second write");

        let written = std::fs::read_to_string(&target).expect("read output");
        assert_eq!(written, "// second\n");
    }
}
