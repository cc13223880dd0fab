//! Format-specific parsing for the configuration file layer.

use camino::Utf8Path;
use figment::Figment;
use figment::providers::{Format, Json, Toml, Yaml};

use crate::error::file_error;
use crate::{LayerError, LayerResult};

/// Reads `path` and wraps its contents in a figment layer.
pub(crate) fn load_config_file(path: &Utf8Path) -> LayerResult<Figment> {
    let data = std::fs::read_to_string(path).map_err(|source| LayerError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_config_by_format(path, &data)
}

/// Parse configuration data according to the file extension.
///
/// Each document is validated with its own parser first so that syntax
/// errors carry the file path instead of surfacing later during extraction.
fn parse_config_by_format(path: &Utf8Path, data: &str) -> LayerResult<Figment> {
    let ext = path.extension().map(str::to_ascii_lowercase);
    let figment = match ext.as_deref() {
        Some("toml") => {
            toml::from_str::<toml::Table>(data).map_err(|e| file_error(path, e))?;
            Figment::from(Toml::string(data))
        }
        Some("json") => {
            serde_json::from_str::<serde_json::Value>(data).map_err(|e| file_error(path, e))?;
            Figment::from(Json::string(data))
        }
        Some("yaml" | "yml") => {
            serde_yaml::from_str::<serde_yaml::Value>(data).map_err(|e| file_error(path, e))?;
            Figment::from(Yaml::string(data))
        }
        _ => {
            return Err(LayerError::UnsupportedFile {
                path: path.to_path_buf(),
            });
        }
    };

    Ok(figment)
}
