//! Rendering of live configuration values.

use std::fmt;
use std::io::Write;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::embedding::ENV_NESTING;
use crate::{LayerError, LayerResult};

/// Text encodings supported by [`Embedded::echo`](crate::Embedded::echo).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// Pretty-printed JSON.
    Json,
    /// YAML document.
    Yaml,
    /// `KEY=value` lines matching the environment binding.
    Env,
}

impl Format {
    /// Returns the lowercase name of this format.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
            Self::Env => "env",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = LayerError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        [Self::Json, Self::Yaml, Self::Env]
            .into_iter()
            .find(|format| format.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| LayerError::UnknownFormat(value.to_owned()))
    }
}

pub(crate) fn write<T, W>(
    value: &T,
    env_prefix: Option<&str>,
    mut writer: W,
    format: Format,
) -> LayerResult<()>
where
    T: Serialize,
    W: Write,
{
    match format {
        Format::Json => {
            serde_json::to_writer_pretty(&mut writer, value)
                .map_err(|err| serialize_error(format, &err))?;
            writeln!(writer)?;
        }
        Format::Yaml => {
            serde_yaml::to_writer(&mut writer, value)
                .map_err(|err| serialize_error(format, &err))?;
        }
        Format::Env => {
            let tree = serde_json::to_value(value).map_err(|err| serialize_error(format, &err))?;
            for line in env_lines(&tree, env_prefix) {
                writeln!(writer, "{line}")?;
            }
        }
    }
    writer.flush()?;
    Ok(())
}

fn serialize_error(format: Format, err: &impl fmt::Display) -> LayerError {
    LayerError::Serialize {
        format,
        message: err.to_string(),
    }
}

/// Flattens `tree` into sorted `KEY=value` lines.
fn env_lines(tree: &Value, env_prefix: Option<&str>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut path = Vec::new();
    collect_env(tree, &mut path, env_prefix, &mut lines);
    lines
}

fn collect_env<'a>(
    value: &'a Value,
    path: &mut Vec<&'a str>,
    env_prefix: Option<&str>,
    lines: &mut Vec<String>,
) {
    if let Value::Object(map) = value {
        for (key, child) in map {
            path.push(key.as_str());
            collect_env(child, path, env_prefix, lines);
            path.pop();
        }
        return;
    }
    if path.is_empty() {
        return;
    }

    let key = path
        .iter()
        .map(|segment| segment.to_ascii_uppercase())
        .collect::<Vec<_>>()
        .join(ENV_NESTING);
    let rendered = match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    };
    match env_prefix {
        Some(prefix) => lines.push(format!("{prefix}_{key}={rendered}")),
        None => lines.push(format!("{key}={rendered}")),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for echo rendering.

    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("json", Format::Json)]
    #[case("YAML", Format::Yaml)]
    #[case("Env", Format::Env)]
    fn parses_format_names(#[case] raw: &str, #[case] expected: Format) {
        assert_eq!(raw.parse::<Format>().ok(), Some(expected));
    }

    #[rstest]
    fn rejects_unknown_format() {
        let parsed = "xml".parse::<Format>();
        assert!(matches!(parsed, Err(LayerError::UnknownFormat(name)) if name == "xml"));
    }

    #[rstest]
    fn flattens_nested_values_in_key_order() {
        let tree = json!({
            "redis_config": { "port": "6379", "db": 1 },
            "http_server_config": { "host": "localhost", "tags": ["a", "b"] },
            "logger_config": { "level": null },
        });

        let lines = env_lines(&tree, Some("APP"));

        assert_eq!(
            lines,
            [
                "APP_HTTP_SERVER_CONFIG__HOST=localhost",
                r#"APP_HTTP_SERVER_CONFIG__TAGS=["a","b"]"#,
                "APP_LOGGER_CONFIG__LEVEL=",
                "APP_REDIS_CONFIG__DB=1",
                "APP_REDIS_CONFIG__PORT=6379",
            ]
        );
    }

    #[rstest]
    fn omits_prefix_when_unset() {
        let tree = json!({ "logger_config": { "level": "info" } });
        assert_eq!(env_lines(&tree, None), ["LOGGER_CONFIG__LEVEL=info"]);
    }
}
