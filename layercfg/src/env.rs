//! Environment variable layer.
//!
//! Variables are bound by name: `PREFIX_SECTION__FIELD`, or `SECTION__FIELD`
//! without a prefix. Values are typed against the serialized defaults, so a
//! field that defaults to a string keeps the raw text (`9090` stays a string)
//! while other leaves are parsed as JSON scalars and fall back to the raw
//! text.

use serde_json::{Map, Value};

use crate::embedding::ENV_NESTING;

/// Builds the nested tree bound by `vars`.
///
/// Only variables whose first segment names a top-level key of `defaults`
/// are bound. Prefix matching ignores ASCII case, as key matching does.
pub(crate) fn bind<I>(vars: I, prefix: Option<&str>, defaults: &Value) -> Map<String, Value>
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut tree = Map::new();
    for (name, raw) in vars {
        let Some(key) = strip_prefix(&name, prefix) else {
            continue;
        };
        let path: Vec<String> = key
            .split(ENV_NESTING)
            .map(str::to_ascii_lowercase)
            .collect();
        if path.iter().any(String::is_empty) {
            continue;
        }
        let Some(leaf) = lookup(defaults, &path) else {
            continue;
        };
        let value = typed_value(leaf, raw);
        insert(&mut tree, &path, value);
    }
    tree
}

fn strip_prefix<'a>(name: &'a str, prefix: Option<&str>) -> Option<&'a str> {
    let Some(expected) = prefix else {
        return Some(name);
    };
    let head = name.get(..expected.len())?;
    let rest = name.get(expected.len()..)?.strip_prefix('_')?;
    head.eq_ignore_ascii_case(expected).then_some(rest)
}

/// Finds the default at `path`. Paths below a leaf or a missing top-level
/// key yield `None`; missing nested keys bind as untyped values.
fn lookup<'a>(defaults: &'a Value, path: &[String]) -> Option<Option<&'a Value>> {
    let (first, rest) = path.split_first()?;
    let mut current = defaults.get(first)?;
    for segment in rest {
        match current {
            Value::Object(map) => match map.get(segment) {
                Some(child) => current = child,
                None => return Some(None),
            },
            _ => return None,
        }
    }
    Some(Some(current))
}

fn typed_value(leaf: Option<&Value>, raw: String) -> Value {
    match leaf {
        Some(Value::String(_)) => Value::String(raw),
        _ => match serde_json::from_str::<Value>(&raw) {
            Ok(parsed @ (Value::Bool(_) | Value::Number(_) | Value::Array(_))) => parsed,
            _ => Value::String(raw),
        },
    }
}

fn insert(tree: &mut Map<String, Value>, path: &[String], value: Value) {
    let Some((last, parents)) = path.split_last() else {
        return;
    };
    let mut current = tree;
    for segment in parents {
        let entry = current
            .entry(segment.clone())
            .or_insert_with(|| Value::Object(Map::new()));
        if !entry.is_object() {
            *entry = Value::Object(Map::new());
        }
        let Value::Object(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.clone(), value);
}
