//! Configuration loading and environment parsing.

use std::fs;
use std::path::Path;

use serde_json::{Map, Value};

use super::validation::validate_config;
use super::Config;

/// Load configuration by stacking layers, weakest first:
///
/// 1) Defaults compiled into the binary
/// 2) `config.json` in the current working directory
/// 3) File pointed to by `DRAWDASH_CONFIG_PATH`
/// 4) `DRAWDASH_CONFIG_JSON` env var containing raw JSON
/// 5) Per-field env overrides with the `DRAWDASH__` prefix, using `__` as
///    nested separator, e.g. `DRAWDASH__PORT=9000` or
///    `DRAWDASH__LOGGING__FORMAT=json`
///
/// Each later layer overwrites the ones before it, key by key. Loading never
/// fails: unreadable or malformed sources are reported to stderr and skipped.
/// `main` re-runs [`validate_config`] and treats its errors as fatal; here
/// they are warn-only.
#[must_use]
pub fn load() -> Config {
    let defaults = Config::default();
    let base = serde_json::to_value(&defaults).unwrap_or(Value::Null);

    let layers = [
        file_layer(Path::new("config.json")),
        std::env::var("DRAWDASH_CONFIG_PATH")
            .ok()
            .and_then(|path| file_layer(Path::new(&path))),
        std::env::var("DRAWDASH_CONFIG_JSON")
            .ok()
            .and_then(|raw| json_layer(&raw, "DRAWDASH_CONFIG_JSON")),
        Some(env_override_layer()),
    ];
    let merged = layers.into_iter().flatten().fold(base, overlay);

    let config = match serde_json::from_value(merged) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Failed to deserialize config; using defaults: {err}");
            defaults
        }
    };

    if let Err(err) = validate_config(&config) {
        eprintln!("Configuration validation error: {err}");
    }

    config
}

/// Lay `patch` over `base`: objects merge key by key, anything else is
/// replaced wholesale.
fn overlay(base: Value, patch: Value) -> Value {
    match (base, patch) {
        (Value::Object(mut base_map), Value::Object(patch_map)) => {
            for (key, patch_value) in patch_map {
                let merged = match base_map.remove(&key) {
                    Some(existing) => overlay(existing, patch_value),
                    None => patch_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, replacement) => replacement,
    }
}

/// One layer from a config file, if it exists and holds a JSON object.
fn file_layer(path: &Path) -> Option<Value> {
    if !path.is_file() {
        return None;
    }
    match fs::read_to_string(path) {
        Ok(contents) => json_layer(&contents, &path.display().to_string()),
        Err(err) => {
            eprintln!("Skipping config file {}: {err}", path.display());
            None
        }
    }
}

/// One layer from raw JSON text. Only objects can be merged; anything else
/// is rejected with a note.
fn json_layer(raw: &str, source: &str) -> Option<Value> {
    if raw.trim().is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(_) => {
            eprintln!("Ignoring config from {source}: expected a JSON object");
            None
        }
        Err(err) => {
            eprintln!("Ignoring config from {source}: {err}");
            None
        }
    }
}

/// Collect every `DRAWDASH__…` environment variable into one object layer.
fn env_override_layer() -> Value {
    let mut root = Map::new();
    for (key, raw) in std::env::vars() {
        let Some(dotted) = key.strip_prefix("DRAWDASH__") else {
            continue;
        };
        let segments: Vec<String> = dotted
            .split("__")
            .filter(|segment| !segment.is_empty())
            .map(str::to_ascii_lowercase)
            .collect();
        if !segments.is_empty() {
            graft(&mut root, &segments, env_value(&raw));
        }
    }
    Value::Object(root)
}

/// Place `value` at the nested path inside `target`, creating intermediate
/// objects as needed. A non-object in the way is replaced.
fn graft(target: &mut Map<String, Value>, path: &[String], value: Value) {
    match path {
        [] => {}
        [leaf] => {
            target.insert(leaf.clone(), value);
        }
        [head, rest @ ..] => {
            let child = target
                .entry(head.clone())
                .or_insert_with(|| Value::Object(Map::new()));
            if !child.is_object() {
                *child = Value::Object(Map::new());
            }
            if let Value::Object(map) = child {
                graft(map, rest, value);
            }
        }
    }
}

/// Interpret an env var value: JSON scalars pass through as themselves,
/// comma-separated values become arrays, everything else stays a string.
fn env_value(raw: &str) -> Value {
    let scalar = |text: &str| -> Value {
        serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
    };

    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Value::String(String::new())
    } else if trimmed.contains(',') {
        Value::Array(trimmed.split(',').map(str::trim).map(scalar).collect())
    } else {
        scalar(trimmed)
    }
}
