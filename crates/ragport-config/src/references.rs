//! `{env:VAR}` and `{file:path}` references in config values.
//!
//! A string value that is exactly `{env:VAR}` is replaced by the variable's
//! value; `{file:path}` is replaced by the trimmed file content. Relative
//! paths resolve against the config file's directory. Unresolved references
//! are collected and reported together.

use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::error::ConfigError;

const ENV_REF_PREFIX: &str = "{env:";
const FILE_REF_PREFIX: &str = "{file:";
const REF_SUFFIX: &str = "}";

fn reference<'a>(s: &'a str, prefix: &str) -> Option<&'a str> {
    s.strip_prefix(prefix)?.strip_suffix(REF_SUFFIX)
}

/// Replace every reference in `value`, reading variables through `lookup`.
pub fn resolve_references(
    value: &mut toml::Value,
    base_dir: &Path,
    lookup: &dyn Fn(&str) -> Option<String>,
) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    resolve_recursive(value, base_dir, lookup, &mut errors);
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn resolve_recursive(
    value: &mut toml::Value,
    base_dir: &Path,
    lookup: &dyn Fn(&str) -> Option<String>,
    errors: &mut Vec<ConfigError>,
) {
    match value {
        toml::Value::String(s) => {
            if let Some(var_name) = reference(s, ENV_REF_PREFIX) {
                debug!("Resolving env reference: {}", var_name);
                match lookup(var_name) {
                    Some(resolved) => *value = toml::Value::String(resolved),
                    None => {
                        warn!("Environment variable not found: {}", var_name);
                        errors.push(ConfigError::EnvVarNotFound {
                            var_name: var_name.to_string(),
                        });
                    }
                }
            } else if let Some(file_path) = reference(s, FILE_REF_PREFIX) {
                let path = resolve_path(file_path, base_dir);
                debug!("Resolving file reference: {}", path.display());
                match std::fs::read_to_string(&path) {
                    Ok(content) => *value = toml::Value::String(content.trim().to_string()),
                    Err(e) => errors.push(ConfigError::FileReference {
                        path,
                        message: e.to_string(),
                    }),
                }
            }
        }
        toml::Value::Array(items) => {
            for item in items.iter_mut() {
                resolve_recursive(item, base_dir, lookup, errors);
            }
        }
        toml::Value::Table(table) => {
            for (_key, item) in table.iter_mut() {
                resolve_recursive(item, base_dir, lookup, errors);
            }
        }
        _ => {}
    }
}

fn resolve_path(path: &str, base_dir: &Path) -> PathBuf {
    let path = Path::new(path);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
