//! Type-checked deep merge of configuration trees.
//!
//! A config tree is a `toml::Table`. Every `toml::Value` carries its own tag
//! (`string`, `integer`, `float`, `boolean`, `datetime`, `array`, `table`), and
//! that tag is the structural type an override must keep.

use toml::{Table, Value};

use super::ConfigError;

/// Deep-merge `overlay` on top of `base`.
///
/// Keys only in `base` are kept, keys only in `overlay` are added. For a key
/// present in both, the two values must have the same tag; tables merge
/// recursively and every other kind is replaced wholesale by the overlay.
///
/// Both inputs are borrowed and the result is built from clones, so it shares
/// nothing with either input.
pub fn merge(base: &Table, overlay: &Table) -> Result<Table, ConfigError> {
    merge_at(base, overlay, "")
}

fn merge_at(base: &Table, overlay: &Table, prefix: &str) -> Result<Table, ConfigError> {
    let mut merged = base.clone();
    for (key, ov_val) in overlay {
        let path = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        let value = match merged.get(key) {
            Some(base_val) if base_val.type_str() != ov_val.type_str() => {
                return Err(ConfigError::TypeMismatch {
                    key: path,
                    expected: base_val.type_str(),
                    found: ov_val.type_str(),
                });
            }
            Some(Value::Table(base_tbl)) => match ov_val {
                Value::Table(ov_tbl) => Value::Table(merge_at(base_tbl, ov_tbl, &path)?),
                other => other.clone(),
            },
            _ => ov_val.clone(),
        };
        merged.insert(key.clone(), value);
    }
    Ok(merged)
}
