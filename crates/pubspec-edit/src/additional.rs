//! Top-level fields the document does not model.
//!
//! Unmodeled keys such as `flutter:` or `executables:` are carried through
//! decode and encode untouched. Their values must stay JSON-compatible so a
//! document can always be rendered as JSON.

use pubspec_core::{PubspecError, Result};
use serde_json::{Map, Number, Value};
use yaml_rust2::Yaml;
use yaml_rust2::yaml::Hash;

/// Keys consumed by the document model. They never appear in additional data.
pub const RESERVED_FIELDS: [&str; 12] = [
    "name",
    "environment",
    "version",
    "description",
    "publish_to",
    "homepage",
    "repository",
    "issue_tracker",
    "documentation",
    "dependencies",
    "dev_dependencies",
    "dependency_overrides",
];

pub fn is_reserved_field(key: &str) -> bool {
    RESERVED_FIELDS.contains(&key)
}

fn ensure_unreserved(key: &str) -> Result<()> {
    if is_reserved_field(key) {
        Err(PubspecError::ReservedKey {
            key: key.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Checks that `value` is built only from null, booleans, integers, finite
/// reals, strings, sequences and string-keyed maps.
///
/// # Examples
///
/// ```
/// use pubspec_edit::additional::is_json_compatible;
/// use yaml_rust2::Yaml;
///
/// assert!(is_json_compatible(&Yaml::Integer(3)));
/// assert!(!is_json_compatible(&Yaml::Real(".nan".into())));
/// assert!(!is_json_compatible(&Yaml::BadValue));
/// ```
pub fn is_json_compatible(value: &Yaml) -> bool {
    match value {
        Yaml::Null | Yaml::Boolean(_) | Yaml::Integer(_) | Yaml::String(_) => true,
        Yaml::Real(_) => value.as_f64().is_some_and(f64::is_finite),
        Yaml::Array(items) => items.iter().all(is_json_compatible),
        Yaml::Hash(map) => map
            .iter()
            .all(|(k, v)| matches!(k, Yaml::String(_)) && is_json_compatible(v)),
        _ => false,
    }
}

/// Converts a YAML node to JSON. `key` names the top-level field for errors.
pub fn yaml_to_json(key: &str, value: &Yaml) -> Result<Value> {
    let incompatible = || PubspecError::NotJsonCompatible {
        key: key.to_string(),
    };

    Ok(match value {
        Yaml::Null => Value::Null,
        Yaml::Boolean(b) => Value::Bool(*b),
        Yaml::Integer(i) => Value::from(*i),
        Yaml::String(s) => Value::String(s.clone()),
        Yaml::Real(_) => value
            .as_f64()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(incompatible)?,
        Yaml::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| yaml_to_json(key, item))
                .collect::<Result<_>>()?,
        ),
        Yaml::Hash(map) => {
            let mut object = Map::with_capacity(map.len());
            for (k, v) in map {
                let Yaml::String(k) = k else {
                    return Err(incompatible());
                };
                object.insert(k.clone(), yaml_to_json(key, v)?);
            }
            Value::Object(object)
        }
        _ => return Err(incompatible()),
    })
}

/// Converts a JSON value to a YAML node. Every JSON value has a YAML form.
pub fn json_to_yaml(value: &Value) -> Yaml {
    match value {
        Value::Null => Yaml::Null,
        Value::Bool(b) => Yaml::Boolean(*b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Yaml::Integer(i),
            None => Yaml::Real(n.to_string()),
        },
        Value::String(s) => Yaml::String(s.clone()),
        Value::Array(items) => Yaml::Array(items.iter().map(json_to_yaml).collect()),
        Value::Object(object) => {
            let mut hash = Hash::new();
            for (k, v) in object {
                hash.insert(Yaml::String(k.clone()), json_to_yaml(v));
            }
            Yaml::Hash(hash)
        }
    }
}

/// Insertion-ordered map of unmodeled top-level fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdditionalData {
    entries: Hash,
}

impl AdditionalData {
    pub fn new() -> Self {
        Self::default()
    }

    fn check(key: &str, value: &Yaml) -> Result<()> {
        ensure_unreserved(key)?;
        if is_json_compatible(value) {
            Ok(())
        } else {
            Err(PubspecError::NotJsonCompatible {
                key: key.to_string(),
            })
        }
    }

    /// Inserts `value` under `key` unless the key is present already.
    ///
    /// # Errors
    ///
    /// [`PubspecError::ReservedKey`] for a modeled field name,
    /// [`PubspecError::NotJsonCompatible`] for a value outside the JSON shape.
    pub fn append(&mut self, key: &str, value: Yaml) -> Result<bool> {
        Self::check(key, &value)?;
        let key = Yaml::String(key.to_string());
        if self.entries.contains_key(&key) {
            return Ok(false);
        }
        self.entries.insert(key, value);
        Ok(true)
    }

    /// Inserts or replaces `value` under `key`, keeping the key's position.
    pub fn modify(&mut self, key: &str, value: Yaml) -> Result<()> {
        Self::check(key, &value)?;
        let key = Yaml::String(key.to_string());
        match self.entries.get_mut(&key) {
            Some(slot) => *slot = value,
            None => {
                self.entries.insert(key, value);
            }
        }
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Yaml>> {
        ensure_unreserved(key)?;
        Ok(self.entries.remove(&Yaml::String(key.to_string())))
    }

    pub fn get(&self, key: &str) -> Result<Option<&Yaml>> {
        ensure_unreserved(key)?;
        Ok(self.entries.get(&Yaml::String(key.to_string())))
    }

    pub fn contains(&self, key: &str) -> Result<bool> {
        ensure_unreserved(key)?;
        Ok(self.entries.contains_key(&Yaml::String(key.to_string())))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Yaml)> {
        self.entries
            .iter()
            .filter_map(|(k, v)| k.as_str().map(|k| (k, v)))
    }
}
