//! Whole-document decode and encode over YAML and JSON trees.

use crate::additional::{AdditionalData, is_reserved_field, json_to_yaml, yaml_to_json};
use crate::codec::{decode_section, encode_section};
use crate::format::FormatPreferences;
use crate::pubspec::{Environment, Pubspec, PubspecParts, PubspecView, parse_version};
use crate::reference_set::ReferenceLookup;
use pubspec_core::{PubspecError, Result, parse_http_url};
use serde_json::{Map, Value};
use yaml_rust2::yaml::Hash;
use yaml_rust2::{Yaml, YamlEmitter, YamlLoader};

fn optional_field<'a>(section: &str, node: &'a Yaml, key: &str) -> Result<Option<&'a str>> {
    match &node[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(value) => Ok(Some(value.as_str())),
        _ => Err(PubspecError::invalid_structure(format!(
            "'{key}' in {section} must be a string"
        ))),
    }
}

fn required_field<'a>(section: &str, node: &'a Yaml, key: &str) -> Result<&'a str> {
    optional_field(section, node, key)?.ok_or_else(|| PubspecError::missing_field(section, key))
}

fn decode_environment(node: &Yaml) -> Result<Environment> {
    match node {
        Yaml::Hash(_) => {}
        Yaml::BadValue | Yaml::Null => {
            return Err(PubspecError::missing_field("pubspec", "environment"));
        }
        _ => {
            return Err(PubspecError::invalid_structure(
                "'environment' must be a mapping",
            ));
        }
    }

    let sdk = required_field("environment", node, "sdk")?;
    let flutter = optional_field("environment", node, "flutter")?;
    Environment::parse(sdk, flutter)
}

/// Decodes a document tree into a validated [`Pubspec`].
///
/// Decoding stops at the first error; no partial document is returned.
pub fn decode_pubspec(doc: &Yaml) -> Result<Pubspec> {
    let Yaml::Hash(fields) = doc else {
        return Err(PubspecError::invalid_structure(
            "document root must be a mapping",
        ));
    };

    let name = required_field("pubspec", doc, "name")?;
    let environment = decode_environment(&doc["environment"])?;

    let mut parts = PubspecParts::new(name, environment);
    parts.version = optional_field("pubspec", doc, "version")?
        .map(parse_version)
        .transpose()?;
    parts.publish_to = optional_field("pubspec", doc, "publish_to")?.map(String::from);
    parts.description = optional_field("pubspec", doc, "description")?.map(String::from);
    parts.homepage = parse_http_url("homepage", optional_field("pubspec", doc, "homepage")?)?;
    parts.repository = parse_http_url("repository", optional_field("pubspec", doc, "repository")?)?;
    parts.issue_tracker =
        parse_http_url("issue_tracker", optional_field("pubspec", doc, "issue_tracker")?)?;
    parts.documentation =
        parse_http_url("documentation", optional_field("pubspec", doc, "documentation")?)?;

    parts.dependencies = decode_section("dependencies", &doc["dependencies"])?;
    parts.dev_dependencies = decode_section("dev_dependencies", &doc["dev_dependencies"])?;
    parts.dependency_overrides =
        decode_section("dependency_overrides", &doc["dependency_overrides"])?;

    let mut additional_data = AdditionalData::new();
    for (key, value) in fields {
        let Some(key) = key.as_str() else {
            return Err(PubspecError::invalid_structure(
                "top-level keys must be strings",
            ));
        };
        if !is_reserved_field(key) {
            additional_data.modify(key, value.clone())?;
        }
    }
    parts.additional_data = additional_data;

    let pubspec = Pubspec::from_parts(parts)?;
    tracing::debug!(
        "Decoded pubspec '{}' with {} dependencies, {} dev dependencies, {} overrides",
        pubspec.name(),
        pubspec.dependencies().len(),
        pubspec.dev_dependencies().len(),
        pubspec.dependency_overrides().len()
    );
    Ok(pubspec)
}

fn insert(hash: &mut Hash, key: &str, value: Yaml) {
    hash.insert(Yaml::String(key.to_string()), value);
}

fn insert_text(hash: &mut Hash, key: &str, value: Option<impl ToString>) {
    if let Some(value) = value {
        insert(hash, key, Yaml::String(value.to_string()));
    }
}

/// Encodes a document, or a snapshot of one, as a document tree.
///
/// Keys are written in a fixed order with unmodeled fields last. Empty
/// dependency sections are left out.
pub fn encode_pubspec(pubspec: &impl PubspecView, prefs: &FormatPreferences) -> Yaml {
    let sdk = pubspec.environment().sdk();
    let mut hash = Hash::new();

    insert(&mut hash, "name", Yaml::String(pubspec.name().to_string()));
    insert_text(&mut hash, "description", pubspec.description());
    insert_text(&mut hash, "version", pubspec.version());
    insert_text(&mut hash, "publish_to", pubspec.publish_to());

    let mut environment = Hash::new();
    insert(&mut environment, "sdk", Yaml::String(sdk.to_string()));
    insert_text(&mut environment, "flutter", pubspec.environment().flutter());
    insert(&mut hash, "environment", Yaml::Hash(environment));

    insert_text(&mut hash, "homepage", pubspec.homepage());
    insert_text(&mut hash, "repository", pubspec.repository());
    insert_text(&mut hash, "issue_tracker", pubspec.issue_tracker());
    insert_text(&mut hash, "documentation", pubspec.documentation());

    if !pubspec.dependencies().is_empty() {
        insert(
            &mut hash,
            "dependencies",
            encode_section(pubspec.dependencies(), sdk, prefs),
        );
    }
    if !pubspec.dev_dependencies().is_empty() {
        insert(
            &mut hash,
            "dev_dependencies",
            encode_section(pubspec.dev_dependencies(), sdk, prefs),
        );
    }
    if !pubspec.dependency_overrides().is_empty() {
        insert(
            &mut hash,
            "dependency_overrides",
            encode_section(pubspec.dependency_overrides(), sdk, prefs),
        );
    }

    for (key, value) in pubspec.additional_data().iter() {
        insert(&mut hash, key, value.clone());
    }

    Yaml::Hash(hash)
}

/// Parses YAML text and decodes its first document.
pub fn from_yaml_str(text: &str) -> Result<Pubspec> {
    let docs = YamlLoader::load_from_str(text).map_err(|e| PubspecError::ParseError {
        message: e.to_string(),
    })?;
    let doc = docs
        .first()
        .ok_or_else(|| PubspecError::invalid_structure("document is empty"))?;
    decode_pubspec(doc)
}

/// Renders a document as YAML text without a document start marker.
pub fn to_yaml_string(pubspec: &impl PubspecView, prefs: &FormatPreferences) -> Result<String> {
    let doc = encode_pubspec(pubspec, prefs);
    let mut out = String::new();
    YamlEmitter::new(&mut out)
        .dump(&doc)
        .map_err(|e| PubspecError::Emit {
            message: e.to_string(),
        })?;

    let mut text = out
        .strip_prefix("---\n")
        .map(str::to_string)
        .unwrap_or(out);
    text.push('\n');
    Ok(text)
}

/// Parses JSON text and decodes it like a YAML document.
pub fn from_json_str(text: &str) -> Result<Pubspec> {
    let value: Value = serde_json::from_str(text)?;
    decode_pubspec(&json_to_yaml(&value))
}

pub fn to_json_value(pubspec: &impl PubspecView, prefs: &FormatPreferences) -> Result<Value> {
    let Yaml::Hash(hash) = encode_pubspec(pubspec, prefs) else {
        return Err(PubspecError::invalid_structure(
            "encoded pubspec is not a mapping",
        ));
    };

    let mut object = Map::with_capacity(hash.len());
    for (key, value) in &hash {
        if let Some(key) = key.as_str() {
            object.insert(key.to_string(), yaml_to_json(key, value)?);
        }
    }
    Ok(Value::Object(object))
}

pub fn to_json_string(pubspec: &impl PubspecView, prefs: &FormatPreferences) -> Result<String> {
    Ok(serde_json::to_string_pretty(&to_json_value(pubspec, prefs)?)?)
}
