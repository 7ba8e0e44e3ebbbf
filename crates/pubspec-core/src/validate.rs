//! Value validation for pubspec fields.

use crate::error::{PubspecError, Result};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

static PACKAGE_NAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9_]+$").expect("Invalid regex"));

/// Dart reserved words, which can not be used as package names.
pub const RESERVED_KEYWORDS: &[&str] = &[
    "assert", "break", "case", "catch", "class", "const", "continue", "default", "do", "else",
    "enum", "extends", "false", "final", "finally", "for", "if", "in", "is", "new", "null",
    "rethrow", "return", "super", "switch", "this", "throw", "true", "try", "var", "void",
    "while", "with",
];

/// Checks the pub package naming rule: lowercase ASCII letters, digits and
/// underscores only, and not a reserved keyword.
///
/// # Examples
///
/// ```
/// # use pubspec_core::validate::is_valid_package_name;
/// assert!(is_valid_package_name("url_launcher"));
/// assert!(!is_valid_package_name("X jps"));
/// assert!(!is_valid_package_name("enum"));
/// ```
pub fn is_valid_package_name(name: &str) -> bool {
    PACKAGE_NAME_PATTERN.is_match(name) && !RESERVED_KEYWORDS.contains(&name)
}

pub fn ensure_package_name(name: &str) -> Result<()> {
    if is_valid_package_name(name) {
        Ok(())
    } else {
        Err(PubspecError::InvalidName {
            name: name.to_string(),
        })
    }
}

pub fn is_http_url(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Rejects URLs whose scheme is not http or https. `field` names the pubspec
/// key for the error message.
pub fn ensure_http_url(field: &'static str, url: Option<Url>) -> Result<Option<Url>> {
    match url {
        Some(url) if !is_http_url(&url) => Err(PubspecError::NonHttpUrl {
            field,
            url: url.to_string(),
        }),
        other => Ok(other),
    }
}

pub fn parse_url(value: &str) -> Result<Url> {
    Url::parse(value).map_err(|source| PubspecError::InvalidUrl {
        value: value.to_string(),
        source,
    })
}

/// Parses optional URL text and applies [`ensure_http_url`].
pub fn parse_http_url(field: &'static str, value: Option<&str>) -> Result<Option<Url>> {
    let url = value.map(parse_url).transpose()?;
    ensure_http_url(field, url)
}
