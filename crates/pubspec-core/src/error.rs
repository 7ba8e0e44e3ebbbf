//! Error types shared by every pubspec crate.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PubspecError {
    #[error("Invalid package name '{name}'")]
    InvalidName { name: String },

    #[error("'{field}' must use http or https, got '{url}'")]
    NonHttpUrl { field: &'static str, url: String },

    #[error("Invalid URL '{value}': {source}")]
    InvalidUrl {
        value: String,
        #[source]
        source: url::ParseError,
    },

    #[error("Unrecognized git repository URL '{url}'")]
    InvalidGitUrl { url: String },

    #[error("SDK constraint '{constraint}' can not use caret syntax")]
    CaretSdkConstraint { constraint: String },

    #[error("SDK constraint '{constraint}' has no lower bound")]
    UnboundedSdkConstraint { constraint: String },

    #[error("Override of '{name}' must pin an exact version, got '{constraint}'")]
    NonPinnedOverride { name: String, constraint: String },

    #[error("'{key}' is a pubspec field and can not be used as additional data")]
    ReservedKey { key: String },

    #[error("Value of '{key}' is not JSON-compatible")]
    NotJsonCompatible { key: String },

    #[error("Invalid version '{version}': {source}")]
    InvalidVersion {
        version: String,
        #[source]
        source: semver::Error,
    },

    #[error("Invalid version constraint '{constraint}': {message}")]
    InvalidVersionConstraint { constraint: String, message: String },

    #[error("Dependency '{name}' does not match any reference format")]
    UnrecognizedReference { name: String },

    #[error("Dependency '{name}' matches several reference formats: {}", candidates.join(", "))]
    AmbiguousReference {
        name: String,
        candidates: Vec<&'static str>,
    },

    #[error("Missing required field '{field}' in {section}")]
    MissingField { section: String, field: String },

    #[error("Invalid pubspec structure: {message}")]
    InvalidStructure { message: String },

    #[error("Failed to parse pubspec: {message}")]
    ParseError { message: String },

    #[error("Failed to emit pubspec: {message}")]
    Emit { message: String },

    #[error("Dependency '{name}' not found")]
    NotFound { name: String },

    #[error("Dependency '{name}' is {actual}, not {expected}")]
    TypeMismatch {
        name: String,
        expected: &'static str,
        actual: &'static str,
    },

    #[error("Undo requires at least two archived snapshots, found {archived}")]
    NothingToUndo { archived: usize },

    #[error("No pubspec snapshot has been archived")]
    EmptyArchive,

    #[error("Not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("Not a pub project directory: {}", path.display())]
    NotAProject { path: PathBuf },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PubspecError>;

impl PubspecError {
    /// Structural error for a field holding the wrong kind of node.
    pub fn invalid_structure(message: impl Into<String>) -> Self {
        Self::InvalidStructure {
            message: message.into(),
        }
    }

    pub fn missing_field(section: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            section: section.into(),
            field: field.into(),
        }
    }

    /// True for errors raised by value validation rather than document shape or state.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidName { .. }
                | Self::NonHttpUrl { .. }
                | Self::InvalidUrl { .. }
                | Self::InvalidGitUrl { .. }
                | Self::CaretSdkConstraint { .. }
                | Self::UnboundedSdkConstraint { .. }
                | Self::NonPinnedOverride { .. }
                | Self::ReservedKey { .. }
                | Self::NotJsonCompatible { .. }
                | Self::InvalidVersion { .. }
                | Self::InvalidVersionConstraint { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PubspecError::InvalidName {
            name: "X jps".into(),
        };
        assert_eq!(err.to_string(), "Invalid package name 'X jps'");

        let err = PubspecError::missing_field("environment", "sdk");
        assert_eq!(
            err.to_string(),
            "Missing required field 'sdk' in environment"
        );
    }

    #[test]
    fn test_ambiguous_reference_lists_candidates() {
        let err = PubspecError::AmbiguousReference {
            name: "foo".into(),
            candidates: vec!["local", "git"],
        };
        assert_eq!(
            err.to_string(),
            "Dependency 'foo' matches several reference formats: local, git"
        );
    }

    #[test]
    fn test_type_mismatch_display() {
        let err = PubspecError::TypeMismatch {
            name: "flutter".into(),
            expected: "hosted",
            actual: "sdk",
        };
        assert_eq!(err.to_string(), "Dependency 'flutter' is sdk, not hosted");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::from(std::io::ErrorKind::NotFound);
        let err: PubspecError = io_err.into();
        assert!(matches!(err, PubspecError::Io(_)));
        assert!(!err.is_validation());
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("{invalid}").unwrap_err();
        let err: PubspecError = json_err.into();
        assert!(matches!(err, PubspecError::Json(_)));
    }

    #[test]
    fn test_validation_classification() {
        assert!(
            PubspecError::ReservedKey {
                key: "name".into()
            }
            .is_validation()
        );
        assert!(!PubspecError::EmptyArchive.is_validation());
        assert!(!PubspecError::NothingToUndo { archived: 1 }.is_validation());
    }
}
