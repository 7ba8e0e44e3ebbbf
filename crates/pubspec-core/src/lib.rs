//! Core abstractions for pubspec-edit.
//!
//! Holds the error taxonomy shared by every crate in the workspace, the pub
//! version constraint model, and field-level value validation.

pub mod constraint;
pub mod error;
pub mod validate;

pub use constraint::{Bound, ConstraintPattern, VersionConstraint, normalize_and_parse_version};
pub use error::{PubspecError, Result};
pub use validate::{
    RESERVED_KEYWORDS, ensure_http_url, ensure_package_name, is_http_url, is_valid_package_name,
    parse_http_url, parse_url,
};
