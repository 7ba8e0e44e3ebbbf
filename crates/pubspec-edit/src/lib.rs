//! Validated pubspec.yaml editing.
//!
//! Decodes a pubspec document tree into a [`Pubspec`] whose fields are
//! re-validated on every change, encodes it back with SDK-aware formatting,
//! and keeps a bounded undo history of snapshots.
//!
//! # Examples
//!
//! ```
//! use pubspec_edit::{
//!     FormatPreferences, PubspecView, ReferenceLookup, from_yaml_str, to_yaml_string,
//! };
//!
//! let mut pubspec = from_yaml_str(
//!     "name: my_app\nenvironment:\n  sdk: '>=2.12.0 <3.0.0'\ndependencies:\n  path: ^1.8.0\n",
//! )
//! .unwrap();
//! assert!(pubspec.dependencies().contains("path"));
//!
//! pubspec.set_description(Some("Demo".into()));
//! let text = to_yaml_string(&pubspec, &FormatPreferences::default()).unwrap();
//! assert!(text.contains("description: Demo"));
//! ```

mod macros;

pub mod additional;
pub mod archiver;
pub mod codec;
pub mod document;
pub mod format;
pub mod manager;
pub mod pubspec;
pub mod reference;
pub mod reference_set;
pub mod snapshot;

pub use additional::{AdditionalData, RESERVED_FIELDS, is_json_compatible};
pub use archiver::{ArchiveEntry, Archiver, MAX_ARCHIVES};
pub use codec::{classify, decode_reference, decode_section, encode_reference, encode_section};
pub use document::{
    decode_pubspec, encode_pubspec, from_json_str, from_yaml_str, to_json_string, to_json_value,
    to_yaml_string,
};
pub use format::{FormatPreferences, SUCCINCT_HOSTED_MIN_SDK};
pub use manager::{PUBSPEC_FILE_NAME, PubspecManager};
pub use pubspec::{Environment, Pubspec, PubspecParts, PubspecView};
pub use reference::{
    DependencyReference, GitReference, GitUrl, HostedReference, LocalReference, ReferenceKind,
    SdkReference, ThirdPartyHostedReference, TypedReference,
};
pub use reference_set::{
    Admission, DependencySet, FrozenDependencySet, FrozenOverrideSet, FrozenReferenceSet,
    OverrideSet, PinnedOnly, ReferenceLookup, ReferenceSet, Unrestricted,
};
pub use snapshot::PubspecSnapshot;

pub use pubspec_core::{PubspecError, Result, VersionConstraint};
