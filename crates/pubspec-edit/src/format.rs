//! Output format preferences.

use pubspec_core::{Result, VersionConstraint};
use semver::Version;
use serde::{Deserialize, Serialize};

/// Lowest Dart SDK that understands `hosted: <url>` without a name.
pub const SUCCINCT_HOSTED_MIN_SDK: Version = Version::new(2, 15, 0);

/// Settings applied when a document is encoded.
///
/// Missing fields take their default when read from JSON, so an empty object
/// is a valid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatPreferences {
    /// Write third-party hosted references as `hosted: <url>` when the
    /// declared SDK allows it.
    pub succinct_third_party_hosted: bool,
}

impl Default for FormatPreferences {
    fn default() -> Self {
        Self {
            succinct_third_party_hosted: true,
        }
    }
}

impl FormatPreferences {
    /// Preferences that always write the fully qualified hosted form.
    pub fn qualified() -> Self {
        Self {
            succinct_third_party_hosted: false,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Whether a self-named third-party reference may use the succinct form
    /// under the declared `sdk` constraint.
    pub fn succinct_hosted_allowed(&self, sdk: &VersionConstraint) -> bool {
        self.succinct_third_party_hosted && sdk_supports_succinct_hosted(sdk)
    }
}

/// Compares the constraint's lower bound with [`SUCCINCT_HOSTED_MIN_SDK`]:
/// `>=` bounds may equal it, `>` bounds must exceed it.
pub fn sdk_supports_succinct_hosted(sdk: &VersionConstraint) -> bool {
    sdk.lower_bound().is_some_and(|bound| {
        if bound.inclusive {
            bound.version >= SUCCINCT_HOSTED_MIN_SDK
        } else {
            bound.version > SUCCINCT_HOSTED_MIN_SDK
        }
    })
}
