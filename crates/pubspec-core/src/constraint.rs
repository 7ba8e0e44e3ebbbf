//! Pub version constraints.
//!
//! A [`VersionConstraint`] keeps the raw text it was parsed from so that it can
//! be written back verbatim, and exposes the pattern and bounds used by
//! override admission and SDK-gated formatting.

use crate::error::{PubspecError, Result};
use semver::Version;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Syntactic shape of a constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintPattern {
    /// A single pinned version, e.g. `1.2.3`.
    Absolute,
    /// Compatible-with syntax, e.g. `^1.2.3`.
    Caret,
    /// Comparator terms, e.g. `>=2.12.0 <3.0.0`.
    Range,
    /// No constraint at all (absent value or `any`).
    Any,
}

impl ConstraintPattern {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Absolute => "absolute",
            Self::Caret => "caret",
            Self::Range => "range",
            Self::Any => "any",
        }
    }
}

impl fmt::Display for ConstraintPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One end of a constraint's interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bound {
    pub version: Version,
    pub inclusive: bool,
}

impl Bound {
    pub fn inclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: true,
        }
    }

    pub fn exclusive(version: Version) -> Self {
        Self {
            version,
            inclusive: false,
        }
    }

    /// Whether `version` satisfies this bound read as a minimum.
    pub fn admits_above(&self, version: &Version) -> bool {
        match version.cmp(&self.version) {
            Ordering::Greater => true,
            Ordering::Equal => self.inclusive,
            Ordering::Less => false,
        }
    }

    /// Whether `version` satisfies this bound read as a maximum.
    pub fn admits_below(&self, version: &Version) -> bool {
        match version.cmp(&self.version) {
            Ordering::Less => true,
            Ordering::Equal => self.inclusive,
            Ordering::Greater => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionConstraint {
    raw: Option<String>,
    pattern: ConstraintPattern,
    lower: Option<Bound>,
    upper: Option<Bound>,
}

impl VersionConstraint {
    /// The constraint written when a dependency carries no version at all.
    pub fn any() -> Self {
        Self {
            raw: None,
            pattern: ConstraintPattern::Any,
            lower: None,
            upper: None,
        }
    }

    /// Parses constraint text. `None`, blank text and `any` all yield the
    /// [`ConstraintPattern::Any`] pattern.
    ///
    /// # Errors
    ///
    /// Returns [`PubspecError::InvalidVersionConstraint`] when a version or
    /// comparator term can not be read.
    pub fn parse(text: Option<&str>) -> Result<Self> {
        let Some(text) = text else {
            return Ok(Self::any());
        };
        let raw = text.trim();

        if raw.is_empty() {
            return Ok(Self::any());
        }

        if raw == "any" {
            return Ok(Self {
                raw: Some(raw.to_string()),
                ..Self::any()
            });
        }

        if let Some(rest) = raw.strip_prefix('^') {
            let version = parse_term_version(raw, rest.trim())?;
            let upper = caret_upper(&version).map(Bound::exclusive);
            return Ok(Self {
                raw: Some(raw.to_string()),
                pattern: ConstraintPattern::Caret,
                lower: Some(Bound::inclusive(version)),
                upper,
            });
        }

        if raw.starts_with(['<', '>']) {
            return parse_range(raw);
        }

        let version = parse_term_version(raw, raw)?;
        Ok(Self {
            raw: Some(raw.to_string()),
            pattern: ConstraintPattern::Absolute,
            lower: Some(Bound::inclusive(version.clone())),
            upper: Some(Bound::inclusive(version)),
        })
    }

    /// Textual form as written, `None` when the constraint was absent.
    pub fn raw_text(&self) -> Option<&str> {
        self.raw.as_deref()
    }

    pub fn pattern(&self) -> ConstraintPattern {
        self.pattern
    }

    pub fn lower_bound(&self) -> Option<&Bound> {
        self.lower.as_ref()
    }

    pub fn upper_bound(&self) -> Option<&Bound> {
        self.upper.as_ref()
    }

    pub fn is_absolute(&self) -> bool {
        self.pattern == ConstraintPattern::Absolute
    }

    pub fn is_any(&self) -> bool {
        self.pattern == ConstraintPattern::Any
    }

    /// Checks whether `version` falls inside this constraint.
    pub fn allows(&self, version: &Version) -> bool {
        self.lower.as_ref().is_none_or(|b| b.admits_above(version))
            && self.upper.as_ref().is_none_or(|b| b.admits_below(version))
    }
}

impl Default for VersionConstraint {
    fn default() -> Self {
        Self::any()
    }
}

impl fmt::Display for VersionConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.raw.as_deref().unwrap_or("any"))
    }
}

impl FromStr for VersionConstraint {
    type Err = PubspecError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(Some(s))
    }
}

fn parse_range(raw: &str) -> Result<VersionConstraint> {
    let mut lower = None;
    let mut upper = None;
    let mut tokens = raw.split_whitespace();

    while let Some(token) = tokens.next() {
        let (op, rest) = split_operator(token)
            .ok_or_else(|| invalid_constraint(raw, format!("unexpected term '{token}'")))?;

        // Operator and version may be separated by whitespace: "> 1.0.0"
        let version_text = if rest.is_empty() {
            tokens
                .next()
                .ok_or_else(|| invalid_constraint(raw, format!("missing version after '{op}'")))?
        } else {
            rest
        };
        let version = parse_term_version(raw, version_text)?;

        let (slot, side, bound) = match op {
            ">=" => (&mut lower, "lower", Bound::inclusive(version)),
            ">" => (&mut lower, "lower", Bound::exclusive(version)),
            "<=" => (&mut upper, "upper", Bound::inclusive(version)),
            _ => (&mut upper, "upper", Bound::exclusive(version)),
        };
        if slot.is_some() {
            return Err(invalid_constraint(
                raw,
                format!("more than one {side} bound"),
            ));
        }
        *slot = Some(bound);
    }

    if let (Some(l), Some(u)) = (&lower, &upper)
        && l.version > u.version
    {
        return Err(invalid_constraint(raw, "lower bound exceeds upper bound"));
    }

    Ok(VersionConstraint {
        raw: Some(raw.to_string()),
        pattern: ConstraintPattern::Range,
        lower,
        upper,
    })
}

fn split_operator(token: &str) -> Option<(&'static str, &str)> {
    [">=", "<=", ">", "<"]
        .into_iter()
        .find_map(|op| token.strip_prefix(op).map(|rest| (op, rest)))
}

/// Upper bound implied by `^version` under pub's rules, `None` when the
/// bumped component would not fit in a `u64`.
fn caret_upper(version: &Version) -> Option<Version> {
    if version.major > 0 {
        Some(Version::new(version.major.checked_add(1)?, 0, 0))
    } else if version.minor > 0 {
        Some(Version::new(0, version.minor.checked_add(1)?, 0))
    } else {
        Some(Version::new(0, 0, version.patch.checked_add(1)?))
    }
}

fn parse_term_version(raw: &str, term: &str) -> Result<Version> {
    normalize_and_parse_version(term)
        .ok_or_else(|| invalid_constraint(raw, format!("'{term}' is not a version")))
}

fn invalid_constraint(raw: &str, message: impl Into<String>) -> PubspecError {
    PubspecError::InvalidVersionConstraint {
        constraint: raw.to_string(),
        message: message.into(),
    }
}

/// Normalize a version string and parse it as semver.
///
/// Adds missing minor and patch components (e.g., "2.12" → "2.12.0") while
/// keeping any pre-release or build suffix.
///
/// # Examples
///
/// ```
/// # use pubspec_core::constraint::normalize_and_parse_version;
/// assert_eq!(normalize_and_parse_version("1.0.0+1").unwrap().to_string(), "1.0.0+1");
/// assert_eq!(normalize_and_parse_version("2.12").unwrap().to_string(), "2.12.0");
/// assert_eq!(normalize_and_parse_version("3").unwrap().to_string(), "3.0.0");
/// assert!(normalize_and_parse_version("latest").is_none());
/// ```
pub fn normalize_and_parse_version(version: &str) -> Option<Version> {
    if let Ok(v) = version.parse::<Version>() {
        return Some(v);
    }

    let split = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(split);

    let normalized = match core.matches('.').count() {
        0 => format!("{core}.0.0{suffix}"),
        1 => format!("{core}.0{suffix}"),
        _ => return None,
    };

    normalized.parse::<Version>().ok()
}
