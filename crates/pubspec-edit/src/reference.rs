//! Dependency reference taxonomy.
//!
//! Every entry of `dependencies`, `dev_dependencies` and `dependency_overrides`
//! is exactly one of five reference kinds. Each kind is a standalone struct and
//! [`DependencyReference`] is the closed union over them.

use crate::macros::{delegate_to_variants, impl_reference_variant};
use pubspec_core::{PubspecError, Result, VersionConstraint, ensure_package_name};
use regex::Regex;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use url::Url;

static SCP_LIKE_GIT_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]+@[A-Za-z0-9.-]+:[^\s:][^\s]*$").expect("Invalid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Hosted,
    ThirdPartyHosted,
    Local,
    Git,
    Sdk,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hosted => "hosted",
            Self::ThirdPartyHosted => "third-party hosted",
            Self::Local => "local",
            Self::Git => "git",
            Self::Sdk => "sdk",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A package resolved against the default registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedReference {
    name: String,
    constraint: VersionConstraint,
}

impl HostedReference {
    pub fn new(name: impl Into<String>, constraint: VersionConstraint) -> Result<Self> {
        let name = name.into();
        ensure_package_name(&name)?;
        Ok(Self { name, constraint })
    }

    /// Hosted reference accepting any version.
    pub fn any(name: impl Into<String>) -> Result<Self> {
        Self::new(name, VersionConstraint::any())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    #[must_use]
    pub fn with_constraint(&self, constraint: VersionConstraint) -> Self {
        Self {
            constraint,
            ..self.clone()
        }
    }
}

/// A package served by a registry other than the default one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThirdPartyHostedReference {
    name: String,
    repository_url: Url,
    hosted_name: String,
    constraint: VersionConstraint,
}

impl ThirdPartyHostedReference {
    /// Creates a reference whose name on the remote registry equals `name`.
    pub fn new(
        name: impl Into<String>,
        repository_url: Url,
        constraint: VersionConstraint,
    ) -> Result<Self> {
        let name = name.into();
        let hosted_name = name.clone();
        Self::with_hosted_name_parts(name, repository_url, hosted_name, constraint)
    }

    pub fn with_hosted_name_parts(
        name: impl Into<String>,
        repository_url: Url,
        hosted_name: impl Into<String>,
        constraint: VersionConstraint,
    ) -> Result<Self> {
        let name = name.into();
        let hosted_name = hosted_name.into();
        ensure_package_name(&name)?;
        ensure_package_name(&hosted_name)?;
        Ok(Self {
            name,
            repository_url,
            hosted_name,
            constraint,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository_url(&self) -> &Url {
        &self.repository_url
    }

    pub fn hosted_name(&self) -> &str {
        &self.hosted_name
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    /// True when the package is published under the same name it is imported as.
    pub fn is_self_named(&self) -> bool {
        self.name == self.hosted_name
    }

    #[must_use]
    pub fn with_repository_url(&self, repository_url: Url) -> Self {
        Self {
            repository_url,
            ..self.clone()
        }
    }

    pub fn with_hosted_name(&self, hosted_name: impl Into<String>) -> Result<Self> {
        let hosted_name = hosted_name.into();
        ensure_package_name(&hosted_name)?;
        Ok(Self {
            hosted_name,
            ..self.clone()
        })
    }

    #[must_use]
    pub fn with_constraint(&self, constraint: VersionConstraint) -> Self {
        Self {
            constraint,
            ..self.clone()
        }
    }
}

/// A package on the local filesystem, relative to the owning pubspec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalReference {
    name: String,
    path: PathBuf,
}

impl LocalReference {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Result<Self> {
        let name = name.into();
        ensure_package_name(&name)?;
        Ok(Self {
            name,
            path: path.into(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn with_path(&self, path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..self.clone()
        }
    }

    /// Joins the reference path onto `project_root`.
    ///
    /// # Errors
    ///
    /// Returns [`PubspecError::NotADirectory`] if the resolved target is not an
    /// existing directory.
    pub fn resolve(&self, project_root: &Path) -> Result<PathBuf> {
        let resolved = project_root.join(&self.path);
        if resolved.is_dir() {
            Ok(resolved)
        } else {
            Err(PubspecError::NotADirectory { path: resolved })
        }
    }
}

/// Repository location of a git dependency.
///
/// Accepts `http(s)`, `ssh`, `git` and `file` URLs as well as scp-like
/// `user@host:path` addresses, and keeps the text exactly as written.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GitUrl(String);

impl GitUrl {
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim();

        let recognized = match Url::parse(text) {
            Ok(url) => matches!(
                url.scheme(),
                "http" | "https" | "ssh" | "git" | "git+ssh" | "file"
            ),
            Err(_) => SCP_LIKE_GIT_URL.is_match(text),
        };

        if recognized {
            Ok(Self(text.to_string()))
        } else {
            Err(PubspecError::InvalidGitUrl {
                url: text.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GitUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A package fetched from a git repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitReference {
    name: String,
    repository_url: GitUrl,
    path: Option<String>,
    git_ref: Option<String>,
}

impl GitReference {
    pub fn new(
        name: impl Into<String>,
        repository_url: GitUrl,
        path: Option<String>,
        git_ref: Option<String>,
    ) -> Result<Self> {
        let name = name.into();
        ensure_package_name(&name)?;
        Ok(Self {
            name,
            repository_url,
            path,
            git_ref,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn repository_url(&self) -> &GitUrl {
        &self.repository_url
    }

    /// Subdirectory of the repository holding the package.
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Branch, tag or commit to check out.
    pub fn git_ref(&self) -> Option<&str> {
        self.git_ref.as_deref()
    }

    #[must_use]
    pub fn with_repository_url(&self, repository_url: GitUrl) -> Self {
        Self {
            repository_url,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_path(&self, path: Option<String>) -> Self {
        Self {
            path,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_ref(&self, git_ref: Option<String>) -> Self {
        Self {
            git_ref,
            ..self.clone()
        }
    }
}

/// A package bundled with an SDK such as Flutter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SdkReference {
    name: String,
    sdk: String,
    constraint: VersionConstraint,
}

impl SdkReference {
    pub fn new(
        name: impl Into<String>,
        sdk: impl Into<String>,
        constraint: VersionConstraint,
    ) -> Result<Self> {
        let name = name.into();
        ensure_package_name(&name)?;
        Ok(Self {
            name,
            sdk: sdk.into(),
            constraint,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn sdk(&self) -> &str {
        &self.sdk
    }

    pub fn constraint(&self) -> &VersionConstraint {
        &self.constraint
    }

    #[must_use]
    pub fn with_sdk(&self, sdk: impl Into<String>) -> Self {
        Self {
            sdk: sdk.into(),
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_constraint(&self, constraint: VersionConstraint) -> Self {
        Self {
            constraint,
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DependencyReference {
    Hosted(HostedReference),
    ThirdPartyHosted(ThirdPartyHostedReference),
    Local(LocalReference),
    Git(GitReference),
    Sdk(SdkReference),
}

impl DependencyReference {
    pub fn name(&self) -> &str {
        delegate_to_variants!(self, name)
    }

    pub fn kind(&self) -> ReferenceKind {
        match self {
            Self::Hosted(_) => ReferenceKind::Hosted,
            Self::ThirdPartyHosted(_) => ReferenceKind::ThirdPartyHosted,
            Self::Local(_) => ReferenceKind::Local,
            Self::Git(_) => ReferenceKind::Git,
            Self::Sdk(_) => ReferenceKind::Sdk,
        }
    }

    /// Version constraint of the kinds that carry one.
    pub fn constraint(&self) -> Option<&VersionConstraint> {
        match self {
            Self::Hosted(r) => Some(r.constraint()),
            Self::ThirdPartyHosted(r) => Some(r.constraint()),
            Self::Sdk(r) => Some(r.constraint()),
            Self::Local(_) | Self::Git(_) => None,
        }
    }

    /// Downcasts to a concrete variant struct.
    pub fn as_typed<T: TypedReference>(&self) -> Option<&T> {
        T::from_reference(self)
    }
}

/// Implemented by each variant struct of [`DependencyReference`].
pub trait TypedReference: Sized {
    const KIND: ReferenceKind;

    fn from_reference(reference: &DependencyReference) -> Option<&Self>;
}

impl_reference_variant!(HostedReference, Hosted);
impl_reference_variant!(ThirdPartyHostedReference, ThirdPartyHosted);
impl_reference_variant!(LocalReference, Local);
impl_reference_variant!(GitReference, Git);
impl_reference_variant!(SdkReference, Sdk);
