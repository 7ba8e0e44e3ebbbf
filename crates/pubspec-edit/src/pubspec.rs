//! The validated, mutable pubspec document.

use crate::additional::AdditionalData;
use crate::reference_set::{DependencySet, OverrideSet, ReferenceLookup};
use pubspec_core::{
    ConstraintPattern, PubspecError, Result, VersionConstraint, ensure_http_url,
    ensure_package_name, parse_http_url,
};
use semver::Version;
use url::Url;
use yaml_rust2::Yaml;

/// `environment` section: the Dart SDK constraint and an optional Flutter one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Environment {
    sdk: VersionConstraint,
    flutter: Option<VersionConstraint>,
}

impl Environment {
    /// # Errors
    ///
    /// The SDK constraint must have a lower bound and must not use caret
    /// syntax, otherwise [`PubspecError::UnboundedSdkConstraint`] or
    /// [`PubspecError::CaretSdkConstraint`] is returned.
    pub fn new(sdk: VersionConstraint, flutter: Option<VersionConstraint>) -> Result<Self> {
        if sdk.pattern() == ConstraintPattern::Caret {
            return Err(PubspecError::CaretSdkConstraint {
                constraint: sdk.to_string(),
            });
        }
        if sdk.lower_bound().is_none() {
            return Err(PubspecError::UnboundedSdkConstraint {
                constraint: sdk.to_string(),
            });
        }
        Ok(Self { sdk, flutter })
    }

    /// Parses both constraints from text.
    pub fn parse(sdk: &str, flutter: Option<&str>) -> Result<Self> {
        let sdk = VersionConstraint::parse(Some(sdk))?;
        let flutter = flutter
            .map(|text| VersionConstraint::parse(Some(text)))
            .transpose()?;
        Self::new(sdk, flutter)
    }

    pub fn sdk(&self) -> &VersionConstraint {
        &self.sdk
    }

    pub fn flutter(&self) -> Option<&VersionConstraint> {
        self.flutter.as_ref()
    }
}

/// Read access shared by [`Pubspec`] and
/// [`PubspecSnapshot`](crate::snapshot::PubspecSnapshot).
pub trait PubspecView {
    type Dependencies: ReferenceLookup;
    type Overrides: ReferenceLookup;

    fn name(&self) -> &str;
    fn environment(&self) -> &Environment;
    fn version(&self) -> Option<&Version>;
    fn publish_to(&self) -> Option<&str>;
    fn description(&self) -> Option<&str>;
    fn homepage(&self) -> Option<&Url>;
    fn repository(&self) -> Option<&Url>;
    fn issue_tracker(&self) -> Option<&Url>;
    fn documentation(&self) -> Option<&Url>;
    fn dependencies(&self) -> &Self::Dependencies;
    fn dev_dependencies(&self) -> &Self::Dependencies;
    fn dependency_overrides(&self) -> &Self::Overrides;
    fn additional_data(&self) -> &AdditionalData;

    /// A Flutter SDK constraint is declared or a `flutter` section is present.
    fn is_flutter_project(&self) -> bool {
        self.environment().flutter().is_some()
            || self.additional_data().contains("flutter").unwrap_or(false)
    }

    /// `publish_to: none` marks a package that must not be published.
    fn is_publishable(&self) -> bool {
        self.publish_to() != Some("none")
    }
}

/// Every field of a document, used to build a [`Pubspec`] in one step.
#[derive(Debug, Clone)]
pub struct PubspecParts {
    pub name: String,
    pub environment: Environment,
    pub version: Option<Version>,
    pub publish_to: Option<String>,
    pub description: Option<String>,
    pub homepage: Option<Url>,
    pub repository: Option<Url>,
    pub issue_tracker: Option<Url>,
    pub documentation: Option<Url>,
    pub dependencies: DependencySet,
    pub dev_dependencies: DependencySet,
    pub dependency_overrides: OverrideSet,
    pub additional_data: AdditionalData,
}

impl PubspecParts {
    /// Parts with only the mandatory fields set. `publish_to` is `none`.
    pub fn new(name: impl Into<String>, environment: Environment) -> Self {
        Self {
            name: name.into(),
            environment,
            version: None,
            publish_to: Some("none".to_string()),
            description: None,
            homepage: None,
            repository: None,
            issue_tracker: None,
            documentation: None,
            dependencies: DependencySet::new(),
            dev_dependencies: DependencySet::new(),
            dependency_overrides: OverrideSet::new(),
            additional_data: AdditionalData::new(),
        }
    }
}

/// A pubspec document whose fields are validated on every change.
#[derive(Debug, Clone, PartialEq)]
pub struct Pubspec {
    pub(crate) name: String,
    pub(crate) environment: Environment,
    pub(crate) version: Option<Version>,
    pub(crate) publish_to: Option<String>,
    pub(crate) description: Option<String>,
    pub(crate) homepage: Option<Url>,
    pub(crate) repository: Option<Url>,
    pub(crate) issue_tracker: Option<Url>,
    pub(crate) documentation: Option<Url>,
    pub(crate) dependencies: DependencySet,
    pub(crate) dev_dependencies: DependencySet,
    pub(crate) dependency_overrides: OverrideSet,
    pub(crate) additional_data: AdditionalData,
}

impl Pubspec {
    /// Creates a document with only the mandatory fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use pubspec_edit::{Environment, Pubspec, PubspecView};
    ///
    /// let env = Environment::parse(">=2.12.0 <3.0.0", None).unwrap();
    /// let pubspec = Pubspec::new("my_app", env).unwrap();
    /// assert_eq!(pubspec.publish_to(), Some("none"));
    /// assert!(Pubspec::new("My App", pubspec.environment().clone()).is_err());
    /// ```
    pub fn new(name: impl Into<String>, environment: Environment) -> Result<Self> {
        Self::from_parts(PubspecParts::new(name, environment))
    }

    /// Creates a document from explicit field values, validating the name
    /// and every URL.
    pub fn from_parts(parts: PubspecParts) -> Result<Self> {
        ensure_package_name(&parts.name)?;
        Ok(Self {
            name: parts.name,
            environment: parts.environment,
            version: parts.version,
            publish_to: parts.publish_to,
            description: parts.description,
            homepage: ensure_http_url("homepage", parts.homepage)?,
            repository: ensure_http_url("repository", parts.repository)?,
            issue_tracker: ensure_http_url("issue_tracker", parts.issue_tracker)?,
            documentation: ensure_http_url("documentation", parts.documentation)?,
            dependencies: parts.dependencies,
            dev_dependencies: parts.dev_dependencies,
            dependency_overrides: parts.dependency_overrides,
            additional_data: parts.additional_data,
        })
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<()> {
        let name = name.into();
        ensure_package_name(&name)?;
        self.name = name;
        Ok(())
    }

    pub fn set_environment(&mut self, environment: Environment) {
        self.environment = environment;
    }

    /// Replaces the SDK constraint and keeps the Flutter one.
    pub fn set_sdk_constraint(&mut self, sdk: VersionConstraint) -> Result<()> {
        self.environment = Environment::new(sdk, self.environment.flutter.clone())?;
        Ok(())
    }

    pub fn set_flutter_constraint(&mut self, flutter: Option<VersionConstraint>) {
        self.environment.flutter = flutter;
    }

    pub fn set_version(&mut self, version: Option<Version>) {
        self.version = version;
    }

    /// Parses and sets the package version.
    ///
    /// # Errors
    ///
    /// Returns [`PubspecError::InvalidVersion`] if `version` is not semver.
    pub fn set_version_str(&mut self, version: Option<&str>) -> Result<()> {
        self.version = version.map(parse_version).transpose()?;
        Ok(())
    }

    pub fn set_publish_to(&mut self, publish_to: Option<String>) {
        self.publish_to = publish_to;
    }

    pub fn set_description(&mut self, description: Option<String>) {
        self.description = description;
    }

    pub fn set_homepage(&mut self, url: Option<Url>) -> Result<()> {
        self.homepage = ensure_http_url("homepage", url)?;
        Ok(())
    }

    pub fn set_homepage_str(&mut self, url: Option<&str>) -> Result<()> {
        self.homepage = parse_http_url("homepage", url)?;
        Ok(())
    }

    pub fn set_repository(&mut self, url: Option<Url>) -> Result<()> {
        self.repository = ensure_http_url("repository", url)?;
        Ok(())
    }

    pub fn set_repository_str(&mut self, url: Option<&str>) -> Result<()> {
        self.repository = parse_http_url("repository", url)?;
        Ok(())
    }

    pub fn set_issue_tracker(&mut self, url: Option<Url>) -> Result<()> {
        self.issue_tracker = ensure_http_url("issue_tracker", url)?;
        Ok(())
    }

    pub fn set_issue_tracker_str(&mut self, url: Option<&str>) -> Result<()> {
        self.issue_tracker = parse_http_url("issue_tracker", url)?;
        Ok(())
    }

    pub fn set_documentation(&mut self, url: Option<Url>) -> Result<()> {
        self.documentation = ensure_http_url("documentation", url)?;
        Ok(())
    }

    pub fn set_documentation_str(&mut self, url: Option<&str>) -> Result<()> {
        self.documentation = parse_http_url("documentation", url)?;
        Ok(())
    }

    pub fn dependencies_mut(&mut self) -> &mut DependencySet {
        &mut self.dependencies
    }

    pub fn dev_dependencies_mut(&mut self) -> &mut DependencySet {
        &mut self.dev_dependencies
    }

    pub fn dependency_overrides_mut(&mut self) -> &mut OverrideSet {
        &mut self.dependency_overrides
    }

    /// Adds an unmodeled top-level field if `key` is not present yet.
    ///
    /// # Errors
    ///
    /// [`PubspecError::ReservedKey`] when `key` is a modeled field and
    /// [`PubspecError::NotJsonCompatible`] when `value` has no JSON form.
    pub fn append_additional_data(&mut self, key: &str, value: Yaml) -> Result<bool> {
        self.additional_data.append(key, value)
    }

    /// Adds or replaces an unmodeled top-level field.
    pub fn modify_additional_data(&mut self, key: &str, value: Yaml) -> Result<()> {
        self.additional_data.modify(key, value)
    }

    pub fn remove_additional_data(&mut self, key: &str) -> Result<Option<Yaml>> {
        self.additional_data.remove(key)
    }

    pub fn additional_data_value(&self, key: &str) -> Result<Option<&Yaml>> {
        self.additional_data.get(key)
    }

    pub fn contains_additional_data(&self, key: &str) -> Result<bool> {
        self.additional_data.contains(key)
    }

    pub fn clear_additional_data(&mut self) {
        self.additional_data.clear();
    }
}

impl PubspecView for Pubspec {
    type Dependencies = DependencySet;
    type Overrides = OverrideSet;

    fn name(&self) -> &str {
        &self.name
    }

    fn environment(&self) -> &Environment {
        &self.environment
    }

    fn version(&self) -> Option<&Version> {
        self.version.as_ref()
    }

    fn publish_to(&self) -> Option<&str> {
        self.publish_to.as_deref()
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn homepage(&self) -> Option<&Url> {
        self.homepage.as_ref()
    }

    fn repository(&self) -> Option<&Url> {
        self.repository.as_ref()
    }

    fn issue_tracker(&self) -> Option<&Url> {
        self.issue_tracker.as_ref()
    }

    fn documentation(&self) -> Option<&Url> {
        self.documentation.as_ref()
    }

    fn dependencies(&self) -> &DependencySet {
        &self.dependencies
    }

    fn dev_dependencies(&self) -> &DependencySet {
        &self.dev_dependencies
    }

    fn dependency_overrides(&self) -> &OverrideSet {
        &self.dependency_overrides
    }

    fn additional_data(&self) -> &AdditionalData {
        &self.additional_data
    }
}

pub(crate) fn parse_version(text: &str) -> Result<Version> {
    Version::parse(text.trim()).map_err(|source| PubspecError::InvalidVersion {
        version: text.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{HostedReference, LocalReference};

    fn environment() -> Environment {
        Environment::parse(">=2.12.0 <3.0.0", None).unwrap()
    }

    fn pubspec() -> Pubspec {
        Pubspec::new("my_app", environment()).unwrap()
    }

    #[test]
    fn test_new_defaults() {
        let p = pubspec();
        assert_eq!(p.name(), "my_app");
        assert_eq!(p.publish_to(), Some("none"));
        assert!(!p.is_publishable());
        assert!(p.version().is_none());
        assert!(p.description().is_none());
        assert!(p.homepage().is_none());
        assert!(p.dependencies().is_empty());
        assert!(p.additional_data().is_empty());
    }

    #[test]
    fn test_set_name() {
        let mut p = pubspec();
        let err = p.set_name("X jps").unwrap_err();
        assert!(matches!(err, PubspecError::InvalidName { ref name } if name == "X jps"));
        assert!(p.set_name("enum").is_err());
        assert_eq!(p.name(), "my_app");

        p.set_name("renamed_app").unwrap();
        assert_eq!(p.name(), "renamed_app");
    }

    #[test]
    fn test_environment_rules() {
        let caret = VersionConstraint::parse(Some("^2.12.0")).unwrap();
        assert!(matches!(
            Environment::new(caret, None),
            Err(PubspecError::CaretSdkConstraint { .. })
        ));

        for text in ["<3.0.0", "any"] {
            let unbounded = VersionConstraint::parse(Some(text)).unwrap();
            assert!(matches!(
                Environment::new(unbounded, None),
                Err(PubspecError::UnboundedSdkConstraint { .. })
            ));
        }

        let env = Environment::parse(">=2.17.0 <3.0.0", Some(">=3.0.0")).unwrap();
        assert_eq!(env.flutter().unwrap().raw_text(), Some(">=3.0.0"));
        assert!(Environment::parse("2.12.0", None).is_ok());
    }

    #[test]
    fn test_set_sdk_constraint_keeps_flutter() {
        let mut p = pubspec();
        p.set_flutter_constraint(Some(VersionConstraint::parse(Some(">=3.0.0")).unwrap()));
        assert!(p.set_sdk_constraint(VersionConstraint::parse(Some("^2.17.0")).unwrap()).is_err());
        assert_eq!(p.environment().sdk().raw_text(), Some(">=2.12.0 <3.0.0"));

        p.set_sdk_constraint(VersionConstraint::parse(Some(">=2.17.0 <3.0.0")).unwrap())
            .unwrap();
        assert_eq!(p.environment().sdk().raw_text(), Some(">=2.17.0 <3.0.0"));
        assert!(p.environment().flutter().is_some());
    }

    #[test]
    fn test_url_setters() {
        let mut p = pubspec();
        p.set_homepage_str(Some("https://example.com")).unwrap();
        p.set_repository_str(Some("https://github.com/user/repo")).unwrap();
        p.set_issue_tracker_str(Some("https://github.com/user/repo/issues")).unwrap();
        p.set_documentation(Some(Url::parse("http://docs.example.com").unwrap()))
            .unwrap();
        assert_eq!(p.homepage().unwrap().host_str(), Some("example.com"));

        let err = p
            .set_repository(Some(Url::parse("ssh://git@github.com/user/repo").unwrap()))
            .unwrap_err();
        assert!(matches!(
            err,
            PubspecError::NonHttpUrl {
                field: "repository",
                ..
            }
        ));
        assert!(p.repository().is_some());

        p.set_homepage(None).unwrap();
        assert!(p.homepage().is_none());
    }

    #[test]
    fn test_from_parts_validates() {
        let mut parts = PubspecParts::new("my_app", environment());
        parts.homepage = Some(Url::parse("ftp://example.com").unwrap());
        assert!(matches!(
            Pubspec::from_parts(parts),
            Err(PubspecError::NonHttpUrl { .. })
        ));

        let parts = PubspecParts::new("My-App", environment());
        assert!(matches!(
            Pubspec::from_parts(parts),
            Err(PubspecError::InvalidName { .. })
        ));
    }

    #[test]
    fn test_version_setters() {
        let mut p = pubspec();
        p.set_version_str(Some("1.0.0+1")).unwrap();
        assert_eq!(p.version().unwrap().to_string(), "1.0.0+1");

        assert!(matches!(
            p.set_version_str(Some("1.0")),
            Err(PubspecError::InvalidVersion { .. })
        ));
        assert_eq!(p.version().unwrap().to_string(), "1.0.0+1");

        p.set_version(None);
        assert!(p.version().is_none());
    }

    #[test]
    fn test_unconditional_setters() {
        let mut p = pubspec();
        p.set_publish_to(None);
        assert!(p.is_publishable());
        p.set_description(Some("A new Flutter project.".into()));
        assert_eq!(p.description(), Some("A new Flutter project."));
    }

    #[test]
    fn test_collections_are_mutable_through_document() {
        let mut p = pubspec();
        p.dependencies_mut()
            .add(HostedReference::any("path").unwrap())
            .unwrap();
        p.dev_dependencies_mut()
            .add(LocalReference::new("local_pkg", "../local_pkg").unwrap())
            .unwrap();
        assert!(
            p.dependency_overrides_mut()
                .add(
                    HostedReference::new("path", VersionConstraint::parse(Some("^1.0.0")).unwrap())
                        .unwrap(),
                )
                .is_err()
        );

        assert!(p.dependencies().contains("path"));
        assert_eq!(p.dev_dependencies().len(), 1);
        assert!(p.dependency_overrides().is_empty());
    }

    #[test]
    fn test_additional_data() {
        let mut p = pubspec();
        assert!(!p.is_flutter_project());

        assert!(p.append_additional_data("flutter", Yaml::Null).unwrap());
        assert!(p.is_flutter_project());
        assert!(!p.append_additional_data("flutter", Yaml::Boolean(true)).unwrap());

        p.modify_additional_data("flutter", Yaml::Boolean(true)).unwrap();
        assert_eq!(
            p.additional_data_value("flutter").unwrap(),
            Some(&Yaml::Boolean(true))
        );

        assert!(matches!(
            p.append_additional_data("dependencies", Yaml::Null),
            Err(PubspecError::ReservedKey { .. })
        ));
        assert!(matches!(
            p.modify_additional_data("version", Yaml::Null),
            Err(PubspecError::ReservedKey { .. })
        ));

        assert!(p.contains_additional_data("flutter").unwrap());
        p.remove_additional_data("flutter").unwrap();
        assert!(!p.contains_additional_data("flutter").unwrap());

        p.append_additional_data("executables", Yaml::Null).unwrap();
        p.clear_additional_data();
        assert!(p.additional_data().is_empty());
    }

    #[test]
    fn test_flutter_environment_marks_flutter_project() {
        let mut p = pubspec();
        p.set_flutter_constraint(Some(VersionConstraint::parse(Some(">=1.17.0")).unwrap()));
        assert!(p.is_flutter_project());
    }
}
