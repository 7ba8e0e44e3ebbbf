//! Immutable point-in-time copies of a [`Pubspec`].

use crate::additional::AdditionalData;
use crate::pubspec::{Environment, Pubspec, PubspecView};
use crate::reference_set::{FrozenDependencySet, FrozenOverrideSet};
use semver::Version;
use url::Url;

/// Frozen copy of every field of a [`Pubspec`].
///
/// Nothing in a snapshot can change after it is taken. Its dependency sets
/// are [`FrozenReferenceSet`](crate::reference_set::FrozenReferenceSet)s.
#[derive(Debug, Clone, PartialEq)]
pub struct PubspecSnapshot {
    name: String,
    environment: Environment,
    version: Option<Version>,
    publish_to: Option<String>,
    description: Option<String>,
    homepage: Option<Url>,
    repository: Option<Url>,
    issue_tracker: Option<Url>,
    documentation: Option<Url>,
    dependencies: FrozenDependencySet,
    dev_dependencies: FrozenDependencySet,
    dependency_overrides: FrozenOverrideSet,
    additional_data: AdditionalData,
}

impl PubspecSnapshot {
    /// Deep-copies the current state of `pubspec`.
    pub fn capture(pubspec: &Pubspec) -> Self {
        Self {
            name: pubspec.name.clone(),
            environment: pubspec.environment.clone(),
            version: pubspec.version.clone(),
            publish_to: pubspec.publish_to.clone(),
            description: pubspec.description.clone(),
            homepage: pubspec.homepage.clone(),
            repository: pubspec.repository.clone(),
            issue_tracker: pubspec.issue_tracker.clone(),
            documentation: pubspec.documentation.clone(),
            dependencies: pubspec.dependencies.freeze(),
            dev_dependencies: pubspec.dev_dependencies.freeze(),
            dependency_overrides: pubspec.dependency_overrides.freeze(),
            additional_data: pubspec.additional_data.clone(),
        }
    }

    /// Builds a new, independent document holding this snapshot's values.
    pub fn materialize(&self) -> Pubspec {
        Pubspec {
            name: self.name.clone(),
            environment: self.environment.clone(),
            version: self.version.clone(),
            publish_to: self.publish_to.clone(),
            description: self.description.clone(),
            homepage: self.homepage.clone(),
            repository: self.repository.clone(),
            issue_tracker: self.issue_tracker.clone(),
            documentation: self.documentation.clone(),
            dependencies: self.dependencies.thaw(),
            dev_dependencies: self.dev_dependencies.thaw(),
            dependency_overrides: self.dependency_overrides.thaw(),
            additional_data: self.additional_data.clone(),
        }
    }
}

impl Pubspec {
    pub fn snapshot(&self) -> PubspecSnapshot {
        PubspecSnapshot::capture(self)
    }

    /// Overwrites every field in place with the values of `snapshot`.
    pub fn restore(&mut self, snapshot: &PubspecSnapshot) {
        self.name.clone_from(&snapshot.name);
        self.environment.clone_from(&snapshot.environment);
        self.version.clone_from(&snapshot.version);
        self.publish_to.clone_from(&snapshot.publish_to);
        self.description.clone_from(&snapshot.description);
        self.homepage.clone_from(&snapshot.homepage);
        self.repository.clone_from(&snapshot.repository);
        self.issue_tracker.clone_from(&snapshot.issue_tracker);
        self.documentation.clone_from(&snapshot.documentation);
        self.dependencies.replace_with(&snapshot.dependencies);
        self.dev_dependencies.replace_with(&snapshot.dev_dependencies);
        self.dependency_overrides
            .replace_with(&snapshot.dependency_overrides);
        self.additional_data.clone_from(&snapshot.additional_data);
    }
}

impl From<&Pubspec> for PubspecSnapshot {
    fn from(pubspec: &Pubspec) -> Self {
        Self::capture(pubspec)
    }
}

impl PubspecView for PubspecSnapshot {
    type Dependencies = FrozenDependencySet;
    type Overrides = FrozenOverrideSet;

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

    fn dependencies(&self) -> &FrozenDependencySet {
        &self.dependencies
    }

    fn dev_dependencies(&self) -> &FrozenDependencySet {
        &self.dev_dependencies
    }

    fn dependency_overrides(&self) -> &FrozenOverrideSet {
        &self.dependency_overrides
    }

    fn additional_data(&self) -> &AdditionalData {
        &self.additional_data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{GitReference, GitUrl, HostedReference};
    use crate::reference_set::ReferenceLookup;
    use pubspec_core::VersionConstraint;
    use yaml_rust2::Yaml;

    fn constraint(text: &str) -> VersionConstraint {
        VersionConstraint::parse(Some(text)).unwrap()
    }

    fn sample() -> Pubspec {
        let env = Environment::parse(">=2.12.0 <3.0.0", None).unwrap();
        let mut p = Pubspec::new("my_app", env).unwrap();
        p.set_version_str(Some("1.0.0+1")).unwrap();
        p.set_description(Some("A new Flutter project.".into()));
        p.dependencies_mut()
            .add(HostedReference::new("path", constraint("^1.8.0")).unwrap())
            .unwrap();
        p.dependency_overrides_mut()
            .add(
                GitReference::new(
                    "window_size",
                    GitUrl::parse("https://github.com/google/flutter-desktop-embedding.git")
                        .unwrap(),
                    None,
                    None,
                )
                .unwrap(),
            )
            .unwrap();
        p.append_additional_data("flutter", Yaml::Null).unwrap();
        p
    }

    #[test]
    fn test_snapshot_is_detached() {
        let mut p = sample();
        let snapshot = p.snapshot();

        p.set_name("changed").unwrap();
        p.dependencies_mut().clear();
        p.clear_additional_data();

        assert_eq!(snapshot.name(), "my_app");
        assert!(snapshot.dependencies().contains("path"));
        assert!(snapshot.is_flutter_project());
    }

    #[test]
    fn test_restore_in_place() {
        let mut p = sample();
        let snapshot = PubspecSnapshot::from(&p);

        p.set_name("changed").unwrap();
        p.set_version(None);
        p.dependencies_mut()
            .set(HostedReference::new("path", constraint("^2.0.0")).unwrap())
            .unwrap();
        p.dev_dependencies_mut()
            .add(HostedReference::any("lints").unwrap())
            .unwrap();
        p.dependency_overrides_mut().clear();

        p.restore(&snapshot);
        assert_eq!(p, sample());
    }

    #[test]
    fn test_materialize_builds_independent_document() {
        let original = sample();
        let snapshot = original.snapshot();

        let mut copy = snapshot.materialize();
        assert_eq!(copy, original);

        copy.dependencies_mut().remove("path");
        assert!(snapshot.dependencies().contains("path"));
        assert!(original.dependencies().contains("path"));
    }

    #[test]
    fn test_snapshot_equality() {
        let p = sample();
        assert_eq!(p.snapshot(), p.snapshot());
        assert_eq!(p.snapshot().materialize().snapshot(), p.snapshot());
    }
}
