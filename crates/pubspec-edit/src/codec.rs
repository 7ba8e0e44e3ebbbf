//! Dependency reference codec.
//!
//! A dependency entry carries no explicit type tag, so decoding sniffs the
//! shape of the value node. Each [`ReferenceKind`] owns one shape predicate;
//! a node must satisfy exactly one of them. Encoding picks between the
//! succinct and qualified third-party hosted forms from the document's
//! declared SDK constraint and the caller's [`FormatPreferences`].

use crate::format::FormatPreferences;
use crate::reference::{
    DependencyReference, GitReference, GitUrl, HostedReference, LocalReference, ReferenceKind,
    SdkReference, ThirdPartyHostedReference,
};
use crate::reference_set::{Admission, ReferenceLookup, ReferenceSet};
use pubspec_core::{PubspecError, Result, VersionConstraint, parse_url};
use std::borrow::Cow;
use yaml_rust2::Yaml;
use yaml_rust2::yaml::Hash;

type ShapePredicate = fn(&Yaml) -> bool;
type ShapeDecoder = fn(&str, &Yaml) -> Result<DependencyReference>;

struct ReferenceShape {
    kind: ReferenceKind,
    matches: ShapePredicate,
    decode: ShapeDecoder,
}

/// Shapes in evaluation order.
static SHAPES: [ReferenceShape; 5] = [
    ReferenceShape {
        kind: ReferenceKind::Hosted,
        matches: is_hosted_shape,
        decode: decode_hosted,
    },
    ReferenceShape {
        kind: ReferenceKind::Local,
        matches: is_local_shape,
        decode: decode_local,
    },
    ReferenceShape {
        kind: ReferenceKind::Git,
        matches: is_git_shape,
        decode: decode_git,
    },
    ReferenceShape {
        kind: ReferenceKind::ThirdPartyHosted,
        matches: is_third_party_hosted_shape,
        decode: decode_third_party_hosted,
    },
    ReferenceShape {
        kind: ReferenceKind::Sdk,
        matches: is_sdk_shape,
        decode: decode_sdk,
    },
];

/// Constraint text of a bare scalar entry. YAML reads `foo: 1.0` as a
/// number, so numeric scalars are taken in their written form.
fn scalar_constraint_text(node: &Yaml) -> Option<Cow<'_, str>> {
    match node {
        Yaml::String(text) | Yaml::Real(text) => Some(Cow::Borrowed(text)),
        Yaml::Integer(number) => Some(Cow::Owned(number.to_string())),
        _ => None,
    }
}

fn is_hosted_shape(node: &Yaml) -> bool {
    node.is_null() || scalar_constraint_text(node).is_some()
}

fn is_local_shape(node: &Yaml) -> bool {
    node["path"].as_str().is_some()
}

fn is_git_shape(node: &Yaml) -> bool {
    match &node["git"] {
        Yaml::String(_) => true,
        git @ Yaml::Hash(_) => git["url"].as_str().is_some(),
        _ => false,
    }
}

fn is_third_party_hosted_shape(node: &Yaml) -> bool {
    match &node["hosted"] {
        Yaml::String(_) => true,
        hosted @ Yaml::Hash(_) => {
            hosted["name"].as_str().is_some() && hosted["url"].as_str().is_some()
        }
        _ => false,
    }
}

fn is_sdk_shape(node: &Yaml) -> bool {
    node["sdk"].as_str().is_some()
}

fn find_shape(name: &str, node: &Yaml) -> Result<&'static ReferenceShape> {
    let mut matched = SHAPES.iter().filter(|shape| (shape.matches)(node));

    match (matched.next(), matched.next()) {
        (Some(shape), None) => Ok(shape),
        (None, _) => Err(PubspecError::UnrecognizedReference {
            name: name.to_string(),
        }),
        (Some(first), Some(second)) => Err(PubspecError::AmbiguousReference {
            name: name.to_string(),
            candidates: [first, second]
                .into_iter()
                .chain(matched)
                .map(|shape| shape.kind.as_str())
                .collect(),
        }),
    }
}

/// Determines which reference kind the value node of dependency `name` uses.
///
/// # Errors
///
/// [`PubspecError::UnrecognizedReference`] when no shape matches and
/// [`PubspecError::AmbiguousReference`] when several do.
pub fn classify(name: &str, node: &Yaml) -> Result<ReferenceKind> {
    find_shape(name, node).map(|shape| shape.kind)
}

/// Decodes one `name: value` entry of a dependency section.
pub fn decode_reference(name: &str, node: &Yaml) -> Result<DependencyReference> {
    let shape = find_shape(name, node)?;
    (shape.decode)(name, node)
}

fn required_str<'a>(name: &str, node: &'a Yaml, key: &str) -> Result<&'a str> {
    node[key]
        .as_str()
        .ok_or_else(|| PubspecError::missing_field(format!("dependency '{name}'"), key))
}

/// Reads an optional string field. Absent and null both mean "not set".
fn optional_str<'a>(name: &str, node: &'a Yaml, key: &str) -> Result<Option<&'a str>> {
    match &node[key] {
        Yaml::BadValue | Yaml::Null => Ok(None),
        Yaml::String(value) => Ok(Some(value.as_str())),
        _ => Err(PubspecError::invalid_structure(format!(
            "'{key}' of dependency '{name}' must be a string"
        ))),
    }
}

fn sibling_constraint(name: &str, node: &Yaml) -> Result<VersionConstraint> {
    VersionConstraint::parse(optional_str(name, node, "version")?)
}

fn decode_hosted(name: &str, node: &Yaml) -> Result<DependencyReference> {
    let constraint = VersionConstraint::parse(scalar_constraint_text(node).as_deref())?;
    Ok(HostedReference::new(name, constraint)?.into())
}

fn decode_local(name: &str, node: &Yaml) -> Result<DependencyReference> {
    let path = required_str(name, node, "path")?;
    Ok(LocalReference::new(name, path)?.into())
}

fn decode_git(name: &str, node: &Yaml) -> Result<DependencyReference> {
    let git = &node["git"];
    let reference = match git {
        Yaml::String(url) => GitReference::new(name, GitUrl::parse(url)?, None, None)?,
        _ => GitReference::new(
            name,
            GitUrl::parse(required_str(name, git, "url")?)?,
            optional_str(name, git, "path")?.map(String::from),
            optional_str(name, git, "ref")?.map(String::from),
        )?,
    };
    Ok(reference.into())
}

fn decode_third_party_hosted(name: &str, node: &Yaml) -> Result<DependencyReference> {
    let constraint = sibling_constraint(name, node)?;
    let hosted = &node["hosted"];
    let reference = match hosted {
        Yaml::String(url) => ThirdPartyHostedReference::new(name, parse_url(url)?, constraint)?,
        _ => ThirdPartyHostedReference::with_hosted_name_parts(
            name,
            parse_url(required_str(name, hosted, "url")?)?,
            required_str(name, hosted, "name")?,
            constraint,
        )?,
    };
    Ok(reference.into())
}

fn decode_sdk(name: &str, node: &Yaml) -> Result<DependencyReference> {
    let sdk = required_str(name, node, "sdk")?;
    let constraint = sibling_constraint(name, node)?;
    Ok(SdkReference::new(name, sdk, constraint)?.into())
}

fn string(value: impl Into<String>) -> Yaml {
    Yaml::String(value.into())
}

fn mapping<'a>(entries: impl IntoIterator<Item = (&'a str, Yaml)>) -> Yaml {
    let mut hash = Hash::new();
    for (key, value) in entries {
        hash.insert(string(key), value);
    }
    Yaml::Hash(hash)
}

/// `version` entry for constraints that have a textual form.
fn version_entry(constraint: &VersionConstraint) -> Option<(&'static str, Yaml)> {
    constraint.raw_text().map(|raw| ("version", string(raw)))
}

/// Encodes the value node of one dependency entry.
///
/// `sdk` is the document's declared SDK constraint. Together with `prefs` it
/// decides whether a self-named third-party hosted reference is written as
/// `hosted: <url>` or as `hosted: {name, url}`.
pub fn encode_reference(
    reference: &DependencyReference,
    sdk: &VersionConstraint,
    prefs: &FormatPreferences,
) -> Yaml {
    match reference {
        DependencyReference::Hosted(r) => r.constraint().raw_text().map_or(Yaml::Null, string),
        DependencyReference::Local(r) => mapping([("path", string(r.path().to_string_lossy()))]),
        DependencyReference::Git(r) => {
            let url = string(r.repository_url().as_str());
            if r.path().is_none() && r.git_ref().is_none() {
                return mapping([("git", url)]);
            }
            let details = [
                Some(("url", url)),
                r.path().map(|path| ("path", string(path))),
                r.git_ref().map(|git_ref| ("ref", string(git_ref))),
            ];
            mapping([("git", mapping(details.into_iter().flatten()))])
        }
        DependencyReference::ThirdPartyHosted(r) => {
            let url = string(r.repository_url().as_str());
            let hosted = if r.is_self_named() && prefs.succinct_hosted_allowed(sdk) {
                url
            } else {
                mapping([("name", string(r.hosted_name())), ("url", url)])
            };
            let entries = [Some(("hosted", hosted)), version_entry(r.constraint())];
            mapping(entries.into_iter().flatten())
        }
        DependencyReference::Sdk(r) => {
            let entries = [Some(("sdk", string(r.sdk()))), version_entry(r.constraint())];
            mapping(entries.into_iter().flatten())
        }
    }
}

/// Decodes a whole dependency section. A missing or null section is empty.
///
/// # Errors
///
/// Aborts on the first entry that fails to decode or that the set's
/// admission policy rejects.
pub fn decode_section<P: Admission>(section: &str, node: &Yaml) -> Result<ReferenceSet<P>> {
    let mut set = ReferenceSet::new();

    let entries = match node {
        Yaml::BadValue | Yaml::Null => return Ok(set),
        Yaml::Hash(entries) => entries,
        _ => {
            return Err(PubspecError::invalid_structure(format!(
                "'{section}' must be a mapping"
            )));
        }
    };

    for (key, value) in entries {
        let Some(name) = key.as_str() else {
            return Err(PubspecError::invalid_structure(format!(
                "'{section}' has a non-string dependency name"
            )));
        };
        set.set(decode_reference(name, value)?)?;
    }

    tracing::debug!("Decoded {} references from '{}'", set.len(), section);
    Ok(set)
}

/// Encodes a dependency section in insertion order.
pub fn encode_section(
    references: &impl ReferenceLookup,
    sdk: &VersionConstraint,
    prefs: &FormatPreferences,
) -> Yaml {
    let mut hash = Hash::new();
    for reference in references.iter() {
        hash.insert(
            string(reference.name()),
            encode_reference(reference, sdk, prefs),
        );
    }
    Yaml::Hash(hash)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference_set::{DependencySet, OverrideSet, PinnedOnly, Unrestricted};
    use url::Url;
    use yaml_rust2::YamlLoader;

    const QUALIFIED_GIT: &str = concat!(
        "{git: {url: \"git@github.com:google/flutter-desktop-embedding.git\", ",
        "path: plugins/window_size, ref: master}}"
    );

    fn yaml(text: &str) -> Yaml {
        YamlLoader::load_from_str(text).unwrap().remove(0)
    }

    fn constraint(text: &str) -> VersionConstraint {
        VersionConstraint::parse(Some(text)).unwrap()
    }

    fn modern_sdk() -> VersionConstraint {
        constraint(">=2.17.0 <3.0.0")
    }

    fn legacy_sdk() -> VersionConstraint {
        constraint(">=2.12.0 <3.0.0")
    }

    #[test]
    fn test_classification_of_canonical_shapes() {
        let cases = [
            ("\"^1.8.0\"", ReferenceKind::Hosted),
            ("null", ReferenceKind::Hosted),
            ("{path: ../local_pkg}", ReferenceKind::Local),
            ("{git: \"https://github.com/user/repo.git\"}", ReferenceKind::Git),
            (QUALIFIED_GIT, ReferenceKind::Git),
            ("{hosted: \"https://pub.example.com\"}", ReferenceKind::ThirdPartyHosted),
            (
                "{hosted: {name: custom_pkg, url: \"https://pub.example.com\"}, version: ^1.0.0}",
                ReferenceKind::ThirdPartyHosted,
            ),
            ("{sdk: flutter, version: \">=2.0.0\"}", ReferenceKind::Sdk),
        ];

        for (text, expected) in cases {
            let node = yaml(text);
            let matched: Vec<_> = SHAPES.iter().filter(|s| (s.matches)(&node)).collect();
            assert_eq!(matched.len(), 1, "{text}");
            assert_eq!(classify("pkg", &node).unwrap(), expected, "{text}");
        }
    }

    #[test]
    fn test_unrecognized_shapes() {
        for text in [
            "{version: ^1.0.0}",
            "true",
            "[a, b]",
            "{git: {path: x}}",
            "{hosted: {url: x}}",
        ] {
            assert!(
                matches!(
                    classify("pkg", &yaml(text)),
                    Err(PubspecError::UnrecognizedReference { ref name }) if name == "pkg"
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn test_ambiguous_shape() {
        let err = classify("pkg", &yaml("{path: ../pkg, sdk: flutter}")).unwrap_err();
        match err {
            PubspecError::AmbiguousReference { name, candidates } => {
                assert_eq!(name, "pkg");
                assert_eq!(candidates, ["local", "sdk"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_decode_hosted() {
        let reference = decode_reference("path", &yaml("\"^1.8.0\"")).unwrap();
        assert_eq!(
            reference,
            HostedReference::new("path", constraint("^1.8.0")).unwrap().into()
        );

        let any = decode_reference("path", &Yaml::Null).unwrap();
        assert!(any.constraint().unwrap().is_any());
        assert!(any.constraint().unwrap().raw_text().is_none());
    }

    #[test]
    fn test_decode_hosted_numeric_scalar() {
        // Unquoted `1.0` and `2` load as a real and an integer
        let real = decode_reference("path", &yaml("1.0")).unwrap();
        assert_eq!(classify("path", &yaml("1.0")).unwrap(), ReferenceKind::Hosted);
        assert_eq!(real.constraint().unwrap().raw_text(), Some("1.0"));
        assert!(real.constraint().unwrap().is_absolute());

        let integer = decode_reference("path", &yaml("2")).unwrap();
        assert_eq!(integer, decode_reference("path", &yaml("\"2\"")).unwrap());

        let encoded = encode_reference(&real, &modern_sdk(), &FormatPreferences::default());
        assert_eq!(encoded.as_str(), Some("1.0"));
        assert_eq!(decode_reference("path", &encoded).unwrap(), real);
    }

    #[test]
    fn test_decode_git_forms() {
        let short = decode_reference("repo", &yaml("{git: \"https://github.com/user/repo.git\"}"))
            .unwrap();
        let git = short.as_typed::<GitReference>().unwrap();
        assert!(git.path().is_none() && git.git_ref().is_none());

        let long = decode_reference("window_size", &yaml(QUALIFIED_GIT)).unwrap();
        let git = long.as_typed::<GitReference>().unwrap();
        assert_eq!(git.path(), Some("plugins/window_size"));
        assert_eq!(git.git_ref(), Some("master"));
    }

    #[test]
    fn test_decode_third_party_forms() {
        let succinct = decode_reference(
            "custom_pkg",
            &yaml("{hosted: \"https://pub.example.com\", version: ^1.0.0}"),
        )
        .unwrap();
        let r = succinct.as_typed::<ThirdPartyHostedReference>().unwrap();
        assert_eq!(r.hosted_name(), "custom_pkg");
        assert_eq!(r.constraint().raw_text(), Some("^1.0.0"));

        let qualified = decode_reference(
            "alias_pkg",
            &yaml("{hosted: {name: custom_pkg, url: \"https://pub.example.com\"}}"),
        )
        .unwrap();
        let r = qualified.as_typed::<ThirdPartyHostedReference>().unwrap();
        assert_eq!(r.hosted_name(), "custom_pkg");
        assert!(r.constraint().is_any());
    }

    #[test]
    fn test_decode_rejects_bad_optional_fields() {
        let err = decode_reference("pkg", &yaml("{sdk: flutter, version: [1]}")).unwrap_err();
        assert!(matches!(err, PubspecError::InvalidStructure { .. }));

        let err = decode_reference("pkg", &yaml("{git: {url: \"https://x.org/r.git\", ref: 3}}"))
            .unwrap_err();
        assert!(matches!(err, PubspecError::InvalidStructure { .. }));

        let err = decode_reference("pkg", &yaml("\"^not.a.version\"")).unwrap_err();
        assert!(matches!(err, PubspecError::InvalidVersionConstraint { .. }));

        let err = decode_reference("pkg", &yaml("{git: \"not a url\"}")).unwrap_err();
        assert!(matches!(err, PubspecError::InvalidGitUrl { .. }));

        let err = decode_reference("Bad", &yaml("\"^1.0.0\"")).unwrap_err();
        assert!(matches!(err, PubspecError::InvalidName { .. }));
    }

    #[test]
    fn test_required_field_reports_section() {
        let err = required_str("pkg", &yaml("{sdk: flutter}"), "path").unwrap_err();
        assert!(matches!(
            err,
            PubspecError::MissingField { ref section, ref field }
                if section == "dependency 'pkg'" && field == "path"
        ));
    }

    #[test]
    fn test_encode_hosted() {
        let sdk = modern_sdk();
        let prefs = FormatPreferences::default();
        let pinned = HostedReference::new("path", constraint("^1.8.0")).unwrap().into();
        assert_eq!(encode_reference(&pinned, &sdk, &prefs), string("^1.8.0"));

        let any = HostedReference::any("path").unwrap().into();
        assert_eq!(encode_reference(&any, &sdk, &prefs), Yaml::Null);
    }

    #[test]
    fn test_encode_git_omits_absent_keys() {
        let sdk = modern_sdk();
        let prefs = FormatPreferences::default();
        let url = GitUrl::parse("https://github.com/user/repo.git").unwrap();

        let bare: DependencyReference = GitReference::new("repo", url.clone(), None, None)
            .unwrap()
            .into();
        assert_eq!(
            encode_reference(&bare, &sdk, &prefs),
            yaml("{git: \"https://github.com/user/repo.git\"}")
        );

        let with_ref: DependencyReference =
            GitReference::new("repo", url, None, Some("v2".into())).unwrap().into();
        assert_eq!(
            encode_reference(&with_ref, &sdk, &prefs),
            yaml("{git: {url: \"https://github.com/user/repo.git\", ref: v2}}")
        );
    }

    #[test]
    fn test_encode_third_party_format_selection() {
        let url = Url::parse("https://pub.example.com").unwrap();
        let self_named: DependencyReference =
            ThirdPartyHostedReference::new("custom_pkg", url.clone(), constraint("^1.0.0"))
                .unwrap()
                .into();
        let renamed: DependencyReference = ThirdPartyHostedReference::with_hosted_name_parts(
            "alias_pkg",
            url,
            "custom_pkg",
            VersionConstraint::any(),
        )
        .unwrap()
        .into();

        let prefs = FormatPreferences::default();
        assert_eq!(
            encode_reference(&self_named, &modern_sdk(), &prefs),
            yaml("{hosted: \"https://pub.example.com/\", version: ^1.0.0}")
        );
        assert_eq!(
            encode_reference(&self_named, &legacy_sdk(), &prefs),
            yaml("{hosted: {name: custom_pkg, url: \"https://pub.example.com/\"}, version: ^1.0.0}")
        );
        assert_eq!(
            encode_reference(&self_named, &modern_sdk(), &FormatPreferences::qualified()),
            yaml("{hosted: {name: custom_pkg, url: \"https://pub.example.com/\"}, version: ^1.0.0}")
        );
        assert_eq!(
            encode_reference(&renamed, &modern_sdk(), &prefs),
            yaml("{hosted: {name: custom_pkg, url: \"https://pub.example.com/\"}}")
        );
    }

    #[test]
    fn test_encode_sdk_omits_any_version() {
        let sdk = SdkReference::new("flutter", "flutter", VersionConstraint::any())
            .unwrap()
            .into();
        assert_eq!(
            encode_reference(&sdk, &modern_sdk(), &FormatPreferences::default()),
            yaml("{sdk: flutter}")
        );
    }

    #[test]
    fn test_round_trip_every_kind() {
        let url = Url::parse("https://pub.example.com").unwrap();
        let references: Vec<DependencyReference> = vec![
            HostedReference::new("path", constraint("^1.8.0")).unwrap().into(),
            HostedReference::any("meta").unwrap().into(),
            LocalReference::new("local_pkg", "../local_pkg").unwrap().into(),
            GitReference::new(
                "window_size",
                GitUrl::parse("git@github.com:google/flutter-desktop-embedding.git").unwrap(),
                Some("plugins/window_size".into()),
                Some("master".into()),
            )
            .unwrap()
            .into(),
            ThirdPartyHostedReference::new("custom_pkg", url.clone(), constraint("^1.0.0"))
                .unwrap()
                .into(),
            ThirdPartyHostedReference::with_hosted_name_parts(
                "alias_pkg",
                url,
                "custom_pkg",
                constraint("2.0.0"),
            )
            .unwrap()
            .into(),
            SdkReference::new("flutter", "flutter", constraint(">=2.0.0")).unwrap().into(),
        ];

        for sdk in [modern_sdk(), legacy_sdk()] {
            for prefs in [FormatPreferences::default(), FormatPreferences::qualified()] {
                for reference in &references {
                    let encoded = encode_reference(reference, &sdk, &prefs);
                    let decoded = decode_reference(reference.name(), &encoded).unwrap();
                    assert_eq!(&decoded, reference);
                }
            }
        }
    }

    #[test]
    fn test_decode_section() {
        let node = yaml("{path: ^1.8.0, flutter: {sdk: flutter}, local_pkg: {path: ../local_pkg}}");
        let set: DependencySet = decode_section("dependencies", &node).unwrap();
        assert_eq!(set.names().collect::<Vec<_>>(), ["path", "flutter", "local_pkg"]);

        let empty: DependencySet = decode_section("dev_dependencies", &Yaml::BadValue).unwrap();
        assert!(empty.is_empty());

        let err = decode_section::<Unrestricted>("dependencies", &yaml("[a]")).unwrap_err();
        assert!(matches!(err, PubspecError::InvalidStructure { .. }));
    }

    #[test]
    fn test_decode_override_section_checks_admission() {
        let err = decode_section::<PinnedOnly>(
            "dependency_overrides",
            &yaml("{path: ^1.8.0}"),
        )
        .unwrap_err();
        assert!(matches!(err, PubspecError::NonPinnedOverride { .. }));

        let overrides: OverrideSet =
            decode_section("dependency_overrides", &yaml("{path: 1.8.0, local_pkg: {path: ../x}}"))
                .unwrap();
        assert_eq!(overrides.len(), 2);
    }

    #[test]
    fn test_encode_section_order() {
        let node = yaml("{b: ^1.0.0, a: {path: ../a}, c: null}");
        let set: DependencySet = decode_section("dependencies", &node).unwrap();
        let encoded = encode_section(&set, &modern_sdk(), &FormatPreferences::default());
        assert_eq!(encoded, node);

        let frozen = encode_section(&set.freeze(), &modern_sdk(), &FormatPreferences::default());
        assert_eq!(frozen, node);
    }
}
