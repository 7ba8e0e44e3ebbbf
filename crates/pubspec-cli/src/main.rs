mod cli;

use clap::Parser;
use cli::{Cli, Command};
use pubspec_core::Result;
use pubspec_edit::{
    DependencyReference, FormatPreferences, Pubspec, PubspecManager, PubspecView, ReferenceKind,
    ReferenceLookup, to_json_string, to_yaml_string,
};
use std::path::Path;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    // Logs go to stderr so formatted output on stdout stays pipeable
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli.command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<()> {
    match command {
        Command::Check { path } => {
            let manager = open_project(&path, FormatPreferences::default())?;
            let pubspec = manager.load().await?;
            warn_unresolved_local(&manager, &pubspec);
            for line in summarize(&pubspec) {
                println!("{line}");
            }
        }
        Command::Fmt {
            path,
            qualified_hosted,
            dry_run,
        } => {
            let manager = open_project(&path, preferences(qualified_hosted))?;
            let pubspec = manager.load().await?;
            if dry_run {
                print!("{}", to_yaml_string(&pubspec, manager.preferences())?);
            } else {
                manager.save(&pubspec).await?;
            }
        }
        Command::Json {
            path,
            qualified_hosted,
        } => {
            let manager = open_project(&path, preferences(qualified_hosted))?;
            let pubspec = manager.load().await?;
            println!("{}", to_json_string(&pubspec, manager.preferences())?);
        }
    }
    Ok(())
}

fn preferences(qualified_hosted: bool) -> FormatPreferences {
    if qualified_hosted {
        FormatPreferences::qualified()
    } else {
        FormatPreferences::default()
    }
}

fn open_project(path: &Path, preferences: FormatPreferences) -> Result<PubspecManager> {
    let path = std::path::absolute(path)?;
    Ok(PubspecManager::new(path)?.with_preferences(preferences))
}

fn warn_unresolved_local(manager: &PubspecManager, pubspec: &Pubspec) {
    let sections = [
        pubspec.dependencies().iter(),
        pubspec.dev_dependencies().iter(),
        pubspec.dependency_overrides().iter(),
    ];
    for reference in sections.into_iter().flatten() {
        if let DependencyReference::Local(local) = reference
            && let Err(e) = manager.resolve_local(local)
        {
            tracing::warn!("Local dependency '{}' does not resolve: {}", local.name(), e);
        }
    }
}

const KIND_ORDER: [ReferenceKind; 5] = [
    ReferenceKind::Hosted,
    ReferenceKind::ThirdPartyHosted,
    ReferenceKind::Git,
    ReferenceKind::Local,
    ReferenceKind::Sdk,
];

fn summarize_section(section: &str, references: &impl ReferenceLookup) -> String {
    let counts: Vec<String> = KIND_ORDER
        .iter()
        .filter_map(|kind| {
            let count = references.iter().filter(|r| r.kind() == *kind).count();
            (count > 0).then(|| format!("{count} {kind}"))
        })
        .collect();

    if counts.is_empty() {
        format!("{section}: none")
    } else {
        format!("{section}: {} ({})", references.len(), counts.join(", "))
    }
}

fn summarize(pubspec: &impl PubspecView) -> Vec<String> {
    let mut header = pubspec.name().to_string();
    match pubspec.version() {
        Some(version) => header.push_str(&format!(" {version}")),
        None => header.push_str(" (no version)"),
    }
    if pubspec.is_flutter_project() {
        header.push_str(" [flutter]");
    }
    if !pubspec.is_publishable() {
        header.push_str(" [unpublished]");
    }

    let mut environment = format!("environment: sdk {}", pubspec.environment().sdk());
    if let Some(flutter) = pubspec.environment().flutter() {
        environment.push_str(&format!(", flutter {flutter}"));
    }

    let mut lines = vec![
        header,
        environment,
        summarize_section("dependencies", pubspec.dependencies()),
        summarize_section("dev_dependencies", pubspec.dev_dependencies()),
        summarize_section("dependency_overrides", pubspec.dependency_overrides()),
    ];

    let additional: Vec<&str> = pubspec.additional_data().iter().map(|(k, _)| k).collect();
    if !additional.is_empty() {
        lines.push(format!("additional: {}", additional.join(", ")));
    }
    lines
}
