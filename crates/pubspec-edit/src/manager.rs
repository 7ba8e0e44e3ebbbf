//! File-backed access to the pubspec of one project directory.

use crate::archiver::Archiver;
use crate::document::{from_yaml_str, to_yaml_string};
use crate::format::FormatPreferences;
use crate::pubspec::{Pubspec, PubspecView};
use crate::reference::LocalReference;
use pubspec_core::{PubspecError, Result};
use std::path::{Path, PathBuf};

pub const PUBSPEC_FILE_NAME: &str = "pubspec.yaml";

/// Loads and saves `pubspec.yaml` of a project and owns its undo history.
///
/// One manager per project. Callers that share a manager across tasks must
/// serialize access themselves.
#[derive(Debug)]
pub struct PubspecManager {
    project_path: PathBuf,
    preferences: FormatPreferences,
    archiver: Archiver,
}

impl PubspecManager {
    /// # Errors
    ///
    /// Returns [`PubspecError::NotAProject`] unless `project_path` is an
    /// absolute path to an existing directory.
    pub fn new(project_path: impl Into<PathBuf>) -> Result<Self> {
        let project_path = project_path.into();
        if !project_path.is_absolute() || !project_path.is_dir() {
            return Err(PubspecError::NotAProject { path: project_path });
        }

        Ok(Self {
            archiver: Archiver::new(project_path.clone()),
            project_path,
            preferences: FormatPreferences::default(),
        })
    }

    #[must_use]
    pub fn with_preferences(mut self, preferences: FormatPreferences) -> Self {
        self.preferences = preferences;
        self
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    pub fn pubspec_path(&self) -> PathBuf {
        self.project_path.join(PUBSPEC_FILE_NAME)
    }

    pub fn preferences(&self) -> &FormatPreferences {
        &self.preferences
    }

    pub fn archiver(&self) -> &Archiver {
        &self.archiver
    }

    pub fn archiver_mut(&mut self) -> &mut Archiver {
        &mut self.archiver
    }

    pub async fn load(&self) -> Result<Pubspec> {
        let path = self.pubspec_path();
        let content = tokio::fs::read_to_string(&path).await.map_err(|e| {
            tracing::debug!("Failed to read {}: {}", path.display(), e);
            PubspecError::Io(e)
        })?;

        let pubspec = from_yaml_str(&content)?;
        tracing::info!("Loaded pubspec '{}' from {}", pubspec.name(), path.display());
        Ok(pubspec)
    }

    /// Encodes `pubspec` with this manager's preferences and writes it out.
    pub async fn save(&self, pubspec: &impl PubspecView) -> Result<()> {
        let path = self.pubspec_path();
        let content = to_yaml_string(pubspec, &self.preferences)?;
        tokio::fs::write(&path, content.as_bytes()).await?;
        tracing::info!(
            "Saved pubspec '{}' to {} ({} bytes)",
            pubspec.name(),
            path.display(),
            content.len()
        );
        Ok(())
    }

    /// Archives the current state of `pubspec`.
    pub fn archive(&mut self, pubspec: &Pubspec) {
        self.archiver.record(pubspec);
    }

    /// Writes the newest archived state back to disk and returns it as a
    /// fresh document.
    ///
    /// # Errors
    ///
    /// [`PubspecError::EmptyArchive`] when nothing has been archived.
    pub async fn save_latest_archive(&self) -> Result<Pubspec> {
        let entry = self.archiver.latest().ok_or(PubspecError::EmptyArchive)?;
        let pubspec = entry.snapshot().materialize();
        self.save(&pubspec).await?;
        Ok(pubspec)
    }

    /// Resolves a local dependency against the project directory.
    pub fn resolve_local(&self, reference: &LocalReference) -> Result<PathBuf> {
        reference.resolve(&self.project_path)
    }
}
