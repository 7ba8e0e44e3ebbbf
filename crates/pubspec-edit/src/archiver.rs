//! Bounded undo history of a pubspec.

use crate::pubspec::Pubspec;
use crate::snapshot::PubspecSnapshot;
use chrono::{DateTime, Utc};
use pubspec_core::{PubspecError, Result};
use std::collections::{VecDeque, vec_deque};
use std::path::{Path, PathBuf};

/// Most snapshots an [`Archiver`] keeps. Older ones are evicted first.
pub const MAX_ARCHIVES: usize = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct ArchiveEntry {
    archived_at: DateTime<Utc>,
    snapshot: PubspecSnapshot,
}

impl ArchiveEntry {
    pub fn archived_at(&self) -> DateTime<Utc> {
        self.archived_at
    }

    pub fn snapshot(&self) -> &PubspecSnapshot {
        &self.snapshot
    }
}

/// Stack of snapshots for the pubspec of one project.
///
/// Holds at most [`MAX_ARCHIVES`] entries. Undo never removes the oldest
/// remaining entry, so a non-empty archive always keeps at least one state.
#[derive(Debug, Clone)]
pub struct Archiver {
    project_path: PathBuf,
    entries: VecDeque<ArchiveEntry>,
}

impl Archiver {
    pub fn new(project_path: impl Into<PathBuf>) -> Self {
        Self {
            project_path: project_path.into(),
            entries: VecDeque::with_capacity(MAX_ARCHIVES),
        }
    }

    pub fn project_path(&self) -> &Path {
        &self.project_path
    }

    /// Archives the current state of `pubspec`, stamped with the current time.
    pub fn record(&mut self, pubspec: &Pubspec) {
        self.record_at(pubspec, Utc::now());
    }

    pub fn record_at(&mut self, pubspec: &Pubspec, archived_at: DateTime<Utc>) {
        self.entries.push_back(ArchiveEntry {
            archived_at,
            snapshot: pubspec.snapshot(),
        });

        let mut evicted = 0;
        while self.entries.len() > MAX_ARCHIVES {
            self.entries.pop_front();
            evicted += 1;
        }

        tracing::debug!(
            "Archived pubspec of {} at {} ({} kept, {} evicted)",
            self.project_path.display(),
            archived_at,
            self.entries.len(),
            evicted
        );
    }

    fn ensure_undoable(&self) -> Result<()> {
        if self.entries.len() < 2 {
            return Err(PubspecError::NothingToUndo {
                archived: self.entries.len(),
            });
        }
        Ok(())
    }

    /// Drops up to `count` of the newest entries, always keeping one.
    ///
    /// Returns the number of entries dropped.
    ///
    /// # Errors
    ///
    /// [`PubspecError::NothingToUndo`] when fewer than two entries exist. The
    /// archive is not changed in that case.
    pub fn undo(&mut self, count: usize) -> Result<usize> {
        self.ensure_undoable()?;

        let mut dropped = 0;
        while dropped < count && self.entries.len() > 1 {
            self.entries.pop_back();
            dropped += 1;
        }

        tracing::debug!("Undid {} archived pubspec states", dropped);
        Ok(dropped)
    }

    /// Drops every entry archived after `timestamp`, always keeping one.
    ///
    /// # Errors
    ///
    /// [`PubspecError::NothingToUndo`] when fewer than two entries exist.
    pub fn undo_before(&mut self, timestamp: DateTime<Utc>) -> Result<usize> {
        self.ensure_undoable()?;

        let mut dropped = 0;
        while self.entries.len() > 1
            && self
                .entries
                .back()
                .is_some_and(|entry| entry.archived_at > timestamp)
        {
            self.entries.pop_back();
            dropped += 1;
        }

        tracing::debug!("Undid {} archived pubspec states after {}", dropped, timestamp);
        Ok(dropped)
    }

    /// Keeps only the most recent entry.
    pub fn clear_older(&mut self) {
        let keep_from = self.entries.len().saturating_sub(1);
        self.entries.drain(..keep_from);
    }

    pub fn latest(&self) -> Option<&ArchiveEntry> {
        self.entries.back()
    }

    pub fn recent_archive_at(&self) -> Option<DateTime<Utc>> {
        self.latest().map(ArchiveEntry::archived_at)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries from oldest to newest.
    pub fn iter(&self) -> vec_deque::Iter<'_, ArchiveEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a Archiver {
    type Item = &'a ArchiveEntry;
    type IntoIter = vec_deque::Iter<'a, ArchiveEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
