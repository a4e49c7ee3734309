//! The three one-shot migrations.
//!
//! Each migration exposes a pure `apply` working on a single in-memory
//! document and a `run` driving it over a repository. Documents are
//! processed one at a time; the first error aborts the run.

use std::fmt;

pub mod add_url;
pub mod create_date;
pub mod normalize_name;

/// Identifies a migration by the name it has always been run under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigrationId {
    ChannelsAddUrl,
    ChannelsUpdateName,
    ItemsEditCreateDate,
}

impl MigrationId {
    pub fn name(&self) -> &'static str {
        match self {
            MigrationId::ChannelsAddUrl => "panya_channels_add_url.1",
            MigrationId::ChannelsUpdateName => "panya_channels_upd_name.2",
            MigrationId::ItemsEditCreateDate => "panya_items_edit_create_date_rss.3",
        }
    }
}

impl fmt::Display for MigrationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Counters collected while a migration runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationReport {
    pub migration: MigrationId,
    /// Documents read from the store.
    pub scanned: u64,
    /// Documents whose stored value changed.
    pub modified: u64,
}

impl MigrationReport {
    pub fn new(migration: MigrationId) -> Self {
        Self {
            migration,
            scanned: 0,
            modified: 0,
        }
    }

    /// Line printed after an update pass, even when nothing changed.
    pub fn modified_line(&self) -> String {
        format!("modified: {}", self.modified)
    }
}

/// Line printed once a migration has finished.
pub fn completion_line(migration: MigrationId) -> String {
    format!("Migration {migration} completed successfully.")
}

impl fmt::Display for MigrationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: scanned {}, modified {}",
            self.migration, self.scanned, self.modified
        )
    }
}
