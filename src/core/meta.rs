//! Per-repository metadata and the global access history.
//!
//! # Public API
//! - [`RepoMeta`]: record stored as `<baseDir>/<owner>/<repo>/.meta.json`
//! - [`HistoryEntry`]: one line of the append-only `history.jsonl`
//! - [`MetadataStore`]: reads and writes both
//!
//! # Storage Strategy
//! - **Metadata**: whole-file pretty JSON overwrite; a torn write only
//!   loses that one repository from the index
//! - **History**: append-only JSON lines, never rewritten; unreadable lines
//!   are skipped on load

use crate::core::cache_index::CacheEntry;
use crate::core::config::Config;
use crate::core::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const META_FILE: &str = ".meta.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepoMeta {
    pub repo_url: String,
    pub repo_full_name: String,
    pub branch: String,
    pub cloned_at: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

impl RepoMeta {
    /// Metadata for a fresh clone; both timestamps start equal.
    pub fn new(
        repo_url: impl Into<String>,
        repo_full_name: impl Into<String>,
        branch: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            repo_full_name: repo_full_name.into(),
            branch: branch.into(),
            cloned_at: now,
            last_access: now,
        }
    }

    /// Record an access. Never moves `last_access` before `cloned_at`.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_access = now.max(self.cloned_at);
    }

    /// Strictly older than the TTL; an entry exactly at the boundary is kept.
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_access > ttl
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub repo_full_name: String,
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(repo_full_name: impl Into<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            repo_full_name: repo_full_name.into(),
            timestamp,
        }
    }
}

pub struct MetadataStore {
    history_path: PathBuf,
}

impl MetadataStore {
    pub fn new(history_path: impl Into<PathBuf>) -> Self {
        Self {
            history_path: history_path.into(),
        }
    }

    pub fn for_config(config: &Config) -> Self {
        Self::new(config.history_path())
    }

    pub fn meta_path(repo_dir: &Path) -> PathBuf {
        repo_dir.join(META_FILE)
    }

    /// Strict read: `Ok(None)` when no metadata file exists, an error when it
    /// exists but cannot be read or parsed.
    pub fn read_meta(repo_dir: &Path) -> Result<Option<RepoMeta>> {
        let path = Self::meta_path(repo_dir);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(Some(serde_json::from_str(&content)?))
    }

    /// Lenient read used by the index scan: anything unreadable is `None`.
    pub fn load_meta(repo_dir: &Path) -> Option<RepoMeta> {
        match Self::read_meta(repo_dir) {
            Ok(meta) => meta,
            Err(e) => {
                log::warn!(
                    "Skipping unreadable metadata in {}: {e}",
                    repo_dir.display()
                );
                None
            }
        }
    }

    pub fn write_meta(repo_dir: &Path, meta: &RepoMeta) -> Result<()> {
        let json = serde_json::to_string_pretty(meta)?;
        fs::write(Self::meta_path(repo_dir), json)?;
        log::debug!(
            "Wrote metadata for {} (branch {})",
            meta.repo_full_name,
            meta.branch
        );
        Ok(())
    }

    pub fn append(&self, entry: &HistoryEntry) -> Result<()> {
        if let Some(parent) = self.history_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let mut line = serde_json::to_string(entry)?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.history_path)?;
        file.write_all(line.as_bytes())?;
        log::debug!("Appended history entry for {}", entry.repo_full_name);
        Ok(())
    }

    pub fn record_access(&self, repo_full_name: &str, now: DateTime<Utc>) -> Result<()> {
        self.append(&HistoryEntry::new(repo_full_name, now))
    }

    /// All history entries in file order. Malformed lines are skipped.
    pub fn history(&self) -> Result<Vec<HistoryEntry>> {
        let content = match fs::read_to_string(&self.history_path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        Ok(content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(|line| match serde_json::from_str(line) {
                Ok(entry) => Some(entry),
                Err(e) => {
                    log::debug!("Skipping malformed history line: {e}");
                    None
                }
            })
            .collect())
    }

    /// Append an entry for every cached repository that history has never
    /// seen. Returns how many entries were appended; a second run appends none.
    pub fn sync_history(&self, entries: &[CacheEntry]) -> Result<usize> {
        let known: HashSet<String> = self
            .history()?
            .into_iter()
            .map(|entry| entry.repo_full_name)
            .collect();

        let mut appended = 0;
        for entry in entries {
            if known.contains(&entry.meta.repo_full_name) {
                continue;
            }
            self.append(&HistoryEntry::new(
                entry.meta.repo_full_name.clone(),
                entry.meta.last_access,
            ))?;
            appended += 1;
        }

        if appended > 0 {
            log::debug!("Synced {appended} cached repositories into history");
        }
        Ok(appended)
    }
}
