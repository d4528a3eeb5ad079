//! Enumerates cached repositories by scanning `<baseDir>/<owner>/<repo>/`.
//!
//! A leaf directory only counts as cached when it holds a readable
//! [`RepoMeta`]; half-finished clones and foreign directories are ignored.

use crate::core::error::Result;
use crate::core::meta::{MetadataStore, RepoMeta};
use chrono::{DateTime, Duration, Utc};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
    pub path: PathBuf,
    pub meta: RepoMeta,
}

impl CacheEntry {
    pub fn full_name(&self) -> &str {
        &self.meta.repo_full_name
    }

    /// The `repo` segment of `owner/repo`.
    pub fn repo_name(&self) -> &str {
        repo_segment(&self.meta.repo_full_name)
    }

    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        self.meta.is_expired(ttl, now)
    }
}

pub fn repo_segment(full_name: &str) -> &str {
    full_name
        .rsplit_once('/')
        .map_or(full_name, |(_, repo)| repo)
}

pub struct CacheIndex;

impl CacheIndex {
    /// Every cached repository under `base_dir`, sorted by full name.
    /// A missing base directory is an empty cache.
    pub fn scan(base_dir: &Path) -> Result<Vec<CacheEntry>> {
        if !base_dir.is_dir() {
            log::debug!("Cache base {} does not exist yet", base_dir.display());
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for owner_dir in subdirectories(base_dir)? {
            let repo_dirs = match subdirectories(&owner_dir) {
                Ok(dirs) => dirs,
                Err(e) => {
                    log::debug!("Skipping unreadable {}: {e}", owner_dir.display());
                    continue;
                }
            };
            for repo_dir in repo_dirs {
                if let Some(meta) = MetadataStore::load_meta(&repo_dir) {
                    entries.push(CacheEntry {
                        path: repo_dir,
                        meta,
                    });
                }
            }
        }

        entries.sort_by(|a, b| a.meta.repo_full_name.cmp(&b.meta.repo_full_name));
        log::debug!(
            "Scanned {} cached repositories in {}",
            entries.len(),
            base_dir.display()
        );
        Ok(entries)
    }

    pub fn find<'a>(entries: &'a [CacheEntry], full_name: &str) -> Option<&'a CacheEntry> {
        entries
            .iter()
            .find(|entry| entry.meta.repo_full_name.eq_ignore_ascii_case(full_name))
    }
}

fn subdirectories(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let is_hidden = entry.file_name().to_string_lossy().starts_with('.');
        if !is_hidden && entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}
