//! Time-to-live eviction of cached repositories.
//!
//! An entry is stale when `now - last_access > ttl` (strictly). Deleting
//! the last repository of an owner also removes the owner directory; nothing
//! above that is touched.

use crate::core::cache_index::{CacheEntry, CacheIndex};
use crate::core::config::Config;
use crate::core::error::Result;
use chrono::{DateTime, Duration, Utc};
use std::fs;

pub struct TtlEvictor;

impl TtlEvictor {
    fn ttl(ttl_ms: u64) -> Duration {
        Duration::milliseconds(i64::try_from(ttl_ms).unwrap_or(i64::MAX))
    }

    pub fn expired<'a>(
        entries: &'a [CacheEntry],
        ttl_ms: u64,
        now: DateTime<Utc>,
    ) -> Vec<&'a CacheEntry> {
        let ttl = Self::ttl(ttl_ms);
        entries
            .iter()
            .filter(|entry| entry.is_expired(ttl, now))
            .collect()
    }

    /// Delete every expired entry; returns how many were removed.
    pub fn purge(entries: &[CacheEntry], ttl_ms: u64) -> usize {
        Self::purge_at(entries, ttl_ms, Utc::now())
    }

    pub fn purge_at(entries: &[CacheEntry], ttl_ms: u64, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for entry in Self::expired(entries, ttl_ms, now) {
            match Self::remove_entry(entry) {
                Ok(()) => {
                    log::info!(
                        "Evicted {} (last used {})",
                        entry.full_name(),
                        entry.meta.last_access
                    );
                    removed += 1;
                }
                Err(e) => log::warn!("Could not evict {}: {e}", entry.full_name()),
            }
        }
        removed
    }

    /// Remove a repository directory, then its owner directory if that is
    /// now empty.
    pub fn remove_entry(entry: &CacheEntry) -> Result<()> {
        fs::remove_dir_all(&entry.path)?;

        if let Some(owner_dir) = entry.path.parent() {
            if fs::read_dir(owner_dir)?.next().is_none() {
                fs::remove_dir(owner_dir)?;
                log::debug!("Removed empty owner directory {}", owner_dir.display());
            }
        }
        Ok(())
    }

    /// The opportunistic purge run on every invocation. Small caches are not
    /// scanned for staleness at all.
    pub fn maybe_purge(config: &Config) -> Result<usize> {
        let entries = CacheIndex::scan(&config.base_dir)?;
        if entries.len() < config.purge_floor {
            log::debug!(
                "{} cached repositories, below purge floor {}",
                entries.len(),
                config.purge_floor
            );
            return Ok(0);
        }
        Ok(Self::purge(&entries, config.ttl_ms))
    }
}
