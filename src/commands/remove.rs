use crate::commands::ls::format_entry;
use crate::core::{
    cache_index::{repo_segment, CacheEntry, CacheIndex},
    chooser::Chooser,
    config::Config,
    error::{GitLauncherError, Result},
    evictor::TtlEvictor,
    output::{print_info, print_success},
};
use chrono::Utc;

/// What `remove` should act on.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveTarget {
    /// Named repositories (`owner/repo`, or a repo name that is unique).
    Named(Vec<String>),
    /// Every TTL-expired entry, without prompting.
    Expired,
    /// Multi-select with the expired entries preselected.
    Interactive,
}

pub fn execute_remove(config: &Config, target: RemoveTarget, chooser: &dyn Chooser) -> Result<()> {
    let entries = CacheIndex::scan(&config.base_dir)?;
    let now = Utc::now();

    let selected: Vec<&CacheEntry> = match target {
        RemoveTarget::Named(names) => names
            .iter()
            .map(|name| find_named(&entries, name))
            .collect::<Result<_>>()?,
        RemoveTarget::Expired => TtlEvictor::expired(&entries, config.ttl_ms, now),
        RemoveTarget::Interactive => {
            if entries.is_empty() {
                print_info("No cached repositories");
                return Ok(());
            }
            let ttl = config.ttl();
            let lines: Vec<String> = entries
                .iter()
                .map(|entry| format_entry(entry, ttl, now))
                .collect();
            let preselected: Vec<bool> = entries
                .iter()
                .map(|entry| entry.is_expired(ttl, now))
                .collect();

            match chooser.choose_many("Remove repositories", &lines, &preselected)? {
                Some(indices) => indices.iter().filter_map(|&i| entries.get(i)).collect(),
                None => {
                    print_info("Canceled, nothing removed");
                    return Ok(());
                }
            }
        }
    };

    let mut removed: Vec<&CacheEntry> = Vec::new();
    for entry in selected {
        if removed.iter().any(|done| done.path == entry.path) {
            continue;
        }
        TtlEvictor::remove_entry(entry)?;
        print_success(&format!("Removed {}", entry.full_name()));
        removed.push(entry);
    }

    if removed.is_empty() {
        print_info("Nothing to remove");
    }
    Ok(())
}

/// Exact `owner/repo` first, then a repo name that matches a single entry.
fn find_named<'a>(entries: &'a [CacheEntry], name: &str) -> Result<&'a CacheEntry> {
    if let Some(entry) = CacheIndex::find(entries, name) {
        return Ok(entry);
    }

    let by_repo: Vec<&CacheEntry> = entries
        .iter()
        .filter(|entry| entry.repo_name().eq_ignore_ascii_case(repo_segment(name)))
        .collect();
    match by_repo.as_slice() {
        [only] if !name.contains('/') => Ok(*only),
        _ => Err(GitLauncherError::not_cached(name)),
    }
}
