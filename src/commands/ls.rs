use crate::core::{
    cache_index::{CacheEntry, CacheIndex},
    config::Config,
    error::Result,
    meta::MetadataStore,
    output::{print_info, print_section_header},
    resolver::{candidates, Origin},
};
use chrono::{DateTime, Duration, Utc};
use colored::*;

pub fn execute_ls(config: &Config, include_history: bool) -> Result<()> {
    let store = MetadataStore::for_config(config);
    let mut entries = CacheIndex::scan(&config.base_dir)?;
    store.sync_history(&entries)?;
    entries.sort_by(|a, b| b.meta.last_access.cmp(&a.meta.last_access));

    let now = Utc::now();
    let ttl = config.ttl();

    if entries.is_empty() {
        print_info(&format!(
            "No cached repositories in {}",
            config.base_dir.display()
        ));
    } else {
        print_section_header(&format!("Cached repositories ({})", entries.len()));
        for entry in &entries {
            println!("  {}", format_entry(entry, ttl, now));
        }
    }

    if include_history {
        let history = store.history()?;
        let evicted: Vec<_> = candidates(&entries, &history)
            .into_iter()
            .filter(|candidate| candidate.origin == Origin::History)
            .collect();

        if !evicted.is_empty() {
            print_section_header("Previously used");
            for candidate in &evicted {
                println!(
                    "  {}  {}",
                    candidate.full_name,
                    format_age(now - candidate.last_seen).bright_black()
                );
            }
        }
    }

    println!();
    Ok(())
}

/// `owner/repo  branch  3d ago [expired]`
pub fn format_entry(entry: &CacheEntry, ttl: Duration, now: DateTime<Utc>) -> String {
    let mut line = format!(
        "{}  {}  {}",
        entry.full_name().bold(),
        entry.meta.branch.cyan(),
        format_age(now - entry.meta.last_access).bright_black()
    );
    if entry.is_expired(ttl, now) {
        line.push_str(&format!("  {}", "expired".red()));
    }
    line
}

/// Coarse relative age: `just now`, `5m ago`, `3h ago`, `12d ago`.
pub fn format_age(age: Duration) -> String {
    if age.num_days() > 0 {
        format!("{}d ago", age.num_days())
    } else if age.num_hours() > 0 {
        format!("{}h ago", age.num_hours())
    } else if age.num_minutes() > 0 {
        format!("{}m ago", age.num_minutes())
    } else {
        "just now".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::meta::RepoMeta;
    use std::path::PathBuf;

    #[test]
    fn test_format_age_units() {
        assert_eq!(format_age(Duration::seconds(10)), "just now");
        assert_eq!(format_age(Duration::minutes(5)), "5m ago");
        assert_eq!(format_age(Duration::hours(3)), "3h ago");
        assert_eq!(format_age(Duration::days(12)), "12d ago");
        assert_eq!(format_age(Duration::seconds(-5)), "just now");
    }

    #[test]
    fn test_format_entry_marks_expired() {
        colored::control::set_override(false);
        let now = Utc::now();
        let meta = RepoMeta::new("url", "octo/cat", "dev", now - Duration::days(20));
        let entry = CacheEntry {
            path: PathBuf::from("/cache/octo/cat"),
            meta,
        };

        let stale = format_entry(&entry, Duration::days(14), now);
        assert_eq!(stale, "octo/cat  dev  20d ago  expired");

        let fresh = format_entry(&entry, Duration::days(30), now);
        assert!(!fresh.contains("expired"));
    }
}
