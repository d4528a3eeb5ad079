//! Common assertion helpers for test output validation

#![allow(dead_code)]

use git_launcher::core::meta::{MetadataStore, RepoMeta};
use predicates::prelude::*;
use std::path::Path;

/// Creates a predicate that checks for the single-line error report
pub fn has_error(message: &str) -> impl Predicate<str> {
    predicates::str::contains("Error:").and(predicates::str::contains(message.to_string()))
}

/// Creates a predicate that checks for a config warning
pub fn has_config_warning() -> impl Predicate<str> {
    predicates::str::contains("Invalid configuration")
}

/// Creates a predicate that checks `ls` output for a cached repository
pub fn lists_repo(full_name: &str, branch: &str) -> impl Predicate<str> {
    predicates::str::contains(full_name.to_string())
        .and(predicates::str::contains(branch.to_string()))
}

/// Reads the checkout's metadata, failing the test if it is missing
pub fn read_meta(repo_dir: &Path) -> RepoMeta {
    MetadataStore::read_meta(repo_dir)
        .expect("metadata must be readable")
        .expect("metadata must exist")
}

pub fn assert_removed_with_owner(base_dir: &Path, full_name: &str) {
    let repo_dir = base_dir.join(full_name);
    assert!(!repo_dir.exists(), "{} should be removed", repo_dir.display());
    if let Some(owner) = full_name.split('/').next() {
        assert!(
            !base_dir.join(owner).exists(),
            "empty owner dir {owner} should be removed"
        );
    }
}
