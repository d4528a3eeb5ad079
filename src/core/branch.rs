//! Choosing the branch for a first clone.

use crate::core::chooser::Chooser;
use crate::core::error::{GitLauncherError, Result};
use crate::core::git;
use std::collections::HashSet;

pub const FALLBACK_BRANCH: &str = "main";

/// Remote branch names plus whether the remote honored the
/// most-recent-commit-first ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct BranchListing {
    pub branches: Vec<String>,
    pub sorted: bool,
}

/// List remote heads, newest commit first when the tips can be fetched; a
/// failed fetch degrades to the plain ref listing with `sorted == false`.
pub fn list_remote_branches(url: &str) -> Result<BranchListing> {
    match git::remote_heads_by_commit_date(url) {
        Ok(branches) => Ok(BranchListing {
            branches,
            sorted: true,
        }),
        Err(e) => {
            log::debug!("Sorted branch listing failed, retrying unsorted: {e}");
            Ok(BranchListing {
                branches: git::ls_remote_heads(url)?,
                sorted: false,
            })
        }
    }
}

/// The remote's default branch, or [`FALLBACK_BRANCH`] when it cannot be told.
pub fn default_branch(url: &str) -> String {
    match git::ls_remote_default_branch(url) {
        Ok(Some(branch)) => branch,
        Ok(None) => FALLBACK_BRANCH.to_string(),
        Err(e) => {
            log::debug!("Could not detect default branch of {url}: {e}");
            FALLBACK_BRANCH.to_string()
        }
    }
}

/// Deduplicate, then move `default` to the front; everything else keeps the
/// order it arrived in.
pub fn order_branches(branches: Vec<String>, default: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let unique: Vec<String> = branches
        .into_iter()
        .filter(|branch| seen.insert(branch.clone()))
        .collect();

    let (mut ordered, rest): (Vec<String>, Vec<String>) =
        unique.into_iter().partition(|branch| branch == default);
    ordered.extend(rest);
    ordered
}

pub struct BranchSelector<'a> {
    chooser: &'a dyn Chooser,
}

impl<'a> BranchSelector<'a> {
    pub fn new(chooser: &'a dyn Chooser) -> Self {
        Self { chooser }
    }

    /// A forced branch is returned untouched; a bad name surfaces later as a
    /// failed clone or checkout.
    pub fn select(&self, repo_url: &str, forced: Option<&str>) -> Result<String> {
        if let Some(branch) = forced {
            return Ok(branch.to_string());
        }

        let default = default_branch(repo_url);
        let listing = list_remote_branches(repo_url)?;
        if !listing.sorted {
            log::debug!("Branches of {repo_url} are listed unsorted");
        }
        let branches = order_branches(listing.branches, &default);

        match branches.as_slice() {
            [] => Ok(default),
            [only] => Ok(only.clone()),
            _ => self.pick(&branches, &default),
        }
    }

    fn pick(&self, branches: &[String], default: &str) -> Result<String> {
        let lines: Vec<String> = branches
            .iter()
            .map(|branch| {
                if branch == default {
                    format!("{branch} (default)")
                } else {
                    branch.clone()
                }
            })
            .collect();

        self.chooser
            .choose("Branch", &lines)?
            .and_then(|index| branches.get(index).cloned())
            .ok_or_else(|| GitLauncherError::branch_selection("canceled"))
    }
}
