//! Remote repository search through the hosting platform's CLI.

use crate::core::error::{GitLauncherError, Result};
use serde::Deserialize;
use std::process::Command;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub full_name: String,
    pub url: String,
}

/// Free-text repository search. Treated as an oracle: the resolver only
/// cares about the returned names and URLs.
pub trait RepoSearch {
    fn search(&self, query: &str) -> Result<Vec<SearchHit>>;
}

/// `gh search repos <query> --json fullName,url`.
pub struct GhSearch {
    pub limit: usize,
}

impl Default for GhSearch {
    fn default() -> Self {
        Self { limit: 30 }
    }
}

impl RepoSearch for GhSearch {
    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        let limit = self.limit.to_string();
        log::debug!("Searching remote repositories for '{query}'");

        let output = Command::new("gh")
            .args(["search", "repos", query, "--limit", &limit, "--json", "fullName,url"])
            .output()
            .map_err(|e| {
                GitLauncherError::resolution(format!("cannot run 'gh' for search: {e}"))
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(GitLauncherError::resolution(format!(
                "search failed: {}",
                stderr.trim()
            )));
        }

        parse_hits(&String::from_utf8_lossy(&output.stdout))
    }
}

fn parse_hits(stdout: &str) -> Result<Vec<SearchHit>> {
    if stdout.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(stdout)?)
}
