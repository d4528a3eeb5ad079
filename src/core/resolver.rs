//! Turns what the user typed into an `{owner, repo, url}` triple.
//!
//! Resolution order, first success wins:
//! 1. **Exact parse** of a URL (`https://`, `http://`, `git@`) or `owner/repo`;
//!    never touches the network.
//! 2. **Local/history match** against cached repositories and the access log.
//! 3. **Remote search** through [`RepoSearch`], picked with the [`Chooser`].

use crate::core::cache_index::{repo_segment, CacheEntry, CacheIndex};
use crate::core::chooser::Chooser;
use crate::core::dirs::repo_dir;
use crate::core::error::{GitLauncherError, Result};
use crate::core::meta::{HistoryEntry, MetadataStore};
use crate::core::search::RepoSearch;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const DEFAULT_HOST: &str = "github.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoRef {
    pub owner: String,
    pub repo: String,
    pub url: String,
}

impl RepoRef {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    pub fn dir(&self, base_dir: &Path) -> PathBuf {
        repo_dir(base_dir, &self.owner, &self.repo)
    }
}

fn strip_git_suffix(name: &str) -> &str {
    name.strip_suffix(".git").unwrap_or(name)
}

/// Owner and repo become directory names under the cache root, so they must
/// each name exactly one real path component.
fn is_path_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment != "."
        && segment != ".."
        && !segment.contains(['/', '\\'])
}

/// Exact parse of a URL or `owner/repo` shorthand. Case is preserved.
pub fn parse_exact(input: &str) -> Option<RepoRef> {
    let input = input.trim();
    parse_url(input).or_else(|| parse_shorthand(input))
}

fn parse_url(input: &str) -> Option<RepoRef> {
    if let Some(rest) = input.strip_prefix("git@") {
        let (host, path) = rest.split_once(':')?;
        let mut segments = path.split('/').filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = strip_git_suffix(segments.next()?);
        if host.is_empty() || !is_path_segment(owner) || !is_path_segment(repo) {
            return None;
        }
        return Some(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
            url: format!("git@{host}:{owner}/{repo}.git"),
        });
    }

    if input.starts_with("https://") || input.starts_with("http://") {
        let url = url::Url::parse(input).ok()?;
        let host = url.host_str()?;
        let mut segments = url.path_segments()?.filter(|s| !s.is_empty());
        let owner = segments.next()?;
        let repo = strip_git_suffix(segments.next()?);
        if !is_path_segment(owner) || !is_path_segment(repo) {
            return None;
        }
        let port = url.port().map(|p| format!(":{p}")).unwrap_or_default();
        return Some(RepoRef {
            owner: owner.to_string(),
            repo: repo.to_string(),
            url: format!("{}://{host}{port}/{owner}/{repo}.git", url.scheme()),
        });
    }

    None
}

/// `owner/repo`: exactly one slash, no whitespace, both halves non-empty.
fn parse_shorthand(input: &str) -> Option<RepoRef> {
    // A colon means an scp-style remote (`host:owner/repo`), never shorthand
    if input.chars().any(char::is_whitespace) || input.contains(':') {
        return None;
    }
    let (owner, repo) = input.split_once('/')?;
    let repo = strip_git_suffix(repo);
    if !is_path_segment(owner) || !is_path_segment(repo) {
        return None;
    }
    Some(RepoRef {
        owner: owner.to_string(),
        repo: repo.to_string(),
        url: format!("https://{DEFAULT_HOST}/{owner}/{repo}.git"),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Local,
    History,
}

/// A repository the user has seen before.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub full_name: String,
    /// Known clone URL (local entries only).
    pub url: Option<String>,
    pub origin: Origin,
    pub last_seen: DateTime<Utc>,
}

impl Candidate {
    pub fn display(&self) -> String {
        let tag = match self.origin {
            Origin::Local => "local",
            Origin::History => "history",
        };
        format!("{}  ({tag})", self.full_name)
    }

    pub fn to_repo_ref(&self) -> Option<RepoRef> {
        let mut parsed = parse_shorthand(&self.full_name)?;
        if let Some(url) = &self.url {
            parsed.url = url.clone();
        }
        Some(parsed)
    }
}

/// Union of cached and historical repositories. Local entries come first and
/// win over history for the same name; each group is most-recent first.
pub fn candidates(entries: &[CacheEntry], history: &[HistoryEntry]) -> Vec<Candidate> {
    let mut local: Vec<Candidate> = entries
        .iter()
        .map(|entry| Candidate {
            full_name: entry.meta.repo_full_name.clone(),
            url: Some(entry.meta.repo_url.clone()),
            origin: Origin::Local,
            last_seen: entry.meta.last_access,
        })
        .collect();
    local.sort_by(|a, b| b.last_seen.cmp(&a.last_seen));

    let mut latest: HashMap<String, &HistoryEntry> = HashMap::new();
    for entry in history {
        let key = entry.repo_full_name.to_lowercase();
        if local.iter().any(|c| c.full_name.to_lowercase() == key) {
            continue;
        }
        latest
            .entry(key)
            .and_modify(|seen| {
                if entry.timestamp > seen.timestamp {
                    *seen = entry;
                }
            })
            .or_insert(entry);
    }

    let mut remembered: Vec<Candidate> = latest
        .into_values()
        .map(|entry| Candidate {
            full_name: entry.repo_full_name.clone(),
            url: None,
            origin: Origin::History,
            last_seen: entry.timestamp,
        })
        .collect();
    remembered.sort_by(|a, b| {
        b.last_seen
            .cmp(&a.last_seen)
            .then_with(|| a.full_name.cmp(&b.full_name))
    });

    local.extend(remembered);
    local
}

/// Exact repo-name matches if any, otherwise substring matches on the repo
/// name or full name. Case-insensitive.
pub fn match_candidates<'a>(query: &str, candidates: &'a [Candidate]) -> Vec<&'a Candidate> {
    let query = query.to_lowercase();

    let exact: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| repo_segment(&c.full_name).to_lowercase() == query)
        .collect();
    if !exact.is_empty() {
        return exact;
    }

    candidates
        .iter()
        .filter(|c| {
            repo_segment(&c.full_name).to_lowercase().contains(&query)
                || c.full_name.to_lowercase().contains(&query)
        })
        .collect()
}

pub struct ReferenceResolver<'a> {
    chooser: &'a dyn Chooser,
    search: &'a dyn RepoSearch,
}

impl<'a> ReferenceResolver<'a> {
    pub fn new(chooser: &'a dyn Chooser, search: &'a dyn RepoSearch) -> Self {
        Self { chooser, search }
    }

    pub fn resolve(&self, input: &str, base_dir: &Path, store: &MetadataStore) -> Result<RepoRef> {
        let input = input.trim();
        if input.is_empty() {
            return Err(GitLauncherError::resolution("empty reference"));
        }

        if let Some(parsed) = parse_exact(input) {
            log::debug!("Parsed '{input}' as {}", parsed.full_name());
            return Ok(parsed);
        }

        let entries = CacheIndex::scan(base_dir)?;
        let history = store.history()?;
        self.resolve_among(input, &candidates(&entries, &history))
    }

    /// Steps 2 and 3 against an already-built candidate list.
    pub fn resolve_among(&self, query: &str, known: &[Candidate]) -> Result<RepoRef> {
        if let Some(parsed) = parse_exact(query) {
            return Ok(parsed);
        }

        let matches = match_candidates(query, known);
        log::debug!("'{query}' matched {} known repositories", matches.len());

        let picked = match matches.as_slice() {
            [] => return self.search_remote(query),
            [only] => *only,
            many => {
                let lines: Vec<String> = many.iter().map(|c| c.display()).collect();
                self.chooser
                    .choose(&format!("Repositories matching '{query}'"), &lines)?
                    .and_then(|index| many.get(index).copied())
                    .ok_or_else(|| GitLauncherError::resolution("canceled"))?
            }
        };

        picked.to_repo_ref().ok_or_else(|| {
            GitLauncherError::resolution(format!("invalid repository name '{}'", picked.full_name))
        })
    }

    fn search_remote(&self, query: &str) -> Result<RepoRef> {
        let hits = self.search.search(query)?;
        if hits.is_empty() {
            return Err(GitLauncherError::resolution("no results"));
        }

        let lines: Vec<String> = hits.iter().map(|hit| hit.full_name.clone()).collect();
        let hit = self
            .chooser
            .choose(&format!("Search results for '{query}'"), &lines)?
            .and_then(|index| hits.get(index))
            .ok_or_else(|| GitLauncherError::resolution("canceled"))?;

        parse_url(&hit.url)
            .or_else(|| parse_shorthand(&hit.full_name))
            .ok_or_else(|| {
                GitLauncherError::resolution(format!("invalid search result '{}'", hit.full_name))
            })
    }
}
