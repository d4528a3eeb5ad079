//! The cache lifecycle: clone, reuse, or update a checkout.
//!
//! [`RepoLifecycleManager::assess`] classifies a repository into a
//! [`RepoState`]; [`RepoLifecycleManager::transition`] runs exactly one
//! handler per state and writes the metadata afterwards.
//!
//! | State             | Action                                              |
//! |-------------------|-----------------------------------------------------|
//! | `Absent`          | pick branch, single-branch clone, create metadata   |
//! | `PresentUpToDate` | checkout silently                                   |
//! | `PresentBehind`   | ask: checkout as-is (default) or fetch + ff pull    |
//! | `PresentUnknown`  | warn, checkout the last local branch, no sync       |
//!
//! Git failures abort the invocation. The only swallowed failure is the
//! status fetch, which degrades to `PresentUnknown`.

use crate::core::branch::{BranchSelector, FALLBACK_BRANCH};
use crate::core::chooser::{Chooser, UpdateAction};
use crate::core::config::Config;
use crate::core::dirs::is_repo_dir;
use crate::core::error::{GitLauncherError, Result};
use crate::core::git::{self, GitRepo};
use crate::core::launch;
use crate::core::meta::{MetadataStore, RepoMeta, META_FILE};
use crate::core::output::{print_step, print_warning};
use crate::core::resolver::RepoRef;
use chrono::Utc;
use std::fs;
use std::path::{Path, PathBuf};

/// Result of probing the remote for the effective branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteStatus {
    /// Commits on the remote branch missing locally.
    Behind(usize),
    /// Fetch failed or the tracking ref is missing.
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepoState {
    Absent,
    PresentUpToDate { branch: String },
    PresentBehind { branch: String, behind: usize },
    PresentUnknown { branch: String, reason: String },
}

/// A ready checkout and the metadata just written for it.
#[derive(Debug, Clone, PartialEq)]
pub struct Checkout {
    pub path: PathBuf,
    pub branch: String,
    pub meta: RepoMeta,
}

pub struct RepoLifecycleManager<'a> {
    config: &'a Config,
    store: &'a MetadataStore,
    chooser: &'a dyn Chooser,
}

impl<'a> RepoLifecycleManager<'a> {
    pub fn new(config: &'a Config, store: &'a MetadataStore, chooser: &'a dyn Chooser) -> Self {
        Self {
            config,
            store,
            chooser,
        }
    }

    /// Make `repo` available locally on the right branch.
    pub fn ensure(&self, repo: &RepoRef, branch_override: Option<&str>) -> Result<Checkout> {
        let state = self.assess(repo, branch_override)?;
        self.transition(repo, state, branch_override)
    }

    pub fn assess(&self, repo: &RepoRef, branch_override: Option<&str>) -> Result<RepoState> {
        let dir = self.checkout_dir(repo)?;
        if !dir.exists() {
            log::debug!("{} is absent", repo.full_name());
            return Ok(RepoState::Absent);
        }

        let git = match GitRepo::open(&dir) {
            Ok(git) => git,
            Err(e) if is_partial_clone(&dir) => {
                log::warn!("{} is not a usable checkout ({e}), recloning", dir.display());
                return Ok(RepoState::Absent);
            }
            Err(e) => {
                log::warn!("{} has metadata but no usable checkout: {e}", dir.display());
                return Err(GitLauncherError::NotACheckout { path: dir });
            }
        };

        let meta = MetadataStore::load_meta(&dir);
        let branch = effective_branch(branch_override, meta.as_ref(), &git);

        let state = match remote_status(&git, &branch) {
            RemoteStatus::Behind(0) => RepoState::PresentUpToDate { branch },
            RemoteStatus::Behind(behind) => RepoState::PresentBehind { branch, behind },
            RemoteStatus::Unreachable(reason) => RepoState::PresentUnknown { branch, reason },
        };
        log::debug!("{} assessed as {state:?}", repo.full_name());
        Ok(state)
    }

    pub fn transition(
        &self,
        repo: &RepoRef,
        state: RepoState,
        branch_override: Option<&str>,
    ) -> Result<Checkout> {
        match state {
            RepoState::Absent => self.handle_absent(repo, branch_override),
            RepoState::PresentUpToDate { branch } => self.handle_up_to_date(repo, branch),
            RepoState::PresentBehind { branch, behind } => {
                self.handle_behind(repo, branch, behind)
            }
            RepoState::PresentUnknown { branch, reason } => {
                self.handle_unknown(repo, branch, &reason)
            }
        }
    }

    /// Run the launch command in the checkout; once it exits cleanly, stamp
    /// `last_access` again so the session itself never counts as idle time.
    pub fn launch(&self, checkout: &mut Checkout, command: &str) -> Result<()> {
        launch::run(command, &checkout.path)?;
        checkout.meta.touch(Utc::now());
        MetadataStore::write_meta(&checkout.path, &checkout.meta)
    }

    fn handle_absent(&self, repo: &RepoRef, branch_override: Option<&str>) -> Result<Checkout> {
        let dir = self.checkout_dir(repo)?;
        if dir.exists() {
            if !is_partial_clone(&dir) {
                return Err(GitLauncherError::NotACheckout { path: dir });
            }
            fs::remove_dir_all(&dir)?;
        }

        let branch = BranchSelector::new(self.chooser).select(&repo.url, branch_override)?;
        print_step(&format!("Cloning {} ({branch})", repo.full_name()));
        git::clone(&repo.url, &branch, &dir, self.config.shallow)?;
        GitRepo::open(&dir)?.exclude(META_FILE)?;

        let now = Utc::now();
        let meta = RepoMeta::new(&repo.url, repo.full_name(), &branch, now);
        MetadataStore::write_meta(&dir, &meta)?;
        self.store.record_access(&meta.repo_full_name, now)?;

        Ok(Checkout {
            path: dir,
            branch,
            meta,
        })
    }

    fn checkout_dir(&self, repo: &RepoRef) -> Result<PathBuf> {
        let dir = repo.dir(&self.config.base_dir);
        if !is_repo_dir(&self.config.base_dir, &dir) {
            return Err(GitLauncherError::resolution(format!(
                "invalid repository name '{}'",
                repo.full_name()
            )));
        }
        Ok(dir)
    }

    fn handle_up_to_date(&self, repo: &RepoRef, branch: String) -> Result<Checkout> {
        let dir = self.checkout_dir(repo)?;
        GitRepo::open(&dir)?.checkout(&branch)?;
        self.finish(repo, dir, branch)
    }

    fn handle_behind(&self, repo: &RepoRef, branch: String, behind: usize) -> Result<Checkout> {
        let dir = self.checkout_dir(repo)?;
        let git = GitRepo::open(&dir)?;

        match self.chooser.prompt_update(&branch, behind)? {
            UpdateAction::CheckoutOnly => git.checkout(&branch)?,
            UpdateAction::Update => {
                print_step(&format!("Updating {} ({branch})", repo.full_name()));
                git.checkout(&branch)?;
                git.fetch_branch(&branch)?;
                git.pull_ff_only(&branch)?;
            }
        }
        self.finish(repo, dir, branch)
    }

    fn handle_unknown(&self, repo: &RepoRef, branch: String, reason: &str) -> Result<Checkout> {
        let dir = self.checkout_dir(repo)?;
        let git = GitRepo::open(&dir)?;
        print_warning(&format!(
            "Cannot check {} against its remote ({reason}); using the local copy",
            repo.full_name()
        ));

        let remembered = MetadataStore::load_meta(&dir).map(|meta| meta.branch);
        let local = [Some(branch.clone()), remembered]
            .into_iter()
            .flatten()
            .find(|candidate| git.has_local_branch(candidate));

        let final_branch = match local {
            Some(local) => {
                git.checkout(&local)?;
                local
            }
            None => git.current_branch().unwrap_or(branch),
        };
        self.finish(repo, dir, final_branch)
    }

    fn finish(&self, repo: &RepoRef, dir: PathBuf, branch: String) -> Result<Checkout> {
        let now = Utc::now();
        let meta = match MetadataStore::load_meta(&dir) {
            Some(mut meta) => {
                meta.branch = branch.clone();
                meta.touch(now);
                meta
            }
            None => RepoMeta::new(&repo.url, repo.full_name(), &branch, now),
        };
        MetadataStore::write_meta(&dir, &meta)?;

        Ok(Checkout {
            path: dir,
            branch,
            meta,
        })
    }
}

/// Override, then the remembered branch, then whatever is checked out, then `main`.
pub fn effective_branch(
    branch_override: Option<&str>,
    meta: Option<&RepoMeta>,
    git: &GitRepo,
) -> String {
    branch_override
        .map(str::to_string)
        .or_else(|| meta.map(|meta| meta.branch.clone()))
        .filter(|branch| !branch.is_empty())
        .or_else(|| git.current_branch())
        .unwrap_or_else(|| FALLBACK_BRANCH.to_string())
}

/// Fetch `branch` and count how far the local branch trails it.
pub fn remote_status(git: &GitRepo, branch: &str) -> RemoteStatus {
    if let Err(e) = git.fetch_branch(branch) {
        return RemoteStatus::Unreachable(e.to_string());
    }
    match git.behind_count(branch) {
        Ok(Some(behind)) => RemoteStatus::Behind(behind),
        Ok(None) => RemoteStatus::Unreachable(format!("no remote-tracking ref for {branch}")),
        Err(e) => RemoteStatus::Unreachable(e.to_string()),
    }
}

/// A directory left behind by an interrupted clone: no metadata was ever
/// written and git cannot open it. Only these are safe to delete.
fn is_partial_clone(dir: &Path) -> bool {
    !MetadataStore::meta_path(dir).exists() && GitRepo::open(dir).is_err()
}
