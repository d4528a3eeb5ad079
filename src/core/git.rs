//! Git operations on cached checkouts.
//!
//! Anything that talks to a remote or mutates the working copy (clone,
//! fetch, checkout, pull, ls-remote) shells out to the `git` client; a
//! non-zero exit becomes [`GitLauncherError::GitOperation`] carrying stderr.
//! Read-only questions about local state (current branch, ref existence,
//! behind counts) go through `git2`.
//!
//! # Public API
//! - [`GitRepo`]: an opened checkout inside the cache
//! - [`clone`]: single-branch clone into the cache
//! - [`ls_remote_default_branch`], [`ls_remote_heads`], [`remote_heads_by_commit_date`]:
//!   remote queries without a checkout

use crate::core::error::{GitLauncherError, Result};
use git2::Repository;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Command;

pub const REMOTE: &str = "origin";

/// Run `git <args>` (optionally inside `cwd`) and return its stdout.
fn run_git(args: &[&str], cwd: Option<&Path>) -> Result<String> {
    let mut cmd = Command::new("git");
    cmd.args(args);
    if let Some(dir) = cwd {
        cmd.current_dir(dir);
    }

    let rendered = format!("git {}", args.join(" "));
    log::debug!("Running {rendered}");

    let output = cmd.output()?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        log::debug!("{rendered} failed: {}", stderr.trim());
        return Err(GitLauncherError::git_operation(rendered, stderr.trim()));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Clone only `branch` of `url` into `dir`.
pub fn clone(url: &str, branch: &str, dir: &Path, shallow: bool) -> Result<()> {
    if let Some(parent) = dir.parent() {
        fs::create_dir_all(parent)?;
    }
    let dir = dir.to_string_lossy().into_owned();
    let mut args = vec!["clone", "--single-branch", "--branch", branch];
    if shallow {
        args.extend(["--depth", "1"]);
    }
    args.extend([url, dir.as_str()]);
    run_git(&args, None)?;
    Ok(())
}

/// The branch the remote's `HEAD` points at, if the remote advertises it.
pub fn ls_remote_default_branch(url: &str) -> Result<Option<String>> {
    let stdout = run_git(&["ls-remote", "--symref", url, "HEAD"], None)?;
    Ok(parse_symref(&stdout))
}

/// Branch names advertised by the remote, in the order it lists them.
pub fn ls_remote_heads(url: &str) -> Result<Vec<String>> {
    let stdout = run_git(&["ls-remote", "--heads", url], None)?;
    Ok(parse_heads(&stdout))
}

/// Branch names ordered by the committer date of their tips, newest first.
///
/// Commit dates are not part of the ref advertisement, so the tip of every
/// head is fetched (one commit deep, no blobs) into a scratch bare
/// repository that is deleted afterwards.
pub fn remote_heads_by_commit_date(url: &str) -> Result<Vec<String>> {
    let scratch = tempfile::Builder::new()
        .prefix("git-launcher-heads-")
        .tempdir()?;
    let dir = Some(scratch.path());

    run_git(&["init", "--bare", "--quiet"], dir)?;
    run_git(
        &[
            "fetch",
            "--quiet",
            "--no-tags",
            "--depth=1",
            "--filter=blob:none",
            url,
            "+refs/heads/*:refs/heads/*",
        ],
        dir,
    )?;
    let stdout = run_git(
        &[
            "for-each-ref",
            "--sort=-committerdate",
            "--format=%(refname:short)",
            "refs/heads",
        ],
        dir,
    )?;
    Ok(stdout
        .lines()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect())
}

fn parse_symref(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let (target, name) = line.strip_prefix("ref:")?.trim().split_once('\t')?;
        if name.trim() != "HEAD" {
            return None;
        }
        target.trim().strip_prefix("refs/heads/").map(str::to_string)
    })
}

fn parse_heads(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter_map(|line| line.split_whitespace().nth(1))
        .filter_map(|name| name.strip_prefix("refs/heads/"))
        .map(str::to_string)
        .collect()
}

pub struct GitRepo {
    repo: Repository,
    workdir: PathBuf,
}

impl GitRepo {
    /// Open the checkout rooted exactly at `path` (no upward discovery, the
    /// cache may itself live inside another repository).
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let repo = Repository::open(path)?;
        let workdir = repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| GitLauncherError::NotACheckout {
                path: path.to_path_buf(),
            })?;
        Ok(GitRepo { repo, workdir })
    }

    fn git(&self, args: &[&str]) -> Result<String> {
        run_git(args, Some(&self.workdir))
    }

    pub fn current_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(str::to_string)
    }

    pub fn has_local_branch(&self, branch: &str) -> bool {
        self.repo
            .find_reference(&format!("refs/heads/{branch}"))
            .is_ok()
    }

    /// Fetch one branch into its remote-tracking ref. The explicit refspec
    /// matters: single-branch clones only track the branch they were cloned with.
    pub fn fetch_branch(&self, branch: &str) -> Result<()> {
        let refspec = format!("+refs/heads/{branch}:refs/remotes/{REMOTE}/{branch}");
        self.git(&["fetch", REMOTE, &refspec])?;
        Ok(())
    }

    /// Commits on `origin/<branch>` that the local `<branch>` lacks.
    /// `None` when the remote-tracking ref is missing; 0 when no local branch
    /// exists yet (checking it out will start from the remote tip).
    pub fn behind_count(&self, branch: &str) -> Result<Option<usize>> {
        let remote_oid = match self
            .repo
            .find_reference(&format!("refs/remotes/{REMOTE}/{branch}"))
            .ok()
            .and_then(|r| r.target())
        {
            Some(oid) => oid,
            None => return Ok(None),
        };

        let local_oid = match self
            .repo
            .find_reference(&format!("refs/heads/{branch}"))
            .ok()
            .and_then(|r| r.target())
        {
            Some(oid) => oid,
            None => return Ok(Some(0)),
        };

        let (_ahead, behind) = self.repo.graph_ahead_behind(local_oid, remote_oid)?;
        Ok(Some(behind))
    }

    /// Switch to `branch`, creating it from `origin/<branch>` when it only
    /// exists remotely. Re-running on the current branch is just a checkout.
    pub fn checkout(&self, branch: &str) -> Result<()> {
        if self.has_local_branch(branch) {
            self.git(&["checkout", branch])?;
        } else {
            self.fetch_branch(branch)?;
            let start = format!("{REMOTE}/{branch}");
            self.git(&["checkout", "-b", branch, &start])?;
        }
        log::debug!("Checked out {branch} in {}", self.workdir.display());
        Ok(())
    }

    /// Fast-forward `branch` to the remote; fails rather than merging.
    pub fn pull_ff_only(&self, branch: &str) -> Result<()> {
        self.git(&["pull", "--ff-only", REMOTE, branch])?;
        Ok(())
    }

    /// Keep `pattern` out of `git status` via `.git/info/exclude`.
    pub fn exclude(&self, pattern: &str) -> Result<()> {
        let info_dir = self.repo.path().join("info");
        fs::create_dir_all(&info_dir)?;
        let exclude_path = info_dir.join("exclude");

        let existing = fs::read_to_string(&exclude_path).unwrap_or_default();
        if existing.lines().any(|line| line.trim() == pattern) {
            return Ok(());
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&exclude_path)?;
        if !existing.is_empty() && !existing.ends_with('\n') {
            writeln!(file)?;
        }
        writeln!(file, "{pattern}")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git_in(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap()
            .status;
        assert!(status.success(), "git {args:?} failed");
    }

    fn setup_repo() -> (TempDir, GitRepo) {
        let temp = TempDir::new().unwrap();
        let path = temp.path();
        git_in(path, &["init", "-b", "main"]);
        git_in(path, &["config", "user.name", "Test User"]);
        git_in(path, &["config", "user.email", "test@example.com"]);
        fs::write(path.join("README.md"), "hello\n").unwrap();
        git_in(path, &["add", "."]);
        git_in(path, &["commit", "-m", "Initial commit"]);
        let repo = GitRepo::open(path).unwrap();
        (temp, repo)
    }

    #[test]
    fn test_parse_symref() {
        let out = "ref: refs/heads/trunk\tHEAD\n0123abcd\tHEAD\n";
        assert_eq!(parse_symref(out), Some("trunk".to_string()));
        assert_eq!(parse_symref("0123abcd\tHEAD\n"), None);
    }

    #[test]
    fn test_parse_heads() {
        let out = "aaa\trefs/heads/main\nbbb\trefs/heads/feature/x\nccc\trefs/tags/v1\n";
        assert_eq!(parse_heads(out), vec!["main", "feature/x"]);
    }

    #[test]
    fn test_current_branch_and_local_refs() {
        let (_temp, repo) = setup_repo();
        assert_eq!(repo.current_branch().as_deref(), Some("main"));
        assert!(repo.has_local_branch("main"));
        assert!(!repo.has_local_branch("develop"));
    }

    #[test]
    fn test_behind_count_without_tracking_ref_is_none() -> Result<()> {
        let (_temp, repo) = setup_repo();
        assert_eq!(repo.behind_count("main")?, None);
        Ok(())
    }

    #[test]
    fn test_open_plain_directory_fails() {
        let temp = TempDir::new().unwrap();
        assert!(GitRepo::open(temp.path()).is_err());
    }

    #[test]
    fn test_checkout_missing_branch_without_remote_fails() {
        let (_temp, repo) = setup_repo();
        let err = repo.checkout("does-not-exist").unwrap_err();
        assert!(matches!(err, GitLauncherError::GitOperation { .. }));
    }

    #[test]
    fn test_exclude_is_idempotent() -> Result<()> {
        let (temp, repo) = setup_repo();
        repo.exclude(".meta.json")?;
        repo.exclude(".meta.json")?;

        let content = fs::read_to_string(temp.path().join(".git/info/exclude"))?;
        assert_eq!(
            content.lines().filter(|l| l.trim() == ".meta.json").count(),
            1
        );
        Ok(())
    }
}
