//! Git repository management and setup utilities
//!
//! Tests never talk to a hosting platform: a bare repository in a temp dir
//! plays the remote, and its filesystem path is used as the clone URL.

#![allow(dead_code)]

use chrono::{DateTime, Utc};
use git_launcher::core::error::{GitLauncherError, Result};
use git_launcher::core::meta::{MetadataStore, RepoMeta};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

/// A bare "remote" plus a working clone used to push new commits to it.
/// The TempDir must be kept alive for the duration of the test.
pub struct TestRemote {
    pub temp_dir: TempDir,
    pub bare: PathBuf,
    pub work: PathBuf,
}

impl TestRemote {
    /// Clone URL of the remote (its path).
    pub fn url(&self) -> String {
        self.bare.to_string_lossy().into_owned()
    }

    /// Commit a file in the working clone and push it to `branch`.
    pub fn push_commit(&self, branch: &str, filename: &str, content: &str) -> Result<()> {
        git(&self.work, &["checkout", branch])?;
        create_file(&self.work, filename, content)?;
        git(&self.work, &["add", filename])?;
        git(&self.work, &["commit", "-m", &format!("Update {filename}")])?;
        git(&self.work, &["push", "origin", branch])?;
        Ok(())
    }

    /// Like [`Self::push_commit`], but committed at a fixed `date` (RFC 3339).
    pub fn push_commit_at(&self, branch: &str, filename: &str, date: &str) -> Result<()> {
        git(&self.work, &["checkout", branch])?;
        create_file(&self.work, filename, date)?;
        git(&self.work, &["add", filename])?;
        git_with_env(
            &self.work,
            &["commit", "-m", &format!("Update {filename}")],
            &[("GIT_COMMITTER_DATE", date), ("GIT_AUTHOR_DATE", date)],
        )?;
        git(&self.work, &["push", "origin", branch])?;
        git(&self.work, &["checkout", "main"])?;
        Ok(())
    }

    /// Push `count` new commits to `branch`.
    pub fn push_commits(&self, branch: &str, count: usize) -> Result<()> {
        for i in 0..count {
            self.push_commit(branch, &format!("change-{i}.txt"), &format!("change {i}\n"))?;
        }
        Ok(())
    }

    /// Create `branch` from the current `main` and push it.
    pub fn push_branch(&self, branch: &str) -> Result<()> {
        git(&self.work, &["checkout", "main"])?;
        git(&self.work, &["checkout", "-b", branch])?;
        create_file(&self.work, &format!("{branch}.txt"), "branch work\n")?;
        git(&self.work, &["add", "."])?;
        git(&self.work, &["commit", "-m", &format!("Start {branch}")])?;
        git(&self.work, &["push", "origin", branch])?;
        git(&self.work, &["checkout", "main"])?;
        Ok(())
    }

    pub fn head(&self, branch: &str) -> Result<String> {
        rev_parse(&self.bare, branch)
    }

    /// Make the remote unreachable.
    pub fn take_offline(&self) -> Result<()> {
        fs::remove_dir_all(&self.bare)?;
        Ok(())
    }
}

/// Runs git in `dir`, failing with the captured stderr.
pub fn git(dir: &Path, args: &[&str]) -> Result<String> {
    git_with_env(dir, args, &[])
}

pub fn git_with_env(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_TERMINAL_PROMPT", "0")
        .envs(envs.iter().copied())
        .output()?;

    if !output.status.success() {
        return Err(GitLauncherError::git_operation(
            format!("git {}", args.join(" ")),
            String::from_utf8_lossy(&output.stderr).trim().to_string(),
        ));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

pub fn rev_parse(dir: &Path, rev: &str) -> Result<String> {
    git(dir, &["rev-parse", rev])
}

/// Sets up a bare remote on `main` with one initial commit.
pub fn setup_remote() -> Result<TestRemote> {
    let temp_dir = TempDir::new()?;
    let bare = temp_dir.path().join("remote.git");
    let work = temp_dir.path().join("work");
    fs::create_dir_all(&bare)?;
    fs::create_dir_all(&work)?;

    git(&bare, &["init", "--bare", "-b", "main"])?;
    git(&work, &["init", "-b", "main"])?;
    configure_identity(&work)?;

    create_file(&work, "README.md", "# test remote\n")?;
    git(&work, &["add", "README.md"])?;
    git(&work, &["commit", "-m", "Initial commit"])?;
    git(&work, &["remote", "add", "origin", &bare.to_string_lossy()])?;
    git(&work, &["push", "-u", "origin", "main"])?;

    Ok(TestRemote {
        temp_dir,
        bare,
        work,
    })
}

/// Set git config to avoid prompts during tests
pub fn configure_identity(repo_path: &Path) -> Result<()> {
    git(repo_path, &["config", "user.name", "Test User"])?;
    git(repo_path, &["config", "user.email", "test@example.com"])?;
    Ok(())
}

pub fn create_file(repo_path: &Path, filename: &str, content: &str) -> Result<()> {
    fs::write(repo_path.join(filename), content)?;
    Ok(())
}

/// Place a single-branch clone of `remote` in the cache as `full_name`, with
/// metadata stamped at `last_access`. Mirrors what a first open leaves behind.
pub fn cache_clone(
    base_dir: &Path,
    remote: &TestRemote,
    full_name: &str,
    branch: &str,
    last_access: DateTime<Utc>,
) -> Result<PathBuf> {
    let dir = base_dir.join(full_name);
    fs::create_dir_all(&dir)?;
    git(
        &dir,
        &[
            "clone",
            "--single-branch",
            "--branch",
            branch,
            &remote.url(),
            ".",
        ],
    )?;

    let meta = RepoMeta::new(remote.url(), full_name, branch, last_access);
    MetadataStore::write_meta(&dir, &meta)?;
    Ok(dir)
}

/// A cache entry without a checkout: just a directory and its metadata.
pub fn cache_stub(base_dir: &Path, full_name: &str, last_access: DateTime<Utc>) -> Result<PathBuf> {
    let dir = base_dir.join(full_name);
    fs::create_dir_all(&dir)?;
    create_file(&dir, "README.md", "stub\n")?;
    let meta = RepoMeta::new(
        format!("https://github.com/{full_name}.git"),
        full_name,
        "main",
        last_access,
    );
    MetadataStore::write_meta(&dir, &meta)?;
    Ok(dir)
}

pub fn current_branch(dir: &Path) -> Result<String> {
    git(dir, &["rev-parse", "--abbrev-ref", "HEAD"])
}
