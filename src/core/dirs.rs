use crate::core::error::{GitLauncherError, Result};
use std::path::{Component, Path, PathBuf};

/// Overrides the cache home entirely; used by tests and by users who keep
/// their clones somewhere unusual.
pub const HOME_ENV: &str = "GIT_LAUNCHER_HOME";

const APP_DIR: &str = "git-launcher";

/// Directory holding `config.json`, `history.jsonl` and (by default) the clones.
pub fn get_cache_home() -> Result<PathBuf> {
    if let Ok(home) = std::env::var(HOME_ENV) {
        if !home.trim().is_empty() {
            return Ok(PathBuf::from(home));
        }
    }

    let base = match std::env::consts::OS {
        "linux" | "freebsd" | "netbsd" | "openbsd" => std::env::var("XDG_CACHE_HOME")
            .map(PathBuf::from)
            .or_else(|_| {
                dirs::home_dir()
                    .map(|home| home.join(".cache"))
                    .ok_or(GitLauncherError::CacheHomeNotFound)
            })?,
        "macos" => dirs::home_dir()
            .ok_or(GitLauncherError::CacheHomeNotFound)?
            .join("Library/Caches"),
        _ => dirs::cache_dir().ok_or(GitLauncherError::CacheHomeNotFound)?,
    };

    Ok(base.join(APP_DIR))
}

/// Expand a leading `~/` against the user's home directory.
pub fn expand_home(path: &str) -> PathBuf {
    match path.strip_prefix("~/") {
        Some(rest) => dirs::home_dir()
            .map(|home| home.join(rest))
            .unwrap_or_else(|| PathBuf::from(path)),
        None => PathBuf::from(path),
    }
}

/// On-disk location of a cached repository: `<base>/<owner>/<repo>`.
pub fn repo_dir(base_dir: &Path, owner: &str, repo: &str) -> PathBuf {
    base_dir.join(owner).join(repo)
}

/// True when `dir` is exactly `<base>/<owner>/<repo>` with two plain
/// components, so nothing above or beside a checkout can be addressed.
pub fn is_repo_dir(base_dir: &Path, dir: &Path) -> bool {
    let Ok(relative) = dir.strip_prefix(base_dir) else {
        return false;
    };
    let components: Vec<Component> = relative.components().collect();
    components.len() == 2
        && components
            .iter()
            .all(|component| matches!(component, Component::Normal(_)))
}
