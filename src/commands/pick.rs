use crate::commands::open::{open_repo, LaunchOptions};
use crate::core::{
    cache_index::CacheIndex,
    chooser::Chooser,
    config::Config,
    error::{GitLauncherError, Result},
    meta::MetadataStore,
    resolver::{candidates, Candidate},
};
use chrono::Utc;

/// No reference given: choose among cached and previously used repositories.
pub fn execute_pick(config: &Config, options: LaunchOptions, chooser: &dyn Chooser) -> Result<()> {
    let command = config.launch_command(options.provider, options.launch)?;

    let store = MetadataStore::for_config(config);
    let entries = CacheIndex::scan(&config.base_dir)?;
    let synced = store.sync_history(&entries)?;
    if synced > 0 {
        log::debug!("Recorded {synced} cached repositories in history");
    }

    let known = candidates(&entries, &store.history()?);
    if known.is_empty() {
        return Err(GitLauncherError::resolution(
            "no repositories yet, pass a reference such as owner/repo",
        ));
    }

    let picked = choose_candidate(chooser, &known)?;
    let repo = picked.to_repo_ref().ok_or_else(|| {
        GitLauncherError::resolution(format!("invalid repository name '{}'", picked.full_name))
    })?;
    store.record_access(&repo.full_name(), Utc::now())?;

    open_repo(config, &store, chooser, &repo, options.branch, &command)
}

fn choose_candidate<'a>(chooser: &dyn Chooser, known: &'a [Candidate]) -> Result<&'a Candidate> {
    let lines: Vec<String> = known.iter().map(Candidate::display).collect();
    chooser
        .choose("Repository", &lines)?
        .and_then(|index| known.get(index))
        .ok_or_else(|| GitLauncherError::resolution("canceled"))
}
