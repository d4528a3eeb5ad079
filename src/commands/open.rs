use crate::core::{
    chooser::Chooser,
    config::Config,
    error::Result,
    evictor::TtlEvictor,
    lifecycle::RepoLifecycleManager,
    meta::MetadataStore,
    output::{print_info, print_success},
    resolver::{ReferenceResolver, RepoRef},
    search::RepoSearch,
};

/// Flags shared by every command that ends in a launch.
#[derive(Debug, Default, Clone, Copy)]
pub struct LaunchOptions<'a> {
    pub branch: Option<&'a str>,
    pub provider: Option<&'a str>,
    pub launch: Option<&'a str>,
}

/// Resolve `reference`, make it available on the right branch and launch
/// the selected command in it.
pub fn execute_open(
    config: &Config,
    reference: &str,
    options: LaunchOptions,
    chooser: &dyn Chooser,
    search: &dyn RepoSearch,
) -> Result<()> {
    // An unknown alias must fail before anything gets cloned.
    let command = config.launch_command(options.provider, options.launch)?;

    let store = MetadataStore::for_config(config);
    let repo =
        ReferenceResolver::new(chooser, search).resolve(reference, &config.base_dir, &store)?;

    open_repo(config, &store, chooser, &repo, options.branch, &command)
}

pub(crate) fn open_repo(
    config: &Config,
    store: &MetadataStore,
    chooser: &dyn Chooser,
    repo: &RepoRef,
    branch: Option<&str>,
    command: &str,
) -> Result<()> {
    let manager = RepoLifecycleManager::new(config, store, chooser);
    let mut checkout = manager.ensure(repo, branch)?;
    print_success(&format!(
        "{} on {} ({})",
        repo.full_name(),
        checkout.branch,
        checkout.path.display()
    ));

    let launched = manager.launch(&mut checkout, command);
    purge_stale(config);
    launched
}

/// Opportunistic TTL purge, run around every invocation. A failure here
/// never fails the invocation.
pub fn purge_stale(config: &Config) {
    match TtlEvictor::maybe_purge(config) {
        Ok(0) => {}
        Ok(1) => print_info("Evicted 1 stale repository"),
        Ok(count) => print_info(&format!("Evicted {count} stale repositories")),
        Err(e) => log::warn!("TTL purge failed: {e}"),
    }
}
