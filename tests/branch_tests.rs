use git_launcher::core::branch::{list_remote_branches, BranchSelector};

mod common;
use common::{fixtures::*, repository::*};

#[cfg(test)]
mod branch_tests {
    use super::*;

    fn remote_with_dated_branches() -> anyhow::Result<TestRemote> {
        let remote = setup_remote()?;
        remote.push_branch("stale")?;
        remote.push_commit_at("stale", "stale.txt", "2001-01-01T00:00:00Z")?;
        remote.push_branch("fresh")?;
        remote.push_commit_at("fresh", "fresh.txt", "2099-01-01T00:00:00Z")?;
        Ok(remote)
    }

    #[test]
    fn test_listing_is_sorted_by_last_commit() -> anyhow::Result<()> {
        let remote = remote_with_dated_branches()?;

        let listing = list_remote_branches(&remote.url())?;
        assert!(listing.sorted);
        assert_eq!(listing.branches, vec!["fresh", "main", "stale"]);
        Ok(())
    }

    #[test]
    fn test_selector_offers_default_then_newest() -> anyhow::Result<()> {
        let remote = remote_with_dated_branches()?;
        let chooser = ScriptedChooser::new().pick(Some(1));

        let branch = BranchSelector::new(&chooser).select(&remote.url(), None)?;
        assert_eq!(branch, "fresh");
        assert_eq!(
            chooser.offered.borrow()[0],
            vec![
                "main (default)".to_string(),
                "fresh".to_string(),
                "stale".to_string()
            ]
        );
        Ok(())
    }
}
