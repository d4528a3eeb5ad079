//! Test doubles for the interactive collaborators and ready-made cache homes

#![allow(dead_code)]

use git_launcher::core::chooser::{Chooser, UpdateAction};
use git_launcher::core::config::Config;
use git_launcher::core::error::Result;
use git_launcher::core::search::{RepoSearch, SearchHit};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::path::Path;
use tempfile::TempDir;

/// Answers prompts from a script and records what it was asked. Running out
/// of answers panics so unexpected prompts fail the test.
#[derive(Default)]
pub struct ScriptedChooser {
    picks: RefCell<VecDeque<Option<usize>>>,
    many: RefCell<VecDeque<Option<Vec<usize>>>>,
    updates: RefCell<VecDeque<UpdateAction>>,
    pub offered: RefCell<Vec<Vec<String>>>,
    pub preselected: RefCell<Vec<Vec<bool>>>,
    pub update_prompts: RefCell<Vec<(String, usize)>>,
}

impl ScriptedChooser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pick(self, answer: Option<usize>) -> Self {
        self.picks.borrow_mut().push_back(answer);
        self
    }

    pub fn pick_many(self, answer: Option<Vec<usize>>) -> Self {
        self.many.borrow_mut().push_back(answer);
        self
    }

    pub fn update(self, action: UpdateAction) -> Self {
        self.updates.borrow_mut().push_back(action);
        self
    }
}

impl Chooser for ScriptedChooser {
    fn choose(&self, prompt: &str, lines: &[String]) -> Result<Option<usize>> {
        self.offered.borrow_mut().push(lines.to_vec());
        let answer = self.picks.borrow_mut().pop_front();
        match answer {
            Some(answer) => Ok(answer),
            None => panic!("unexpected prompt '{prompt}' with {lines:?}"),
        }
    }

    fn choose_many(
        &self,
        prompt: &str,
        lines: &[String],
        preselected: &[bool],
    ) -> Result<Option<Vec<usize>>> {
        self.offered.borrow_mut().push(lines.to_vec());
        self.preselected.borrow_mut().push(preselected.to_vec());
        let answer = self.many.borrow_mut().pop_front();
        match answer {
            Some(answer) => Ok(answer),
            None => panic!("unexpected multi-select '{prompt}' with {lines:?}"),
        }
    }

    fn prompt_update(&self, branch: &str, behind: usize) -> Result<UpdateAction> {
        self.update_prompts
            .borrow_mut()
            .push((branch.to_string(), behind));
        let answer = self.updates.borrow_mut().pop_front();
        match answer {
            Some(answer) => Ok(answer),
            None => panic!("unexpected update prompt for {branch} ({behind} behind)"),
        }
    }
}

/// Remote search that must never be reached.
pub struct NoSearch;

impl RepoSearch for NoSearch {
    fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
        panic!("remote search must not run for '{query}'");
    }
}

/// Remote search with canned hits.
pub struct CannedSearch(pub Vec<SearchHit>);

impl RepoSearch for CannedSearch {
    fn search(&self, _query: &str) -> Result<Vec<SearchHit>> {
        Ok(self.0.clone())
    }
}

/// A cache home in a temp dir with default configuration.
pub struct TestHome {
    pub temp_dir: TempDir,
    pub config: Config,
}

impl TestHome {
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn base_dir(&self) -> &Path {
        &self.config.base_dir
    }
}

pub fn setup_home() -> Result<TestHome> {
    let temp_dir = TempDir::new()?;
    let config = Config::defaults(temp_dir.path());
    Ok(TestHome { temp_dir, config })
}
