//! Test doubles for the interaction, process, and registry seams.
use crate::error::LibmanError;
use crate::interaction::{Notice, SuggestionLookup, UserInteraction};
use crate::process::{CommandInvocation, CommandRunner, ProcessOutcome};
use crate::registry::{LibrarySummary, PackageRegistry, SearchSuggestion};
use anyhow::{anyhow, Result};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fs;
use std::path::{Path, PathBuf};

/// Write `contents` to `<root>/<rel_dir>/libman.json`.
pub fn write_manifest(root: &Path, rel_dir: &str, contents: &str) -> PathBuf {
    let dir = root.join(rel_dir);
    fs::create_dir_all(&dir).expect("create manifest dir");
    let path = dir.join("libman.json");
    fs::write(&path, contents).expect("write manifest");
    path
}

#[derive(Debug, Clone)]
struct ScriptedSearch {
    queries: Vec<String>,
    choose: Option<usize>,
}

/// Answers prompts from queues; an unscripted prompt fails the test.
#[derive(Debug, Default)]
pub struct ScriptedInteraction {
    folders: VecDeque<Option<PathBuf>>,
    picks: VecDeque<Option<usize>>,
    inputs: VecDeque<Option<String>>,
    searches: VecDeque<ScriptedSearch>,
    pick_items: Vec<Vec<String>>,
    prompts: Vec<String>,
    lookups: Vec<(String, Vec<SearchSuggestion>)>,
    notices: Vec<(Notice, String)>,
}

impl ScriptedInteraction {
    pub fn with_folder(mut self, folder: Option<&Path>) -> Self {
        self.folders.push_back(folder.map(Path::to_path_buf));
        self
    }

    pub fn with_pick(mut self, pick: Option<usize>) -> Self {
        self.picks.push_back(pick);
        self
    }

    pub fn with_input(mut self, input: Option<&str>) -> Self {
        self.inputs.push_back(input.map(str::to_string));
        self
    }

    /// Type each query in turn, then choose an index from the last results.
    pub fn with_search(mut self, queries: &[&str], choose: Option<usize>) -> Self {
        self.searches.push_back(ScriptedSearch {
            queries: queries.iter().map(|q| q.to_string()).collect(),
            choose,
        });
        self
    }

    pub fn pick_calls(&self) -> usize {
        self.pick_items.len()
    }

    pub fn last_pick_items(&self) -> Vec<String> {
        self.pick_items.last().cloned().unwrap_or_default()
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn lookups(&self) -> &[(String, Vec<SearchSuggestion>)] {
        &self.lookups
    }

    pub fn notices(&self) -> &[(Notice, String)] {
        &self.notices
    }
}

impl UserInteraction for ScriptedInteraction {
    fn pick_folder(&mut self, prompt: &str) -> Result<Option<PathBuf>> {
        self.prompts.push(prompt.to_string());
        Ok(self
            .folders
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted folder prompt: {prompt}")))
    }

    fn pick_one(&mut self, prompt: &str, items: &[String]) -> Result<Option<usize>> {
        self.prompts.push(prompt.to_string());
        self.pick_items.push(items.to_vec());
        Ok(self
            .picks
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted pick prompt: {prompt}")))
    }

    fn input(&mut self, prompt: &str, _placeholder: &str) -> Result<Option<String>> {
        self.prompts.push(prompt.to_string());
        Ok(self
            .inputs
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted input prompt: {prompt}")))
    }

    fn search(
        &mut self,
        prompt: &str,
        lookup: &mut SuggestionLookup<'_>,
    ) -> Result<Option<SearchSuggestion>> {
        self.prompts.push(prompt.to_string());
        let script = self
            .searches
            .pop_front()
            .unwrap_or_else(|| panic!("unscripted search prompt: {prompt}"));
        let mut last = Vec::new();
        for query in &script.queries {
            last = lookup(query);
            self.lookups.push((query.clone(), last.clone()));
        }
        Ok(script.choose.and_then(|index| last.get(index).cloned()))
    }

    fn notify(&mut self, level: Notice, message: &str) {
        self.notices.push((level, message.to_string()));
    }
}

/// Records invocations instead of spawning them.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    invocations: RefCell<Vec<CommandInvocation>>,
    failure: Option<String>,
    stdout: String,
    stderr: String,
}

impl RecordingRunner {
    pub fn failing(mut self, message: &str) -> Self {
        self.failure = Some(message.to_string());
        self
    }

    pub fn with_stdout(mut self, stdout: &str) -> Self {
        self.stdout = stdout.to_string();
        self
    }

    pub fn with_stderr(mut self, stderr: &str) -> Self {
        self.stderr = stderr.to_string();
        self
    }

    pub fn invocations(&self) -> Vec<CommandInvocation> {
        self.invocations.borrow().clone()
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &CommandInvocation) -> Result<ProcessOutcome> {
        self.invocations.borrow_mut().push(invocation.clone());
        if let Some(message) = &self.failure {
            return Err(LibmanError::Process {
                message: message.clone(),
            }
            .into());
        }
        Ok(ProcessOutcome {
            stdout: self.stdout.clone(),
            stderr: self.stderr.clone(),
        })
    }
}

/// In-memory registry that counts lookups.
#[derive(Debug, Default)]
pub struct CountingRegistry {
    search_results: HashMap<String, Vec<String>>,
    version_results: HashMap<String, Vec<String>>,
    fail: bool,
    search_calls: RefCell<Vec<String>>,
    version_calls: RefCell<Vec<String>>,
}

impl CountingRegistry {
    pub fn with_search(mut self, term: &str, names: &[&str]) -> Self {
        self.search_results.insert(
            term.to_string(),
            names.iter().map(|name| name.to_string()).collect(),
        );
        self
    }

    pub fn with_versions(mut self, name: &str, versions: &[&str]) -> Self {
        self.version_results.insert(
            name.to_string(),
            versions.iter().map(|v| v.to_string()).collect(),
        );
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.search_calls.borrow().clone()
    }

    pub fn version_calls(&self) -> Vec<String> {
        self.version_calls.borrow().clone()
    }
}

impl PackageRegistry for CountingRegistry {
    fn search(&self, term: &str) -> Result<Vec<LibrarySummary>> {
        self.search_calls.borrow_mut().push(term.to_string());
        if self.fail {
            return Err(anyhow!("registry unavailable"));
        }
        Ok(self
            .search_results
            .get(term)
            .map(|names| {
                names
                    .iter()
                    .map(|name| LibrarySummary {
                        name: name.clone(),
                        latest: None,
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    fn versions(&self, name: &str) -> Result<Vec<String>> {
        self.version_calls.borrow_mut().push(name.to_string());
        if self.fail {
            return Err(anyhow!("registry unavailable"));
        }
        Ok(self.version_results.get(name).cloned().unwrap_or_default())
    }
}
