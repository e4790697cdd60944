//! In-memory [`RepositoryHost`] for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use codemate_core::files::GeneratedFile;
use codemate_core::github::{RemoteRepository, TreeEntry, DEFAULT_BRANCH};

use super::RepositoryHost;
use crate::prelude::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCommit {
    pub message: String,
    pub paths: Vec<String>,
}

#[derive(Default)]
struct State {
    repositories: HashMap<String, bool>,
    created: Vec<String>,
    commits: Vec<FakeCommit>,
    files: HashMap<String, String>,
    trees: HashMap<String, Vec<TreeEntry>>,
    pending_commits: HashMap<String, (FakeCommit, String)>,
    transient_branch_failures: u32,
    branch_lookups: u32,
}

#[derive(Default)]
pub struct FakeHost {
    login: Option<String>,
    fail_create_file: bool,
    fail_lookup: bool,
    branch_error: bool,
    state: Mutex<State>,
}

impl FakeHost {
    pub fn new(login: &str) -> Self {
        Self {
            login: Some(login.to_string()),
            ..Default::default()
        }
    }

    /// Every call fails authentication.
    pub fn unauthorized() -> Self {
        Self::default()
    }

    pub fn with_existing_repository(self, name: &str, has_commits: bool) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            state.repositories.insert(name.to_string(), has_commits);
            if has_commits {
                state.commits.push(FakeCommit {
                    message: "Initial commit".to_string(),
                    paths: Vec::new(),
                });
            }
        }
        self
    }

    pub fn with_transient_branch_failures(self, count: u32) -> Self {
        self.state.lock().unwrap().transient_branch_failures = count;
        self
    }

    pub fn with_branch_error(mut self) -> Self {
        self.branch_error = true;
        self
    }

    pub fn with_failing_create_file(mut self) -> Self {
        self.fail_create_file = true;
        self
    }

    pub fn with_failing_lookup(mut self) -> Self {
        self.fail_lookup = true;
        self
    }

    pub fn commits(&self) -> Vec<FakeCommit> {
        self.state.lock().unwrap().commits.clone()
    }

    pub fn created_repositories(&self) -> Vec<String> {
        self.state.lock().unwrap().created.clone()
    }

    pub fn branch_lookups(&self) -> u32 {
        self.state.lock().unwrap().branch_lookups
    }

    /// Latest committed content of `path`.
    pub fn file_content(&self, path: &str) -> Option<String> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    fn login(&self) -> Result<&str, Error> {
        self.login
            .as_deref()
            .ok_or_else(|| Error::Auth("Bad credentials".to_string()))
    }

    fn repository(&self, name: &str) -> Result<RemoteRepository, Error> {
        let owner = self.login()?;
        Ok(RemoteRepository {
            owner: owner.to_string(),
            name: name.to_string(),
            default_branch: DEFAULT_BRANCH.to_string(),
            clone_url: format!("https://github.com/{owner}/{name}.git"),
            html_url: format!("https://github.com/{owner}/{name}"),
        })
    }
}

impl RepositoryHost for FakeHost {
    async fn authenticated_user(&self) -> Result<String, Error> {
        self.login().map(str::to_string)
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<RemoteRepository, Error> {
        if self.fail_lookup {
            return Err(Error::Remote("Server Error".to_string()));
        }
        if self.state.lock().unwrap().repositories.contains_key(name) {
            self.repository(name)
        } else {
            Err(Error::RemoteNotFound(format!("{owner}/{name}")))
        }
    }

    async fn create_repository(&self, name: &str) -> Result<RemoteRepository, Error> {
        let repository = self.repository(name)?;
        let mut state = self.state.lock().unwrap();
        state.repositories.insert(name.to_string(), false);
        state.created.push(name.to_string());
        Ok(repository)
    }

    async fn has_commits(&self, repository: &RemoteRepository) -> Result<bool, Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .repositories
            .get(&repository.name)
            .copied()
            .unwrap_or_default())
    }

    async fn create_file(
        &self,
        repository: &RemoteRepository,
        _branch: &str,
        file: &GeneratedFile,
        message: &str,
    ) -> Result<(), Error> {
        if self.fail_create_file {
            return Err(Error::Remote("Validation Failed".to_string()));
        }
        let mut state = self.state.lock().unwrap();
        state.repositories.insert(repository.name.clone(), true);
        state.files.insert(file.path.clone(), file.content.clone());
        state.commits.push(FakeCommit {
            message: message.to_string(),
            paths: vec![file.path.clone()],
        });
        Ok(())
    }

    async fn branch_tip(&self, repository: &RemoteRepository, branch: &str) -> Result<String, Error> {
        let mut state = self.state.lock().unwrap();
        state.branch_lookups += 1;

        if self.branch_error {
            return Err(Error::Remote("Server Error".to_string()));
        }
        if state.transient_branch_failures > 0 {
            state.transient_branch_failures -= 1;
            return Err(Error::RemoteTransient(format!("Branch {branch} not found")));
        }
        if !state.repositories.get(&repository.name).copied().unwrap_or_default() {
            return Err(Error::RemoteTransient("Git Repository is empty.".to_string()));
        }
        Ok(format!("commit-{}", state.commits.len()))
    }

    async fn commit_tree(&self, _repository: &RemoteRepository, commit_sha: &str) -> Result<String, Error> {
        Ok(format!("tree-of-{commit_sha}"))
    }

    async fn create_tree(
        &self,
        _repository: &RemoteRepository,
        _base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, Error> {
        let mut state = self.state.lock().unwrap();
        let sha = format!("tree-{}", state.trees.len() + 1);
        state.trees.insert(sha.clone(), entries.to_vec());
        Ok(sha)
    }

    async fn create_commit(
        &self,
        _repository: &RemoteRepository,
        message: &str,
        tree_sha: &str,
        _parent_sha: &str,
    ) -> Result<String, Error> {
        let mut state = self.state.lock().unwrap();
        let paths = state
            .trees
            .get(tree_sha)
            .map(|entries| entries.iter().map(|e| e.path.clone()).collect())
            .ok_or_else(|| Error::Remote(format!("Unknown tree {tree_sha}")))?;
        let sha = format!("pending-{}", state.pending_commits.len() + 1);
        state.pending_commits.insert(
            sha.clone(),
            (
                FakeCommit {
                    message: message.to_string(),
                    paths,
                },
                tree_sha.to_string(),
            ),
        );
        Ok(sha)
    }

    async fn update_branch(
        &self,
        _repository: &RemoteRepository,
        _branch: &str,
        commit_sha: &str,
    ) -> Result<(), Error> {
        let mut state = self.state.lock().unwrap();
        let (commit, tree_sha) = state
            .pending_commits
            .remove(commit_sha)
            .ok_or_else(|| Error::Remote(format!("Unknown commit {commit_sha}")))?;

        let contents: Vec<(String, String)> = state
            .trees
            .get(&tree_sha)
            .map(|entries| entries.iter().map(|e| (e.path.clone(), e.content.clone())).collect())
            .unwrap_or_default();
        state.files.extend(contents);
        state.commits.push(commit);
        Ok(())
    }
}
