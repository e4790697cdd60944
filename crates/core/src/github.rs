//! GitHub REST types and push planning
//!
//! Publishing a generated project is a two-phase protocol:
//!
//! 1. **Seed**: a repository without commits has no default branch ref, and the
//!    git data API needs an existing tip to build on. One file is committed
//!    through the contents API, which creates the branch.
//! 2. **Bulk**: every remaining file goes into a single tree and a single
//!    commit on top of the branch tip.
//!
//! [`plan_push`] decides which file (if any) seeds the branch and what goes in
//! the bulk commit.

use serde::{Deserialize, Serialize};

use crate::files::{GeneratedFile, GeneratedFileSet};
use crate::prompt::REPOSITORY_URL_PLACEHOLDER;
use crate::template::README;

/// Branch used when the API does not report one.
pub const DEFAULT_BRANCH: &str = "main";

/// Regular, non-executable file.
pub const BLOB_MODE: &str = "100644";

// =============================================================================
// API Response Types (Deserialization)
// =============================================================================

/// `GET /user`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubUser {
    pub login: String,
    #[serde(default)]
    pub html_url: Option<String>,
}

/// `GET /repos/{owner}/{repo}` and `POST /user/repos`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubRepositoryResponse {
    pub name: String,
    pub owner: GitHubOwner,
    pub html_url: String,
    pub clone_url: String,
    #[serde(default)]
    pub default_branch: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubOwner {
    pub login: String,
}

/// Entry of `GET /repos/{owner}/{repo}/commits`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubCommitSummary {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/ref/heads/{branch}`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubRefResponse {
    #[serde(rename = "ref")]
    pub reference: String,
    pub object: GitHubObject,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GitHubObject {
    pub sha: String,
}

/// `GET /repos/{owner}/{repo}/git/commits/{sha}` and `POST .../git/commits`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubCommitResponse {
    pub sha: String,
    pub tree: GitHubObject,
}

/// `POST /repos/{owner}/{repo}/git/trees`
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubTreeResponse {
    pub sha: String,
}

/// Error body returned by most endpoints.
#[derive(Debug, Deserialize, Clone)]
pub struct GitHubErrorResponse {
    pub message: String,
}

// =============================================================================
// API Request Types (Serialization)
// =============================================================================

#[derive(Debug, Serialize, Clone)]
pub struct CreateRepositoryRequest {
    pub name: String,
    pub private: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateFileRequest {
    pub message: String,
    /// Base64-encoded file content.
    pub content: String,
    pub branch: String,
}

#[derive(Debug, Serialize, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    pub path: String,
    pub mode: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub content: String,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateTreeRequest {
    pub base_tree: String,
    pub tree: Vec<TreeEntry>,
}

#[derive(Debug, Serialize, Clone)]
pub struct CreateCommitRequest {
    pub message: String,
    pub tree: String,
    pub parents: Vec<String>,
}

#[derive(Debug, Serialize, Clone)]
pub struct UpdateRefRequest {
    pub sha: String,
    pub force: bool,
}

// =============================================================================
// Domain Models
// =============================================================================

/// A repository that exists on the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub owner: String,
    pub name: String,
    pub default_branch: String,
    pub clone_url: String,
    pub html_url: String,
}

impl RemoteRepository {
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }
}

impl From<GitHubRepositoryResponse> for RemoteRepository {
    fn from(response: GitHubRepositoryResponse) -> Self {
        Self {
            owner: response.owner.login,
            name: response.name,
            default_branch: response
                .default_branch
                .filter(|b| !b.is_empty())
                .unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            clone_url: response.clone_url,
            html_url: response.html_url,
        }
    }
}

/// What to commit, split by phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushPlan {
    /// Committed alone through the contents API to create the default branch.
    pub seed: Option<GeneratedFile>,
    /// Committed together in one tree.
    pub bulk: GeneratedFileSet,
}

// =============================================================================
// Transformation Functions
// =============================================================================

/// Split `files` into the seed and bulk phases.
///
/// Only a repository without commits gets a seed file.
pub fn plan_push(mut files: GeneratedFileSet, repository_is_empty: bool) -> PushPlan {
    if !repository_is_empty {
        return PushPlan {
            seed: None,
            bulk: files,
        };
    }

    let seed = select_seed_path(&files).and_then(|path| files.remove(&path));
    PushPlan { seed, bulk: files }
}

/// README.md when it has content, otherwise the first non-blank entry.
pub fn select_seed_path(files: &GeneratedFileSet) -> Option<String> {
    if files.get(README).is_some_and(|c| !c.trim().is_empty()) {
        return Some(README.to_string());
    }

    files
        .iter()
        .find(|f| !f.content.trim().is_empty())
        .map(|f| f.path.clone())
}

/// Replace the clone URL placeholder inside README.md.
pub fn substitute_clone_url(files: &mut GeneratedFileSet, clone_url: &str) {
    files.update(README, |content| {
        content.replace(REPOSITORY_URL_PLACEHOLDER, clone_url)
    });
}

pub fn tree_entries(files: &GeneratedFileSet) -> Vec<TreeEntry> {
    files
        .iter()
        .map(|f| TreeEntry {
            path: f.path.clone(),
            mode: BLOB_MODE.to_string(),
            kind: "blob".to_string(),
            content: f.content.clone(),
        })
        .collect()
}

pub fn seed_commit_message(repository_name: &str) -> String {
    format!("CodeMate: Initial project setup for {repository_name}")
}

pub fn bulk_commit_message(description: &str) -> String {
    format!("CodeMate: Project generation for '{}'", description.trim())
}
