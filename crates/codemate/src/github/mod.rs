mod client;
mod reconcile;

#[cfg(test)]
pub(crate) mod fake;

pub use client::GitHubClient;
pub use reconcile::Reconciler;

use codemate_core::files::GeneratedFile;
use codemate_core::github::{RemoteRepository, TreeEntry};

use crate::prelude::Error;

/// Repository, branch and commit primitives of a source-hosting provider.
///
/// Status mapping every implementation follows: an invalid credential is
/// [`Error::Auth`], a missing repository is [`Error::RemoteNotFound`], a branch
/// ref that has not propagated yet is [`Error::RemoteTransient`].
#[allow(async_fn_in_trait)]
pub trait RepositoryHost {
    /// Login of the account the credential belongs to.
    async fn authenticated_user(&self) -> Result<String, Error>;

    async fn get_repository(&self, owner: &str, name: &str) -> Result<RemoteRepository, Error>;

    /// Create a public repository owned by the authenticated account.
    async fn create_repository(&self, name: &str) -> Result<RemoteRepository, Error>;

    async fn has_commits(&self, repository: &RemoteRepository) -> Result<bool, Error>;

    /// Commit a single file on `branch`, creating the branch if needed.
    async fn create_file(
        &self,
        repository: &RemoteRepository,
        branch: &str,
        file: &GeneratedFile,
        message: &str,
    ) -> Result<(), Error>;

    /// SHA of the commit `branch` points to.
    async fn branch_tip(&self, repository: &RemoteRepository, branch: &str)
        -> Result<String, Error>;

    /// SHA of the tree attached to a commit.
    async fn commit_tree(&self, repository: &RemoteRepository, commit_sha: &str)
        -> Result<String, Error>;

    async fn create_tree(
        &self,
        repository: &RemoteRepository,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, Error>;

    async fn create_commit(
        &self,
        repository: &RemoteRepository,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, Error>;

    async fn update_branch(
        &self,
        repository: &RemoteRepository,
        branch: &str,
        commit_sha: &str,
    ) -> Result<(), Error>;
}
