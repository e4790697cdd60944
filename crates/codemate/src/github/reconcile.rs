use codemate_core::files::{GeneratedFile, GeneratedFileSet};
use codemate_core::github::{
    bulk_commit_message, plan_push, seed_commit_message, substitute_clone_url, tree_entries,
    RemoteRepository,
};
use codemate_core::retry::RetryPolicy;

use super::RepositoryHost;
use crate::prelude::Error;

/// Brings a remote repository in line with a set of generated files.
pub struct Reconciler<'a, H> {
    host: &'a H,
    branch_retry: RetryPolicy,
}

impl<'a, H: RepositoryHost> Reconciler<'a, H> {
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            branch_retry: RetryPolicy::BRANCH_REF,
        }
    }

    pub fn with_branch_retry(mut self, retry: RetryPolicy) -> Self {
        self.branch_retry = retry;
        self
    }

    /// Publish `files` to `<login>/<repository_name>` and return its browsable URL.
    ///
    /// Re-running against an existing repository appends one more commit.
    pub async fn publish(
        &self,
        repository_name: &str,
        description: &str,
        files: &GeneratedFileSet,
    ) -> Result<String, Error> {
        let login = self.host.authenticated_user().await?;
        let repository = self.ensure_repository(&login, repository_name).await?;

        let mut files = files.clone();
        substitute_clone_url(&mut files, &repository.clone_url);

        let is_empty = !self.host.has_commits(&repository).await?;
        let plan = plan_push(files, is_empty);

        if let Some(seed) = &plan.seed {
            self.seed_branch(&repository, seed).await?;
        } else if is_empty {
            log::warn!(
                "No file suitable for the initial commit; {} may remain empty",
                repository.full_name()
            );
        }

        if plan.bulk.is_empty() {
            log::debug!("No further files to push to {}", repository.full_name());
        } else {
            self.push_bulk(&repository, &plan.bulk, &bulk_commit_message(description))
                .await?;
        }

        Ok(repository.html_url)
    }

    async fn ensure_repository(&self, owner: &str, name: &str) -> Result<RemoteRepository, Error> {
        match self.host.get_repository(owner, name).await {
            Ok(repository) => {
                log::debug!("Found existing repository: {}", repository.html_url);
                Ok(repository)
            }
            Err(Error::RemoteNotFound(_)) => {
                log::debug!("Repository {owner}/{name} not found, creating it");
                let repository = self.host.create_repository(name).await?;
                log::info!("Created repository: {}", repository.html_url);
                Ok(repository)
            }
            Err(e) => Err(e),
        }
    }

    /// First commit of an empty repository; creates the default branch.
    async fn seed_branch(&self, repository: &RemoteRepository, seed: &GeneratedFile) -> Result<(), Error> {
        log::debug!(
            "{} has no commits, seeding {} with {}",
            repository.full_name(),
            repository.default_branch,
            seed.path
        );
        self.host
            .create_file(
                repository,
                &repository.default_branch,
                seed,
                &seed_commit_message(&repository.name),
            )
            .await
    }

    /// One tree and one commit for every file in `files`.
    async fn push_bulk(
        &self,
        repository: &RemoteRepository,
        files: &GeneratedFileSet,
        message: &str,
    ) -> Result<(), Error> {
        let branch = repository.default_branch.as_str();
        let tip = self.resolve_branch_tip(repository, branch).await?;
        let base_tree = self.host.commit_tree(repository, &tip).await?;
        let tree = self
            .host
            .create_tree(repository, &base_tree, &tree_entries(files))
            .await?;
        let commit = self
            .host
            .create_commit(repository, message, &tree, &tip)
            .await?;
        self.host.update_branch(repository, branch, &commit).await?;

        log::info!(
            "Pushed {} file(s) to {} in commit {commit}",
            files.len(),
            repository.full_name()
        );
        Ok(())
    }

    async fn resolve_branch_tip(&self, repository: &RemoteRepository, branch: &str) -> Result<String, Error> {
        let mut attempt = 1;
        loop {
            match self.host.branch_tip(repository, branch).await {
                Ok(sha) => return Ok(sha),
                Err(e) if e.is_transient() => match self.branch_retry.delay_after(attempt) {
                    Some(delay) => {
                        log::debug!("Branch '{branch}' not visible yet (attempt {attempt}): {e}");
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    None => {
                        return Err(Error::Remote(format!(
                            "Failed to resolve branch '{branch}' after {attempt} attempts: {e}"
                        )))
                    }
                },
                Err(e) => return Err(e),
            }
        }
    }
}
