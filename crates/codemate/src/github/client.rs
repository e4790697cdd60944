use base64::Engine;
use codemate_core::files::GeneratedFile;
use codemate_core::github::{
    CreateCommitRequest, CreateFileRequest, CreateRepositoryRequest, CreateTreeRequest,
    GitHubCommitResponse, GitHubCommitSummary, GitHubErrorResponse, GitHubRefResponse,
    GitHubRepositoryResponse, GitHubTreeResponse, GitHubUser, RemoteRepository, TreeEntry,
    UpdateRefRequest,
};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

use super::RepositoryHost;
use crate::config::GitHubConfig;
use crate::prelude::Error;

/// Create an HTTP client with the GitHub token and API headers
pub fn create_github_client(config: &GitHubConfig) -> Result<reqwest::Client, Error> {
    use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", config.token.trim()))
            .map_err(|e| Error::Auth(format!("Invalid token: {e}")))?,
    );
    headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
    headers.insert(USER_AGENT, HeaderValue::from_static("codemate"));
    headers.insert("x-github-api-version", HeaderValue::from_static("2022-11-28"));

    reqwest::Client::builder()
        .default_headers(headers)
        .build()
        .map_err(|e| Error::Remote(format!("Failed to build HTTP client: {e}")))
}

/// [`RepositoryHost`] backed by the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
}

impl GitHubClient {
    pub fn new(config: &GitHubConfig) -> Result<Self, Error> {
        Ok(Self {
            client: create_github_client(config)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn repo_url(&self, repository: &RemoteRepository, rest: &str) -> String {
        format!(
            "{}/repos/{}/{}/{}",
            self.base_url,
            urlencoding::encode(&repository.owner),
            urlencoding::encode(&repository.name),
            rest
        )
    }

    /// Profile of the account the token belongs to.
    pub async fn user(&self) -> Result<GitHubUser, Error> {
        let url = format!("{}/user", self.base_url);
        self.get_json(&url, "resolve user").await
    }

    async fn execute(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<Response, Error> {
        request.send().await.map_err(|e| {
            Error::Remote(format!("Failed to send request to GitHub ({context}): {e}"))
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, context: &str) -> Result<T, Error> {
        let response = self.execute(self.client.get(url), context).await?;
        parse_json(check_status(response, context).await?, context).await
    }

    async fn send_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        method: reqwest::Method,
        url: &str,
        body: &B,
        context: &str,
    ) -> Result<T, Error> {
        let response = self
            .execute(self.client.request(method, url).json(body), context)
            .await?;
        parse_json(check_status(response, context).await?, context).await
    }
}

/// Map an unsuccessful response onto the error taxonomy.
async fn check_status(response: Response, context: &str) -> Result<Response, Error> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response_text(response).await;
    Err(status_error(status, &body, context))
}

/// Body of an error response, or why it could not be read.
async fn response_text(response: Response) -> String {
    response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {e}>"))
}

fn status_error(status: StatusCode, body: &str, context: &str) -> Error {
    let message = serde_json::from_str::<GitHubErrorResponse>(body)
        .map(|e| e.message)
        .unwrap_or_else(|_| body.to_string());
    let detail = format!("{context} [{status}]: {message}");

    match status {
        StatusCode::UNAUTHORIZED => Error::Auth(detail),
        StatusCode::NOT_FOUND => Error::RemoteNotFound(detail),
        _ => Error::Remote(detail),
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response, context: &str) -> Result<T, Error> {
    response
        .json()
        .await
        .map_err(|e| Error::Remote(format!("Failed to parse GitHub response ({context}): {e}")))
}

fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

impl RepositoryHost for GitHubClient {
    async fn authenticated_user(&self) -> Result<String, Error> {
        Ok(self.user().await?.login)
    }

    async fn get_repository(&self, owner: &str, name: &str) -> Result<RemoteRepository, Error> {
        let url = format!(
            "{}/repos/{}/{}",
            self.base_url,
            urlencoding::encode(owner),
            urlencoding::encode(name)
        );
        let repository: GitHubRepositoryResponse =
            self.get_json(&url, "look up repository").await?;
        Ok(repository.into())
    }

    async fn create_repository(&self, name: &str) -> Result<RemoteRepository, Error> {
        let url = format!("{}/user/repos", self.base_url);
        let body = CreateRepositoryRequest {
            name: name.to_string(),
            private: false,
        };
        let repository: GitHubRepositoryResponse = self
            .send_json(reqwest::Method::POST, &url, &body, "create repository")
            .await?;
        Ok(repository.into())
    }

    async fn has_commits(&self, repository: &RemoteRepository) -> Result<bool, Error> {
        let url = self.repo_url(repository, "commits?per_page=1");
        let response = self.execute(self.client.get(&url), "list commits").await?;

        // GitHub answers 409 "Git Repository is empty." for repositories without commits.
        if response.status() == StatusCode::CONFLICT {
            return Ok(false);
        }

        let commits: Vec<GitHubCommitSummary> =
            parse_json(check_status(response, "list commits").await?, "list commits").await?;
        Ok(!commits.is_empty())
    }

    async fn create_file(
        &self,
        repository: &RemoteRepository,
        branch: &str,
        file: &GeneratedFile,
        message: &str,
    ) -> Result<(), Error> {
        let url = self.repo_url(repository, &format!("contents/{}", encode_path(&file.path)));
        let body = CreateFileRequest {
            message: message.to_string(),
            content: base64::engine::general_purpose::STANDARD.encode(&file.content),
            branch: branch.to_string(),
        };
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PUT, &url, &body, "create file")
            .await?;
        Ok(())
    }

    async fn branch_tip(
        &self,
        repository: &RemoteRepository,
        branch: &str,
    ) -> Result<String, Error> {
        let url = self.repo_url(repository, &format!("git/ref/heads/{}", encode_path(branch)));
        let response = self.execute(self.client.get(&url), "resolve branch").await?;

        // A freshly created branch may not be visible yet.
        let status = response.status();
        if matches!(status, StatusCode::NOT_FOUND | StatusCode::CONFLICT) {
            let body = response_text(response).await;
            return Err(Error::RemoteTransient(format!(
                "resolve branch '{branch}' [{status}]: {body}"
            )));
        }

        let reference: GitHubRefResponse =
            parse_json(check_status(response, "resolve branch").await?, "resolve branch").await?;
        Ok(reference.object.sha)
    }

    async fn commit_tree(
        &self,
        repository: &RemoteRepository,
        commit_sha: &str,
    ) -> Result<String, Error> {
        let url = self.repo_url(repository, &format!("git/commits/{commit_sha}"));
        let commit: GitHubCommitResponse = self.get_json(&url, "read commit").await?;
        Ok(commit.tree.sha)
    }

    async fn create_tree(
        &self,
        repository: &RemoteRepository,
        base_tree: &str,
        entries: &[TreeEntry],
    ) -> Result<String, Error> {
        let url = self.repo_url(repository, "git/trees");
        let body = CreateTreeRequest {
            base_tree: base_tree.to_string(),
            tree: entries.to_vec(),
        };
        let tree: GitHubTreeResponse = self
            .send_json(reqwest::Method::POST, &url, &body, "create tree")
            .await?;
        Ok(tree.sha)
    }

    async fn create_commit(
        &self,
        repository: &RemoteRepository,
        message: &str,
        tree_sha: &str,
        parent_sha: &str,
    ) -> Result<String, Error> {
        let url = self.repo_url(repository, "git/commits");
        let body = CreateCommitRequest {
            message: message.to_string(),
            tree: tree_sha.to_string(),
            parents: vec![parent_sha.to_string()],
        };
        let commit: GitHubCommitResponse = self
            .send_json(reqwest::Method::POST, &url, &body, "create commit")
            .await?;
        Ok(commit.sha)
    }

    async fn update_branch(
        &self,
        repository: &RemoteRepository,
        branch: &str,
        commit_sha: &str,
    ) -> Result<(), Error> {
        let url = self.repo_url(repository, &format!("git/refs/heads/{}", encode_path(branch)));
        let body = UpdateRefRequest {
            sha: commit_sha.to_string(),
            force: false,
        };
        let _: serde_json::Value = self
            .send_json(reqwest::Method::PATCH, &url, &body, "update branch")
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GitHubClient {
        GitHubClient::new(&GitHubConfig::new(server.uri(), "ghp_test")).unwrap()
    }

    fn repository() -> RemoteRepository {
        RemoteRepository {
            owner: "alice".to_string(),
            name: "codemate-demo".to_string(),
            default_branch: "main".to_string(),
            clone_url: "https://github.com/alice/codemate-demo.git".to_string(),
            html_url: "https://github.com/alice/codemate-demo".to_string(),
        }
    }

    #[tokio::test]
    async fn test_authenticated_user() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .and(header("authorization", "Bearer ghp_test"))
            .and(header("user-agent", "codemate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "login": "alice",
                "id": 1
            })))
            .expect(1)
            .mount(&server)
            .await;

        let login = client_for(&server).authenticated_user().await.unwrap();
        assert_eq!(login, "alice");
    }

    #[tokio::test]
    async fn test_bad_credentials_map_to_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/user"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "message": "Bad credentials"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).authenticated_user().await.unwrap_err();
        assert!(matches!(err, Error::Auth(ref detail) if detail.contains("Bad credentials")));
    }

    #[tokio::test]
    async fn test_missing_repository_maps_to_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Not Found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_repository("alice", "codemate-demo")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RemoteNotFound(_)));
    }

    #[tokio::test]
    async fn test_other_failures_map_to_remote_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .respond_with(ResponseTemplate::new(422).set_body_json(serde_json::json!({
                "message": "Repository creation failed."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .create_repository("codemate-demo")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(ref detail) if detail.contains("Repository creation failed.")));
    }

    #[tokio::test]
    async fn test_create_repository_is_public() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/user/repos"))
            .and(body_json(serde_json::json!({"name": "codemate-demo", "private": false})))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "name": "codemate-demo",
                "owner": {"login": "alice"},
                "html_url": "https://github.com/alice/codemate-demo",
                "clone_url": "https://github.com/alice/codemate-demo.git",
                "default_branch": "main"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let created = client_for(&server)
            .create_repository("codemate-demo")
            .await
            .unwrap();
        assert_eq!(created, repository());
    }

    #[tokio::test]
    async fn test_empty_repository_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/commits"))
            .and(query_param("per_page", "1"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "Git Repository is empty."
            })))
            .mount(&server)
            .await;

        assert!(!client_for(&server).has_commits(&repository()).await.unwrap());
    }

    #[tokio::test]
    async fn test_non_empty_repository_probe() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/commits"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{"sha": "abc"}])),
            )
            .mount(&server)
            .await;

        assert!(client_for(&server).has_commits(&repository()).await.unwrap());
    }

    #[tokio::test]
    async fn test_create_file_sends_base64_content() {
        let server = MockServer::start().await;
        Mock::given(method("PUT"))
            .and(path("/repos/alice/codemate-demo/contents/.github/workflows/main.yml"))
            .and(body_json(serde_json::json!({
                "message": "seed",
                "content": "bmFtZTogQ0k=",
                "branch": "main"
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "content": {"path": ".github/workflows/main.yml"},
                "commit": {"sha": "c1"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let file = GeneratedFile {
            path: ".github/workflows/main.yml".to_string(),
            content: "name: CI".to_string(),
        };
        client_for(&server)
            .create_file(&repository(), "main", &file, "seed")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_branch_tip_not_found_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
                "message": "Branch not found"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .branch_tip(&repository(), "main")
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_branch_tip_conflict_is_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
                "message": "Git Repository is empty."
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .branch_tip(&repository(), "main")
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_branch_tip_server_error_is_not_transient() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .branch_tip(&repository(), "main")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Remote(_)));
    }

    #[tokio::test]
    async fn test_git_data_round() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/git/ref/heads/main"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ref": "refs/heads/main",
                "object": {"sha": "c1", "type": "commit"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/alice/codemate-demo/git/commits/c1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "sha": "c1",
                "tree": {"sha": "t1"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/alice/codemate-demo/git/trees"))
            .and(body_json(serde_json::json!({
                "base_tree": "t1",
                "tree": [{"path": "requirements.txt", "mode": "100644", "type": "blob", "content": "flask"}]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({"sha": "t2"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/repos/alice/codemate-demo/git/commits"))
            .and(body_json(serde_json::json!({
                "message": "bulk",
                "tree": "t2",
                "parents": ["c1"]
            })))
            .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
                "sha": "c2",
                "tree": {"sha": "t2"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("PATCH"))
            .and(path("/repos/alice/codemate-demo/git/refs/heads/main"))
            .and(body_json(serde_json::json!({"sha": "c2", "force": false})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ref": "refs/heads/main",
                "object": {"sha": "c2"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server);
        let repo = repository();
        let tip = client.branch_tip(&repo, "main").await.unwrap();
        let base_tree = client.commit_tree(&repo, &tip).await.unwrap();
        let entries = vec![TreeEntry {
            path: "requirements.txt".to_string(),
            mode: "100644".to_string(),
            kind: "blob".to_string(),
            content: "flask".to_string(),
        }];
        let tree = client.create_tree(&repo, &base_tree, &entries).await.unwrap();
        let commit = client.create_commit(&repo, "bulk", &tree, &tip).await.unwrap();
        client.update_branch(&repo, "main", &commit).await.unwrap();

        assert_eq!(commit, "c2");
    }

    #[tokio::test]
    async fn test_unreadable_error_body_is_reported() {
        let base_url = crate::test_support::truncated_body_server("502 Bad Gateway").await;
        let client = GitHubClient::new(&GitHubConfig::new(base_url, "ghp_test")).unwrap();

        let err = client.authenticated_user().await.unwrap_err();

        assert!(matches!(err, Error::Remote(ref detail) if detail.contains("<unreadable body:")));
    }

    #[test]
    fn test_encode_path_keeps_separators() {
        assert_eq!(encode_path(".github/workflows/main.yml"), ".github/workflows/main.yml");
        assert_eq!(encode_path("docs/my file.md"), "docs/my%20file.md");
    }
}
