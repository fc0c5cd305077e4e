//! Minimal typed client for the GitHub REST v3 API
//!
//! Covers exactly the endpoints the audits need. Authentication is a bearer
//! token applied as a default header; the API base URL can be overridden
//! for tests or GitHub Enterprise installations.

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::types::{
    ActionsWorkflow, ActionsWorkflowList, BranchProtection, DirectoryEntry, Hook, HookRequest,
    Label, LabelRequest, ProtectionRequest, Repository, RepositoryPatch,
};

pub const DEFAULT_API_URL: &str = "https://api.github.com";

const PER_PAGE: usize = 100;

#[derive(Debug, thiserror::Error)]
pub enum GithubError {
    #[error("GitHub API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("GitHub API returned {status} for {method} {path}: {message}")]
    Status {
        status: u16,
        method: &'static str,
        path: String,
        message: String,
    },

    #[error("invalid GitHub token: {0}")]
    InvalidToken(String),
}

#[derive(Debug, Clone)]
pub struct GithubClient {
    http: reqwest::Client,
    base_url: String,
}

impl GithubClient {
    pub fn new(token: &str) -> Result<Self, GithubError> {
        Self::with_base_url(token, DEFAULT_API_URL)
    }

    pub fn with_base_url(token: &str, base_url: &str) -> Result<Self, GithubError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|error| GithubError::InvalidToken(error.to_string()))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));
        headers.insert(USER_AGENT, HeaderValue::from_static("repo-keeper"));
        let http = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub async fn repository(&self, org: &str, repo: &str) -> Result<Repository, GithubError> {
        self.get_json(&format!("/repos/{org}/{repo}")).await
    }

    pub async fn edit_repository(
        &self,
        org: &str,
        repo: &str,
        patch: &RepositoryPatch,
    ) -> Result<Repository, GithubError> {
        let path = format!("/repos/{org}/{repo}");
        let response = self.http.patch(self.url(&path)).json(patch).send().await?;
        Self::decode("PATCH", &path, response).await
    }

    /// `Ok(None)` when the branch has no protection rule at all.
    pub async fn branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
    ) -> Result<Option<BranchProtection>, GithubError> {
        let path = format!("/repos/{org}/{repo}/branches/{branch}/protection");
        let response = self.http.get(self.url(&path)).send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        Self::decode("GET", &path, response).await.map(Some)
    }

    pub async fn update_branch_protection(
        &self,
        org: &str,
        repo: &str,
        branch: &str,
        request: &ProtectionRequest,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/branches/{branch}/protection");
        let response = self.http.put(self.url(&path)).json(request).send().await?;
        Self::expect_success("PUT", &path, response).await
    }

    pub async fn labels(&self, org: &str, repo: &str) -> Result<Vec<Label>, GithubError> {
        self.get_json(&format!("/repos/{org}/{repo}/labels?per_page={PER_PAGE}"))
            .await
    }

    pub async fn create_label(
        &self,
        org: &str,
        repo: &str,
        label: &LabelRequest,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/labels");
        let response = self.http.post(self.url(&path)).json(label).send().await?;
        Self::expect_success("POST", &path, response).await
    }

    pub async fn update_label(
        &self,
        org: &str,
        repo: &str,
        old_name: &str,
        label: &LabelRequest,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/labels/{old_name}");
        let response = self.http.patch(self.url(&path)).json(label).send().await?;
        Self::expect_success("PATCH", &path, response).await
    }

    pub async fn delete_label(&self, org: &str, repo: &str, name: &str) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/labels/{name}");
        let response = self.http.delete(self.url(&path)).send().await?;
        Self::expect_success("DELETE", &path, response).await
    }

    pub async fn hooks(&self, org: &str, repo: &str) -> Result<Vec<Hook>, GithubError> {
        self.get_json(&format!("/repos/{org}/{repo}/hooks?per_page={PER_PAGE}"))
            .await
    }

    pub async fn create_hook(
        &self,
        org: &str,
        repo: &str,
        hook: &HookRequest,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/hooks");
        let response = self.http.post(self.url(&path)).json(hook).send().await?;
        Self::expect_success("POST", &path, response).await
    }

    pub async fn edit_hook(
        &self,
        org: &str,
        repo: &str,
        id: u64,
        hook: &HookRequest,
    ) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/hooks/{id}");
        let response = self.http.patch(self.url(&path)).json(hook).send().await?;
        Self::expect_success("PATCH", &path, response).await
    }

    pub async fn list_directory(
        &self,
        org: &str,
        repo: &str,
        dir: &str,
    ) -> Result<Vec<DirectoryEntry>, GithubError> {
        self.get_json(&format!("/repos/{org}/{repo}/contents/{dir}"))
            .await
    }

    /// Download one file as raw text via the `raw` media type.
    pub async fn file_content(
        &self,
        org: &str,
        repo: &str,
        file: &str,
    ) -> Result<String, GithubError> {
        let path = format!("/repos/{org}/{repo}/contents/{file}");
        let response = self
            .http
            .get(self.url(&path))
            .header(ACCEPT, "application/vnd.github.raw")
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error("GET", &path, status, response).await);
        }
        Ok(response.text().await?)
    }

    pub async fn actions_workflows(
        &self,
        org: &str,
        repo: &str,
    ) -> Result<Vec<ActionsWorkflow>, GithubError> {
        let list: ActionsWorkflowList = self
            .get_json(&format!(
                "/repos/{org}/{repo}/actions/workflows?per_page={PER_PAGE}"
            ))
            .await?;
        Ok(list.workflows)
    }

    pub async fn enable_workflow(&self, org: &str, repo: &str, id: u64) -> Result<(), GithubError> {
        let path = format!("/repos/{org}/{repo}/actions/workflows/{id}/enable");
        let response = self.http.put(self.url(&path)).send().await?;
        Self::expect_success("PUT", &path, response).await
    }

    pub async fn org_repositories(&self, org: &str) -> Result<Vec<Repository>, GithubError> {
        let mut repositories = Vec::new();
        let mut page = 1;
        loop {
            let batch: Vec<Repository> = self
                .get_json(&format!(
                    "/orgs/{org}/repos?per_page={PER_PAGE}&page={page}"
                ))
                .await?;
            let last_page = batch.len() < PER_PAGE;
            repositories.extend(batch);
            if last_page {
                return Ok(repositories);
            }
            page += 1;
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GithubError> {
        debug!(path, "GET");
        let response = self.http.get(self.url(path)).send().await?;
        Self::decode("GET", path, response).await
    }

    async fn decode<T: DeserializeOwned>(
        method: &'static str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<T, GithubError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(method, path, status, response).await);
        }
        Ok(response.json().await?)
    }

    async fn expect_success(
        method: &'static str,
        path: &str,
        response: reqwest::Response,
    ) -> Result<(), GithubError> {
        let status = response.status();
        if !status.is_success() {
            return Err(Self::status_error(method, path, status, response).await);
        }
        Ok(())
    }

    async fn status_error(
        method: &'static str,
        path: &str,
        status: reqwest::StatusCode,
        response: reqwest::Response,
    ) -> GithubError {
        let message = response.text().await.unwrap_or_default();
        GithubError::Status {
            status: status.as_u16(),
            method,
            path: path.to_string(),
            message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = GithubClient::with_base_url("token", "http://localhost:8080/").unwrap();
        assert_eq!(client.url("/repos/org/repo"), "http://localhost:8080/repos/org/repo");
    }

    #[test]
    fn test_control_characters_in_token_are_rejected() {
        assert!(matches!(
            GithubClient::new("bad\ntoken"),
            Err(GithubError::InvalidToken(_))
        ));
    }
}
