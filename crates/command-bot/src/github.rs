//! GitHub repository lookup.

use chrono::{DateTime, Utc};
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, instrument};

const USER_AGENT_VALUE: &str = concat!("command-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Error, Debug)]
pub enum GitHubError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("GitHub API error: {status} - {message}")]
    Api { status: u16, message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RepoLicense {
    pub name: String,
}

/// Subset of the GitHub repository resource.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoDetails {
    pub name: String,
    pub description: Option<String>,
    pub forks_count: u64,
    pub stargazers_count: u64,
    pub watchers_count: u64,
    pub open_issues_count: u64,
    pub owner: RepoOwner,
    pub license: Option<RepoLicense>,
    pub html_url: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Size in KB.
    pub size: u64,
    pub default_branch: String,
}

/// Client for one configured repository.
#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: Option<SecretString>,
}

impl GitHubClient {
    pub fn new(
        api_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GitHubError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.filter(|t| !t.is_empty()).map(SecretString::new),
        })
    }

    /// "owner/repo".
    pub fn slug(&self) -> String {
        format!("{}/{}", self.owner, self.repo)
    }

    /// Fetch repository details.
    #[instrument(skip(self), fields(repo = %self.slug()))]
    pub async fn fetch_repo(&self) -> Result<RepoDetails, GitHubError> {
        let mut request = self
            .client
            .get(format!("{}/repos/{}/{}", self.api_url, self.owner, self.repo))
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, "application/vnd.github.v3+json");

        if let Some(token) = &self.token {
            request = request.header(AUTHORIZATION, format!("Bearer {}", token.expose_secret()));
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(GitHubError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let details: RepoDetails = response.json().await?;
        debug!(stars = details.stargazers_count, "Fetched repository");
        Ok(details)
    }
}
