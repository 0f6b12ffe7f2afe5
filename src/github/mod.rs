pub mod commits;
pub mod pagination;
pub mod pulls;
pub mod types;

#[cfg(test)]
pub mod testing;

pub use types::{RepoRef, StateFilter};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use thiserror::Error;
use tracing::{debug, error};

pub const DEFAULT_API_URL: &str = "https://api.github.com";
const USER_AGENT: &str = concat!("gh-activity/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum GitHubError {
    #[error("GitHub API request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Resource not found or not accessible")]
    NotFound,

    #[error("API rate limit exceeded or access forbidden")]
    Forbidden,

    #[error("Unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode GitHub response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("GitHub token contains characters that are not valid in a header")]
    InvalidToken,
}

/// Raw status and body of a single GET request.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Hand back the body of a 200 response, classifying anything else.
    pub fn into_body(self) -> Result<String, GitHubError> {
        match self.status {
            200 => Ok(self.body),
            404 => Err(GitHubError::NotFound),
            403 => Err(GitHubError::Forbidden),
            status => Err(GitHubError::Status {
                status,
                body: self.body,
            }),
        }
    }
}

/// Issues GET requests against the REST API.
///
/// Non-success statuses are returned as data, not errors; only a failure to
/// talk to the server at all is an `Err`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, GitHubError>;

    /// Whether requests carry a credential.
    fn is_authenticated(&self) -> bool;
}

/// HTTP session shared by every request of a run.
pub struct GitHubClient {
    client: reqwest::Client,
    base_url: String,
    authenticated: bool,
}

impl GitHubClient {
    pub fn new(base_url: &str, token: Option<&str>) -> Result<Self, GitHubError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github.v3+json"),
        );
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|_| GitHubError::InvalidToken)?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            authenticated: token.is_some(),
        })
    }
}

#[async_trait]
impl Transport for GitHubClient {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, GitHubError> {
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, ?query, "GET");
        let response = self.client.get(&url).query(query).send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(ApiResponse { status, body })
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Log why a list fetch produced no (or only partial) results.
pub(crate) fn log_list_failure(err: &GitHubError, repo: &RepoRef, authenticated: bool) {
    match err {
        GitHubError::NotFound => {
            error!(repository = %repo, "repository not found or not accessible");
        }
        GitHubError::Forbidden if !authenticated => {
            error!(
                "API rate limit exceeded or access forbidden; try a GitHub personal access token \
                 with --token or GITHUB_TOKEN (get one at https://github.com/settings/tokens)"
            );
        }
        GitHubError::Forbidden => error!("API rate limit exceeded or access forbidden"),
        GitHubError::Status { status, body } => {
            error!(status = *status, body = %body, "unexpected response from GitHub");
        }
        other => error!(error = %other, "list request failed"),
    }
}
