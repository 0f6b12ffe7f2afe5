//! Scripted in-memory transport for exercising the fetch pipeline.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use super::{ApiResponse, GitHubError, Transport};

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub path: String,
    pub query: Vec<(String, String)>,
}

impl RecordedRequest {
    pub fn param(&self, name: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Answers each path from its own queue of responses, in order.
///
/// A path with no queued response left answers 404.
#[derive(Default)]
pub struct FakeTransport {
    responses: Mutex<HashMap<String, VecDeque<ApiResponse>>>,
    requests: Mutex<Vec<RecordedRequest>>,
    authenticated: bool,
}

impl FakeTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn authenticated(mut self) -> Self {
        self.authenticated = true;
        self
    }

    pub fn respond(self, path: &str, status: u16, body: String) -> Self {
        self.responses
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .push_back(ApiResponse { status, body });
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Page numbers requested for `path`, in request order.
    pub fn pages_requested(&self, path: &str) -> Vec<u32> {
        self.requests()
            .iter()
            .filter(|request| request.path == path)
            .filter_map(|request| request.param("page").and_then(|page| page.parse().ok()))
            .collect()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, GitHubError> {
        self.requests.lock().unwrap().push(RecordedRequest {
            path: path.to_string(),
            query: query
                .iter()
                .map(|(key, value)| (key.to_string(), value.clone()))
                .collect(),
        });
        let response = self
            .responses
            .lock()
            .unwrap()
            .get_mut(path)
            .and_then(VecDeque::pop_front)
            .unwrap_or(ApiResponse {
                status: 404,
                body: "{\"message\":\"Not Found\"}".to_string(),
            });
        Ok(response)
    }

    fn is_authenticated(&self) -> bool {
        self.authenticated
    }
}

/// Serialise an iterator of JSON values into a page body.
pub fn json_page(items: impl IntoIterator<Item = serde_json::Value>) -> String {
    serde_json::Value::Array(items.into_iter().collect()).to_string()
}

/// A pull request list entry with the fields the pipeline reads.
pub fn pull_json(number: u64, login: &str, created_at: &str) -> serde_json::Value {
    serde_json::json!({
        "number": number,
        "title": format!("Change number {number}"),
        "state": "open",
        "draft": false,
        "user": { "login": login },
        "created_at": created_at,
        "updated_at": created_at,
        "closed_at": null,
        "merged_at": null,
        "html_url": format!("https://github.com/octo/widgets/pull/{number}"),
        "labels": [],
        "base": { "ref": "main" },
        "head": { "ref": format!("topic-{number}") }
    })
}

/// Same as [`pull_json`] but closed and merged at `created_at`.
pub fn merged_pull_json(number: u64, login: &str, created_at: &str) -> serde_json::Value {
    let mut pull = pull_json(number, login, created_at);
    pull["state"] = serde_json::json!("closed");
    pull["closed_at"] = serde_json::json!(created_at);
    pull["merged_at"] = serde_json::json!(created_at);
    pull
}

pub fn file_json(filename: &str, additions: u64, deletions: u64) -> serde_json::Value {
    serde_json::json!({
        "filename": filename,
        "status": "modified",
        "additions": additions,
        "deletions": deletions,
        "changes": additions + deletions,
        "blob_url": format!("https://github.com/octo/widgets/blob/abc/{filename}"),
        "raw_url": format!("https://github.com/octo/widgets/raw/abc/{filename}"),
        "contents_url": null,
        "patch": "@@ -1 +1 @@\n-old\n+new"
    })
}

pub fn commit_json(sha: &str, message: &str, date: &str) -> serde_json::Value {
    serde_json::json!({
        "sha": sha,
        "commit": {
            "message": message,
            "author": { "name": "Alice", "email": "alice@example.com", "date": date }
        }
    })
}

pub fn commit_detail_json(additions: u64, deletions: u64) -> String {
    serde_json::json!({
        "stats": { "additions": additions, "deletions": deletions, "total": additions + deletions }
    })
    .to_string()
}
