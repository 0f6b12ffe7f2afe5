use chrono::{DateTime, Utc};
use tracing::{debug, info, instrument, warn};

use super::pagination::{paginate, Flow};
use super::types::{PullRequest, PullRequestFile};
use super::{log_list_failure, RepoRef, StateFilter, Transport};

/// Which pull requests survive the author/date scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullFilter {
    pub state: StateFilter,
    /// Keep only pull requests with a merge timestamp.
    pub merged_only: bool,
    pub include_draft: bool,
}

impl PullFilter {
    /// No merge or draft filtering.
    pub fn any(state: StateFilter) -> Self {
        Self {
            state,
            merged_only: false,
            include_draft: true,
        }
    }

    fn keeps(&self, pr: &PullRequest) -> bool {
        if self.merged_only && !pr.is_merged() {
            return false;
        }
        self.include_draft || !pr.draft
    }

    /// Short description such as "merged non-draft", or "all".
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if self.merged_only {
            parts.push("merged");
        }
        if !self.include_draft {
            parts.push("non-draft");
        }
        if parts.is_empty() {
            "all".to_string()
        } else {
            parts.join(" ")
        }
    }
}

/// Fetch pull requests opened by `author` at or after `since`.
///
/// Pages are requested newest first. The scan ends at the first pull request
/// of ANY author created before `since`: everything after it in the listing
/// is assumed older. Matching entries seen earlier on that page are kept.
///
/// Any failed page is logged and yields an empty list.
#[instrument(skip(transport, since, filter), fields(repository = %repo))]
pub async fn fetch_pull_requests(
    transport: &dyn Transport,
    repo: &RepoRef,
    author: &str,
    since: DateTime<Utc>,
    filter: &PullFilter,
) -> Vec<PullRequest> {
    let path = repo.api_path("pulls");
    let query = [
        ("state", filter.state.as_str().to_string()),
        ("sort", "created".to_string()),
        ("direction", "desc".to_string()),
    ];

    let mut pulls = Vec::new();
    let mut page = 0u32;
    let result = paginate(transport, &path, &query, |items: Vec<PullRequest>| {
        page += 1;
        info!(page, "scanning PRs page");
        for pr in items {
            if pr.created_at < since {
                debug!(
                    number = pr.number,
                    created_at = %pr.created_at,
                    "reached PR older than start date"
                );
                return Flow::Stop;
            }
            if pr.is_authored_by(author) && filter.keeps(&pr) {
                pulls.push(pr);
            }
        }
        Flow::Continue
    })
    .await;

    if let Err(err) = result {
        log_list_failure(&err, repo, transport.is_authenticated());
        return Vec::new();
    }

    info!(
        count = pulls.len(),
        filter = %filter.describe(),
        author,
        since = %since.to_rfc3339(),
        "found PRs"
    );
    pulls
}

/// Fetch every file touched by pull request `number`.
///
/// Patch text is dropped unless `include_patch` is set, and the previous
/// filename is kept only for renames. A failed page is logged and yields an
/// empty list.
#[instrument(skip(transport), fields(repository = %repo))]
pub async fn fetch_pull_request_files(
    transport: &dyn Transport,
    repo: &RepoRef,
    number: u64,
    include_patch: bool,
) -> Vec<PullRequestFile> {
    let path = repo.api_path(&format!("pulls/{number}/files"));
    let mut files = Vec::new();
    let result = paginate(transport, &path, &[], |items: Vec<PullRequestFile>| {
        files.extend(items.into_iter().map(|mut file| {
            if !include_patch {
                file.patch = None;
            }
            if file.status != "renamed" {
                file.previous_filename = None;
            }
            file
        }));
        Flow::Continue
    })
    .await;

    match result {
        Ok(()) => files,
        Err(err) => {
            warn!(number, error = %err, "could not fetch files for PR");
            Vec::new()
        }
    }
}
