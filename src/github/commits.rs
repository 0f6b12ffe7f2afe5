use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{info, instrument, warn};

use super::pagination::{paginate, Flow};
use super::types::{Commit, CommitDetail, CommitStats};
use super::{log_list_failure, RepoRef, Transport};

/// Fetch commits by `author` since `since`.
///
/// Author and date filtering happen server side. A failed page is logged and
/// the commits collected before it are returned.
#[instrument(skip(transport, since), fields(repository = %repo))]
pub async fn fetch_commits(
    transport: &dyn Transport,
    repo: &RepoRef,
    author: &str,
    since: DateTime<Utc>,
) -> Vec<Commit> {
    let path = repo.api_path("commits");
    let since = since.to_rfc3339_opts(SecondsFormat::Secs, true);
    let query = [("author", author.to_string()), ("since", since.clone())];

    let mut commits = Vec::new();
    let mut page = 0u32;
    let result = paginate(transport, &path, &query, |items: Vec<Commit>| {
        page += 1;
        info!(page, "fetched commits page");
        commits.extend(items);
        Flow::Continue
    })
    .await;

    if let Err(err) = result {
        log_list_failure(&err, repo, transport.is_authenticated());
    }

    info!(count = commits.len(), author, %since, "found commits");
    commits
}

/// Additions and deletions of one commit; `(0, 0)` when unavailable.
#[instrument(skip(transport), fields(repository = %repo))]
pub async fn fetch_commit_stats(
    transport: &dyn Transport,
    repo: &RepoRef,
    sha: &str,
) -> CommitStats {
    let path = repo.api_path(&format!("commits/{sha}"));
    let detail = async {
        let body = transport.get(&path, &[]).await?.into_body()?;
        Ok::<_, super::GitHubError>(serde_json::from_str::<CommitDetail>(&body)?)
    }
    .await;

    match detail {
        Ok(detail) => detail.stats,
        Err(err) => {
            warn!(sha, error = %err, "could not fetch stats for commit");
            CommitStats::default()
        }
    }
}
