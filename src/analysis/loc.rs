use async_trait::async_trait;
use tracing::info;

use super::{Analysis, AnalysisRequest};
use crate::github::commits::{fetch_commit_stats, fetch_commits};
use crate::github::Transport;
use crate::report::types::{CommitSummary, LocReport};

/// Lines added and deleted by an author's commits.
#[derive(Debug, Default)]
pub struct LocAnalysis;

impl LocAnalysis {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Analysis for LocAnalysis {
    type Report = LocReport;

    fn name(&self) -> &str {
        "Lines of Code"
    }

    async fn run(&self, transport: &dyn Transport, request: &AnalysisRequest) -> LocReport {
        info!(
            repository = %request.repo,
            author = %request.author,
            start_date = %request.start_date,
            "analyzing lines of code"
        );
        let commits = fetch_commits(transport, &request.repo, &request.author, request.since).await;

        let mut summaries = Vec::with_capacity(commits.len());
        for (i, commit) in commits.iter().enumerate() {
            let short_sha: String = commit.sha.chars().take(8).collect();
            info!("processing commit {}/{}: {}", i + 1, commits.len(), short_sha);
            let stats = fetch_commit_stats(transport, &request.repo, &commit.sha).await;
            summaries.push(CommitSummary {
                sha: commit.sha.clone(),
                message: commit.subject().to_string(),
                date: commit.authored_at(),
                additions: stats.additions,
                deletions: stats.deletions,
                total_changes: stats.additions + stats.deletions,
            });
        }

        // Newest first; commits have no numeric id to order by.
        summaries.sort_by(|a, b| b.date.cmp(&a.date));

        let total_additions = summaries.iter().map(|c| c.additions).sum::<u64>();
        let total_deletions = summaries.iter().map(|c| c.deletions).sum::<u64>();

        LocReport {
            repository: request.repo.to_string(),
            author: request.author.clone(),
            start_date: request.start_date.clone(),
            total_commits: summaries.len(),
            total_additions,
            total_deletions,
            total_changes: total_additions + total_deletions,
            commits: summaries,
        }
    }
}
