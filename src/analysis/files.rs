use std::path::Path;

use async_trait::async_trait;
use tracing::info;

use super::{Analysis, AnalysisRequest};
use crate::github::pulls::{fetch_pull_request_files, fetch_pull_requests, PullFilter};
use crate::github::types::PullRequestFile;
use crate::github::Transport;
use crate::report::types::{
    ExtensionBreakdown, FileChange, FileChangesReport, PrFileSummary, NO_EXTENSION,
};

/// Per-file changes across an author's pull requests, bucketed by extension.
pub struct FileChangesAnalysis {
    filter: PullFilter,
    include_patch: bool,
    limit: Option<usize>,
}

impl FileChangesAnalysis {
    /// A `limit` of zero means no limit.
    pub fn new(filter: PullFilter, include_patch: bool, limit: Option<usize>) -> Self {
        Self {
            filter,
            include_patch,
            limit: limit.filter(|&n| n > 0),
        }
    }
}

#[async_trait]
impl Analysis for FileChangesAnalysis {
    type Report = FileChangesReport;

    fn name(&self) -> &str {
        "Pull Request File Changes"
    }

    async fn run(&self, transport: &dyn Transport, request: &AnalysisRequest) -> FileChangesReport {
        info!(
            repository = %request.repo,
            author = %request.author,
            start_date = %request.start_date,
            state = %self.filter.state,
            merged_only = self.filter.merged_only,
            include_draft = self.filter.include_draft,
            include_patch = self.include_patch,
            limit = ?self.limit,
            "analyzing pull request file changes"
        );
        let mut pulls = fetch_pull_requests(
            transport,
            &request.repo,
            &request.author,
            request.since,
            &self.filter,
        )
        .await;

        if let Some(limit) = self.limit {
            pulls.truncate(limit);
            info!(count = pulls.len(), "limiting analysis to most recent PRs");
        }

        let mut breakdown = ExtensionBreakdown::default();
        let mut summaries = Vec::with_capacity(pulls.len());
        for (i, pr) in pulls.iter().enumerate() {
            info!(number = pr.number, "processing PR {}/{}", i + 1, pulls.len());
            let files =
                fetch_pull_request_files(transport, &request.repo, pr.number, self.include_patch)
                    .await;
            info!(number = pr.number, files = files.len(), "found changed files");

            for file in &files {
                breakdown.record(&extension_key(&file.filename), file.additions, file.deletions);
            }

            summaries.push(PrFileSummary {
                number: pr.number,
                title: pr.title.clone(),
                state: pr.state.clone(),
                draft: pr.draft,
                created_at: pr.created_at,
                updated_at: pr.updated_at,
                closed_at: pr.closed_at,
                merged_at: pr.merged_at,
                html_url: pr.html_url.clone(),
                total_files_changed: files.len(),
                total_additions: files.iter().map(|f| f.additions).sum(),
                total_deletions: files.iter().map(|f| f.deletions).sum(),
                files: files.into_iter().map(FileChange::from).collect(),
            });
        }

        summaries.sort_by(|a, b| b.number.cmp(&a.number));
        breakdown.sort_by_count();

        FileChangesReport {
            repository: request.repo.to_string(),
            author: request.author.clone(),
            start_date: request.start_date.clone(),
            state_filter: self.filter.state,
            merged_only: self.filter.merged_only,
            include_draft: self.filter.include_draft,
            total_prs: summaries.len(),
            total_files_changed: summaries.iter().map(|pr| pr.total_files_changed).sum(),
            total_additions: summaries.iter().map(|pr| pr.total_additions).sum(),
            total_deletions: summaries.iter().map(|pr| pr.total_deletions).sum(),
            file_extension_stats: breakdown,
            pull_requests: summaries,
        }
    }
}

/// Breakdown key for a path: `.` plus the text after the last dot of the
/// file name, or [`NO_EXTENSION`]. Dotfiles such as `.gitignore` have none.
pub fn extension_key(filename: &str) -> String {
    match Path::new(filename).extension() {
        Some(ext) => format!(".{}", ext.to_string_lossy()),
        None => NO_EXTENSION.to_string(),
    }
}

impl From<PullRequestFile> for FileChange {
    fn from(file: PullRequestFile) -> Self {
        FileChange {
            filename: file.filename,
            status: file.status,
            additions: file.additions,
            deletions: file.deletions,
            changes: file.changes,
            blob_url: file.blob_url,
            raw_url: file.raw_url,
            contents_url: file.contents_url,
            patch: file.patch,
            previous_filename: file.previous_filename,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::tests::request;
    use crate::github::testing::{file_json, json_page, merged_pull_json, pull_json, FakeTransport};
    use crate::github::StateFilter;
    use crate::report::types::ExtensionStats;

    const PULLS: &str = "/repos/octo/widgets/pulls";

    fn merged_only() -> PullFilter {
        PullFilter {
            state: StateFilter::All,
            merged_only: true,
            include_draft: false,
        }
    }

    #[test]
    fn test_extension_keys() {
        assert_eq!(extension_key("a.py"), ".py");
        assert_eq!(extension_key("src/lib.tar.gz"), ".gz");
        assert_eq!(extension_key("README"), NO_EXTENSION);
        assert_eq!(extension_key(".gitignore"), NO_EXTENSION);
        assert_eq!(extension_key("docs.v2/Makefile"), NO_EXTENSION);
    }

    #[tokio::test]
    async fn test_aggregates_by_extension() {
        let transport = FakeTransport::new()
            .respond(PULLS, 200, json_page([merged_pull_json(8, "alice", "2025-02-01T00:00:00Z")]))
            .respond(
                "/repos/octo/widgets/pulls/8/files",
                200,
                json_page([
                    file_json("README", 1, 0),
                    file_json("a.py", 10, 2),
                    file_json("b.py", 3, 1),
                ]),
            );

        let analysis = FileChangesAnalysis::new(merged_only(), false, None);
        let report = analysis.run(&transport, &request("2025-01-01")).await;

        let keys: Vec<&str> = report.file_extension_stats.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, vec![".py", NO_EXTENSION]);
        assert_eq!(
            report.file_extension_stats.get(".py"),
            Some(&ExtensionStats { count: 2, additions: 13, deletions: 3 })
        );
        assert_eq!(
            report.file_extension_stats.get(NO_EXTENSION),
            Some(&ExtensionStats { count: 1, additions: 1, deletions: 0 })
        );
        assert_eq!(report.total_files_changed, 3);
        assert_eq!(report.total_additions, 14);
        assert_eq!(report.total_deletions, 3);
        assert_eq!(report.net_change(), 11);

        let pr = &report.pull_requests[0];
        assert_eq!(pr.total_files_changed, 3);
        assert_eq!(pr.total_additions, 14);
        assert!(pr.files.iter().all(|file| file.patch.is_none()));
    }

    #[tokio::test]
    async fn test_default_filter_skips_unmerged() {
        let transport = FakeTransport::new()
            .respond(
                PULLS,
                200,
                json_page([
                    merged_pull_json(9, "alice", "2025-03-01T00:00:00Z"),
                    pull_json(8, "alice", "2025-02-01T00:00:00Z"),
                ]),
            )
            .respond(
                "/repos/octo/widgets/pulls/9/files",
                200,
                json_page([file_json("x.rs", 2, 0)]),
            );

        let report = FileChangesAnalysis::new(merged_only(), false, None)
            .run(&transport, &request("2025-01-01"))
            .await;
        assert_eq!(report.total_prs, 1);
        assert!(report.merged_only);
        assert!(!report.include_draft);
        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert!(!paths.contains(&"/repos/octo/widgets/pulls/8/files".to_string()));
    }

    #[tokio::test]
    async fn test_limit_keeps_most_recent_and_sorts_descending() {
        let transport = FakeTransport::new()
            .respond(
                PULLS,
                200,
                json_page([
                    merged_pull_json(12, "alice", "2025-03-01T00:00:00Z"),
                    merged_pull_json(45, "alice", "2025-02-01T00:00:00Z"),
                    merged_pull_json(3, "alice", "2025-01-15T00:00:00Z"),
                ]),
            )
            .respond("/repos/octo/widgets/pulls/12/files", 200, json_page([]))
            .respond("/repos/octo/widgets/pulls/45/files", 200, json_page([]));

        let report = FileChangesAnalysis::new(merged_only(), false, Some(2))
            .run(&transport, &request("2025-01-01"))
            .await;
        let numbers: Vec<u64> = report.pull_requests.iter().map(|pr| pr.number).collect();
        assert_eq!(numbers, vec![45, 12]);
    }

    #[test]
    fn test_zero_limit_means_unlimited() {
        let analysis = FileChangesAnalysis::new(merged_only(), false, Some(0));
        assert_eq!(analysis.limit, None);
    }

    #[tokio::test]
    async fn test_failed_file_listing_counts_as_empty() {
        let transport = FakeTransport::new()
            .respond(PULLS, 200, json_page([merged_pull_json(5, "alice", "2025-02-01T00:00:00Z")]))
            .respond("/repos/octo/widgets/pulls/5/files", 500, "oops".to_string());

        let report = FileChangesAnalysis::new(merged_only(), false, None)
            .run(&transport, &request("2025-01-01"))
            .await;
        assert_eq!(report.total_prs, 1);
        assert_eq!(report.total_files_changed, 0);
        assert!(report.file_extension_stats.is_empty());
    }

    #[tokio::test]
    async fn test_not_found_gives_zero_totals() {
        let transport = FakeTransport::new().respond(PULLS, 404, "{}".to_string());
        let report = FileChangesAnalysis::new(merged_only(), true, None)
            .run(&transport, &request("2025-01-01"))
            .await;
        assert_eq!(report.total_prs, 0);
        assert_eq!(report.total_files_changed, 0);
        assert_eq!(report.total_additions, 0);
        assert_eq!(report.total_deletions, 0);
        assert!(report.pull_requests.is_empty());
    }
}
