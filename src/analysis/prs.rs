use async_trait::async_trait;
use tracing::{debug, info};

use super::{Analysis, AnalysisRequest};
use crate::github::pulls::{fetch_pull_requests, PullFilter};
use crate::github::types::PullRequest;
use crate::github::{StateFilter, Transport};
use crate::report::types::{PrReport, PrSummary};

/// State counts over an author's pull requests.
///
/// Uses the list payload only; no per-PR requests are made.
pub struct PrAnalysis {
    state: StateFilter,
}

impl PrAnalysis {
    pub fn new(state: StateFilter) -> Self {
        Self { state }
    }
}

#[async_trait]
impl Analysis for PrAnalysis {
    type Report = PrReport;

    fn name(&self) -> &str {
        "Pull Requests"
    }

    async fn run(&self, transport: &dyn Transport, request: &AnalysisRequest) -> PrReport {
        info!(
            repository = %request.repo,
            author = %request.author,
            start_date = %request.start_date,
            state = %self.state,
            "analyzing pull requests"
        );
        let pulls = fetch_pull_requests(
            transport,
            &request.repo,
            &request.author,
            request.since,
            &PullFilter::any(self.state),
        )
        .await;
        summarize(request, self.state, &pulls)
    }
}

/// Count states and build the per-PR summaries, highest number first.
pub fn summarize(request: &AnalysisRequest, state: StateFilter, pulls: &[PullRequest]) -> PrReport {
    let mut open_prs = 0;
    let mut closed_prs = 0;
    let mut merged_prs = 0;
    let mut draft_prs = 0;

    for pr in pulls {
        debug!(number = pr.number, state = %pr.state, "processing PR");
        match pr.state.as_str() {
            "open" => open_prs += 1,
            "closed" => {
                closed_prs += 1;
                if pr.is_merged() {
                    merged_prs += 1;
                }
            }
            _ => {}
        }
        if pr.draft {
            draft_prs += 1;
        }
    }

    let mut pull_requests: Vec<PrSummary> = pulls.iter().map(PrSummary::from).collect();
    pull_requests.sort_by(|a, b| b.number.cmp(&a.number));

    PrReport {
        repository: request.repo.to_string(),
        author: request.author.clone(),
        start_date: request.start_date.clone(),
        state_filter: state,
        total_prs: pulls.len(),
        open_prs,
        closed_prs,
        merged_prs,
        draft_prs,
        pull_requests,
    }
}

impl From<&PullRequest> for PrSummary {
    fn from(pr: &PullRequest) -> Self {
        PrSummary {
            number: pr.number,
            title: pr.title.clone(),
            state: pr.state.clone(),
            draft: pr.draft,
            created_at: pr.created_at,
            updated_at: pr.updated_at,
            closed_at: pr.closed_at,
            merged_at: pr.merged_at,
            html_url: pr.html_url.clone(),
            additions: pr.additions,
            deletions: pr.deletions,
            changed_files: pr.changed_files,
            commits: pr.commits,
            comments: pr.comments,
            review_comments: pr.review_comments,
            labels: pr.labels.iter().map(|label| label.name.clone()).collect(),
            base_branch: pr.base.name.clone(),
            head_branch: pr.head.name.clone(),
        }
    }
}
