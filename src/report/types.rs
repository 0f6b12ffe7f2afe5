use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::github::StateFilter;

/// Key used for files whose name carries no extension.
pub const NO_EXTENSION: &str = "no_extension";

/// Pull request state counts for one author (`prs` analysis).
#[derive(Debug, Clone, Serialize)]
pub struct PrReport {
    /// `owner/name`
    pub repository: String,
    pub author: String,
    /// Start date as given on the command line (YYYY-MM-DD)
    pub start_date: String,
    pub state_filter: StateFilter,
    pub total_prs: usize,
    pub open_prs: usize,
    pub closed_prs: usize,
    /// Closed pull requests with a merge timestamp
    pub merged_prs: usize,
    pub draft_prs: usize,
    /// Sorted by number, highest first
    pub pull_requests: Vec<PrSummary>,
}

impl PrReport {
    /// Merged share of all pull requests, in percent.
    pub fn merge_rate(&self) -> Option<f64> {
        (self.total_prs > 0).then(|| self.merged_prs as f64 / self.total_prs as f64 * 100.0)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub additions: u64,
    pub deletions: u64,
    pub changed_files: u64,
    pub commits: u64,
    pub comments: u64,
    pub review_comments: u64,
    pub labels: Vec<String>,
    pub base_branch: String,
    pub head_branch: String,
}

/// Line totals over an author's commits (`loc` analysis).
#[derive(Debug, Clone, Serialize)]
pub struct LocReport {
    pub repository: String,
    pub author: String,
    pub start_date: String,
    pub total_commits: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    /// Additions plus deletions
    pub total_changes: u64,
    pub commits: Vec<CommitSummary>,
}

impl LocReport {
    pub fn average_changes(&self) -> Option<f64> {
        (self.total_commits > 0).then(|| self.total_changes as f64 / self.total_commits as f64)
    }

    /// The `n` commits with the most changed lines, largest first.
    pub fn top_commits(&self, n: usize) -> Vec<&CommitSummary> {
        let mut ranked: Vec<&CommitSummary> = self.commits.iter().collect();
        ranked.sort_by(|a, b| b.total_changes.cmp(&a.total_changes));
        ranked.truncate(n);
        ranked
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CommitSummary {
    pub sha: String,
    /// First line of the commit message
    pub message: String,
    pub date: Option<DateTime<Utc>>,
    pub additions: u64,
    pub deletions: u64,
    pub total_changes: u64,
}

/// File-level changes across an author's pull requests (`files` analysis).
#[derive(Debug, Clone, Serialize)]
pub struct FileChangesReport {
    pub repository: String,
    pub author: String,
    pub start_date: String,
    pub state_filter: StateFilter,
    pub merged_only: bool,
    pub include_draft: bool,
    pub total_prs: usize,
    pub total_files_changed: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub file_extension_stats: ExtensionBreakdown,
    pub pull_requests: Vec<PrFileSummary>,
}

impl FileChangesReport {
    pub fn net_change(&self) -> i64 {
        self.total_additions as i64 - self.total_deletions as i64
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PrFileSummary {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub draft: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub html_url: String,
    pub total_files_changed: usize,
    pub total_additions: u64,
    pub total_deletions: u64,
    pub files: Vec<FileChange>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    pub filename: String,
    /// added, removed, modified, renamed, ...
    pub status: String,
    pub additions: u64,
    pub deletions: u64,
    pub changes: u64,
    pub blob_url: Option<String>,
    pub raw_url: Option<String>,
    pub contents_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_filename: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExtensionStats {
    pub count: usize,
    pub additions: u64,
    pub deletions: u64,
}

impl ExtensionStats {
    pub fn net(&self) -> i64 {
        self.additions as i64 - self.deletions as i64
    }
}

/// Per-extension totals in first-seen order until [`sort_by_count`] is called.
///
/// Serialises as a JSON object whose key order is the entry order.
///
/// [`sort_by_count`]: ExtensionBreakdown::sort_by_count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtensionBreakdown {
    entries: Vec<(String, ExtensionStats)>,
}

impl ExtensionBreakdown {
    pub fn record(&mut self, extension: &str, additions: u64, deletions: u64) {
        let index = match self.entries.iter().position(|(key, _)| key == extension) {
            Some(index) => index,
            None => {
                self.entries.push((extension.to_string(), ExtensionStats::default()));
                self.entries.len() - 1
            }
        };
        let stats = &mut self.entries[index].1;
        stats.count += 1;
        stats.additions += additions;
        stats.deletions += deletions;
    }

    /// Highest file count first; ties keep their first-seen order.
    pub fn sort_by_count(&mut self) {
        self.entries.sort_by(|a, b| b.1.count.cmp(&a.1.count));
    }

    #[cfg(test)]
    pub fn get(&self, extension: &str) -> Option<&ExtensionStats> {
        self.entries
            .iter()
            .find(|(key, _)| key == extension)
            .map(|(_, stats)| stats)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExtensionStats)> {
        self.entries.iter().map(|(key, stats)| (key.as_str(), stats))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for ExtensionBreakdown {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, stats) in &self.entries {
            map.serialize_entry(key, stats)?;
        }
        map.end()
    }
}
