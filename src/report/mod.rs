pub mod types;

pub use types::{FileChangesReport, LocReport, PrReport};

use colored::Colorize;
use serde::Serialize;
use std::io::{self, Write};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode report as JSON: {0}")]
    Encode(#[from] serde_json::Error),
}

const RECENT_PRS: usize = 10;
const TOP_COMMITS: usize = 10;
const TOP_EXTENSIONS: usize = 10;
const FILES_PER_PR: usize = 20;
const TITLE_WIDTH: usize = 50;

/// Human-readable terminal rendering of a report.
pub trait Summary {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()>;
}

/// Print the summary to stdout.
pub fn print_summary<S: Summary + ?Sized>(report: &S) -> Result<(), ReportError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    report.write_summary(&mut out)?;
    out.flush()?;
    Ok(())
}

/// Write the report as two-space indented JSON.
#[instrument(skip(report), fields(path = %path.display()))]
pub fn write_json<T: Serialize + ?Sized>(report: &T, path: &Path) -> Result<(), ReportError> {
    let mut json = serde_json::to_string_pretty(report)?;
    json.push('\n');
    std::fs::write(path, json)?;
    debug!("wrote JSON report");
    Ok(())
}

impl Summary for PrReport {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", format!("═══ Pull Requests: {} ═══", self.repository).bold())?;
        writeln!(
            out,
            "Author: {} | From {} to present | State: {}",
            self.author, self.start_date, self.state_filter
        )?;
        writeln!(
            out,
            "Total PRs: {} | Open: {} | Closed: {} | Merged: {} | Draft: {}",
            self.total_prs, self.open_prs, self.closed_prs, self.merged_prs, self.draft_prs
        )?;
        if let Some(rate) = self.merge_rate() {
            writeln!(out, "Merge rate: {:.1}%", rate)?;
        }

        if self.pull_requests.is_empty() {
            writeln!(out, "  No pull requests found.")?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "PR numbers (most recent first):")?;
        let numbers: Vec<String> = self
            .pull_requests
            .iter()
            .map(|pr| pr.number.to_string())
            .collect();
        for row in numbers.chunks(10) {
            writeln!(out, "  {}", row.join(", "))?;
        }

        writeln!(out)?;
        writeln!(out, "Recent pull requests:")?;
        for (i, pr) in self.pull_requests.iter().take(RECENT_PRS).enumerate() {
            let draft = if pr.draft { " [DRAFT]" } else { "" };
            let merged = if pr.merged_at.is_some() { " (merged)" } else { "" };
            writeln!(
                out,
                "{:>2}. {} #{}{} - {}{}",
                i + 1,
                state_marker(&pr.state),
                pr.number,
                draft,
                truncate(&pr.title, TITLE_WIDTH),
                merged
            )?;
        }
        writeln!(out)?;
        Ok(())
    }
}

impl Summary for LocReport {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(out, "{}", format!("═══ Lines of Code: {} ═══", self.repository).bold())?;
        writeln!(
            out,
            "Author: {} | From {} to present | Commits: {}",
            self.author, self.start_date, self.total_commits
        )?;
        writeln!(out, "Total additions: {} lines", thousands(self.total_additions))?;
        writeln!(out, "Total deletions: {} lines", thousands(self.total_deletions))?;
        writeln!(out, "Total changes: {} lines", thousands(self.total_changes))?;
        if let Some(average) = self.average_changes() {
            writeln!(out, "Average changes per commit: {:.1} lines", average)?;
        }

        if self.commits.is_empty() {
            writeln!(out, "  No commits found.")?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "Top {} commits by changes:", TOP_COMMITS)?;
        for (i, commit) in self.top_commits(TOP_COMMITS).iter().enumerate() {
            let short_sha: String = commit.sha.chars().take(8).collect();
            writeln!(
                out,
                "{:>2}. {} ({:>4} changes) - {}",
                i + 1,
                short_sha.yellow(),
                commit.total_changes,
                truncate(&commit.message, TITLE_WIDTH)
            )?;
        }
        writeln!(out)?;
        Ok(())
    }
}

impl Summary for FileChangesReport {
    fn write_summary(&self, out: &mut dyn Write) -> io::Result<()> {
        writeln!(out)?;
        writeln!(
            out,
            "{}",
            format!("═══ Pull Request File Changes: {} ═══", self.repository).bold()
        )?;
        writeln!(
            out,
            "Author: {} | From {} to present | State: {}",
            self.author, self.start_date, self.state_filter
        )?;
        writeln!(
            out,
            "Merged only: {} | Include draft: {}",
            self.merged_only, self.include_draft
        )?;
        writeln!(out, "Total PRs analyzed: {}", self.total_prs)?;
        writeln!(out, "Total files changed: {}", self.total_files_changed)?;
        writeln!(out, "Total lines added: {}", thousands(self.total_additions))?;
        writeln!(out, "Total lines deleted: {}", thousands(self.total_deletions))?;
        writeln!(out, "Net change: {} lines", signed_thousands(self.net_change()))?;

        if !self.file_extension_stats.is_empty() {
            writeln!(out)?;
            writeln!(out, "File types (top {}):", TOP_EXTENSIONS)?;
            writeln!(
                out,
                "{:<15} {:<10} {:<12} {:<12} {:<12}",
                "Extension", "Files", "Added", "Deleted", "Net"
            )?;
            for (extension, stats) in self.file_extension_stats.iter().take(TOP_EXTENSIONS) {
                writeln!(
                    out,
                    "{:<15} {:<10} {:<12} {:<12} {:<12}",
                    extension,
                    stats.count,
                    thousands(stats.additions),
                    thousands(stats.deletions),
                    signed_thousands(stats.net())
                )?;
            }
        }

        if self.pull_requests.is_empty() {
            writeln!(out, "  No pull requests found.")?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out)?;
        writeln!(out, "{}", "═══ Pull Request Details ═══".bold())?;
        for (i, pr) in self.pull_requests.iter().enumerate() {
            let draft = if pr.draft { " [DRAFT]" } else { "" };
            let merged = if pr.merged_at.is_some() { " (merged)" } else { "" };
            writeln!(out)?;
            writeln!(
                out,
                "{}. {} PR #{}{}{}",
                i + 1,
                state_marker(&pr.state),
                pr.number,
                draft,
                merged
            )?;
            writeln!(out, "   Title: {}", pr.title)?;
            writeln!(out, "   URL: {}", pr.html_url)?;
            writeln!(
                out,
                "   Files: {}, Added: +{}, Deleted: -{}",
                pr.total_files_changed, pr.total_additions, pr.total_deletions
            )?;
            if pr.files.is_empty() {
                continue;
            }
            writeln!(out, "   Changed files:")?;
            for file in pr.files.iter().take(FILES_PER_PR) {
                writeln!(
                    out,
                    "      {} {} (+{} -{})",
                    status_marker(&file.status),
                    file.filename,
                    file.additions,
                    file.deletions
                )?;
            }
            if pr.files.len() > FILES_PER_PR {
                writeln!(out, "      ... and {} more files", pr.files.len() - FILES_PER_PR)?;
            }
        }
        writeln!(out)?;
        Ok(())
    }
}

fn state_marker(state: &str) -> colored::ColoredString {
    match state {
        "open" => "●".green(),
        "closed" => "●".red(),
        _ => "○".normal(),
    }
}

fn status_marker(status: &str) -> colored::ColoredString {
    match status {
        "added" => "A".green().bold(),
        "removed" => "D".red().bold(),
        "modified" => "M".yellow().bold(),
        "renamed" => "R".cyan().bold(),
        _ => "?".normal(),
    }
}

/// Cut `text` to at most `width` characters, marking the cut with "...".
fn truncate(text: &str, width: usize) -> String {
    match text.char_indices().nth(width) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// 1234567 -> "1,234,567"
fn thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

/// Like [`thousands`] but always signed: "+1,200", "-35", "+0".
fn signed_thousands(value: i64) -> String {
    let sign = if value < 0 { '-' } else { '+' };
    format!("{}{}", sign, thousands(value.unsigned_abs()))
}
