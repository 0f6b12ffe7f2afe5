pub mod files;
pub mod loc;
pub mod prs;

pub use files::FileChangesAnalysis;
pub use loc::LocAnalysis;
pub use prs::PrAnalysis;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use thiserror::Error;

use crate::github::{RepoRef, Transport};

pub const DEFAULT_START_DATE: &str = "2025-01-01";

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Invalid date format '{0}'. Please use YYYY-MM-DD format.")]
    InvalidDate(String),
}

/// Parse a YYYY-MM-DD start date into midnight UTC of that day.
pub fn parse_start_date(start_date: &str) -> Result<DateTime<Utc>, AnalysisError> {
    let date = NaiveDate::parse_from_str(start_date, "%Y-%m-%d")
        .map_err(|_| AnalysisError::InvalidDate(start_date.to_string()))?;
    date.and_hms_opt(0, 0, 0)
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| AnalysisError::InvalidDate(start_date.to_string()))
}

/// Repository, author and time window shared by every analysis.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub repo: RepoRef,
    pub author: String,
    /// Start date exactly as given
    pub start_date: String,
    /// Inclusive lower bound derived from `start_date`
    pub since: DateTime<Utc>,
}

impl AnalysisRequest {
    /// Fails on a malformed start date, before any request is made.
    pub fn new(repo: RepoRef, author: &str, start_date: &str) -> Result<Self, AnalysisError> {
        Ok(Self {
            since: parse_start_date(start_date)?,
            repo,
            author: author.to_string(),
            start_date: start_date.to_string(),
        })
    }
}

/// One fetch → filter → resolve → aggregate pipeline.
///
/// Requests are issued one after another; nothing runs concurrently.
#[async_trait]
pub trait Analysis: Send + Sync {
    type Report: Serialize + Send;

    /// Human-readable name used in logs (e.g., "Pull Requests").
    fn name(&self) -> &str;

    /// Run the pipeline. Fetch failures are logged and degrade to empty or
    /// zero-valued data, so the report is always produced.
    async fn run(&self, transport: &dyn Transport, request: &AnalysisRequest) -> Self::Report;
}
