use super::model::NormalizedIssue;
use super::normalize::Normalizer;
use crate::observability::OperationTimer;
use crate::telemetry::{create_report_span, generate_correlation_id};
use crate::tracker::{Board, TrackerError, TrackerOps};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};
use tracing::{info, Instrument};

static PROJECT_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z][A-Z0-9_]*$").expect("project key pattern compiles"));
pub const DEFAULT_MAX_RESULTS: usize = 100;

/// Where the issues for a report come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IssueSource {
    /// Recently updated issues of one project
    Project { key: String, lookback_days: u32 },
    /// A raw JQL query, passed through unchanged
    Jql(String),
    /// Everything on an agile board
    Board(u64),
}

pub fn is_valid_project_key(key: &str) -> bool {
    PROJECT_KEY.is_match(key)
}

impl IssueSource {
    pub fn project(key: &str, lookback_days: u32) -> Result<Self, TrackerError> {
        if !is_valid_project_key(key) {
            return Err(TrackerError::InvalidProject(key.to_string()));
        }
        Ok(IssueSource::Project {
            key: key.to_string(),
            lookback_days,
        })
    }

    /// Query text for search-backed sources
    pub fn jql(&self) -> Option<String> {
        match self {
            IssueSource::Project { key, lookback_days } => Some(format!(
                "project = \"{key}\" AND updated >= -{lookback_days}d ORDER BY updated DESC"
            )),
            IssueSource::Jql(query) => Some(query.clone()),
            IssueSource::Board(_) => None,
        }
    }

    /// Short name used in file names and report headings
    pub fn label(&self) -> String {
        match self {
            IssueSource::Project { key, .. } => key.clone(),
            IssueSource::Jql(_) => "query".to_string(),
            IssueSource::Board(id) => format!("board-{id}"),
        }
    }
}

impl fmt::Display for IssueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IssueSource::Project { key, lookback_days } => {
                write!(f, "project {key} (last {lookback_days} days)")
            }
            IssueSource::Jql(query) => write!(f, "JQL: {query}"),
            IssueSource::Board(id) => write!(f, "board {id}"),
        }
    }
}

/// Fetches tracker records and normalizes them for the report pipeline
pub struct ReportService {
    tracker: Arc<dyn TrackerOps>,
    normalizer: Normalizer,
    max_results: usize,
}

impl ReportService {
    pub fn new(tracker: Arc<dyn TrackerOps>, normalizer: Normalizer) -> Self {
        Self {
            tracker,
            normalizer,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results.max(1);
        self
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    pub async fn fetch_issues(&self, source: &IssueSource) -> Result<Vec<NormalizedIssue>, TrackerError> {
        let correlation_id = generate_correlation_id();
        let span = create_report_span("fetch_issues", &source.label(), &correlation_id);

        async {
            let timer = OperationTimer::new("fetch_issues");
            let raw = match source {
                IssueSource::Board(id) => self.tracker.board_issues(*id, self.max_results).await?,
                _ => {
                    let jql = source.jql().unwrap_or_default();
                    self.tracker.search_issues(&jql, self.max_results).await?
                }
            };
            let issues = self.normalizer.normalize_all(&raw);
            info!(source = %source, fetched = issues.len(), "Fetched and normalized issues");
            timer.finish();
            Ok(issues)
        }
        .instrument(span)
        .await
    }

    pub async fn list_boards(&self) -> Result<Vec<Board>, TrackerError> {
        let timer = OperationTimer::new("list_boards");
        let boards = self.tracker.list_boards().await?;
        timer.finish();
        Ok(boards)
    }
}
