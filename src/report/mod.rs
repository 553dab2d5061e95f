// Issue categorization and report aggregation
// Turns a flat list of tracker issues into the data structure handed to renderers

pub mod breakdown;
pub mod categorize;
pub mod hierarchy;
pub mod model;
pub mod normalize;
pub mod service;
pub mod trends;

pub use breakdown::calculate_work_breakdown;
pub use categorize::{categorize, categorize_at, categorize_with, AttentionPolicy};
pub use hierarchy::group_by_parent;
pub use model::*;
pub use normalize::{normalize, NormalizeContext, Normalizer};
pub use service::{IssueSource, ReportService};
pub use trends::{calculate_velocity, summarize_trends};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;

/// round(100 * part / total), 0 when total is 0
pub(crate) fn percentage(part: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    (100.0 * part as f64 / total as f64).round() as u32
}

/// Everything a renderer needs for one report run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportData<'a> {
    pub project: String,
    /// The normalized input, in fetch order
    #[serde(skip)]
    pub issues: &'a [NormalizedIssue],
    pub generated_at: DateTime<Utc>,
    pub lookback_days: u32,
    pub total_issues: usize,
    pub categorized: CategorizedSet<'a>,
    pub grouping: ParentGrouping<'a>,
    pub trends: TrendSummary,
    pub velocity: VelocityMetrics,
    pub breakdown: WorkBreakdown,
}

/// Assembles [`ReportData`] from normalized issues
#[derive(Debug, Clone)]
pub struct ReportBuilder {
    project: String,
    lookback_days: u32,
    now: Option<DateTime<Utc>>,
    policy: AttentionPolicy,
    samples: Option<Vec<VelocitySample>>,
}

impl ReportBuilder {
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            lookback_days: 14,
            now: None,
            policy: AttentionPolicy::default(),
            samples: None,
        }
    }

    pub fn lookback_days(mut self, days: u32) -> Self {
        self.lookback_days = days;
        self
    }

    /// Pin the reference time, mostly for tests
    pub fn at(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    pub fn attention_policy(mut self, policy: AttentionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn velocity_samples(mut self, samples: Vec<VelocitySample>) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn build<'a>(&self, issues: &'a [NormalizedIssue]) -> ReportData<'a> {
        let now = self.now.unwrap_or_else(Utc::now);
        let categorized = categorize_with(issues, now, self.policy);
        let grouping = group_by_parent(issues);
        let trends = summarize_trends(&categorized, self.samples.as_deref());
        let velocity = match &self.samples {
            Some(samples) => calculate_velocity(samples),
            None => calculate_velocity(&weekly_samples(&trends)),
        };
        let breakdown = calculate_work_breakdown(&categorized);

        tracing::info!(
            project = %self.project,
            issues = issues.len(),
            epics = grouping.epics_with_issues.len(),
            completion_rate = trends.completion_rate,
            velocity_trend = %velocity.trend,
            "Report data assembled"
        );

        ReportData {
            project: self.project.clone(),
            issues,
            generated_at: now,
            lookback_days: self.lookback_days,
            total_issues: issues.len(),
            categorized,
            grouping,
            trends,
            velocity,
            breakdown,
        }
    }
}

/// Weekly completions stand in for sprint samples when none were supplied
fn weekly_samples(trends: &TrendSummary) -> Vec<VelocitySample> {
    trends
        .weekly_metrics
        .iter()
        .map(|week| VelocitySample {
            period: week.period.clone(),
            completed_count: week.completed,
            story_points: week.story_points,
        })
        .collect()
}

/// Read a JSON array of per-period samples (e.g. exported sprint reports)
pub async fn load_velocity_samples(path: impl AsRef<Path>) -> Result<Vec<VelocitySample>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read velocity samples from {}", path.display()))?;
    let samples: Vec<VelocitySample> = serde_json::from_str(&content)
        .with_context(|| format!("Invalid velocity samples in {}", path.display()))?;
    Ok(samples)
}
