use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Reference to another tracker issue (parent, initiative, outcome)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IssueRef {
    pub key: String,
    pub summary: String,
    pub url: String,
}

/// Levels above the immediate parent, when the tracker exposes them
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ancestry {
    pub initiative: Option<IssueRef>,
    pub outcome: Option<IssueRef>,
}

impl Ancestry {
    pub fn is_empty(&self) -> bool {
        self.initiative.is_none() && self.outcome.is_none()
    }
}

/// Canonical issue shape every report stage works on.
///
/// Built once per run from raw tracker data and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedIssue {
    pub key: String,
    pub summary: String,
    pub status: String,
    pub assignee: Option<String>,
    pub priority: String,
    pub issue_type: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
    pub resolved: Option<DateTime<Utc>>,
    pub story_points: Option<f64>,
    pub labels: Vec<String>,
    pub url: String,
    pub parent: Option<IssueRef>,
    pub ancestry: Option<Ancestry>,
}

impl NormalizedIssue {
    /// Minimal issue with documented defaults for everything optional
    pub fn new(key: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            summary: summary.into(),
            status: String::new(),
            assignee: None,
            priority: "None".to_string(),
            issue_type: String::new(),
            created: None,
            updated: None,
            resolution: None,
            resolved: None,
            story_points: None,
            labels: Vec::new(),
            url: String::new(),
            parent: None,
            ancestry: None,
        }
    }
}

/// Bucket an issue can be tagged with. Membership is not exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Category {
    Completed,
    InProgress,
    New,
    NeedsAttention,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Category::Completed => "completed",
            Category::InProgress => "in-progress",
            Category::New => "new",
            Category::NeedsAttention => "needs-attention",
        };
        write!(f, "{}", label)
    }
}

/// An issue flagged for attention, with the reason and a snapshot of its last update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttentionItem<'a> {
    #[serde(flatten)]
    pub issue: &'a NormalizedIssue,
    pub reason: String,
    pub last_updated: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Buckets<'a> {
    pub completed: Vec<&'a NormalizedIssue>,
    pub in_progress: Vec<&'a NormalizedIssue>,
    pub new_issues: Vec<&'a NormalizedIssue>,
    pub needs_attention: Vec<AttentionItem<'a>>,
}

impl<'a> Buckets<'a> {
    pub fn is_empty(&self) -> bool {
        self.completed.is_empty()
            && self.in_progress.is_empty()
            && self.new_issues.is_empty()
            && self.needs_attention.is_empty()
    }
}

/// Sub-level buckets also keep every sub-level issue for trend analysis
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubLevelBuckets<'a> {
    #[serde(flatten)]
    pub buckets: Buckets<'a>,
    pub all: Vec<&'a NormalizedIssue>,
}

/// Result of categorization: per-level buckets plus the legacy pooled view
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorizedSet<'a> {
    pub top_level: Buckets<'a>,
    pub sub_level: SubLevelBuckets<'a>,
    /// Both levels pooled together, kept for older report templates
    pub legacy: Buckets<'a>,
}

impl<'a> CategorizedSet<'a> {
    /// Every bucket of the pooled view the given issue landed in
    pub fn categories_of(&self, key: &str) -> Vec<Category> {
        let mut categories = Vec::new();
        if self.legacy.completed.iter().any(|i| i.key == key) {
            categories.push(Category::Completed);
        }
        if self.legacy.in_progress.iter().any(|i| i.key == key) {
            categories.push(Category::InProgress);
        }
        if self.legacy.new_issues.iter().any(|i| i.key == key) {
            categories.push(Category::New);
        }
        if self.legacy.needs_attention.iter().any(|a| a.issue.key == key) {
            categories.push(Category::NeedsAttention);
        }
        categories
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicProgress {
    pub total: usize,
    pub completed: usize,
    pub percentage: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicSummary {
    pub key: String,
    pub title: String,
    pub url: String,
    pub status: String,
    pub priority: String,
    pub assignee: Option<String>,
    pub progress: Option<EpicProgress>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EpicGroup<'a> {
    pub epic: EpicSummary,
    pub ancestry: Option<Ancestry>,
    pub related_issues: Vec<&'a NormalizedIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentGrouping<'a> {
    pub epics_with_issues: Vec<EpicGroup<'a>>,
    pub unassociated_issues: Vec<&'a NormalizedIssue>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStats {
    pub issue_type: String,
    pub total: usize,
    pub completed: usize,
    pub in_progress: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMetric {
    pub period: String,
    pub completed: u32,
    pub story_points: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSummary {
    pub issue_type: String,
    pub total: usize,
    pub completion_rate: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendHighlights {
    pub top_types: Vec<TypeSummary>,
    pub active_count: usize,
    pub new_this_week: usize,
    pub needs_attention: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    pub total_items: usize,
    /// Insertion-ordered: first time a type is seen fixes its position
    pub by_type: Vec<TypeStats>,
    pub by_status: Vec<StatusCount>,
    pub completion_rate: u32,
    pub weekly_metrics: Vec<WeeklyMetric>,
    pub summary: TrendHighlights,
}

impl TrendSummary {
    pub fn type_stats(&self, issue_type: &str) -> Option<&TypeStats> {
        self.by_type.iter().find(|stats| stats.issue_type == issue_type)
    }

    pub fn status_count(&self, status: &str) -> usize {
        self.by_status
            .iter()
            .find(|entry| entry.status == status)
            .map(|entry| entry.count)
            .unwrap_or(0)
    }
}

/// One period of throughput, typically from a sprint report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VelocitySample {
    pub period: String,
    pub completed_count: u32,
    pub story_points: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VelocityTrend {
    Increasing,
    Decreasing,
    Stable,
    #[serde(rename = "No data available")]
    NoData,
}

impl fmt::Display for VelocityTrend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VelocityTrend::Increasing => "Increasing",
            VelocityTrend::Decreasing => "Decreasing",
            VelocityTrend::Stable => "Stable",
            VelocityTrend::NoData => "No data available",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityPoint {
    pub period: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VelocityMetrics {
    pub average: f64,
    pub unit: String,
    pub trend: VelocityTrend,
    pub data: Vec<VelocityPoint>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkBreakdown {
    pub completed_percentage: u32,
    pub in_progress_percentage: u32,
    pub attention_percentage: u32,
}
