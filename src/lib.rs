// Tracker Pulse Library - issue tracker reporting and analytics
// This exposes the core components for testing and integration

pub mod cli;
pub mod config;
pub mod dashboard;
pub mod observability;
pub mod render;
pub mod report;
pub mod telemetry;
pub mod tracker;

// Re-export key types for easy access
pub use config::{config, TrackerPulseConfig};
pub use observability::{tracker_metrics, OperationTimer, TrackerApiMetrics};
pub use render::{export_report, render, OutputFormat, RenderError, TemplateCache};
pub use report::{
    calculate_velocity, calculate_work_breakdown, categorize, group_by_parent, normalize,
    summarize_trends, CategorizedSet, IssueSource, NormalizedIssue, Normalizer, ParentGrouping,
    ReportBuilder, ReportData, ReportService,
};
pub use telemetry::{create_report_span, generate_correlation_id, init_telemetry};
pub use tracker::{TrackerClient, TrackerError, TrackerOps};
