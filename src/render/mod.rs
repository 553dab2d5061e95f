// Report rendering and export
// Each format turns a ReportData into a self-contained document

pub mod csv;
pub mod html;
pub mod json;
pub mod markdown;
pub mod templates;

pub use templates::TemplateCache;

use crate::report::ReportData;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Html,
    Markdown,
    Csv,
    Json,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "md",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            OutputFormat::Html => "text/html; charset=utf-8",
            OutputFormat::Markdown => "text/markdown; charset=utf-8",
            OutputFormat::Csv => "text/csv; charset=utf-8",
            OutputFormat::Json => "application/json",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Html => "html",
            OutputFormat::Markdown => "markdown",
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
        };
        write!(f, "{name}")
    }
}

impl FromStr for OutputFormat {
    type Err = RenderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md" => Ok(OutputFormat::Markdown),
            other => <OutputFormat as ValueEnum>::from_str(other, true)
                .map_err(|_| RenderError::UnknownFormat(s.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Unknown output format '{0}' (expected html, markdown, csv or json)")]
    UnknownFormat(String),

    #[error("File system error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Render a report in the requested format
pub fn render(
    report: &ReportData<'_>,
    format: OutputFormat,
    templates: &mut TemplateCache,
) -> Result<String, RenderError> {
    match format {
        OutputFormat::Html => html::render_html(report, templates),
        OutputFormat::Markdown => Ok(markdown::render_markdown(report)),
        OutputFormat::Csv => Ok(csv::render_csv(report)),
        OutputFormat::Json => json::render_json(report),
    }
}

/// `{project}-report-{YYYYMMDD}.{ext}`
pub fn report_file_name(project: &str, generated_at: DateTime<Utc>, format: OutputFormat) -> String {
    let safe_project: String = project
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '-' })
        .collect();
    format!(
        "{}-report-{}.{}",
        safe_project,
        generated_at.format("%Y%m%d"),
        format.extension()
    )
}

/// Render and write a report into `dir`, creating it when missing
pub async fn export_report(
    report: &ReportData<'_>,
    format: OutputFormat,
    dir: &Path,
    templates: &mut TemplateCache,
) -> Result<PathBuf, RenderError> {
    let content = render(report, format, templates)?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(report_file_name(&report.project, report.generated_at, format));
    tokio::fs::write(&path, content).await?;
    info!(path = %path.display(), format = %format, "Report exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{NormalizedIssue, ReportBuilder};
    use chrono::TimeZone;

    #[test]
    fn test_format_parsing() {
        assert_eq!("html".parse::<OutputFormat>().unwrap(), OutputFormat::Html);
        assert_eq!("Markdown".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!(matches!(
            "pdf".parse::<OutputFormat>(),
            Err(RenderError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_report_file_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        assert_eq!(report_file_name("APP", at, OutputFormat::Html), "APP-report-20240309.html");
        assert_eq!(report_file_name("APP", at, OutputFormat::Markdown), "APP-report-20240309.md");
        assert_eq!(report_file_name("board 7", at, OutputFormat::Csv), "board-7-report-20240309.csv");
    }

    #[tokio::test]
    async fn test_export_report_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let issues = vec![NormalizedIssue::new("APP-1", "Something")];
        let report = ReportBuilder::new("APP").at(at).build(&issues);
        let mut templates = TemplateCache::new(None);

        let path = export_report(&report, OutputFormat::Json, &out, &mut templates)
            .await
            .unwrap();
        assert_eq!(path, out.join("APP-report-20240309.json"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("\"project\": \"APP\""));
    }
}
