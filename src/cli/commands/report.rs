use super::{connect_report_service, Command};
use crate::config::{config, TrackerPulseConfig};
use crate::observability::tracker_metrics;
use crate::render::{export_report, render, OutputFormat, TemplateCache};
use crate::report::{load_velocity_samples, AttentionPolicy, IssueSource, ReportBuilder, ReportData};
use anyhow::{bail, Result};
use std::path::PathBuf;

#[derive(Default)]
pub struct ReportCommand {
    pub project: Option<String>,
    pub jql: Option<String>,
    pub board: Option<u64>,
    pub days: Option<u32>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub velocity_file: Option<PathBuf>,
    pub stdout: bool,
    pub unresolved_only: bool,
}

impl ReportCommand {
    /// Pick the issue source from flags, falling back to the configured project
    pub fn resolve_source(&self, settings: &TrackerPulseConfig) -> Result<IssueSource> {
        let days = self.days.unwrap_or(settings.report.lookback_days);
        if let Some(jql) = &self.jql {
            return Ok(IssueSource::Jql(jql.clone()));
        }
        if let Some(board) = self.board {
            return Ok(IssueSource::Board(board));
        }
        match self.project.as_ref().or(settings.report.default_project.as_ref()) {
            Some(project) => Ok(IssueSource::project(project, days)?),
            None => bail!(
                "No project given. Use --project KEY, --jql, --board, or set report.default_project in tracker-pulse.toml"
            ),
        }
    }

    pub fn resolve_format(&self, settings: &TrackerPulseConfig) -> Result<OutputFormat> {
        match self.format {
            Some(format) => Ok(format),
            None => Ok(settings.report.default_format.parse()?),
        }
    }
}

fn print_summary(report: &ReportData<'_>) {
    let trends = &report.trends;
    println!();
    println!("📊 {} SUMMARY:", report.project);
    println!("   📋 Issues analyzed: {}", report.total_issues);
    println!("   ✅ Completion rate: {}%", trends.completion_rate);
    println!("   🔄 In progress: {}", trends.summary.active_count);
    println!("   🆕 New this week: {}", trends.summary.new_this_week);
    println!("   ⚠️  Needs attention: {}", trends.summary.needs_attention);
    println!(
        "   📈 Velocity: {} {} ({})",
        report.velocity.average, report.velocity.unit, report.velocity.trend
    );
    println!("   🗂️  Epics: {}", report.grouping.epics_with_issues.len());
}

impl Command for ReportCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;
        let source = self.resolve_source(settings)?;
        let format = self.resolve_format(settings)?;
        let samples = match &self.velocity_file {
            Some(path) => Some(load_velocity_samples(path).await?),
            None => None,
        };

        let service = connect_report_service(settings)?;
        eprint!("🔍 Fetching issues for {}... ", source);
        std::io::Write::flush(&mut std::io::stderr())?;
        let issues = match service.fetch_issues(&source).await {
            Ok(issues) => {
                eprintln!("✅ {} issues", issues.len());
                issues
            }
            Err(e) => {
                eprintln!("❌");
                return Err(e.into());
            }
        };

        let lookback_days = match &source {
            IssueSource::Project { lookback_days, .. } => *lookback_days,
            _ => self.days.unwrap_or(settings.report.lookback_days),
        };
        let mut builder = ReportBuilder::new(source.label()).lookback_days(lookback_days);
        if self.unresolved_only {
            builder = builder.attention_policy(AttentionPolicy::UnresolvedOnly);
        }
        if let Some(samples) = samples {
            builder = builder.velocity_samples(samples);
        }
        let report = builder.build(&issues);

        let mut templates = TemplateCache::new(settings.report.template_dir.as_ref().map(PathBuf::from));
        if self.stdout {
            println!("{}", render(&report, format, &mut templates)?);
        } else {
            let dir = self
                .output
                .clone()
                .unwrap_or_else(|| PathBuf::from(&settings.report.output_dir));
            let path = export_report(&report, format, &dir, &mut templates).await?;
            print_summary(&report);
            println!();
            println!("📄 Report written to {}", path.display());
        }

        tracker_metrics().log_stats();
        Ok(())
    }
}
