use crate::config::TrackerPulseConfig;
use crate::report::{Normalizer, ReportService};
use crate::tracker::TrackerClient;
use anyhow::Result;
use std::sync::Arc;

pub mod boards;
pub mod report;
pub mod serve;
pub mod velocity;

#[allow(async_fn_in_trait)]
pub trait Command {
    async fn execute(&self) -> Result<()>;
}

/// Tracker-backed report service built from the loaded configuration
pub fn connect_report_service(settings: &TrackerPulseConfig) -> Result<ReportService> {
    // Progress goes to stderr so `--stdout` output can be piped
    eprint!("🔄 Connecting to {}... ", settings.tracker.base_url);
    std::io::Write::flush(&mut std::io::stderr())?;

    match TrackerClient::new(&settings.tracker) {
        Ok(client) => {
            eprintln!("✅");
            let normalizer = Normalizer::new(settings.tracker.normalize_context());
            Ok(ReportService::new(Arc::new(client), normalizer)
                .with_max_results(settings.tracker.max_results))
        }
        Err(e) => {
            eprintln!("❌");
            Err(e.into())
        }
    }
}

pub async fn show_how_to_get_started() -> Result<()> {
    println!("📈 Tracker Pulse - Issue tracker status reports");
    println!();
    println!("To get started:");
    println!("  📋 tracker-pulse report --project APP           # HTML report for the last 14 days");
    println!("  📝 tracker-pulse report -p APP -f markdown --stdout");
    println!("  🔎 tracker-pulse report --jql 'assignee = currentUser()'");
    println!("  📊 tracker-pulse velocity sprints.json          # Velocity from exported sprint data");
    println!();
    println!("Other commands:");
    println!("  🗂️  tracker-pulse boards     # List agile boards");
    println!("  🌐 tracker-pulse serve      # Live dashboard on http://127.0.0.1:8080");
    println!();
    println!("💡 Set JIRA_BASE_URL, JIRA_EMAIL and JIRA_API_TOKEN (or tracker-pulse.toml) first.");
    Ok(())
}
