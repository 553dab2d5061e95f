use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::render::OutputFormat;

pub mod commands;

#[derive(Parser)]
#[command(name = "tracker-pulse")]
#[command(version)]
#[command(about = "Status reports, trends and velocity from your issue tracker")]
#[command(long_about = "Tracker Pulse pulls recent issues from a Jira-compatible tracker, sorts them into \
                       completed, in-progress, new and needs-attention buckets, groups them under their epics \
                       and renders HTML, Markdown, CSV or JSON reports. Start with 'tracker-pulse report --project KEY'.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a status report for a project, JQL query or board
    Report {
        /// Project key, e.g. APP (defaults to report.default_project)
        #[arg(long, short = 'p', conflicts_with_all = ["jql", "board"])]
        project: Option<String>,
        /// Raw JQL query instead of a project
        #[arg(long, conflicts_with = "board")]
        jql: Option<String>,
        /// Agile board id instead of a project
        #[arg(long)]
        board: Option<u64>,
        /// Days of history to include (defaults to report.lookback_days)
        #[arg(long, short = 'd')]
        days: Option<u32>,
        /// Output format (defaults to report.default_format)
        #[arg(long, short = 'f', value_enum)]
        format: Option<OutputFormat>,
        /// Directory to write the report to (defaults to report.output_dir)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
        /// JSON file of per-sprint samples to use for velocity
        #[arg(long, help = "JSON array of {period, completedCount, storyPoints} samples")]
        velocity_file: Option<PathBuf>,
        /// Print the report instead of writing a file
        #[arg(long)]
        stdout: bool,
        /// Only flag unresolved issues as needing attention
        #[arg(long, help = "Skip resolved issues when flagging stale work")]
        unresolved_only: bool,
    },
    /// Summarize velocity from a samples file without contacting the tracker
    Velocity {
        /// JSON array of {period, completedCount, storyPoints}
        file: PathBuf,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// List the agile boards visible to the configured account
    Boards,
    /// Serve live reports over HTTP
    Serve {
        /// Interface to bind (defaults to dashboard.host)
        #[arg(long)]
        host: Option<String>,
        /// Port to listen on (defaults to dashboard.port)
        #[arg(long)]
        port: Option<u16>,
    },
}
