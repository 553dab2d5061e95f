use anyhow::Result;
use clap::Parser;

use tracker_pulse::cli::commands::boards::BoardsCommand;
use tracker_pulse::cli::commands::report::ReportCommand;
use tracker_pulse::cli::commands::serve::ServeCommand;
use tracker_pulse::cli::commands::velocity::VelocityCommand;
use tracker_pulse::cli::commands::{show_how_to_get_started, Command};
use tracker_pulse::cli::{Cli, Commands};
use tracker_pulse::{config, init_telemetry};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = config()?;
    init_telemetry(&settings.observability)?;

    tokio::runtime::Runtime::new()?.block_on(async {
        match cli.command {
            // Default behavior: no subcommand - explain how to get a report
            None => show_how_to_get_started().await,
            Some(Commands::Report {
                project,
                jql,
                board,
                days,
                format,
                output,
                velocity_file,
                stdout,
                unresolved_only,
            }) => {
                ReportCommand {
                    project,
                    jql,
                    board,
                    days,
                    format,
                    output,
                    velocity_file,
                    stdout,
                    unresolved_only,
                }
                .execute()
                .await
            }
            Some(Commands::Velocity { file, json }) => {
                VelocityCommand::new(file).with_json(json).execute().await
            }
            Some(Commands::Boards) => BoardsCommand::new().execute().await,
            Some(Commands::Serve { host, port }) => ServeCommand::new(host, port).execute().await,
        }
    })
}
