use super::{connect_report_service, Command};
use crate::config::config;
use crate::observability::tracker_metrics;
use anyhow::Result;

#[derive(Default)]
pub struct BoardsCommand;

impl BoardsCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for BoardsCommand {
    async fn execute(&self) -> Result<()> {
        let settings = config()?;
        let service = connect_report_service(settings)?;
        let boards = service.list_boards().await?;

        if boards.is_empty() {
            println!("🗂️  No boards visible to this account");
            return Ok(());
        }

        println!("🗂️  BOARDS ({}):", boards.len());
        println!("──────────────");
        for board in &boards {
            println!(
                "   {:>6}  {} ({})",
                board.id,
                board.name,
                board.board_type.as_deref().unwrap_or("unknown")
            );
        }
        println!();
        println!("💡 Report on a board with: tracker-pulse report --board <id>");
        tracker_metrics().log_stats();
        Ok(())
    }
}
