use super::Command;
use crate::report::{calculate_velocity, load_velocity_samples, VelocityMetrics};
use anyhow::Result;
use std::path::PathBuf;

pub struct VelocityCommand {
    pub file: PathBuf,
    pub json: bool,
}

impl VelocityCommand {
    pub fn new(file: PathBuf) -> Self {
        Self { file, json: false }
    }

    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

pub fn format_velocity(velocity: &VelocityMetrics) -> String {
    let mut out = String::new();
    out.push_str("📊 VELOCITY\n");
    out.push_str("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━\n");
    out.push_str(&format!("   Average: {} {} per period\n", velocity.average, velocity.unit));
    out.push_str(&format!("   Trend:   {}\n", velocity.trend));
    if !velocity.data.is_empty() {
        out.push('\n');
        for point in &velocity.data {
            out.push_str(&format!("   {:<20} {}\n", point.period, point.value));
        }
    }
    out
}

impl Command for VelocityCommand {
    async fn execute(&self) -> Result<()> {
        let samples = load_velocity_samples(&self.file).await?;
        let velocity = calculate_velocity(&samples);
        if self.json {
            println!("{}", serde_json::to_string_pretty(&velocity)?);
        } else {
            print!("{}", format_velocity(&velocity));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::VelocitySample;

    #[test]
    fn test_format_velocity_lists_periods() {
        let samples: Vec<VelocitySample> = [5, 7, 9]
            .iter()
            .enumerate()
            .map(|(i, n)| VelocitySample {
                period: format!("Sprint {}", i + 1),
                completed_count: *n,
                story_points: 0.0,
            })
            .collect();
        let text = format_velocity(&calculate_velocity(&samples));
        assert!(text.contains("Average: 7 items per period"));
        assert!(text.contains("Trend:   Increasing"));
        assert!(text.contains("Sprint 3"));
    }

    #[test]
    fn test_format_velocity_without_data() {
        let text = format_velocity(&calculate_velocity(&[]));
        assert!(text.contains("No data available"));
    }
}
