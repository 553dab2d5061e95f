use super::model::{CategorizedSet, WorkBreakdown};
use super::percentage;

/// Percentage split across the pooled completed / in-progress / attention buckets.
///
/// The buckets can overlap, so the three values need not sum to 100.
pub fn calculate_work_breakdown(categorized: &CategorizedSet<'_>) -> WorkBreakdown {
    let completed = categorized.legacy.completed.len();
    let in_progress = categorized.legacy.in_progress.len();
    let attention = categorized.legacy.needs_attention.len();
    let total = completed + in_progress + attention;

    WorkBreakdown {
        completed_percentage: percentage(completed, total),
        in_progress_percentage: percentage(in_progress, total),
        attention_percentage: percentage(attention, total),
    }
}
