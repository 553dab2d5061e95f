use super::categorize::{is_completed, is_in_progress};
use super::model::{
    CategorizedSet, NormalizedIssue, StatusCount, TrendHighlights, TrendSummary, TypeStats,
    TypeSummary, VelocityMetrics, VelocityPoint, VelocitySample, VelocityTrend, WeeklyMetric,
};
use super::percentage;
use chrono::Datelike;
use std::collections::BTreeMap;

const UNKNOWN: &str = "Unknown";
const TOP_TYPES: usize = 3;
const RECENT_PERIODS: usize = 2;
const INCREASE_RATIO: f64 = 1.1;
const DECREASE_RATIO: f64 = 0.9;

fn or_unknown(value: &str) -> &str {
    if value.trim().is_empty() {
        UNKNOWN
    } else {
        value
    }
}

/// Tally the sub-level view of a categorized set.
///
/// External samples, when provided, become the weekly metrics verbatim;
/// otherwise completed issues are bucketed by ISO week.
pub fn summarize_trends(
    categorized: &CategorizedSet<'_>,
    samples: Option<&[VelocitySample]>,
) -> TrendSummary {
    let all = &categorized.sub_level.all;
    let buckets = &categorized.sub_level.buckets;

    let mut by_type: Vec<TypeStats> = Vec::new();
    let mut by_status: Vec<StatusCount> = Vec::new();

    for issue in all {
        let issue_type = or_unknown(&issue.issue_type);
        let slot = match by_type.iter().position(|s| s.issue_type == issue_type) {
            Some(slot) => slot,
            None => {
                by_type.push(TypeStats {
                    issue_type: issue_type.to_string(),
                    ..Default::default()
                });
                by_type.len() - 1
            }
        };
        let stats = &mut by_type[slot];
        stats.total += 1;
        if is_completed(issue) {
            stats.completed += 1;
        } else if is_in_progress(issue) {
            stats.in_progress += 1;
        }

        let status = or_unknown(&issue.status);
        match by_status.iter_mut().find(|s| s.status == status) {
            Some(entry) => entry.count += 1,
            None => by_status.push(StatusCount {
                status: status.to_string(),
                count: 1,
            }),
        }
    }

    // Stable sort keeps first-seen order between equal totals
    let mut ranked: Vec<&TypeStats> = by_type.iter().collect();
    ranked.sort_by(|a, b| b.total.cmp(&a.total));
    let top_types = ranked
        .into_iter()
        .take(TOP_TYPES)
        .map(|stats| TypeSummary {
            issue_type: stats.issue_type.clone(),
            total: stats.total,
            completion_rate: percentage(stats.completed, stats.total),
        })
        .collect();

    let weekly_metrics = match samples {
        Some(samples) => samples
            .iter()
            .map(|sample| WeeklyMetric {
                period: sample.period.clone(),
                completed: sample.completed_count,
                story_points: sample.story_points,
            })
            .collect(),
        None => weekly_from_completed(&buckets.completed),
    };

    TrendSummary {
        total_items: all.len(),
        completion_rate: percentage(buckets.completed.len(), all.len()),
        by_type,
        by_status,
        weekly_metrics,
        summary: TrendHighlights {
            top_types,
            active_count: buckets.in_progress.len(),
            new_this_week: buckets.new_issues.len(),
            needs_attention: buckets.needs_attention.len(),
        },
    }
}

fn weekly_from_completed(completed: &[&NormalizedIssue]) -> Vec<WeeklyMetric> {
    let mut weeks: BTreeMap<(i32, u32), WeeklyMetric> = BTreeMap::new();
    for issue in completed {
        let Some(closed) = issue.resolved.or(issue.updated) else {
            continue;
        };
        let week = closed.iso_week();
        let entry = weeks
            .entry((week.year(), week.week()))
            .or_insert_with(|| WeeklyMetric {
                period: format!("{}-W{:02}", week.year(), week.week()),
                completed: 0,
                story_points: 0.0,
            });
        entry.completed += 1;
        entry.story_points += issue.story_points.unwrap_or(0.0);
    }
    weeks.into_values().collect()
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

/// Average throughput and its direction over a series of periods
pub fn calculate_velocity(samples: &[VelocitySample]) -> VelocityMetrics {
    if samples.is_empty() {
        return VelocityMetrics {
            average: 0.0,
            unit: "items".to_string(),
            trend: VelocityTrend::NoData,
            data: Vec::new(),
        };
    }

    // One positive sample switches the whole series to story points
    let use_points = samples.iter().any(|s| s.story_points > 0.0);
    let values: Vec<f64> = samples
        .iter()
        .map(|s| {
            if use_points {
                s.story_points
            } else {
                f64::from(s.completed_count)
            }
        })
        .collect();

    let mut trend = VelocityTrend::Stable;
    if values.len() > RECENT_PERIODS {
        let (older, recent) = values.split_at(values.len() - RECENT_PERIODS);
        let recent_mean = mean(recent);
        let older_mean = mean(older);
        if recent_mean > older_mean * INCREASE_RATIO {
            trend = VelocityTrend::Increasing;
        } else if recent_mean < older_mean * DECREASE_RATIO {
            trend = VelocityTrend::Decreasing;
        }
    }

    VelocityMetrics {
        average: round_one_decimal(mean(&values)),
        unit: if use_points { "story points" } else { "items" }.to_string(),
        trend,
        data: samples
            .iter()
            .zip(&values)
            .map(|(sample, value)| VelocityPoint {
                period: sample.period.clone(),
                value: *value,
            })
            .collect(),
    }
}
