use super::model::{AttentionItem, CategorizedSet, NormalizedIssue};
use chrono::{DateTime, Duration, Utc};

/// Issue types treated as grouping parents rather than units of work
pub const TOP_LEVEL_TYPES: [&str; 3] = ["epic", "initiative", "theme"];

pub const DONE_STATUSES: [&str; 4] = ["done", "resolved", "closed", "fixed"];
pub const ACTIVE_STATUSES: [&str; 4] = ["in progress", "in review", "testing", "code review"];

pub const NEW_WINDOW_DAYS: i64 = 7;
pub const ATTENTION_AFTER_DAYS: i64 = 3;
pub const STALE_AFTER_DAYS: i64 = 7;

pub const REASON_STALE: &str = "Stale (no updates for over a week)";
pub const REASON_NO_RECENT_UPDATES: &str = "No recent updates";

pub fn is_top_level(issue: &NormalizedIssue) -> bool {
    TOP_LEVEL_TYPES
        .iter()
        .any(|t| issue.issue_type.eq_ignore_ascii_case(t))
}

/// Resolved *and* in a done-like status. A resolution alone is not enough.
pub fn is_completed(issue: &NormalizedIssue) -> bool {
    if issue.resolution.is_none() {
        return false;
    }
    let status = issue.status.to_lowercase();
    DONE_STATUSES.iter().any(|done| status.contains(done))
}

pub fn is_in_progress(issue: &NormalizedIssue) -> bool {
    let status = issue.status.to_lowercase();
    ACTIVE_STATUSES.iter().any(|active| status.contains(active))
}

fn is_new(issue: &NormalizedIssue, now: DateTime<Utc>) -> bool {
    issue
        .created
        .map(|created| created > now - Duration::days(NEW_WINDOW_DAYS))
        .unwrap_or(false)
}

/// Which issues the needs-attention test may flag
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AttentionPolicy {
    /// Any quiet issue, including completed ones. Matches the historical reports.
    #[default]
    Inclusive,
    /// Only issues without a resolution
    UnresolvedOnly,
}

/// Returns the attention reason when an issue has gone quiet
fn attention_reason(
    issue: &NormalizedIssue,
    now: DateTime<Utc>,
    policy: AttentionPolicy,
) -> Option<&'static str> {
    if policy == AttentionPolicy::UnresolvedOnly && issue.resolution.is_some() {
        return None;
    }
    let updated = issue.updated?;
    let gap = now - updated;
    if gap <= Duration::days(ATTENTION_AFTER_DAYS) {
        return None;
    }
    if gap > Duration::days(STALE_AFTER_DAYS) {
        Some(REASON_STALE)
    } else {
        Some(REASON_NO_RECENT_UPDATES)
    }
}

fn format_day(timestamp: Option<DateTime<Utc>>) -> String {
    timestamp
        .map(|ts| ts.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

/// Categorize against the current wall-clock time
pub fn categorize(issues: &[NormalizedIssue]) -> CategorizedSet<'_> {
    categorize_at(issues, Utc::now())
}

/// Bucket every issue by level and activity.
///
/// Each test runs independently, so one issue may land in several
/// buckets (e.g. completed and needs-attention). Completion is checked
/// before in-progress and wins when both match.
pub fn categorize_at(issues: &[NormalizedIssue], now: DateTime<Utc>) -> CategorizedSet<'_> {
    categorize_with(issues, now, AttentionPolicy::default())
}

pub fn categorize_with(
    issues: &[NormalizedIssue],
    now: DateTime<Utc>,
    policy: AttentionPolicy,
) -> CategorizedSet<'_> {
    let mut set = CategorizedSet::default();

    for issue in issues {
        let top_level = is_top_level(issue);
        if !top_level {
            set.sub_level.all.push(issue);
        }

        let level = if top_level {
            &mut set.top_level
        } else {
            &mut set.sub_level.buckets
        };
        let legacy = &mut set.legacy;

        if is_new(issue, now) {
            level.new_issues.push(issue);
            legacy.new_issues.push(issue);
        }

        if is_completed(issue) {
            level.completed.push(issue);
            legacy.completed.push(issue);
        } else if is_in_progress(issue) {
            level.in_progress.push(issue);
            legacy.in_progress.push(issue);
        }

        if let Some(reason) = attention_reason(issue, now, policy) {
            let item = AttentionItem {
                issue,
                reason: reason.to_string(),
                last_updated: format_day(issue.updated),
            };
            level.needs_attention.push(item.clone());
            legacy.needs_attention.push(item);
        }
    }

    tracing::debug!(
        total = issues.len(),
        top_level = set.top_level.completed.len() + set.top_level.in_progress.len(),
        sub_level = set.sub_level.all.len(),
        completed = set.legacy.completed.len(),
        in_progress = set.legacy.in_progress.len(),
        new = set.legacy.new_issues.len(),
        needs_attention = set.legacy.needs_attention.len(),
        "Categorized issues"
    );

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::Category;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn issue(key: &str, issue_type: &str, status: &str) -> NormalizedIssue {
        let mut issue = NormalizedIssue::new(key, format!("Issue {key}"));
        issue.issue_type = issue_type.to_string();
        issue.status = status.to_string();
        issue.created = Some(now() - Duration::days(30));
        issue.updated = Some(now() - Duration::hours(1));
        issue
    }

    #[test]
    fn test_done_and_stale_lands_in_completed_and_attention() {
        let mut done = issue("A-1", "Story", "Done");
        done.resolution = Some("Fixed".to_string());
        done.updated = Some(now() - Duration::days(10));
        let issues = vec![done];

        let set = categorize_at(&issues, now());
        assert_eq!(set.legacy.completed.len(), 1);
        assert_eq!(set.legacy.needs_attention.len(), 1);
        assert_eq!(set.legacy.needs_attention[0].reason, REASON_STALE);
        assert_eq!(
            set.categories_of("A-1"),
            vec![Category::Completed, Category::NeedsAttention]
        );

        let strict = categorize_with(&issues, now(), AttentionPolicy::UnresolvedOnly);
        assert_eq!(strict.legacy.completed.len(), 1);
        assert!(strict.legacy.needs_attention.is_empty());
    }

    #[test]
    fn test_done_without_resolution_is_not_completed() {
        let issues = vec![issue("A-2", "Story", "Done")];
        let set = categorize_at(&issues, now());
        assert!(set.legacy.completed.is_empty());
        assert!(set.legacy.in_progress.is_empty());
    }

    #[test]
    fn test_resolution_without_done_status_is_not_completed() {
        let mut review = issue("A-3", "Story", "In Review");
        review.resolution = Some("Won't Do".to_string());
        let issues = vec![review];

        let set = categorize_at(&issues, now());
        assert!(set.legacy.completed.is_empty());
        assert_eq!(set.legacy.in_progress.len(), 1);
    }

    #[test]
    fn test_completion_wins_over_in_progress() {
        let mut both = issue("A-4", "Task", "Done - in review");
        both.resolution = Some("Done".to_string());
        let issues = vec![both];

        let set = categorize_at(&issues, now());
        assert_eq!(set.legacy.completed.len(), 1);
        assert!(set.legacy.in_progress.is_empty());
    }

    #[test]
    fn test_new_issue_only_in_new_bucket() {
        let mut fresh = issue("A-5", "Story", "To Do");
        fresh.created = Some(now() - Duration::days(2));
        fresh.updated = Some(now() - Duration::days(1));
        let issues = vec![fresh];

        let set = categorize_at(&issues, now());
        assert_eq!(set.legacy.new_issues.len(), 1);
        assert!(set.legacy.completed.is_empty());
        assert!(set.legacy.in_progress.is_empty());
        assert!(set.legacy.needs_attention.is_empty());
        assert_eq!(set.categories_of("A-5"), vec![Category::New]);
    }

    #[test]
    fn test_new_window_is_strict() {
        let mut edge = issue("A-6", "Story", "To Do");
        edge.created = Some(now() - Duration::days(7));
        let issues = vec![edge];

        assert!(categorize_at(&issues, now()).legacy.new_issues.is_empty());
    }

    #[test]
    fn test_attention_reasons() {
        let mut quiet = issue("A-7", "Bug", "To Do");
        quiet.updated = Some(now() - Duration::days(5));
        let mut stale = issue("A-8", "Bug", "In Progress");
        stale.updated = Some(now() - Duration::days(9));
        let mut boundary = issue("A-9", "Bug", "To Do");
        boundary.updated = Some(now() - Duration::days(3));
        let issues = vec![quiet, stale, boundary];

        let set = categorize_at(&issues, now());
        let attention = &set.legacy.needs_attention;
        assert_eq!(attention.len(), 2);
        assert_eq!(attention[0].reason, REASON_NO_RECENT_UPDATES);
        assert_eq!(attention[0].last_updated, "2024-06-10");
        assert_eq!(attention[1].reason, REASON_STALE);
        assert_eq!(
            set.categories_of("A-8"),
            vec![Category::InProgress, Category::NeedsAttention]
        );
    }

    #[test]
    fn test_stale_reason_starts_after_seven_days() {
        let mut week = issue("A-10", "Bug", "To Do");
        week.updated = Some(now() - Duration::days(7));
        let mut just_over = issue("A-11", "Bug", "To Do");
        just_over.updated = Some(now() - Duration::days(7) - Duration::seconds(1));
        let mut three_and_a_bit = issue("A-12", "Bug", "To Do");
        three_and_a_bit.updated = Some(now() - Duration::days(3) - Duration::seconds(1));
        let issues = vec![week, just_over, three_and_a_bit];

        let set = categorize_at(&issues, now());
        let reasons: Vec<(&str, &str)> = set
            .legacy
            .needs_attention
            .iter()
            .map(|item| (item.issue.key.as_str(), item.reason.as_str()))
            .collect();
        assert_eq!(
            reasons,
            vec![
                ("A-10", REASON_NO_RECENT_UPDATES),
                ("A-11", REASON_STALE),
                ("A-12", REASON_NO_RECENT_UPDATES),
            ]
        );
    }

    #[test]
    fn test_levels_are_routed_separately() {
        let epic = issue("E-1", "EPIC", "In Progress");
        let theme = issue("T-1", "Theme", "To Do");
        let story = issue("S-1", "Story", "In Progress");
        let issues = vec![epic, theme, story];

        let set = categorize_at(&issues, now());
        assert_eq!(set.top_level.in_progress.len(), 1);
        assert_eq!(set.top_level.in_progress[0].key, "E-1");
        assert_eq!(set.sub_level.buckets.in_progress.len(), 1);
        assert_eq!(set.sub_level.all.len(), 1);
        assert_eq!(set.legacy.in_progress.len(), 2);
    }

    #[test]
    fn test_missing_timestamps_do_not_panic() {
        let mut blank = NormalizedIssue::new("B-1", "");
        blank.created = None;
        blank.updated = None;
        let issues = vec![blank];

        let set = categorize_at(&issues, now());
        assert!(set.legacy.is_empty());
        assert_eq!(set.sub_level.all.len(), 1);
    }

    #[test]
    fn test_output_references_input_and_is_idempotent() {
        let mut done = issue("C-1", "Story", "Closed");
        done.resolution = Some("Done".to_string());
        let issues = vec![done, issue("C-2", "Story", "Testing")];

        let first = categorize_at(&issues, now());
        let second = categorize_at(&issues, now());
        assert_eq!(first, second);
        assert!(std::ptr::eq(first.legacy.completed[0], &issues[0]));
        assert!(std::ptr::eq(first.sub_level.all[1], &issues[1]));
    }
}
