use crate::report::{Buckets, NormalizedIssue, ReportData};

fn issue_link(issue: &NormalizedIssue) -> String {
    if issue.url.is_empty() {
        issue.key.clone()
    } else {
        format!("[{}]({})", issue.key, issue.url)
    }
}

fn cell(value: &str) -> String {
    value.replace('|', "\\|").replace('\n', " ")
}

fn push_issue_list(out: &mut String, title: &str, issues: &[&NormalizedIssue]) {
    if issues.is_empty() {
        return;
    }
    out.push_str(&format!("### {} ({})\n\n", title, issues.len()));
    for issue in issues {
        let assignee = issue.assignee.as_deref().unwrap_or("Unassigned");
        out.push_str(&format!(
            "- {} {} _{}, {}_\n",
            issue_link(issue),
            cell(&issue.summary),
            cell(&issue.status),
            cell(assignee)
        ));
    }
    out.push('\n');
}

fn push_level(out: &mut String, heading: &str, buckets: &Buckets<'_>) {
    out.push_str(&format!("## {heading}\n\n"));
    if buckets.is_empty() {
        out.push_str("_Nothing to report._\n\n");
        return;
    }
    push_issue_list(out, "Completed", &buckets.completed);
    push_issue_list(out, "In Progress", &buckets.in_progress);
    push_issue_list(out, "New", &buckets.new_issues);

    if !buckets.needs_attention.is_empty() {
        out.push_str(&format!("### Needs Attention ({})\n\n", buckets.needs_attention.len()));
        out.push_str("| Issue | Summary | Reason | Last updated |\n");
        out.push_str("|---|---|---|---|\n");
        for item in &buckets.needs_attention {
            out.push_str(&format!(
                "| {} | {} | {} | {} |\n",
                issue_link(item.issue),
                cell(&item.issue.summary),
                cell(&item.reason),
                cell(&item.last_updated)
            ));
        }
        out.push('\n');
    }
}

/// Plain-text report for wikis and pull request descriptions
pub fn render_markdown(report: &ReportData<'_>) -> String {
    let mut out = String::new();
    let trends = &report.trends;
    let velocity = &report.velocity;
    let breakdown = &report.breakdown;

    out.push_str(&format!("# {} Status Report\n\n", report.project));
    out.push_str(&format!(
        "Generated {} covering the last {} days ({} issues).\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M UTC"),
        report.lookback_days,
        report.total_issues
    ));

    out.push_str("## Summary\n\n");
    out.push_str(&format!("- Completion rate: {}%\n", trends.completion_rate));
    out.push_str(&format!("- Active: {}\n", trends.summary.active_count));
    out.push_str(&format!("- New this week: {}\n", trends.summary.new_this_week));
    out.push_str(&format!("- Needs attention: {}\n", trends.summary.needs_attention));
    out.push_str(&format!(
        "- Velocity: {} {} per period ({})\n",
        velocity.average, velocity.unit, velocity.trend
    ));
    out.push_str(&format!(
        "- Work breakdown: {}% completed, {}% in progress, {}% needs attention\n\n",
        breakdown.completed_percentage, breakdown.in_progress_percentage, breakdown.attention_percentage
    ));

    if !trends.summary.top_types.is_empty() {
        out.push_str("| Type | Total | Completion |\n|---|---|---|\n");
        for t in &trends.summary.top_types {
            out.push_str(&format!("| {} | {} | {}% |\n", cell(&t.issue_type), t.total, t.completion_rate));
        }
        out.push('\n');
    }

    if !report.grouping.epics_with_issues.is_empty() {
        out.push_str("## Epics\n\n");
        for group in &report.grouping.epics_with_issues {
            let epic = &group.epic;
            let progress = epic
                .progress
                .map(|p| format!("{}/{} done ({}%)", p.completed, p.total, p.percentage))
                .unwrap_or_else(|| "no progress data".to_string());
            out.push_str(&format!(
                "### {} {}\n\n{} · {} · {}\n\n",
                epic.key,
                cell(&epic.title),
                cell(&epic.status),
                cell(&epic.priority),
                progress
            ));
            if let Some(ancestry) = &group.ancestry {
                if let Some(initiative) = &ancestry.initiative {
                    out.push_str(&format!("Initiative: {} {}\n\n", initiative.key, cell(&initiative.summary)));
                }
                if let Some(outcome) = &ancestry.outcome {
                    out.push_str(&format!("Outcome: {} {}\n\n", outcome.key, cell(&outcome.summary)));
                }
            }
            for issue in &group.related_issues {
                out.push_str(&format!("- {} {} _{}_\n", issue_link(issue), cell(&issue.summary), cell(&issue.status)));
            }
            out.push('\n');
        }
        if !report.grouping.unassociated_issues.is_empty() {
            out.push_str(&format!(
                "_{} issues are not linked to an epic._\n\n",
                report.grouping.unassociated_issues.len()
            ));
        }
    }

    push_level(&mut out, "Epics & Initiatives", &report.categorized.top_level);
    push_level(&mut out, "Stories, Tasks & Bugs", &report.categorized.sub_level.buckets);

    if !velocity.data.is_empty() {
        out.push_str("## Velocity\n\n| Period | Value |\n|---|---|\n");
        for point in &velocity.data {
            out.push_str(&format!("| {} | {} |\n", cell(&point.period), point.value));
        }
        out.push('\n');
    }

    out
}
