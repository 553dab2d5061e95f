use super::templates::{escape_html, fill, DEFAULT_TEMPLATE};
use super::{RenderError, TemplateCache};
use crate::report::{Buckets, EpicGroup, NormalizedIssue, ReportData};

fn link(issue: &NormalizedIssue) -> String {
    if issue.url.is_empty() {
        escape_html(&issue.key)
    } else {
        format!("<a href=\"{}\">{}</a>", escape_html(&issue.url), escape_html(&issue.key))
    }
}

fn issue_rows(issues: &[&NormalizedIssue]) -> String {
    issues
        .iter()
        .map(|issue| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                link(issue),
                escape_html(&issue.summary),
                escape_html(&issue.issue_type),
                escape_html(&issue.status),
                escape_html(issue.assignee.as_deref().unwrap_or("Unassigned"))
            )
        })
        .collect()
}

fn issue_table(title: &str, issues: &[&NormalizedIssue]) -> String {
    if issues.is_empty() {
        return String::new();
    }
    format!(
        "<h3>{} ({})</h3>\n<table><tr><th>Key</th><th>Summary</th><th>Type</th><th>Status</th><th>Assignee</th></tr>\n{}</table>\n",
        title,
        issues.len(),
        issue_rows(issues)
    )
}

fn level_section(buckets: &Buckets<'_>) -> String {
    if buckets.is_empty() {
        return "<p><em>Nothing to report.</em></p>".to_string();
    }
    let mut html = String::new();
    html.push_str(&issue_table("Completed", &buckets.completed));
    html.push_str(&issue_table("In Progress", &buckets.in_progress));
    html.push_str(&issue_table("New", &buckets.new_issues));
    if !buckets.needs_attention.is_empty() {
        html.push_str(&format!(
            "<h3>Needs Attention ({})</h3>\n<table><tr><th>Key</th><th>Summary</th><th>Reason</th><th>Last updated</th></tr>\n",
            buckets.needs_attention.len()
        ));
        for item in &buckets.needs_attention {
            html.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td class=\"reason\">{}</td><td>{}</td></tr>\n",
                link(item.issue),
                escape_html(&item.issue.summary),
                escape_html(&item.reason),
                escape_html(&item.last_updated)
            ));
        }
        html.push_str("</table>\n");
    }
    html
}

fn epic_section(groups: &[EpicGroup<'_>], unassociated: usize) -> String {
    if groups.is_empty() {
        return "<p><em>No epics referenced by the issues in this report.</em></p>".to_string();
    }
    let mut html = String::new();
    for group in groups {
        let epic = &group.epic;
        let title = if epic.url.is_empty() {
            escape_html(&epic.key)
        } else {
            format!("<a href=\"{}\">{}</a>", escape_html(&epic.url), escape_html(&epic.key))
        };
        let progress = epic
            .progress
            .map(|p| format!("{}/{} done ({}%)", p.completed, p.total, p.percentage))
            .unwrap_or_default();
        html.push_str(&format!(
            "<div class=\"epic\"><strong>{} {}</strong> <span class=\"progress\">{} &middot; {} &middot; {}</span>\n",
            title,
            escape_html(&epic.title),
            escape_html(&epic.status),
            escape_html(&epic.priority),
            progress
        ));
        if let Some(ancestry) = &group.ancestry {
            for (label, reference) in [("Initiative", &ancestry.initiative), ("Outcome", &ancestry.outcome)] {
                if let Some(reference) = reference {
                    html.push_str(&format!(
                        "<div>{}: {} {}</div>\n",
                        label,
                        escape_html(&reference.key),
                        escape_html(&reference.summary)
                    ));
                }
            }
        }
        html.push_str("<ul>\n");
        for issue in &group.related_issues {
            html.push_str(&format!(
                "<li>{} {} <em>{}</em></li>\n",
                link(issue),
                escape_html(&issue.summary),
                escape_html(&issue.status)
            ));
        }
        html.push_str("</ul></div>\n");
    }
    if unassociated > 0 {
        html.push_str(&format!("<p><em>{unassociated} issues are not linked to an epic.</em></p>\n"));
    }
    html
}

/// Fill the report template with escaped values and pre-built fragments
pub fn render_html(report: &ReportData<'_>, templates: &mut TemplateCache) -> Result<String, RenderError> {
    let trends = &report.trends;
    let velocity = &report.velocity;
    let breakdown = &report.breakdown;

    let top_types = if trends.summary.top_types.is_empty() {
        "<p><em>No stories, tasks or bugs in range.</em></p>".to_string()
    } else {
        let rows: String = trends
            .summary
            .top_types
            .iter()
            .map(|t| {
                format!(
                    "<tr><td>{}</td><td>{}</td><td>{}%</td></tr>\n",
                    escape_html(&t.issue_type),
                    t.total,
                    t.completion_rate
                )
            })
            .collect();
        format!("<table><tr><th>Type</th><th>Total</th><th>Completion</th></tr>\n{rows}</table>")
    };

    let velocity_table = if velocity.data.is_empty() {
        "<p><em>No data available.</em></p>".to_string()
    } else {
        let rows: String = velocity
            .data
            .iter()
            .map(|p| format!("<tr><td>{}</td><td>{}</td></tr>\n", escape_html(&p.period), p.value))
            .collect();
        format!("<table><tr><th>Period</th><th>{}</th></tr>\n{rows}</table>", escape_html(&velocity.unit))
    };

    let values = [
        ("project", escape_html(&report.project)),
        ("generated_at", report.generated_at.format("%Y-%m-%d %H:%M UTC").to_string()),
        ("lookback_days", report.lookback_days.to_string()),
        ("total_issues", report.total_issues.to_string()),
        ("completion_rate", trends.completion_rate.to_string()),
        ("active_count", trends.summary.active_count.to_string()),
        ("new_this_week", trends.summary.new_this_week.to_string()),
        ("needs_attention", trends.summary.needs_attention.to_string()),
        ("velocity_average", velocity.average.to_string()),
        ("velocity_unit", escape_html(&velocity.unit)),
        ("velocity_trend", velocity.trend.to_string()),
        ("completed_percentage", breakdown.completed_percentage.to_string()),
        ("in_progress_percentage", breakdown.in_progress_percentage.to_string()),
        ("attention_percentage", breakdown.attention_percentage.to_string()),
        ("top_types", top_types),
        (
            "epics",
            epic_section(&report.grouping.epics_with_issues, report.grouping.unassociated_issues.len()),
        ),
        ("top_level", level_section(&report.categorized.top_level)),
        ("sub_level", level_section(&report.categorized.sub_level.buckets)),
        ("velocity_table", velocity_table),
    ];

    let template = templates.get(DEFAULT_TEMPLATE)?;
    Ok(fill(template, &values))
}
