use crate::report::ReportData;

const HEADER: [&str; 11] = [
    "key",
    "summary",
    "type",
    "status",
    "priority",
    "assignee",
    "parent",
    "created",
    "updated",
    "story_points",
    "categories",
];

fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// One row per issue; `categories` lists every bucket the issue landed in, `;`-separated
pub fn render_csv(report: &ReportData<'_>) -> String {
    let mut out = String::new();
    out.push_str(&HEADER.join(","));
    out.push('\n');

    for issue in report.issues {
        let categories: Vec<String> = report
            .categorized
            .categories_of(&issue.key)
            .iter()
            .map(|c| c.to_string())
            .collect();
        let row = [
            issue.key.clone(),
            issue.summary.clone(),
            issue.issue_type.clone(),
            issue.status.clone(),
            issue.priority.clone(),
            issue.assignee.clone().unwrap_or_default(),
            issue.parent.as_ref().map(|p| p.key.clone()).unwrap_or_default(),
            issue.created.map(|t| t.to_rfc3339()).unwrap_or_default(),
            issue.updated.map(|t| t.to_rfc3339()).unwrap_or_default(),
            issue.story_points.map(|p| p.to_string()).unwrap_or_default(),
            categories.join(";"),
        ];
        let escaped: Vec<String> = row.iter().map(|v| escape_field(v)).collect();
        out.push_str(&escaped.join(","));
        out.push('\n');
    }
    out
}
