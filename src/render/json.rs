use super::RenderError;
use crate::report::ReportData;

/// Pretty-printed JSON, the same shape the dashboard API serves
pub fn render_json(report: &ReportData<'_>) -> Result<String, RenderError> {
    Ok(serde_json::to_string_pretty(report)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{NormalizedIssue, ReportBuilder};

    #[test]
    fn test_json_contains_report_sections() {
        let issues = vec![NormalizedIssue::new("APP-1", "First")];
        let report = ReportBuilder::new("APP").build(&issues);
        let value: serde_json::Value = serde_json::from_str(&render_json(&report).unwrap()).unwrap();

        for key in ["categorized", "grouping", "trends", "velocity", "breakdown"] {
            assert!(value.get(key).is_some(), "missing {key}");
        }
        assert_eq!(value["totalIssues"], 1);
        assert!(value.get("issues").is_none());
    }
}
