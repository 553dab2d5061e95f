use super::categorize::is_completed;
use super::model::{EpicGroup, EpicProgress, EpicSummary, NormalizedIssue, ParentGrouping};
use std::collections::HashMap;

/// Group issues under their parent ("Epic").
///
/// Where an issue is listed depends only on its own parent reference:
/// under that parent's group, or in `unassociated_issues` when it has
/// none. Duplicated keys are dropped silently, first occurrence wins.
/// Afterwards every group whose parent record is in the input takes its
/// status, priority and assignee from that record, wherever it appears.
/// Groups keep first-encounter order of their parent key and related
/// issues keep input order.
pub fn group_by_parent(issues: &[NormalizedIssue]) -> ParentGrouping<'_> {
    let mut grouping = ParentGrouping::default();
    let mut group_index: HashMap<String, usize> = HashMap::new();
    let mut records: HashMap<&str, &NormalizedIssue> = HashMap::new();

    for issue in issues {
        if records.contains_key(issue.key.as_str()) {
            tracing::debug!(issue = %issue.key, "Skipping duplicate issue");
            continue;
        }
        records.insert(issue.key.as_str(), issue);

        let Some(parent) = &issue.parent else {
            grouping.unassociated_issues.push(issue);
            continue;
        };

        let slot = find_or_create(&mut grouping, &mut group_index, &parent.key, || EpicSummary {
            key: parent.key.clone(),
            title: parent.summary.clone(),
            url: parent.url.clone(),
            status: "Unknown".to_string(),
            priority: "None".to_string(),
            assignee: None,
            progress: None,
        });
        let group = &mut grouping.epics_with_issues[slot];
        // A record naming itself as parent is the epic, not its work
        if issue.key == group.epic.key || group.related_issues.iter().any(|r| r.key == issue.key) {
            continue;
        }
        if group.ancestry.is_none() {
            group.ancestry = issue.ancestry.clone().filter(|a| !a.is_empty());
        }
        group.related_issues.push(issue);
    }

    for group in &mut grouping.epics_with_issues {
        if let Some(record) = records.get(group.epic.key.as_str()) {
            absorb_epic(&mut group.epic, record);
        }
        group.epic.progress = Some(progress_of(&group.related_issues));
    }

    tracing::debug!(
        groups = grouping.epics_with_issues.len(),
        unassociated = grouping.unassociated_issues.len(),
        "Grouped issues by parent"
    );

    grouping
}

fn find_or_create<'a>(
    grouping: &mut ParentGrouping<'a>,
    index: &mut HashMap<String, usize>,
    key: &str,
    summary: impl FnOnce() -> EpicSummary,
) -> usize {
    if let Some(&slot) = index.get(key) {
        return slot;
    }
    grouping.epics_with_issues.push(EpicGroup {
        epic: summary(),
        ancestry: None,
        related_issues: Vec::new(),
    });
    let slot = grouping.epics_with_issues.len() - 1;
    index.insert(key.to_string(), slot);
    slot
}

/// The epic's own record is authoritative for its metadata
fn absorb_epic(epic: &mut EpicSummary, issue: &NormalizedIssue) {
    epic.status = issue.status.clone();
    epic.priority = issue.priority.clone();
    epic.assignee = issue.assignee.clone();
    if !issue.summary.is_empty() {
        epic.title = issue.summary.clone();
    }
    if !issue.url.is_empty() {
        epic.url = issue.url.clone();
    }
}

pub fn progress_of(related: &[&NormalizedIssue]) -> EpicProgress {
    let total = related.len();
    let completed = related.iter().filter(|issue| is_completed(issue)).count();
    EpicProgress {
        total,
        completed,
        percentage: super::percentage(completed, total),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::{Ancestry, IssueRef};

    fn child(key: &str, parent: Option<&str>) -> NormalizedIssue {
        let mut issue = NormalizedIssue::new(key, format!("Work {key}"));
        issue.issue_type = "Story".to_string();
        issue.status = "To Do".to_string();
        issue.parent = parent.map(|p| IssueRef {
            key: p.to_string(),
            summary: format!("Epic {p}"),
            url: format!("https://tracker.example.com/browse/{p}"),
        });
        issue
    }

    fn epic(key: &str) -> NormalizedIssue {
        let mut issue = NormalizedIssue::new(key, format!("Epic {key} (own record)"));
        issue.issue_type = "Epic".to_string();
        issue.status = "In Progress".to_string();
        issue.priority = "High".to_string();
        issue.assignee = Some("Sam Rivera".to_string());
        issue
    }

    #[test]
    fn test_epic_record_is_absorbed_into_group() {
        let issues = vec![
            child("S-1", Some("E-1")),
            child("S-2", Some("E-1")),
            epic("E-1"),
            child("S-3", Some("E-1")),
        ];

        let grouping = group_by_parent(&issues);
        assert_eq!(grouping.epics_with_issues.len(), 1);
        let group = &grouping.epics_with_issues[0];
        assert_eq!(group.epic.key, "E-1");
        assert_eq!(group.related_issues.len(), 3);
        assert!(group.related_issues.iter().all(|i| i.key != "E-1"));
        assert_eq!(group.epic.status, "In Progress");
        assert_eq!(group.epic.priority, "High");
        assert_eq!(group.epic.assignee.as_deref(), Some("Sam Rivera"));
        // The epic has no parent of its own, so it is listed as unassociated
        let unassociated: Vec<&str> = grouping.unassociated_issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(unassociated, vec!["E-1"]);
    }

    #[test]
    fn test_story_with_subtasks_stays_under_its_epic() {
        let mut story = child("S-1", Some("E-1"));
        story.status = "In Review".to_string();
        story.priority = "Medium".to_string();
        let mut subtask = child("ST-1", Some("S-1"));
        subtask.status = "Done".to_string();
        subtask.resolution = Some("Done".to_string());
        let issues = vec![epic("E-1"), story, subtask];

        let grouping = group_by_parent(&issues);
        let keys: Vec<&str> = grouping.epics_with_issues.iter().map(|g| g.epic.key.as_str()).collect();
        assert_eq!(keys, vec!["E-1", "S-1"]);

        let epic_group = &grouping.epics_with_issues[0];
        assert_eq!(epic_group.related_issues.len(), 1);
        assert_eq!(epic_group.related_issues[0].key, "S-1");
        assert_eq!(epic_group.epic.progress.unwrap().total, 1);
        assert_eq!(epic_group.epic.status, "In Progress");

        let story_group = &grouping.epics_with_issues[1];
        assert_eq!(story_group.related_issues[0].key, "ST-1");
        assert_eq!(story_group.epic.status, "In Review");
        assert_eq!(story_group.epic.priority, "Medium");
        assert_eq!(story_group.epic.progress.unwrap().percentage, 100);

        let unassociated: Vec<&str> = grouping.unassociated_issues.iter().map(|i| i.key.as_str()).collect();
        assert_eq!(unassociated, vec!["E-1"]);
    }

    #[test]
    fn test_story_listed_once_without_epic_record() {
        let issues = vec![child("S-1", Some("E-1")), child("ST-1", Some("S-1"))];

        let grouping = group_by_parent(&issues);
        assert_eq!(grouping.epics_with_issues.len(), 2);
        assert_eq!(grouping.epics_with_issues[0].epic.key, "E-1");
        assert_eq!(grouping.epics_with_issues[0].related_issues[0].key, "S-1");
        assert_eq!(grouping.epics_with_issues[0].epic.status, "Unknown");
        assert_eq!(grouping.epics_with_issues[1].related_issues[0].key, "ST-1");
        assert!(grouping.unassociated_issues.is_empty());
    }

    #[test]
    fn test_self_referencing_record_is_not_its_own_work() {
        let mut looped = epic("E-5");
        looped.parent = Some(IssueRef {
            key: "E-5".to_string(),
            summary: String::new(),
            url: String::new(),
        });
        let issues = vec![looped, child("S-1", Some("E-5"))];

        let grouping = group_by_parent(&issues);
        let group = &grouping.epics_with_issues[0];
        assert_eq!(group.related_issues.len(), 1);
        assert_eq!(group.related_issues[0].key, "S-1");
        assert_eq!(group.epic.title, "Epic E-5 (own record)");
        assert!(grouping.unassociated_issues.is_empty());
    }

    #[test]
    fn test_linked_epic_and_story_both_listed() {
        use crate::report::normalize::normalize;
        use crate::tracker::types::{RawIssue, RawIssueLink, RawLinkType, RawLinkedIssue};

        let link = |inward: Option<&str>, outward: Option<&str>| RawIssueLink {
            link_type: RawLinkType {
                name: Some("Parent-Child".to_string()),
                inward: Some("is child of".to_string()),
                outward: Some("is parent of".to_string()),
            },
            inward_issue: inward.map(|key| RawLinkedIssue {
                key: key.to_string(),
                fields: None,
            }),
            outward_issue: outward.map(|key| RawLinkedIssue {
                key: key.to_string(),
                fields: None,
            }),
        };
        let mut epic_record = RawIssue {
            key: "E-1".to_string(),
            ..Default::default()
        };
        epic_record.fields.issuelinks = vec![link(None, Some("S-1"))];
        let mut story_record = RawIssue {
            key: "S-1".to_string(),
            ..Default::default()
        };
        story_record.fields.issuelinks = vec![link(Some("E-1"), None)];
        let issues = vec![normalize(&epic_record), normalize(&story_record)];

        let grouping = group_by_parent(&issues);
        assert_eq!(grouping.epics_with_issues.len(), 1);
        assert_eq!(grouping.epics_with_issues[0].epic.key, "E-1");
        assert_eq!(grouping.epics_with_issues[0].related_issues[0].key, "S-1");
        assert_eq!(grouping.unassociated_issues[0].key, "E-1");
    }

    #[test]
    fn test_epic_before_children_still_absorbed() {
        let issues = vec![epic("E-2"), child("S-1", Some("E-2"))];

        let grouping = group_by_parent(&issues);
        let group = &grouping.epics_with_issues[0];
        assert_eq!(group.epic.title, "Epic E-2 (own record)");
        assert_eq!(group.related_issues.len(), 1);
    }

    #[test]
    fn test_group_without_epic_record_uses_parent_ref() {
        let issues = vec![child("S-1", Some("E-9"))];

        let group = &group_by_parent(&issues).epics_with_issues[0];
        assert_eq!(group.epic.title, "Epic E-9");
        assert_eq!(group.epic.status, "Unknown");
        assert_eq!(group.epic.priority, "None");
    }

    #[test]
    fn test_duplicates_dropped_first_wins() {
        let mut second = child("S-1", Some("E-2"));
        second.summary = "Duplicate".to_string();
        let issues = vec![child("S-1", Some("E-1")), second, child("S-2", None), child("S-2", None)];

        let grouping = group_by_parent(&issues);
        assert_eq!(grouping.epics_with_issues.len(), 1);
        assert_eq!(grouping.epics_with_issues[0].epic.key, "E-1");
        assert_eq!(grouping.epics_with_issues[0].related_issues.len(), 1);
        assert_eq!(grouping.unassociated_issues.len(), 1);
    }

    #[test]
    fn test_group_and_related_order_follow_input() {
        let issues = vec![
            child("S-1", Some("E-B")),
            child("S-2", Some("E-A")),
            child("S-3", Some("E-B")),
            child("S-4", None),
        ];

        let grouping = group_by_parent(&issues);
        let keys: Vec<&str> = grouping
            .epics_with_issues
            .iter()
            .map(|g| g.epic.key.as_str())
            .collect();
        assert_eq!(keys, vec!["E-B", "E-A"]);
        let related: Vec<&str> = grouping.epics_with_issues[0]
            .related_issues
            .iter()
            .map(|i| i.key.as_str())
            .collect();
        assert_eq!(related, vec!["S-1", "S-3"]);
        assert_eq!(grouping.unassociated_issues[0].key, "S-4");
    }

    #[test]
    fn test_progress_and_ancestry() {
        let mut done = child("S-1", Some("E-1"));
        done.status = "Done".to_string();
        done.resolution = Some("Done".to_string());
        let mut with_ancestry = child("S-2", Some("E-1"));
        with_ancestry.ancestry = Some(Ancestry {
            initiative: Some(IssueRef {
                key: "INIT-1".to_string(),
                summary: "Platform".to_string(),
                url: String::new(),
            }),
            outcome: None,
        });
        let issues = vec![done, with_ancestry, child("S-3", Some("E-1"))];

        let group = &group_by_parent(&issues).epics_with_issues[0];
        let progress = group.epic.progress.unwrap();
        assert_eq!(progress.total, 3);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percentage, 33);
        assert_eq!(
            group.ancestry.as_ref().and_then(|a| a.initiative.as_ref()).map(|i| i.key.as_str()),
            Some("INIT-1")
        );
    }

    #[test]
    fn test_every_key_appears_once() {
        let issues = vec![
            child("S-1", Some("E-1")),
            child("S-2", None),
            child("S-1", None),
            epic("E-1"),
        ];

        let grouping = group_by_parent(&issues);
        let mut keys: Vec<&str> = grouping
            .epics_with_issues
            .iter()
            .flat_map(|g| g.related_issues.iter().map(|i| i.key.as_str()))
            .chain(grouping.unassociated_issues.iter().map(|i| i.key.as_str()))
            .collect();
        keys.sort();
        assert_eq!(keys, vec!["E-1", "S-1", "S-2"]);
    }
}
