use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Issue record as returned by the search or agile board endpoints.
///
/// Every field except `key` is optional because the two endpoints, and
/// different tracker configurations, expose different subsets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssue {
    pub key: String,
    #[serde(rename = "self", default)]
    pub self_url: Option<String>,
    #[serde(default)]
    pub fields: RawFields,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFields {
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub status: Option<RawNamed>,
    #[serde(default)]
    pub assignee: Option<RawUser>,
    #[serde(default)]
    pub priority: Option<RawNamed>,
    #[serde(default)]
    pub issuetype: Option<RawNamed>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub updated: Option<String>,
    #[serde(default)]
    pub resolution: Option<RawNamed>,
    #[serde(default)]
    pub resolutiondate: Option<String>,
    #[serde(default)]
    pub labels: Vec<String>,
    /// Dedicated parent link (next-gen projects, sub-tasks)
    #[serde(default)]
    pub parent: Option<RawLinkedIssue>,
    /// Epic field exposed by the agile board API
    #[serde(default)]
    pub epic: Option<RawAgileEpic>,
    #[serde(default)]
    pub issuelinks: Vec<RawIssueLink>,
    /// Custom fields (`customfield_NNNNN`) and anything else we don't model
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNamed {
    #[serde(default)]
    pub name: Option<String>,
}

impl RawNamed {
    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawUser {
    #[serde(rename = "displayName", default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLinkedIssue {
    pub key: String,
    #[serde(default)]
    pub fields: Option<RawLinkedFields>,
}

impl RawLinkedIssue {
    pub fn summary(&self) -> String {
        self.fields
            .as_ref()
            .and_then(|f| f.summary.clone())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLinkedFields {
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawAgileEpic {
    pub key: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawIssueLink {
    #[serde(rename = "type", default)]
    pub link_type: RawLinkType,
    #[serde(rename = "inwardIssue", default)]
    pub inward_issue: Option<RawLinkedIssue>,
    #[serde(rename = "outwardIssue", default)]
    pub outward_issue: Option<RawLinkedIssue>,
}

impl RawIssueLink {
    /// The issue on the other end of the link, whichever direction it is
    pub fn linked_issue(&self) -> Option<&RawLinkedIssue> {
        self.inward_issue.as_ref().or(self.outward_issue.as_ref())
    }

    /// The issue this record sits under.
    ///
    /// A directional link ("is child of" / "is parent of") read from this
    /// record only points upward through `inwardIssue`. Links without
    /// direction text fall back to whichever side is filled in.
    pub fn upward_issue(&self) -> Option<&RawLinkedIssue> {
        if self.link_type.is_directional() {
            self.inward_issue.as_ref()
        } else {
            self.linked_issue()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawLinkType {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub inward: Option<String>,
    #[serde(default)]
    pub outward: Option<String>,
}

impl RawLinkType {
    /// Case-insensitive substring match against the name and both directions
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        [&self.name, &self.inward, &self.outward]
            .iter()
            .filter_map(|part| part.as_deref())
            .any(|part| part.to_lowercase().contains(&needle))
    }

    pub fn is_directional(&self) -> bool {
        [&self.inward, &self.outward]
            .iter()
            .any(|part| part.as_deref().is_some_and(|text| !text.trim().is_empty()))
    }
}

/// One page of `/rest/api/2/search` or `/rest/agile/1.0/board/{id}/issue`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IssuePage {
    #[serde(rename = "startAt", default)]
    pub start_at: u64,
    #[serde(rename = "maxResults", default)]
    pub max_results: u64,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub issues: Vec<RawIssue>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub id: u64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub board_type: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardPage {
    #[serde(rename = "startAt", default)]
    pub start_at: u64,
    #[serde(rename = "isLast", default)]
    pub is_last: bool,
    #[serde(default)]
    pub values: Vec<Board>,
}
