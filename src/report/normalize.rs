use super::model::{Ancestry, IssueRef, NormalizedIssue};
use crate::tracker::types::{RawIssue, RawLinkedIssue};
use chrono::{DateTime, NaiveDate, Utc};

pub const DEFAULT_EPIC_LINK_FIELD: &str = "customfield_10014";
pub const DEFAULT_STORY_POINTS_FIELD: &str = "customfield_10016";

/// Settings the normalizer needs from the tracker side
#[derive(Debug, Clone)]
pub struct NormalizeContext {
    pub base_url: String,
    pub epic_link_field: String,
    pub story_points_field: String,
}

impl Default for NormalizeContext {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            epic_link_field: DEFAULT_EPIC_LINK_FIELD.to_string(),
            story_points_field: DEFAULT_STORY_POINTS_FIELD.to_string(),
        }
    }
}

impl NormalizeContext {
    pub fn browse_url(&self, key: &str) -> String {
        format!("{}/browse/{}", self.base_url.trim_end_matches('/'), key)
    }

    fn issue_ref(&self, linked: &RawLinkedIssue) -> IssueRef {
        IssueRef {
            key: linked.key.clone(),
            summary: linked.summary(),
            url: self.browse_url(&linked.key),
        }
    }
}

/// One way of finding a related issue in a raw record.
///
/// Strategies are tried in order and the first `Some` wins.
pub trait RefStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, raw: &RawIssue, ctx: &NormalizeContext) -> Option<IssueRef>;
}

/// The dedicated `parent` field
pub struct ParentField;

impl RefStrategy for ParentField {
    fn name(&self) -> &'static str {
        "parent-field"
    }

    fn extract(&self, raw: &RawIssue, ctx: &NormalizeContext) -> Option<IssueRef> {
        raw.fields.parent.as_ref().map(|parent| ctx.issue_ref(parent))
    }
}

/// The `epic` object the agile board endpoint attaches to each issue
pub struct AgileEpicField;

impl RefStrategy for AgileEpicField {
    fn name(&self) -> &'static str {
        "agile-epic-field"
    }

    fn extract(&self, raw: &RawIssue, ctx: &NormalizeContext) -> Option<IssueRef> {
        raw.fields.epic.as_ref().map(|epic| IssueRef {
            key: epic.key.clone(),
            summary: epic
                .summary
                .clone()
                .or_else(|| epic.name.clone())
                .unwrap_or_default(),
            url: ctx.browse_url(&epic.key),
        })
    }
}

/// Classic "Epic Link" custom field, which only carries the epic key
pub struct EpicLinkField;

impl RefStrategy for EpicLinkField {
    fn name(&self) -> &'static str {
        "epic-link-field"
    }

    fn extract(&self, raw: &RawIssue, ctx: &NormalizeContext) -> Option<IssueRef> {
        let key = raw
            .fields
            .extra
            .get(&ctx.epic_link_field)
            .and_then(|value| value.as_str())
            .filter(|key| !key.is_empty())?;

        Some(IssueRef {
            key: key.to_string(),
            summary: String::new(),
            url: ctx.browse_url(key),
        })
    }
}

/// First upward relationship link whose type mentions any of the needles
pub struct LinkTypeMatch {
    label: &'static str,
    needles: &'static [&'static str],
}

impl LinkTypeMatch {
    pub const fn new(label: &'static str, needles: &'static [&'static str]) -> Self {
        Self { label, needles }
    }
}

impl RefStrategy for LinkTypeMatch {
    fn name(&self) -> &'static str {
        self.label
    }

    fn extract(&self, raw: &RawIssue, ctx: &NormalizeContext) -> Option<IssueRef> {
        raw.fields
            .issuelinks
            .iter()
            .filter(|link| self.needles.iter().any(|needle| link.link_type.mentions(needle)))
            .find_map(|link| link.upward_issue())
            .map(|linked| ctx.issue_ref(linked))
    }
}

fn run_chain(
    strategies: &[Box<dyn RefStrategy>],
    raw: &RawIssue,
    ctx: &NormalizeContext,
) -> Option<IssueRef> {
    strategies.iter().find_map(|strategy| {
        let found = strategy.extract(raw, ctx);
        if let Some(ref found) = found {
            tracing::trace!(issue = %raw.key, strategy = strategy.name(), related = %found.key, "Resolved related issue");
        }
        found
    })
}

/// Maps raw tracker records into [`NormalizedIssue`]s
pub struct Normalizer {
    ctx: NormalizeContext,
    parent_strategies: Vec<Box<dyn RefStrategy>>,
    initiative_strategies: Vec<Box<dyn RefStrategy>>,
    outcome_strategies: Vec<Box<dyn RefStrategy>>,
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(NormalizeContext::default())
    }
}

impl Normalizer {
    pub fn new(ctx: NormalizeContext) -> Self {
        Self {
            ctx,
            parent_strategies: vec![
                Box::new(ParentField),
                Box::new(AgileEpicField),
                Box::new(EpicLinkField),
                Box::new(LinkTypeMatch::new("epic-or-parent-link", &["epic", "parent"])),
            ],
            initiative_strategies: vec![Box::new(LinkTypeMatch::new(
                "initiative-link",
                &["initiative"],
            ))],
            outcome_strategies: vec![Box::new(LinkTypeMatch::new("outcome-link", &["outcome"]))],
        }
    }

    pub fn context(&self) -> &NormalizeContext {
        &self.ctx
    }

    pub fn normalize(&self, raw: &RawIssue) -> NormalizedIssue {
        let fields = &raw.fields;

        let parent = run_chain(&self.parent_strategies, raw, &self.ctx);
        let ancestry = Ancestry {
            initiative: run_chain(&self.initiative_strategies, raw, &self.ctx),
            outcome: run_chain(&self.outcome_strategies, raw, &self.ctx),
        };

        let story_points = fields
            .extra
            .get(&self.ctx.story_points_field)
            .and_then(|value| value.as_f64());

        NormalizedIssue {
            key: raw.key.clone(),
            summary: fields.summary.clone().unwrap_or_default(),
            status: fields
                .status
                .as_ref()
                .and_then(|s| s.name.clone())
                .unwrap_or_default(),
            assignee: fields.assignee.as_ref().and_then(|user| {
                user.display_name.clone().or_else(|| user.name.clone())
            }),
            priority: fields
                .priority
                .as_ref()
                .and_then(|p| p.name.clone())
                .unwrap_or_else(|| "None".to_string()),
            issue_type: fields
                .issuetype
                .as_ref()
                .and_then(|t| t.name.clone())
                .unwrap_or_default(),
            created: fields.created.as_deref().and_then(parse_timestamp),
            updated: fields.updated.as_deref().and_then(parse_timestamp),
            resolution: fields.resolution.as_ref().and_then(|r| r.name.clone()),
            resolved: fields.resolutiondate.as_deref().and_then(parse_timestamp),
            story_points,
            labels: fields.labels.clone(),
            url: self.ctx.browse_url(&raw.key),
            parent,
            ancestry: if ancestry.is_empty() { None } else { Some(ancestry) },
        }
    }

    pub fn normalize_all(&self, raw_issues: &[RawIssue]) -> Vec<NormalizedIssue> {
        raw_issues.iter().map(|raw| self.normalize(raw)).collect()
    }
}

/// Normalize with default field ids and no base URL
pub fn normalize(raw: &RawIssue) -> NormalizedIssue {
    Normalizer::default().normalize(raw)
}

/// Parse the tracker's timestamp format (`2024-01-15T10:30:00.000+0000`),
/// RFC 3339, or a bare date. Anything else is treated as missing.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    if let Ok(parsed) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(parsed.with_timezone(&Utc));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
