//! Allocation and node records as delivered by the scheduler API.
//!
//! Field names follow the scheduler's JSON (PascalCase). Records are immutable
//! snapshots; nothing in the crate mutates them after loading.

use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize};

/// Length of the abbreviated allocation id shown in tables
pub const SHORT_ID_LEN: usize = 8;

/// Placeholder shown when a task group index cannot be extracted
pub const MISSING_INDEX: &str = "?";

/// Client-side lifecycle status of an allocation.
///
/// Unrecognized values are kept verbatim in `Unknown` so one odd record
/// never fails a whole snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum ClientStatus {
    Running,
    Complete,
    #[default]
    Pending,
    Lost,
    Failed,
    Unknown(String),
}

impl ClientStatus {
    /// Statuses offered by the status filter menu, in menu order
    pub const KNOWN: [ClientStatus; 5] = [
        ClientStatus::Running,
        ClientStatus::Complete,
        ClientStatus::Pending,
        ClientStatus::Lost,
        ClientStatus::Failed,
    ];

    /// Status text as it appears in the API and in the `status` query parameter.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Running => "running",
            Self::Complete => "complete",
            Self::Pending => "pending",
            Self::Lost => "lost",
            Self::Failed => "failed",
            Self::Unknown(raw) => raw,
        }
    }

    /// Capitalized label for menus.
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Running => "Running",
            Self::Complete => "Complete",
            Self::Pending => "Pending",
            Self::Lost => "Lost",
            Self::Failed => "Failed",
            Self::Unknown(raw) => raw,
        }
    }

    /// Single-character status glyph for the icon column.
    #[must_use]
    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Running => "●",
            Self::Complete => "✓",
            Self::Pending => "◌",
            Self::Lost => "?",
            Self::Failed => "✗",
            Self::Unknown(_) => "·",
        }
    }
}

impl From<String> for ClientStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "running" => Self::Running,
            "complete" => Self::Complete,
            "pending" => Self::Pending,
            "lost" => Self::Lost,
            "failed" => Self::Failed,
            _ => Self::Unknown(value),
        }
    }
}

impl From<ClientStatus> for String {
    fn from(value: ClientStatus) -> Self {
        value.as_str().to_string()
    }
}

impl std::fmt::Display for ClientStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An allocation: one placed instance of a job's task group.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Allocation {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "JobID", default)]
    pub job_id: String,

    #[serde(rename = "TaskGroup", default)]
    pub task_group: String,

    /// Instance name with the embedded index, e.g. `web.frontend[3]`
    #[serde(rename = "Name", default)]
    pub name: String,

    /// Node the allocation is placed on; `None` while unplaced
    #[serde(
        rename = "NodeID",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub node_id: Option<String>,

    #[serde(rename = "ClientStatus", default)]
    pub client_status: ClientStatus,

    /// Creation time in Unix nanoseconds
    #[serde(rename = "CreateTime", default)]
    pub create_time: i64,
}

impl Allocation {
    /// Abbreviated id for table display.
    #[must_use]
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(SHORT_ID_LEN) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }

    /// Instance index embedded in `name`, or `None` if it has no digits.
    #[must_use]
    pub fn task_group_index(&self) -> Option<&str> {
        task_group_index(&self.name)
    }

    /// `"<TaskGroup> (#<index>)"`, with a placeholder index when none is found.
    #[must_use]
    pub fn task_group_label(&self) -> String {
        format!(
            "{} (#{})",
            self.task_group,
            self.task_group_index().unwrap_or(MISSING_INDEX)
        )
    }

    /// Creation time as a timestamp, if `create_time` is set.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        if self.create_time <= 0 {
            return None;
        }
        Some(DateTime::from_timestamp_nanos(self.create_time))
    }

    /// Seconds elapsed between creation and `now`; `None` if unknown.
    #[must_use]
    pub fn age_seconds(&self, now: DateTime<Utc>) -> Option<u64> {
        let created = self.created_at()?;
        let secs = now.signed_duration_since(created).num_seconds();
        Some(secs.max(0) as u64)
    }
}

/// A worker node (scheduler client).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Node {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Name", default)]
    pub name: String,
}

/// Extract the first run of ASCII digits from an allocation name.
///
/// `web.frontend[3]` yields `3`; a name without digits yields `None`.
#[must_use]
pub fn task_group_index(name: &str) -> Option<&str> {
    static DIGITS: OnceLock<Option<Regex>> = OnceLock::new();
    let re = DIGITS.get_or_init(|| Regex::new(r"\d+").ok()).as_ref()?;
    re.find(name).map(|m| m.as_str())
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_allocation() {
        let json = r#"{
            "ID": "5b1c2f6e-aaaa-bbbb-cccc-000000000001",
            "JobID": "web",
            "TaskGroup": "frontend",
            "Name": "web.frontend[2]",
            "NodeID": "node-1",
            "ClientStatus": "running",
            "CreateTime": 1700000000000000000,
            "DesiredStatus": "run"
        }"#;
        let alloc: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(alloc.job_id, "web");
        assert_eq!(alloc.node_id.as_deref(), Some("node-1"));
        assert_eq!(alloc.client_status, ClientStatus::Running);
        assert_eq!(alloc.short_id(), "5b1c2f6e");
    }

    #[test]
    fn test_empty_node_id_is_none() {
        let json = r#"{"ID": "a1", "NodeID": "", "ClientStatus": "pending"}"#;
        let alloc: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(alloc.node_id, None);

        let json = r#"{"ID": "a2"}"#;
        let alloc: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(alloc.node_id, None);
        assert_eq!(alloc.client_status, ClientStatus::Pending);
    }

    #[test]
    fn test_unknown_status_is_preserved() {
        let json = r#"{"ID": "a1", "ClientStatus": "evicted"}"#;
        let alloc: Allocation = serde_json::from_str(json).unwrap();
        assert_eq!(alloc.client_status, ClientStatus::Unknown("evicted".to_string()));
        assert_eq!(alloc.client_status.as_str(), "evicted");
    }

    #[test]
    fn test_task_group_index() {
        assert_eq!(task_group_index("web.frontend[3]"), Some("3"));
        assert_eq!(task_group_index("web.frontend[12]"), Some("12"));
        assert_eq!(task_group_index("g.1[0]"), Some("1"));
        assert_eq!(task_group_index("no-digits-here"), None);
        assert_eq!(task_group_index(""), None);
    }

    #[test]
    fn test_task_group_label_fallback() {
        let alloc = Allocation {
            id: "a1".to_string(),
            job_id: "web".to_string(),
            task_group: "frontend".to_string(),
            name: "web.frontend".to_string(),
            node_id: None,
            client_status: ClientStatus::Running,
            create_time: 0,
        };
        assert_eq!(alloc.task_group_label(), "frontend (#?)");
    }

    #[test]
    fn test_short_id_of_short_value() {
        let alloc: Allocation = serde_json::from_str(r#"{"ID": "abc"}"#).unwrap();
        assert_eq!(alloc.short_id(), "abc");
    }

    #[test]
    fn test_age_seconds() {
        let created = DateTime::from_timestamp(1_700_000_000, 0).unwrap();
        let alloc = Allocation {
            id: "a1".to_string(),
            job_id: String::new(),
            task_group: String::new(),
            name: String::new(),
            node_id: None,
            client_status: ClientStatus::Running,
            create_time: created.timestamp_nanos_opt().unwrap(),
        };
        let now = DateTime::from_timestamp(1_700_000_090, 0).unwrap();
        assert_eq!(alloc.age_seconds(now), Some(90));

        let unset = Allocation { create_time: 0, ..alloc };
        assert_eq!(unset.age_seconds(now), None);
    }
}
