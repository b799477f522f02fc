//! Navigable location, filter query and link targets.
//!
//! Filter state lives in the query string of the current location. Controls
//! never mutate the location in place; they produce a [`NavigationRequest`]
//! carrying the full replacement path and query.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

/// Default path of the allocation list
pub const DEFAULT_PATHNAME: &str = "/allocations";

/// Query path passed to the file browser for allocation logs
pub const LOGS_PATH: &str = "/alloc/logs/";

/// Errors from parsing a location string
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LocationError {
    #[error("invalid percent-encoding at byte {position} in '{input}'")]
    InvalidEscape { input: String, position: usize },

    #[error("percent-encoded bytes in '{0}' are not valid UTF-8")]
    InvalidUtf8(String),

    #[error("location must start with '/', got '{0}'")]
    RelativePath(String),
}

/// Query parameters understood by the allocation filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryKey {
    AllocationId,
    Status,
    Client,
    Job,
}

impl QueryKey {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AllocationId => "allocation_id",
            Self::Status => "status",
            Self::Client => "client",
            Self::Job => "job",
        }
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Current navigation location: a path plus its query mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub pathname: String,
    pub query: BTreeMap<String, String>,
}

impl Default for Location {
    fn default() -> Self {
        Self {
            pathname: DEFAULT_PATHNAME.to_string(),
            query: BTreeMap::new(),
        }
    }
}

impl Location {
    /// Parse `"/path?key=value&..."`. An empty string yields the default location.
    pub fn parse(input: &str) -> Result<Self, LocationError> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(Self::default());
        }

        let (path, query_str) = match input.split_once('?') {
            Some((path, query)) => (path, query),
            None => (input, ""),
        };

        let pathname = if path.is_empty() {
            DEFAULT_PATHNAME.to_string()
        } else if path.starts_with('/') {
            percent_decode(path)?
        } else {
            return Err(LocationError::RelativePath(input.to_string()));
        };

        let mut query = BTreeMap::new();
        for pair in query_str.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            // Last occurrence wins, like a plain object assignment
            query.insert(percent_decode(key)?, percent_decode(value)?);
        }

        Ok(Self { pathname, query })
    }

    /// Value of a query parameter, if present.
    #[must_use]
    pub fn param(&self, key: QueryKey) -> Option<&str> {
        self.query.get(key.as_str()).map(String::as_str)
    }

    /// Request navigation to the same path with `key` set, or removed for `None`.
    /// All other parameters are kept.
    #[must_use]
    pub fn with_param(&self, key: QueryKey, value: Option<&str>) -> NavigationRequest {
        let mut query = self.query.clone();
        match value {
            Some(v) => {
                query.insert(key.as_str().to_string(), v.to_string());
            }
            None => {
                query.remove(key.as_str());
            }
        }
        NavigationRequest {
            pathname: self.pathname.clone(),
            query,
        }
    }

    /// Request navigation to the same path with every filter parameter removed.
    #[must_use]
    pub fn without_filters(&self) -> NavigationRequest {
        let mut query = self.query.clone();
        for key in [QueryKey::AllocationId, QueryKey::Status, QueryKey::Client, QueryKey::Job] {
            query.remove(key.as_str());
        }
        NavigationRequest {
            pathname: self.pathname.clone(),
            query,
        }
    }

    /// The filter-relevant subset of the query.
    #[must_use]
    pub fn filter_query(&self) -> FilterQuery {
        FilterQuery {
            allocation_id: self.param(QueryKey::AllocationId).map(str::to_string),
            status: self.param(QueryKey::Status).map(str::to_string),
            client: self.param(QueryKey::Client).map(str::to_string),
            job: self.param(QueryKey::Job).map(str::to_string),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&encode_path(&self.pathname))?;
        for (i, (key, value)) in self.query.iter().enumerate() {
            let sep = if i == 0 { '?' } else { '&' };
            write!(
                f,
                "{}{}={}",
                sep,
                encode_component(key),
                encode_component(value)
            )?;
        }
        Ok(())
    }
}

/// A request to replace the current location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRequest {
    pub pathname: String,
    pub query: BTreeMap<String, String>,
}

impl NavigationRequest {
    #[must_use]
    pub fn into_location(self) -> Location {
        Location {
            pathname: self.pathname,
            query: self.query,
        }
    }
}

/// Filter values recognized in the query. `None` means "no constraint".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterQuery {
    pub allocation_id: Option<String>,
    pub status: Option<String>,
    pub client: Option<String>,
    pub job: Option<String>,
}

impl FilterQuery {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocation_id.is_none()
            && self.status.is_none()
            && self.client.is_none()
            && self.job.is_none()
    }
}

/// Dashboard views an allocation row links to
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LinkTarget {
    Allocation { alloc_id: String },
    Job { job_id: String },
    TaskGroup { job_id: String, task_group: String },
    Node { node_id: String },
    AllocationLogs { alloc_id: String },
}

impl LinkTarget {
    /// Route of the target view, including its query string.
    #[must_use]
    pub fn route(&self) -> Location {
        let mut query = BTreeMap::new();
        let pathname = match self {
            Self::Allocation { alloc_id } => format!("/allocations/{}", alloc_id),
            Self::Job { job_id } => format!("/jobs/{}", job_id),
            Self::TaskGroup { job_id, task_group } => {
                query.insert("taskGroupId".to_string(), task_group.clone());
                format!("/jobs/{}", job_id)
            }
            Self::Node { node_id } => format!("/clients/{}", node_id),
            Self::AllocationLogs { alloc_id } => {
                query.insert("path".to_string(), LOGS_PATH.to_string());
                format!("/allocations/{}/files", alloc_id)
            }
        };
        Location { pathname, query }
    }

    /// Short human label for toasts.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Allocation { .. } => "allocation",
            Self::Job { .. } => "job",
            Self::TaskGroup { .. } => "task group",
            Self::Node { .. } => "client",
            Self::AllocationLogs { .. } => "logs",
        }
    }
}

/// Decode one query key, value or path. `+` is a space; a `%` must start a
/// two-digit hex escape and the decoded bytes must be UTF-8.
fn percent_decode(input: &str) -> Result<String, LocationError> {
    let bytes = input.as_bytes();
    if let Some(position) = bytes.iter().enumerate().position(|(i, &b)| {
        b == b'%'
            && !bytes
                .get(i + 1..i + 3)
                .is_some_and(|hex| hex.iter().all(u8::is_ascii_hexdigit))
    }) {
        return Err(LocationError::InvalidEscape {
            input: input.to_string(),
            position,
        });
    }

    let spaced = input.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|decoded| decoded.into_owned())
        .map_err(|_| LocationError::InvalidUtf8(input.to_string()))
}

/// Encode a query key or value.
fn encode_component(input: &str) -> String {
    urlencoding::encode(input).into_owned()
}

/// Encode a path segment by segment, keeping the separators.
fn encode_path(path: &str) -> String {
    path.split('/')
        .map(urlencoding::encode)
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_path_and_query() {
        let loc = Location::parse("/allocations?status=running&job=web").unwrap();
        assert_eq!(loc.pathname, "/allocations");
        assert_eq!(loc.param(QueryKey::Status), Some("running"));
        assert_eq!(loc.param(QueryKey::Job), Some("web"));
        assert_eq!(loc.param(QueryKey::Client), None);
    }

    #[test]
    fn test_parse_empty_is_default() {
        assert_eq!(Location::parse("").unwrap(), Location::default());
        assert_eq!(Location::parse("?job=a").unwrap().pathname, DEFAULT_PATHNAME);
    }

    #[test]
    fn test_parse_decodes_escapes() {
        let loc = Location::parse("/jobs?job=my%20job&allocation_id=a+b").unwrap();
        assert_eq!(loc.param(QueryKey::Job), Some("my job"));
        assert_eq!(loc.param(QueryKey::AllocationId), Some("a b"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(
            Location::parse("/x?job=%zz"),
            Err(LocationError::InvalidEscape { position: 0, .. })
        ));
        assert!(matches!(
            Location::parse("allocations"),
            Err(LocationError::RelativePath(_))
        ));
    }

    #[test]
    fn test_parse_rejects_non_utf8_escape() {
        assert_eq!(
            Location::parse("/allocations?job=%FF"),
            Err(LocationError::InvalidUtf8("%FF".to_string()))
        );
        assert!(matches!(
            Location::parse("/allocations?job=ok%"),
            Err(LocationError::InvalidEscape { position: 2, .. })
        ));
    }

    #[test]
    fn test_display_round_trips_multibyte_values() {
        let loc = Location::parse("/jobs/caf%C3%A9?job=%E6%95%B0%E6%8D%AE").unwrap();
        assert_eq!(loc.pathname, "/jobs/café");
        assert_eq!(loc.param(QueryKey::Job), Some("数据"));
        assert_eq!(loc.to_string(), "/jobs/caf%C3%A9?job=%E6%95%B0%E6%8D%AE");
        assert_eq!(Location::parse(&loc.to_string()).unwrap(), loc);
    }

    #[test]
    fn test_with_param_keeps_other_keys() {
        let loc = Location::parse("/allocations?job=web&client=n1&extra=1").unwrap();
        let next = loc.with_param(QueryKey::Status, Some("failed")).into_location();
        assert_eq!(next.pathname, "/allocations");
        assert_eq!(next.param(QueryKey::Status), Some("failed"));
        assert_eq!(next.param(QueryKey::Job), Some("web"));
        assert_eq!(next.param(QueryKey::Client), Some("n1"));
        assert_eq!(next.query.get("extra").map(String::as_str), Some("1"));
    }

    #[test]
    fn test_with_param_none_removes_key() {
        let loc = Location::parse("/allocations?status=running&job=web").unwrap();
        let next = loc.with_param(QueryKey::Status, None).into_location();
        assert!(!next.query.contains_key("status"));
        assert_eq!(next.param(QueryKey::Job), Some("web"));
    }

    #[test]
    fn test_without_filters_keeps_unrelated_keys() {
        let loc = Location::parse("/allocations?status=lost&job=web&page=2").unwrap();
        let next = loc.without_filters().into_location();
        assert_eq!(next.query.len(), 1);
        assert_eq!(next.query.get("page").map(String::as_str), Some("2"));
    }

    #[test]
    fn test_display_encodes() {
        let loc = Location::parse("/allocations?job=my%20job&status=running").unwrap();
        assert_eq!(loc.to_string(), "/allocations?job=my%20job&status=running");
        assert_eq!(Location::default().to_string(), "/allocations");
    }

    #[test]
    fn test_filter_query() {
        let loc = Location::parse("/allocations?client=n1").unwrap();
        let q = loc.filter_query();
        assert_eq!(q.client.as_deref(), Some("n1"));
        assert!(!q.is_empty());
        assert!(Location::default().filter_query().is_empty());
    }

    #[test]
    fn test_link_routes() {
        let logs = LinkTarget::AllocationLogs {
            alloc_id: "a1".to_string(),
        };
        assert_eq!(
            logs.route().to_string(),
            "/allocations/a1/files?path=%2Falloc%2Flogs%2F"
        );
        assert_eq!(
            logs.route().query.get("path").map(String::as_str),
            Some(LOGS_PATH)
        );

        let tg = LinkTarget::TaskGroup {
            job_id: "web".to_string(),
            task_group: "frontend".to_string(),
        };
        assert_eq!(tg.route().to_string(), "/jobs/web?taskGroupId=frontend");

        let node = LinkTarget::Node {
            node_id: "n1".to_string(),
        };
        assert_eq!(node.route().to_string(), "/clients/n1");
    }
}
