//! Allocation filtering shared by the TUI and the `list` command.
//!
//! A [`FilterPredicateSet`] is built from the query of the current location plus
//! an optional local allocation-id override. Every active predicate must hold
//! (AND logic); the result keeps the input order.

use crate::models::{Allocation, FilterQuery};

/// Where the active allocation-id substring comes from.
///
/// Precedence rule: a local override, when present, replaces the query value
/// outright. The two are never combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdPredicateSource<'a> {
    None,
    Query(&'a str),
    LocalOverride(&'a str),
}

impl<'a> IdPredicateSource<'a> {
    #[must_use]
    pub fn resolve(query: Option<&'a str>, local_override: Option<&'a str>) -> Self {
        match (local_override, query) {
            (Some(local), _) => Self::LocalOverride(local),
            (None, Some(q)) => Self::Query(q),
            (None, None) => Self::None,
        }
    }

    #[must_use]
    pub fn needle(self) -> Option<&'a str> {
        match self {
            Self::None => None,
            Self::Query(s) | Self::LocalOverride(s) => Some(s),
        }
    }
}

/// A single filter criterion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    /// Case-sensitive substring of the allocation id
    IdContains(&'a str),
    /// Exact client status text
    StatusIs(&'a str),
    /// Exact node id
    ClientIs(&'a str),
    /// Exact job id
    JobIs(&'a str),
}

impl Predicate<'_> {
    #[must_use]
    pub fn matches(&self, alloc: &Allocation) -> bool {
        match self {
            Self::IdContains(needle) => alloc.id.contains(needle),
            Self::StatusIs(status) => alloc.client_status.as_str() == *status,
            Self::ClientIs(node) => alloc.node_id.as_deref() == Some(*node),
            Self::JobIs(job) => alloc.job_id == *job,
        }
    }
}

/// The active predicates for one render.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPredicateSet<'a> {
    predicates: Vec<Predicate<'a>>,
    id_source: Option<IdPredicateSource<'a>>,
}

impl<'a> FilterPredicateSet<'a> {
    /// Build predicates from the query and the local allocation-id override.
    #[must_use]
    pub fn from_query(query: &'a FilterQuery, local_override: Option<&'a str>) -> Self {
        let id_source =
            IdPredicateSource::resolve(query.allocation_id.as_deref(), local_override);

        let mut predicates = Vec::with_capacity(4);
        if let Some(needle) = id_source.needle() {
            predicates.push(Predicate::IdContains(needle));
        }
        if let Some(status) = query.status.as_deref() {
            predicates.push(Predicate::StatusIs(status));
        }
        if let Some(client) = query.client.as_deref() {
            predicates.push(Predicate::ClientIs(client));
        }
        if let Some(job) = query.job.as_deref() {
            predicates.push(Predicate::JobIs(job));
        }

        Self {
            predicates,
            id_source: Some(id_source),
        }
    }

    #[must_use]
    pub fn predicates(&self) -> &[Predicate<'a>] {
        &self.predicates
    }

    /// Which source supplied the allocation-id predicate, if built from a query.
    #[must_use]
    pub fn id_source(&self) -> Option<IdPredicateSource<'a>> {
        self.id_source
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    #[must_use]
    pub fn matches(&self, alloc: &Allocation) -> bool {
        self.predicates.iter().all(|p| p.matches(alloc))
    }

    /// Allocations satisfying every predicate, in input order.
    #[must_use]
    pub fn apply<'b>(&self, allocations: &'b [Allocation]) -> Vec<&'b Allocation> {
        if self.is_empty() {
            return allocations.iter().collect();
        }
        allocations.iter().filter(|a| self.matches(a)).collect()
    }
}

/// Convenience wrapper: filter `allocations` for `query` and an optional override.
#[must_use]
pub fn filter_allocations<'b>(
    allocations: &'b [Allocation],
    query: &FilterQuery,
    local_override: Option<&str>,
) -> Vec<&'b Allocation> {
    let set = FilterPredicateSet::from_query(query, local_override);
    let filtered = set.apply(allocations);
    tracing::debug!(
        total = allocations.len(),
        shown = filtered.len(),
        predicates = set.predicates().len(),
        unfiltered = query.is_empty(),
        id_source = ?set.id_source(),
        "filtered allocations"
    );
    filtered
}

/// Distinct values of `key` over `allocations`, first-seen order, no duplicates.
///
/// Allocations for which `key` returns `None` contribute nothing.
pub fn distinct_values<'b, F>(allocations: &'b [Allocation], key: F) -> Vec<&'b str>
where
    F: Fn(&'b Allocation) -> Option<&'b str>,
{
    let mut seen = std::collections::HashSet::new();
    allocations
        .iter()
        .filter_map(key)
        .filter(|v| seen.insert(*v))
        .collect()
}

/// Distinct job ids in first-seen order.
#[must_use]
pub fn distinct_jobs(allocations: &[Allocation]) -> Vec<&str> {
    distinct_values(allocations, |a| Some(a.job_id.as_str()))
}

/// Distinct node ids in first-seen order; unplaced allocations are skipped.
#[must_use]
pub fn distinct_clients(allocations: &[Allocation]) -> Vec<&str> {
    distinct_values(allocations, |a| a.node_id.as_deref())
}
