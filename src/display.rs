//! Plain-terminal output for the `list` and `links` commands

use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use tabled::{
    Tabled,
    builder::Builder,
    settings::{Alignment, Modify, Style, Width, object::Rows},
};

use crate::formatting::format_age;
use crate::models::{Allocation, ClientStatus, ColumnVisibility, LinkTarget, Node};
use crate::node_names::NodeNameResolver;

const TABLE_WIDTH: usize = 200;

#[derive(Tabled)]
struct AllocationRow {
    #[tabled(rename = "ID")]
    id: String,

    #[tabled(rename = "Job")]
    job: String,

    #[tabled(rename = "Task Group")]
    task_group: String,

    #[tabled(rename = "Status")]
    status: String,

    #[tabled(rename = "Client")]
    client: String,

    #[tabled(rename = "Age")]
    age: String,
}

impl AllocationRow {
    const JOB_COLUMN: usize = 1;
    const CLIENT_COLUMN: usize = 4;

    fn new(
        alloc: &Allocation,
        nodes: &[Node],
        resolver: &NodeNameResolver,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: alloc.short_id().to_string(),
            job: alloc.job_id.clone(),
            task_group: alloc.task_group_label(),
            status: format_client_status(&alloc.client_status),
            client: alloc
                .node_id
                .as_deref()
                .map(|id| resolver.resolve(id, nodes))
                .unwrap_or_else(|| "-".to_string()),
            age: format_age(alloc.age_seconds(now)),
        }
    }
}

/// Status with glyph, colored by state
pub fn format_client_status(status: &ClientStatus) -> String {
    let text = format!("{} {}", status.glyph(), status.as_str());
    match status {
        ClientStatus::Running => text.green().to_string(),
        ClientStatus::Pending => text.yellow().to_string(),
        ClientStatus::Complete => text.bright_blue().to_string(),
        ClientStatus::Failed => text.red().to_string(),
        ClientStatus::Lost => text.magenta().to_string(),
        ClientStatus::Unknown(_) => text.white().to_string(),
    }
}

/// Render the filtered allocations as a table.
///
/// `total` is the unfiltered count, used in the summary line.
pub fn format_allocations(
    allocations: &[&Allocation],
    total: usize,
    nodes: &[Node],
    resolver: &NodeNameResolver,
    columns: ColumnVisibility,
    now: DateTime<Utc>,
) -> String {
    if allocations.is_empty() {
        let message = if total == 0 {
            "No allocations"
        } else {
            "No allocations match the current filters"
        };
        return message.yellow().to_string();
    }

    let keep = |column: usize| match column {
        AllocationRow::JOB_COLUMN => columns.show_job,
        AllocationRow::CLIENT_COLUMN => columns.show_client,
        _ => true,
    };

    let mut builder = Builder::default();
    builder.push_record(
        AllocationRow::headers()
            .into_iter()
            .enumerate()
            .filter(|(i, _)| keep(*i))
            .map(|(_, h)| h.into_owned()),
    );
    for alloc in allocations {
        let row = AllocationRow::new(alloc, nodes, resolver, now);
        builder.push_record(
            row.fields()
                .into_iter()
                .enumerate()
                .filter(|(i, _)| keep(*i))
                .map(|(_, f)| f.into_owned()),
        );
    }

    let mut table = builder.build();
    table
        .with(Style::rounded())
        .with(Width::wrap(TABLE_WIDTH).keep_words(true))
        .with(Modify::new(Rows::first()).with(Alignment::center()));

    format!(
        "{}\n{} of {} allocations",
        table,
        allocations.len(),
        total
    )
}

/// Dashboard links for one allocation, one per line.
pub fn format_links(alloc: &Allocation, nodes: &[Node], resolver: &NodeNameResolver) -> String {
    let mut targets = vec![
        LinkTarget::Allocation {
            alloc_id: alloc.id.clone(),
        },
        LinkTarget::Job {
            job_id: alloc.job_id.clone(),
        },
        LinkTarget::TaskGroup {
            job_id: alloc.job_id.clone(),
            task_group: alloc.task_group.clone(),
        },
    ];
    if let Some(node_id) = &alloc.node_id {
        targets.push(LinkTarget::Node {
            node_id: node_id.clone(),
        });
    }
    targets.push(LinkTarget::AllocationLogs {
        alloc_id: alloc.id.clone(),
    });

    let mut output = format!(
        "{} {}\n",
        alloc.short_id().bold(),
        alloc.task_group_label()
    );
    for target in &targets {
        output.push_str(&format!(
            "  {:<12} {}\n",
            target.kind(),
            target.route().cyan()
        ));
    }
    if let Some(node_id) = &alloc.node_id {
        output.push_str(&format!(
            "  {:<12} {}\n",
            "client name",
            resolver.resolve(node_id, nodes)
        ));
    } else {
        output.push_str(&format!("  {:<12} {}\n", "client", "(unplaced)".dimmed()));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(id: &str, status: &str, node: Option<&str>) -> Allocation {
        Allocation {
            id: id.to_string(),
            job_id: "web".to_string(),
            task_group: "frontend".to_string(),
            name: "web.frontend[2]".to_string(),
            node_id: node.map(str::to_string),
            client_status: ClientStatus::from(status.to_string()),
            create_time: 0,
        }
    }

    fn nodes() -> Vec<Node> {
        vec![Node {
            id: "n1".to_string(),
            name: "worker-1".to_string(),
        }]
    }

    #[test]
    fn test_format_allocations_resolves_clients() {
        let a = alloc("0123456789abcdef", "running", Some("n1"));
        let b = alloc("fedcba9876543210", "pending", None);
        let resolver = NodeNameResolver::new();
        let out = format_allocations(
            &[&a, &b],
            3,
            &nodes(),
            &resolver,
            ColumnVisibility::default(),
            Utc::now(),
        );
        assert!(out.contains("01234567"));
        assert!(!out.contains("0123456789"));
        assert!(out.contains("worker-1"));
        assert!(out.contains("frontend (#2)"));
        assert!(out.contains("Client"));
        assert!(out.ends_with("2 of 3 allocations"));
    }

    #[test]
    fn test_format_allocations_hides_columns() {
        let a = alloc("a1", "running", Some("n1"));
        let resolver = NodeNameResolver::new();
        let columns = ColumnVisibility {
            show_job: false,
            show_client: false,
        };
        let out = format_allocations(&[&a], 1, &nodes(), &resolver, columns, Utc::now());
        assert!(!out.contains("Client"));
        assert!(!out.contains("Job"));
        assert!(!out.contains("worker-1"));
        assert!(out.contains("Task Group"));
    }

    #[test]
    fn test_format_allocations_empty_messages() {
        let resolver = NodeNameResolver::new();
        let columns = ColumnVisibility::default();
        let none = format_allocations(&[], 0, &[], &resolver, columns, Utc::now());
        assert!(none.contains("No allocations"));
        let filtered = format_allocations(&[], 4, &[], &resolver, columns, Utc::now());
        assert!(filtered.contains("match the current filters"));
    }

    #[test]
    fn test_format_links() {
        let a = alloc("a1", "running", Some("n1"));
        let resolver = NodeNameResolver::new();
        let out = format_links(&a, &nodes(), &resolver);
        assert!(out.contains("/allocations/a1"));
        assert!(out.contains("/jobs/web\u{1b}"));
        assert!(out.contains("/jobs/web?taskGroupId=frontend"));
        assert!(out.contains("/clients/n1"));
        assert!(out.contains("/allocations/a1/files?path=%2Falloc%2Flogs%2F"));
        assert!(out.contains("worker-1"));
    }

    #[test]
    fn test_format_links_unplaced() {
        let a = alloc("a1", "pending", None);
        let out = format_links(&a, &[], &NodeNameResolver::new());
        assert!(!out.contains("/clients/"));
        assert!(out.contains("(unplaced)"));
    }

    #[test]
    fn test_format_client_status() {
        let s = format_client_status(&ClientStatus::Failed);
        assert!(s.contains("✗ failed"));
    }
}
