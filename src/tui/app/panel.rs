//! Filter control panel: menu options and control titles.
//!
//! Selecting an option never mutates the location; each option carries the
//! [`NavigationRequest`] it would issue.

use crate::filter::{distinct_clients, distinct_jobs};
use crate::models::{
    Allocation, ClientStatus, ColumnVisibility, Location, NavigationRequest, Node, QueryKey,
};
use crate::node_names::NodeNameResolver;

/// Label of the option that clears a filter
pub const ANY_LABEL: &str = "- Any -";

/// A filter dimension driven by a menu
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuField {
    Status,
    Client,
    Job,
}

impl MenuField {
    #[must_use]
    pub const fn key(self) -> QueryKey {
        match self {
            Self::Status => QueryKey::Status,
            Self::Client => QueryKey::Client,
            Self::Job => QueryKey::Job,
        }
    }

    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Status => "Client Status",
            Self::Client => "Client",
            Self::Job => "Job",
        }
    }
}

/// One entry of a filter menu
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub label: String,
    /// Query value this option sets; `None` clears the parameter
    pub value: Option<String>,
    pub request: NavigationRequest,
}

/// Borrowed view over everything the filter controls need for one render.
pub struct FilterControlPanel<'a> {
    pub location: &'a Location,
    /// The unfiltered collection
    pub allocations: &'a [Allocation],
    pub nodes: &'a [Node],
    pub resolver: &'a NodeNameResolver,
    pub columns: ColumnVisibility,
}

impl<'a> FilterControlPanel<'a> {
    fn option(&self, field: MenuField, label: String, value: Option<&str>) -> MenuOption {
        MenuOption {
            label,
            value: value.map(str::to_string),
            request: self.location.with_param(field.key(), value),
        }
    }

    fn any_option(&self, field: MenuField) -> MenuOption {
        self.option(field, ANY_LABEL.to_string(), None)
    }

    #[must_use]
    pub fn status_options(&self) -> Vec<MenuOption> {
        std::iter::once(self.any_option(MenuField::Status))
            .chain(ClientStatus::KNOWN.iter().map(|status| {
                self.option(
                    MenuField::Status,
                    status.label().to_string(),
                    Some(status.as_str()),
                )
            }))
            .collect()
    }

    #[must_use]
    pub fn job_options(&self) -> Vec<MenuOption> {
        std::iter::once(self.any_option(MenuField::Job))
            .chain(
                distinct_jobs(self.allocations)
                    .into_iter()
                    .map(|job| self.option(MenuField::Job, job.to_string(), Some(job))),
            )
            .collect()
    }

    /// Client options are labeled with resolved node names but set the node id.
    #[must_use]
    pub fn client_options(&self) -> Vec<MenuOption> {
        std::iter::once(self.any_option(MenuField::Client))
            .chain(distinct_clients(self.allocations).into_iter().map(|node_id| {
                let label = self.resolver.resolve(node_id, self.nodes);
                self.option(MenuField::Client, label, Some(node_id))
            }))
            .collect()
    }

    #[must_use]
    pub fn options(&self, field: MenuField) -> Vec<MenuOption> {
        match field {
            MenuField::Status => self.status_options(),
            MenuField::Client => self.client_options(),
            MenuField::Job => self.job_options(),
        }
    }

    /// Control title reflecting the active value, e.g. `Client Status: running`.
    #[must_use]
    pub fn title(&self, field: MenuField) -> String {
        match self.location.param(field.key()) {
            Some(value) if field == MenuField::Client => {
                format!("{}: {}", field.title(), self.resolver.resolve(value, self.nodes))
            }
            Some(value) => format!("{}: {}", field.title(), value),
            None => field.title().to_string(),
        }
    }

    /// Menus shown in the panel, in display order.
    #[must_use]
    pub fn visible_menus(&self) -> Vec<MenuField> {
        let mut menus = Vec::with_capacity(3);
        if self.columns.show_client {
            menus.push(MenuField::Client);
        }
        menus.push(MenuField::Status);
        if self.columns.show_job {
            menus.push(MenuField::Job);
        }
        menus
    }

    #[must_use]
    pub fn is_visible(&self, field: MenuField) -> bool {
        match field {
            MenuField::Status => true,
            MenuField::Client => self.columns.show_client,
            MenuField::Job => self.columns.show_job,
        }
    }

    /// Index of the option matching the active value, or 0 ("any").
    #[must_use]
    pub fn active_index(&self, field: MenuField) -> usize {
        let active = self.location.param(field.key());
        self.options(field)
            .iter()
            .position(|opt| opt.value.as_deref() == active)
            .unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alloc(id: &str, job: &str, node: Option<&str>) -> Allocation {
        Allocation {
            id: id.to_string(),
            job_id: job.to_string(),
            task_group: "g".to_string(),
            name: "g.1[0]".to_string(),
            node_id: node.map(str::to_string),
            client_status: ClientStatus::Running,
            create_time: 0,
        }
    }

    fn node(id: &str, name: &str) -> Node {
        Node {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    fn labels(options: &[MenuOption]) -> Vec<&str> {
        options.iter().map(|o| o.label.as_str()).collect()
    }

    #[test]
    fn test_status_options_fixed_set() {
        let location = Location::parse("/allocations?job=web").unwrap();
        let resolver = NodeNameResolver::new();
        let panel = FilterControlPanel {
            location: &location,
            allocations: &[],
            nodes: &[],
            resolver: &resolver,
            columns: ColumnVisibility::default(),
        };
        let options = panel.status_options();
        assert_eq!(
            labels(&options),
            vec![ANY_LABEL, "Running", "Complete", "Pending", "Lost", "Failed"]
        );

        let failed = options[5].request.clone().into_location();
        assert_eq!(failed.param(QueryKey::Status), Some("failed"));
        assert_eq!(failed.param(QueryKey::Job), Some("web"));
    }

    #[test]
    fn test_any_option_removes_param() {
        let location = Location::parse("/allocations?status=lost&client=n1").unwrap();
        let resolver = NodeNameResolver::new();
        let panel = FilterControlPanel {
            location: &location,
            allocations: &[],
            nodes: &[],
            resolver: &resolver,
            columns: ColumnVisibility::default(),
        };
        let any = panel.status_options().remove(0).request.into_location();
        assert!(!any.query.contains_key("status"));
        assert_eq!(any.param(QueryKey::Client), Some("n1"));
    }

    #[test]
    fn test_dynamic_options_use_unfiltered_collection() {
        // status=failed would hide every allocation, yet menus still list all values
        let location = Location::parse("/allocations?status=failed").unwrap();
        let allocations = vec![
            alloc("a1", "web", Some("n2")),
            alloc("a2", "db", Some("n1")),
            alloc("a3", "web", None),
            alloc("a4", "cache", Some("n2")),
        ];
        let nodes = vec![node("n1", "worker-1"), node("n2", "worker-2")];
        let resolver = NodeNameResolver::new();
        let panel = FilterControlPanel {
            location: &location,
            allocations: &allocations,
            nodes: &nodes,
            resolver: &resolver,
            columns: ColumnVisibility::default(),
        };

        assert_eq!(labels(&panel.job_options()), vec![ANY_LABEL, "web", "db", "cache"]);

        let clients = panel.client_options();
        assert_eq!(labels(&clients), vec![ANY_LABEL, "worker-2", "worker-1"]);
        assert_eq!(clients[1].value.as_deref(), Some("n2"));
        let next = clients[1].request.clone().into_location();
        assert_eq!(next.param(QueryKey::Client), Some("n2"));
        assert_eq!(next.param(QueryKey::Status), Some("failed"));
    }

    #[test]
    fn test_client_labels_fall_back_to_ids() {
        let location = Location::default();
        let allocations = vec![alloc("a1", "web", Some("n1"))];
        let resolver = NodeNameResolver::new();
        let panel = FilterControlPanel {
            location: &location,
            allocations: &allocations,
            nodes: &[],
            resolver: &resolver,
            columns: ColumnVisibility::default(),
        };
        assert_eq!(labels(&panel.client_options()), vec![ANY_LABEL, "n1"]);
    }

    #[test]
    fn test_titles_reflect_active_values() {
        let location = Location::parse("/allocations?status=running&client=n1").unwrap();
        let nodes = vec![node("n1", "worker-1")];
        let resolver = NodeNameResolver::new();
        let panel = FilterControlPanel {
            location: &location,
            allocations: &[],
            nodes: &nodes,
            resolver: &resolver,
            columns: ColumnVisibility::default(),
        };
        assert_eq!(panel.title(MenuField::Status), "Client Status: running");
        assert_eq!(panel.title(MenuField::Client), "Client: worker-1");
        assert_eq!(panel.title(MenuField::Job), "Job");
        assert_eq!(panel.active_index(MenuField::Status), 1);
        assert_eq!(panel.active_index(MenuField::Job), 0);
    }

    #[test]
    fn test_visible_menus_follow_columns() {
        let location = Location::default();
        let resolver = NodeNameResolver::new();
        let mut panel = FilterControlPanel {
            location: &location,
            allocations: &[],
            nodes: &[],
            resolver: &resolver,
            columns: ColumnVisibility::default(),
        };
        assert_eq!(
            panel.visible_menus(),
            vec![MenuField::Client, MenuField::Status, MenuField::Job]
        );

        panel.columns = ColumnVisibility {
            show_job: false,
            show_client: false,
        };
        assert_eq!(panel.visible_menus(), vec![MenuField::Status]);
        assert!(!panel.is_visible(MenuField::Job));
    }
}
