//! Data models for allocations, nodes, navigation and configuration.

mod allocation;
mod config;
mod location;

pub use allocation::{Allocation, ClientStatus, Node};
pub use config::{ColumnVisibility, LayoutConfig, TuiConfig};
pub use location::{
    FilterQuery, LinkTarget, Location, NavigationRequest, QueryKey,
};
