//! Loading allocation and node snapshots from JSON files.
//!
//! The files hold the scheduler API's list responses verbatim: a JSON array
//! of allocation stubs and a JSON array of node stubs.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;

use crate::models::{Allocation, Node};

/// One consistent view of the cluster
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub allocations: Vec<Allocation>,
    pub nodes: Vec<Node>,
}

/// Where snapshots are read from
#[derive(Debug, Clone)]
pub struct SnapshotSource {
    allocations_path: PathBuf,
    nodes_path: Option<PathBuf>,
}

impl SnapshotSource {
    pub fn new(allocations_path: PathBuf, nodes_path: Option<PathBuf>) -> Self {
        Self {
            allocations_path,
            nodes_path,
        }
    }

    /// Read both files. A missing nodes file yields an empty node list.
    pub fn load(&self) -> Result<Snapshot> {
        let allocations: Vec<Allocation> = read_json(&self.allocations_path)
            .context("Failed to load allocations")?;

        let nodes: Vec<Node> = match &self.nodes_path {
            Some(path) if path.exists() => read_json(path).context("Failed to load nodes")?,
            Some(path) => {
                tracing::warn!(
                    path = %path.display(),
                    "nodes file not found, showing raw node ids"
                );
                Vec::new()
            }
            None => Vec::new(),
        };

        tracing::debug!(
            allocations = allocations.len(),
            nodes = nodes.len(),
            "snapshot loaded"
        );

        Ok(Snapshot { allocations, nodes })
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read '{}'", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Invalid JSON in '{}'", path.display()))
}
