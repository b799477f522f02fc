//! Node id to display name resolution.
//!
//! Names are cached per resolver instance. Once an id is resolved its entry is
//! never overwritten, including ids that resolved to themselves because no
//! matching node existed. Call [`NodeNameResolver::clear`] to start over.

use std::cell::RefCell;
use std::collections::HashMap;

use crate::models::Node;

#[derive(Debug, Default)]
pub struct NodeNameResolver {
    cache: RefCell<HashMap<String, String>>,
}

impl NodeNameResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Display name for `node_id`.
    ///
    /// An empty `nodes` collection means "not loaded yet": the id is returned
    /// unchanged and nothing is cached.
    pub fn resolve(&self, node_id: &str, nodes: &[Node]) -> String {
        if nodes.is_empty() {
            return node_id.to_string();
        }

        if let Some(name) = self.cache.borrow().get(node_id) {
            return name.clone();
        }

        let name = nodes
            .iter()
            .find(|node| node.id == node_id)
            .map(|node| node.name.clone())
            .unwrap_or_else(|| {
                tracing::debug!(node_id, "node not found, caching id as its name");
                node_id.to_string()
            });

        self.cache
            .borrow_mut()
            .insert(node_id.to_string(), name.clone());
        name
    }

    /// Drop every cached name.
    pub fn clear(&self) {
        if self.is_empty() {
            return;
        }
        tracing::debug!(entries = self.len(), "clearing node name cache");
        self.cache.borrow_mut().clear();
    }

    pub fn len(&self) -> usize {
        self.cache.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.borrow().is_empty()
    }
}
