//! In-memory cluster view
//!
//! Tracks per-node memory reports and aggregates them per replica.

use crate::view::ClusterView;
use crate::{MetadataError, Result};
use parking_lot::RwLock;
use querycoord_core::{NodeId, NodeInfo, NodeStatus, Replica};
use std::collections::HashMap;
use tracing::debug;

/// Node resource registry
pub struct MemoryCluster {
    nodes: RwLock<HashMap<NodeId, NodeInfo>>,
}

impl MemoryCluster {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Register a node, replacing any previous report for the same ID
    pub fn register_node(&self, info: NodeInfo) {
        debug!(node_id = %info.id, total_memory = info.total_memory, "Registered node");
        self.nodes.write().insert(info.id, info);
    }

    /// Forget a node
    pub fn remove_node(&self, node_id: NodeId) -> Option<NodeInfo> {
        self.nodes.write().remove(&node_id)
    }

    /// Get a node's latest report
    pub fn node(&self, node_id: NodeId) -> Option<NodeInfo> {
        self.nodes.read().get(&node_id).cloned()
    }

    /// All registered nodes, ordered by ID
    pub fn nodes(&self) -> Vec<NodeInfo> {
        let mut nodes: Vec<_> = self.nodes.read().values().cloned().collect();
        nodes.sort_by_key(|n| n.id);
        nodes
    }

    /// Change a node's status
    pub fn set_status(&self, node_id: NodeId, status: NodeStatus) -> Result<()> {
        let mut nodes = self.nodes.write();
        let node = nodes
            .get_mut(&node_id)
            .ok_or(MetadataError::NodeNotFound(node_id))?;
        node.status = status;
        Ok(())
    }

    /// Record a fresh memory report for a node
    pub fn update_memory(&self, node_id: NodeId, total_memory: u64, memory_used: u64) -> Result<()> {
        let mut nodes = self.nodes.write();
        let node = nodes
            .get_mut(&node_id)
            .ok_or(MetadataError::NodeNotFound(node_id))?;
        node.total_memory = total_memory;
        node.memory_used = memory_used;
        Ok(())
    }
}

impl Default for MemoryCluster {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterView for MemoryCluster {
    /// Sum of free memory over the replica's online members
    ///
    /// Unregistered and offline nodes contribute nothing.
    fn available_memory(&self, replica: &Replica) -> u64 {
        let nodes = self.nodes.read();
        replica
            .node_ids
            .iter()
            .filter_map(|id| nodes.get(id))
            .filter(|node| node.is_online())
            .fold(0u64, |acc, node| acc.saturating_add(node.available_memory()))
    }
}
