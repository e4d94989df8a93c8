//! Topology models
//!
//! Plain data read from the metadata and cluster views. None of these are
//! owned by the balancer; they are fetched at the start of a call and dropped
//! when it returns.

use crate::ids::{CollectionId, NodeId, ReplicaId};
use serde::{Deserialize, Serialize};

/// Node status enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Online,
    Offline,
}

impl Default for NodeStatus {
    fn default() -> Self {
        Self::Online
    }
}

impl std::fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

/// Worker node resource report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: NodeId,

    // Memory, in bytes
    pub total_memory: u64,
    #[serde(default)]
    pub memory_used: u64,

    #[serde(default)]
    pub status: NodeStatus,
}

impl NodeInfo {
    /// Create an online node
    pub fn new(id: NodeId, total_memory: u64, memory_used: u64) -> Self {
        Self {
            id,
            total_memory,
            memory_used,
            status: NodeStatus::Online,
        }
    }

    /// Memory still free on this node
    pub fn available_memory(&self) -> u64 {
        self.total_memory.saturating_sub(self.memory_used)
    }

    pub fn is_online(&self) -> bool {
        self.status == NodeStatus::Online
    }
}

/// A replica group: the set of nodes serving one collection's data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replica {
    pub replica_id: ReplicaId,
    pub collection_id: CollectionId,
    /// Member nodes (order irrelevant)
    pub node_ids: Vec<NodeId>,
}

impl Replica {
    pub fn new(replica_id: ReplicaId, collection_id: CollectionId, node_ids: Vec<NodeId>) -> Self {
        Self {
            replica_id,
            collection_id,
            node_ids,
        }
    }

    /// Check whether a node is a member of this replica
    pub fn contains_node(&self, node_id: NodeId) -> bool {
        self.node_ids.contains(&node_id)
    }
}

/// A logical dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Collection {
    pub collection_id: CollectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Collection {
    pub fn new(collection_id: CollectionId) -> Self {
        Self {
            collection_id,
            name: None,
        }
    }

    /// Attach a human readable name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}
