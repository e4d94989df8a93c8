//! Topology snapshots
//!
//! A snapshot describes collections, their replica groups and the node memory
//! reports at one point in time. Files ending in `.toml` are parsed as TOML,
//! anything else as JSON.
//!
//! ```toml
//! [[nodes]]
//! id = 1
//! total_memory = 17179869184
//! memory_used = 4294967296
//!
//! [[collections]]
//! id = 100
//! name = "products"
//!
//! [[collections.replicas]]
//! id = 1000
//! nodes = [1]
//! ```

use crate::cluster::MemoryCluster;
use crate::memory::MemoryMetadata;
use crate::{MetadataError, Result};
use querycoord_core::{Collection, CollectionId, CoordError, NodeId, NodeInfo, Replica, ReplicaId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TopologySnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeInfo>,
    #[serde(default)]
    pub collections: Vec<CollectionSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionSnapshot {
    pub id: CollectionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub replicas: Vec<ReplicaSnapshot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplicaSnapshot {
    pub id: ReplicaId,
    #[serde(default)]
    pub nodes: Vec<NodeId>,
}

impl TopologySnapshot {
    /// Read a snapshot file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(CoordError::from)?;

        let snapshot = match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&contents)?,
            _ => Self::from_json_str(&contents)?,
        };

        info!(path = %path.display(), summary = %snapshot.summary(), "Loaded topology snapshot");
        Ok(snapshot)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents).map_err(|e| MetadataError::Core(e.into()))
    }

    pub fn from_json_str(contents: &str) -> Result<Self> {
        serde_json::from_str(contents).map_err(|e| MetadataError::Core(e.into()))
    }

    /// Check structural invariants
    ///
    /// Collection, replica and node IDs must be unique, and a node may belong
    /// to at most one replica of each collection.
    pub fn validate(&self) -> Result<()> {
        let mut node_ids = HashSet::new();
        for node in &self.nodes {
            if !node_ids.insert(node.id) {
                return Err(MetadataError::InvalidSnapshot(format!(
                    "node {} reported twice",
                    node.id
                )));
            }
        }

        let mut collection_ids = HashSet::new();
        let mut replica_ids = HashSet::new();

        for collection in &self.collections {
            if !collection_ids.insert(collection.id) {
                return Err(MetadataError::InvalidSnapshot(format!(
                    "collection {} listed twice",
                    collection.id
                )));
            }

            let mut placement: HashMap<NodeId, ReplicaId> = HashMap::new();
            for replica in &collection.replicas {
                if !replica_ids.insert(replica.id) {
                    return Err(MetadataError::InvalidSnapshot(format!(
                        "replica {} listed twice",
                        replica.id
                    )));
                }

                for node in &replica.nodes {
                    if let Some(other) = placement.insert(*node, replica.id) {
                        return Err(MetadataError::InvalidSnapshot(format!(
                            "node {} serves collection {} in both replica {} and replica {}",
                            node, collection.id, other, replica.id
                        )));
                    }
                }
            }
        }

        Ok(())
    }

    /// Validate and build the in-memory views
    pub fn into_views(self) -> Result<(MemoryMetadata, MemoryCluster)> {
        self.validate()?;

        let meta = MemoryMetadata::new();
        let cluster = MemoryCluster::new();

        for node in self.nodes {
            cluster.register_node(node);
        }

        for collection in self.collections {
            let model = match collection.name {
                Some(name) => Collection::new(collection.id).with_name(name),
                None => Collection::new(collection.id),
            };
            meta.add_collection(model)?;

            for replica in collection.replicas {
                meta.add_replica(Replica::new(replica.id, collection.id, replica.nodes))?;
            }
        }

        Ok((meta, cluster))
    }

    /// Summary of the snapshot contents
    pub fn summary(&self) -> String {
        let replicas: usize = self.collections.iter().map(|c| c.replicas.len()).sum();
        format!(
            "{} collections, {} replicas, {} nodes",
            self.collections.len(),
            replicas,
            self.nodes.len()
        )
    }
}
