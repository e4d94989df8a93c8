//! In-memory metadata view
//!
//! Used for testing and by the command-line tool. Not persistent.

use crate::view::MetadataView;
use crate::{MetadataError, Result};
use parking_lot::RwLock;
use querycoord_core::{BalancePlan, Collection, CollectionId, NodeId, Replica, ReplicaId};
use std::collections::BTreeMap;
use tracing::debug;

struct CollectionEntry {
    collection: Collection,
    /// Replicas in insertion order
    replicas: Vec<Replica>,
}

/// In-memory collection and replica registry
pub struct MemoryMetadata {
    collections: RwLock<BTreeMap<CollectionId, CollectionEntry>>,
}

impl MemoryMetadata {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(BTreeMap::new()),
        }
    }

    /// Register a collection with no replicas
    pub fn add_collection(&self, collection: Collection) -> Result<()> {
        let mut collections = self.collections.write();
        let id = collection.collection_id;

        if collections.contains_key(&id) {
            return Err(MetadataError::DuplicateCollection(id));
        }

        collections.insert(
            id,
            CollectionEntry {
                collection,
                replicas: Vec::new(),
            },
        );
        Ok(())
    }

    /// Drop a collection and all its replicas
    pub fn remove_collection(&self, collection_id: CollectionId) -> Result<Collection> {
        self.collections
            .write()
            .remove(&collection_id)
            .map(|entry| entry.collection)
            .ok_or(MetadataError::CollectionNotFound(collection_id))
    }

    /// Register a replica under its owning collection
    ///
    /// Replica IDs are unique across all collections.
    pub fn add_replica(&self, replica: Replica) -> Result<()> {
        let mut collections = self.collections.write();

        if locate(&collections, replica.replica_id).is_some() {
            return Err(MetadataError::DuplicateReplica(replica.replica_id));
        }

        let entry = collections
            .get_mut(&replica.collection_id)
            .ok_or(MetadataError::CollectionNotFound(replica.collection_id))?;
        entry.replicas.push(replica);
        Ok(())
    }

    /// Look up a single replica by ID
    pub fn replica(&self, replica_id: ReplicaId) -> Option<Replica> {
        let collections = self.collections.read();
        let (collection_id, index) = locate(&collections, replica_id)?;
        collections
            .get(&collection_id)
            .map(|entry| entry.replicas[index].clone())
    }

    /// Number of replicas across all collections
    pub fn replica_count(&self) -> usize {
        self.collections
            .read()
            .values()
            .map(|entry| entry.replicas.len())
            .sum()
    }

    /// Apply a balance plan to the registry
    ///
    /// Nodes are removed from the source replica and added to the target
    /// replica. Both replicas are resolved and checked before anything is
    /// mutated, so a rejected plan leaves the registry unchanged. A node may not
    /// join a replica while it serves another replica of the same collection.
    pub fn apply_plan(&self, plan: &BalancePlan) -> Result<()> {
        let mut collections = self.collections.write();

        let source = match plan.source_replica() {
            Some(id) => Some(locate(&collections, id).ok_or(MetadataError::ReplicaNotFound(id))?),
            None => None,
        };
        let target = match plan.target_replica() {
            Some(id) => Some(locate(&collections, id).ok_or(MetadataError::ReplicaNotFound(id))?),
            None => None,
        };

        if let Some((collection_id, target_index)) = target {
            let entry = &collections[&collection_id];
            for node in plan.nodes() {
                let serving = entry.replicas.iter().enumerate().find(|(index, replica)| {
                    *index != target_index
                        && Some((collection_id, *index)) != source
                        && replica.contains_node(*node)
                });
                if let Some((_, replica)) = serving {
                    return Err(MetadataError::NodeAlreadyServing {
                        node: *node,
                        collection: collection_id,
                        replica: replica.replica_id,
                    });
                }
            }
        }

        if let Some((collection_id, index)) = source {
            if let Some(entry) = collections.get_mut(&collection_id) {
                let replica = &mut entry.replicas[index];
                replica.node_ids.retain(|n| !plan.nodes().contains(n));
            }
        }

        if let Some((collection_id, index)) = target {
            if let Some(entry) = collections.get_mut(&collection_id) {
                let replica = &mut entry.replicas[index];
                for node in plan.nodes() {
                    if !replica.contains_node(*node) {
                        replica.node_ids.push(*node);
                    }
                }
            }
        }

        debug!(plan = %plan, "Applied balance plan");
        Ok(())
    }

    /// Replica groups a node currently belongs to
    pub fn replicas_of_node(&self, node_id: NodeId) -> Vec<ReplicaId> {
        self.collections
            .read()
            .values()
            .flat_map(|entry| entry.replicas.iter())
            .filter(|replica| replica.contains_node(node_id))
            .map(|replica| replica.replica_id)
            .collect()
    }
}

impl Default for MemoryMetadata {
    fn default() -> Self {
        Self::new()
    }
}

impl MetadataView for MemoryMetadata {
    fn show_collections(&self) -> Vec<Collection> {
        self.collections
            .read()
            .values()
            .map(|entry| entry.collection.clone())
            .collect()
    }

    fn get_replicas_by_collection_id(&self, collection_id: CollectionId) -> Result<Vec<Replica>> {
        self.collections
            .read()
            .get(&collection_id)
            .map(|entry| entry.replicas.clone())
            .ok_or(MetadataError::CollectionNotFound(collection_id))
    }
}

/// Find the owning collection and position of a replica
fn locate(
    collections: &BTreeMap<CollectionId, CollectionEntry>,
    replica_id: ReplicaId,
) -> Option<(CollectionId, usize)> {
    collections.iter().find_map(|(collection_id, entry)| {
        entry
            .replicas
            .iter()
            .position(|r| r.replica_id == replica_id)
            .map(|index| (*collection_id, index))
    })
}
