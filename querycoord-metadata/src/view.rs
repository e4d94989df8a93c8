//! View traits
//!
//! Read-only interfaces the balancer consumes. Implementations must be safe
//! for concurrent readers; the balancer adds no locking of its own.

use crate::Result;
use querycoord_core::{Collection, CollectionId, Replica};

/// Collections and their replica groups
pub trait MetadataView: Send + Sync {
    /// List every known collection
    fn show_collections(&self) -> Vec<Collection>;

    /// Get the replica groups of a collection
    ///
    /// Lookup failures are returned as errors, never panics.
    fn get_replicas_by_collection_id(&self, collection_id: CollectionId) -> Result<Vec<Replica>>;
}

/// Resource metrics for replica groups
pub trait ClusterView: Send + Sync {
    /// Aggregate available memory of a replica's member nodes
    ///
    /// Only used for ordering: a lower value means a more constrained replica.
    fn available_memory(&self, replica: &Replica) -> u64;
}
