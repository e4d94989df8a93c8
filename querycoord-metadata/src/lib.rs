//! querycoord Metadata Views
//!
//! The balancer reads cluster state through two capability traits:
//!
//! - [`MetadataView`]: collections and their replica groups
//! - [`ClusterView`]: per-replica available memory
//!
//! Production coordinators implement these over their metadata store and
//! node heartbeat data. This crate ships in-memory implementations used by
//! tests and the command-line tool, plus a topology snapshot format that
//! populates them.
//!
//! # Usage
//!
//! ```ignore
//! use querycoord_metadata::TopologySnapshot;
//!
//! let snapshot = TopologySnapshot::load("cluster.toml")?;
//! let (meta, cluster) = snapshot.into_views()?;
//!
//! // Apply a plan produced by the balancer
//! meta.apply_plan(&plan)?;
//! ```

pub mod cluster;
pub mod memory;
pub mod snapshot;
pub mod view;

pub use cluster::MemoryCluster;
pub use memory::MemoryMetadata;
pub use snapshot::{CollectionSnapshot, ReplicaSnapshot, TopologySnapshot};
pub use view::{ClusterView, MetadataView};

use querycoord_core::{CollectionId, CoordError, NodeId, ReplicaId};
use thiserror::Error;

/// Metadata error types
#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("Collection not found: {0}")]
    CollectionNotFound(CollectionId),

    #[error("Replica not found: {0}")]
    ReplicaNotFound(ReplicaId),

    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Collection already exists: {0}")]
    DuplicateCollection(CollectionId),

    #[error("Replica already exists: {0}")]
    DuplicateReplica(ReplicaId),

    #[error("Node {node} already serves collection {collection} in replica {replica}")]
    NodeAlreadyServing {
        node: NodeId,
        collection: CollectionId,
        replica: ReplicaId,
    },

    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Lookup failed: {0}")]
    Lookup(String),

    #[error(transparent)]
    Core(#[from] CoordError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
