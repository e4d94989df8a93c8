//! querycoord Core Library
//!
//! Shared abstractions for the query coordinator's replica balancer.
//! This crate provides:
//! - Strongly typed node, replica and collection identifiers
//! - Topology models (nodes, replicas, collections)
//! - The `BalancePlan` value produced by every balancing decision
//! - Common error handling

pub mod error;
pub mod ids;
pub mod models;
pub mod plan;

pub use error::{CoordError, Result};
pub use ids::{CollectionId, NodeId, ReplicaId};
pub use models::{Collection, NodeInfo, NodeStatus, Replica};
pub use plan::{summarize_plans, BalancePlan, PlanKind};
