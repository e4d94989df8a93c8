//! querycoord Balancer Library
//!
//! Decides how worker nodes map onto replica groups. The coordinator calls the
//! balancer when:
//! - A node joins the cluster (`add_node`)
//! - A node leaves the cluster (`remove_node`)
//! - A periodic rebalance tick fires (`rebalance`)
//!
//! The balancer only reads the metadata and cluster views and returns
//! [`BalancePlan`]s. Applying them is the executor's job.

pub mod balancer;
pub mod config;

// Re-export main types
pub use balancer::{Balancer, BalancerError, ReplicaBalancer, Result};
pub use config::{BalancerConfig, ConfigError, OutputFormat};
pub use querycoord_core::{summarize_plans, BalancePlan, PlanKind};
