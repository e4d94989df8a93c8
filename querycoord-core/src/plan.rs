//! Balance plans
//!
//! A plan is a proposed node-to-replica assignment change. The balancer only
//! produces plans; an executor applies them and persists the new metadata.
//!
//! The source and target replica are both optional in the abstract, but a plan
//! naming neither is meaningless. Each legal combination is its own variant so
//! that state cannot be constructed.

use crate::error::{CoordError, Result};
use crate::ids::{NodeId, ReplicaId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Plan variant discriminant, used for summaries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlanKind {
    Assign,
    Release,
    Transfer,
}

/// A proposed node-to-replica assignment change
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BalancePlan {
    /// Add nodes to a replica without removing them from anywhere
    Assign {
        nodes: Vec<NodeId>,
        target_replica: ReplicaId,
    },
    /// Remove nodes from a replica without adding them anywhere
    Release {
        nodes: Vec<NodeId>,
        source_replica: ReplicaId,
    },
    /// Move nodes from one replica to another
    Transfer {
        nodes: Vec<NodeId>,
        source_replica: ReplicaId,
        target_replica: ReplicaId,
    },
}

impl BalancePlan {
    /// Plan that adds nodes to `target`
    pub fn assign(nodes: Vec<NodeId>, target: ReplicaId) -> Self {
        Self::Assign {
            nodes,
            target_replica: target,
        }
    }

    /// Plan that removes nodes from `source`
    pub fn release(nodes: Vec<NodeId>, source: ReplicaId) -> Self {
        Self::Release {
            nodes,
            source_replica: source,
        }
    }

    /// Plan that moves nodes from `source` to `target`
    pub fn transfer(nodes: Vec<NodeId>, source: ReplicaId, target: ReplicaId) -> Self {
        Self::Transfer {
            nodes,
            source_replica: source,
            target_replica: target,
        }
    }

    /// Build a plan from optional endpoints
    ///
    /// Fails when both `source` and `target` are absent.
    pub fn from_parts(
        nodes: Vec<NodeId>,
        source: Option<ReplicaId>,
        target: Option<ReplicaId>,
    ) -> Result<Self> {
        match (source, target) {
            (None, Some(target)) => Ok(Self::assign(nodes, target)),
            (Some(source), None) => Ok(Self::release(nodes, source)),
            (Some(source), Some(target)) => Ok(Self::transfer(nodes, source, target)),
            (None, None) => Err(CoordError::InvalidPlan(
                "plan must name a source or a target replica".to_string(),
            )),
        }
    }

    pub fn kind(&self) -> PlanKind {
        match self {
            Self::Assign { .. } => PlanKind::Assign,
            Self::Release { .. } => PlanKind::Release,
            Self::Transfer { .. } => PlanKind::Transfer,
        }
    }

    /// Nodes moved by this plan
    pub fn nodes(&self) -> &[NodeId] {
        match self {
            Self::Assign { nodes, .. }
            | Self::Release { nodes, .. }
            | Self::Transfer { nodes, .. } => nodes,
        }
    }

    /// Replica the nodes leave, if any
    pub fn source_replica(&self) -> Option<ReplicaId> {
        match self {
            Self::Assign { .. } => None,
            Self::Release { source_replica, .. } | Self::Transfer { source_replica, .. } => {
                Some(*source_replica)
            }
        }
    }

    /// Replica the nodes join, if any
    pub fn target_replica(&self) -> Option<ReplicaId> {
        match self {
            Self::Release { .. } => None,
            Self::Assign { target_replica, .. } | Self::Transfer { target_replica, .. } => {
                Some(*target_replica)
            }
        }
    }
}

struct NodeList<'a>(&'a [NodeId]);

impl fmt::Display for NodeList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", node)?;
        }
        write!(f, "]")
    }
}

impl fmt::Display for BalancePlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Assign {
                nodes,
                target_replica,
            } => write!(f, "assign {} -> replica {}", NodeList(nodes), target_replica),
            Self::Release {
                nodes,
                source_replica,
            } => write!(f, "release {} <- replica {}", NodeList(nodes), source_replica),
            Self::Transfer {
                nodes,
                source_replica,
                target_replica,
            } => write!(
                f,
                "transfer {} replica {} -> replica {}",
                NodeList(nodes),
                source_replica,
                target_replica
            ),
        }
    }
}

/// One-line summary of a batch of plans, for logging
pub fn summarize_plans(plans: &[BalancePlan]) -> String {
    let count = |kind: PlanKind| plans.iter().filter(|p| p.kind() == kind).count();
    let nodes: usize = plans.iter().map(|p| p.nodes().len()).sum();

    format!(
        "{} plans: {} assign, {} release, {} transfer, {} node moves",
        plans.len(),
        count(PlanKind::Assign),
        count(PlanKind::Release),
        count(PlanKind::Transfer),
        nodes
    )
}
