//! Replica Balancer
//!
//! Places worker nodes into replica groups:
//! - A joining node is added to every collection it does not serve yet
//! - Within a collection, the replica with the least available memory wins
//!
//! Node removal and periodic rebalancing have no placement rule yet. Query
//! nodes cannot move from one replica to another, so both return no plans.

use querycoord_core::{summarize_plans, BalancePlan, Collection, NodeId, Replica};
use querycoord_metadata::{ClusterView, MetadataError, MetadataView};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Balancer errors
#[derive(Error, Debug)]
pub enum BalancerError {
    #[error(transparent)]
    Metadata(#[from] MetadataError),
}

pub type Result<T> = std::result::Result<T, BalancerError>;

/// Placement policy consulted on membership changes and rebalance ticks
///
/// Implementations must not mutate cluster state; they only return plans.
pub trait Balancer: Send + Sync {
    /// Decide where a newly joined node should serve
    fn add_node(&self, node_id: NodeId) -> Result<Vec<BalancePlan>>;

    /// Decide how a departing node's assignments are redistributed
    fn remove_node(&self, node_id: NodeId) -> Vec<BalancePlan>;

    /// Decide whether any standing assignment should move
    fn rebalance(&self) -> Vec<BalancePlan>;
}

/// Memory-aware replica balancer
///
/// Holds no state besides its two views, so every call reflects the views'
/// current contents.
pub struct ReplicaBalancer<M: ?Sized, C: ?Sized> {
    meta: Arc<M>,
    cluster: Arc<C>,
}

impl<M, C> ReplicaBalancer<M, C>
where
    M: MetadataView + ?Sized,
    C: ClusterView + ?Sized,
{
    /// Create a new balancer over the given views
    pub fn new(meta: Arc<M>, cluster: Arc<C>) -> Self {
        Self { meta, cluster }
    }

    /// Plan the node's placement within one collection
    ///
    /// Returns `None` when there is nothing to do: the collection has no
    /// replicas, or the node already serves one of them.
    fn place_in_collection(
        &self,
        node_id: NodeId,
        collection: &Collection,
    ) -> Result<Option<BalancePlan>> {
        let collection_id = collection.collection_id;
        let replicas = self.meta.get_replicas_by_collection_id(collection_id)?;

        if replicas.is_empty() {
            debug!(collection_id = %collection_id, "Collection has no replicas, skipping");
            return Ok(None);
        }

        if let Some(serving) = replicas.iter().find(|r| r.contains_node(node_id)) {
            debug!(
                collection_id = %collection_id,
                replica_id = %serving.replica_id,
                "Node already serves collection, skipping"
            );
            return Ok(None);
        }

        Ok(self
            .most_constrained(&replicas)
            .map(|replica| BalancePlan::assign(vec![node_id], replica.replica_id)))
    }

    /// Replica with the least available memory
    ///
    /// Ties go to the replica listed first by the metadata view.
    fn most_constrained<'a>(&self, replicas: &'a [Replica]) -> Option<&'a Replica> {
        replicas
            .iter()
            .map(|replica| (replica, self.cluster.available_memory(replica)))
            .min_by_key(|(_, memory)| *memory)
            .map(|(replica, memory)| {
                debug!(
                    replica_id = %replica.replica_id,
                    available_memory = memory,
                    "Selected replica"
                );
                replica
            })
    }
}

impl<M, C> Balancer for ReplicaBalancer<M, C>
where
    M: MetadataView + ?Sized,
    C: ClusterView + ?Sized,
{
    #[instrument(skip(self))]
    fn add_node(&self, node_id: NodeId) -> Result<Vec<BalancePlan>> {
        let collections = self.meta.show_collections();
        let mut plans = Vec::new();

        for collection in &collections {
            if let Some(plan) = self.place_in_collection(node_id, collection)? {
                plans.push(plan);
            }
        }

        info!(
            collections = collections.len(),
            summary = %summarize_plans(&plans),
            "Planned node placement"
        );

        Ok(plans)
    }

    #[instrument(skip(self))]
    fn remove_node(&self, node_id: NodeId) -> Vec<BalancePlan> {
        debug!("Moving nodes between replicas is not supported, no plans produced");
        Vec::new()
    }

    #[instrument(skip(self))]
    fn rebalance(&self) -> Vec<BalancePlan> {
        debug!("No rebalance policy configured, no plans produced");
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use querycoord_core::{CollectionId, ReplicaId};
    use std::collections::HashMap;

    /// Metadata fixture: collections in listing order, each with its lookup result
    #[derive(Default)]
    struct FixtureMeta {
        collections: Vec<(CollectionId, Option<Vec<Replica>>)>,
    }

    impl FixtureMeta {
        fn with_collection(mut self, id: i64, replicas: Vec<Replica>) -> Self {
            self.collections.push((CollectionId::new(id), Some(replicas)));
            self
        }

        fn with_broken_collection(mut self, id: i64) -> Self {
            self.collections.push((CollectionId::new(id), None));
            self
        }
    }

    impl MetadataView for FixtureMeta {
        fn show_collections(&self) -> Vec<Collection> {
            self.collections
                .iter()
                .map(|(id, _)| Collection::new(*id))
                .collect()
        }

        fn get_replicas_by_collection_id(
            &self,
            collection_id: CollectionId,
        ) -> querycoord_metadata::Result<Vec<Replica>> {
            self.collections
                .iter()
                .find(|(id, _)| *id == collection_id)
                .and_then(|(_, replicas)| replicas.clone())
                .ok_or_else(|| MetadataError::Lookup(format!("collection {}", collection_id)))
        }
    }

    /// Cluster fixture: fixed available memory per replica
    #[derive(Default)]
    struct FixtureCluster {
        memory: HashMap<ReplicaId, u64>,
    }

    impl FixtureCluster {
        fn with_memory(mut self, replica: i64, memory: u64) -> Self {
            self.memory.insert(ReplicaId::new(replica), memory);
            self
        }
    }

    impl ClusterView for FixtureCluster {
        fn available_memory(&self, replica: &Replica) -> u64 {
            self.memory.get(&replica.replica_id).copied().unwrap_or(0)
        }
    }

    fn replica(id: i64, collection: i64, nodes: &[i64]) -> Replica {
        Replica::new(
            ReplicaId::new(id),
            CollectionId::new(collection),
            nodes.iter().copied().map(NodeId::new).collect(),
        )
    }

    fn balancer(
        meta: FixtureMeta,
        cluster: FixtureCluster,
    ) -> ReplicaBalancer<FixtureMeta, FixtureCluster> {
        ReplicaBalancer::new(Arc::new(meta), Arc::new(cluster))
    }

    #[test]
    fn test_add_node_picks_least_memory() {
        let meta = FixtureMeta::default().with_collection(
            1,
            vec![replica(1, 1, &[1]), replica(2, 1, &[2]), replica(3, 1, &[3])],
        );
        let cluster = FixtureCluster::default()
            .with_memory(1, 100)
            .with_memory(2, 50)
            .with_memory(3, 200);

        let plans = balancer(meta, cluster).add_node(NodeId::new(9)).unwrap();

        assert_eq!(
            plans,
            vec![BalancePlan::assign(vec![NodeId::new(9)], ReplicaId::new(2))]
        );
        assert_eq!(plans[0].source_replica(), None);
    }

    #[test]
    fn test_add_node_tie_keeps_listing_order() {
        let meta = FixtureMeta::default().with_collection(
            1,
            vec![replica(5, 1, &[]), replica(4, 1, &[]), replica(6, 1, &[])],
        );
        let cluster = FixtureCluster::default()
            .with_memory(5, 70)
            .with_memory(4, 70)
            .with_memory(6, 70);

        let plans = balancer(meta, cluster).add_node(NodeId::new(9)).unwrap();
        assert_eq!(plans[0].target_replica(), Some(ReplicaId::new(5)));
    }

    #[test]
    fn test_add_node_skips_served_collection() {
        let meta = FixtureMeta::default()
            .with_collection(1, vec![replica(1, 1, &[1]), replica(2, 1, &[9])])
            .with_collection(2, vec![replica(3, 2, &[1])]);
        let cluster = FixtureCluster::default().with_memory(1, 10).with_memory(3, 10);

        let plans = balancer(meta, cluster).add_node(NodeId::new(9)).unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].target_replica(), Some(ReplicaId::new(3)));
    }

    #[test]
    fn test_add_node_fans_out_per_collection() {
        let meta = FixtureMeta::default()
            .with_collection(1, vec![replica(1, 1, &[1]), replica(2, 1, &[2])])
            .with_collection(2, vec![replica(3, 2, &[1]), replica(4, 2, &[2])]);
        let cluster = FixtureCluster::default()
            .with_memory(1, 300)
            .with_memory(2, 100)
            .with_memory(3, 100)
            .with_memory(4, 300);

        let plans = balancer(meta, cluster).add_node(NodeId::new(7)).unwrap();

        let targets: Vec<_> = plans.iter().filter_map(|p| p.target_replica()).collect();
        assert_eq!(targets, vec![ReplicaId::new(2), ReplicaId::new(3)]);
        assert!(plans.iter().all(|p| p.nodes() == [NodeId::new(7)]));
    }

    #[test]
    fn test_add_node_skips_collection_without_replicas() {
        let meta = FixtureMeta::default()
            .with_collection(1, vec![])
            .with_collection(2, vec![replica(3, 2, &[])]);

        let plans = balancer(meta, FixtureCluster::default())
            .add_node(NodeId::new(7))
            .unwrap();

        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].target_replica(), Some(ReplicaId::new(3)));
    }

    #[test]
    fn test_add_node_lookup_failure_discards_plans() {
        let meta = FixtureMeta::default()
            .with_collection(1, vec![replica(1, 1, &[])])
            .with_broken_collection(2)
            .with_collection(3, vec![replica(3, 3, &[])]);

        let err = balancer(meta, FixtureCluster::default())
            .add_node(NodeId::new(7))
            .unwrap_err();

        assert!(matches!(
            err,
            BalancerError::Metadata(MetadataError::Lookup(_))
        ));
        assert_eq!(err.to_string(), "Lookup failed: collection 2");
    }

    #[test]
    fn test_add_node_is_idempotent() {
        let meta = FixtureMeta::default()
            .with_collection(1, vec![replica(1, 1, &[1]), replica(2, 1, &[2])]);
        let cluster = FixtureCluster::default().with_memory(1, 20).with_memory(2, 10);
        let balancer = balancer(meta, cluster);

        let first = balancer.add_node(NodeId::new(3)).unwrap();
        let second = balancer.add_node(NodeId::new(3)).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_collections_no_plans() {
        let plans = balancer(FixtureMeta::default(), FixtureCluster::default())
            .add_node(NodeId::new(1))
            .unwrap();
        assert!(plans.is_empty());
    }

    #[test]
    fn test_remove_node_and_rebalance_are_inert() {
        let meta = FixtureMeta::default()
            .with_collection(1, vec![replica(1, 1, &[1, 2])])
            .with_broken_collection(2);
        let balancer = balancer(meta, FixtureCluster::default());

        assert!(balancer.remove_node(NodeId::new(1)).is_empty());
        assert!(balancer.remove_node(NodeId::new(404)).is_empty());
        assert!(balancer.rebalance().is_empty());
    }

    #[test]
    fn test_balancer_behind_trait_object() {
        let meta: Arc<dyn MetadataView> =
            Arc::new(FixtureMeta::default().with_collection(1, vec![replica(1, 1, &[])]));
        let cluster: Arc<dyn ClusterView> = Arc::new(FixtureCluster::default());
        let balancer: Box<dyn Balancer> = Box::new(ReplicaBalancer::new(meta, cluster));

        assert_eq!(balancer.add_node(NodeId::new(2)).unwrap().len(), 1);
    }
}
