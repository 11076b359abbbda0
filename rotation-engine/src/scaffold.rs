//! Scaffold generation: an empty replacement configuration shaped like the
//! live cluster, for the operator to fill in.

use std::fmt::Display;

use error_common::Result;
use tracing::info;

use crate::model::{ClusterRotationConfig, ManagerNode, ManagerRole, ServiceNode, ServiceRole};
use crate::topology::{ClusterTopology, TopologySource};

pub struct ScaffoldBuilder;

impl ScaffoldBuilder {
    /// One empty entry per host id, in the given order. Ids are not deduplicated.
    pub fn build<M, D, B>(manager_ids: M, database_ids: D, broker_ids: B) -> ClusterRotationConfig
    where
        M: IntoIterator,
        M::Item: Display,
        D: IntoIterator,
        D::Item: Display,
        B: IntoIterator,
        B::Item: Display,
    {
        ClusterRotationConfig {
            manager: ManagerRole {
                members: manager_ids
                    .into_iter()
                    .map(|id| ManagerNode::empty(id.to_string()))
                    .collect(),
                ..ManagerRole::default()
            },
            database: service_role(database_ids),
            broker: service_role(broker_ids),
        }
    }

    pub fn from_topology(topology: &ClusterTopology) -> ClusterRotationConfig {
        Self::build(
            &topology.manager_ips,
            &topology.database_ips,
            &topology.broker_ips,
        )
    }

    /// Discover the cluster and build its scaffold
    pub async fn discover(source: &dyn TopologySource) -> Result<ClusterRotationConfig> {
        let topology = source.instance_ips().await?;
        info!(
            managers = topology.manager_ips.len(),
            databases = topology.database_ips.len(),
            brokers = topology.broker_ips.len(),
            "Building certificate replacement scaffold"
        );
        Ok(Self::from_topology(&topology))
    }
}

fn service_role<I>(ids: I) -> ServiceRole
where
    I: IntoIterator,
    I::Item: Display,
{
    ServiceRole {
        members: ids
            .into_iter()
            .map(|id| ServiceNode::empty(id.to_string()))
            .collect(),
        new_ca_cert: String::new(),
    }
}
