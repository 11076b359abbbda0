//! Cluster topology: which hosts make up each role

use std::path::Path;

use async_trait::async_trait;
use error_common::{Result, RotationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Host identifiers per role, in discovery order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterTopology {
    #[serde(default)]
    pub manager_ips: Vec<String>,
    #[serde(default, alias = "postgresql_ips")]
    pub database_ips: Vec<String>,
    #[serde(default, alias = "rabbitmq_ips")]
    pub broker_ips: Vec<String>,
}

impl ClusterTopology {
    /// Load a topology snapshot from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RotationError::Topology(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let topology: ClusterTopology = serde_yaml::from_str(&raw)
            .map_err(|e| RotationError::Topology(format!("Invalid topology file: {}", e)))?;
        debug!(
            managers = topology.manager_ips.len(),
            databases = topology.database_ips.len(),
            brokers = topology.broker_ips.len(),
            "Loaded cluster topology from {}",
            path.display()
        );
        Ok(topology)
    }

    /// Append ids given explicitly by the operator
    pub fn extend(
        &mut self,
        manager_ips: impl IntoIterator<Item = String>,
        database_ips: impl IntoIterator<Item = String>,
        broker_ips: impl IntoIterator<Item = String>,
    ) {
        self.manager_ips.extend(manager_ips);
        self.database_ips.extend(database_ips);
        self.broker_ips.extend(broker_ips);
    }

    pub fn is_empty(&self) -> bool {
        self.manager_ips.is_empty() && self.database_ips.is_empty() && self.broker_ips.is_empty()
    }
}

/// Source of the live cluster topology
#[async_trait]
pub trait TopologySource: Send + Sync {
    async fn instance_ips(&self) -> Result<ClusterTopology>;
}

/// A fixed snapshot is its own topology source.
#[async_trait]
impl TopologySource for ClusterTopology {
    async fn instance_ips(&self) -> Result<ClusterTopology> {
        Ok(self.clone())
    }
}
