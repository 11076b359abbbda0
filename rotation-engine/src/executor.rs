//! Certificate replacement executor seam
//!
//! The executor applies a validated configuration to the cluster. It is
//! called only after a passing preflight, first to validate the new
//! material against the live nodes and then to replace it.
//!
//! [`HandoffReplacer`] is the executor bundled with the CLI: it checks that
//! every referenced file is readable and writes a JSON handoff plan for the
//! remote replacement stage.

use std::collections::BTreeMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use error_common::{Result, RotationError};
use serde::Serialize;
use tracing::{debug, info};

use crate::model::{ClusterMember, ClusterRotationConfig, Role};
use crate::profile::RemoteAccess;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CertificateReplacer: Send + Sync {
    /// Deeper checks of the new material against the live cluster
    async fn validate_certificates(&self, config: &ClusterRotationConfig) -> Result<()>;

    /// Apply the new material. Returns the new CA certificate the CLI must
    /// trust from now on, if it changed.
    async fn replace_certificates(&self, config: &ClusterRotationConfig) -> Result<Option<String>>;
}

/// New material for one node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandoffNode {
    pub role: Role,
    pub host_ip: String,
    /// Field name to local path, set fields only
    pub files: BTreeMap<String, String>,
}

/// A new CA certificate of a role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HandoffCa {
    pub role: Role,
    pub field: String,
    pub path: String,
}

/// What the remote replacement stage has to apply
#[derive(Debug, Clone, Serialize)]
pub struct HandoffPlan {
    pub generated_at: DateTime<Utc>,
    pub ssh_user: String,
    pub ssh_key: String,
    pub nodes: Vec<HandoffNode>,
    pub ca_certs: Vec<HandoffCa>,
}

impl HandoffPlan {
    pub fn from_config(config: &ClusterRotationConfig, access: &RemoteAccess) -> Self {
        let mut nodes = handoff_nodes(Role::Manager, &config.manager.members);
        nodes.extend(handoff_nodes(Role::Database, &config.database.members));
        nodes.extend(handoff_nodes(Role::Broker, &config.broker.members));

        let ca_certs = config
            .ca_paths()
            .into_iter()
            .map(|(role, field, path)| HandoffCa {
                role,
                field: field.as_str().to_string(),
                path: path.to_string(),
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            ssh_user: access.ssh_user.clone(),
            ssh_key: access.ssh_key.clone(),
            nodes,
            ca_certs,
        }
    }

    /// Every local file the plan refers to
    pub fn referenced_files(&self) -> Vec<&str> {
        self.nodes
            .iter()
            .flat_map(|node| node.files.values())
            .chain(self.ca_certs.iter().map(|ca| &ca.path))
            .map(String::as_str)
            .collect()
    }
}

fn handoff_nodes<M: ClusterMember>(role: Role, members: &[M]) -> Vec<HandoffNode> {
    members
        .iter()
        .filter_map(|member| {
            let files: BTreeMap<String, String> = M::PAIRS
                .iter()
                .flat_map(|pair| [pair.cert, pair.key])
                .filter(|field| !member.leaf(*field).is_empty())
                .map(|field| (field.as_str().to_string(), member.leaf(field).to_string()))
                .collect();
            (!files.is_empty()).then(|| HandoffNode {
                role,
                host_ip: member.host_ip().to_string(),
                files,
            })
        })
        .collect()
}

/// Executor that hands the validated plan over as a JSON document
pub struct HandoffReplacer {
    output: PathBuf,
    access: RemoteAccess,
}

impl HandoffReplacer {
    pub fn new(output: impl Into<PathBuf>, access: RemoteAccess) -> Self {
        Self {
            output: output.into(),
            access,
        }
    }
}

#[async_trait]
impl CertificateReplacer for HandoffReplacer {
    async fn validate_certificates(&self, config: &ClusterRotationConfig) -> Result<()> {
        let plan = HandoffPlan::from_config(config, &self.access);
        let mut problems = Vec::new();
        for path in plan.referenced_files() {
            match tokio::fs::metadata(path).await {
                Ok(meta) if meta.is_file() => debug!("{} is readable", path),
                Ok(_) => problems.push(format!("{} is not a regular file", path)),
                Err(e) => problems.push(format!("{}: {}", path, e)),
            }
        }
        if !problems.is_empty() {
            return Err(RotationError::Executor(format!(
                "Unusable certificate files: {}",
                problems.join("; ")
            )));
        }
        Ok(())
    }

    async fn replace_certificates(&self, config: &ClusterRotationConfig) -> Result<Option<String>> {
        let plan = HandoffPlan::from_config(config, &self.access);
        let json = serde_json::to_string_pretty(&plan)?;
        tokio::fs::write(&self.output, json).await.map_err(|e| {
            RotationError::Executor(format!("Failed to write {}: {}", self.output.display(), e))
        })?;
        info!(
            nodes = plan.nodes.len(),
            ca_certs = plan.ca_certs.len(),
            "Replacement plan handed off to {}",
            self.output.display()
        );
        // The manager's REST CA is rotated by the remote stage, not here.
        Ok(None)
    }
}
