//! Operator profile: how the CLI reaches the cluster

use std::path::Path;

use error_common::{Result, RotationError};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Profile persisted between CLI sessions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_user: Option<String>,
    /// Path of the SSH private key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ssh_port: Option<u16>,
    /// CA certificate the CLI trusts for the manager REST endpoint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rest_certificate: Option<String>,
}

/// Remote-access identity required before any replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemoteAccess {
    pub ssh_user: String,
    pub ssh_key: String,
}

impl Profile {
    /// Missing file loads as an empty profile.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No profile at {}, using an empty one", path.display());
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&raw).map_err(|e| {
            RotationError::Config(format!("Invalid profile {}: {}", path.display(), e))
        })
    }

    /// Written to a temporary sibling, then renamed into place.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let tmp = path.with_extension("yaml.tmp");
        std::fs::write(&tmp, yaml)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }

    pub fn require_remote_access(&self) -> Result<RemoteAccess> {
        match (configured(&self.ssh_user), configured(&self.ssh_key)) {
            (Some(ssh_user), Some(ssh_key)) => Ok(RemoteAccess { ssh_user, ssh_key }),
            _ => Err(RotationError::setup(
                "Please configure the profile ssh-key and ssh-user using the `certctl profile set` command",
            )),
        }
    }
}

fn configured(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
