//! Reading and writing the replacement configuration document (YAML)

use std::path::{Path, PathBuf};

use error_common::{Result, RotationError};
use serde_yaml::{Mapping, Value};
use tracing::info;

use crate::model::{ClusterRotationConfig, Role};

/// Default location of the configuration document, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "certificates_replacement_config.yaml";

/// Parse a document, failing fast when a role section is absent.
pub fn from_yaml_str(raw: &str) -> Result<ClusterRotationConfig> {
    let value: Value = serde_yaml::from_str(raw)?;
    check_structure(&value)?;
    Ok(serde_yaml::from_value(value)?)
}

pub fn to_yaml_string(config: &ClusterRotationConfig) -> Result<String> {
    Ok(serde_yaml::to_string(config)?)
}

pub fn load(path: &Path) -> Result<ClusterRotationConfig> {
    let raw = std::fs::read_to_string(path)?;
    from_yaml_str(&raw)
}

pub fn save(config: &ClusterRotationConfig, path: &Path) -> Result<()> {
    std::fs::write(path, to_yaml_string(config)?)?;
    info!(
        "The certificates replacement configuration file was saved to {}",
        path.display()
    );
    Ok(())
}

/// The input path to use, or a setup error if the document was never generated
pub fn resolve_input_path(input_path: Option<&Path>) -> Result<PathBuf> {
    let path = input_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
    if !path.exists() {
        return Err(RotationError::setup(format!(
            "{} not found. Please create the replace-certificates configuration file first \
             using the command `certctl replace-certificates generate-config`",
            path.display()
        )));
    }
    Ok(path)
}

fn check_structure(value: &Value) -> Result<()> {
    let root = value.as_mapping().ok_or_else(|| {
        RotationError::structural(
            "the configuration document must be a mapping with manager, database and broker sections",
        )
    })?;

    for role in Role::ALL {
        let section = role_section(root, role)
            .ok_or_else(|| RotationError::structural(format!("missing the `{}` section", role)))?;
        if !section.is_mapping() {
            return Err(RotationError::structural(format!(
                "the `{}` section must be a mapping",
                role
            )));
        }
    }
    Ok(())
}

fn role_section(root: &Mapping, role: Role) -> Option<&Value> {
    root.get(role.as_str())
        .or_else(|| role.legacy_name().and_then(|legacy| root.get(legacy)))
}
