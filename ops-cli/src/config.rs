// CLI settings: defaults, optional settings file, CERTCTL_* environment
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use error_common::{Result, RotationError};
use rotation_engine::document::DEFAULT_CONFIG_PATH;
use serde::{Deserialize, Serialize};

const DEFAULT_HANDOFF_PATH: &str = "certificates_replacement_plan.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CliSettings {
    /// Active profile file
    pub profile_path: PathBuf,
    /// Default replacement configuration document
    pub config_path: PathBuf,
    /// Default handoff plan written by `start`
    pub handoff_path: PathBuf,
    pub log_level: String,
}

impl Default for CliSettings {
    fn default() -> Self {
        Self {
            profile_path: config_dir().join("profile.yaml"),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
            handoff_path: PathBuf::from(DEFAULT_HANDOFF_PATH),
            log_level: "info".to_string(),
        }
    }
}

impl CliSettings {
    /// Layer defaults, the settings file and the environment, in that order.
    /// An explicitly named settings file must exist.
    pub fn load(settings_file: Option<&Path>) -> Result<Self> {
        let defaults = Self::default();
        let file = match settings_file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::from(config_dir().join("settings.yaml")).required(false),
        };

        config::Config::builder()
            .set_default("profile_path", path_value(&defaults.profile_path))
            .and_then(|b| b.set_default("config_path", path_value(&defaults.config_path)))
            .and_then(|b| b.set_default("handoff_path", path_value(&defaults.handoff_path)))
            .and_then(|b| b.set_default("log_level", defaults.log_level))
            .map_err(config_error)?
            .add_source(file)
            .add_source(config::Environment::with_prefix("CERTCTL"))
            .build()
            .and_then(|settings| settings.try_deserialize())
            .map_err(config_error)
    }
}

fn config_dir() -> PathBuf {
    ProjectDirs::from("dev", "ClusterCerts", "certctl")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".certctl"))
}

fn path_value(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}

fn config_error(err: config::ConfigError) -> RotationError {
    RotationError::Config(err.to_string())
}
