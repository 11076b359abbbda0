use std::path::{Path, PathBuf};

use colored::*;
use error_common::{log_error, Result};
use rotation_engine::replace::{self, ReplaceOptions};
use rotation_engine::{
    document, ClusterTopology, ConfigValidationEngine, HandoffReplacer, LocalPathChecker, Profile,
    Role, ScaffoldBuilder,
};
use tracing::{info, warn};

use crate::cli::ReplaceCommand;
use crate::config::CliSettings;

const CONTEXT: &str = "replace-certificates";

pub async fn run(
    cmd: ReplaceCommand,
    settings: &CliSettings,
    profile_path: &Path,
) -> anyhow::Result<()> {
    let result = match cmd {
        ReplaceCommand::GenerateConfig {
            output_path,
            topology,
            manager_ips,
            database_ips,
            broker_ips,
        } => {
            let output = output_path.unwrap_or_else(|| settings.config_path.clone());
            match load_topology(topology.as_deref(), manager_ips, database_ips, broker_ips) {
                Ok(snapshot) => generate_config(&snapshot, &output).await,
                Err(e) => Err(e),
            }
        }
        ReplaceCommand::Validate { input_path, force } => {
            validate(options(input_path, force, settings))
        }
        ReplaceCommand::Start {
            input_path,
            force,
            handoff,
        } => {
            let handoff = handoff.unwrap_or_else(|| settings.handoff_path.clone());
            start(options(input_path, force, settings), profile_path, handoff).await
        }
    };

    result.map_err(|e| {
        log_error(CONTEXT, &e);
        anyhow::Error::new(e)
    })
}

fn options(input_path: Option<PathBuf>, force: bool, settings: &CliSettings) -> ReplaceOptions {
    ReplaceOptions {
        input_path: Some(input_path.unwrap_or_else(|| settings.config_path.clone())),
        force,
    }
}

/// Topology snapshot file, if any, plus the addresses given on the command line
fn load_topology(
    file: Option<&Path>,
    manager_ips: Vec<String>,
    database_ips: Vec<String>,
    broker_ips: Vec<String>,
) -> Result<ClusterTopology> {
    let mut snapshot = match file {
        Some(path) => ClusterTopology::from_file(path)?,
        None => ClusterTopology::default(),
    };
    snapshot.extend(manager_ips, database_ips, broker_ips);
    Ok(snapshot)
}

async fn generate_config(topology: &ClusterTopology, output: &Path) -> Result<()> {
    if topology.is_empty() {
        warn!("No cluster nodes were given; every role section will be empty");
    }
    let config = ScaffoldBuilder::discover(topology).await?;
    document::save(&config, output)?;
    for role in Role::ALL {
        info!("{:>8}: {} node(s)", role, config.member_count(role));
    }
    Ok(())
}

fn validate(options: ReplaceOptions) -> Result<()> {
    let engine = ConfigValidationEngine::new(LocalPathChecker);
    let report = replace::preflight(&engine, &options)?;
    if !report.notices.is_empty() {
        warn!(
            "{} CA change(s) forced without replacing every certificate signed by them",
            report.notices.len()
        );
    }
    println!("{}", "The replace-certificates configuration is valid".bright_green());
    Ok(())
}

async fn start(options: ReplaceOptions, profile_path: &Path, handoff: PathBuf) -> Result<()> {
    let mut profile = Profile::load(profile_path)?;
    let access = profile.require_remote_access()?;
    let replacer = HandoffReplacer::new(handoff, access);
    let engine = ConfigValidationEngine::new(LocalPathChecker);

    replace::start_and_persist(&mut profile, profile_path, &engine, &replacer, &options)
        .await?;
    println!("{}", "Successfully replaced certificates".bright_green());
    Ok(())
}
