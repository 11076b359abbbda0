use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// ClusterCerts operations CLI
#[derive(Parser, Debug)]
#[command(name = "certctl")]
#[command(about = "Prepare and run certificate replacement across a cluster", version)]
pub struct Cli {
    /// Profile file holding the SSH identity and trusted REST CA
    #[arg(long, global = true, env = "CERTCTL_PROFILE")]
    pub profile: Option<PathBuf>,

    /// Settings file (YAML or TOML)
    #[arg(long, global = true, env = "CERTCTL_SETTINGS")]
    pub settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Handle the certificates replacement procedure
    #[command(name = "replace-certificates", subcommand)]
    ReplaceCertificates(ReplaceCommand),

    /// Show or edit the active profile
    #[command(subcommand)]
    Profile(ProfileCommand),
}

#[derive(Subcommand, Debug)]
pub enum ReplaceCommand {
    /// Generate the configuration file needed for certificates replacement
    #[command(name = "generate-config")]
    GenerateConfig {
        /// Where to write the configuration file
        #[arg(short, long)]
        output_path: Option<PathBuf>,

        /// YAML file listing manager_ips, database_ips and broker_ips
        #[arg(long)]
        topology: Option<PathBuf>,

        /// Manager node address (repeatable)
        #[arg(long = "manager-ip")]
        manager_ips: Vec<String>,

        /// Database node address (repeatable)
        #[arg(long = "database-ip")]
        database_ips: Vec<String>,

        /// Broker node address (repeatable)
        #[arg(long = "broker-ip")]
        broker_ips: Vec<String>,
    },

    /// Validate the configuration file without replacing anything
    Validate {
        /// The certificates replacement configuration file
        #[arg(short, long)]
        input_path: Option<PathBuf>,

        /// Allow changing only a CA and not the certificates signed by it
        #[arg(short, long)]
        force: bool,
    },

    /// Replace certificates after updating the configuration file
    Start {
        /// The certificates replacement configuration file
        #[arg(short, long)]
        input_path: Option<PathBuf>,

        /// Allow changing only a CA and not the certificates signed by it
        #[arg(short, long)]
        force: bool,

        /// Where to write the replacement plan for the remote stage
        #[arg(long)]
        handoff: Option<PathBuf>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommand {
    /// Print the active profile
    Show,

    /// Update fields of the active profile
    Set {
        #[arg(long)]
        ssh_user: Option<String>,

        /// Path of the SSH private key
        #[arg(long)]
        ssh_key: Option<String>,

        #[arg(long)]
        ssh_port: Option<u16>,

        #[arg(long)]
        manager_ip: Option<String>,
    },
}
