//! Operations CLI for ClusterCerts certificate rotation
//!
//! This crate provides the `certctl` command-line interface for:
//! - Generating the replacement configuration from the cluster topology
//! - Validating an edited configuration before anything is changed
//! - Running the replacement and updating the operator profile
//! - Managing the profile (SSH identity, trusted REST CA)
//!
//! # Example Usage
//!
//! ```bash
//! # Scaffold from known node addresses
//! certctl replace-certificates generate-config \
//!     --manager-ip 10.0.0.1 --database-ip 10.0.1.1 --broker-ip 10.0.2.1
//!
//! # Or from a topology snapshot
//! certctl replace-certificates generate-config --topology cluster.yaml -o certs.yaml
//!
//! # Preflight only
//! certctl replace-certificates validate -i certs.yaml
//!
//! # Configure the SSH identity, then replace
//! certctl profile set --ssh-user centos --ssh-key ~/.ssh/cluster.pem
//! certctl replace-certificates start -i certs.yaml --force
//! ```

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;

pub use cli::*;
pub use crate::config::CliSettings;
