//! Certificate rotation preflight engine for ClusterCerts
//!
//! This crate prepares a certificate replacement across a cluster of
//! management, database and message-broker nodes:
//! - Scaffold generation from the live topology (one empty entry per node)
//! - Typed configuration document with lenient YAML loading
//! - Pairing rules for every node's cert/key slots
//! - CA propagation rules, with a force override
//! - Aggregated diagnostics: every problem reported in one run
//! - Replacement workflow gated on the operator profile
//!
//! # Roles
//!
//! - **manager**: internal, external and postgresql-client cert/key pairs;
//!   internal, external and LDAP CA certificates
//! - **database**: one cert/key pair per node and a CA certificate
//! - **broker**: one cert/key pair per node and a CA certificate
//!
//! # Example
//!
//! ```rust
//! use rotation_engine::{ConfigValidationEngine, LocalPathChecker, ScaffoldBuilder};
//!
//! let config = ScaffoldBuilder::build(["10.0.0.1"], ["10.0.1.1"], ["10.0.2.1"]);
//! let report = ConfigValidationEngine::new(LocalPathChecker).validate(&config, false);
//! assert!(report.verdict().is_pass());
//! ```

pub mod document;
pub mod executor;
pub mod model;
pub mod profile;
pub mod providers;
pub mod replace;
pub mod scaffold;
pub mod topology;
pub mod validation;

pub use executor::{CertificateReplacer, HandoffPlan, HandoffReplacer};
pub use model::*;
pub use profile::{Profile, RemoteAccess};
pub use providers::{LocalPathChecker, PathChecker};
pub use scaffold::ScaffoldBuilder;
pub use topology::{ClusterTopology, TopologySource};
pub use validation::{
    CaValidator, ConfigValidationEngine, Diagnostic, Finding, PairValidator, PropagationGap,
    ValidationReport, Verdict,
};
