use std::fmt;

use thiserror::Error;

use crate::model::{CaField, LeafField, Role};

/// A single validation problem found in the configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    #[error(
        "Either both {cert_field} and {key_field} must be provided, or neither, for host {host_ip}."
    )]
    UnpairedCertificate {
        host_ip: String,
        cert_field: LeafField,
        key_field: LeafField,
    },

    #[error("The path {path} does not exist.")]
    MissingPath { path: String },

    #[error("{0} Please use the force option if you still wish to replace the certificates.")]
    CaNotPropagated(PropagationGap),
}

impl Diagnostic {
    pub fn missing_path(path: &str) -> Self {
        Diagnostic::MissingPath {
            path: path.to_string(),
        }
    }
}

/// A CA was rotated for a role while some member keeps its old leaf cert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropagationGap {
    pub role: Role,
    pub ca_field: CaField,
    pub leaf_field: LeafField,
}

impl fmt::Display for PropagationGap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} was specified for instance {}, but {} was not specified for all cluster members.",
            self.ca_field, self.role, self.leaf_field
        )
    }
}

/// Outcome of a rule that the force flag may downgrade
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Finding {
    /// Stops the replacement
    Blocking(Diagnostic),
    /// Logged for the operator; the replacement proceeds
    Informational(PropagationGap),
}
