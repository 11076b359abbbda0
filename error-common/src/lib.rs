//! Common error handling for ClusterCerts
//!
//! All crates in the workspace report failures through [`RotationError`].
//! The variants follow the certificate-rotation failure classes:
//!
//! - **Structural**: the configuration document lacks a role section
//! - **Setup**: the operator profile or input file is not usable
//! - **Validation**: every blocking diagnostic of a run, as one error
//! - **Parse / Config / Topology / Executor / Io**: plumbing failures
//!
//! # Example
//!
//! ```rust
//! use error_common::{RotationError, ValidationFailure};
//!
//! let failure = ValidationFailure::new(vec!["The path /tmp/ca.pem does not exist.".into()]);
//! let err = RotationError::from(failure);
//! assert_eq!(err.diagnostics().len(), 1);
//! ```

pub mod reporting;
pub mod types;

pub use reporting::*;
pub use types::*;
