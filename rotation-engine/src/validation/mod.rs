//! Preflight validation of a certificate replacement configuration
//!
//! The engine walks the whole document and never stops at the first
//! problem. Traversal order, which is also the order of the diagnostics:
//!
//! 1. `database`: cert/key pair of every member, then `new_ca_cert`
//! 2. `broker`: same as `database`
//! 3. `manager`: the three pairs of every member, then `new_ca_cert`
//!    against `new_internal_cert`, `new_external_ca_cert` against
//!    `new_external_cert`, and the *database* `new_ca_cert` against the
//!    manager members' `new_postgresql_client_cert`
//! 4. `manager.new_ldap_ca_cert`: existence only
//!
//! A rotated CA whose leaf certificates are not all rotated is a blocking
//! diagnostic, or an informational notice when `force` is set.

mod ca;
mod diagnostic;
mod pair;

pub use ca::{propagation_finding, CaValidator};
pub use diagnostic::{Diagnostic, Finding, PropagationGap};
pub use pair::PairValidator;

use error_common::{Result, RotationError, ValidationFailure};
use tracing::{debug, info};

use crate::model::{CaField, ClusterMember, ClusterRotationConfig, LeafField, Role, ServiceRole};
use crate::providers::{LocalPathChecker, PathChecker};

/// Missing-path diagnostic for a set path that does not exist
pub(crate) fn missing_path<P: PathChecker + ?Sized>(
    checker: &P,
    path: &str,
) -> Option<Diagnostic> {
    if path.is_empty() || checker.exists(path) {
        None
    } else {
        Some(Diagnostic::missing_path(path))
    }
}

/// Final go/no-go of a validation run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Pass,
    Fail(Vec<Diagnostic>),
}

impl Verdict {
    pub fn is_pass(&self) -> bool {
        matches!(self, Verdict::Pass)
    }
}

/// Everything one validation run found
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationReport {
    /// Blocking problems, in traversal order
    pub diagnostics: Vec<Diagnostic>,
    /// Propagation gaps downgraded by `force`
    pub notices: Vec<PropagationGap>,
}

impl ValidationReport {
    fn record(&mut self, finding: Finding) {
        match finding {
            Finding::Blocking(diagnostic) => self.diagnostics.push(diagnostic),
            Finding::Informational(gap) => {
                info!("{}", gap);
                self.notices.push(gap);
            }
        }
    }

    fn extend_blocking(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        self.diagnostics.extend(diagnostics);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn verdict(&self) -> Verdict {
        if self.is_clean() {
            Verdict::Pass
        } else {
            Verdict::Fail(self.diagnostics.clone())
        }
    }

    /// All diagnostics as one combined error, or the report if clean.
    pub fn into_result(self) -> Result<Self> {
        if self.is_clean() {
            return Ok(self);
        }
        let messages = self.diagnostics.iter().map(ToString::to_string).collect();
        Err(RotationError::Validation(ValidationFailure::new(messages)))
    }
}

/// Runs the pair and CA rules over a whole configuration
#[derive(Debug, Clone, Default)]
pub struct ConfigValidationEngine<P = LocalPathChecker> {
    checker: P,
}

impl<P: PathChecker> ConfigValidationEngine<P> {
    pub fn new(checker: P) -> Self {
        Self { checker }
    }

    pub fn validate(&self, config: &ClusterRotationConfig, force: bool) -> ValidationReport {
        let mut report = ValidationReport::default();

        let services = [
            (Role::Database, &config.database),
            (Role::Broker, &config.broker),
        ];
        for (role, section) in services {
            self.validate_service_role(&mut report, role, section, force);
        }
        self.validate_manager_role(&mut report, config, force);
        report.extend_blocking(missing_path(&self.checker, &config.manager.new_ldap_ca_cert));

        debug!(
            diagnostics = report.diagnostics.len(),
            notices = report.notices.len(),
            force,
            "Validated certificate replacement configuration"
        );
        report
    }

    fn validate_pairs<M: ClusterMember>(&self, report: &mut ValidationReport, members: &[M]) {
        let pairs = PairValidator::new(&self.checker);
        for member in members {
            for pair in M::PAIRS {
                report.extend_blocking(pairs.validate(member, pair.cert, pair.key));
            }
        }
    }

    fn validate_service_role(
        &self,
        report: &mut ValidationReport,
        role: Role,
        section: &ServiceRole,
        force: bool,
    ) {
        self.validate_pairs(report, &section.members);
        let findings = CaValidator::new(&self.checker, force).validate(
            section.ca(CaField::CaCert),
            role,
            CaField::CaCert,
            LeafField::Cert,
            &section.members,
        );
        findings.into_iter().for_each(|f| report.record(f));
    }

    fn validate_manager_role(
        &self,
        report: &mut ValidationReport,
        config: &ClusterRotationConfig,
        force: bool,
    ) {
        let managers = &config.manager.members;
        self.validate_pairs(report, managers);

        let ca = CaValidator::new(&self.checker, force);
        let checks = [
            (
                config.manager.ca(CaField::CaCert),
                Role::Manager,
                CaField::CaCert,
                LeafField::InternalCert,
            ),
            (
                config.manager.ca(CaField::ExternalCaCert),
                Role::Manager,
                CaField::ExternalCaCert,
                LeafField::ExternalCert,
            ),
            // Manager nodes hold the client certs trusted by the database CA.
            (
                config.database.ca(CaField::CaCert),
                Role::Database,
                CaField::CaCert,
                LeafField::PostgresqlClientCert,
            ),
        ];
        for (ca_path, role, ca_field, leaf_field) in checks {
            ca.validate(ca_path, role, ca_field, leaf_field, managers)
                .into_iter()
                .for_each(|f| report.record(f));
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{ManagerNode, ServiceNode};
    use std::collections::HashSet;

    /// Path checker answering from a fixed set
    #[derive(Debug, Default)]
    pub(crate) struct KnownPaths(HashSet<String>);

    impl KnownPaths {
        pub(crate) fn new<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
            Self(paths.into_iter().map(str::to_string).collect())
        }
    }

    impl PathChecker for KnownPaths {
        fn exists(&self, path: &str) -> bool {
            !path.is_empty() && self.0.contains(path)
        }
    }

    fn service(host_ip: &str, cert: &str, key: &str) -> ServiceNode {
        ServiceNode {
            host_ip: host_ip.to_string(),
            new_cert: cert.to_string(),
            new_key: key.to_string(),
        }
    }

    #[test]
    fn test_empty_config_passes() {
        let engine = ConfigValidationEngine::new(KnownPaths::default());
        let report = engine.validate(&ClusterRotationConfig::default(), false);

        assert_eq!(report.verdict(), Verdict::Pass);
        assert!(report.notices.is_empty());
        assert!(report.into_result().is_ok());
    }

    #[test]
    fn test_database_cert_without_key() {
        let engine = ConfigValidationEngine::new(KnownPaths::new(["/db.crt"]));
        let mut config = ClusterRotationConfig::default();
        config.database.members.push(service("10.0.1.1", "/db.crt", ""));

        let report = engine.validate(&config, false);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::UnpairedCertificate {
                host_ip: "10.0.1.1".to_string(),
                cert_field: LeafField::Cert,
                key_field: LeafField::Key,
            }]
        );
        assert!(report.diagnostics[0].to_string().contains("new_key"));
    }

    #[test]
    fn test_manager_internal_ca_not_propagated() {
        let engine = ConfigValidationEngine::new(KnownPaths::new(["/ca.pem", "/a.crt", "/a.key"]));
        let mut config = ClusterRotationConfig::default();
        config.manager.new_ca_cert = "/ca.pem".to_string();
        config.manager.members = vec![
            ManagerNode {
                new_internal_cert: "/a.crt".to_string(),
                new_internal_key: "/a.key".to_string(),
                ..ManagerNode::empty("10.0.0.1")
            },
            ManagerNode::empty("10.0.0.2"),
        ];

        let report = engine.validate(&config, false);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::CaNotPropagated(PropagationGap {
                role: Role::Manager,
                ca_field: CaField::CaCert,
                leaf_field: LeafField::InternalCert,
            })]
        );
        assert!(!report.verdict().is_pass());

        let forced = engine.validate(&config, true);
        assert!(forced.verdict().is_pass());
        assert_eq!(forced.notices.len(), 1);
    }

    #[test]
    fn test_database_ca_checked_against_manager_client_certs() {
        let engine = ConfigValidationEngine::new(KnownPaths::new([
            "/db-ca.pem",
            "/db.crt",
            "/db.key",
        ]));
        let mut config = ClusterRotationConfig::default();
        config.database.new_ca_cert = "/db-ca.pem".to_string();
        config.database.members.push(service("10.0.1.1", "/db.crt", "/db.key"));
        config.manager.members.push(ManagerNode::empty("10.0.0.1"));

        let report = engine.validate(&config, false);
        assert_eq!(
            report.diagnostics,
            vec![Diagnostic::CaNotPropagated(PropagationGap {
                role: Role::Database,
                ca_field: CaField::CaCert,
                leaf_field: LeafField::PostgresqlClientCert,
            })]
        );
    }

    #[test]
    fn test_missing_database_ca_reported_by_both_passes() {
        let engine = ConfigValidationEngine::new(KnownPaths::default());
        let mut config = ClusterRotationConfig::default();
        config.database.new_ca_cert = "/db-ca.pem".to_string();
        config.manager.members.push(ManagerNode::empty("10.0.0.1"));

        let report = engine.validate(&config, false);
        assert_eq!(
            report.diagnostics,
            vec![
                Diagnostic::missing_path("/db-ca.pem"),
                Diagnostic::missing_path("/db-ca.pem"),
            ]
        );
        assert!(report.notices.is_empty());
    }

    #[test]
    fn test_ldap_ca_existence_only() {
        let engine = ConfigValidationEngine::new(KnownPaths::default());
        let mut config = ClusterRotationConfig::default();
        config.manager.new_ldap_ca_cert = "/ldap-ca.pem".to_string();
        config.manager.members.push(ManagerNode::empty("10.0.0.1"));

        let report = engine.validate(&config, false);
        assert_eq!(report.diagnostics, vec![Diagnostic::missing_path("/ldap-ca.pem")]);
    }

    #[test]
    fn test_traversal_order_database_broker_manager_ldap() {
        let engine = ConfigValidationEngine::new(KnownPaths::default());
        let mut config = ClusterRotationConfig::default();
        config.manager.new_ldap_ca_cert = "/ldap.pem".to_string();
        config.manager.members.push(ManagerNode {
            new_external_cert: "/m.crt".to_string(),
            ..ManagerNode::empty("m1")
        });
        config.broker.members.push(service("b1", "", "/b.key"));
        config.database.members.push(service("d1", "/d.crt", "/d.key"));

        let messages: Vec<String> = engine
            .validate(&config, false)
            .diagnostics
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            messages,
            vec![
                "The path /d.crt does not exist.",
                "The path /d.key does not exist.",
                "Either both new_cert and new_key must be provided, or neither, for host b1.",
                "The path /b.key does not exist.",
                "Either both new_external_cert and new_external_key must be provided, or neither, for host m1.",
                "The path /m.crt does not exist.",
                "The path /ldap.pem does not exist.",
            ]
        );
    }

    #[test]
    fn test_into_result_combines_every_diagnostic() {
        let engine = ConfigValidationEngine::new(KnownPaths::default());
        let mut config = ClusterRotationConfig::default();
        config.broker.new_ca_cert = "/broker-ca.pem".to_string();
        config.broker.members.push(service("b1", "/b.crt", "/b.key"));

        let err = engine.validate(&config, false).into_result().unwrap_err();
        assert_eq!(
            err.diagnostics(),
            &[
                "The path /b.crt does not exist.".to_string(),
                "The path /b.key does not exist.".to_string(),
                "The path /broker-ca.pem does not exist.".to_string(),
            ]
        );
    }
}
