//! The `replace-certificates` workflow
//!
//! Gate on the operator profile, load the configuration, run the preflight
//! and only then drive the executor. Nothing reaches the executor unless the
//! preflight passed.

use std::path::{Path, PathBuf};

use error_common::{Result, RotationError};
use tracing::info;

use crate::document;
use crate::executor::CertificateReplacer;
use crate::model::ClusterRotationConfig;
use crate::profile::Profile;
use crate::providers::PathChecker;
use crate::validation::{ConfigValidationEngine, PropagationGap, ValidationReport};

#[derive(Debug, Clone, Default)]
pub struct ReplaceOptions {
    /// Configuration document; the default path when `None`
    pub input_path: Option<PathBuf>,
    /// Downgrade CA propagation gaps to notices
    pub force: bool,
}

/// Result of a successful replacement
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceOutcome {
    pub notices: Vec<PropagationGap>,
    /// Set when the profile now trusts a new REST CA and must be saved
    pub new_cli_ca_cert: Option<String>,
}

/// Resolve and load the configuration document, then validate it.
fn load_and_validate<P: PathChecker>(
    engine: &ConfigValidationEngine<P>,
    options: &ReplaceOptions,
) -> Result<(ClusterRotationConfig, ValidationReport)> {
    let path = document::resolve_input_path(options.input_path.as_deref())?;
    let config = document::load(&path)?;
    info!("Validating replace-certificates config file...");
    let report = engine.validate(&config, options.force).into_result()?;
    Ok((config, report))
}

/// Load the configuration and run the preflight only.
pub fn preflight<P: PathChecker>(
    engine: &ConfigValidationEngine<P>,
    options: &ReplaceOptions,
) -> Result<ValidationReport> {
    load_and_validate(engine, options).map(|(_, report)| report)
}

/// Full replacement. On success the profile holds the new REST CA, if any.
pub async fn start<P, R>(
    profile: &mut Profile,
    engine: &ConfigValidationEngine<P>,
    replacer: &R,
    options: &ReplaceOptions,
) -> Result<ReplaceOutcome>
where
    P: PathChecker,
    R: CertificateReplacer + ?Sized,
{
    profile.require_remote_access()?;
    let (config, report) = load_and_validate(engine, options)?;

    replacer.validate_certificates(&config).await?;
    info!("Replacing certificates...");
    let new_cli_ca_cert = replacer.replace_certificates(&config).await?;
    if let Some(cert) = &new_cli_ca_cert {
        profile.rest_certificate = Some(cert.clone());
    }
    info!("Successfully replaced certificates");

    Ok(ReplaceOutcome {
        notices: report.notices,
        new_cli_ca_cert,
    })
}

/// [`start`], then write the profile back to `profile_path` when it now
/// trusts a new REST CA. The file is left untouched otherwise.
pub async fn start_and_persist<P, R>(
    profile: &mut Profile,
    profile_path: &Path,
    engine: &ConfigValidationEngine<P>,
    replacer: &R,
    options: &ReplaceOptions,
) -> Result<ReplaceOutcome>
where
    P: PathChecker,
    R: CertificateReplacer + ?Sized,
{
    let outcome = start(profile, engine, replacer, options).await?;
    if outcome.new_cli_ca_cert.is_some() {
        profile.save(profile_path).map_err(|e| {
            RotationError::Config(format!(
                "Certificates were replaced but the profile could not be updated: {}",
                e
            ))
        })?;
        info!("Profile updated with the new REST CA certificate");
    }
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::MockCertificateReplacer;
    use crate::providers::LocalPathChecker;
    use mockall::Sequence;
    use tempfile::TempDir;

    fn ready_profile() -> Profile {
        Profile {
            ssh_user: Some("centos".to_string()),
            ssh_key: Some("/keys/id_rsa".to_string()),
            ..Profile::default()
        }
    }

    fn write_config(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, body).unwrap();
        path
    }

    fn empty_config(dir: &TempDir) -> PathBuf {
        write_config(dir, "manager: {}\ndatabase: {}\nbroker: {}\n")
    }

    fn replacer_returning(ca: Option<&str>) -> MockCertificateReplacer {
        let ca = ca.map(str::to_string);
        let mut replacer = MockCertificateReplacer::new();
        replacer
            .expect_validate_certificates()
            .times(1)
            .returning(|_| Ok(()));
        replacer
            .expect_replace_certificates()
            .times(1)
            .returning(move |_| Ok(ca.clone()));
        replacer
    }

    fn options(path: &Path, force: bool) -> ReplaceOptions {
        ReplaceOptions {
            input_path: Some(path.to_path_buf()),
            force,
        }
    }

    /// A config whose manager CA exists but no manager leaf was rotated
    fn partial_ca_config(dir: &TempDir) -> PathBuf {
        let ca = dir.path().join("ca.pem");
        std::fs::write(&ca, "ca").unwrap();
        write_config(
            dir,
            &format!(
                "manager:\n  members:\n    - host_ip: 10.0.0.1\n  new_ca_cert: {}\n\
                 database: {{}}\nbroker: {{}}\n",
                ca.display()
            ),
        )
    }

    #[tokio::test]
    async fn test_missing_ssh_identity_fails_before_anything() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_config(&dir);
        let replacer = MockCertificateReplacer::new();
        let mut profile = Profile::default();

        let err = start(
            &mut profile,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RotationError::Setup(_)));
    }

    #[tokio::test]
    async fn test_failed_preflight_never_reaches_executor() {
        let dir = tempfile::tempdir().unwrap();
        let path = partial_ca_config(&dir);
        let replacer = MockCertificateReplacer::new();
        let mut profile = ready_profile();

        let err = start(
            &mut profile,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, false),
        )
        .await
        .unwrap_err();
        assert_eq!(err.diagnostics().len(), 1);
        assert!(err.diagnostics()[0]
            .starts_with("new_ca_cert was specified for instance manager"));
    }

    #[tokio::test]
    async fn test_forced_run_calls_executor_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = partial_ca_config(&dir);
        let mut replacer = MockCertificateReplacer::new();
        let mut seq = Sequence::new();
        replacer
            .expect_validate_certificates()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        replacer
            .expect_replace_certificates()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(Some("-----BEGIN CERTIFICATE-----".to_string())));
        let mut profile = ready_profile();

        let outcome = start(
            &mut profile,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, true),
        )
        .await
        .unwrap();

        assert_eq!(outcome.notices.len(), 1);
        assert_eq!(
            profile.rest_certificate.as_deref(),
            Some("-----BEGIN CERTIFICATE-----")
        );
    }

    #[tokio::test]
    async fn test_executor_validation_failure_stops_replacement() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_config(&dir);
        let mut replacer = MockCertificateReplacer::new();
        replacer
            .expect_validate_certificates()
            .times(1)
            .returning(|_| Err(RotationError::Executor("node unreachable".to_string())));
        replacer.expect_replace_certificates().never();
        let mut profile = ready_profile();

        let err = start(
            &mut profile,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, false),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RotationError::Executor(_)));
        assert_eq!(profile.rest_certificate, None);
    }

    #[test]
    fn test_preflight_missing_document() {
        let dir = tempfile::tempdir().unwrap();
        let err = preflight(
            &ConfigValidationEngine::new(LocalPathChecker),
            &options(&dir.path().join("absent.yaml"), false),
        )
        .unwrap_err();
        assert!(matches!(err, RotationError::Setup(_)));
    }

    #[test]
    fn test_preflight_structural_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "manager: {}\n");
        let err = preflight(&ConfigValidationEngine::new(LocalPathChecker), &options(&path, false))
            .unwrap_err();
        assert!(matches!(err, RotationError::Structural(_)));
    }

    #[tokio::test]
    async fn test_new_rest_ca_is_written_to_profile_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_config(&dir);
        let profile_path = dir.path().join("profile.yaml");
        ready_profile().save(&profile_path).unwrap();
        let replacer = replacer_returning(Some("/certs/new-rest-ca.pem"));
        let mut profile = Profile::load(&profile_path).unwrap();

        let outcome = start_and_persist(
            &mut profile,
            &profile_path,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, false),
        )
        .await
        .unwrap();

        assert_eq!(
            outcome.new_cli_ca_cert.as_deref(),
            Some("/certs/new-rest-ca.pem")
        );
        let reloaded = Profile::load(&profile_path).unwrap();
        assert_eq!(
            reloaded.rest_certificate.as_deref(),
            Some("/certs/new-rest-ca.pem")
        );
        assert_eq!(reloaded.ssh_user.as_deref(), Some("centos"));
    }

    #[tokio::test]
    async fn test_profile_file_untouched_without_new_ca() {
        let dir = tempfile::tempdir().unwrap();
        let path = empty_config(&dir);
        let profile_path = dir.path().join("profile.yaml");
        std::fs::write(
            &profile_path,
            "# operator profile\nssh_user: centos\nssh_key: /keys/id_rsa\n",
        )
        .unwrap();
        let before = std::fs::read(&profile_path).unwrap();
        let replacer = replacer_returning(None);
        let mut profile = Profile::load(&profile_path).unwrap();

        let outcome = start_and_persist(
            &mut profile,
            &profile_path,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, false),
        )
        .await
        .unwrap();

        assert_eq!(outcome.new_cli_ca_cert, None);
        assert_eq!(std::fs::read(&profile_path).unwrap(), before);
    }

    #[tokio::test]
    async fn test_failed_preflight_leaves_profile_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = partial_ca_config(&dir);
        let profile_path = dir.path().join("profile.yaml");
        ready_profile().save(&profile_path).unwrap();
        let before = std::fs::read(&profile_path).unwrap();
        let replacer = MockCertificateReplacer::new();
        let mut profile = ready_profile();

        let err = start_and_persist(
            &mut profile,
            &profile_path,
            &ConfigValidationEngine::new(LocalPathChecker),
            &replacer,
            &options(&path, false),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, RotationError::Validation(_)));
        assert_eq!(std::fs::read(&profile_path).unwrap(), before);
    }
}
