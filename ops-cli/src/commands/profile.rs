use std::path::Path;

use colored::*;
use rotation_engine::Profile;
use tracing::info;

use crate::cli::ProfileCommand;

pub fn run(cmd: ProfileCommand, profile_path: &Path) -> anyhow::Result<()> {
    match cmd {
        ProfileCommand::Show => {
            let profile = Profile::load(profile_path)?;
            println!("{}", format!("Profile {}", profile_path.display()).bright_cyan());
            print!("{}", serde_yaml::to_string(&profile)?);
            Ok(())
        }
        ProfileCommand::Set {
            ssh_user,
            ssh_key,
            ssh_port,
            manager_ip,
        } => {
            let mut profile = Profile::load(profile_path)?;
            apply_updates(&mut profile, ssh_user, ssh_key, ssh_port, manager_ip);
            profile.save(profile_path)?;
            info!("Profile saved to {}", profile_path.display());
            Ok(())
        }
    }
}

fn apply_updates(
    profile: &mut Profile,
    ssh_user: Option<String>,
    ssh_key: Option<String>,
    ssh_port: Option<u16>,
    manager_ip: Option<String>,
) {
    if ssh_user.is_some() {
        profile.ssh_user = ssh_user;
    }
    if ssh_key.is_some() {
        profile.ssh_key = ssh_key;
    }
    if ssh_port.is_some() {
        profile.ssh_port = ssh_port;
    }
    if manager_ip.is_some() {
        profile.manager_ip = manager_ip;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_unspecified_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profile.yaml");
        Profile {
            ssh_user: Some("centos".to_string()),
            rest_certificate: Some("/certs/ca.pem".to_string()),
            ..Profile::default()
        }
        .save(&path)
        .unwrap();

        run(
            ProfileCommand::Set {
                ssh_user: None,
                ssh_key: Some("/keys/id_rsa".to_string()),
                ssh_port: Some(2222),
                manager_ip: None,
            },
            &path,
        )
        .unwrap();

        let profile = Profile::load(&path).unwrap();
        assert_eq!(profile.ssh_user.as_deref(), Some("centos"));
        assert_eq!(profile.ssh_key.as_deref(), Some("/keys/id_rsa"));
        assert_eq!(profile.ssh_port, Some(2222));
        assert_eq!(profile.rest_certificate.as_deref(), Some("/certs/ca.pem"));
    }
}
