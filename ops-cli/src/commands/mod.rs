pub mod profile;
pub mod replace_certificates;

use std::path::PathBuf;

use crate::cli::Command;
use crate::config::CliSettings;

/// Run one parsed command
pub async fn dispatch(
    command: Command,
    settings: &CliSettings,
    profile_path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let profile_path = profile_path.unwrap_or_else(|| settings.profile_path.clone());
    match command {
        Command::ReplaceCertificates(cmd) => {
            replace_certificates::run(cmd, settings, &profile_path).await
        }
        Command::Profile(cmd) => profile::run(cmd, &profile_path),
    }
}
