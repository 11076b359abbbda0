use clap::Parser;
use tracing::debug;

use ops_cli::{commands, logging, Cli, CliSettings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let settings = CliSettings::load(cli.settings.as_deref())?;
    logging::init_tracing(cli.verbose, &settings.log_level)?;
    debug!(?settings, "Loaded CLI settings");

    commands::dispatch(cli.command, &settings, cli.profile).await
}
