use tracing_subscriber::EnvFilter;

/// Initialize tracing. `RUST_LOG` wins over the configured level; `verbose`
/// raises the fallback to `debug`.
pub fn init_tracing(verbose: bool, default_level: &str) -> anyhow::Result<()> {
    let fallback = if verbose { "debug" } else { default_level };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)),
        )
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))
}
