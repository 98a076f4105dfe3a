use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str =
    "toolkit_api=debug,toolkit_processing=debug,toolkit_storage=debug,tower_http=debug";

/// Initialize tracing with an `EnvFilter` (`RUST_LOG` overrides the default filter)
pub fn init_telemetry() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    tracing::debug!("Tracing initialized");
    Ok(())
}
