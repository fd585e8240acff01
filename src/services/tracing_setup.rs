use tracing_subscriber::EnvFilter;

pub const LOG_ENV_VAR: &str = "VISA_FORECAST_LOG";

/// Initializes logging to stderr, filtered by `VISA_FORECAST_LOG` (default `warn`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A subscriber may already be installed when embedded; keep that one.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
