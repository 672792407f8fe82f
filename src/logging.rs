// Logging bootstrap for the binaries
// `RUST_LOG` takes precedence over the configured level

use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// Returns an error string when a subscriber is already installed or the
/// level is not a valid filter directive.
pub fn init_logging(level: &str, json: bool) -> Result<(), String> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| format!("invalid log level `{}`: {}", level, e))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.map_err(|e| format!("failed to initialize logging: {}", e))
}
