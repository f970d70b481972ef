use tracing_subscriber::{fmt, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

/// Initialize human-readable logging.
///
/// `RUST_LOG` wins when set, otherwise `default_level` applies (e.g. "info",
/// "nova_bridge=debug,warn"). Repeat calls are no-ops.
pub fn init_logging(service_name: &str, default_level: &str) {
    fmt()
        .with_env_filter(env_filter(default_level))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (human-readable)");
}

/// Initialize JSON logging, one object per line. Repeat calls are no-ops.
pub fn init_logging_json(service_name: &str, default_level: &str) {
    fmt()
        .json()
        .with_env_filter(env_filter(default_level))
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .with_level(true)
        .try_init()
        .ok();

    tracing::info!(service = service_name, "logging initialised (json)");
}

/// Pick the output format from a `general.log_format` value.
pub fn init_with_format(service_name: &str, default_level: &str, format: &str) {
    if format.eq_ignore_ascii_case("json") {
        init_logging_json(service_name, default_level);
    } else {
        init_logging(service_name, default_level);
    }
}
