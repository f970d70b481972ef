//! nova-daemon: serves the mock business dashboard API.

use anyhow::Result;
use nova_core::config::Config;
use tracing::info;

use nova_daemon::daemon::Daemon;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> Result<()> {
    let loaded = Config::load();
    let config = loaded.as_ref().cloned().unwrap_or_default();

    nova_telemetry::logging::init_with_format(
        "nova-daemon",
        &config.general.log_level,
        &config.general.log_format,
    );
    if let Err(e) = &loaded {
        tracing::warn!(error = %e, path = %Config::default_path().display(), "failed to load config, using defaults");
    }

    info!(version = env!("CARGO_PKG_VERSION"), "nova daemon starting");

    let daemon = Daemon::new(config)?;
    let shutdown = daemon.shutdown_handle();

    // Wire ctrl-c to trigger graceful shutdown.
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            return;
        }
        info!("ctrl-c received, initiating shutdown");
        shutdown.trigger();
    });

    daemon.run().await
}
