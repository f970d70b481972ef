use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use nova_bridge::http_api::{api_router_with_auth, ApiState};
use nova_core::catalog::Catalog;
use nova_core::config::{Config, CredentialProvider, MockDataConfig};
use nova_core::mock_data::{MockDataGenerator, MockDataset};
use nova_core::settings::ClientStateStore;
use nova_telemetry::metrics::global_metrics;
use nova_telemetry::tracing_setup::create_operation_span;

use crate::shutdown::ShutdownSignal;

pub const GAUGE_CUSTOMERS: &str = "dataset_customers";
pub const GAUGE_INVOICES: &str = "dataset_invoices";
pub const GAUGE_METRICS: &str = "dataset_metrics";
pub const GAUGE_CATALOG_AGENTS: &str = "catalog_agents";

/// Load the fixture named in `config`, or generate a dataset from its seed.
pub fn load_dataset(config: &MockDataConfig) -> Result<MockDataset> {
    let (span, trace_id) = create_operation_span("load_dataset");
    let _guard = span.enter();
    tracing::debug!(%trace_id, fixture = ?config.fixture_path, "loading mock dataset");
    match config.fixture_path.as_deref() {
        Some(path) => MockDataset::load(Path::new(path))
            .with_context(|| format!("failed to load fixture {path}")),
        None => {
            let dataset = MockDataGenerator::new(config.seed).dataset(&config.counts());
            info!(
                seed = config.seed,
                customers = dataset.customers.len(),
                invoices = dataset.invoices.len(),
                metrics = dataset.metrics.len(),
                "generated mock dataset"
            );
            Ok(dataset)
        }
    }
}

/// The Nova API server process.
///
/// Owns the shared API state and serves it until the [`ShutdownSignal`]
/// fires (ctrl-c or [`Daemon::shutdown`]).
pub struct Daemon {
    config: Config,
    shutdown: ShutdownSignal,
    api_state: Arc<ApiState>,
    api_key: Option<String>,
}

impl Daemon {
    /// Create a daemon with the client state kept in its default location.
    pub fn new(config: Config) -> Result<Self> {
        Self::with_state_store(config, ClientStateStore::default_path())
    }

    pub fn with_state_store(config: Config, store: ClientStateStore) -> Result<Self> {
        config.validate().context("invalid configuration")?;
        let catalog = Catalog::embedded().context("failed to load agent catalog")?;
        let dataset = load_dataset(&config.mock_data)?;

        let m = global_metrics();
        m.set_gauge(GAUGE_CUSTOMERS, dataset.customers.len() as i64);
        m.set_gauge(GAUGE_INVOICES, dataset.invoices.len() as i64);
        m.set_gauge(GAUGE_METRICS, dataset.metrics.len() as i64);
        m.set_gauge(GAUGE_CATALOG_AGENTS, catalog.len() as i64);

        let api_key = CredentialProvider::api_key(&config.auth);
        let api_state = ApiState::from_config(&config, dataset, catalog, store)
            .with_auth_required(api_key.is_some());

        Ok(Self {
            config,
            shutdown: ShutdownSignal::new(),
            api_state: Arc::new(api_state),
            api_key,
        })
    }

    /// Returns a clone of the shutdown signal for external triggering.
    pub fn shutdown_handle(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.trigger();
    }

    pub fn api_state(&self) -> &Arc<ApiState> {
        &self.api_state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Serve on `listener` until shutdown.
    pub async fn run_with_listener(&self, listener: tokio::net::TcpListener) -> Result<()> {
        if self.api_key.is_some() {
            info!("API key configured, authentication enabled");
        } else {
            warn!(
                env = %self.config.auth.api_key_env,
                "no API key set, API is open (development mode)"
            );
        }

        let api_router = api_router_with_auth(
            self.api_state.clone(),
            self.api_key.clone(),
            self.config.server.allowed_origins.clone(),
        );
        let bind_addr: SocketAddr = listener.local_addr()?;
        info!(%bind_addr, latency_ms = self.config.mock_data.latency_ms, "API server listening");

        let shutdown = self.shutdown.clone();
        axum::serve(listener, api_router)
            .with_graceful_shutdown(async move { shutdown.wait().await })
            .await
            .context("API server error")?;

        info!("daemon stopped");
        Ok(())
    }

    /// Bind `server.host:server.port` and serve until shutdown.
    pub async fn run(&self) -> Result<()> {
        let bind_addr = self.config.server.bind_addr();
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .with_context(|| format!("failed to bind {bind_addr}"))?;
        self.run_with_listener(listener).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dataset_sizes_are_published_as_gauges() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.mock_data.seed = 5;
        config.mock_data.customers = 6;
        config.mock_data.invoices = 13;
        config.mock_data.metrics = 8;
        config.auth.api_key_env = "NOVA_DAEMON_GAUGE_TEST_UNSET_KEY".into();
        let store = ClientStateStore::new(dir.path().join("client-state.toml"));
        Daemon::with_state_store(config, store).unwrap();

        let m = global_metrics();
        assert_eq!(m.get_gauge(GAUGE_CUSTOMERS), 6);
        assert_eq!(m.get_gauge(GAUGE_INVOICES), 13);
        assert_eq!(m.get_gauge(GAUGE_METRICS), 8);
        assert_eq!(
            m.get_gauge(GAUGE_CATALOG_AGENTS),
            Catalog::embedded().unwrap().len() as i64
        );
    }
}
