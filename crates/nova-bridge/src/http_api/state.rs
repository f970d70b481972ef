use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use nova_core::catalog::Catalog;
use nova_core::config::{Config, CredentialProvider};
use nova_core::mock_data::MockDataset;
use nova_core::settings::{ClientState, ClientStateStore};
use nova_core::types::{AgentMetric, Customer, Invoice};

/// Demo login accepted by `POST /api/session/login`.
#[derive(Clone)]
pub struct LoginCredentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Shared application state for all HTTP handlers.
pub struct ApiState {
    pub invoices: Arc<RwLock<Vec<Invoice>>>,
    pub customers: Arc<RwLock<Vec<Customer>>>,
    pub metrics: Arc<RwLock<Vec<AgentMetric>>>,
    pub catalog: &'static Catalog,
    /// In-memory client state; every mutation is persisted through `state_store`.
    pub client_state: Arc<RwLock<ClientState>>,
    pub state_store: Arc<ClientStateStore>,
    pub credentials: LoginCredentials,
    /// Seed for chart series that are not part of the dataset.
    pub seed: u64,
    /// Simulated backend delay applied to `/api` responses.
    pub latency: Duration,
    /// Whether the router was built with an API key.
    pub auth_required: bool,
    pub start_time: Instant,
}

impl ApiState {
    /// State over `dataset` with no added latency, the default demo login
    /// and the client state store in its default location.
    pub fn new(dataset: MockDataset, catalog: &'static Catalog) -> Self {
        let defaults = Config::default();
        Self {
            invoices: Arc::new(RwLock::new(dataset.invoices)),
            customers: Arc::new(RwLock::new(dataset.customers)),
            metrics: Arc::new(RwLock::new(dataset.metrics)),
            catalog,
            client_state: Arc::new(RwLock::new(ClientState::default())),
            state_store: Arc::new(ClientStateStore::default_path()),
            credentials: LoginCredentials {
                username: defaults.auth.username.clone(),
                password: CredentialProvider::login_password(&defaults.auth),
            },
            seed: defaults.mock_data.seed,
            latency: Duration::ZERO,
            auth_required: false,
            start_time: Instant::now(),
        }
    }

    /// State configured from `config`: seed, latency, login and the client
    /// state saved in `store` (or a fresh one for the default country).
    pub fn from_config(
        config: &Config,
        dataset: MockDataset,
        catalog: &'static Catalog,
        store: ClientStateStore,
    ) -> Self {
        let client_state = store.load().unwrap_or_else(|e| {
            tracing::debug!(path = %store.path().display(), error = %e, "starting with fresh client state");
            ClientState::for_locale(&config.locale)
        });
        Self {
            client_state: Arc::new(RwLock::new(client_state)),
            state_store: Arc::new(store),
            credentials: LoginCredentials {
                username: config.auth.username.clone(),
                password: CredentialProvider::login_password(&config.auth),
            },
            seed: config.mock_data.seed,
            latency: Duration::from_millis(config.mock_data.latency_ms),
            auth_required: CredentialProvider::api_key(&config.auth).is_some(),
            ..Self::new(dataset, catalog)
        }
    }

    /// Replace the client state store, adopting whatever state it holds.
    pub fn with_state_store(mut self, store: ClientStateStore) -> Self {
        if let Ok(saved) = store.load() {
            self.client_state = Arc::new(RwLock::new(saved));
        }
        self.state_store = Arc::new(store);
        self
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = LoginCredentials {
            username: username.into(),
            password: password.into(),
        };
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_auth_required(mut self, required: bool) -> Self {
        self.auth_required = required;
        self
    }
}
