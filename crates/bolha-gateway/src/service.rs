//! Gateway service - wires the connection subsystem to the HTTP server.

use crate::domain::config::{GatewayConfig, StorageBackend};
use crate::domain::error::GatewayError;
use crate::router::build_router;
use axum::Router;
use bolha_connections::{
    BusNotifier, ConnectionApi, ConnectionDependencies, ConnectionService, ConnectionStore,
    FileConnectionStore, InMemoryConnectionStore, InMemoryProfileDirectory,
};
use shared_bus::{EventFilter, InMemoryEventBus};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use tracing::{info, warn};

/// Connection service as assembled by the gateway.
pub type GatewayConnections =
    ConnectionService<Arc<dyn ConnectionStore>, Arc<InMemoryProfileDirectory>, BusNotifier>;

/// Gateway service state
pub struct GatewayService {
    config: GatewayConfig,
    connections: Arc<GatewayConnections>,
    profiles: Arc<InMemoryProfileDirectory>,
    bus: Arc<InMemoryEventBus>,
}

impl GatewayService {
    /// Assemble store, directory, notifier and lifecycle engine.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        config
            .validate()
            .map_err(|e| GatewayError::Config(e.to_string()))?;

        let store: Arc<dyn ConnectionStore> = match config.storage.backend {
            StorageBackend::Memory => {
                info!("Using in-memory connection store");
                Arc::new(InMemoryConnectionStore::new())
            }
            StorageBackend::File => {
                let store = FileConnectionStore::open(&config.storage.data_dir)
                    .map_err(|e| GatewayError::Storage(e.to_string()))?;
                info!(
                    data_dir = %config.storage.data_dir.display(),
                    records = store.snapshot_len(),
                    "Opened file connection store"
                );
                Arc::new(store)
            }
        };

        let profiles = Arc::new(InMemoryProfileDirectory::with_profiles(
            config.seed_profiles(),
        ));
        let bus = Arc::new(InMemoryEventBus::new());

        let connections = ConnectionService::new(
            ConnectionDependencies {
                store,
                profiles: Arc::clone(&profiles),
                notifier: BusNotifier::new(Arc::clone(&bus)),
            },
            config.connection_policy(),
        );

        Ok(Self {
            config,
            connections: Arc::new(connections),
            profiles,
            bus,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn connections(&self) -> Arc<GatewayConnections> {
        Arc::clone(&self.connections)
    }

    /// Profile directory, for account provisioning hooks
    pub fn profiles(&self) -> Arc<InMemoryProfileDirectory> {
        Arc::clone(&self.profiles)
    }

    pub fn bus(&self) -> Arc<InMemoryEventBus> {
        Arc::clone(&self.bus)
    }

    /// HTTP router with the full middleware stack
    pub fn router(&self) -> Router {
        let api: Arc<dyn ConnectionApi> = self.connections();
        build_router(api, &self.config)
    }

    /// Log every connection event at `info`.
    ///
    /// Stands in for the push/email notifier, which lives outside the gateway.
    pub fn spawn_event_logger(&self) -> JoinHandle<()> {
        let mut events = self.bus.event_stream(EventFilter::all());
        tokio::spawn(async move {
            while let Some(event) = events.next().await {
                let (first, second) = event.participants();
                info!(
                    event = event.name(),
                    first = %first,
                    second = %second,
                    "Connection event"
                );
            }
        })
    }

    /// Serve HTTP until `shutdown` resolves.
    pub async fn run<F>(self, shutdown: F) -> Result<(), GatewayError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.config.http_addr();
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| GatewayError::Bind(format!("{addr}: {e}")))?;

        let logger = self.spawn_event_logger();
        let router = self.router();

        info!(addr = %addr, "Gateway listening");
        let result = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| GatewayError::Server(e.to_string()));

        logger.abort();
        match &result {
            Ok(()) => info!("Gateway stopped"),
            Err(e) => warn!(error = %e, "Gateway stopped with error"),
        }
        result
    }
}
