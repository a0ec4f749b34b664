//! ServerBuilder for fluent API to build HTTP servers

use super::host::ServerHost;
use super::router::build_router;
use crate::config::AppConfig;
use crate::core::events::EventBus;
use crate::core::session::SessionStore;
use crate::core::store::{CustomerStore, InvoiceStore, UserStore};
use crate::storage::InMemorySessionStore;
use anyhow::Result;
use axum::Router;
use std::sync::Arc;
use tokio::net::TcpListener;

/// Builder for the dashboard HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new(AppConfig::default_config())
///     .with_store(InMemoryStore::new())
///     .build()?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    invoices: Option<Arc<dyn InvoiceStore>>,
    customers: Option<Arc<dyn CustomerStore>>,
    users: Option<Arc<dyn UserStore>>,
    sessions: Option<Arc<dyn SessionStore>>,
    event_bus: Option<EventBus>,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            invoices: None,
            customers: None,
            users: None,
            sessions: None,
            event_bus: None,
        }
    }

    /// Use one backend for invoices, customers and users
    pub fn with_store<S>(self, store: S) -> Self
    where
        S: InvoiceStore + CustomerStore + UserStore + 'static,
    {
        let store = Arc::new(store);
        self.with_invoice_store(store.clone())
            .with_customer_store(store.clone())
            .with_user_store(store)
    }

    /// Set the invoice store (required)
    pub fn with_invoice_store(mut self, store: Arc<dyn InvoiceStore>) -> Self {
        self.invoices = Some(store);
        self
    }

    /// Set the customer store (required)
    pub fn with_customer_store(mut self, store: Arc<dyn CustomerStore>) -> Self {
        self.customers = Some(store);
        self
    }

    /// Set the user store (required)
    pub fn with_user_store(mut self, store: Arc<dyn UserStore>) -> Self {
        self.users = Some(store);
        self
    }

    /// Set the session store
    ///
    /// Defaults to an in-memory store with the configured TTL.
    pub fn with_session_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(store);
        self
    }

    /// Use an existing event bus, e.g. to subscribe to revalidations
    /// before the server starts
    ///
    /// Defaults to a bus sized by `events.capacity`.
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Build the host holding all application state
    pub fn build_host(self) -> Result<ServerHost> {
        self.config.validate()?;

        let invoices = self
            .invoices
            .ok_or_else(|| anyhow::anyhow!("InvoiceStore is required. Call .with_invoice_store()"))?;
        let customers = self.customers.ok_or_else(|| {
            anyhow::anyhow!("CustomerStore is required. Call .with_customer_store()")
        })?;
        let users = self
            .users
            .ok_or_else(|| anyhow::anyhow!("UserStore is required. Call .with_user_store()"))?;

        let ttl = chrono::Duration::minutes(self.config.session.ttl_minutes);
        let sessions = self
            .sessions
            .unwrap_or_else(|| Arc::new(InMemorySessionStore::new(ttl)));
        let event_bus = self
            .event_bus
            .unwrap_or_else(|| EventBus::new(self.config.events.capacity));

        Ok(ServerHost::from_components(
            self.config,
            invoices,
            customers,
            users,
            sessions,
            event_bus,
        ))
    }

    /// Build the router
    pub fn build(self) -> Result<Router> {
        let host = Arc::new(self.build_host()?);
        Ok(build_router(host))
    }

    /// Serve the application with graceful shutdown
    ///
    /// This will:
    /// - Bind to `server.bind_addr`
    /// - Start serving requests
    /// - Handle SIGTERM and SIGINT (Ctrl+C) for graceful shutdown
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.bind_addr.clone();
        let app = self.build()?;
        let listener = TcpListener::bind(&addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Wait for a shutdown signal (SIGTERM or Ctrl+C)
///
/// If a handler cannot be installed, that signal is logged and ignored
/// rather than shutting the server down.
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
