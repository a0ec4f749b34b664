//! Server host holding the application state
//!
//! `ServerHost` owns every collaborator the HTTP handlers need. It is built
//! once by [`ServerBuilder`](super::ServerBuilder) and shared behind an `Arc`
//! as the router state.

use crate::config::AppConfig;
use crate::core::actions::InvoiceActions;
use crate::core::auth::Authenticator;
use crate::core::cache::PageCache;
use crate::core::events::EventBus;
use crate::core::navigation::RequestNavigator;
use crate::core::session::SessionStore;
use crate::core::store::{CustomerStore, InvoiceStore, UserStore};
use std::sync::Arc;

/// Host context containing all application state
pub struct ServerHost {
    /// Loaded configuration
    pub config: Arc<AppConfig>,

    /// Create, update and delete for invoices
    pub actions: Arc<InvoiceActions>,

    /// Invoice reads (listing and edit form)
    pub invoices: Arc<dyn InvoiceStore>,

    /// Customer reads
    pub customers: Arc<dyn CustomerStore>,

    /// Sign-in, sign-out and session lookup
    pub authenticator: Authenticator,

    /// Rendered pages keyed by path
    pub cache: PageCache,

    /// Revalidation notifications
    pub event_bus: Arc<EventBus>,
}

impl ServerHost {
    /// Wire the host from its stores
    pub fn from_components(
        config: AppConfig,
        invoices: Arc<dyn InvoiceStore>,
        customers: Arc<dyn CustomerStore>,
        users: Arc<dyn UserStore>,
        sessions: Arc<dyn SessionStore>,
        event_bus: EventBus,
    ) -> Self {
        let actions = InvoiceActions::new(invoices.clone(), config.routes.invoices.clone());

        Self {
            config: Arc::new(config),
            actions: Arc::new(actions),
            invoices,
            customers,
            authenticator: Authenticator::new(users, sessions),
            cache: PageCache::new(),
            event_bus: Arc::new(event_bus),
        }
    }

    /// A navigator for one request
    pub fn navigator(&self) -> RequestNavigator {
        RequestNavigator::new(self.cache.clone(), self.event_bus.as_ref().clone())
    }

    /// Get a reference to the event bus
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}
