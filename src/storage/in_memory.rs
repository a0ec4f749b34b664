//! In-memory stores for testing and development

use crate::core::invoice::{Customer, Invoice, InvoiceChanges, NewInvoice};
use crate::core::session::{Session, SessionError, SessionStore};
use crate::core::store::{CustomerStore, InvoiceStore, UserStore};
use crate::core::user::User;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory invoice, customer and user store
///
/// Uses RwLock for thread-safe access. Mirrors the SQL schema's rules:
/// an invoice must reference an existing customer, and emails are unique.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    invoices: Arc<RwLock<HashMap<String, Invoice>>>,
    customers: Arc<RwLock<HashMap<String, Customer>>>,
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a customer
    pub fn with_customer(self, customer: Customer) -> Self {
        if let Ok(mut customers) = self.customers.write() {
            customers.insert(customer.id.clone(), customer);
        }
        self
    }

    /// Seed a user, keyed by email
    pub fn with_user(self, user: User) -> Self {
        if let Ok(mut users) = self.users.write() {
            users.insert(user.email.clone(), user);
        }
        self
    }

    fn ensure_customer(&self, customer_id: &str) -> Result<()> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;
        if customers.contains_key(customer_id) {
            Ok(())
        } else {
            Err(anyhow!("customer '{}' does not exist", customer_id))
        }
    }
}

#[async_trait]
impl InvoiceStore for InMemoryStore {
    async fn insert(&self, invoice: NewInvoice) -> Result<()> {
        self.ensure_customer(&invoice.customer_id)?;

        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let id = Uuid::new_v4().to_string();
        invoices.insert(
            id.clone(),
            Invoice {
                id,
                customer_id: invoice.customer_id,
                amount: invoice.amount,
                status: invoice.status,
                date: invoice.date,
            },
        );

        Ok(())
    }

    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()> {
        self.ensure_customer(&changes.customer_id)?;

        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        if let Some(invoice) = invoices.get_mut(id) {
            invoice.customer_id = changes.customer_id;
            invoice.amount = changes.amount;
            invoice.status = changes.status;
        }

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let mut invoices = self
            .invoices
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        invoices.remove(id);

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(invoices.get(id).cloned())
    }

    async fn list(&self) -> Result<Vec<Invoice>> {
        let invoices = self
            .invoices
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<Invoice> = invoices.values().cloned().collect();
        all.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Ok(all)
    }
}

#[async_trait]
impl CustomerStore for InMemoryStore {
    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let customers = self
            .customers
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        let mut all: Vec<Customer> = customers.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }
}

#[async_trait]
impl UserStore for InMemoryStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let users = self
            .users
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(users.get(email).cloned())
    }
}

/// In-memory session store
#[derive(Clone)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<Uuid, Session>>>,
    ttl: Duration,
}

impl InMemorySessionStore {
    /// Sessions expire `ttl` after they are issued
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn issue(&self, user: &User) -> Result<Session, SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Poisoned)?;

        let now = Utc::now();
        sessions.retain(|_, s| !s.is_expired_at(now));

        let session = Session {
            token: Uuid::new_v4(),
            user_id: user.id.clone(),
            email: user.email.clone(),
            expires_at: now + self.ttl,
        };
        sessions.insert(session.token, session.clone());

        Ok(session)
    }

    async fn get(&self, token: &Uuid) -> Result<Option<Session>, SessionError> {
        let sessions = self.sessions.read().map_err(|_| SessionError::Poisoned)?;

        Ok(sessions
            .get(token)
            .filter(|s| !s.is_expired_at(Utc::now()))
            .cloned())
    }

    async fn revoke(&self, token: &Uuid) -> Result<(), SessionError> {
        let mut sessions = self.sessions.write().map_err(|_| SessionError::Poisoned)?;

        sessions.remove(token);

        Ok(())
    }
}
