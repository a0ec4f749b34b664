//! Store traits for invoices, customers and users
//!
//! Implementations are injected into the action and auth layers as
//! `Arc<dyn ...>`. Each method maps to a single parameterised statement on
//! SQL backends, so every write is atomic on its own and nothing spans
//! statements.

use crate::core::invoice::{Customer, Invoice, InvoiceChanges, NewInvoice};
use crate::core::user::User;
use anyhow::Result;
use async_trait::async_trait;

/// Persistence for invoices
#[async_trait]
pub trait InvoiceStore: Send + Sync {
    /// Insert a new invoice
    async fn insert(&self, invoice: NewInvoice) -> Result<()>;

    /// Update the invoice with the given id
    ///
    /// An id that matches no row is not an error.
    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()>;

    /// Delete the invoice with the given id
    async fn delete(&self, id: &str) -> Result<()>;

    /// Get an invoice by id
    async fn get(&self, id: &str) -> Result<Option<Invoice>>;

    /// List all invoices, newest issue date first
    async fn list(&self) -> Result<Vec<Invoice>>;
}

/// Read access to customers
#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// List customers ordered by name
    async fn list_customers(&self) -> Result<Vec<Customer>>;
}

/// Credential lookup
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Find a user by email
    async fn find_by_email(&self, email: &str) -> Result<Option<User>>;
}
