//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresStore`, implementing the invoice, customer and user
//! stores over a `sqlx::PgPool` that the caller constructs and owns.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! invoicer = { version = "0.1", features = ["postgres"] }
//! ```
//!
//! # Schema
//!
//! `invoices.amount` holds minor units. Ids are native UUIDs; they cross
//! the store boundary as text, so a malformed id surfaces as a query error.
//! Every statement binds its inputs; no user input is formatted into SQL.

use crate::core::error::{AppResult, ConfigError, StorageError};
use crate::core::invoice::{Customer, Invoice, InvoiceChanges, InvoiceStatus, NewInvoice};
use crate::core::store::{CustomerStore, InvoiceStore, UserStore};
use crate::core::user::User;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Row};
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

/// Build a pool for `url`
///
/// With `require_ssl` the connection refuses to fall back to plaintext.
/// A URL that does not parse is a `ConfigError`; a server that cannot be
/// reached is a `StorageError::ConnectionError`.
pub async fn connect(url: &str, max_connections: u32, require_ssl: bool) -> AppResult<PgPool> {
    let mut options = PgConnectOptions::from_str(url).map_err(|e| ConfigError::InvalidValue {
        field: "database.url".to_string(),
        value: "<redacted>".to_string(),
        message: e.to_string(),
    })?;
    if require_ssl {
        options = options.ssl_mode(PgSslMode::Require);
    }

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
        .map_err(|e| StorageError::ConnectionError {
            backend: "PostgreSQL".to_string(),
            message: e.to_string(),
        })?;
    Ok(pool)
}

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Apply the required tables (idempotent).
///
/// This creates:
/// - `users` with a unique email
/// - `customers`
/// - `invoices` referencing `customers`
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            email TEXT NOT NULL UNIQUE,
            password TEXT NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create users table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS customers (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            name VARCHAR(255) NOT NULL,
            email VARCHAR(255) NOT NULL,
            image_url VARCHAR(255) NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create customers table: {}", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS invoices (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            customer_id UUID NOT NULL REFERENCES customers(id),
            amount BIGINT NOT NULL CHECK (amount > 0),
            status VARCHAR(255) NOT NULL,
            date DATE NOT NULL
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| anyhow!("Failed to create invoices table: {}", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// PostgresStore
// ---------------------------------------------------------------------------

/// Invoice, customer and user storage backed by PostgreSQL.
///
/// # Example
///
/// ```rust,ignore
/// use invoicer::storage::postgres::{connect, ensure_schema, PostgresStore};
///
/// let pool = connect("postgres://localhost/invoicer", 5, true).await?;
/// ensure_schema(&pool).await?;
/// let store = PostgresStore::new(pool);
/// ```
#[derive(Clone, Debug)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn row_to_invoice(row: &sqlx::postgres::PgRow) -> Result<Invoice> {
        let status: String = row.try_get("status")?;
        let date: NaiveDate = row.try_get("date")?;
        Ok(Invoice {
            id: row.try_get("id")?,
            customer_id: row.try_get("customer_id")?,
            amount: row.try_get("amount")?,
            status: InvoiceStatus::from_str(&status).map_err(|e| anyhow!(e))?,
            date,
        })
    }
}

#[async_trait]
impl InvoiceStore for PostgresStore {
    async fn insert(&self, invoice: NewInvoice) -> Result<()> {
        sqlx::query(
            "INSERT INTO invoices (customer_id, amount, status, date)
             VALUES ($1::uuid, $2, $3, $4)",
        )
        .bind(&invoice.customer_id)
        .bind(invoice.amount)
        .bind(invoice.status.as_str())
        .bind(invoice.date)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to insert invoice: {}", e))?;

        Ok(())
    }

    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()> {
        sqlx::query(
            "UPDATE invoices
             SET customer_id = $1::uuid, amount = $2, status = $3
             WHERE id = $4::uuid",
        )
        .bind(&changes.customer_id)
        .bind(changes.amount)
        .bind(changes.status.as_str())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to update invoice: {}", e))?;

        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<()> {
        sqlx::query("DELETE FROM invoices WHERE id = $1::uuid")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| anyhow!("Failed to delete invoice: {}", e))?;

        Ok(())
    }

    async fn get(&self, id: &str) -> Result<Option<Invoice>> {
        let row = sqlx::query(
            "SELECT id::text AS id, customer_id::text AS customer_id, amount, status, date
             FROM invoices WHERE id = $1::uuid",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to get invoice: {}", e))?;

        row.as_ref().map(Self::row_to_invoice).transpose()
    }

    async fn list(&self) -> Result<Vec<Invoice>> {
        let rows = sqlx::query(
            "SELECT id::text AS id, customer_id::text AS customer_id, amount, status, date
             FROM invoices ORDER BY date DESC, id",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to list invoices: {}", e))?;

        rows.iter().map(Self::row_to_invoice).collect()
    }
}

#[async_trait]
impl CustomerStore for PostgresStore {
    async fn list_customers(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query(
            "SELECT id::text AS id, name, email, image_url FROM customers ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to list customers: {}", e))?;

        rows.iter()
            .map(|row| -> Result<Customer> {
                Ok(Customer {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    email: row.try_get("email")?,
                    image_url: row.try_get("image_url")?,
                })
            })
            .collect()
    }
}

#[async_trait]
impl UserStore for PostgresStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query(
            "SELECT id::text AS id, name, email, password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| anyhow!("Failed to fetch user: {}", e))?;

        row.map(|row| -> Result<User> {
            Ok(User {
                id: row.try_get("id")?,
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                password: row.try_get("password")?,
            })
        })
        .transpose()
    }
}
