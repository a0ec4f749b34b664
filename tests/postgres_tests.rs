//! Integration tests for the PostgreSQL store.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool` and truncates tables before running.

#![cfg(feature = "postgres")]

use chrono::NaiveDate;
use invoicer::core::invoice::{InvoiceChanges, NewInvoice};
use invoicer::prelude::*;
use invoicer::core::error::ConfigError;
use invoicer::storage::postgres::{connect, ensure_schema};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

/// Holds the container handle (keeps it alive) and the connection URL.
struct PgTestEnv {
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

/// Initialized once per test binary. A std `OnceLock` so the container
/// outlives the runtime of each `#[tokio::test]`.
static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container; is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    ensure_schema(&pool).await.expect("Failed to create schema");
    pool.close().await;

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

async fn pg_pool() -> PgPool {
    let env = init_pg_env().await;
    PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL")
}

/// A store over empty tables, with one customer and one user inserted
async fn clean_store() -> (PostgresStore, String) {
    let pool = pg_pool().await;
    sqlx::query("TRUNCATE invoices, customers, users CASCADE")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");

    let customer_id: String = sqlx::query_scalar(
        "INSERT INTO customers (name, email, image_url)
         VALUES ('Lee Robinson', 'lee@robinson.com', '/customers/lee-robinson.png')
         RETURNING id::text",
    )
    .fetch_one(&pool)
    .await
    .expect("Failed to insert customer");

    let hash = bcrypt::hash("123456", 4).unwrap();
    sqlx::query("INSERT INTO users (name, email, password) VALUES ('User', $1, $2)")
        .bind("user@nextmail.com")
        .bind(hash)
        .execute(&pool)
        .await
        .expect("Failed to insert user");

    (PostgresStore::new(pool), customer_id)
}

fn new_invoice(customer_id: &str, amount: i64, day: u32) -> NewInvoice {
    NewInvoice {
        customer_id: customer_id.to_string(),
        amount,
        status: InvoiceStatus::Pending,
        date: NaiveDate::from_ymd_opt(2024, 6, day).unwrap(),
    }
}

// ---------------------------------------------------------------------------
// Connection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_connect_rejects_malformed_url_as_config() {
    let err = connect("not a url", 1, false).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Config(ConfigError::InvalidValue { ref field, .. }) if field == "database.url"
    ));
}

#[tokio::test]
async fn test_connect_to_live_server() {
    let env = init_pg_env().await;
    let pool = connect(&env.connection_url, 2, false).await.unwrap();
    ensure_schema(&pool).await.unwrap();
}

#[tokio::test]
async fn test_zero_amount_violates_check() {
    let (store, customer_id) = clean_store().await;
    assert!(store.insert(new_invoice(&customer_id, 0, 1)).await.is_err());
}

// ---------------------------------------------------------------------------
// Invoices
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_insert_list_newest_first() {
    let (store, customer_id) = clean_store().await;

    store.insert(new_invoice(&customer_id, 100, 1)).await.unwrap();
    store.insert(new_invoice(&customer_id, 200, 9)).await.unwrap();

    let invoices = store.list().await.unwrap();
    assert_eq!(invoices.len(), 2);
    assert_eq!(invoices[0].amount, 200);
    assert_eq!(invoices[0].customer_id, customer_id);
}

#[tokio::test]
async fn test_update_then_get() {
    let (store, customer_id) = clean_store().await;
    store.insert(new_invoice(&customer_id, 100, 1)).await.unwrap();
    let id = store.list().await.unwrap()[0].id.clone();

    store
        .update(
            &id,
            InvoiceChanges {
                customer_id: customer_id.clone(),
                amount: 4321,
                status: InvoiceStatus::Paid,
            },
        )
        .await
        .unwrap();

    let invoice = store.get(&id).await.unwrap().unwrap();
    assert_eq!(invoice.amount, 4321);
    assert_eq!(invoice.status, InvoiceStatus::Paid);
    assert_eq!(invoice.date, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
}

#[tokio::test]
async fn test_delete_and_missing_ids() {
    let (store, customer_id) = clean_store().await;
    store.insert(new_invoice(&customer_id, 100, 1)).await.unwrap();
    let id = store.list().await.unwrap()[0].id.clone();

    store.delete(&id).await.unwrap();
    assert!(store.get(&id).await.unwrap().is_none());

    let absent = uuid::Uuid::new_v4().to_string();
    assert!(store.delete(&absent).await.is_ok());
}

#[tokio::test]
async fn test_unknown_customer_is_rejected() {
    let (store, _) = clean_store().await;
    let ghost = uuid::Uuid::new_v4().to_string();

    let err = store.insert(new_invoice(&ghost, 100, 1)).await.unwrap_err();
    assert!(err.to_string().contains("Failed to insert invoice"));
}

#[tokio::test]
async fn test_malformed_id_is_a_query_error() {
    let (store, _) = clean_store().await;
    assert!(store.get("not-a-uuid").await.is_err());
}

// ---------------------------------------------------------------------------
// Users and customers
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_find_user_and_sign_in() {
    let (store, _) = clean_store().await;

    let user = store.find_by_email("user@nextmail.com").await.unwrap().unwrap();
    assert_eq!(user.name, "User");
    assert!(store.find_by_email("x@nextmail.com").await.unwrap().is_none());

    let auth = Authenticator::new(
        Arc::new(store),
        Arc::new(InMemorySessionStore::new(chrono::Duration::hours(1))),
    );
    let outcome = auth
        .authenticate(None, &CredentialsForm::new("user@nextmail.com", "123456"))
        .await
        .unwrap();
    assert!(matches!(outcome, AuthOutcome::SignedIn(_)));
}

#[tokio::test]
async fn test_list_customers() {
    let (store, customer_id) = clean_store().await;
    let customers = store.list_customers().await.unwrap();
    assert_eq!(customers.len(), 1);
    assert_eq!(customers[0].id, customer_id);
}
