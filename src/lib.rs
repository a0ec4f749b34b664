//! # Invoicer
//!
//! Backend core of an invoicing dashboard: validated invoice mutations,
//! credential sign-in with sessions, and the axum server that exposes them.
//!
//! ## Features
//!
//! - **Validation Schema**: raw form fields coerced and checked into a typed input
//! - **Uniform Mutation Outcomes**: create, update and delete all report a `MutationOutcome`
//! - **Credential Sign-in**: bcrypt verification, session cookies, dashboard route guard
//! - **Cache Revalidation**: writes invalidate the listing and broadcast an event
//! - **Pluggable Storage**: in-memory stores, PostgreSQL behind the `postgres` feature
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use invoicer::prelude::*;
//!
//! let store = InMemoryStore::new();
//! ServerBuilder::new(AppConfig::default_config())
//!     .with_store(store)
//!     .serve()
//!     .await?;
//! ```
//!
//! Handlers can also be driven directly:
//!
//! ```rust,ignore
//! let actions = InvoiceActions::new(Arc::new(store), "/dashboard/invoices");
//! let outcome = actions
//!     .create(&InvoiceForm::new("c1", "12.50", "pending"), &navigator)
//!     .await;
//! assert!(outcome.is_success());
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        actions::{FormState, InvoiceActions, MutationOutcome},
        auth::{AuthContext, AuthOutcome, Authenticator, CredentialsProvider},
        cache::PageCache,
        error::{AppError, AppResult},
        events::{EventBus, RevalidationEvent},
        invoice::{Customer, Invoice, InvoiceStatus},
        navigation::{Navigator, RequestNavigator},
        session::{Session, SessionStore},
        store::{CustomerStore, InvoiceStore, UserStore},
        user::User,
        validation::{CredentialsForm, FieldErrors, InvoiceForm, InvoiceSchema},
    };

    // === Storage ===
    pub use crate::storage::{InMemorySessionStore, InMemoryStore};
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresStore;

    // === Config ===
    pub use crate::config::AppConfig;

    // === Server ===
    pub use crate::server::{ServerBuilder, ServerHost};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
