//! Core module containing the domain types, validation and actions

pub mod actions;
pub mod auth;
pub mod cache;
pub mod error;
pub mod events;
pub mod invoice;
pub mod navigation;
pub mod session;
pub mod store;
pub mod user;
pub mod validation;

pub use actions::{FormState, InvoiceActions, MutationOutcome};
pub use auth::{AuthContext, AuthOutcome, Authenticator, CredentialsProvider};
pub use cache::PageCache;
pub use error::{AppError, AppResult};
pub use events::{EventBus, EventEnvelope, RevalidationEvent};
pub use invoice::{Customer, Invoice, InvoiceChanges, InvoiceFormView, InvoiceStatus, NewInvoice};
pub use navigation::{Navigator, RequestNavigator};
pub use session::{Session, SessionError, SessionStore};
pub use store::{CustomerStore, InvoiceStore, UserStore};
pub use user::User;
pub use validation::{CredentialsForm, FieldErrors, InvoiceForm, InvoiceInput, InvoiceSchema};
