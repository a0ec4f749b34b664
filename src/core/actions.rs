//! Invoice mutation handlers
//!
//! Each mutation runs the same short pipeline and reports how far it got:
//!
//! ```text
//! Received → Validating ─┬─▶ ValidationFailed
//!                        └─▶ Persisting ─┬─▶ PersistFailed
//!                                        └─▶ revalidate listing ─┬─▶ Redirected (create, update)
//!                                                                └─▶ Done (delete)
//! ```
//!
//! Failures are values, not errors: every operation returns a
//! [`MutationOutcome`] and the caller has a single handling path. Store
//! faults are logged here and reduced to a summary message. Revalidation and
//! redirect happen only after a successful write.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

use crate::core::invoice::{InvoiceChanges, NewInvoice};
use crate::core::navigation::Navigator;
use crate::core::store::InvoiceStore;
use crate::core::validation::{FieldErrors, InvoiceForm, InvoiceSchema};

pub const CREATE_VALIDATION_MESSAGE: &str = "missing fields, failed to create invoice";
pub const UPDATE_VALIDATION_MESSAGE: &str = "missing fields, failed to update invoice";
pub const CREATE_FAILED_MESSAGE: &str = "create failed";
pub const UPDATE_FAILED_MESSAGE: &str = "update failed";
pub const DELETE_FAILED_MESSAGE: &str = "delete failed";

/// What the form shows after a failed submission
///
/// Serializes as `{ "errors"?: { field: [messages] }, "message": string | null }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FormState {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
    pub message: Option<String>,
}

impl FormState {
    pub fn invalid(errors: FieldErrors, message: &str) -> Self {
        Self {
            errors: Some(errors),
            message: Some(message.to_string()),
        }
    }

    pub fn failed(message: &str) -> Self {
        Self {
            errors: None,
            message: Some(message.to_string()),
        }
    }
}

/// Terminal state of one mutation request
#[derive(Debug, Clone, PartialEq)]
pub enum MutationOutcome {
    /// Input rejected; nothing was written
    ValidationFailed(FormState),
    /// The write failed; nothing was revalidated
    PersistFailed(FormState),
    /// Written, listing revalidated, user sent to `to`
    Redirected { to: String },
    /// Written and listing revalidated; no navigation
    Done,
}

impl MutationOutcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            MutationOutcome::Redirected { .. } | MutationOutcome::Done
        )
    }

    /// The form state to render, for failed outcomes
    pub fn form_state(&self) -> Option<&FormState> {
        match self {
            MutationOutcome::ValidationFailed(state) | MutationOutcome::PersistFailed(state) => {
                Some(state)
            }
            _ => None,
        }
    }
}

fn utc_today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Create, update and delete for invoices
pub struct InvoiceActions {
    store: Arc<dyn InvoiceStore>,
    listing_path: String,
    today: fn() -> NaiveDate,
}

impl InvoiceActions {
    /// `listing_path` is revalidated after every write and is the redirect
    /// target of create and update.
    pub fn new(store: Arc<dyn InvoiceStore>, listing_path: impl Into<String>) -> Self {
        Self {
            store,
            listing_path: listing_path.into(),
            today: utc_today,
        }
    }

    /// Replace the clock that dates new invoices
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn listing_path(&self) -> &str {
        &self.listing_path
    }

    /// Validate and insert a new invoice dated today
    pub async fn create(&self, form: &InvoiceForm, navigator: &dyn Navigator) -> MutationOutcome {
        let input = match InvoiceSchema::safe_parse(form) {
            Ok(input) => input,
            Err(errors) => {
                tracing::debug!(fields = %errors.summary(), "create invoice rejected");
                return MutationOutcome::ValidationFailed(FormState::invalid(
                    errors,
                    CREATE_VALIDATION_MESSAGE,
                ));
            }
        };

        let invoice = NewInvoice {
            customer_id: input.customer_id,
            amount: input.amount,
            status: input.status,
            date: (self.today)(),
        };
        let amount = invoice.amount;

        if let Err(e) = self.store.insert(invoice).await {
            tracing::error!(error = %e, "failed to create invoice");
            return MutationOutcome::PersistFailed(FormState::failed(CREATE_FAILED_MESSAGE));
        }

        tracing::info!(amount, "invoice created");
        self.revalidate_and_redirect(navigator)
    }

    /// Validate and overwrite the invoice `id`; the issue date is kept
    pub async fn update(
        &self,
        id: &str,
        form: &InvoiceForm,
        navigator: &dyn Navigator,
    ) -> MutationOutcome {
        let input = match InvoiceSchema::safe_parse(form) {
            Ok(input) => input,
            Err(errors) => {
                tracing::debug!(id, fields = %errors.summary(), "update invoice rejected");
                return MutationOutcome::ValidationFailed(FormState::invalid(
                    errors,
                    UPDATE_VALIDATION_MESSAGE,
                ));
            }
        };

        let changes = InvoiceChanges {
            customer_id: input.customer_id,
            amount: input.amount,
            status: input.status,
        };

        if let Err(e) = self.store.update(id, changes).await {
            tracing::error!(id, error = %e, "failed to update invoice");
            return MutationOutcome::PersistFailed(FormState::failed(UPDATE_FAILED_MESSAGE));
        }

        tracing::info!(id, "invoice updated");
        self.revalidate_and_redirect(navigator)
    }

    /// Delete the invoice `id`
    ///
    /// Delete is issued from the listing itself, so it revalidates without
    /// redirecting.
    pub async fn delete(&self, id: &str, navigator: &dyn Navigator) -> MutationOutcome {
        if let Err(e) = self.store.delete(id).await {
            tracing::error!(id, error = %e, "failed to delete invoice");
            return MutationOutcome::PersistFailed(FormState::failed(DELETE_FAILED_MESSAGE));
        }

        tracing::info!(id, "invoice deleted");
        navigator.revalidate_path(&self.listing_path);
        MutationOutcome::Done
    }

    fn revalidate_and_redirect(&self, navigator: &dyn Navigator) -> MutationOutcome {
        navigator.revalidate_path(&self.listing_path);
        navigator.redirect(&self.listing_path);
        MutationOutcome::Redirected {
            to: self.listing_path.clone(),
        }
    }
}
