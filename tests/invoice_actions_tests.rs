//! Tests for the invoice mutation handlers
//!
//! These tests verify that:
//! - Invalid input never reaches the store
//! - Store failures become a summary message with no revalidation
//! - Successful writes revalidate the listing, and create/update redirect
//! - Amounts are stored in minor units

use chrono::NaiveDate;
use invoicer::core::actions::{
    CREATE_FAILED_MESSAGE, CREATE_VALIDATION_MESSAGE, DELETE_FAILED_MESSAGE,
    UPDATE_FAILED_MESSAGE, UPDATE_VALIDATION_MESSAGE,
};
use invoicer::core::invoice::{InvoiceChanges, NewInvoice};
use invoicer::prelude::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

const LISTING: &str = "/dashboard/invoices";

// =============================================================================
// Test doubles
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
enum StoreCall {
    Insert(NewInvoice),
    Update(String, InvoiceChanges),
    Delete(String),
}

/// Records every write and fails on demand
#[derive(Default)]
struct RecordingStore {
    calls: Mutex<Vec<StoreCall>>,
    fail: AtomicBool,
}

impl RecordingStore {
    fn failing() -> Self {
        let store = Self::default();
        store.fail.store(true, Ordering::SeqCst);
        store
    }

    fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: StoreCall) -> Result<()> {
        self.calls.lock().unwrap().push(call);
        if self.fail.load(Ordering::SeqCst) {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl InvoiceStore for RecordingStore {
    async fn insert(&self, invoice: NewInvoice) -> Result<()> {
        self.record(StoreCall::Insert(invoice))
    }

    async fn update(&self, id: &str, changes: InvoiceChanges) -> Result<()> {
        self.record(StoreCall::Update(id.to_string(), changes))
    }

    async fn delete(&self, id: &str) -> Result<()> {
        self.record(StoreCall::Delete(id.to_string()))
    }

    async fn get(&self, _id: &str) -> Result<Option<Invoice>> {
        Ok(None)
    }

    async fn list(&self) -> Result<Vec<Invoice>> {
        Ok(Vec::new())
    }
}

/// Records revalidations and redirects
#[derive(Default)]
struct RecordingNavigator {
    revalidated: Mutex<Vec<String>>,
    redirects: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    fn revalidated(&self) -> Vec<String> {
        self.revalidated.lock().unwrap().clone()
    }

    fn redirects(&self) -> Vec<String> {
        self.redirects.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn revalidate_path(&self, path: &str) {
        self.revalidated.lock().unwrap().push(path.to_string());
    }

    fn redirect(&self, path: &str) {
        self.redirects.lock().unwrap().push(path.to_string());
    }
}

fn fixed_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
}

fn actions(store: Arc<RecordingStore>) -> InvoiceActions {
    InvoiceActions::new(store, LISTING).with_clock(fixed_day)
}

// =============================================================================
// Create
// =============================================================================

mod create_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_valid_invoice() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .create(&InvoiceForm::new("c1", "12.50", "pending"), &navigator)
            .await;

        assert_eq!(
            outcome,
            MutationOutcome::Redirected {
                to: LISTING.to_string()
            }
        );
        assert_eq!(
            store.calls(),
            vec![StoreCall::Insert(NewInvoice {
                customer_id: "c1".to_string(),
                amount: 1250,
                status: InvoiceStatus::Pending,
                date: fixed_day(),
            })]
        );
        assert_eq!(navigator.revalidated(), vec![LISTING]);
        assert_eq!(navigator.redirects(), vec![LISTING]);
    }

    #[tokio::test]
    async fn test_create_missing_customer_never_touches_store() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();
        let form = InvoiceForm {
            customer_id: None,
            amount: Some("10".to_string()),
            status: Some("paid".to_string()),
        };

        let outcome = actions(store.clone()).create(&form, &navigator).await;

        let MutationOutcome::ValidationFailed(state) = outcome else {
            panic!("expected validation failure, got {:?}", outcome);
        };
        let errors = state.errors.unwrap();
        assert_eq!(errors.get("customerId").unwrap(), ["select a creator"]);
        assert!(!errors.contains("amount"));
        assert!(!errors.contains("status"));
        assert_eq!(state.message.as_deref(), Some(CREATE_VALIDATION_MESSAGE));
        assert!(store.calls().is_empty());
        assert!(navigator.revalidated().is_empty());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_create_reports_every_invalid_field() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .create(&InvoiceForm::new("", "-5", "overdue"), &navigator)
            .await;

        let errors = outcome.form_state().unwrap().errors.clone().unwrap();
        assert_eq!(errors.get("customerId").unwrap(), ["select a creator"]);
        assert_eq!(
            errors.get("amount").unwrap(),
            ["amount must be greater than 0"]
        );
        assert_eq!(errors.get("status").unwrap(), ["select a status"]);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_create_store_failure() {
        let store = Arc::new(RecordingStore::failing());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .create(&InvoiceForm::new("c1", "12.50", "pending"), &navigator)
            .await;

        assert_eq!(
            outcome,
            MutationOutcome::PersistFailed(FormState::failed(CREATE_FAILED_MESSAGE))
        );
        assert_eq!(store.calls().len(), 1);
        assert!(navigator.revalidated().is_empty());
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_create_rounds_to_minor_units() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        actions(store.clone())
            .create(&InvoiceForm::new("c1", "0.29", "paid"), &navigator)
            .await;

        let StoreCall::Insert(invoice) = &store.calls()[0] else {
            panic!("expected an insert");
        };
        assert_eq!(invoice.amount, 29);
    }

    #[tokio::test]
    async fn test_create_sub_cent_amount_never_touches_store() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .create(&InvoiceForm::new("c1", "0.004", "paid"), &navigator)
            .await;

        let state = outcome.form_state().unwrap();
        assert_eq!(
            state.errors.as_ref().unwrap().get("amount").unwrap(),
            ["amount must be greater than 0"]
        );
        assert!(store.calls().is_empty());
        assert!(navigator.revalidated().is_empty());
    }

    #[tokio::test]
    async fn test_create_oversized_amount_never_touches_store() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .create(&InvoiceForm::new("c1", "1e300", "paid"), &navigator)
            .await;

        assert!(matches!(outcome, MutationOutcome::ValidationFailed(_)));
        assert!(store.calls().is_empty());
        assert!(navigator.redirects().is_empty());
    }
}

// =============================================================================
// Update
// =============================================================================

mod update_tests {
    use super::*;

    #[tokio::test]
    async fn test_update_zero_amount_is_rejected() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .update("inv1", &InvoiceForm::new("c1", "0", "paid"), &navigator)
            .await;

        let state = outcome.form_state().unwrap();
        assert_eq!(
            state.errors.as_ref().unwrap().get("amount").unwrap(),
            ["amount must be greater than 0"]
        );
        assert_eq!(state.message.as_deref(), Some(UPDATE_VALIDATION_MESSAGE));
        assert!(store.calls().is_empty());
        assert!(navigator.revalidated().is_empty());
    }

    #[tokio::test]
    async fn test_update_sub_cent_amount_is_rejected() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .update("inv1", &InvoiceForm::new("c1", "0.004", "pending"), &navigator)
            .await;

        let state = outcome.form_state().unwrap();
        assert!(state.errors.as_ref().unwrap().contains("amount"));
        assert_eq!(state.message.as_deref(), Some(UPDATE_VALIDATION_MESSAGE));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_customer_is_rejected() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();
        let form = InvoiceForm {
            customer_id: None,
            amount: Some("5".to_string()),
            status: Some("pending".to_string()),
        };

        let outcome = actions(store.clone())
            .update("inv1", &form, &navigator)
            .await;

        assert!(matches!(outcome, MutationOutcome::ValidationFailed(_)));
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn test_update_valid_invoice() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone())
            .update("inv1", &InvoiceForm::new("c2", "99.99", "paid"), &navigator)
            .await;

        assert!(outcome.is_success());
        assert_eq!(
            store.calls(),
            vec![StoreCall::Update(
                "inv1".to_string(),
                InvoiceChanges {
                    customer_id: "c2".to_string(),
                    amount: 9999,
                    status: InvoiceStatus::Paid,
                }
            )]
        );
        assert_eq!(navigator.revalidated(), vec![LISTING]);
        assert_eq!(navigator.redirects(), vec![LISTING]);
    }

    #[tokio::test]
    async fn test_repeated_update_issues_two_writes() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();
        let actions = actions(store.clone());
        let form = InvoiceForm::new("c1", "10", "paid");

        let first = actions.update("inv1", &form, &navigator).await;
        let second = actions.update("inv1", &form, &navigator).await;

        assert!(first.is_success());
        assert_eq!(first, second);
        assert_eq!(store.calls().len(), 2);
        assert_eq!(store.calls()[0], store.calls()[1]);
    }

    #[tokio::test]
    async fn test_update_store_failure() {
        let store = Arc::new(RecordingStore::failing());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store)
            .update("inv1", &InvoiceForm::new("c1", "10", "paid"), &navigator)
            .await;

        assert_eq!(
            outcome,
            MutationOutcome::PersistFailed(FormState::failed(UPDATE_FAILED_MESSAGE))
        );
        assert!(navigator.revalidated().is_empty());
        assert!(navigator.redirects().is_empty());
    }
}

// =============================================================================
// Delete
// =============================================================================

mod delete_tests {
    use super::*;

    #[tokio::test]
    async fn test_delete_revalidates_without_redirect() {
        let store = Arc::new(RecordingStore::default());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone()).delete("inv1", &navigator).await;

        assert_eq!(outcome, MutationOutcome::Done);
        assert_eq!(store.calls(), vec![StoreCall::Delete("inv1".to_string())]);
        assert_eq!(navigator.revalidated(), vec![LISTING]);
        assert!(navigator.redirects().is_empty());
    }

    #[tokio::test]
    async fn test_delete_store_failure() {
        let store = Arc::new(RecordingStore::failing());
        let navigator = RecordingNavigator::default();

        let outcome = actions(store.clone()).delete("inv1", &navigator).await;

        let state = outcome.form_state().unwrap();
        assert_eq!(state.message.as_deref(), Some(DELETE_FAILED_MESSAGE));
        assert!(state.errors.is_none());
        assert_eq!(store.calls().len(), 1);
        assert!(navigator.revalidated().is_empty());
    }
}

// =============================================================================
// Against the in-memory store
// =============================================================================

mod in_memory_tests {
    use super::*;

    fn seeded() -> InMemoryStore {
        InMemoryStore::new().with_customer(Customer {
            id: "c1".to_string(),
            name: "Amy Burns".to_string(),
            email: "amy@burns.com".to_string(),
            image_url: "/customers/amy-burns.png".to_string(),
        })
    }

    #[tokio::test]
    async fn test_create_then_edit_form_shows_major_units() {
        let store = Arc::new(seeded());
        let navigator = RecordingNavigator::default();
        let actions = InvoiceActions::new(store.clone(), LISTING);

        actions
            .create(&InvoiceForm::new("c1", "12.50", "pending"), &navigator)
            .await;

        let invoice = store.list().await.unwrap().remove(0);
        let view = invoice.to_form();
        assert_eq!(view.amount, 12.5);
        assert_eq!(view.status, InvoiceStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_customer_is_a_persist_failure() {
        let store = Arc::new(seeded());
        let navigator = RecordingNavigator::default();

        let outcome = InvoiceActions::new(store.clone(), LISTING)
            .create(&InvoiceForm::new("ghost", "1", "paid"), &navigator)
            .await;

        assert!(matches!(outcome, MutationOutcome::PersistFailed(_)));
        assert!(store.list().await.unwrap().is_empty());
    }
}
