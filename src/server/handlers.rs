//! HTTP handlers for sign-in and invoice operations
//!
//! Handlers are thin: they extract the form, call into the core and turn
//! the result into a response. Mutation outcomes map as follows:
//! - `Redirected` → 303 with `Location`
//! - `Done` → 204
//! - `ValidationFailed` → 422 with the form state
//! - `PersistFailed` → 500 with the form state

use axum::{
    Form, Json,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use super::host::ServerHost;
use crate::core::actions::MutationOutcome;
use crate::core::auth::AuthOutcome;
use crate::core::error::{AppError, AppResult, RequestError, StorageError};
use crate::core::invoice::{Invoice, InvoiceStatus};
use crate::core::navigation::RequestNavigator;
use crate::core::validation::{CredentialsForm, InvoiceForm};

/// Body of a refused sign-in
#[derive(Debug, Serialize)]
pub struct AuthMessage {
    pub message: &'static str,
}

/// Extract the session token from the `Cookie` header
///
/// A missing cookie or a value that is not a UUID yields `None`.
pub fn session_token(headers: &HeaderMap, cookie_name: &str) -> Option<Uuid> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
}

fn session_cookie(name: &str, value: &str, max_age_secs: i64) -> AppResult<HeaderValue> {
    let cookie = format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}",
        name, value, max_age_secs
    );
    HeaderValue::from_str(&cookie).map_err(|e| AppError::Internal(e.to_string()))
}

fn read_failed(e: anyhow::Error) -> AppError {
    StorageError::QueryError {
        backend: "store".to_string(),
        message: e.to_string(),
    }
    .into()
}

fn outcome_response(outcome: MutationOutcome, navigator: &RequestNavigator) -> Response {
    match outcome {
        MutationOutcome::Redirected { to } => {
            let target = navigator.take_redirect().unwrap_or(to);
            Redirect::to(&target).into_response()
        }
        MutationOutcome::Done => StatusCode::NO_CONTENT.into_response(),
        MutationOutcome::ValidationFailed(state) => {
            (StatusCode::UNPROCESSABLE_ENTITY, Json(state)).into_response()
        }
        MutationOutcome::PersistFailed(state) => {
            (StatusCode::INTERNAL_SERVER_ERROR, Json(state)).into_response()
        }
    }
}

// =============================================================================
// Authentication
// =============================================================================

/// POST {login}
pub async fn login(
    State(host): State<Arc<ServerHost>>,
    Form(credentials): Form<CredentialsForm>,
) -> AppResult<Response> {
    match host.authenticator.authenticate(None, &credentials).await? {
        AuthOutcome::SignedIn(session) => {
            let session_config = &host.config.session;
            let cookie = session_cookie(
                &session_config.cookie_name,
                &session.token.to_string(),
                session_config.ttl_minutes * 60,
            )?;
            Ok((
                [(header::SET_COOKIE, cookie)],
                Redirect::to(&host.config.routes.dashboard),
            )
                .into_response())
        }
        AuthOutcome::Rejected(message) => {
            Ok((StatusCode::UNAUTHORIZED, Json(AuthMessage { message })).into_response())
        }
    }
}

/// POST /logout
pub async fn logout(
    State(host): State<Arc<ServerHost>>,
    headers: HeaderMap,
) -> AppResult<Response> {
    let cookie_name = &host.config.session.cookie_name;
    if let Some(token) = session_token(&headers, cookie_name) {
        host.authenticator.sign_out(&token).await?;
        tracing::info!("user signed out");
    }

    let cleared = session_cookie(cookie_name, "", 0)?;
    Ok((
        [(header::SET_COOKIE, cleared)],
        Redirect::to(&host.config.routes.login),
    )
        .into_response())
}

// =============================================================================
// Invoices
// =============================================================================

/// GET {invoices}
///
/// Served from the page cache until a mutation revalidates the path. A read
/// that overlaps a revalidation is returned but not cached.
pub async fn list_invoices(State(host): State<Arc<ServerHost>>) -> AppResult<Json<serde_json::Value>> {
    let path = host.actions.listing_path();
    if let Some(page) = host.cache.get(path) {
        return Ok(Json(page));
    }

    let generation = host.cache.generation(path);
    let invoices = host.invoices.list().await.map_err(read_failed)?;
    let page = serde_json::to_value(&invoices).map_err(anyhow::Error::from)?;
    host.cache.put(path, generation, page.clone());

    Ok(Json(page))
}

/// GET {invoices}/{id}
pub async fn get_invoice(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let invoice = host
        .invoices
        .get(&id)
        .await
        .map_err(read_failed)?
        .ok_or_else(|| RequestError::NotFound {
            resource: "Invoice".to_string(),
            id: id.clone(),
        })?;

    Ok(Json(invoice.to_form()).into_response())
}

/// POST {invoices}
pub async fn create_invoice(
    State(host): State<Arc<ServerHost>>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let navigator = host.navigator();
    let outcome = host.actions.create(&form, &navigator).await;
    outcome_response(outcome, &navigator)
}

/// POST/PUT {invoices}/{id}, POST {invoices}/{id}/edit
pub async fn update_invoice(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
    Form(form): Form<InvoiceForm>,
) -> Response {
    let navigator = host.navigator();
    let outcome = host.actions.update(&id, &form, &navigator).await;
    outcome_response(outcome, &navigator)
}

/// DELETE {invoices}/{id}, POST {invoices}/{id}/delete
pub async fn delete_invoice(
    State(host): State<Arc<ServerHost>>,
    Path(id): Path<String>,
) -> Response {
    let navigator = host.navigator();
    let outcome = host.actions.delete(&id, &navigator).await;
    outcome_response(outcome, &navigator)
}

// =============================================================================
// Dashboard
// =============================================================================

/// Card totals shown on the dashboard landing page; sums are in minor units
#[derive(Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub invoice_count: usize,
    pub customer_count: usize,
    pub total_paid: i64,
    pub total_pending: i64,
}

impl DashboardSummary {
    /// Count and total `invoices`; a sum that overflows is an error, not a wrap
    pub fn tally(invoices: &[Invoice], customer_count: usize) -> AppResult<Self> {
        let mut summary = DashboardSummary {
            invoice_count: invoices.len(),
            customer_count,
            ..Default::default()
        };
        for invoice in invoices {
            let total = match invoice.status {
                InvoiceStatus::Paid => &mut summary.total_paid,
                InvoiceStatus::Pending => &mut summary.total_pending,
            };
            *total = total.checked_add(invoice.amount).ok_or_else(|| {
                AppError::Internal(format!("{} invoice total overflows", invoice.status))
            })?;
        }
        Ok(summary)
    }
}

/// GET {dashboard}
pub async fn dashboard_summary(
    State(host): State<Arc<ServerHost>>,
) -> AppResult<Json<DashboardSummary>> {
    let invoices = host.invoices.list().await.map_err(read_failed)?;
    let customers = host.customers.list_customers().await.map_err(read_failed)?;

    Ok(Json(DashboardSummary::tally(&invoices, customers.len())?))
}

// =============================================================================
// Customers
// =============================================================================

/// GET {dashboard}/customers
pub async fn list_customers(State(host): State<Arc<ServerHost>>) -> AppResult<Response> {
    let customers = host.customers.list_customers().await.map_err(read_failed)?;
    Ok(Json(customers).into_response())
}
