//! Router assembly and the dashboard route guard

use super::handlers::{
    create_invoice, dashboard_summary, delete_invoice, get_invoice, list_customers, list_invoices, login, logout,
    session_token, update_invoice,
};
use super::host::ServerHost;
use crate::config::LOGOUT_PATH;
use axum::{
    Router,
    extract::{Request, State},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

/// Build the application router
///
/// Paths come from `routes` in the configuration:
/// - POST {login} - sign in
/// - POST /logout - sign out
/// - GET {dashboard} - summary totals
/// - GET/POST {invoices} - list, create
/// - GET/POST/PUT/DELETE {invoices}/{id} - edit form, update, delete
/// - POST {invoices}/{id}/edit - update
/// - POST {invoices}/{id}/delete - delete
/// - GET {dashboard}/customers - customers
///
/// Every dashboard route requires a live session. Paths are assumed distinct;
/// `AppConfig::validate` rejects settings that would mount one twice.
pub fn build_router(host: Arc<ServerHost>) -> Router {
    let routes = &host.config.routes;
    let invoice_path = format!("{}/{{id}}", routes.invoices);

    let dashboard = Router::new()
        .route(&routes.dashboard, get(dashboard_summary))
        .route(&routes.invoices, get(list_invoices).post(create_invoice))
        .route(
            &invoice_path,
            get(get_invoice)
                .post(update_invoice)
                .put(update_invoice)
                .delete(delete_invoice),
        )
        .route(&format!("{}/edit", invoice_path), post(update_invoice))
        .route(&format!("{}/delete", invoice_path), post(delete_invoice))
        .route(
            &format!("{}/customers", routes.dashboard),
            get(list_customers),
        )
        .route_layer(middleware::from_fn_with_state(host.clone(), require_session));

    Router::new()
        .route(&routes.login, post(login))
        .route(LOGOUT_PATH, post(logout))
        .merge(dashboard)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(host)
}

/// Redirect anonymous requests to the login page
async fn require_session(
    State(host): State<Arc<ServerHost>>,
    request: Request,
    next: Next,
) -> Response {
    let token = session_token(request.headers(), &host.config.session.cookie_name);

    match host.authenticator.context(token).await {
        Ok(context) if context.is_authenticated() => next.run(request).await,
        Ok(_) => {
            tracing::debug!(path = %request.uri().path(), "no session, redirecting to login");
            Redirect::to(&host.config.routes.login).into_response()
        }
        Err(e) => e.into_response(),
    }
}
