pub mod auth;
pub mod documents;
pub mod emails;
pub mod invoices;
pub mod session;
pub mod tasks;

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use serde::Serialize;

use crate::db::StoreError;
use crate::state::SharedState;

/// `{data, error}` body for data-store results. Failures keep a 502 status so
/// clients can tell a backend problem from a bad request.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> From<Result<T, StoreError>> for Envelope<T> {
    fn from(result: Result<T, StoreError>) -> Self {
        match result {
            Ok(data) => Envelope {
                data: Some(data),
                error: None,
            },
            Err(e) => Envelope {
                data: None,
                error: Some(e.message),
            },
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        let status = if let Some(err) = &self.error {
            tracing::error!("Store error: {err}");
            StatusCode::BAD_GATEWAY
        } else {
            StatusCode::OK
        };
        (status, Json(self)).into_response()
    }
}

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Auth
        .route("/api/v1/auth/sign-in", post(auth::sign_in))
        .route("/api/v1/auth/sign-up", post(auth::sign_up))
        .route("/api/v1/auth/sign-out", post(auth::sign_out))
        .route("/api/v1/auth/reset-password", post(auth::reset_password))
        .route("/api/v1/auth/password", put(auth::update_password))
        .route("/api/v1/auth/profile", put(auth::update_profile))
        .route(
            "/api/v1/auth/status",
            get(auth::status).delete(auth::clear_error),
        )
        // Session & preferences
        .route("/api/v1/session", get(session::snapshot))
        .route("/api/v1/session/logout", post(session::logout))
        .route("/api/v1/preferences/theme/toggle", post(session::toggle_theme))
        .route(
            "/api/v1/preferences/sidebar",
            put(session::set_sidebar),
        )
        .route(
            "/api/v1/preferences/sidebar/toggle",
            post(session::toggle_sidebar),
        )
        .route("/api/v1/navigation", get(session::navigation))
        // Notifications
        .route(
            "/api/v1/notifications",
            get(session::list_notifications)
                .post(session::add_notification)
                .delete(session::clear_notifications),
        )
        .route(
            "/api/v1/notifications/{id}/read",
            post(session::mark_notification_read),
        )
        // Emails
        .route("/api/v1/correos", get(emails::list).post(emails::create))
        .route(
            "/api/v1/correos/{id}",
            put(emails::update).delete(emails::delete),
        )
        // Invoices
        .route(
            "/api/v1/facturas",
            get(invoices::list).post(invoices::create),
        )
        .route(
            "/api/v1/facturas/{id}",
            put(invoices::update).delete(invoices::delete),
        )
        .route("/api/v1/facturas/{id}/classify", post(invoices::classify))
        // Tasks
        .route("/api/v1/tareas", get(tasks::list).post(tasks::create))
        .route(
            "/api/v1/tareas/{id}",
            put(tasks::update).delete(tasks::delete),
        )
        // Aggregates
        .route("/api/v1/search", get(documents::search))
        .route("/api/v1/stats", get(documents::stats))
        .route("/api/v1/tareas-proximas", get(documents::upcoming_tasks))
        .route("/api/v1/dashboard/summary", get(documents::summary))
}

/// Only mounted in development.
pub fn dev_routes() -> Router<SharedState> {
    Router::new().route("/api/v1/dev/login-as/{role}", post(session::login_as))
}
