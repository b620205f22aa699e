use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::auth::{AuthOutcome, ProfileUpdate, SignUpMetadata};
use crate::models::{Role, User};
use crate::state::SharedState;

#[derive(Deserialize)]
pub struct SignInRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
}

#[derive(Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
}

#[derive(Deserialize)]
pub struct UpdatePasswordRequest {
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthStatus {
    pub loading: bool,
    pub error: Option<String>,
}

impl<T: Serialize> IntoResponse for AuthOutcome<T> {
    fn into_response(self) -> Response {
        let status = if self.success {
            StatusCode::OK
        } else {
            StatusCode::BAD_REQUEST
        };
        (status, Json(self)).into_response()
    }
}

fn missing_fields<T>(fields: &[&str]) -> Option<AuthOutcome<T>> {
    if fields.iter().any(|f| f.trim().is_empty()) {
        Some(AuthOutcome::failed("All fields are required"))
    } else {
        None
    }
}

pub async fn sign_in(
    State(state): State<SharedState>,
    Json(req): Json<SignInRequest>,
) -> AuthOutcome<User> {
    if let Some(rejected) = missing_fields(&[&req.email, &req.password]) {
        return rejected;
    }
    state.auth.sign_in(&req.email, &req.password).await
}

pub async fn sign_up(
    State(state): State<SharedState>,
    Json(req): Json<SignUpRequest>,
) -> AuthOutcome<User> {
    if let Some(rejected) = missing_fields(&[&req.email, &req.password, &req.name]) {
        return rejected;
    }
    let metadata = SignUpMetadata {
        name: req.name,
        role: req.role,
        department: req.department,
    };
    state.auth.sign_up(&req.email, &req.password, &metadata).await
}

pub async fn sign_out(State(state): State<SharedState>) -> AuthOutcome<()> {
    state.auth.sign_out().await
}

pub async fn reset_password(
    State(state): State<SharedState>,
    Json(req): Json<ResetPasswordRequest>,
) -> AuthOutcome<()> {
    if let Some(rejected) = missing_fields(&[&req.email]) {
        return rejected;
    }
    state.auth.reset_password(&req.email).await
}

pub async fn update_profile(
    State(state): State<SharedState>,
    Json(update): Json<ProfileUpdate>,
) -> AuthOutcome<User> {
    state.auth.update_profile(&update).await
}

pub async fn update_password(
    State(state): State<SharedState>,
    Json(req): Json<UpdatePasswordRequest>,
) -> AuthOutcome<()> {
    if let Some(rejected) = missing_fields(&[&req.password]) {
        return rejected;
    }
    state.auth.update_password(&req.password).await
}

pub async fn status(State(state): State<SharedState>) -> Json<AuthStatus> {
    Json(AuthStatus {
        loading: state.auth.is_loading(),
        error: state.auth.error(),
    })
}

pub async fn clear_error(State(state): State<SharedState>) -> StatusCode {
    state.auth.clear_error();
    StatusCode::NO_CONTENT
}
